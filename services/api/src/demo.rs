use crate::infra::{build_service, parse_date, LedgerService};
use chrono::{Local, NaiveDate};
use clap::Args;
use credit_core::error::AppError;
use credit_core::ingest::{ImportSummary, LedgerImporter};
use credit_core::lending::{
    EligibilityDecision, EligibilityRequest, InMemoryLedger, LendingServiceError,
    RegistrationRequest,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// Customer export (customer_id, first_name, last_name, age, phone_number, monthly_salary, ...)
    #[arg(long)]
    pub(crate) customers: PathBuf,
    /// Loan export (customer_id, loan_id, loan_amount, tenure, interest_rate, ...)
    #[arg(long)]
    pub(crate) loans: PathBuf,
    /// Date used to classify loans as active or closed (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Monthly income of the sample customer
    #[arg(long, default_value = "50000")]
    pub(crate) monthly_income: Decimal,
    /// Requested principal
    #[arg(long, default_value = "200000")]
    pub(crate) loan_amount: Decimal,
    /// Requested annual interest rate in percent
    #[arg(long, default_value = "10")]
    pub(crate) interest_rate: Decimal,
    /// Term in months
    #[arg(long, default_value_t = 24)]
    pub(crate) tenure: u16,
    /// Override the reference date (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let ledger = InMemoryLedger::default();
    let summary =
        LedgerImporter::new(today).import_paths(&args.customers, &args.loans, &ledger, &ledger)?;

    render_import_summary(&summary, &ledger)
}

fn render_import_summary(summary: &ImportSummary, ledger: &InMemoryLedger) -> Result<(), AppError> {
    let customers = ledger.customer_count().map_err(LendingServiceError::from)?;
    let loans = ledger.loan_count().map_err(LendingServiceError::from)?;

    println!("Ledger import");
    println!("  {summary}");
    println!("  {customers} customers, {loans} loans loaded");
    if !summary.errors.is_empty() {
        println!("\nRejected rows");
        for row in &summary.errors {
            println!("  - {row}");
        }
    }
    if !summary.warnings.is_empty() {
        println!("\nWarnings");
        for row in &summary.warnings {
            println!("  - {row}");
        }
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let (service, _ledger) = build_service(Some(today));

    println!("Credit decisioning demo ({today})");
    let registration = RegistrationRequest {
        first_name: "Asha".to_string(),
        last_name: "Verma".to_string(),
        age: 34,
        monthly_income: args.monthly_income,
        phone_number: 9876543210,
    };
    registration.validate()?;
    let customer = service.register_customer(registration)?;
    println!(
        "\nRegistered {} (#{}) with approved limit {}",
        customer.full_name(),
        customer.customer_id,
        customer.approved_limit
    );

    let request = EligibilityRequest {
        customer_id: customer.customer_id,
        loan_amount: args.loan_amount,
        interest_rate: args.interest_rate,
        tenure: args.tenure,
    };
    request.validate()?;

    let decision = service.check_eligibility(&request)?;
    println!("\nEligibility check");
    render_decision(&request, &decision);

    let commitment = service.create_loan(&request)?;
    println!("\nLoan commit");
    println!("  {}", commitment.message());
    if let Some(loan) = &commitment.loan {
        println!(
            "  loan #{} ({}) runs {} to {} at {} per month",
            loan.loan_id,
            loan.status.label(),
            loan.start_date,
            loan.end_date,
            loan.monthly_repayment
        );
        render_book(&service, &request)?;
    }

    Ok(())
}

fn render_decision(request: &EligibilityRequest, decision: &EligibilityDecision) {
    println!("  credit score: {}", decision.score());
    println!(
        "  requested rate: {}%, corrected rate: {}%",
        request.interest_rate,
        decision.corrected_rate()
    );
    if decision.installment() > Decimal::ZERO {
        println!(
            "  monthly installment: {} over {} months",
            decision.installment(),
            request.tenure
        );
    }
    println!("  outcome: {}", decision.message());
}

fn render_book(service: &LedgerService, request: &EligibilityRequest) -> Result<(), AppError> {
    let loans = service.view_customer_loans(request.customer_id)?;
    let outstanding: Decimal = loans.iter().map(|loan| loan.monthly_installment).sum();
    println!(
        "  active loans: {}, total monthly obligations: {}",
        loans.len(),
        outstanding.round_dp(2)
    );

    let follow_up = service.check_eligibility(&EligibilityRequest {
        loan_amount: request.loan_amount * dec!(2),
        ..request.clone()
    })?;
    println!(
        "  a follow-up request for {} would be: {}",
        request.loan_amount * dec!(2),
        follow_up.message()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    #[test]
    fn demo_runs_end_to_end() {
        let args = DemoArgs {
            monthly_income: dec!(50000),
            loan_amount: dec!(200000),
            interest_rate: dec!(10),
            tenure: 24,
            today: Some(today()),
        };
        run_demo(args).expect("demo succeeds");
    }

    #[test]
    fn demo_rejects_invalid_terms() {
        let args = DemoArgs {
            monthly_income: dec!(50000),
            loan_amount: dec!(200000),
            interest_rate: dec!(10),
            tenure: 0,
            today: Some(today()),
        };
        assert!(matches!(run_demo(args), Err(AppError::Validation(_))));
    }

    #[test]
    fn import_reads_files_from_disk() {
        let dir = std::env::temp_dir().join(format!("credit-core-import-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let customers = dir.join("customers.csv");
        let loans = dir.join("loans.csv");
        let mut file = std::fs::File::create(&customers).unwrap();
        writeln!(
            file,
            "customer_id,first_name,last_name,age,phone_number,monthly_salary,approved_limit,current_debt"
        )
        .unwrap();
        writeln!(file, "1,Asha,Verma,34,9876543210,50000,1800000,0").unwrap();
        let mut file = std::fs::File::create(&loans).unwrap();
        writeln!(
            file,
            "customer_id,loan_id,loan_amount,tenure,interest_rate,monthly_repayment,emis_paid_on_time,start_date,end_date"
        )
        .unwrap();
        writeln!(file, "1,10,200000,24,12,9414.69,20,2024-01-01,2026-01-01").unwrap();

        let result = run_import(ImportArgs {
            customers,
            loans,
            today: Some(today()),
        });
        std::fs::remove_dir_all(&dir).ok();
        result.expect("import succeeds");
    }

    #[test]
    fn import_of_missing_files_fails() {
        let result = run_import(ImportArgs {
            customers: PathBuf::from("./missing-customers.csv"),
            loans: PathBuf::from("./missing-loans.csv"),
            today: Some(today()),
        });
        assert!(matches!(result, Err(AppError::Import(_))));
    }
}
