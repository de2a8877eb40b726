//! Bulk loading of customer and loan ledgers exported as CSV.

mod normalizer;
mod parser;

use std::fmt;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use crate::lending::domain::{Customer, Loan};
use crate::lending::repository::{CustomerStore, LoanStore, RepositoryError};

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Repository(RepositoryError),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read ledger export: {}", err),
            ImportError::Csv(err) => write!(f, "invalid ledger CSV data: {}", err),
            ImportError::Repository(err) => {
                write!(f, "could not store imported ledger rows: {}", err)
            }
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Csv(err) => Some(err),
            ImportError::Repository(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<RepositoryError> for ImportError {
    fn from(err: RepositoryError) -> Self {
        Self::Repository(err)
    }
}

/// Which ledger file a row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerTable {
    Customers,
    Loans,
}

impl fmt::Display for LedgerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerTable::Customers => f.write_str("customers"),
            LedgerTable::Loans => f.write_str("loans"),
        }
    }
}

/// A row that was skipped (or, in `ImportSummary::warnings`, imported with a caveat).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    pub table: LedgerTable,
    pub line: u64,
    pub message: String,
}

impl RowError {
    pub(crate) fn new(table: LedgerTable, line: u64, message: impl Into<String>) -> Self {
        Self {
            table,
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} line {}: {}", self.table, self.line, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
    pub errors: Vec<RowError>,
    pub warnings: Vec<RowError>,
}

impl ImportSummary {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    fn absorb<T>(&mut self, parsed: &mut parser::ParsedTable<T>) {
        self.errors.append(&mut parsed.errors);
        self.warnings.append(&mut parsed.warnings);
    }
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} updated, {} rejected, {} warnings",
            self.created,
            self.updated,
            self.errors.len(),
            self.warnings.len()
        )
    }
}

/// Upserts customer and loan exports into the lending stores.
///
/// Customers are applied before loans so a single import can introduce both. Loan status
/// is derived from `end_date` against the importer's reference date.
pub struct LedgerImporter {
    today: NaiveDate,
}

impl LedgerImporter {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn import_paths<C, L>(
        &self,
        customers_csv: impl AsRef<Path>,
        loans_csv: impl AsRef<Path>,
        customers: &C,
        loans: &L,
    ) -> Result<ImportSummary, ImportError>
    where
        C: CustomerStore + ?Sized,
        L: LoanStore + ?Sized,
    {
        let customer_file = std::fs::File::open(customers_csv)?;
        let loan_file = std::fs::File::open(loans_csv)?;
        self.import_readers(customer_file, loan_file, customers, loans)
    }

    pub fn import_readers<RC, RL, C, L>(
        &self,
        customer_rows: RC,
        loan_rows: RL,
        customers: &C,
        loans: &L,
    ) -> Result<ImportSummary, ImportError>
    where
        RC: Read,
        RL: Read,
        C: CustomerStore + ?Sized,
        L: LoanStore + ?Sized,
    {
        let mut summary = ImportSummary::default();
        self.apply_customers(customer_rows, customers, &mut summary)?;
        self.apply_loans(loan_rows, customers, loans, &mut summary)?;

        if summary.errors.is_empty() {
            info!(%summary, "ledger import finished");
        } else {
            warn!(%summary, "ledger import finished with rejected rows");
        }
        Ok(summary)
    }

    fn apply_customers<R, C>(
        &self,
        rows: R,
        customers: &C,
        summary: &mut ImportSummary,
    ) -> Result<(), ImportError>
    where
        R: Read,
        C: CustomerStore + ?Sized,
    {
        let mut parsed = parser::parse_customers(rows)?;
        summary.absorb(&mut parsed);

        for (_, customer) in parsed.rows {
            upsert_customer(customers, customer, summary)?;
        }
        Ok(())
    }

    fn apply_loans<R, C, L>(
        &self,
        rows: R,
        customers: &C,
        loans: &L,
        summary: &mut ImportSummary,
    ) -> Result<(), ImportError>
    where
        R: Read,
        C: CustomerStore + ?Sized,
        L: LoanStore + ?Sized,
    {
        let mut parsed = parser::parse_loans(rows, self.today)?;
        summary.absorb(&mut parsed);

        for (line, loan) in parsed.rows {
            if customers.fetch(loan.customer_id)?.is_none() {
                summary.errors.push(RowError::new(
                    LedgerTable::Loans,
                    line,
                    format!("unknown customer {}", loan.customer_id),
                ));
                continue;
            }
            upsert_loan(loans, loan, summary)?;
        }
        Ok(())
    }
}

fn upsert_customer<C>(
    customers: &C,
    customer: Customer,
    summary: &mut ImportSummary,
) -> Result<(), RepositoryError>
where
    C: CustomerStore + ?Sized,
{
    let existed = customers.fetch(customer.customer_id)?.is_some();
    customers.save(customer)?;
    if existed {
        summary.updated += 1;
    } else {
        summary.created += 1;
    }
    Ok(())
}

fn upsert_loan<L>(loans: &L, loan: Loan, summary: &mut ImportSummary) -> Result<(), RepositoryError>
where
    L: LoanStore + ?Sized,
{
    let existed = loans.fetch(loan.loan_id)?.is_some();
    loans.save(loan)?;
    if existed {
        summary.updated += 1;
    } else {
        summary.created += 1;
    }
    Ok(())
}
