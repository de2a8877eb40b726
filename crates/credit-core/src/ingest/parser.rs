use std::io::Read;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

use super::normalizer::normalize_headers;
use super::{LedgerTable, RowError};
use crate::lending::domain::{Customer, CustomerId, Loan, LoanId, LoanStatus, MAX_AMOUNT};

const MIN_AGE: u8 = 18;
const MAX_TENURE: u16 = 360;

/// Rows that parsed cleanly, keyed by their source line, plus everything that did not.
#[derive(Debug)]
pub(crate) struct ParsedTable<T> {
    pub(crate) rows: Vec<(u64, T)>,
    pub(crate) errors: Vec<RowError>,
    pub(crate) warnings: Vec<RowError>,
}

impl<T> ParsedTable<T> {
    fn new() -> Self {
        Self {
            rows: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

pub(crate) fn parse_customers<R: Read>(reader: R) -> Result<ParsedTable<Customer>, csv::Error> {
    parse_table(reader, LedgerTable::Customers, |row: CustomerRow| {
        row.into_customer().map(|customer| (customer, None))
    })
}

pub(crate) fn parse_loans<R: Read>(
    reader: R,
    today: NaiveDate,
) -> Result<ParsedTable<Loan>, csv::Error> {
    parse_table(reader, LedgerTable::Loans, |row: LoanRow| row.into_loan(today))
}

/// Drive a CSV table through `convert`, which returns the record and an optional warning.
fn parse_table<R, Row, T, F>(
    reader: R,
    table: LedgerTable,
    convert: F,
) -> Result<ParsedTable<T>, csv::Error>
where
    R: Read,
    Row: for<'de> Deserialize<'de>,
    F: Fn(Row) -> Result<(T, Option<String>), String>,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = normalize_headers(csv_reader.headers()?);
    csv_reader.set_headers(headers.clone());

    let mut parsed = ParsedTable::new();
    for result in csv_reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(err) if err.is_io_error() => return Err(err),
            Err(err) => {
                let line = err.position().map(|pos| pos.line()).unwrap_or_default();
                parsed.errors.push(RowError::new(table, line, err.to_string()));
                continue;
            }
        };
        let line = record.position().map(|pos| pos.line()).unwrap_or_default();
        if record.iter().all(str::is_empty) {
            continue;
        }

        let outcome = record
            .deserialize::<Row>(Some(&headers))
            .map_err(|err| describe_csv_error(&err))
            .and_then(&convert);

        match outcome {
            Ok((value, warning)) => {
                if let Some(message) = warning {
                    parsed.warnings.push(RowError::new(table, line, message));
                }
                parsed.rows.push((line, value));
            }
            Err(message) => parsed.errors.push(RowError::new(table, line, message)),
        }
    }

    Ok(parsed)
}

fn describe_csv_error(err: &csv::Error) -> String {
    match err.kind() {
        csv::ErrorKind::Deserialize { err, .. } => match err.field() {
            Some(index) => format!("column {}: {}", index + 1, err.kind()),
            None => err.kind().to_string(),
        },
        _ => err.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct CustomerRow {
    customer_id: u64,
    first_name: String,
    last_name: String,
    age: u8,
    phone_number: u64,
    #[serde(alias = "monthly_income", deserialize_with = "decimal")]
    monthly_salary: Decimal,
    #[serde(default, deserialize_with = "optional_decimal")]
    approved_limit: Option<Decimal>,
    #[serde(default, deserialize_with = "optional_decimal")]
    current_debt: Option<Decimal>,
}

impl CustomerRow {
    fn into_customer(self) -> Result<Customer, String> {
        if self.first_name.is_empty() || self.last_name.is_empty() {
            return Err("first_name and last_name are required".to_string());
        }
        if self.age < MIN_AGE {
            return Err(format!("age {} is below {MIN_AGE}", self.age));
        }
        if self.monthly_salary < Decimal::ZERO {
            return Err("monthly_salary must not be negative".to_string());
        }
        check_ceiling(&[
            ("monthly_salary", Some(self.monthly_salary)),
            ("approved_limit", self.approved_limit),
            ("current_debt", self.current_debt),
        ])?;
        let approved_limit = self
            .approved_limit
            .unwrap_or_else(|| Customer::approved_limit_for(self.monthly_salary));
        let current_debt = self.current_debt.unwrap_or(Decimal::ZERO);
        if approved_limit < Decimal::ZERO || current_debt < Decimal::ZERO {
            return Err("approved_limit and current_debt must not be negative".to_string());
        }

        Ok(Customer {
            customer_id: CustomerId(self.customer_id),
            first_name: self.first_name,
            last_name: self.last_name,
            phone_number: self.phone_number,
            age: self.age,
            monthly_income: self.monthly_salary,
            approved_limit,
            current_debt,
        })
    }
}

#[derive(Debug, Deserialize)]
struct LoanRow {
    customer_id: u64,
    loan_id: u64,
    #[serde(deserialize_with = "decimal")]
    loan_amount: Decimal,
    tenure: u16,
    #[serde(deserialize_with = "decimal")]
    interest_rate: Decimal,
    #[serde(alias = "monthly_payment", deserialize_with = "decimal")]
    monthly_repayment: Decimal,
    emis_paid_on_time: u32,
    #[serde(alias = "date_of_approval")]
    start_date: String,
    end_date: String,
}

impl LoanRow {
    fn into_loan(self, today: NaiveDate) -> Result<(Loan, Option<String>), String> {
        if self.tenure == 0 || self.tenure > MAX_TENURE {
            return Err(format!("tenure {} is outside 1..={MAX_TENURE}", self.tenure));
        }
        if self.interest_rate < Decimal::ZERO || self.interest_rate > Decimal::ONE_HUNDRED {
            return Err(format!("interest_rate {} is outside 0..=100", self.interest_rate));
        }
        if self.loan_amount < Decimal::ZERO || self.monthly_repayment < Decimal::ZERO {
            return Err("loan_amount and monthly_repayment must not be negative".to_string());
        }
        check_ceiling(&[
            ("loan_amount", Some(self.loan_amount)),
            ("monthly_repayment", Some(self.monthly_repayment)),
        ])?;
        let start_date = parse_date(&self.start_date)
            .ok_or_else(|| format!("unreadable start_date '{}'", self.start_date))?;
        let end_date = parse_date(&self.end_date)
            .ok_or_else(|| format!("unreadable end_date '{}'", self.end_date))?;
        if end_date < start_date {
            return Err("end_date precedes start_date".to_string());
        }

        let warning = (self.emis_paid_on_time > u32::from(self.tenure)).then(|| {
            format!(
                "emis_paid_on_time {} exceeds tenure {}",
                self.emis_paid_on_time, self.tenure
            )
        });

        let loan = Loan {
            loan_id: LoanId(self.loan_id),
            customer_id: CustomerId(self.customer_id),
            loan_amount: self.loan_amount,
            tenure: self.tenure,
            interest_rate: self.interest_rate,
            monthly_repayment: self.monthly_repayment,
            emis_paid_on_time: self.emis_paid_on_time,
            start_date,
            end_date,
            status: LoanStatus::from_end_date(end_date, today),
        };
        Ok((loan, warning))
    }
}

fn check_ceiling(fields: &[(&str, Option<Decimal>)]) -> Result<(), String> {
    match fields
        .iter()
        .find(|(_, value)| value.is_some_and(|value| value > MAX_AMOUNT))
    {
        Some((field, _)) => Err(format!("{field} exceeds {MAX_AMOUNT}")),
        None => Ok(()),
    }
}

fn decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_decimal(&raw).map_err(serde::de::Error::custom)
}

fn optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_decimal(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

fn parse_decimal(raw: &str) -> Result<Decimal, String> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .map_err(|_| format!("invalid decimal '{raw}'"))
}

pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()
}
