//! Seed the store from customer and loan CSV exports.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer};
use tracing::{info, warn};

use super::domain::{Customer, CustomerId, LoanId, LoanRecord, LoanStatus};
use super::policy::CreditPolicy;
use super::repository::{LendingStore, RepositoryError};

/// Counts reported after a seed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub customers: usize,
    pub skipped_customers: usize,
    pub loans: usize,
    pub skipped_loans: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read seed export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid seed CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("could not store imported customer {customer_id}: {source}")]
    Customer {
        customer_id: CustomerId,
        source: RepositoryError,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub struct CsvSeedImporter<'a, S: ?Sized> {
    store: &'a S,
    policy: &'a CreditPolicy,
}

impl<'a, S> CsvSeedImporter<'a, S>
where
    S: LendingStore + ?Sized,
{
    pub fn new(store: &'a S, policy: &'a CreditPolicy) -> Self {
        Self { store, policy }
    }

    pub fn from_paths<P: AsRef<Path>>(
        &self,
        customers: P,
        loans: Option<P>,
    ) -> Result<ImportSummary, ImportError> {
        let (imported, skipped) = self.import_customers(std::fs::File::open(customers)?)?;
        let mut summary = ImportSummary {
            customers: imported,
            skipped_customers: skipped,
            ..ImportSummary::default()
        };

        if let Some(path) = loans {
            let (loans, skipped) = self.import_loans(std::fs::File::open(path)?)?;
            summary.loans = loans;
            summary.skipped_loans = skipped;
        }

        info!(
            customers = summary.customers,
            skipped_customers = summary.skipped_customers,
            loans = summary.loans,
            skipped = summary.skipped_loans,
            "seed import finished"
        );
        Ok(summary)
    }

    /// Insert customer rows, deriving missing approved limits. Returns
    /// (imported, skipped).
    ///
    /// Rows without a positive salary or age are skipped, so their loans are
    /// later skipped as belonging to unknown customers.
    pub fn import_customers<R: Read>(&self, reader: R) -> Result<(usize, usize), ImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut imported = 0;
        let mut skipped = 0;

        for row in csv_reader.deserialize::<CustomerRow>() {
            let row = row?;
            let customer_id = CustomerId(row.customer_id);

            if !row.monthly_salary.is_finite() || row.monthly_salary <= 0.0 || row.age == 0 {
                warn!(
                    customer_id = %customer_id,
                    monthly_salary = row.monthly_salary,
                    age = row.age,
                    "skipping customer without positive salary and age"
                );
                skipped += 1;
                continue;
            }
            let approved_limit = row
                .approved_limit
                .unwrap_or_else(|| self.policy.approved_limit(row.monthly_salary));

            self.store
                .insert_customer(Customer {
                    customer_id,
                    first_name: row.first_name,
                    last_name: row.last_name,
                    age: row.age,
                    phone_number: row.phone_number,
                    monthly_income: row.monthly_salary,
                    approved_limit,
                })
                .map_err(|source| ImportError::Customer {
                    customer_id,
                    source,
                })?;
            imported += 1;
        }

        Ok((imported, skipped))
    }

    /// Insert loan rows as approved loans. Returns (imported, skipped).
    ///
    /// Repeated loan ids, non-positive amounts or tenures, unparseable dates,
    /// unknown customers and rows the store refuses are skipped rather than
    /// aborting the run.
    pub fn import_loans<R: Read>(&self, reader: R) -> Result<(usize, usize), ImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut seen = HashSet::new();
        let mut imported = 0;
        let mut skipped = 0;

        for row in csv_reader.deserialize::<LoanRow>() {
            let row = row?;

            if !seen.insert(row.loan_id) {
                warn!(loan_id = row.loan_id, "skipping duplicate loan id");
                skipped += 1;
                continue;
            }

            if row.tenure == 0
                || !row.loan_amount.is_finite()
                || row.loan_amount <= 0.0
                || !row.interest_rate.is_finite()
                || row.interest_rate < 0.0
            {
                warn!(
                    loan_id = row.loan_id,
                    loan_amount = row.loan_amount,
                    tenure = row.tenure,
                    "skipping loan with non-positive terms"
                );
                skipped += 1;
                continue;
            }

            let (Some(start_date), Some(end_date)) = (
                row.date_of_approval.as_deref().and_then(parse_date),
                row.end_date.as_deref().and_then(parse_date),
            ) else {
                warn!(loan_id = row.loan_id, "skipping loan with invalid dates");
                skipped += 1;
                continue;
            };

            let customer_id = CustomerId(row.customer_id);
            if self.store.customer(customer_id)?.is_none() {
                warn!(
                    loan_id = row.loan_id,
                    customer_id = %customer_id,
                    "skipping loan for unknown customer"
                );
                skipped += 1;
                continue;
            }

            let record = LoanRecord {
                loan_id: LoanId(row.loan_id),
                customer_id,
                loan_amount: row.loan_amount,
                interest_rate: row.interest_rate,
                tenure: row.tenure,
                monthly_payment: row.monthly_payment,
                emis_paid_on_time: row.emis_paid_on_time.min(row.tenure),
                start_date,
                end_date,
                status: LoanStatus::Approved,
            };

            match self.store.insert_loan(record) {
                Ok(_) => imported += 1,
                Err(RepositoryError::Conflict) => {
                    warn!(loan_id = row.loan_id, "skipping loan already in store");
                    skipped += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }

        Ok((imported, skipped))
    }
}

#[derive(Debug, Deserialize)]
struct CustomerRow {
    #[serde(rename = "Customer ID")]
    customer_id: u64,
    #[serde(rename = "First Name")]
    first_name: String,
    #[serde(rename = "Last Name")]
    last_name: String,
    #[serde(rename = "Age")]
    age: u32,
    #[serde(rename = "Phone Number")]
    phone_number: String,
    #[serde(rename = "Monthly Salary")]
    monthly_salary: f64,
    #[serde(rename = "Approved Limit", default)]
    approved_limit: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct LoanRow {
    #[serde(rename = "Customer ID")]
    customer_id: u64,
    #[serde(rename = "Loan ID")]
    loan_id: u64,
    #[serde(rename = "Loan Amount")]
    loan_amount: f64,
    #[serde(rename = "Tenure")]
    tenure: u32,
    #[serde(rename = "Interest Rate")]
    interest_rate: f64,
    #[serde(rename = "Monthly payment")]
    monthly_payment: f64,
    #[serde(rename = "EMIs paid on Time")]
    emis_paid_on_time: u32,
    #[serde(
        rename = "Date of Approval",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    date_of_approval: Option<String>,
    #[serde(rename = "End Date", default, deserialize_with = "empty_string_as_none")]
    end_date: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.date_naive())
}
