use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for registered customers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub u64);

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier wrapper for loan records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanId(pub u64);

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registered borrower as held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub phone_number: String,
    pub monthly_income: f64,
    pub approved_limit: f64,
}

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Registration payload before an identifier and limit are assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub phone_number: String,
    pub monthly_income: f64,
}

impl NewCustomer {
    pub fn validate(&self) -> Result<(), InputError> {
        if self.first_name.trim().is_empty() {
            return Err(InputError::MissingField("first_name"));
        }
        if self.last_name.trim().is_empty() {
            return Err(InputError::MissingField("last_name"));
        }
        if self.phone_number.trim().is_empty() {
            return Err(InputError::MissingField("phone_number"));
        }
        if self.age == 0 {
            return Err(InputError::NonPositiveAge);
        }
        if !self.monthly_income.is_finite() || self.monthly_income <= 0.0 {
            return Err(InputError::NonPositiveIncome(self.monthly_income));
        }
        Ok(())
    }
}

/// Validated customer awaiting an identifier from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerProfile {
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub phone_number: String,
    pub monthly_income: f64,
    pub approved_limit: f64,
}

impl CustomerProfile {
    pub fn into_customer(self, customer_id: CustomerId) -> Customer {
        Customer {
            customer_id,
            first_name: self.first_name,
            last_name: self.last_name,
            age: self.age,
            phone_number: self.phone_number,
            monthly_income: self.monthly_income,
            approved_limit: self.approved_limit,
        }
    }
}

/// Lifecycle status of a loan record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanStatus {
    Pending,
    Approved,
    Rejected,
    Active,
    Paid,
}

impl LoanStatus {
    /// Statuses whose installments count against the borrower's income.
    pub const OUTSTANDING: [LoanStatus; 2] = [LoanStatus::Approved, LoanStatus::Active];

    /// Statuses that block a second identical application.
    pub const OPEN: [LoanStatus; 3] = [
        LoanStatus::Pending,
        LoanStatus::Approved,
        LoanStatus::Active,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            LoanStatus::Pending => "PENDING",
            LoanStatus::Approved => "APPROVED",
            LoanStatus::Rejected => "REJECTED",
            LoanStatus::Active => "ACTIVE",
            LoanStatus::Paid => "PAID",
        }
    }

    pub const fn is_outstanding(self) -> bool {
        matches!(self, LoanStatus::Approved | LoanStatus::Active)
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, LoanStatus::Rejected | LoanStatus::Paid)
    }

    pub const fn can_transition_to(self, next: LoanStatus) -> bool {
        matches!(
            (self, next),
            (LoanStatus::Pending, LoanStatus::Approved)
                | (LoanStatus::Pending, LoanStatus::Rejected)
                | (LoanStatus::Approved, LoanStatus::Active)
                | (LoanStatus::Active, LoanStatus::Paid)
        )
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Historical or newly created loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecord {
    pub loan_id: LoanId,
    pub customer_id: CustomerId,
    pub loan_amount: f64,
    pub interest_rate: f64,
    pub tenure: u32,
    pub monthly_payment: f64,
    pub emis_paid_on_time: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: LoanStatus,
}

/// Decided loan awaiting an identifier from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct LoanDraft {
    pub customer_id: CustomerId,
    pub loan_amount: f64,
    pub interest_rate: f64,
    pub tenure: u32,
    pub monthly_payment: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: LoanStatus,
}

impl LoanDraft {
    pub fn into_record(self, loan_id: LoanId) -> LoanRecord {
        LoanRecord {
            loan_id,
            customer_id: self.customer_id,
            loan_amount: self.loan_amount,
            interest_rate: self.interest_rate,
            tenure: self.tenure,
            monthly_payment: self.monthly_payment,
            emis_paid_on_time: 0,
            start_date: self.start_date,
            end_date: self.end_date,
            status: self.status,
        }
    }
}

/// Cached creditworthiness score, one per customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditScore {
    pub customer_id: CustomerId,
    pub score: u8,
}

/// Decision returned by an eligibility check. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityVerdict {
    pub customer_id: CustomerId,
    pub credit_score: u8,
    pub approval: bool,
    pub approval_probability: u8,
    pub interest_rate: f64,
    pub corrected_interest_rate: f64,
    pub tenure: u32,
    pub monthly_payment: f64,
}

/// Rejected numeric or textual input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("principal must be a positive amount (got {0})")]
    NonPositivePrincipal(f64),
    #[error("tenure must be at least one month")]
    NonPositiveTenure,
    #[error("interest rate must not be negative (got {0})")]
    NegativeRate(f64),
    #[error("monthly income must be a positive amount (got {0})")]
    NonPositiveIncome(f64),
    #[error("age must be a positive number")]
    NonPositiveAge,
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("`{0}` must be a number")]
    NotANumber(&'static str),
    #[error("`{0}` must be a whole number")]
    NotAWholeNumber(&'static str),
    #[error("`{0}` must be a positive number")]
    NonPositiveId(&'static str),
    #[error("`{0}` is out of range")]
    OutOfRange(&'static str),
    #[error("installment is not representable for these terms")]
    UnrepresentableInstallment,
}
