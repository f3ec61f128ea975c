use super::domain::{
    CreditScore, Customer, CustomerId, CustomerProfile, LoanDraft, LoanId, LoanRecord, LoanStatus,
};

/// Storage abstraction so the credit service can be exercised in isolation.
///
/// Implementations own uniqueness: customer ids, loan ids and phone numbers
/// are unique, and a customer has at most one credit score. The `create_*`
/// methods allocate the next id and insert in one atomic step; the `insert_*`
/// methods keep caller-supplied ids (seed data).
pub trait LendingStore: Send + Sync {
    fn customer(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError>;
    fn customer_by_phone(&self, phone_number: &str) -> Result<Option<Customer>, RepositoryError>;
    /// Fails with `Conflict` when the phone number is already registered.
    fn create_customer(&self, profile: CustomerProfile) -> Result<Customer, RepositoryError>;
    fn insert_customer(&self, customer: Customer) -> Result<Customer, RepositoryError>;

    /// Loans for a customer in insertion order, optionally restricted to `statuses`.
    fn loans(
        &self,
        customer_id: CustomerId,
        statuses: Option<&[LoanStatus]>,
    ) -> Result<Vec<LoanRecord>, RepositoryError>;
    fn loan(&self, id: LoanId) -> Result<Option<LoanRecord>, RepositoryError>;
    fn find_loan(
        &self,
        customer_id: CustomerId,
        loan_amount: f64,
        tenure: u32,
        statuses: &[LoanStatus],
    ) -> Result<Option<LoanRecord>, RepositoryError>;
    fn create_loan(&self, draft: LoanDraft) -> Result<LoanRecord, RepositoryError>;
    fn insert_loan(&self, record: LoanRecord) -> Result<LoanRecord, RepositoryError>;
    fn update_loan(&self, record: LoanRecord) -> Result<(), RepositoryError>;

    fn credit_score(&self, customer_id: CustomerId) -> Result<Option<CreditScore>, RepositoryError>;

    /// Store `score` unless one already exists, returning whichever is stored.
    fn create_credit_score_if_absent(
        &self,
        score: CreditScore,
    ) -> Result<CreditScore, RepositoryError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Amounts are compared at cent precision.
pub fn same_amount(left: f64, right: f64) -> bool {
    (left * 100.0).round() == (right * 100.0).round()
}
