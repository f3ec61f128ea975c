use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use super::amortization::loan_end_date;
use super::domain::{
    CreditScore, Customer, CustomerId, CustomerProfile, EligibilityVerdict, InputError, LoanDraft,
    LoanId, LoanRecord, LoanStatus, NewCustomer,
};
use super::eligibility::{evaluate, LoanRequest};
use super::policy::{CreditPolicy, Exposure};
use super::repository::{LendingStore, RepositoryError};
use super::scoring::estimate_credit_score;

/// Stateless decision service over an injected store.
pub struct CreditService<S> {
    store: Arc<S>,
    policy: CreditPolicy,
}

impl<S> CreditService<S>
where
    S: LendingStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self::with_policy(store, CreditPolicy::default())
    }

    pub fn with_policy(store: Arc<S>, policy: CreditPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &CreditPolicy {
        &self.policy
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Register a customer, deriving the approved limit from income.
    pub fn register_customer(&self, draft: NewCustomer) -> Result<Customer, CreditServiceError> {
        draft.validate()?;

        let phone_number = draft.phone_number.trim().to_string();
        if self.store.customer_by_phone(&phone_number)?.is_some() {
            return Err(CreditServiceError::DuplicatePhoneNumber);
        }

        let profile = CustomerProfile {
            first_name: draft.first_name.trim().to_string(),
            last_name: draft.last_name.trim().to_string(),
            age: draft.age,
            phone_number,
            approved_limit: self.policy.approved_limit(draft.monthly_income),
            monthly_income: draft.monthly_income,
        };

        let stored = match self.store.create_customer(profile) {
            Ok(stored) => stored,
            Err(RepositoryError::Conflict) => return Err(CreditServiceError::DuplicatePhoneNumber),
            Err(err) => return Err(err.into()),
        };
        info!(
            customer_id = %stored.customer_id,
            approved_limit = stored.approved_limit,
            "customer registered"
        );
        Ok(stored)
    }

    pub fn get_customer(&self, customer_id: CustomerId) -> Result<Customer, CreditServiceError> {
        self.store
            .customer(customer_id)?
            .ok_or(CreditServiceError::CustomerNotFound(customer_id))
    }

    /// Cached score for a customer, computing and storing it on first use.
    ///
    /// The cached value is never refreshed once stored.
    pub fn credit_score(&self, customer_id: CustomerId) -> Result<CreditScore, CreditServiceError> {
        let customer = self.get_customer(customer_id)?;
        self.score_for(&customer)
    }

    fn score_for(&self, customer: &Customer) -> Result<CreditScore, CreditServiceError> {
        if let Some(cached) = self.store.credit_score(customer.customer_id)? {
            debug!(
                customer_id = %customer.customer_id,
                score = cached.score,
                "credit score cache hit"
            );
            return Ok(cached);
        }

        let history = self.store.loans(customer.customer_id, None)?;
        let breakdown = estimate_credit_score(customer.monthly_income, &history);
        let computed = CreditScore {
            customer_id: customer.customer_id,
            score: breakdown.score,
        };

        let stored = self.store.create_credit_score_if_absent(computed)?;
        if stored.score != computed.score {
            warn!(
                customer_id = %customer.customer_id,
                computed = computed.score,
                stored = stored.score,
                "concurrent score creation, keeping stored value"
            );
        }
        info!(
            customer_id = %customer.customer_id,
            score = stored.score,
            loans = history.len(),
            "credit score computed"
        );
        Ok(stored)
    }

    /// Decide whether a requested loan would be approved and at what price.
    pub fn check_eligibility(
        &self,
        customer_id: CustomerId,
        loan_amount: f64,
        tenure: u32,
    ) -> Result<EligibilityVerdict, CreditServiceError> {
        let customer = self.get_customer(customer_id)?;
        let score = self.score_for(&customer)?;

        let current_emis: f64 = self
            .store
            .loans(customer_id, Some(&LoanStatus::OUTSTANDING[..]))?
            .iter()
            .map(|loan| loan.monthly_payment)
            .sum();

        let exposure = Exposure {
            monthly_income: customer.monthly_income,
            approved_limit: customer.approved_limit,
            current_emis,
        };
        let request = LoanRequest {
            loan_amount,
            tenure,
        };

        let verdict = evaluate(&self.policy, customer_id, score.score, &exposure, request)?;
        info!(
            customer_id = %customer_id,
            loan_amount,
            tenure,
            score = verdict.credit_score,
            probability = verdict.approval_probability,
            approval = verdict.approval,
            "eligibility checked"
        );
        Ok(verdict)
    }

    /// Create a loan dated today.
    pub fn create_loan(
        &self,
        customer_id: CustomerId,
        loan_amount: f64,
        tenure: u32,
    ) -> Result<LoanRecord, CreditServiceError> {
        self.create_loan_on(customer_id, loan_amount, tenure, Utc::now().date_naive())
    }

    /// Decide and persist a loan application starting on `start_date`.
    pub fn create_loan_on(
        &self,
        customer_id: CustomerId,
        loan_amount: f64,
        tenure: u32,
        start_date: NaiveDate,
    ) -> Result<LoanRecord, CreditServiceError> {
        self.get_customer(customer_id)?;

        if let Some(existing) =
            self.store
                .find_loan(customer_id, loan_amount, tenure, &LoanStatus::OPEN)?
        {
            warn!(
                customer_id = %customer_id,
                loan_id = %existing.loan_id,
                "duplicate loan application"
            );
            return Err(CreditServiceError::DuplicateApplication {
                customer_id,
                existing: existing.loan_id,
            });
        }

        let verdict = self.check_eligibility(customer_id, loan_amount, tenure)?;
        let status = if verdict.approval {
            LoanStatus::Approved
        } else {
            LoanStatus::Rejected
        };

        let draft = LoanDraft {
            customer_id,
            loan_amount,
            interest_rate: verdict.interest_rate,
            tenure,
            monthly_payment: verdict.monthly_payment,
            start_date,
            end_date: loan_end_date(start_date, tenure),
            status,
        };

        let stored = self.store.create_loan(draft)?;
        info!(
            loan_id = %stored.loan_id,
            customer_id = %customer_id,
            status = %stored.status,
            "loan created"
        );
        Ok(stored)
    }

    /// Loan together with the customer who holds it.
    pub fn get_loan(&self, loan_id: LoanId) -> Result<(LoanRecord, Customer), CreditServiceError> {
        let loan = self
            .store
            .loan(loan_id)?
            .ok_or(CreditServiceError::LoanNotFound(loan_id))?;
        let customer = self.get_customer(loan.customer_id)?;
        Ok((loan, customer))
    }

    /// All loans for a customer, newest first.
    pub fn customer_loans(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<LoanRecord>, CreditServiceError> {
        self.get_customer(customer_id)?;
        let mut loans = self.store.loans(customer_id, None)?;
        loans.sort_by(|a, b| {
            b.start_date
                .cmp(&a.start_date)
                .then_with(|| b.loan_id.cmp(&a.loan_id))
        });
        Ok(loans)
    }

    /// Move a loan along its lifecycle.
    pub fn update_loan_status(
        &self,
        loan_id: LoanId,
        next: LoanStatus,
    ) -> Result<LoanRecord, CreditServiceError> {
        let mut loan = self
            .store
            .loan(loan_id)?
            .ok_or(CreditServiceError::LoanNotFound(loan_id))?;

        if !loan.status.can_transition_to(next) {
            return Err(CreditServiceError::InvalidTransition {
                loan_id,
                from: loan.status,
                to: next,
            });
        }

        let previous = loan.status;
        loan.status = next;
        self.store.update_loan(loan.clone())?;
        info!(loan_id = %loan_id, from = %previous, to = %next, "loan status updated");
        Ok(loan)
    }
}

/// Coarse classification used by transports to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    InvalidInput,
    Unavailable,
}

/// Error raised by the credit service.
#[derive(Debug, thiserror::Error)]
pub enum CreditServiceError {
    #[error("customer {0} not found")]
    CustomerNotFound(CustomerId),
    #[error("loan {0} not found")]
    LoanNotFound(LoanId),
    #[error("similar loan application already exists for customer {customer_id} (loan {existing})")]
    DuplicateApplication {
        customer_id: CustomerId,
        existing: LoanId,
    },
    #[error("phone number already registered")]
    DuplicatePhoneNumber,
    #[error(transparent)]
    InvalidInput(#[from] InputError),
    #[error("loan {loan_id} cannot move from {from} to {to}")]
    InvalidTransition {
        loan_id: LoanId,
        from: LoanStatus,
        to: LoanStatus,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl CreditServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CreditServiceError::CustomerNotFound(_)
            | CreditServiceError::LoanNotFound(_)
            | CreditServiceError::Repository(RepositoryError::NotFound) => ErrorKind::NotFound,
            CreditServiceError::DuplicateApplication { .. }
            | CreditServiceError::DuplicatePhoneNumber
            | CreditServiceError::InvalidTransition { .. }
            | CreditServiceError::Repository(RepositoryError::Conflict) => ErrorKind::Conflict,
            CreditServiceError::InvalidInput(_) => ErrorKind::InvalidInput,
            CreditServiceError::Repository(RepositoryError::Unavailable(_)) => {
                ErrorKind::Unavailable
            }
        }
    }
}
