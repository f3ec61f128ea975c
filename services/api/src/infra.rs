use credit_engine::lending::{
    same_amount, CreditScore, Customer, CustomerId, CustomerProfile, LendingStore, LoanDraft,
    LoanId, LoanRecord, LoanStatus, RepositoryError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct Tables {
    customers: BTreeMap<CustomerId, Customer>,
    loans: BTreeMap<LoanId, LoanRecord>,
    scores: BTreeMap<CustomerId, CreditScore>,
}

/// Process-local store backing the service binary.
///
/// A single mutex guards all three tables so id allocation, uniqueness
/// checks and inserts observe one consistent snapshot.
#[derive(Default, Clone)]
pub(crate) struct InMemoryLendingStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryLendingStore {
    fn lock(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
    }
}

impl Tables {
    fn phone_taken(&self, phone_number: &str) -> bool {
        self.customers
            .values()
            .any(|existing| existing.phone_number == phone_number)
    }

    fn next_customer_id(&self) -> CustomerId {
        CustomerId(self.customers.keys().next_back().map_or(0, |id| id.0) + 1)
    }

    fn next_loan_id(&self) -> LoanId {
        LoanId(self.loans.keys().next_back().map_or(0, |id| id.0) + 1)
    }
}

impl LendingStore for InMemoryLendingStore {
    fn customer(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        Ok(self.lock()?.customers.get(&id).cloned())
    }

    fn customer_by_phone(&self, phone_number: &str) -> Result<Option<Customer>, RepositoryError> {
        Ok(self
            .lock()?
            .customers
            .values()
            .find(|customer| customer.phone_number == phone_number)
            .cloned())
    }

    fn create_customer(&self, profile: CustomerProfile) -> Result<Customer, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.phone_taken(&profile.phone_number) {
            return Err(RepositoryError::Conflict);
        }
        let customer = profile.into_customer(guard.next_customer_id());
        guard.customers.insert(customer.customer_id, customer.clone());
        Ok(customer)
    }

    fn insert_customer(&self, customer: Customer) -> Result<Customer, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.phone_taken(&customer.phone_number)
            || guard.customers.contains_key(&customer.customer_id)
        {
            return Err(RepositoryError::Conflict);
        }
        guard.customers.insert(customer.customer_id, customer.clone());
        Ok(customer)
    }

    fn loans(
        &self,
        customer_id: CustomerId,
        statuses: Option<&[LoanStatus]>,
    ) -> Result<Vec<LoanRecord>, RepositoryError> {
        Ok(self
            .lock()?
            .loans
            .values()
            .filter(|loan| loan.customer_id == customer_id)
            .filter(|loan| statuses.map_or(true, |allowed| allowed.contains(&loan.status)))
            .cloned()
            .collect())
    }

    fn loan(&self, id: LoanId) -> Result<Option<LoanRecord>, RepositoryError> {
        Ok(self.lock()?.loans.get(&id).cloned())
    }

    fn find_loan(
        &self,
        customer_id: CustomerId,
        loan_amount: f64,
        tenure: u32,
        statuses: &[LoanStatus],
    ) -> Result<Option<LoanRecord>, RepositoryError> {
        Ok(self
            .lock()?
            .loans
            .values()
            .find(|loan| {
                loan.customer_id == customer_id
                    && loan.tenure == tenure
                    && same_amount(loan.loan_amount, loan_amount)
                    && statuses.contains(&loan.status)
            })
            .cloned())
    }

    fn create_loan(&self, draft: LoanDraft) -> Result<LoanRecord, RepositoryError> {
        let mut guard = self.lock()?;
        let record = draft.into_record(guard.next_loan_id());
        guard.loans.insert(record.loan_id, record.clone());
        Ok(record)
    }

    fn insert_loan(&self, record: LoanRecord) -> Result<LoanRecord, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.loans.contains_key(&record.loan_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.loans.insert(record.loan_id, record.clone());
        Ok(record)
    }

    fn update_loan(&self, record: LoanRecord) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        match guard.loans.get_mut(&record.loan_id) {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn credit_score(&self, customer_id: CustomerId) -> Result<Option<CreditScore>, RepositoryError> {
        Ok(self.lock()?.scores.get(&customer_id).copied())
    }

    fn create_credit_score_if_absent(
        &self,
        score: CreditScore,
    ) -> Result<CreditScore, RepositoryError> {
        let mut guard = self.lock()?;
        Ok(*guard.scores.entry(score.customer_id).or_insert(score))
    }
}
