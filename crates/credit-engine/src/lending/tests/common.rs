use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::lending::domain::{
    CreditScore, Customer, CustomerId, CustomerProfile, LoanDraft, LoanId, LoanRecord, LoanStatus,
    NewCustomer,
};
use crate::lending::repository::{same_amount, LendingStore, RepositoryError};
use crate::lending::{lending_router, CreditService};

#[derive(Default)]
struct MemoryState {
    customers: BTreeMap<CustomerId, Customer>,
    loans: BTreeMap<LoanId, LoanRecord>,
    scores: BTreeMap<CustomerId, CreditScore>,
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub(super) fn loan_count(&self) -> usize {
        self.state.lock().expect("store mutex poisoned").loans.len()
    }

    pub(super) fn customer_count(&self) -> usize {
        self.state.lock().expect("store mutex poisoned").customers.len()
    }

    pub(super) fn seed_customer(&self, customer: Customer) {
        self.insert_customer(customer).expect("seed customer");
    }

    pub(super) fn seed_loan(&self, loan: LoanRecord) {
        self.insert_loan(loan).expect("seed loan");
    }

    pub(super) fn seed_score(&self, customer_id: CustomerId, score: u8) {
        self.create_credit_score_if_absent(CreditScore { customer_id, score })
            .expect("seed score");
    }
}

impl LendingStore for MemoryStore {
    fn customer(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let guard = self.state.lock().expect("store mutex poisoned");
        Ok(guard.customers.get(&id).cloned())
    }

    fn customer_by_phone(&self, phone_number: &str) -> Result<Option<Customer>, RepositoryError> {
        let guard = self.state.lock().expect("store mutex poisoned");
        Ok(guard
            .customers
            .values()
            .find(|customer| customer.phone_number == phone_number)
            .cloned())
    }

    fn create_customer(&self, profile: CustomerProfile) -> Result<Customer, RepositoryError> {
        let mut guard = self.state.lock().expect("store mutex poisoned");
        if guard
            .customers
            .values()
            .any(|existing| existing.phone_number == profile.phone_number)
        {
            return Err(RepositoryError::Conflict);
        }
        let last = guard.customers.keys().next_back().map_or(0, |id| id.0);
        let customer = profile.into_customer(CustomerId(last + 1));
        guard.customers.insert(customer.customer_id, customer.clone());
        Ok(customer)
    }

    fn insert_customer(&self, customer: Customer) -> Result<Customer, RepositoryError> {
        let mut guard = self.state.lock().expect("store mutex poisoned");
        if guard.customers.contains_key(&customer.customer_id)
            || guard
                .customers
                .values()
                .any(|existing| existing.phone_number == customer.phone_number)
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
        let guard = self.state.lock().expect("store mutex poisoned");
        Ok(guard
            .loans
            .values()
            .filter(|loan| loan.customer_id == customer_id)
            .filter(|loan| statuses.map_or(true, |allowed| allowed.contains(&loan.status)))
            .cloned()
            .collect())
    }

    fn loan(&self, id: LoanId) -> Result<Option<LoanRecord>, RepositoryError> {
        let guard = self.state.lock().expect("store mutex poisoned");
        Ok(guard.loans.get(&id).cloned())
    }

    fn find_loan(
        &self,
        customer_id: CustomerId,
        loan_amount: f64,
        tenure: u32,
        statuses: &[LoanStatus],
    ) -> Result<Option<LoanRecord>, RepositoryError> {
        let guard = self.state.lock().expect("store mutex poisoned");
        Ok(guard
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
        let mut guard = self.state.lock().expect("store mutex poisoned");
        let last = guard.loans.keys().next_back().map_or(0, |id| id.0);
        let record = draft.into_record(LoanId(last + 1));
        guard.loans.insert(record.loan_id, record.clone());
        Ok(record)
    }

    fn insert_loan(&self, record: LoanRecord) -> Result<LoanRecord, RepositoryError> {
        let mut guard = self.state.lock().expect("store mutex poisoned");
        if guard.loans.contains_key(&record.loan_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.loans.insert(record.loan_id, record.clone());
        Ok(record)
    }

    fn update_loan(&self, record: LoanRecord) -> Result<(), RepositoryError> {
        let mut guard = self.state.lock().expect("store mutex poisoned");
        match guard.loans.get_mut(&record.loan_id) {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn credit_score(&self, customer_id: CustomerId) -> Result<Option<CreditScore>, RepositoryError> {
        let guard = self.state.lock().expect("store mutex poisoned");
        Ok(guard.scores.get(&customer_id).copied())
    }

    fn create_credit_score_if_absent(
        &self,
        score: CreditScore,
    ) -> Result<CreditScore, RepositoryError> {
        let mut guard = self.state.lock().expect("store mutex poisoned");
        Ok(*guard.scores.entry(score.customer_id).or_insert(score))
    }
}

/// Store that reports no score, then loses the race to a concurrent writer.
pub(super) struct RacingStore {
    pub(super) inner: MemoryStore,
    pub(super) winner: u8,
}

impl LendingStore for RacingStore {
    fn customer(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        self.inner.customer(id)
    }

    fn customer_by_phone(&self, phone_number: &str) -> Result<Option<Customer>, RepositoryError> {
        self.inner.customer_by_phone(phone_number)
    }

    fn create_customer(&self, profile: CustomerProfile) -> Result<Customer, RepositoryError> {
        self.inner.create_customer(profile)
    }

    fn insert_customer(&self, customer: Customer) -> Result<Customer, RepositoryError> {
        self.inner.insert_customer(customer)
    }

    fn loans(
        &self,
        customer_id: CustomerId,
        statuses: Option<&[LoanStatus]>,
    ) -> Result<Vec<LoanRecord>, RepositoryError> {
        self.inner.loans(customer_id, statuses)
    }

    fn loan(&self, id: LoanId) -> Result<Option<LoanRecord>, RepositoryError> {
        self.inner.loan(id)
    }

    fn find_loan(
        &self,
        customer_id: CustomerId,
        loan_amount: f64,
        tenure: u32,
        statuses: &[LoanStatus],
    ) -> Result<Option<LoanRecord>, RepositoryError> {
        self.inner.find_loan(customer_id, loan_amount, tenure, statuses)
    }

    fn create_loan(&self, draft: LoanDraft) -> Result<LoanRecord, RepositoryError> {
        self.inner.create_loan(draft)
    }

    fn insert_loan(&self, record: LoanRecord) -> Result<LoanRecord, RepositoryError> {
        self.inner.insert_loan(record)
    }

    fn update_loan(&self, record: LoanRecord) -> Result<(), RepositoryError> {
        self.inner.update_loan(record)
    }

    fn credit_score(&self, _customer_id: CustomerId) -> Result<Option<CreditScore>, RepositoryError> {
        Ok(None)
    }

    fn create_credit_score_if_absent(
        &self,
        score: CreditScore,
    ) -> Result<CreditScore, RepositoryError> {
        self.inner.create_credit_score_if_absent(CreditScore {
            customer_id: score.customer_id,
            score: self.winner,
        })
    }
}

pub(super) struct UnavailableStore;

impl LendingStore for UnavailableStore {
    fn customer(&self, _id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        Err(offline())
    }

    fn customer_by_phone(&self, _phone: &str) -> Result<Option<Customer>, RepositoryError> {
        Err(offline())
    }

    fn create_customer(&self, _profile: CustomerProfile) -> Result<Customer, RepositoryError> {
        Err(offline())
    }

    fn insert_customer(&self, _customer: Customer) -> Result<Customer, RepositoryError> {
        Err(offline())
    }

    fn loans(
        &self,
        _customer_id: CustomerId,
        _statuses: Option<&[LoanStatus]>,
    ) -> Result<Vec<LoanRecord>, RepositoryError> {
        Err(offline())
    }

    fn loan(&self, _id: LoanId) -> Result<Option<LoanRecord>, RepositoryError> {
        Err(offline())
    }

    fn find_loan(
        &self,
        _customer_id: CustomerId,
        _loan_amount: f64,
        _tenure: u32,
        _statuses: &[LoanStatus],
    ) -> Result<Option<LoanRecord>, RepositoryError> {
        Err(offline())
    }

    fn create_loan(&self, _draft: LoanDraft) -> Result<LoanRecord, RepositoryError> {
        Err(offline())
    }

    fn insert_loan(&self, _record: LoanRecord) -> Result<LoanRecord, RepositoryError> {
        Err(offline())
    }

    fn update_loan(&self, _record: LoanRecord) -> Result<(), RepositoryError> {
        Err(offline())
    }

    fn credit_score(&self, _customer_id: CustomerId) -> Result<Option<CreditScore>, RepositoryError> {
        Err(offline())
    }

    fn create_credit_score_if_absent(
        &self,
        _score: CreditScore,
    ) -> Result<CreditScore, RepositoryError> {
        Err(offline())
    }
}

fn offline() -> RepositoryError {
    RepositoryError::Unavailable("database offline".to_string())
}

pub(super) fn customer(id: u64, monthly_income: f64, approved_limit: f64) -> Customer {
    Customer {
        customer_id: CustomerId(id),
        first_name: "Asha".to_string(),
        last_name: "Verma".to_string(),
        age: 34,
        phone_number: format!("98765{id:05}"),
        monthly_income,
        approved_limit,
    }
}

pub(super) fn new_customer(phone_number: &str) -> NewCustomer {
    NewCustomer {
        first_name: "Ravi".to_string(),
        last_name: "Kumar".to_string(),
        age: 41,
        phone_number: phone_number.to_string(),
        monthly_income: 50_000.0,
    }
}

pub(super) fn loan(
    id: u64,
    customer_id: u64,
    status: LoanStatus,
    monthly_payment: f64,
) -> LoanRecord {
    LoanRecord {
        loan_id: LoanId(id),
        customer_id: CustomerId(customer_id),
        loan_amount: 120_000.0,
        interest_rate: 8.0,
        tenure: 24,
        monthly_payment,
        emis_paid_on_time: 24,
        start_date: date(2023, 1, 10),
        end_date: date(2025, 1, 10),
        status,
    }
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn build_service() -> (Arc<CreditService<MemoryStore>>, MemoryStore) {
    let store = MemoryStore::default();
    let service = Arc::new(CreditService::new(Arc::new(store.clone())));
    (service, store)
}

pub(super) fn router_with_service(service: Arc<CreditService<MemoryStore>>) -> axum::Router {
    lending_router(service)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
