use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::domain::{
    Customer, CustomerId, InputError, LoanId, LoanRecord, LoanStatus, NewCustomer,
};
use super::repository::LendingStore;
use super::service::CreditService;
use crate::error::AppError;

/// Router builder exposing registration, eligibility and loan endpoints.
pub fn lending_router<S>(service: Arc<CreditService<S>>) -> Router
where
    S: LendingStore + 'static,
{
    Router::new()
        .route("/api/customers/register", post(register_handler::<S>))
        .route("/api/customers/:customer_id", get(customer_handler::<S>))
        .route(
            "/api/loans/check-eligibility",
            post(check_eligibility_handler::<S>),
        )
        .route("/api/loans/create", post(create_loan_handler::<S>))
        .route("/api/loans/:loan_id", get(loan_handler::<S>))
        .route(
            "/api/loans/customer/:customer_id",
            get(customer_loans_handler::<S>),
        )
        .with_state(service)
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RegisterRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<Value>,
    pub phone_number: Option<String>,
    pub monthly_income: Option<Value>,
}

impl RegisterRequest {
    fn into_new_customer(self) -> Result<NewCustomer, InputError> {
        let first_name = self.first_name.ok_or(InputError::MissingField("first_name"))?;
        let last_name = self.last_name.ok_or(InputError::MissingField("last_name"))?;
        let age = whole_number(self.age, "age")?;
        if age <= 0.0 {
            return Err(InputError::NonPositiveAge);
        }
        let phone_number = self
            .phone_number
            .ok_or(InputError::MissingField("phone_number"))?;
        let monthly_income = number(self.monthly_income, "monthly_income")?;

        Ok(NewCustomer {
            first_name,
            last_name,
            age: bounded(age, "age")?,
            phone_number,
            monthly_income,
        })
    }
}

/// Reads a JSON number or a numeric string.
fn number(value: Option<Value>, field: &'static str) -> Result<f64, InputError> {
    let value = value
        .filter(|value| !value.is_null())
        .ok_or(InputError::MissingField(field))?;
    let parsed = match &value {
        Value::Number(raw) => raw.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|parsed| parsed.is_finite())
        .ok_or(InputError::NotANumber(field))
}

fn whole_number(value: Option<Value>, field: &'static str) -> Result<f64, InputError> {
    let parsed = number(value, field)?;
    if parsed.fract() != 0.0 {
        return Err(InputError::NotAWholeNumber(field));
    }
    Ok(parsed)
}

/// Narrows a positive whole number into an integer field.
fn bounded<T: TryFrom<u64>>(value: f64, field: &'static str) -> Result<T, InputError> {
    if value > u64::MAX as f64 {
        return Err(InputError::OutOfRange(field));
    }
    T::try_from(value as u64).map_err(|_| InputError::OutOfRange(field))
}

fn path_id(raw: u64, field: &'static str) -> Result<u64, InputError> {
    if raw == 0 {
        return Err(InputError::NonPositiveId(field));
    }
    Ok(raw)
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisteredCustomerView {
    pub customer_id: CustomerId,
    pub name: String,
    pub age: u32,
    pub phone_number: String,
    pub monthly_income: f64,
    pub approved_limit: f64,
}

impl From<&Customer> for RegisteredCustomerView {
    fn from(customer: &Customer) -> Self {
        Self {
            customer_id: customer.customer_id,
            name: customer.full_name(),
            age: customer.age,
            phone_number: customer.phone_number.clone(),
            monthly_income: customer.monthly_income,
            approved_limit: customer.approved_limit,
        }
    }
}

/// Requested loan terms shared by the eligibility and creation endpoints.
///
/// Numeric fields accept JSON numbers or numeric strings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoanTermsRequest {
    pub customer_id: Option<Value>,
    pub loan_amount: Option<Value>,
    pub interest_rate: Option<Value>,
    pub tenure: Option<Value>,
}

struct LoanTerms {
    customer_id: CustomerId,
    loan_amount: f64,
    interest_rate: Option<f64>,
    tenure: u32,
}

impl LoanTermsRequest {
    fn validate(self, require_rate: bool) -> Result<LoanTerms, InputError> {
        let customer_id = whole_number(self.customer_id, "customer_id")?;
        if customer_id <= 0.0 {
            return Err(InputError::NonPositiveId("customer_id"));
        }
        let loan_amount = number(self.loan_amount, "loan_amount")?;
        let tenure = whole_number(self.tenure, "tenure")?;

        let interest_rate = match self.interest_rate.filter(|value| !value.is_null()) {
            Some(value) => Some(number(Some(value), "interest_rate")?),
            None if require_rate => return Err(InputError::MissingField("interest_rate")),
            None => None,
        };

        if loan_amount <= 0.0 {
            return Err(InputError::NonPositivePrincipal(loan_amount));
        }
        if tenure <= 0.0 {
            return Err(InputError::NonPositiveTenure);
        }
        if let Some(rate) = interest_rate {
            if rate <= 0.0 {
                return Err(InputError::NegativeRate(rate));
            }
        }

        Ok(LoanTerms {
            customer_id: CustomerId(bounded(customer_id, "customer_id")?),
            loan_amount,
            interest_rate,
            tenure: bounded(tenure, "tenure")?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EligibilityView {
    pub customer_id: CustomerId,
    pub approval: bool,
    pub interest_rate: f64,
    pub corrected_interest_rate: f64,
    pub tenure: u32,
    pub monthly_installment: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedLoanView {
    pub loan_id: LoanId,
    pub customer_id: CustomerId,
    pub loan_amount: f64,
    pub interest_rate: f64,
    pub monthly_payment: f64,
    pub tenure: u32,
    pub status: LoanStatus,
}

impl From<&LoanRecord> for CreatedLoanView {
    fn from(loan: &LoanRecord) -> Self {
        Self {
            loan_id: loan.loan_id,
            customer_id: loan.customer_id,
            loan_amount: loan.loan_amount,
            interest_rate: loan.interest_rate,
            monthly_payment: loan.monthly_payment,
            tenure: loan.tenure,
            status: loan.status,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoanCustomerView {
    pub id: CustomerId,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoanDetailView {
    pub loan_id: LoanId,
    pub customer: LoanCustomerView,
    pub loan_amount: f64,
    pub interest_rate: f64,
    pub monthly_payment: f64,
    pub tenure: u32,
    pub emis_paid_on_time: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: LoanStatus,
}

pub(crate) async fn register_handler<S>(
    State(service): State<Arc<CreditService<S>>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisteredCustomerView>), AppError>
where
    S: LendingStore + 'static,
{
    let Json(request) = payload?;
    let customer = service.register_customer(request.into_new_customer()?)?;
    Ok((
        StatusCode::CREATED,
        Json(RegisteredCustomerView::from(&customer)),
    ))
}

pub(crate) async fn customer_handler<S>(
    State(service): State<Arc<CreditService<S>>>,
    Path(customer_id): Path<u64>,
) -> Result<Json<Customer>, AppError>
where
    S: LendingStore + 'static,
{
    let customer_id = CustomerId(path_id(customer_id, "customer_id")?);
    Ok(Json(service.get_customer(customer_id)?))
}

pub(crate) async fn check_eligibility_handler<S>(
    State(service): State<Arc<CreditService<S>>>,
    payload: Result<Json<LoanTermsRequest>, JsonRejection>,
) -> Result<Json<EligibilityView>, AppError>
where
    S: LendingStore + 'static,
{
    let Json(request) = payload?;
    let terms = request.validate(true)?;
    let verdict = service.check_eligibility(terms.customer_id, terms.loan_amount, terms.tenure)?;

    Ok(Json(EligibilityView {
        customer_id: verdict.customer_id,
        approval: verdict.approval,
        interest_rate: terms
            .interest_rate
            .unwrap_or(verdict.corrected_interest_rate),
        corrected_interest_rate: verdict.corrected_interest_rate,
        tenure: verdict.tenure,
        monthly_installment: verdict.monthly_payment,
    }))
}

pub(crate) async fn create_loan_handler<S>(
    State(service): State<Arc<CreditService<S>>>,
    payload: Result<Json<LoanTermsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedLoanView>), AppError>
where
    S: LendingStore + 'static,
{
    let Json(request) = payload?;
    let terms = request.validate(false)?;
    let loan = service.create_loan(terms.customer_id, terms.loan_amount, terms.tenure)?;
    Ok((StatusCode::CREATED, Json(CreatedLoanView::from(&loan))))
}

pub(crate) async fn loan_handler<S>(
    State(service): State<Arc<CreditService<S>>>,
    Path(loan_id): Path<u64>,
) -> Result<Json<LoanDetailView>, AppError>
where
    S: LendingStore + 'static,
{
    let (loan, customer) = service.get_loan(LoanId(path_id(loan_id, "loan_id")?))?;

    Ok(Json(LoanDetailView {
        loan_id: loan.loan_id,
        customer: LoanCustomerView {
            id: customer.customer_id,
            first_name: customer.first_name,
            last_name: customer.last_name,
        },
        loan_amount: loan.loan_amount,
        interest_rate: loan.interest_rate,
        monthly_payment: loan.monthly_payment,
        tenure: loan.tenure,
        emis_paid_on_time: loan.emis_paid_on_time,
        start_date: loan.start_date,
        end_date: loan.end_date,
        status: loan.status,
    }))
}

pub(crate) async fn customer_loans_handler<S>(
    State(service): State<Arc<CreditService<S>>>,
    Path(customer_id): Path<u64>,
) -> Result<Json<Value>, AppError>
where
    S: LendingStore + 'static,
{
    let customer_id = CustomerId(path_id(customer_id, "customer_id")?);
    let loans = service.customer_loans(customer_id)?;
    Ok(Json(json!({ "loans": loans })))
}
