use super::amortization::{monthly_installment, round_currency};
use super::domain::{CustomerId, EligibilityVerdict, InputError};
use super::policy::{CreditPolicy, Exposure, RateDecision};

/// Requested principal and term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanRequest {
    pub loan_amount: f64,
    pub tenure: u32,
}

/// Likelihood ladder; the first matching rung wins.
pub fn approval_probability(decision: &RateDecision, score: u8) -> u8 {
    let RateDecision {
        is_within_limit,
        can_afford,
        ..
    } = *decision;

    match (is_within_limit, can_afford) {
        (true, true) if score >= 60 => 100,
        (true, _) if score >= 50 => 80,
        (true, true) => 60,
        (true, false) => 30,
        (false, _) => 0,
    }
}

/// Minimum probability that counts as an approval.
pub const APPROVAL_THRESHOLD: u8 = 60;

/// Decide a request against an already-known score and exposure.
///
/// The rate is fixed first so the installment is computed at the surcharged
/// rate, then the installment feeds the affordability check.
pub fn evaluate(
    policy: &CreditPolicy,
    customer_id: CustomerId,
    score: u8,
    exposure: &Exposure,
    request: LoanRequest,
) -> Result<EligibilityVerdict, InputError> {
    let (interest_rate, _) = policy.interest_rate(score, exposure);
    let monthly_payment = monthly_installment(request.loan_amount, interest_rate, request.tenure)?;
    let decision = policy.decide(score, exposure, request.loan_amount, monthly_payment);

    let approval_probability = approval_probability(&decision, score);
    let interest_rate = round_currency(decision.interest_rate);

    Ok(EligibilityVerdict {
        customer_id,
        credit_score: score,
        approval: approval_probability >= APPROVAL_THRESHOLD,
        approval_probability,
        interest_rate,
        corrected_interest_rate: interest_rate,
        tenure: request.tenure,
        monthly_payment,
    })
}
