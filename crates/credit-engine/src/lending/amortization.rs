use chrono::{Months, NaiveDate};

use super::domain::InputError;

/// Fixed monthly installment for a fully amortizing loan, rounded to cents.
///
/// `annual_rate` is a percentage (12.0 means 12% a year). A zero rate spreads
/// the principal evenly over the term.
pub fn monthly_installment(
    principal: f64,
    annual_rate: f64,
    tenure: u32,
) -> Result<f64, InputError> {
    if !principal.is_finite() || principal <= 0.0 {
        return Err(InputError::NonPositivePrincipal(principal));
    }
    if tenure == 0 {
        return Err(InputError::NonPositiveTenure);
    }
    if !annual_rate.is_finite() || annual_rate < 0.0 {
        return Err(InputError::NegativeRate(annual_rate));
    }

    let monthly_rate = annual_rate / 12.0 / 100.0;
    if monthly_rate == 0.0 {
        return Ok(round_currency(principal / f64::from(tenure)));
    }

    // Discounting form stays finite for long terms, approaching P*r.
    let discount = (1.0 + monthly_rate).powf(-f64::from(tenure));
    let payment = principal * monthly_rate / (1.0 - discount);
    if !payment.is_finite() || payment <= 0.0 {
        return Err(InputError::UnrepresentableInstallment);
    }

    Ok(round_currency(payment))
}

/// Round a money amount to two decimal places.
pub fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Last day covered by a loan that starts on `start` and runs `tenure` months.
///
/// Month-end starts clamp to the last day of the target month.
pub fn loan_end_date(start: NaiveDate, tenure: u32) -> NaiveDate {
    start
        .checked_add_months(Months::new(tenure))
        .unwrap_or(NaiveDate::MAX)
}
