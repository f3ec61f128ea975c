use serde::{Deserialize, Serialize};

use super::scoring::debt_to_income;

/// Thresholds that drive pricing and affordability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditPolicy {
    /// Approved limit granted per unit of monthly income at registration.
    pub approved_limit_multiplier: f64,
    /// Existing installments above this share of income trigger the surcharge.
    pub surcharge_debt_ratio: f64,
    pub surcharge_points: f64,
    /// Maximum share of income all installments may take after the new loan.
    pub max_installment_ratio: f64,
    pub rate_tiers: Vec<RateTier>,
    pub fallback_rate: f64,
}

/// Minimum score that unlocks a given base rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateTier {
    pub min_score: u8,
    pub annual_rate: f64,
}

impl Default for CreditPolicy {
    fn default() -> Self {
        Self {
            approved_limit_multiplier: 36.0,
            surcharge_debt_ratio: 0.5,
            surcharge_points: 2.0,
            max_installment_ratio: 0.5,
            rate_tiers: vec![
                RateTier {
                    min_score: 80,
                    annual_rate: 6.0,
                },
                RateTier {
                    min_score: 60,
                    annual_rate: 8.0,
                },
                RateTier {
                    min_score: 40,
                    annual_rate: 12.0,
                },
            ],
            fallback_rate: 16.0,
        }
    }
}

/// Pure decision context for a requested loan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateDecision {
    pub interest_rate: f64,
    pub surcharge_applied: bool,
    pub can_afford: bool,
    pub is_within_limit: bool,
}

/// Borrower position the policy is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exposure {
    pub monthly_income: f64,
    pub approved_limit: f64,
    pub current_emis: f64,
}

impl CreditPolicy {
    /// Base annual rate for a score; tiers are checked highest first.
    pub fn base_rate(&self, score: u8) -> f64 {
        let mut tiers: Vec<&RateTier> = self.rate_tiers.iter().collect();
        tiers.sort_by(|a, b| b.min_score.cmp(&a.min_score));

        tiers
            .into_iter()
            .find(|tier| score >= tier.min_score)
            .map(|tier| tier.annual_rate)
            .unwrap_or(self.fallback_rate)
    }

    /// Base rate plus the surcharge when existing installments are heavy.
    pub fn interest_rate(&self, score: u8, exposure: &Exposure) -> (f64, bool) {
        let base = self.base_rate(score);
        let ratio = debt_to_income(exposure.current_emis, exposure.monthly_income);
        if ratio > self.surcharge_debt_ratio {
            (base + self.surcharge_points, true)
        } else {
            (base, false)
        }
    }

    pub fn can_afford(&self, exposure: &Exposure, new_payment: f64) -> bool {
        debt_to_income(exposure.current_emis + new_payment, exposure.monthly_income)
            <= self.max_installment_ratio
    }

    pub fn is_within_limit(&self, exposure: &Exposure, loan_amount: f64) -> bool {
        loan_amount <= exposure.approved_limit
    }

    /// Combine the rate chosen for `score` with the checks for a payment
    /// computed at that rate.
    pub fn decide(
        &self,
        score: u8,
        exposure: &Exposure,
        loan_amount: f64,
        new_payment: f64,
    ) -> RateDecision {
        let (interest_rate, surcharge_applied) = self.interest_rate(score, exposure);
        RateDecision {
            interest_rate,
            surcharge_applied,
            can_afford: self.can_afford(exposure, new_payment),
            is_within_limit: self.is_within_limit(exposure, loan_amount),
        }
    }

    pub fn approved_limit(&self, monthly_income: f64) -> f64 {
        super::amortization::round_currency(monthly_income * self.approved_limit_multiplier)
    }
}
