//! Creditworthiness estimate derived from income and loan history.

use serde::{Deserialize, Serialize};

use super::domain::{LoanRecord, LoanStatus};

const BASE_SCORE: f64 = 50.0;
const MAX_INCOME_BONUS: f64 = 30.0;
const PAYMENT_HISTORY_WEIGHT: f64 = 30.0;

/// Signal that moved the score away from the base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    IncomeCapacity,
    PaymentHistory,
    LoanVolume,
    DebtLoad,
}

/// Discrete contribution to a score, kept for audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: ScoreFactor,
    pub points: i32,
    pub notes: String,
}

/// Clamped score plus the trail of contributions that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub score: u8,
    pub components: Vec<ScoreComponent>,
}

impl ScoreBreakdown {
    pub fn points_for(&self, factor: ScoreFactor) -> Option<i32> {
        self.components
            .iter()
            .find(|component| component.factor == factor)
            .map(|component| component.points)
    }
}

/// Debt-to-income bucket used by both scoring and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebtBucket {
    Severe,
    Elevated,
    Moderate,
    Light,
}

impl DebtBucket {
    pub fn classify(ratio: f64) -> Self {
        if ratio > 0.6 {
            DebtBucket::Severe
        } else if ratio > 0.4 {
            DebtBucket::Elevated
        } else if ratio < 0.2 {
            DebtBucket::Light
        } else {
            DebtBucket::Moderate
        }
    }

    pub const fn points(self) -> i32 {
        match self {
            DebtBucket::Severe => -20,
            DebtBucket::Elevated => -10,
            DebtBucket::Moderate => 0,
            DebtBucket::Light => 10,
        }
    }
}

/// Score a customer from monthly income and the full loan history.
pub fn estimate_credit_score(monthly_income: f64, history: &[LoanRecord]) -> ScoreBreakdown {
    if history.is_empty() {
        let bonus = (monthly_income / 1_000.0).min(MAX_INCOME_BONUS);
        let score = clamp_score(BASE_SCORE + bonus);
        return ScoreBreakdown {
            score,
            components: vec![ScoreComponent {
                factor: ScoreFactor::IncomeCapacity,
                points: i32::from(score) - BASE_SCORE as i32,
                notes: format!(
                    "no loan history, income bonus {bonus:.2} (cap {MAX_INCOME_BONUS})"
                ),
            }],
        };
    }

    let mut components = Vec::new();

    if let Some(component) = payment_history(history) {
        components.push(component);
    }

    if let Some(component) = loan_volume(history.len()) {
        components.push(component);
    }

    if let Some(component) = debt_load(monthly_income, history) {
        components.push(component);
    }

    let total = BASE_SCORE
        + components
            .iter()
            .map(|component| f64::from(component.points))
            .sum::<f64>();

    ScoreBreakdown {
        score: clamp_score(total),
        components,
    }
}

fn payment_history(history: &[LoanRecord]) -> Option<ScoreComponent> {
    let (on_time, scheduled) = history
        .iter()
        .filter(|loan| loan.status == LoanStatus::Paid)
        .fold((0u64, 0u64), |(on_time, scheduled), loan| {
            (
                on_time + u64::from(loan.emis_paid_on_time),
                scheduled + u64::from(loan.tenure),
            )
        });

    if scheduled == 0 {
        return None;
    }

    let ratio = on_time as f64 / scheduled as f64;
    let points = (ratio * PAYMENT_HISTORY_WEIGHT).round() as i32;

    Some(ScoreComponent {
        factor: ScoreFactor::PaymentHistory,
        points,
        notes: format!("{on_time} of {scheduled} installments on paid loans made on time"),
    })
}

fn loan_volume(count: usize) -> Option<ScoreComponent> {
    let points = if count >= 5 {
        10
    } else if count >= 3 {
        5
    } else {
        return None;
    };

    Some(ScoreComponent {
        factor: ScoreFactor::LoanVolume,
        points,
        notes: format!("{count} loans on record"),
    })
}

fn debt_load(monthly_income: f64, history: &[LoanRecord]) -> Option<ScoreComponent> {
    let outstanding: Vec<&LoanRecord> = history
        .iter()
        .filter(|loan| loan.status.is_outstanding())
        .collect();

    if outstanding.is_empty() {
        return None;
    }

    let emis: f64 = outstanding.iter().map(|loan| loan.monthly_payment).sum();
    let ratio = debt_to_income(emis, monthly_income);
    let bucket = DebtBucket::classify(ratio);

    Some(ScoreComponent {
        factor: ScoreFactor::DebtLoad,
        points: bucket.points(),
        notes: format!(
            "active installments {emis:.2} against income {monthly_income:.2} (ratio {ratio:.2})"
        ),
    })
}

/// Installments divided by income; a non-positive income counts as fully leveraged.
pub fn debt_to_income(emis: f64, monthly_income: f64) -> f64 {
    if monthly_income > 0.0 {
        emis / monthly_income
    } else if emis > 0.0 {
        f64::INFINITY
    } else {
        0.0
    }
}

fn clamp_score(raw: f64) -> u8 {
    raw.round().clamp(0.0, 100.0) as u8
}
