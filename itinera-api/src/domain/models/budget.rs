use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Tolerance when comparing the breakdown sum against the total.
const BREAKDOWN_TOLERANCE: f64 = 0.01;

/// The six budget categories. The breakdown always carries all of them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum BudgetCategory {
    Transportation,
    Accommodation,
    Meals,
    Entertainment,
    Business,
    Miscellaneous,
}

/// Fixed-shape per-category allocation; every field present, default zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetBreakdown {
    pub transportation: f64,
    pub accommodation: f64,
    pub meals: f64,
    pub entertainment: f64,
    pub business: f64,
    pub miscellaneous: f64,
}

impl BudgetBreakdown {
    pub fn sum(&self) -> f64 {
        self.transportation
            + self.accommodation
            + self.meals
            + self.entertainment
            + self.business
            + self.miscellaneous
    }

    pub fn amount(&self, category: BudgetCategory) -> f64 {
        match category {
            BudgetCategory::Transportation => self.transportation,
            BudgetCategory::Accommodation => self.accommodation,
            BudgetCategory::Meals => self.meals,
            BudgetCategory::Entertainment => self.entertainment,
            BudgetCategory::Business => self.business,
            BudgetCategory::Miscellaneous => self.miscellaneous,
        }
    }
}

/// One budget per trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub total: f64,
    /// ISO 4217 code, e.g. "EUR".
    pub currency: String,
    #[serde(default)]
    pub breakdown: BudgetBreakdown,
    #[serde(default)]
    pub track_expenses: bool,
}

impl Budget {
    pub fn new(total: f64, currency: impl Into<String>) -> Self {
        Self {
            total,
            currency: currency.into(),
            breakdown: BudgetBreakdown::default(),
            track_expenses: false,
        }
    }

    pub fn with_breakdown(mut self, breakdown: BudgetBreakdown) -> Self {
        self.breakdown = breakdown;
        self
    }

    /// Breakdown-sum-vs-total mismatch is surfaced, never enforced.
    pub fn consistency_warning(&self) -> Option<String> {
        let sum = self.breakdown.sum();
        if (sum - self.total).abs() > BREAKDOWN_TOLERANCE {
            Some(format!(
                "budget breakdown sums to {sum:.2} but total is {:.2}",
                self.total
            ))
        } else {
            None
        }
    }
}

impl Default for Budget {
    fn default() -> Self {
        Self::new(0.0, "USD")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consistent_breakdown_has_no_warning() {
        let budget = Budget::new(1000.0, "EUR").with_breakdown(BudgetBreakdown {
            transportation: 400.0,
            accommodation: 500.0,
            meals: 100.0,
            ..BudgetBreakdown::default()
        });
        assert!(budget.consistency_warning().is_none());
    }

    #[test]
    fn mismatched_breakdown_warns() {
        let budget = Budget::new(1000.0, "EUR").with_breakdown(BudgetBreakdown {
            transportation: 400.0,
            ..BudgetBreakdown::default()
        });
        let warning = budget.consistency_warning().unwrap();
        assert!(warning.contains("400.00"));
        assert!(warning.contains("1000.00"));
    }

    #[test]
    fn default_breakdown_is_all_zero() {
        let breakdown = BudgetBreakdown::default();
        assert_eq!(breakdown.sum(), 0.0);
        assert_eq!(breakdown.amount(BudgetCategory::Meals), 0.0);
    }
}
