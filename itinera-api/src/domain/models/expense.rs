use serde::{Deserialize, Serialize};
use time::Date;

use super::{BudgetCategory, ExpenseId};

/// A recorded expense on a trip. Actual spend, as opposed to the budget,
/// which is a plan; the insights "total spent" rollup sums these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: ExpenseId,
    pub category: BudgetCategory,
    pub amount: f64,
    #[serde(default)]
    pub description: String,
    pub date: Date,
}

/// Expense input; the store generates the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub category: BudgetCategory,
    pub amount: f64,
    #[serde(default)]
    pub description: String,
    pub date: Date,
}

impl NewExpense {
    pub fn new(category: BudgetCategory, amount: f64, date: Date) -> Self {
        Self {
            category,
            amount,
            description: String::new(),
            date,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn into_expense(self, id: ExpenseId) -> Expense {
        Expense {
            id,
            category: self.category,
            amount: self.amount,
            description: self.description,
            date: self.date,
        }
    }
}
