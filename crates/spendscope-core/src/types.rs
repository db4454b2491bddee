//! Basic types for the analysis core

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use spendscope_config::TransactionKind;

/// Transaction type enumeration
///
/// The upstream source reports expenses as positive amounts and income as
/// negative ones, the opposite of most ledger conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money leaving the account (`amount > 0`)
    #[default]
    Expenses,
    /// Money entering the account (`amount < 0`)
    Income,
}

impl TransactionType {
    /// Check whether an amount carries this type's sign
    pub fn matches(&self, amount: Decimal) -> bool {
        match self {
            TransactionType::Expenses => amount > Decimal::ZERO,
            TransactionType::Income => amount < Decimal::ZERO,
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::Expenses => "Expenses",
            TransactionType::Income => "Income",
        }
    }
}

impl From<TransactionKind> for TransactionType {
    fn from(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::Expenses => TransactionType::Expenses,
            TransactionKind::Income => TransactionType::Income,
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<TransactionKind>().map(TransactionType::from)
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Expenses => write!(f, "expenses"),
            TransactionType::Income => write!(f, "income"),
        }
    }
}

/// Chart drill-down level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartLevel {
    /// One slice per category
    #[default]
    Main,
    /// One slice per subcategory of the selected category
    Subcategory,
}

impl std::fmt::Display for ChartLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChartLevel::Main => write!(f, "main"),
            ChartLevel::Subcategory => write!(f, "subcategory"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_convention() {
        assert!(TransactionType::Expenses.matches(Decimal::new(1250, 2)));
        assert!(!TransactionType::Expenses.matches(Decimal::new(-1250, 2)));
        assert!(TransactionType::Income.matches(Decimal::from(-1000)));
        assert!(!TransactionType::Income.matches(Decimal::ZERO));
        assert!(!TransactionType::Expenses.matches(Decimal::ZERO));
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("INCOME".parse::<TransactionType>().unwrap(), TransactionType::Income);
        assert_eq!(TransactionType::Expenses.to_string(), "expenses");
        assert!("savings".parse::<TransactionType>().is_err());
        assert_eq!(ChartLevel::Subcategory.to_string(), "subcategory");
    }
}
