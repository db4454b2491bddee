//! Transaction filters: type, date and category
//!
//! Every filter is a pure function over a slice; the input is never mutated
//! and malformed transactions are excluded rather than reported.

use chrono::Datelike;

use crate::models::Transaction;
use crate::selection::DrillDown;
use crate::time::MonthNames;
use crate::types::TransactionType;

/// Keep transactions whose amount sign matches `transaction_type`
pub fn filter_by_type(transactions: &[Transaction], transaction_type: TransactionType) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|t| transaction_type.matches(t.amount))
        .cloned()
        .collect()
}

/// Like [`filter_by_type`], but takes the type by name
///
/// An unrecognized name leaves the input unfiltered.
pub fn filter_by_type_name(transactions: &[Transaction], type_name: &str) -> Vec<Transaction> {
    match type_name.parse::<TransactionType>() {
        Ok(transaction_type) => filter_by_type(transactions, transaction_type),
        Err(_) => {
            log::debug!("Unrecognized transaction type '{}', not filtering", type_name);
            transactions.to_vec()
        }
    }
}

/// Keep transactions booked in the given month and year
///
/// A missing or unresolvable month, or a missing year, leaves the input
/// unfiltered. Transactions without a date never match an active filter.
pub fn filter_by_date(
    transactions: &[Transaction],
    month: Option<&str>,
    year: Option<i32>,
    names: &MonthNames,
) -> Vec<Transaction> {
    let (month0, year) = match (month.and_then(|m| names.index_of(m)), year.filter(|&y| y != 0)) {
        (Some(month0), Some(year)) => (month0, year),
        _ => return transactions.to_vec(),
    };

    transactions
        .iter()
        .filter(|t| {
            t.date
                .map_or(false, |d| d.year() == year && d.month0() == month0)
        })
        .cloned()
        .collect()
}

/// Keep transactions in the drilled-down category and subcategory
pub fn filter_by_category(transactions: &[Transaction], drill_down: &DrillDown) -> Vec<Transaction> {
    match drill_down {
        DrillDown::Main => transactions.to_vec(),
        DrillDown::Subcategory { category, subcategory } => transactions
            .iter()
            .filter(|t| t.category_key() == category.as_str())
            .filter(|t| match subcategory {
                Some(sub) => t.subcategory_id() == Some(sub.as_str()),
                None => true,
            })
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::UNCATEGORIZED_KEY;
    use crate::models::TransactionCategory;
    use crate::selection::FilterStore;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn tx(id: &str, amount: i64, date: Option<(i32, u32, u32)>, category: Option<TransactionCategory>) -> Transaction {
        Transaction {
            id: id.to_string(),
            amount: Decimal::from(amount),
            date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            merchant_name: format!("Merchant {}", id),
            category,
            is_manual: false,
            is_test_data: false,
        }
    }

    fn sample() -> Vec<Transaction> {
        vec![
            tx("1", 50, Some((2024, 3, 15)), Some(TransactionCategory::new("food"))),
            tx("2", -1000, Some((2024, 3, 1)), Some(TransactionCategory::new("salary"))),
            tx("3", 30, Some((2024, 3, 20)), Some(TransactionCategory::with_subcategory("food", "restaurant"))),
            tx("4", 12, Some((2024, 4, 15)), Some(TransactionCategory::with_subcategory("food", "coffee"))),
            tx("5", 80, None, Some(TransactionCategory::new("transport"))),
            tx("6", -25, Some((2023, 3, 10)), None),
            tx("7", 45, Some((2024, 3, 2)), None),
        ]
    }

    fn ids(transactions: &[Transaction]) -> Vec<&str> {
        transactions.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_type_filter_partitions_nonzero_amounts() {
        let all = sample();
        let expenses = filter_by_type(&all, TransactionType::Expenses);
        let income = filter_by_type(&all, TransactionType::Income);

        assert!(expenses.iter().all(|t| t.amount > Decimal::ZERO));
        assert!(income.iter().all(|t| t.amount < Decimal::ZERO));
        assert_eq!(expenses.len() + income.len(), all.len());
        for t in &all {
            assert!(expenses.contains(t) ^ income.contains(t));
        }
    }

    #[test]
    fn test_type_filter_drops_zero_and_handles_empty() {
        let zero = vec![tx("z", 0, Some((2024, 3, 1)), None)];
        assert!(filter_by_type(&zero, TransactionType::Expenses).is_empty());
        assert!(filter_by_type(&zero, TransactionType::Income).is_empty());
        assert!(filter_by_type(&[], TransactionType::Expenses).is_empty());
    }

    #[test]
    fn test_type_filter_by_name_is_permissive() {
        let all = sample();
        assert_eq!(filter_by_type_name(&all, "income").len(), 2);
        assert_eq!(filter_by_type_name(&all, "transfers"), all);
    }

    #[test]
    fn test_date_filter_march_2024() {
        let names = MonthNames::default();
        let march = tx("m", 10, Some((2024, 3, 15)), None);
        let april = tx("a", 10, Some((2024, 4, 15)), None);
        let input = vec![march.clone(), april];

        assert_eq!(filter_by_date(&input, Some("March"), Some(2024), &names), vec![march]);
        assert_eq!(filter_by_date(&input, Some(""), Some(2024), &names), input);
    }

    #[test]
    fn test_date_filter_excludes_missing_dates_and_other_years() {
        let names = MonthNames::default();
        let filtered = filter_by_date(&sample(), Some("march"), Some(2024), &names);
        assert_eq!(ids(&filtered), vec!["1", "2", "3", "7"]);
    }

    #[test]
    fn test_date_filter_unresolved_inputs_pass_through() {
        let names = MonthNames::default();
        let all = sample();
        assert_eq!(filter_by_date(&all, Some("Marzo"), Some(2024), &names), all);
        assert_eq!(filter_by_date(&all, None, Some(2024), &names), all);
        assert_eq!(filter_by_date(&all, Some("March"), None, &names), all);
        assert_eq!(filter_by_date(&all, Some("March"), Some(0), &names), all);
    }

    #[test]
    fn test_date_filter_is_idempotent() {
        let names = MonthNames::default();
        let once = filter_by_date(&sample(), Some("March"), Some(2024), &names);
        let twice = filter_by_date(&once, Some("March"), Some(2024), &names);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_category_filter() {
        let all = sample();
        let food = DrillDown::Subcategory { category: "food".to_string(), subcategory: None };
        assert_eq!(ids(&filter_by_category(&all, &food)), vec!["1", "3", "4"]);

        let restaurant = DrillDown::Subcategory {
            category: "food".to_string(),
            subcategory: Some("restaurant".to_string()),
        };
        assert_eq!(ids(&filter_by_category(&all, &restaurant)), vec!["3"]);

        let other = DrillDown::Subcategory { category: "other".to_string(), subcategory: None };
        assert!(filter_by_category(&all, &other).is_empty());

        let missing = DrillDown::Subcategory { category: UNCATEGORIZED_KEY.to_string(), subcategory: None };
        assert_eq!(ids(&filter_by_category(&all, &missing)), vec!["6", "7"]);
    }

    #[test]
    fn test_select_then_clear_is_identity() {
        let all = sample();
        let mut store = FilterStore::default();
        store.select_category("food");
        assert_ne!(filter_by_category(&all, &store.selection().drill_down), all);
        store.clear_filters();
        assert_eq!(filter_by_category(&all, &store.selection().drill_down), all);
    }

    #[test]
    fn test_end_to_end_expense_filter() {
        let input = vec![
            tx("a", 50, None, Some(TransactionCategory::new("food"))),
            tx("b", -1000, None, Some(TransactionCategory::new("salary"))),
            tx("c", 30, None, Some(TransactionCategory::with_subcategory("food", "restaurant"))),
        ];
        let expenses = filter_by_type(&input, TransactionType::Expenses);
        let amounts: Vec<Decimal> = expenses.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![Decimal::from(50), Decimal::from(30)]);
    }
}
