//! Chart aggregation for the analysis page
//!
//! Groups transactions into category or subcategory buckets, resolves their
//! display metadata through the catalog and derives the legend and chart
//! series handed to the rendering layer.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use spendscope_config::ChartConfig;
use std::collections::HashMap;

use crate::catalog::{apply_alpha, CatalogMatch, CategoryCatalog, UNKNOWN_SUBCATEGORY_KEY};
use crate::models::Transaction;
use crate::selection::{DrillDown, FilterSelection};
use crate::time::MonthNames;
use crate::types::ChartLevel;

/// Presentation knobs for the aggregator
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    /// Maximum legend entries
    pub legend_limit: usize,
    /// Alpha for non-selected siblings while a subcategory is highlighted
    pub dimmed_alpha: f64,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            legend_limit: 7,
            dimmed_alpha: 0.3,
        }
    }
}

impl From<&ChartConfig> for ChartOptions {
    fn from(config: &ChartConfig) -> Self {
        Self {
            legend_limit: config.legend_limit,
            dimmed_alpha: config.dimmed_alpha,
        }
    }
}

/// One slice of the pie chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartBucket {
    /// Category or subcategory id, or a reserved key
    pub key: String,
    pub label: String,
    pub color: String,
    pub icon: String,
    pub total_abs_amount: Decimal,
    pub transaction_count: usize,
    /// Drawn with a border/shadow marker
    pub emphasized: bool,
    /// The key resolved to a catalog entry
    pub known: bool,
}

/// Legend row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub key: String,
    pub label: String,
    pub color: String,
    pub icon: String,
    pub total_abs_amount: Decimal,
}

/// Payload sent back when a slice is clicked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ChartClick {
    Category { category_id: String },
    Subcategory { category_id: String, subcategory_id: String },
}

impl ChartClick {
    /// Arguments for `FilterStore::handle_chart_selection`
    pub fn into_selection(self) -> (Option<String>, Option<String>) {
        match self {
            ChartClick::Category { category_id } => (Some(category_id), None),
            ChartClick::Subcategory { category_id, subcategory_id } => (Some(category_id), Some(subcategory_id)),
        }
    }
}

/// Renderer-agnostic series point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub name: String,
    pub value: f64,
    pub color: String,
    pub payload: ChartClick,
}

/// Aggregated chart data for one drill-down level
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Aggregation {
    pub level: ChartLevel,
    /// Category being drilled into, at subcategory level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    /// Buckets in first-seen order
    pub buckets: Vec<ChartBucket>,
    /// Top buckets by amount
    pub legend: Vec<LegendEntry>,
    /// Sum over all buckets
    pub total: Decimal,
}

impl Aggregation {
    /// Whether there is anything to draw
    pub fn has_data(&self) -> bool {
        !self.buckets.is_empty()
    }

    /// Series for the rendering layer
    pub fn series(&self) -> Vec<ChartSeries> {
        self.buckets
            .iter()
            .map(|bucket| ChartSeries {
                name: bucket.label.clone(),
                value: bucket.total_abs_amount.to_f64().unwrap_or_default(),
                color: bucket.color.clone(),
                payload: match &self.category_id {
                    Some(category_id) => ChartClick::Subcategory {
                        category_id: category_id.clone(),
                        subcategory_id: bucket.key.clone(),
                    },
                    None => ChartClick::Category { category_id: bucket.key.clone() },
                },
            })
            .collect()
    }
}

#[derive(Default)]
struct Group {
    total: Decimal,
    count: usize,
}

/// Group transactions by key, preserving first-seen order
fn group_by<'a, I, F>(transactions: I, key_of: F) -> Vec<(String, Group)>
where
    I: IntoIterator<Item = &'a Transaction>,
    F: Fn(&Transaction) -> String,
{
    let mut order: Vec<(String, Group)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for transaction in transactions {
        let key = key_of(transaction);
        let index = *positions.entry(key.clone()).or_insert_with(|| {
            order.push((key, Group::default()));
            order.len() - 1
        });
        let group = &mut order[index].1;
        group.total += transaction.abs_amount();
        group.count += 1;
    }

    order
}

/// Aggregate transactions into chart buckets for the given drill-down
///
/// At the main level every transaction counts, grouped by category (missing
/// categories go to the uncategorized bucket). At subcategory level only the
/// drilled category counts, grouped by subcategory (missing ones go to
/// `unknown`); a selected subcategory is emphasized and its siblings dimmed.
pub fn aggregate(
    transactions: &[Transaction],
    drill_down: &DrillDown,
    catalog: &CategoryCatalog,
    options: &ChartOptions,
) -> Aggregation {
    let buckets: Vec<ChartBucket> = match drill_down {
        DrillDown::Main => group_by(transactions, |t| t.category_key().to_string())
        .into_iter()
        .map(|(key, group)| {
            let resolved = catalog.resolve_category(Some(key.as_str()));
            bucket(key, group, resolved)
        })
        .collect(),
        DrillDown::Subcategory { category, subcategory } => {
            let in_category = transactions
                .iter()
                .filter(|t| t.category_key() == category.as_str());
            group_by(in_category, |t| {
                t.subcategory_id().unwrap_or(UNKNOWN_SUBCATEGORY_KEY).to_string()
            })
            .into_iter()
            .map(|(key, group)| {
                let resolved = catalog.resolve_subcategory(category, Some(key.as_str()));
                let mut b = bucket(key, group, resolved);
                if let Some(selected) = subcategory {
                    if b.key == *selected {
                        b.emphasized = true;
                    } else {
                        b.color = apply_alpha(&b.color, options.dimmed_alpha);
                    }
                }
                b
            })
            .collect()
        }
    };

    let total = buckets.iter().map(|b| b.total_abs_amount).sum();
    let legend = legend_entries(&buckets, options.legend_limit);

    Aggregation {
        level: drill_down.level(),
        category_id: drill_down.category().map(str::to_string),
        buckets,
        legend,
        total,
    }
}

fn bucket(key: String, group: Group, resolved: CatalogMatch<'_>) -> ChartBucket {
    let entry = resolved.entry();
    ChartBucket {
        key,
        label: entry.display_name().to_string(),
        color: entry.color.clone(),
        icon: entry.icon_name.clone(),
        total_abs_amount: group.total,
        transaction_count: group.count,
        emphasized: false,
        known: resolved.is_known(),
    }
}

/// Top `limit` buckets by amount; ties keep input order
pub fn legend_entries(buckets: &[ChartBucket], limit: usize) -> Vec<LegendEntry> {
    let mut sorted: Vec<&ChartBucket> = buckets.iter().collect();
    sorted.sort_by(|a, b| b.total_abs_amount.cmp(&a.total_abs_amount));
    sorted
        .into_iter()
        .take(limit)
        .map(|b| LegendEntry {
            key: b.key.clone(),
            label: b.label.clone(),
            color: b.color.clone(),
            icon: b.icon.clone(),
            total_abs_amount: b.total_abs_amount,
        })
        .collect()
}

/// Title shown above the chart
pub fn chart_title(selection: &FilterSelection, catalog: &CategoryCatalog) -> String {
    match &selection.drill_down {
        DrillDown::Main => format!("{} by category", selection.transaction_type.label()),
        DrillDown::Subcategory { category, subcategory } => {
            let category_name = catalog.resolve_category(Some(category.as_str())).entry().display_name();
            match subcategory {
                Some(sub) => format!(
                    "{} / {}",
                    category_name,
                    catalog.resolve_subcategory(category, Some(sub.as_str())).entry().display_name()
                ),
                None => category_name.to_string(),
            }
        }
    }
}

/// Period shown next to the title
pub fn period_label(selection: &FilterSelection, names: &MonthNames) -> String {
    selection.period.label(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{OTHER_CATEGORY_KEY, UNCATEGORIZED_KEY};
    use crate::models::{total_abs_amount, TransactionCategory};
    use crate::types::TransactionType;
    use crate::filters::filter_by_type;

    fn tx(id: &str, amount: i64, category: Option<TransactionCategory>) -> Transaction {
        Transaction {
            id: id.to_string(),
            amount: Decimal::from(amount),
            date: None,
            merchant_name: String::new(),
            category,
            is_manual: false,
            is_test_data: false,
        }
    }

    fn food() -> DrillDown {
        DrillDown::Subcategory { category: "food".to_string(), subcategory: None }
    }

    fn scenario() -> Vec<Transaction> {
        vec![
            tx("a", 50, Some(TransactionCategory::new("food"))),
            tx("b", -1000, Some(TransactionCategory::new("salary"))),
            tx("c", 30, Some(TransactionCategory::with_subcategory("food", "restaurant"))),
        ]
    }

    #[test]
    fn test_end_to_end_drill_down() {
        let catalog = CategoryCatalog::default();
        let options = ChartOptions::default();
        let expenses = filter_by_type(&scenario(), TransactionType::Expenses);

        let main = aggregate(&expenses, &DrillDown::Main, &catalog, &options);
        assert_eq!(main.buckets.len(), 1);
        assert_eq!(main.buckets[0].key, "food");
        assert_eq!(main.buckets[0].total_abs_amount, Decimal::from(80));

        let drilled = aggregate(&expenses, &food(), &catalog, &options);
        let totals: Vec<(&str, Decimal)> = drilled
            .buckets
            .iter()
            .map(|b| (b.key.as_str(), b.total_abs_amount))
            .collect();
        assert_eq!(totals, vec![("unknown", Decimal::from(50)), ("restaurant", Decimal::from(30))]);
        assert_eq!(drilled.level, ChartLevel::Subcategory);
        assert!(!drilled.buckets[0].known);
        assert_eq!(drilled.buckets[0].label, "Uncategorized");
    }

    #[test]
    fn test_main_total_matches_input() {
        let catalog = CategoryCatalog::default();
        let mut input = scenario();
        input.push(tx("d", 15, None));
        input.push(tx("e", 0, Some(TransactionCategory::new("bills"))));
        let aggregation = aggregate(&input, &DrillDown::Main, &catalog, &ChartOptions::default());

        let bucket_sum: Decimal = aggregation.buckets.iter().map(|b| b.total_abs_amount).sum();
        assert_eq!(bucket_sum, total_abs_amount(&input));
        assert_eq!(aggregation.total, Decimal::from(1095));

        let uncategorized = aggregation.buckets.iter().find(|b| b.key == UNCATEGORIZED_KEY).unwrap();
        assert_eq!(uncategorized.total_abs_amount, Decimal::from(15));
        let bills = aggregation.buckets.iter().find(|b| b.key == "bills").unwrap();
        assert_eq!(bills.total_abs_amount, Decimal::ZERO);
    }

    #[test]
    fn test_uncategorized_is_separate_from_other() {
        let catalog = CategoryCatalog::default();
        let input = vec![
            tx("a", 15, None),
            tx("b", 40, Some(TransactionCategory::new(OTHER_CATEGORY_KEY))),
            tx("c", 5, None),
        ];
        let main = aggregate(&input, &DrillDown::Main, &catalog, &ChartOptions::default());
        assert_eq!(main.buckets.len(), 2);
        assert_eq!(main.buckets[0].key, UNCATEGORIZED_KEY);
        assert_eq!(main.buckets[0].total_abs_amount, Decimal::from(20));
        assert!(!main.buckets[0].known);
        assert_eq!(main.buckets[1].key, OTHER_CATEGORY_KEY);
        assert!(main.buckets[1].known);

        // Drilling into a slice accounts for exactly that slice
        for bucket in &main.buckets {
            let drill = DrillDown::Subcategory { category: bucket.key.clone(), subcategory: None };
            let drilled = aggregate(&input, &drill, &catalog, &ChartOptions::default());
            assert_eq!(drilled.total, bucket.total_abs_amount);
        }
    }

    #[test]
    fn test_unknown_category_uses_fallback() {
        let catalog = CategoryCatalog::default();
        let input = vec![tx("x", 10, Some(TransactionCategory::new("crypto")))];
        let aggregation = aggregate(&input, &DrillDown::Main, &catalog, &ChartOptions::default());
        let bucket = &aggregation.buckets[0];
        assert_eq!(bucket.key, "crypto");
        assert_eq!(bucket.color, "#9E9E9E");
        assert_eq!(bucket.icon, "help-circle");
        assert!(!bucket.known);
    }

    #[test]
    fn test_empty_input() {
        let aggregation = aggregate(&[], &DrillDown::Main, &CategoryCatalog::default(), &ChartOptions::default());
        assert!(!aggregation.has_data());
        assert!(aggregation.legend.is_empty());
        assert!(aggregation.series().is_empty());
        assert_eq!(aggregation.total, Decimal::ZERO);
    }

    #[test]
    fn test_highlight_dims_siblings() {
        let catalog = CategoryCatalog::default();
        let input = vec![
            tx("1", 20, Some(TransactionCategory::with_subcategory("food", "restaurant"))),
            tx("2", 10, Some(TransactionCategory::with_subcategory("food", "coffee"))),
        ];
        let selected = DrillDown::Subcategory {
            category: "food".to_string(),
            subcategory: Some("coffee".to_string()),
        };
        let aggregation = aggregate(&input, &selected, &catalog, &ChartOptions::default());

        let restaurant = &aggregation.buckets[0];
        let coffee = &aggregation.buckets[1];
        assert!(coffee.emphasized);
        assert_eq!(coffee.color, "#8D6E63");
        assert!(!restaurant.emphasized);
        assert_eq!(restaurant.color, "#F4511E4D");
    }

    #[test]
    fn test_legend_keeps_top_seven_with_stable_ties() {
        let catalog = CategoryCatalog::default();
        let amounts = [5, 90, 40, 40, 70, 10, 60, 40, 1, 80];
        let input: Vec<Transaction> = amounts
            .iter()
            .enumerate()
            .map(|(i, &amount)| tx(&i.to_string(), amount, Some(TransactionCategory::new(format!("c{}", i)))))
            .collect();
        let aggregation = aggregate(&input, &DrillDown::Main, &catalog, &ChartOptions::default());

        assert_eq!(aggregation.buckets.len(), 10);
        let keys: Vec<&str> = aggregation.legend.iter().map(|l| l.key.as_str()).collect();
        assert_eq!(keys, vec!["c1", "c9", "c4", "c6", "c2", "c3", "c7"]);
    }

    #[test]
    fn test_series_payloads() {
        let catalog = CategoryCatalog::default();
        let expenses = filter_by_type(&scenario(), TransactionType::Expenses);

        let main = aggregate(&expenses, &DrillDown::Main, &catalog, &ChartOptions::default());
        let series = main.series();
        assert_eq!(series[0].name, "Food & Drink");
        assert!((series[0].value - 80.0).abs() < f64::EPSILON);
        assert_eq!(series[0].payload, ChartClick::Category { category_id: "food".to_string() });

        let drilled = aggregate(&expenses, &food(), &catalog, &ChartOptions::default());
        let payload = drilled.series()[1].payload.clone();
        assert_eq!(
            payload.into_selection(),
            (Some("food".to_string()), Some("restaurant".to_string()))
        );
    }

    #[test]
    fn test_chart_title() {
        let catalog = CategoryCatalog::default();
        let mut selection = FilterSelection::default();
        assert_eq!(chart_title(&selection, &catalog), "Expenses by category");

        selection.transaction_type = TransactionType::Income;
        assert_eq!(chart_title(&selection, &catalog), "Income by category");

        selection.drill_down = DrillDown::Subcategory {
            category: "food".to_string(),
            subcategory: Some("coffee".to_string()),
        };
        assert_eq!(chart_title(&selection, &catalog), "Food & Drink / Coffee");
    }
}
