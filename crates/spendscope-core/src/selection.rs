//! Filter state store and the category drill-down state machine
//!
//! The drill-down is a tagged union, so a subcategory can never be selected
//! without its category and the subcategory level always has a category.
//! All changes go through [`FilterStore`] transitions or [`FilterAction`]s.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::time::{MonthNames, Period};
use crate::types::{ChartLevel, TransactionType};

/// Category drill-down state
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "level", rename_all = "lowercase")]
pub enum DrillDown {
    /// No category selected
    #[default]
    Main,
    /// A category, and optionally one of its subcategories, is selected
    Subcategory {
        category: String,
        subcategory: Option<String>,
    },
}

impl DrillDown {
    pub fn category(&self) -> Option<&str> {
        match self {
            DrillDown::Main => None,
            DrillDown::Subcategory { category, .. } => Some(category),
        }
    }

    pub fn subcategory(&self) -> Option<&str> {
        match self {
            DrillDown::Main => None,
            DrillDown::Subcategory { subcategory, .. } => subcategory.as_deref(),
        }
    }

    pub fn level(&self) -> ChartLevel {
        match self {
            DrillDown::Main => ChartLevel::Main,
            DrillDown::Subcategory { .. } => ChartLevel::Subcategory,
        }
    }
}

/// Current selection on the analysis page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FilterSelection {
    pub transaction_type: TransactionType,
    pub period: Period,
    pub drill_down: DrillDown,
}

impl FilterSelection {
    /// Selection for a fresh session
    pub fn new(transaction_type: TransactionType, period: Period) -> Self {
        Self {
            transaction_type,
            period,
            drill_down: DrillDown::Main,
        }
    }

    /// Expenses for the current month
    pub fn current(names: &MonthNames) -> Self {
        Self::new(TransactionType::Expenses, Period::current(names))
    }

    pub fn selected_category(&self) -> Option<&str> {
        self.drill_down.category()
    }

    pub fn selected_subcategory(&self) -> Option<&str> {
        self.drill_down.subcategory()
    }

    pub fn chart_level(&self) -> ChartLevel {
        self.drill_down.level()
    }
}

/// Named transitions on the filter selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FilterAction {
    SetTransactionType { transaction_type: TransactionType },
    SetPeriod { month: Option<String>, year: Option<i32> },
    SelectCategory { category_id: String },
    SelectSubcategory { subcategory_id: String },
    ClearFilters,
    ChartSelection {
        category_id: Option<String>,
        subcategory_id: Option<String>,
    },
    Back,
}

/// Single source of truth for the analysis filters
#[derive(Debug, Clone, Default)]
pub struct FilterStore {
    selection: FilterSelection,
}

impl FilterStore {
    pub fn new(selection: FilterSelection) -> Self {
        Self { selection }
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    /// Apply an action; rejected actions leave the state untouched
    pub fn dispatch(&mut self, action: FilterAction) -> CoreResult<()> {
        log::debug!(target: "spendscope::filters", "dispatch {:?}", action);
        match action {
            FilterAction::SetTransactionType { transaction_type } => {
                self.set_transaction_type(transaction_type);
                Ok(())
            }
            FilterAction::SetPeriod { month, year } => {
                self.set_period(month, year);
                Ok(())
            }
            FilterAction::SelectCategory { category_id } => {
                self.select_category(category_id);
                Ok(())
            }
            FilterAction::SelectSubcategory { subcategory_id } => self.select_subcategory(subcategory_id),
            FilterAction::ClearFilters => {
                self.clear_filters();
                Ok(())
            }
            FilterAction::ChartSelection { category_id, subcategory_id } => {
                self.handle_chart_selection(category_id, subcategory_id)
            }
            FilterAction::Back => {
                self.handle_back_click();
                Ok(())
            }
        }
    }

    /// Switch between expenses and income; a change resets the drill-down
    pub fn set_transaction_type(&mut self, transaction_type: TransactionType) {
        if self.selection.transaction_type != transaction_type {
            self.selection.transaction_type = transaction_type;
            self.selection.drill_down = DrillDown::Main;
        }
    }

    /// Set the month/year filter
    pub fn set_period(&mut self, month: Option<String>, year: Option<i32>) {
        self.selection.period = Period {
            month: month.filter(|m| !m.trim().is_empty()),
            year: year.filter(|&y| y != 0),
        };
    }

    /// Drill into a category, dropping any subcategory
    pub fn select_category(&mut self, category_id: impl Into<String>) {
        self.selection.drill_down = DrillDown::Subcategory {
            category: category_id.into(),
            subcategory: None,
        };
    }

    /// Highlight a subcategory of the selected category
    pub fn select_subcategory(&mut self, subcategory_id: impl Into<String>) -> CoreResult<()> {
        let subcategory_id: String = subcategory_id.into();
        match &mut self.selection.drill_down {
            DrillDown::Subcategory { subcategory, .. } => {
                *subcategory = Some(subcategory_id);
                Ok(())
            }
            DrillDown::Main => Err(CoreError::InvalidTransition {
                message: format!("cannot select subcategory '{}' without a category", subcategory_id),
            }),
        }
    }

    /// Back to the category overview
    pub fn clear_filters(&mut self) {
        self.selection.drill_down = DrillDown::Main;
    }

    /// Apply a chart click payload
    pub fn handle_chart_selection(
        &mut self,
        category_id: Option<String>,
        subcategory_id: Option<String>,
    ) -> CoreResult<()> {
        match (category_id, subcategory_id) {
            (None, _) => {
                self.clear_filters();
                Ok(())
            }
            (Some(category), Some(subcategory)) => {
                self.select_category(category);
                self.select_subcategory(subcategory)
            }
            (Some(category), None) => {
                self.select_category(category);
                Ok(())
            }
        }
    }

    /// Step one level up: subcategory → category → overview
    pub fn handle_back_click(&mut self) {
        self.selection.drill_down = match std::mem::take(&mut self.selection.drill_down) {
            DrillDown::Subcategory { category, subcategory: Some(_) } => DrillDown::Subcategory {
                category,
                subcategory: None,
            },
            DrillDown::Subcategory { .. } | DrillDown::Main => DrillDown::Main,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> FilterStore {
        FilterStore::new(FilterSelection::new(
            TransactionType::Expenses,
            Period { month: Some("March".to_string()), year: Some(2024) },
        ))
    }

    #[test]
    fn test_select_category_resets_subcategory() {
        let mut store = store();
        store.select_category("food");
        store.select_subcategory("restaurant").unwrap();
        store.select_category("transport");

        let selection = store.selection();
        assert_eq!(selection.selected_category(), Some("transport"));
        assert_eq!(selection.selected_subcategory(), None);
        assert_eq!(selection.chart_level(), ChartLevel::Subcategory);
    }

    #[test]
    fn test_select_subcategory_requires_category() {
        let mut store = store();
        let err = store.select_subcategory("restaurant").unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
        assert_eq!(store.selection().drill_down, DrillDown::Main);
    }

    #[test]
    fn test_back_from_subcategory_keeps_category() {
        let mut store = store();
        store.select_category("food");
        store.select_subcategory("restaurant").unwrap();

        store.handle_back_click();
        assert_eq!(store.selection().chart_level(), ChartLevel::Subcategory);
        assert_eq!(store.selection().selected_category(), Some("food"));
        assert_eq!(store.selection().selected_subcategory(), None);

        store.handle_back_click();
        assert_eq!(store.selection().drill_down, DrillDown::Main);

        store.handle_back_click();
        assert_eq!(store.selection().drill_down, DrillDown::Main);
    }

    #[test]
    fn test_chart_selection() {
        let mut store = store();
        store
            .handle_chart_selection(Some("food".to_string()), Some("coffee".to_string()))
            .unwrap();
        assert_eq!(store.selection().selected_subcategory(), Some("coffee"));

        store.handle_chart_selection(Some("bills".to_string()), None).unwrap();
        assert_eq!(store.selection().selected_category(), Some("bills"));
        assert_eq!(store.selection().selected_subcategory(), None);

        store.handle_chart_selection(None, Some("ignored".to_string())).unwrap();
        assert_eq!(store.selection().drill_down, DrillDown::Main);
    }

    #[test]
    fn test_type_change_resets_drill_down() {
        let mut store = store();
        store.select_category("food");
        store.set_transaction_type(TransactionType::Expenses);
        assert_eq!(store.selection().selected_category(), Some("food"));

        store.set_transaction_type(TransactionType::Income);
        assert_eq!(store.selection().drill_down, DrillDown::Main);
        assert_eq!(store.selection().transaction_type, TransactionType::Income);
    }

    #[test]
    fn test_set_period_normalizes_blank_values() {
        let mut store = store();
        store.set_period(Some("  ".to_string()), Some(0));
        assert_eq!(store.selection().period, Period::default());
    }

    #[test]
    fn test_dispatch_actions() {
        let mut store = store();
        store.dispatch(FilterAction::SelectCategory { category_id: "food".to_string() }).unwrap();
        store
            .dispatch(FilterAction::SelectSubcategory { subcategory_id: "groceries".to_string() })
            .unwrap();
        store.dispatch(FilterAction::Back).unwrap();
        assert_eq!(store.selection().selected_subcategory(), None);
        store.dispatch(FilterAction::ClearFilters).unwrap();
        assert!(store
            .dispatch(FilterAction::SelectSubcategory { subcategory_id: "x".to_string() })
            .is_err());
    }

    #[test]
    fn test_action_wire_format() {
        let action: FilterAction =
            serde_json::from_str(r#"{"action": "chart_selection", "category_id": "food", "subcategory_id": null}"#)
                .unwrap();
        assert_eq!(
            action,
            FilterAction::ChartSelection { category_id: Some("food".to_string()), subcategory_id: None }
        );
    }
}
