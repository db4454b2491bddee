//! Per-user analysis session
//!
//! Holds the fetched transactions, the filter store and the demo flag for
//! one user. Fetches are split into [`AnalysisSession::begin_fetch`] and
//! [`AnalysisSession::complete_fetch`] so the source can be awaited without
//! holding the session lock; a completion whose ticket is stale is dropped.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use spendscope_config::Config;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::catalog::CategoryCatalog;
use crate::error::{CoreError, CoreResult};
use crate::filters::{filter_by_category, filter_by_date, filter_by_type};
use crate::models::{total_abs_amount, Transaction};
use crate::reports::{aggregate, chart_title, period_label, Aggregation, ChartOptions, ChartSeries};
use crate::selection::{DrillDown, FilterAction, FilterSelection, FilterStore};
use crate::time::{MonthNames, Period};
use crate::types::{ChartLevel, TransactionType};

/// Settings shared by every session
#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub month_names: MonthNames,
    pub default_type: TransactionType,
    pub start_at_current_month: bool,
    pub chart: ChartOptions,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            month_names: MonthNames::default(),
            default_type: TransactionType::Expenses,
            start_at_current_month: true,
            chart: ChartOptions::default(),
        }
    }
}

impl AnalysisSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            month_names: MonthNames::new(&config.analysis.month_names),
            default_type: config.analysis.default_type.into(),
            start_at_current_month: config.analysis.start_at_current_month,
            chart: ChartOptions::from(&config.charts),
        }
    }

    /// Selection a new session starts with
    pub fn initial_selection(&self) -> FilterSelection {
        let period = if self.start_at_current_month {
            Period::current(&self.month_names)
        } else {
            Period::default()
        };
        FilterSelection::new(self.default_type, period)
    }
}

/// Loading status of the transaction collection
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed { message: String },
}

/// Process-wide source of session ids
static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Handle for an in-flight fetch
///
/// Only the session that issued the ticket accepts it, and only while no
/// newer fetch or demo toggle has happened there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    session_id: u64,
    generation: u64,
    user_id: Option<String>,
    demo_mode: bool,
}

impl FetchTicket {
    /// User to fetch for; `None` only in demo mode
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Whether the fetch should hit the demo source
    pub fn demo_mode(&self) -> bool {
        self.demo_mode
    }
}

/// Complete payload for the analysis page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisView {
    pub selection: FilterSelection,
    pub title: String,
    pub period_label: String,
    /// Σ|amount| over the listed transactions
    pub total: Decimal,
    pub chart_level: ChartLevel,
    pub aggregation: Aggregation,
    pub series: Vec<ChartSeries>,
    pub transactions: Vec<Transaction>,
    pub transaction_count: usize,
    pub load_state: LoadState,
    /// Dismissible service error banner
    pub error: Option<String>,
    pub demo_mode: bool,
}

#[derive(Debug, Clone)]
struct CachedView {
    selection: FilterSelection,
    revision: u64,
    view: AnalysisView,
}

/// Analysis state for one user
#[derive(Debug, Clone)]
pub struct AnalysisSession {
    id: u64,
    user_id: Option<String>,
    demo_mode: bool,
    transactions: Vec<Transaction>,
    /// Bumped whenever `transactions` changes
    revision: u64,
    /// Bumped whenever in-flight fetches become irrelevant
    generation: u64,
    load_state: LoadState,
    error: Option<String>,
    store: FilterStore,
    catalog: Arc<CategoryCatalog>,
    settings: AnalysisSettings,
    cache: Option<CachedView>,
    computations: u64,
}

impl AnalysisSession {
    pub fn new(
        user_id: Option<String>,
        demo_mode: bool,
        catalog: Arc<CategoryCatalog>,
        settings: AnalysisSettings,
    ) -> Self {
        let store = FilterStore::new(settings.initial_selection());
        Self {
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            user_id: user_id.filter(|u| !u.trim().is_empty()),
            demo_mode,
            transactions: Vec::new(),
            revision: 0,
            generation: 0,
            load_state: LoadState::Idle,
            error: None,
            store,
            catalog,
            settings,
            cache: None,
            computations: 0,
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn demo_mode(&self) -> bool {
        self.demo_mode
    }

    pub fn selection(&self) -> &FilterSelection {
        self.store.selection()
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// How many times the view has been recomputed
    pub fn computations(&self) -> u64 {
        self.computations
    }

    /// Apply a filter action
    pub fn dispatch(&mut self, action: FilterAction) -> CoreResult<()> {
        self.store.dispatch(action)
    }

    /// Start a fetch; fails without an identity unless in demo mode
    pub fn begin_fetch(&mut self) -> CoreResult<FetchTicket> {
        if !self.demo_mode && self.user_id.is_none() {
            return Err(CoreError::MissingIdentity);
        }
        self.generation += 1;
        self.load_state = LoadState::Loading;
        log::debug!(
            target: "spendscope::session",
            "Fetch {} started (demo: {})",
            self.generation,
            self.demo_mode
        );
        Ok(FetchTicket {
            session_id: self.id,
            generation: self.generation,
            user_id: self.user_id.clone(),
            demo_mode: self.demo_mode,
        })
    }

    /// Finish a fetch; returns false when the ticket is stale
    ///
    /// On failure the previous transactions are kept and the error is shown
    /// as a banner. Filters are never touched.
    pub fn complete_fetch(&mut self, ticket: FetchTicket, result: CoreResult<Vec<Transaction>>) -> bool {
        if ticket.session_id != self.id || ticket.generation != self.generation {
            log::debug!(
                target: "spendscope::session",
                "Discarding stale fetch {}/{} (current {}/{})",
                ticket.session_id,
                ticket.generation,
                self.id,
                self.generation
            );
            return false;
        }

        match result {
            Ok(transactions) => {
                log::info!(
                    target: "spendscope::session",
                    "Loaded {} transactions",
                    transactions.len()
                );
                self.transactions = transactions;
                self.revision += 1;
                self.load_state = LoadState::Loaded;
                self.error = None;
            }
            Err(e) => {
                let message = e.to_string();
                self.load_state = LoadState::Failed { message: message.clone() };
                self.error = Some(message);
            }
        }
        true
    }

    /// Prepend a transaction created during this session
    pub fn add_local(&mut self, transaction: Transaction) {
        self.transactions.insert(0, transaction);
        self.revision += 1;
    }

    /// Hide the error banner
    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Switch demo mode; the current data and any in-flight fetch are dropped
    pub fn set_demo_mode(&mut self, enabled: bool) {
        if self.demo_mode == enabled {
            return;
        }
        log::info!(target: "spendscope::session", "Demo mode {}", if enabled { "on" } else { "off" });
        self.demo_mode = enabled;
        self.generation += 1;
        self.transactions.clear();
        self.revision += 1;
        self.load_state = LoadState::Idle;
        self.error = None;
    }

    /// Page payload for the current selection
    ///
    /// The filtered data is cached per selection and data revision; load
    /// status and error banner are always current.
    pub fn view(&mut self) -> AnalysisView {
        let selection = self.store.selection().clone();
        let fresh = match &self.cache {
            Some(cached) => cached.selection == selection && cached.revision == self.revision,
            None => false,
        };
        if !fresh {
            let view = self.compute_view(&selection);
            self.computations += 1;
            self.cache = Some(CachedView {
                selection,
                revision: self.revision,
                view,
            });
        }

        let mut view = match &self.cache {
            Some(cached) => cached.view.clone(),
            None => self.compute_view(self.store.selection()),
        };
        view.load_state = self.load_state.clone();
        view.error = self.error.clone();
        view.demo_mode = self.demo_mode;
        view
    }

    fn compute_view(&self, selection: &FilterSelection) -> AnalysisView {
        let names = &self.settings.month_names;
        let by_type = filter_by_type(&self.transactions, selection.transaction_type);
        let by_date = filter_by_date(
            &by_type,
            selection.period.month.as_deref(),
            selection.period.year,
            names,
        );

        // The chart keeps every subcategory of the drilled category visible
        let chart_scope = match &selection.drill_down {
            DrillDown::Main => DrillDown::Main,
            DrillDown::Subcategory { category, .. } => DrillDown::Subcategory {
                category: category.clone(),
                subcategory: None,
            },
        };
        let chart_input = filter_by_category(&by_date, &chart_scope);
        let aggregation = aggregate(&chart_input, &selection.drill_down, &self.catalog, &self.settings.chart);
        let series = aggregation.series();

        let listed = filter_by_category(&by_date, &selection.drill_down);
        AnalysisView {
            selection: selection.clone(),
            title: chart_title(selection, &self.catalog),
            period_label: period_label(selection, names),
            total: total_abs_amount(&listed),
            chart_level: selection.chart_level(),
            aggregation,
            series,
            transaction_count: listed.len(),
            transactions: listed,
            load_state: LoadState::Idle,
            error: None,
            demo_mode: self.demo_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionCategory;
    use chrono::NaiveDate;

    fn tx(id: &str, amount: i64, day: u32, category: Option<TransactionCategory>) -> Transaction {
        Transaction {
            id: id.to_string(),
            amount: Decimal::from(amount),
            date: NaiveDate::from_ymd_opt(2024, 3, day),
            merchant_name: format!("Merchant {}", id),
            category,
            is_manual: false,
            is_test_data: false,
        }
    }

    fn data() -> Vec<Transaction> {
        vec![
            tx("a", 50, 1, Some(TransactionCategory::new("food"))),
            tx("b", -1000, 2, Some(TransactionCategory::new("salary"))),
            tx("c", 30, 3, Some(TransactionCategory::with_subcategory("food", "restaurant"))),
            tx("d", 20, 4, Some(TransactionCategory::new("transport"))),
        ]
    }

    fn session(user: Option<&str>) -> AnalysisSession {
        let settings = AnalysisSettings {
            start_at_current_month: false,
            ..AnalysisSettings::default()
        };
        AnalysisSession::new(
            user.map(str::to_string),
            false,
            Arc::new(CategoryCatalog::default()),
            settings,
        )
    }

    fn loaded() -> AnalysisSession {
        let mut session = session(Some("alice"));
        let ticket = session.begin_fetch().unwrap();
        assert!(session.complete_fetch(ticket, Ok(data())));
        session
    }

    #[test]
    fn test_missing_identity_blocks_fetch() {
        let mut session = session(None);
        assert!(matches!(session.begin_fetch(), Err(CoreError::MissingIdentity)));
        assert_eq!(session.load_state(), &LoadState::Idle);

        session.set_demo_mode(true);
        let ticket = session.begin_fetch().unwrap();
        assert!(ticket.demo_mode());
        assert_eq!(ticket.user_id(), None);
    }

    #[test]
    fn test_blank_user_id_is_missing() {
        let mut session = session(Some("  "));
        assert!(session.begin_fetch().is_err());
    }

    #[test]
    fn test_view_main_and_drill_down() {
        let mut session = loaded();
        let view = session.view();
        assert_eq!(view.title, "Expenses by category");
        assert_eq!(view.period_label, "All time");
        assert_eq!(view.total, Decimal::from(100));
        assert_eq!(view.transaction_count, 3);
        assert_eq!(view.aggregation.buckets.len(), 2);
        assert_eq!(view.load_state, LoadState::Loaded);

        session
            .dispatch(FilterAction::ChartSelection {
                category_id: Some("food".to_string()),
                subcategory_id: Some("restaurant".to_string()),
            })
            .unwrap();
        let view = session.view();
        assert_eq!(view.chart_level, ChartLevel::Subcategory);
        assert_eq!(view.total, Decimal::from(30));
        assert_eq!(view.transaction_count, 1);
        // Siblings stay in the chart, dimmed
        assert_eq!(view.aggregation.buckets.len(), 2);
        assert!(view.aggregation.buckets.iter().any(|b| b.emphasized));
    }

    #[test]
    fn test_view_is_memoized() {
        let mut session = loaded();
        session.view();
        session.view();
        assert_eq!(session.computations(), 1);

        session.dismiss_error();
        session.view();
        assert_eq!(session.computations(), 1);

        session.dispatch(FilterAction::SelectCategory { category_id: "food".to_string() }).unwrap();
        session.view();
        assert_eq!(session.computations(), 2);

        session.add_local(tx("e", 5, 5, Some(TransactionCategory::new("food"))));
        let view = session.view();
        assert_eq!(session.computations(), 3);
        assert_eq!(view.transactions[0].id, "e");
    }

    #[test]
    fn test_stale_fetch_is_discarded() {
        let mut session = session(Some("alice"));
        let first = session.begin_fetch().unwrap();
        let second = session.begin_fetch().unwrap();

        assert!(!session.complete_fetch(first, Ok(data())));
        assert!(session.transactions().is_empty());
        assert_eq!(session.load_state(), &LoadState::Loading);

        assert!(session.complete_fetch(second, Ok(data())));
        assert_eq!(session.transactions().len(), 4);
    }

    #[test]
    fn test_ticket_is_bound_to_its_session() {
        let mut ended = session(Some("alice"));
        let ticket = ended.begin_fetch().unwrap();

        let mut replacement = session(Some("alice"));
        replacement.begin_fetch().unwrap();
        assert!(!replacement.complete_fetch(ticket, Ok(data())));
        assert!(replacement.transactions().is_empty());
        assert_eq!(replacement.load_state(), &LoadState::Loading);
    }

    #[test]
    fn test_demo_toggle_invalidates_fetch() {
        let mut session = session(Some("alice"));
        let ticket = session.begin_fetch().unwrap();
        session.set_demo_mode(true);
        assert!(!session.complete_fetch(ticket, Ok(data())));
        assert!(session.transactions().is_empty());
        assert_eq!(session.load_state(), &LoadState::Idle);
    }

    #[test]
    fn test_service_error_keeps_data_and_filters() {
        let mut session = loaded();
        session.dispatch(FilterAction::SelectCategory { category_id: "food".to_string() }).unwrap();

        let ticket = session.begin_fetch().unwrap();
        let err = CoreError::Service { message: "timeout".to_string() };
        assert!(session.complete_fetch(ticket, Err(err)));

        let view = session.view();
        assert_eq!(view.error.as_deref(), Some("Transaction service error: timeout"));
        assert!(matches!(view.load_state, LoadState::Failed { .. }));
        assert_eq!(view.selection.selected_category(), Some("food"));
        assert_eq!(session.transactions().len(), 4);

        session.dismiss_error();
        assert_eq!(session.view().error, None);
    }

    #[test]
    fn test_type_switch_changes_view() {
        let mut session = loaded();
        session
            .dispatch(FilterAction::SetTransactionType { transaction_type: TransactionType::Income })
            .unwrap();
        let view = session.view();
        assert_eq!(view.title, "Income by category");
        assert_eq!(view.total, Decimal::from(1000));
        assert_eq!(view.aggregation.buckets[0].key, "salary");
    }

    #[test]
    fn test_period_filter_applies() {
        let mut session = loaded();
        session
            .dispatch(FilterAction::SetPeriod { month: Some("April".to_string()), year: Some(2024) })
            .unwrap();
        let view = session.view();
        assert_eq!(view.period_label, "April 2024");
        assert!(!view.aggregation.has_data());
        assert_eq!(view.total, Decimal::ZERO);
    }
}
