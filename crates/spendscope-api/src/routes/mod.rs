//! Route modules for the API server
//!
//! Each module follows a consistent structure:
//! - mod.rs: Module declaration and exports
//! - api.rs: JSON API endpoints
//! - page.rs: HTMX page rendering

pub mod analysis;
pub mod session;
pub mod settings;
pub mod transactions;

use rust_decimal::Decimal;
use spendscope_config::{CurrencyConfig, SymbolPosition};

/// Format an amount with the configured currency settings
pub fn money(currency: &CurrencyConfig, amount: Decimal) -> String {
    spendscope_utils::format_amount(
        amount,
        currency.decimal_places,
        &currency.default_currency,
        currency.symbol_position == SymbolPosition::Before,
    )
}
