//! Transaction list rendering

use spendscope_config::CurrencyConfig;
use spendscope_core::{CategoryCatalog, Transaction};
use spendscope_utils::escape_html;

use crate::routes::money;

/// Render the filtered transaction list
pub fn render_transaction_list(
    transactions: &[Transaction],
    catalog: &CategoryCatalog,
    currency: &CurrencyConfig,
) -> String {
    if transactions.is_empty() {
        return "<div class='bg-white rounded-xl shadow-sm p-6 text-center text-gray-500'>No transactions</div>"
            .to_string();
    }

    let mut html = format!(
        "<div class='bg-white rounded-xl shadow-sm'><div class='px-6 py-3 border-b text-sm text-gray-500'>{} transactions</div><ul class='divide-y'>",
        transactions.len()
    );
    for tx in transactions {
        let category = catalog.resolve_category(tx.category_id()).entry();
        let label = match tx.subcategory_id() {
            Some(sub) => {
                let subcategory = tx
                    .category_id()
                    .map(|c| catalog.resolve_subcategory(c, Some(sub)).entry().display_name())
                    .unwrap_or(sub);
                format!("{} · {}", category.display_name(), subcategory)
            }
            None => category.display_name().to_string(),
        };
        let date = tx
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "—".to_string());
        let badges = match (tx.is_manual, tx.is_test_data) {
            (true, _) => "<span class='ml-2 text-xs text-indigo-600'>manual</span>",
            (false, true) => "<span class='ml-2 text-xs text-yellow-600'>demo</span>",
            _ => "",
        };
        let amount_class = if tx.amount.is_sign_negative() { "text-green-600" } else { "text-gray-900" };

        html.push_str(&format!(
            r#"<li class='flex items-center justify-between px-6 py-3'>
                <div class='flex items-center gap-3'>
                    <span class='inline-block w-2 h-8 rounded' style='background-color: {}'></span>
                    <div><p class='font-medium'>{}{}</p><p class='text-xs text-gray-500'>{} · {}</p></div>
                </div>
                <span class='font-medium {}'>{}</span>
            </li>"#,
            escape_html(&category.color),
            escape_html(&tx.merchant_name),
            badges,
            date,
            escape_html(&label),
            amount_class,
            money(currency, tx.abs_amount())
        ));
    }
    html.push_str("</ul></div>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use spendscope_core::TransactionCategory;

    #[test]
    fn test_list_escapes_and_labels() {
        let transactions = vec![Transaction {
            id: "1".to_string(),
            amount: Decimal::from(12),
            date: None,
            merchant_name: "<b>Shop</b>".to_string(),
            category: Some(TransactionCategory::with_subcategory("food", "coffee")),
            is_manual: true,
            is_test_data: false,
        }];
        let html = render_transaction_list(&transactions, &CategoryCatalog::default(), &CurrencyConfig::default());
        assert!(html.contains("&lt;b&gt;Shop&lt;/b&gt;"));
        assert!(html.contains("Food &amp; Drink · Coffee"));
        assert!(html.contains("€12.00"));
        assert!(html.contains("manual"));
    }

    #[test]
    fn test_empty_list() {
        let html = render_transaction_list(&[], &CategoryCatalog::default(), &CurrencyConfig::default());
        assert!(html.contains("No transactions"));
    }
}
