//! Core data models for transactions

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::UNCATEGORIZED_KEY;
use crate::error::{CoreError, CoreResult};

/// Subcategory reference attached to a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSubcategory {
    pub id: String,
}

/// Category reference attached to a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionCategory {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<TransactionSubcategory>,
}

impl TransactionCategory {
    /// Category without a subcategory
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            subcategory: None,
        }
    }

    /// Category with a subcategory
    pub fn with_subcategory(id: impl Into<String>, subcategory: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            subcategory: Some(TransactionSubcategory { id: subcategory.into() }),
        }
    }
}

/// Transaction information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction identifier
    pub id: String,
    /// Signed amount, positive for expenses and negative for income
    pub amount: Decimal,
    /// Booking date; transactions without one never match a period
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Merchant or counterparty name
    #[serde(default)]
    pub merchant_name: String,
    /// Category assignment
    #[serde(default)]
    pub category: Option<TransactionCategory>,
    /// Entered by hand rather than imported from the bank
    #[serde(default)]
    pub is_manual: bool,
    /// Seeded demo data
    #[serde(default)]
    pub is_test_data: bool,
}

impl Transaction {
    /// Category id, if assigned
    pub fn category_id(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.id.as_str())
    }

    /// Category id, or the reserved uncategorized key
    pub fn category_key(&self) -> &str {
        self.category_id().unwrap_or(UNCATEGORIZED_KEY)
    }

    /// Subcategory id, if assigned
    pub fn subcategory_id(&self) -> Option<&str> {
        self.category
            .as_ref()
            .and_then(|c| c.subcategory.as_ref())
            .map(|s| s.id.as_str())
    }

    /// Absolute amount
    pub fn abs_amount(&self) -> Decimal {
        self.amount.abs()
    }
}

/// Sum of absolute amounts
pub fn total_abs_amount<'a, I>(transactions: I) -> Decimal
where
    I: IntoIterator<Item = &'a Transaction>,
{
    transactions.into_iter().map(Transaction::abs_amount).sum()
}

/// A transaction entered by the user, before the source assigns an id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub amount: Decimal,
    pub date: NaiveDate,
    pub merchant_name: String,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub subcategory_id: Option<String>,
}

impl TransactionDraft {
    /// Check the draft can become a transaction
    pub fn validate(&self) -> CoreResult<()> {
        if self.merchant_name.trim().is_empty() {
            return Err(CoreError::Validation {
                message: "Merchant name must not be empty".to_string(),
            });
        }
        if self.amount.is_zero() {
            return Err(CoreError::Validation {
                message: "Amount must not be zero".to_string(),
            });
        }
        let category = self.category_id.as_deref().map(str::trim).filter(|c| !c.is_empty());
        let subcategory = self.subcategory_id.as_deref().map(str::trim).filter(|s| !s.is_empty());
        if subcategory.is_some() && category.is_none() {
            return Err(CoreError::Validation {
                message: "A subcategory requires a category".to_string(),
            });
        }
        Ok(())
    }

    /// Turn a validated draft into a manual transaction
    pub fn into_transaction(self, id: String, is_test_data: bool) -> CoreResult<Transaction> {
        self.validate()?;

        let subcategory = self
            .subcategory_id
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(|id| TransactionSubcategory { id });
        let category = self
            .category_id
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .map(|id| TransactionCategory { id, subcategory });

        Ok(Transaction {
            id,
            amount: self.amount,
            date: Some(self.date),
            merchant_name: self.merchant_name.trim().to_string(),
            category,
            is_manual: true,
            is_test_data,
        })
    }
}
