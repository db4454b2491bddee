//! Transaction sources
//!
//! The finance backend is modelled as the [`TransactionSource`] trait.
//! [`LocalTransactionSource`] serves transactions from a JSON file and
//! [`DemoTransactionSource`] serves generated sample data.

use async_trait::async_trait;
use chrono::{Datelike, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use crate::error::{CoreError, CoreResult};
use crate::models::{Transaction, TransactionCategory, TransactionDraft};

/// Backend providing a user's transactions
#[async_trait]
pub trait TransactionSource: Send + Sync {
    /// All transactions for the user, newest first
    async fn fetch_transactions(&self, user_id: &str) -> CoreResult<Vec<Transaction>>;

    /// Record a manually entered transaction
    async fn add_transaction(&self, user_id: &str, draft: TransactionDraft) -> CoreResult<Transaction>;

    /// Refresh from the backing store; sources without one do nothing
    async fn reload(&self) -> CoreResult<()> {
        Ok(())
    }
}

/// Sort newest first; undated transactions go last
fn sort_newest_first(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| b.date.cmp(&a.date));
}

/// File-backed source; additions are kept in memory only
pub struct LocalTransactionSource {
    path: PathBuf,
    data: RwLock<HashMap<String, Vec<Transaction>>>,
}

impl LocalTransactionSource {
    /// Open the JSON file mapping user ids to transaction lists
    ///
    /// A missing file yields an empty source.
    pub async fn open(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let data = Self::read_file(&path).await?;
        log::info!(
            "Loaded transactions for {} users from {}",
            data.len(),
            path.display()
        );
        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    /// Source with the given data and no backing file
    pub fn from_map(data: HashMap<String, Vec<Transaction>>) -> Self {
        Self {
            path: PathBuf::new(),
            data: RwLock::new(data),
        }
    }

    async fn read_file(path: &Path) -> CoreResult<HashMap<String, Vec<Transaction>>> {
        if !tokio::fs::try_exists(path).await? {
            log::warn!("Transactions file {} not found, starting empty", path.display());
            return Ok(HashMap::new());
        }
        let content = tokio::fs::read_to_string(path).await?;
        let mut data: HashMap<String, Vec<Transaction>> =
            serde_json::from_str(&content).map_err(|e| CoreError::Service {
                message: format!("Malformed transactions file {}: {}", path.display(), e),
            })?;
        for transactions in data.values_mut() {
            sort_newest_first(transactions);
        }
        Ok(data)
    }
}

#[async_trait]
impl TransactionSource for LocalTransactionSource {
    async fn fetch_transactions(&self, user_id: &str) -> CoreResult<Vec<Transaction>> {
        let data = self.data.read().await;
        Ok(data.get(user_id).cloned().unwrap_or_default())
    }

    async fn add_transaction(&self, user_id: &str, draft: TransactionDraft) -> CoreResult<Transaction> {
        let transaction = draft.into_transaction(spendscope_utils::generate_id("tx"), false)?;
        let mut data = self.data.write().await;
        data.entry(user_id.to_string())
            .or_default()
            .insert(0, transaction.clone());
        log::debug!("Added transaction {} for {}", transaction.id, user_id);
        Ok(transaction)
    }

    /// Re-read the backing file, dropping in-memory additions
    async fn reload(&self) -> CoreResult<()> {
        if self.path.as_os_str().is_empty() {
            return Ok(());
        }
        let fresh = Self::read_file(&self.path).await?;
        log::info!("Reloaded transactions for {} users from {}", fresh.len(), self.path.display());
        *self.data.write().await = fresh;
        Ok(())
    }
}

/// Generated sample data anchored on the current month
///
/// Every user sees the same seed plus only their own additions.
pub struct DemoTransactionSource {
    today: NaiveDate,
    added: RwLock<HashMap<String, Vec<Transaction>>>,
}

impl Default for DemoTransactionSource {
    fn default() -> Self {
        Self::new(Utc::now().date_naive())
    }
}

impl DemoTransactionSource {
    /// Demo data relative to `today`
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            added: RwLock::new(HashMap::new()),
        }
    }

    /// The seeded sample transactions
    pub fn seed(&self) -> Vec<Transaction> {
        // (months back, day, amount in cents, merchant, category, subcategory)
        const SEED: &[(u32, u32, i64, &str, Option<&str>, Option<&str>)] = &[
            (0, 1, -325000, "Acme Corp", Some("salary"), Some("payroll")),
            (0, 2, 95000, "City Apartments", Some("housing"), Some("rent")),
            (0, 3, 4520, "Green Market", Some("food"), Some("groceries")),
            (0, 4, 1280, "Bean There", Some("food"), Some("coffee")),
            (0, 5, 6400, "Trattoria Roma", Some("food"), Some("restaurant")),
            (0, 6, 5500, "Shell", Some("transport"), Some("fuel")),
            (0, 7, 1599, "StreamFlix", Some("entertainment"), Some("streaming")),
            (0, 8, 3999, "Telco One", Some("bills"), Some("phone")),
            (0, 9, 8900, "Urban Threads", Some("shopping"), Some("clothing")),
            (0, 10, 2350, "Corner Pharmacy", Some("health"), Some("pharmacy")),
            (0, 11, 1800, "Farmers Stall", Some("food"), None),
            (0, 12, 2500, "Unknown Merchant", None, None),
            (0, 13, -15000, "Jane Doe", Some("transfers"), Some("incoming")),
            (1, 1, -325000, "Acme Corp", Some("salary"), Some("payroll")),
            (1, 2, 95000, "City Apartments", Some("housing"), Some("rent")),
            (1, 6, 3890, "Green Market", Some("food"), Some("groceries")),
            (1, 9, 2240, "Metro Transit", Some("transport"), Some("public_transport")),
            (1, 14, 12000, "Skyways", Some("travel"), Some("flights")),
            (1, 20, 4500, "Gym Plus", Some("health"), Some("fitness")),
            (1, 24, -50000, "Acme Corp", Some("salary"), Some("bonus")),
            (2, 1, -325000, "Acme Corp", Some("salary"), Some("payroll")),
            (2, 3, 7120, "Green Market", Some("food"), Some("groceries")),
            (2, 15, 19900, "Tech Store", Some("shopping"), Some("electronics")),
            (2, 18, 2990, "Online Course Co", Some("education"), None),
        ];

        let anchor = self.today.with_day(1).unwrap_or(self.today);
        let mut transactions: Vec<Transaction> = SEED
            .iter()
            .enumerate()
            .filter_map(|(i, &(back, day, cents, merchant, category, subcategory))| {
                let month_start = anchor.checked_sub_months(Months::new(back))?;
                let date = month_start.with_day(day)?;
                let category = category.map(|c| match subcategory {
                    Some(s) => TransactionCategory::with_subcategory(c, s),
                    None => TransactionCategory::new(c),
                });
                Some(Transaction {
                    id: format!("demo-{}", i + 1),
                    amount: Decimal::new(cents, 2),
                    date: Some(date),
                    merchant_name: merchant.to_string(),
                    category,
                    is_manual: false,
                    is_test_data: true,
                })
            })
            .collect();
        sort_newest_first(&mut transactions);
        transactions
    }
}

#[async_trait]
impl TransactionSource for DemoTransactionSource {
    async fn fetch_transactions(&self, user_id: &str) -> CoreResult<Vec<Transaction>> {
        let mut transactions = self.added.read().await.get(user_id).cloned().unwrap_or_default();
        transactions.extend(self.seed());
        Ok(transactions)
    }

    async fn add_transaction(&self, user_id: &str, draft: TransactionDraft) -> CoreResult<Transaction> {
        let transaction = draft.into_transaction(spendscope_utils::generate_id("demo"), true)?;
        self.added
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .insert(0, transaction.clone());
        Ok(transaction)
    }
}
