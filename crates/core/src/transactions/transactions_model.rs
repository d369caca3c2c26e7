use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::accounts::AccountBrief;
use crate::categories::Category;
use crate::utils::datetime;

/// A transaction as stored locally. `amount` is always positive; the
/// category's direction decides the sign when it hits a balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    pub account_id: i64,
    pub category_id: i64,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    #[serde(with = "datetime::iso8601")]
    pub transaction_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(with = "datetime::iso8601")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "datetime::iso8601")]
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Rows created offline carry provisional negative ids until the server
    /// assigns a real one.
    pub fn is_provisional(&self) -> bool {
        self.id < 0
    }
}

/// Body of `POST /transactions` and `PUT /transactions/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub account_id: i64,
    pub category_id: i64,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    #[serde(with = "datetime::iso8601")]
    pub transaction_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// The expanded shape the server answers transaction reads and writes with:
/// account and category come embedded instead of as bare ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub id: i64,
    pub account: AccountBrief,
    pub category: Category,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    #[serde(with = "datetime::iso8601")]
    pub transaction_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(with = "datetime::iso8601")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "datetime::iso8601")]
    pub updated_at: DateTime<Utc>,
}

impl TransactionResponse {
    /// Flattens the embedded account and category back to ids for the
    /// local mirror.
    pub fn into_transaction(self) -> Transaction {
        Transaction {
            id: self.id,
            account_id: self.account.id,
            category_id: self.category.id,
            amount: self.amount,
            transaction_date: self.transaction_date,
            comment: self.comment,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
