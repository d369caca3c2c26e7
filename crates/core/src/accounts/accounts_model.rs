use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::utils::datetime;

/// A bank account as the server reports it. Monetary amounts travel as JSON
/// strings so they survive the wire without float rounding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub balance: Decimal,
    pub currency: String,
    #[serde(with = "datetime::iso8601")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "datetime::iso8601")]
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Snapshot of the mutable fields, as a full-overwrite update request.
    pub fn update_request(&self) -> AccountUpdateRequest {
        AccountUpdateRequest {
            name: self.name.clone(),
            balance: self.balance,
            currency: self.currency.clone(),
        }
    }
}

/// Body of `PUT /accounts/{id}`. The endpoint overwrites every field it
/// carries, which is what makes replaying a queued account update safe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountUpdateRequest {
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub balance: Decimal,
    pub currency: String,
}

/// Abbreviated account embedded in transaction responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBrief {
    pub id: i64,
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub balance: Decimal,
    pub currency: String,
}

/// Currencies the client knows how to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Currency {
    Rub,
    Usd,
    Eur,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::Rub, Currency::Usd, Currency::Eur];

    /// ISO-4217 code used on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Rub => "RUB",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Rub => "\u{20bd}",
            Currency::Usd => "$",
            Currency::Eur => "\u{20ac}",
        }
    }

    pub fn from_code(code: &str) -> Option<Currency> {
        Currency::ALL.into_iter().find(|c| c.code() == code)
    }
}
