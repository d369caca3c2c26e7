//! Local-state reconstruction while the outbox is non-empty.
//!
//! The store holds the last server-confirmed snapshot. Queued operations
//! are a log on top of it: replaying the log over the snapshot, in enqueue
//! order, yields the state the user expects to see. Nothing here mutates
//! the store; these are pure functions over a snapshot and a log.

use std::collections::HashMap;

use log::warn;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;

use crate::accounts::{Account, AccountUpdateRequest};
use crate::categories::Category;
use crate::errors::{DatabaseError, Error, Result};
use crate::remote::endpoints;
use crate::sync::{HttpMethod, PendingOperation};
use crate::transactions::{Transaction, TransactionRequest};

/// Applies queued operations to the confirmed account snapshot.
///
/// Account updates overwrite name, currency, and the running balance, so
/// the last queued update wins outright. Transaction operations adjust the
/// running balance by their signed delta. `mirror` must include rows marked
/// for deletion: a queued delete needs the hidden row to know what amount
/// to subtract.
pub fn reconstruct_account(
    mut account: Account,
    operations: &[PendingOperation],
    categories: &HashMap<i64, Category>,
    mirror: &HashMap<i64, Transaction>,
) -> Result<Account> {
    let mut pending_states: HashMap<i64, TransactionRequest> = HashMap::new();

    for operation in operations {
        if operation.concerns(endpoints::ACCOUNTS) {
            if operation.method == HttpMethod::Put {
                let request: AccountUpdateRequest = decode_payload(operation)?;
                account.name = request.name;
                account.currency = request.currency;
                account.balance = request.balance;
            }
        } else if operation.concerns(endpoints::TRANSACTIONS) {
            account.balance +=
                transaction_delta(operation, categories, mirror, &mut pending_states)?;
        }
    }

    Ok(account)
}

/// Signed balance delta of one queued transaction operation.
///
/// `pending_states` tracks what each transaction looks like after the
/// operations seen so far, so a second edit of the same transaction diffs
/// against the first edit rather than against the confirmed row.
fn transaction_delta(
    operation: &PendingOperation,
    categories: &HashMap<i64, Category>,
    mirror: &HashMap<i64, Transaction>,
    pending_states: &mut HashMap<i64, TransactionRequest>,
) -> Result<Decimal> {
    match operation.method {
        HttpMethod::Post => {
            let request: TransactionRequest = decode_payload(operation)?;
            let Some(category) = categories.get(&request.category_id) else {
                warn!(
                    "skipping queued create with unknown category {}",
                    request.category_id
                );
                return Ok(Decimal::ZERO);
            };
            // A queued create carries no id, so it cannot seed
            // `pending_states`. Later edits of the row find its provisional
            // mirror entry instead.
            Ok(signed_amount(request.amount, category.is_income))
        }
        HttpMethod::Put => {
            let Some(id) = operation.trailing_id() else {
                warn!("skipping queued update without an id: {}", operation.path);
                return Ok(Decimal::ZERO);
            };
            let request: TransactionRequest = decode_payload(operation)?;
            let Some((prior_amount, prior_category_id)) = prior_state(id, pending_states, mirror)
            else {
                warn!("skipping queued update of unknown transaction {id}");
                return Ok(Decimal::ZERO);
            };
            let (Some(prior_category), Some(next_category)) = (
                categories.get(&prior_category_id),
                categories.get(&request.category_id),
            ) else {
                warn!("skipping queued update of transaction {id} with unknown category");
                return Ok(Decimal::ZERO);
            };
            let delta = signed_amount(request.amount, next_category.is_income)
                - signed_amount(prior_amount, prior_category.is_income);
            pending_states.insert(id, request);
            Ok(delta)
        }
        HttpMethod::Delete => {
            let Some(id) = operation.trailing_id() else {
                warn!("skipping queued delete without an id: {}", operation.path);
                return Ok(Decimal::ZERO);
            };
            let Some((prior_amount, prior_category_id)) = prior_state(id, pending_states, mirror)
            else {
                warn!("skipping queued delete of unknown transaction {id}");
                return Ok(Decimal::ZERO);
            };
            let Some(category) = categories.get(&prior_category_id) else {
                warn!("skipping queued delete of transaction {id} with unknown category");
                return Ok(Decimal::ZERO);
            };
            pending_states.remove(&id);
            Ok(-signed_amount(prior_amount, category.is_income))
        }
    }
}

fn prior_state(
    id: i64,
    pending_states: &HashMap<i64, TransactionRequest>,
    mirror: &HashMap<i64, Transaction>,
) -> Option<(Decimal, i64)> {
    if let Some(pending) = pending_states.get(&id) {
        return Some((pending.amount, pending.category_id));
    }
    mirror.get(&id).map(|row| (row.amount, row.category_id))
}

fn signed_amount(amount: Decimal, is_income: bool) -> Decimal {
    if is_income {
        amount
    } else {
        -amount
    }
}

/// Applies queued edits and deletes on top of listed rows.
///
/// Creates are absent on purpose: a queued create already has a provisional
/// row in the mirror, so only updates and deletes need overlaying.
pub fn overlay_transactions(
    mut rows: Vec<Transaction>,
    operations: &[PendingOperation],
) -> Result<Vec<Transaction>> {
    for operation in operations {
        if !operation.concerns(endpoints::TRANSACTIONS) {
            continue;
        }
        match operation.method {
            HttpMethod::Put => {
                let Some(id) = operation.trailing_id() else {
                    continue;
                };
                let request: TransactionRequest = decode_payload(operation)?;
                if let Some(row) = rows.iter_mut().find(|row| row.id == id) {
                    row.category_id = request.category_id;
                    row.amount = request.amount;
                    row.transaction_date = request.transaction_date;
                    row.comment = request.comment;
                    row.updated_at = operation.timestamp;
                }
            }
            HttpMethod::Delete => {
                if let Some(id) = operation.trailing_id() {
                    rows.retain(|row| row.id != id);
                }
            }
            HttpMethod::Post => {}
        }
    }
    Ok(rows)
}

fn decode_payload<T: DeserializeOwned>(operation: &PendingOperation) -> Result<T> {
    let raw = operation.payload.as_deref().ok_or_else(|| {
        Error::Database(DatabaseError::Corrupted(format!(
            "queued operation {} is missing its payload",
            operation.id
        )))
    })?;
    serde_json::from_str(raw).map_err(|err| {
        Error::Database(DatabaseError::Corrupted(format!(
            "queued operation {} has an unreadable payload: {err}",
            operation.id
        )))
    })
}
