//! Raw node payload → [`TransactionRecord`] / [`Chunk`].
//!
//! The search endpoints return parallel `txs[]` and `receipts[]` arrays,
//! newest transaction first, plus `firstPage`/`lastPage` flags in the node's
//! newest-first terms. Everything here normalizes to oldest-first.

use crate::error::FetchError;
use crate::types::{Chunk, TransactionRecord};
use crate::util_text::strip_hex_prefix;
use num_bigint::BigUint;
use num_traits::Zero;
use serde_json::Value;

/// Parse one `ots_searchTransactions{Before,After}` result.
pub fn process_search_page(raw: &Value) -> Result<Chunk, FetchError> {
    let txs = raw
        .get("txs")
        .and_then(Value::as_array)
        .ok_or_else(|| FetchError::shape("search result has no txs array"))?;
    let receipts = raw
        .get("receipts")
        .and_then(Value::as_array)
        .ok_or_else(|| FetchError::shape("search result has no receipts array"))?;

    if txs.len() != receipts.len() {
        return Err(FetchError::shape(format!(
            "search result has {} txs but {} receipts",
            txs.len(),
            receipts.len()
        )));
    }

    let mut records = txs
        .iter()
        .zip(receipts)
        .map(|(tx, receipt)| process_transaction(tx, receipt))
        .collect::<Result<Vec<_>, _>>()?;

    records.sort_by_key(TransactionRecord::position);
    records.dedup_by(|a, b| a.hash == b.hash);

    // firstPage = newest end, lastPage = oldest end
    let first_page = raw.get("firstPage").and_then(Value::as_bool).unwrap_or(false);
    let last_page = raw.get("lastPage").and_then(Value::as_bool).unwrap_or(false);

    Ok(Chunk {
        txs: records,
        touches_first: last_page,
        touches_last: first_page,
    })
}

/// Merge a transaction with its receipt.
pub fn process_transaction(tx: &Value, receipt: &Value) -> Result<TransactionRecord, FetchError> {
    let hash = str_field(tx, "hash")?;

    if let Some(receipt_hash) = receipt.get("transactionHash").and_then(Value::as_str) {
        if !receipt_hash.eq_ignore_ascii_case(&hash) {
            return Err(FetchError::shape(format!(
                "receipt {receipt_hash} does not belong to transaction {hash}"
            )));
        }
    }

    let block_number = match opt_quantity_u64(tx, "blockNumber")? {
        Some(n) => n,
        None => quantity_u64(receipt, "blockNumber")?,
    };
    let timestamp = quantity_u64(receipt, "timestamp")?;
    let index_in_block = quantity_u64(receipt, "transactionIndex")?;

    let gas_price = match opt_quantity_big(tx, "gasPrice")? {
        Some(p) => p,
        None => quantity_big(receipt, "effectiveGasPrice")?,
    };
    let gas_used = quantity_big(receipt, "gasUsed")?;
    let fee = &gas_used * &gas_price;

    let input = tx.get("input").or_else(|| tx.get("data"));
    let data = match input.and_then(Value::as_str) {
        Some(s) => hex::decode(strip_hex_prefix(s))
            .map_err(|e| FetchError::shape(format!("bad input of {hash}: {e}")))?,
        None => Vec::new(),
    };

    // Pre-Byzantium receipts carry a state root instead of a status.
    let status = opt_quantity_u64(receipt, "status")?.map_or(true, |s| s == 1);

    Ok(TransactionRecord {
        block_number,
        timestamp,
        index_in_block,
        from: str_field(tx, "from")?,
        to: opt_str_field(tx, "to"),
        created_contract_address: opt_str_field(receipt, "contractAddress"),
        value: opt_quantity_big(tx, "value")?.unwrap_or_else(BigUint::zero),
        fee,
        gas_price,
        data,
        status,
        hash,
    })
}

fn str_field(v: &Value, field: &str) -> Result<String, FetchError> {
    v.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| FetchError::shape(format!("missing string field `{field}`")))
}

fn opt_str_field(v: &Value, field: &str) -> Option<String> {
    v.get(field).and_then(Value::as_str).map(str::to_string)
}

fn quantity_u64(v: &Value, field: &str) -> Result<u64, FetchError> {
    opt_quantity_u64(v, field)?
        .ok_or_else(|| FetchError::shape(format!("missing quantity `{field}`")))
}

fn opt_quantity_u64(v: &Value, field: &str) -> Result<Option<u64>, FetchError> {
    match v.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(raw) => parse_u64(raw)
            .map(Some)
            .ok_or_else(|| FetchError::shape(format!("bad quantity `{field}`: {raw}"))),
    }
}

fn quantity_big(v: &Value, field: &str) -> Result<BigUint, FetchError> {
    opt_quantity_big(v, field)?
        .ok_or_else(|| FetchError::shape(format!("missing quantity `{field}`")))
}

fn opt_quantity_big(v: &Value, field: &str) -> Result<Option<BigUint>, FetchError> {
    match v.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(raw) => parse_big(raw)
            .map(Some)
            .ok_or_else(|| FetchError::shape(format!("bad quantity `{field}`: {raw}"))),
    }
}

/// Hex (`0x..`) or decimal quantity, as string or JSON number.
fn parse_u64(raw: &Value) -> Option<u64> {
    match raw {
        Value::Number(n) => n.as_u64(),
        Value::String(s) if s.starts_with("0x") || s.starts_with("0X") => {
            let body = strip_hex_prefix(s);
            if body.is_empty() {
                Some(0)
            } else {
                u64::from_str_radix(body, 16).ok()
            }
        }
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn parse_big(raw: &Value) -> Option<BigUint> {
    match raw {
        Value::Number(n) => n.as_u64().map(BigUint::from),
        Value::String(s) if s.starts_with("0x") || s.starts_with("0X") => {
            let body = strip_hex_prefix(s);
            if body.is_empty() {
                Some(BigUint::zero())
            } else {
                BigUint::parse_bytes(body.as_bytes(), 16)
            }
        }
        Value::String(s) => BigUint::parse_bytes(s.as_bytes(), 10),
        _ => None,
    }
}
