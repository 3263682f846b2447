//! Field-by-field coercion of untrusted JSON (persisted blobs, imported
//! backups) into typed records. Normalization never fails: every invalid
//! value degrades to a safe default, and normalizing an already-normalized
//! record is the identity.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::domain::{
    Account, AccountKind, DocumentCategory, DocumentItem, Transaction, TransactionKind,
};
use crate::storage::{Clock, IdSource};

/// Transaction categories written by an early schema as fixed placeholders.
/// They carry no information, so they are cleared and the display layer
/// derives a default from the transaction type instead.
const LEGACY_PLACEHOLDER_CATEGORIES: &[&str] = &["Income", "Expense", "Transfer"];

pub fn normalize_accounts(raw: Option<&Value>, ids: &dyn IdSource, clock: &dyn Clock) -> Vec<Account> {
    as_array(raw)
        .iter()
        .map(|value| normalize_account(value, ids, clock))
        .collect()
}

pub fn normalize_transactions(
    raw: Option<&Value>,
    ids: &dyn IdSource,
    clock: &dyn Clock,
) -> Vec<Transaction> {
    as_array(raw)
        .iter()
        .map(|value| normalize_transaction(value, ids, clock))
        .collect()
}

pub fn normalize_documents(
    raw: Option<&Value>,
    ids: &dyn IdSource,
    clock: &dyn Clock,
) -> Vec<DocumentItem> {
    as_array(raw)
        .iter()
        .map(|value| normalize_document(value, ids, clock))
        .collect()
}

pub fn normalize_account(value: &Value, ids: &dyn IdSource, clock: &dyn Clock) -> Account {
    Account {
        id: id_field(value, ids),
        name: string_field(value, "name").unwrap_or_default(),
        kind: match str_field(value, "type") {
            Some("liability") => AccountKind::Liability,
            _ => AccountKind::Asset,
        },
        category: string_field(value, "category").unwrap_or_default(),
        created_at: timestamp_field(value, "createdAt").unwrap_or_else(|| clock.now()),
    }
}

pub fn normalize_transaction(value: &Value, ids: &dyn IdSource, clock: &dyn Clock) -> Transaction {
    let category = string_field(value, "category")
        .filter(|c| !LEGACY_PLACEHOLDER_CATEGORIES.contains(&c.as_str()));

    Transaction {
        id: id_field(value, ids),
        date: date_field(value, "date").unwrap_or_else(|| clock.today()),
        kind: match str_field(value, "type") {
            Some("expense") => TransactionKind::Expense,
            Some("transfer") => TransactionKind::Transfer,
            _ => TransactionKind::Income,
        },
        amount: decimal_field(value, "amount").unwrap_or(Decimal::ZERO),
        from_account_id: string_field(value, "fromAccountId"),
        to_account_id: string_field(value, "toAccountId"),
        category,
        note: string_field(value, "note"),
    }
}

pub fn normalize_document(value: &Value, ids: &dyn IdSource, clock: &dyn Clock) -> DocumentItem {
    let created_at = timestamp_field(value, "createdAt").unwrap_or_else(|| clock.now());
    DocumentItem {
        id: id_field(value, ids),
        category: match str_field(value, "category") {
            Some("property") => DocumentCategory::Property,
            Some("valuables") => DocumentCategory::Valuables,
            Some("other") => DocumentCategory::Other,
            _ => DocumentCategory::Insurance,
        },
        title: string_field(value, "title").unwrap_or_default(),
        provider: string_field(value, "provider"),
        reference_no: string_field(value, "referenceNo"),
        location: string_field(value, "location"),
        medical_coverage: decimal_field(value, "medicalCoverage"),
        death_benefit: decimal_field(value, "deathBenefit"),
        area_sqm: decimal_field(value, "areaSqm"),
        quantity: decimal_field(value, "quantity"),
        estimated_value: decimal_field(value, "estimatedValue"),
        notes: string_field(value, "notes"),
        created_at,
        updated_at: timestamp_field(value, "updatedAt").unwrap_or(created_at),
    }
}

fn as_array(raw: Option<&Value>) -> &[Value] {
    raw.and_then(Value::as_array).map_or(&[], Vec::as_slice)
}

fn id_field(value: &Value, ids: &dyn IdSource) -> String {
    string_field(value, "id").unwrap_or_else(|| ids.next_id())
}

/// Non-blank string value of a field; blanks and non-strings are absent.
fn string_field(value: &Value, key: &str) -> Option<String> {
    str_field(value, key)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

/// Accepts JSON numbers and numeric strings. NaN, infinities and anything
/// unparseable are absent, which the callers turn into zero for amounts.
fn decimal_field(value: &Value, key: &str) -> Option<Decimal> {
    match value.get(key)? {
        Value::Number(n) => n.as_f64().and_then(|f| Decimal::try_from(f).ok()),
        Value::String(s) => s.trim().parse::<Decimal>().ok(),
        _ => None,
    }
}

/// Calendar date from a `YYYY-MM-DD` prefix, with an RFC3339 fallback.
fn date_field(value: &Value, key: &str) -> Option<NaiveDate> {
    let raw = str_field(value, key)?;
    if let Some(prefix) = raw.get(..10)
        && let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d")
    {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).date_naive())
}

/// RFC3339 timestamp, or a bare date promoted to midnight UTC.
fn timestamp_field(value: &Value, key: &str) -> Option<DateTime<Utc>> {
    let raw = str_field(value, key)?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
}
