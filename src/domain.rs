use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Asset,
    Liability,
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountKind::Asset => write!(f, "asset"),
            AccountKind::Liability => write!(f, "liability"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
    Transfer,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Income => write!(f, "income"),
            TransactionKind::Expense => write!(f, "expense"),
            TransactionKind::Transfer => write!(f, "transfer"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DocumentCategory {
    #[default]
    Insurance,
    Property,
    Valuables,
    Other,
}

impl fmt::Display for DocumentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentCategory::Insurance => write!(f, "insurance"),
            DocumentCategory::Property => write!(f, "property"),
            DocumentCategory::Valuables => write!(f, "valuables"),
            DocumentCategory::Other => write!(f, "other"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AccountKind,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,

    /// Source account; present for expense and transfer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_account_id: Option<String>,

    /// Destination account; present for income and transfer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_account_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentItem {
    pub id: String,
    pub category: DocumentCategory,
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub medical_coverage: Option<Decimal>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub death_benefit: Option<Decimal>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub area_sqm: Option<Decimal>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub quantity: Option<Decimal>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub estimated_value: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An account paired with its derived balance. The balance is a positive
/// magnitude for both kinds: money held for assets, outstanding debt for
/// liabilities.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountWithBalance {
    #[serde(flatten)]
    pub account: Account,
    #[serde(with = "rust_decimal::serde::float")]
    pub current_balance: Decimal,
}

pub const ASSET_CATEGORIES: &[&str] = &[
    "Savings",
    "Cash and Cash Equivalents",
    "Investments",
    "Real Estate",
    "Personal Property",
    "Other Assets",
];

pub const LIABILITY_CATEGORIES: &[&str] = &[
    "Credit Cards",
    "Loans",
    "Mortgages",
    "Other Liabilities",
];

pub fn categories_for(kind: AccountKind) -> &'static [&'static str] {
    match kind {
        AccountKind::Asset => ASSET_CATEGORIES,
        AccountKind::Liability => LIABILITY_CATEGORIES,
    }
}

/// Caller-supplied fields for creating or fully updating an account. The
/// store assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct AccountInput {
    pub name: String,
    pub kind: AccountKind,
    pub category: String,
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    /// Defaults to today when absent.
    pub date: Option<NaiveDate>,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub from_account_id: Option<String>,
    pub to_account_id: Option<String>,
    pub category: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewDocument {
    pub category: DocumentCategory,
    pub title: String,
    pub provider: Option<String>,
    pub reference_no: Option<String>,
    pub location: Option<String>,
    pub medical_coverage: Option<Decimal>,
    pub death_benefit: Option<Decimal>,
    pub area_sqm: Option<Decimal>,
    pub quantity: Option<Decimal>,
    pub estimated_value: Option<Decimal>,
    pub notes: Option<String>,
}

/// Partial update for a document; only `Some` fields are applied.
#[derive(Debug, Clone, Default)]
pub struct DocumentUpdate {
    pub category: Option<DocumentCategory>,
    pub title: Option<String>,
    pub provider: Option<String>,
    pub reference_no: Option<String>,
    pub location: Option<String>,
    pub medical_coverage: Option<Decimal>,
    pub death_benefit: Option<Decimal>,
    pub area_sqm: Option<Decimal>,
    pub quantity: Option<Decimal>,
    pub estimated_value: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransactionInputError {
    #[error("amount must be greater than zero")]
    NonPositiveAmount,
    #[error("income requires a destination account (--to)")]
    MissingDestination,
    #[error("expense requires a source account (--from)")]
    MissingSource,
    #[error("transfer requires both a source (--from) and a destination (--to) account")]
    MissingTransferSide,
    #[error("transfer source and destination accounts must differ")]
    SelfTransfer,
}

/// Boundary validation for transaction input. The store does not re-check
/// these rules: imported history is normalized for shape, not semantics.
pub fn validate_transaction(input: &NewTransaction) -> Result<(), TransactionInputError> {
    if input.amount <= Decimal::ZERO {
        return Err(TransactionInputError::NonPositiveAmount);
    }
    match input.kind {
        TransactionKind::Income => {
            if input.to_account_id.is_none() {
                return Err(TransactionInputError::MissingDestination);
            }
        }
        TransactionKind::Expense => {
            if input.from_account_id.is_none() {
                return Err(TransactionInputError::MissingSource);
            }
        }
        TransactionKind::Transfer => {
            let (Some(from), Some(to)) = (&input.from_account_id, &input.to_account_id) else {
                return Err(TransactionInputError::MissingTransferSide);
            };
            if from == to {
                return Err(TransactionInputError::SelfTransfer);
            }
        }
    }
    Ok(())
}
