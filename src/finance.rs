//! Pure balance and net-worth computations. Nothing here touches storage or
//! fails: unknown accounts and empty histories degrade to zero so callers can
//! render unconditionally.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeSet;

use crate::domain::{Account, AccountKind, AccountWithBalance, Transaction};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetWorth {
    #[serde(with = "rust_decimal::serde::float")]
    pub assets: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub liabilities: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub net_worth: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NetWorthPoint {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub totals: NetWorth,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BalancePoint {
    pub date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// Balance of one account over the full transaction history, optionally
/// limited to transactions dated on or before `cutoff`.
///
/// The result is a positive magnitude for both account kinds:
/// - asset: destination leg adds, source leg subtracts
/// - liability: destination leg subtracts (debt paid down), source leg adds
///
/// Unknown account ids yield zero rather than an error.
pub fn account_balance(
    account_id: &str,
    accounts: &[Account],
    transactions: &[Transaction],
    cutoff: Option<NaiveDate>,
) -> Decimal {
    let Some(account) = accounts.iter().find(|a| a.id == account_id) else {
        return Decimal::ZERO;
    };

    let mut balance = Decimal::ZERO;
    for tx in transactions {
        if cutoff.is_some_and(|limit| tx.date > limit) {
            continue;
        }

        if tx.to_account_id.as_deref() == Some(account_id) {
            match account.kind {
                AccountKind::Asset => balance += tx.amount,
                AccountKind::Liability => balance -= tx.amount,
            }
        }
        if tx.from_account_id.as_deref() == Some(account_id) {
            match account.kind {
                AccountKind::Asset => balance -= tx.amount,
                AccountKind::Liability => balance += tx.amount,
            }
        }
    }
    balance
}

/// Totals as of `cutoff` (or over everything when `None`). Liability
/// balances are already positive debt, so the identity
/// `net_worth = assets - liabilities` holds without special cases.
pub fn net_worth(
    accounts: &[Account],
    transactions: &[Transaction],
    cutoff: Option<NaiveDate>,
) -> NetWorth {
    let mut assets = Decimal::ZERO;
    let mut liabilities = Decimal::ZERO;

    for account in accounts {
        let balance = account_balance(&account.id, accounts, transactions, cutoff);
        match account.kind {
            AccountKind::Asset => assets += balance,
            AccountKind::Liability => liabilities += balance,
        }
    }

    NetWorth {
        assets,
        liabilities,
        net_worth: assets - liabilities,
    }
}

pub fn accounts_with_balances(
    accounts: &[Account],
    transactions: &[Transaction],
) -> Vec<AccountWithBalance> {
    accounts
        .iter()
        .map(|account| AccountWithBalance {
            account: account.clone(),
            current_balance: account_balance(&account.id, accounts, transactions, None),
        })
        .collect()
}

/// Distinct transaction dates in chronological order.
pub fn unique_dates(transactions: &[Transaction]) -> Vec<NaiveDate> {
    let dates: BTreeSet<NaiveDate> = transactions.iter().map(|tx| tx.date).collect();
    dates.into_iter().collect()
}

/// One net-worth snapshot per distinct transaction date on or after `from`.
/// Days without transactions are not carried forward; the series samples
/// only where something changed. Empty history yields an empty series.
pub fn net_worth_series(
    accounts: &[Account],
    transactions: &[Transaction],
    from: Option<NaiveDate>,
) -> Vec<NetWorthPoint> {
    unique_dates(transactions)
        .into_iter()
        .filter(|date| from.is_none_or(|start| *date >= start))
        .map(|date| NetWorthPoint {
            date,
            totals: net_worth(accounts, transactions, Some(date)),
        })
        .collect()
}

/// Same sampling as [`net_worth_series`], for a single account.
pub fn account_series(
    account_id: &str,
    accounts: &[Account],
    transactions: &[Transaction],
    from: Option<NaiveDate>,
) -> Vec<BalancePoint> {
    unique_dates(transactions)
        .into_iter()
        .filter(|date| from.is_none_or(|start| *date >= start))
        .map(|date| BalancePoint {
            date,
            amount: account_balance(account_id, accounts, transactions, Some(date)),
        })
        .collect()
}
