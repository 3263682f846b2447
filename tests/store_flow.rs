mod common;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;

use common::{FixedClock, SeqIds, SharedStorage, open_store, test_store, test_time};
use nestegg::domain::{
    AccountInput, AccountKind, DocumentCategory, DocumentUpdate, NewDocument, NewTransaction,
    TransactionKind,
};
use nestegg::normalize;
use nestegg::store::{ACCOUNTS_KEY, DOCUMENTS_KEY, TRANSACTIONS_KEY};

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn new_tx(kind: TransactionKind, amount: i64, from: Option<&str>, to: Option<&str>, on: &str) -> NewTransaction {
    NewTransaction {
        date: Some(date(on)),
        kind,
        amount: Decimal::from(amount),
        from_account_id: from.map(str::to_string),
        to_account_id: to.map(str::to_string),
        category: None,
        note: None,
    }
}

#[test]
fn load_normalizes_legacy_records_and_self_heals() {
    let storage = SharedStorage::default();
    storage.seed(
        TRANSACTIONS_KEY,
        r#"[
            {"date":"2024-01-05","type":"bogus","amount":"25.50","category":"Income","toAccountId":"a1"},
            {"id":"t2","date":"junk","type":"transfer","amount":true,"fromAccountId":"","toAccountId":"a2"}
        ]"#,
    );

    let store = open_store(storage.clone());
    let txs = store.transactions();
    assert_eq!(txs.len(), 2);

    // Missing id gets a generated one; unknown type falls back to income;
    // the legacy placeholder category is cleared.
    assert_eq!(txs[0].id, "id-1");
    assert_eq!(txs[0].kind, TransactionKind::Income);
    assert_eq!(txs[0].amount, Decimal::new(2550, 2));
    assert_eq!(txs[0].category, None);
    assert_eq!(txs[0].date, date("2024-01-05"));

    // Unparseable date defaults to "today" (the injected clock); a boolean
    // amount coerces to zero; a blank account reference reads as absent.
    assert_eq!(txs[1].id, "t2");
    assert_eq!(txs[1].date, test_time().date_naive());
    assert_eq!(txs[1].amount, Decimal::ZERO);
    assert_eq!(txs[1].from_account_id, None);
    assert_eq!(txs[1].to_account_id.as_deref(), Some("a2"));

    // The normalized form was written back immediately.
    let healed = storage.raw(TRANSACTIONS_KEY).expect("blob rewritten");
    let healed: Value = serde_json::from_str(&healed).unwrap();
    assert_eq!(healed[0]["id"], "id-1");
    assert_eq!(healed[0]["type"], "income");
    assert!(healed[0].get("category").is_none());
}

#[test]
fn unreadable_blob_resets_to_empty() {
    let storage = SharedStorage::default();
    storage.seed(ACCOUNTS_KEY, "{definitely not json");

    let store = open_store(storage.clone());
    assert!(store.accounts().is_empty());
    assert_eq!(storage.raw(ACCOUNTS_KEY).as_deref(), Some("[]"));
}

#[test]
fn add_account_assigns_id_and_survives_reopen() {
    let storage = SharedStorage::default();
    let mut store = open_store(storage.clone());

    let account = store
        .add_account(AccountInput {
            name: "  Savings  ".to_string(),
            kind: AccountKind::Asset,
            category: "Savings".to_string(),
        })
        .unwrap();
    assert_eq!(account.id, "id-1");
    assert_eq!(account.name, "Savings");
    assert_eq!(account.created_at, test_time());

    let reopened = open_store(storage);
    assert_eq!(reopened.accounts(), std::slice::from_ref(&account));
}

#[test]
fn transactions_are_most_recent_first() {
    let mut store = test_store();
    store
        .add_transaction(new_tx(TransactionKind::Income, 10, None, Some("a1"), "2024-01-01"))
        .unwrap();
    let latest = store
        .add_transaction(new_tx(TransactionKind::Income, 20, None, Some("a1"), "2024-01-02"))
        .unwrap();

    assert_eq!(store.transactions()[0], latest);
    assert_eq!(store.transactions().len(), 2);
}

#[test]
fn deleting_an_account_keeps_its_transactions() {
    let mut store = test_store();
    let account = store
        .add_account(AccountInput {
            name: "Cash".to_string(),
            kind: AccountKind::Asset,
            category: "Cash and Cash Equivalents".to_string(),
        })
        .unwrap();
    store
        .add_transaction(new_tx(
            TransactionKind::Income,
            100,
            None,
            Some(&account.id),
            "2024-01-01",
        ))
        .unwrap();

    assert!(store.delete_account(&account.id).unwrap());
    assert!(store.accounts().is_empty());
    assert_eq!(store.transactions().len(), 1);
    assert_eq!(
        store.transactions()[0].to_account_id.as_deref(),
        Some(account.id.as_str())
    );
}

#[test]
fn update_account_trims_and_ignores_unknown_ids() {
    let mut store = test_store();
    let account = store
        .add_account(AccountInput {
            name: "Old".to_string(),
            kind: AccountKind::Asset,
            category: "Savings".to_string(),
        })
        .unwrap();

    let updated = store
        .update_account(
            &account.id,
            AccountInput {
                name: "  Renamed  ".to_string(),
                kind: AccountKind::Liability,
                category: "Loans".to_string(),
            },
        )
        .unwrap();
    assert!(updated);
    let account = store.account(&account.id).unwrap();
    assert_eq!(account.name, "Renamed");
    assert_eq!(account.kind, AccountKind::Liability);

    assert!(!store
        .update_account(
            "nope",
            AccountInput {
                name: "x".to_string(),
                kind: AccountKind::Asset,
                category: "Savings".to_string(),
            },
        )
        .unwrap());
}

#[test]
fn document_updates_refresh_updated_at_only_partially() {
    let later = test_time() + chrono::Duration::hours(1);
    let storage = SharedStorage::default();
    let mut store = open_store(storage.clone());

    let doc = store
        .add_document(NewDocument {
            category: DocumentCategory::Insurance,
            title: "Life policy".to_string(),
            provider: Some("Acme Life".to_string()),
            death_benefit: Some(Decimal::from(500_000)),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(doc.created_at, test_time());
    assert_eq!(doc.updated_at, test_time());

    // Reopen with a later clock and apply a partial update.
    let mut store = nestegg::store::Store::open(
        Box::new(storage),
        Box::new(SeqIds::new()),
        Box::new(FixedClock(later)),
    )
    .unwrap();
    assert!(store
        .update_document(
            &doc.id,
            DocumentUpdate {
                estimated_value: Some(Decimal::from(10_000)),
                ..Default::default()
            },
        )
        .unwrap());

    let updated = store.document(&doc.id).unwrap();
    assert_eq!(updated.title, "Life policy");
    assert_eq!(updated.provider.as_deref(), Some("Acme Life"));
    assert_eq!(updated.death_benefit, Some(Decimal::from(500_000)));
    assert_eq!(updated.estimated_value, Some(Decimal::from(10_000)));
    assert_eq!(updated.created_at, test_time());
    assert_eq!(updated.updated_at, later);
}

#[test]
fn export_import_round_trips_all_collections() {
    let mut store = test_store();
    let account = store
        .add_account(AccountInput {
            name: "Savings".to_string(),
            kind: AccountKind::Asset,
            category: "Savings".to_string(),
        })
        .unwrap();
    store
        .add_transaction(NewTransaction {
            date: Some(date("2024-01-05")),
            kind: TransactionKind::Income,
            amount: "1234.56".parse().unwrap(),
            from_account_id: None,
            to_account_id: Some(account.id.clone()),
            category: Some("Salary".to_string()),
            note: Some("January".to_string()),
        })
        .unwrap();
    store
        .add_document(NewDocument {
            category: DocumentCategory::Property,
            title: "Deed".to_string(),
            area_sqm: Some("52.5".parse().unwrap()),
            ..Default::default()
        })
        .unwrap();

    let exported = store.export_data().unwrap();

    let mut restored = test_store();
    restored.import_data(&exported).unwrap();

    assert_eq!(restored.accounts(), store.accounts());
    assert_eq!(restored.transactions(), store.transactions());
    assert_eq!(restored.documents(), store.documents());
}

#[test]
fn import_replaces_rather_than_merges() {
    let mut store = test_store();
    store
        .add_account(AccountInput {
            name: "Old".to_string(),
            kind: AccountKind::Asset,
            category: "Savings".to_string(),
        })
        .unwrap();

    store
        .import_data(r#"{"accounts":[{"id":"new","name":"New","type":"asset","category":"Savings","createdAt":"2024-01-01T00:00:00Z"}]}"#)
        .unwrap();

    assert_eq!(store.accounts().len(), 1);
    assert_eq!(store.accounts()[0].id, "new");
    assert!(store.transactions().is_empty());
}

#[test]
fn import_tolerates_non_array_collections() {
    let mut store = test_store();
    store
        .import_data(r#"{"accounts":"not-an-array","transactions":[]}"#)
        .unwrap();

    assert!(store.accounts().is_empty());
    assert!(store.transactions().is_empty());
    assert!(store.documents().is_empty());
}

#[test]
fn import_rejects_invalid_json() {
    let mut store = test_store();
    store
        .add_account(AccountInput {
            name: "Keep".to_string(),
            kind: AccountKind::Asset,
            category: "Savings".to_string(),
        })
        .unwrap();

    let err = store.import_data("{not valid json").unwrap_err();
    assert!(err.to_string().contains("not valid JSON"));

    // Failed imports leave the existing data alone.
    assert_eq!(store.accounts().len(), 1);
}

#[test]
fn normalization_is_idempotent() {
    let ids = SeqIds::new();
    let clock = FixedClock(test_time());

    let mut store = test_store();
    let account = store
        .add_account(AccountInput {
            name: "Savings".to_string(),
            kind: AccountKind::Liability,
            category: "Loans".to_string(),
        })
        .unwrap();
    let tx = store
        .add_transaction(new_tx(
            TransactionKind::Transfer,
            75,
            Some("a"),
            Some("b"),
            "2024-03-01",
        ))
        .unwrap();

    let account_value = serde_json::to_value(&account).unwrap();
    assert_eq!(normalize::normalize_account(&account_value, &ids, &clock), account);

    let tx_value = serde_json::to_value(&tx).unwrap();
    assert_eq!(normalize::normalize_transaction(&tx_value, &ids, &clock), tx);
}

#[test]
fn clear_all_data_removes_collection_keys_only() {
    let storage = SharedStorage::default();
    let mut store = open_store(storage.clone());
    store
        .add_account(AccountInput {
            name: "Savings".to_string(),
            kind: AccountKind::Asset,
            category: "Savings".to_string(),
        })
        .unwrap();
    store.set_currency("thb").unwrap();

    store.clear_all_data().unwrap();

    assert!(store.accounts().is_empty());
    assert!(storage.raw(ACCOUNTS_KEY).is_none());
    assert!(storage.raw(TRANSACTIONS_KEY).is_none());
    assert!(storage.raw(DOCUMENTS_KEY).is_none());
    assert_eq!(store.currency().unwrap(), "THB");
}

#[test]
fn settings_default_and_normalize() {
    let storage = SharedStorage::default();
    storage.seed("finance-locale", "fr");

    let mut store = open_store(storage);
    assert_eq!(store.currency().unwrap(), "USD");
    // Unsupported locale value falls back to the default.
    assert_eq!(store.locale().unwrap(), "en");

    store.set_currency("thb").unwrap();
    store.set_locale("th").unwrap();
    assert_eq!(store.currency().unwrap(), "THB");
    assert_eq!(store.locale().unwrap(), "th");
}
