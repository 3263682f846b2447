//! The canonical in-memory collections and their persistence lifecycle.
//!
//! On open, each collection is read from its key, normalized, and written
//! back immediately so drifted or legacy blobs self-repair. Every mutation
//! re-serializes the owning collection before returning. Unreadable blobs
//! degrade to empty collections; the only typed failure is a syntactically
//! invalid import payload.

use anyhow::Result;
use log::debug;
use serde_json::{Value, json};
use thiserror::Error;

use crate::domain::{
    Account, AccountInput, DocumentItem, DocumentUpdate, NewDocument, NewTransaction, Transaction,
};
use crate::normalize;
use crate::storage::{Clock, IdSource, Storage};

pub const ACCOUNTS_KEY: &str = "finance-accounts";
pub const TRANSACTIONS_KEY: &str = "finance-transactions";
pub const DOCUMENTS_KEY: &str = "finance-documents";
pub const CURRENCY_KEY: &str = "finance-currency";
pub const LOCALE_KEY: &str = "finance-locale";

pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_LOCALE: &str = "en";

pub const EXPORT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("backup is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

pub struct Store {
    storage: Box<dyn Storage>,
    ids: Box<dyn IdSource>,
    clock: Box<dyn Clock>,

    accounts: Vec<Account>,
    transactions: Vec<Transaction>,
    documents: Vec<DocumentItem>,
}

impl Store {
    pub fn open(
        storage: Box<dyn Storage>,
        ids: Box<dyn IdSource>,
        clock: Box<dyn Clock>,
    ) -> Result<Self> {
        let mut store = Self {
            storage,
            ids,
            clock,
            accounts: Vec::new(),
            transactions: Vec::new(),
            documents: Vec::new(),
        };
        store.load()?;
        Ok(store)
    }

    fn load(&mut self) -> Result<()> {
        let accounts = self.read_blob(ACCOUNTS_KEY)?;
        let transactions = self.read_blob(TRANSACTIONS_KEY)?;
        let documents = self.read_blob(DOCUMENTS_KEY)?;

        self.accounts =
            normalize::normalize_accounts(accounts.as_ref(), self.ids.as_ref(), self.clock.as_ref());
        self.transactions = normalize::normalize_transactions(
            transactions.as_ref(),
            self.ids.as_ref(),
            self.clock.as_ref(),
        );
        self.documents = normalize::normalize_documents(
            documents.as_ref(),
            self.ids.as_ref(),
            self.clock.as_ref(),
        );

        // Write the normalized form back so the stored blobs repair themselves.
        self.persist_accounts()?;
        self.persist_transactions()?;
        self.persist_documents()?;

        debug!(
            "store loaded: {} accounts, {} transactions, {} documents",
            self.accounts.len(),
            self.transactions.len(),
            self.documents.len()
        );
        Ok(())
    }

    /// Raw JSON under `key`; absent or unparseable blobs read as absent.
    fn read_blob(&self, key: &str) -> Result<Option<Value>> {
        let Some(raw) = self.storage.get(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                debug!("discarding unreadable blob under '{key}': {err}");
                Ok(None)
            }
        }
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn documents(&self) -> &[DocumentItem] {
        &self.documents
    }

    pub fn account(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn document(&self, id: &str) -> Option<&DocumentItem> {
        self.documents.iter().find(|d| d.id == id)
    }

    pub fn add_account(&mut self, input: AccountInput) -> Result<Account> {
        let account = Account {
            id: self.ids.next_id(),
            name: input.name.trim().to_string(),
            kind: input.kind,
            category: input.category,
            created_at: self.clock.now(),
        };
        self.accounts.push(account.clone());
        self.persist_accounts()?;
        Ok(account)
    }

    /// Replaces name, kind and category. Unknown ids are a no-op.
    pub fn update_account(&mut self, id: &str, input: AccountInput) -> Result<bool> {
        let Some(account) = self.accounts.iter_mut().find(|a| a.id == id) else {
            return Ok(false);
        };
        account.name = input.name.trim().to_string();
        account.kind = input.kind;
        account.category = input.category;
        self.persist_accounts()?;
        Ok(true)
    }

    /// Removes the account only. Transactions referencing it are historical
    /// truth and stay untouched.
    pub fn delete_account(&mut self, id: &str) -> Result<bool> {
        let before = self.accounts.len();
        self.accounts.retain(|a| a.id != id);
        if self.accounts.len() == before {
            return Ok(false);
        }
        self.persist_accounts()?;
        Ok(true)
    }

    /// Prepends, keeping the collection most-recent-first.
    pub fn add_transaction(&mut self, input: NewTransaction) -> Result<Transaction> {
        let tx = Transaction {
            id: self.ids.next_id(),
            date: input.date.unwrap_or_else(|| self.clock.today()),
            kind: input.kind,
            amount: input.amount,
            from_account_id: input.from_account_id,
            to_account_id: input.to_account_id,
            category: input.category,
            note: input.note,
        };
        self.transactions.insert(0, tx.clone());
        self.persist_transactions()?;
        Ok(tx)
    }

    pub fn delete_transaction(&mut self, id: &str) -> Result<bool> {
        let before = self.transactions.len();
        self.transactions.retain(|t| t.id != id);
        if self.transactions.len() == before {
            return Ok(false);
        }
        self.persist_transactions()?;
        Ok(true)
    }

    pub fn add_document(&mut self, input: NewDocument) -> Result<DocumentItem> {
        let now = self.clock.now();
        let doc = DocumentItem {
            id: self.ids.next_id(),
            category: input.category,
            title: input.title.trim().to_string(),
            provider: input.provider,
            reference_no: input.reference_no,
            location: input.location,
            medical_coverage: input.medical_coverage,
            death_benefit: input.death_benefit,
            area_sqm: input.area_sqm,
            quantity: input.quantity,
            estimated_value: input.estimated_value,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        };
        self.documents.push(doc.clone());
        self.persist_documents()?;
        Ok(doc)
    }

    pub fn update_document(&mut self, id: &str, update: DocumentUpdate) -> Result<bool> {
        let now = self.clock.now();
        let Some(doc) = self.documents.iter_mut().find(|d| d.id == id) else {
            return Ok(false);
        };
        if let Some(category) = update.category {
            doc.category = category;
        }
        if let Some(title) = update.title {
            doc.title = title.trim().to_string();
        }
        if let Some(provider) = update.provider {
            doc.provider = Some(provider);
        }
        if let Some(reference_no) = update.reference_no {
            doc.reference_no = Some(reference_no);
        }
        if let Some(location) = update.location {
            doc.location = Some(location);
        }
        if let Some(medical_coverage) = update.medical_coverage {
            doc.medical_coverage = Some(medical_coverage);
        }
        if let Some(death_benefit) = update.death_benefit {
            doc.death_benefit = Some(death_benefit);
        }
        if let Some(area_sqm) = update.area_sqm {
            doc.area_sqm = Some(area_sqm);
        }
        if let Some(quantity) = update.quantity {
            doc.quantity = Some(quantity);
        }
        if let Some(estimated_value) = update.estimated_value {
            doc.estimated_value = Some(estimated_value);
        }
        if let Some(notes) = update.notes {
            doc.notes = Some(notes);
        }
        doc.updated_at = now;
        self.persist_documents()?;
        Ok(true)
    }

    pub fn delete_document(&mut self, id: &str) -> Result<bool> {
        let before = self.documents.len();
        self.documents.retain(|d| d.id != id);
        if self.documents.len() == before {
            return Ok(false);
        }
        self.persist_documents()?;
        Ok(true)
    }

    /// Pretty-printed backup of everything, suitable for `import_data`.
    pub fn export_data(&self) -> Result<String> {
        let payload = json!({
            "accounts": self.accounts,
            "transactions": self.transactions,
            "documents": self.documents,
            "exportedAt": self.clock.now(),
            "version": EXPORT_VERSION,
        });
        Ok(serde_json::to_string_pretty(&payload)?)
    }

    /// Replaces (never merges) all three collections from a backup payload.
    /// Missing or malformed collection arrays read as empty; only a
    /// syntactically invalid document is an error. `version` and
    /// `exportedAt` are ignored on read.
    pub fn import_data(&mut self, json_text: &str) -> Result<()> {
        let parsed: Value = serde_json::from_str(json_text).map_err(ImportError::InvalidJson)?;

        self.accounts = normalize::normalize_accounts(
            parsed.get("accounts"),
            self.ids.as_ref(),
            self.clock.as_ref(),
        );
        self.transactions = normalize::normalize_transactions(
            parsed.get("transactions"),
            self.ids.as_ref(),
            self.clock.as_ref(),
        );
        self.documents = normalize::normalize_documents(
            parsed.get("documents"),
            self.ids.as_ref(),
            self.clock.as_ref(),
        );

        self.persist_accounts()?;
        self.persist_transactions()?;
        self.persist_documents()?;
        debug!(
            "import replaced collections: {} accounts, {} transactions, {} documents",
            self.accounts.len(),
            self.transactions.len(),
            self.documents.len()
        );
        Ok(())
    }

    /// Empties the three collections and removes their keys. Settings keys
    /// are left alone.
    pub fn clear_all_data(&mut self) -> Result<()> {
        self.accounts.clear();
        self.transactions.clear();
        self.documents.clear();
        self.storage.remove(ACCOUNTS_KEY)?;
        self.storage.remove(TRANSACTIONS_KEY)?;
        self.storage.remove(DOCUMENTS_KEY)?;
        Ok(())
    }

    pub fn currency(&self) -> Result<String> {
        Ok(self
            .storage
            .get(CURRENCY_KEY)?
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()))
    }

    pub fn set_currency(&mut self, code: &str) -> Result<()> {
        self.storage.set(CURRENCY_KEY, &code.trim().to_uppercase())
    }

    pub fn locale(&self) -> Result<String> {
        let locale = match self.storage.get(LOCALE_KEY)?.as_deref() {
            Some("th") => "th",
            _ => DEFAULT_LOCALE,
        };
        Ok(locale.to_string())
    }

    pub fn set_locale(&mut self, locale: &str) -> Result<()> {
        self.storage.set(LOCALE_KEY, locale)
    }

    fn persist_accounts(&mut self) -> Result<()> {
        let blob = serde_json::to_string(&self.accounts)?;
        self.storage.set(ACCOUNTS_KEY, &blob)
    }

    fn persist_transactions(&mut self) -> Result<()> {
        let blob = serde_json::to_string(&self.transactions)?;
        self.storage.set(TRANSACTIONS_KEY, &blob)
    }

    fn persist_documents(&mut self) -> Result<()> {
        let blob = serde_json::to_string(&self.documents)?;
        self.storage.set(DOCUMENTS_KEY, &blob)
    }
}
