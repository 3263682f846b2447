use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use clap::Parser;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rust_decimal::Decimal;
use std::fs;
use std::path::{Path, PathBuf};

use nestegg::cli::{
    AccountCmd, Cli, Command, CurrencyCmd, DocCmd, HistoryCmd, LocaleChoice, LocaleCmd, TxCmd,
};
use nestegg::config::app_paths;
use nestegg::domain::{
    AccountInput, AccountKind, DocumentUpdate, NewDocument, NewTransaction, categories_for,
    validate_transaction,
};
use nestegg::finance;
use nestegg::storage::{SqliteStorage, SystemClock, UuidIds};
use nestegg::store::Store;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let paths = app_paths(cli.home.clone())?;
    let storage = SqliteStorage::open(&paths.store_path())?;
    let mut store = Store::open(Box::new(storage), Box::new(UuidIds), Box::new(SystemClock))?;

    match cli.command {
        Command::Account(args) => handle_account(&mut store, args.cmd),
        Command::Tx(args) => handle_tx(&mut store, args.cmd),
        Command::Doc(args) => handle_doc(&mut store, args.cmd),
        Command::Balance => handle_balance(&store),
        Command::Networth(args) => handle_networth(&store, args.as_of),
        Command::History(args) => handle_history(&store, args.cmd),
        Command::Export(args) => handle_export(&store, args.out),
        Command::Import(args) => handle_import(&mut store, &args.file),
        Command::Wipe(args) => handle_wipe(&mut store, args.yes),
        Command::Currency(args) => handle_currency(&mut store, args.cmd),
        Command::Locale(args) => handle_locale(&mut store, args.cmd),
    }
}

fn handle_account(store: &mut Store, cmd: AccountCmd) -> Result<()> {
    match cmd {
        AccountCmd::Add {
            name,
            kind,
            category,
        } => {
            let category = resolve_category(kind, category)?;
            let account = store.add_account(AccountInput {
                name,
                kind,
                category,
            })?;
            println!(
                "Added {} account '{}' ({})",
                account.kind, account.name, account.id
            );
        }
        AccountCmd::List => {
            let rows = store
                .accounts()
                .iter()
                .map(|account| {
                    vec![
                        account.id.clone(),
                        account.name.clone(),
                        account.kind.to_string(),
                        account.category.clone(),
                        account.created_at.date_naive().to_string(),
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(&["Id", "Name", "Type", "Category", "Created"], rows)
            );
        }
        AccountCmd::Update {
            id,
            name,
            kind,
            category,
        } => {
            let Some(current) = store.account(&id).cloned() else {
                return Err(anyhow!("No account with id '{id}'"));
            };
            let kind = kind.unwrap_or(current.kind);
            let category = match category {
                Some(c) => resolve_category(kind, Some(c))?,
                None if kind == current.kind => current.category,
                // Kind changed without a new category: the old one belongs
                // to the other list, fall back to the catch-all.
                None => default_category(kind).to_string(),
            };
            store.update_account(
                &id,
                AccountInput {
                    name: name.unwrap_or(current.name),
                    kind,
                    category,
                },
            )?;
            println!("Updated account {id}");
        }
        AccountCmd::Rm { id } => {
            if !store.delete_account(&id)? {
                return Err(anyhow!("No account with id '{id}'"));
            }
            println!("Removed account {id} (its transactions are kept)");
        }
    }
    Ok(())
}

fn handle_tx(store: &mut Store, cmd: TxCmd) -> Result<()> {
    match cmd {
        TxCmd::Add {
            kind,
            amount,
            from,
            to,
            date,
            category,
            note,
        } => {
            let from_account_id = from.map(|a| resolve_account_id(store, &a)).transpose()?;
            let to_account_id = to.map(|a| resolve_account_id(store, &a)).transpose()?;
            let input = NewTransaction {
                date,
                kind,
                amount,
                from_account_id,
                to_account_id,
                category,
                note,
            };
            validate_transaction(&input)?;
            let tx = store.add_transaction(input)?;
            println!(
                "Recorded {} of {} on {} ({})",
                tx.kind,
                fmt_amount(tx.amount),
                tx.date,
                tx.id
            );
        }
        TxCmd::List { limit } => {
            let rows = store
                .transactions()
                .iter()
                .take(limit.unwrap_or(usize::MAX))
                .map(|tx| {
                    vec![
                        tx.id.clone(),
                        tx.date.to_string(),
                        tx.kind.to_string(),
                        fmt_amount(tx.amount),
                        account_label(store, tx.from_account_id.as_deref()),
                        account_label(store, tx.to_account_id.as_deref()),
                        tx.category.clone().unwrap_or_default(),
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(
                    &["Id", "Date", "Type", "Amount", "From", "To", "Category"],
                    rows
                )
            );
        }
        TxCmd::Rm { id } => {
            if !store.delete_transaction(&id)? {
                return Err(anyhow!("No transaction with id '{id}'"));
            }
            println!("Removed transaction {id}");
        }
    }
    Ok(())
}

fn handle_doc(store: &mut Store, cmd: DocCmd) -> Result<()> {
    match cmd {
        DocCmd::Add {
            title,
            category,
            provider,
            reference_no,
            location,
            medical_coverage,
            death_benefit,
            area_sqm,
            quantity,
            estimated_value,
            notes,
        } => {
            let doc = store.add_document(NewDocument {
                category: category.unwrap_or_default(),
                title,
                provider,
                reference_no,
                location,
                medical_coverage,
                death_benefit,
                area_sqm,
                quantity,
                estimated_value,
                notes,
            })?;
            println!("Added {} document '{}' ({})", doc.category, doc.title, doc.id);
        }
        DocCmd::List => {
            let rows = store
                .documents()
                .iter()
                .map(|doc| {
                    vec![
                        doc.id.clone(),
                        doc.category.to_string(),
                        doc.title.clone(),
                        doc.provider.clone().unwrap_or_default(),
                        doc.reference_no.clone().unwrap_or_default(),
                        doc.estimated_value.map(fmt_amount).unwrap_or_default(),
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(
                    &["Id", "Category", "Title", "Provider", "Ref", "Est. value"],
                    rows
                )
            );
            let total: Decimal = store
                .documents()
                .iter()
                .filter_map(|d| d.estimated_value)
                .sum();
            if !total.is_zero() {
                println!("Total estimated value: {}", fmt_amount(total));
            }
        }
        DocCmd::Update {
            id,
            title,
            category,
            provider,
            reference_no,
            location,
            medical_coverage,
            death_benefit,
            area_sqm,
            quantity,
            estimated_value,
            notes,
        } => {
            let update = DocumentUpdate {
                category,
                title,
                provider,
                reference_no,
                location,
                medical_coverage,
                death_benefit,
                area_sqm,
                quantity,
                estimated_value,
                notes,
            };
            if !store.update_document(&id, update)? {
                return Err(anyhow!("No document with id '{id}'"));
            }
            println!("Updated document {id}");
        }
        DocCmd::Rm { id } => {
            if !store.delete_document(&id)? {
                return Err(anyhow!("No document with id '{id}'"));
            }
            println!("Removed document {id}");
        }
    }
    Ok(())
}

fn handle_balance(store: &Store) -> Result<()> {
    let entries = finance::accounts_with_balances(store.accounts(), store.transactions());
    let rows = entries
        .iter()
        .map(|entry| {
            vec![
                entry.account.id.clone(),
                entry.account.name.clone(),
                entry.account.kind.to_string(),
                entry.account.category.clone(),
                fmt_amount(entry.current_balance),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Id", "Name", "Type", "Category", "Balance"], rows)
    );
    handle_networth(store, None)
}

fn handle_networth(store: &Store, as_of: Option<NaiveDate>) -> Result<()> {
    let totals = finance::net_worth(store.accounts(), store.transactions(), as_of);
    let currency = store.currency()?;
    if let Some(date) = as_of {
        println!("As of {date}:");
    }
    println!("Assets:      {} {currency}", fmt_amount(totals.assets));
    println!("Liabilities: {} {currency}", fmt_amount(totals.liabilities));
    println!("Net worth:   {} {currency}", fmt_amount(totals.net_worth));
    Ok(())
}

fn handle_history(store: &Store, cmd: HistoryCmd) -> Result<()> {
    match cmd {
        HistoryCmd::Networth { from } => {
            let series = finance::net_worth_series(store.accounts(), store.transactions(), from);
            if series.is_empty() {
                println!("No transactions recorded.");
                return Ok(());
            }
            let rows = series
                .iter()
                .map(|point| {
                    vec![
                        point.date.to_string(),
                        fmt_amount(point.totals.assets),
                        fmt_amount(point.totals.liabilities),
                        fmt_amount(point.totals.net_worth),
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(&["Date", "Assets", "Liabilities", "Net worth"], rows)
            );
        }
        HistoryCmd::Account { account, from } => {
            let id = resolve_account_id(store, &account)?;
            let series = finance::account_series(&id, store.accounts(), store.transactions(), from);
            if series.is_empty() {
                println!("No transactions recorded.");
                return Ok(());
            }
            let rows = series
                .iter()
                .map(|point| vec![point.date.to_string(), fmt_amount(point.amount)])
                .collect();
            println!("{}", pretty_table(&["Date", "Balance"], rows));
        }
    }
    Ok(())
}

fn handle_export(store: &Store, out: Option<PathBuf>) -> Result<()> {
    let payload = store.export_data()?;
    match out {
        Some(path) => {
            fs::write(&path, payload)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Exported to {}", path.display());
        }
        None => println!("{payload}"),
    }
    Ok(())
}

fn handle_import(store: &mut Store, file: &Path) -> Result<()> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    store.import_data(&text)?;
    println!(
        "Imported {} accounts, {} transactions, {} documents",
        store.accounts().len(),
        store.transactions().len(),
        store.documents().len()
    );
    Ok(())
}

fn handle_wipe(store: &mut Store, yes: bool) -> Result<()> {
    if !yes {
        return Err(anyhow!("Refusing to wipe without --yes"));
    }
    store.clear_all_data()?;
    println!("All data removed.");
    Ok(())
}

fn handle_currency(store: &mut Store, cmd: CurrencyCmd) -> Result<()> {
    match cmd {
        CurrencyCmd::Get => println!("{}", store.currency()?),
        CurrencyCmd::Set { code } => {
            store.set_currency(&code)?;
            println!("Display currency set to {}", store.currency()?);
        }
    }
    Ok(())
}

fn handle_locale(store: &mut Store, cmd: LocaleCmd) -> Result<()> {
    match cmd {
        LocaleCmd::Get => println!("{}", store.locale()?),
        LocaleCmd::Set { locale } => {
            let code = match locale {
                LocaleChoice::En => "en",
                LocaleChoice::Th => "th",
            };
            store.set_locale(code)?;
            println!("Locale set to {code}");
        }
    }
    Ok(())
}

fn default_category(kind: AccountKind) -> &'static str {
    match kind {
        AccountKind::Asset => "Other Assets",
        AccountKind::Liability => "Other Liabilities",
    }
}

fn resolve_category(kind: AccountKind, category: Option<String>) -> Result<String> {
    let Some(category) = category else {
        return Ok(default_category(kind).to_string());
    };
    let allowed = categories_for(kind);
    if allowed.contains(&category.as_str()) {
        Ok(category)
    } else {
        Err(anyhow!(
            "Unknown {kind} category '{category}'. Expected one of: {}",
            allowed.join(", ")
        ))
    }
}

/// Accepts an account id or a unique account name.
fn resolve_account_id(store: &Store, needle: &str) -> Result<String> {
    if store.account(needle).is_some() {
        return Ok(needle.to_string());
    }
    let mut matches = store.accounts().iter().filter(|a| a.name == needle);
    match (matches.next(), matches.next()) {
        (Some(account), None) => Ok(account.id.clone()),
        (Some(_), Some(_)) => Err(anyhow!(
            "Account name '{needle}' is ambiguous; use its id"
        )),
        (None, _) => Err(anyhow!("No account matching '{needle}'")),
    }
}

/// Display name for a referenced account. Dangling references (the account
/// was deleted later) resolve to a placeholder rather than an error.
fn account_label(store: &Store, id: Option<&str>) -> String {
    let Some(id) = id else {
        return String::new();
    };
    store
        .account(id)
        .map(|a| a.name.clone())
        .unwrap_or_else(|| "—".to_string())
}

fn fmt_amount(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for row in rows {
        t.add_row(row.into_iter().map(Cell::new));
    }
    t
}
