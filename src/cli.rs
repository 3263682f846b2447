use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;

use crate::domain::{AccountKind, DocumentCategory, TransactionKind};

#[derive(Debug, Parser)]
#[command(name = "nestegg")]
#[command(about = "Local-first personal net-worth tracker", long_about = None)]
pub struct Cli {
    /// Override Nestegg home directory (the data subdir will be created inside it).
    #[arg(long, env = "NESTEGG_HOME")]
    pub home: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Account(AccountArgs),
    Tx(TxArgs),
    Doc(DocArgs),

    /// Every account with its current balance, plus net-worth totals.
    Balance,
    /// Assets, liabilities and net worth, optionally as of a date.
    Networth(NetworthArgs),
    /// Balance history sampled at the dates where something changed.
    History(HistoryArgs),

    Export(ExportArgs),
    Import(ImportArgs),
    /// Delete all stored accounts, transactions and documents.
    Wipe(WipeArgs),

    Currency(CurrencyArgs),
    Locale(LocaleArgs),
}

#[derive(Debug, Subcommand)]
pub enum AccountCmd {
    Add {
        name: String,

        #[arg(long = "type", value_enum)]
        kind: AccountKind,

        /// One of the fixed categories for the account type; defaults to the
        /// catch-all for that type.
        #[arg(long)]
        category: Option<String>,
    },
    List,
    Update {
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long = "type", value_enum)]
        kind: Option<AccountKind>,

        #[arg(long)]
        category: Option<String>,
    },
    Rm {
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct AccountArgs {
    #[command(subcommand)]
    pub cmd: AccountCmd,
}

#[derive(Debug, Subcommand)]
pub enum TxCmd {
    Add {
        #[arg(value_enum)]
        kind: TransactionKind,

        amount: Decimal,

        /// Source account id or name (expense/transfer).
        #[arg(long)]
        from: Option<String>,

        /// Destination account id or name (income/transfer).
        #[arg(long)]
        to: Option<String>,

        /// YYYY-MM-DD; defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long, short = 'm')]
        note: Option<String>,
    },
    List {
        #[arg(long)]
        limit: Option<usize>,
    },
    Rm {
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct TxArgs {
    #[command(subcommand)]
    pub cmd: TxCmd,
}

#[derive(Debug, Subcommand)]
pub enum DocCmd {
    Add {
        title: String,

        #[arg(long, value_enum)]
        category: Option<DocumentCategory>,

        #[arg(long)]
        provider: Option<String>,

        #[arg(long = "ref")]
        reference_no: Option<String>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        medical_coverage: Option<Decimal>,

        #[arg(long)]
        death_benefit: Option<Decimal>,

        #[arg(long)]
        area_sqm: Option<Decimal>,

        #[arg(long)]
        quantity: Option<Decimal>,

        #[arg(long)]
        estimated_value: Option<Decimal>,

        #[arg(long)]
        notes: Option<String>,
    },
    List,
    Update {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long, value_enum)]
        category: Option<DocumentCategory>,

        #[arg(long)]
        provider: Option<String>,

        #[arg(long = "ref")]
        reference_no: Option<String>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        medical_coverage: Option<Decimal>,

        #[arg(long)]
        death_benefit: Option<Decimal>,

        #[arg(long)]
        area_sqm: Option<Decimal>,

        #[arg(long)]
        quantity: Option<Decimal>,

        #[arg(long)]
        estimated_value: Option<Decimal>,

        #[arg(long)]
        notes: Option<String>,
    },
    Rm {
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct DocArgs {
    #[command(subcommand)]
    pub cmd: DocCmd,
}

#[derive(Debug, Args)]
pub struct NetworthArgs {
    /// Inclusive cutoff date (YYYY-MM-DD).
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Subcommand)]
pub enum HistoryCmd {
    /// Net-worth snapshot per distinct transaction date.
    Networth {
        #[arg(long)]
        from: Option<NaiveDate>,
    },
    /// Single-account balance per distinct transaction date.
    Account {
        /// Account id or name.
        account: String,

        #[arg(long)]
        from: Option<NaiveDate>,
    },
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    #[command(subcommand)]
    pub cmd: HistoryCmd,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Write to a file instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    pub file: PathBuf,
}

#[derive(Debug, Args)]
pub struct WipeArgs {
    /// Required; wiping is irreversible.
    #[arg(long)]
    pub yes: bool,
}

#[derive(Debug, Subcommand)]
pub enum CurrencyCmd {
    Get,
    Set { code: String },
}

#[derive(Debug, Args)]
pub struct CurrencyArgs {
    #[command(subcommand)]
    pub cmd: CurrencyCmd,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LocaleChoice {
    En,
    Th,
}

#[derive(Debug, Subcommand)]
pub enum LocaleCmd {
    Get,
    Set {
        #[arg(value_enum)]
        locale: LocaleChoice,
    },
}

#[derive(Debug, Args)]
pub struct LocaleArgs {
    #[command(subcommand)]
    pub cmd: LocaleCmd,
}
