use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "monedero")]
#[command(about = "Personal finance tracker for the terminal", long_about = None)]
pub struct Cli {
    /// Override the monedero home directory (config/data subdirs will be created inside it).
    #[arg(long, env = "MONEDERO_HOME")]
    pub home: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Account(AccountArgs),
    Income(AddTransactionArgs),
    Expense(AddTransactionArgs),
    Transfer(TransferArgs),

    Balance(BalanceArgs),
    Ledger(LedgerArgs),
    Insights(InsightsArgs),

    Target(TargetArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Tsv,
}

#[derive(Debug, Subcommand)]
pub enum AccountCmd {
    Add {
        name: String,

        /// Account kind: cash, bank, credit-card or savings.
        #[arg(long)]
        kind: String,

        /// Opening balance. Defaults to 0.
        #[arg(long)]
        balance: Option<String>,
    },
    List {
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Debug, Args)]
pub struct AccountArgs {
    #[command(subcommand)]
    pub cmd: AccountCmd,
}

#[derive(Debug, Args)]
pub struct AddTransactionArgs {
    /// Account name.
    pub account: String,

    pub amount: String,

    pub description: String,

    #[arg(long)]
    pub category: Option<String>,

    /// Transaction time (RFC3339). Defaults to now.
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Debug, Args)]
pub struct TransferArgs {
    /// Source account name.
    pub from: String,

    /// Destination account name.
    pub to: String,

    pub amount: String,

    /// Optional note. Defaults to "Account transfer".
    pub description: Option<String>,

    /// Transfer time (RFC3339). Defaults to now.
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Debug, Args)]
pub struct BalanceArgs {
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct LedgerArgs {
    #[arg(long)]
    pub account: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct InsightsArgs {
    /// Evaluate the trailing week as of this instant (RFC3339). Defaults to now.
    #[arg(long)]
    pub as_of: Option<String>,

    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct TargetArgs {
    /// Weekly spending target.
    pub amount: String,
}
