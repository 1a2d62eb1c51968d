use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{CommandFactory, Parser, Subcommand};
use kasa::log::init_logging;
use kasa::model::{BudgetPeriod, Currency, Money, TransactionDraft, TransactionKind};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Display currency for this invocation; subcommand --currency flags
    /// still name the currency a value was entered in
    #[arg(long, global = true, value_enum)]
    display: Option<Currency>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display income, expenses and balance
    Summary,
    /// List transactions, newest first
    List,
    /// Display spending per category
    Breakdown,
    /// Record a transaction
    Add {
        amount: f64,
        #[arg(short = 'u', long, value_enum, default_value = "CZK")]
        currency: Currency,
        #[arg(short, long, value_enum, default_value = "expense")]
        kind: TransactionKind,
        #[arg(long)]
        category: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        /// Transaction date; defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Replace a transaction's fields
    Edit {
        id: String,
        amount: f64,
        #[arg(short = 'u', long, value_enum, default_value = "CZK")]
        currency: Currency,
        #[arg(short, long, value_enum, default_value = "expense")]
        kind: TransactionKind,
        #[arg(long)]
        category: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Delete transactions by id
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Manage category budgets
    Budget {
        #[command(subcommand)]
        command: BudgetCommands,
    },
    /// Manage savings goals
    Goal {
        #[command(subcommand)]
        command: GoalCommands,
    },
}

#[derive(Subcommand)]
enum BudgetCommands {
    /// Set or replace the budget for a category
    Set {
        category: String,
        amount: f64,
        #[arg(short = 'u', long, value_enum, default_value = "CZK")]
        currency: Currency,
        #[arg(short, long, value_enum, default_value = "monthly")]
        period: BudgetPeriod,
    },
    /// Remove the budget for a category
    Remove { category: String },
    /// Show budgets against current-period spending
    List,
}

#[derive(Subcommand)]
enum GoalCommands {
    /// Create a savings goal
    Add {
        name: String,
        target: f64,
        #[arg(short = 'u', long, value_enum, default_value = "CZK")]
        currency: Currency,
        #[arg(short, long, default_value_t = 0.0)]
        monthly: f64,
        #[arg(long)]
        deadline: NaiveDate,
    },
    /// Add a contribution to a goal
    Contribute {
        name: String,
        amount: f64,
        #[arg(short = 'u', long, value_enum, default_value = "CZK")]
        currency: Currency,
    },
    /// Remove a savings goal
    Remove { name: String },
    /// Show goals with progress
    List,
}

fn draft(
    amount: f64,
    currency: Currency,
    kind: TransactionKind,
    category: Option<String>,
    description: Option<String>,
    date: Option<NaiveDate>,
) -> TransactionDraft {
    TransactionDraft {
        amount: Money::new(amount, currency),
        kind,
        category,
        description,
        date: date.unwrap_or_else(|| Local::now().date_naive()),
    }
}

impl From<Commands> for kasa::AppCommand {
    fn from(cmd: Commands) -> kasa::AppCommand {
        match cmd {
            Commands::Summary => kasa::AppCommand::Summary,
            Commands::List => kasa::AppCommand::List,
            Commands::Breakdown => kasa::AppCommand::Breakdown,
            Commands::Add {
                amount,
                currency,
                kind,
                category,
                description,
                date,
            } => kasa::AppCommand::Add(draft(amount, currency, kind, category, description, date)),
            Commands::Edit {
                id,
                amount,
                currency,
                kind,
                category,
                description,
                date,
            } => kasa::AppCommand::Edit {
                id,
                draft: draft(amount, currency, kind, category, description, date),
            },
            Commands::Delete { ids } => kasa::AppCommand::Delete { ids },
            Commands::Budget { command } => match command {
                BudgetCommands::Set {
                    category,
                    amount,
                    currency,
                    period,
                } => kasa::AppCommand::BudgetSet {
                    category,
                    amount: Money::new(amount, currency),
                    period,
                },
                BudgetCommands::Remove { category } => kasa::AppCommand::BudgetRemove { category },
                BudgetCommands::List => kasa::AppCommand::BudgetList,
            },
            Commands::Goal { command } => match command {
                GoalCommands::Add {
                    name,
                    target,
                    currency,
                    monthly,
                    deadline,
                } => kasa::AppCommand::GoalAdd {
                    name,
                    target: Money::new(target, currency),
                    monthly: Money::new(monthly, currency),
                    deadline,
                },
                GoalCommands::Contribute {
                    name,
                    amount,
                    currency,
                } => kasa::AppCommand::GoalContribute {
                    name,
                    amount: Money::new(amount, currency),
                },
                GoalCommands::Remove { name } => kasa::AppCommand::GoalRemove { name },
                GoalCommands::List => kasa::AppCommand::GoalList,
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => kasa::run_command(cmd.into(), cli.config_path.as_deref(), cli.display).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

fn setup() -> anyhow::Result<()> {
    use anyhow::Context;

    let path = kasa::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = r#"---
# Currency amounts are shown in: CZK, USD or EUR
currency: "CZK"

rates:
  base_url: "https://api.exchangerate-api.com"
"#;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
