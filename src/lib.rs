pub mod config;
pub mod convert;
pub mod error;
pub mod log;
pub mod model;
pub mod rates;
pub mod store;
pub mod summary;
pub mod ui;

use crate::config::AppConfig;
use crate::convert::{CurrencyConverter, format_amount};
use crate::model::{BudgetPeriod, Currency, Money, TransactionDraft};
use crate::rates::{ExchangeRateApi, RateCache};
use crate::store::LedgerStore;
use anyhow::Result;
use chrono::{Local, NaiveDate};
use tracing::{debug, info};

/// Operations the CLI collaborator can ask of the core.
pub enum AppCommand {
    Summary,
    List,
    Breakdown,
    Add(TransactionDraft),
    Edit {
        id: String,
        draft: TransactionDraft,
    },
    Delete {
        ids: Vec<String>,
    },
    BudgetSet {
        category: String,
        amount: Money,
        period: BudgetPeriod,
    },
    BudgetRemove {
        category: String,
    },
    BudgetList,
    GoalAdd {
        name: String,
        target: Money,
        monthly: Money,
        deadline: NaiveDate,
    },
    GoalContribute {
        name: String,
        amount: Money,
    },
    GoalRemove {
        name: String,
    },
    GoalList,
}

pub async fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    currency_override: Option<Currency>,
) -> Result<()> {
    info!("Ledger starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let display = currency_override.unwrap_or(config.currency);
    let data_dir = config.data_path()?;
    let mut store = LedgerStore::open(&data_dir);
    if store.transactions_recovered() {
        println!(
            "{}",
            ui::style_text(
                "Could not load transactions file. Starting with empty transactions.",
                ui::StyleType::Warning,
            )
        );
    }

    let cache = RateCache::new(Box::new(ExchangeRateApi::new(&config.rates.base_url)));
    let mut converter = CurrencyConverter::new(cache);

    match command {
        AppCommand::Summary => {
            let summary = summary::summarize(&store, &mut converter, display).await;
            println!("{}", ui::render_summary(&summary));
        }
        AppCommand::List => {
            let lines = transaction_lines(&store, &mut converter, display).await;
            println!("{}", ui::render_transactions(&lines));
        }
        AppCommand::Breakdown => {
            let rows = summary::category_breakdown(&store, &mut converter, display).await;
            println!("{}", ui::render_breakdown(&rows, display));
        }
        AppCommand::Add(draft) => {
            let id = store.add_transaction(draft)?;
            println!("Added transaction {id}");
        }
        AppCommand::Edit { id, draft } => {
            if store.update_transaction(&id, draft)? {
                println!("Updated transaction {id}");
            } else {
                println!("No transaction with id {id}");
            }
        }
        AppCommand::Delete { ids } => {
            let removed = store.delete_transactions(&ids)?;
            println!("Deleted {removed} transaction(s)");
        }
        AppCommand::BudgetSet {
            category,
            amount,
            period,
        } => {
            let canonical = converter
                .convert(amount.amount, amount.currency, Currency::CANONICAL)
                .await;
            store.set_budget(&category, canonical, period)?;
            println!(
                "Budget for {category}: {} per {period}",
                format_amount(canonical, Currency::CANONICAL)
            );
        }
        AppCommand::BudgetRemove { category } => {
            if store.delete_budget(&category)? {
                println!("Removed budget for {category}");
            } else {
                println!("No budget for {category}");
            }
        }
        AppCommand::BudgetList => {
            let as_of = Local::now().date_naive();
            let rows = summary::budget_report(&store, &mut converter, display, as_of).await;
            println!("{}", ui::render_budgets(&rows, display));
        }
        AppCommand::GoalAdd {
            name,
            target,
            monthly,
            deadline,
        } => {
            let target = converter
                .convert(target.amount, target.currency, Currency::CANONICAL)
                .await;
            let monthly = converter
                .convert(monthly.amount, monthly.currency, Currency::CANONICAL)
                .await;
            store.add_goal(&name, target, monthly, deadline)?;
            println!("Added savings goal {name}");
        }
        AppCommand::GoalContribute { name, amount } => {
            let canonical = converter
                .convert(amount.amount, amount.currency, Currency::CANONICAL)
                .await;
            store.add_contribution(&name, canonical)?;
            println!(
                "Added {} to {name}",
                format_amount(canonical, Currency::CANONICAL)
            );
        }
        AppCommand::GoalRemove { name } => {
            if store.delete_goal(&name)? {
                println!("Removed savings goal {name}");
            } else {
                println!("No savings goal named {name}");
            }
        }
        AppCommand::GoalList => {
            let rows = summary::goal_report(&store, &mut converter, display).await;
            println!("{}", ui::render_goals(&rows, display));
        }
    }

    Ok(())
}

/// Rows for the transaction table: each amount converted into the display
/// currency. When displaying canonically, a foreign original is appended in
/// parentheses so the entry amount stays visible.
async fn transaction_lines(
    store: &LedgerStore,
    converter: &mut CurrencyConverter,
    display: Currency,
) -> Vec<ui::TransactionLine> {
    let mut lines = Vec::new();

    for transaction in store.transactions() {
        let converted = converter
            .convert(transaction.amount, transaction.currency, display)
            .await;
        let mut amount = format_amount(converted, display);
        if transaction.currency != display && display == Currency::CANONICAL {
            let original = format_amount(transaction.amount, transaction.currency);
            amount = format!("{amount} ({original})");
        }

        lines.push(ui::TransactionLine {
            id: transaction.id.clone(),
            date: transaction.date.to_string(),
            kind: transaction.kind.to_string(),
            category: transaction.category.clone().unwrap_or_default(),
            description: transaction.description.clone().unwrap_or_default(),
            amount,
        });
    }
    lines
}
