use crate::convert::CurrencyConverter;
use crate::model::{BudgetPeriod, Currency, SavingsGoal, Transaction, TransactionKind};
use crate::store::LedgerStore;
use chrono::{Datelike, Days, NaiveDate};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Bucket label for expenses without a category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Income, expenses and balance of the whole ledger in a display currency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedgerSummary {
    pub income: f64,
    pub expenses: f64,
    pub balance: f64,
    pub currency: Currency,
}

/// Sums every transaction converted individually into `display`. Stored
/// amounts are never mutated; conversion is a read-time transformation.
pub async fn summarize(
    store: &LedgerStore,
    converter: &mut CurrencyConverter,
    display: Currency,
) -> LedgerSummary {
    let mut income = 0.0;
    let mut expenses = 0.0;

    for transaction in store.transactions() {
        let converted = converter
            .convert(transaction.amount, transaction.currency, display)
            .await;
        match transaction.kind {
            TransactionKind::Income => income += converted,
            TransactionKind::Expense => expenses += converted,
        }
    }

    LedgerSummary {
        income,
        expenses,
        balance: income - expenses,
        currency: display,
    }
}

/// Inclusive date window a budget period covers, relative to `as_of`.
/// Monthly runs over the calendar month; weekly runs Monday through Sunday
/// of the week containing `as_of`.
pub fn period_window(period: BudgetPeriod, as_of: NaiveDate) -> (NaiveDate, NaiveDate) {
    match period {
        BudgetPeriod::Monthly => {
            let start = as_of.with_day(1).unwrap_or(as_of);
            (start, last_day_of_month(as_of))
        }
        BudgetPeriod::Weekly => {
            let monday = as_of - Days::new(u64::from(as_of.weekday().num_days_from_monday()));
            (monday, monday + Days::new(6))
        }
    }
}

fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let first_of_next = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    };
    first_of_next.and_then(|d| d.pred_opt()).unwrap_or(date)
}

/// Expense total for a category within the period window around `as_of`,
/// in the canonical currency.
pub async fn spending(
    store: &LedgerStore,
    converter: &mut CurrencyConverter,
    category: &str,
    period: BudgetPeriod,
    as_of: NaiveDate,
) -> f64 {
    let (start, end) = period_window(period, as_of);
    let mut total = 0.0;

    for transaction in store.transactions() {
        if transaction.kind != TransactionKind::Expense {
            continue;
        }
        if transaction.category.as_deref() != Some(category) {
            continue;
        }
        if transaction.date < start || transaction.date > end {
            continue;
        }
        total += converter
            .convert(transaction.amount, transaction.currency, Currency::CANONICAL)
            .await;
    }
    total
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetStatus {
    OnTrack,
    NearLimit,
    OverBudget,
}

impl std::fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BudgetStatus::OnTrack => f.write_str("On Track"),
            BudgetStatus::NearLimit => f.write_str("Near Limit"),
            BudgetStatus::OverBudget => f.write_str("Over Budget"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetStanding {
    pub remaining: f64,
    pub status: BudgetStatus,
}

/// Remaining headroom and status for a budget limit versus what was spent,
/// both in the same currency. Near-limit means less than 20% of the limit
/// is left.
pub fn budget_status(limit: f64, spent: f64) -> BudgetStanding {
    let remaining = limit - spent;
    let status = if remaining < 0.0 {
        BudgetStatus::OverBudget
    } else if remaining < 0.2 * limit {
        BudgetStatus::NearLimit
    } else {
        BudgetStatus::OnTrack
    };
    BudgetStanding { remaining, status }
}

/// Percent of the target reached. A zero (or degenerate) target reports 0%
/// rather than dividing by it.
pub fn goal_progress(goal: &SavingsGoal) -> f64 {
    if goal.target <= 0.0 {
        return 0.0;
    }
    goal.current / goal.target * 100.0
}

/// Expense totals per category converted into `display`, sorted descending
/// by total. Uncategorized transactions land under [`UNCATEGORIZED`].
pub async fn category_breakdown(
    store: &LedgerStore,
    converter: &mut CurrencyConverter,
    display: Currency,
) -> Vec<(String, f64)> {
    let mut totals: HashMap<String, f64> = HashMap::new();

    for transaction in store.transactions() {
        if transaction.kind != TransactionKind::Expense {
            continue;
        }
        let converted = converter
            .convert(transaction.amount, transaction.currency, display)
            .await;
        let label = transaction
            .category
            .clone()
            .unwrap_or_else(|| UNCATEGORIZED.to_string());
        *totals.entry(label).or_insert(0.0) += converted;
    }

    let mut rows: Vec<(String, f64)> = totals.into_iter().collect();
    rows.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    rows
}

/// One budget line for the reporting collaborator, amounts converted into
/// the display currency.
#[derive(Debug, Clone)]
pub struct BudgetRow {
    pub category: String,
    pub period: BudgetPeriod,
    pub limit: f64,
    pub spent: f64,
    pub remaining: f64,
    pub status: BudgetStatus,
}

pub async fn budget_report(
    store: &LedgerStore,
    converter: &mut CurrencyConverter,
    display: Currency,
    as_of: NaiveDate,
) -> Vec<BudgetRow> {
    let mut rows = Vec::new();

    for (category, budget) in store.budgets() {
        let spent = spending(store, converter, category, budget.period, as_of).await;
        // Status is decided in canonical terms; the display conversion is a
        // positive scale and cannot change it.
        let standing = budget_status(budget.amount, spent);
        let factor = converter.factor(Currency::CANONICAL, display).await;

        rows.push(BudgetRow {
            category: category.clone(),
            period: budget.period,
            limit: budget.amount * factor,
            spent: spent * factor,
            remaining: standing.remaining * factor,
            status: standing.status,
        });
    }
    rows
}

/// One savings-goal line for the reporting collaborator.
#[derive(Debug, Clone)]
pub struct GoalRow {
    pub name: String,
    pub target: f64,
    pub current: f64,
    pub monthly: f64,
    pub deadline: NaiveDate,
    pub progress_pct: f64,
}

pub async fn goal_report(
    store: &LedgerStore,
    converter: &mut CurrencyConverter,
    display: Currency,
) -> Vec<GoalRow> {
    let factor = converter.factor(Currency::CANONICAL, display).await;

    store
        .goals()
        .iter()
        .map(|(name, goal)| GoalRow {
            name: name.clone(),
            target: goal.target * factor,
            current: goal.current * factor,
            monthly: goal.monthly * factor,
            deadline: goal.deadline,
            progress_pct: goal_progress(goal),
        })
        .collect()
}

/// Cumulative balance after each transaction in chronological order, in the
/// display currency. Chart rendering is the caller's business.
pub async fn running_balance(
    store: &LedgerStore,
    converter: &mut CurrencyConverter,
    display: Currency,
) -> Vec<(NaiveDate, f64)> {
    let mut chronological: Vec<&Transaction> = store.transactions();
    chronological.sort_by(|a, b| a.date.cmp(&b.date));

    let mut balance = 0.0;
    let mut series = Vec::with_capacity(chronological.len());
    for transaction in chronological {
        let converted = converter
            .convert(transaction.amount, transaction.currency, display)
            .await;
        match transaction.kind {
            TransactionKind::Income => balance += converted,
            TransactionKind::Expense => balance -= converted,
        }
        series.push((transaction.date, balance));
    }
    series
}
