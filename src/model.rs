use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fixed set of supported currencies.
///
/// All persisted monetary values are stored in [`Currency::CANONICAL`];
/// the other currencies exist for transaction entry and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Currency {
    #[serde(rename = "CZK")]
    #[value(name = "CZK", alias = "czk")]
    Czk,
    #[serde(rename = "USD")]
    #[value(name = "USD", alias = "usd")]
    Usd,
    #[serde(rename = "EUR")]
    #[value(name = "EUR", alias = "eur")]
    Eur,
}

impl Currency {
    /// Currency in which all ledger records are persisted, and the base of
    /// the exchange-rate table.
    pub const CANONICAL: Currency = Currency::Czk;

    pub const ALL: [Currency; 3] = [Currency::Czk, Currency::Usd, Currency::Eur];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Czk => "CZK",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Czk => "CZK",
            Currency::Usd => "$",
            Currency::Eur => "€",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CZK" => Ok(Currency::Czk),
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            other => Err(format!("Unsupported currency: {other}")),
        }
    }
}

/// An amount tagged with its currency. Pure value type; carries no
/// ownership references into the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Money {
    pub amount: f64,
    pub currency: Currency,
}

impl Money {
    pub fn new(amount: f64, currency: Currency) -> Self {
        Money { amount, currency }
    }

    pub fn canonical(amount: f64) -> Self {
        Money::new(amount, Currency::CANONICAL)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Income => f.write_str("income"),
            TransactionKind::Expense => f.write_str("expense"),
        }
    }
}

/// A single income or expense record.
///
/// The id is opaque and time-derived; it never changes after creation.
/// The amount keeps the currency it was entered in — conversion to a
/// display currency happens only at read time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub amount: f64,
    // Records written before multi-currency support carry no currency.
    #[serde(default = "default_currency")]
    pub currency: Currency,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub date: NaiveDate,
}

fn default_currency() -> Currency {
    Currency::CANONICAL
}

impl Transaction {
    pub fn money(&self) -> Money {
        Money::new(self.amount, self.currency)
    }
}

/// User-supplied fields of a transaction; the store assigns the id.
#[derive(Debug, Clone)]
pub struct TransactionDraft {
    pub amount: Money,
    pub kind: TransactionKind,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum BudgetPeriod {
    Weekly,
    Monthly,
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BudgetPeriod::Weekly => f.write_str("Weekly"),
            BudgetPeriod::Monthly => f.write_str("Monthly"),
        }
    }
}

/// A per-category spending limit. Keyed by category in the store; the
/// amount is stored in the canonical currency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub amount: f64,
    pub period: BudgetPeriod,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contribution {
    pub amount: f64,
    pub date: NaiveDate,
}

/// A savings goal. Keyed by name in the store; all amounts are stored in
/// the canonical currency. `current` equals the sum of contributions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsGoal {
    pub target: f64,
    pub current: f64,
    pub monthly: f64,
    pub deadline: NaiveDate,
    pub contributions: Vec<Contribution>,
}
