use crate::error::LedgerError;
use crate::model::{
    Budget, BudgetPeriod, Contribution, SavingsGoal, Transaction, TransactionDraft,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const TRANSACTIONS_FILE: &str = "transactions.json";
const BUDGETS_FILE: &str = "budgets.json";
const GOALS_FILE: &str = "savings_goals.json";

/// Sole owner of all ledger records.
///
/// Budget and goal amounts are stored in the canonical currency;
/// transactions keep the currency they were entered in. Every mutation
/// rewrites the affected JSON document wholesale — there is no incremental
/// append and no locking, concurrent writers are not supported.
pub struct LedgerStore {
    data_dir: Option<PathBuf>,
    transactions: Vec<Transaction>,
    budgets: BTreeMap<String, Budget>,
    goals: BTreeMap<String, SavingsGoal>,
    transactions_recovered: bool,
}

/// Both the bare array and the `{"transactions": [...]}` wrapper written by
/// older versions are accepted.
#[derive(Deserialize)]
#[serde(untagged)]
enum TransactionsFile {
    List(Vec<Transaction>),
    Wrapped { transactions: Vec<Transaction> },
}

impl LedgerStore {
    /// Empty store with no backing files. CRUD behaves identically but
    /// nothing is persisted; used for tests and dry runs.
    pub fn new() -> Self {
        LedgerStore {
            data_dir: None,
            transactions: Vec::new(),
            budgets: BTreeMap::new(),
            goals: BTreeMap::new(),
            transactions_recovered: false,
        }
    }

    /// Load the three ledger documents from `dir`. Missing files mean an
    /// empty ledger; a malformed transactions file is reset to empty with a
    /// warning the caller is expected to surface, malformed budgets or goals
    /// reset silently.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();

        let (transactions, transactions_recovered) = load_transactions(&dir.join(TRANSACTIONS_FILE));
        let budgets = load_budgets(&dir.join(BUDGETS_FILE));
        let goals = load_goals(&dir.join(GOALS_FILE));

        debug!(
            transactions = transactions.len(),
            budgets = budgets.len(),
            goals = goals.len(),
            "Loaded ledger from {}",
            dir.display()
        );

        LedgerStore {
            data_dir: Some(dir),
            transactions,
            budgets,
            goals,
            transactions_recovered,
        }
    }

    /// True when the transactions file was unreadable and the store started
    /// over with an empty list.
    pub fn transactions_recovered(&self) -> bool {
        self.transactions_recovered
    }

    // -- Transactions -----------------------------------------------------

    /// Validates the draft, assigns a unique id and persists. Returns the
    /// new id.
    pub fn add_transaction(&mut self, draft: TransactionDraft) -> Result<String, LedgerError> {
        require_positive(draft.amount.amount)?;

        let id = self.next_transaction_id();
        self.transactions.push(Transaction {
            id: id.clone(),
            amount: draft.amount.amount,
            currency: draft.amount.currency,
            kind: draft.kind,
            category: normalize(draft.category),
            description: normalize(draft.description),
            date: draft.date,
        });
        self.persist_transactions()?;
        Ok(id)
    }

    /// Replaces every user-editable field of the transaction, keeping its
    /// id. Unknown id is a no-op returning `false`.
    pub fn update_transaction(
        &mut self,
        id: &str,
        draft: TransactionDraft,
    ) -> Result<bool, LedgerError> {
        require_positive(draft.amount.amount)?;

        let Some(transaction) = self.transactions.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        transaction.amount = draft.amount.amount;
        transaction.currency = draft.amount.currency;
        transaction.kind = draft.kind;
        transaction.category = normalize(draft.category);
        transaction.description = normalize(draft.description);
        transaction.date = draft.date;

        self.persist_transactions()?;
        Ok(true)
    }

    /// Removes every transaction whose id is in `ids`; returns how many
    /// were removed. Unknown ids are ignored.
    pub fn delete_transactions(&mut self, ids: &[String]) -> Result<usize, LedgerError> {
        let before = self.transactions.len();
        self.transactions.retain(|t| !ids.contains(&t.id));
        let removed = before - self.transactions.len();
        if removed > 0 {
            self.persist_transactions()?;
        }
        Ok(removed)
    }

    /// Transactions in display order: reverse-chronological by date, ties
    /// broken by insertion order.
    pub fn transactions(&self) -> Vec<&Transaction> {
        let mut ordered: Vec<&Transaction> = self.transactions.iter().collect();
        ordered.sort_by(|a, b| b.date.cmp(&a.date));
        ordered
    }

    pub fn transaction(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    // -- Budgets ----------------------------------------------------------

    /// Idempotent overwrite of the category's budget. The amount must
    /// already be in the canonical currency.
    pub fn set_budget(
        &mut self,
        category: &str,
        amount: f64,
        period: BudgetPeriod,
    ) -> Result<(), LedgerError> {
        if category.trim().is_empty() {
            return Err(LedgerError::MissingField("category"));
        }
        require_positive(amount)?;

        self.budgets
            .insert(category.to_string(), Budget { amount, period });
        self.persist_budgets()
    }

    /// No-op returning `false` when the category has no budget.
    pub fn delete_budget(&mut self, category: &str) -> Result<bool, LedgerError> {
        if self.budgets.remove(category).is_none() {
            return Ok(false);
        }
        self.persist_budgets()?;
        Ok(true)
    }

    pub fn budgets(&self) -> &BTreeMap<String, Budget> {
        &self.budgets
    }

    // -- Savings goals ----------------------------------------------------

    /// Creates (or overwrites) a goal. Amounts must be in the canonical
    /// currency; a zero target is allowed, progress reporting guards it.
    pub fn add_goal(
        &mut self,
        name: &str,
        target: f64,
        monthly: f64,
        deadline: NaiveDate,
    ) -> Result<(), LedgerError> {
        if name.trim().is_empty() {
            return Err(LedgerError::MissingField("name"));
        }
        require_non_negative(target)?;
        require_non_negative(monthly)?;

        self.goals.insert(
            name.to_string(),
            SavingsGoal {
                target,
                current: 0.0,
                monthly,
                deadline,
                contributions: Vec::new(),
            },
        );
        self.persist_goals()
    }

    /// Appends a contribution dated today and bumps the goal's running
    /// total.
    pub fn add_contribution(&mut self, name: &str, amount: f64) -> Result<(), LedgerError> {
        require_positive(amount)?;

        let Some(goal) = self.goals.get_mut(name) else {
            return Err(LedgerError::RecordNotFound {
                kind: "savings goal",
                name: name.to_string(),
            });
        };
        goal.current += amount;
        goal.contributions.push(Contribution {
            amount,
            date: Utc::now().date_naive(),
        });
        self.persist_goals()
    }

    /// No-op returning `false` when no goal has that name.
    pub fn delete_goal(&mut self, name: &str) -> Result<bool, LedgerError> {
        if self.goals.remove(name).is_none() {
            return Ok(false);
        }
        self.persist_goals()?;
        Ok(true)
    }

    pub fn goals(&self) -> &BTreeMap<String, SavingsGoal> {
        &self.goals
    }

    // -- Persistence ------------------------------------------------------

    fn persist_transactions(&self) -> Result<(), LedgerError> {
        self.persist(TRANSACTIONS_FILE, &self.transactions)
    }

    fn persist_budgets(&self) -> Result<(), LedgerError> {
        self.persist(BUDGETS_FILE, &self.budgets)
    }

    fn persist_goals(&self) -> Result<(), LedgerError> {
        self.persist(GOALS_FILE, &self.goals)
    }

    fn persist<T: Serialize>(&self, file: &str, value: &T) -> Result<(), LedgerError> {
        let Some(dir) = &self.data_dir else {
            return Ok(());
        };

        let persistence = |source| LedgerError::Persistence {
            file: file.to_string(),
            source,
        };

        fs::create_dir_all(dir).map_err(persistence)?;
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| persistence(std::io::Error::other(e)))?;
        fs::write(dir.join(file), json).map_err(persistence)
    }

    fn next_transaction_id(&self) -> String {
        let base = Utc::now().format("%Y%m%d%H%M%S%6f").to_string();
        let mut id = base.clone();
        let mut suffix = 0;
        while self.transactions.iter().any(|t| t.id == id) {
            suffix += 1;
            id = format!("{base}-{suffix}");
        }
        id
    }
}

impl Default for LedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

fn load_transactions(path: &Path) -> (Vec<Transaction>, bool) {
    let Ok(content) = fs::read_to_string(path) else {
        return (Vec::new(), false);
    };
    match serde_json::from_str::<TransactionsFile>(&content) {
        Ok(TransactionsFile::List(transactions))
        | Ok(TransactionsFile::Wrapped { transactions }) => (transactions, false),
        Err(e) => {
            warn!(error = %e, "Could not load transactions file, starting with empty transactions");
            (Vec::new(), true)
        }
    }
}

fn load_budgets(path: &Path) -> BTreeMap<String, Budget> {
    let Ok(content) = fs::read_to_string(path) else {
        return BTreeMap::new();
    };
    serde_json::from_str(&content).unwrap_or_default()
}

fn load_goals(path: &Path) -> BTreeMap<String, SavingsGoal> {
    let Ok(content) = fs::read_to_string(path) else {
        return BTreeMap::new();
    };
    let Ok(raw) = serde_json::from_str::<BTreeMap<String, serde_json::Value>>(&content) else {
        return BTreeMap::new();
    };

    // Entries missing required fields are dropped, the rest survive.
    let mut goals = BTreeMap::new();
    for (name, value) in raw {
        match serde_json::from_value::<SavingsGoal>(value) {
            Ok(goal) => {
                goals.insert(name, goal);
            }
            Err(e) => warn!(goal = %name, error = %e, "Skipping invalid savings goal"),
        }
    }
    goals
}

fn normalize(field: Option<String>) -> Option<String> {
    field.filter(|s| !s.trim().is_empty())
}

fn require_positive(amount: f64) -> Result<(), LedgerError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(LedgerError::InvalidAmount(format!(
            "expected a positive amount, got {amount}"
        )));
    }
    Ok(())
}

fn require_non_negative(amount: f64) -> Result<(), LedgerError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(LedgerError::InvalidAmount(format!(
            "expected a non-negative amount, got {amount}"
        )));
    }
    Ok(())
}
