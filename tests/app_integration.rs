use chrono::NaiveDate;
use kasa::AppCommand;
use kasa::model::{BudgetPeriod, Currency, Money, TransactionDraft, TransactionKind};
use std::fs;
use std::path::Path;

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Rate endpoint for the canonical base. The table values express one
    /// CZK in the quoted currency.
    pub async fn create_rates_mock_server() -> MockServer {
        let mock_server = MockServer::start().await;
        let body = r#"{"rates": {"CZK": 1.0, "USD": 0.0425531915, "EUR": 0.04}}"#;

        Mock::given(method("GET"))
            .and(path("/v4/latest/CZK"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub fn write_config(
        dir: &std::path::Path,
        data_dir: &std::path::Path,
        rates_url: &str,
    ) -> std::path::PathBuf {
        let config_path = dir.join("config.yaml");
        let config_content = format!(
            r#"
currency: "CZK"
data_dir: "{}"
rates:
  base_url: "{}"
"#,
            data_dir.display(),
            rates_url
        );
        std::fs::write(&config_path, config_content).expect("Failed to write config file");
        config_path
    }
}

fn expense(amount: f64, currency: Currency, category: &str, date: &str) -> TransactionDraft {
    TransactionDraft {
        amount: Money::new(amount, currency),
        kind: TransactionKind::Expense,
        category: Some(category.to_string()),
        description: None,
        date: date.parse().expect("valid date"),
    }
}

async fn run(command: AppCommand, config_path: &Path) {
    let result = kasa::run_command(command, config_path.to_str(), None).await;
    assert!(result.is_ok(), "Command failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_full_transaction_flow_with_mock() {
    let mock_server = test_utils::create_rates_mock_server().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let data_dir = dir.path().join("data");
    let config_path = test_utils::write_config(dir.path(), &data_dir, &mock_server.uri());

    let income = TransactionDraft {
        amount: Money::new(100.0, Currency::Usd),
        kind: TransactionKind::Income,
        category: Some("salary".to_string()),
        description: Some("August pay".to_string()),
        date: NaiveDate::from_ymd_opt(2026, 8, 3).unwrap(),
    };
    run(AppCommand::Add(income), &config_path).await;
    run(
        AppCommand::Add(expense(30.0, Currency::Usd, "food", "2026-08-10")),
        &config_path,
    )
    .await;

    run(AppCommand::Summary, &config_path).await;
    run(AppCommand::List, &config_path).await;
    run(AppCommand::Breakdown, &config_path).await;

    // Records persist in the entry currency.
    let raw = fs::read_to_string(data_dir.join("transactions.json")).unwrap();
    let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let records = stored.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["currency"], "USD");
    assert_eq!(records[0]["type"], "income");
    assert_eq!(records[0]["amount"], 100.0);
}

#[test_log::test(tokio::test)]
async fn test_edit_and_delete_flow() {
    let mock_server = test_utils::create_rates_mock_server().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let data_dir = dir.path().join("data");
    let config_path = test_utils::write_config(dir.path(), &data_dir, &mock_server.uri());

    run(
        AppCommand::Add(expense(250.0, Currency::Czk, "food", "2026-08-01")),
        &config_path,
    )
    .await;
    run(
        AppCommand::Add(expense(90.0, Currency::Czk, "transport", "2026-08-02")),
        &config_path,
    )
    .await;

    let raw = fs::read_to_string(data_dir.join("transactions.json")).unwrap();
    let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let first_id = stored[0]["id"].as_str().unwrap().to_string();
    let second_id = stored[1]["id"].as_str().unwrap().to_string();

    run(
        AppCommand::Edit {
            id: first_id.clone(),
            draft: expense(300.0, Currency::Czk, "groceries", "2026-08-01"),
        },
        &config_path,
    )
    .await;
    run(
        AppCommand::Delete {
            ids: vec![second_id],
        },
        &config_path,
    )
    .await;

    let raw = fs::read_to_string(data_dir.join("transactions.json")).unwrap();
    let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let records = stored.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["id"], first_id.as_str());
    assert_eq!(records[0]["amount"], 300.0);
    assert_eq!(records[0]["category"], "groceries");

    // Editing a missing id is a surfaced no-op, not an error.
    run(
        AppCommand::Edit {
            id: "no-such-id".to_string(),
            draft: expense(1.0, Currency::Czk, "misc", "2026-08-03"),
        },
        &config_path,
    )
    .await;
}

#[test_log::test(tokio::test)]
async fn test_budget_amounts_stored_canonically() {
    let mock_server = test_utils::create_rates_mock_server().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let data_dir = dir.path().join("data");
    let config_path = test_utils::write_config(dir.path(), &data_dir, &mock_server.uri());

    // 10 USD at 23.5 CZK per USD.
    run(
        AppCommand::BudgetSet {
            category: "food".to_string(),
            amount: Money::new(10.0, Currency::Usd),
            period: BudgetPeriod::Monthly,
        },
        &config_path,
    )
    .await;
    run(AppCommand::BudgetList, &config_path).await;

    let raw = fs::read_to_string(data_dir.join("budgets.json")).unwrap();
    let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let amount = stored["food"]["amount"].as_f64().unwrap();
    assert!((amount - 235.0).abs() < 1e-3, "stored {amount}");
    assert_eq!(stored["food"]["period"], "Monthly");

    run(
        AppCommand::BudgetRemove {
            category: "food".to_string(),
        },
        &config_path,
    )
    .await;
    let raw = fs::read_to_string(data_dir.join("budgets.json")).unwrap();
    let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(stored.as_object().unwrap().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_goal_contribution_flow() {
    let mock_server = test_utils::create_rates_mock_server().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let data_dir = dir.path().join("data");
    let config_path = test_utils::write_config(dir.path(), &data_dir, &mock_server.uri());

    run(
        AppCommand::GoalAdd {
            name: "vacation".to_string(),
            target: Money::canonical(20000.0),
            monthly: Money::canonical(2000.0),
            deadline: NaiveDate::from_ymd_opt(2027, 6, 1).unwrap(),
        },
        &config_path,
    )
    .await;
    run(
        AppCommand::GoalContribute {
            name: "vacation".to_string(),
            amount: Money::new(100.0, Currency::Usd),
        },
        &config_path,
    )
    .await;
    run(AppCommand::GoalList, &config_path).await;

    let raw = fs::read_to_string(data_dir.join("savings_goals.json")).unwrap();
    let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let goal = &stored["vacation"];
    assert_eq!(goal["target"], 20000.0);
    let current = goal["current"].as_f64().unwrap();
    assert!((current - 2350.0).abs() < 1e-3, "saved {current}");
    assert_eq!(goal["contributions"].as_array().unwrap().len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_recovers_from_malformed_transactions_file() {
    let mock_server = test_utils::create_rates_mock_server().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let data_dir = dir.path().join("data");
    fs::create_dir_all(&data_dir).unwrap();
    fs::write(data_dir.join("transactions.json"), "{ not json").unwrap();
    let config_path = test_utils::write_config(dir.path(), &data_dir, &mock_server.uri());

    // The store starts empty instead of failing.
    run(AppCommand::Summary, &config_path).await;
    run(
        AppCommand::Add(expense(50.0, Currency::Czk, "food", "2026-08-05")),
        &config_path,
    )
    .await;

    let raw = fs::read_to_string(data_dir.join("transactions.json")).unwrap();
    let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored.as_array().unwrap().len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_summary_survives_unreachable_rate_source() {
    // No mock server; the configured endpoint refuses connections, so
    // conversion falls back to a factor of one.
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let data_dir = dir.path().join("data");
    let config_path = test_utils::write_config(
        dir.path(),
        &data_dir,
        "http://127.0.0.1:1/unreachable",
    );

    run(
        AppCommand::Add(expense(30.0, Currency::Usd, "food", "2026-08-10")),
        &config_path,
    )
    .await;
    run(AppCommand::Summary, &config_path).await;
    run(AppCommand::List, &config_path).await;
}
