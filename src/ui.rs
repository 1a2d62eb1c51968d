use crate::convert::format_amount;
use crate::model::Currency;
use crate::summary::{BudgetRow, BudgetStatus, GoalRow, LedgerSummary};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    TotalLabel,
    TotalValue,
    Error,
    Warning,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::TotalLabel => style(text).bold(),
        StyleType::TotalValue => style(text).green().bold(),
        StyleType::Error => style(text).red(),
        StyleType::Warning => style(text).yellow(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn amount_cell(amount: f64, currency: Currency) -> Cell {
    Cell::new(format_amount(amount, currency)).set_alignment(CellAlignment::Right)
}

fn status_cell(status: BudgetStatus) -> Cell {
    let color = match status {
        BudgetStatus::OnTrack => Color::Green,
        BudgetStatus::NearLimit => Color::Yellow,
        BudgetStatus::OverBudget => Color::Red,
    };
    Cell::new(status.to_string()).fg(color)
}

/// Income / expenses / balance panel.
pub fn render_summary(summary: &LedgerSummary) -> String {
    let balance_style = if summary.balance < 0.0 {
        StyleType::Error
    } else {
        StyleType::TotalValue
    };

    format!(
        "{} {}\n{} {}\n{} {}",
        style_text("Income:", StyleType::TotalLabel),
        format_amount(summary.income, summary.currency),
        style_text("Expenses:", StyleType::TotalLabel),
        format_amount(summary.expenses, summary.currency),
        style_text("Balance:", StyleType::TotalLabel),
        style_text(&format_amount(summary.balance, summary.currency), balance_style),
    )
}

/// One transaction line prepared by the caller: fields plus the amount
/// already converted and formatted for display.
pub struct TransactionLine {
    pub id: String,
    pub date: String,
    pub kind: String,
    pub category: String,
    pub description: String,
    pub amount: String,
}

pub fn render_transactions(lines: &[TransactionLine]) -> String {
    let mut table = new_styled_table();
    table.set_header(vec![
        header_cell("Id"),
        header_cell("Date"),
        header_cell("Type"),
        header_cell("Category"),
        header_cell("Description"),
        header_cell("Amount"),
    ]);

    for line in lines {
        table.add_row(vec![
            Cell::new(&line.id),
            Cell::new(&line.date),
            Cell::new(&line.kind),
            Cell::new(&line.category),
            Cell::new(&line.description),
            Cell::new(&line.amount).set_alignment(CellAlignment::Right),
        ]);
    }
    table.to_string()
}

pub fn render_breakdown(rows: &[(String, f64)], display: Currency) -> String {
    let mut table = new_styled_table();
    table.set_header(vec![
        header_cell("Category"),
        header_cell(&format!("Spent ({display})")),
    ]);

    for (category, total) in rows {
        table.add_row(vec![Cell::new(category), amount_cell(*total, display)]);
    }
    table.to_string()
}

pub fn render_budgets(rows: &[BudgetRow], display: Currency) -> String {
    let mut table = new_styled_table();
    table.set_header(vec![
        header_cell("Category"),
        header_cell("Period"),
        header_cell(&format!("Budget ({display})")),
        header_cell(&format!("Spent ({display})")),
        header_cell(&format!("Remaining ({display})")),
        header_cell("Status"),
    ]);

    for row in rows {
        table.add_row(vec![
            Cell::new(&row.category),
            Cell::new(row.period.to_string()),
            amount_cell(row.limit, display),
            amount_cell(row.spent, display),
            amount_cell(row.remaining, display),
            status_cell(row.status),
        ]);
    }
    table.to_string()
}

pub fn render_goals(rows: &[GoalRow], display: Currency) -> String {
    let mut table = new_styled_table();
    table.set_header(vec![
        header_cell("Goal"),
        header_cell(&format!("Target ({display})")),
        header_cell(&format!("Saved ({display})")),
        header_cell(&format!("Monthly ({display})")),
        header_cell("Deadline"),
        header_cell("Progress"),
    ]);

    for row in rows {
        table.add_row(vec![
            Cell::new(&row.name),
            amount_cell(row.target, display),
            amount_cell(row.current, display),
            amount_cell(row.monthly, display),
            Cell::new(row.deadline.to_string()),
            Cell::new(format!("{:.1}%", row.progress_pct)).set_alignment(CellAlignment::Right),
        ]);
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_summary_contains_formatted_amounts() {
        let summary = LedgerSummary {
            income: 2350.0,
            expenses: 705.0,
            balance: 1645.0,
            currency: Currency::Czk,
        };
        let rendered = render_summary(&summary);
        assert!(rendered.contains("2,350.00 CZK"));
        assert!(rendered.contains("705.00 CZK"));
        assert!(rendered.contains("1,645.00 CZK"));
    }

    #[test]
    fn test_render_budgets_contains_status() {
        use crate::model::BudgetPeriod;
        use crate::summary::BudgetStatus;

        let rows = vec![BudgetRow {
            category: "food".to_string(),
            period: BudgetPeriod::Monthly,
            limit: 5000.0,
            spent: 4200.0,
            remaining: 800.0,
            status: BudgetStatus::NearLimit,
        }];
        let rendered = render_budgets(&rows, Currency::Czk);
        assert!(rendered.contains("food"));
        assert!(rendered.contains("Near Limit"));
    }
}
