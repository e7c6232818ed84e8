//! Report formatting for terminal output

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::audit::ChangeEvent;
use crate::models::Transaction;
use crate::reports::{OverdueMilestone, PortfolioMetrics, RiskAssessment};

/// Format a percentage with appropriate precision
pub fn format_percentage(pct: f64) -> String {
    if pct > 0.0 && pct < 10.0 {
        format!("{:.1}%", pct)
    } else {
        format!("{:.0}%", pct)
    }
}

/// Simple horizontal bar
pub fn format_bar(value: f64, max_value: f64, width: usize) -> String {
    if max_value <= 0.0 || value <= 0.0 {
        return "░".repeat(width);
    }

    let filled = ((value / max_value) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Dashboard header figures
pub fn format_metrics(metrics: &PortfolioMetrics, window_days: u32, currency_symbol: &str) -> String {
    let mut output = String::new();
    output.push_str("Portfolio\n");
    output.push_str(&"─".repeat(40));
    output.push('\n');
    output.push_str(&format!("Active transactions:  {}\n", metrics.total_active));
    output.push_str(&format!("Closing this week:    {}\n", metrics.closing_this_week));
    output.push_str(&format!("At risk (high):       {}\n", metrics.at_risk));
    output.push_str(&format!(
        "Active volume:        {}\n",
        metrics.total_volume.format_with_symbol(currency_symbol)
    ));

    let avg = if metrics.closed_in_window == 0 {
        format!("- (no closings in last {} days)", window_days)
    } else {
        format!(
            "{:.1} days over {} closing(s) in last {} days",
            metrics.avg_days_to_close, metrics.closed_in_window, window_days
        )
    };
    output.push_str(&format!("Avg days to close:    {}\n", avg));
    output.push_str(&format!(
        "Success rate:         {}\n",
        format_percentage(metrics.success_rate)
    ));
    output
}

#[derive(Tabled)]
struct OverdueRow {
    #[tabled(rename = "Transaction")]
    id: String,
    #[tabled(rename = "Property")]
    address: String,
    #[tabled(rename = "Milestone")]
    milestone: &'static str,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Planned")]
    planned: String,
    #[tabled(rename = "Days Overdue")]
    days: i64,
}

pub fn format_overdue(rows: &[OverdueMilestone]) -> String {
    if rows.is_empty() {
        return "No overdue milestones.".to_string();
    }

    let mut table = Table::new(rows.iter().map(|r| OverdueRow {
        id: r.transaction_id.to_string(),
        address: r.address.clone(),
        milestone: r.milestone.label(),
        status: r.status.to_string(),
        planned: r.planned_date.to_string(),
        days: r.days_overdue,
    }));
    table.with(Style::psql());
    table.to_string()
}

/// One factor per line, each prefixed with `indent`
pub fn format_risk_factors(risk: &RiskAssessment, indent: &str) -> String {
    risk.factors
        .iter()
        .map(|f| format!("{}{}\n", indent, f))
        .collect()
}

pub fn format_risk(txn: &Transaction, risk: &RiskAssessment) -> String {
    let mut output = format!(
        "{} {}\nRisk score {} ({})\n",
        txn.id, txn.property.address, risk.score, risk.level
    );
    if risk.factors.is_empty() {
        output.push_str("  no risk factors\n");
    } else {
        output.push_str(&format_risk_factors(risk, "  "));
    }
    output
}

pub fn format_change_log(events: &[ChangeEvent]) -> String {
    if events.is_empty() {
        return "No changes recorded.".to_string();
    }
    events
        .iter()
        .map(|e| e.format_line())
        .collect::<Vec<_>>()
        .join("\n")
}
