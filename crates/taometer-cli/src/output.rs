// crates/taometer-cli/src/output.rs
//
// Output formatting for the taometer CLI: one table row per interval, with
// N/A for intervals that produced no data.

use tabled::{Table, Tabled};

use taometer_chain::ApyOutcome;
use taometer_core::{rao_to_tao, Interval};

/// One rendered table row.
#[derive(Debug, Tabled)]
pub struct ApyRow {
    #[tabled(rename = "Period")]
    pub period: String,
    #[tabled(rename = "APY")]
    pub apy: String,
    #[tabled(rename = "Dividends")]
    pub dividends: String,
    #[tabled(rename = "Coverage")]
    pub coverage: String,
}

impl ApyRow {
    pub fn new(interval: Interval, outcome: &ApyOutcome) -> Self {
        Self {
            period: interval.name().to_string(),
            apy: apy_cell(outcome.apy),
            dividends: dividends_cell(outcome.total_dividends),
            coverage: coverage_cell(outcome),
        }
    }
}

/// Floor to two decimals, i.e. 12.345 -> "12.34".
fn format_floor(value: f64) -> String {
    format!("{:.2}", (value * 100.0).floor() / 100.0)
}

/// "N/A" for no data, "<0.01%" below display resolution.
fn apy_cell(apy: Option<f64>) -> String {
    match apy {
        None => "N/A".to_string(),
        Some(v) if v.abs() < 0.01 && v != 0.0 => "<0.01%".to_string(),
        Some(v) => format!("{}%", format_floor(v)),
    }
}

fn dividends_cell(dividends: Option<u64>) -> String {
    match dividends {
        None => "N/A".to_string(),
        Some(rao) => {
            let tao = rao_to_tao(rao);
            if tao > 0.0 && tao < 0.01 {
                "<0.01τ".to_string()
            } else {
                format!("{}τ", format_floor(tao))
            }
        }
    }
}

fn coverage_cell(outcome: &ApyOutcome) -> String {
    match &outcome.summary {
        None => "N/A".to_string(),
        Some(s) => format!("{:.0}%", s.coverage * 100.0),
    }
}

/// Render the per-interval rows as a table.
pub fn render_table(rows: &[ApyRow]) -> String {
    Table::new(rows).to_string()
}

/// Render the effective take line printed under the table.
pub fn render_effective_take(take: f64) -> String {
    format!("Effective take: {}%", format_floor(take * 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apy_cell_formats() {
        assert_eq!(apy_cell(None), "N/A");
        assert_eq!(apy_cell(Some(0.0)), "0.00%");
        assert_eq!(apy_cell(Some(0.005)), "<0.01%");
        assert_eq!(apy_cell(Some(12.345)), "12.34%");
    }

    #[test]
    fn test_dividends_cell_formats() {
        assert_eq!(dividends_cell(None), "N/A");
        assert_eq!(dividends_cell(Some(0)), "0.00τ");
        assert_eq!(dividends_cell(Some(5_000_000)), "<0.01τ");
        assert_eq!(dividends_cell(Some(12_340_000_000)), "12.34τ");
    }

    #[test]
    fn test_effective_take_line() {
        assert_eq!(render_effective_take(0.18), "Effective take: 18.00%");
    }
}
