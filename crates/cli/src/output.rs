//! Output formatting utilities

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use predict_lib::{Neighbor, PredictionResponse, ResponseFormatter};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

#[derive(Tabled)]
struct NeighborRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Row")]
    index: usize,
    #[tabled(rename = "Point")]
    point: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Distance")]
    distance: String,
}

impl NeighborRow {
    fn new(rank: usize, neighbor: &Neighbor) -> Self {
        let coords: Vec<String> = neighbor.point.iter().map(|c| c.to_string()).collect();
        Self {
            rank,
            // rows are numbered from 1 for people
            index: neighbor.index + 1,
            point: format!("({})", coords.join(", ")),
            label: neighbor.label.to_string(),
            distance: format!("{:.4}", neighbor.distance),
        }
    }
}

#[derive(Tabled)]
struct CoefficientRow {
    #[tabled(rename = "Term")]
    term: String,
    #[tabled(rename = "Coefficient")]
    coefficient: String,
}

fn term(power: usize) -> String {
    match power {
        0 => "1".to_string(),
        1 => "x".to_string(),
        p => format!("x^{}", p),
    }
}

/// Print any serializable value as pretty JSON, non-ASCII kept verbatim
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", ResponseFormatter::pretty().to_json(value)?);
    Ok(())
}

/// Print a prediction in the requested format
pub fn print_prediction(response: &PredictionResponse, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(response)?,
        OutputFormat::Table => {
            println!(
                "{} {}",
                "Prediction:".bold(),
                response.prediction.to_string().green().bold()
            );

            if let Some(neighbors) = &response.neighbors {
                println!();
                println!("{}", "Nearest neighbors".bold());
                let rows: Vec<NeighborRow> = neighbors
                    .iter()
                    .enumerate()
                    .map(|(i, n)| NeighborRow::new(i + 1, n))
                    .collect();
                println!("{}", Table::new(rows).with(Style::rounded()));
            }

            if let Some(coefficients) = &response.coefficients {
                println!();
                println!("{}", "Fitted polynomial".bold());
                let rows: Vec<CoefficientRow> = coefficients
                    .iter()
                    .enumerate()
                    .map(|(power, c)| CoefficientRow {
                        term: term(power),
                        coefficient: format!("{:.6}", c),
                    })
                    .collect();
                println!("{}", Table::new(rows).with(Style::rounded()));
            }

            if let Some(r_squared) = response.r_squared {
                println!("R²: {:.4}", r_squared);
            }
        }
    }
    Ok(())
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Color status based on value
pub fn color_status(status: &str) -> String {
    match status.to_lowercase().as_str() {
        "healthy" | "ready" => status.green().to_string(),
        "degraded" => status.yellow().to_string(),
        "unhealthy" | "not ready" => status.red().to_string(),
        _ => status.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use predict_lib::Label;

    #[test]
    fn test_term_names() {
        assert_eq!(term(0), "1");
        assert_eq!(term(1), "x");
        assert_eq!(term(3), "x^3");
    }

    #[test]
    fn test_neighbor_row_is_one_based() {
        let neighbor = Neighbor {
            index: 0,
            point: vec![0.0, 1.5],
            label: Label::Category("貓".to_string()),
            distance: 0.5,
        };
        let row = NeighborRow::new(1, &neighbor);

        assert_eq!(row.index, 1);
        assert_eq!(row.point, "(0, 1.5)");
        assert_eq!(row.label, "貓");
        assert_eq!(row.distance, "0.5000");
    }
}
