//! Best-cost-per-generation reports.
//!
//! The main report is a small Matlab/Octave script: one assignment per
//! generation followed by a plot directive, so running it draws the
//! convergence curve. The same history can also be exported as CSV.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::instance::INFEASIBLE;

/// Default file name of the plot script
pub const DEFAULT_REPORT_FILE: &str = "best_costs.m";

/// Name of the script variable holding the history
const SERIES: &str = "generation";

/// One row of the history export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// 1-based generation number
    pub generation: usize,
    pub best_cost: f64,
}

fn script_value(cost: f64) -> String {
    if cost == INFEASIBLE {
        "Inf".to_string()
    } else {
        format!("{:.6}", cost)
    }
}

/// Write the plot script for `history` to `writer`.
pub fn write_report<W: Write>(history: &[f64], mut writer: W) -> Result<()> {
    writeln!(
        writer,
        "% Best tour cost per generation ({})",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    )?;
    for (i, &cost) in history.iter().enumerate() {
        writeln!(writer, "{}({})={};", SERIES, i + 1, script_value(cost))?;
    }
    writeln!(writer, "figure,plot(1:{},{});", history.len(), SERIES)?;
    writer.flush()?;
    Ok(())
}

/// Write the plot script to a file
pub fn save_report<P: AsRef<Path>>(history: &[f64], path: P) -> Result<()> {
    let file = File::create(path)?;
    write_report(history, BufWriter::new(file))
}

/// Export the history as `generation,best_cost` CSV
pub fn export_history_csv<W: Write>(history: &[f64], writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for (i, &best_cost) in history.iter().enumerate() {
        writer.serialize(HistoryRecord {
            generation: i + 1,
            best_cost,
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Export the history as CSV to a file
pub fn save_history_csv<P: AsRef<Path>>(history: &[f64], path: P) -> Result<()> {
    let file = File::create(path)?;
    export_history_csv(history, file)
}
