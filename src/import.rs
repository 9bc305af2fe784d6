// 📥 CSV Import - bulk-load flagged transactions into a session
// Expected header: transactionId,amount,reason

use crate::coordinator::Coordinator;
use crate::record::FlaggedTransaction;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// One CSV row, before it becomes a record
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlaggedRow {
    pub transaction_id: String,
    pub amount: f64,
    #[serde(default)]
    pub reason: Option<String>,
}

impl From<FlaggedRow> for FlaggedTransaction {
    fn from(row: FlaggedRow) -> Self {
        let reason = row.reason.filter(|r| !r.trim().is_empty());
        FlaggedTransaction::new(row.transaction_id, row.amount, reason)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: usize,
    pub rejected: usize,
}

pub fn load_csv(csv_path: &Path) -> Result<Vec<FlaggedRow>> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("Failed to open CSV file: {:?}", csv_path))?;
    read_rows(file)
}

pub fn read_rows<R: Read>(reader: R) -> Result<Vec<FlaggedRow>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut rows = Vec::new();
    for (line, result) in rdr.deserialize().enumerate() {
        let row: FlaggedRow =
            result.with_context(|| format!("Failed to deserialize row {}", line + 1))?;
        rows.push(row);
    }

    Ok(rows)
}

/// Insert rows in file order; rows with blank ids are counted, not fatal.
pub fn import_rows(coordinator: &mut Coordinator, rows: Vec<FlaggedRow>) -> ImportSummary {
    let mut summary = ImportSummary::default();

    for row in rows {
        if coordinator.insert_record(row.into()) {
            summary.inserted += 1;
        } else {
            summary.rejected += 1;
        }
    }

    info!(
        inserted = summary.inserted,
        rejected = summary.rejected,
        size = coordinator.size(),
        "CSV import finished"
    );
    summary
}

// ============================================================================
// TESTS
// ============================================================================
