use std::sync::Arc;

use async_trait::async_trait;

use crate::auth::TokenProvider;
use crate::config::SourceConfig;
use crate::error::SourceError;
use crate::models::{AttemptRecord, Grid};

pub mod csv;
pub mod sheets;

pub use csv::CsvSource;
pub use sheets::SheetsSource;

/// Read side of the remote grid: fetch a 2-D block of cells for a worksheet
/// range like `Sheet3!A:L`.
#[async_trait]
pub trait TabularSource: Send + Sync {
    async fn fetch(&self, range: &str) -> Result<Grid, SourceError>;
}

/// One exercise outcome headed for the sheet's trailing columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub sheet: String,
    /// 1-based sheet row.
    pub row: usize,
    /// 0-based candidate position; written 1-based, the way the sheet
    /// stores it.
    pub chosen_index: usize,
    pub was_correct: bool,
    pub elapsed_millis: u64,
}

impl Outcome {
    /// The three cell values written to the outcome block, in column order.
    pub fn cells(&self) -> Vec<serde_json::Value> {
        vec![
            serde_json::Value::from(self.chosen_index as u64 + 1),
            serde_json::Value::from(if self.was_correct { "TRUE" } else { "FALSE" }),
            serde_json::Value::from(self.elapsed_millis),
        ]
    }
}

/// What the write reported back: the attempt as the sheet now holds it.
/// The caller patches its in-memory catalog row from this instead of
/// re-fetching the whole grid.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeEcho {
    pub row: usize,
    pub attempt: AttemptRecord,
}

/// Write side: persist one outcome. Last write wins; there is no
/// versioning, a single interactive user per spreadsheet is assumed.
#[async_trait]
pub trait AnswerRecorder: Send + Sync {
    async fn record(&self, outcome: &Outcome) -> Result<OutcomeEcho, SourceError>;
}

/// A source variant is one object serving both halves.
pub trait Backend: TabularSource + AnswerRecorder {}
impl<T: TabularSource + AnswerRecorder> Backend for T {}

/// Pick the source variant at startup. Forked per-variant code paths live
/// here and nowhere else.
pub fn build(config: &SourceConfig, tokens: Arc<dyn TokenProvider>) -> Arc<dyn Backend> {
    match config {
        SourceConfig::Sheets { spreadsheet_id } => {
            Arc::new(SheetsSource::new(spreadsheet_id.clone(), tokens))
        }
        SourceConfig::Csv { url } => Arc::new(CsvSource::new(url.clone())),
    }
}
