use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::auth::TokenProvider;
use crate::catalog;
use crate::error::SourceError;
use crate::logger;
use crate::models::{Cell, Grid};
use crate::range;
use crate::source::{AnswerRecorder, Outcome, OutcomeEcho, TabularSource};

pub const API_BASE: &str = "https://sheets.googleapis.com";

/// Spreadsheet values API over plain HTTP: GET a range, PUT the outcome
/// block of a row. The token provider decides which account the calls run
/// as; a 401/403 maps to `AuthRequired` and the shell handles the bounce.
pub struct SheetsSource {
    client: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    tokens: Arc<dyn TokenProvider>,
}

impl SheetsSource {
    pub fn new(spreadsheet_id: String, tokens: Arc<dyn TokenProvider>) -> Self {
        Self::with_base_url(API_BASE.to_string(), spreadsheet_id, tokens)
    }

    pub fn with_base_url(
        base_url: String,
        spreadsheet_id: String,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            spreadsheet_id,
            tokens,
        }
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.base_url, self.spreadsheet_id, range
        )
    }
}

/// Wire shape of the values API, both directions.
#[derive(Debug, Serialize, Deserialize)]
struct ValueRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    range: Option<String>,
    #[serde(rename = "majorDimension", skip_serializing_if = "Option::is_none")]
    major_dimension: Option<String>,
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct UpdateResponse {
    #[serde(rename = "updatedData")]
    updated_data: Option<ValueRange>,
}

fn cell_from_json(value: &serde_json::Value) -> Cell {
    match value {
        serde_json::Value::String(s) => Cell::Text(s.clone()),
        serde_json::Value::Number(n) => Cell::Number(n.as_f64().unwrap_or(0.0)),
        serde_json::Value::Bool(b) => Cell::Bool(*b),
        serde_json::Value::Null => Cell::Empty,
        other => Cell::Text(other.to_string()),
    }
}

fn grid_from_values(values: &[Vec<serde_json::Value>]) -> Grid {
    values
        .iter()
        .map(|row| row.iter().map(cell_from_json).collect())
        .collect()
}

fn check_status(status: reqwest::StatusCode, body: &str) -> Result<(), SourceError> {
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(SourceError::AuthRequired);
    }
    if !status.is_success() {
        return Err(SourceError::Remote(format!("{}: {}", status, body)));
    }
    Ok(())
}

#[async_trait]
impl TabularSource for SheetsSource {
    async fn fetch(&self, range: &str) -> Result<Grid, SourceError> {
        let token = self.tokens.token()?;
        logger::log(&format!("sheets: fetching {}", range));

        let response = self
            .client
            .get(self.values_url(range))
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        check_status(status, &body)?;

        let value_range: ValueRange =
            serde_json::from_str(&body).map_err(|e| SourceError::Decode(e.to_string()))?;
        Ok(grid_from_values(&value_range.values))
    }
}

#[async_trait]
impl AnswerRecorder for SheetsSource {
    async fn record(&self, outcome: &Outcome) -> Result<OutcomeEcho, SourceError> {
        let token = self.tokens.token()?;
        let target = range::outcome_range(&outcome.sheet, outcome.row);
        logger::log(&format!(
            "sheets: recording row {} of {} (chosen {}, correct {})",
            outcome.row, outcome.sheet, outcome.chosen_index, outcome.was_correct
        ));

        let body = ValueRange {
            range: Some(target.clone()),
            major_dimension: None,
            values: vec![outcome.cells()],
        };

        let response = self
            .client
            .put(self.values_url(&target))
            .query(&[
                ("valueInputOption", "RAW"),
                ("includeValuesInResponse", "true"),
            ])
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        check_status(status, &text)?;

        let update: UpdateResponse =
            serde_json::from_str(&text).map_err(|e| SourceError::Decode(e.to_string()))?;
        Ok(echo_from_update(outcome, &update))
    }
}

/// Prefer the values the API echoed back; a response without them still
/// confirms the write, so the sent values stand in.
fn echo_from_update(outcome: &Outcome, update: &UpdateResponse) -> OutcomeEcho {
    let echoed = update
        .updated_data
        .as_ref()
        .and_then(|data| data.values.first())
        .filter(|row| row.len() >= 3)
        .map(|row| {
            let cells: Vec<Cell> = row.iter().map(cell_from_json).collect();
            catalog::decode_attempt(&cells[0], &cells[1], &cells[2])
        });

    let attempt = echoed.unwrap_or_else(|| crate::models::AttemptRecord {
        chosen_index: outcome.chosen_index as i32,
        was_correct: outcome.was_correct,
        elapsed_millis: outcome.elapsed_millis,
    });

    OutcomeEcho {
        row: outcome.row,
        attempt,
    }
}
