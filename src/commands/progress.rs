use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::AppError;
use crate::models::config::ProgressConfig;
use crate::models::register::{RawCell, RegisterRow};
use crate::models::report::ProgressReport;
use crate::services::date_normalizer::DateNormalizer;
use crate::services::progress_service::ProgressService;

use super::{CommandError, CommandResult};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressComputeRequest {
    #[serde(default)]
    pub rows: Vec<RegisterRow>,
    #[serde(default)]
    pub config: ProgressConfig,
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DatePreviewEntry {
    pub raw: String,
    pub outcome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

pub fn progress_compute(request: ProgressComputeRequest) -> CommandResult<ProgressReport> {
    let today = request.today.ok_or_else(|| {
        AppError::validation_with_details(
            "today must be provided",
            serde_json::json!({ "field": "today" }),
        )
    })?;

    debug!(
        target: "app::command",
        rows = request.rows.len(),
        %today,
        "progress_compute invoked"
    );

    let service = ProgressService::new(request.config)?;
    service
        .compute(&request.rows, today)
        .map_err(CommandError::from)
}

pub fn progress_compute_json(payload: &str) -> CommandResult<JsonValue> {
    let request: ProgressComputeRequest =
        serde_json::from_str(payload).map_err(AppError::from)?;
    let report = progress_compute(request)?;
    serde_json::to_value(report).map_err(|err| CommandError::from(AppError::from(err)))
}

/// Shows how each raw value would be read, for checking a column before a run.
pub fn dates_preview(values: Vec<RawCell>, extra_sentinels: Vec<String>) -> Vec<DatePreviewEntry> {
    let normalizer = DateNormalizer::new(&extra_sentinels);
    values
        .into_iter()
        .map(|value| {
            let outcome = normalizer.classify(&value);
            DatePreviewEntry {
                raw: value.to_string(),
                outcome: outcome.as_str().to_string(),
                date: outcome.date(),
            }
        })
        .collect()
}
