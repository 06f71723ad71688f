use std::collections::HashSet;
use std::path::Path;

use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::config::{ProgressConfig, TimelineStep};
use crate::models::schedule::MilestoneSchedule;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> AppResult<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        match extension.as_deref() {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("json") => Ok(ConfigFormat::Json),
            _ => Err(AppError::config(format!(
                "unsupported configuration file: {}",
                path.display()
            ))),
        }
    }
}

/// Reads and validates a configuration file, logging any warnings.
pub fn load_from_path(path: impl AsRef<Path>) -> AppResult<ProgressConfig> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path)?;
    let raw = std::fs::read_to_string(path)?;
    let config = parse_str(&raw, format)?;
    info!(
        target: "app::config",
        path = %path.display(),
        milestones = config.schedule.len(),
        "configuration loaded"
    );
    Ok(config)
}

pub fn parse_str(raw: &str, format: ConfigFormat) -> AppResult<ProgressConfig> {
    let config: ProgressConfig = if raw.trim().is_empty() {
        ProgressConfig::default()
    } else {
        match format {
            ConfigFormat::Yaml => serde_yaml::from_str(raw)?,
            ConfigFormat::Json => serde_json::from_str(raw)?,
        }
    };

    for warning in validate(&config)? {
        warn!(target: "app::config", %warning, "configuration warning");
    }
    Ok(config)
}

/// Rejects unusable configurations; returns non-fatal warnings.
pub fn validate(config: &ProgressConfig) -> AppResult<Vec<String>> {
    let mut warnings = ensure_valid_schedule(&config.schedule)?;

    ensure_non_negative("fallbackWeight", config.fallback_weight)?;
    ensure_non_negative("recoveryFactor", config.recovery_factor)?;

    if let TimelineStep::Days { days: 0 } = config.timeline_step {
        return Err(AppError::config("timeline step must be at least one day"));
    }
    if config.max_projection_steps == 0 {
        return Err(AppError::config("maxProjectionSteps must be at least 1"));
    }
    if config.delay_threshold_days < 0 {
        warnings.push(format!(
            "delayThresholdDays is negative ({}); on-time items will be listed",
            config.delay_threshold_days
        ));
    }

    Ok(warnings)
}

fn ensure_valid_schedule(schedule: &MilestoneSchedule) -> AppResult<Vec<String>> {
    if schedule.is_empty() {
        return Err(AppError::config("schedule must define at least one milestone"));
    }

    let mut seen = HashSet::new();
    for milestone in &schedule.milestones {
        let name = milestone.name.trim();
        if name.is_empty() {
            return Err(AppError::config("milestone names must not be empty"));
        }
        if !seen.insert(name.to_ascii_lowercase()) {
            return Err(AppError::config(format!("duplicate milestone name '{name}'")));
        }
        ensure_non_negative(&format!("weight of '{name}'"), milestone.weight)?;
    }

    let mut warnings = Vec::new();
    let total = schedule.total_weight();
    if total > 1.0 + WEIGHT_SUM_TOLERANCE {
        warnings.push(format!("milestone weights sum to {total:.3}, above 1.0"));
    }
    Ok(warnings)
}

fn ensure_non_negative(field: &str, value: f64) -> AppResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::config(format!(
            "{field} must be a finite non-negative number"
        )));
    }
    Ok(())
}
