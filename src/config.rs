//! TOML-based evaluation configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::comfort::ComfortProfile;
use crate::eval::{
    CodecConfig, ColumnMap, Encoding, EvaluationWindows, ExtractorConfig, SetpointBounds, Tariff,
    Window,
};

/// Top-level evaluation configuration parsed from TOML.
///
/// All fields have defaults matching the office building layout. Load from
/// TOML with [`EvaluationConfig::from_toml_file`] or use
/// [`EvaluationConfig::office`] for the built-in default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvaluationConfig {
    /// Variable vector and schedule layout.
    #[serde(default)]
    pub schedule: ScheduleConfig,
    /// Simulator output table layout.
    #[serde(default)]
    pub table: TableConfig,
    /// Evaluation windows per objective category.
    #[serde(default)]
    pub windows: WindowsConfig,
    /// Electricity tariff.
    #[serde(default)]
    pub tariff: Tariff,
    /// Occupant assumptions for computed comfort.
    #[serde(default)]
    pub comfort: ComfortProfile,
}

/// Variable vector and schedule layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScheduleConfig {
    /// Number of optimizer variables; they drive the last slots of the day.
    pub variables: usize,
    /// Number of schedule slots (hourly, 0:00 to 24:00 inclusive).
    pub length: usize,
    /// Setpoint held before the first driven slot (°C).
    pub initial_value: f64,
    /// `"difference"` or `"direct"`.
    pub encoding: Encoding,
    pub bounds: SetpointBounds,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            variables: 19,
            length: 25,
            initial_value: 25.0,
            encoding: Encoding::Difference,
            bounds: SetpointBounds::default(),
        }
    }
}

/// Simulator output table layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TableConfig {
    /// Output rows per hour (must be > 0).
    pub timesteps_per_hour: usize,
    /// Setpoint change per row tolerated in the applied trace (°C).
    pub max_setpoint_step: f64,
    pub columns: ColumnMap,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            timesteps_per_hour: 6,
            max_setpoint_step: 2.0,
            columns: ColumnMap::default(),
        }
    }
}

/// One evaluation window, given either in rows or in hours.
///
/// Rows are inclusive. Hours follow the end-of-interval convention of
/// [`Window::from_hours`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowSpec {
    pub start: Option<usize>,
    pub end: Option<usize>,
    pub start_hour: Option<usize>,
    pub end_hour: Option<usize>,
}

impl WindowSpec {
    pub fn rows(start: usize, end: usize) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..Self::default()
        }
    }

    pub fn hours(start_hour: usize, end_hour: usize) -> Self {
        Self {
            start_hour: Some(start_hour),
            end_hour: Some(end_hour),
            ..Self::default()
        }
    }

    /// Resolves to rows, or `None` unless exactly one complete form is given.
    pub fn resolve(&self, timesteps_per_hour: usize) -> Option<Window> {
        match (self.start, self.end, self.start_hour, self.end_hour) {
            (Some(start), Some(end), None, None) => Some(Window::new(start, end)),
            (None, None, Some(sh), Some(eh)) => Some(Window::from_hours(sh, eh, timesteps_per_hour)),
            _ => None,
        }
    }
}

/// Evaluation windows; an omitted window keeps the office-day default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowsConfig {
    pub comfort: Option<WindowSpec>,
    pub energy: Option<WindowSpec>,
    pub setpoint: Option<WindowSpec>,
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"table.timesteps_per_hour"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl EvaluationConfig {
    /// Office building: 19 variables from 6:00, comfort 7:00-21:00.
    pub fn office() -> Self {
        Self::default()
    }

    /// Whole-day control: every slot is driven and comfort counts around the clock.
    pub fn full_day() -> Self {
        Self {
            schedule: ScheduleConfig {
                variables: 25,
                ..ScheduleConfig::default()
            },
            windows: WindowsConfig {
                comfort: Some(WindowSpec::hours(0, 24)),
                energy: Some(WindowSpec::hours(0, 24)),
                setpoint: Some(WindowSpec::hours(0, 24)),
            },
            ..Self::default()
        }
    }

    /// Office layout with absolute setpoint variables and rate-limit repair.
    pub fn direct_encoding() -> Self {
        Self {
            schedule: ScheduleConfig {
                encoding: Encoding::Direct,
                ..ScheduleConfig::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["office", "full_day", "direct_encoding"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "office" => Ok(Self::office()),
            "full_day" => Ok(Self::full_day()),
            "direct_encoding" => Ok(Self::direct_encoding()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// First schedule slot driven by the optimizer.
    pub fn offset(&self) -> usize {
        self.schedule.length.saturating_sub(self.schedule.variables)
    }

    /// Codec layout derived from the `[schedule]` section.
    pub fn to_codec_config(&self) -> CodecConfig {
        let s = &self.schedule;
        CodecConfig {
            variables: s.variables,
            offset: self.offset(),
            length: s.length,
            initial_value: s.initial_value,
            encoding: s.encoding,
            bounds: s.bounds,
        }
    }

    /// Resolved evaluation windows. Unresolvable specs fall back to the
    /// default; [`EvaluationConfig::validate`] reports them.
    pub fn windows(&self) -> EvaluationWindows {
        let tph = self.table.timesteps_per_hour;
        let defaults = EvaluationWindows::office_day(tph);
        let pick = |spec: Option<WindowSpec>, fallback: Window| {
            spec.and_then(|s| s.resolve(tph)).unwrap_or(fallback)
        };
        EvaluationWindows {
            comfort: pick(self.windows.comfort, defaults.comfort),
            energy: pick(self.windows.energy, defaults.energy),
            setpoint: pick(self.windows.setpoint, defaults.setpoint),
        }
    }

    /// Extractor configuration derived from `[table]`, `[windows]`,
    /// `[tariff]` and `[comfort]`.
    pub fn to_extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            timesteps_per_hour: self.table.timesteps_per_hour,
            columns: self.table.columns.clone(),
            windows: self.windows(),
            tariff: self.tariff,
            max_setpoint_step: self.table.max_setpoint_step,
            comfort: self.comfort,
        }
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let s = &self.schedule;
        if s.variables == 0 {
            errors.push(ConfigError::new("schedule.variables", "must be > 0"));
        }
        if s.variables > s.length {
            errors.push(ConfigError::new(
                "schedule.variables",
                "must be <= schedule.length",
            ));
        }
        let b = &s.bounds;
        if !(b.min < b.max) {
            errors.push(ConfigError::new(
                "schedule.bounds.min",
                "must be < schedule.bounds.max",
            ));
        }
        if !(b.max_step > 0.0) {
            errors.push(ConfigError::new("schedule.bounds.max_step", "must be > 0"));
        }
        if !(b.resolution > 0.0) {
            errors.push(ConfigError::new("schedule.bounds.resolution", "must be > 0"));
        }
        if !(b.min..=b.max).contains(&s.initial_value) {
            errors.push(ConfigError::new(
                "schedule.initial_value",
                format!("must be in [{}, {}]", b.min, b.max),
            ));
        }

        let t = &self.table;
        if t.timesteps_per_hour == 0 {
            errors.push(ConfigError::new("table.timesteps_per_hour", "must be > 0"));
        }
        if !(t.max_setpoint_step >= 0.0) {
            errors.push(ConfigError::new("table.max_setpoint_step", "must be >= 0"));
        }
        let c = &t.columns;
        for (name, columns) in [
            ("pmv", &c.pmv),
            ("electric_energy", &c.electric_energy),
            ("setpoint", &c.setpoint),
        ] {
            if columns.is_empty() {
                errors.push(ConfigError::new(
                    format!("table.columns.{name}"),
                    "must name at least one column",
                ));
            }
        }

        let tph = t.timesteps_per_hour;
        for (name, spec) in [
            ("comfort", self.windows.comfort),
            ("energy", self.windows.energy),
            ("setpoint", self.windows.setpoint),
        ] {
            let Some(spec) = spec else { continue };
            match spec.resolve(tph) {
                None => errors.push(ConfigError::new(
                    format!("windows.{name}"),
                    "give either start/end or start_hour/end_hour",
                )),
                Some(w) if w.is_empty() => errors.push(ConfigError::new(
                    format!("windows.{name}.end"),
                    format!("must be >= start ({} < {})", w.end, w.start),
                )),
                Some(_) => {}
            }
        }

        errors
    }
}
