//! Candidate evaluation pipeline.
//!
//! An optimizer hands over a variable vector, [`Evaluation::decode`] turns
//! it into the schedule injected into the building simulator, and once the
//! simulator has run [`Evaluation::evaluate`] reduces its output table to
//! objectives. The simulator run itself happens outside this crate.

use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{debug, info, warn};

use crate::comfort::ComfortIndex;
use crate::config::EvaluationConfig;
use crate::error::{EvalError, EvalResult};
use crate::eval::{
    ExtractorConfig, ObjectiveExtractor, ObjectiveReport, OutputTable, ScheduleCodec,
    expand_to_timesteps,
};

/// A decoded candidate ready for the simulator.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Optimizer variables in [0, 1].
    pub variables: Vec<f64>,
    /// Hourly setpoint schedule (°C).
    pub schedule: Vec<f64>,
    /// Setpoint applied at each simulator timestep (°C).
    pub trace: Vec<f64>,
}

/// Codec and extractor built from one configuration.
///
/// Immutable after construction; evaluations share nothing and may run
/// concurrently from an outer scheduler.
#[derive(Debug, Clone)]
pub struct Evaluation {
    codec: ScheduleCodec,
    extractor: ExtractorConfig,
}

impl Evaluation {
    /// Builds the pipeline from a configuration.
    ///
    /// # Errors
    ///
    /// Returns the first validation error as `EvalError::Config`, or a
    /// layout error from the codec.
    pub fn from_config(config: &EvaluationConfig) -> EvalResult<Self> {
        if let Some(first) = config.validate().into_iter().next() {
            return Err(EvalError::Config(first));
        }
        Ok(Self {
            codec: ScheduleCodec::new(config.to_codec_config())?,
            extractor: config.to_extractor_config(),
        })
    }

    pub fn codec(&self) -> &ScheduleCodec {
        &self.codec
    }

    pub fn extractor_config(&self) -> &ExtractorConfig {
        &self.extractor
    }

    /// Decodes a variable vector into a schedule and its timestep trace.
    ///
    /// # Errors
    ///
    /// Returns `EvalError::VariableLength` if the vector has the wrong length,
    /// or `EvalError::NonFiniteVariable` if it holds NaN or infinity.
    pub fn decode(&self, variables: &[f64]) -> EvalResult<Candidate> {
        let schedule = self.codec.decode(variables)?;
        let trace = expand_to_timesteps(&schedule, self.extractor.timesteps_per_hour);
        debug!(
            slots = schedule.len(),
            rows = trace.len(),
            "candidate decoded"
        );
        Ok(Candidate {
            variables: variables.to_vec(),
            schedule,
            trace,
        })
    }

    /// Recovers the variables behind a known schedule and decodes them again.
    ///
    /// The returned schedule is the quantized, repaired version the
    /// simulator would actually receive.
    ///
    /// # Errors
    ///
    /// Returns `EvalError::ScheduleLength` if the schedule has the wrong length.
    pub fn encode(&self, schedule: &[f64]) -> EvalResult<Candidate> {
        let variables = self.codec.encode(schedule)?;
        self.decode(&variables)
    }

    /// Draws a uniformly random candidate from a seeded generator.
    ///
    /// # Errors
    ///
    /// Propagates decoding errors.
    pub fn random(&self, seed: u64) -> EvalResult<Candidate> {
        let mut rng = StdRng::seed_from_u64(seed);
        let variables: Vec<f64> = (0..self.codec.config().variables)
            .map(|_| rng.random::<f64>())
            .collect();
        self.decode(&variables)
    }

    /// Extracts every objective from one simulator output table.
    ///
    /// # Errors
    ///
    /// Returns an `EvalError` if the table does not cover the configured
    /// windows or columns.
    pub fn evaluate(&self, table: &OutputTable) -> EvalResult<ObjectiveReport> {
        let report = ObjectiveExtractor::new(table, &self.extractor).report()?;
        if report.has_non_finite() {
            warn!(?report, "objectives contain non-finite values");
        }
        info!(
            energy_kwh = report.total_energy_kwh,
            peak_kw = report.peak_power_kw,
            pmv = report.average_pmv,
            pmv_violations = report.pmv_violation_count,
            setpoint_violation = report.setpoint_violation,
            "candidate evaluated"
        );
        Ok(report)
    }

    /// Mean comfort index computed from raw zone climate, per zone.
    ///
    /// Samples for which the comfort model fails are skipped.
    ///
    /// # Errors
    ///
    /// Returns an `EvalError` if the zone columns or comfort window are out of range.
    pub fn zone_comfort(&self, table: &OutputTable, index: ComfortIndex) -> EvalResult<Vec<f64>> {
        let series = ObjectiveExtractor::new(table, &self.extractor).computed_zone_comfort(index)?;
        Ok(series
            .iter()
            .map(|zone| {
                let valid: Vec<f64> = zone.iter().copied().filter(|v| v.is_finite()).collect();
                valid.iter().sum::<f64>() / valid.len() as f64
            })
            .collect())
    }
}
