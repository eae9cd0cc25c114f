//! Mapping between optimizer variables in [0, 1] and setpoint schedules.
//!
//! A schedule covers a fixed number of slots (25 hourly slots, 0:00 to
//! 24:00, by default). The first `offset` slots hold `initial_value`; the
//! optimizer controls the remaining slots, either as absolute setpoints
//! ([`Encoding::Direct`]) or as a starting setpoint followed by
//! per-slot changes ([`Encoding::Difference`]).

use serde::Deserialize;
use tracing::debug;

use crate::error::{EvalError, EvalResult};

/// How a variable vector is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// First variable is a setpoint, the rest are bounded changes.
    #[default]
    Difference,
    /// Every variable is an absolute setpoint, repaired to the rate limit.
    Direct,
}

/// Setpoint limits shared by decoding, repair and encoding.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SetpointBounds {
    /// Lowest allowed setpoint (°C).
    pub min: f64,
    /// Highest allowed setpoint (°C).
    pub max: f64,
    /// Largest allowed change between adjacent slots (°C).
    pub max_step: f64,
    /// Setpoint quantum (°C).
    pub resolution: f64,
}

impl Default for SetpointBounds {
    fn default() -> Self {
        Self {
            min: 18.0,
            max: 30.0,
            max_step: 2.0,
            resolution: 0.1,
        }
    }
}

impl SetpointBounds {
    fn span(&self) -> f64 {
        self.max - self.min
    }

    fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    fn quantize(&self, value: f64) -> f64 {
        let scale = 1.0 / self.resolution;
        (value * scale).round() / scale
    }

    /// Absolute setpoint for a variable in [0, 1].
    fn setpoint(&self, variable: f64) -> f64 {
        self.clamp(self.quantize(variable * self.span() + self.min))
    }

    /// Setpoint reached by moving from `previous` by a variable in [0, 1].
    fn step_from(&self, previous: f64, variable: f64) -> f64 {
        let change = variable * 2.0 * self.max_step - self.max_step;
        self.clamp(self.quantize(previous + change))
    }
}

/// Immutable codec layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CodecConfig {
    /// Number of optimizer variables N.
    pub variables: usize,
    /// First slot driven by the optimizer.
    pub offset: usize,
    /// Total schedule length.
    pub length: usize,
    /// Setpoint held in slots before `offset` (°C).
    pub initial_value: f64,
    pub encoding: Encoding,
    pub bounds: SetpointBounds,
}

impl Default for CodecConfig {
    /// 19 hourly variables from 6:00 to 24:00 on a 25-slot day.
    fn default() -> Self {
        Self {
            variables: 19,
            offset: 6,
            length: 25,
            initial_value: 25.0,
            encoding: Encoding::Difference,
            bounds: SetpointBounds::default(),
        }
    }
}

/// Bidirectional variable/schedule mapping for one layout.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleCodec {
    config: CodecConfig,
}

impl ScheduleCodec {
    /// Creates a codec, checking that the variables fit in the schedule.
    ///
    /// # Errors
    ///
    /// Returns `EvalError::ScheduleLayout` if `offset + variables > length`
    /// or there are no variables.
    pub fn new(config: CodecConfig) -> EvalResult<Self> {
        if config.variables == 0 || config.offset + config.variables > config.length {
            return Err(EvalError::ScheduleLayout {
                offset: config.offset,
                variables: config.variables,
                length: config.length,
            });
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Decodes with the configured encoding.
    ///
    /// Variables outside [0, 1] are clamped into it.
    ///
    /// # Errors
    ///
    /// * `VariableLength` if the vector length is not N
    /// * `NonFiniteVariable` if any variable is NaN or infinite
    pub fn decode(&self, variables: &[f64]) -> EvalResult<Vec<f64>> {
        match self.config.encoding {
            Encoding::Difference => self.decode_difference(variables),
            Encoding::Direct => self.decode_direct(variables),
        }
    }

    /// Encodes with the configured encoding.
    ///
    /// # Errors
    ///
    /// Returns `EvalError::ScheduleLength` if the schedule length differs from the layout.
    pub fn encode(&self, schedule: &[f64]) -> EvalResult<Vec<f64>> {
        match self.config.encoding {
            Encoding::Difference => self.encode_difference(schedule),
            Encoding::Direct => self.encode_direct(schedule),
        }
    }

    /// Decodes a starting setpoint followed by bounded per-slot changes.
    ///
    /// Adjacent slots differ by at most `max_step` from `offset` onward.
    /// The step from the `initial_value` prefix into slot `offset` is set
    /// by the first variable alone and is not limited.
    ///
    /// # Errors
    ///
    /// * `VariableLength` if the vector length is not N
    /// * `NonFiniteVariable` if any variable is NaN or infinite
    ///
    /// # Examples
    ///
    /// ```
    /// use setpoint_eval::eval::codec::{CodecConfig, ScheduleCodec};
    ///
    /// let codec = ScheduleCodec::new(CodecConfig::default()).unwrap();
    /// let schedule = codec.decode_difference(&[0.5; 19]).unwrap();
    /// assert_eq!(schedule[5], 25.0);
    /// assert!((schedule[6] - 24.0).abs() < 1e-9);
    /// ```
    pub fn decode_difference(&self, variables: &[f64]) -> EvalResult<Vec<f64>> {
        let variables = self.check_variables(variables)?;
        let bounds = &self.config.bounds;

        let mut schedule = Vec::with_capacity(self.config.length);
        schedule.resize(self.config.offset, self.config.initial_value);
        let mut current = bounds.setpoint(variables[0]);
        schedule.push(current);
        for &v in &variables[1..] {
            current = bounds.step_from(current, v);
            schedule.push(current);
        }
        schedule.resize(self.config.length, current);
        Ok(schedule)
    }

    /// Decodes absolute setpoints and repairs the rate limit.
    ///
    /// # Errors
    ///
    /// * `VariableLength` if the vector length is not N
    /// * `NonFiniteVariable` if any variable is NaN or infinite
    pub fn decode_direct(&self, variables: &[f64]) -> EvalResult<Vec<f64>> {
        let variables = self.check_variables(variables)?;
        let bounds = &self.config.bounds;

        let mut schedule = Vec::with_capacity(self.config.length);
        schedule.resize(self.config.offset, self.config.initial_value);
        schedule.extend(variables.iter().map(|&v| bounds.setpoint(v)));
        let last = schedule[schedule.len() - 1];
        schedule.resize(self.config.length, last);
        Ok(repair_rate_limit(&schedule, bounds.max_step))
    }

    /// Recovers difference-encoded variables from a schedule.
    ///
    /// # Errors
    ///
    /// Returns `EvalError::ScheduleLength` if the schedule length differs from the layout.
    pub fn encode_difference(&self, schedule: &[f64]) -> EvalResult<Vec<f64>> {
        let controlled = self.controlled_slots(schedule)?;
        let bounds = &self.config.bounds;

        let first = ((controlled[0] - bounds.min) / bounds.span()).clamp(0.0, 1.0);
        let changes = controlled.windows(2).map(|pair| {
            ((pair[1] - pair[0] + bounds.max_step) / (2.0 * bounds.max_step)).clamp(0.0, 1.0)
        });
        Ok(std::iter::once(first).chain(changes).collect())
    }

    /// Recovers directly-encoded variables from a schedule.
    ///
    /// # Errors
    ///
    /// Returns `EvalError::ScheduleLength` if the schedule length differs from the layout.
    pub fn encode_direct(&self, schedule: &[f64]) -> EvalResult<Vec<f64>> {
        let controlled = self.controlled_slots(schedule)?;
        let bounds = &self.config.bounds;
        Ok(controlled
            .iter()
            .map(|&t| ((t - bounds.min) / bounds.span()).clamp(0.0, 1.0))
            .collect())
    }

    /// Checks the vector length and finiteness, returning it clamped to [0, 1].
    fn check_variables(&self, variables: &[f64]) -> EvalResult<Vec<f64>> {
        if variables.len() != self.config.variables {
            return Err(EvalError::VariableLength {
                expected: self.config.variables,
                actual: variables.len(),
            });
        }
        if let Some((index, &value)) = variables
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite())
        {
            return Err(EvalError::NonFiniteVariable { index, value });
        }
        Ok(variables.iter().map(|v| v.clamp(0.0, 1.0)).collect())
    }

    fn controlled_slots<'a>(&self, schedule: &'a [f64]) -> EvalResult<&'a [f64]> {
        if schedule.len() != self.config.length {
            return Err(EvalError::ScheduleLength {
                expected: self.config.length,
                actual: schedule.len(),
            });
        }
        Ok(&schedule[self.config.offset..self.config.offset + self.config.variables])
    }
}

/// Clips every adjacent change to `[-max_step, max_step]`, moving the later slot.
pub fn repair_rate_limit(schedule: &[f64], max_step: f64) -> Vec<f64> {
    let mut repaired: Vec<f64> = Vec::with_capacity(schedule.len());
    for (slot, &value) in schedule.iter().enumerate() {
        let next = match repaired.last() {
            Some(&previous) => {
                let limited = previous + (value - previous).clamp(-max_step, max_step);
                if limited != value {
                    debug!(slot, requested = value, applied = limited, "setpoint change clipped");
                }
                limited
            }
            None => value,
        };
        repaired.push(next);
    }
    repaired
}

/// Expands an hourly schedule into one setpoint per simulator timestep.
///
/// Timestep rows are stamped at the end of their interval, so row `r`
/// applies slot `(r + 1) / timesteps_per_hour`: the first slot covers
/// `timesteps_per_hour - 1` rows, each middle slot a full hour and the
/// final slot the single midnight row.
pub fn expand_to_timesteps(schedule: &[f64], timesteps_per_hour: usize) -> Vec<f64> {
    let rows = schedule.len().saturating_sub(1) * timesteps_per_hour;
    (0..rows)
        .map(|r| schedule[(r + 1) / timesteps_per_hour])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn codec(encoding: Encoding) -> ScheduleCodec {
        ScheduleCodec::new(CodecConfig {
            encoding,
            ..CodecConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn difference_mid_variables_hold_value() {
        let schedule = codec(Encoding::Difference).decode_difference(&[0.5; 19]).unwrap();
        assert_eq!(schedule.len(), 25);
        for slot in &schedule[..6] {
            assert_eq!(*slot, 25.0);
        }
        for slot in &schedule[6..] {
            assert_relative_eq!(*slot, 24.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn difference_steps_are_bounded_and_clamped() {
        let mut vars = vec![1.0; 19];
        vars[0] = 0.95; // 29.4 °C
        let schedule = codec(Encoding::Difference).decode_difference(&vars).unwrap();
        assert_relative_eq!(schedule[6], 29.4, epsilon = 1e-9);
        assert_relative_eq!(schedule[7], 30.0, epsilon = 1e-9);
        assert_relative_eq!(schedule[24], 30.0, epsilon = 1e-9);

        let schedule = codec(Encoding::Difference).decode_difference(&[0.0; 19]).unwrap();
        assert_relative_eq!(schedule[6], 18.0, epsilon = 1e-9);
        assert!(schedule[6..].iter().all(|&t| (t - 18.0).abs() < 1e-9));
    }

    #[test]
    fn wrong_variable_count_fails_fast() {
        let err = codec(Encoding::Difference).decode(&[0.5; 18]).unwrap_err();
        assert!(matches!(
            err,
            EvalError::VariableLength {
                expected: 19,
                actual: 18
            }
        ));
    }

    #[test]
    fn out_of_range_variables_are_clamped() {
        let c = codec(Encoding::Difference);
        let mut vars = vec![0.5; 19];
        vars[3] = 1.5;
        let schedule = c.decode_difference(&vars).unwrap();
        for pair in schedule[6..].windows(2) {
            assert!((pair[1] - pair[0]).abs() <= 2.0 + 1e-9, "{pair:?}");
        }
        vars[3] = 1.0;
        assert_eq!(schedule, c.decode_difference(&vars).unwrap());

        vars[3] = -0.5;
        let low = codec(Encoding::Direct).decode_direct(&vars).unwrap();
        vars[3] = 0.0;
        assert_eq!(low, codec(Encoding::Direct).decode_direct(&vars).unwrap());
    }

    #[test]
    fn non_finite_variables_fail_fast() {
        let mut vars = vec![0.5; 19];
        vars[10] = f64::NAN;
        for encoding in [Encoding::Difference, Encoding::Direct] {
            let err = codec(encoding).decode(&vars).unwrap_err();
            assert!(matches!(err, EvalError::NonFiniteVariable { index: 10, .. }));
        }
        vars[10] = f64::INFINITY;
        assert!(matches!(
            codec(Encoding::Difference).decode(&vars),
            Err(EvalError::NonFiniteVariable { index: 10, .. })
        ));
    }

    #[test]
    fn difference_prefix_jump_is_not_limited() {
        let schedule = codec(Encoding::Difference).decode_difference(&[0.0; 19]).unwrap();
        assert_eq!(schedule[5], 25.0);
        assert_relative_eq!(schedule[6], 18.0, epsilon = 1e-9);
        for pair in schedule[6..].windows(2) {
            assert!((pair[1] - pair[0]).abs() <= 2.0 + 1e-9);
        }
    }

    #[test]
    fn layout_must_fit() {
        let err = ScheduleCodec::new(CodecConfig {
            offset: 10,
            ..CodecConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, EvalError::ScheduleLayout { .. }));
    }

    #[test]
    fn direct_decode_repairs_jumps() {
        let mut vars = vec![0.0; 19];
        vars[5] = 1.0;
        let schedule = codec(Encoding::Direct).decode_direct(&vars).unwrap();
        // 25.0 prefix into 18.0 is clipped too
        assert_relative_eq!(schedule[6], 23.0, epsilon = 1e-9);
        assert_relative_eq!(schedule[11], 20.0, epsilon = 1e-9);
        for pair in schedule.windows(2) {
            assert!((pair[1] - pair[0]).abs() <= 2.0 + 1e-9);
        }
    }

    #[test]
    fn repair_moves_the_later_value() {
        let repaired = repair_rate_limit(&[20.0, 25.0, 25.0, 19.0], 2.0);
        assert_eq!(repaired, vec![20.0, 22.0, 24.0, 22.0]);
    }

    #[test]
    fn encode_difference_inverts_decode() {
        let c = codec(Encoding::Difference);
        let vars: Vec<f64> = (0..19).map(|i| 0.4 + 0.01 * i as f64).collect();
        let back = c.encode_difference(&c.decode_difference(&vars).unwrap()).unwrap();
        for (a, b) in vars.iter().zip(&back) {
            // 0.1 °C quantum over a 4 °C change span
            assert!((a - b).abs() <= 0.05 / 4.0 + 1e-9, "{a} vs {b}");
        }
    }

    #[test]
    fn encode_direct_uses_setpoint_span() {
        let c = codec(Encoding::Direct);
        let schedule = vec![24.0; 25];
        let vars = c.encode_direct(&schedule).unwrap();
        assert_eq!(vars.len(), 19);
        assert!(vars.iter().all(|&v| (v - 0.5).abs() < 1e-12));
    }

    #[test]
    fn encode_rejects_wrong_length() {
        assert!(matches!(
            codec(Encoding::Direct).encode(&[24.0; 24]),
            Err(EvalError::ScheduleLength {
                expected: 25,
                actual: 24
            })
        ));
    }

    #[test]
    fn expansion_matches_simulator_layout() {
        let schedule: Vec<f64> = (0..25).map(|h| h as f64).collect();
        let trace = expand_to_timesteps(&schedule, 6);
        assert_eq!(trace.len(), 144);
        assert_eq!(trace.iter().filter(|&&t| t == 0.0).count(), 5);
        assert_eq!(trace.iter().filter(|&&t| t == 1.0).count(), 6);
        assert_eq!(trace[143], 24.0);
        assert_eq!(trace[142], 23.0);
    }
}
