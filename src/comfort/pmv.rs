//! Fanger's Predicted Mean Vote and Predicted Percentage of Dissatisfied.

use super::{ComfortError, ComfortInputs, ComfortResult, MET_TO_W_PER_M2};

/// Convergence tolerance on clothing surface temperature (°C).
const TCL_TOLERANCE: f64 = 1e-5;
/// Iteration cap for the clothing surface temperature loop.
const MAX_ITERATIONS: usize = 1000;
/// Weight kept on the previous iterate when damping.
const DAMPING: f64 = 0.8;
const PMV_LIMIT: f64 = 5.0;

/// Computes PMV on the -3 (cold) .. +3 (hot) sensation scale.
///
/// # Errors
///
/// * `InvalidInput` if humidity, air velocity, clothing or metabolic rate is negative
/// * `Diverged` if the clothing temperature iterate becomes NaN
/// * `NotConverged` if the iterate has not settled after 1000 steps
/// * `OutOfRange` if |PMV| > 5
///
/// # Examples
///
/// ```
/// use setpoint_eval::comfort::{ComfortInputs, compute_pmv};
///
/// let pmv = compute_pmv(&ComfortInputs::new(22.0, 60.0, 0.1, 22.0, 0.5, 1.2)).unwrap();
/// assert!(pmv < 0.0);
/// ```
pub fn compute_pmv(inputs: &ComfortInputs) -> ComfortResult<f64> {
    inputs.validate()?;

    let ta = inputs.air_temp;
    let tr = inputs.radiant_temp;
    let icl = inputs.clothing;
    let m = inputs.metabolic_rate * MET_TO_W_PER_M2;
    let w = inputs.external_work;
    let pa = vapour_pressure_pa(ta, inputs.relative_humidity);
    let fcl = clothing_area_factor(icl);
    let hc_forced = 12.1 * inputs.air_velocity.sqrt();

    let mut tcl = ta;
    let mut tcl_prev = tcl;
    let mut hc;
    let mut iterations = 0;
    loop {
        tcl_prev = tcl_prev * DAMPING + tcl * (1.0 - DAMPING);
        hc = (2.38 * (tcl - ta).abs().powf(0.25)).max(hc_forced);
        tcl = 35.7
            - 0.028 * (m - w)
            - 0.155 * icl * (radiative_loss(fcl, tcl_prev, tr) + fcl * hc * (tcl_prev - ta));

        if (tcl - tcl_prev).abs() < TCL_TOLERANCE {
            break;
        }
        if tcl.is_nan() {
            return Err(ComfortError::Diverged { model: "PMV" });
        }
        iterations += 1;
        if iterations > MAX_ITERATIONS {
            return Err(ComfortError::NotConverged {
                model: "PMV",
                iterations: MAX_ITERATIONS,
            });
        }
    }

    // heat losses (W/m²)
    let diffusion = 3.05e-3 * (5733.0 - 6.99 * (m - w) - pa);
    let sweat = 0.42 * ((m - w) - 58.15);
    let respiration_latent = 1.73e-5 * m * (5867.0 - pa);
    let respiration_sensible = 0.0014 * m * (34.0 - ta);
    let convection = fcl * hc * (tcl - ta);
    let radiation = radiative_loss(fcl, tcl, tr);

    let load = (m - w)
        - diffusion
        - sweat
        - respiration_latent
        - respiration_sensible
        - radiation
        - convection;
    let pmv = load * (0.303 * (-0.036 * m).exp() + 0.028);

    if pmv.is_nan() {
        return Err(ComfortError::Diverged { model: "PMV" });
    }
    if pmv.abs() > PMV_LIMIT {
        return Err(ComfortError::OutOfRange(pmv));
    }
    Ok(pmv)
}

/// Predicted Percentage of Dissatisfied (%) for a given PMV.
pub fn ppd(pmv: f64) -> f64 {
    let p2 = pmv * pmv;
    100.0 - 95.0 * (-(0.03353 * p2 * p2 + 0.2179 * p2)).exp()
}

/// Water vapour partial pressure (Pa) from air temperature and relative humidity.
fn vapour_pressure_pa(ta: f64, rh: f64) -> f64 {
    let pk = 673.4 - 1.8 * ta;
    let pc = 3.2437814 + 0.00326014 * pk + 2.00658e-9 * pk * pk * pk;
    let pb = (1165.09 - pk) * (1.0 + 0.00121547 * pk);
    rh / 100.0 * 22105.8416 / (2.302585 * pk * pc / pb).exp() * 1000.0
}

/// Ratio of clothed to nude body surface area.
fn clothing_area_factor(icl: f64) -> f64 {
    if icl > 0.5 {
        1.05 + 0.1 * icl
    } else {
        1.0 + 0.2 * icl
    }
}

fn radiative_loss(fcl: f64, tcl: f64, tr: f64) -> f64 {
    3.96e-8 * fcl * ((tcl + 273.15).powi(4) - (tr + 273.15).powi(4))
}
