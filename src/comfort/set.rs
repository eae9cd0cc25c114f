//! Standard Effective Temperature (SET*) from the two-node physiological model.
//!
//! The body is simulated for one hour in one-minute steps until skin and
//! core temperatures settle, then the temperature of the ASHRAE standard
//! environment that produces the same skin heat loss is found with a
//! secant iteration.

use super::{ComfortError, ComfortInputs, ComfortResult, MET_TO_W_PER_M2};

const BODY_WEIGHT_KG: f64 = 69.9;
const BODY_SURFACE_M2: f64 = 1.8258;
const STEFAN_BOLTZMANN: f64 = 5.6697e-8;
/// Proportionality constants for sweating, vasodilation and vasoconstriction.
const C_SWEAT: f64 = 170.0;
const C_DILATION: f64 = 120.0;
const C_CONSTRICTION: f64 = 0.5;
const K_CLO: f64 = 0.25;

const TEMP_SKIN_NEUTRAL: f64 = 33.7;
const TEMP_CORE_NEUTRAL: f64 = 36.49;
const TEMP_BODY_NEUTRAL: f64 = 36.49;
const SKIN_BLOOD_FLOW_NEUTRAL: f64 = 6.3;

/// Physiological simulation length in minutes.
const EXPOSURE_MINUTES: usize = 60;
const CLOTHING_TOLERANCE: f64 = 0.01;
const MAX_CLOTHING_ITERATIONS: usize = 200;
const NEWTON_DELTA: f64 = 1e-4;
const NEWTON_TOLERANCE: f64 = 0.01;
const MAX_NEWTON_ITERATIONS: usize = 100;

/// Computes SET* (°C).
///
/// # Errors
///
/// * `InvalidInput` if humidity, air velocity, clothing or metabolic rate is negative
/// * `NotConverged` if the clothing-temperature loop or the SET* root
///   search exceeds its iteration cap
/// * `Diverged` if an intermediate value becomes non-finite
pub fn compute_set(inputs: &ComfortInputs) -> ComfortResult<f64> {
    inputs.validate()?;

    let ta = inputs.air_temp;
    let tr = inputs.radiant_temp;
    let clo = inputs.clothing;
    let met = inputs.metabolic_rate;
    let wme = inputs.external_work;

    let vapour_pressure = inputs.relative_humidity * saturated_vapour_pressure_torr(ta) / 100.0;
    let air_velocity = inputs.air_velocity.max(0.1);
    let pressure_atm = inputs.pressure_kpa * 0.009869;
    let rcl = 0.155 * clo;
    let facl = 1.0 + 0.15 * clo;
    // Lewis relation is 2.2 at sea level
    let lr = 2.2 / pressure_atm;
    let rm = met * MET_TO_W_PER_M2;

    let (wcrit, icl) = if clo <= 0.0 {
        (0.38 * air_velocity.powf(-0.29), 1.0)
    } else {
        (0.59 * air_velocity.powf(-0.08), 0.45)
    };

    let chc = (3.0 * pressure_atm.powf(0.53)).max(8.600001 * (air_velocity * pressure_atm).powf(0.53));

    let mut temp_skin = TEMP_SKIN_NEUTRAL;
    let mut temp_core = TEMP_CORE_NEUTRAL;
    let mut skin_blood_flow = SKIN_BLOOD_FLOW_NEUTRAL;
    let mut alfa = 0.1;
    let mut esk = 0.1 * met;
    let mut m = rm;

    let mut chr = 4.7;
    let mut ctc = chr + chc;
    let mut ra = 1.0 / (facl * ctc);
    let mut top = (chr * tr + chc * ta) / ctc;
    let mut tcl = top + (temp_skin - top) / (ctc * (ra + rcl));
    let mut tcl_old = tcl;
    let mut refresh_coefficients = true;

    let mut dry = 0.0;
    let mut pwet = 0.0;

    for _minute in 0..EXPOSURE_MINUTES {
        // The first pass of every minute after the first reuses the
        // coefficients left over from the previous minute.
        let mut iterations = 0;
        loop {
            if refresh_coefficients {
                tcl_old = tcl;
                chr = 4.0 * STEFAN_BOLTZMANN * ((tcl + tr) / 2.0 + 273.15).powi(3) * 0.72;
                ctc = chr + chc;
                ra = 1.0 / (facl * ctc);
                top = (chr * tr + chc * ta) / ctc;
            }
            tcl = (ra * temp_skin + rcl * top) / (ra + rcl);
            refresh_coefficients = true;

            if !tcl.is_finite() {
                return Err(ComfortError::Diverged { model: "SET*" });
            }
            if (tcl - tcl_old).abs() <= CLOTHING_TOLERANCE {
                break;
            }
            iterations += 1;
            if iterations >= MAX_CLOTHING_ITERATIONS {
                return Err(ComfortError::NotConverged {
                    model: "SET*",
                    iterations,
                });
            }
        }
        refresh_coefficients = false;

        dry = (temp_skin - top) / (ra + rcl);
        let hfcs = (temp_core - temp_skin) * (5.28 + 1.163 * skin_blood_flow);
        let eres = 0.0023 * m * (44.0 - vapour_pressure);
        let cres = 0.0014 * m * (34.0 - ta);
        let scr = m - hfcs - eres - cres - wme;
        let ssk = hfcs - dry - esk;
        let tcsk = 0.97 * alfa * BODY_WEIGHT_KG;
        let tccr = 0.97 * (1.0 - alfa) * BODY_WEIGHT_KG;
        temp_skin += ssk * BODY_SURFACE_M2 / (tcsk * 60.0);
        temp_core += scr * BODY_SURFACE_M2 / (tccr * 60.0);
        let temp_body = alfa * temp_skin + (1.0 - alfa) * temp_core;

        let skin_signal = temp_skin - TEMP_SKIN_NEUTRAL;
        let warm_skin = skin_signal.max(0.0);
        let cold_skin = (-skin_signal).max(0.0);
        let core_signal = temp_core - TEMP_CORE_NEUTRAL;
        let warm_core = core_signal.max(0.0);
        let cold_core = (-core_signal).max(0.0);
        let warm_body = (temp_body - TEMP_BODY_NEUTRAL).max(0.0);

        skin_blood_flow = ((SKIN_BLOOD_FLOW_NEUTRAL + C_DILATION * warm_core)
            / (1.0 + C_CONSTRICTION * cold_skin))
            .clamp(0.5, 90.0);
        let regsw = (C_SWEAT * warm_body * (warm_skin / 10.7).exp()).min(500.0);

        let mut ersw = 0.68 * regsw;
        let rea = 1.0 / (lr * facl * chc);
        let recl = rcl / (lr * icl);
        let emax = (saturated_vapour_pressure_torr(temp_skin) - vapour_pressure) / (rea + recl);
        let mut prsw = ersw / emax;
        pwet = 0.06 + 0.94 * prsw;
        let mut edif = pwet * emax - ersw;
        if pwet > wcrit {
            pwet = wcrit;
            prsw = wcrit / 0.94;
            ersw = prsw * emax;
            edif = 0.06 * (1.0 - prsw) * emax;
        }
        if emax < 0.0 {
            edif = 0.0;
            ersw = 0.0;
            pwet = wcrit;
        }
        esk = ersw + edif;
        m = rm + 19.4 * cold_skin * cold_core;
        alfa = 0.0417737 + 0.7451833 / (skin_blood_flow + 0.585417);

        if !(temp_skin.is_finite() && temp_core.is_finite() && esk.is_finite()) {
            return Err(ComfortError::Diverged { model: "SET*" });
        }
    }

    // Total heat loss from skin
    let hsk = dry + esk;
    let wettedness = pwet;
    let pssk = saturated_vapour_pressure_torr(temp_skin);

    // ASHRAE standard environment
    let chrs = chr;
    let chcs = if met < 0.85 {
        3.0
    } else {
        (5.66 * (met - 0.85).powf(0.39)).max(3.0)
    };
    let ctcs = chcs + chrs;
    let rclos = 1.52 / ((met - wme / MET_TO_W_PER_M2) + 0.6944) - 0.1835;
    let rcls = 0.155 * rclos;
    let facls = 1.0 + K_CLO * rclos;
    let fcls = 1.0 / (1.0 + 0.155 * facls * ctcs * rclos);
    let ims = 0.45;
    let icls = ims * chcs / ctcs * (1.0 - fcls) / (chcs / ctcs - fcls * ims);
    let ras = 1.0 / (facls * ctcs);
    let reas = 1.0 / (lr * facls * chcs);
    let recls = rcls / (lr * icls);
    let hd_s = 1.0 / (ras + rcls);
    let he_s = 1.0 / (reas + recls);

    let residual = |set: f64| {
        hsk - hd_s * (temp_skin - set)
            - wettedness * he_s * (pssk - 0.5 * saturated_vapour_pressure_torr(set))
    };

    // lower bound for SET*
    let mut set_old = temp_skin - hsk / hd_s;
    for _ in 0..MAX_NEWTON_ITERATIONS {
        let err1 = residual(set_old);
        let err2 = residual(set_old + NEWTON_DELTA);
        let set = set_old - NEWTON_DELTA * err1 / (err2 - err1);
        if !set.is_finite() {
            return Err(ComfortError::Diverged { model: "SET*" });
        }
        let dx = set - set_old;
        if dx.abs() <= NEWTON_TOLERANCE {
            return Ok(set);
        }
        set_old = set;
    }

    Err(ComfortError::NotConverged {
        model: "SET*",
        iterations: MAX_NEWTON_ITERATIONS,
    })
}

/// Saturated vapour pressure (Torr) at temperature `t` (°C).
fn saturated_vapour_pressure_torr(t: f64) -> f64 {
    (18.6686 - 4030.183 / (t + 235.0)).exp()
}
