//! Dynamic canopy height from surface-layer theory.
//!
//! Pennypacker, S. & Baldocchi, D. (2016), *Seeing the Fields and Forests:
//! Application of Surface-Layer Theory and Flux-Tower Data to Calculating
//! Vegetation Canopy Height*, Boundary-Layer Meteorology 158, 165-182.
//!
//! Under near-neutral, well-mixed conditions the ratio of mean wind speed to
//! friction velocity fixes the roughness of the canopy, from which the
//! canopy height follows as `h = z / (0.6 + 0.1 exp(k u / u*))`.

use tracing::info;

use crate::cadence::Cadence;
use crate::error::{Result, TransformError};
use crate::frame::TimeFrame;

/// EddyPro full-output column names used by the estimate.
pub const U_ROT: &str = "u_rot";
pub const V_ROT: &str = "v_rot";
pub const USTAR: &str = "u*";
pub const STABILITY: &str = "(z-d)/L";

/// Name of the estimated height column.
pub const CANOPY_HEIGHT: &str = "canopy_height";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanopyHeightParams {
    /// Measurement height above ground in metres.
    pub measurement_height: f64,
    /// Von Karman constant.
    pub von_karman: f64,
    /// Exclusive lower friction-velocity bound (m/s).
    pub ustar_min: f64,
    /// Exclusive upper friction-velocity bound (m/s).
    pub ustar_max: f64,
    /// Largest `|(z-d)/L|` treated as neutral.
    pub neutral_limit: f64,
}

impl Default for CanopyHeightParams {
    fn default() -> Self {
        Self {
            measurement_height: 7.1,
            von_karman: 0.4,
            ustar_min: 0.2,
            ustar_max: 0.4,
            neutral_limit: 0.1,
        }
    }
}

impl CanopyHeightParams {
    /// Height estimate for one half-hour, or `None` when the conditions are
    /// not turbulent and neutral or an input is missing.
    pub fn estimate(
        &self,
        u_rot: Option<f64>,
        v_rot: Option<f64>,
        ustar: Option<f64>,
        stability: Option<f64>,
    ) -> Option<f64> {
        let (u_rot, v_rot, ustar, stability) = (u_rot?, v_rot?, ustar?, stability?);
        if !(ustar > self.ustar_min && ustar < self.ustar_max) {
            return None;
        }
        if stability.abs() > self.neutral_limit {
            return None;
        }
        let speed = u_rot.hypot(v_rot);
        let b = 0.6 + 0.1 * (self.von_karman * speed / ustar).exp();
        let height = self.measurement_height / b;
        height.is_finite().then_some(height)
    }
}

/// Half-hourly and daily canopy height series.
#[derive(Debug, Clone)]
pub struct CanopyHeight {
    pub half_hourly: TimeFrame,
    pub daily: TimeFrame,
}

impl CanopyHeight {
    /// Number of half-hours that produced an estimate.
    pub fn valid_count(&self) -> usize {
        self.half_hourly
            .values(CANOPY_HEIGHT)
            .map_or(0, |values| values.iter().flatten().count())
    }
}

/// Estimates canopy height from a full-output frame.
pub fn estimate_canopy_height(
    frame: &TimeFrame,
    params: &CanopyHeightParams,
) -> Result<CanopyHeight> {
    let column = |name: &str| {
        frame
            .values(name)
            .ok_or_else(|| TransformError::MissingColumn(name.to_string()))
    };
    let u_rot = column(U_ROT)?;
    let v_rot = column(V_ROT)?;
    let ustar = column(USTAR)?;
    let stability = column(STABILITY)?;

    let heights: Vec<Option<f64>> = (0..frame.height())
        .map(|row| params.estimate(u_rot[row], v_rot[row], ustar[row], stability[row]))
        .collect();

    let half_hourly = TimeFrame::from_columns(
        frame.index().to_vec(),
        frame.cadence(),
        vec![(CANOPY_HEIGHT, heights)],
    )?;
    let daily = half_hourly.resample(Cadence::DAILY)?;
    let estimate = CanopyHeight { half_hourly, daily };
    info!(
        records = frame.height(),
        valid = estimate.valid_count(),
        days = estimate.daily.height(),
        "estimated canopy height"
    );
    Ok(estimate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_matches_closed_form() {
        let params = CanopyHeightParams::default();
        let height = params
            .estimate(Some(3.0), Some(4.0), Some(0.3), Some(0.05))
            .unwrap();
        let expected = 7.1 / (0.6 + 0.1 * (0.4_f64 * 5.0 / 0.3).exp());
        assert!((height - expected).abs() < 1e-12);
    }

    #[test]
    fn rejects_non_neutral_or_weak_turbulence() {
        let params = CanopyHeightParams::default();
        assert_eq!(params.estimate(Some(3.0), Some(0.0), Some(0.2), Some(0.0)), None);
        assert_eq!(params.estimate(Some(3.0), Some(0.0), Some(0.45), Some(0.0)), None);
        assert_eq!(params.estimate(Some(3.0), Some(0.0), Some(0.3), Some(-0.2)), None);
        assert_eq!(params.estimate(None, Some(0.0), Some(0.3), Some(0.0)), None);
        assert!(params.estimate(Some(3.0), Some(0.0), Some(0.3), Some(0.1)).is_some());
    }
}
