/*
 * Copyright (c):
 * 2025 zephyrj
 * zephyrj@protonmail.com
 *
 * This file is part of setup-balance.
 *
 * setup-balance is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * setup-balance is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with setup-balance. If not, see <https://www.gnu.org/licenses/>.
 */

//! Tyre grip as a function of temperature and pressure.
//!
//! `grip = peak_grip(compound) × temperature_factor × pressure_factor`. Both factors are 1.0 at
//! the compound's optimum and fall away from it, but neither reaches zero so the result can
//! always be divided by.

use serde::{Deserialize, Serialize};
use crate::error::{require_finite, require_positive, Result};
use crate::reference::CompoundRecord;
use crate::setup::AxleTyreState;

/// Temperature factor at the edge of the compound's working window
pub const TEMPERATURE_EDGE_FACTOR: f64 = 0.9;
pub const MIN_TEMPERATURE_FACTOR: f64 = 0.5;
/// Quadratic penalty per unit of relative pressure error below the optimum
pub const UNDER_INFLATION_PENALTY: f64 = 2.0;
pub const OVER_INFLATION_PENALTY: f64 = 1.2;
pub const MIN_PRESSURE_FACTOR: f64 = 0.5;

/// Gaussian falloff centred on the optimal temperature with the window as the half width
pub fn temperature_factor(temperature: f64, compound: &CompoundRecord) -> f64 {
    let normalised = (temperature - compound.optimal_temperature) / compound.temperature_window;
    let falloff = -TEMPERATURE_EDGE_FACTOR.ln();
    (-falloff * normalised.powi(2)).exp().max(MIN_TEMPERATURE_FACTOR)
}

/// Under-inflation is punished harder than over-inflation
pub fn pressure_factor(pressure: f64, optimal_pressure: f64) -> f64 {
    let relative_error = (pressure - optimal_pressure) / optimal_pressure;
    let penalty = if relative_error < 0.0 {
        UNDER_INFLATION_PENALTY
    } else {
        OVER_INFLATION_PENALTY
    };
    (1.0 - penalty * relative_error.powi(2)).max(MIN_PRESSURE_FACTOR)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GripBreakdown {
    pub peak_grip: f64,
    pub temperature_factor: f64,
    pub pressure_factor: f64
}

impl GripBreakdown {
    pub fn for_axle(state: &AxleTyreState, compound: &CompoundRecord) -> Result<GripBreakdown> {
        require_finite("tyre temperature", state.temperature)?;
        require_positive("tyre pressure", state.pressure)?;
        require_positive("optimal tyre pressure", state.optimal_pressure)?;
        Ok(GripBreakdown {
            peak_grip: compound.peak_grip,
            temperature_factor: temperature_factor(state.temperature, compound),
            pressure_factor: pressure_factor(state.pressure, state.optimal_pressure)
        })
    }

    pub fn grip(&self) -> f64 {
        self.peak_grip * self.relative()
    }

    /// Share of the compound's peak grip currently available (0, 1]
    pub fn relative(&self) -> f64 {
        self.temperature_factor * self.pressure_factor
    }
}

pub fn grip(temperature: f64, pressure: f64, compound: &CompoundRecord, optimal_pressure: f64) -> Result<f64> {
    let state = AxleTyreState { temperature, pressure, optimal_pressure };
    Ok(GripBreakdown::for_axle(&state, compound)?.grip())
}

#[cfg(test)]
mod tests {
    use crate::reference::ReferenceData;
    use crate::tyre::grip::*;

    fn compound() -> &'static CompoundRecord {
        ReferenceData::builtin().resolve_compound("semi_slick").unwrap()
    }

    #[test]
    fn peak_at_optimum() {
        let c = compound();
        let g = grip(c.optimal_temperature, 1.9, c, 1.9).unwrap();
        assert_eq!(g, c.peak_grip);
    }

    #[test]
    fn window_edge_factor() {
        let c = compound();
        let factor = temperature_factor(c.optimal_temperature + c.temperature_window, c);
        assert!((factor - TEMPERATURE_EDGE_FACTOR).abs() < 1e-12);
        let factor = temperature_factor(c.optimal_temperature - c.temperature_window, c);
        assert!((factor - TEMPERATURE_EDGE_FACTOR).abs() < 1e-12);
    }

    #[test]
    fn temperature_moves_never_increase_grip() {
        let c = compound();
        for direction in [-1.0, 1.0] {
            let mut last = grip(c.optimal_temperature, 2.0, c, 1.9).unwrap();
            for step in 1..400 {
                let temperature = c.optimal_temperature + direction * step as f64 * 0.5;
                let current = grip(temperature, 2.0, c, 1.9).unwrap();
                assert!(current <= last, "grip rose moving to {} °C", temperature);
                assert!(current > 0.0);
                last = current;
            }
        }
    }

    #[test]
    fn far_outside_window_hits_the_floor() {
        let c = compound();
        assert_eq!(temperature_factor(-40.0, c), MIN_TEMPERATURE_FACTOR);
        assert_eq!(pressure_factor(0.2, 2.0), MIN_PRESSURE_FACTOR);
    }

    #[test]
    fn under_inflation_costs_more_than_over_inflation() {
        let under = pressure_factor(1.8, 2.0);
        let over = pressure_factor(2.2, 2.0);
        assert!(under < 1.0 && over < 1.0);
        assert!(under < over);
    }

    #[test]
    fn invalid_states_are_rejected() {
        let c = compound();
        assert!(grip(f64::NAN, 2.0, c, 2.0).is_err());
        assert!(grip(80.0, 0.0, c, 2.0).is_err());
        assert!(grip(80.0, 2.0, c, -2.0).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use proptest::prelude::*;
    use proptest::sample::select;
    use crate::reference::ReferenceData;
    use crate::tyre::grip::*;

    fn compound() -> impl Strategy<Value = &'static CompoundRecord> {
        select(ReferenceData::builtin().compounds().collect::<Vec<_>>())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(512))]

        #[test]
        fn moving_away_from_optimal_temperature_never_adds_grip(compound in compound(),
                                                                 near in 0.0..120.0f64,
                                                                 further in 0.0..120.0f64,
                                                                 colder in any::<bool>(),
                                                                 pressure in 0.5..4.0f64,
                                                                 optimal_pressure in 1.0..3.0f64) {
            let direction = if colder { -1.0 } else { 1.0 };
            let near_temperature = compound.optimal_temperature + direction * near;
            let far_temperature = near_temperature + direction * further;
            let near_grip = grip(near_temperature, pressure, compound, optimal_pressure).unwrap();
            let far_grip = grip(far_temperature, pressure, compound, optimal_pressure).unwrap();
            prop_assert!(far_grip <= near_grip, "{} at {} °C, {} at {} °C",
                         near_grip, near_temperature, far_grip, far_temperature);
            prop_assert!(far_grip > 0.0);
            prop_assert!(near_grip <= compound.peak_grip);
        }
    }
}
