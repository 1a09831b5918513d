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

//! Steady state slip angle each axle needs to carry its share of the cornering force.

use serde::{Deserialize, Serialize};
use tracing::warn;
use utils::units::GRAVITY;
use crate::setup::{AeroLoads, Axle, VehicleSetup};
use super::mechanical::Lltd;

/// Cornering stiffness per unit load at vanishing load (1/deg)
pub const CORNERING_COEFFICIENT: f64 = 0.45;
/// Load (N) that sets how quickly cornering stiffness saturates
pub const REFERENCE_TYRE_LOAD: f64 = 4000.0;

/// Cornering stiffness (N/deg) of one tyre at full grip.
///
/// Grows with load but ever more slowly, so moving load from the inner to the outer tyre
/// lowers the stiffness of the pair. That is what turns load transfer into balance.
pub fn tyre_cornering_stiffness(vertical_load: f64) -> f64 {
    let load = vertical_load.max(0.0);
    CORNERING_COEFFICIENT * REFERENCE_TYRE_LOAD * (1.0 - (-load / REFERENCE_TYRE_LOAD).exp())
}

/// What one axle sees in a steady state corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct AxleConditions {
    /// N, static weight plus downforce
    pub vertical_load: f64,
    /// N
    pub lateral_force: f64,
    /// N moved from the inner to the outer tyre
    pub load_transfer: f64,
    /// Share of the compound's peak grip available (0, 1]
    pub relative_grip: f64
}

impl AxleConditions {
    pub fn for_axle(setup: &VehicleSetup,
                    lltd: &Lltd,
                    aero: &AeroLoads,
                    lateral_g: f64,
                    relative_grip: f64,
                    axle: Axle) -> AxleConditions {
        let weight = setup.axle_mass(axle) * GRAVITY;
        AxleConditions {
            vertical_load: weight + aero.axle(axle),
            lateral_force: weight * lateral_g,
            load_transfer: lltd.transfer_per_g(axle) * lateral_g,
            relative_grip
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxleSlip {
    /// deg
    pub slip_angle: f64,
    /// N/deg for the pair of tyres after grip scaling
    pub cornering_stiffness: f64,
    pub outer_load: f64,
    pub inner_load: f64,
    pub inner_wheel_lifted: bool
}

impl AxleSlip {
    pub(crate) fn solve(conditions: &AxleConditions, axle: Axle) -> AxleSlip {
        let half_load = conditions.vertical_load / 2.0;
        let mut outer_load = half_load + conditions.load_transfer;
        let mut inner_load = half_load - conditions.load_transfer;
        let inner_wheel_lifted = inner_load < 0.0;
        if inner_wheel_lifted {
            warn!("Inner {} tyre lifts; transfer {:.0} N exceeds half the axle load", axle, conditions.load_transfer);
            outer_load = conditions.vertical_load;
            inner_load = 0.0;
        }
        let cornering_stiffness = (tyre_cornering_stiffness(outer_load) + tyre_cornering_stiffness(inner_load))
            * conditions.relative_grip;
        AxleSlip {
            slip_angle: conditions.lateral_force / cornering_stiffness,
            cornering_stiffness,
            outer_load,
            inner_load,
            inner_wheel_lifted
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlipAngleBalance {
    pub front: AxleSlip,
    pub rear: AxleSlip,
    /// Lateral acceleration (g) the slip angles were evaluated at
    pub lateral_g: f64,
    /// Front minus rear slip angle (deg). Positive is understeer
    pub balance: f64
}

impl SlipAngleBalance {
    pub(crate) fn new(front: AxleSlip, rear: AxleSlip, lateral_g: f64) -> SlipAngleBalance {
        SlipAngleBalance { front, rear, lateral_g, balance: front.slip_angle - rear.slip_angle }
    }

    pub fn axle(&self, axle: Axle) -> &AxleSlip {
        match axle {
            Axle::Front => &self.front,
            Axle::Rear => &self.rear
        }
    }
}
