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

use tracing::{debug, warn};
use crate::error::Result;
use crate::setup::{AeroLoads, Axle, VehicleSetup};
use super::{tendency_index, BalanceResult, Tier};
use super::mechanical::{Lltd, MechanicalBalance};
use super::slip::{AxleConditions, AxleSlip, SlipAngleBalance};

/// What a tier feeds into the shared pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TierConditions {
    pub tier: Tier,
    pub lateral_g: f64,
    pub front_relative_grip: f64,
    pub rear_relative_grip: f64,
    pub aero: AeroLoads,
    /// Percentage points added to the front roll share when splitting load transfer
    pub roll_share_correction: f64
}

impl TierConditions {
    fn relative_grip(&self, axle: Axle) -> f64 {
        match axle {
            Axle::Front => self.front_relative_grip,
            Axle::Rear => self.rear_relative_grip
        }
    }

    fn solve_slip(&self, setup: &VehicleSetup, lltd: &Lltd) -> SlipAngleBalance {
        let solve = |axle: Axle| {
            let conditions = AxleConditions::for_axle(setup, lltd, &self.aero, self.lateral_g,
                                                      self.relative_grip(axle), axle);
            AxleSlip::solve(&conditions, axle)
        };
        SlipAngleBalance::new(solve(Axle::Front), solve(Axle::Rear), self.lateral_g)
    }
}

pub(crate) fn evaluate(setup: &VehicleSetup, conditions: &TierConditions) -> Result<BalanceResult> {
    setup.validate()?;
    let mut roll_share_correction = conditions.roll_share_correction;
    let mut mechanical = MechanicalBalance::from_setup(setup, roll_share_correction)?;
    let mut slip_angle = conditions.solve_slip(setup, &mechanical.lltd);

    if roll_share_correction != 0.0 {
        let steady_state = MechanicalBalance::from_setup(setup, 0.0)?;
        let steady_slip = conditions.solve_slip(setup, &steady_state.lltd);
        if steady_slip.balance * slip_angle.balance < 0.0 {
            warn!("Damper correction of {:.2}% would flip the balance from {:.3} deg to {:.3} deg; ignoring it",
                  roll_share_correction, steady_slip.balance, slip_angle.balance);
            roll_share_correction = 0.0;
            mechanical = steady_state;
            slip_angle = steady_slip;
        }
    }

    let index = tendency_index(slip_angle.balance);
    debug!("{} tier: slip {:.3}/{:.3} deg at {:.3} g, balance {:.3} deg, index {:.2}",
           conditions.tier, slip_angle.front.slip_angle, slip_angle.rear.slip_angle,
           slip_angle.lateral_g, slip_angle.balance, index);
    Ok(BalanceResult {
        tier: conditions.tier,
        roll_stiffness: mechanical.roll_stiffness,
        lltd: mechanical.lltd,
        slip_angle,
        tendency_index: index,
        front_relative_grip: conditions.front_relative_grip,
        rear_relative_grip: conditions.rear_relative_grip,
        aero: conditions.aero,
        damper_correction: roll_share_correction
    })
}
