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

//! Roll stiffness distribution and lateral load transfer.
//!
//! Every tier goes through these functions for the mechanical part of the balance so the
//! numbers can never drift apart between tiers.

use serde::{Deserialize, Serialize};
use tracing::debug;
use utils::numeric::percentage_of;
use utils::units::GRAVITY;
use crate::error::{BalanceError, Result};
use crate::rates::spring_roll_stiffness;
use crate::setup::{Axle, VehicleSetup};

/// Share of each axle's mass that is unsprung (wheels, hubs, brakes, part of the links)
pub const UNSPRUNG_MASS_FRACTION: f64 = 0.12;
/// Unsprung CG height (mm), capped at the vehicle CG height
pub const UNSPRUNG_CG_HEIGHT: f64 = 300.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollStiffnessDistribution {
    /// N.mm/deg
    pub front: f64,
    pub rear: f64,
    pub front_pct: f64
}

impl RollStiffnessDistribution {
    pub fn from_setup(setup: &VehicleSetup) -> Result<RollStiffnessDistribution> {
        let front = axle_roll_stiffness(setup, Axle::Front);
        let rear = axle_roll_stiffness(setup, Axle::Rear);
        let total = front + rear;
        if !(total > 0.0) {
            return Err(BalanceError::DegenerateSetup(
                "front and rear roll stiffness are both zero; add spring or anti-roll bar stiffness".to_string()
            ));
        }
        Ok(RollStiffnessDistribution { front, rear, front_pct: percentage_of(front, total) })
    }

    pub fn total(&self) -> f64 {
        self.front + self.rear
    }

    pub fn axle(&self, axle: Axle) -> f64 {
        match axle {
            Axle::Front => self.front,
            Axle::Rear => self.rear
        }
    }
}

/// Springs through the motion ratio plus the bar
pub fn axle_roll_stiffness(setup: &VehicleSetup, axle: Axle) -> f64 {
    let axle_setup = setup.axle(axle);
    spring_roll_stiffness(axle_setup) + axle_setup.arb_stiffness
}

/// Lateral load transfer distribution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lltd {
    pub front_pct: f64,
    /// Load (N) moved from the inner to the outer tyre per g of lateral acceleration
    pub front_transfer_per_g: f64,
    pub rear_transfer_per_g: f64
}

impl Lltd {
    /// Splits the roll moment using `front_roll_share` (0..=1) of the sprung mass moment on the
    /// front axle. Each axle also carries the moment of its own unsprung mass directly.
    pub fn from_roll_share(setup: &VehicleSetup, front_roll_share: f64) -> Lltd {
        let front_roll_share = front_roll_share.clamp(0.0, 1.0);
        let unsprung_front = UNSPRUNG_MASS_FRACTION * setup.axle_mass(Axle::Front);
        let unsprung_rear = UNSPRUNG_MASS_FRACTION * setup.axle_mass(Axle::Rear);
        let unsprung_height = UNSPRUNG_CG_HEIGHT.min(setup.cg_height);
        let sprung_mass = setup.total_mass - unsprung_front - unsprung_rear;
        let sprung_height = (setup.total_mass * setup.cg_height
            - (unsprung_front + unsprung_rear) * unsprung_height) / sprung_mass;

        let sprung_moment = sprung_mass * GRAVITY * sprung_height;
        let front_transfer_per_g = (front_roll_share * sprung_moment
            + unsprung_front * GRAVITY * unsprung_height) / setup.front.track_width;
        let rear_transfer_per_g = ((1.0 - front_roll_share) * sprung_moment
            + unsprung_rear * GRAVITY * unsprung_height) / setup.rear.track_width;

        Lltd {
            front_pct: percentage_of(front_transfer_per_g, front_transfer_per_g + rear_transfer_per_g),
            front_transfer_per_g,
            rear_transfer_per_g
        }
    }

    pub fn transfer_per_g(&self, axle: Axle) -> f64 {
        match axle {
            Axle::Front => self.front_transfer_per_g,
            Axle::Rear => self.rear_transfer_per_g
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MechanicalBalance {
    pub roll_stiffness: RollStiffnessDistribution,
    pub lltd: Lltd
}

impl MechanicalBalance {
    /// `roll_share_correction` shifts the front roll stiffness share (percentage points) used
    /// to split the load transfer. The reported roll stiffness distribution is left untouched.
    pub fn from_setup(setup: &VehicleSetup, roll_share_correction: f64) -> Result<MechanicalBalance> {
        let roll_stiffness = RollStiffnessDistribution::from_setup(setup)?;
        let share = (roll_stiffness.front_pct + roll_share_correction).clamp(0.0, 100.0) / 100.0;
        let lltd = Lltd::from_roll_share(setup, share);
        debug!("Roll stiffness {:.0}/{:.0} N.mm/deg ({:.2}% front), LLTD {:.2}% front",
               roll_stiffness.front, roll_stiffness.rear, roll_stiffness.front_pct, lltd.front_pct);
        Ok(MechanicalBalance { roll_stiffness, lltd })
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::model::mechanical::*;
    use crate::setup::tests::example_setup;

    #[test]
    fn example_distribution_is_strictly_inside_range() {
        let roll = RollStiffnessDistribution::from_setup(&example_setup()).unwrap();
        assert!(roll.front_pct > 0.0 && roll.front_pct < 100.0);
        assert!(roll.front > 0.0 && roll.rear > 0.0);
    }

    #[test]
    fn rear_bar_moves_distribution_rearwards() {
        let mut setup = example_setup();
        let mut last = RollStiffnessDistribution::from_setup(&setup).unwrap().front_pct;
        for step in 1..=10 {
            setup.rear.arb_stiffness = step as f64 * 50_000.0;
            let current = RollStiffnessDistribution::from_setup(&setup).unwrap().front_pct;
            assert!(current < last);
            last = current;
        }
    }

    #[test]
    fn zero_stiffness_is_degenerate() {
        let mut setup = example_setup();
        setup.front.spring_rate = 0.0;
        setup.rear.spring_rate = 0.0;
        let err = RollStiffnessDistribution::from_setup(&setup).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DegenerateSetup);

        setup.rear.arb_stiffness = 100_000.0;
        let roll = RollStiffnessDistribution::from_setup(&setup).unwrap();
        assert_eq!(roll.front_pct, 0.0);
    }

    #[test]
    fn lltd_follows_roll_share_with_equal_tracks() {
        let mut setup = example_setup();
        setup.rear.track_width = setup.front.track_width;
        let lltd = Lltd::from_roll_share(&setup, 0.6);
        assert!(lltd.front_pct > 50.0 && lltd.front_pct < 60.0);
        let all_front = Lltd::from_roll_share(&setup, 1.0);
        let all_rear = Lltd::from_roll_share(&setup, 0.0);
        assert!(all_front.front_pct <= 100.0 && all_front.front_pct > 90.0);
        assert!(all_rear.front_pct >= 0.0 && all_rear.front_pct < 10.0);
    }

    #[test]
    fn total_transfer_balances_the_roll_moment() {
        let setup = example_setup();
        let lltd = Lltd::from_roll_share(&setup, 0.5);
        let moment = lltd.front_transfer_per_g * setup.front.track_width
            + lltd.rear_transfer_per_g * setup.rear.track_width;
        let expected = setup.total_mass * GRAVITY * setup.cg_height;
        assert!((moment - expected).abs() / expected < 1e-12);
    }

    #[test]
    fn correction_only_moves_lltd() {
        let setup = example_setup();
        let base = MechanicalBalance::from_setup(&setup, 0.0).unwrap();
        let shifted = MechanicalBalance::from_setup(&setup, 2.0).unwrap();
        assert_eq!(base.roll_stiffness, shifted.roll_stiffness);
        assert!(shifted.lltd.front_pct > base.lltd.front_pct);
    }
}
