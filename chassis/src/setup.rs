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

//! Input records for the balance calculators.
//!
//! Units follow the usual chassis setup sheet conventions: masses in kg, lengths in mm,
//! spring rates in N/mm, anti-roll bar and roll stiffness in N.mm/deg, pressures in bar,
//! temperatures in °C and speeds in km/h.

use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};
use utils::numeric::{percentage_of, round_float_to};
use utils::units::kmh_to_ms;
use crate::error::{require_finite, require_non_negative, require_positive, BalanceError, Result};

/// Largest difference tolerated between the corner weight sum and the declared total mass
pub const CORNER_WEIGHT_TOLERANCE_KG: f64 = 1.0;
/// Light vehicles get a tighter tolerance as a share of the total mass
pub const CORNER_WEIGHT_TOLERANCE_FRACTION: f64 = 0.002;
pub const MAX_MOTION_RATIO: f64 = 1.5;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axle {
    Front,
    Rear
}

impl Axle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Axle::Front => "front",
            Axle::Rear => "rear"
        }
    }

    pub fn other(&self) -> Axle {
        match self {
            Axle::Front => Axle::Rear,
            Axle::Rear => Axle::Front
        }
    }
}

impl Display for Axle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CornerWeights {
    pub fl: f64,
    pub fr: f64,
    pub rl: f64,
    pub rr: f64
}

impl CornerWeights {
    pub fn new(fl: f64, fr: f64, rl: f64, rr: f64) -> CornerWeights {
        CornerWeights { fl, fr, rl, rr }
    }

    pub fn total(&self) -> f64 {
        self.fl + self.fr + self.rl + self.rr
    }

    pub fn axle(&self, axle: Axle) -> f64 {
        match axle {
            Axle::Front => self.fl + self.fr,
            Axle::Rear => self.rl + self.rr
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_positive("corner_weights.fl", self.fl)?;
        require_positive("corner_weights.fr", self.fr)?;
        require_positive("corner_weights.rl", self.rl)?;
        require_positive("corner_weights.rr", self.rr)?;
        Ok(())
    }
}

/// Static weight split derived from the four corner weights
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightDistribution {
    pub total: f64,
    pub front_pct: f64,
    pub rear_pct: f64,
    pub left_pct: f64,
    pub right_pct: f64,
    /// FL + RR share of the total
    pub cross_pct: f64
}

impl WeightDistribution {
    pub fn from_corners(corners: &CornerWeights) -> WeightDistribution {
        let total = corners.total();
        WeightDistribution {
            total,
            front_pct: percentage_of(corners.fl + corners.fr, total),
            rear_pct: percentage_of(corners.rl + corners.rr, total),
            left_pct: percentage_of(corners.fl + corners.rl, total),
            right_pct: percentage_of(corners.fr + corners.rr, total),
            cross_pct: percentage_of(corners.fl + corners.rr, total)
        }
    }

    pub fn rounded(&self, decimal_places: u32) -> WeightDistribution {
        WeightDistribution {
            total: round_float_to(self.total, decimal_places),
            front_pct: round_float_to(self.front_pct, decimal_places),
            rear_pct: round_float_to(self.rear_pct, decimal_places),
            left_pct: round_float_to(self.left_pct, decimal_places),
            right_pct: round_float_to(self.right_pct, decimal_places),
            cross_pct: round_float_to(self.cross_pct, decimal_places)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxleSetup {
    /// Spring rate at the spring (N/mm). Zero is allowed for axles that rely on the bar alone
    pub spring_rate: f64,
    pub motion_ratio: f64,
    /// Anti-roll bar stiffness (N.mm/deg)
    #[serde(default)]
    pub arb_stiffness: f64,
    pub track_width: f64
}

impl AxleSetup {
    /// Spring rate seen at the wheel (N/mm)
    pub fn wheel_rate(&self) -> f64 {
        self.spring_rate * self.motion_ratio.powi(2)
    }

    fn validate(&self, axle: Axle) -> Result<()> {
        let field = |name: &str| format!("{}.{}", axle, name);
        require_non_negative(&field("spring_rate"), self.spring_rate)?;
        require_positive(&field("motion_ratio"), self.motion_ratio)?;
        if self.motion_ratio > MAX_MOTION_RATIO {
            return Err(BalanceError::validation(&field("motion_ratio"),
                                                format!("must not exceed {}, got {}", MAX_MOTION_RATIO, self.motion_ratio)));
        }
        require_non_negative(&field("arb_stiffness"), self.arb_stiffness)?;
        require_positive(&field("track_width"), self.track_width)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleSetup {
    pub total_mass: f64,
    pub corner_weights: CornerWeights,
    pub front: AxleSetup,
    pub rear: AxleSetup,
    pub cg_height: f64,
    pub wheelbase: f64
}

impl VehicleSetup {
    pub fn axle(&self, axle: Axle) -> &AxleSetup {
        match axle {
            Axle::Front => &self.front,
            Axle::Rear => &self.rear
        }
    }

    pub fn axle_mass(&self, axle: Axle) -> f64 {
        self.corner_weights.axle(axle)
    }

    pub fn weight_distribution(&self) -> WeightDistribution {
        WeightDistribution::from_corners(&self.corner_weights)
    }

    pub fn validate(&self) -> Result<()> {
        require_positive("total_mass", self.total_mass)?;
        self.corner_weights.validate()?;
        let corner_sum = self.corner_weights.total();
        let tolerance = CORNER_WEIGHT_TOLERANCE_KG.min(self.total_mass * CORNER_WEIGHT_TOLERANCE_FRACTION);
        if (corner_sum - self.total_mass).abs() > tolerance {
            return Err(BalanceError::validation(
                "corner_weights",
                format!("corner weights sum to {:.1} kg but total mass is {:.1} kg", corner_sum, self.total_mass)
            ));
        }
        self.front.validate(Axle::Front)?;
        self.rear.validate(Axle::Rear)?;
        require_positive("cg_height", self.cg_height)?;
        require_positive("wheelbase", self.wheelbase)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxleTyreState {
    /// Current tyre temperature (°C)
    pub temperature: f64,
    /// Current pressure (bar)
    pub pressure: f64,
    /// Pressure the compound works best at on this axle (bar)
    pub optimal_pressure: f64
}

impl AxleTyreState {
    fn validate(&self, axle: Axle) -> Result<()> {
        require_finite(&format!("tyres.{}.temperature", axle), self.temperature)?;
        require_positive(&format!("tyres.{}.pressure", axle), self.pressure)?;
        require_positive(&format!("tyres.{}.optimal_pressure", axle), self.optimal_pressure)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TireParams {
    pub compound: String,
    pub front: AxleTyreState,
    pub rear: AxleTyreState
}

impl TireParams {
    /// Single temperature and pressure shared by both axles
    pub fn uniform(compound: &str,
                   temperature: f64,
                   pressure: f64,
                   optimal_front: f64,
                   optimal_rear: f64) -> TireParams {
        TireParams {
            compound: compound.to_string(),
            front: AxleTyreState { temperature, pressure, optimal_pressure: optimal_front },
            rear: AxleTyreState { temperature, pressure, optimal_pressure: optimal_rear }
        }
    }

    pub fn axle(&self, axle: Axle) -> &AxleTyreState {
        match axle {
            Axle::Front => &self.front,
            Axle::Rear => &self.rear
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.compound.trim().is_empty() {
            return Err(BalanceError::validation("tyres.compound", "must not be empty"));
        }
        self.front.validate(Axle::Front)?;
        self.rear.validate(Axle::Rear)
    }
}

/// Vertical aero load on each axle (N)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AeroLoads {
    pub front: f64,
    pub rear: f64
}

impl AeroLoads {
    pub fn axle(&self, axle: Axle) -> f64 {
        match axle {
            Axle::Front => self.front,
            Axle::Rear => self.rear
        }
    }

    pub fn total(&self) -> f64 {
        self.front + self.rear
    }
}

/// Extra inputs only the complete calculator uses. Every field is optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AdvancedParams {
    /// Compression to rebound damping ratio
    #[serde(default)]
    pub front_damper_ratio: Option<f64>,
    #[serde(default)]
    pub rear_damper_ratio: Option<f64>,
    /// Downforce (N) measured at `reference_speed`
    #[serde(default)]
    pub front_downforce: Option<f64>,
    #[serde(default)]
    pub rear_downforce: Option<f64>,
    /// km/h
    #[serde(default)]
    pub reference_speed: Option<f64>,
    /// Speed (km/h) the balance is evaluated at. Defaults to `reference_speed`
    #[serde(default)]
    pub corner_speed: Option<f64>,
    /// Body roll (deg) taken up by link slack or preload before the bar starts to twist
    #[serde(default)]
    pub front_arb_free_play: Option<f64>,
    #[serde(default)]
    pub rear_arb_free_play: Option<f64>
}

impl AdvancedParams {
    pub fn validate(&self) -> Result<()> {
        if let Some(ratio) = self.front_damper_ratio {
            require_positive("advanced.front_damper_ratio", ratio)?;
        }
        if let Some(ratio) = self.rear_damper_ratio {
            require_positive("advanced.rear_damper_ratio", ratio)?;
        }
        if let Some(downforce) = self.front_downforce {
            require_non_negative("advanced.front_downforce", downforce)?;
        }
        if let Some(downforce) = self.rear_downforce {
            require_non_negative("advanced.rear_downforce", downforce)?;
        }
        if let Some(speed) = self.reference_speed {
            require_positive("advanced.reference_speed", speed)?;
        }
        if let Some(speed) = self.corner_speed {
            require_positive("advanced.corner_speed", speed)?;
        }
        if let Some(free_play) = self.front_arb_free_play {
            require_non_negative("advanced.front_arb_free_play", free_play)?;
        }
        if let Some(free_play) = self.rear_arb_free_play {
            require_non_negative("advanced.rear_arb_free_play", free_play)?;
        }
        Ok(())
    }

    /// Downforce on each axle at the evaluation speed. Zero when no reference speed is set.
    pub fn aero_loads(&self) -> AeroLoads {
        let Some(reference_speed) = self.reference_speed else {
            return AeroLoads::default();
        };
        let corner_speed = self.corner_speed.unwrap_or(reference_speed);
        let scale = (kmh_to_ms(corner_speed) / kmh_to_ms(reference_speed)).powi(2);
        AeroLoads {
            front: self.front_downforce.unwrap_or(0.0) * scale,
            rear: self.rear_downforce.unwrap_or(0.0) * scale
        }
    }

    pub fn arb_free_play(&self, axle: Axle) -> f64 {
        match axle {
            Axle::Front => self.front_arb_free_play,
            Axle::Rear => self.rear_arb_free_play
        }.unwrap_or(0.0)
    }

    /// (front, rear) damper ratios. A missing side mirrors the other so it adds no bias;
    /// with neither set both are 1.0
    pub fn damper_ratios(&self) -> (f64, f64) {
        match (self.front_damper_ratio, self.rear_damper_ratio) {
            (Some(front), Some(rear)) => (front, rear),
            (Some(front), None) => (front, front),
            (None, Some(rear)) => (rear, rear),
            (None, None) => (1.0, 1.0)
        }
    }
}


#[cfg(test)]
pub(crate) mod proptests {
    use proptest::prelude::*;
    use crate::setup::*;

    fn axle_setup() -> impl Strategy<Value = AxleSetup> {
        (0.0..300.0f64, 0.05..=MAX_MOTION_RATIO, 0.0..1_500_000.0f64, 1200.0..1800.0f64)
            .prop_map(|(spring_rate, motion_ratio, arb_stiffness, track_width)| {
                AxleSetup { spring_rate, motion_ratio, arb_stiffness, track_width }
            })
    }

    /// Any setup that passes validation, from kart-light to heavy saloon
    pub(crate) fn valid_setup() -> impl Strategy<Value = VehicleSetup> {
        (
            (40.0..700.0f64, 40.0..700.0f64, 40.0..700.0f64, 40.0..700.0f64),
            axle_setup(),
            axle_setup(),
            150.0..800.0f64,
            1500.0..3500.0f64
        ).prop_map(|((fl, fr, rl, rr), front, rear, cg_height, wheelbase)| {
            let corner_weights = CornerWeights::new(fl, fr, rl, rr);
            VehicleSetup { total_mass: corner_weights.total(), corner_weights, front, rear, cg_height, wheelbase }
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn generated_setups_validate(setup in valid_setup()) {
            prop_assert!(setup.validate().is_ok());
        }

        #[test]
        fn weight_shares_are_complementary(setup in valid_setup()) {
            let distribution = setup.weight_distribution();
            prop_assert!((distribution.front_pct + distribution.rear_pct - 100.0).abs() < 1e-9);
            prop_assert!((distribution.left_pct + distribution.right_pct - 100.0).abs() < 1e-9);
            prop_assert!(distribution.cross_pct > 0.0 && distribution.cross_pct < 100.0);
        }
    }
}
