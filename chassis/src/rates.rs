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

//! Closed form spring, ride frequency and anti-roll bar conversions.

use std::f64::consts::PI;
use serde::{Deserialize, Serialize};
use tracing::debug;
use utils::numeric::percentage_of;
use utils::units::{kg_to_newtons, wheel_rate_to_roll_stiffness};
use crate::error::{require_positive, BalanceError, Result};
use crate::setup::{Axle, AxleSetup, MAX_MOTION_RATIO};

fn validate_corner(corner_mass: f64, motion_ratio: f64, tyre_rate: f64) -> Result<()> {
    require_positive("corner mass", corner_mass)?;
    require_positive("motion ratio", motion_ratio)?;
    if motion_ratio > MAX_MOTION_RATIO {
        return Err(BalanceError::validation("motion ratio",
                                            format!("must not exceed {}, got {}", MAX_MOTION_RATIO, motion_ratio)));
    }
    require_positive("tyre rate", tyre_rate)?;
    Ok(())
}

/// Natural frequency (Hz) of `corner_mass` (kg) on a spring of `rate` (N/mm)
fn natural_frequency(rate: f64, corner_mass: f64) -> f64 {
    (rate * 1000.0 / corner_mass).sqrt() / (2.0 * PI)
}

/// Highest frequency a corner can reach; the rate of an infinitely stiff spring in series
/// with the tyre is the tyre rate
pub fn tyre_limited_frequency(corner_mass: f64, tyre_rate: f64) -> f64 {
    natural_frequency(tyre_rate, corner_mass)
}

/// Spring rate (N/mm) that gives `target_hz` once the wheel rate acts in series with the tyre.
///
/// `1/k_combined = 1/(k_spring × MR²) + 1/k_tyre`
pub fn freq_to_spring(target_hz: f64, corner_mass: f64, motion_ratio: f64, tyre_rate: f64) -> Result<f64> {
    require_positive("target frequency", target_hz)?;
    validate_corner(corner_mass, motion_ratio, tyre_rate)?;
    let combined_rate = corner_mass * (2.0 * PI * target_hz).powi(2) / 1000.0;
    if combined_rate >= tyre_rate {
        return Err(BalanceError::InfeasibleFrequency {
            target_hz,
            limit_hz: tyre_limited_frequency(corner_mass, tyre_rate)
        });
    }
    let wheel_rate = combined_rate * tyre_rate / (tyre_rate - combined_rate);
    Ok(wheel_rate / motion_ratio.powi(2))
}

/// Ride frequency (Hz) produced by `spring_rate` (N/mm)
pub fn spring_to_freq(spring_rate: f64, corner_mass: f64, motion_ratio: f64, tyre_rate: f64) -> Result<f64> {
    require_positive("spring rate", spring_rate)?;
    validate_corner(corner_mass, motion_ratio, tyre_rate)?;
    let wheel_rate = spring_rate * motion_ratio.powi(2);
    let combined_rate = wheel_rate * tyre_rate / (wheel_rate + tyre_rate);
    Ok(natural_frequency(combined_rate, corner_mass))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringTableRow {
    pub spring_rate: f64,
    pub wheel_rate: f64,
    pub frequency: f64
}

/// Ride frequencies for a list of candidate spring rates. Validated on construction so
/// iterating can't fail, and every call to `iter` starts from the first rate again.
#[derive(Debug, Clone)]
pub struct SpringTable {
    rates: Vec<f64>,
    corner_mass: f64,
    motion_ratio: f64,
    tyre_rate: f64
}

impl SpringTable {
    pub fn new(rates: Vec<f64>, corner_mass: f64, motion_ratio: f64, tyre_rate: f64) -> Result<SpringTable> {
        validate_corner(corner_mass, motion_ratio, tyre_rate)?;
        for rate in &rates {
            require_positive("spring rate", *rate)?;
        }
        Ok(SpringTable { rates, corner_mass, motion_ratio, tyre_rate })
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = SpringTableRow> + '_ {
        self.rates.iter().map(move |&spring_rate| {
            let wheel_rate = spring_rate * self.motion_ratio.powi(2);
            let combined_rate = wheel_rate * self.tyre_rate / (wheel_rate + self.tyre_rate);
            SpringTableRow {
                spring_rate,
                wheel_rate,
                frequency: natural_frequency(combined_rate, self.corner_mass)
            }
        })
    }
}

impl<'a> IntoIterator for &'a SpringTable {
    type Item = SpringTableRow;
    type IntoIter = Box<dyn Iterator<Item = SpringTableRow> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// Roll stiffness (N.mm/deg) the springs of one axle provide, without the bar
pub fn spring_roll_stiffness(axle: &AxleSetup) -> f64 {
    wheel_rate_to_roll_stiffness(axle.wheel_rate(), axle.track_width)
}

/// Body roll (deg) per g of lateral acceleration, roll axis taken at ground level
pub fn roll_gradient(total_mass: f64, cg_height: f64, total_roll_stiffness: f64) -> f64 {
    kg_to_newtons(total_mass) * cg_height / total_roll_stiffness
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArbSizingRequest {
    pub total_mass: f64,
    pub cg_height: f64,
    /// deg/g
    pub target_roll_gradient: f64,
    pub front_weight_pct: f64,
    pub spring_roll_front: f64,
    pub spring_roll_rear: f64,
    /// Axle the bar is sized for; the other axle keeps its springs only
    pub axle: Axle
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArbSizing {
    pub axle: Axle,
    /// Roll stiffness (N.mm/deg) the whole car needs for the target gradient
    pub required_total_stiffness: f64,
    /// Bar stiffness (N.mm/deg) to fit on `axle`
    pub arb_stiffness: f64,
    pub spring_only_gradient: f64,
    /// Front roll stiffness share once the bar is fitted
    pub front_roll_stiffness_pct: f64,
    /// `front_roll_stiffness_pct` minus the front weight share. Positive leans to understeer
    pub distribution_offset: f64
}

pub fn arb_sizing(request: &ArbSizingRequest) -> Result<ArbSizing> {
    require_positive("total mass", request.total_mass)?;
    require_positive("cg height", request.cg_height)?;
    require_positive("target roll gradient", request.target_roll_gradient)?;
    if !utils::numeric::is_valid_percentage(request.front_weight_pct) {
        return Err(BalanceError::validation("front weight percentage",
                                            format!("must be within 0..=100, got {}", request.front_weight_pct)));
    }
    crate::error::require_non_negative("front spring roll stiffness", request.spring_roll_front)?;
    crate::error::require_non_negative("rear spring roll stiffness", request.spring_roll_rear)?;

    let spring_total = request.spring_roll_front + request.spring_roll_rear;
    let required_total_stiffness = kg_to_newtons(request.total_mass) * request.cg_height / request.target_roll_gradient;
    let arb_stiffness = required_total_stiffness - spring_total;
    let spring_only_gradient = match spring_total > 0.0 {
        true => roll_gradient(request.total_mass, request.cg_height, spring_total),
        false => f64::INFINITY
    };
    debug!("ARB sizing: need {:.0} N.mm/deg in total, springs give {:.0}", required_total_stiffness, spring_total);
    if arb_stiffness <= 0.0 {
        return Err(BalanceError::InfeasibleRollGradient {
            target_deg_per_g: request.target_roll_gradient,
            spring_only_deg_per_g: spring_only_gradient,
            excess_stiffness: -arb_stiffness
        });
    }

    let front_total = match request.axle {
        Axle::Front => request.spring_roll_front + arb_stiffness,
        Axle::Rear => request.spring_roll_front
    };
    let front_roll_stiffness_pct = percentage_of(front_total, required_total_stiffness);
    Ok(ArbSizing {
        axle: request.axle,
        required_total_stiffness,
        arb_stiffness,
        spring_only_gradient,
        front_roll_stiffness_pct,
        distribution_offset: front_roll_stiffness_pct - request.front_weight_pct
    })
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::rates::*;

    #[test]
    fn frequency_round_trip() {
        for (target, mass, mr, tyre) in [(1.2, 300.0, 0.75, 220.0),
                                         (1.8, 380.0, 1.0, 250.0),
                                         (2.6, 290.0, 0.9, 300.0),
                                         (0.9, 450.0, 0.6, 180.0)] {
            let spring = freq_to_spring(target, mass, mr, tyre).unwrap();
            assert!(spring > 0.0);
            let back = spring_to_freq(spring, mass, mr, tyre).unwrap();
            assert!((back - target).abs() < 1e-9, "{} vs {}", back, target);
        }
    }

    #[test]
    fn frequency_at_or_above_tyre_limit_is_infeasible() {
        let limit = tyre_limited_frequency(300.0, 220.0);
        let err = freq_to_spring(limit, 300.0, 0.75, 220.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InfeasibleFrequency);
        assert!(freq_to_spring(limit * 1.5, 300.0, 0.75, 220.0).is_err());
        assert!(freq_to_spring(limit * 0.99, 300.0, 0.75, 220.0).is_ok());
    }

    #[test]
    fn invalid_corner_inputs() {
        assert_eq!(freq_to_spring(1.5, 0.0, 0.75, 220.0).unwrap_err().kind(), ErrorKind::Validation);
        assert!(freq_to_spring(1.5, 300.0, 1.6, 220.0).is_err());
        assert!(spring_to_freq(0.0, 300.0, 0.75, 220.0).is_err());
    }

    #[test]
    fn spring_table_is_restartable() {
        let table = SpringTable::new(vec![20.0, 40.0, 60.0], 300.0, 0.8, 220.0).unwrap();
        let first: Vec<SpringTableRow> = table.iter().collect();
        let second: Vec<SpringTableRow> = (&table).into_iter().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
        assert!(first.windows(2).all(|w| w[0].frequency < w[1].frequency));
        let direct = spring_to_freq(40.0, 300.0, 0.8, 220.0).unwrap();
        assert!((first[1].frequency - direct).abs() < 1e-12);
    }

    #[test]
    fn spring_table_rejects_bad_rates() {
        assert!(SpringTable::new(vec![20.0, -1.0], 300.0, 0.8, 220.0).is_err());
        assert!(SpringTable::new(vec![], 300.0, 0.8, 220.0).unwrap().is_empty());
    }

    fn request(target: f64, axle: Axle) -> ArbSizingRequest {
        ArbSizingRequest {
            total_mass: 1200.0,
            cg_height: 450.0,
            target_roll_gradient: target,
            front_weight_pct: 55.0,
            spring_roll_front: 200_000.0,
            spring_roll_rear: 180_000.0,
            axle
        }
    }

    #[test]
    fn arb_sizing_hits_the_gradient() {
        let sizing = arb_sizing(&request(0.8, Axle::Front)).unwrap();
        assert!(sizing.arb_stiffness > 0.0);
        let achieved = roll_gradient(1200.0, 450.0, 380_000.0 + sizing.arb_stiffness);
        assert!((achieved - 0.8).abs() < 1e-9);
        assert!(sizing.front_roll_stiffness_pct > 55.0);

        let rear = arb_sizing(&request(0.8, Axle::Rear)).unwrap();
        assert_eq!(rear.arb_stiffness, sizing.arb_stiffness);
        assert!(rear.front_roll_stiffness_pct < sizing.front_roll_stiffness_pct);
    }

    #[test]
    fn gradient_already_met_by_springs_is_infeasible() {
        // springs alone give ~13.9 deg/g, so ask for more roll than that
        let err = arb_sizing(&request(20.0, Axle::Front)).unwrap_err();
        match err {
            BalanceError::InfeasibleRollGradient { excess_stiffness, spring_only_deg_per_g, .. } => {
                assert!(excess_stiffness > 0.0);
                assert!(spring_only_deg_per_g < 20.0);
            }
            other => panic!("unexpected error {:?}", other)
        }
    }
}

#[cfg(test)]
mod proptests {
    use proptest::prelude::*;
    use crate::error::ErrorKind;
    use crate::rates::*;

    /// (target Hz, corner mass, motion ratio, tyre rate) with the target below the tyre limit
    fn feasible_corner() -> impl Strategy<Value = (f64, f64, f64, f64)> {
        (0.01..0.99f64, 20.0..800.0f64, 0.05..=MAX_MOTION_RATIO, 50.0..600.0f64)
            .prop_map(|(share, mass, motion_ratio, tyre_rate)| {
                (share * tyre_limited_frequency(mass, tyre_rate), mass, motion_ratio, tyre_rate)
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(512))]

        #[test]
        fn frequency_round_trips((target, mass, motion_ratio, tyre_rate) in feasible_corner()) {
            let spring = freq_to_spring(target, mass, motion_ratio, tyre_rate).unwrap();
            prop_assert!(spring > 0.0);
            let back = spring_to_freq(spring, mass, motion_ratio, tyre_rate).unwrap();
            prop_assert!((back - target).abs() < 1e-9, "{} vs {}", back, target);
        }

        #[test]
        fn targets_past_the_tyre_limit_are_rejected(share in 1.001..4.0f64, mass in 20.0..800.0f64, tyre_rate in 50.0..600.0f64) {
            let target = share * tyre_limited_frequency(mass, tyre_rate);
            let err = freq_to_spring(target, mass, 0.8, tyre_rate).unwrap_err();
            prop_assert_eq!(err.kind(), ErrorKind::InfeasibleFrequency);
        }
    }
}
