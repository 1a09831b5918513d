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

//! Signed differences between two balance results, used to zero a setup against a baseline.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use crate::error::{BalanceError, Result};
use crate::model::{BalanceModel, BalanceResult, CalculationInputs, Tier};
use crate::setup::Axle;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeLabel {
    MoreUndersteer,
    MoreOversteer,
    Unchanged
}

impl ChangeLabel {
    pub fn from_index_delta(delta: f64, dead_band: f64) -> ChangeLabel {
        if delta > dead_band {
            ChangeLabel::MoreUndersteer
        } else if delta < -dead_band {
            ChangeLabel::MoreOversteer
        } else {
            ChangeLabel::Unchanged
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeLabel::MoreUndersteer => "more understeer",
            ChangeLabel::MoreOversteer => "more oversteer",
            ChangeLabel::Unchanged => "unchanged"
        }
    }
}

impl Display for ChangeLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Current minus baseline for every scalar of a [BalanceResult]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalanceDelta {
    pub tier: Tier,
    pub front_roll_stiffness: f64,
    pub rear_roll_stiffness: f64,
    pub front_roll_stiffness_pct: f64,
    pub lltd_front_pct: f64,
    pub front_transfer_per_g: f64,
    pub rear_transfer_per_g: f64,
    pub front_slip_angle: f64,
    pub rear_slip_angle: f64,
    pub slip_balance: f64,
    pub lateral_g: f64,
    pub tendency_index: f64,
    pub front_relative_grip: f64,
    pub rear_relative_grip: f64,
    pub front_downforce: f64,
    pub rear_downforce: f64,
    pub damper_correction: f64,
    pub label: ChangeLabel
}

impl BalanceDelta {
    pub fn between(baseline: &BalanceResult, current: &BalanceResult, dead_band: f64) -> Result<BalanceDelta> {
        if baseline.tier() != current.tier() {
            return Err(BalanceError::IncompatibleInputs(
                format!("cannot compare a {} result against a {} baseline", current.tier(), baseline.tier())
            ));
        }
        let tendency_index = current.tendency_index() - baseline.tendency_index();
        Ok(BalanceDelta {
            tier: current.tier(),
            front_roll_stiffness: current.roll_stiffness().front - baseline.roll_stiffness().front,
            rear_roll_stiffness: current.roll_stiffness().rear - baseline.roll_stiffness().rear,
            front_roll_stiffness_pct: current.roll_stiffness().front_pct - baseline.roll_stiffness().front_pct,
            lltd_front_pct: current.lltd().front_pct - baseline.lltd().front_pct,
            front_transfer_per_g: current.lltd().front_transfer_per_g - baseline.lltd().front_transfer_per_g,
            rear_transfer_per_g: current.lltd().rear_transfer_per_g - baseline.lltd().rear_transfer_per_g,
            front_slip_angle: current.slip_angle().front.slip_angle - baseline.slip_angle().front.slip_angle,
            rear_slip_angle: current.slip_angle().rear.slip_angle - baseline.slip_angle().rear.slip_angle,
            slip_balance: current.slip_angle().balance - baseline.slip_angle().balance,
            lateral_g: current.slip_angle().lateral_g - baseline.slip_angle().lateral_g,
            tendency_index,
            front_relative_grip: current.relative_grip(Axle::Front) - baseline.relative_grip(Axle::Front),
            rear_relative_grip: current.relative_grip(Axle::Rear) - baseline.relative_grip(Axle::Rear),
            front_downforce: current.aero().front - baseline.aero().front,
            rear_downforce: current.aero().rear - baseline.aero().rear,
            damper_correction: current.damper_correction() - baseline.damper_correction(),
            label: ChangeLabel::from_index_delta(tendency_index, dead_band)
        })
    }

    fn scalars(&self) -> [f64; 16] {
        [
            self.front_roll_stiffness, self.rear_roll_stiffness, self.front_roll_stiffness_pct,
            self.lltd_front_pct, self.front_transfer_per_g, self.rear_transfer_per_g,
            self.front_slip_angle, self.rear_slip_angle, self.slip_balance, self.lateral_g,
            self.tendency_index, self.front_relative_grip, self.rear_relative_grip,
            self.front_downforce, self.rear_downforce, self.damper_correction
        ]
    }

    pub fn is_zero(&self) -> bool {
        self.scalars().iter().all(|&value| value == 0.0)
    }
}

/// Runs `baseline` and `current` through the same tier and returns the signed change
pub fn compare(model: &BalanceModel,
               tier: Tier,
               baseline: &CalculationInputs,
               current: &CalculationInputs) -> Result<BalanceDelta> {
    baseline.check_shape(tier)?;
    current.check_shape(tier)?;
    let baseline_result = model.calculate(tier, baseline)?;
    let current_result = model.calculate(tier, current)?;
    let delta = BalanceDelta::between(&baseline_result, &current_result, model.config().unchanged_dead_band)?;
    debug!("{} comparison: index {:+.2} ({})", tier, delta.tendency_index, delta.label);
    Ok(delta)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCandidate {
    pub label: String,
    pub result: BalanceResult,
    pub delta: BalanceDelta
}

/// Compares each candidate against `baseline` and orders them closest to neutral first.
/// Candidates that tie keep their input order.
pub fn rank_candidates(model: &BalanceModel,
                       tier: Tier,
                       baseline: &CalculationInputs,
                       candidates: &[(String, CalculationInputs)]) -> Result<Vec<RankedCandidate>> {
    baseline.check_shape(tier)?;
    let baseline_result = model.calculate(tier, baseline)?;
    let dead_band = model.config().unchanged_dead_band;
    let ranked: Vec<RankedCandidate> = candidates.iter().map(|(label, inputs)| -> Result<RankedCandidate> {
        inputs.check_shape(tier)?;
        let result = model.calculate(tier, inputs)?;
        let delta = BalanceDelta::between(&baseline_result, &result, dead_band)?;
        Ok(RankedCandidate { label: label.clone(), result, delta })
    }).collect::<Result<Vec<_>>>()?;
    info!("Ranked {} candidate setups with the {} tier", ranked.len(), tier);
    Ok(ranked.into_iter()
        .sorted_by(|a, b| {
            a.result.tendency_index().abs()
                .partial_cmp(&b.result.tendency_index().abs())
                .unwrap_or(Ordering::Equal)
        })
        .collect())
}
