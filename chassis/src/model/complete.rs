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

use tracing::debug;
use utils::units::kg_to_newtons;
use crate::error::Result;
use crate::rates::spring_roll_stiffness;
use crate::reference::ReferenceData;
use crate::setup::{AdvancedParams, Axle, TireParams, VehicleSetup};
use super::{BalanceResult, ModelConfig, Tier, TyreAwareCalculator};
use super::pipeline::{evaluate, TierConditions};

/// Front roll share shift (percentage points) per unit of normalised damper ratio difference
pub const DAMPER_CORRECTION_GAIN: f64 = 4.0;
/// Largest shift the dampers may apply to the front roll share (percentage points)
pub const MAX_DAMPER_CORRECTION: f64 = 2.0;

/// Secondary correction for how the dampers bias load transfer while the car takes a set.
///
/// Dampers add no steady state roll stiffness. A front axle with relatively more
/// compression damping picks up load sooner, which is modelled as a small shift of the front
/// roll share. Equal ratios give exactly zero.
pub fn damper_correction(front_ratio: f64, rear_ratio: f64) -> f64 {
    let normalised = (front_ratio - rear_ratio) / (front_ratio + rear_ratio);
    (DAMPER_CORRECTION_GAIN * normalised).clamp(-MAX_DAMPER_CORRECTION, MAX_DAMPER_CORRECTION)
}

/// Anti-roll bar stiffness (front, rear) each bar delivers at `lateral_g`.
///
/// A bar with free play only twists once the body has rolled past it, so at the steady state
/// roll angle `phi` it acts like a bar of `arb × (phi − free_play) / phi`. Bars whose free play
/// is never taken up contribute nothing.
pub fn engaged_arb_stiffness(setup: &VehicleSetup, advanced: &AdvancedParams, lateral_g: f64) -> (f64, f64) {
    let bars = [setup.front.arb_stiffness, setup.rear.arb_stiffness];
    let free_play = [advanced.arb_free_play(Axle::Front), advanced.arb_free_play(Axle::Rear)];
    if free_play.iter().all(|&play| play == 0.0) {
        return (bars[0], bars[1]);
    }
    let spring_stiffness = spring_roll_stiffness(&setup.front) + spring_roll_stiffness(&setup.rear);
    let roll_moment = kg_to_newtons(setup.total_mass) * setup.cg_height * lateral_g;

    let mut engaged = bars.map(|arb| arb > 0.0);
    let mut roll = 0.0;
    // each pass either settles or drops at least one bar
    for _ in 0..=bars.len() {
        let (stiffness, preload) = (0..bars.len())
            .filter(|&i| engaged[i])
            .fold((spring_stiffness, 0.0), |(k, p), i| (k + bars[i], p + bars[i] * free_play[i]));
        if !(stiffness > 0.0) {
            return (bars[0], bars[1]);
        }
        roll = (roll_moment + preload) / stiffness;
        let slack: Vec<usize> = (0..bars.len()).filter(|&i| engaged[i] && free_play[i] >= roll).collect();
        if slack.is_empty() {
            break;
        }
        for i in slack {
            engaged[i] = false;
        }
    }
    let effective = |i: usize| if engaged[i] { bars[i] * (roll - free_play[i]) / roll } else { 0.0 };
    (effective(0), effective(1))
}

/// Tyre aware balance plus downforce, bar engagement and damper influence
#[derive(Debug, Clone, Copy)]
pub struct CompleteCalculator<'a> {
    tyre_aware: TyreAwareCalculator<'a>
}

impl<'a> CompleteCalculator<'a> {
    pub fn new(config: ModelConfig, reference: &'a ReferenceData) -> CompleteCalculator<'a> {
        CompleteCalculator { tyre_aware: TyreAwareCalculator::new(config, reference) }
    }

    pub(crate) fn conditions(&self,
                             setup: &VehicleSetup,
                             tyres: &TireParams,
                             advanced: &AdvancedParams) -> Result<TierConditions> {
        let base = self.tyre_aware.conditions(tyres)?;
        advanced.validate()?;
        let aero = advanced.aero_loads();
        // downforce raises the cornering capacity the tyres are loaded to
        let weight = kg_to_newtons(setup.total_mass);
        let lateral_g = base.lateral_g * ((weight + aero.total()) / weight);
        let (front_ratio, rear_ratio) = advanced.damper_ratios();
        let roll_share_correction = damper_correction(front_ratio, rear_ratio);
        debug!("Aero {:.0}/{:.0} N, lateral {:.3} g, damper correction {:.2}%",
               aero.front, aero.rear, lateral_g, roll_share_correction);
        Ok(TierConditions {
            tier: Tier::Complete,
            lateral_g,
            aero,
            roll_share_correction,
            ..base
        })
    }

    pub fn calculate(&self,
                     setup: &VehicleSetup,
                     tyres: &TireParams,
                     advanced: &AdvancedParams) -> Result<BalanceResult> {
        setup.validate()?;
        let conditions = self.conditions(setup, tyres, advanced)?;
        let (front_arb, rear_arb) = engaged_arb_stiffness(setup, advanced, conditions.lateral_g);
        let mut engaged = *setup;
        engaged.front.arb_stiffness = front_arb;
        engaged.rear.arb_stiffness = rear_arb;
        if engaged != *setup {
            debug!("Bars engaged at {:.0}/{:.0} of {:.0}/{:.0} N.mm/deg",
                   front_arb, rear_arb, setup.front.arb_stiffness, setup.rear.arb_stiffness);
        }
        evaluate(&engaged, &conditions)
    }
}
