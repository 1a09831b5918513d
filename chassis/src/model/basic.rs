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

use crate::error::Result;
use crate::reference::ReferenceData;
use crate::setup::{AeroLoads, VehicleSetup};
use crate::tyre::GripBreakdown;
use super::{BalanceResult, ModelConfig, Tier};
use super::pipeline::{evaluate, TierConditions};

/// Balance from the suspension alone.
///
/// Both axles are assumed to run the default compound at its optimal temperature and
/// pressure, so any imbalance comes purely from how the roll stiffness is distributed.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicCalculator {
    config: ModelConfig
}

impl BasicCalculator {
    pub fn new(config: ModelConfig) -> BasicCalculator {
        BasicCalculator { config }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub(crate) fn conditions(&self) -> Result<TierConditions> {
        self.config.validate()?;
        let compound = ReferenceData::builtin().default_compound()?;
        let tyres = compound.neutral_tyres();
        Ok(TierConditions {
            tier: Tier::Basic,
            lateral_g: self.config.reference_lateral_g,
            front_relative_grip: GripBreakdown::for_axle(&tyres.front, compound)?.relative(),
            rear_relative_grip: GripBreakdown::for_axle(&tyres.rear, compound)?.relative(),
            aero: AeroLoads::default(),
            roll_share_correction: 0.0
        })
    }

    pub fn calculate(&self, setup: &VehicleSetup) -> Result<BalanceResult> {
        evaluate(setup, &self.conditions()?)
    }
}
