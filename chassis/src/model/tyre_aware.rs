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
use crate::error::Result;
use crate::reference::ReferenceData;
use crate::setup::{TireParams, VehicleSetup};
use crate::tyre::GripBreakdown;
use super::{BalanceResult, BasicCalculator, ModelConfig, Tier};
use super::pipeline::{evaluate, TierConditions};

/// Basic balance with the uniform tyre assumption swapped for grip computed from the
/// actual front and rear tyre temperatures and pressures
#[derive(Debug, Clone, Copy)]
pub struct TyreAwareCalculator<'a> {
    basic: BasicCalculator,
    reference: &'a ReferenceData
}

impl<'a> TyreAwareCalculator<'a> {
    pub fn new(config: ModelConfig, reference: &'a ReferenceData) -> TyreAwareCalculator<'a> {
        TyreAwareCalculator { basic: BasicCalculator::new(config), reference }
    }

    pub(crate) fn conditions(&self, tyres: &TireParams) -> Result<TierConditions> {
        tyres.validate()?;
        let compound = self.reference.resolve_compound_or_default(&tyres.compound)?;
        let front = GripBreakdown::for_axle(&tyres.front, compound)?;
        let rear = GripBreakdown::for_axle(&tyres.rear, compound)?;
        debug!("{} grip: front {:.3} (temp {:.3}, pressure {:.3}), rear {:.3} (temp {:.3}, pressure {:.3})",
               compound.id, front.grip(), front.temperature_factor, front.pressure_factor,
               rear.grip(), rear.temperature_factor, rear.pressure_factor);
        Ok(TierConditions {
            tier: Tier::TyreAware,
            front_relative_grip: front.relative(),
            rear_relative_grip: rear.relative(),
            ..self.basic.conditions()?
        })
    }

    pub fn calculate(&self, setup: &VehicleSetup, tyres: &TireParams) -> Result<BalanceResult> {
        evaluate(setup, &self.conditions(tyres)?)
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{BasicCalculator, ModelConfig, TyreAwareCalculator};
    use crate::reference::ReferenceData;
    use crate::setup::tests::example_setup;
    use crate::setup::{Axle, TireParams};

    fn calculator() -> TyreAwareCalculator<'static> {
        TyreAwareCalculator::new(ModelConfig::default(), ReferenceData::builtin())
    }

    #[test]
    fn cold_fronts_push_towards_understeer() {
        let setup = example_setup();
        let mut tyres = TireParams::uniform("sport", 85.0, 2.1, 2.1, 2.1);
        let warm = calculator().calculate(&setup, &tyres).unwrap();
        tyres.front.temperature = 40.0;
        let cold_front = calculator().calculate(&setup, &tyres).unwrap();
        assert!(cold_front.relative_grip(Axle::Front) < 1.0);
        assert_eq!(cold_front.relative_grip(Axle::Rear), 1.0);
        assert!(cold_front.slip_angle().balance > warm.slip_angle().balance);
        assert_eq!(cold_front.lltd(), warm.lltd());
        assert_eq!(cold_front.roll_stiffness(), warm.roll_stiffness());
    }

    #[test]
    fn under_inflated_rears_push_towards_oversteer() {
        let setup = example_setup();
        let mut tyres = TireParams::uniform("sport", 85.0, 2.1, 2.1, 2.1);
        let base = calculator().calculate(&setup, &tyres).unwrap();
        tyres.rear.pressure = 1.7;
        let soft_rear = calculator().calculate(&setup, &tyres).unwrap();
        assert!(soft_rear.slip_angle().balance < base.slip_angle().balance);
    }

    #[test]
    fn mechanical_part_matches_basic_tier() {
        let setup = example_setup();
        let tyres = TireParams::uniform("wet", 20.0, 1.6, 2.0, 2.0);
        let basic = BasicCalculator::default().calculate(&setup).unwrap();
        let tyre_aware = calculator().calculate(&setup, &tyres).unwrap();
        assert_eq!(basic.roll_stiffness(), tyre_aware.roll_stiffness());
        assert_eq!(basic.lltd(), tyre_aware.lltd());
    }

    #[test]
    fn unknown_compound_falls_back_to_default() {
        let setup = example_setup();
        let unknown = TireParams::uniform("r888", 75.0, 2.2, 2.2, 2.2);
        let street = TireParams::uniform("street", 75.0, 2.2, 2.2, 2.2);
        assert_eq!(calculator().calculate(&setup, &unknown).unwrap(),
                   calculator().calculate(&setup, &street).unwrap());
    }

    #[test]
    fn invalid_tyres_are_rejected() {
        let tyres = TireParams::uniform("sport", f64::NAN, 2.1, 2.1, 2.1);
        assert!(calculator().calculate(&example_setup(), &tyres).is_err());
    }
}
