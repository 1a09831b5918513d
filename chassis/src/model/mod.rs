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

//! Handling balance prediction.
//!
//! All three tiers run the same pipeline: roll stiffness distribution, lateral load transfer
//! distribution, then the slip angle each axle needs at a reference lateral acceleration. The
//! tiers only differ in the conditions they feed that pipeline with:
//!
//! - [BasicCalculator] assumes the default compound working at its optimum on both axles
//! - [TyreAwareCalculator] replaces that with grip from the actual tyre temperatures and pressures
//! - [CompleteCalculator] adds downforce and a bounded damper correction on top

pub mod mechanical;
pub mod slip;
mod pipeline;
mod basic;
mod tyre_aware;
mod complete;

use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};
use crate::error::{require_non_negative, require_positive, BalanceError, Result};
use crate::reference::ReferenceData;
use crate::setup::{AdvancedParams, AeroLoads, Axle, TireParams, VehicleSetup};

pub use mechanical::{Lltd, MechanicalBalance, RollStiffnessDistribution};
pub use slip::{AxleSlip, SlipAngleBalance};
pub use basic::BasicCalculator;
pub use tyre_aware::TyreAwareCalculator;
pub use complete::{damper_correction, engaged_arb_stiffness, CompleteCalculator, DAMPER_CORRECTION_GAIN, MAX_DAMPER_CORRECTION};

pub const DEFAULT_REFERENCE_LATERAL_G: f64 = 0.8;
/// Tendency index changes smaller than this count as unchanged
pub const DEFAULT_UNCHANGED_DEAD_BAND: f64 = 0.3;
pub const INDEX_PER_DEGREE: f64 = 5.0;
pub const MAX_TENDENCY_INDEX: f64 = 10.0;
/// Tendency index magnitude still reported as neutral
pub const NEUTRAL_BAND: f64 = 0.5;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Basic,
    TyreAware,
    Complete
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Basic => "basic",
            Tier::TyreAware => "tyre-aware",
            Tier::Complete => "complete"
        }
    }

    pub fn needs_tyres(&self) -> bool {
        !matches!(self, Tier::Basic)
    }
}

impl Display for Tier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub reference_lateral_g: f64,
    pub unchanged_dead_band: f64
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            reference_lateral_g: DEFAULT_REFERENCE_LATERAL_G,
            unchanged_dead_band: DEFAULT_UNCHANGED_DEAD_BAND
        }
    }
}

impl ModelConfig {
    pub fn validate(&self) -> Result<()> {
        require_positive("reference_lateral_g", self.reference_lateral_g)?;
        require_non_negative("unchanged_dead_band", self.unchanged_dead_band)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlingTendency {
    Understeer,
    Neutral,
    Oversteer
}

impl HandlingTendency {
    pub fn from_index(index: f64) -> HandlingTendency {
        if index > NEUTRAL_BAND {
            HandlingTendency::Understeer
        } else if index < -NEUTRAL_BAND {
            HandlingTendency::Oversteer
        } else {
            HandlingTendency::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HandlingTendency::Understeer => "understeer",
            HandlingTendency::Neutral => "neutral",
            HandlingTendency::Oversteer => "oversteer"
        }
    }
}

impl Display for HandlingTendency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Maps slip angle balance (deg) onto the -10..=10 tendency scale, saturating at the ends
pub fn tendency_index(slip_balance: f64) -> f64 {
    (slip_balance * INDEX_PER_DEGREE).clamp(-MAX_TENDENCY_INDEX, MAX_TENDENCY_INDEX)
}

/// Output of one calculator run. Only readable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceResult {
    tier: Tier,
    roll_stiffness: RollStiffnessDistribution,
    lltd: Lltd,
    slip_angle: SlipAngleBalance,
    tendency_index: f64,
    front_relative_grip: f64,
    rear_relative_grip: f64,
    aero: AeroLoads,
    damper_correction: f64
}

impl BalanceResult {
    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn roll_stiffness(&self) -> &RollStiffnessDistribution {
        &self.roll_stiffness
    }

    pub fn lltd(&self) -> &Lltd {
        &self.lltd
    }

    pub fn slip_angle(&self) -> &SlipAngleBalance {
        &self.slip_angle
    }

    pub fn tendency_index(&self) -> f64 {
        self.tendency_index
    }

    pub fn tendency(&self) -> HandlingTendency {
        HandlingTendency::from_index(self.tendency_index)
    }

    /// Share of peak grip available on `axle`
    pub fn relative_grip(&self, axle: Axle) -> f64 {
        match axle {
            Axle::Front => self.front_relative_grip,
            Axle::Rear => self.rear_relative_grip
        }
    }

    pub fn aero(&self) -> &AeroLoads {
        &self.aero
    }

    /// Percentage points the dampers moved the front roll share by. Zero below the complete tier
    pub fn damper_correction(&self) -> f64 {
        self.damper_correction
    }
}

/// Everything any tier may need. Which parts are required depends on the tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationInputs {
    pub setup: VehicleSetup,
    #[serde(default)]
    pub tyres: Option<TireParams>,
    #[serde(default)]
    pub advanced: Option<AdvancedParams>
}

impl CalculationInputs {
    pub fn new(setup: VehicleSetup) -> CalculationInputs {
        CalculationInputs { setup, tyres: None, advanced: None }
    }

    pub fn with_tyres(mut self, tyres: TireParams) -> CalculationInputs {
        self.tyres = Some(tyres);
        self
    }

    pub fn with_advanced(mut self, advanced: AdvancedParams) -> CalculationInputs {
        self.advanced = Some(advanced);
        self
    }

    /// Checks the inputs carry what `tier` needs
    pub fn check_shape(&self, tier: Tier) -> Result<()> {
        if tier.needs_tyres() {
            self.tyres_for(tier)?;
        }
        Ok(())
    }

    fn tyres_for(&self, tier: Tier) -> Result<&TireParams> {
        self.tyres.as_ref().ok_or_else(|| {
            BalanceError::IncompatibleInputs(format!("the {} tier needs tyre data", tier))
        })
    }
}

/// Entry point bundling the reference data and model configuration
#[derive(Debug, Clone, Copy)]
pub struct BalanceModel<'a> {
    reference: &'a ReferenceData,
    config: ModelConfig
}

impl<'a> BalanceModel<'a> {
    pub fn new(reference: &'a ReferenceData) -> BalanceModel<'a> {
        BalanceModel { reference, config: ModelConfig::default() }
    }

    pub fn with_config(reference: &'a ReferenceData, config: ModelConfig) -> Result<BalanceModel<'a>> {
        config.validate()?;
        Ok(BalanceModel { reference, config })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn reference(&self) -> &'a ReferenceData {
        self.reference
    }

    pub fn basic(&self) -> BasicCalculator {
        BasicCalculator::new(self.config)
    }

    pub fn tyre_aware(&self) -> TyreAwareCalculator<'a> {
        TyreAwareCalculator::new(self.config, self.reference)
    }

    pub fn complete(&self) -> CompleteCalculator<'a> {
        CompleteCalculator::new(self.config, self.reference)
    }

    pub fn calculate(&self, tier: Tier, inputs: &CalculationInputs) -> Result<BalanceResult> {
        match tier {
            Tier::Basic => self.basic().calculate(&inputs.setup),
            Tier::TyreAware => self.tyre_aware().calculate(&inputs.setup, inputs.tyres_for(tier)?),
            Tier::Complete => {
                let advanced = inputs.advanced.unwrap_or_default();
                self.complete().calculate(&inputs.setup, inputs.tyres_for(tier)?, &advanced)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::error::ErrorKind;
    use crate::model::*;
    use crate::reference::DEFAULT_COMPOUND_ID;
    use crate::setup::tests::example_setup;

    pub(crate) fn assert_results_match(a: &BalanceResult, b: &BalanceResult, tolerance: f64) {
        let pairs = [
            (a.roll_stiffness().front, b.roll_stiffness().front),
            (a.roll_stiffness().rear, b.roll_stiffness().rear),
            (a.roll_stiffness().front_pct, b.roll_stiffness().front_pct),
            (a.lltd().front_pct, b.lltd().front_pct),
            (a.slip_angle().front.slip_angle, b.slip_angle().front.slip_angle),
            (a.slip_angle().rear.slip_angle, b.slip_angle().rear.slip_angle),
            (a.slip_angle().balance, b.slip_angle().balance),
            (a.slip_angle().lateral_g, b.slip_angle().lateral_g),
            (a.tendency_index(), b.tendency_index()),
        ];
        for (left, right) in pairs {
            assert!((left - right).abs() <= tolerance, "{} != {}", left, right);
        }
    }

    fn setups() -> Vec<VehicleSetup> {
        let base = example_setup();
        let mut stiff_front = base;
        stiff_front.front.arb_stiffness = 400_000.0;
        let mut stiff_rear = base;
        stiff_rear.rear.arb_stiffness = 500_000.0;
        stiff_rear.cg_height = 550.0;
        let mut narrow_rear = base;
        narrow_rear.rear.track_width = 1350.0;
        narrow_rear.front.spring_rate = 0.0;
        narrow_rear.front.arb_stiffness = 150_000.0;
        let mut presets: Vec<VehicleSetup> = ReferenceData::builtin().presets().map(|p| p.setup).collect();
        presets.extend([base, stiff_front, stiff_rear, narrow_rear]);
        presets
    }

    #[test]
    fn neutral_tyres_reproduce_basic_tier() {
        let model = BalanceModel::new(ReferenceData::builtin());
        for setup in setups() {
            let basic = model.basic().calculate(&setup).unwrap();
            for compound in ReferenceData::builtin().compounds() {
                let tyre_aware = model.tyre_aware().calculate(&setup, &compound.neutral_tyres()).unwrap();
                assert_eq!(tyre_aware.tier(), Tier::TyreAware);
                assert_results_match(&basic, &tyre_aware, 1e-6);
            }
        }
    }

    #[test]
    fn default_advanced_params_reproduce_tyre_aware_tier() {
        let model = BalanceModel::new(ReferenceData::builtin());
        let tyres = TireParams::uniform("sport", 70.0, 2.3, 2.1, 2.0);
        let neutral_dampers = AdvancedParams { front_damper_ratio: Some(0.7), rear_damper_ratio: Some(0.7), ..Default::default() };
        for setup in setups() {
            let tyre_aware = model.tyre_aware().calculate(&setup, &tyres).unwrap();
            for advanced in [AdvancedParams::default(), neutral_dampers] {
                let complete = model.complete().calculate(&setup, &tyres, &advanced).unwrap();
                assert_eq!(complete.tier(), Tier::Complete);
                assert_results_match(&tyre_aware, &complete, 0.0);
            }
        }
    }

    #[test]
    fn tendency_index_saturates() {
        assert_eq!(tendency_index(0.1), 0.5);
        assert_eq!(tendency_index(100.0), MAX_TENDENCY_INDEX);
        assert_eq!(tendency_index(-100.0), -MAX_TENDENCY_INDEX);
        assert_eq!(HandlingTendency::from_index(0.5), HandlingTendency::Neutral);
        assert_eq!(HandlingTendency::from_index(0.6), HandlingTendency::Understeer);
        assert_eq!(HandlingTendency::from_index(-4.0), HandlingTendency::Oversteer);
    }

    #[test]
    fn stiffer_front_bar_pushes_towards_understeer() {
        let model = BalanceModel::new(ReferenceData::builtin());
        let mut setup = example_setup();
        let soft = model.basic().calculate(&setup).unwrap();
        setup.front.arb_stiffness = 400_000.0;
        let stiff = model.basic().calculate(&setup).unwrap();
        assert!(stiff.lltd().front_pct > soft.lltd().front_pct);
        assert!(stiff.slip_angle().balance > soft.slip_angle().balance);
        assert!(stiff.tendency_index() >= soft.tendency_index());
    }

    #[test]
    fn dispatch_checks_input_shape() {
        let model = BalanceModel::new(ReferenceData::builtin());
        let inputs = CalculationInputs::new(example_setup());
        assert!(model.calculate(Tier::Basic, &inputs).is_ok());
        assert_eq!(model.calculate(Tier::TyreAware, &inputs).unwrap_err().kind(), ErrorKind::Validation);
        assert!(model.calculate(Tier::Complete, &inputs).is_err());
        let inputs = inputs.with_tyres(TireParams::uniform(DEFAULT_COMPOUND_ID, 75.0, 2.2, 2.2, 2.2));
        assert!(model.calculate(Tier::Complete, &inputs).is_ok());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ModelConfig { reference_lateral_g: 0.0, ..Default::default() };
        assert!(BalanceModel::with_config(ReferenceData::builtin(), config).is_err());
    }

    #[test]
    fn invalid_setup_never_yields_a_result() {
        let model = BalanceModel::new(ReferenceData::builtin());
        let mut setup = example_setup();
        setup.total_mass = -1.0;
        assert_eq!(model.basic().calculate(&setup).unwrap_err().kind(), ErrorKind::Validation);
        let mut setup = example_setup();
        setup.front.spring_rate = 0.0;
        setup.rear.spring_rate = 0.0;
        assert_eq!(model.basic().calculate(&setup).unwrap_err().kind(), ErrorKind::DegenerateSetup);
    }
}
