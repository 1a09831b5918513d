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

//! Read only compound and car preset tables.
//!
//! The built-in tables are assembled once per process and never mutated afterwards so they can
//! be shared freely between threads. Extra tables can be loaded from TOML and merged over the
//! built-in ones; the merge produces a new value rather than touching the shared one.

use std::collections::BTreeMap;
use std::sync::OnceLock;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use crate::error::{require_positive, BalanceError, Result};
use crate::setup::{AdvancedParams, AxleSetup, AxleTyreState, CornerWeights, TireParams, VehicleSetup};

/// Compound assumed when no tyre data is supplied, or when a compound id can't be resolved
pub const DEFAULT_COMPOUND_ID: &str = "street";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundRecord {
    pub id: String,
    pub name: String,
    /// Friction coefficient at optimal temperature and pressure
    pub peak_grip: f64,
    /// °C
    pub optimal_temperature: f64,
    /// Half width of the working temperature window (°C)
    pub temperature_window: f64,
    /// bar
    pub optimal_pressure_front: f64,
    pub optimal_pressure_rear: f64
}

impl CompoundRecord {
    fn new(id: &str, name: &str, peak_grip: f64, optimal_temperature: f64, temperature_window: f64,
           optimal_pressure_front: f64, optimal_pressure_rear: f64) -> CompoundRecord {
        CompoundRecord {
            id: id.to_string(),
            name: name.to_string(),
            peak_grip,
            optimal_temperature,
            temperature_window,
            optimal_pressure_front,
            optimal_pressure_rear
        }
    }

    fn validate(&self) -> Result<()> {
        let field = |name: &str| format!("compound `{}` {}", self.id, name);
        require_positive(&field("peak_grip"), self.peak_grip)?;
        if !self.optimal_temperature.is_finite() {
            return Err(BalanceError::validation(&field("optimal_temperature"), "is not a finite number"));
        }
        require_positive(&field("temperature_window"), self.temperature_window)?;
        require_positive(&field("optimal_pressure_front"), self.optimal_pressure_front)?;
        require_positive(&field("optimal_pressure_rear"), self.optimal_pressure_rear)?;
        Ok(())
    }

    /// Tyre state where this compound delivers its peak grip on both axles
    pub fn neutral_tyres(&self) -> TireParams {
        let at_optimum = |pressure: f64| AxleTyreState {
            temperature: self.optimal_temperature,
            pressure,
            optimal_pressure: pressure
        };
        TireParams {
            compound: self.id.clone(),
            front: at_optimum(self.optimal_pressure_front),
            rear: at_optimum(self.optimal_pressure_rear)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetRecord {
    pub id: String,
    pub name: String,
    pub compound: String,
    pub setup: VehicleSetup,
    #[serde(default)]
    pub advanced: Option<AdvancedParams>
}

impl PresetRecord {
    /// Checks the setup and advanced parameters, and that the compound resolves in `compounds`
    /// or in the built-in tables
    fn validate(&self, compounds: &ReferenceData) -> Result<()> {
        self.setup.validate()?;
        if let Some(advanced) = &self.advanced {
            advanced.validate()?;
        }
        if compounds.resolve_compound(&self.compound).is_err() {
            ReferenceData::builtin().resolve_compound(&self.compound)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct ReferenceTables {
    #[serde(default)]
    compounds: Vec<CompoundRecord>,
    #[serde(default)]
    presets: Vec<PresetRecord>
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    compounds: BTreeMap<String, CompoundRecord>,
    presets: BTreeMap<String, PresetRecord>
}

impl ReferenceData {
    pub fn builtin() -> &'static ReferenceData {
        static BUILTIN: OnceLock<ReferenceData> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            let data = ReferenceData::from_records(builtin_compounds(), builtin_presets());
            info!("Built-in reference data loaded: {} compounds, {} presets",
                  data.compounds.len(), data.presets.len());
            data
        })
    }

    fn from_records(compounds: Vec<CompoundRecord>, presets: Vec<PresetRecord>) -> ReferenceData {
        ReferenceData {
            compounds: compounds.into_iter().map(|c| (c.id.clone(), c)).collect(),
            presets: presets.into_iter().map(|p| (p.id.clone(), p)).collect()
        }
    }

    /// Parses `[[compounds]]` and `[[presets]]` tables. Every record is validated
    pub fn from_toml_str(data: &str) -> Result<ReferenceData> {
        let tables: ReferenceTables = toml::from_str(data).map_err(|e| {
            BalanceError::ReferenceData(e.to_string())
        })?;
        for compound in &tables.compounds {
            compound.validate().map_err(|e| BalanceError::ReferenceData(e.to_string()))?;
        }
        let data = ReferenceData::from_records(tables.compounds, tables.presets);
        for preset in data.presets.values() {
            preset.validate(&data).map_err(|e| {
                BalanceError::ReferenceData(format!("preset `{}`. {}", preset.id, e))
            })?;
        }
        Ok(data)
    }

    /// New table set holding every record of `self` with `other` layered on top
    pub fn merged_with(&self, other: &ReferenceData) -> ReferenceData {
        let mut merged = self.clone();
        for (id, compound) in &other.compounds {
            if merged.compounds.insert(id.clone(), compound.clone()).is_some() {
                info!("Compound {} overridden by user reference data", id);
            }
        }
        for (id, preset) in &other.presets {
            if merged.presets.insert(id.clone(), preset.clone()).is_some() {
                info!("Preset {} overridden by user reference data", id);
            }
        }
        merged
    }

    pub fn resolve_compound(&self, id: &str) -> Result<&CompoundRecord> {
        self.compounds.get(id).ok_or_else(|| BalanceError::UnknownCompound(id.to_string()))
    }

    /// Resolves `id`, substituting the default compound when it isn't known
    pub fn resolve_compound_or_default(&self, id: &str) -> Result<&CompoundRecord> {
        match self.resolve_compound(id) {
            Ok(compound) => Ok(compound),
            Err(e) => {
                warn!("{}. Falling back to the {} compound", e, DEFAULT_COMPOUND_ID);
                self.default_compound()
            }
        }
    }

    pub fn default_compound(&self) -> Result<&CompoundRecord> {
        match self.compounds.get(DEFAULT_COMPOUND_ID) {
            Some(compound) => Ok(compound),
            None => ReferenceData::builtin().resolve_compound(DEFAULT_COMPOUND_ID)
        }
    }

    pub fn resolve_car_preset(&self, id: &str) -> Result<&PresetRecord> {
        self.presets.get(id).ok_or_else(|| BalanceError::UnknownPreset(id.to_string()))
    }

    pub fn compounds(&self) -> impl Iterator<Item = &CompoundRecord> {
        self.compounds.values()
    }

    pub fn presets(&self) -> impl Iterator<Item = &PresetRecord> {
        self.presets.values()
    }
}

fn builtin_compounds() -> Vec<CompoundRecord> {
    vec![
        CompoundRecord::new(DEFAULT_COMPOUND_ID, "Street", 1.0, 75.0, 30.0, 2.2, 2.2),
        CompoundRecord::new("sport", "Sport", 1.1, 85.0, 25.0, 2.1, 2.1),
        CompoundRecord::new("semi_slick", "Semi slick", 1.25, 90.0, 20.0, 1.9, 1.9),
        CompoundRecord::new("slick_soft", "Slick (soft)", 1.45, 95.0, 15.0, 1.8, 1.75),
        CompoundRecord::new("slick_hard", "Slick (hard)", 1.38, 105.0, 20.0, 1.8, 1.75),
        CompoundRecord::new("wet", "Wet", 1.05, 50.0, 25.0, 2.0, 2.0),
    ]
}

fn preset(id: &str, name: &str, compound: &str, setup: VehicleSetup, advanced: Option<AdvancedParams>) -> PresetRecord {
    PresetRecord { id: id.to_string(), name: name.to_string(), compound: compound.to_string(), setup, advanced }
}

fn axle(spring_rate: f64, motion_ratio: f64, arb_stiffness: f64, track_width: f64) -> AxleSetup {
    AxleSetup { spring_rate, motion_ratio, arb_stiffness, track_width }
}

fn builtin_presets() -> Vec<PresetRecord> {
    vec![
        preset("mx5_nd", "Mazda MX-5 (ND)", DEFAULT_COMPOUND_ID, VehicleSetup {
            total_mass: 1060.0,
            corner_weights: CornerWeights::new(283.0, 277.0, 252.0, 248.0),
            front: axle(30.0, 0.65, 250_000.0, 1495.0),
            rear: axle(20.0, 0.72, 60_000.0, 1505.0),
            cg_height: 470.0,
            wheelbase: 2310.0
        }, None),
        preset("gt86", "Toyota GT86", "sport", VehicleSetup {
            total_mass: 1240.0,
            corner_weights: CornerWeights::new(335.0, 330.0, 290.0, 285.0),
            front: axle(40.0, 0.7, 220_000.0, 1520.0),
            rear: axle(38.0, 0.75, 120_000.0, 1540.0),
            cg_height: 460.0,
            wheelbase: 2570.0
        }, None),
        preset("e46_m3", "BMW M3 (E46)", "sport", VehicleSetup {
            total_mass: 1570.0,
            corner_weights: CornerWeights::new(400.0, 395.0, 390.0, 385.0),
            front: axle(45.0, 0.9, 300_000.0, 1508.0),
            rear: axle(70.0, 0.6, 150_000.0, 1525.0),
            cg_height: 500.0,
            wheelbase: 2730.0
        }, None),
        preset("gt3_generic", "Generic GT3", "slick_soft", VehicleSetup {
            total_mass: 1300.0,
            corner_weights: CornerWeights::new(300.0, 295.0, 355.0, 350.0),
            front: axle(180.0, 0.9, 600_000.0, 1650.0),
            rear: axle(160.0, 0.85, 300_000.0, 1620.0),
            cg_height: 380.0,
            wheelbase: 2700.0
        }, Some(AdvancedParams {
            front_damper_ratio: Some(0.8),
            rear_damper_ratio: Some(0.8),
            front_downforce: Some(3000.0),
            rear_downforce: Some(4200.0),
            reference_speed: Some(200.0),
            ..Default::default()
        })),
    ]
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::reference::{ReferenceData, DEFAULT_COMPOUND_ID};

    #[test]
    fn builtin_tables_are_valid() {
        let data = ReferenceData::builtin();
        for compound in data.compounds() {
            compound.validate().unwrap();
        }
        for preset in data.presets() {
            preset.validate(data).unwrap();
            data.resolve_compound(&preset.compound).unwrap();
        }
    }

    #[test]
    fn unknown_keys_are_errors() {
        let data = ReferenceData::builtin();
        assert_eq!(data.resolve_compound("r888").unwrap_err().kind(), ErrorKind::UnknownCompound);
        assert_eq!(data.resolve_car_preset("nope").unwrap_err().kind(), ErrorKind::UnknownPreset);
    }

    #[test]
    fn unknown_compound_can_fall_back() {
        let data = ReferenceData::builtin();
        assert_eq!(data.resolve_compound_or_default("r888").unwrap().id, DEFAULT_COMPOUND_ID);
        assert_eq!(data.resolve_compound_or_default("wet").unwrap().id, "wet");
    }

    #[test]
    fn neutral_tyres_sit_at_the_optimum() {
        let compound = ReferenceData::builtin().resolve_compound("slick_soft").unwrap();
        let tyres = compound.neutral_tyres();
        assert_eq!(tyres.front.temperature, compound.optimal_temperature);
        assert_eq!(tyres.front.pressure, compound.optimal_pressure_front);
        assert_eq!(tyres.rear.pressure, compound.optimal_pressure_rear);
        assert_eq!(tyres.rear.optimal_pressure, compound.optimal_pressure_rear);
    }

    #[test]
    fn user_tables_merge_over_builtin() {
        let user = ReferenceData::from_toml_str(r#"
            [[compounds]]
            id = "street"
            name = "Street (worn)"
            peak_grip = 0.9
            optimal_temperature = 70.0
            temperature_window = 30.0
            optimal_pressure_front = 2.3
            optimal_pressure_rear = 2.3

            [[compounds]]
            id = "r888"
            name = "R888R"
            peak_grip = 1.2
            optimal_temperature = 80.0
            temperature_window = 25.0
            optimal_pressure_front = 2.0
            optimal_pressure_rear = 2.0
        "#).unwrap();
        let merged = ReferenceData::builtin().merged_with(&user);
        assert_eq!(merged.resolve_compound("r888").unwrap().peak_grip, 1.2);
        assert_eq!(merged.resolve_compound(DEFAULT_COMPOUND_ID).unwrap().peak_grip, 0.9);
        assert!(merged.resolve_car_preset("gt86").is_ok());
        assert_eq!(ReferenceData::builtin().resolve_compound(DEFAULT_COMPOUND_ID).unwrap().peak_grip, 1.0);
    }

    #[test]
    fn malformed_user_tables_are_rejected() {
        let err = ReferenceData::from_toml_str("[[compounds]]\nid = 3").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReferenceData);

        let err = ReferenceData::from_toml_str(r#"
            [[compounds]]
            id = "bad"
            name = "Bad"
            peak_grip = 0.0
            optimal_temperature = 70.0
            temperature_window = 30.0
            optimal_pressure_front = 2.3
            optimal_pressure_rear = 2.3
        "#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReferenceData);
    }

    fn user_preset(compound: &str, front_damper_ratio: f64) -> String {
        format!(r#"
            [[compounds]]
            id = "r888"
            name = "R888R"
            peak_grip = 1.2
            optimal_temperature = 80.0
            temperature_window = 25.0
            optimal_pressure_front = 2.0
            optimal_pressure_rear = 2.0

            [[presets]]
            id = "track_day"
            name = "Track day"
            compound = "{}"
            [presets.setup]
            total_mass = 1445.0
            cg_height = 480.0
            wheelbase = 2600.0
            [presets.setup.corner_weights]
            fl = 380.0
            fr = 370.0
            rl = 350.0
            rr = 345.0
            [presets.setup.front]
            spring_rate = 35.0
            motion_ratio = 0.75
            track_width = 1500.0
            [presets.setup.rear]
            spring_rate = 40.0
            motion_ratio = 0.8
            track_width = 1480.0
            [presets.advanced]
            front_damper_ratio = {:.1}
        "#, compound, front_damper_ratio)
    }

    #[test]
    fn user_presets_are_fully_validated() {
        assert!(ReferenceData::from_toml_str(&user_preset("r888", 1.1)).is_ok());
        assert!(ReferenceData::from_toml_str(&user_preset("sport", 1.1)).is_ok());

        let err = ReferenceData::from_toml_str(&user_preset("a048", 1.1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReferenceData);
        assert!(err.to_string().contains("track_day"));

        let err = ReferenceData::from_toml_str(&user_preset("r888", -1.0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReferenceData);
        assert!(err.to_string().contains("front_damper_ratio"));
    }
}
