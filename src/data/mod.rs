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


use std::fs;
use std::fs::create_dir_all;
use std::path::{Path, PathBuf};
use directories::BaseDirs;
use serde::Deserialize;
use tracing::{info, warn};
use chassis::model::CalculationInputs;
use chassis::{AdvancedParams, ReferenceData, TireParams, VehicleSetup};
use utils::filesystem::{file_label, get_filetypes_in_path};
use crate::error::{AppError, Result};
use crate::settings::Settings;

pub const LOCAL_DATA_DIRNAME: &str = "setup-balance";
pub const INPUT_FILE_TYPE: &str = "toml";

pub fn get_local_app_data_path() -> PathBuf {
    let mut local_data_root: PathBuf = match BaseDirs::new() {
        None => PathBuf::from("."),
        Some(basedirs) => { basedirs.data_local_dir().to_path_buf() }
    };
    local_data_root.push(LOCAL_DATA_DIRNAME);
    local_data_root
}

pub fn create_local_data_dir_if_missing() -> Option<PathBuf> {
    let local_data_path = get_local_app_data_path();
    if local_data_path.is_dir() {
        return Some(local_data_path);
    }
    match create_dir_all(&local_data_path) {
        Ok(_) => {
            info!("Created local data dir {}", local_data_path.display());
            Some(local_data_path)
        }
        Err(e) => {
            eprintln!("Failed to create local data dir {}. {}", local_data_path.display(), e.to_string());
            None
        }
    }
}

/// Built-in tables with the user's reference data file, if any, layered on top
pub fn load_reference_data(settings: &Settings) -> Result<ReferenceData> {
    let Some(path) = settings.reference_data_path() else {
        return Ok(ReferenceData::builtin().clone());
    };
    let data = fs::read_to_string(&path).map_err(|e| AppError::io(&path, e))?;
    let user_data = ReferenceData::from_toml_str(&data)?;
    info!("Loaded user reference data from {}", path.display());
    Ok(ReferenceData::builtin().merged_with(&user_data))
}

/// A setup file. Either carries a full `[setup]` table or names a `preset` to start from;
/// tyre and advanced tables are optional and override whatever the preset supplies.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputFile {
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default)]
    pub setup: Option<VehicleSetup>,
    #[serde(default)]
    pub tyres: Option<TireParams>,
    #[serde(default)]
    pub advanced: Option<AdvancedParams>
}

impl InputFile {
    pub fn from_toml_str(data: &str) -> std::result::Result<InputFile, toml::de::Error> {
        toml::from_str(data)
    }

    pub fn from_preset(id: &str) -> InputFile {
        InputFile { preset: Some(id.to_string()), ..Default::default() }
    }

    pub fn resolve(self, reference: &ReferenceData) -> Result<CalculationInputs> {
        let preset = match &self.preset {
            Some(id) => Some(reference.resolve_car_preset(id)?),
            None => None
        };
        let setup = match (self.setup, preset) {
            (Some(setup), _) => setup,
            (None, Some(preset)) => preset.setup,
            (None, None) => {
                return Err(AppError::Input("input needs either a [setup] table or a preset".to_string()))
            }
        };
        let mut inputs = CalculationInputs::new(setup);
        inputs.tyres = self.tyres.or_else(|| {
            let preset = preset?;
            let compound = reference.resolve_compound_or_default(&preset.compound).ok()?;
            Some(compound.neutral_tyres())
        });
        inputs.advanced = self.advanced.or_else(|| preset.and_then(|p| p.advanced));
        Ok(inputs)
    }
}

pub fn load_inputs(path: &Path, reference: &ReferenceData) -> Result<CalculationInputs> {
    let data = fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
    let input = InputFile::from_toml_str(&data).map_err(|e| AppError::toml_decode(path, e))?;
    info!("Loaded inputs from {}", path.display());
    input.resolve(reference)
}

/// Every setup file in `dir`, labelled by file stem. Files that fail to load are skipped
pub fn load_inputs_in_dir(dir: &Path, reference: &ReferenceData) -> Result<Vec<(String, CalculationInputs)>> {
    let paths = get_filetypes_in_path(dir, INPUT_FILE_TYPE).map_err(|e| AppError::io(dir, e))?;
    let mut candidates = Vec::new();
    for path in paths {
        match load_inputs(&path, reference) {
            Ok(inputs) => candidates.push((file_label(&path), inputs)),
            Err(e) => warn!("Skipping {}. {}", path.display(), e.to_string())
        }
    }
    info!("Loaded {} candidate setups from {}", candidates.len(), dir.display());
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use chassis::ReferenceData;
    use crate::data::InputFile;
    use crate::error::AppError;

    const FULL_INPUT: &str = r#"
[setup]
total_mass = 1445.0
cg_height = 480.0
wheelbase = 2600.0
corner_weights = { fl = 380.0, fr = 370.0, rl = 350.0, rr = 345.0 }
front = { spring_rate = 35.0, motion_ratio = 0.75, track_width = 1500.0 }
rear = { spring_rate = 40.0, motion_ratio = 0.8, arb_stiffness = 120000.0, track_width = 1480.0 }

[tyres]
compound = "sport"
front = { temperature = 80.0, pressure = 2.0, optimal_pressure = 2.1 }
rear = { temperature = 85.0, pressure = 2.1, optimal_pressure = 2.1 }
"#;

    #[test]
    fn full_input_file_resolves() {
        let input = InputFile::from_toml_str(FULL_INPUT).unwrap();
        let inputs = input.resolve(ReferenceData::builtin()).unwrap();
        assert_eq!(inputs.setup.front.arb_stiffness, 0.0);
        assert_eq!(inputs.setup.rear.arb_stiffness, 120000.0);
        assert_eq!(inputs.tyres.unwrap().compound, "sport");
        assert!(inputs.advanced.is_none());
    }

    #[test]
    fn preset_supplies_missing_tables() {
        let inputs = InputFile::from_preset("gt3_generic").resolve(ReferenceData::builtin()).unwrap();
        let tyres = inputs.tyres.unwrap();
        let compound = ReferenceData::builtin().resolve_compound(&tyres.compound).unwrap();
        assert_eq!(tyres, compound.neutral_tyres());
        assert!(inputs.advanced.is_some());
    }

    #[test]
    fn input_without_setup_is_rejected() {
        let input = InputFile::from_toml_str("[tyres]\ncompound = \"sport\"\nfront = { temperature = 80.0, pressure = 2.0, optimal_pressure = 2.1 }\nrear = { temperature = 80.0, pressure = 2.0, optimal_pressure = 2.1 }\n").unwrap();
        assert!(matches!(input.resolve(ReferenceData::builtin()), Err(AppError::Input(_))));
        assert!(matches!(InputFile::from_preset("nope").resolve(ReferenceData::builtin()), Err(AppError::Balance(_))));
        assert!(InputFile::from_toml_str("colour = \"red\"").is_err());
    }
}
