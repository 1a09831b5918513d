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

use serde::{Deserialize, Serialize};
use utils::units::bar_to_kpa;
use crate::error::{require_positive, Result};

const INFLATION_STIFFNESS_COEFF: f64 = 0.04;
/// Sidewall/carcass contribution present even at zero pressure (N/mm)
const CARCASS_STIFFNESS: f64 = 30.0;
const MM_PER_INCH: f64 = 25.4;

/// Nominal tyre dimensions as produced by a size string parser, e.g. 225/45R17
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TyreSize {
    /// Section width (mm)
    pub width: f64,
    /// Sidewall height as a percentage of the width
    pub aspect_ratio: f64,
    /// Rim diameter (inches)
    pub rim_diameter: f64
}

impl TyreSize {
    pub fn new(width: f64, aspect_ratio: f64, rim_diameter: f64) -> TyreSize {
        TyreSize { width, aspect_ratio, rim_diameter }
    }

    pub fn validate(&self) -> Result<()> {
        require_positive("tyre width", self.width)?;
        require_positive("tyre aspect ratio", self.aspect_ratio)?;
        require_positive("rim diameter", self.rim_diameter)?;
        Ok(())
    }

    /// mm
    pub fn sidewall_height(&self) -> f64 {
        self.width * self.aspect_ratio / 100.0
    }

    /// mm
    pub fn overall_diameter(&self) -> f64 {
        self.rim_diameter * MM_PER_INCH + 2.0 * self.sidewall_height()
    }
}

/// Vertical spring rate (N/mm) of a tyre of `size` inflated to `pressure` bar.
///
/// Inflation pressure acting over the section width dominates; tall sidewalls soften it.
pub fn estimate_tyre_spring_rate(size: &TyreSize, pressure: f64) -> Result<f64> {
    size.validate()?;
    require_positive("tyre pressure", pressure)?;
    let inflation = INFLATION_STIFFNESS_COEFF * bar_to_kpa(pressure) * size.width / size.sidewall_height().sqrt();
    Ok(inflation + CARCASS_STIFFNESS)
}

#[cfg(test)]
mod tests {
    use crate::tyre::stiffness::{estimate_tyre_spring_rate, TyreSize};

    #[test]
    fn road_tyre_is_in_a_plausible_range() {
        let rate = estimate_tyre_spring_rate(&TyreSize::new(225.0, 45.0, 17.0), 2.2).unwrap();
        assert!(rate > 150.0 && rate < 300.0, "{}", rate);
    }

    #[test]
    fn stiffer_with_pressure_and_lower_profile() {
        let size = TyreSize::new(225.0, 45.0, 17.0);
        let low = estimate_tyre_spring_rate(&size, 1.8).unwrap();
        let high = estimate_tyre_spring_rate(&size, 2.4).unwrap();
        assert!(high > low);
        let low_profile = estimate_tyre_spring_rate(&TyreSize::new(225.0, 35.0, 18.0), 2.2).unwrap();
        let tall = estimate_tyre_spring_rate(&TyreSize::new(225.0, 60.0, 16.0), 2.2).unwrap();
        assert!(low_profile > tall);
    }

    #[test]
    fn dimensions() {
        let size = TyreSize::new(205.0, 55.0, 16.0);
        assert!((size.sidewall_height() - 112.75).abs() < 1e-9);
        assert!((size.overall_diameter() - 631.9).abs() < 1e-9);
        assert!(estimate_tyre_spring_rate(&TyreSize::new(0.0, 55.0, 16.0), 2.0).is_err());
    }
}
