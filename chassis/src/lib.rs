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


pub mod error;
pub mod setup;
pub mod reference;
pub mod tyre;
pub mod rates;
pub mod model;
pub mod compare;
pub mod advisor;

pub use error::{BalanceError, ErrorKind, Result};
pub use model::{BalanceModel, BalanceResult, CalculationInputs, ModelConfig, Tier};
pub use reference::ReferenceData;
pub use setup::{AdvancedParams, TireParams, VehicleSetup};
