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

pub const GRAVITY: f64 = 9.80665; // m/s^2

const PSI_PER_BAR: f64 = 14.503_773_8;

pub fn bar_to_psi(bar: f64) -> f64 {
    bar * PSI_PER_BAR
}

pub fn psi_to_bar(psi: f64) -> f64 {
    psi / PSI_PER_BAR
}

pub fn bar_to_kpa(bar: f64) -> f64 {
    bar * 100.0
}

pub fn kmh_to_ms(speed_kmh: f64) -> f64 {
    speed_kmh / 3.6
}

/// Weight force in N of a mass in kg
pub fn kg_to_newtons(mass_kg: f64) -> f64 {
    mass_kg * GRAVITY
}

/// Roll stiffness in N·mm/deg produced by a pair of wheel springs of `wheel_rate` (N/mm)
/// spaced `track_width` (mm) apart.
pub fn wheel_rate_to_roll_stiffness(wheel_rate: f64, track_width: f64) -> f64 {
    wheel_rate * track_width.powi(2) / 2.0 * std::f64::consts::PI / 180.0
}

/// Inverse of [wheel_rate_to_roll_stiffness]
pub fn roll_stiffness_to_wheel_rate(roll_stiffness: f64, track_width: f64) -> f64 {
    roll_stiffness * 2.0 * 180.0 / (std::f64::consts::PI * track_width.powi(2))
}
