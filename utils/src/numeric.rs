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

pub fn round_float_to(float: f64, decimal_places: u32) -> f64 {
    let precision_base: u64 = 10;
    let precision_factor = precision_base.pow(decimal_places) as f64;
    (float * precision_factor).round() / precision_factor
}

/// `part` as a percentage of `whole`. Returns 0 when `whole` is zero
pub fn percentage_of(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    part / whole * 100.0
}

pub fn is_valid_percentage(val: f64) -> bool {
    val.is_finite() && (0.0..=100.0).contains(&val)
}

/// True when `a` and `b` differ by no more than `tolerance`
pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

#[cfg(test)]
mod tests {
    use crate::numeric::{approx_eq, is_valid_percentage, percentage_of, round_float_to};

    #[test]
    fn round_to_tests() {
        assert_eq!(round_float_to(51.903114, 1), 51.9);
        assert_eq!(round_float_to(50.17301, 1), 50.2);
        assert_eq!(round_float_to(-0.25, 1), -0.3);
        assert_eq!(round_float_to(1.23456, 3), 1.235);
        assert_eq!(round_float_to(7.0, 0), 7.0);
    }

    #[test]
    fn percentage_tests() {
        assert_eq!(percentage_of(1.0, 4.0), 25.0);
        assert_eq!(percentage_of(3.0, 0.0), 0.0);
    }

    #[test]
    fn valid_percentage_tests()  {
        assert_eq!(is_valid_percentage(-0.1), false);
        assert_eq!(is_valid_percentage(0.0), true);
        assert_eq!(is_valid_percentage(55.5), true);
        assert_eq!(is_valid_percentage(100.0), true);
        assert_eq!(is_valid_percentage(100.01), false);
        assert_eq!(is_valid_percentage(f64::NAN), false);
        assert_eq!(is_valid_percentage(f64::INFINITY), false);
    }

    #[test]
    fn approx_tests() {
        assert!(approx_eq(1.0, 1.0 + 1e-10, 1e-9));
        assert!(!approx_eq(1.0, 1.1, 1e-3));
    }
}
