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


//! Plain text rendering of results for the terminal.

use std::fmt::Write;
use itertools::Itertools;
use serde::Serialize;
use chassis::advisor::Suggestion;
use chassis::compare::{BalanceDelta, RankedCandidate};
use chassis::rates::{ArbSizing, SpringTable};
use chassis::reference::ReferenceData;
use chassis::setup::{Axle, WeightDistribution};
use chassis::tyre::TyreSize;
use chassis::BalanceResult;
use utils::units::bar_to_psi;
use crate::error::Result;

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn balance_result(result: &BalanceResult) -> String {
    let mut out = String::new();
    let roll = result.roll_stiffness();
    let slip = result.slip_angle();
    let _ = writeln!(out, "Tier:                 {}", result.tier());
    let _ = writeln!(out, "Roll stiffness:       {:.0} / {:.0} N.mm/deg ({:.1}% front)", roll.front, roll.rear, roll.front_pct);
    let _ = writeln!(out, "LLTD:                 {:.1}% front", result.lltd().front_pct);
    let _ = writeln!(out, "Slip angles:          {:.2} / {:.2} deg at {:.2} g", slip.front.slip_angle, slip.rear.slip_angle, slip.lateral_g);
    let _ = writeln!(out, "Slip angle balance:   {:+.3} deg", slip.balance);
    let _ = writeln!(out, "Tendency:             {:+.2} ({})", result.tendency_index(), result.tendency());
    if result.relative_grip(Axle::Front) != 1.0 || result.relative_grip(Axle::Rear) != 1.0 {
        let _ = writeln!(out, "Available grip:       {:.1}% / {:.1}%",
                         result.relative_grip(Axle::Front) * 100.0, result.relative_grip(Axle::Rear) * 100.0);
    }
    if result.aero().total() > 0.0 {
        let _ = writeln!(out, "Downforce:            {:.0} / {:.0} N", result.aero().front, result.aero().rear);
    }
    if result.damper_correction() != 0.0 {
        let _ = writeln!(out, "Damper correction:    {:+.2}% front roll share", result.damper_correction());
    }
    for axle in [Axle::Front, Axle::Rear] {
        if result.slip_angle().axle(axle).inner_wheel_lifted {
            let _ = writeln!(out, "Warning: inner {} wheel lifts at this lateral acceleration", axle);
        }
    }
    out
}

pub fn balance_delta(delta: &BalanceDelta) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Tier:                 {}", delta.tier);
    let _ = writeln!(out, "Roll stiffness:       {:+.0} / {:+.0} N.mm/deg ({:+.2}% front)",
                     delta.front_roll_stiffness, delta.rear_roll_stiffness, delta.front_roll_stiffness_pct);
    let _ = writeln!(out, "LLTD:                 {:+.2}% front", delta.lltd_front_pct);
    let _ = writeln!(out, "Slip angles:          {:+.3} / {:+.3} deg", delta.front_slip_angle, delta.rear_slip_angle);
    let _ = writeln!(out, "Slip angle balance:   {:+.3} deg", delta.slip_balance);
    let _ = writeln!(out, "Tendency:             {:+.2} ({})", delta.tendency_index, delta.label);
    out
}

pub fn ranking(candidates: &[RankedCandidate]) -> String {
    candidates.iter().enumerate().map(|(position, candidate)| {
        format!("{:>3}. {:<24} index {:+.2} ({}), {:+.2} vs baseline ({})",
                position + 1, candidate.label, candidate.result.tendency_index(), candidate.result.tendency(),
                candidate.delta.tendency_index, candidate.delta.label)
    }).join("\n")
}

pub fn suggestions(suggestions: &[Suggestion]) -> String {
    if suggestions.is_empty() {
        return "No changes suggested".to_string();
    }
    suggestions.iter().enumerate().map(|(position, suggestion)| {
        let target = match suggestion.target {
            Some(target) => format!(" to {:.2} {}", target, suggestion.unit),
            None => String::new()
        };
        format!("{}. {} {} {} by {:.2} {}{}\n   {}",
                position + 1, suggestion.direction, suggestion.axle, suggestion.category,
                suggestion.delta.abs(), suggestion.unit, target, suggestion.rationale)
    }).join("\n")
}

pub fn weight_distribution(distribution: &WeightDistribution) -> String {
    format!("Total {:.1} kg\nFront {:.1}%  Rear {:.1}%\nLeft {:.1}%  Right {:.1}%\nCross (FL+RR) {:.1}%",
            distribution.total, distribution.front_pct, distribution.rear_pct,
            distribution.left_pct, distribution.right_pct, distribution.cross_pct)
}

pub fn spring_table(table: &SpringTable) -> String {
    let header = format!("{:>10} {:>12} {:>10}", "spring", "wheel rate", "freq (Hz)");
    std::iter::once(header).chain(table.iter().map(|row| {
        format!("{:>10.1} {:>12.1} {:>10.3}", row.spring_rate, row.wheel_rate, row.frequency)
    })).join("\n")
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TyreRateReport {
    pub size: TyreSize,
    pub pressure_bar: f64,
    pub pressure_psi: f64,
    /// mm
    pub overall_diameter: f64,
    /// N/mm
    pub spring_rate: f64
}

impl TyreRateReport {
    pub fn new(size: TyreSize, pressure_bar: f64, spring_rate: f64) -> TyreRateReport {
        TyreRateReport {
            size,
            pressure_bar,
            pressure_psi: bar_to_psi(pressure_bar),
            overall_diameter: size.overall_diameter(),
            spring_rate
        }
    }
}

pub fn tyre_rate(report: &TyreRateReport) -> String {
    format!("{:.0}/{:.0}R{:.0} at {:.2} bar ({:.1} psi): {:.1} N/mm
Overall diameter {:.0} mm",
            report.size.width, report.size.aspect_ratio, report.size.rim_diameter,
            report.pressure_bar, report.pressure_psi, report.spring_rate, report.overall_diameter)
}

pub fn arb_sizing(sizing: &ArbSizing) -> String {
    format!("{} bar: {:.0} N.mm/deg\nTotal roll stiffness needed: {:.0} N.mm/deg\n\
             Springs alone: {:.2} deg/g\nFront roll stiffness: {:.1}% ({:+.1} vs front weight)",
            sizing.axle, sizing.arb_stiffness, sizing.required_total_stiffness,
            sizing.spring_only_gradient, sizing.front_roll_stiffness_pct, sizing.distribution_offset)
}

pub fn reference_data(reference: &ReferenceData) -> String {
    let compounds = reference.compounds().map(|c| {
        format!("  {:<12} {:<28} peak {:.2}, {:.0} C +/- {:.0}, {:.2}/{:.2} bar",
                c.id, c.name, c.peak_grip, c.optimal_temperature, c.temperature_window,
                c.optimal_pressure_front, c.optimal_pressure_rear)
    }).join("\n");
    let presets = reference.presets().map(|p| {
        let distribution = p.setup.weight_distribution();
        format!("  {:<12} {:<28} {:.0} kg, {:.1}% front, {}", p.id, p.name, p.setup.total_mass,
                distribution.front_pct, p.compound)
    }).join("\n");
    format!("Compounds:\n{}\nPresets:\n{}", compounds, presets)
}

#[cfg(test)]
mod tests {
    use chassis::model::BalanceModel;
    use chassis::setup::CornerWeights;
    use chassis::ReferenceData;
    use crate::report::*;

    #[test]
    fn weight_report_uses_one_decimal() {
        let distribution = WeightDistribution::from_corners(&CornerWeights::new(380.0, 370.0, 350.0, 345.0));
        let text = weight_distribution(&distribution);
        assert!(text.contains("Front 51.9%"));
        assert!(text.contains("Cross (FL+RR) 50.2%"));
    }

    #[test]
    fn result_report_names_the_tendency() {
        let model = BalanceModel::new(ReferenceData::builtin());
        let preset = ReferenceData::builtin().resolve_car_preset("mx5_nd").unwrap();
        let result = model.basic().calculate(&preset.setup).unwrap();
        let text = balance_result(&result);
        assert!(text.contains("Tier:                 basic"));
        assert!(text.contains(result.tendency().as_str()));
        let json = to_json(&result).unwrap();
        assert!(json.contains("\"tier\": \"basic\""));
    }

    #[test]
    fn tyre_rate_report_shows_both_pressure_units() {
        let report = TyreRateReport::new(TyreSize::new(205.0, 55.0, 16.0), 2.0, 212.34);
        assert!((report.pressure_psi - 29.0075).abs() < 1e-3);
        assert!((report.overall_diameter - 631.9).abs() < 1e-9);
        let text = tyre_rate(&report);
        assert!(text.contains("205/55R16 at 2.00 bar (29.0 psi): 212.3 N/mm"));
        assert!(text.contains("Overall diameter 632 mm"));
        assert!(to_json(&report).unwrap().contains("\"pressure_psi\""));
    }

    #[test]
    fn empty_advice_says_so() {
        assert_eq!(suggestions(&[]), "No changes suggested");
    }

    #[test]
    fn reference_listing_includes_builtin_ids() {
        let text = reference_data(ReferenceData::builtin());
        assert!(text.contains("slick_soft"));
        assert!(text.contains("gt3_generic"));
    }
}
