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

//! Turns a balance result into ranked setup changes.
//!
//! Each rule looks at one metric of the result and may emit a single suggestion. Rules are
//! evaluated in a fixed order and the output is sorted by how far past its trigger threshold
//! each metric sits, largest first. Ties keep rule order so the same result always produces
//! the same list.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::debug;
use utils::units::roll_stiffness_to_wheel_rate;
use crate::error::Result;
use crate::model::{BalanceResult, CalculationInputs, Tier};
use crate::rates::spring_roll_stiffness;
use crate::setup::{Axle, TireParams, VehicleSetup};

pub const FRONT_ROLL_PCT_HIGH: f64 = 55.0;
pub const FRONT_ROLL_PCT_LOW: f64 = 45.0;
pub const TENDENCY_THRESHOLD: f64 = 1.0;
pub const LLTD_WEIGHT_GAP: f64 = 8.0;
pub const GRIP_ASYMMETRY_THRESHOLD: f64 = 0.03;
pub const CAMBER_INDEX_THRESHOLD: f64 = 5.0;
pub const CAMBER_STEP: f64 = 0.5;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionCategory {
    Spring,
    AntiRollBar,
    TyrePressure,
    Alignment
}

impl SuggestionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionCategory::Spring => "spring",
            SuggestionCategory::AntiRollBar => "anti-roll bar",
            SuggestionCategory::TyrePressure => "tyre pressure",
            SuggestionCategory::Alignment => "alignment"
        }
    }
}

impl Display for SuggestionCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Increase,
    Decrease
}

impl Direction {
    fn of(delta: f64) -> Direction {
        if delta < 0.0 { Direction::Decrease } else { Direction::Increase }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Increase => "increase",
            Direction::Decrease => "decrease"
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub rule: String,
    pub category: SuggestionCategory,
    pub direction: Direction,
    pub axle: Axle,
    /// Signed change to apply, in `unit`
    pub delta: f64,
    /// Value to set, when the rule can compute one
    pub target: Option<f64>,
    pub unit: String,
    /// Result field that fired the rule
    pub trigger: String,
    pub trigger_value: f64,
    /// Trigger metric relative to its threshold
    pub magnitude: f64,
    pub rationale: String
}

struct AdvisorContext<'a> {
    result: &'a BalanceResult,
    setup: &'a VehicleSetup,
    tyres: Option<&'a TireParams>
}

impl AdvisorContext<'_> {
    fn index(&self) -> f64 {
        self.result.tendency_index()
    }

    fn front_roll_pct(&self) -> f64 {
        self.result.roll_stiffness().front_pct
    }

    fn front_roll(&self) -> f64 {
        self.result.roll_stiffness().front
    }

    fn rear_roll(&self) -> f64 {
        self.result.roll_stiffness().rear
    }
}

type Rule = (&'static str, fn(&AdvisorContext) -> Option<Suggestion>);

const RULES: [Rule; 8] = [
    ("soften_front_bar", soften_front_bar),
    ("soften_rear_bar", soften_rear_bar),
    ("stiffen_rear_bar", stiffen_rear_bar),
    ("stiffen_front_bar", stiffen_front_bar),
    ("rebalance_springs", rebalance_springs),
    ("correct_tyre_pressure", correct_tyre_pressure),
    ("front_camber", front_camber),
    ("rear_camber", rear_camber),
];

/// Front axle roll stiffness that gives `front_pct` of the total against a fixed rear
fn front_roll_for_share(rear_roll: f64, front_pct: f64) -> f64 {
    rear_roll * front_pct / (100.0 - front_pct)
}

fn rear_roll_for_share(front_roll: f64, front_pct: f64) -> f64 {
    front_roll * (100.0 - front_pct) / front_pct
}

fn bar_suggestion(context: &AdvisorContext,
                  axle: Axle,
                  target_axle_roll: f64,
                  threshold: f64,
                  rationale: String) -> Option<Suggestion> {
    let current = context.setup.axle(axle).arb_stiffness;
    let target = (target_axle_roll - spring_roll_stiffness(context.setup.axle(axle))).max(0.0);
    let delta = target - current;
    if delta == 0.0 || !delta.is_finite() {
        return None;
    }
    Some(Suggestion {
        rule: String::new(),
        category: SuggestionCategory::AntiRollBar,
        direction: Direction::of(delta),
        axle,
        delta,
        target: Some(target),
        unit: "N.mm/deg".to_string(),
        trigger: "tendency_index".to_string(),
        trigger_value: context.index(),
        magnitude: context.index().abs() / threshold,
        rationale
    })
}

fn soften_front_bar(context: &AdvisorContext) -> Option<Suggestion> {
    if context.index() <= TENDENCY_THRESHOLD || context.front_roll_pct() <= FRONT_ROLL_PCT_HIGH {
        return None;
    }
    bar_suggestion(context, Axle::Front,
                   front_roll_for_share(context.rear_roll(), FRONT_ROLL_PCT_HIGH),
                   TENDENCY_THRESHOLD,
                   format!("Understeer (index {:.1}) with {:.1}% of roll stiffness at the front; \
                            a softer front bar moves load transfer rearwards",
                           context.index(), context.front_roll_pct()))
}

fn soften_rear_bar(context: &AdvisorContext) -> Option<Suggestion> {
    if context.index() >= -TENDENCY_THRESHOLD || context.front_roll_pct() >= FRONT_ROLL_PCT_LOW {
        return None;
    }
    bar_suggestion(context, Axle::Rear,
                   rear_roll_for_share(context.front_roll(), FRONT_ROLL_PCT_LOW),
                   TENDENCY_THRESHOLD,
                   format!("Oversteer (index {:.1}) with only {:.1}% of roll stiffness at the front; \
                            a softer rear bar moves load transfer forwards",
                           context.index(), context.front_roll_pct()))
}

fn stiffen_rear_bar(context: &AdvisorContext) -> Option<Suggestion> {
    if context.index() <= TENDENCY_THRESHOLD || context.front_roll_pct() > FRONT_ROLL_PCT_HIGH {
        return None;
    }
    // one point of front roll share per point of index
    let target_pct = (context.front_roll_pct() - context.index()).max(1.0);
    bar_suggestion(context, Axle::Rear,
                   rear_roll_for_share(context.front_roll(), target_pct),
                   TENDENCY_THRESHOLD,
                   format!("Understeer (index {:.1}); a stiffer rear bar takes front roll share from {:.1}% to {:.1}%",
                           context.index(), context.front_roll_pct(), target_pct))
}

fn stiffen_front_bar(context: &AdvisorContext) -> Option<Suggestion> {
    if context.index() >= -TENDENCY_THRESHOLD || context.front_roll_pct() < FRONT_ROLL_PCT_LOW {
        return None;
    }
    let target_pct = (context.front_roll_pct() - context.index()).min(99.0);
    bar_suggestion(context, Axle::Front,
                   front_roll_for_share(context.rear_roll(), target_pct),
                   TENDENCY_THRESHOLD,
                   format!("Oversteer (index {:.1}); a stiffer front bar takes front roll share from {:.1}% to {:.1}%",
                           context.index(), context.front_roll_pct(), target_pct))
}

fn rebalance_springs(context: &AdvisorContext) -> Option<Suggestion> {
    let front_weight_pct = context.setup.weight_distribution().front_pct;
    let gap = context.result.lltd().front_pct - front_weight_pct;
    if context.index().abs() >= TENDENCY_THRESHOLD || gap.abs() <= LLTD_WEIGHT_GAP {
        return None;
    }
    let target_pct = (context.front_roll_pct() - gap).clamp(1.0, 99.0);
    let front = &context.setup.front;
    let target_spring_roll = front_roll_for_share(context.rear_roll(), target_pct) - front.arb_stiffness;
    if !(target_spring_roll > 0.0) {
        return None;
    }
    let target = roll_stiffness_to_wheel_rate(target_spring_roll, front.track_width) / front.motion_ratio.powi(2);
    let delta = target - front.spring_rate;
    Some(Suggestion {
        rule: String::new(),
        category: SuggestionCategory::Spring,
        direction: Direction::of(delta),
        axle: Axle::Front,
        delta,
        target: Some(target),
        unit: "N/mm".to_string(),
        trigger: "lltd.front_pct".to_string(),
        trigger_value: context.result.lltd().front_pct,
        magnitude: gap.abs() / LLTD_WEIGHT_GAP,
        rationale: format!("Balance is close to neutral but front load transfer ({:.1}%) is {:.1} points from the \
                            front weight ({:.1}%); match the springs to the weight before adjusting the bars",
                           context.result.lltd().front_pct, gap.abs(), front_weight_pct)
    })
}

fn correct_tyre_pressure(context: &AdvisorContext) -> Option<Suggestion> {
    if context.result.tier() == Tier::Basic {
        return None;
    }
    let tyres = context.tyres?;
    let front_grip = context.result.relative_grip(Axle::Front);
    let rear_grip = context.result.relative_grip(Axle::Rear);
    let asymmetry = front_grip - rear_grip;
    if asymmetry.abs() <= GRIP_ASYMMETRY_THRESHOLD {
        return None;
    }
    let axle = if asymmetry < 0.0 { Axle::Front } else { Axle::Rear };
    let state = tyres.axle(axle);
    let delta = state.optimal_pressure - state.pressure;
    if delta == 0.0 {
        return None;
    }
    Some(Suggestion {
        rule: String::new(),
        category: SuggestionCategory::TyrePressure,
        direction: Direction::of(delta),
        axle,
        delta,
        target: Some(state.optimal_pressure),
        unit: "bar".to_string(),
        trigger: format!("{}_relative_grip", axle),
        trigger_value: context.result.relative_grip(axle),
        magnitude: asymmetry.abs() / GRIP_ASYMMETRY_THRESHOLD,
        rationale: format!("The {} tyres have {:.1}% less of their grip available than the {} tyres; \
                            bring them to {:.2} bar",
                           axle, asymmetry.abs() * 100.0, axle.other(), state.optimal_pressure)
    })
}

fn camber_suggestion(context: &AdvisorContext, axle: Axle) -> Suggestion {
    Suggestion {
        rule: String::new(),
        category: SuggestionCategory::Alignment,
        direction: Direction::Decrease,
        axle,
        delta: -CAMBER_STEP,
        target: None,
        unit: "deg".to_string(),
        trigger: "tendency_index".to_string(),
        trigger_value: context.index(),
        magnitude: context.index().abs() / CAMBER_INDEX_THRESHOLD,
        rationale: format!("Index {:.1} is past what roll stiffness changes usually fix; \
                            more negative {} camber raises the {} tyres' cornering grip",
                           context.index(), axle, axle)
    }
}

fn front_camber(context: &AdvisorContext) -> Option<Suggestion> {
    (context.index() > CAMBER_INDEX_THRESHOLD).then(|| camber_suggestion(context, Axle::Front))
}

fn rear_camber(context: &AdvisorContext) -> Option<Suggestion> {
    (context.index() < -CAMBER_INDEX_THRESHOLD).then(|| camber_suggestion(context, Axle::Rear))
}

/// Suggestions for `result`, which must have been produced from `inputs`
pub fn advise(result: &BalanceResult, inputs: &CalculationInputs) -> Result<Vec<Suggestion>> {
    inputs.setup.validate()?;
    let context = AdvisorContext { result, setup: &inputs.setup, tyres: inputs.tyres.as_ref() };
    let suggestions = RULES.iter()
        .filter_map(|(name, rule)| {
            rule(&context).map(|suggestion| Suggestion { rule: name.to_string(), ..suggestion })
        })
        .sorted_by(|a, b| b.magnitude.partial_cmp(&a.magnitude).unwrap_or(Ordering::Equal))
        .collect_vec();
    debug!("{} suggestions for index {:.2}: {}", suggestions.len(), result.tendency_index(),
           suggestions.iter().map(|s| s.rule.as_str()).join(", "));
    Ok(suggestions)
}
