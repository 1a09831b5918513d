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

use std::fmt::{Display, Formatter};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BalanceError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BalanceError {
    #[error("invalid {field}. {reason}")]
    Validation {
        field: String,
        reason: String
    },
    #[error("degenerate setup. {0}")]
    DegenerateSetup(String),
    #[error("unknown tyre compound `{0}`")]
    UnknownCompound(String),
    #[error("unknown car preset `{0}`")]
    UnknownPreset(String),
    #[error("target frequency {target_hz:.3} Hz is unreachable; the tyre alone limits the corner to {limit_hz:.3} Hz")]
    InfeasibleFrequency {
        target_hz: f64,
        limit_hz: f64
    },
    #[error("target roll gradient {target_deg_per_g:.3} deg/g is already beaten by the springs alone ({spring_only_deg_per_g:.3} deg/g); springs exceed the required roll stiffness by {excess_stiffness:.0} N.mm/deg")]
    InfeasibleRollGradient {
        target_deg_per_g: f64,
        spring_only_deg_per_g: f64,
        excess_stiffness: f64
    },
    #[error("inputs are incompatible. {0}")]
    IncompatibleInputs(String),
    #[error("reference data error. {0}")]
    ReferenceData(String)
}

impl BalanceError {
    pub(crate) fn validation(field: &str, reason: impl Into<String>) -> BalanceError {
        BalanceError::Validation { field: field.to_string(), reason: reason.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            BalanceError::Validation { .. } => ErrorKind::Validation,
            BalanceError::IncompatibleInputs(_) => ErrorKind::Validation,
            BalanceError::DegenerateSetup(_) => ErrorKind::DegenerateSetup,
            BalanceError::UnknownCompound(_) => ErrorKind::UnknownCompound,
            BalanceError::UnknownPreset(_) => ErrorKind::UnknownPreset,
            BalanceError::InfeasibleFrequency { .. } => ErrorKind::InfeasibleFrequency,
            BalanceError::InfeasibleRollGradient { .. } => ErrorKind::InfeasibleRollGradient,
            BalanceError::ReferenceData(_) => ErrorKind::ReferenceData
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ErrorKind {
    Validation,
    DegenerateSetup,
    UnknownCompound,
    UnknownPreset,
    InfeasibleFrequency,
    InfeasibleRollGradient,
    ReferenceData
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation error",
            ErrorKind::DegenerateSetup => "degenerate setup",
            ErrorKind::UnknownCompound => "unknown compound",
            ErrorKind::UnknownPreset => "unknown preset",
            ErrorKind::InfeasibleFrequency => "infeasible frequency",
            ErrorKind::InfeasibleRollGradient => "infeasible roll gradient",
            ErrorKind::ReferenceData => "reference data error"
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fails with a validation error unless `value` is finite and strictly positive
pub(crate) fn require_positive(field: &str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(BalanceError::validation(field, format!("{} is not a finite number", value)));
    }
    if value <= 0.0 {
        return Err(BalanceError::validation(field, format!("must be greater than 0, got {}", value)));
    }
    Ok(value)
}

/// Fails with a validation error unless `value` is finite and not negative
pub(crate) fn require_non_negative(field: &str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(BalanceError::validation(field, format!("{} is not a finite number", value)));
    }
    if value < 0.0 {
        return Err(BalanceError::validation(field, format!("must not be negative, got {}", value)));
    }
    Ok(value)
}

pub(crate) fn require_finite(field: &str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(BalanceError::validation(field, format!("{} is not a finite number", value)));
    }
    Ok(value)
}
