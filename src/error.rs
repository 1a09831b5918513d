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


use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use chassis::BalanceError;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("couldn't read {path}. {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error
    },
    #[error("couldn't parse {path}. {source}")]
    TomlDecode {
        path: PathBuf,
        #[source]
        source: toml::de::Error
    },
    #[error("settings error. {0}")]
    Settings(#[from] config::ConfigError),
    #[error("{} - {0}", .0.kind())]
    Balance(#[from] BalanceError),
    #[error("couldn't encode json. {0}")]
    JsonEncode(#[from] serde_json::Error),
    #[error("{0}")]
    Input(String)
}

impl AppError {
    pub fn io(path: &Path, source: io::Error) -> AppError {
        AppError::Io { path: path.to_path_buf(), source }
    }

    pub fn toml_decode(path: &Path, source: toml::de::Error) -> AppError {
        AppError::TomlDecode { path: path.to_path_buf(), source }
    }
}

#[cfg(test)]
mod tests {
    use chassis::BalanceError;
    use crate::error::AppError;

    #[test]
    fn balance_errors_carry_their_kind() {
        let err = AppError::from(BalanceError::UnknownPreset("supra".to_string()));
        assert!(err.to_string().starts_with("unknown preset - "));
        assert!(err.to_string().contains("supra"));
    }
}
