/**
 * KnnReco
 * Copyright (C) 2018 Sebastian Schelter
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <http://www.gnu.org/licenses/>.
 */

use std::io;

use thiserror::Error;

/// Errors raised while loading ratings, building models and computing recommendations.
#[derive(Debug, Error)]
pub enum CfError {
    #[error("failed to read ratings: {0}")]
    DataLoad(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid rating '{value}' in line {line}")]
    InvalidRating { line: u64, value: String },

    #[error("expected user, item and rating in line {line}, found {num_fields} fields")]
    MalformedRecord { line: u64, num_fields: usize },

    #[error("no ratings available to build a model from")]
    EmptyRatings,

    #[error("{operation}: unknown user '{user}'")]
    UnknownUser { operation: &'static str, user: String },

    #[error("{operation}: unknown item '{item}'")]
    UnknownItem { operation: &'static str, item: String },

    #[error("{operation}: model has no entry for '{entity}'")]
    MissingFromModel { operation: &'static str, entity: String },

    #[error("JSON (de)serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported model version {0}")]
    UnsupportedModelVersion(u32),

    #[error("corrupt model: {0}")]
    CorruptModel(String),
}

impl CfError {

    pub fn unknown_user(operation: &'static str, user: &str) -> Self {
        CfError::UnknownUser { operation, user: user.to_string() }
    }

    pub fn unknown_item(operation: &'static str, item: &str) -> Self {
        CfError::UnknownItem { operation, item: item.to_string() }
    }

    pub fn missing_from_model(operation: &'static str, entity: &str) -> Self {
        CfError::MissingFromModel { operation, entity: entity.to_string() }
    }
}
