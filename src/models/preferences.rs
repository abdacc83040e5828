// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-request plan generation preferences.

use serde::{Deserialize, Serialize};
use validator::Validate;

pub const MIN_TRAINING_DAYS: u8 = 1;
pub const MAX_TRAINING_DAYS: u8 = 7;
pub const DEFAULT_TRAINING_DAYS: u8 = 3;

/// Session length options offered to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionDuration {
    #[serde(rename = "30 Min")]
    Min30,
    #[serde(rename = "45 Min")]
    Min45,
    #[default]
    #[serde(rename = "60 Min")]
    Min60,
    #[serde(rename = "90 Min")]
    Min90,
}

impl SessionDuration {
    pub fn label(self) -> &'static str {
        match self {
            SessionDuration::Min30 => "30 Min",
            SessionDuration::Min45 => "45 Min",
            SessionDuration::Min60 => "60 Min",
            SessionDuration::Min90 => "90 Min",
        }
    }
}

/// Choices for a single generation attempt. Not stored on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerationPreferences {
    #[serde(default = "default_training_days")]
    #[validate(range(min = 1, max = 7))]
    pub training_days: u8,
    #[serde(default)]
    pub session_duration: SessionDuration,
    /// Free-text constraints, e.g. injuries or available equipment
    #[serde(default)]
    #[validate(length(max = 100))]
    pub extra_constraints: String,
}

fn default_training_days() -> u8 {
    DEFAULT_TRAINING_DAYS
}

impl Default for GenerationPreferences {
    fn default() -> Self {
        Self {
            training_days: DEFAULT_TRAINING_DAYS,
            session_duration: SessionDuration::default(),
            extra_constraints: String::new(),
        }
    }
}

impl GenerationPreferences {
    /// Training days clamped to the valid range.
    pub fn effective_training_days(&self) -> u8 {
        self.training_days.clamp(MIN_TRAINING_DAYS, MAX_TRAINING_DAYS)
    }

    pub fn rest_days(&self) -> u8 {
        MAX_TRAINING_DAYS - self.effective_training_days()
    }
}
