// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profile model for storage and API.

use super::plan::WeeklyPlan;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Measurement system the user entered biometrics in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn weight_unit(self) -> &'static str {
        match self {
            Units::Metric => "kg",
            Units::Imperial => "lbs",
        }
    }

    pub fn height_unit(self) -> &'static str {
        match self {
            Units::Metric => "cm",
            Units::Imperial => "in",
        }
    }
}

/// Training goal. Known goals have stable identifiers; anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Goal {
    LoseWeight,
    BuildMuscle,
    Endurance,
    Other(String),
}

impl Goal {
    pub fn as_str(&self) -> &str {
        match self {
            Goal::LoseWeight => "lose_weight",
            Goal::BuildMuscle => "build_muscle",
            Goal::Endurance => "endurance",
            Goal::Other(s) => s,
        }
    }

    /// Human-readable label used in generation requests.
    pub fn label(&self) -> &str {
        match self {
            Goal::LoseWeight => "Abnehmen",
            Goal::BuildMuscle => "Muskelaufbau",
            Goal::Endurance => "Ausdauer",
            Goal::Other(s) => s,
        }
    }
}

impl From<String> for Goal {
    fn from(value: String) -> Self {
        match value.as_str() {
            "lose_weight" => Goal::LoseWeight,
            "build_muscle" => Goal::BuildMuscle,
            "endurance" => Goal::Endurance,
            _ => Goal::Other(value),
        }
    }
}

impl From<Goal> for String {
    fn from(goal: Goal) -> Self {
        match goal {
            Goal::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User profile record, keyed by the auth collaborator's user id.
///
/// Every field except the key may be absent: the record is created by
/// onboarding and filled in piecemeal by plan generation and selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Opaque user id (also used as document ID)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub units: Units,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<Goal>,
    /// Serialized as `null` when cleared so partial updates overwrite it.
    #[serde(default)]
    pub workout_routine: Option<WeeklyPlan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_plan: Option<String>,
    /// RFC3339 timestamp of the last write
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl UserProfile {
    pub fn has_routine(&self) -> bool {
        self.workout_routine.is_some()
    }
}
