// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weekly workout plan model.

use serde::{Deserialize, Deserializer, Serialize};

/// Number of days in a weekly plan.
pub const DAYS_PER_WEEK: usize = 7;

/// Canonical day names, Monday first. Plan days are named by position.
pub const WEEKDAY_NAMES: [&str; DAYS_PER_WEEK] = [
    "Montag",
    "Dienstag",
    "Mittwoch",
    "Donnerstag",
    "Freitag",
    "Samstag",
    "Sonntag",
];

/// Day name for a 0-based plan position (wraps every 7 days).
pub fn weekday_name(index: usize) -> &'static str {
    WEEKDAY_NAMES[index % DAYS_PER_WEEK]
}

/// A generated week of training, index 0 = Monday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyPlan {
    pub days: Vec<DayPlan>,
}

impl WeeklyPlan {
    /// True when the plan has exactly one entry per weekday.
    pub fn is_complete(&self) -> bool {
        self.days.len() == DAYS_PER_WEEK
    }

    /// Look up a day by its 0-based weekly index.
    pub fn day(&self, index: usize) -> Option<&DayPlan> {
        self.days.get(index)
    }

    /// Number of days with at least one exercise.
    pub fn training_day_count(&self) -> usize {
        self.days.iter().filter(|d| !d.is_rest_day()).count()
    }
}

/// One day of a weekly plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    /// Derived from the day's position, never taken from the backend.
    pub day_name: String,
    /// Short focus label, e.g. "Push Day" or "Active Recovery"
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub desc: String,
    /// Empty on rest days
    #[serde(default, deserialize_with = "null_as_empty")]
    pub exercises: Vec<Exercise>,
    /// Any additional fields the backend supplied, kept as-is.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl DayPlan {
    pub fn is_rest_day(&self) -> bool {
        self.exercises.is_empty()
    }
}

/// A single exercise prescription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub sets: String,
    /// May be a range such as "8-12"
    #[serde(default, deserialize_with = "string_or_number")]
    pub reps: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Accept `"3"`, `3` or `null` for count-like fields.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) => s,
        Some(Raw::Number(n)) => n.to_string(),
        None => String::new(),
    })
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Exercise>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Exercise>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Result of resolving a day-detail request.
#[derive(Debug, PartialEq)]
pub enum DayLookup<'a> {
    Found { index: usize, day: &'a DayPlan },
    /// Index invalid, out of range, or no plan: send the user to a safe view.
    Redirect,
}

/// Resolve a raw day index (as it appears in a URL) against an optional plan.
pub fn resolve_day<'a>(plan: Option<&'a WeeklyPlan>, raw_index: &str) -> DayLookup<'a> {
    let Some(plan) = plan else {
        return DayLookup::Redirect;
    };
    let Ok(index) = raw_index.trim().parse::<usize>() else {
        return DayLookup::Redirect;
    };
    match plan.day(index) {
        Some(day) => DayLookup::Found { index, day },
        None => DayLookup::Redirect,
    }
}
