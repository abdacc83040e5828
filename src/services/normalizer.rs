// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Turns raw generation output into a `WeeklyPlan`.
//!
//! The backend answers either with a bare array of day objects or with an
//! object wrapping them in `days`, sometimes inside markdown code fences.
//! Day names are always reassigned from the day's position.

use crate::error::GenerationError;
use crate::models::plan::{weekday_name, DayPlan, WeeklyPlan, DAYS_PER_WEEK};
use serde_json::Value;

/// The two response shapes the backend is known to produce.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseShape {
    /// `[ {...}, {...}, ... ]`
    DayList(Vec<Value>),
    /// `{ "days": [ ... ] }`
    Wrapped(Vec<Value>),
}

impl ResponseShape {
    /// Classify a parsed response.
    pub fn decode(value: Value) -> Result<Self, GenerationError> {
        match value {
            Value::Array(days) => Ok(ResponseShape::DayList(days)),
            Value::Object(mut map) => match map.remove("days") {
                Some(Value::Array(days)) if !days.is_empty() => Ok(ResponseShape::Wrapped(days)),
                other => {
                    if let Some(days) = other {
                        map.insert("days".to_string(), days);
                    }
                    Err(GenerationError::InvalidPlanFormat {
                        reason: "expected an array of days or an object with a non-empty \"days\" array"
                            .to_string(),
                        value: Value::Object(map),
                    })
                }
            },
            other => Err(GenerationError::InvalidPlanFormat {
                reason: "expected an array of days or an object with a non-empty \"days\" array"
                    .to_string(),
                value: other,
            }),
        }
    }

    pub fn into_days(self) -> Vec<Value> {
        match self {
            ResponseShape::DayList(days) | ResponseShape::Wrapped(days) => days,
        }
    }
}

/// Remove markdown code-fence markers and surrounding whitespace.
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "")
        .replace("```JSON", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Parse raw backend output into a plan.
///
/// A result without exactly seven days is returned with a warning; callers
/// can check `WeeklyPlan::is_complete`.
pub fn normalize_plan(raw: &str) -> Result<WeeklyPlan, GenerationError> {
    let cleaned = strip_code_fences(raw);

    let value: Value =
        serde_json::from_str(&cleaned).map_err(|e| GenerationError::MalformedResponse {
            reason: e.to_string(),
            raw: raw.to_string(),
        })?;

    let days = ResponseShape::decode(value)?
        .into_days()
        .into_iter()
        .enumerate()
        .map(|(index, day)| hydrate_day(index, day))
        .collect::<Result<Vec<_>, _>>()?;

    if days.len() != DAYS_PER_WEEK {
        tracing::warn!(
            days = days.len(),
            expected = DAYS_PER_WEEK,
            "Generated plan does not cover exactly one week"
        );
    }

    Ok(WeeklyPlan { days })
}

/// Assign the positional day name and decode one day.
fn hydrate_day(index: usize, day: Value) -> Result<DayPlan, GenerationError> {
    let Value::Object(mut fields) = day else {
        return Err(GenerationError::InvalidPlanFormat {
            reason: format!("day {} is not an object", index),
            value: day,
        });
    };

    fields.insert(
        "day_name".to_string(),
        Value::String(weekday_name(index).to_string()),
    );
    let value = Value::Object(fields);

    serde_json::from_value(value.clone()).map_err(|e| GenerationError::InvalidPlanFormat {
        reason: format!("day {}: {}", index, e),
        value,
    })
}
