// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod plan;
pub mod preferences;
pub mod profile;

pub use plan::{resolve_day, DayLookup, DayPlan, Exercise, WeeklyPlan, WEEKDAY_NAMES};
pub use preferences::{GenerationPreferences, SessionDuration};
pub use profile::{Goal, Units, UserProfile};
