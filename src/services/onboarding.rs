// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Onboarding wizard state machine.
//!
//! Three steps (units, biometrics, goal). The state is an immutable value;
//! `transition` returns the next state and never mutates its input.

use crate::error::AppError;
use crate::models::{Goal, Units, UserProfile};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Units,
    Biometrics,
    Goal,
}

impl WizardStep {
    fn next(self) -> Option<Self> {
        match self {
            WizardStep::Units => Some(WizardStep::Biometrics),
            WizardStep::Biometrics => Some(WizardStep::Goal),
            WizardStep::Goal => None,
        }
    }

    fn previous(self) -> Option<Self> {
        match self {
            WizardStep::Units => None,
            WizardStep::Biometrics => Some(WizardStep::Units),
            WizardStep::Goal => Some(WizardStep::Biometrics),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStatus {
    InProgress,
    /// All steps valid; the form can be saved.
    Completed,
    /// User backed out of the first step.
    Exited,
}

/// Raw form input. Numbers stay strings until the form is complete.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OnboardingForm {
    #[serde(default)]
    pub units: Units,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub height: String,
    #[serde(default)]
    pub goal: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Age,
    Weight,
    Height,
    Gender,
    Goal,
}

impl OnboardingForm {
    /// Whether one field holds an acceptable value for the chosen units.
    pub fn is_field_valid(&self, field: Field) -> bool {
        match field {
            Field::Age => in_range(&self.age, 10.0, 120.0),
            Field::Height => match self.units {
                Units::Metric => in_range(&self.height, 50.0, 300.0),
                Units::Imperial => in_range(&self.height, 36.0, 108.0),
            },
            Field::Weight => match self.units {
                Units::Metric => in_range(&self.weight, 20.0, 500.0),
                Units::Imperial => in_range(&self.weight, 40.0, 1100.0),
            },
            Field::Gender => !self.gender.trim().is_empty(),
            Field::Goal => !self.goal.trim().is_empty(),
        }
    }

    pub fn is_step_valid(&self, step: WizardStep) -> bool {
        match step {
            // Units always holds a value.
            WizardStep::Units => true,
            WizardStep::Biometrics => [Field::Age, Field::Height, Field::Weight, Field::Gender]
                .into_iter()
                .all(|f| self.is_field_valid(f)),
            WizardStep::Goal => self.is_field_valid(Field::Goal),
        }
    }

    pub fn is_complete(&self) -> bool {
        [WizardStep::Units, WizardStep::Biometrics, WizardStep::Goal]
            .into_iter()
            .all(|s| self.is_step_valid(s))
    }

    /// First invalid field, in form order.
    pub fn first_invalid_field(&self) -> Option<Field> {
        [Field::Gender, Field::Age, Field::Height, Field::Weight, Field::Goal]
            .into_iter()
            .find(|f| !self.is_field_valid(*f))
    }

    /// Convert a complete form into profile fields.
    pub fn into_profile(self) -> Result<UserProfile, AppError> {
        if let Some(field) = self.first_invalid_field() {
            return Err(AppError::BadRequest(format!(
                "Invalid onboarding field: {:?}",
                field
            )));
        }

        Ok(UserProfile {
            units: self.units,
            gender: Some(self.gender.trim().to_string()),
            age: parse_number(&self.age).map(|a| a.trunc() as u32),
            weight: parse_number(&self.weight),
            height: parse_number(&self.height),
            goal: Some(Goal::from(self.goal.trim().to_string())),
            ..Default::default()
        })
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

fn in_range(raw: &str, min: f64, max: f64) -> bool {
    parse_number(raw).is_some_and(|n| (min..=max).contains(&n))
}

/// User actions on the wizard.
#[derive(Debug, Clone, PartialEq)]
pub enum WizardInput {
    SetUnits(Units),
    SetGender(String),
    SetAge(String),
    SetWeight(String),
    SetHeight(String),
    SetGoal(String),
    Next,
    Back,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardState {
    pub step: WizardStep,
    pub form: OnboardingForm,
    pub status: WizardStatus,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            step: WizardStep::Units,
            form: OnboardingForm::default(),
            status: WizardStatus::InProgress,
        }
    }
}

impl WizardState {
    pub fn can_proceed(&self) -> bool {
        self.status == WizardStatus::InProgress && self.form.is_step_valid(self.step)
    }
}

/// Apply one input. Finished wizards ignore further input; `Next` on an
/// invalid step changes nothing.
pub fn transition(state: &WizardState, input: WizardInput) -> WizardState {
    if state.status != WizardStatus::InProgress {
        return state.clone();
    }

    let mut next = state.clone();
    match input {
        WizardInput::SetUnits(units) => next.form.units = units,
        WizardInput::SetGender(v) => next.form.gender = v,
        WizardInput::SetAge(v) => next.form.age = v,
        WizardInput::SetWeight(v) => next.form.weight = v,
        WizardInput::SetHeight(v) => next.form.height = v,
        WizardInput::SetGoal(v) => next.form.goal = v,
        WizardInput::Next => {
            if !state.can_proceed() {
                return next;
            }
            match state.step.next() {
                Some(step) => next.step = step,
                None => next.status = WizardStatus::Completed,
            }
        }
        WizardInput::Back => match state.step.previous() {
            Some(step) => next.step = step,
            None => next.status = WizardStatus::Exited,
        },
    }
    next
}
