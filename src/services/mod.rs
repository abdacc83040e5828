// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod fallback;
pub mod gemini;
pub mod generator;
pub mod normalizer;
pub mod onboarding;
pub mod persistence;
pub mod prompt;

pub use fallback::{FailureKind, FallbackInvoker, FallbackOutcome};
pub use gemini::{BackendError, GeminiClient, GenerationBackend};
pub use generator::{GeneratedPlan, PlanGenerator};
pub use normalizer::normalize_plan;
pub use onboarding::{OnboardingForm, WizardState};
pub use persistence::{PersistenceCoordinator, PersistencePolicy, SaveOutcome, WriteStatus};
pub use prompt::build_plan_prompt;
