// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Plan generation pipeline: build request, run the fallback chain, normalize.

use super::fallback::FallbackInvoker;
use super::gemini::GenerationBackend;
use super::normalizer::normalize_plan;
use super::prompt::build_plan_prompt;
use crate::error::GenerationError;
use crate::models::{GenerationPreferences, UserProfile, WeeklyPlan};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// A normalized plan and the model that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPlan {
    pub plan: WeeklyPlan,
    pub model: String,
}

pub struct PlanGenerator {
    backend: Arc<dyn GenerationBackend>,
    invoker: FallbackInvoker,
}

impl PlanGenerator {
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        candidates: Vec<String>,
        attempt_timeout: Duration,
    ) -> Self {
        Self {
            backend,
            invoker: FallbackInvoker::new(candidates, attempt_timeout),
        }
    }

    pub fn candidates(&self) -> &[String] {
        self.invoker.candidates()
    }

    /// Generate a weekly plan. Parse failures are returned as-is; the caller
    /// decides whether to generate again.
    pub async fn generate(
        &self,
        profile: &UserProfile,
        prefs: &GenerationPreferences,
        cancel: &CancellationToken,
    ) -> Result<GeneratedPlan, GenerationError> {
        let prompt = build_plan_prompt(profile, prefs);
        let generated = self
            .invoker
            .invoke(self.backend.as_ref(), &prompt, cancel)
            .await?;

        let plan = normalize_plan(&generated.text)?;
        tracing::info!(
            model = %generated.model,
            days = plan.days.len(),
            training_days = plan.training_day_count(),
            "Plan generated"
        );

        Ok(GeneratedPlan {
            plan,
            model: generated.model,
        })
    }
}
