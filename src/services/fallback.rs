// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ordered model fallback.
//!
//! Candidates are tried strictly one after another, one attempt each, until
//! one succeeds. Later candidates are only spent when earlier ones fail.

use super::gemini::{BackendError, GenerationBackend};
use crate::error::GenerationError;
use serde::Serialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Classification of a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    QuotaExceeded,
    NotFound,
    Forbidden,
    TimedOut,
    Unknown,
}

impl FailureKind {
    /// Classify by HTTP status, falling back to the message text.
    pub fn classify(error: &BackendError) -> Self {
        match error.status {
            Some(429) => return FailureKind::QuotaExceeded,
            Some(404) => return FailureKind::NotFound,
            Some(403) => return FailureKind::Forbidden,
            _ => {}
        }

        let message = error.message.to_ascii_lowercase();
        if message.contains("resource_exhausted")
            || message.contains("quota")
            || message.contains("too many requests")
        {
            FailureKind::QuotaExceeded
        } else if message.contains("not_found") || message.contains("not found") {
            FailureKind::NotFound
        } else if message.contains("permission_denied")
            || message.contains("permission denied")
            || message.contains("forbidden")
        {
            FailureKind::Forbidden
        } else {
            FailureKind::Unknown
        }
    }
}

/// One failed candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptFailure {
    pub model: String,
    pub kind: FailureKind,
    pub message: String,
}

impl AttemptFailure {
    fn into_error(self, timeout: Duration) -> GenerationError {
        let AttemptFailure {
            model,
            kind,
            message: detail,
        } = self;
        match kind {
            FailureKind::QuotaExceeded => GenerationError::QuotaExceeded { model, detail },
            FailureKind::NotFound => GenerationError::BackendNotFound { model, detail },
            FailureKind::Forbidden => GenerationError::BackendForbidden { model, detail },
            FailureKind::TimedOut => GenerationError::BackendTimedOut {
                model,
                seconds: timeout.as_secs(),
            },
            FailureKind::Unknown => GenerationError::BackendFailed { model, detail },
        }
    }
}

/// Result of running the fallback chain.
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackOutcome {
    Success {
        text: String,
        /// The candidate that produced `text`
        model: String,
        /// Candidates that failed before it
        failures: Vec<AttemptFailure>,
    },
    Failure {
        failures: Vec<AttemptFailure>,
    },
    Cancelled {
        failures: Vec<AttemptFailure>,
    },
}

impl FallbackOutcome {
    pub fn failures(&self) -> &[AttemptFailure] {
        match self {
            FallbackOutcome::Success { failures, .. }
            | FallbackOutcome::Failure { failures }
            | FallbackOutcome::Cancelled { failures } => failures,
        }
    }

    /// Number of candidates that were actually called.
    pub fn attempts(&self) -> usize {
        match self {
            FallbackOutcome::Success { failures, .. } => failures.len() + 1,
            FallbackOutcome::Failure { failures } | FallbackOutcome::Cancelled { failures } => {
                failures.len()
            }
        }
    }
}

/// Success of the fallback chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    pub text: String,
    pub model: String,
}

/// Tries candidates in order with a bounded time per attempt.
#[derive(Debug, Clone)]
pub struct FallbackInvoker {
    candidates: Vec<String>,
    attempt_timeout: Duration,
}

impl FallbackInvoker {
    pub fn new(candidates: Vec<String>, attempt_timeout: Duration) -> Self {
        Self {
            candidates,
            attempt_timeout,
        }
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Run the chain. Cancellation is honoured between candidates and while
    /// a request is in flight.
    pub async fn run(
        &self,
        backend: &dyn GenerationBackend,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> FallbackOutcome {
        let mut failures = Vec::new();

        for model in &self.candidates {
            if cancel.is_cancelled() {
                tracing::info!(model = %model, "Generation cancelled before attempt");
                return FallbackOutcome::Cancelled { failures };
            }

            let attempt = tokio::time::timeout(self.attempt_timeout, backend.generate(model, prompt));
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!(model = %model, "Generation cancelled mid-request");
                    return FallbackOutcome::Cancelled { failures };
                }
                result = attempt => result,
            };

            let failure = match result {
                Ok(Ok(text)) => {
                    tracing::info!(
                        model = %model,
                        failed_attempts = failures.len(),
                        "Generation succeeded"
                    );
                    return FallbackOutcome::Success {
                        text,
                        model: model.clone(),
                        failures,
                    };
                }
                Ok(Err(error)) => AttemptFailure {
                    model: model.clone(),
                    kind: FailureKind::classify(&error),
                    message: error.to_string(),
                },
                Err(_) => AttemptFailure {
                    model: model.clone(),
                    kind: FailureKind::TimedOut,
                    message: format!("no response within {:?}", self.attempt_timeout),
                },
            };

            tracing::warn!(
                model = %failure.model,
                kind = ?failure.kind,
                error = %failure.message,
                "Generation attempt failed, trying next candidate"
            );
            failures.push(failure);
        }

        FallbackOutcome::Failure { failures }
    }

    /// Run the chain and collapse the outcome into a single result.
    pub async fn invoke(
        &self,
        backend: &dyn GenerationBackend,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<Generated, GenerationError> {
        match self.run(backend, prompt, cancel).await {
            FallbackOutcome::Success { text, model, .. } => Ok(Generated { text, model }),
            FallbackOutcome::Failure { failures } => {
                Err(aggregate_failures(failures, self.attempt_timeout))
            }
            FallbackOutcome::Cancelled { .. } => Err(GenerationError::Cancelled),
        }
    }
}

/// Pick the error to surface once every candidate has failed: quota wins,
/// then the last failure, then a generic error for an empty chain.
pub fn aggregate_failures(failures: Vec<AttemptFailure>, timeout: Duration) -> GenerationError {
    let quota = failures
        .iter()
        .position(|f| f.kind == FailureKind::QuotaExceeded);

    let chosen = match quota {
        Some(index) => failures.into_iter().nth(index),
        None => failures.into_iter().last(),
    };

    chosen
        .map(|f| f.into_error(timeout))
        .unwrap_or(GenerationError::NoWorkingBackend)
}
