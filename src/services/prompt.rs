// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Plan generation request builder.
//!
//! Produces the natural-language request sent to the generation backend.
//! Which weekday is a training day is left to the backend; day names are
//! assigned positionally when the response is normalized.

use crate::models::{GenerationPreferences, UserProfile};
use std::fmt::Write as _;

const DEFAULT_AGE: u32 = 25;
const DEFAULT_WEIGHT: f64 = 70.0;
const DEFAULT_GOAL: &str = "General Fitness";
const NOT_SPECIFIED: &str = "keine Angabe";
/// Stand-in for empty free-text constraints.
const NO_CONSTRAINTS: &str = "Keine";

/// Build the generation request for a profile and per-request preferences.
///
/// Missing profile fields fall back to defaults; this never fails.
pub fn build_plan_prompt(profile: &UserProfile, prefs: &GenerationPreferences) -> String {
    let units = profile.units;
    let age = profile.age.unwrap_or(DEFAULT_AGE);
    let weight = profile.weight.unwrap_or(DEFAULT_WEIGHT);
    let height = profile
        .height
        .map(|h| format!("{} {}", format_number(h), units.height_unit()))
        .unwrap_or_else(|| NOT_SPECIFIED.to_string());
    let gender = profile
        .gender
        .as_deref()
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .unwrap_or(NOT_SPECIFIED);
    let goal = profile
        .goal
        .as_ref()
        .map(|g| g.label())
        .filter(|g| !g.trim().is_empty())
        .unwrap_or(DEFAULT_GOAL);

    let training_days = prefs.effective_training_days();
    let rest_days = prefs.rest_days();
    let constraints = if prefs.extra_constraints.trim().is_empty() {
        NO_CONSTRAINTS
    } else {
        prefs.extra_constraints.as_str()
    };

    let mut prompt = String::with_capacity(1600);
    prompt.push_str(
        "Du bist ein professioneller Fitness-Coach. Erstelle einen personalisierten \
         Trainingsplan für eine Woche basierend auf folgenden Daten:\n",
    );
    let _ = writeln!(prompt, "- Alter: {}", age);
    let _ = writeln!(prompt, "- Geschlecht: {}", gender);
    let _ = writeln!(
        prompt,
        "- Gewicht: {} {}",
        format_number(weight),
        units.weight_unit()
    );
    let _ = writeln!(prompt, "- Größe: {}", height);
    let _ = writeln!(prompt, "- Ziel: {}", goal);
    let _ = writeln!(prompt, "- Trainingstage pro Woche: {}", training_days);
    let _ = writeln!(
        prompt,
        "- Dauer pro Einheit: {}",
        prefs.session_duration.label()
    );
    let _ = writeln!(prompt, "- Zusätzliche Wünsche/Einschränkungen: {}", constraints);

    prompt.push_str("\nAnweisungen:\n");
    prompt.push_str("1. Der Plan besteht aus GENAU 7 Tagesobjekten, eines pro Wochentag.\n");
    let _ = writeln!(
        prompt,
        "2. Genau {} davon sind Trainingstage und genau {} sind Ruhetage oder aktive \
         Erholung (leere \"exercises\"-Liste). Verteile sie sinnvoll über die Woche.",
        training_days, rest_days
    );
    prompt.push_str(
        "3. Nenne KEINE Wochentage (Montag, Dienstag, ...) in \"desc\" oder \"title\"; \
         die Zuordnung der Tage erfolgt über die Reihenfolge.\n",
    );
    prompt.push_str(
        "4. Die Ausgabe MUSS ein valides JSON-Array sein. KEIN Markdown, KEINE Code-Blöcke, \
         KEIN Text davor oder danach.\n",
    );
    prompt.push_str(
        "\nJSON Struktur (Array mit 7 Elementen):\n\
         [\n  {\n    \"title\": \"Kurzer Titel (z.B. Push Day)\",\n    \
         \"desc\": \"Kurze Beschreibung des Fokus (max 2 Sätze).\",\n    \
         \"exercises\": [\n      { \"name\": \"Übungsname\", \"sets\": \"3\", \
         \"reps\": \"8-12\", \"notes\": \"Optionaler Hinweis\" }\n    ]\n  }\n]\n",
    );
    prompt.push_str("\nAntworte nur mit dem JSON.");
    prompt
}

/// Render whole numbers without a trailing ".0".
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
