//! Core data models for translation

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name under which the Google engine's usage is stored
pub const GOOGLE_ENGINE: &str = "Google";

/// Name under which the DeepL engine is reported
pub const DEEPL_ENGINE: &str = "DeepL";

/// Translation direction chosen on the input form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Japanese to English
    JaToEn,
    /// English to Japanese
    EnToJa,
}

impl Direction {
    /// Every direction offered by the form, in display order
    pub const ALL: [Direction; 2] = [Direction::JaToEn, Direction::EnToJa];

    /// Resolve a form label. Anything that isn't `Ja>En` is English to Japanese.
    pub fn from_label(label: &str) -> Self {
        if label == "Ja>En" {
            Direction::JaToEn
        } else {
            Direction::EnToJa
        }
    }

    /// Form value for this direction
    pub fn label(&self) -> &'static str {
        match self {
            Direction::JaToEn => "Ja>En",
            Direction::EnToJa => "En>Ja",
        }
    }

    /// Human-readable choice text
    pub fn description(&self) -> &'static str {
        match self {
            Direction::JaToEn => "Japanese to English",
            Direction::EnToJa => "English to Japanese",
        }
    }

    /// `(source, target)` language codes.
    ///
    /// DeepL won't accept a bare `en` as a target, so English targets are
    /// always `en-us`.
    pub fn language_codes(&self) -> (&'static str, &'static str) {
        match self {
            Direction::JaToEn => ("ja", "en-us"),
            Direction::EnToJa => ("en", "ja"),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Resolve a direction label straight to `(source, target)` codes
pub fn translation_direction(label: &str) -> (&'static str, &'static str) {
    Direction::from_label(label).language_codes()
}

/// Translation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub direction: Direction,
    pub text: String,
    pub source_lang: String,
    pub target_lang: String,
}

impl TranslationRequest {
    pub fn new(direction: Direction, text: impl Into<String>) -> Self {
        let (source_lang, target_lang) = direction.language_codes();
        Self {
            direction,
            text: text.into(),
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
        }
    }

    /// Length of the source text in characters
    pub fn char_count(&self) -> u64 {
        char_len(&self.text)
    }
}

/// Count characters the way the providers bill them (Unicode scalar values)
pub fn char_len(text: &str) -> u64 {
    text.chars().count() as u64
}

/// Calendar month in which a usage counter was last reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsagePeriod {
    pub month: u32,
    pub year: i32,
}

impl UsagePeriod {
    pub fn new(month: u32, year: i32) -> Self {
        Self { month, year }
    }

    pub fn of(now: DateTime<Utc>) -> Self {
        Self::new(now.month(), now.year())
    }
}

/// Persisted usage counter for one engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineUsage {
    pub name: String,
    pub current_usage: u64,
    pub last_reset: UsagePeriod,
}

impl EngineUsage {
    pub fn new(name: impl Into<String>, last_reset: UsagePeriod) -> Self {
        Self {
            name: name.into(),
            current_usage: 0,
            last_reset,
        }
    }

    /// Add `chars` to the counter, starting over if `now` is a different month.
    pub fn apply(&mut self, chars: u64, now: UsagePeriod) -> u64 {
        if self.last_reset != now {
            self.current_usage = chars;
            self.last_reset = now;
        } else {
            self.current_usage = self.current_usage.saturating_add(chars);
        }
        self.current_usage
    }
}

/// What the results page shows in an engine's usage column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum UsageDisplay {
    Count(u64),
    Unavailable(String),
}

impl fmt::Display for UsageDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsageDisplay::Count(count) => write!(f, "{}", count),
            UsageDisplay::Unavailable(message) => write!(f, "{}", message),
        }
    }
}

/// Result of asking one engine for a translation
#[derive(Debug, Clone, Serialize)]
pub struct EngineOutcome {
    pub engine: String,
    pub text: String,
    pub length: u64,
    pub usage: UsageDisplay,
}

impl EngineOutcome {
    pub fn new(engine: impl Into<String>, text: impl Into<String>, usage: UsageDisplay) -> Self {
        let text = text.into();
        Self {
            engine: engine.into(),
            length: char_len(&text),
            text,
            usage,
        }
    }
}

/// Both engines' results for one source text
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub source_text: String,
    pub source_text_length: u64,
    pub source_lang: String,
    pub target_lang: String,
    pub deepl: EngineOutcome,
    pub google: EngineOutcome,
}
