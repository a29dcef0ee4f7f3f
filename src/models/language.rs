use serde::{Deserialize, Serialize};

/// Search language accepted by the `/resources/courses` endpoint.
///
/// Each platform spells languages differently, so the per-platform codes
/// live here instead of in the provider services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Es,
}

impl Language {
    /// Full language name, as the Coursera and edX search filters expect it.
    pub fn full_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Es => "Spanish",
        }
    }

    /// Uppercase locale code used by Udemy's course search filter.
    pub fn udemy_code(&self) -> &'static str {
        match self {
            Language::En => "EN",
            Language::Es => "ES",
        }
    }

    /// Phrase appended to YouTube queries to bias results toward full courses.
    pub fn youtube_terms(&self) -> &'static str {
        match self {
            Language::En => "full course",
            Language::Es => "curso completo español",
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::En
    }
}
