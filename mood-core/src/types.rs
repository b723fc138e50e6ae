use crate::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of moods the classifier may report and the predictor may
/// recommend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Joy,
    Sadness,
    Anger,
    Fear,
    Love,
    Disgust,
    Neutral,
}

impl Emotion {
    pub const ALL: [Emotion; 7] = [
        Emotion::Joy,
        Emotion::Sadness,
        Emotion::Anger,
        Emotion::Fear,
        Emotion::Love,
        Emotion::Disgust,
        Emotion::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Joy => "joy",
            Emotion::Sadness => "sadness",
            Emotion::Anger => "anger",
            Emotion::Fear => "fear",
            Emotion::Love => "love",
            Emotion::Disgust => "disgust",
            Emotion::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        Emotion::ALL
            .into_iter()
            .find(|emotion| emotion.as_str().eq_ignore_ascii_case(label))
            .ok_or_else(|| CoreError::UnknownEmotion {
                label: s.to_string(),
            })
    }
}

/// A post as delivered by the fetch collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Raw answer from the classifier: its best label and that label's probability.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedPost {
    pub created_at: DateTime<Utc>,
    pub cleaned_text: String,
    pub emotion: Emotion,
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    pub account: String,
    pub credential: String,
}

impl RunRequest {
    pub fn new(account: impl Into<String>, credential: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            credential: credential.into(),
        }
    }
}
