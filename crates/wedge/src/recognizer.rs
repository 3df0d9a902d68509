use crate::ink::InkSample;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub text: String,
    /// Higher is better. Backends without scores keep their own order.
    #[serde(default)]
    pub score: Option<f32>,
}

impl Candidate {
    pub fn new(text: impl Into<String>, score: Option<f32>) -> Self {
        Self {
            text: text.into(),
            score,
        }
    }
}

/// Candidates best-first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Recognition(Vec<Candidate>);

impl Recognition {
    /// Orders by descending score; unscored candidates keep their relative
    /// order after the scored ones.
    pub fn ranked(mut candidates: Vec<Candidate>) -> Self {
        candidates.sort_by(|a, b| match (a.score, b.score) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        Self(candidates)
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.0
    }

    pub fn top(&self) -> Option<&Candidate> {
        self.0.first()
    }

    /// First non-whitespace character of the best candidate.
    pub fn top_char(&self) -> Option<char> {
        self.top()
            .and_then(|c| c.text.chars().find(|ch| !ch.is_whitespace()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum RecognizerError {
    #[error("Recognizer unavailable: {0}")]
    Unavailable(String),
    #[error("Recognizer I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed recognizer output: {0}")]
    Malformed(String),
}

/// Handwriting backend. Called off the UI thread; must not touch launcher state.
pub trait Recognizer: Send + Sync {
    fn recognize(&self, sample: &InkSample) -> Result<Vec<Candidate>, RecognizerError>;
}

/// Backend that never has an interpretation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRecognizer;

impl Recognizer for NullRecognizer {
    fn recognize(&self, _sample: &InkSample) -> Result<Vec<Candidate>, RecognizerError> {
        Ok(Vec::new())
    }
}

/// Runs `recognizer` and folds failures into "no interpretation".
pub fn recognize_or_empty(recognizer: &dyn Recognizer, sample: &InkSample) -> Recognition {
    match recognizer.recognize(sample) {
        Ok(candidates) => Recognition::ranked(candidates),
        Err(e) => {
            log::warn!("Recognition failed: {}", e);
            Recognition::default()
        }
    }
}
