//! What the validation pipeline changed, and why it gave up.

use serde::Serialize;
use std::fmt;

/// Which correction pass produced a rewritten email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrectionPass {
    /// The deterministic rewrite table.
    Regex,
    /// The model-assisted suggester.
    Model,
}

impl fmt::Display for CorrectionPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrectionPass::Regex => f.write_str("regex"),
            CorrectionPass::Model => f.write_str("model"),
        }
    }
}

/// A before/after email pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Correction {
    pub from: String,
    pub to: String,
}

impl Correction {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Per-attempt record of corrections and the last diagnostic.
///
/// `errors` is cleared once a record validates, so a populated `errors`
/// always means the attempt ended without a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CorrectionReport {
    pub regex_correction: Option<Correction>,
    pub model_correction: Option<Correction>,
    pub errors: Option<String>,
}

impl CorrectionReport {
    /// No corrections were recorded and no error is pending.
    pub fn is_empty(&self) -> bool {
        self.regex_correction.is_none() && self.model_correction.is_none() && self.errors.is_none()
    }

    /// Corrections in the order they were attempted.
    pub fn corrections(&self) -> impl Iterator<Item = (CorrectionPass, &Correction)> {
        self.regex_correction
            .as_ref()
            .map(|c| (CorrectionPass::Regex, c))
            .into_iter()
            .chain(self.model_correction.as_ref().map(|c| (CorrectionPass::Model, c)))
    }
}
