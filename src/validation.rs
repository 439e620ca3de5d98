//! Schema validation with two-pass email auto-correction.
//!
//! ```text
//! candidate ──► validate ──ok──► record
//!                  │ err
//!                  ▼
//!          rewrite_email(original) ──changed──► validate ──ok──► record
//!                  │ unchanged / err
//!                  ▼
//!          suggester(original) ──usable──► validate ──► record | errors
//! ```
//!
//! Each stage is an explicit attempt; the first success wins. The model pass
//! works from the original email, not the regex rewrite, so a bad rewrite
//! never biases the suggestion.

use crate::email::{rewrite_email, EmailSuggester, EmailSuggestion};
use crate::events::{emit, Event};
use crate::exec_ctx::ExecCtx;
use crate::report::{Correction, CorrectionPass, CorrectionReport};
use crate::schema::{candidate_email, CandidateRecord, ContactRecord, ContactSchema, SchemaValidationError};
use serde_json::Value;

/// Outcome of [`ValidationPipeline::validate`].
///
/// `record` is `Some` exactly when `report.errors` is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    pub record: Option<ContactRecord>,
    pub report: CorrectionReport,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        self.record.is_some()
    }
}

/// Runs candidates through the schema, correcting the email when it can.
#[derive(Debug)]
pub struct ValidationPipeline {
    schema: ContactSchema,
    suggester: EmailSuggester,
}

impl ValidationPipeline {
    pub fn new(schema: ContactSchema, suggester: EmailSuggester) -> Self {
        Self { schema, suggester }
    }

    pub fn schema(&self) -> &ContactSchema {
        &self.schema
    }

    /// Validate `candidate`, trying the regex pass and then the model pass
    /// on the email when direct validation fails.
    ///
    /// Never fails: an exhausted pipeline returns no record and the last
    /// diagnostic in `report.errors`.
    pub async fn validate(&self, ctx: &ExecCtx, candidate: &CandidateRecord) -> ValidationOutcome {
        let mut report = CorrectionReport::default();

        let err = match self.attempt(ctx, "direct", candidate) {
            Ok(record) => return ValidationOutcome::valid(record, report),
            Err(e) => e,
        };
        report.errors = Some(err.to_string());

        let Some(original) = candidate_email(candidate).map(str::to_string) else {
            tracing::debug!("No email to correct; giving up");
            return ValidationOutcome::invalid(report);
        };

        // Regex pass.
        let rewritten = rewrite_email(&original);
        if rewritten != original {
            report.regex_correction = Some(Correction::new(&original, &rewritten));
            match self.attempt(ctx, "regex", &with_email(candidate, &rewritten)) {
                Ok(record) => {
                    self.applied(ctx, CorrectionPass::Regex, &original, &rewritten);
                    return ValidationOutcome::valid(record, report);
                }
                Err(e) => report.errors = Some(e.to_string()),
            }
        }

        // Model pass.
        let suggested = match self.suggester.suggest(ctx, &original).await {
            EmailSuggestion::Corrected(email) if email != original => email,
            _ => {
                tracing::debug!(email = %original, "No usable model suggestion");
                return ValidationOutcome::invalid(report);
            }
        };
        report.model_correction = Some(Correction::new(&original, &suggested));
        match self.attempt(ctx, "model", &with_email(candidate, &suggested)) {
            Ok(record) => {
                self.applied(ctx, CorrectionPass::Model, &original, &suggested);
                ValidationOutcome::valid(record, report)
            }
            Err(e) => {
                report.errors = Some(e.to_string());
                ValidationOutcome::invalid(report)
            }
        }
    }

    fn attempt(
        &self,
        ctx: &ExecCtx,
        stage: &'static str,
        candidate: &CandidateRecord,
    ) -> Result<ContactRecord, SchemaValidationError> {
        self.schema.validate(candidate).inspect_err(|e| {
            tracing::debug!(stage, errors = e.errors.len(), "Validation attempt failed");
            emit(
                &ctx.event_handler,
                Event::ValidationFailed {
                    stage,
                    errors: e.to_string(),
                },
            );
        })
    }

    fn applied(&self, ctx: &ExecCtx, pass: CorrectionPass, from: &str, to: &str) {
        tracing::info!(%pass, from, to, "Applied email correction");
        emit(
            &ctx.event_handler,
            Event::CorrectionApplied {
                pass,
                from: from.to_string(),
                to: to.to_string(),
            },
        );
    }
}

impl ValidationOutcome {
    fn valid(record: ContactRecord, mut report: CorrectionReport) -> Self {
        report.errors = None;
        Self {
            record: Some(record),
            report,
        }
    }

    fn invalid(report: CorrectionReport) -> Self {
        Self { record: None, report }
    }
}

fn with_email(candidate: &CandidateRecord, email: &str) -> CandidateRecord {
    let mut patched = candidate.clone();
    patched.insert("email".to_string(), Value::String(email.to_string()));
    patched
}
