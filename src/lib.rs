//! # Contact Extractor
//!
//! Pull a contact record (name, age, email, phone) out of free text with a
//! language model, then validate it and repair the email where possible.
//!
//! ## Core Concepts
//!
//! - **[`ContactSchema`]**: the only way to turn an untyped
//!   [`CandidateRecord`] into a [`ContactRecord`]. Phone numbers are
//!   normalized to E.164 by [`PhoneNormalizer`] along the way.
//! - **[`ValidationPipeline`]**: direct validation, then a deterministic
//!   email rewrite ([`rewrite_email`]), then a model suggestion
//!   ([`EmailSuggester`]). Returns the record (or not) plus a
//!   [`CorrectionReport`].
//! - **[`Extractor`]**: prompts the model for a JSON candidate.
//! - **[`Responder`]**: `respond(message) -> String`, falling back to
//!   open-ended chat when the message holds no contact.
//! - **[`ExecCtx`]**: HTTP client, endpoint, [`Backend`](backend::Backend)
//!   and optional event handler, built once and shared.
//!
//! Model failures never escape a component: the suggester answers
//! [`UNKNOWN_SENTINEL`], the extractor answers `None`, and the responder
//! puts the error in its reply.
//!
//! ## Quick Start
//!
//! ```no_run
//! use contact_extractor::{ExecCtx, GeminiBackend, Responder};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ctx = ExecCtx::builder("https://generativelanguage.googleapis.com")
//!         .backend(Arc::new(GeminiBackend::new().with_api_key("AIza...")))
//!         .build();
//!     let responder = Responder::new(ctx, "gemini-2.5-flash", "IN")?;
//!
//!     let reply = responder
//!         .respond("I'm Raj, 22. Mail me at raj_22 at gamil,com or call 09876543210")
//!         .await;
//!     println!("{}", reply);
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod config;
pub mod email;
pub mod error;
pub mod events;
pub mod exec_ctx;
pub mod extractor;
pub mod llm_call;
pub mod output_strategy;
pub mod parsing;
pub mod phone;
pub mod prompt;
pub mod report;
pub mod responder;
pub mod schema;
pub mod validation;

pub use backend::{GeminiBackend, MockBackend, OllamaBackend};
pub use config::{LlmConfig, Provider, Settings};
pub use email::{rewrite_email, EmailSuggester, EmailSuggestion, DOMAIN_FIXES, UNKNOWN_SENTINEL};
pub use error::{ModelError, Result};
pub use events::{Event, EventHandler, FnEventHandler};
pub use exec_ctx::{ExecCtx, ExecCtxBuilder};
pub use extractor::Extractor;
pub use llm_call::{CallOutput, LlmCall};
pub use output_strategy::OutputStrategy;
pub use phone::{normalize_phone, InvalidPhoneError, PhoneNormalizer};
pub use report::{Correction, CorrectionPass, CorrectionReport};
pub use responder::Responder;
pub use schema::{CandidateRecord, ContactRecord, ContactSchema, FieldError, SchemaValidationError};
pub use validation::{ValidationOutcome, ValidationPipeline};
