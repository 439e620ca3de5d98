//! Event system for model-call and correction lifecycle hooks.
//!
//! Optional and non-intrusive: components emit events when they call the
//! model, apply an email correction, or fail validation. A front-end can
//! implement [`EventHandler`] to surface these, e.g. to show which fixes were
//! applied while the reply is being composed.

use crate::report::CorrectionPass;
use std::sync::Arc;

/// Events emitted during a `respond` cycle.
#[derive(Debug, Clone)]
pub enum Event {
    /// A model call is starting.
    ModelCallStart {
        /// Name of the call (e.g. `"extract-contact"`).
        name: String,
        /// Backend handling the call.
        backend: &'static str,
    },
    /// A model call has finished.
    ModelCallEnd {
        /// Name of the call.
        name: String,
        /// Whether the backend returned text.
        ok: bool,
    },
    /// An email correction was substituted into the candidate.
    CorrectionApplied {
        /// Which correction pass produced the new value.
        pass: CorrectionPass,
        /// Email before the correction.
        from: String,
        /// Email after the correction.
        to: String,
    },
    /// A schema validation attempt failed.
    ValidationFailed {
        /// Pipeline stage that made the attempt (`"direct"`, `"regex"`, `"model"`).
        stage: &'static str,
        /// Full diagnostic text.
        errors: String,
    },
    /// Extraction produced nothing; the message goes to open-ended chat.
    FallbackChat,
}

/// Handler for pipeline events.
///
/// # Example
///
/// ```
/// use contact_extractor::events::{Event, EventHandler};
///
/// struct PrintHandler;
///
/// impl EventHandler for PrintHandler {
///     fn on_event(&self, event: Event) {
///         if let Event::CorrectionApplied { pass, from, to } = event {
///             println!("[{:?}] {} -> {}", pass, from, to);
///         }
///     }
/// }
/// ```
pub trait EventHandler: Send + Sync {
    /// Called when a component emits an event.
    fn on_event(&self, event: Event);
}

/// Emit an event if a handler is present. No-op otherwise.
pub(crate) fn emit(handler: &Option<Arc<dyn EventHandler>>, event: Event) {
    if let Some(ref h) = handler {
        h.on_event(event);
    }
}

/// An [`EventHandler`] backed by a closure.
pub struct FnEventHandler<F: Fn(Event) + Send + Sync>(pub F);

impl<F: Fn(Event) + Send + Sync> EventHandler for FnEventHandler<F> {
    fn on_event(&self, event: Event) {
        (self.0)(event);
    }
}
