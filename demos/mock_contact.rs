//! Example: the full respond cycle against MockBackend, no network needed.
//!
//! Run with: `cargo run --example mock_contact`

use contact_extractor::{Event, ExecCtx, FnEventHandler, MockBackend, Responder};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("contact_extractor=info")),
        )
        .init();

    // Canned model replies, consumed in call order:
    //   1. extraction for message one (email fixed by the rewrite table)
    //   2. extraction for message two (needs the model pass)
    //   3. the email suggestion for message two
    //   4. extraction for message three (nothing found)
    //   5. fallback chat for message three
    let mock = Arc::new(MockBackend::new(vec![
        r#"{"name": "Raj", "age": 22, "email": "raj_22 at gamil,com", "phone": "09876543210"}"#.into(),
        r#"{"name": "Priya", "age": 28, "email": "priya@example.c0m"}"#.into(),
        "priya@example.com".into(),
        r#"{"name": "Unknown", "age": 0}"#.into(),
        "Hello! Send me a name, age and email and I'll file it.".into(),
    ]));

    let ctx = ExecCtx::builder("http://unused")
        .backend(mock.clone())
        .event_handler(Arc::new(FnEventHandler(|event: Event| {
            if let Event::CorrectionApplied { pass, from, to } = event {
                println!("  [{} fix] {} -> {}", pass, from, to);
            }
        })))
        .build();

    let responder = Responder::new(ctx, "mock-model", "IN")?;

    for message in [
        "Hi, I'm Raj, 22. Reach me at raj_22 at gamil,com or 09876543210.",
        "Priya here, 28 years old, priya@example.c0m",
        "hey there",
    ] {
        println!("> {}", message);
        println!("{}\n", responder.respond(message).await);
    }

    println!("Model calls made: {}", mock.calls());
    Ok(())
}
