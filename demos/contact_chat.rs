//! Example: line-oriented chat against a live provider.
//!
//! Configuration comes from the environment:
//!
//! ```text
//! PROVIDER=gemini GOOGLE_API_KEY=... cargo run --example contact_chat
//! PROVIDER=ollama MODEL_ID=llama3.2:3b cargo run --example contact_chat
//! ```
//!
//! Optional: `LLM_BASE_URL`, `DEFAULT_REGION`, `LLM_TIMEOUT_SECS`, `RUST_LOG`.

use anyhow::Context;
use contact_extractor::{Responder, Settings};
use std::io::{self, BufRead, Write};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("contact_extractor=info")),
        )
        .init();

    let settings = Settings::from_lookup(|key| std::env::var(key).ok())
        .context("reading settings from the environment")?;
    let responder = Responder::from_settings(&settings).context("invalid settings")?;

    tracing::info!(
        provider = %settings.provider,
        model = %settings.model_id,
        region = %settings.default_region,
        "Contact extractor ready"
    );
    println!("Share a contact (name, age, email, phone), or just chat. Ctrl-D to quit.");

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        println!("{}\n", responder.respond(message).await);
    }

    Ok(())
}
