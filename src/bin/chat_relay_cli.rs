//! Chat Relay CLI
//!
//! Sends a one-shot prompt through the relay and prints the answer as it
//! streams in. Ctrl+C cancels the in-flight request.

use std::io::Write;

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use chat_relay::{
    build_http_client, chat::Role, ChatCompletionRequest, ChatMessage, ChatRelay, Config,
    InboundRequest, RelayError,
};

#[derive(Parser)]
#[command(name = "chat-relay-cli")]
#[command(about = "Send a prompt to Gemini through the chat relay", long_about = None)]
struct Cli {
    /// Prompt text (words are joined with spaces)
    #[arg(required = true)]
    prompt: Vec<String>,

    /// Optional system message sent before the prompt
    #[arg(short, long)]
    system: Option<String>,

    /// Model name (defaults to GEMINI_MODEL or the built-in default)
    #[arg(short, long)]
    model: Option<String>,

    /// Sampling temperature
    #[arg(short, long)]
    temperature: Option<f64>,

    /// Maximum output tokens
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Wait for the full answer instead of streaming
    #[arg(long)]
    no_stream: bool,
}

impl Cli {
    fn request(&self) -> InboundRequest {
        let mut messages = Vec::new();
        if let Some(system) = &self.system {
            messages.push(ChatMessage::text(Role::System, system.clone()));
        }
        messages.push(ChatMessage::text(Role::User, self.prompt.join(" ")));

        let mut request = ChatCompletionRequest::new(messages).with_stream(!self.no_stream);
        request.temperature = self.temperature;
        request.max_tokens = self.max_tokens.map(Into::into);
        request.into()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_relay=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let mut gemini = config.gemini.clone();
    if let Some(model) = &cli.model {
        gemini = gemini.with_model(model.clone());
    }

    let relay = ChatRelay::new(build_http_client(config.upstream_timeout_seconds)?, gemini);
    let request = cli.request();

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });

    let mut stdout = std::io::stdout();
    let streaming = request.wants_stream();
    let result = relay
        .send(&request, &cancel, |delta| {
            let _ = write!(stdout, "{}", delta);
            let _ = stdout.flush();
        })
        .await;

    match result {
        Ok(text) => {
            if !streaming {
                print!("{}", text);
            }
            println!();
            Ok(())
        }
        Err(RelayError::Aborted) => {
            eprintln!("\n[cancelled]");
            std::process::exit(130);
        }
        Err(e) => Err(e.into()),
    }
}
