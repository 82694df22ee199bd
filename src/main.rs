//! Build a function-calling schema from entities x attributes and run it.
//!
//! Usage:
//!   OPENAI_API_KEY=sk-... cargo run
//!   OPENAI_API_KEY=sk-... cargo run -- --demo
//!   cargo run -- --base-url http://localhost:1234 --model local-model --catalog my_examples.json

use std::io;
use std::path::PathBuf;

use clap::Parser;
use function_call_builder::{
    demo_request, CompletionConfig, FileResultStore, InvocationEvent, Invoker, Menu,
    OpenAiProvider,
};

#[derive(Parser)]
#[command(
    name = "function-call-builder",
    about = "Generate entity x attribute function schemas and call a chat completion API with them"
)]
struct Cli {
    /// Model to use
    #[arg(long, default_value = function_call_builder::config::DEFAULT_MODEL)]
    model: String,

    /// Max output tokens for the completion
    #[arg(long, default_value_t = function_call_builder::config::DEFAULT_MAX_TOKENS)]
    max_tokens: u32,

    /// Sampling temperature
    #[arg(long, default_value_t = function_call_builder::config::DEFAULT_TEMPERATURE)]
    temperature: f32,

    /// API base URL
    #[arg(long, default_value = "https://api.openai.com")]
    base_url: String,

    /// Premade example catalog (JSON array)
    #[arg(long, default_value = "examples.json")]
    catalog: PathBuf,

    /// Directory that receives `{function_name}.txt`
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Run the built-in country example and exit
    #[arg(long)]
    demo: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut provider = OpenAiProvider::new(cli.base_url.clone());
    if let Ok(key) = std::env::var("OPENAI_API_KEY") {
        provider = provider.with_api_key(key);
    }

    let config = CompletionConfig {
        model: cli.model.clone(),
        max_tokens: cli.max_tokens,
        temperature: cli.temperature,
    };
    let invoker =
        Invoker::new(provider, config).with_store(FileResultStore::new(&cli.output_dir));

    if cli.demo {
        let request = demo_request();
        let (tx, mut rx) = tokio::sync::mpsc::channel(8);
        let result = request
            .builder()
            .completion_streaming(&invoker, &request.user_message, tx)
            .await;

        while let Ok(event) = rx.try_recv() {
            if let InvocationEvent::Response {
                rendered,
                token_count,
            } = event
            {
                println!("{rendered}");
                println!("Token count: {token_count}");
            }
        }

        if let Err(e) = result {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
        return;
    }

    let stdin = io::stdin();
    let mut menu = Menu::new(stdin.lock(), io::stdout(), cli.catalog);
    if let Err(e) = menu.run(&invoker).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
