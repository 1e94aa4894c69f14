use anyhow::Result;
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use docchat_cli::{Action, App, GeminiHandleFactory, parse_action, ui};

#[derive(Parser)]
#[command(name = "docchat")]
#[command(about = "Chat with a PDF from your terminal, powered by Gemini", long_about = None)]
struct Cli {
    /// PDF (or .txt/.md) to ingest at startup
    #[arg(short, long)]
    pdf: Option<PathBuf>,

    /// Gemini model to use for the chat
    #[arg(short, long, default_value = "gemini-2.5-flash")]
    model: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    ui::display_banner();

    let mut app = App::new(Box::new(GeminiHandleFactory::new()));

    let outcome = app.dispatch(Action::SelectModel(cli.model)).await;
    ui::render_outcome(&outcome);

    // Credential gate: nothing proceeds without a key
    submit_credential(&mut app).await?;

    if let Some(pdf) = cli.pdf {
        run_action(&mut app, Action::Open(pdf)).await;
    }

    let mut history = Vec::new();

    loop {
        if app.needs_credential() {
            submit_credential(&mut app).await?;
        }

        let input = ui::handle_input_with_history(&mut history).await?;

        let Some(action) = parse_action(&input) else {
            continue;
        };

        if matches!(action, Action::Quit) {
            println!("{}", "👋 Goodbye!".green());
            break;
        }

        run_action(&mut app, action).await;
    }

    Ok(())
}

/// Prompt for the API key until a non-empty one is accepted
async fn submit_credential(app: &mut App) -> Result<()> {
    while app.needs_credential() {
        let key = ui::prompt_secret("Gemini API Key")?;
        let outcome = app.dispatch(Action::SubmitCredential(key)).await;
        ui::render_outcome(&outcome);
    }
    Ok(())
}

async fn run_action(app: &mut App, action: Action) {
    match &action {
        Action::Open(_) => println!(
            "{}",
            "⏳ Processing PDF and building knowledge base...".dimmed()
        ),
        Action::Ask(_) => println!("{}", "🤔 Thinking...".dimmed()),
        _ => {}
    }

    let outcome = app.dispatch(action).await;
    ui::render_outcome(&outcome);
}
