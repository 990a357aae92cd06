//! `touchline chat` — Interactive or single-question chat mode.

use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use touchline_chat::{ChatEngine, ChatEvent, PromptAssembler};
use touchline_config::AppConfig;
use touchline_core::message::Transcript;
use touchline_core::ChatProvider;
use touchline_retrieval::VectorIndexClient;

/// Words that end an interactive session.
const EXIT_WORDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

pub async fn run(message: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Check for API key early — give a clear error
    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    export TOUCHLINE_API_KEY='sk-...'");
        eprintln!("    export OPENAI_API_KEY='sk-...'");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let provider: Arc<dyn ChatProvider> =
        Arc::new(touchline_providers::build_from_config(&config));
    let retriever = Arc::new(VectorIndexClient::from_config(
        &config.retrieval,
        provider.clone(),
    ));
    let assembler = PromptAssembler::from_config(&config.prompt)
        .map_err(|e| format!("Failed to load lexicon: {e}"))?;

    let engine = ChatEngine::new(
        provider,
        retriever,
        assembler,
        &config.model,
        config.temperature,
    )
    .with_max_tokens(config.max_tokens);

    if let Some(question) = message {
        // Single question mode
        let mut transcript = Transcript::new();
        run_turn(&engine, &mut transcript, &question).await?;
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║        Touchline — Tactical Analysis         ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Model:       {}", config.model);
    println!("  Collection:  {}", config.retrieval.collection);
    println!();
    println!("  Ask about match data and performance stats.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut transcript = Transcript::new();

    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break; // stdin closed
        };

        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if EXIT_WORDS.contains(&question.to_lowercase().as_str()) {
            break;
        }

        println!();
        if let Err(e) = run_turn(&engine, &mut transcript, question).await {
            eprintln!("  [Error] {e}");
        }
        println!();
    }

    println!();
    println!("  Goodbye! 👋");
    println!();

    Ok(())
}

/// Run one turn, rendering events as they arrive.
///
/// Fragments are appended to the terminal in arrival order; retrieval
/// progress goes to stderr so piped output stays clean.
async fn run_turn(
    engine: &ChatEngine,
    transcript: &mut Transcript,
    question: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let (tx, rx) = mpsc::channel(64);
    let renderer = spawn_renderer(rx);

    let result = engine.ask(transcript, question, &tx).await;
    drop(tx);
    renderer.await?;

    result?;
    Ok(())
}

/// Render turn events to the terminal as they arrive.
fn spawn_renderer(mut rx: mpsc::Receiver<ChatEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                ChatEvent::RetrievalStarted => {
                    eprint!("  Retrieving match data...");
                }
                ChatEvent::RetrievalFinished { .. } => {
                    eprint!("\r                          \r");
                }
                ChatEvent::Fragment { content } => {
                    print!("{content}");
                    let _ = std::io::stdout().flush();
                }
                ChatEvent::Done { .. } => {
                    println!();
                }
            }
        }
    })
}
