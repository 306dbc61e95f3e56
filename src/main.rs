//! Command line front end for the qset.io chat client.
//!
//! Sends a single question given on the command line, or reads questions
//! interactively until an empty line, `exit` or `quit`.

mod cli;

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use dialoguer::Input;
use qset_chat::config::{default_config_path, load_config};
use qset_chat::constants::ANSWER_PREFIX;
use qset_chat::utils::init_logging;
use qset_chat::{AiChat, ChatConfig, ChatError, ConfigError, QsetChat};
use tracing::{debug, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    init_logging(&cli.logging_level, cli.log_file);

    if let Err(e) = dotenvy::dotenv() {
        debug!("No .env file loaded: {}", e);
    }

    let chat = match build_config(&cli).and_then(QsetChat::from_config) {
        Ok(chat) => chat,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    let stream = !cli.no_stream;
    match cli.query {
        Some(query) => match ask(&chat, &query, stream).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{} {}", "Error:".red().bold(), e);
                ExitCode::FAILURE
            }
        },
        None => {
            interactive(&chat, stream).await;
            ExitCode::SUCCESS
        }
    }
}

/// Layers configuration: file, then environment, then command line flags.
fn build_config(cli: &cli::Cli) -> Result<ChatConfig, ConfigError> {
    let path = cli
        .config
        .clone()
        .or_else(|| default_config_path().filter(|p| p.exists()));

    let mut config = match path {
        Some(path) => load_config(path)?,
        None => ChatConfig::default(),
    };
    config.apply_env();

    if let Some(prompt) = &cli.system_prompt {
        config.system_prompt = prompt.clone();
    }
    if let Some(url) = &cli.api_url {
        config.api_url = url.clone();
    }
    Ok(config)
}

async fn ask(chat: &dyn AiChat, query: &str, stream: bool) -> Result<(), ChatError> {
    let answer = chat.send_query(query, stream).await?;
    if stream {
        println!();
    } else {
        println!("{} {}", ANSWER_PREFIX.green().bold(), answer);
    }
    Ok(())
}

async fn interactive(chat: &dyn AiChat, stream: bool) {
    loop {
        let query: String = match Input::new()
            .with_prompt("You")
            .allow_empty(true)
            .interact_text()
        {
            Ok(q) => q,
            Err(e) => {
                eprintln!("{} {}", "Error:".red().bold(), e);
                break;
            }
        };

        let query = query.trim();
        if query.is_empty() || query == "exit" || query == "quit" {
            info!("Leaving interactive session");
            break;
        }

        if stream {
            print!("{} ", ANSWER_PREFIX.green().bold());
        }
        if let Err(e) = ask(chat, query, stream).await {
            eprintln!("{} {}", "Error:".red().bold(), e);
        }
    }
}
