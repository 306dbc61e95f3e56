use std::path::PathBuf;

use clap::Parser;

/// Ask the qset.io assistant a question
#[derive(Parser, Debug)]
#[command(name = "qset-chat", version)]
pub struct Cli {
    /// Question to send. Starts an interactive prompt when omitted
    pub query: Option<String>,

    /// Overrides the system prompt sent before the question
    #[arg(long)]
    pub system_prompt: Option<String>,

    /// Overrides the chat endpoint URL
    #[arg(long)]
    pub api_url: Option<String>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the answer once it is complete instead of streaming it
    #[arg(long)]
    pub no_stream: bool,

    /// Sets the logging verbosity level for the application
    /// Possible values: "error", "warn", "info", "debug", "trace"
    /// Default: "warn"
    #[arg(long, default_value_t = String::from("warn"))]
    pub logging_level: String,

    /// Also write logs to a daily rotating file under "logs"
    #[arg(long)]
    pub log_file: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_is_optional() {
        let cli = Cli::try_parse_from(["qset-chat"]).unwrap();
        assert!(cli.query.is_none());
        assert!(!cli.no_stream);
        assert_eq!(cli.logging_level, "warn");
    }

    #[test]
    fn parses_overrides() {
        let cli = Cli::try_parse_from([
            "qset-chat",
            "what is rust?",
            "--no-stream",
            "--api-url",
            "http://localhost:3000/chat",
            "-c",
            "chat.toml",
        ])
        .unwrap();
        assert_eq!(cli.query.as_deref(), Some("what is rust?"));
        assert!(cli.no_stream);
        assert_eq!(cli.api_url.as_deref(), Some("http://localhost:3000/chat"));
        assert_eq!(cli.config, Some(PathBuf::from("chat.toml")));
    }
}
