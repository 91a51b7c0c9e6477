//! Playfair CLI - classical digraph cipher
//!
//! Encrypts and decrypts text, shows key matrices, keeps a per-session
//! history, and can serve JSON requests line by line over stdin/stdout.

use clap::{Parser, Subcommand};
use std::error::Error as StdError;
use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;
use std::process;

use playfair::cipher::Direction;
use playfair::config::{Config, DEFAULT_SESSION, default_history_dir};
use playfair::dispatch::{Dispatcher, Request, Response};
use playfair::error::{ErrorCategory, ErrorKind, PlayfairError, Result};
use playfair::history::{DEFAULT_CAPACITY, HistoryStore};
use playfair::{build_matrix, render};

#[derive(Parser)]
#[command(name = "playfair")]
#[command(version)]
#[command(about = "Classical Playfair cipher.", long_about = None)]
struct Cli {
    /// History session to read and record
    #[arg(long, global = true, env = "PLAYFAIR_SESSION", default_value = DEFAULT_SESSION)]
    session: String,

    /// Directory holding session history files [default: ~/.playfair]
    #[arg(long, global = true, env = "PLAYFAIR_HISTORY_DIR", value_name = "DIR")]
    history_dir: Option<PathBuf>,

    /// Number of history entries kept per session
    #[arg(long, global = true, default_value_t = DEFAULT_CAPACITY)]
    history_capacity: usize,

    /// Do not record encrypt/decrypt operations in the history
    #[arg(long, global = true)]
    no_history: bool,

    /// Output machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt text
    #[command(alias = "e")]
    Encrypt {
        /// Cipher key
        #[arg(short, long)]
        key: String,

        /// Text to encrypt; read from stdin when omitted
        text: Option<String>,
    },

    /// Decrypt text
    #[command(alias = "d")]
    Decrypt {
        /// Cipher key
        #[arg(short, long)]
        key: String,

        /// Text to decrypt; read from stdin when omitted
        text: Option<String>,
    },

    /// Show the 5x5 matrix derived from a key
    Matrix {
        /// Cipher key
        #[arg(short, long)]
        key: String,
    },

    /// List the session history, most recent first
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,
    },

    /// Answer JSON requests read one per line from stdin
    Serve,
}

#[derive(Subcommand)]
enum HistoryAction {
    /// Remove every entry from the session history
    Clear,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "playfair=warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", error_chain(&e));
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config {
        history_dir: cli.history_dir.unwrap_or_else(default_history_dir),
        session: cli.session,
        capacity: cli.history_capacity,
        record_history: !cli.no_history,
    };

    match cli.command {
        Commands::Encrypt { key, text } => {
            let plaintext = text_or_stdin(text)?;
            let mut dispatcher = config.dispatcher()?;
            let response = dispatcher.handle(Request::Encrypt { plaintext, key })?;
            print_cipher(Direction::Encrypt, response, cli.json)
        }
        Commands::Decrypt { key, text } => {
            let ciphertext = text_or_stdin(text)?;
            let mut dispatcher = config.dispatcher()?;
            let response = dispatcher.handle(Request::Decrypt { ciphertext, key })?;
            print_cipher(Direction::Decrypt, response, cli.json)
        }
        Commands::Matrix { key } => {
            let matrix = build_matrix(&key);
            if cli.json {
                let json = serde_json::to_string(&matrix).map_err(|e| {
                    PlayfairError::with_kind_and_source(
                        ErrorCategory::Internal,
                        ErrorKind::Serialization,
                        "failed to encode matrix",
                        e,
                    )
                })?;
                println!("{}", json);
            } else {
                println!("{}", render::matrix(&matrix));
            }
            Ok(())
        }
        Commands::History { action } => {
            let mut dispatcher = config.dispatcher()?;
            match action {
                None => {
                    let response = dispatcher.handle(Request::GetHistory)?;
                    if cli.json {
                        println!("{}", response.to_json()?);
                    } else if let Response::History { history, .. } = response {
                        print!("{}", render::history(&history));
                    }
                }
                Some(HistoryAction::Clear) => {
                    let response = dispatcher.handle(Request::ClearHistory)?;
                    if cli.json {
                        println!("{}", response.to_json()?);
                    } else {
                        println!("History cleared");
                    }
                }
            }
            Ok(())
        }
        Commands::Serve => {
            let mut dispatcher = config.dispatcher()?;
            serve(&mut dispatcher, io::stdin().lock(), io::stdout().lock())
        }
    }
}

/// Handles one JSON request per input line, writing one JSON response per line.
///
/// A line that fails to parse or to execute gets a failure response and the
/// loop carries on. Invalid UTF-8 is decoded lossily so such a line is
/// answered like any other malformed request. Blank lines are skipped.
fn serve<S: HistoryStore>(
    dispatcher: &mut Dispatcher<S>,
    input: impl BufRead,
    mut output: impl Write,
) -> Result<()> {
    for line in input.split(b'\n') {
        let line = line.map_err(|e| io_error("failed to read request", e))?;
        let line = String::from_utf8_lossy(&line);
        if line.trim().is_empty() {
            continue;
        }
        let response = match Request::from_json(&line).and_then(|r| dispatcher.handle(r)) {
            Ok(response) => response,
            Err(e) => {
                let chain = error_chain(&e);
                tracing::warn!(error = %chain, "request failed");
                Response::failed(chain)
            }
        };
        writeln!(output, "{}", response.to_json()?)
            .and_then(|_| output.flush())
            .map_err(|e| io_error("failed to write response", e))?;
    }
    Ok(())
}

fn print_cipher(direction: Direction, response: Response, json: bool) -> Result<()> {
    if json {
        println!("{}", response.to_json()?);
    }
    match response.into_cipher_output() {
        Some(output) => {
            if !json {
                print!("{}", render::cipher_output(direction, &output));
            }
            Ok(())
        }
        None => Err(PlayfairError::with_kind(
            ErrorCategory::User,
            ErrorKind::InvalidRequest,
            format!(
                "nothing to {}: both text and key are required",
                direction.as_str()
            ),
        )),
    }
}

fn text_or_stdin(text: Option<String>) -> Result<String> {
    match text {
        Some(text) => Ok(text),
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .map_err(|e| io_error("failed to read text from stdin", e))?;
            Ok(String::from_utf8_lossy(&buf).into_owned())
        }
    }
}

fn io_error(msg: &str, err: io::Error) -> PlayfairError {
    PlayfairError::with_kind_and_source(ErrorCategory::Internal, ErrorKind::Io, msg, err)
}

fn error_chain(err: &PlayfairError) -> String {
    let mut msg = err.to_string();
    let mut source = StdError::source(err);
    while let Some(e) = source {
        msg.push_str(": ");
        msg.push_str(&e.to_string());
        source = e.source();
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;
    use playfair::history::{FileHistoryStore, MemoryHistoryStore};
    use tempfile::TempDir;

    fn serve_lines(input: impl AsRef<[u8]>) -> Vec<serde_json::Value> {
        serve_with(Dispatcher::new(MemoryHistoryStore::default()), input.as_ref())
    }

    fn serve_with<S: HistoryStore>(
        mut dispatcher: Dispatcher<S>,
        input: &[u8],
    ) -> Vec<serde_json::Value> {
        let mut out = Vec::new();
        serve(&mut dispatcher, input, &mut out).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_serve_answers_each_line() {
        let responses = serve_lines(concat!(
            r#"{"action":"encrypt","plaintext":"HELLO","key":"MONARCHY"}"#,
            "\n\n",
            r#"{"action":"get_history"}"#,
            "\n",
        ));
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["result"], "CFSUPM");
        assert_eq!(responses[1]["history"][0]["output"], "CFSUPM");
    }

    #[test]
    fn test_serve_survives_bad_lines() {
        let responses = serve_lines(concat!(
            "garbage\n",
            r#"{"action":"launch_missiles"}"#,
            "\n",
            r#"{"action":"decrypt","ciphertext":"CFSUPM","key":"MONARCHY"}"#,
            "\n",
        ));
        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["success"], false);
        assert!(responses[0]["error"].as_str().unwrap().starts_with("invalid request"));
        assert_eq!(responses[1]["success"], false);
        assert_eq!(responses[2]["result"], "HELXLO");
    }

    #[test]
    fn test_serve_answers_invalid_utf8_line() {
        let mut input = b"\xff\xfe garbage\n".to_vec();
        input.extend_from_slice(br#"{"action":"encrypt","plaintext":"HELLO","key":"MONARCHY"}"#);
        input.extend_from_slice(b"\r\n");

        let responses = serve_lines(&input);
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["success"], false);
        assert!(responses[0]["error"].as_str().unwrap().starts_with("invalid request"));
        assert_eq!(responses[1]["success"], true);
        assert_eq!(responses[1]["result"], "CFSUPM");
    }

    #[test]
    fn test_serve_failure_carries_cause() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("default.json"), "not json").unwrap();
        let store = FileHistoryStore::open(temp_dir.path(), "default", DEFAULT_CAPACITY).unwrap();

        let responses = serve_with(Dispatcher::new(store), br#"{"action":"get_history"}"#);
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["success"], false);
        let error = responses[0]["error"].as_str().unwrap();
        assert!(error.starts_with("failed to load history: history file "), "{}", error);
        assert!(error.contains("is not valid: "), "{}", error);
    }

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
