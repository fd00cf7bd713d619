//! netlib - run a keyword on the remote network library from the shell.
//!
//! ```text
//! netlib [--host H] [--port P] [--timeout SECS] --list
//! netlib [--host H] [--port P] [--timeout SECS] <KEYWORD> [ARG...]
//! ```
//!
//! Each `ARG` is parsed as JSON when possible (`5`, `true`, `["a"]`) and
//! sent as a plain string otherwise. The result is printed as JSON.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use netlib_rpc::{ClientConfig, NetworkLibrary};

// CLI
#[derive(Debug, Parser)]
#[command(name = "netlib")]
#[command(version)]
#[command(about = "Run a keyword on the remote network library")]
#[command(after_help = "Example:\n  netlib \"Ping Test\" h1 8.8.8.8 default 5")]
struct Cli {
    /// Remote library host (overrides NETLIB_HOST, default localhost)
    #[arg(long)]
    host: Option<String>,

    /// Remote library port (overrides NETLIB_PORT, default 8270)
    #[arg(long)]
    port: Option<u16>,

    /// Per-operation timeout in seconds (overrides NETLIB_TIMEOUT_SECS, default 30)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Print the keywords the remote library offers
    #[arg(long, conflicts_with = "keyword")]
    list: bool,

    /// Keyword to run, e.g. "Execute Command"
    #[arg(required_unless_present = "list")]
    keyword: Option<String>,

    /// Keyword arguments; JSON where it parses, strings otherwise
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

impl Cli {
    /// Apply command-line overrides on top of `base`.
    fn config(&self, mut base: ClientConfig) -> ClientConfig {
        if let Some(host) = &self.host {
            base.host = host.clone();
        }
        if let Some(port) = self.port {
            base.port = port;
        }
        if let Some(secs) = self.timeout {
            base.timeout = Duration::from_secs(secs);
        }
        base
    }

    fn keyword_args(&self) -> Vec<Value> {
        self.args.iter().map(|raw| parse_arg(raw)).collect()
    }
}

/// Interpret a positional argument: JSON if it parses, string otherwise.
fn parse_arg(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only the result.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "netlib=info".into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let base = ClientConfig::from_env().context("Invalid environment configuration")?;
    let library = NetworkLibrary::new(cli.config(base));
    let address = library.client().config().address();

    let result = match &cli.keyword {
        Some(keyword) if !cli.list => {
            tracing::info!("Running {:?} on {}", keyword, address);
            library.client().run_keyword(keyword, cli.keyword_args()).await
        }
        _ => {
            tracing::info!("Listing keywords on {}", address);
            library.keyword_names().await.map(Value::from)
        }
    };

    match result {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Call failed: {}", e);
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_keyword_with_mixed_args() {
        let cli = Cli::try_parse_from(["netlib", "Ping Test", "h1", "8.8.8.8", "default", "5"])
            .unwrap();

        assert_eq!(cli.config(ClientConfig::default()), ClientConfig::default());
        assert_eq!(cli.keyword.as_deref(), Some("Ping Test"));
        assert_eq!(
            cli.keyword_args(),
            vec![json!("h1"), json!("8.8.8.8"), json!("default"), json!(5)]
        );
    }

    #[test]
    fn test_parse_overrides_config() {
        let cli = Cli::try_parse_from([
            "netlib", "--host", "10.9.9.9", "--port", "18270", "--timeout", "3", "--list",
        ])
        .unwrap();

        let config = cli.config(ClientConfig::default());
        assert_eq!(config.address(), "10.9.9.9:18270");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert!(cli.list);
        assert_eq!(cli.keyword, None);
    }

    #[test]
    fn test_hyphen_values_pass_through() {
        let cli = Cli::try_parse_from(["netlib", "Execute Command", "h1", "--help", "-5"]).unwrap();

        assert_eq!(cli.keyword.as_deref(), Some("Execute Command"));
        assert_eq!(cli.keyword_args(), vec![json!("h1"), json!("--help"), json!(-5)]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(Cli::try_parse_from(["netlib"]).is_err());
        assert!(Cli::try_parse_from(["netlib", "--port", "x", "--list"]).is_err());
        assert!(Cli::try_parse_from(["netlib", "--timeout", "0", "--list"]).is_err());
        assert!(Cli::try_parse_from(["netlib", "--bogus", "--list"]).is_err());
        assert!(Cli::try_parse_from(["netlib", "--list", "Ping Test"]).is_err());
    }

    #[test]
    fn test_parse_arg_json_or_string() {
        assert_eq!(parse_arg("5"), json!(5));
        assert_eq!(parse_arg("[\"a\",1]"), json!(["a", 1]));
        assert_eq!(parse_arg("GigabitEthernet0/0/0/1"), json!("GigabitEthernet0/0/0/1"));
    }
}
