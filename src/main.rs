use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use subsearch::app::{self, RunOptions};
use subsearch::config::Credential;
use subsearch::http::ReqwestTransport;
use subsearch::query::{DEFAULT_MAX_RETRIES, QueryRunner};
use subsearch::runtime::RealRuntime;
use subsearch::search::DEFAULT_PAGE_SIZE;

/// subsearch - page through submission search results
///
/// Queries `https://<hostname>/api/v2/search/submissions` page by page and
/// prints the `sample` of every result, one per line.
///
/// The API key and hostname are read from an INI config file with a `[Main]`
/// section, or from SUBSEARCH_API_KEY and SUBSEARCH_HOSTNAME.
///
/// Examples:
///   subsearch 1.2.3.4                  # Search using ./api.cfg
///   subsearch -c ~/keys.cfg evil.com   # Use another config file
#[derive(Parser, Debug)]
#[command(author, version = env!("SUBSEARCH_VERSION"), about)]
struct Cli {
    /// Search term
    #[arg(value_name = "QUERY")]
    query: String,

    /// Config file (default: ./api.cfg, then the user config dir)
    #[arg(long, short = 'c', env = "SUBSEARCH_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Results per page
    #[arg(
        long,
        short = 'l',
        default_value_t = DEFAULT_PAGE_SIZE,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    limit: u64,

    /// Retries per page after the first attempt
    #[arg(long, short = 'r', default_value_t = DEFAULT_MAX_RETRIES)]
    retries: usize,

    /// API base URL (overrides https://<hostname>)
    #[arg(long = "api-url", value_name = "URL")]
    api_url: Option<String>,

    /// Per-request timeout in seconds (default: no timeout)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Append log records to this file instead of stderr
    #[arg(long = "log-file", value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let runtime = RealRuntime;

    subsearch::logging::init(&runtime, cli.log_file.as_deref())?;

    let credential = Credential::load(&runtime, cli.config.as_deref())?;
    let base_url = cli.api_url.unwrap_or_else(|| credential.base_url());

    let transport = ReqwestTransport::with_timeout(cli.timeout.map(Duration::from_secs))?;
    let runner = QueryRunner::new(transport, credential.api_key).with_max_retries(cli.retries);

    let options = RunOptions {
        base_url,
        query: cli.query,
        limit: cli.limit,
    };

    let stdout = std::io::stdout();
    app::run(&runner, &options, &mut stdout.lock()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["subsearch", "1.2.3.4"]).unwrap();
        assert_eq!(cli.query, "1.2.3.4");
        assert_eq!(cli.limit, 10);
        assert_eq!(cli.retries, 3);
        assert_eq!(cli.api_url, None);
        assert_eq!(cli.timeout, None);
        assert_eq!(cli.log_file, None);
    }

    #[test]
    fn test_cli_all_options() {
        let cli = Cli::try_parse_from([
            "subsearch",
            "--config",
            "/tmp/api.cfg",
            "--limit",
            "50",
            "-r",
            "0",
            "--api-url",
            "http://127.0.0.1:8080",
            "--timeout",
            "30",
            "--log-file",
            "logs.txt",
            "evil.exe",
        ])
        .unwrap();

        assert_eq!(cli.query, "evil.exe");
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/api.cfg")));
        assert_eq!(cli.limit, 50);
        assert_eq!(cli.retries, 0);
        assert_eq!(cli.api_url.as_deref(), Some("http://127.0.0.1:8080"));
        assert_eq!(cli.timeout, Some(30));
        assert_eq!(cli.log_file, Some(PathBuf::from("logs.txt")));
    }

    #[test]
    fn test_cli_rejects_zero_limit() {
        assert!(Cli::try_parse_from(["subsearch", "--limit", "0", "q"]).is_err());
    }

    #[test]
    fn test_cli_requires_query() {
        assert!(Cli::try_parse_from(["subsearch"]).is_err());
    }
}
