//! Command-line front end for listing the collections of a sync account.

use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};

use syncstore_collections::{
    CollectionInfoAccessor, CollectionInfoCallback, CollectionInfoError, TokenServerToken,
};
use syncstore_http::HttpExecutor;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_REQUEST_FAILURE: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// List the collections a sync account owns on its storage server
#[derive(Parser, Debug)]
#[command(name = "syncstore-collections")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Token server response (JSON) to read the token from
    #[arg(long, env = "SYNCSTORE_TOKEN_FILE")]
    pub token_file: Option<PathBuf>,

    /// Storage endpoint, when not using --token-file
    #[arg(long, env = "SYNCSTORE_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Hawk id, when not using --token-file
    #[arg(long, env = "SYNCSTORE_TOKEN_ID")]
    pub id: Option<String>,

    /// Hawk key, when not using --token-file
    #[arg(long, env = "SYNCSTORE_TOKEN_KEY", hide_env_values = true)]
    pub key: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "SYNCSTORE_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Print the names as a JSON array
    #[arg(long)]
    pub json: bool,

    /// Log more (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Default log filter when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("cannot read token file {path}: {source}")]
    TokenFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid token file {path}: {source}")]
    TokenJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no token: pass --token-file, or all of --endpoint, --id and --key")]
    MissingToken,

    #[error("HTTP client setup failed: {0}")]
    Http(#[from] syncstore_http::Error),

    #[error("output error: {0}")]
    Output(#[from] io::Error),
}

/// Build the token from a token file or from the individual flags.
pub fn load_token(args: &Args) -> Result<TokenServerToken, CliError> {
    if let Some(path) = &args.token_file {
        let contents = fs::read_to_string(path).map_err(|source| CliError::TokenFile {
            path: path.clone(),
            source,
        })?;
        return serde_json::from_str(&contents).map_err(|source| CliError::TokenJson {
            path: path.clone(),
            source,
        });
    }

    match (&args.endpoint, &args.id, &args.key) {
        (Some(endpoint), Some(id), Some(key)) => {
            Ok(TokenServerToken::new(id.as_str(), key.as_str(), endpoint.as_str()))
        }
        _ => Err(CliError::MissingToken),
    }
}

/// Writes each outcome to the matching stream and remembers the exit code.
struct Reporter<'a> {
    out: &'a mut dyn Write,
    err: &'a mut dyn Write,
    json: bool,
    exit_code: i32,
    write_error: Option<io::Error>,
}

impl Reporter<'_> {
    fn record(&mut self, result: io::Result<()>) {
        if let Err(e) = result {
            self.write_error.get_or_insert(e);
        }
    }
}

impl CollectionInfoCallback for Reporter<'_> {
    fn on_success(&mut self, collection_names: HashSet<String>) {
        let mut names: Vec<String> = collection_names.into_iter().collect();
        names.sort();

        let result = if self.json {
            serde_json::to_string(&names)
                .map_err(io::Error::other)
                .and_then(|line| writeln!(self.out, "{}", line))
        } else {
            names
                .iter()
                .try_for_each(|name| writeln!(self.out, "{}", name))
        };
        self.record(result);
        self.exit_code = EXIT_SUCCESS;
    }

    fn on_request_failure(&mut self, error: CollectionInfoError) {
        let result = writeln!(self.err, "Request failed: {}", error);
        self.record(result);
        self.exit_code = EXIT_REQUEST_FAILURE;
    }

    fn on_error(&mut self, error: CollectionInfoError) {
        let result = writeln!(self.err, "Error: {}", error);
        self.record(result);
        self.exit_code = EXIT_ERROR;
    }
}

/// Run one listing against `accessor` and return the process exit code.
pub fn run_with<E: HttpExecutor>(
    args: &Args,
    accessor: &CollectionInfoAccessor<E>,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<i32, CliError> {
    let token = load_token(args)?;
    tracing::debug!(endpoint = %token.endpoint, "loaded token");

    let mut reporter = Reporter {
        out,
        err,
        json: args.json,
        exit_code: EXIT_ERROR,
        write_error: None,
    };
    accessor.get_blocking(&token, &mut reporter);

    match reporter.write_error {
        Some(e) => Err(CliError::Output(e)),
        None => Ok(reporter.exit_code),
    }
}

/// Run with a reqwest-backed accessor, writing to stdout and stderr.
pub fn run(args: &Args) -> Result<i32, CliError> {
    let accessor = CollectionInfoAccessor::with_timeout(args.timeout())?;
    let stdout = io::stdout();
    let stderr = io::stderr();
    run_with(args, &accessor, &mut stdout.lock(), &mut stderr.lock())
}
