use crate::api::{LaunchSource, SpacexClient};
use crate::feed::{FetchOutcome, QueryController};
use crate::logging::{self, LogTarget, Verbosity};
use crate::model::{FeedConfig, LaunchRecord, PAGE_SIZE};
use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::io::Write;
use std::time::Duration;
use tokio::sync::mpsc;

pub const DEFAULT_API_URL: &str = "https://api.spacexdata.com/v4/launches/query";

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "spacex-launches",
    version,
    about = "Browse and search SpaceX launches with an infinite-scrolling TUI"
)]
pub struct Cli {
    /// Launch query endpoint
    #[arg(long, default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Initial search text (case-insensitive match on the launch name)
    #[arg(long, default_value = "")]
    pub search: String,

    /// Quiet interval after the last keystroke before a search is committed
    #[arg(long, default_value = "300ms")]
    pub debounce: humantime::Duration,

    /// Request timeout (no timeout when omitted)
    #[arg(long)]
    pub timeout: Option<humantime::Duration>,

    /// Print matching launches as JSON and exit (no TUI)
    #[arg(long, conflicts_with = "text")]
    pub json: bool,

    /// Print matching launches as text and exit (no TUI)
    #[arg(long)]
    pub text: bool,

    /// Pages of 10 launches to fetch in --json/--text mode
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub pages: u32,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log file used in TUI mode
    #[arg(long)]
    pub log_file: Option<std::path::PathBuf>,
}

impl Cli {
    fn interactive(&self) -> bool {
        cfg!(feature = "tui") && !self.json && !self.text
    }
}

/// Build a `FeedConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> FeedConfig {
    FeedConfig {
        api_url: args.api_url.clone(),
        page_size: PAGE_SIZE,
        debounce: Duration::from(args.debounce),
        request_timeout: args.timeout.map(Duration::from),
        user_agent: format!("spacex-launches/{}", env!("CARGO_PKG_VERSION")),
    }
}

pub async fn run(args: Cli) -> Result<()> {
    let verbosity = Verbosity::from_flags(args.quiet, args.verbose);
    let target = if args.interactive() {
        LogTarget::File(
            args.log_file
                .clone()
                .unwrap_or_else(logging::default_log_path),
        )
    } else {
        LogTarget::Stderr
    };
    logging::init_logging(verbosity, &target)?;

    let cfg = build_config(&args);

    if args.interactive() {
        #[cfg(feature = "tui")]
        {
            return crate::tui::run(cfg, args.search.clone()).await;
        }
    }

    let client = SpacexClient::new(&cfg)?;
    if args.json {
        run_json(&client, &args).await
    } else {
        run_text(&client, &args).await
    }
}

/// Fetch up to `pages` pages of `search`, stopping early once the query is exhausted.
pub(crate) async fn fetch_pages<S: LaunchSource>(
    source: &S,
    search: &str,
    pages: u32,
) -> Result<QueryController> {
    let mut query = QueryController::new(search);
    while let Some(ticket) = query.next_fetch() {
        let docs = source
            .fetch_page(&ticket.search, ticket.page)
            .await
            .with_context(|| format!("fetch launches page {}", ticket.page))?;
        if query.apply(&ticket, Ok(docs)) == FetchOutcome::Exhausted || ticket.page >= pages {
            break;
        }
        query.advance_page();
    }
    Ok(query)
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    search: &'a str,
    pages: u32,
    has_more: bool,
    launches: &'a [LaunchRecord],
}

async fn run_json(client: &SpacexClient, args: &Cli) -> Result<()> {
    let query = fetch_pages(client, &args.search, args.pages).await?;
    let out = JsonOutput {
        search: query.search_text(),
        pages: query.page(),
        has_more: query.has_more(),
        launches: query.records(),
    };
    let (tx, handle) = spawn_output_writer();
    let _ = tx.send(OutputLine::Stdout(serde_json::to_string_pretty(&out)?));
    drop(tx);
    let _ = handle.await;
    Ok(())
}

async fn run_text(client: &SpacexClient, args: &Cli) -> Result<()> {
    let (out_tx, out_handle) = spawn_output_writer();
    let _ = out_tx.send(OutputLine::Stderr(format!(
        "Querying {} for \"{}\"",
        client.query_url(),
        args.search
    )));

    let query = fetch_pages(client, &args.search, args.pages).await?;
    let summary = crate::text_summary::build_text_summary(&query, time::OffsetDateTime::now_utc());
    for line in summary.lines {
        let _ = out_tx.send(OutputLine::Stdout(line));
    }
    drop(out_tx);
    let _ = out_handle.await;
    Ok(())
}
