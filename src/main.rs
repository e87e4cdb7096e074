//! Reel-Diff main entry point
//!
//! Command-line interface: compare two Letterboxd users' watched films and
//! print the films the first has seen that the second has not, ranked by
//! the first user's rating, like, and watchlist signals.

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use reel_diff::compare::{candidates, render_markdown, render_row};
use reel_diff::config::{load_config_or_default, Config};
use reel_diff::fetch::{build_http_client, HttpFetcher, NullSink, ProgressSink};
use reel_diff::grab::{ClassifierRules, Grabber};
use reel_diff::listing::ResourceKind;
use reel_diff::username::resolve_user;
use reel_diff::{FetchError, ReelError, SqliteCache, SystemClock};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use url::Url;

/// Reel-Diff: find films to recommend between two Letterboxd users
///
/// Fetches both users' watched films (and the first user's watchlist),
/// caches them locally, and prints everything the first user has watched
/// that the second has not.
#[derive(Parser, Debug)]
#[command(name = "reel-diff")]
#[command(version)]
#[command(about = "Compare two Letterboxd users' watched films", long_about = None)]
struct Cli {
    /// Username (or boxd.it link) whose watched films seed the comparison
    #[arg(value_name = "FROM_USER")]
    from_user: String,

    /// Username (or boxd.it link) to diff against
    #[arg(value_name = "TO_USER")]
    to_user: String,

    /// Path to TOML configuration file
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Re-fetch listings even when fresh cached copies exist
    #[arg(long)]
    refresh: bool,

    /// Also write the candidate list to a markdown file
    #[arg(long, value_name = "PATH")]
    markdown: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_config_or_default(cli.config.as_deref())?;

    if let Err(e) = run_compare(&cli, config).await {
        report_failure(&e);
        std::process::exit(1);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("reel_diff=info,warn"),
            1 => EnvFilter::new("reel_diff=debug,info"),
            2 => EnvFilter::new("reel_diff=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Runs the full comparison session
async fn run_compare(cli: &Cli, config: Config) -> reel_diff::Result<()> {
    let base_url = Url::parse(&config.source.base_url)?;
    let client = build_http_client()?;

    let from_user = resolve_user(&client, &cli.from_user).await?;
    let to_user = resolve_user(&client, &cli.to_user).await?;
    tracing::info!("comparing {} against {}", from_user, to_user);

    let mut store = SqliteCache::open(Path::new(&config.cache.database_path))?;
    let fetcher = HttpFetcher::with_client(client);
    let clock = SystemClock;
    let rules = ClassifierRules {
        denied_watchlist_as_private: config.rules.treat_denied_watchlist_as_private,
    };
    let mut grabber = Grabber::new(
        &mut store,
        &fetcher,
        &clock,
        base_url.clone(),
        config.cache.max_age(),
        rules,
    );

    // An error from any of the three grabs ends the whole session; the
    // comparison needs both sides complete
    let from_films = grab_one(&mut grabber, &from_user, ResourceKind::Films, cli).await?;
    let from_watchlist = grab_one(&mut grabber, &from_user, ResourceKind::Watchlist, cli).await?;
    let to_films = grab_one(&mut grabber, &to_user, ResourceKind::Films, cli).await?;

    let watched = from_films.into_films();
    let seen_by_other = to_films.into_films();
    let watchlist = from_watchlist.into_watchlist();

    let cands = candidates(&watched, &seen_by_other, &watchlist);
    println!(
        "{} film(s) {} has watched that {} hasn't:",
        cands.len(),
        from_user,
        to_user
    );
    for candidate in &cands {
        println!("{}", render_row(candidate, &base_url));
    }

    if let Some(path) = &cli.markdown {
        std::fs::write(path, render_markdown(&cands, &base_url))?;
        println!();
        println!("Wrote markdown summary to {}", path.display());
    }

    Ok(())
}

/// Grabs one listing, with a progress bar unless running quiet
async fn grab_one(
    grabber: &mut Grabber<'_>,
    username: &str,
    kind: ResourceKind,
    cli: &Cli,
) -> reel_diff::Result<reel_diff::Listing> {
    if cli.quiet {
        return grabber.grab(username, kind, cli.refresh, &mut NullSink).await;
    }

    let mut sink = BarSink::new();
    let result = grabber.grab(username, kind, cli.refresh, &mut sink).await;
    sink.bar.finish_and_clear();
    result
}

const BAR_UNITS: u64 = 100;

/// Progress sink rendering onto an indicatif bar
struct BarSink {
    bar: ProgressBar,
}

impl BarSink {
    fn new() -> Self {
        let bar = ProgressBar::new(BAR_UNITS);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{msg:30} [{bar:30}] {percent}%")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self { bar }
    }
}

impl ProgressSink for BarSink {
    fn report(&mut self, fraction: f64, label: &str) {
        self.bar.set_message(label.to_string());
        self.bar
            .set_position((fraction * BAR_UNITS as f64).round() as u64);
    }
}

/// Prints a cause-specific message for a failed session
fn report_failure(error: &ReelError) {
    match error {
        ReelError::UserNotFound { username } => {
            eprintln!(
                "No user named {:?} was found. Check the spelling or the link.",
                username
            );
        }
        ReelError::Fetch {
            source: FetchError::AccessDenied,
            ..
        } => {
            eprintln!(
                "The site is refusing requests (rate-limited or blocked). Wait a while and try again."
            );
        }
        ReelError::Fetch {
            source: FetchError::PrivateRoute,
            ..
        } => {
            eprintln!("That films listing is private, so there is nothing to compare.");
        }
        other => {
            eprintln!("Error: {}", other);
        }
    }
}
