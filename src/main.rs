#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::cargo)]
#![warn(clippy::perf)]
#![warn(clippy::complexity)]
#![warn(clippy::style)]
#![allow(clippy::multiple_crate_versions)]

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result, bail};
use clap::Parser;
use m3u_squirrel::{
    M3uParser, ParserOptions, Playlist,
    config::{DEFAULT_PARALLELISM, DEFAULT_USER_AGENT},
    util::{spawn_ct_watcher, warn_ulimit},
};
use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Parses an M3U playlist, optionally checks which streams are alive, and exports it
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Playlist URL, file path or raw playlist text
    source: String,

    /// Probe every stream and record whether it answered
    #[arg(short, long, env = "M3U_CHECK_LIVE")]
    check_live: bool,

    /// Keep every field in the output, using null for missing values
    #[arg(short, long, env = "M3U_ENFORCE_SCHEMA")]
    enforce_schema: bool,

    /// Liveness probe timeout in seconds
    #[arg(short, long, env = "M3U_TIMEOUT", default_value_t = 5)]
    timeout: u64,

    /// User-Agent sent with every request
    #[arg(short, long, env = "M3U_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// The amount of liveness probes running at once
    #[arg(short, long, env = "M3U_PARALLELISM", default_value_t = DEFAULT_PARALLELISM)]
    parallelism: usize,

    /// Keep entries whose field matches, e.g. `category=news,sports` (repeatable)
    #[arg(long, value_name = "KEY=TERMS")]
    retrieve: Vec<String>,

    /// Drop entries whose field matches, e.g. `url=.mp4` (repeatable)
    #[arg(long, value_name = "KEY=TERMS")]
    remove: Vec<String>,

    /// Sort entries by a field, e.g. `title` or `country-name`
    #[arg(short, long, value_name = "KEY")]
    sort: Option<String>,

    /// Sort in descending order
    #[arg(long, requires = "sort")]
    desc: bool,

    /// Files to write, `.json`, `.m3u` or `.m3u8` (prints JSON to stdout when omitted)
    #[arg(short, long)]
    output: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if args.check_live {
        warn_ulimit(args.parallelism);
    }

    let parser = M3uParser::new(ParserOptions {
        timeout: Duration::from_secs(args.timeout),
        user_agent: args.user_agent.clone(),
        check_live: args.check_live,
        enforce_schema: args.enforce_schema,
        parallelism: args.parallelism,
        show_progress: true,
    });

    let ct = CancellationToken::new();
    spawn_ct_watcher(ct.clone());

    let mut playlist = select! {
        () = ct.cancelled() => bail!("Cancelled before parsing finished, nothing was written"),
        playlist = parser.parse(&args.source) => playlist.context("Loading playlist")?,
    };
    info!("Parsed {} entries", playlist.len());

    apply_filters(&mut playlist, &args.retrieve, true)?;
    apply_filters(&mut playlist, &args.remove, false)?;
    if let Some(key) = &args.sort {
        playlist.sort_by(key, !args.desc);
    }

    if args.output.is_empty() {
        println!("{}", playlist.to_json()?);
        return Ok(());
    }

    for path in &args.output {
        playlist
            .save_to_file(path)
            .await
            .with_context(|| format!("Saving playlist to {path:?}"))?;
    }

    info!("All done successfully!");
    Ok(())
}

fn apply_filters(playlist: &mut Playlist, filters: &[String], retain: bool) -> Result<()> {
    for filter in filters {
        let Some((key, terms)) = filter.split_once('=') else {
            bail!("Filter `{filter}` should look like KEY=TERM[,TERM...]");
        };
        let terms = terms
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<&str>>();
        playlist.filter_by(key.trim(), &terms, retain);
    }

    Ok(())
}
