//! wmirror main entry point
//!
//! This is the command-line interface for the wmirror downloader and site
//! mirror.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use wmirror::config::{expand_home, load_config_with_hash, validate, Config};
use wmirror::crawler::{build_http_client, mirror, MirrorJob};
use wmirror::download::{
    download_all, download_file, parse_rate_limit, read_urls_from_file, Console, DownloadOptions,
};
use wmirror::output::print_summary;

/// File that receives all output in background mode
const BACKGROUND_LOG: &str = "wget-log";

/// wmirror: download files or mirror a web site
///
/// Without --mirror or -i, downloads the single URL given. With -i, downloads
/// every URL listed in the file concurrently. With --mirror, mirrors the site
/// rooted at URL into a directory named after its host.
#[derive(Parser, Debug)]
#[command(name = "wmirror")]
#[command(version)]
#[command(about = "Download files or mirror a web site", long_about = None)]
struct Cli {
    /// URL to download or mirror
    #[arg(value_name = "URL")]
    urls: Vec<String>,

    /// Save the download under this file name
    #[arg(short = 'O', value_name = "FILE")]
    output: Option<String>,

    /// Directory to save files in (`~` is expanded)
    #[arg(short = 'P', value_name = "DIR")]
    prefix: Option<String>,

    /// Run in background mode: write output to ./wget-log, no progress bar
    #[arg(short = 'B')]
    background: bool,

    /// Limit download speed (e.g. 400k, 2M)
    #[arg(long, value_name = "RATE")]
    rate_limit: Option<String>,

    /// Download every URL listed in FILE
    #[arg(short = 'i', value_name = "FILE", conflicts_with = "mirror")]
    input_file: Option<PathBuf>,

    /// Mirror the site rooted at URL
    #[arg(long)]
    mirror: bool,

    /// Comma-separated URL suffixes to reject when mirroring
    #[arg(short = 'R', long, value_name = "LIST", value_delimiter = ',', requires = "mirror")]
    reject: Vec<String>,

    /// Comma-separated path prefixes to exclude when mirroring
    #[arg(short = 'X', long, value_name = "LIST", value_delimiter = ',', requires = "mirror")]
    exclude: Vec<String>,

    /// Rewrite links in mirrored documents for offline browsing
    #[arg(long, requires = "mirror")]
    convert_links: bool,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            (config, Some(hash))
        }
        None => (Config::default(), None),
    };
    apply_cli_overrides(&mut config, &cli);
    validate(&config).context("Invalid configuration")?;

    let background = config.download.background;
    let console = if background {
        println!("Output will be written to '{}'.", BACKGROUND_LOG);
        let log = File::create(BACKGROUND_LOG)
            .with_context(|| format!("Failed to create {}", BACKGROUND_LOG))?;
        setup_logging(cli.verbose, cli.quiet, Some(log.try_clone()?));
        Console::log_file(log)
    } else {
        setup_logging(cli.verbose, cli.quiet, None);
        Console::Stdout
    };

    if let (Some(path), Some(hash)) = (&cli.config, &config_hash) {
        tracing::info!("Configuration loaded from {} (hash: {})", path.display(), hash);
    }

    if cli.mirror {
        handle_mirror(&cli, &config).await
    } else if let Some(path) = &cli.input_file {
        handle_input_file(&cli, &config, path, &console).await
    } else {
        handle_download(&cli, &config, &console).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// In background mode the log goes to the given file instead of stderr.
fn setup_logging(verbose: u8, quiet: bool, log_file: Option<File>) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("wmirror=info,warn"),
            1 => EnvFilter::new("wmirror=debug,info"),
            2 => EnvFilter::new("wmirror=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);

    match log_file {
        Some(file) => builder.with_ansi(false).with_writer(Mutex::new(file)).init(),
        None => builder.init(),
    }
}

/// Layers command-line flags over the configuration file
fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    if let Some(prefix) = &cli.prefix {
        config.mirror.output_dir = prefix.clone();
    }
    config.mirror.output_dir = expand_home(&config.mirror.output_dir)
        .to_string_lossy()
        .into_owned();

    config.mirror.reject.extend(cli.reject.iter().cloned());
    config.mirror.exclude.extend(cli.exclude.iter().cloned());
    config.mirror.convert_links |= cli.convert_links;

    if let Some(rate) = &cli.rate_limit {
        config.download.rate_limit = Some(rate.clone());
    }
    config.download.background |= cli.background;
}

fn download_options(cli: &Cli, config: &Config) -> Result<DownloadOptions> {
    let rate_limit = parse_rate_limit(config.download.rate_limit.as_deref().unwrap_or(""))?;

    Ok(DownloadOptions {
        output_name: cli.output.clone(),
        directory: PathBuf::from(&config.mirror.output_dir),
        rate_limit,
        show_progress: !config.download.background,
    })
}

fn single_url(cli: &Cli) -> Result<&str> {
    match cli.urls.as_slice() {
        [url] => Ok(url.as_str()),
        [] => bail!("No URL given"),
        _ => bail!("Expected exactly one URL, got {}", cli.urls.len()),
    }
}

/// Handles --mirror: mirrors the site and prints the summary
async fn handle_mirror(cli: &Cli, config: &Config) -> Result<()> {
    let url = single_url(cli)?;
    let job = MirrorJob::new(url, &config.mirror)?;

    tracing::info!(
        "Reject: {:?}, Exclude: {:?}, Convert links: {}",
        job.reject,
        job.exclude,
        job.convert_links
    );

    match mirror(job, &config.http).await {
        Ok(summary) => {
            print_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Mirror failed: {}", e);
            Err(e.into())
        }
    }
}

/// Handles -i: downloads every listed URL concurrently
async fn handle_input_file(
    cli: &Cli,
    config: &Config,
    path: &std::path::Path,
    console: &Console,
) -> Result<()> {
    if !cli.urls.is_empty() {
        bail!("URLs cannot be combined with -i");
    }

    let urls = read_urls_from_file(path).await?;
    if urls.is_empty() {
        bail!("No URLs found in {}", path.display());
    }
    tracing::info!("Downloading {} URLs from {}", urls.len(), path.display());

    let client = build_http_client(&config.http)?;
    let options = download_options(cli, config)?;
    download_all(&client, &urls, &options, console).await?;
    Ok(())
}

/// Handles the default mode: downloads a single URL
async fn handle_download(cli: &Cli, config: &Config, console: &Console) -> Result<()> {
    let url = single_url(cli)?;
    let client = build_http_client(&config.http)?;
    let options = download_options(cli, config)?;

    download_file(&client, url, &options, console)
        .await
        .with_context(|| format!("Failed to download {}", url))?;
    Ok(())
}
