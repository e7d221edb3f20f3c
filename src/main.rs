//! semlog - CLI entry point.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use git2::Repository;
use tracing_subscriber::EnvFilter;

use semlog::changelog::Stager;
use semlog::git::{GitStager, fetch_raw_commits, list_tags, resolve_range};
use semlog::{BuildQuality, Config, GitError, Session};

/// Parse conventional commits, recommend the next version, render changelogs.
#[derive(Parser, Debug)]
#[command(name = "semlog")]
#[command(version)]
struct Cli {
    /// Path to a JSON config file (defaults to ./.semlog.json if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Repository to read
    #[arg(long, global = true, default_value = ".")]
    repo: PathBuf,

    /// Start of commit range, exclusive (tag, commit hash, or branch)
    #[arg(long, global = true)]
    from: Option<String>,

    /// End of commit range (defaults to HEAD)
    #[arg(long, global = true, default_value = "HEAD")]
    to: String,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print parsed commits as JSON
    Commits,

    /// Print the current and recommended versions
    Version {
        /// Build quality label (alpha, beta, rc, servicing, hotfix, none)
        #[arg(long)]
        quality: Option<BuildQuality>,

        /// Build identifier appended to the pre-release label
        #[arg(long)]
        build_id: Option<String>,

        /// Append a timestamp so local pre-releases never collide
        #[arg(long)]
        interactive: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Render the changelog
    Changelog {
        /// Path to changelog file
        #[arg(short = 'o', long, default_value = "CHANGELOG.md")]
        output: PathBuf,

        /// Print the changelog without writing
        #[arg(long)]
        dry_run: bool,

        /// Stage the written file in git
        #[arg(long)]
        stage: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Command::Version {
        quality,
        build_id,
        interactive,
        ..
    } = &cli.command
    {
        if let Some(quality) = quality {
            config.recommend.build_quality = quality.clone();
        }
        if build_id.is_some() {
            config.recommend.build_id = build_id.clone();
        }
        config.recommend.interactive |= *interactive;
    }

    let mut session = Session::new(config).context("Invalid configuration")?;

    let repo = Repository::open(&cli.repo)
        .map_err(GitError::OpenRepository)
        .with_context(|| format!("Not a git repository: {}", cli.repo.display()))?;
    let range = resolve_range(&repo, cli.from.as_deref(), Some(&cli.to))
        .context("Failed to resolve commit range")?;
    let commits = fetch_raw_commits(&repo, &range).context("Failed to fetch commits")?;
    let tags = list_tags(&repo).context("Failed to list tags")?;

    match cli.command {
        Command::Commits => {
            let records = session.parse_commits(&commits);
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Command::Version { json, .. } => {
            session.build_history(range.boundaries(), commits, tags);
            let recommendation = session
                .recommend_version()
                .context("Failed to recommend a version")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&recommendation)?);
            } else {
                println!("{recommendation}");
            }
        }
        Command::Changelog {
            output,
            dry_run,
            stage,
        } => {
            session.build_history(range.boundaries(), commits, tags);
            if dry_run {
                print!("{}", session.render_changelog()?);
                return Ok(());
            }

            let stager = GitStager::new(&repo);
            let stager = stage.then_some(&stager as &dyn Stager);
            session
                .write_changelog(&output, stager)
                .context("Failed to write changelog")?;
            println!("✓ Wrote {}", output.display());
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "semlog=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
