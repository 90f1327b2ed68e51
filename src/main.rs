use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use release_tool::cli::{CommandHandler, CommandOutcome, ReleasePipeline};
use release_tool::config::{self, Config};
use release_tool::domain::display_version;
use release_tool::metadata::RegexPatcher;
use release_tool::ui::{self, TerminalConfirm};
use release_tool::ReleaseToolError;

#[derive(clap::Parser)]
#[command(
    name = "release-tool",
    about = "Turn pending change notes into versioned releases and changelogs",
    after_help = "Commands: init, prepare, thisversion, nextversion, changelog, fullchangelog, version"
)]
struct Args {
    /// Command to run
    command: Option<String>,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(long, help = "Product name used in the history and changelogs")]
    product_name: Option<String>,

    #[arg(long, help = "Release history JSON file")]
    release_history_file: Option<String>,

    #[arg(long, help = "Plain version file (empty to disable)")]
    version_file: Option<String>,

    #[arg(long, help = "Pending changes file")]
    latest_changes_file: Option<String>,

    #[arg(long, help = "Markdown changelog file (empty to disable)")]
    changelog_file: Option<String>,

    #[arg(long, help = "HTML changelog file (empty to disable)")]
    html_changelog_file: Option<String>,

    #[arg(long, help = "Version given to the first release")]
    first_version: Option<String>,

    #[arg(long, help = "Directory searched for build metadata files")]
    metadata_root: Option<String>,

    #[arg(long, help = "Do not patch build metadata files")]
    no_patch: bool,

    #[arg(short, long, help = "Skip confirmation prompts")]
    yes: bool,

    #[arg(short, long, help = "Print tool version and effective configuration")]
    verbose: bool,
}

impl Args {
    fn apply_to(&self, config: &mut Config) {
        let overrides = [
            (&self.release_history_file, &mut config.files.release_history),
            (&self.version_file, &mut config.files.version),
            (&self.latest_changes_file, &mut config.files.latest_changes),
            (&self.changelog_file, &mut config.files.markdown_changelog),
            (&self.html_changelog_file, &mut config.files.html_changelog),
            (&self.first_version, &mut config.product.first_version),
            (&self.metadata_root, &mut config.behavior.metadata_root),
        ];
        for (value, target) in overrides {
            if let Some(value) = value {
                *target = value.clone();
            }
        }

        if let Some(name) = &self.product_name {
            config.product.name = Some(name.clone());
        }
        if self.no_patch {
            config.behavior.patch_metadata = false;
        }
        if self.yes {
            config.behavior.skip_confirmation = true;
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&format!("Error loading config: {}", e));
            std::process::exit(1);
        }
    };
    args.apply_to(&mut config);

    let patcher = RegexPatcher::new().context("failed to build metadata patcher")?;
    let confirm = TerminalConfirm;
    let log = |line: &str| println!("{}", line);

    let pipeline = ReleasePipeline::new(&config, &log, &confirm, &patcher);
    let handler = CommandHandler::new(pipeline, args.verbose);

    match handler.handle(args.command.as_deref()) {
        Ok(CommandOutcome::History(history)) => {
            ui::display_success(&format!(
                "{} is at version {}",
                history.product_name(),
                display_version(history.current_version())
            ));
            Ok(())
        }
        Ok(_) => Ok(()),
        Err(ReleaseToolError::Cancelled) => {
            ui::display_status("Release cancelled by user. Nothing was written.");
            Ok(())
        }
        Err(e) if e.is_user_error() => {
            ui::display_error(&e.to_string());
            std::process::exit(1);
        }
        Err(e) => Err(anyhow::Error::new(e).context("release-tool failed")),
    }
}
