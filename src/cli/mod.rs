//! Command dispatch.
//!
//! Maps a command name onto a [ReleasePipeline] operation. Argument parsing
//! itself lives in the binary; this layer only needs the command word.

pub mod orchestration;

use std::fmt;
use std::str::FromStr;

pub use orchestration::ReleasePipeline;

use crate::domain::{ReleaseHistory, Version};
use crate::error::{ReleaseToolError, Result};
use crate::ui::format_setting;

/// Operations available from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Init,
    Prepare,
    ThisVersion,
    NextVersion,
    Changelog,
    FullChangelog,
    Version,
}

impl Command {
    pub const ALL: [Command; 7] = [
        Command::Init,
        Command::Prepare,
        Command::ThisVersion,
        Command::NextVersion,
        Command::Changelog,
        Command::FullChangelog,
        Command::Version,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Command::Init => "init",
            Command::Prepare => "prepare",
            Command::ThisVersion => "thisversion",
            Command::NextVersion => "nextversion",
            Command::Changelog => "changelog",
            Command::FullChangelog => "fullchangelog",
            Command::Version => "version",
        }
    }

    /// Parse an optional command word, case-insensitively
    pub fn parse(input: Option<&str>) -> Result<Command> {
        match input.map(str::trim) {
            None | Some("") => Err(ReleaseToolError::NoCommand),
            Some(name) => name.parse(),
        }
    }
}

impl FromStr for Command {
    type Err = ReleaseToolError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Command::ALL
            .into_iter()
            .find(|command| command.name() == wanted)
            .ok_or_else(|| ReleaseToolError::UnknownCommand(s.trim().to_string()))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a command produced
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    History(ReleaseHistory),
    Version(Option<Version>),
    Changelog(String),
    ToolVersion,
}

/// Runs a command word through a pipeline
pub struct CommandHandler<'a> {
    pipeline: ReleasePipeline<'a>,
    verbose: bool,
}

impl<'a> CommandHandler<'a> {
    pub fn new(pipeline: ReleasePipeline<'a>, verbose: bool) -> Self {
        CommandHandler { pipeline, verbose }
    }

    pub fn handle(&self, command: Option<&str>) -> Result<CommandOutcome> {
        let parsed = Command::parse(command);

        if self.verbose || matches!(parsed, Ok(Command::Version)) {
            self.pipeline
                .emit(&format!("Release Tool {}", env!("CARGO_PKG_VERSION")));
        }

        if self.verbose {
            self.emit_configuration();
        }

        match parsed? {
            Command::Version => Ok(CommandOutcome::ToolVersion),
            Command::Init => self.pipeline.init().map(CommandOutcome::History),
            Command::Prepare => self.pipeline.prepare().map(CommandOutcome::History),
            Command::ThisVersion => self.pipeline.this_version().map(CommandOutcome::Version),
            Command::NextVersion => self.pipeline.next_version().map(CommandOutcome::Version),
            Command::Changelog => self.pipeline.changelog().map(CommandOutcome::Changelog),
            Command::FullChangelog => self
                .pipeline
                .full_changelog()
                .map(CommandOutcome::Changelog),
        }
    }

    fn emit_configuration(&self) {
        let config = self.pipeline.config();
        let settings = [
            ("ReleaseHistoryFileName", config.files.release_history.clone()),
            ("VersionFileName", config.files.version.clone()),
            ("LatestChangesFileName", config.files.latest_changes.clone()),
            ("ChangeLogFileName", config.files.markdown_changelog.clone()),
            ("HtmlChangeLogFileName", config.files.html_changelog.clone()),
            (
                "ProductName",
                config.product_name().unwrap_or_default().to_string(),
            ),
            ("FirstVersion", config.product.first_version.clone()),
            ("PatchMetadata", config.behavior.patch_metadata.to_string()),
            ("MetadataRoot", config.behavior.metadata_root.clone()),
            (
                "SkipConfirmation",
                config.behavior.skip_confirmation.to_string(),
            ),
        ];

        self.pipeline.emit("Configuration:");
        for (name, value) in &settings {
            self.pipeline.emit(&format_setting(name, value));
        }
        self.pipeline.emit("");
    }
}
