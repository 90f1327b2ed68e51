//! Release workflow orchestration
//!
//! [ReleasePipeline] runs the user-facing operations on top of the domain,
//! store, notes, changelog and metadata modules. It owns no I/O policy of
//! its own beyond the order of steps: progress goes to the emit-line
//! callback, confirmation to a [Confirm] implementation and build file
//! patching to a [MetadataPatcher].

use std::fs;
use std::path::Path;

use tracing::{debug, error};

use crate::analyzer::VersionAnalyzer;
use crate::boundary::BoundaryWarning;
use crate::changelog;
use crate::config::Config;
use crate::domain::{display_version, Release, ReleaseHistory, Version};
use crate::error::{ReleaseToolError, Result};
use crate::metadata::{self, MetadataPatcher};
use crate::notes;
use crate::store;
use crate::ui::{format_change, Confirm};

const CONFIRM_PROMPT: &str = "Go ahead with the release?";

/// Runs release operations against the files named in a [Config]
pub struct ReleasePipeline<'a> {
    config: &'a Config,
    log: &'a dyn Fn(&str),
    confirm: &'a dyn Confirm,
    patcher: &'a dyn MetadataPatcher,
}

impl<'a> ReleasePipeline<'a> {
    pub fn new(
        config: &'a Config,
        log: &'a dyn Fn(&str),
        confirm: &'a dyn Confirm,
        patcher: &'a dyn MetadataPatcher,
    ) -> Self {
        ReleasePipeline {
            config,
            log,
            confirm,
            patcher,
        }
    }

    pub fn config(&self) -> &Config {
        self.config
    }

    /// Send one line to the log sink
    pub fn emit(&self, line: &str) {
        (self.log)(line);
    }

    fn warn(&self, warning: BoundaryWarning) {
        self.emit(&warning.to_string());
    }

    fn load_history(&self, product_name: &str) -> Result<ReleaseHistory> {
        store::load(self.config.release_history_path(), product_name)
    }

    fn save_history(&self, history: &ReleaseHistory) -> Result<()> {
        let path = self.config.release_history_path();
        self.emit(&format!(
            "Writing JSON release history to {}",
            path.display()
        ));
        store::save(path, history)
    }

    /// Prepare a directory for automated releases.
    ///
    /// Writes the (possibly empty) history back, creates the pending
    /// changes skeleton unless one exists and writes the version file.
    pub fn init(&self) -> Result<ReleaseHistory> {
        let product_name = self.config.require_product_name()?;

        self.emit("Initialising directory for automated releases...");

        let history = self.load_history(product_name)?;
        self.save_history(&history)?;

        let changes_path = self.config.latest_changes_path();
        if notes::write_blank_template(changes_path, false)? {
            self.emit(&format!(
                "Writing default skeleton file to {}",
                changes_path.display()
            ));
        } else {
            self.warn(BoundaryWarning::ChangesFileExists {
                path: changes_path.to_path_buf(),
            });
        }

        if let Some(path) = self.config.version_path() {
            self.write_version_file(path, &history)?;
        }

        Ok(history)
    }

    /// Report the version of the latest release
    pub fn this_version(&self) -> Result<Option<Version>> {
        let history = self.load_history(self.config.product_name().unwrap_or_default())?;
        let current = history.current_version();
        self.emit(&display_version(current));
        Ok(current)
    }

    /// Report the version the next release would get. Nothing is written.
    pub fn next_version(&self) -> Result<Option<Version>> {
        let analyzer = VersionAnalyzer::new(self.config.first_version()?);
        let history = self.load_history(self.config.product_name().unwrap_or_default())?;
        let changes = notes::read_changes(self.config.latest_changes_path())?;

        let bump = analyzer.analyze(&changes);
        let current = history.current_version();
        let next = analyzer.next_version(current, bump)?.or(current);
        debug!(%bump, current = %display_version(current), "computed next version");

        self.emit(&display_version(next));
        Ok(next)
    }

    /// Turn the pending changes into a release and regenerate every output.
    ///
    /// Nothing is written if the pending changes cannot be parsed or the
    /// user declines the confirmation. Once the history is saved, each
    /// configured output is attempted even if an earlier one failed.
    pub fn prepare(&self) -> Result<ReleaseHistory> {
        let product_name = self.config.require_product_name()?;
        let analyzer = VersionAnalyzer::new(self.config.first_version()?);

        let history = self.load_history(product_name)?;
        let changes = notes::read_changes(self.config.latest_changes_path())?;
        let bump = analyzer.analyze(&changes);

        self.emit(&format!(
            "There are {} existing releases, and the latest version is {}",
            history.releases().len(),
            display_version(history.current_version())
        ));

        let history = match analyzer.next_version(history.current_version(), bump)? {
            Some(new_version) => {
                self.emit("Found new changes:");
                for change in &changes {
                    self.emit(&format_change(change));
                }
                self.emit("");
                self.emit(&format!("New version will be {}", new_version));

                history.with_new_release(Release::new(new_version, changes))?
            }
            None => {
                self.warn(BoundaryWarning::NoPendingChanges {
                    current_version: history.current_version(),
                });
                history
            }
        };

        if !self.config.behavior.skip_confirmation && !self.confirm.confirm(CONFIRM_PROMPT)? {
            return Err(ReleaseToolError::Cancelled);
        }

        self.save_history(&history)?;

        let changes_path = self.config.latest_changes_path();
        self.emit(&format!(
            "Writing default skeleton file to {}",
            changes_path.display()
        ));
        notes::write_blank_template(changes_path, true)?;

        self.write_outputs(&history)?;
        Ok(history)
    }

    /// Changelog of the latest release only
    pub fn changelog(&self) -> Result<String> {
        let history = self.load_history(self.config.product_name().unwrap_or_default())?;
        let markdown = changelog::render_markdown(&history.with_only_latest_release());
        self.emit(&markdown);
        Ok(markdown)
    }

    /// Changelog of every release
    pub fn full_changelog(&self) -> Result<String> {
        let history = self.load_history(self.config.product_name().unwrap_or_default())?;
        let markdown = changelog::render_markdown(&history);
        self.emit(&markdown);
        Ok(markdown)
    }

    fn write_outputs(&self, history: &ReleaseHistory) -> Result<()> {
        let mut failures = Vec::new();
        let mut record = |step: &str, result: Result<()>| {
            if let Err(e) = result {
                error!(step, error = %e, "output step failed");
                self.emit(&format!("Failed to write {}: {}", step, e));
                failures.push(format!("{}: {}", step, e));
            }
        };

        if let Some(path) = self.config.version_path() {
            record("version file", self.write_version_file(path, history));
        }

        if let Some(path) = self.config.markdown_changelog_path() {
            record("Markdown changelog", self.write_markdown_changelog(path, history));
        }

        if let Some(path) = self.config.html_changelog_path() {
            record("HTML changelog", self.write_html_changelog(path, history));
        }

        if self.config.behavior.patch_metadata {
            for (file, result) in self.patch_metadata(history) {
                record(&format!("build metadata {}", file), result);
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ReleaseToolError::Artifacts(failures))
        }
    }

    fn write_version_file(&self, path: &Path, history: &ReleaseHistory) -> Result<()> {
        let contents = history
            .current_version()
            .map(|v| v.to_string())
            .unwrap_or_default();
        fs::write(path, contents).map_err(|e| ReleaseToolError::io(path, e))
    }

    fn write_markdown_changelog(&self, path: &Path, history: &ReleaseHistory) -> Result<()> {
        self.emit(&format!(
            "Writing Markdown changelog to {}",
            path.display()
        ));
        fs::write(path, changelog::render_markdown(history))
            .map_err(|e| ReleaseToolError::io(path, e))
    }

    fn write_html_changelog(&self, path: &Path, history: &ReleaseHistory) -> Result<()> {
        self.emit(&format!("Writing HTML changelog to {}", path.display()));
        fs::write(path, changelog::render_html(history)).map_err(|e| ReleaseToolError::io(path, e))
    }

    /// Patch every discovered build file, returning one result per file
    /// (or a single result for discovery itself).
    fn patch_metadata(&self, history: &ReleaseHistory) -> Vec<(String, Result<()>)> {
        let Some(version) = history.current_version() else {
            self.warn(BoundaryWarning::NoVersionToPatch);
            return Vec::new();
        };

        let root = self.config.metadata_root();
        self.emit(&format!(
            "Patching build metadata files under {} to version {}",
            root.display(),
            version
        ));

        let files = match metadata::discover(&root) {
            Ok(files) => files,
            Err(e) => return vec![(root.display().to_string(), Err(e))],
        };

        if files.is_empty() {
            self.warn(BoundaryWarning::NoMetadataFiles { root });
            return Vec::new();
        }

        files
            .into_iter()
            .map(|file| {
                let result = self.patcher.patch_file(&file, version).map(|patched| {
                    if patched {
                        self.emit(&format!(" Patched {} to version {}", file.display(), version));
                    } else {
                        debug!(path = %file.display(), "left unchanged");
                    }
                });
                (file.display().to_string(), result)
            })
            .collect()
    }
}
