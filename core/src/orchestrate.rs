use crate::allow::AllowList;
use crate::blocks::BlockMapping;
use crate::fsio::{read_text, write_atomic};
use crate::inject::{insert, split_lines};
use crate::locate::{LineScanLocator, NotFound, StatementLocator};
use crate::logger::Logger;
use crate::manifest::{Manifest, ManifestEntry};
use std::fmt;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    Applied,
    SkippedFileNotFound,
    SkippedNoMappingValue,
    SkippedDeclarationNotFound,
    SkippedStatementUnterminated,
    SkippedNotWhitelisted,
    /// The target could not be read or written, or its path escapes the base directory.
    Failed { reason: String },
}

impl PatchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, PatchOutcome::Applied)
    }

    pub fn label(&self) -> &'static str {
        match self {
            PatchOutcome::Applied => "applied",
            PatchOutcome::SkippedFileNotFound => "skipped-not-found-file",
            PatchOutcome::SkippedNoMappingValue => "skipped-no-mapping-value",
            PatchOutcome::SkippedDeclarationNotFound => "skipped-declaration-not-found",
            PatchOutcome::SkippedStatementUnterminated => "skipped-statement-unterminated",
            PatchOutcome::SkippedNotWhitelisted => "skipped-not-whitelisted",
            PatchOutcome::Failed { .. } => "failed",
        }
    }
}

impl From<NotFound> for PatchOutcome {
    fn from(reason: NotFound) -> Self {
        match reason {
            NotFound::Declaration => PatchOutcome::SkippedDeclarationNotFound,
            NotFound::Unterminated => PatchOutcome::SkippedStatementUnterminated,
        }
    }
}

/// What happened to one manifest entry.
#[derive(Debug, Clone)]
pub struct PatchReport {
    pub entry: ManifestEntry,
    pub outcome: PatchOutcome,
    /// Resolved target, once the entry got that far.
    pub target: Option<PathBuf>,
    /// Line index of the injection in the rewritten file.
    pub inserted_at: Option<usize>,
    pub written: bool,
}

impl PatchReport {
    fn new(entry: &ManifestEntry, outcome: PatchOutcome) -> Self {
        Self {
            entry: entry.clone(),
            outcome,
            target: None,
            inserted_at: None,
            written: false,
        }
    }

    fn at(mut self, target: &Path) -> Self {
        self.target = Some(target.to_path_buf());
        self
    }
}

impl fmt::Display for PatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = &self.entry.variable_name;
        let file = self.entry.target_file.display();
        match &self.outcome {
            PatchOutcome::Applied if self.written => {
                write!(f, "-> Patched '{name}' in {file}")
            }
            PatchOutcome::Applied => write!(f, "-> Would patch '{name}' in {file} (dry run)"),
            PatchOutcome::SkippedFileNotFound => {
                write!(f, "   ERROR: Target file not found for '{name}': {file}")
            }
            PatchOutcome::SkippedNoMappingValue => write!(
                f,
                "-> Skipping '{name}': no value for prompt key '{}'",
                self.entry.prompt_key
            ),
            PatchOutcome::SkippedDeclarationNotFound => {
                write!(f, "   WARN: Could not find declaration for '{name}' in {file}. Skipping.")
            }
            PatchOutcome::SkippedStatementUnterminated => {
                write!(f, "   WARN: Could not find end of statement for '{name}' in {file}. Skipping.")
            }
            PatchOutcome::SkippedNotWhitelisted => write!(
                f,
                "-> Skipping '{name}' as it is not a top-level variable that can be patched this way."
            ),
            PatchOutcome::Failed { reason } => {
                write!(f, "   ERROR: Failed to patch '{name}' in {file}: {reason}")
            }
        }
    }
}

/// All reports of one run, in manifest order.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub reports: Vec<PatchReport>,
}

impl RunSummary {
    pub fn applied(&self) -> usize {
        self.reports.iter().filter(|r| r.outcome.is_applied()).count()
    }

    pub fn failed(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, PatchOutcome::Failed { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.reports.len() - self.applied() - self.failed()
    }
}

/// Drives lookup, allow-list filtering, locating and insertion for each
/// manifest entry. Entries are independent: nothing an entry does can stop
/// the ones after it.
pub struct PatchOrchestrator<'a, L = LineScanLocator> {
    logger: &'a Logger,
    base_dir: PathBuf,
    allow_list: &'a AllowList,
    locator: L,
    dry_run: bool,
}

impl<'a> PatchOrchestrator<'a> {
    pub fn new(logger: &'a Logger, base_dir: PathBuf, allow_list: &'a AllowList, dry_run: bool) -> Self {
        Self::with_locator(logger, base_dir, allow_list, dry_run, LineScanLocator::new())
    }
}

impl<'a, L: StatementLocator> PatchOrchestrator<'a, L> {
    pub fn with_locator(
        logger: &'a Logger,
        base_dir: PathBuf,
        allow_list: &'a AllowList,
        dry_run: bool,
        locator: L,
    ) -> Self {
        Self {
            logger,
            base_dir,
            allow_list,
            locator,
            dry_run,
        }
    }

    pub fn run(&self, mapping: &BlockMapping, manifest: &Manifest) -> RunSummary {
        let reports = manifest
            .iter()
            .map(|entry| {
                let report = self.apply_entry(mapping, entry);
                self.log_report(&report);
                report
            })
            .collect();
        RunSummary { reports }
    }

    pub fn apply_entry(&self, mapping: &BlockMapping, entry: &ManifestEntry) -> PatchReport {
        let value = match mapping.get(&entry.prompt_key) {
            Some(v) if !v.is_empty() => v,
            _ => return PatchReport::new(entry, PatchOutcome::SkippedNoMappingValue),
        };

        if !self.allow_list.contains(&entry.variable_name) {
            return PatchReport::new(entry, PatchOutcome::SkippedNotWhitelisted);
        }

        let target = match self.resolve(&entry.target_file) {
            Some(p) => p,
            None => {
                return PatchReport::new(
                    entry,
                    PatchOutcome::Failed {
                        reason: "target path escapes the base directory".to_string(),
                    },
                )
            }
        };
        if !target.exists() {
            return PatchReport::new(entry, PatchOutcome::SkippedFileNotFound).at(&target);
        }

        let content = match read_text(&target) {
            Ok(c) => c,
            Err(e) => {
                return PatchReport::new(entry, PatchOutcome::Failed { reason: e.to_string() }).at(&target)
            }
        };

        let lines = split_lines(&content);
        let statement = match self.locator.locate(&lines, &entry.variable_name) {
            Ok(s) => s,
            Err(reason) => return PatchReport::new(entry, reason.into()).at(&target),
        };

        let patched = insert(&lines, statement.end_line, &entry.variable_name, value).concat();

        if !self.dry_run {
            if let Err(e) = write_atomic(&target, &patched) {
                return PatchReport::new(entry, PatchOutcome::Failed { reason: e.to_string() }).at(&target);
            }
        }

        let mut report = PatchReport::new(entry, PatchOutcome::Applied).at(&target);
        report.inserted_at = Some(statement.end_line + 1);
        report.written = !self.dry_run;
        report
    }

    /// Joins `relative` onto the base directory, refusing absolute paths and `..`.
    fn resolve(&self, relative: &Path) -> Option<PathBuf> {
        let escapes = relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_) | Component::RootDir));
        if escapes {
            return None;
        }
        Some(self.base_dir.join(relative))
    }

    fn log_report(&self, report: &PatchReport) {
        let msg = format!(
            "{} -> {} ({})",
            report.entry.prompt_key,
            report.entry.variable_name,
            report.entry.target_file.display()
        );
        match &report.outcome {
            PatchOutcome::Applied => self.logger.info("orchestrate", report.outcome.label(), &msg),
            PatchOutcome::Failed { reason } => {
                self.logger
                    .error("orchestrate", report.outcome.label(), &format!("{msg}: {reason}"))
            }
            _ => self.logger.warn("orchestrate", report.outcome.label(), &msg),
        }
    }
}
