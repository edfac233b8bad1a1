use anyhow::{Context, Result};
use clap::Parser;
use promptpatch_core::allow::AllowList;
use promptpatch_core::config::Config;
use promptpatch_core::logger::{new_rid, Logger};
use promptpatch_core::orchestrate::RunSummary;
use promptpatch_core::PromptPatcher;
use std::path::PathBuf;

/// Inject prompt overrides from a block-format file into generated sources.
#[derive(Parser, Debug)]
#[command(name = "promptpatch", version)]
struct Cli {
    /// Prompt file in block format (`key:` lines followed by two-space-indented text).
    prompts: PathBuf,
    /// Manifest JSON; defaults to `<base-dir>/patch_config.json`.
    #[arg(long)]
    manifest: Option<PathBuf>,
    /// Directory that manifest `targetFile` paths are relative to.
    #[arg(long, default_value = ".")]
    base_dir: PathBuf,
    /// Identifier that may be patched (repeatable). Defaults to the built-in prompt constants.
    #[arg(long = "allow", value_name = "NAME")]
    allow: Vec<String>,
    /// Locate and build every patch but write nothing.
    #[arg(long)]
    dry_run: bool,
    /// Emit structured JSONL logs alongside the report.
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    fn into_config(self) -> Config {
        let mut config = Config::new(self.prompts);
        config.manifest_path = self.manifest;
        config.base_dir = self.base_dir;
        config.dry_run = self.dry_run;
        if !self.allow.is_empty() {
            config.allow_list = AllowList::new(self.allow);
        }
        config
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let logger = if cli.log_json { Logger::new(new_rid()) } else { Logger::disabled() };
    let config = cli.into_config();

    println!("Loading prompts from: {}", config.prompts_path.display());
    println!("Loading patch config from: {}", config.manifest_path().display());

    let patcher = PromptPatcher::new(config, &logger);
    let summary = patcher.run().context("patch run aborted")?;
    print_summary(&summary, patcher.config().dry_run);
    Ok(())
}

fn print_summary(summary: &RunSummary, dry_run: bool) {
    for report in &summary.reports {
        println!("{report}");
    }
    println!(
        "\nPatching finished: {} applied, {} skipped, {} failed{}.",
        summary.applied(),
        summary.skipped(),
        summary.failed(),
        if dry_run { " (dry run)" } else { "" }
    );
    if summary.applied() > 0 && !dry_run {
        println!("Rebuild the patched sources to pick up the changes.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_keep_builtin_allow_list() {
        let cli = Cli::try_parse_from(["promptpatch", "prompts.yaml"]).unwrap();
        let config = cli.into_config();
        assert_eq!(config.allow_list, AllowList::default());
        assert_eq!(config.base_dir, PathBuf::from("."));
        assert_eq!(config.manifest_path(), PathBuf::from("./patch_config.json"));
        assert!(!config.dry_run);
    }

    #[test]
    fn allow_flags_replace_builtin_list() {
        let cli = Cli::try_parse_from([
            "promptpatch",
            "p.yaml",
            "--allow",
            "A",
            "--allow",
            "B",
            "--base-dir",
            "/srv/app",
            "--dry-run",
        ])
        .unwrap();
        let config = cli.into_config();
        assert_eq!(config.allow_list, AllowList::new(["A", "B"]));
        assert_eq!(config.manifest_path(), PathBuf::from("/srv/app/patch_config.json"));
        assert!(config.dry_run);
    }

    #[test]
    fn prompts_argument_is_required() {
        assert!(Cli::try_parse_from(["promptpatch"]).is_err());
    }
}
