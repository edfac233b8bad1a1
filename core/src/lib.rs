//! Override embedded text constants in generated sources.
//!
//! A block-format prompt file supplies replacement texts, a JSON manifest
//! says which variable in which file each text belongs to, and every
//! allow-listed match gets a re-assignment line injected right after its
//! original declaration.

pub mod allow;
pub mod blocks;
pub mod config;
pub mod error;
pub mod fsio;
pub mod inject;
pub mod locate;
pub mod logger;
pub mod manifest;
pub mod orchestrate;

use blocks::{BlockMapping, BlockParser};
use config::Config;
use error::{ErrorCode, PatchError, Result};
use logger::Logger;
use manifest::Manifest;
use orchestrate::{PatchOrchestrator, RunSummary};

use std::fs;
use std::path::Path;

pub struct PromptPatcher<'a> {
    config: Config,
    logger: &'a Logger,
}

impl<'a> PromptPatcher<'a> {
    pub fn new(config: Config, logger: &'a Logger) -> Self {
        Self { config, logger }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Loads prompts and manifest, then patches every entry. Only a missing
    /// or unreadable prompt file or manifest is an error; per-entry problems
    /// are reported in the summary.
    pub fn run(&self) -> Result<RunSummary> {
        self.config.validate()?;

        let mapping = self.load_prompts()?;
        let manifest_path = self.config.manifest_path();
        let manifest = Manifest::load(&manifest_path)?;
        self.logger.info(
            "manifest",
            "loaded",
            &format!("{} entries from {}", manifest.len(), manifest_path.display()),
        );

        let orchestrator = PatchOrchestrator::new(
            self.logger,
            self.config.base_dir.clone(),
            &self.config.allow_list,
            self.config.dry_run,
        );
        let summary = orchestrator.run(&mapping, &manifest);
        self.logger.info(
            "orchestrate",
            "finished",
            &format!(
                "{} applied, {} skipped, {} failed",
                summary.applied(),
                summary.skipped(),
                summary.failed()
            ),
        );
        Ok(summary)
    }

    pub fn load_prompts(&self) -> Result<BlockMapping> {
        let mapping = load_prompts(&self.config.prompts_path)?;
        self.logger.info(
            "blocks",
            "parsed",
            &format!("{} keys from {}", mapping.len(), self.config.prompts_path.display()),
        );
        Ok(mapping)
    }
}

/// Reads and parses a block-format prompt file.
pub fn load_prompts(path: &Path) -> Result<BlockMapping> {
    if !path.exists() {
        return Err(PatchError::Config {
            code: ErrorCode::ConfigNotFound,
            message: "Prompt file not found".to_string(),
            path: path.to_path_buf(),
        });
    }
    let bytes = fs::read(path).map_err(|e| PatchError::Config {
        code: ErrorCode::ConfigReadFailed,
        message: format!("Could not read prompt file: {}", e),
        path: path.to_path_buf(),
    })?;
    BlockParser::new().parse_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn setup(manifest: Option<&str>) -> (TempDir, Config) {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("prompts.yaml"), "edit:\n  new text\n").unwrap();
        fs::write(tmp.path().join("fixer.ts"), "const EDIT_SYS_PROMPT = `old`;\n").unwrap();
        if let Some(m) = manifest {
            fs::write(tmp.path().join("patch_config.json"), m).unwrap();
        }
        let mut config = Config::new(tmp.path().join("prompts.yaml"));
        config.base_dir = tmp.path().to_path_buf();
        (tmp, config)
    }

    #[test]
    fn end_to_end_run() {
        let (tmp, config) = setup(Some(
            r#"[{"promptKey":"edit","variableName":"EDIT_SYS_PROMPT","targetFile":"fixer.ts"}]"#,
        ));
        let logger = Logger::disabled();
        let summary = PromptPatcher::new(config, &logger).run().unwrap();

        assert_eq!(summary.applied(), 1);
        assert_eq!(
            fs::read_to_string(tmp.path().join("fixer.ts")).unwrap(),
            "const EDIT_SYS_PROMPT = `old`;\nEDIT_SYS_PROMPT = `new text`; // Injected by patcher.py\n"
        );
    }

    #[test]
    fn missing_prompt_file_is_fatal() {
        let (_tmp, mut config) = setup(Some("[]"));
        config.prompts_path = PathBuf::from("/definitely/not/here.yaml");
        let logger = Logger::disabled();
        let err = PromptPatcher::new(config, &logger).run().unwrap_err();
        assert_eq!(err.code(), &ErrorCode::ConfigNotFound);
    }

    #[test]
    fn missing_manifest_is_fatal() {
        let (_tmp, config) = setup(None);
        let logger = Logger::disabled();
        let err = PromptPatcher::new(config, &logger).run().unwrap_err();
        assert_eq!(err.code(), &ErrorCode::ManifestNotFound);
    }

    #[test]
    fn invalid_manifest_is_fatal_and_nothing_is_written() {
        let (tmp, config) = setup(Some("{ not json"));
        let logger = Logger::disabled();
        let err = PromptPatcher::new(config, &logger).run().unwrap_err();
        assert_eq!(err.code(), &ErrorCode::ManifestInvalid);
        assert_eq!(
            fs::read_to_string(tmp.path().join("fixer.ts")).unwrap(),
            "const EDIT_SYS_PROMPT = `old`;\n"
        );
    }

    #[test]
    fn explicit_manifest_path_is_used() {
        let (tmp, mut config) = setup(None);
        let custom = tmp.path().join("custom.json");
        fs::write(&custom, "[]").unwrap();
        config.manifest_path = Some(custom);
        let logger = Logger::disabled();
        let summary = PromptPatcher::new(config, &logger).run().unwrap();
        assert!(summary.reports.is_empty());
    }
}
