// src/commands/translate.rs

//! setup.cfg to pyproject.toml command

use anyhow::{Context, Result};
use pymigrate::pipeline::cfg_to_toml;
use pymigrate::translate::{SetuptoolsTranslator, Translator};
use std::path::{Path, PathBuf};

/// Translate `setup_cfg`, writing to `output` or printing to stdout
pub fn cmd_translate(setup_cfg: &Path, output: Option<PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            cfg_to_toml(setup_cfg, &path, &SetuptoolsTranslator)
                .with_context(|| format!("Failed to translate {}", setup_cfg.display()))?;
            println!("Wrote {}", path.display());
        }
        None => {
            let text = std::fs::read_to_string(setup_cfg)
                .with_context(|| format!("Failed to read {}", setup_cfg.display()))?;
            let toml_text = SetuptoolsTranslator
                .translate(&text)
                .with_context(|| format!("Failed to translate {}", setup_cfg.display()))?;
            print!("{}", toml_text);
        }
    }
    Ok(())
}
