//! Session configuration loaded from YAML.
//!
//! ```yaml
//! uniqueness: first-column-key   # or whole-row
//! classifier: no-digit-text      # or cardinality-ratio
//! sheet: Orders                  # optional, first sheet otherwise
//! export-sheet-name: Sheet1
//! encoding: utf-8
//! delimiter: ","
//! ```

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::{
    dataset::UniquenessPolicy,
    io_utils,
    profile::ClassifierPolicy,
    source::{DEFAULT_SHEET_NAME, ExportFormat, ExportOptions, SourceOptions},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct SessionConfig {
    pub uniqueness: UniquenessPolicy,
    pub classifier: ClassifierPolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    pub export_sheet_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<char>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            uniqueness: UniquenessPolicy::default(),
            classifier: ClassifierPolicy::default(),
            sheet: None,
            export_sheet_name: DEFAULT_SHEET_NAME.to_string(),
            encoding: None,
            delimiter: None,
        }
    }
}

impl SessionConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let config: SessionConfig = serde_yaml::from_reader(BufReader::new(file))
            .context("Parsing session config YAML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let file =
            File::create(path).with_context(|| format!("Creating config file {path:?}"))?;
        serde_yaml::to_writer(file, self).context("Writing session config YAML")
    }

    pub fn validate(&self) -> Result<()> {
        io_utils::resolve_encoding(self.encoding.as_deref())?;
        self.delimiter_byte()?;
        if self.export_sheet_name.trim().is_empty() {
            return Err(anyhow!("export-sheet-name must not be empty"));
        }
        Ok(())
    }

    fn delimiter_byte(&self) -> Result<Option<u8>> {
        match self.delimiter {
            None => Ok(None),
            Some(ch) if ch.is_ascii() => Ok(Some(ch as u8)),
            Some(ch) => Err(anyhow!("Delimiter '{ch}' must be a single ASCII character")),
        }
    }

    pub fn source_options(&self, path: &Path) -> Result<SourceOptions> {
        Ok(SourceOptions {
            sheet: self.sheet.clone(),
            encoding: io_utils::resolve_encoding(self.encoding.as_deref())?,
            delimiter: io_utils::resolve_delimiter(path, self.delimiter_byte()?),
        })
    }

    pub fn export_options(&self, destination: &Path) -> Result<ExportOptions> {
        Ok(ExportOptions {
            format: ExportFormat::from_path(destination),
            sheet_name: self.export_sheet_name.clone(),
            encoding: io_utils::resolve_encoding(self.encoding.as_deref())?,
            delimiter: io_utils::resolve_delimiter(destination, self.delimiter_byte()?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn partial_yaml_falls_back_to_defaults() {
        let config: SessionConfig = serde_yaml::from_str("uniqueness: whole-row\n").unwrap();
        assert_eq!(config.uniqueness, UniquenessPolicy::WholeRow);
        assert_eq!(config.classifier, ClassifierPolicy::NoDigitText);
        assert_eq!(config.export_sheet_name, "Sheet1");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let parsed = serde_yaml::from_str::<SessionConfig>("uniquenes: whole-row\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn save_and_load_preserve_settings() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("session.yaml");
        let config = SessionConfig {
            classifier: ClassifierPolicy::CardinalityRatio,
            sheet: Some("Orders".to_string()),
            delimiter: Some(';'),
            ..SessionConfig::default()
        };
        config.save(&path).expect("save");
        assert_eq!(SessionConfig::load(&path).expect("load"), config);
    }

    #[test]
    fn non_ascii_delimiter_is_invalid() {
        let config = SessionConfig {
            delimiter: Some('§'),
            ..SessionConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
