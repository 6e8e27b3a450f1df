//! Explicit session handle.
//!
//! A [`Session`] owns at most one [`Dataset`] at a time, tied to the
//! fingerprint of the bytes it was loaded from, plus the in-progress
//! [`EntryForm`]. Every mutating call returns a [`SessionEvent`] so the caller
//! knows whether anything it rendered is now stale.

use std::{fmt, path::Path};

use log::info;
use sha2::{Digest, Sha256};

use crate::{
    config::SessionConfig,
    dataset::{CandidateRow, Dataset},
    error::{Result, SheetError},
    filter::{self, FilterSpec, FilteredView},
    form::{EntryForm, FormField},
    profile::ColumnProfile,
    source::{self, ExportOptions, SourceOptions},
};

/// SHA-256 over the uploaded bytes and the options used to read them;
/// identifies a source across re-uploads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceFingerprint(String);

impl SourceFingerprint {
    pub fn of(bytes: &[u8], options: &SourceOptions) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        hasher.update([0u8]);
        match &options.sheet {
            Some(sheet) => {
                hasher.update([1u8]);
                hasher.update(sheet.as_bytes());
            }
            None => hasher.update([0u8]),
        }
        hasher.update([0u8]);
        hasher.update(options.encoding.name().as_bytes());
        hasher.update([0u8, options.delimiter]);
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0[..12.min(self.0.len())])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SourceLoaded { rows: usize, columns: usize },
    /// The same bytes were uploaded again; the current dataset was kept.
    SourceUnchanged,
    RowAppended { row_count: usize },
    FormReset,
}

impl SessionEvent {
    pub fn requires_render(&self) -> bool {
        !matches!(self, SessionEvent::SourceUnchanged)
    }
}

#[derive(Debug)]
struct LoadedSource {
    fingerprint: SourceFingerprint,
    dataset: Dataset,
    form: EntryForm,
}

#[derive(Debug, Default)]
pub struct Session {
    config: SessionConfig,
    source: Option<LoadedSource>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            source: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn is_loaded(&self) -> bool {
        self.source.is_some()
    }

    pub fn fingerprint(&self) -> Option<&SourceFingerprint> {
        self.source.as_ref().map(|loaded| &loaded.fingerprint)
    }

    /// Loads `bytes` unless they and `options` match the current source. On
    /// failure the previous dataset, if any, stays in place.
    pub fn upload(&mut self, bytes: &[u8], options: &SourceOptions) -> Result<SessionEvent> {
        let fingerprint = SourceFingerprint::of(bytes, options);
        if self.fingerprint() == Some(&fingerprint) {
            return Ok(SessionEvent::SourceUnchanged);
        }

        let raw = source::load_source(bytes, options)?;
        let dataset = Dataset::load(raw.columns, raw.rows, self.config.uniqueness)?;
        let event = SessionEvent::SourceLoaded {
            rows: dataset.len(),
            columns: dataset.columns().len(),
        };
        info!(
            "Loaded source {} with {} row(s) across {} column(s)",
            fingerprint,
            dataset.len(),
            dataset.columns().len()
        );
        let form = EntryForm::for_dataset(&dataset);
        self.source = Some(LoadedSource {
            fingerprint,
            dataset,
            form,
        });
        Ok(event)
    }

    pub fn dataset(&self) -> Result<&Dataset> {
        self.loaded().map(|loaded| &loaded.dataset)
    }

    pub fn append(&mut self, candidate: &CandidateRow) -> Result<SessionEvent> {
        let loaded = self.loaded_mut()?;
        let row_count = loaded.dataset.append(candidate)?;
        info!("Appended row; dataset now holds {row_count} row(s)");
        Ok(SessionEvent::RowAppended { row_count })
    }

    pub fn form(&self) -> Result<&EntryForm> {
        self.loaded().map(|loaded| &loaded.form)
    }

    pub fn set_field(&mut self, column: &str, value: impl Into<String>) -> Result<()> {
        self.loaded_mut()?.form.set(column, value)
    }

    pub fn form_fields(&self) -> Result<Vec<FormField>> {
        let loaded = self.loaded()?;
        let profiles = loaded.dataset.profiles(self.config.classifier);
        Ok(loaded.form.fields(&profiles))
    }

    /// Appends the form's current values. The form keeps its values either
    /// way; call [`Session::reset_form`] to clear them.
    pub fn submit_form(&mut self) -> Result<SessionEvent> {
        let candidate = self.form()?.candidate();
        self.append(&candidate)
    }

    pub fn reset_form(&mut self) -> Result<SessionEvent> {
        self.loaded_mut()?.form.reset();
        Ok(SessionEvent::FormReset)
    }

    pub fn filter(&self, spec: &FilterSpec) -> Result<FilteredView<'_>> {
        filter::apply(self.dataset()?, spec)
    }

    pub fn column_profile(&self, name: &str) -> Result<ColumnProfile> {
        self.dataset()?.column_profile(name, self.config.classifier)
    }

    pub fn profiles(&self) -> Result<Vec<ColumnProfile>> {
        Ok(self.dataset()?.profiles(self.config.classifier))
    }

    /// Export settings for a caller-chosen destination name.
    pub fn export_options(&self, destination: &Path) -> Result<ExportOptions> {
        self.config
            .export_options(destination)
            .map_err(|err| SheetError::Export(format!("{err:#}")))
    }

    /// Serializes the full current view.
    pub fn export(&self, destination: &Path) -> Result<Vec<u8>> {
        let dataset = self.dataset()?;
        self.export_rows(
            dataset.columns(),
            dataset.current_view().iter().map(|row| row.cells()),
            destination,
        )
    }

    /// Serializes any view of the loaded dataset, such as a filtered one,
    /// using the settings `destination` calls for.
    pub fn export_rows<'a, I>(
        &self,
        columns: &[String],
        rows: I,
        destination: &Path,
    ) -> Result<Vec<u8>>
    where
        I: IntoIterator<Item = &'a [String]>,
    {
        self.loaded()?;
        let bytes = source::serialize(columns, rows, &self.export_options(destination)?)?;
        info!("Serialized {} byte(s) for {:?}", bytes.len(), destination);
        Ok(bytes)
    }

    fn loaded(&self) -> Result<&LoadedSource> {
        self.source.as_ref().ok_or(SheetError::NotLoaded)
    }

    fn loaded_mut(&mut self) -> Result<&mut LoadedSource> {
        self.source.as_mut().ok_or(SheetError::NotLoaded)
    }
}
