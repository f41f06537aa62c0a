#![allow(clippy::result_large_err)]

use super::expression::QueryEngine;
use super::schema::{parse_wizard, validate_wizard};
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::debug;
use wizard_types::Wizard;

/// Named storage for wizard documents. Documents are validated on the way in
/// and on the way out.
#[async_trait]
pub trait WizardStore: Send + Sync + 'static {
    async fn load(&self, name: &str) -> Result<Wizard, AppError>;

    async fn save(&self, wizard: &Wizard) -> Result<(), AppError>;

    /// Stored wizard names in ascending order.
    async fn list(&self) -> Result<Vec<String>, AppError>;
}

fn not_found(name: &str) -> AppError {
    AppError::new(
        ErrorCategory::NotFoundError,
        format!("Wizard '{}' not found", name),
    )
    .with_code("WIZ-STORE-001")
}

/// Reject names that would escape the store directory.
fn check_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty()
        || name.contains(['/', '\\'])
        || name.starts_with('.')
    {
        return Err(AppError::new(
            ErrorCategory::ValidationError,
            format!("invalid wizard name '{}'", name),
        )
        .with_code("WIZ-STORE-002"));
    }
    Ok(())
}

/// One pretty-printed `<name>.json` file per wizard inside a directory.
pub struct FileWizardStore {
    root: PathBuf,
    engine: QueryEngine,
}

impl FileWizardStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            engine: QueryEngine::default(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.json", name))
    }
}

#[async_trait]
impl WizardStore for FileWizardStore {
    async fn load(&self, name: &str) -> Result<Wizard, AppError> {
        check_name(name)?;
        let path = self.path_for(name);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(not_found(name))
            }
            Err(err) => {
                return Err(AppError::new(
                    ErrorCategory::IoError,
                    format!("failed to read {}: {}", path.display(), err),
                )
                .with_code("WIZ-STORE-003"))
            }
        };
        debug!(wizard = name, path = %path.display(), "loaded wizard document");
        parse_wizard(&text)
    }

    async fn save(&self, wizard: &Wizard) -> Result<(), AppError> {
        check_name(&wizard.name)?;
        validate_wizard(wizard, &self.engine)?;
        let text = serde_json::to_string_pretty(wizard)?;
        tokio::fs::create_dir_all(&self.root).await.map_err(|err| {
            AppError::new(
                ErrorCategory::IoError,
                format!("failed to create {}: {}", self.root.display(), err),
            )
            .with_code("WIZ-STORE-003")
        })?;
        let path = self.path_for(&wizard.name);
        tokio::fs::write(&path, text).await.map_err(|err| {
            AppError::new(
                ErrorCategory::IoError,
                format!("failed to write {}: {}", path.display(), err),
            )
            .with_code("WIZ-STORE-003")
        })?;
        debug!(wizard = %wizard.name, path = %path.display(), "saved wizard document");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>, AppError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(AppError::from(err).with_code("WIZ-STORE-003")),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

/// In-process store, mostly for tests and embedding.
#[derive(Default)]
pub struct MemoryWizardStore {
    wizards: RwLock<BTreeMap<String, Wizard>>,
    engine: QueryEngine,
}

impl MemoryWizardStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WizardStore for MemoryWizardStore {
    async fn load(&self, name: &str) -> Result<Wizard, AppError> {
        let wizards = self.wizards.read().await;
        let wizard = wizards.get(name).cloned().ok_or_else(|| not_found(name))?;
        validate_wizard(&wizard, &self.engine)?;
        Ok(wizard)
    }

    async fn save(&self, wizard: &Wizard) -> Result<(), AppError> {
        check_name(&wizard.name)?;
        validate_wizard(wizard, &self.engine)?;
        self.wizards
            .write()
            .await
            .insert(wizard.name.clone(), wizard.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>, AppError> {
        Ok(self.wizards.read().await.keys().cloned().collect())
    }
}
