//! # Credential Store
//!
//! Persistence for outbound delivery credentials.
//!
//! Responsibilities:
//! - Load the credential list from a JSON or TOML document
//! - Validate every record before it reaches the dispatch engine
//! - Append new records, rewriting the document in place
//!
//! # Example
//!
//! ```no_run
//! use credential_store::CredentialStore;
//!
//! let store = CredentialStore::open("email_config.json").unwrap();
//! let credentials = store.load().unwrap();
//! println!("{} credentials", credentials.len());
//! ```

mod parser;
mod validator;

pub use contracts::DeliveryCredential;
pub use parser::StoreFormat;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use contracts::ContractError;
use tracing::{debug, info, instrument};

/// File-backed credential list
///
/// Appends are serialized through an internal lock so concurrent callers
/// never lose each other's records.
#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
    format: StoreFormat,
    write_lock: Mutex<()>,
}

impl CredentialStore {
    /// Open a store at `path`, detecting the format from its extension
    ///
    /// The file does not need to exist yet.
    ///
    /// # Errors
    /// - Missing or unsupported extension
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ContractError> {
        let path = path.into();
        let format = Self::detect_format(&path)?;
        Ok(Self::with_format(path, format))
    }

    /// Open a store with an explicit format
    pub fn with_format(path: impl Into<PathBuf>, format: StoreFormat) -> Self {
        Self {
            path: path.into(),
            format,
            write_lock: Mutex::new(()),
        }
    }

    /// Backing document path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Document format
    pub fn format(&self) -> StoreFormat {
        self.format
    }

    /// Load all credentials in stored order
    ///
    /// A missing document is an empty list.
    ///
    /// # Errors
    /// - File read failure
    /// - Parse failure
    /// - Validation failure
    #[instrument(name = "credential_store_load", skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> Result<Vec<DeliveryCredential>, ContractError> {
        if !self.path.exists() {
            debug!("Credential document does not exist yet");
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Self::load_from_str(&content, self.format)
    }

    /// Parse and validate a credential document
    pub fn load_from_str(
        content: &str,
        format: StoreFormat,
    ) -> Result<Vec<DeliveryCredential>, ContractError> {
        let credentials = parser::parse(content, format)?;
        validator::validate(&credentials)?;
        Ok(credentials)
    }

    /// Validate and append one credential
    ///
    /// Returns the new number of stored credentials.
    #[instrument(
        name = "credential_store_append",
        skip(self, credential),
        fields(path = %self.path.display(), sender = %credential.sender_email)
    )]
    pub fn append(&self, credential: DeliveryCredential) -> Result<usize, ContractError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut credentials = self.load()?;
        validator::validate_one(credentials.len(), &credential)?;
        credentials.push(credential);

        let rendered = parser::render(&credentials, self.format)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, rendered)?;

        info!(count = credentials.len(), "Credential appended");
        Ok(credentials.len())
    }

    /// Serialize credentials in the given format
    pub fn render(
        credentials: &[DeliveryCredential],
        format: StoreFormat,
    ) -> Result<String, ContractError> {
        parser::render(credentials, format)
    }
}

impl CredentialStore {
    /// Infer document format from file extension
    fn detect_format(path: &Path) -> Result<StoreFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine credential format from extension")
        })?;

        StoreFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported credential format: .{ext}"))
        })
    }
}
