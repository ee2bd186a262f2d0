use crate::config::AuthConfig;
use crate::domain::ports::TokenProvider;
use crate::utils::error::{DeskError, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl TokenProvider for StaticToken {
    fn bearer_token(&self) -> Result<String> {
        if self.0.is_empty() {
            return Err(DeskError::MissingCredential {
                reason: "configured token is empty".to_string(),
            });
        }
        Ok(self.0.clone())
    }
}

/// Reads the token from an environment variable on every call.
#[derive(Debug, Clone)]
pub struct EnvToken {
    var: String,
}

impl EnvToken {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl TokenProvider for EnvToken {
    fn bearer_token(&self) -> Result<String> {
        std::env::var(&self.var)
            .ok()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| DeskError::MissingCredential {
                reason: format!("environment variable {} is not set", self.var),
            })
    }
}

/// Persisted key/value store: a JSON object on disk. The token is read from
/// `key` on every call, so a fresh login is picked up without a restart.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
    key: String,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    /// Stores `token` under the configured key, keeping other entries.
    pub fn save_token(&self, token: &str) -> Result<()> {
        let mut entries = self.read_entries()?;
        entries.insert(self.key.clone(), Value::String(token.to_string()));

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        tracing::debug!("Stored {} in {}", self.key, self.path.display());
        Ok(())
    }

    pub fn clear_token(&self) -> Result<()> {
        let mut entries = self.read_entries()?;
        if entries.remove(&self.key).is_some() {
            fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        }
        Ok(())
    }
}

impl TokenProvider for FileTokenStore {
    fn bearer_token(&self) -> Result<String> {
        let entries = self.read_entries()?;
        match entries.get(&self.key) {
            Some(Value::String(token)) if !token.is_empty() => Ok(token.clone()),
            _ => Err(DeskError::MissingCredential {
                reason: format!("no {} in {}", self.key, self.path.display()),
            }),
        }
    }
}

impl<T: TokenProvider + ?Sized> TokenProvider for Arc<T> {
    fn bearer_token(&self) -> Result<String> {
        (**self).bearer_token()
    }
}

impl<T: TokenProvider + ?Sized> TokenProvider for Box<T> {
    fn bearer_token(&self) -> Result<String> {
        (**self).bearer_token()
    }
}

pub fn token_provider(config: &AuthConfig) -> Arc<dyn TokenProvider> {
    match config {
        AuthConfig::Static { token } => Arc::new(StaticToken::new(token.clone())),
        AuthConfig::Env { env_var } => Arc::new(EnvToken::new(env_var.clone())),
        AuthConfig::File { path, key } => Arc::new(FileTokenStore::new(path, key.clone())),
    }
}
