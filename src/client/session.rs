//! Persisted login state and its revalidation on startup.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use super::http::ApiClient;
use crate::error::Result;
use crate::models::AdminRead;

const SESSION_FILE: &str = "session.json";

/// What is written to disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub token: Option<String>,
    pub user: Option<AdminRead>,
    #[serde(default)]
    pub session_checked: bool,
}

/// Outcome of revalidating a stored session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// No token stored.
    Anonymous,
    Authenticated(AdminRead),
    /// The server rejected the token; credentials were cleared.
    Expired(String),
    /// The server could not be reached; credentials were kept.
    Unreachable(String),
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
    data: SessionData,
}

impl SessionStore {
    /// `<data_dir>/session.json` for this application, if a home directory exists.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "hrms", "hrms-lite").map(|dirs| dirs.data_dir().join(SESSION_FILE))
    }

    /// Load the session at `path`. A missing or unreadable file gives an empty session.
    pub fn load(path: &Path) -> Self {
        let data = match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring corrupt session file {:?}: {}", path, e);
                SessionData::default()
            }),
            Err(_) => SessionData::default(),
        };

        Self {
            path: path.to_path_buf(),
            data,
        }
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.data)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data(&self) -> &SessionData {
        &self.data
    }

    pub fn token(&self) -> Option<&str> {
        self.data.token.as_deref()
    }

    pub fn user(&self) -> Option<&AdminRead> {
        self.data.user.as_ref()
    }

    pub fn session_checked(&self) -> bool {
        self.data.session_checked
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.data.token = Some(token.into());
    }

    pub fn set_user(&mut self, user: Option<AdminRead>) {
        self.data.user = user;
    }

    pub fn mark_checked(&mut self) {
        self.data.session_checked = true;
    }

    /// Drop credentials. The session still counts as checked.
    pub fn clear(&mut self) {
        self.data.token = None;
        self.data.user = None;
        self.data.session_checked = true;
    }

    /// Revalidate the stored token against `/auth/session`.
    ///
    /// On success the refreshed token and profile replace the stored ones.
    /// Only an auth failure (401, 403, 404) clears credentials; transport
    /// and server errors leave them for the next attempt. Does not save.
    pub async fn bootstrap(&mut self, client: &mut ApiClient) -> SessionState {
        let Some(token) = self.data.token.clone() else {
            self.mark_checked();
            return SessionState::Anonymous;
        };

        client.set_token(Some(token));
        let state = match client.refresh_session().await {
            Ok(session) => {
                self.set_token(session.token.access_token);
                self.set_user(Some(session.user.clone()));
                SessionState::Authenticated(session.user)
            }
            Err(err) if err.is_auth_failure() => {
                tracing::info!("Stored session rejected: {}", err);
                self.clear();
                client.logout();
                SessionState::Expired(err.message)
            }
            Err(err) => {
                tracing::warn!("Session check failed: {}", err);
                SessionState::Unreachable(err.message)
            }
        };

        self.mark_checked();
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::http::DEFAULT_TIMEOUT;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty_session() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::load(&dir.path().join("none.json"));
        assert_eq!(store.data(), &SessionData::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(SESSION_FILE);

        let mut store = SessionStore::load(&path);
        store.set_token("tok");
        store.mark_checked();
        store.save().unwrap();

        let reloaded = SessionStore::load(&path);
        assert_eq!(reloaded.token(), Some("tok"));
        assert!(reloaded.session_checked());
    }

    #[test]
    fn test_corrupt_file_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SESSION_FILE);
        fs::write(&path, "{not json").unwrap();
        assert!(SessionStore::load(&path).token().is_none());
    }

    #[test]
    fn test_clear_marks_checked() {
        let dir = TempDir::new().unwrap();
        let mut store = SessionStore::load(&dir.path().join(SESSION_FILE));
        store.set_token("tok");
        store.clear();
        assert!(store.token().is_none());
        assert!(store.session_checked());
    }

    #[tokio::test]
    async fn test_bootstrap_without_token_is_anonymous() {
        let dir = TempDir::new().unwrap();
        let mut store = SessionStore::load(&dir.path().join(SESSION_FILE));
        let mut client = ApiClient::new("http://127.0.0.1:9/api/v1", DEFAULT_TIMEOUT).unwrap();

        assert_eq!(store.bootstrap(&mut client).await, SessionState::Anonymous);
        assert!(store.session_checked());
    }

    #[tokio::test]
    async fn test_bootstrap_keeps_token_when_unreachable() {
        let dir = TempDir::new().unwrap();
        let mut store = SessionStore::load(&dir.path().join(SESSION_FILE));
        store.set_token("tok");
        let mut client =
            ApiClient::new("http://127.0.0.1:9/api/v1", std::time::Duration::from_secs(2)).unwrap();

        let state = store.bootstrap(&mut client).await;
        assert!(matches!(state, SessionState::Unreachable(_)));
        assert_eq!(store.token(), Some("tok"));
    }
}
