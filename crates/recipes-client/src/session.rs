//! Session handling
//!
//! The session token lives in a [`TokenStore`]; the CLI uses a file next to
//! its config.

use recipes_forms::{TokenStore, TokenStoreError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::{ClientError, Result};

/// Token persisted as a plain file
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

fn io_error(err: std::io::Error) -> TokenStoreError {
    TokenStoreError::Io(err.to_string())
}

impl TokenStore for FileTokenStore {
    fn token(&self) -> std::result::Result<Option<String>, TokenStoreError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content.trim().to_string()).filter(|t| !t.is_empty())),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(err)),
        }
    }

    fn store(&self, token: &str) -> std::result::Result<(), TokenStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        fs::write(&self.path, token).map_err(io_error)
    }

    fn clear(&self) -> std::result::Result<(), TokenStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(err)),
        }
    }
}

/// User returned with a session token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionUser {
    pub id: u64,
    pub firstname: String,
    pub lastname: String,
    pub username: String,
    pub email: String,
}

/// Refresh the session through `GET /users/token`. The stored token is
/// dropped when the server no longer accepts it.
pub async fn authenticate_user(api: &ApiClient) -> Result<SessionUser> {
    let body = match api.get("/users/token").await {
        Ok(body) => body,
        Err(err) => {
            if let Err(clear_err) = api.tokens().clear() {
                warn!(error = %clear_err, "failed to clear session token");
            }
            return Err(err.into());
        }
    };

    if let Some(token) = body.get("token").and_then(Value::as_str) {
        api.tokens().store(token)?;
    }
    let user = serde_json::from_value(body.get("user").cloned().unwrap_or(Value::Null))
        .map_err(|e| ClientError::Decode(e.to_string()))?;
    Ok(user)
}

pub fn logout(tokens: &dyn TokenStore) -> Result<()> {
    tokens.clear()?;
    info!("session cleared");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store() -> (tempfile::TempDir, Arc<FileTokenStore>) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileTokenStore::new(dir.path().join("session").join("token")));
        (dir, store)
    }

    #[test]
    fn test_file_store_roundtrip() {
        let (_dir, store) = store();
        assert_eq!(store.token().unwrap(), None);
        store.store("jwt").unwrap();
        assert_eq!(store.token().unwrap().as_deref(), Some("jwt"));
        logout(store.as_ref()).unwrap();
        assert_eq!(store.token().unwrap(), None);
        // clearing twice is fine
        store.clear().unwrap();
    }

    #[tokio::test]
    async fn test_authenticate_refreshes_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/token"))
            .and(header("Authorization", "Bearer old"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "new",
                "user": { "id": 4, "username": "iveren_s", "email": "iveren@example.com" }
            })))
            .mount(&server)
            .await;

        let (_dir, tokens) = store();
        tokens.store("old").unwrap();
        let api = ApiClient::new(&server.uri(), tokens.clone());

        let user = authenticate_user(&api).await.unwrap();
        assert_eq!(user.username, "iveren_s");
        assert_eq!(tokens.token().unwrap().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_failed_authentication_clears_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/token"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": "You are not authorized to access this page, please signin"
            })))
            .mount(&server)
            .await;

        let (_dir, tokens) = store();
        tokens.store("expired").unwrap();
        let api = ApiClient::new(&server.uri(), tokens.clone());

        let err = authenticate_user(&api).await.unwrap_err();
        assert_eq!(err.to_string(), "You are not authorized to access this page, please signin");
        assert_eq!(tokens.token().unwrap(), None);
    }
}
