//! Data portal session.
//!
//! Entity resolution goes through the external portal client. Login is
//! attempted silently first (cached credentials); on failure the user is
//! prompted exactly once, then the error propagates.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::PortalConfig;
use crate::error::{Error, Result};
use crate::process::CommandRunner;

/// Credentials gathered from an interactive prompt.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub token: String,
}

/// Authenticated handle to the data portal.
pub struct PortalSession<'a> {
    runner: &'a dyn CommandRunner,
    command: String,
}

#[derive(Debug, Deserialize)]
struct EntityRecord {
    path: PathBuf,
}

impl<'a> PortalSession<'a> {
    /// Establish a session, prompting for credentials once if the silent
    /// login fails.
    pub async fn login(runner: &'a dyn CommandRunner, config: &PortalConfig) -> Result<Self> {
        let session = Self {
            runner,
            command: config.command.clone(),
        };

        match session.silent_login().await {
            Ok(()) => Ok(session),
            Err(e) => {
                debug!("silent portal login failed: {}", e);
                let credentials = prompt_credentials()?;
                session.credential_login(&credentials).await?;
                Ok(session)
            }
        }
    }

    /// Resolve an entity to a local file path, downloading it if needed.
    pub async fn get(&self, entity_id: &str) -> Result<PathBuf> {
        let args = vec![
            "get".to_string(),
            "--json".to_string(),
            entity_id.to_string(),
        ];
        let stdout = self
            .runner
            .run(&self.command, &args)
            .await
            .map_err(|e| Error::Portal(format!("failed to fetch entity {}: {}", entity_id, e)))?;

        let value: Value = serde_json::from_str(&stdout)
            .map_err(|e| Error::Portal(format!("portal output for {} is not JSON: {}", entity_id, e)))?;
        let record: EntityRecord = serde_json::from_value(value).map_err(|_| {
            Error::Portal(format!("portal output for {} has no 'path' field", entity_id))
        })?;
        Ok(record.path)
    }

    async fn silent_login(&self) -> Result<()> {
        self.runner
            .run(&self.command, &["login".to_string()])
            .await?;
        Ok(())
    }

    async fn credential_login(&self, credentials: &Credentials) -> Result<()> {
        let args = vec![
            "login".to_string(),
            "--username".to_string(),
            credentials.username.clone(),
            "--auth-token".to_string(),
            credentials.token.clone(),
            "--remember-me".to_string(),
        ];
        self.runner.run(&self.command, &args).await.map_err(|e| {
            warn!("interactive portal login failed");
            Error::Auth(format!("portal login rejected: {}", e))
        })?;
        Ok(())
    }
}

/// Ask for portal credentials on stderr, reading them from stdin.
fn prompt_credentials() -> Result<Credentials> {
    eprintln!(
        "Please provide your portal username/email and auth token (you will only be prompted once)"
    );

    let username = prompt_line("Username: ")?;
    let token = prompt_line("Auth token: ")?;
    Ok(Credentials { username, token })
}

fn prompt_line(label: &str) -> Result<String> {
    eprint!("{}", label);
    std::io::stderr().flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let value = line.trim().to_string();
    if value.is_empty() {
        return Err(Error::Auth(format!("empty {}", label.trim_end_matches(": "))));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::mock::MockRunner;

    fn config() -> PortalConfig {
        PortalConfig {
            command: "synapse".to_string(),
        }
    }

    #[tokio::test]
    async fn test_silent_login() {
        let mock = MockRunner::new();
        let session = PortalSession::login(&mock, &config()).await.unwrap();

        assert_eq!(mock.calls_for("synapse").len(), 1);
        drop(session);
    }

    #[tokio::test]
    async fn test_get_resolves_entity_path() {
        let mock = MockRunner::new();
        mock.succeed_with("synapse", ""); // login
        mock.succeed_with("synapse", r#"{"path": "/cache/syn123/index.tar"}"#);

        let session = PortalSession::login(&mock, &config()).await.unwrap();
        let path = session.get("syn123").await.unwrap();
        assert_eq!(path, PathBuf::from("/cache/syn123/index.tar"));

        let calls = mock.calls_for("synapse");
        assert_eq!(calls[1], vec!["synapse", "get", "--json", "syn123"]);
    }

    #[tokio::test]
    async fn test_get_without_path_field() {
        let mock = MockRunner::new();
        mock.succeed_with("synapse", ""); // login
        mock.succeed_with("synapse", r#"{"id": "syn123"}"#);

        let session = PortalSession::login(&mock, &config()).await.unwrap();
        let err = session.get("syn123").await.unwrap_err();
        assert_eq!(err.code(), "PORTAL_ERROR");
        assert!(err.to_string().contains("path"));
    }

    #[tokio::test]
    async fn test_get_failure_propagates() {
        let mock = MockRunner::new();
        mock.succeed_with("synapse", ""); // login
        mock.fail_with("synapse", "entity not found");

        let session = PortalSession::login(&mock, &config()).await.unwrap();
        let err = session.get("syn404").await.unwrap_err();
        assert!(err.to_string().contains("syn404"));
    }
}
