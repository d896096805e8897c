//! Self-update: download a fresh copy of the editor script.
//!
//! The body is written to a `.part` sibling of the target and then renamed
//! over it, so a failed download never leaves a truncated target behind.
//! The document being edited is never touched.

use std::path::{Path, PathBuf};
use std::time::Duration;

use nans_config::UpdateConfig;
use reqwest::Client;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Errors from a self-update run.
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error("network error: {0}")]
    Network(String),

    #[error("server returned HTTP {0}")]
    Status(u16),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("self-update is disabled")]
    Disabled,
}

/// Progress reported to the editor while an update runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateEvent {
    Started,
    Finished { target: String },
    Failed(String),
}

impl UpdateEvent {
    /// Status bar text for this event.
    pub fn message(&self) -> String {
        match self {
            Self::Started => "Updating from GitHub...".to_string(),
            Self::Finished { target } => format!("Updated and renamed to {target}!"),
            Self::Failed(err) => format!("Update failed: {err}"),
        }
    }
}

/// Downloads `url` into `target`.
#[derive(Debug, Clone)]
pub struct SelfUpdater {
    client: Client,
    url: String,
    target: PathBuf,
    enabled: bool,
}

impl SelfUpdater {
    /// Build an updater whose target is `config.target_name` under `base_dir`.
    pub fn from_config(config: &UpdateConfig, base_dir: &Path) -> Result<Self, UpdateError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| UpdateError::Network(e.to_string()))?;
        Ok(Self {
            client,
            url: config.url.clone(),
            target: base_dir.join(&config.target_name),
            enabled: config.enabled,
        })
    }

    /// Replace the HTTP client (tests use one without proxy lookup).
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Staging file the body is written to before the rename.
    pub fn staging_path(&self) -> PathBuf {
        let mut name = self
            .target
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".part");
        self.target.with_file_name(name)
    }

    /// Fetch, stage and rename. Returns the number of bytes written.
    pub async fn run(&self) -> Result<usize, UpdateError> {
        if !self.enabled {
            return Err(UpdateError::Disabled);
        }
        info!(url = %self.url, target = %self.target.display(), "Starting self-update");

        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| UpdateError::Network(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(UpdateError::Status(resp.status().as_u16()));
        }
        let body = resp
            .bytes()
            .await
            .map_err(|e| UpdateError::Network(e.to_string()))?;

        let staging = self.staging_path();
        tokio::fs::write(&staging, &body)
            .await
            .map_err(|source| UpdateError::Io {
                path: staging.clone(),
                source,
            })?;
        if let Err(source) = tokio::fs::rename(&staging, &self.target).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(UpdateError::Io {
                path: self.target.clone(),
                source,
            });
        }

        info!(bytes = body.len(), target = %self.target.display(), "Self-update finished");
        Ok(body.len())
    }

    /// Run on a background task, reporting progress on `events`.
    pub fn spawn(self, events: mpsc::Sender<UpdateEvent>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let _ = events.send(UpdateEvent::Started).await;
            let event = match self.run().await {
                Ok(_) => UpdateEvent::Finished {
                    target: self.target_display_name(),
                },
                Err(e) => {
                    warn!(error = %e, "Self-update failed");
                    UpdateEvent::Failed(e.to_string())
                }
            };
            let _ = events.send(event).await;
        })
    }

    fn target_display_name(&self) -> String {
        self.target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.target.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve exactly one request with `status` and `body`, returning the URL.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{addr}/nans.py")
    }

    fn updater(url: String, dir: &Path) -> SelfUpdater {
        let config = UpdateConfig {
            enabled: true,
            url,
            target_name: "nans.py".to_string(),
            timeout_secs: 5,
        };
        let client = Client::builder().no_proxy().build().unwrap();
        SelfUpdater::from_config(&config, dir)
            .unwrap()
            .with_client(client)
    }

    #[tokio::test]
    async fn test_update_writes_target() {
        let tmp = TempDir::new().unwrap();
        let url = serve_once("200 OK", "print('fresh')\n").await;
        let updater = updater(url, tmp.path());

        let written = updater.run().await.unwrap();
        assert_eq!(written, 15);
        let body = std::fs::read_to_string(tmp.path().join("nans.py")).unwrap();
        assert_eq!(body, "print('fresh')\n");
        assert!(!updater.staging_path().exists());
    }

    #[test_log::test(tokio::test)]
    async fn test_update_keeps_target_on_http_error() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("nans.py"), "old").unwrap();
        let url = serve_once("404 Not Found", "missing").await;

        let err = updater(url, tmp.path()).run().await.unwrap_err();
        assert!(matches!(err, UpdateError::Status(404)));
        let body = std::fs::read_to_string(tmp.path().join("nans.py")).unwrap();
        assert_eq!(body, "old");
    }

    #[tokio::test]
    async fn test_disabled_update() {
        let tmp = TempDir::new().unwrap();
        let config = UpdateConfig {
            enabled: false,
            ..UpdateConfig::default()
        };
        let updater = SelfUpdater::from_config(&config, tmp.path()).unwrap();
        assert!(matches!(updater.run().await, Err(UpdateError::Disabled)));
    }

    #[tokio::test]
    async fn test_spawn_reports_events() {
        let tmp = TempDir::new().unwrap();
        let url = serve_once("200 OK", "x").await;
        let (tx, mut rx) = mpsc::channel(4);

        updater(url, tmp.path()).spawn(tx).await.unwrap();

        assert_eq!(rx.recv().await, Some(UpdateEvent::Started));
        let done = rx.recv().await.unwrap();
        assert_eq!(done.message(), "Updated and renamed to nans.py!");
    }

    #[test]
    fn test_event_messages() {
        assert_eq!(UpdateEvent::Started.message(), "Updating from GitHub...");
        assert_eq!(
            UpdateEvent::Failed("timeout".into()).message(),
            "Update failed: timeout"
        );
    }

    #[test]
    fn test_staging_path_is_sibling() {
        let config = UpdateConfig::default();
        let updater = SelfUpdater::from_config(&config, Path::new("/tmp/work")).unwrap();
        assert_eq!(updater.staging_path(), PathBuf::from("/tmp/work/nans.py.part"));
    }
}
