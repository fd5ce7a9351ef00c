//! Builder for creating and configuring Engine instances.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use tokio::task;

use super::{Engine, EngineConfig};
use crate::{
    collaborators::{
        Anchor, AnchorConfig, Hasher, HttpWebhook, LocalPinner, LogTelemetry, Pinner,
        RekorCliAnchor, Sha256Hasher, Telemetry, Webhook,
    },
    error::{KeelError, Result},
    events::{EventBus, EventSink},
    store::{DueIndex, PlanStore, SqliteStore},
};

/// Where plans and the due index are kept.
enum Storage {
    /// SQLite file; `None` means the XDG default location
    File(Option<PathBuf>),
    /// Private in-memory SQLite database
    Memory,
    /// Caller-supplied implementations
    Custom(Arc<dyn PlanStore>, Arc<dyn DueIndex>),
}

/// Builder for creating and configuring Engine instances.
pub struct EngineBuilder {
    storage: Storage,
    config: EngineConfig,
    anchor_config: AnchorConfig,
    webhook_urls: Vec<String>,
    sinks: Vec<Arc<dyn EventSink>>,
    hasher: Option<Arc<dyn Hasher>>,
    pinner: Option<Arc<dyn Pinner>>,
    anchor: Option<Arc<dyn Anchor>>,
    webhook: Option<Arc<dyn Webhook>>,
    telemetry: Option<Arc<dyn Telemetry>>,
}

impl EngineBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            storage: Storage::File(None),
            config: EngineConfig::default(),
            anchor_config: AnchorConfig::default(),
            webhook_urls: Vec::new(),
            sinks: Vec::new(),
            hasher: None,
            pinner: None,
            anchor: None,
            webhook: None,
            telemetry: None,
        }
    }

    /// Sets a custom database file path.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/keel/keel.db` or `~/.local/share/keel/keel.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.storage = Storage::File(Some(path.as_ref().to_path_buf()));
        }
        self
    }

    /// Keeps everything in a private in-memory database.
    pub fn with_in_memory_database(mut self) -> Self {
        self.storage = Storage::Memory;
        self
    }

    /// Uses caller-supplied plan store and due index.
    pub fn with_stores(mut self, plans: Arc<dyn PlanStore>, index: Arc<dyn DueIndex>) -> Self {
        self.storage = Storage::Custom(plans, index);
        self
    }

    pub fn with_tick_delay(mut self, delay: Duration) -> Self {
        self.config.tick_delay = delay;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    pub fn with_boot_tick_all(mut self, enabled: bool) -> Self {
        self.config.boot_tick_all = enabled;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.config.call_timeout = timeout;
        self
    }

    /// Configures the default `rekor-cli` anchor.
    pub fn with_anchor_config(mut self, config: AnchorConfig) -> Self {
        self.anchor_config = config;
        self
    }

    /// Configures the default HTTP webhook targets.
    pub fn with_webhook_urls(mut self, urls: Vec<String>) -> Self {
        self.webhook_urls = urls;
        self
    }

    /// Adds an event bus subscriber.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn with_hasher(mut self, hasher: Arc<dyn Hasher>) -> Self {
        self.hasher = Some(hasher);
        self
    }

    pub fn with_pinner(mut self, pinner: Arc<dyn Pinner>) -> Self {
        self.pinner = Some(pinner);
        self
    }

    /// Replaces the default anchor; the anchor configuration is then unused.
    pub fn with_anchor(mut self, anchor: Arc<dyn Anchor>) -> Self {
        self.anchor = Some(anchor);
        self
    }

    /// Replaces the default webhook; the webhook URLs are then unused.
    pub fn with_webhook(mut self, webhook: Arc<dyn Webhook>) -> Self {
        self.webhook = Some(webhook);
        self
    }

    pub fn with_telemetry(mut self, telemetry: Arc<dyn Telemetry>) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Builds the configured engine.
    ///
    /// # Errors
    ///
    /// Returns `KeelError::FileSystem` if the database directory cannot be
    /// created, `KeelError::XdgDirectory` if no default location exists and
    /// `KeelError::Database` if schema initialization fails
    pub async fn build(self) -> Result<Engine> {
        let (store, index) = match self.storage {
            Storage::Custom(plans, index) => (plans, index),
            Storage::Memory => {
                let sqlite = Arc::new(SqliteStore::in_memory()?);
                (sqlite.clone() as Arc<dyn PlanStore>, sqlite as Arc<dyn DueIndex>)
            }
            Storage::File(path) => {
                let db_path = match path {
                    Some(path) => path,
                    None => Self::default_database_path()?,
                };
                let sqlite = Arc::new(Self::open_file(db_path).await?);
                (sqlite.clone() as Arc<dyn PlanStore>, sqlite as Arc<dyn DueIndex>)
            }
        };

        let events = self
            .sinks
            .into_iter()
            .fold(EventBus::new(), EventBus::with_sink);

        Ok(Engine {
            store,
            index,
            events,
            hasher: self.hasher.unwrap_or_else(|| Arc::new(Sha256Hasher)),
            pinner: self.pinner.unwrap_or_else(|| Arc::new(LocalPinner)),
            anchor: self
                .anchor
                .unwrap_or_else(|| Arc::new(RekorCliAnchor::new(self.anchor_config))),
            webhook: self
                .webhook
                .unwrap_or_else(|| Arc::new(HttpWebhook::new(self.webhook_urls))),
            telemetry: self.telemetry.unwrap_or_else(|| Arc::new(LogTelemetry)),
            config: self.config,
        })
    }

    async fn open_file(db_path: PathBuf) -> Result<SqliteStore> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| KeelError::FileSystem {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        debug!("opening plan database at {}", db_path.display());
        task::spawn_blocking(move || SqliteStore::open(&db_path))
            .await
            .map_err(|e| KeelError::Configuration {
                message: format!("Task join error: {e}"),
            })?
    }

    /// Returns the default database path following XDG Base Directory
    /// specification.
    fn default_database_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("keel")
            .place_data_file("keel.db")
            .map_err(|e| KeelError::XdgDirectory(e.to_string()))
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
