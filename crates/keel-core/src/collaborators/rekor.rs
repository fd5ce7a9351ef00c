//! Transparency-log anchoring through the `rekor-cli` binary.
//!
//! The canonical payload is written to a temporary artifact file and
//! uploaded together with a detached signature and public key. The entry is
//! then fetched back to read its log index and integration time.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, info};
use serde::Deserialize;
use tokio::process::Command;

use super::{Anchor, AnchorRequest};
use crate::{
    error::{KeelError, Result},
    models::{AnchorOutcome, Stage},
};

/// Public Sigstore instance.
pub const DEFAULT_REKOR_SERVER: &str = "https://rekor.sigstore.dev";

/// Anchoring configuration. Absent key material means "skip", not "fail".
#[derive(Debug, Clone)]
pub struct AnchorConfig {
    /// Record a simulated skip instead of calling out
    pub simulate: bool,
    pub pubkey_path: Option<PathBuf>,
    pub signature_path: Option<PathBuf>,
    pub server: String,
    /// Name or path of the rekor client binary
    pub cli: String,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            simulate: false,
            pubkey_path: None,
            signature_path: None,
            server: DEFAULT_REKOR_SERVER.to_string(),
            cli: "rekor-cli".to_string(),
        }
    }
}

/// Anchors plan digests with `rekor-cli upload`.
#[derive(Debug, Clone, Default)]
pub struct RekorCliAnchor {
    config: AnchorConfig,
}

/// The subset of `rekor-cli get -o json` output that is recorded.
#[derive(Debug, Deserialize)]
struct RekorEntry {
    #[serde(rename = "UUID")]
    uuid: Option<String>,
    #[serde(rename = "Index")]
    index: Option<u64>,
    #[serde(rename = "IntegratedTime")]
    integrated_time: Option<i64>,
}

impl RekorCliAnchor {
    pub fn new(config: AnchorConfig) -> Self {
        Self { config }
    }

    /// Signature and key paths when both are configured and present on disk,
    /// otherwise the reason anchoring is skipped.
    fn key_material(&self) -> std::result::Result<(&Path, &Path), String> {
        match (&self.config.signature_path, &self.config.pubkey_path) {
            (Some(sig), Some(key)) if sig.exists() && key.exists() => Ok((sig, key)),
            (Some(sig), Some(key)) => Err(format!(
                "signature '{}' or public key '{}' does not exist",
                sig.display(),
                key.display()
            )),
            _ => Err("no signature/public key configured; set the rekor key paths or enable simulation"
                .to_string()),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<String> {
        debug!("running {} {}", self.config.cli, args.join(" "));
        let output = Command::new(&self.config.cli)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                KeelError::action(Stage::Confirm, format!("failed to run {}: {e}", self.config.cli))
            })?;

        if !output.status.success() {
            return Err(KeelError::action(
                Stage::Confirm,
                format!(
                    "{} {} exited with {}: {}",
                    self.config.cli,
                    args.first().copied().unwrap_or_default(),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl Anchor for RekorCliAnchor {
    async fn anchor(&self, request: AnchorRequest<'_>) -> Result<AnchorOutcome> {
        if self.config.simulate {
            return Ok(AnchorOutcome::Skipped {
                reason: "simulation enabled".to_string(),
                simulate: true,
            });
        }

        let (signature, pubkey) = match self.key_material() {
            Ok(paths) => paths,
            Err(reason) => return Ok(AnchorOutcome::skipped(reason)),
        };

        let mut artifact = tempfile::NamedTempFile::new().map_err(|source| {
            KeelError::FileSystem {
                path: std::env::temp_dir(),
                source,
            }
        })?;
        let artifact_path = artifact.path().to_path_buf();
        artifact
            .write_all(request.blob)
            .and_then(|()| artifact.flush())
            .map_err(|source| KeelError::FileSystem {
                path: artifact_path.clone(),
                source,
            })?;

        let artifact_path = artifact_path.to_string_lossy().into_owned();
        let signature_path = signature.to_string_lossy().into_owned();
        let pubkey_path = pubkey.to_string_lossy().into_owned();
        let upload = self
            .run(&[
                "upload",
                "--rekor_server",
                self.config.server.as_str(),
                "--artifact",
                artifact_path.as_str(),
                "--signature",
                signature_path.as_str(),
                "--public-key",
                pubkey_path.as_str(),
            ])
            .await?;

        // The upload prints the entry URL; its last segment is the UUID.
        let uuid = upload
            .trim()
            .rsplit('/')
            .next()
            .filter(|tail| !tail.is_empty())
            .ok_or_else(|| {
                KeelError::action(Stage::Confirm, "rekor-cli upload printed no entry URL")
            })?
            .to_string();

        let uuid_arg = format!("--uuid={uuid}");
        let raw = self
            .run(&[
                "get",
                "--rekor_server",
                self.config.server.as_str(),
                uuid_arg.as_str(),
                "-o",
                "json",
            ])
            .await?;
        let entry: RekorEntry = serde_json::from_str(&raw)?;

        info!("anchored plan {} digest {} as {uuid}", request.plan_id, request.digest);
        Ok(AnchorOutcome::Anchored {
            uuid: entry.uuid.unwrap_or(uuid),
            log_index: entry.index,
            integrated_time: entry.integrated_time,
        })
    }
}
