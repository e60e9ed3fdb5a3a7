//! Model persistence for saving and loading trained agents
//!
//! A saved model is two files next to each other:
//! - `<path>` - Q-network weights (Burn named MessagePack record)
//! - `<path>.meta.json` - network shape and training progress as JSON
//!
//! Loading reads the metadata first and refuses weights whose shape does not
//! match the network the caller expects.

use super::{AgentConfig, DqnAgent, QNetwork, QNetworkConfig};
use anyhow::{Context, Result, bail};
use burn::{
    module::Module,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
    tensor::backend::{AutodiffBackend, Backend},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Metadata saved with the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Shape of the saved network
    pub network: QNetworkConfig,

    /// Number of episodes trained
    pub episodes_trained: usize,

    /// Best score reached during training
    pub record: u32,

    /// Version identifier for compatibility checking
    pub version: String,
}

impl ModelMetadata {
    /// Create new metadata stamped with the crate version
    pub fn new(network: QNetworkConfig, episodes_trained: usize, record: u32) -> Self {
        Self {
            network,
            episodes_trained,
            record,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Path of the metadata sidecar for a model path
pub fn metadata_path(path: &Path) -> PathBuf {
    path.with_extension("meta.json")
}

/// Save the agent's Q-network and training progress
///
/// Creates parent directories if they don't exist. Overwrites any model
/// already at `path`.
pub fn save_model<B: AutodiffBackend>(agent: &DqnAgent<B>, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    let record = agent.network().clone().into_record();
    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    recorder
        .record(record, path.to_path_buf())
        .context("Failed to save network weights")?;

    let metadata = ModelMetadata::new(
        QNetworkConfig::new(agent.config().hidden_size),
        agent.n_games(),
        agent.record(),
    );

    let meta_path = metadata_path(path);
    let meta_json =
        serde_json::to_string_pretty(&metadata).context("Failed to serialize metadata")?;
    std::fs::write(&meta_path, meta_json)
        .with_context(|| format!("Failed to write metadata to {:?}", meta_path))?;

    Ok(())
}

/// Read only the metadata sidecar of a saved model
pub fn load_metadata(path: &Path) -> Result<ModelMetadata> {
    let meta_path = metadata_path(path);
    let meta_json = std::fs::read_to_string(&meta_path)
        .with_context(|| format!("Failed to read metadata from {:?}", meta_path))?;
    serde_json::from_str(&meta_json).context("Failed to deserialize metadata")
}

/// Load a saved Q-network, checking its shape against `expected`
///
/// Works on any backend, so the same file serves training (autodiff) and
/// greedy play (inference).
pub fn load_network<B: Backend>(
    path: &Path,
    expected: &QNetworkConfig,
    device: &B::Device,
) -> Result<(QNetwork<B>, ModelMetadata)> {
    let metadata = load_metadata(path)?;

    if metadata.network != *expected {
        bail!(
            "Saved network shape {:?} does not match expected {:?}",
            metadata.network,
            expected
        );
    }

    let network = expected.init::<B>(device);
    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    let record = recorder
        .load(path.to_path_buf(), device)
        .with_context(|| format!("Failed to load network weights from {:?}", path))?;

    Ok((network.load_record(record), metadata))
}

/// Rebuild an agent from a saved model, restoring its episode count and record
pub fn load_agent<B: AutodiffBackend>(
    config: AgentConfig,
    path: &Path,
    device: B::Device,
) -> Result<DqnAgent<B>> {
    let expected = QNetworkConfig::new(config.hidden_size);
    let (network, metadata) = load_network::<B>(path, &expected, &device)?;

    info!(
        path = %path.display(),
        episodes = metadata.episodes_trained,
        record = metadata.record,
        version = %metadata.version,
        "Resumed saved model"
    );

    DqnAgent::from_parts(
        config,
        network,
        metadata.episodes_trained,
        metadata.record,
        device,
    )
}

/// Resume from `path` when possible, otherwise start from fresh parameters
///
/// A missing or unreadable model is not fatal: a warning is logged and a new
/// agent is returned.
pub fn resume_or_fresh<B: AutodiffBackend>(
    config: AgentConfig,
    path: &Path,
    device: B::Device,
) -> Result<DqnAgent<B>> {
    match load_agent(config.clone(), path, device.clone()) {
        Ok(agent) => Ok(agent),
        Err(err) => {
            warn!(
                path = %path.display(),
                error = %format!("{err:#}"),
                "Could not resume saved model, starting fresh"
            );
            DqnAgent::new(config, device)
        }
    }
}
