use crate::model::{ConfigPatch, ShopConfig, ShopState};
use anyhow::Context;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Magasin de configuration. Les documents partiels sont admis : tout
/// champ absent retombe sur les défauts à la lecture.
pub trait ConfigStore {
    fn load(&self) -> anyhow::Result<ShopConfig>;
    /// Sauvegarde de manière atomique.
    fn save(&self, config: &ShopConfig) -> anyhow::Result<()>;
}

/// Magasin d'état partagé. La notification de changement distant relève du
/// transport ; côté moteur elle arrive en `BoardEvent::Remote`.
pub trait StateStore {
    fn load(&self) -> anyhow::Result<ShopState>;
    /// Sauvegarde de manière atomique.
    fn save(&self, state: &ShopState) -> anyhow::Result<()>;
}

pub struct JsonConfigStore {
    path: PathBuf,
}

impl JsonConfigStore {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self { path: path.as_ref().to_path_buf() })
    }
}

impl ConfigStore for JsonConfigStore {
    fn load(&self) -> anyhow::Result<ShopConfig> {
        let data = fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        let patch: ConfigPatch = serde_json::from_slice(&data).with_context(|| "parsing config document")?;
        Ok(ShopConfig::from_patch(patch))
    }

    fn save(&self, config: &ShopConfig) -> anyhow::Result<()> {
        write_atomic(&self.path, &serde_json::to_vec_pretty(config)?)
    }
}

pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self { path: path.as_ref().to_path_buf() })
    }
}

impl StateStore for JsonStateStore {
    fn load(&self) -> anyhow::Result<ShopState> {
        let data = fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        let state: ShopState = serde_json::from_slice(&data).with_context(|| "parsing state document")?;
        Ok(state)
    }

    fn save(&self, state: &ShopState) -> anyhow::Result<()> {
        write_atomic(&self.path, &serde_json::to_vec_pretty(state)?)
    }
}

fn write_atomic(path: &Path, json: &[u8]) -> anyhow::Result<()> {
    let mut tmp = NamedTempFile::new_in(
        path.parent().unwrap_or_else(|| Path::new(".")))
        .with_context(|| "creating temp file")?;
    tmp.write_all(json)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).with_context(|| "atomic rename")?;
    Ok(())
}
