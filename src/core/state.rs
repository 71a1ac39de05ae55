use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::codec::workspace::{WorkspaceTokenizer, DEFAULT_ENV_HEIGHT_M, DEFAULT_ENV_SIZE_M};
use crate::store::{ExampleStore, InMemoryStore, JsonlStore};

pub const RT2_DIR: &str = ".rt2tok";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Memory,
    Jsonl,
}

impl std::str::FromStr for StoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreKind::Memory),
            "jsonl" => Ok(StoreKind::Jsonl),
            other => bail!("Unknown store kind '{}', expected memory or jsonl", other),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StoreConfig {
    #[serde(default)]
    pub kind: StoreKind,
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

fn default_store_path() -> PathBuf {
    Path::new(RT2_DIR).join("examples.jsonl")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::Memory,
            path: default_store_path(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorkspaceConfig {
    pub env_size_m: f64,
    pub env_height_m: f64,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            env_size_m: DEFAULT_ENV_SIZE_M,
            env_height_m: DEFAULT_ENV_HEIGHT_M,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Rt2Config {
    pub bind: String,
    pub port: u16,
    /// Cap on `GET /examples?limit=`.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
}

fn default_history_limit() -> usize {
    100
}

impl Default for Rt2Config {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8000,
            history_limit: default_history_limit(),
            store: StoreConfig::default(),
            workspace: WorkspaceConfig::default(),
        }
    }
}

impl Rt2Config {
    pub fn config_path() -> PathBuf {
        Path::new(RT2_DIR).join("config.toml")
    }

    /// Reads `path` if present, else defaults. Environment overrides win.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            toml::from_str(&raw).with_context(|| format!("Invalid config {}", path.display()))?
        } else {
            Self::default()
        };
        config.apply_env()?;
        config
            .workspace_tokenizer()
            .with_context(|| format!("Invalid [workspace] in {}", path.display()))?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(bind) = env::var("RT2TOK_BIND") {
            self.bind = bind;
        }
        if let Ok(port) = env::var("RT2TOK_PORT") {
            self.port = port
                .parse()
                .with_context(|| format!("RT2TOK_PORT is not a port: {}", port))?;
        }
        if let Ok(kind) = env::var("RT2TOK_STORE") {
            self.store.kind = kind.parse()?;
        }
        Ok(())
    }

    pub fn workspace_tokenizer(&self) -> Result<WorkspaceTokenizer> {
        Ok(WorkspaceTokenizer::new(
            self.workspace.env_size_m,
            self.workspace.env_height_m,
        )?)
    }

    pub async fn open_store(&self) -> Result<Arc<dyn ExampleStore>> {
        Ok(match self.store.kind {
            StoreKind::Memory => Arc::new(InMemoryStore::new()),
            StoreKind::Jsonl => Arc::new(JsonlStore::open(&self.store.path).await?),
        })
    }
}

/// Shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Rt2Config>,
    pub store: Arc<dyn ExampleStore>,
    pub workspace: Arc<WorkspaceTokenizer>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Rt2Config, store: Arc<dyn ExampleStore>) -> Result<Self> {
        let workspace = Arc::new(config.workspace_tokenizer()?);
        Ok(Self {
            config: Arc::new(config),
            store,
            workspace,
            started_at: Instant::now(),
        })
    }
}
