use std::path::PathBuf;
use std::sync::Arc;

use crate::catalog::ManualCatalog;
use crate::cli::GlobalArgs;
use crate::storage::{BlobStore, LocalFsBlobStore};

const DEFAULT_DATA_DIR: &str = ".ietm";

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub catalog: Option<PathBuf>,
    pub require_login: bool,
}

impl Config {
    /// Flags first, then `IETM_*` environment variables, then defaults.
    pub fn resolve(args: &GlobalArgs) -> Self {
        let data_dir = args
            .data_dir
            .clone()
            .or_else(|| non_empty_env("IETM_DATA_DIR"))
            .unwrap_or_else(|| DEFAULT_DATA_DIR.to_owned());
        let catalog = args
            .catalog
            .clone()
            .or_else(|| non_empty_env("IETM_CATALOG"));
        let require_login = non_empty_env("IETM_REQUIRE_LOGIN")
            .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"))
            .unwrap_or(true);

        Self {
            data_dir: PathBuf::from(data_dir),
            catalog: catalog.map(PathBuf::from),
            require_login,
        }
    }

    pub fn storage(&self) -> Arc<dyn BlobStore> {
        Arc::new(LocalFsBlobStore::new(&self.data_dir))
    }

    pub fn load_catalog(&self) -> anyhow::Result<ManualCatalog> {
        match &self.catalog {
            Some(path) => {
                tracing::debug!(catalog = %path.display(), "loading catalog file");
                ManualCatalog::from_yaml_path(path)
            }
            None => ManualCatalog::builtin(),
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
