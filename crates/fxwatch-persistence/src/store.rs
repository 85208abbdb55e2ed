//! Holdings document store.

use crate::error::PersistenceResult;
use fxwatch_core::Holding;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const HOLDINGS_FILE: &str = "portfolio.json";

/// Stores holdings as one pretty-printed JSON document.
pub struct HoldingsStore {
    path: PathBuf,
}

impl HoldingsStore {
    /// Create a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl AsRef<Path>) -> PersistenceResult<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        Ok(Self {
            path: dir.join(HOLDINGS_FILE),
        })
    }

    /// Persist the holdings, replacing any previous document.
    pub fn save(&self, holdings: &[Holding]) -> PersistenceResult<()> {
        let json = serde_json::to_string_pretty(holdings)?;
        fs::write(&self.path, json)?;
        info!(path = %self.path.display(), count = holdings.len(), "Holdings saved");
        Ok(())
    }

    /// Load the holdings. A missing document yields an empty list.
    pub fn load(&self) -> PersistenceResult<Vec<Holding>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => {
                let holdings: Vec<Holding> = serde_json::from_str(&text)?;
                debug!(path = %self.path.display(), count = holdings.len(), "Holdings loaded");
                Ok(holdings)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
