use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Error, Result};

const PATH_COLUMN: &str = "lc_path";

/// External table selecting which figures belong to the corpus.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    paths: Vec<PathBuf>,
}

impl Catalog {
    pub fn read(path: &Path) -> Result<Catalog> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;
        let column = reader
            .headers()?
            .iter()
            .position(|h| h == PATH_COLUMN)
            .ok_or_else(|| Error::CatalogColumn(path.to_path_buf()))?;

        let mut paths = vec![];
        for row in reader.records() {
            let row = row?;
            if let Some(cell) = row.get(column).filter(|c| !c.is_empty()) {
                paths.push(PathBuf::from(cell));
            }
        }
        info!("Loaded catalog {} with {} entries", path.display(), paths.len());
        Ok(Catalog { paths })
    }

    /// Paths relative to the corpus folder, in catalog order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn ids(&self) -> Vec<String> {
        self.paths
            .iter()
            .filter_map(|p| p.file_stem())
            .map(|s| s.to_string_lossy().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }
}
