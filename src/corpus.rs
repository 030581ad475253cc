use glob::{glob, Pattern};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::error::Result;

pub const DEFAULT_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// One image awaiting a decision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    pub path: PathBuf,
    pub id: String, // file name without extension
}

impl Item {
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Item> {
        let path = path.into();
        let id = path.file_stem()?.to_string_lossy().to_string();
        if id.is_empty() {
            return None;
        }
        Some(Item { path, id })
    }
}

/// Where the figures to classify come from.
#[derive(Clone, Debug)]
pub enum Corpus {
    Folder { root: PathBuf, extensions: Vec<String> },
    Files(Vec<PathBuf>),
}

impl Default for Corpus {
    fn default() -> Self {
        Corpus::Files(vec![])
    }
}

impl Corpus {
    /// A single directory is scanned; anything else is taken as an ordered file list.
    pub fn from_inputs(inputs: &[PathBuf], extensions: &[String]) -> Corpus {
        match inputs {
            [dir] if dir.is_dir() => Corpus::Folder {
                root: dir.clone(),
                extensions: extensions.to_vec(),
            },
            _ => Corpus::Files(inputs.to_vec()),
        }
    }

    fn files(&self) -> Result<Vec<PathBuf>> {
        match self {
            Corpus::Folder { root, extensions } => scan_folder(root, extensions),
            Corpus::Files(paths) => Ok(paths.clone()),
        }
    }

    /// Items to classify, narrowed and ordered by the catalog when one is given.
    pub fn items(&self, catalog: Option<&Catalog>) -> Result<Vec<Item>> {
        let paths = match (self, catalog) {
            (_, None) => self.files()?,
            (Corpus::Folder { root, .. }, Some(cat)) => {
                cat.paths().iter().map(|p| root.join(p)).collect()
            }
            (Corpus::Files(paths), Some(cat)) => {
                let mut by_id: HashMap<String, PathBuf> = HashMap::new();
                for p in paths {
                    if let Some(item) = Item::from_path(p) {
                        by_id.insert(item.id, item.path);
                    }
                }
                cat.ids().into_iter().filter_map(|id| by_id.remove(&id)).collect()
            }
        };

        let mut items = Vec::with_capacity(paths.len());
        for p in paths {
            match Item::from_path(&p) {
                Some(item) => items.push(item),
                None => warn!("Skipping path without a file name: {}", p.display()),
            }
        }
        debug!("Corpus resolved to {} items", items.len());
        Ok(items)
    }
}

fn scan_folder(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let mut imgs = vec![];
    let escaped = Pattern::escape(&dir.to_string_lossy());
    for ext in extensions {
        let globpat = format!("{}/*.{}", escaped, ext.trim_start_matches('.'));
        for entry in glob(&globpat)? {
            match entry {
                Ok(p) if p.is_file() => imgs.push(p),
                Ok(_) => {}
                Err(e) => warn!("Unreadable entry in {}: {}", dir.display(), e),
            }
        }
    }
    imgs.sort();
    imgs.dedup();
    Ok(imgs)
}
