use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// A log row that does not have the `id,user,label,comment` shape.
    #[error("Log {path}: line {line} has {found} columns, expected 4")]
    LogSchema {
        path: PathBuf,
        line: u64,
        found: usize,
    },

    #[error("Log file already exists: {0}")]
    LogExists(PathBuf),

    #[error("Catalog {0} has no `lc_path` column")]
    CatalogColumn(PathBuf),

    #[error("Invalid label set: {0}")]
    Labels(String),

    #[error("No log file selected; open or create one first")]
    NoActiveLog,

    #[error("Every figure in this session is already classified")]
    SessionFinished,
}
