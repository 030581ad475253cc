use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{Error, Result};

const COLUMNS: usize = 4;

/// What a user decided about one item. Empty label means undecided.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Decision {
    pub user: String,
    pub label: String,
    pub comment: String,
}

impl Decision {
    pub fn is_labeled(&self) -> bool {
        !self.label.is_empty()
    }
}

/// One row of the log file: `id,user,label,comment`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    pub id: String,
    pub user: String,
    pub label: String,
    pub comment: String,
}

impl ClassificationRecord {
    pub fn decision(&self) -> Decision {
        Decision {
            user: self.user.clone(),
            label: self.label.clone(),
            comment: self.comment.clone(),
        }
    }
}

/// Previously saved decisions keyed by identifier, in first-seen row order.
#[derive(Clone, Debug, Default)]
pub struct ClassificationLog {
    decisions: HashMap<String, Decision>,
    order: Vec<String>,
}

impl ClassificationLog {
    /// Later rows for the same identifier replace earlier ones.
    pub fn from_records(records: impl IntoIterator<Item = ClassificationRecord>) -> Self {
        let mut decisions = HashMap::new();
        let mut order = vec![];
        for r in records {
            let decision = r.decision();
            if decisions.insert(r.id.clone(), decision).is_none() {
                order.push(r.id);
            }
        }
        Self { decisions, order }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let mut records = vec![];
        for row in reader.records() {
            let row = row?;
            if row.len() != COLUMNS {
                let line = row.position().map(|p| p.line()).unwrap_or(0);
                return Err(Error::LogSchema {
                    path: path.to_path_buf(),
                    line,
                    found: row.len(),
                });
            }
            let record: ClassificationRecord = row.deserialize(None)?;
            records.push(record);
        }
        info!("Read {} rows from log {}", records.len(), path.display());
        Ok(Self::from_records(records))
    }

    /// Claims `path` for a fresh, empty log. Refuses to touch an existing file.
    pub fn create(path: &Path) -> Result<Self> {
        match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(_) => {
                info!("Created new log {}", path.display());
                Ok(Self::default())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(Error::LogExists(path.to_path_buf()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Decision> {
        self.decisions.get(id)
    }

    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    /// Rows as they would be written back, one per identifier.
    pub fn records(&self) -> Vec<ClassificationRecord> {
        self.order
            .iter()
            .filter_map(|id| {
                let d = self.decisions.get(id)?;
                Some(ClassificationRecord {
                    id: id.clone(),
                    user: d.user.clone(),
                    label: d.label.clone(),
                    comment: d.comment.clone(),
                })
            })
            .collect()
    }
}

/// Overwrites `path` with `records`, no header row.
pub fn write_records<'a>(
    path: &Path,
    records: impl IntoIterator<Item = &'a ClassificationRecord>,
) -> Result<usize> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    let mut n = 0;
    for r in records {
        wtr.serialize(r)?;
        n += 1;
    }
    wtr.flush()?;
    debug!("Wrote {} rows to {}", n, path.display());
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn rec(id: &str, label: &str, comment: &str) -> ClassificationRecord {
        ClassificationRecord {
            id: id.to_string(),
            user: "dmr".to_string(),
            label: label.to_string(),
            comment: comment.to_string(),
        }
    }

    #[test]
    fn write_then_read_keeps_fields() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("log.csv");
        let rows = vec![rec("a", "yes", "clear eclipse, deep"), rec("17", "no", "")];
        assert_eq!(write_records(&p, &rows).unwrap(), 2);

        let text = fs::read_to_string(&p).unwrap();
        assert!(text.starts_with("a,dmr,yes,\"clear eclipse, deep\"\n"));

        let log = ClassificationLog::read(&p).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.get("a").unwrap().comment, "clear eclipse, deep");
        assert_eq!(log.get("17").unwrap().label, "no");
        assert!(log.get("b").is_none());
    }

    #[test]
    fn later_rows_win() {
        let log = ClassificationLog::from_records(vec![
            rec("a", "yes", ""),
            rec("b", "no", ""),
            rec("a", "no", "changed"),
        ]);
        assert_eq!(log.len(), 2);
        assert_eq!(log.get("a").unwrap().label, "no");
        // first appearance fixes the position
        assert_eq!(log.records(), vec![rec("a", "no", "changed"), rec("b", "no", "")]);
    }

    #[test]
    fn fields_are_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("log.csv");
        fs::write(&p, " a , dmr , yes , ok \n").unwrap();
        let log = ClassificationLog::read(&p).unwrap();
        assert_eq!(log.get("a").unwrap().user, "dmr");
        assert_eq!(log.get("a").unwrap().comment, "ok");
    }

    #[test]
    fn wrong_column_count_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("log.csv");
        fs::write(&p, "a,dmr,yes,\nb,dmr,s,true,false\n").unwrap();
        match ClassificationLog::read(&p) {
            Err(Error::LogSchema { line, found, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(found, 5);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn create_refuses_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("log.csv");
        let log = ClassificationLog::create(&p).unwrap();
        assert!(log.is_empty());
        assert!(p.exists());
        assert!(matches!(ClassificationLog::create(&p), Err(Error::LogExists(_))));
    }
}
