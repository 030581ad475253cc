use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::corpus::{Corpus, Item};
use crate::error::Result;
use crate::log::{self, ClassificationLog, ClassificationRecord, Decision};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub item: Item,
    pub decision: Decision,
}

/// Ordered working set of items plus the cursor tracking progress.
///
/// Items labeled before this run sit in `entries[..start_index]`; the cursor
/// never moves into that prefix.
#[derive(Clone, Debug, Default)]
pub struct Session {
    entries: Vec<Entry>,
    start_index: usize,
    current_index: usize,
}

impl Session {
    pub fn new(items: impl IntoIterator<Item = Item>) -> Self {
        let entries = items
            .into_iter()
            .map(|item| Entry { item, decision: Decision::default() })
            .collect();
        Self { entries, start_index: 0, current_index: 0 }
    }

    pub fn from_corpus(corpus: &Corpus, catalog: Option<&Catalog>) -> Result<Self> {
        Ok(Self::new(corpus.items(catalog)?))
    }

    /// Left outer join of the working set onto `log` by identifier.
    /// Items missing from the log get an empty decision; log rows for unknown
    /// identifiers are dropped.
    pub fn add_log(&mut self, log: &ClassificationLog) {
        let mut matched = 0;
        for e in &mut self.entries {
            e.decision = match log.get(&e.item.id) {
                Some(d) => {
                    matched += 1;
                    d.clone()
                }
                None => Decision::default(),
            };
        }
        debug!(
            "Merged log: {} of {} logged ids present in session",
            matched,
            log.len()
        );
    }

    /// Labeled items first in their current order, then unlabeled items shuffled.
    pub fn set_order<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let (labeled, mut unlabeled): (Vec<Entry>, Vec<Entry>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|e| e.decision.is_labeled());
        unlabeled.shuffle(rng);

        self.start_index = labeled.len();
        self.entries = labeled;
        self.entries.extend(unlabeled);
        // Everything already labeled: park on the last entry.
        self.current_index = self.start_index.min(self.entries.len().saturating_sub(1));
        info!(
            "Session ordered: {} already classified, {} remaining",
            self.start_index,
            self.entries.len() - self.start_index
        );
    }

    pub fn move_forward(&mut self) {
        if self.current_index + 1 < self.entries.len() {
            self.current_index += 1;
        }
    }

    /// Steps back one item, but never onto `start_index` itself.
    pub fn move_backwards(&mut self) {
        if self.current_index > self.start_index + 1 {
            self.current_index -= 1;
        }
    }

    /// Overwrites the decision at the cursor. Does not advance.
    pub fn classify(&mut self, label: &str, comment: &str, user: &str) {
        if let Some(e) = self.entries.get_mut(self.current_index) {
            e.decision = Decision {
                user: user.to_string(),
                label: label.to_string(),
                comment: comment.to_string(),
            };
        }
    }

    pub fn records(&self) -> Vec<ClassificationRecord> {
        self.entries
            .iter()
            .filter(|e| e.decision.is_labeled())
            .map(|e| ClassificationRecord {
                id: e.item.id.clone(),
                user: e.decision.user.clone(),
                label: e.decision.label.clone(),
                comment: e.decision.comment.clone(),
            })
            .collect()
    }

    /// Full resnapshot of every labeled entry, followed by the rows of
    /// `carried` for identifiers this session does not hold. Returns the
    /// number of rows written.
    pub fn write_log(&self, path: &Path, carried: &ClassificationLog) -> Result<usize> {
        let held: HashSet<&str> = self.entries.iter().map(|e| e.item.id.as_str()).collect();
        let mut records = self.records();
        let outside = carried.records().into_iter().filter(|r| !held.contains(r.id.as_str()));
        records.extend(outside);
        let n = log::write_records(path, &records)?;
        info!("Saved {} classifications to {}", n, path.display());
        Ok(n)
    }

    pub fn current(&self) -> Option<&Entry> {
        self.entries.get(self.current_index)
    }

    pub fn previous_id(&self) -> Option<&str> {
        let i = self.current_index.checked_sub(1)?;
        self.entries.get(i).map(|e| e.item.id.as_str())
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn start_index(&self) -> usize {
        self.start_index
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.entries.iter().filter(|e| !e.decision.is_labeled()).count()
    }

    /// True once the cursor rests on a labeled last entry, or there is nothing to show.
    pub fn is_finished(&self) -> bool {
        match self.current() {
            None => true,
            Some(e) => self.current_index + 1 == self.entries.len() && e.decision.is_labeled(),
        }
    }
}
