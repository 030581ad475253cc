use rand::Rng;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::corpus::Corpus;
use crate::error::{Error, Result};
use crate::log::ClassificationLog;
use crate::session::Session;

/// Everything the UI can ask the session to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    OpenLog(PathBuf),
    NewLog(PathBuf),
    SelectCatalog(PathBuf),
    Record { label: String, comment: String },
    GoBack,
    /// Advance without deciding, after the current figure failed to display.
    Skip,
    Save,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Started { total: usize, remaining: usize },
    CatalogSelected { entries: usize },
    /// `save_error` carries an autosave failure; the decision itself stands.
    Recorded { id: String, save_error: Option<String> },
    Moved { from: usize, to: usize },
    Saved { rows: usize },
}

/// The whole state behind the window: corpus, optional catalog and the live session.
#[derive(Debug, Default)]
pub struct Workflow {
    pub corpus: Corpus,
    pub catalog: Option<Catalog>,
    pub session: Option<Session>,
    pub log_path: Option<PathBuf>,
    pub user: String,
    pub autosave: bool,
    /// Log contents as opened, written back for ids outside the session.
    loaded: ClassificationLog,
}

impl Workflow {
    pub fn new(corpus: Corpus, user: impl Into<String>) -> Self {
        Self { corpus, user: user.into(), ..Self::default() }
    }

    /// Applies one command. The state always comes back; a rejected command
    /// leaves it as it was. A failed autosave does not reject `Record`.
    pub fn handle<R: Rng + ?Sized>(mut self, cmd: Command, rng: &mut R) -> (Workflow, Result<Outcome>) {
        let result = self.apply(cmd, rng);
        (self, result)
    }

    fn apply<R: Rng + ?Sized>(&mut self, cmd: Command, rng: &mut R) -> Result<Outcome> {
        match cmd {
            Command::OpenLog(path) => {
                let log = ClassificationLog::read(&path)?;
                self.save_before_switch()?;
                self.start(path, log, rng)
            }
            Command::NewLog(path) => {
                self.save_before_switch()?;
                let log = ClassificationLog::create(&path)?;
                self.start(path, log, rng)
            }
            Command::SelectCatalog(path) => {
                let catalog = Catalog::read(&path)?;
                let entries = catalog.len();
                if self.session.is_some() {
                    info!("Catalog will apply to the next log opened");
                }
                self.catalog = Some(catalog);
                Ok(Outcome::CatalogSelected { entries })
            }
            Command::Record { label, comment } => {
                let session = self.session.as_mut().ok_or(Error::NoActiveLog)?;
                let id = match session.current() {
                    Some(e) if !session.is_finished() => e.item.id.clone(),
                    _ => return Err(Error::SessionFinished),
                };
                session.classify(&label, &comment, &self.user);
                session.move_forward();
                info!("{} -> {}", id, label);
                let mut save_error = None;
                if self.autosave {
                    if let Err(e) = self.save() {
                        warn!("Autosave failed: {}", e);
                        save_error = Some(e.to_string());
                    }
                }
                Ok(Outcome::Recorded { id, save_error })
            }
            Command::GoBack => {
                let session = self.session.as_mut().ok_or(Error::NoActiveLog)?;
                let from = session.current_index();
                session.move_backwards();
                Ok(Outcome::Moved { from, to: session.current_index() })
            }
            Command::Skip => {
                let session = self.session.as_mut().ok_or(Error::NoActiveLog)?;
                let from = session.current_index();
                session.move_forward();
                Ok(Outcome::Moved { from, to: session.current_index() })
            }
            Command::Save => self.save().map(|rows| Outcome::Saved { rows }),
        }
    }

    fn start<R: Rng + ?Sized>(
        &mut self,
        log_path: PathBuf,
        log: ClassificationLog,
        rng: &mut R,
    ) -> Result<Outcome> {
        let mut session = Session::from_corpus(&self.corpus, self.catalog.as_ref())?;
        session.add_log(&log);
        session.set_order(rng);
        let outcome = Outcome::Started { total: session.len(), remaining: session.remaining() };
        if log.is_empty() {
            info!("Classifying into {} (empty log)", log_path.display());
        } else {
            info!("Classifying into {}, {} rows on file", log_path.display(), log.len());
        }
        self.session = Some(session);
        self.log_path = Some(log_path);
        self.loaded = log;
        Ok(outcome)
    }

    fn save(&self) -> Result<usize> {
        match (&self.session, &self.log_path) {
            (Some(session), Some(path)) => session.write_log(path, &self.loaded),
            _ => Err(Error::NoActiveLog),
        }
    }

    /// Writes the running session out before another log replaces it.
    fn save_before_switch(&self) -> Result<()> {
        if self.session.is_some() {
            let rows = self.save()?;
            info!("Saved {} rows before switching logs", rows);
        }
        Ok(())
    }

    /// Best-effort save when the window closes.
    pub fn flush(&self) -> Result<()> {
        if self.session.is_none() {
            warn!("No log selected; nothing to save");
            return Ok(());
        }
        self.save().map(|_| ())
    }
}
