use tracing::{info, warn};

use crate::config::LedgerConfig;
use crate::domain::common::Identifiable;
use crate::errors::LedgerError;
use crate::ledger::dataset::{DataSet, EntityList};
use crate::ledger::lifecycle::{recompute, LifecycleMap};
use crate::ledger::session::EditSession;
use crate::tracking::{ChangeTracked, EntityState};

/// Counts of what a commit folded into the canonical snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitSummary {
    pub created: usize,
    pub changed: usize,
    pub deleted: usize,
}

impl CommitSummary {
    fn tally<T: ChangeTracked + Identifiable>(&mut self, list: &EntityList<T>) {
        for entity in list.iter() {
            match entity.state() {
                EntityState::New => self.created += 1,
                EntityState::Changed => self.changed += 1,
                EntityState::Deleted => self.deleted += 1,
                EntityState::Clean => {}
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.created == 0 && self.changed == 0 && self.deleted == 0
    }
}

/// Owner of the canonical snapshot. All edits go through an [`EditSession`].
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    snapshot: DataSet,
    config: LedgerConfig,
    generation: u64,
}

impl Ledger {
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            snapshot: DataSet::new(),
            config,
            generation: 0,
        }
    }

    pub fn snapshot(&self) -> &DataSet {
        &self.snapshot
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Lifecycle flags of the committed snapshot.
    pub fn lifecycle(&self) -> LifecycleMap {
        recompute(&self.snapshot)
    }

    /// Opens a session sharing every list with the snapshot until first write.
    pub fn edit(&self) -> EditSession {
        EditSession::new(self.snapshot.clone(), self.config.clone(), self.generation)
    }

    /// Validates the session and, when it is clean, replaces the canonical snapshot
    /// with it. The session stays open on the new snapshot either way.
    pub fn commit(&mut self, session: &mut EditSession) -> Result<CommitSummary, LedgerError> {
        if session.generation() != self.generation {
            warn!(
                session = session.generation(),
                ledger = self.generation,
                "commit refused for stale session"
            );
            return Err(LedgerError::StaleSession);
        }

        session.validate();
        let errors = session.errors();
        if !errors.is_empty() {
            warn!(entities = errors.len(), "commit refused, validation errors present");
            return Err(LedgerError::ValidationFailed { errors });
        }

        let mut summary = CommitSummary::default();
        let data = session.data();
        summary.tally(data.accounts());
        summary.tally(data.transactions());
        summary.tally(data.patterns());
        summary.tally(data.rates());
        summary.tally(data.prices());
        summary.tally(data.tax_years());

        let mut data = data.clone();
        data.commit_against(&self.snapshot);
        self.snapshot = data;
        self.generation += 1;
        session.rebase(self.snapshot.clone(), self.generation);

        info!(
            created = summary.created,
            changed = summary.changed,
            deleted = summary.deleted,
            "session committed"
        );
        Ok(summary)
    }
}
