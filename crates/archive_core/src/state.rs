use std::collections::BTreeSet;

use crate::{AbortReason, PostReference, RunSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    CollectingLinks,
    ArchivingPosts,
    Done,
    Aborted,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Done | Phase::Aborted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunState {
    phase: Phase,
    authors: BTreeSet<String>,
    references: Vec<PostReference>,
    /// Index of the reference currently being archived.
    cursor: usize,
    summary: RunSummary,
    abort_reason: Option<AbortReason>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn authors(&self) -> &BTreeSet<String> {
        &self.authors
    }

    pub fn references(&self) -> &[PostReference] {
        &self.references
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    pub fn abort_reason(&self) -> Option<&AbortReason> {
        self.abort_reason.as_ref()
    }

    pub(crate) fn cursor(&self) -> usize {
        self.cursor
    }

    pub(crate) fn start(&mut self, authors: BTreeSet<String>) {
        self.authors = authors;
        self.phase = Phase::CollectingLinks;
    }

    pub(crate) fn begin_archiving(&mut self, references: Vec<PostReference>) {
        self.summary = RunSummary {
            found: references.len(),
            ..RunSummary::default()
        };
        self.references = references;
        self.cursor = 0;
        self.phase = Phase::ArchivingPosts;
    }

    pub(crate) fn advance(&mut self) {
        self.cursor += 1;
    }

    pub(crate) fn summary_mut(&mut self) -> &mut RunSummary {
        &mut self.summary
    }

    pub(crate) fn finish(&mut self) {
        self.phase = Phase::Done;
    }

    pub(crate) fn abort(&mut self, reason: AbortReason) {
        self.abort_reason = Some(reason);
        self.phase = Phase::Aborted;
    }
}
