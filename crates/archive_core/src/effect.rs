use std::collections::BTreeSet;

use crate::{PostReference, RunSummary};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Walk the listing and gather references authored by `authors`.
    CollectLinks { authors: BTreeSet<String> },
    /// Archive a single reference. Only one is outstanding at a time.
    ArchivePost {
        index: usize,
        total: usize,
        reference: PostReference,
    },
    Finish(RunSummary),
    Abort(AbortReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    /// No author was given; nothing can match.
    NoAuthors,
    /// The listing could not be walked.
    CollectionFailed(String),
}
