use crate::{PostReference, PostStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Begin a run for the given author names.
    Start { authors: Vec<String> },
    /// Phase one finished; references are in listing order.
    LinksCollected(Vec<PostReference>),
    /// Phase one failed; the run cannot continue.
    CollectionFailed(String),
    /// The archiver finished the reference at `index`.
    PostArchived { index: usize, status: PostStatus },
}
