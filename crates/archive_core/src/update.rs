use std::collections::BTreeSet;

use crate::{AbortReason, Effect, Msg, Phase, RunState};

/// Pure update function: applies a message to state and returns any effects.
///
/// At most one `ArchivePost` effect is outstanding at any time; the next one
/// is only emitted once the previous reference reports back.
pub fn update(mut state: RunState, msg: Msg) -> (RunState, Vec<Effect>) {
    let effects = match msg {
        Msg::Start { authors } => {
            if state.phase() != Phase::Idle {
                return (state, Vec::new());
            }
            let authors = parse_authors(authors);
            if authors.is_empty() {
                state.abort(AbortReason::NoAuthors);
                vec![Effect::Abort(AbortReason::NoAuthors)]
            } else {
                state.start(authors.clone());
                vec![Effect::CollectLinks { authors }]
            }
        }
        Msg::LinksCollected(references) => {
            if state.phase() != Phase::CollectingLinks {
                return (state, Vec::new());
            }
            state.begin_archiving(references);
            next_post_or_finish(&mut state)
        }
        Msg::CollectionFailed(reason) => {
            if state.phase() != Phase::CollectingLinks {
                return (state, Vec::new());
            }
            let reason = AbortReason::CollectionFailed(reason);
            state.abort(reason.clone());
            vec![Effect::Abort(reason)]
        }
        Msg::PostArchived { index, status } => {
            if state.phase() != Phase::ArchivingPosts || index != state.cursor() {
                return (state, Vec::new());
            }
            state.summary_mut().record(status);
            state.advance();
            next_post_or_finish(&mut state)
        }
    };

    (state, effects)
}

fn next_post_or_finish(state: &mut RunState) -> Vec<Effect> {
    let index = state.cursor();
    match state.references().get(index) {
        Some(reference) => vec![Effect::ArchivePost {
            index,
            total: state.references().len(),
            reference: reference.clone(),
        }],
        None => {
            state.finish();
            vec![Effect::Finish(state.summary())]
        }
    }
}

fn parse_authors(raw: Vec<String>) -> BTreeSet<String> {
    raw.into_iter()
        .map(|author| author.trim().to_string())
        .filter(|author| !author.is_empty())
        .collect()
}
