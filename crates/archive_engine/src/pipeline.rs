use std::collections::VecDeque;

use archive_core::{update, AbortReason, Effect, Msg, RunState, RunSummary};
use archive_logging::{archive_error, archive_info};
use thiserror::Error;

use crate::archive::{ArchiveSettings, PostArchiver};
use crate::listing::collect_links;
use crate::session::PageSession;
use crate::{EngineEvent, FailureKind, FetchError, ProgressSink};

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// First listing page of the forum section.
    pub listing_url: String,
    pub archive: ArchiveSettings,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("at least one author name is required")]
    NoAuthors,
    #[error("collecting post links failed: {0}")]
    Collection(FetchError),
}

/// Run the two-phase archive for `authors`: collect every matching link, then
/// archive them one by one.
///
/// Only setup and link collection can fail the run. A post that cannot be
/// archived is reported through `sink` and counted in the summary.
pub async fn run_pipeline(
    session: &mut dyn PageSession,
    settings: &PipelineSettings,
    authors: &[String],
    sink: &dyn ProgressSink,
) -> Result<RunSummary, PipelineError> {
    let archiver = PostArchiver::new(&settings.archive);
    let mut collection_error: Option<FetchError> = None;

    let (mut state, effects) = update(
        RunState::new(),
        Msg::Start {
            authors: authors.to_vec(),
        },
    );
    let mut pending: VecDeque<Effect> = effects.into();

    while let Some(effect) = pending.pop_front() {
        let msg = match effect {
            Effect::CollectLinks { authors } => {
                archive_info!(
                    "Collecting links for [{}] from {}",
                    authors.iter().cloned().collect::<Vec<_>>().join(", "),
                    settings.listing_url
                );
                match collect_links(
                    session,
                    &settings.listing_url,
                    &authors,
                    &settings.archive.selectors,
                    sink,
                )
                .await
                {
                    Ok(references) => {
                        sink.emit(EngineEvent::LinksCollected {
                            total: references.len(),
                        });
                        Msg::LinksCollected(references)
                    }
                    Err(err) => {
                        let reason = err.to_string();
                        collection_error = Some(err);
                        Msg::CollectionFailed(reason)
                    }
                }
            }
            Effect::ArchivePost {
                index,
                total,
                reference,
            } => {
                let outcome = archiver.archive(session, &reference, sink).await;
                let status = outcome.status;
                sink.emit(EngineEvent::PostFinished {
                    position: index + 1,
                    total,
                    reference,
                    outcome,
                });
                Msg::PostArchived { index, status }
            }
            Effect::Finish(summary) => {
                archive_info!(
                    "Run finished: {} found, {} new, {} skipped, {} failed",
                    summary.found,
                    summary.created,
                    summary.skipped,
                    summary.failed
                );
                sink.emit(EngineEvent::RunFinished(summary));
                return Ok(summary);
            }
            Effect::Abort(reason) => {
                let err = match reason {
                    AbortReason::NoAuthors => PipelineError::NoAuthors,
                    AbortReason::CollectionFailed(message) => {
                        PipelineError::Collection(collection_error.take().unwrap_or_else(
                            || FetchError::new(FailureKind::Network, message),
                        ))
                    }
                };
                archive_error!("Run aborted: {}", err);
                sink.emit(EngineEvent::RunAborted {
                    reason: err.to_string(),
                });
                return Err(err);
            }
        };

        let (next, effects) = update(state, msg);
        state = next;
        pending.extend(effects);
    }

    Ok(state.summary())
}
