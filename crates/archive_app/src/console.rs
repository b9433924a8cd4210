use archive_core::{PostStatus, RunSummary};
use archive_engine::{ArchiveOutcome, EngineEvent, ProgressSink};

/// Prints progress lines on stdout as the engine reports them.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleProgress;

impl ProgressSink for ConsoleProgress {
    fn emit(&self, event: EngineEvent) {
        if let Some(line) = render_event(&event) {
            println!("{line}");
        }
    }
}

pub fn render_event(event: &EngineEvent) -> Option<String> {
    match event {
        EngineEvent::ListingPageScanned { page, matched, .. } => Some(format!(
            "...scanning page {page} ({matched} matching)"
        )),
        EngineEvent::LinksCollected { total } => {
            Some(format!("Found {total} posts, archiving one by one"))
        }
        EngineEvent::PostFinished {
            position,
            total,
            reference,
            outcome,
        } => Some(format!(
            "-> ({position}/{total}) [{}] {} - {}",
            status_label(outcome.status),
            reference.author,
            describe(outcome, &reference.url)
        )),
        EngineEvent::MediaFailed { url, message } => {
            Some(format!("   media failed: {url} ({message})"))
        }
        EngineEvent::RunFinished(summary) => Some(render_summary(summary)),
        // The caller prints the error itself.
        EngineEvent::RunAborted { .. } => None,
    }
}

pub fn render_summary(summary: &RunSummary) -> String {
    format!(
        "Done: {} found, {} new, {} skipped, {} failed",
        summary.found, summary.created, summary.skipped, summary.failed
    )
}

fn status_label(status: PostStatus) -> &'static str {
    match status {
        PostStatus::Created => "new",
        PostStatus::Skipped => "skipped",
        PostStatus::Failed => "error",
    }
}

fn describe(outcome: &ArchiveOutcome, url: &str) -> String {
    match (&outcome.title, outcome.status) {
        (_, PostStatus::Failed) => format!("{url}: {}", outcome.detail),
        (Some(title), _) => title.clone(),
        (None, _) => url.to_string(),
    }
}
