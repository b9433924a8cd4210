//! Archive engine: page fetching, parsing, and writing the archive tree.
mod archive;
mod decode;
mod fetch;
mod filename;
mod follow;
mod listing;
mod media;
mod normalize;
mod persist;
mod pipeline;
mod post;
mod progress;
mod selectors;
mod session;
mod types;
mod urls;

pub use archive::{
    post_dir, ArchiveError, ArchiveSettings, PostArchiver, COMPLETE_MARKER, POST_FILENAME,
};
pub use decode::{decode_html, DecodedHtml};
pub use fetch::{FetchSettings, HttpPageSession};
pub use filename::{media_filename, sanitize, MAX_NAME_CHARS};
pub use follow::{extract_post_author, FollowError};
pub use listing::{collect_links, discover_authors};
pub use media::{MediaFetcher, MediaOptions};
pub use normalize::{normalize, normalize_element};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use pipeline::{run_pipeline, PipelineError, PipelineSettings};
pub use post::{render_post_markdown, PostRecord};
pub use progress::{NullProgressSink, ProgressSink, RecordingProgressSink};
pub use selectors::ForumSelectors;
pub use session::PageSession;
pub use types::{
    ArchiveOutcome, EngineEvent, FailureKind, FetchError, MediaItem, MediaKind, MediaReport,
};
