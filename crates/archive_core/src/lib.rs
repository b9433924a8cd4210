//! Archive core: data model and the pure pipeline state machine.
mod effect;
mod model;
mod msg;
mod state;
mod update;

pub use effect::{AbortReason, Effect};
pub use model::{PostReference, PostStatus, RunSummary};
pub use msg::Msg;
pub use state::{Phase, RunState};
pub use update::update;
