//! Playlist core: pure session coordinator and view-model helpers.
mod effect;
mod event;
mod msg;
mod progress;
mod results;
mod selection;
mod session;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use event::{ChannelStatus, JobEvent};
pub use msg::Msg;
pub use progress::{BatchStatus, ProgressSnapshot, TransferPhase};
pub use results::{CompletedItem, ResultAggregator};
pub use selection::Selection;
pub use session::{Generation, JobId, Session, SessionOutcome, SessionStatus};
pub use state::AppState;
pub use update::update;
pub use view_model::{AppViewModel, CompletedRowView};
