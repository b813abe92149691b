pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod responses;
pub mod session;
pub mod text;

pub use catalog::Catalog;
pub use domain::conversation::{ConversationLog, Speaker, Turn};
pub use domain::menu::{MenuItem, MenuItemId};
pub use errors::ApplicationError;
pub use responses::{ResponseKey, ResponseLibrary};
pub use session::{
    SessionAction, SessionEvent, SessionMachine, SessionPhase, SessionState,
    SessionTransitionError, TransitionOutcome,
};
pub use text::normalize;
