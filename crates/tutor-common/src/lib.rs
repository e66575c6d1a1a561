pub mod errors;
pub mod events;
pub mod id;
pub mod types;

pub use errors::{BridgeError, ConfigError, TutorError};
pub use events::{Event, EventBus};
pub use id::{new_id, SessionId};
pub use types::{PaneId, PaneKind};

pub type Result<T> = std::result::Result<T, TutorError>;
