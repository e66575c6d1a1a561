//! The PaneRegistry owns every pane, the active-pane pointer, and id
//! allocation.

mod operations;
mod streams;
mod types;

pub use types::*;
