//! Session multiplexer for the lesson workspace.
//!
//! A [`Workspace`] owns a [`PaneRegistry`] of terminal and browser panes and
//! a [`CommandEventRouter`] that turns bus commands into registry
//! operations. All mutation happens on the task that drives the workspace.

pub mod intent;
pub mod navigation;
pub mod pane;
pub mod registry;
pub mod router;
pub mod view;
pub mod workspace;

#[cfg(test)]
mod scenarios;
#[cfg(test)]
mod test_support;

pub use intent::{ShellHandle, ShellIntent};
pub use navigation::{normalize_url, NavigationState};
pub use pane::{Pane, SinkFactory, TerminalPane};
pub use registry::{PaneRegistry, RegistryOptions};
pub use router::CommandEventRouter;
pub use view::{PaneView, PaneViewBody, WorkspaceSnapshot};
pub use workspace::{MountOptions, Workspace};
