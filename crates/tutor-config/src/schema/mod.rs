//! Configuration schema types.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod server;
mod shell;
mod system;
mod terminal;
mod workspace;

pub use server::*;
pub use shell::*;
pub use system::*;
pub use terminal::*;
pub use workspace::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TutorConfig {
    pub workspace: WorkspaceConfig,
    pub terminal: TerminalConfig,
    pub browser: BrowserConfig,
    pub server: ServerConfig,
    pub shell: ShellConfig,
    pub logging: LoggingConfig,
}
