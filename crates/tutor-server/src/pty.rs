//! Shell spawning: one PTY per terminal connection.

use std::io::{Read, Write};
use std::thread;

use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize};
use tokio::sync::mpsc;
use tutor_common::TutorError;
use tutor_config::{ServerConfig, ShellConfig};

/// Maximum bytes read from the PTY in one go.
const PTY_READ_CHUNK: usize = 8_192;

/// Variables inherited from the server's environment. Everything else is
/// dropped so server-side secrets never reach a learner's shell.
const ALLOWED_ENV_VARS: &[&str] = &[
    "HOME",
    "USER",
    "LOGNAME",
    "SHELL",
    "PATH",
    "LANG",
    "LC_ALL",
    "LC_CTYPE",
    "TMPDIR",
    "TMP",
    "TEMP",
    "USERPROFILE",
    "APPDATA",
    "LOCALAPPDATA",
    "SYSTEMROOT",
    "COMSPEC",
    "HOMEDRIVE",
    "HOMEPATH",
];

/// The user's default shell: `$SHELL` (or `$COMSPEC` on Windows) with a
/// platform fallback.
pub fn default_shell() -> String {
    #[cfg(unix)]
    {
        std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string())
    }
    #[cfg(windows)]
    {
        std::env::var("COMSPEC").unwrap_or_else(|_| "cmd.exe".to_string())
    }
}

fn resolve_program(shell: &ShellConfig) -> String {
    if shell.program.trim().is_empty() {
        default_shell()
    } else {
        shell.program.clone()
    }
}

/// Build the sanitized command for `shell`.
fn build_shell_command(program: &str, shell: &ShellConfig, term: &str) -> CommandBuilder {
    let mut cmd = CommandBuilder::new(program);

    cmd.env_clear();
    for key in ALLOWED_ENV_VARS {
        if let Ok(val) = std::env::var(key) {
            cmd.env(key, val);
        }
    }
    cmd.env("TERM", term);
    for (key, val) in &shell.env {
        cmd.env(key, val);
    }

    #[cfg(unix)]
    {
        if shell.login_shell {
            cmd.arg("-l");
        }
    }
    cmd.args(&shell.args);

    if let Some(dir) = &shell.working_directory {
        cmd.cwd(dir);
    }
    cmd
}

/// A running shell attached to the master side of a PTY.
pub struct ShellProcess {
    writer: Box<dyn Write + Send>,
    output: mpsc::UnboundedReceiver<Vec<u8>>,
    child: Box<dyn Child + Send + Sync>,
    _master: Box<dyn MasterPty + Send>,
    size: PtySize,
    killed: bool,
}

/// Spawn the configured shell on a fresh PTY sized from `server`.
///
/// A background thread reads PTY output and forwards it over a channel;
/// the channel closes when the shell exits.
pub fn spawn_shell(shell: &ShellConfig, server: &ServerConfig) -> Result<ShellProcess, TutorError> {
    let size = PtySize {
        rows: server.rows,
        cols: server.cols,
        pixel_width: 0,
        pixel_height: 0,
    };

    let pair = native_pty_system()
        .openpty(size)
        .map_err(|e| TutorError::Pty(format!("failed to open PTY: {e}")))?;

    let program = resolve_program(shell);
    let cmd = build_shell_command(&program, shell, &server.term);
    let child = pair
        .slave
        .spawn_command(cmd)
        .map_err(|e| TutorError::Pty(format!("failed to spawn shell '{program}': {e}")))?;
    drop(pair.slave);

    let writer = pair
        .master
        .take_writer()
        .map_err(|e| TutorError::Pty(format!("failed to take PTY writer: {e}")))?;
    let mut reader = pair
        .master
        .try_clone_reader()
        .map_err(|e| TutorError::Pty(format!("failed to clone PTY reader: {e}")))?;

    let (tx, rx) = mpsc::unbounded_channel::<Vec<u8>>();
    thread::Builder::new()
        .name("pty-reader".to_string())
        .spawn(move || {
            let mut buf = [0u8; PTY_READ_CHUNK];
            loop {
                match reader.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        if tx.send(buf[..n].to_vec()).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::debug!("PTY reader error: {e}");
                        break;
                    }
                }
            }
        })
        .map_err(|e| TutorError::Pty(format!("failed to spawn PTY reader thread: {e}")))?;

    tracing::debug!(shell = %program, cols = size.cols, rows = size.rows, "shell spawned");

    Ok(ShellProcess {
        writer,
        output: rx,
        child,
        _master: pair.master,
        size,
        killed: false,
    })
}

impl ShellProcess {
    /// Next chunk of output, or `None` once the shell has exited.
    pub async fn next_output(&mut self) -> Option<Vec<u8>> {
        self.output.recv().await
    }

    /// Write raw bytes to the shell's input.
    pub fn write_input(&mut self, data: &[u8]) -> Result<(), TutorError> {
        self.writer
            .write_all(data)
            .map_err(|e| TutorError::Pty(format!("PTY write failed: {e}")))?;
        self.writer
            .flush()
            .map_err(|e| TutorError::Pty(format!("PTY flush failed: {e}")))
    }

    pub fn size(&self) -> (u16, u16) {
        (self.size.cols, self.size.rows)
    }

    /// Kill the shell. Safe to call more than once.
    pub fn kill(&mut self) {
        if self.killed {
            return;
        }
        self.killed = true;
        if let Err(e) = self.child.kill() {
            tracing::debug!("PTY kill error (may already be dead): {e}");
        }
    }
}

impl Drop for ShellProcess {
    fn drop(&mut self) {
        self.kill();
    }
}
