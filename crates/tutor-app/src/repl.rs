//! Line-oriented console loop. Plain lines become `RunCommand` on the bus;
//! `:`-prefixed lines drive the tab strip.

use std::io::Write;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::debug;
use tutor_common::{Event, PaneId};
use tutor_workspace::ShellHandle;

use crate::console::{print_line, ActivePane};
use crate::input::{parse_line, Command, HELP};

/// Read lines from `input` until EOF or `:quit`.
pub async fn run<R, W>(input: R, shell: ShellHandle, active: ActivePane, out: Arc<Mutex<W>>)
where
    R: AsyncRead + Unpin,
    W: Write,
{
    let mut lines = BufReader::new(input).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                debug!("console input closed");
                break;
            }
            Err(e) => {
                tracing::warn!(error = %e, "console read failed");
                break;
            }
        };
        match parse_line(&line) {
            Ok(command) => {
                if !dispatch(&shell, &active, command, &out).await {
                    break;
                }
            }
            Err(e) => print_line(&out, &e.to_string()),
        }
    }
}

/// Apply one parsed command. Returns false when the console should stop.
pub async fn dispatch<W: Write>(
    shell: &ShellHandle,
    active: &ActivePane,
    command: Command,
    out: &Mutex<W>,
) -> bool {
    match command {
        Command::Run(line) => {
            shell.publish(Event::RunCommand(line));
        }
        Command::Open(url) => {
            shell.publish(Event::OpenUrl(url));
        }
        Command::Type(data) => {
            shell.publish(Event::PaneInput { pane: None, data });
        }
        Command::New(kind) => {
            shell.create(kind, None);
        }
        Command::Close(n) => {
            shell.close(PaneId(n));
        }
        Command::Switch(n) => {
            shell.activate(PaneId(n));
            print_tabs(shell, out).await;
        }
        Command::Go(url) => match active.get() {
            Some(pane) => {
                shell.navigate(pane, url);
            }
            None => print_line(out, "no active pane"),
        },
        Command::Reload => match active.get() {
            Some(pane) => {
                shell.reload(pane);
            }
            None => print_line(out, "no active pane"),
        },
        Command::Tabs => print_tabs(shell, out).await,
        Command::Help => print_line(out, HELP),
        Command::Quit => return false,
        Command::Empty => {}
    }
    true
}

async fn print_tabs<W: Write>(shell: &ShellHandle, out: &Mutex<W>) {
    match shell.snapshot().await {
        Some(snapshot) if snapshot.panes.is_empty() => print_line(out, "(no panes)"),
        Some(snapshot) => print_line(out, &snapshot.tab_strip()),
        None => print_line(out, "workspace is gone"),
    }
}
