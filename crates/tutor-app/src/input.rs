//! Parses console lines into workspace commands.

use tutor_common::PaneKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain line: run it in the terminal.
    Run(String),
    Open(String),
    /// Raw bytes for the active terminal pane.
    Type(Vec<u8>),
    New(PaneKind),
    Close(u32),
    Switch(u32),
    Go(String),
    Reload,
    Tabs,
    Help,
    Quit,
    Empty,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown command ':{0}' (try :help)")]
    UnknownCommand(String),

    #[error(":{0} needs an argument")]
    MissingArgument(&'static str),

    #[error("'{0}' is not a pane number")]
    BadPaneNumber(String),

    #[error("'{0}' is not a pane kind (terminal or browser)")]
    BadKind(String),
}

pub const HELP: &str = "\
<line>              run <line> in the terminal
:open <url>         open <url> in a new browser tab
:type <text>        send raw text to the active terminal (\\r \\n \\t \\e \\\\ escapes)
:new terminal|browser
:close <n>          close pane n
:switch <n>         activate pane n
:go <url>           navigate the active browser tab
:reload             reload the active browser tab
:tabs               show the tab strip
:quit";

pub fn parse_line(line: &str) -> Result<Command, InputError> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Ok(Command::Empty);
    }
    let Some(rest) = line.strip_prefix(':') else {
        return Ok(Command::Run(line.to_string()));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    let required = |what: &'static str| {
        if arg.is_empty() {
            Err(InputError::MissingArgument(what))
        } else {
            Ok(arg.to_string())
        }
    };

    match name {
        "open" => required("open").map(Command::Open),
        "type" => required("type").map(|text| Command::Type(unescape(&text))),
        "new" => match arg {
            "" | "terminal" | "term" => Ok(Command::New(PaneKind::Terminal)),
            "browser" => Ok(Command::New(PaneKind::Browser)),
            other => Err(InputError::BadKind(other.to_string())),
        },
        "close" => pane_number(required("close")?).map(Command::Close),
        "switch" => pane_number(required("switch")?).map(Command::Switch),
        "go" => required("go").map(Command::Go),
        "reload" => Ok(Command::Reload),
        "tabs" => Ok(Command::Tabs),
        "help" => Ok(Command::Help),
        "quit" | "q" => Ok(Command::Quit),
        other => Err(InputError::UnknownCommand(other.to_string())),
    }
}

/// Accepts `3`, `term-3`, or `browser-3`.
fn pane_number(arg: String) -> Result<u32, InputError> {
    let digits = arg.rsplit('-').next().unwrap_or(&arg);
    digits
        .parse()
        .map_err(|_| InputError::BadPaneNumber(arg.clone()))
}

fn unescape(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        match chars.next() {
            Some('r') => out.push(b'\r'),
            Some('n') => out.push(b'\n'),
            Some('t') => out.push(b'\t'),
            Some('e') => out.push(0x1b),
            Some('\\') => out.push(b'\\'),
            Some(other) => {
                out.push(b'\\');
                let mut buf = [0u8; 4];
                out.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            }
            None => out.push(b'\\'),
        }
    }
    out
}
