//! Turns broadcast commands into registry operations.

use std::collections::HashSet;

use tracing::{debug, info, warn};
use tutor_bridge::WriteOutcome;
use tutor_common::{Event, PaneKind};

use crate::registry::PaneRegistry;

/// Line-submit terminator appended to routed commands.
const SUBMIT: u8 = b'\r';

/// Routes `RunCommand`, `OpenUrl`, and `PaneInput` events.
///
/// Identical `RunCommand` payloads inside one dispatch batch collapse to a
/// single effect. The guard is cleared when the batch ends, so running the
/// same command again later works normally.
#[derive(Debug, Default)]
pub struct CommandEventRouter {
    seen: HashSet<String>,
}

impl CommandEventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatch one batch. Returns how many events had an effect.
    pub fn route_batch<I>(&mut self, registry: &mut PaneRegistry, events: I) -> usize
    where
        I: IntoIterator<Item = Event>,
    {
        let applied = events
            .into_iter()
            .filter(|event| self.route(registry, event))
            .count();
        self.seen.clear();
        applied
    }

    fn route(&mut self, registry: &mut PaneRegistry, event: &Event) -> bool {
        match event {
            Event::RunCommand(payload) => {
                if !self.seen.insert(payload.clone()) {
                    debug!(command = %payload, "duplicate command in batch collapsed");
                    return false;
                }
                run_command(registry, payload);
                true
            }
            Event::OpenUrl(url) => {
                let id = registry.open_browser(url, None);
                info!(pane = %id, %url, "opened url");
                true
            }
            Event::PaneInput { pane, data } => {
                let Some(target) = pane.or(registry.active_id()) else {
                    debug!("input with no target pane dropped");
                    return false;
                };
                matches!(
                    registry.write_input(target, data),
                    Some(WriteOutcome::Forwarded)
                )
            }
            _ => false,
        }
    }
}

fn run_command(registry: &mut PaneRegistry, payload: &str) {
    let mut line = payload.as_bytes().to_vec();
    line.push(SUBMIT);

    match registry.find_pane_by_kind(PaneKind::Terminal) {
        Some(id) => {
            if let Some(WriteOutcome::DroppedWhileConnecting) = registry.write_input(id, &line) {
                warn!(pane = %id, command = %payload, "terminal still connecting, command dropped");
            }
            registry.set_active(id);
        }
        None => {
            let id = registry.create_pane(PaneKind::Terminal, None);
            registry.queue_command(id, line);
            info!(pane = %id, command = %payload, "terminal created for command");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Harness;
    use tutor_common::PaneId;

    fn run(cmd: &str) -> Event {
        Event::RunCommand(cmd.into())
    }

    #[test]
    fn run_command_on_empty_registry_creates_one_terminal() {
        let mut h = Harness::new();
        let mut router = CommandEventRouter::new();
        router.route_batch(&mut h.registry, vec![run("ls")]);
        assert_eq!(h.registry.len(), 1);
        assert_eq!(h.connector.dial_count(), 1);
        let id = h.registry.active_id().unwrap();
        assert!(h.registry.pane(id).unwrap().terminal().unwrap().has_pending());
    }

    #[test]
    fn run_command_reuses_most_recent_terminal() {
        let mut h = Harness::new();
        let a = h.registry.create_pane(PaneKind::Terminal, None);
        let b = h.registry.create_pane(PaneKind::Terminal, None);
        let _ta = h.connector.accept(a);
        let tb = h.connector.accept(b);
        h.pump();
        h.registry.set_active(a);

        let mut router = CommandEventRouter::new();
        router.route_batch(&mut h.registry, vec![run("pwd")]);
        assert_eq!(tb.sent(), vec![b"pwd\r".to_vec()]);
        assert_eq!(h.registry.active_id(), Some(b));
        assert_eq!(h.registry.len(), 2);
    }

    #[test]
    fn run_command_activates_terminal_behind_browser() {
        let mut h = Harness::new();
        let a = h.registry.create_pane(PaneKind::Terminal, None);
        h.connector.accept(a);
        h.pump();
        h.registry.open_browser("https://example.com", None);

        let mut router = CommandEventRouter::new();
        router.route_batch(&mut h.registry, vec![run("ls")]);
        assert_eq!(h.registry.active_id(), Some(a));
    }

    #[test]
    fn duplicate_in_separate_batches_runs_twice() {
        let mut h = Harness::new();
        let a = h.registry.create_pane(PaneKind::Terminal, None);
        let transport = h.connector.accept(a);
        h.pump();

        let mut router = CommandEventRouter::new();
        assert_eq!(router.route_batch(&mut h.registry, vec![run("ls")]), 1);
        assert_eq!(router.route_batch(&mut h.registry, vec![run("ls")]), 1);
        assert_eq!(transport.sent(), vec![b"ls\r".to_vec(), b"ls\r".to_vec()]);
    }

    #[test]
    fn distinct_commands_in_one_batch_both_run() {
        let mut h = Harness::new();
        let a = h.registry.create_pane(PaneKind::Terminal, None);
        let transport = h.connector.accept(a);
        h.pump();

        let mut router = CommandEventRouter::new();
        router.route_batch(&mut h.registry, vec![run("ls"), run("pwd"), run("ls")]);
        assert_eq!(transport.sent(), vec![b"ls\r".to_vec(), b"pwd\r".to_vec()]);
    }

    #[test]
    fn command_to_connecting_terminal_is_dropped() {
        let mut h = Harness::new();
        let a = h.registry.create_pane(PaneKind::Terminal, None);
        let mut router = CommandEventRouter::new();
        router.route_batch(&mut h.registry, vec![run("ls")]);

        let transport = h.connector.accept(a);
        h.pump();
        assert!(transport.sent().is_empty());
        assert_eq!(h.registry.len(), 1);
    }

    #[test]
    fn open_url_always_creates_browser() {
        let mut h = Harness::new();
        let mut router = CommandEventRouter::new();
        let url = || Event::OpenUrl("https://example.com/a".into());
        router.route_batch(&mut h.registry, vec![url(), url()]);
        assert_eq!(h.registry.len(), 2);
        let last = h.registry.active_id().unwrap();
        assert_eq!(h.registry.pane(last).unwrap().kind, PaneKind::Browser);
        assert_eq!(h.connector.dial_count(), 0);
    }

    #[test]
    fn pane_input_targets_active_or_explicit() {
        let mut h = Harness::new();
        let a = h.registry.create_pane(PaneKind::Terminal, None);
        let b = h.registry.create_pane(PaneKind::Terminal, None);
        let ta = h.connector.accept(a);
        let tb = h.connector.accept(b);
        h.pump();

        let mut router = CommandEventRouter::new();
        router.route_batch(
            &mut h.registry,
            vec![
                Event::PaneInput {
                    pane: None,
                    data: b"x".to_vec(),
                },
                Event::PaneInput {
                    pane: Some(a),
                    data: b"y".to_vec(),
                },
                Event::PaneInput {
                    pane: Some(PaneId(42)),
                    data: b"z".to_vec(),
                },
            ],
        );
        assert_eq!(tb.sent(), vec![b"x".to_vec()]);
        assert_eq!(ta.sent(), vec![b"y".to_vec()]);
    }

    #[test]
    fn lifecycle_events_are_ignored() {
        let mut h = Harness::new();
        let mut router = CommandEventRouter::new();
        let applied = router.route_batch(
            &mut h.registry,
            vec![
                Event::PaneOpened(PaneId(1)),
                Event::ActivePaneChanged(None),
                Event::Unknown,
            ],
        );
        assert_eq!(applied, 0);
        assert!(h.registry.is_empty());
    }
}
