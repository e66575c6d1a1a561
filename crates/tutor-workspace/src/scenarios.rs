//! End-to-end workspace scenarios driven through the bus, with the fake
//! connector standing in for the network.

use std::sync::Arc;

use tutor_bridge::BridgeState;
use tutor_common::{Event, EventBus, PaneKind};

use crate::intent::ShellHandle;
use crate::router::CommandEventRouter;
use crate::test_support::{FakeConnector, Harness};
use crate::workspace::{MountOptions, Workspace};

fn mount(initial: Vec<PaneKind>) -> (Workspace, ShellHandle, Arc<FakeConnector>) {
    let connector = FakeConnector::new();
    let options = MountOptions {
        initial_panes: initial,
        ..MountOptions::default()
    };
    let (ws, shell) = Workspace::mount(options, connector.clone(), EventBus::new(64));
    (ws, shell, connector)
}

#[test]
fn open_url_next_to_live_terminal() {
    let (mut ws, shell, connector) = mount(vec![PaneKind::Terminal]);
    let term = ws.registry().active_id().unwrap();
    let transport = connector.accept(term);
    ws.poll_ready();

    shell.publish(Event::OpenUrl("https://example.com/lesson-1".into()));
    ws.poll_ready();

    let views = ws.registry().views();
    assert_eq!(views.len(), 2);
    assert_eq!(views[0].id, term);
    assert_eq!(views[1].kind, PaneKind::Browser);
    assert!(views[1].active);
    assert_eq!(ws.registry().bridge_state(term), Some(BridgeState::Open));
    assert_eq!(transport.closes(), 0);
    let nav = ws.registry().pane(views[1].id).unwrap().navigation().unwrap();
    assert_eq!(nav.url(), "https://example.com/lesson-1");
}

#[test]
fn run_command_on_empty_workspace_flushes_on_open() {
    let (mut ws, shell, connector) = mount(vec![]);
    shell.publish(Event::RunCommand("echo hi".into()));
    ws.poll_ready();

    assert_eq!(ws.registry().len(), 1);
    let term = ws.registry().active_id().unwrap();
    assert_eq!(ws.registry().bridge_state(term), Some(BridgeState::Connecting));

    let transport = connector.accept(term);
    ws.poll_ready();
    assert_eq!(transport.sent(), vec![b"echo hi\r".to_vec()]);
}

#[test]
fn duplicate_run_command_in_one_batch_writes_once() {
    let (mut ws, shell, connector) = mount(vec![PaneKind::Terminal]);
    let term = ws.registry().active_id().unwrap();
    let transport = connector.accept(term);
    ws.poll_ready();

    shell.publish(Event::RunCommand("ls".into()));
    shell.publish(Event::RunCommand("ls".into()));
    ws.poll_ready();

    assert_eq!(transport.sent(), vec![b"ls\r".to_vec()]);
    assert_eq!(ws.registry().len(), 1);
}

#[test]
fn duplicate_run_command_on_empty_workspace_creates_one_pane() {
    let (mut ws, shell, connector) = mount(vec![]);
    shell.publish(Event::RunCommand("make test".into()));
    shell.publish(Event::RunCommand("make test".into()));
    ws.poll_ready();

    assert_eq!(ws.registry().len(), 1);
    assert_eq!(connector.dial_count(), 1);
    let transport = connector.accept(ws.registry().active_id().unwrap());
    ws.poll_ready();
    assert_eq!(transport.sent(), vec![b"make test\r".to_vec()]);
}

#[test]
fn unmount_closes_every_bridge_once() {
    let (mut ws, _shell, connector) = mount(vec![
        PaneKind::Terminal,
        PaneKind::Browser,
        PaneKind::Terminal,
    ]);
    let terminals: Vec<_> = ws
        .registry()
        .panes()
        .filter(|p| p.kind == PaneKind::Terminal)
        .map(|p| p.id)
        .collect();
    assert_eq!(terminals.len(), 2);
    let transports: Vec<_> = terminals.iter().map(|id| connector.accept(*id)).collect();
    ws.poll_ready();

    ws.unmount();
    for t in &transports {
        assert_eq!(t.closes(), 1);
        assert!(t.sent().is_empty());
    }
}

#[test]
fn shutdown_refuses_further_writes() {
    let mut h = Harness::new();
    let a = h.registry.create_pane(PaneKind::Terminal, None);
    h.registry.open_browser("https://example.com", None);
    let b = h.registry.create_pane(PaneKind::Terminal, None);
    let ta = h.connector.accept(a);
    let tb = h.connector.accept(b);
    h.pump();

    h.registry.shutdown();
    assert_eq!(h.registry.write_input(a, b"ls\r"), None);
    assert_eq!(h.registry.write_input(b, b"ls\r"), None);
    assert!(!h.registry.queue_command(b, b"ls\r".to_vec()));

    let mut router = CommandEventRouter::new();
    let applied = router.route_batch(
        &mut h.registry,
        vec![
            Event::PaneInput {
                pane: Some(a),
                data: b"x".to_vec(),
            },
            Event::PaneInput {
                pane: None,
                data: b"y".to_vec(),
            },
        ],
    );
    assert_eq!(applied, 0);

    // Late events from the old connections change nothing either.
    h.connector.data(a, b"stray");
    h.pump();
    for t in [&ta, &tb] {
        assert_eq!(t.closes(), 1);
        assert!(t.sent().is_empty());
    }
    assert!(h.registry.is_empty());
}

#[test]
fn command_survives_burst_of_pane_creation() {
    let connector = FakeConnector::new();
    let options = MountOptions {
        initial_panes: vec![],
        ..MountOptions::default()
    };
    let (mut ws, shell) = Workspace::mount(options, connector.clone(), EventBus::new(2));

    shell.publish(Event::RunCommand("echo hi".into()));
    for _ in 0..32 {
        shell.create(PaneKind::Browser, None);
    }
    ws.poll_ready();

    let terminal = ws.registry().find_pane_by_kind(PaneKind::Terminal).unwrap();
    assert_eq!(ws.registry().len(), 33);
    assert_eq!(connector.dial_count(), 1);
    let transport = connector.accept(terminal);
    ws.poll_ready();
    assert_eq!(transport.sent(), vec![b"echo hi\r".to_vec()]);
}

#[test]
fn late_output_after_close_is_discarded() {
    let (mut ws, shell, connector) = mount(vec![PaneKind::Terminal]);
    let term = ws.registry().active_id().unwrap();
    connector.accept(term);
    ws.poll_ready();

    shell.close(term);
    ws.poll_ready();
    connector.data(term, b"stray");
    ws.poll_ready();
    assert!(ws.registry().is_empty());
}

#[test]
fn remote_close_leaves_pane_with_notice() {
    let (mut ws, _shell, connector) = mount(vec![PaneKind::Terminal]);
    let term = ws.registry().active_id().unwrap();
    connector.accept(term);
    connector.data(term, b"$ ");
    connector.remote_close(term);
    ws.poll_ready();

    assert_eq!(ws.registry().bridge_state(term), Some(BridgeState::Closed));
    let text = ws
        .registry()
        .pane(term)
        .unwrap()
        .terminal()
        .unwrap()
        .scrollback()
        .text();
    assert!(text.contains("Connection closed."));
}

#[test]
fn transport_error_is_confined_to_its_pane() {
    let (mut ws, _shell, connector) = mount(vec![PaneKind::Terminal, PaneKind::Terminal]);
    let ids = ws.registry().ids();
    let first = connector.accept(ids[0]);
    let second = connector.accept(ids[1]);
    connector.transport_error(ids[0], "broken pipe");
    ws.poll_ready();

    assert_eq!(ws.registry().bridge_state(ids[0]), Some(BridgeState::Error));
    assert_eq!(ws.registry().bridge_state(ids[1]), Some(BridgeState::Open));
    assert_eq!(first.closes(), 1);
    assert_eq!(second.closes(), 0);
}
