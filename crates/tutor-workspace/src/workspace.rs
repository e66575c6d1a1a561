//! The mounted workspace: one task that owns the registry and the router and
//! serializes every input (shell intents, bus commands, bridge events).

use std::sync::Arc;

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tutor_bridge::{BridgeEvent, BridgeEventReceiver, Connector};
use tutor_common::{Event, EventBus, PaneKind};
use tutor_config::TutorConfig;

use crate::intent::{ShellHandle, ShellIntent};
use crate::pane::SinkFactory;
use crate::registry::{PaneRegistry, RegistryOptions};
use crate::router::CommandEventRouter;

/// Everything needed to mount a workspace.
pub struct MountOptions {
    pub registry: RegistryOptions,
    /// Panes created on mount, in display order.
    pub initial_panes: Vec<PaneKind>,
    pub observer: Option<SinkFactory>,
}

impl MountOptions {
    pub fn from_config(config: &TutorConfig) -> Self {
        Self {
            registry: RegistryOptions::from_config(config),
            initial_panes: config.workspace.initial_panes.clone(),
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: SinkFactory) -> Self {
        self.observer = Some(observer);
        self
    }
}

impl Default for MountOptions {
    fn default() -> Self {
        Self::from_config(&TutorConfig::default())
    }
}

enum Wake {
    Intent(ShellIntent),
    Commands(Vec<Event>),
    Bridge(BridgeEvent),
    Detached,
}

pub struct Workspace {
    registry: PaneRegistry,
    router: CommandEventRouter,
    events: broadcast::Receiver<Event>,
    bridge_events: BridgeEventReceiver,
    intents: mpsc::UnboundedReceiver<ShellIntent>,
    quit: bool,
}

impl Workspace {
    /// Subscribe to `bus`, create the initial panes, and hand back the
    /// workspace together with a handle for driving it.
    pub fn mount(
        options: MountOptions,
        connector: Arc<dyn Connector>,
        bus: EventBus,
    ) -> (Self, ShellHandle) {
        let events = bus.subscribe_commands();
        let (mut registry, bridge_events) =
            PaneRegistry::new(options.registry, connector, bus.clone());
        if let Some(observer) = options.observer {
            registry.set_output_observer(observer);
        }
        for kind in &options.initial_panes {
            registry.create_pane(*kind, None);
        }
        info!(panes = registry.len(), "workspace mounted");

        let (intent_tx, intents) = mpsc::unbounded_channel();
        let workspace = Self {
            registry,
            router: CommandEventRouter::new(),
            events,
            bridge_events,
            intents,
            quit: false,
        };
        (workspace, ShellHandle::new(intent_tx, bus))
    }

    pub fn registry(&self) -> &PaneRegistry {
        &self.registry
    }

    pub fn is_finished(&self) -> bool {
        self.quit
    }

    /// Wait for the next input and apply it. Returns false once the
    /// workspace has been asked to quit.
    pub async fn step(&mut self) -> bool {
        let wake = tokio::select! {
            Some(intent) = self.intents.recv() => Wake::Intent(intent),
            batch = next_batch(&mut self.events) => match batch {
                Some(events) => Wake::Commands(events),
                None => Wake::Detached,
            },
            Some(event) = self.bridge_events.recv() => Wake::Bridge(event),
            else => Wake::Detached,
        };
        self.apply(wake);
        !self.quit
    }

    /// Apply everything already queued without waiting. Returns how many
    /// wake-ups were handled.
    pub fn poll_ready(&mut self) -> usize {
        let mut handled = 0;
        while !self.quit {
            let wake = if let Ok(intent) = self.intents.try_recv() {
                Wake::Intent(intent)
            } else if let Some(batch) = drain_ready(&mut self.events) {
                Wake::Commands(batch)
            } else if let Ok(event) = self.bridge_events.try_recv() {
                Wake::Bridge(event)
            } else {
                break;
            };
            self.apply(wake);
            handled += 1;
        }
        handled
    }

    /// Drive the workspace until it quits or `cancel` fires, then unmount.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!("workspace running");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("workspace cancelled");
                    break;
                }
                running = self.step() => {
                    if !running {
                        break;
                    }
                }
            }
        }
        self.unmount();
    }

    /// Close every pane and drop the bus subscription.
    pub fn unmount(mut self) {
        self.registry.shutdown();
        info!("workspace unmounted");
    }

    fn apply(&mut self, wake: Wake) {
        match wake {
            Wake::Intent(intent) => self.apply_intent(intent),
            Wake::Commands(batch) => {
                let shutdown = batch.iter().any(|e| matches!(e, Event::Shutdown));
                let applied = self.router.route_batch(&mut self.registry, batch);
                if applied > 0 {
                    debug!(applied, "command batch routed");
                }
                if shutdown {
                    info!("shutdown requested on bus");
                    self.quit = true;
                }
            }
            Wake::Bridge(event) => self.registry.handle_bridge_event(event),
            Wake::Detached => {
                warn!("workspace inputs closed");
                self.quit = true;
            }
        }
    }

    fn apply_intent(&mut self, intent: ShellIntent) {
        match intent {
            ShellIntent::Create { kind, title } => {
                self.registry.create_pane(kind, title.as_deref());
            }
            ShellIntent::Close(id) => {
                self.registry.close_pane(id);
            }
            ShellIntent::Activate(id) => {
                self.registry.set_active(id);
            }
            ShellIntent::Navigate { pane, input } => {
                self.registry.navigate(pane, &input);
            }
            ShellIntent::Reload(pane) => {
                self.registry.reload(pane);
            }
            ShellIntent::Snapshot(reply) => {
                let _ = reply.send(self.registry.snapshot());
            }
            ShellIntent::Quit => self.quit = true,
        }
    }
}

/// Wait for one bus event, then take everything else already queued. The
/// result is one dispatch batch. `None` once the bus is gone.
async fn next_batch(rx: &mut broadcast::Receiver<Event>) -> Option<Vec<Event>> {
    let first = loop {
        match rx.recv().await {
            Ok(event) => break event,
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "workspace lagged behind event bus");
            }
            Err(RecvError::Closed) => return None,
        }
    };
    let mut batch = vec![first];
    batch.extend(drain_ready(rx).unwrap_or_default());
    Some(batch)
}

fn drain_ready(rx: &mut broadcast::Receiver<Event>) -> Option<Vec<Event>> {
    let mut batch = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => batch.push(event),
            Err(TryRecvError::Lagged(skipped)) => {
                warn!(skipped, "workspace lagged behind event bus");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
    (!batch.is_empty()).then_some(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeConnector;
    use std::time::Duration;
    use tutor_bridge::BridgeState;

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
    fn mount_creates_initial_panes() {
        let (ws, _shell, connector) = mount(vec![PaneKind::Terminal, PaneKind::Browser]);
        assert_eq!(ws.registry().len(), 2);
        assert_eq!(connector.dial_count(), 1);
        assert_eq!(
            ws.registry().active_id(),
            ws.registry().find_pane_by_kind(PaneKind::Browser)
        );
    }

    #[test]
    fn default_mount_is_one_terminal() {
        let connector = FakeConnector::new();
        let (ws, _shell) = Workspace::mount(MountOptions::default(), connector, EventBus::new(8));
        let snapshot = ws.registry().snapshot();
        assert_eq!(snapshot.tab_strip(), "[term-1 Terminal]*");
    }

    #[test]
    fn intents_apply_in_order() {
        let (mut ws, shell, _connector) = mount(vec![PaneKind::Terminal]);
        let first = ws.registry().active_id().unwrap();
        shell.create(PaneKind::Browser, Some("Docs".into()));
        shell.activate(first);
        ws.poll_ready();
        assert_eq!(ws.registry().len(), 2);
        assert_eq!(ws.registry().active_id(), Some(first));

        let browser = ws.registry().find_pane_by_kind(PaneKind::Browser).unwrap();
        shell.navigate(browser, "rust-lang.org");
        shell.reload(browser);
        shell.close(first);
        ws.poll_ready();
        let nav = ws.registry().pane(browser).unwrap().navigation().unwrap();
        assert_eq!(nav.url(), "https://rust-lang.org");
        assert_eq!(nav.reloads(), 1);
        assert_eq!(ws.registry().active_id(), Some(browser));
    }

    #[test]
    fn quit_intent_finishes() {
        let (mut ws, shell, _connector) = mount(vec![]);
        shell.quit();
        ws.poll_ready();
        assert!(ws.is_finished());
    }

    #[test]
    fn bus_shutdown_finishes() {
        let (mut ws, shell, _connector) = mount(vec![]);
        shell.publish(Event::Shutdown);
        ws.poll_ready();
        assert!(ws.is_finished());
    }

    #[test]
    fn bridge_events_are_applied() {
        let (mut ws, _shell, connector) = mount(vec![PaneKind::Terminal]);
        let id = ws.registry().active_id().unwrap();
        connector.accept(id);
        ws.poll_ready();
        assert_eq!(ws.registry().bridge_state(id), Some(BridgeState::Open));
    }

    #[test]
    fn unmount_closes_bridges() {
        let (mut ws, _shell, connector) = mount(vec![PaneKind::Terminal, PaneKind::Terminal]);
        let ids = ws.registry().ids();
        let transports: Vec<_> = ids.iter().map(|id| connector.accept(*id)).collect();
        ws.poll_ready();
        ws.unmount();
        for t in transports {
            assert_eq!(t.closes(), 1);
        }
    }

    #[tokio::test]
    async fn run_serves_snapshots_and_quits() {
        let (ws, shell, _connector) = mount(vec![PaneKind::Terminal]);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(ws.run(cancel.clone()));

        shell.publish(Event::OpenUrl("https://example.com/lesson".into()));
        // The snapshot intent may be served before the bus batch; retry.
        let mut panes = 0;
        for _ in 0..50 {
            let snapshot = shell.snapshot().await.unwrap();
            panes = snapshot.panes.len();
            if panes == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(panes, 2);

        shell.quit();
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();
        assert!(shell.snapshot().await.is_none());
    }

    #[tokio::test]
    async fn run_stops_on_cancel() {
        let (ws, _shell, _connector) = mount(vec![]);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(ws.run(cancel.clone()));
        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();
    }
}
