//! Stream bridge: one duplex byte stream per terminal pane.
//!
//! A [`StreamBridge`] is a synchronous state machine. The only thing that
//! suspends is the dial, which a [`Connector`] performs off to the side and
//! reports back as [`BridgeEvent`]s over an unbounded channel. Whoever owns
//! the bridge feeds those events into [`StreamBridge::handle_event`] on its
//! own task, so bridge state is never touched concurrently.

mod bridge;
mod sink;
mod state;
mod transport;
pub mod ws;

pub use bridge::{StreamBridge, WriteOutcome};
pub use sink::{DisplaySink, Scrollback};
pub use state::BridgeState;
pub use transport::{
    bridge_channel, BridgeEvent, BridgeEventKind, BridgeEventReceiver, BridgeEventSender,
    ConnectHandle, Connector, Transport,
};
pub use ws::WsConnector;
