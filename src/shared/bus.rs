//! Channel wiring between the session worker and the UI thread.

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::shared::messages::EditorEvent;

/// Cloneable bundle of the editor's cross-thread channels. Every thread
/// clones the bus and keeps the ends it needs.
#[derive(Clone)]
pub struct EditorBus {
    /// Worker → UI: lifecycle and state-change events.
    pub event_tx: Sender<EditorEvent>,
    /// Worker → UI: receiving end, polled by the UI loop.
    pub event_rx: Receiver<EditorEvent>,
}

impl EditorBus {
    pub fn new() -> Self {
        let (event_tx, event_rx) = unbounded();
        Self { event_tx, event_rx }
    }
}

impl Default for EditorBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_reach_every_bus_clone() {
        let bus = EditorBus::new();
        let ui_side = bus.clone();

        bus.event_tx.send(EditorEvent::MapReady).unwrap();
        assert_eq!(ui_side.event_rx.recv().unwrap(), EditorEvent::MapReady);
    }
}
