//! Event bus for editor notifications.
//!
//! Components observe the editor through a `tokio::sync::broadcast`
//! channel: events are cloned values, subscribers are decoupled from the
//! editor, and a lagged receiver never blocks the sender.

use tokio::sync::broadcast;

use screenwright_buffer::BlockType;

use crate::palette::PaletteCommand;

/// Events emitted by the editor facade.
#[derive(Debug, Clone)]
pub enum EditorEvent {
    /// The block sequence or its text changed.
    ScreenplayChanged,
    /// The cursor moved.
    CursorMoved,
    /// The selection changed.
    SelectionChanged,

    /// A block was reclassified (auto-format or toolbar toggle).
    BlockRetyped(BlockType),
    /// A new block was inserted and focused.
    BlockInserted(BlockType),

    /// The command palette opened.
    PaletteOpened,
    /// The palette closed without inserting anything.
    PaletteDismissed,
    /// A palette command was confirmed.
    PaletteConfirmed(&'static PaletteCommand),

    /// The screenplay was saved.
    Saved,
    /// A PDF was exported to the given path.
    Exported(std::path::PathBuf),
    /// Configuration was reloaded.
    ConfigChanged,
}

/// Broadcast channel wrapper shared by everything that watches the editor.
pub struct EventBus {
    sender: broadcast::Sender<EditorEvent>,
}

impl EventBus {
    /// Creates a new event bus.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    /// Emits an event to all subscribers. Silently dropped when nobody
    /// is listening.
    pub fn emit(&self, event: EditorEvent) {
        let _ = self.sender.send(event);
    }

    /// Subscribes to all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

/// Async receiver loop that skips over lag instead of erroring out.
pub struct EventHandler {
    receiver: broadcast::Receiver<EditorEvent>,
}

impl EventHandler {
    pub fn new(receiver: broadcast::Receiver<EditorEvent>) -> Self {
        Self { receiver }
    }

    /// Waits for the next event, `None` once the bus is gone.
    pub async fn next(&mut self) -> Option<EditorEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("event handler lagged, missed {} events", n);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.emit(EditorEvent::ScreenplayChanged);

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, EditorEvent::ScreenplayChanged));
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = EventBus::new();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.emit(EditorEvent::BlockRetyped(BlockType::SceneHeading));

        assert!(rx1.recv().await.is_ok());
        assert!(rx2.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_handler_yields_events() {
        let bus = EventBus::new();
        let mut handler = EventHandler::new(bus.subscribe());

        bus.emit(EditorEvent::Saved);

        let event = handler.next().await.unwrap();
        assert!(matches!(event, EditorEvent::Saved));
    }
}
