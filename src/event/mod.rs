mod bus;
mod events;

pub use bus::EventBus;
pub use events::ArtboardEvent;

/// Receives stroke lifecycle and history notifications from an artboard
pub trait EventHandler: Send {
    fn handle_event(&mut self, event: &ArtboardEvent);
}
