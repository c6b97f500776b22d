pub mod bus;
pub mod messages;

pub use bus::EditorBus;
pub use messages::{EditorCommand, EditorEvent, LayerView, MapSettingsUpdate};
