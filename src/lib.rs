//! Core of a tile map editor for a creature-collector game engine.
//!
//! The crate covers the client side of the editor: the undo/redo layer
//! history, the loading and render progress shown while a map opens, the
//! tile preload orchestration against a render backend, and persistence
//! of map documents and the TOML map index. The UI layer sits on top of
//! [`EditorManager`], which runs everything on a worker thread and
//! reports back through shared state and an event channel.

pub mod editor;
pub mod models;
pub mod render;
pub mod shared;
pub mod storage;

pub use editor::{EditorManager, MapSession};
pub use models::EditorSettings;
pub use shared::{EditorBus, EditorCommand, EditorEvent};
