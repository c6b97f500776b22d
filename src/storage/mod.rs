pub mod loader;
pub mod local;
pub mod saver;
pub mod store;

pub use loader::{LoadedMap, load_map_layers, resolve_active_layer};
pub use local::LocalMapStore;
pub use saver::{SaveState, SharedSaveState, persist_map, shared_save_state};
pub use store::{MapStore, StoreError};
