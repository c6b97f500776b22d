//! Editing core: layer history, tile edits, loading state, and the
//! session worker that ties them to the store and the render backend.

pub mod edits;
pub mod grid;
pub mod history;
pub mod loading;
pub mod manager;
pub mod session;

pub use history::{LayerHistory, LayerSet};
pub use loading::{LoadingTracker, Progress, SharedTracker, shared_tracker};
pub use manager::EditorManager;
pub use session::{MapMeta, MapSession};
