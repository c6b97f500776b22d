//! Session worker thread and the handle the UI drives it with.
//!
//! Commands go in over a channel and are processed one at a time, so the
//! UI thread never blocks on the store or the render backend. Progress
//! comes back through the shared tracker, the shared save state, and the
//! event bus.

use std::thread;

use crossbeam_channel::Receiver;

use crate::editor::loading::{SharedTracker, shared_tracker};
use crate::editor::session::MapSession;
use crate::models::map::{MapLayer, StampSelection};
use crate::models::settings::EditorSettings;
use crate::render::backend::RenderBackend;
use crate::shared::bus::EditorBus;
use crate::shared::messages::{EditorCommand, EditorEvent, MapSettingsUpdate};
use crate::storage::saver::{SharedSaveState, shared_save_state};
use crate::storage::store::MapStore;

pub struct EditorManager {
    tracker: SharedTracker,
    save_state: SharedSaveState,
    command_sender: std::sync::mpsc::Sender<EditorCommand>,
    bus: EditorBus,
    _handle: thread::JoinHandle<()>,
}

impl EditorManager {
    /// Spawns the session worker for `backend` and `store`. The worker
    /// stops on [`EditorCommand::Shutdown`] or when the manager is
    /// dropped and the command channel disconnects.
    pub fn new<B, S>(backend: B, store: S, settings: EditorSettings) -> Self
    where
        B: RenderBackend + 'static,
        S: MapStore + 'static,
    {
        let tracker = shared_tracker();
        let save_state = shared_save_state();
        let bus = EditorBus::new();
        let (tx, rx) = std::sync::mpsc::channel();

        let session = MapSession::new(
            backend,
            store,
            settings.clone(),
            tracker.clone(),
            save_state.clone(),
            bus.event_tx.clone(),
        );
        let handle = thread::spawn(move || {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(Self::session_thread(session, rx, settings));
        });

        Self {
            tracker,
            save_state,
            command_sender: tx,
            bus,
            _handle: handle,
        }
    }

    async fn session_thread<B: RenderBackend, S: MapStore>(
        mut session: MapSession<B, S>,
        rx: std::sync::mpsc::Receiver<EditorCommand>,
        settings: EditorSettings,
    ) {
        loop {
            // Vérifier les commandes (non-bloquant)
            match rx.try_recv() {
                Ok(EditorCommand::OpenMap { id }) => {
                    session.open_map(id).await;
                    session.push_layers();
                }
                Ok(EditorCommand::Save) => session.save().await,
                Ok(EditorCommand::SetLayers(layers)) => {
                    session.apply_layers(layers);
                    session.push_layers();
                }
                Ok(EditorCommand::Stamp { selection, x, y }) => {
                    if session.stamp(&selection, x, y) {
                        session.push_layers();
                    }
                }
                Ok(EditorCommand::Erase {
                    x,
                    y,
                    width,
                    height,
                }) => {
                    if session.erase(x, y, width, height) {
                        session.push_layers();
                    }
                }
                Ok(EditorCommand::Undo) => {
                    if session.undo() {
                        session.push_layers();
                    }
                }
                Ok(EditorCommand::Redo) => {
                    if session.redo() {
                        session.push_layers();
                    }
                }
                Ok(EditorCommand::ClearMap) => {
                    session.clear_map();
                    session.push_layers();
                }
                Ok(EditorCommand::SetActiveLayer { id }) => {
                    session.set_active_layer(id);
                    session.push_layers();
                }
                Ok(EditorCommand::UpdateSettings(update)) => session.update_settings(update),
                Ok(EditorCommand::InitialRenderReady) => session.initial_render_ready(),
                Ok(EditorCommand::Shutdown) => break,
                Err(std::sync::mpsc::TryRecvError::Empty) => {
                    // Pas de commande, continuer
                }
                Err(std::sync::mpsc::TryRecvError::Disconnected) => break,
            }

            // Petit sleep pour éviter de consommer 100% CPU
            tokio::time::sleep(settings.poll_interval()).await;
        }
    }

    /// Shared loading tracker, polled by the overlay.
    pub fn loading_state(&self) -> SharedTracker {
        self.tracker.clone()
    }

    /// Shared save state, polled by the save notifications.
    pub fn save_state(&self) -> SharedSaveState {
        self.save_state.clone()
    }

    /// Event stream from the session worker.
    pub fn events(&self) -> Receiver<EditorEvent> {
        self.bus.event_rx.clone()
    }

    pub fn send_command(
        &self,
        cmd: EditorCommand,
    ) -> Result<(), std::sync::mpsc::SendError<EditorCommand>> {
        self.command_sender.send(cmd)
    }

    pub fn open_map(&self, id: i64) {
        let _ = self.send_command(EditorCommand::OpenMap { id });
    }

    pub fn save(&self) {
        let _ = self.send_command(EditorCommand::Save);
    }

    pub fn set_layers(&self, layers: Vec<MapLayer>) {
        let _ = self.send_command(EditorCommand::SetLayers(layers));
    }

    pub fn stamp(&self, selection: StampSelection, x: i32, y: i32) {
        let _ = self.send_command(EditorCommand::Stamp { selection, x, y });
    }

    pub fn erase(&self, x: i32, y: i32, width: i32, height: i32) {
        let _ = self.send_command(EditorCommand::Erase {
            x,
            y,
            width,
            height,
        });
    }

    pub fn undo(&self) {
        let _ = self.send_command(EditorCommand::Undo);
    }

    pub fn redo(&self) {
        let _ = self.send_command(EditorCommand::Redo);
    }

    pub fn clear_map(&self) {
        let _ = self.send_command(EditorCommand::ClearMap);
    }

    pub fn set_active_layer(&self, id: i32) {
        let _ = self.send_command(EditorCommand::SetActiveLayer { id });
    }

    pub fn update_settings(&self, update: MapSettingsUpdate) {
        let _ = self.send_command(EditorCommand::UpdateSettings(update));
    }

    pub fn initial_render_ready(&self) {
        let _ = self.send_command(EditorCommand::InitialRenderReady);
    }

    pub fn shutdown(&self) {
        let _ = self.send_command(EditorCommand::Shutdown);
    }
}
