//! GLB loading from the browser file picker or a local path
//!
//! Picked bytes are parsed on the async compute pool. Each parse carries the
//! `LoadTicket` issued by the session, so a slow parse that finishes after a
//! newer load started is discarded by `complete_load`.

use bevy::prelude::*;
use bevy::tasks::{block_on, futures_lite::future, AsyncComputeTaskPool, Task};
use pinpoint_core::asset::load_glb;
use pinpoint_core::{LoadOutcome, LoadTicket, LoadedAsset, ViewerError};
use pinpoint_scene::{CameraSettings, Session};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Value of the file input's `accept` attribute
pub const GLB_ACCEPT: &str = ".glb";

pub struct FileLoaderPlugin;

impl Plugin for FileLoaderPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PendingFileResults>()
            .init_resource::<LoadTasks>()
            .init_resource::<ModelPathInput>()
            .init_resource::<InitialModel>()
            .add_systems(Startup, load_initial_model)
            .add_systems(Update, (process_picked_files, poll_load_tasks).chain());
    }
}

/// A file chosen by the user, read fully into memory
#[derive(Debug, Clone)]
pub struct PickedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Files delivered by JavaScript callbacks, drained once per frame
#[derive(Resource, Default, Clone)]
pub struct PendingFileResults(pub Arc<Mutex<VecDeque<PickedFile>>>);

impl PendingFileResults {
    pub fn push(&self, file: PickedFile) {
        if let Ok(mut queue) = self.0.lock() {
            queue.push_back(file);
        }
    }
}

/// Parses in flight, each tagged with its load ticket
#[derive(Resource, Default)]
pub struct LoadTasks(pub Vec<(LoadTicket, Task<Result<LoadedAsset, ViewerError>>)>);

impl LoadTasks {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Text of the native "model path" field
#[derive(Resource, Default)]
pub struct ModelPathInput(pub String);

/// Model passed on the command line, loaded at startup
#[derive(Resource, Default)]
pub struct InitialModel(pub Option<PathBuf>);

/// File name component used for validation and status text
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Start loading a file from disk. Rejected names never touch the disk.
pub fn request_path_load(session: &mut Session, tasks: &mut LoadTasks, path: PathBuf) {
    let file_name = file_name_of(&path);
    let ticket = match session.begin_load(&file_name) {
        Ok(ticket) => ticket,
        Err(error) => {
            session.report(&error);
            return;
        }
    };

    let task = AsyncComputeTaskPool::get().spawn(async move {
        let bytes = std::fs::read(&path).map_err(|e| {
            ViewerError::InvalidAssetFormat(format!("cannot read {}: {e}", path.display()))
        })?;
        load_glb(&file_name, &bytes)
    });
    tasks.0.push((ticket, task));
}

fn start_bytes_load(session: &mut Session, tasks: &mut LoadTasks, file: PickedFile) {
    let ticket = match session.begin_load(&file.file_name) {
        Ok(ticket) => ticket,
        Err(error) => {
            session.report(&error);
            return;
        }
    };

    let PickedFile { file_name, bytes } = file;
    let task = AsyncComputeTaskPool::get().spawn(async move { load_glb(&file_name, &bytes) });
    tasks.0.push((ticket, task));
}

fn load_initial_model(
    initial: Res<InitialModel>,
    mut session: ResMut<Session>,
    mut tasks: ResMut<LoadTasks>,
) {
    if let Some(path) = initial.0.clone() {
        tracing::info!(path = %path.display(), "Loading model from command line");
        request_path_load(&mut session, &mut tasks, path);
    }
}

/// Move picked files from the callback queue into parse tasks
fn process_picked_files(
    pending: Res<PendingFileResults>,
    mut session: ResMut<Session>,
    mut tasks: ResMut<LoadTasks>,
) {
    let picked: Vec<PickedFile> = match pending.0.try_lock() {
        Ok(mut queue) => queue.drain(..).collect(),
        Err(_) => return,
    };

    for file in picked {
        tracing::debug!(file = %file.file_name, bytes = file.bytes.len(), "File picked");
        start_bytes_load(&mut session, &mut tasks, file);
    }
}

/// Hand finished parses to the session and frame the camera on success
fn poll_load_tasks(
    mut tasks: ResMut<LoadTasks>,
    mut session: ResMut<Session>,
    mut camera: ResMut<CameraSettings>,
) {
    if tasks.is_empty() {
        return;
    }

    let mut finished = Vec::new();
    tasks.0.retain_mut(|(ticket, task)| match block_on(future::poll_once(task)) {
        Some(result) => {
            finished.push((ticket.clone(), result));
            false
        }
        None => true,
    });

    for (ticket, result) in finished {
        match session.complete_load(ticket, result) {
            LoadOutcome::Installed(framing) => camera.snap_to(framing.camera_target()),
            LoadOutcome::Failed(error) => session.report(&error),
            LoadOutcome::Superseded => {}
        }
    }
}

// ============================================================================
// JavaScript Interop (WASM only)
// ============================================================================

#[cfg(target_arch = "wasm32")]
pub mod js_interop {
    use super::*;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;
    use web_sys::HtmlInputElement;

    /// Open the browser file dialog; the chosen file lands in `pending`
    pub fn open_file_picker(accept: &str, pending: PendingFileResults) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            tracing::error!("open_file_picker: no document");
            return;
        };

        let input: HtmlInputElement = match document
            .create_element("input")
            .ok()
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            Some(input) => input,
            None => {
                tracing::error!("open_file_picker: failed to create input element");
                return;
            }
        };

        input.set_type("file");
        input.set_accept(accept);
        input.style().set_property("display", "none").ok();

        let Some(body) = document.body() else {
            tracing::error!("open_file_picker: no document body");
            return;
        };
        if let Err(e) = body.append_child(&input) {
            tracing::error!("open_file_picker: failed to append input: {:?}", e);
            return;
        }

        let input_clone = input.clone();
        let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            let file = input_clone.files().and_then(|files| files.get(0));
            if let Some(file) = file {
                read_file(file, pending.clone());
            }

            if let Some(parent) = input_clone.parent_node() {
                parent.remove_child(&input_clone).ok();
            }
        }) as Box<dyn FnMut(_)>);

        input.set_onchange(Some(closure.as_ref().unchecked_ref()));
        closure.forget();

        input.click();
    }

    fn read_file(file: web_sys::File, pending: PendingFileResults) {
        let reader = match web_sys::FileReader::new() {
            Ok(reader) => reader,
            Err(e) => {
                tracing::error!("read_file: failed to create FileReader: {:?}", e);
                return;
            }
        };
        let file_name = file.name();
        let reader_clone = reader.clone();

        let onload = Closure::wrap(Box::new(move |_: web_sys::Event| {
            let Some(buffer) = reader_clone
                .result()
                .ok()
                .and_then(|result| result.dyn_into::<js_sys::ArrayBuffer>().ok())
            else {
                tracing::warn!(file = %file_name, "read_file: no array buffer");
                return;
            };
            pending.push(PickedFile {
                file_name: file_name.clone(),
                bytes: js_sys::Uint8Array::new(&buffer).to_vec(),
            });
        }) as Box<dyn FnMut(_)>);

        reader.set_onload(Some(onload.as_ref().unchecked_ref()));
        onload.forget();

        reader.read_as_array_buffer(&file).ok();
    }
}
