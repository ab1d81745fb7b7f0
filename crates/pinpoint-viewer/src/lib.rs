//! Pinpoint Viewer - load a GLB model and annotate it with named hotspots
//!
//! Runs natively (path loading, `pinpoint` binary) and in the browser
//! (file picker, wasm entry point below).

pub mod app;
pub mod file_loader;
pub mod ui;

/// WASM entry point
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(tracing::Level::WARN)
            .build(),
    );

    app::run(pinpoint_core::ViewerConfig::default(), None);
}
