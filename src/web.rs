//! Host page glue for the browser build.
//!
//! The page must contain a `<canvas id="canvas">` inside an element with
//! class `container`; the container's client size drives the viewport.

use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlCanvasElement, HtmlElement};

use crate::error::SimulationError;
use crate::scene::ContainerSize;

/// Id of the canvas the scene renders into.
pub const CANVAS_ID: &str = "canvas";
/// Selector of the element whose size the scene fills.
pub const CONTAINER_SELECTOR: &str = ".container";

/// Route `log` records to the developer console and report panics there.
pub fn init_logging() {
    console_error_panic_hook::set_once();
    // Fails only if a logger is already installed.
    let _ = console_log::init_with_level(log::Level::Info);
}

fn document() -> Result<Document, SimulationError> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| SimulationError::Dom("no document".to_string()))
}

/// The `#canvas` element.
pub fn canvas() -> Result<HtmlCanvasElement, SimulationError> {
    document()?
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| SimulationError::Dom(format!("no element with id '{}'", CANVAS_ID)))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| SimulationError::Dom(format!("#{} is not a canvas", CANVAS_ID)))
}

/// The `.container` element.
pub fn container() -> Result<HtmlElement, SimulationError> {
    let dom = |what: &str| SimulationError::Dom(format!("'{}' {}", CONTAINER_SELECTOR, what));
    document()?
        .query_selector(CONTAINER_SELECTOR)
        .map_err(|_| dom("is not a valid selector"))?
        .ok_or_else(|| dom("matches no element"))?
        .dyn_into::<HtmlElement>()
        .map_err(|_| dom("is not an HTML element"))
}

/// Client size of `container` in CSS pixels.
pub fn container_size(container: &HtmlElement) -> ContainerSize {
    ContainerSize::new(
        container.client_width().max(0) as u32,
        container.client_height().max(0) as u32,
    )
}
