use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// Devices reporting this many logical cores or fewer get the low-resource threshold.
const CONSTRAINED_MAX_CORES: f64 = 2.0;

/// Helper to guess whether the page runs on a constrained device, from `navigator.hardwareConcurrency`.
pub(crate) fn is_constrained_device() -> bool {
    let cores = gloo::utils::window().navigator().hardware_concurrency();
    // browsers that hide the value report 0
    cores > 0.0 && cores <= CONSTRAINED_MAX_CORES
}

pub(crate) fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
    match canvas.get_context("2d") {
        Ok(Some(context)) => context.dyn_into().ok(),
        Ok(None) => None,
        Err(err) => {
            log::error!("failed to get 2d context: {:?}", err);
            None
        }
    }
}
