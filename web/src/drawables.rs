use std::f64::consts::TAU;

use unveil_core::{CellIndex, Grid, RevealSession};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use crate::utils::context_2d;

/// Dots are spaced at 120% of their diameter.
const SPACING: f64 = 1.2;

const COVER_COLOR: &str = "#000";
const PLAIN_COLOR: &str = "#888";

/// What gets drawn for one cell, keyed by the same index as the session's cell state.
#[derive(Clone, Debug, PartialEq)]
struct Dot {
    center: (f64, f64),
    /// Cover marker, sized by how dark the photo is under the cell.
    cover_radius: f64,
    /// Dot shown once the cell is revealed, tinted with the photo color.
    radius: f64,
    color: String,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Drawables {
    dots: Vec<Dot>,
}

impl Drawables {
    /// Flat placeholder used until the photo has loaded.
    pub(crate) fn plain(grid: &Grid) -> Self {
        Self::build(grid, |_| (PLAIN_COLOR.to_string(), 0.0))
    }

    /// Samples the photo down to one pixel per cell and derives each cell's dot from it.
    pub(crate) fn from_photo(grid: &Grid, photo: &HtmlImageElement) -> Result<Self, JsValue> {
        let (columns, rows) = grid.size();
        let scratch: HtmlCanvasElement = gloo::utils::document()
            .create_element("canvas")?
            .dyn_into()
            .map_err(JsValue::from)?;
        scratch.set_width(columns);
        scratch.set_height(rows);
        let context = context_2d(&scratch).ok_or_else(|| JsValue::from_str("no 2d context"))?;
        context.draw_image_with_html_image_element_and_dw_and_dh(
            photo,
            0.0,
            0.0,
            f64::from(columns),
            f64::from(rows),
        )?;
        let pixels = context
            .get_image_data(0.0, 0.0, f64::from(columns), f64::from(rows))?
            .data()
            .0;

        Ok(Self::build(grid, |index| {
            let offset = index as usize * 4;
            match pixels.get(offset..offset + 3) {
                Some(&[r, g, b]) => (format!("rgb({r},{g},{b})"), gray(r, g, b)),
                _ => (PLAIN_COLOR.to_string(), 0.0),
            }
        }))
    }

    fn build(grid: &Grid, mut sample: impl FnMut(CellIndex) -> (String, f64)) -> Self {
        let radius = grid.cell_size() / 2.0 / SPACING;
        let dots = (0..grid.cell_count())
            .map(|index| {
                let (color, gray) = sample(index);
                Dot {
                    // indices come from the grid itself
                    center: grid.cell_center(index).unwrap_or_default(),
                    cover_radius: radius * (1.0 - gray).max(0.2),
                    radius,
                    color,
                }
            })
            .collect();
        Self { dots }
    }

    pub(crate) fn draw(
        &self,
        context: &CanvasRenderingContext2d,
        session: &RevealSession,
        photo: Option<&HtmlImageElement>,
    ) -> Result<(), JsValue> {
        let (width, height) = session.grid().canvas_size();
        let frame = session.frame();

        context.set_global_alpha(1.0);
        context.clear_rect(0.0, 0.0, width, height);

        if let Some(photo) = photo.filter(|_| frame.background_opacity > 0.0) {
            context.set_global_alpha(frame.background_opacity);
            context.draw_image_with_html_image_element_and_dw_and_dh(
                photo, 0.0, 0.0, width, height,
            )?;
        }

        for ((_, weight), dot) in session.cell_weights().zip(&self.dots) {
            if weight.covered > 0.0 {
                fill_circle(context, dot.center, dot.cover_radius, COVER_COLOR, weight.covered)?;
            }
            if weight.revealed > 0.0 {
                fill_circle(context, dot.center, dot.radius, &dot.color, weight.revealed)?;
            }
        }

        context.set_global_alpha(1.0);
        Ok(())
    }
}

/// Luminance in `[0, 1]`, with the usual Rec. 601 weights.
fn gray(r: u8, g: u8, b: u8) -> f64 {
    (0.2989 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b)) / 255.0
}

fn fill_circle(
    context: &CanvasRenderingContext2d,
    (x, y): (f64, f64),
    radius: f64,
    color: &str,
    alpha: f64,
) -> Result<(), JsValue> {
    context.set_global_alpha(alpha);
    context.set_fill_style_str(color);
    context.begin_path();
    context.arc(x, y, radius, 0.0, TAU)?;
    context.fill();
    Ok(())
}
