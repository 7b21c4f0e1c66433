use quietwave_core::spectrum::{layout_bars, Bar, SpectrumFrame, GRADIENT_STOPS, TRAIL_ALPHA};
use web_sys::CanvasRenderingContext2d;

const BACKGROUND_RGB: &str = "10, 10, 18";

/// Paint one frame of the bar display. The previous frame is faded rather than
/// cleared, which leaves a short trail behind falling bars.
pub fn draw_frame(ctx: &CanvasRenderingContext2d, frame: &SpectrumFrame, width: f64, height: f64) {
    ctx.set_fill_style_str(&format!("rgba({BACKGROUND_RGB}, {TRAIL_ALPHA})"));
    ctx.fill_rect(0.0, 0.0, width, height);

    if frame.is_silent() {
        return;
    }
    let bars = layout_bars(frame, width, height);

    // One gradient for the whole frame, spanning the full height so colour tracks magnitude.
    let gradient = ctx.create_linear_gradient(0.0, height, 0.0, 0.0);
    for (offset, color) in GRADIENT_STOPS {
        let _ = gradient.add_color_stop(offset, color);
    }
    ctx.set_fill_style_canvas_gradient(&gradient);

    ctx.begin_path();
    for bar in &bars {
        trace_bar(ctx, bar);
    }
    ctx.fill();
}

/// Rectangle with rounded top corners.
fn trace_bar(ctx: &CanvasRenderingContext2d, bar: &Bar) {
    let Bar { x, y, width, height, cap_radius: r } = *bar;
    let bottom = y + height;
    ctx.move_to(x, bottom);
    ctx.line_to(x, y + r);
    ctx.quadratic_curve_to(x, y, x + r, y);
    ctx.line_to(x + width - r, y);
    ctx.quadratic_curve_to(x + width, y, x + width, y + r);
    ctx.line_to(x + width, bottom);
    ctx.close_path();
}

/// Wipe to the background colour.
pub fn clear(ctx: &CanvasRenderingContext2d, width: f64, height: f64) {
    ctx.set_fill_style_str(&format!("rgb({BACKGROUND_RGB})"));
    ctx.fill_rect(0.0, 0.0, width, height);
}
