//! Draws the visible pages, their elements and the editor overlays.
//!
//! Nothing else in the crate talks to [`web_sys::CanvasRenderingContext2d`].
//! Drawing reads the engine and never mutates it. `Canvas2D` failures bubble
//! up as `JsValue` to [`crate::engine::Engine::render`].

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::camera::{Camera, Point};
use crate::chrome::{self, Decoration};
use crate::consts::{GRID_SPACING, HANDLE_SIZE_PX};
use crate::doc::{Element, ElementKind, Page, StyleProps};
use crate::engine::EngineCore;
use crate::geometry::{Orientation, Rect, SnapGuide};

/// Selection color shared by outlines, handles and the marquee.
const SELECTION_COLOR: &str = "#1E90FF";

/// Outline color of a selected element that is locked.
const LOCKED_COLOR: &str = "#f87171";

/// Background grid line color.
const GRID_COLOR: &str = "#ddd";

/// Snap guide color.
const GUIDE_COLOR: &str = "#FF00CC";

/// Marquee dash segment length in screen pixels.
const MARQUEE_DASH_PX: f64 = 4.0;

/// Gap label font size in screen pixels.
const LABEL_FONT_PX: f64 = 11.0;

/// Draw the full scene: pages, elements and editor overlays.
///
/// # Errors
///
/// Returns the first `Canvas2D` error encountered.
pub fn draw(ctx: &CanvasRenderingContext2d, core: &EngineCore) -> Result<(), JsValue> {
    let camera = &core.camera;
    let layout = core.layout();

    // Layer 1: clear and set up the camera transform.
    ctx.set_transform(core.dpr, 0.0, 0.0, core.dpr, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, core.viewport_width, core.viewport_height);
    ctx.translate(camera.pan_x, camera.pan_y)?;
    ctx.scale(camera.zoom, camera.zoom)?;

    for (slot, &index) in core.doc.visible_pages().iter().enumerate() {
        let Some(page) = core.doc.page(index) else {
            continue;
        };
        let origin = layout.slot_origin(slot);
        ctx.save();
        ctx.translate(origin.x, origin.y)?;

        // Layer 2: page background and content area.
        draw_page_background(ctx, page, layout.page_width, layout.page_height);
        if core.show_grid() {
            draw_grid(ctx, layout.page_width, layout.page_height, camera);
        }
        let inset = page.content_origin();
        ctx.translate(inset.x, inset.y)?;

        // Layer 3: elements in array order (bottom first).
        for el in &page.elements {
            draw_element(ctx, el)?;
        }

        // Layer 4: overlays for this page.
        let selected: Vec<&Element> = page.elements.iter().filter(|el| core.ui.is_selected(&el.id)).collect();
        for deco in chrome::decorations(&selected, core.ui.selection.len(), camera.zoom) {
            draw_decoration(ctx, &deco, camera)?;
        }
        if core.ui.guide_page == index && !core.ui.guides.is_empty() {
            let (region_w, region_h) = page.region_size(layout.page_width, layout.page_height);
            for guide in &core.ui.guides {
                draw_guide(ctx, guide, region_w, region_h, camera)?;
            }
        }
        if let Some(m) = core.ui.marquee.filter(|m| m.page == index) {
            draw_marquee(ctx, m.rect, camera)?;
        }

        ctx.restore();
    }

    Ok(())
}

// =============================================================
// Pages
// =============================================================

fn draw_page_background(ctx: &CanvasRenderingContext2d, page: &Page, width: f64, height: f64) {
    ctx.set_fill_style_str(&page.background_color);
    ctx.fill_rect(0.0, 0.0, width, height);

    if let Some(area) = &page.content_area {
        if let Some(color) = &area.background_color {
            ctx.set_fill_style_str(color);
            ctx.fill_rect(
                area.margin,
                area.margin,
                (width - 2.0 * area.margin).max(0.0),
                (height - 2.0 * area.margin).max(0.0),
            );
        }
    }
}

fn draw_grid(ctx: &CanvasRenderingContext2d, width: f64, height: f64, camera: &Camera) {
    ctx.save();
    ctx.set_stroke_style_str(GRID_COLOR);
    ctx.set_line_width(camera.world_len(1.0));
    ctx.begin_path();
    for x in grid_lines(width) {
        ctx.move_to(x, 0.0);
        ctx.line_to(x, height);
    }
    for y in grid_lines(height) {
        ctx.move_to(0.0, y);
        ctx.line_to(width, y);
    }
    ctx.stroke();
    ctx.restore();
}

/// Grid line positions from 0 up to `extent`, every [`GRID_SPACING`] units.
fn grid_lines(extent: f64) -> impl Iterator<Item = f64> {
    (0_u32..).map(|i| f64::from(i) * GRID_SPACING).take_while(move |&v| v <= extent)
}

// =============================================================
// Elements
// =============================================================

/// Draw one element in the current coordinate system (page region or group-local).
fn draw_element(ctx: &CanvasRenderingContext2d, el: &Element) -> Result<(), JsValue> {
    let props = StyleProps::new(&el.styles);
    ctx.save();
    translate_and_rotate(ctx, el)?;
    ctx.set_global_alpha(ctx.global_alpha() * props.opacity());

    match el.kind {
        ElementKind::Shape => fill_box(ctx, el, &props, "#d1d5db")?,
        ElementKind::Text => {
            if props.background_color().is_some() {
                fill_box(ctx, el, &props, "transparent")?;
            }
            draw_text(ctx, el, &props)?;
        }
        ElementKind::Image => draw_placeholder(ctx, el, &props, "#e5e7eb", "Image")?,
        ElementKind::Video => draw_placeholder(ctx, el, &props, "#111827", "Video")?,
        ElementKind::Group => {
            if props.background_color().is_some() {
                fill_box(ctx, el, &props, "transparent")?;
            }
            ctx.translate(-el.width / 2.0, -el.height / 2.0)?;
            for child in el.children() {
                draw_element(ctx, child)?;
            }
        }
    }

    ctx.restore();
    Ok(())
}

fn fill_box(
    ctx: &CanvasRenderingContext2d,
    el: &Element,
    props: &StyleProps<'_>,
    fallback: &str,
) -> Result<(), JsValue> {
    ctx.set_fill_style_str(props.background_color().unwrap_or(fallback));
    let radius = props.border_radius().min(el.width / 2.0).min(el.height / 2.0).max(0.0);
    rounded_rect_path(ctx, -el.width / 2.0, -el.height / 2.0, el.width, el.height, radius)?;
    ctx.fill();
    Ok(())
}

fn draw_placeholder(
    ctx: &CanvasRenderingContext2d,
    el: &Element,
    props: &StyleProps<'_>,
    fill: &str,
    label: &str,
) -> Result<(), JsValue> {
    fill_box(ctx, el, props, fill)?;
    ctx.set_fill_style_str("#6b7280");
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    ctx.set_font("12px sans-serif");
    let max_w = (el.width - 8.0).max(1.0);
    let caption = el.content.as_deref().filter(|c| !c.is_empty()).unwrap_or(label);
    ctx.fill_text(&fit_text_with_ellipsis(ctx, caption, max_w), 0.0, 0.0)?;
    Ok(())
}

fn draw_text(ctx: &CanvasRenderingContext2d, el: &Element, props: &StyleProps<'_>) -> Result<(), JsValue> {
    let text = el.content.as_deref().unwrap_or_default();
    if text.trim().is_empty() {
        return Ok(());
    }

    let font_size = props.font_size().clamp(4.0, 400.0);
    let line_height = font_size * 1.25;
    let max_w = el.width.max(1.0);
    let left = -el.width / 2.0;

    ctx.save();
    rounded_rect_path(ctx, left, -el.height / 2.0, el.width, el.height, 0.0)?;
    ctx.clip();
    ctx.set_fill_style_str(props.color());
    ctx.set_text_baseline("top");
    ctx.set_font(&format!("{} {font_size}px sans-serif", props.font_weight()));
    let (align, x) = match props.text_align() {
        "center" => ("center", 0.0),
        "right" => ("right", el.width / 2.0),
        _ => ("left", left),
    };
    ctx.set_text_align(align);

    for (idx, line) in wrap_text_lines(ctx, text, max_w).iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let y = -el.height / 2.0 + idx as f64 * line_height;
        if y > el.height / 2.0 {
            break;
        }
        ctx.fill_text(line, x, y)?;
    }

    ctx.restore();
    Ok(())
}

fn wrap_text_lines(ctx: &CanvasRenderingContext2d, text: &str, max_w: f64) -> Vec<String> {
    let mut out = Vec::new();
    for raw_line in text.lines() {
        let mut current = String::new();
        for word in raw_line.split_whitespace() {
            let candidate = if current.is_empty() { word.to_owned() } else { format!("{current} {word}") };
            if measured_text_width(ctx, &candidate) <= max_w {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            if measured_text_width(ctx, word) <= max_w {
                current = word.to_owned();
            } else {
                let mut chunks = break_long_word(ctx, word, max_w);
                current = chunks.pop().unwrap_or_default();
                out.extend(chunks);
            }
        }
        out.push(current);
    }
    out
}

fn break_long_word(ctx: &CanvasRenderingContext2d, word: &str, max_w: f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for ch in word.chars() {
        current.push(ch);
        if current.chars().count() > 1 && measured_text_width(ctx, &current) > max_w {
            current.pop();
            lines.push(std::mem::take(&mut current));
            current.push(ch);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn fit_text_with_ellipsis(ctx: &CanvasRenderingContext2d, text: &str, max_w: f64) -> String {
    let trimmed = text.trim();
    if measured_text_width(ctx, trimmed) <= max_w {
        return trimmed.to_owned();
    }
    let mut chars: Vec<char> = trimmed.chars().collect();
    while chars.pop().is_some() {
        let candidate = format!("{}...", chars.iter().collect::<String>().trim_end());
        if measured_text_width(ctx, &candidate) <= max_w {
            return candidate;
        }
    }
    "...".to_owned()
}

fn measured_text_width(ctx: &CanvasRenderingContext2d, text: &str) -> f64 {
    match ctx.measure_text(text) {
        Ok(metrics) => metrics.width(),
        Err(_) => f64::INFINITY,
    }
}

// =============================================================
// Overlays
// =============================================================

fn draw_decoration(ctx: &CanvasRenderingContext2d, deco: &Decoration, camera: &Camera) -> Result<(), JsValue> {
    ctx.save();
    ctx.set_stroke_style_str(if deco.locked { LOCKED_COLOR } else { SELECTION_COLOR });
    ctx.set_line_width(camera.world_len(1.0));

    ctx.begin_path();
    ctx.move_to(deco.outline[0].x, deco.outline[0].y);
    for p in &deco.outline[1..] {
        ctx.line_to(p.x, p.y);
    }
    ctx.close_path();
    ctx.stroke();

    let half = camera.world_len(HANDLE_SIZE_PX) / 2.0;
    if let Some(rh) = deco.rotate_handle {
        if let Some((_, top)) = deco.handles.first() {
            ctx.begin_path();
            ctx.move_to(top.x, top.y);
            ctx.line_to(rh.x, rh.y);
            ctx.stroke();
        }
        ctx.begin_path();
        ctx.arc(rh.x, rh.y, half, 0.0, 2.0 * PI)?;
        ctx.set_fill_style_str("#fff");
        ctx.fill();
        ctx.stroke();
    }

    ctx.set_fill_style_str("#fff");
    for (_, pos) in &deco.handles {
        ctx.fill_rect(pos.x - half, pos.y - half, half * 2.0, half * 2.0);
        ctx.stroke_rect(pos.x - half, pos.y - half, half * 2.0, half * 2.0);
    }

    if let Some(badge) = deco.lock_badge {
        draw_lock_badge(ctx, badge, camera)?;
    }

    ctx.restore();
    Ok(())
}

fn draw_lock_badge(ctx: &CanvasRenderingContext2d, at: Point, camera: &Camera) -> Result<(), JsValue> {
    let r = camera.world_len(HANDLE_SIZE_PX);
    ctx.begin_path();
    ctx.arc(at.x, at.y, r, 0.0, 2.0 * PI)?;
    ctx.set_fill_style_str("#f59e0b");
    ctx.fill();

    // Shackle and body of a padlock.
    ctx.set_stroke_style_str("#fff");
    ctx.set_fill_style_str("#fff");
    ctx.set_line_width(camera.world_len(1.5));
    ctx.begin_path();
    ctx.arc(at.x, at.y - r * 0.15, r * 0.3, PI, 0.0)?;
    ctx.stroke();
    ctx.fill_rect(at.x - r * 0.45, at.y - r * 0.15, r * 0.9, r * 0.6);
    Ok(())
}

fn draw_guide(
    ctx: &CanvasRenderingContext2d,
    guide: &SnapGuide,
    region_w: f64,
    region_h: f64,
    camera: &Camera,
) -> Result<(), JsValue> {
    ctx.save();
    ctx.set_stroke_style_str(GUIDE_COLOR);
    ctx.set_fill_style_str(GUIDE_COLOR);
    ctx.set_line_width(camera.world_len(1.0));
    ctx.set_font(&format!("{}px sans-serif", camera.world_len(LABEL_FONT_PX)));
    ctx.set_text_baseline("middle");
    let p = guide.position;

    ctx.begin_path();
    match guide.orientation {
        Orientation::Vertical => {
            ctx.move_to(p, 0.0);
            ctx.line_to(p, region_h);
            ctx.stroke();
            ctx.set_text_align("center");
            let label_y = region_h / 2.0;
            if guide.gap_start > 0.0 {
                ctx.fill_text(&gap_label(guide.gap_start), p - guide.gap_start / 2.0, label_y)?;
            }
            if guide.gap_end > 0.0 {
                ctx.fill_text(&gap_label(guide.gap_end), p + guide.gap_end / 2.0, label_y)?;
            }
        }
        Orientation::Horizontal => {
            ctx.move_to(0.0, p);
            ctx.line_to(region_w, p);
            ctx.stroke();
            ctx.set_text_align("left");
            let label_x = region_w / 2.0 + camera.world_len(4.0);
            if guide.gap_start > 0.0 {
                ctx.fill_text(&gap_label(guide.gap_start), label_x, p - guide.gap_start / 2.0)?;
            }
            if guide.gap_end > 0.0 {
                ctx.fill_text(&gap_label(guide.gap_end), label_x, p + guide.gap_end / 2.0)?;
            }
        }
    }

    ctx.restore();
    Ok(())
}

fn gap_label(gap: f64) -> String {
    format!("{}", gap.round())
}

fn draw_marquee(ctx: &CanvasRenderingContext2d, marquee: Rect, camera: &Camera) -> Result<(), JsValue> {
    ctx.save();
    let dash_world = camera.world_len(MARQUEE_DASH_PX);
    let dash_array = js_sys::Array::new();
    dash_array.push(&dash_world.into());
    dash_array.push(&dash_world.into());
    ctx.set_line_dash(&dash_array)?;
    ctx.set_stroke_style_str(SELECTION_COLOR);
    ctx.set_fill_style_str("rgba(30, 144, 255, 0.12)");
    ctx.set_line_width(camera.world_len(1.0));
    ctx.fill_rect(marquee.x, marquee.y, marquee.width, marquee.height);
    ctx.stroke_rect(marquee.x, marquee.y, marquee.width, marquee.height);
    ctx.set_line_dash(&js_sys::Array::new())?;
    ctx.restore();
    Ok(())
}

// =============================================================
// Helpers
// =============================================================

fn translate_and_rotate(ctx: &CanvasRenderingContext2d, el: &Element) -> Result<(), JsValue> {
    let c = el.bounds().center();
    ctx.translate(c.x, c.y)?;
    ctx.rotate(el.rotation.to_radians())?;
    Ok(())
}

fn rounded_rect_path(
    ctx: &CanvasRenderingContext2d,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    r: f64,
) -> Result<(), JsValue> {
    ctx.begin_path();
    if r <= 0.0 {
        ctx.rect(x, y, w, h);
        return Ok(());
    }
    ctx.move_to(x + r, y);
    ctx.arc_to(x + w, y, x + w, y + h, r)?;
    ctx.arc_to(x + w, y + h, x, y + h, r)?;
    ctx.arc_to(x, y + h, x, y, r)?;
    ctx.arc_to(x, y, x + w, y, r)?;
    ctx.close_path();
    Ok(())
}
