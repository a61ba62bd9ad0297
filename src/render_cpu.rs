//! CPU rasterization of compiled scenes.
//!
//! Geometry is painted with `vello_cpu`; strokes are expanded to fill paths
//! with `kurbo` first so the backend only ever fills. Labels are shaped with
//! `parley` from caller-provided font bytes — a renderer without a font still
//! draws all geometry and skips text.

use crate::{
    core::{Canvas, Rgba8},
    error::{VizError, VizResult},
    model::VisualizationData,
    scene::{self, DrawOp, Scene},
    tree::TreeWorkspace,
};

/// Straight-alpha RGBA8 frame, ready for PNG encoding.
#[derive(Clone, Debug)]
pub struct FrameRgba {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

#[derive(Clone, Debug, Default)]
pub struct RenderSettings {
    pub clear_rgba: Option<[u8; 4]>,
}

/// Matches the producer's coordinate space (x in 0..1000, y in 0..800).
pub const DEFAULT_CANVAS: Canvas = Canvas {
    width: 1000,
    height: 800,
};

pub struct CpuRenderer {
    settings: RenderSettings,
    labels: Option<LabelFont>,
}

/// RGBA8 brush color carried through Parley layout styles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct LabelBrush {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

struct LabelFont {
    font: vello_cpu::peniko::FontData,
    family_name: String,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<LabelBrush>,
}

impl CpuRenderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            labels: None,
        }
    }

    /// Renderer with label support from raw font bytes (TTF/OTF).
    pub fn with_font(settings: RenderSettings, font_bytes: Vec<u8>) -> VizResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(font_bytes.clone()),
            None,
        );
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| VizError::render("no font families registered from font bytes"))?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| VizError::render("registered font family has no name"))?
            .to_string();

        let font =
            vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), 0);

        Ok(Self {
            settings,
            labels: Some(LabelFont {
                font,
                family_name,
                font_ctx,
                layout_ctx: parley::LayoutContext::new(),
            }),
        })
    }

    /// Compile and rasterize one document step.
    pub fn render_document(
        &mut self,
        doc: &VisualizationData,
        step_index: usize,
        zoom: f64,
        canvas: Canvas,
    ) -> VizResult<FrameRgba> {
        let scene = scene::compile_scene(doc, step_index, zoom);
        self.render_scene(&scene, canvas)
    }

    /// Rasterize the live tree workspace.
    pub fn render_tree(
        &mut self,
        tree: &TreeWorkspace,
        zoom: f64,
        canvas: Canvas,
    ) -> VizResult<FrameRgba> {
        let scene = scene::tree_scene(tree, zoom);
        self.render_scene(&scene, canvas)
    }

    #[tracing::instrument(skip(self, scene), fields(ops = scene.ops.len()))]
    pub fn render_scene(&mut self, scene: &Scene, canvas: Canvas) -> VizResult<FrameRgba> {
        if canvas.width == 0 || canvas.height == 0 {
            return Err(VizError::render("canvas width/height must be > 0"));
        }
        let width_u16: u16 = canvas
            .width
            .try_into()
            .map_err(|_| VizError::render("canvas width exceeds u16"))?;
        let height_u16: u16 = canvas
            .height
            .try_into()
            .map_err(|_| VizError::render("canvas height exceeds u16"))?;

        let mut pixmap = vello_cpu::Pixmap::new(width_u16, height_u16);
        let clear = self
            .settings
            .clear_rgba
            .map(|[r, g, b, a]| premul_rgba8(r, g, b, a))
            .unwrap_or([0, 0, 0, 0]);
        clear_pixmap(&mut pixmap, clear);

        let mut ctx = vello_cpu::RenderContext::new(width_u16, height_u16);
        for op in &scene.ops {
            self.draw_op(&mut ctx, scene, op);
        }
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        let mut data = pixmap.data_as_u8_slice().to_vec();
        unpremultiply(&mut data);
        Ok(FrameRgba {
            width: canvas.width,
            height: canvas.height,
            data,
        })
    }

    fn draw_op(&mut self, ctx: &mut vello_cpu::RenderContext, scene: &Scene, op: &DrawOp) {
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        match op {
            DrawOp::Fill { path, color } => {
                ctx.set_transform(affine_to_cpu(scene.transform));
                ctx.set_paint(color_to_cpu(*color));
                ctx.fill_path(&bezpath_to_cpu(path));
            }
            DrawOp::Stroke { path, color, width } => {
                // Expand to an outline so the backend only fills.
                let style = kurbo::Stroke::new(*width);
                let outline =
                    kurbo::stroke(path.iter(), &style, &kurbo::StrokeOpts::default(), 0.25);
                ctx.set_transform(affine_to_cpu(scene.transform));
                ctx.set_paint(color_to_cpu(*color));
                ctx.fill_path(&bezpath_to_cpu(&outline));
            }
            DrawOp::Label {
                lines,
                origin,
                size_px,
                color,
            } => {
                let Some(labels) = self.labels.as_mut() else {
                    // No font configured; geometry still renders.
                    return;
                };
                let Some(layout) = labels.layout(lines, *size_px, *color) else {
                    return;
                };

                let offset = kurbo::Affine::translate((
                    origin.x - f64::from(layout.width()) / 2.0,
                    origin.y - f64::from(layout.height()) / 2.0,
                ));
                ctx.set_transform(affine_to_cpu(scene.transform * offset));

                for line in layout.lines() {
                    for item in line.items() {
                        let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                            continue;
                        };

                        let brush = run.style().brush;
                        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                            brush.r, brush.g, brush.b, brush.a,
                        ));

                        let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                            id: g.id,
                            x: g.x,
                            y: g.y,
                        });
                        ctx.glyph_run(&labels.font)
                            .font_size(run.run().font_size())
                            .fill_glyphs(glyphs);
                    }
                }
            }
        }
    }
}

impl LabelFont {
    /// Shape a centered multi-line label. `None` when the text lays out to
    /// nothing (empty lines).
    fn layout(
        &mut self,
        lines: &[String],
        size_px: f32,
        color: Rgba8,
    ) -> Option<parley::Layout<LabelBrush>> {
        if lines.is_empty() {
            return None;
        }
        let text = lines.join("\n");
        if text.trim().is_empty() {
            return None;
        }

        let brush = LabelBrush {
            r: color.r,
            g: color.g,
            b: color.b,
            a: color.a,
        };

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, &text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<LabelBrush> = builder.build(&text);
        // Wrapping already happened in the scene compiler; only explicit
        // newlines break here.
        layout.break_all_lines(None);
        let width = layout.width();
        layout.align(
            Some(width),
            parley::Alignment::Center,
            parley::AlignmentOptions::default(),
        );
        Some(layout)
    }
}

fn premul_rgba8(r: u8, g: u8, b: u8, a: u8) -> [u8; 4] {
    let af = (a as u16) + 1;
    let premul = |c: u8| -> u8 { (((c as u16) * af) >> 8) as u8 };
    [premul(r), premul(g), premul(b), a]
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba: [u8; 4]) {
    let data = pixmap.data_as_u8_slice_mut();
    for px in data.chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

fn unpremultiply(data: &mut [u8]) {
    for px in data.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn affine_to_cpu(a: kurbo::Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: kurbo::Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3))
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}
