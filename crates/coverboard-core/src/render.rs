//! SVG rendering of layers and the local overlay (selection, pencil draft).
//!
//! Output is plain markup for the host to mount; no layout is measured here.

use crate::camera::Camera;
use crate::document::Document;
use crate::geometry::Xywh;
use crate::layers::{
    Color, ConnectorLayer, ImageLayer, Layer, MessageLayer, PathLayer, PenPoint, ShapeLayer, TextLayer,
    connector_endpoints,
};
use crate::presence::Presence;
use crate::selection::{resize_handles, selection_bounds};
use kurbo::{BezPath, Point};
use std::fmt::Write;

/// Stroke width of freehand paths.
pub const PENCIL_STROKE_WIDTH: f64 = 4.0;
/// Side of a resize handle square.
pub const HANDLE_SIZE: f64 = 8.0;

const SELECTION_COLOR: Color = Color::new(59, 130, 246);
const NOTE_TEXT_COLOR: Color = Color::new(0, 0, 0);
const MESSAGE_BORDER_RADIUS: f64 = 12.0;
const MESSAGE_PADDING: f64 = 12.0;
const MESSAGE_THUMB_SIZE: f64 = 48.0;
const TEXT_FONT_SIZE: f64 = 24.0;

/// Escape text for use in element content and attribute values.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render_rectangle(layer: &ShapeLayer) -> String {
    let Xywh { x, y, width, height } = layer.bounds;
    format!(
        r#"<rect x="{x}" y="{y}" width="{width}" height="{height}" fill="{}" />"#,
        layer.fill.to_css()
    )
}

pub fn render_ellipse(layer: &ShapeLayer) -> String {
    let b = layer.bounds;
    let center = b.center();
    format!(
        r#"<ellipse cx="{}" cy="{}" rx="{}" ry="{}" fill="{}" />"#,
        center.x,
        center.y,
        b.width / 2.0,
        b.height / 2.0,
        layer.fill.to_css()
    )
}

/// Smooth a pencil stroke through the midpoints of its samples.
pub fn pen_stroke(points: &[PenPoint]) -> BezPath {
    let mut path = BezPath::new();
    let mut samples = points.iter().map(|&[x, y, _]| Point::new(x, y));
    let Some(first) = samples.next() else {
        return path;
    };
    path.move_to(first);

    let rest: Vec<Point> = samples.collect();
    for pair in rest.windows(2) {
        path.quad_to(pair[0], pair[0].midpoint(pair[1]));
    }
    if let Some(&last) = rest.last() {
        path.line_to(last);
    }
    path
}

fn stroke_markup(path: &BezPath, color: Color) -> String {
    format!(
        r#"<path d="{}" fill="none" stroke="{}" stroke-width="{PENCIL_STROKE_WIDTH}" stroke-linecap="round" stroke-linejoin="round" />"#,
        path.to_svg(),
        color.to_css()
    )
}

pub fn render_path(layer: &PathLayer) -> String {
    format!(
        r#"<g transform="translate({} {})">{}</g>"#,
        layer.bounds.x,
        layer.bounds.y,
        stroke_markup(&pen_stroke(&layer.points), layer.fill)
    )
}

pub fn render_text(layer: &TextLayer) -> String {
    let b = layer.bounds;
    format!(
        r#"<text x="{}" y="{}" font-size="{TEXT_FONT_SIZE}" dominant-baseline="hanging" fill="{}">{}</text>"#,
        b.x,
        b.y,
        layer.fill.to_css(),
        escape_xml(&layer.value)
    )
}

/// Sticky note: filled square with centered text.
pub fn render_note(layer: &TextLayer) -> String {
    let b = layer.bounds;
    let center = b.center();
    format!(
        r#"<g><rect x="{}" y="{}" width="{}" height="{}" fill="{}" /><text x="{}" y="{}" text-anchor="middle" dominant-baseline="middle" fill="{}">{}</text></g>"#,
        b.x,
        b.y,
        b.width,
        b.height,
        layer.fill.to_css(),
        center.x,
        center.y,
        NOTE_TEXT_COLOR.to_css(),
        escape_xml(&layer.value)
    )
}

pub fn render_message(layer: &MessageLayer) -> String {
    let b = layer.bounds;
    let mut out = String::new();
    let _ = write!(
        out,
        r#"<g><rect x="{}" y="{}" width="{}" height="{}" rx="{MESSAGE_BORDER_RADIUS}" fill="white" stroke="{}" stroke-width="2" />"#,
        b.x,
        b.y,
        b.width,
        b.height,
        layer.fill.to_css()
    );
    let _ = write!(
        out,
        r#"<text x="{}" y="{}" dominant-baseline="hanging">{}</text>"#,
        b.x + MESSAGE_PADDING,
        b.y + MESSAGE_PADDING,
        escape_xml(&layer.content)
    );
    let thumbs_y = b.bottom() - MESSAGE_PADDING - MESSAGE_THUMB_SIZE;
    for (i, src) in layer.images.iter().enumerate() {
        let thumb_x = b.x + MESSAGE_PADDING + i as f64 * (MESSAGE_THUMB_SIZE + MESSAGE_PADDING / 2.0);
        let _ = write!(
            out,
            r#"<image href="{}" x="{thumb_x}" y="{thumbs_y}" width="{MESSAGE_THUMB_SIZE}" height="{MESSAGE_THUMB_SIZE}" preserveAspectRatio="xMidYMid slice" />"#,
            escape_xml(src)
        );
    }
    out.push_str("</g>");
    out
}

pub fn render_image(layer: &ImageLayer) -> String {
    let Xywh { x, y, width, height } = layer.bounds;
    let mut out = String::new();
    out.push_str("<g>");
    if layer.src.is_empty() {
        let _ = write!(
            out,
            r#"<rect x="{x}" y="{y}" width="{width}" height="{height}" fill="{}" />"#,
            layer.fill.to_css()
        );
    } else {
        let _ = write!(
            out,
            r#"<image href="{}" x="{x}" y="{y}" width="{width}" height="{height}" preserveAspectRatio="xMidYMid slice" />"#,
            escape_xml(&layer.src)
        );
    }
    if let Some(overlay) = &layer.overlay {
        let _ = write!(
            out,
            r#"<text x="{}" y="{}" font-family="{}" font-size="{}" fill="{}" dominant-baseline="hanging">{}</text>"#,
            x + overlay.offset_x,
            y + overlay.offset_y,
            escape_xml(&overlay.font_family),
            overlay.font_size,
            overlay.fill.to_css(),
            escape_xml(&overlay.text)
        );
    }
    out.push_str("</g>");
    out
}

/// Curve between the live anchors of both ends, or `None` if either end is gone.
pub fn render_connector<D: Document + ?Sized>(doc: &D, layer: &ConnectorLayer) -> Option<String> {
    let (start, end) = connector_endpoints(doc, layer)?;
    let pull = ((end.x - start.x).abs() / 2.0).max(40.0);
    let mut path = BezPath::new();
    path.move_to(start);
    path.curve_to(Point::new(start.x + pull, start.y), Point::new(end.x - pull, end.y), end);
    Some(format!(
        r#"<path d="{}" fill="none" stroke="{}" stroke-width="2" />"#,
        path.to_svg(),
        layer.fill.to_css()
    ))
}

pub fn render_layer<D: Document + ?Sized>(doc: &D, layer: &Layer) -> Option<String> {
    let markup = match layer {
        Layer::Rectangle(l) => render_rectangle(l),
        Layer::Ellipse(l) => render_ellipse(l),
        Layer::Path(l) => render_path(l),
        Layer::Text(l) => render_text(l),
        Layer::Note(l) => render_note(l),
        Layer::Message(l) => render_message(l),
        Layer::Image(l) => render_image(l),
        Layer::Connector(l) => return render_connector(doc, l),
    };
    Some(markup)
}

/// Dashed box plus resize handles, sized for the current zoom.
pub fn render_selection(bounds: Xywh, zoom: f64) -> String {
    let stroke = 1.0 / zoom;
    let handle = HANDLE_SIZE / zoom;
    let mut out = String::new();
    let _ = write!(
        out,
        r#"<g><rect x="{}" y="{}" width="{}" height="{}" fill="none" stroke="{}" stroke-width="{stroke}" stroke-dasharray="{} {}" />"#,
        bounds.x,
        bounds.y,
        bounds.width,
        bounds.height,
        SELECTION_COLOR.to_css(),
        4.0 * stroke,
        4.0 * stroke
    );
    for h in resize_handles(bounds) {
        let _ = write!(
            out,
            r#"<rect x="{}" y="{}" width="{handle}" height="{handle}" fill="white" stroke="{}" stroke-width="{stroke}" />"#,
            h.position.x - handle / 2.0,
            h.position.y - handle / 2.0,
            SELECTION_COLOR.to_css()
        );
    }
    out.push_str("</g>");
    out
}

/// Whole board as one `<svg>` element, layers back to front.
pub fn render_scene<D: Document + ?Sized>(doc: &D, camera: &Camera, presence: &Presence) -> String {
    let [a, b, c, d, e, f] = camera.transform().as_coeffs();
    let mut out = String::new();
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg"><g transform="matrix({a} {b} {c} {d} {e} {f})">"#
    );

    for id in doc.layer_ids() {
        match doc.layer(&id).and_then(|layer| render_layer(doc, &layer)) {
            Some(markup) => out.push_str(&markup),
            None => log::debug!("Skipping unrenderable layer {}", id),
        }
    }

    if let Some(bounds) = selection_bounds(doc, &presence.selection) {
        out.push_str(&render_selection(bounds, camera.scale));
    }

    if let Some(draft) = &presence.pencil_draft {
        out.push_str(&stroke_markup(&pen_stroke(draft), presence.pen_color));
    }

    out.push_str("</g></svg>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocument;
    use crate::layers::{LayerKind, Overlay};
    use kurbo::PathEl;

    fn layer(kind: LayerKind, x: f64, y: f64) -> Layer {
        Layer::with_defaults(kind, Point::new(x, y), (100.0, 50.0), Color::new(255, 0, 0)).expect("insertable")
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml(r#"<b>"Tom" & 'Jerry'</b>"#), "&lt;b&gt;&quot;Tom&quot; &amp; &apos;Jerry&apos;&lt;/b&gt;");
    }

    #[test]
    fn test_rectangle_markup() {
        let Layer::Rectangle(rect) = layer(LayerKind::Rectangle, 10.0, 20.0) else {
            panic!("expected rectangle");
        };
        assert_eq!(render_rectangle(&rect), r##"<rect x="10" y="20" width="100" height="50" fill="#ff0000" />"##);
    }

    #[test]
    fn test_text_is_escaped() {
        let Layer::Note(mut note) = layer(LayerKind::Note, 0.0, 0.0) else {
            panic!("expected note");
        };
        note.value = "Fish & <Chips>".into();
        let markup = render_note(&note);
        assert!(markup.contains("Fish &amp; &lt;Chips&gt;"));
    }

    #[test]
    fn test_image_overlay_position() {
        let Layer::Image(mut image) = layer(LayerKind::Image, 100.0, 100.0) else {
            panic!("expected image");
        };
        image.src = "https://covers.example/a.png?w=1&h=2".into();
        image.overlay = Some(Overlay {
            text: "Dune".into(),
            font_family: "Cinzel".into(),
            font_size: 48.0,
            fill: Color::white(),
            offset_x: 10.0,
            offset_y: 30.0,
        });
        let markup = render_image(&image);
        assert!(markup.contains(r#"href="https://covers.example/a.png?w=1&amp;h=2""#));
        assert!(markup.contains(r#"<text x="110" y="130" font-family="Cinzel""#));
    }

    #[test]
    fn test_pen_stroke_shape() {
        assert!(pen_stroke(&[]).elements().is_empty());
        let path = pen_stroke(&[[0.0, 0.0, 0.5], [10.0, 0.0, 0.5], [20.0, 10.0, 0.5]]);
        assert_eq!(
            path.elements(),
            &[
                PathEl::MoveTo(Point::new(0.0, 0.0)),
                PathEl::QuadTo(Point::new(10.0, 0.0), Point::new(15.0, 5.0)),
                PathEl::LineTo(Point::new(20.0, 10.0)),
            ]
        );
    }

    #[test]
    fn test_dangling_connector_renders_nothing() {
        let mut doc = MemoryDocument::new();
        doc.mutate(|d| d.insert_layer("a", &layer(LayerKind::Rectangle, 0.0, 0.0))).expect("insert");
        let connector = ConnectorLayer {
            start_layer_id: "a".into(),
            end_layer_id: "gone".into(),
            start_point: Point::ZERO,
            end_point: Point::ZERO,
            fill: Color::black(),
        };
        assert!(render_connector(&doc, &connector).is_none());
    }

    #[test]
    fn test_scene_contains_layers_selection_and_draft() {
        let mut doc = MemoryDocument::new();
        doc.mutate(|d| {
            d.insert_layer("a", &layer(LayerKind::Rectangle, 0.0, 0.0))?;
            d.insert_layer("b", &layer(LayerKind::Ellipse, 200.0, 0.0))
        })
        .expect("insert");
        let presence = Presence {
            selection: vec!["a".into()],
            pencil_draft: Some(vec![[0.0, 0.0, 0.5], [5.0, 5.0, 0.5]]),
            ..Presence::default()
        };

        let svg = render_scene(&doc, &Camera::new(), &presence);
        assert!(svg.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg"><g transform="matrix(1 0 0 1 0 0)">"#));
        assert!(svg.find("<rect").expect("rectangle") < svg.find("<ellipse").expect("ellipse"));
        assert!(svg.contains("stroke-dasharray"));
        assert!(svg.contains(r##"stroke="#000000""##));
        assert!(svg.ends_with("</g></svg>"));
    }
}
