//! Conversion between layers and Loro values.

use crate::geometry::Xywh;
use crate::layers::{
    Color, ConnectorLayer, ImageLayer, Layer, MessageLayer, Overlay, PathLayer, PenPoint, ShapeLayer, TextLayer,
};
use kurbo::Point;
use loro::{LoroList, LoroMap, LoroMapValue, LoroResult, LoroValue};

// Layer type identifiers
const TYPE_RECTANGLE: &str = "rectangle";
const TYPE_ELLIPSE: &str = "ellipse";
const TYPE_PATH: &str = "path";
const TYPE_TEXT: &str = "text";
const TYPE_NOTE: &str = "note";
const TYPE_MESSAGE: &str = "message";
const TYPE_IMAGE: &str = "image";
const TYPE_CONNECTOR: &str = "connector";

const KEY_TYPE: &str = "type";

// Bounds and fill
const KEY_X: &str = "x";
const KEY_Y: &str = "y";
const KEY_WIDTH: &str = "width";
const KEY_HEIGHT: &str = "height";
const KEY_FILL_R: &str = "fill_r";
const KEY_FILL_G: &str = "fill_g";
const KEY_FILL_B: &str = "fill_b";

// Path
const KEY_POINTS: &str = "points";

// Text / note
const KEY_VALUE: &str = "value";

// Message
const KEY_CONTENT: &str = "content";
const KEY_TASK_ID: &str = "task_id";
const KEY_IMAGES: &str = "images";

// Image
const KEY_SRC: &str = "src";
const KEY_HAS_OVERLAY: &str = "has_overlay";
const KEY_OVERLAY_TEXT: &str = "overlay_text";
const KEY_OVERLAY_FONT_FAMILY: &str = "overlay_font_family";
const KEY_OVERLAY_FONT_SIZE: &str = "overlay_font_size";
const KEY_OVERLAY_FILL_R: &str = "overlay_fill_r";
const KEY_OVERLAY_FILL_G: &str = "overlay_fill_g";
const KEY_OVERLAY_FILL_B: &str = "overlay_fill_b";
const KEY_OVERLAY_OFFSET_X: &str = "overlay_offset_x";
const KEY_OVERLAY_OFFSET_Y: &str = "overlay_offset_y";

// Connector
const KEY_START_LAYER_ID: &str = "start_layer_id";
const KEY_END_LAYER_ID: &str = "end_layer_id";
const KEY_START_X: &str = "start_x";
const KEY_START_Y: &str = "start_y";
const KEY_END_X: &str = "end_x";
const KEY_END_Y: &str = "end_y";

// Helpers to extract values from LoroMapValue (derefs to HashMap<String, LoroValue>)
fn as_double(value: &LoroValue) -> Option<f64> {
    match value {
        LoroValue::Double(d) => Some(*d),
        LoroValue::I64(i) => Some(*i as f64),
        _ => None,
    }
}

fn get_double(map: &LoroMapValue, key: &str) -> Option<f64> {
    as_double(map.get(key)?)
}

fn get_u8(map: &LoroMapValue, key: &str) -> Option<u8> {
    match map.get(key)? {
        LoroValue::I64(i) => u8::try_from(*i).ok(),
        LoroValue::Double(d) => Some(d.clamp(0.0, 255.0) as u8),
        _ => None,
    }
}

fn get_string(map: &LoroMapValue, key: &str) -> Option<String> {
    match map.get(key)? {
        LoroValue::String(s) => Some(s.to_string()),
        _ => None,
    }
}

fn get_bool(map: &LoroMapValue, key: &str) -> Option<bool> {
    match map.get(key)? {
        LoroValue::Bool(b) => Some(*b),
        _ => None,
    }
}

fn get_list<'a>(map: &'a LoroMapValue, key: &str) -> Option<&'a [LoroValue]> {
    match map.get(key)? {
        LoroValue::List(list) => Some(&list[..]),
        _ => None,
    }
}

/// Write a layer into an (empty) Loro map.
pub fn layer_to_loro(layer: &Layer, map: &LoroMap) -> LoroResult<()> {
    match layer {
        Layer::Rectangle(shape) => {
            map.insert(KEY_TYPE, TYPE_RECTANGLE)?;
            bounds_to_loro(shape.bounds, map)?;
            fill_to_loro(shape.fill, map)?;
        }
        Layer::Ellipse(shape) => {
            map.insert(KEY_TYPE, TYPE_ELLIPSE)?;
            bounds_to_loro(shape.bounds, map)?;
            fill_to_loro(shape.fill, map)?;
        }
        Layer::Path(path) => {
            map.insert(KEY_TYPE, TYPE_PATH)?;
            bounds_to_loro(path.bounds, map)?;
            fill_to_loro(path.fill, map)?;

            // Points as a list of [x, y, pressure] lists
            let points_list = map.insert_container(KEY_POINTS, LoroList::new())?;
            for &[x, y, pressure] in &path.points {
                let point_list = points_list.insert_container(points_list.len(), LoroList::new())?;
                point_list.push(x)?;
                point_list.push(y)?;
                point_list.push(pressure)?;
            }
        }
        Layer::Text(text) | Layer::Note(text) => {
            let tag = if matches!(layer, Layer::Text(_)) { TYPE_TEXT } else { TYPE_NOTE };
            map.insert(KEY_TYPE, tag)?;
            bounds_to_loro(text.bounds, map)?;
            fill_to_loro(text.fill, map)?;
            map.insert(KEY_VALUE, text.value.clone())?;
        }
        Layer::Message(message) => {
            map.insert(KEY_TYPE, TYPE_MESSAGE)?;
            bounds_to_loro(message.bounds, map)?;
            fill_to_loro(message.fill, map)?;
            map.insert(KEY_CONTENT, message.content.clone())?;
            if let Some(task_id) = &message.task_id {
                map.insert(KEY_TASK_ID, task_id.clone())?;
            }
            let images = map.insert_container(KEY_IMAGES, LoroList::new())?;
            for url in &message.images {
                images.push(LoroValue::String(url.clone().into()))?;
            }
        }
        Layer::Image(image) => {
            map.insert(KEY_TYPE, TYPE_IMAGE)?;
            bounds_to_loro(image.bounds, map)?;
            fill_to_loro(image.fill, map)?;
            map.insert(KEY_SRC, image.src.clone())?;
            match &image.overlay {
                Some(overlay) => {
                    map.insert(KEY_HAS_OVERLAY, true)?;
                    map.insert(KEY_OVERLAY_TEXT, overlay.text.clone())?;
                    map.insert(KEY_OVERLAY_FONT_FAMILY, overlay.font_family.clone())?;
                    map.insert(KEY_OVERLAY_FONT_SIZE, overlay.font_size)?;
                    map.insert(KEY_OVERLAY_FILL_R, overlay.fill.r as i64)?;
                    map.insert(KEY_OVERLAY_FILL_G, overlay.fill.g as i64)?;
                    map.insert(KEY_OVERLAY_FILL_B, overlay.fill.b as i64)?;
                    map.insert(KEY_OVERLAY_OFFSET_X, overlay.offset_x)?;
                    map.insert(KEY_OVERLAY_OFFSET_Y, overlay.offset_y)?;
                }
                None => {
                    map.insert(KEY_HAS_OVERLAY, false)?;
                }
            }
        }
        Layer::Connector(connector) => {
            map.insert(KEY_TYPE, TYPE_CONNECTOR)?;
            map.insert(KEY_START_LAYER_ID, connector.start_layer_id.clone())?;
            map.insert(KEY_END_LAYER_ID, connector.end_layer_id.clone())?;
            map.insert(KEY_START_X, connector.start_point.x)?;
            map.insert(KEY_START_Y, connector.start_point.y)?;
            map.insert(KEY_END_X, connector.end_point.x)?;
            map.insert(KEY_END_Y, connector.end_point.y)?;
            fill_to_loro(connector.fill, map)?;
        }
    }
    Ok(())
}

fn bounds_to_loro(bounds: Xywh, map: &LoroMap) -> LoroResult<()> {
    map.insert(KEY_X, bounds.x)?;
    map.insert(KEY_Y, bounds.y)?;
    map.insert(KEY_WIDTH, bounds.width)?;
    map.insert(KEY_HEIGHT, bounds.height)?;
    Ok(())
}

fn fill_to_loro(fill: Color, map: &LoroMap) -> LoroResult<()> {
    map.insert(KEY_FILL_R, fill.r as i64)?;
    map.insert(KEY_FILL_G, fill.g as i64)?;
    map.insert(KEY_FILL_B, fill.b as i64)?;
    Ok(())
}

/// Read a layer back from a Loro map value.
///
/// Returns `None` for unknown types or missing required fields.
pub fn layer_from_loro(map: &LoroMapValue) -> Option<Layer> {
    let layer_type = get_string(map, KEY_TYPE)?;

    match layer_type.as_str() {
        TYPE_RECTANGLE => Some(Layer::Rectangle(shape_from_loro(map)?)),
        TYPE_ELLIPSE => Some(Layer::Ellipse(shape_from_loro(map)?)),
        TYPE_PATH => path_from_loro(map).map(Layer::Path),
        TYPE_TEXT => text_from_loro(map).map(Layer::Text),
        TYPE_NOTE => text_from_loro(map).map(Layer::Note),
        TYPE_MESSAGE => message_from_loro(map).map(Layer::Message),
        TYPE_IMAGE => image_from_loro(map).map(Layer::Image),
        TYPE_CONNECTOR => connector_from_loro(map).map(Layer::Connector),
        _ => None,
    }
}

fn bounds_from_loro(map: &LoroMapValue) -> Option<Xywh> {
    Some(Xywh::new(
        get_double(map, KEY_X)?,
        get_double(map, KEY_Y)?,
        get_double(map, KEY_WIDTH)?,
        get_double(map, KEY_HEIGHT)?,
    ))
}

fn fill_from_loro(map: &LoroMapValue) -> Color {
    Color::new(
        get_u8(map, KEY_FILL_R).unwrap_or(0),
        get_u8(map, KEY_FILL_G).unwrap_or(0),
        get_u8(map, KEY_FILL_B).unwrap_or(0),
    )
}

fn shape_from_loro(map: &LoroMapValue) -> Option<ShapeLayer> {
    Some(ShapeLayer {
        bounds: bounds_from_loro(map)?,
        fill: fill_from_loro(map),
    })
}

fn path_from_loro(map: &LoroMapValue) -> Option<PathLayer> {
    let points: Vec<PenPoint> = get_list(map, KEY_POINTS)
        .map(|list| {
            list.iter()
                .filter_map(|p| match p {
                    LoroValue::List(coords) if coords.len() >= 2 => {
                        let x = as_double(coords.first()?)?;
                        let y = as_double(coords.get(1)?)?;
                        let pressure = coords.get(2).and_then(as_double).unwrap_or(0.5);
                        Some([x, y, pressure])
                    }
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    Some(PathLayer {
        bounds: bounds_from_loro(map)?,
        fill: fill_from_loro(map),
        points,
    })
}

fn text_from_loro(map: &LoroMapValue) -> Option<TextLayer> {
    Some(TextLayer {
        bounds: bounds_from_loro(map)?,
        fill: fill_from_loro(map),
        value: get_string(map, KEY_VALUE).unwrap_or_default(),
    })
}

fn message_from_loro(map: &LoroMapValue) -> Option<MessageLayer> {
    let images = get_list(map, KEY_IMAGES)
        .map(|list| {
            list.iter()
                .filter_map(|v| match v {
                    LoroValue::String(s) => Some(s.to_string()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    Some(MessageLayer {
        bounds: bounds_from_loro(map)?,
        fill: fill_from_loro(map),
        content: get_string(map, KEY_CONTENT).unwrap_or_default(),
        task_id: get_string(map, KEY_TASK_ID),
        images,
    })
}

fn image_from_loro(map: &LoroMapValue) -> Option<ImageLayer> {
    let overlay = if get_bool(map, KEY_HAS_OVERLAY).unwrap_or(false) {
        Some(Overlay {
            text: get_string(map, KEY_OVERLAY_TEXT).unwrap_or_default(),
            font_family: get_string(map, KEY_OVERLAY_FONT_FAMILY).unwrap_or_default(),
            font_size: get_double(map, KEY_OVERLAY_FONT_SIZE).unwrap_or(24.0),
            fill: Color::new(
                get_u8(map, KEY_OVERLAY_FILL_R).unwrap_or(0),
                get_u8(map, KEY_OVERLAY_FILL_G).unwrap_or(0),
                get_u8(map, KEY_OVERLAY_FILL_B).unwrap_or(0),
            ),
            offset_x: get_double(map, KEY_OVERLAY_OFFSET_X).unwrap_or(0.0),
            offset_y: get_double(map, KEY_OVERLAY_OFFSET_Y).unwrap_or(0.0),
        })
    } else {
        None
    };

    Some(ImageLayer {
        bounds: bounds_from_loro(map)?,
        fill: fill_from_loro(map),
        src: get_string(map, KEY_SRC).unwrap_or_default(),
        overlay,
    })
}

fn connector_from_loro(map: &LoroMapValue) -> Option<ConnectorLayer> {
    Some(ConnectorLayer {
        start_layer_id: get_string(map, KEY_START_LAYER_ID)?,
        end_layer_id: get_string(map, KEY_END_LAYER_ID)?,
        start_point: Point::new(get_double(map, KEY_START_X)?, get_double(map, KEY_START_Y)?),
        end_point: Point::new(get_double(map, KEY_END_X)?, get_double(map, KEY_END_Y)?),
        fill: fill_from_loro(map),
    })
}
