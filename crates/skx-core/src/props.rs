//! Attribute mappings and the property binder.
//!
//! `Props` keeps attributes in source order with case-insensitive lookup.
//! The binder converts raw strings into typed `SceneNode` fields. Names
//! ignore ASCII case as well as `-` and `_`, so `background-color`,
//! `backgroundColor` and `BACKGROUND_COLOR` are the same property.

use crate::color::{HexLayout, resolve_color};
use crate::id::NodeId;
use crate::model::{Alignment, DEFAULT_FONT_SIZE, NodeKind, SceneNode, WidgetState};
use smallvec::SmallVec;

// ─── Props ───────────────────────────────────────────────────────────────

/// One `name=value` pair as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Ordered attribute mapping. Lookups ignore ASCII case; when a name
/// repeats, the last occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Props {
    attrs: SmallVec<[Attribute; 4]>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attrs.push(Attribute {
            name: name.into(),
            value: value.into(),
        });
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .rev()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    /// Like [`Props::get`], but treats an empty value as absent.
    pub fn get_non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.is_empty())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attrs.iter()
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut props = Props::new();
        for (k, v) in iter {
            props.push(k, v);
        }
        props
    }
}

// ─── Errors ──────────────────────────────────────────────────────────────

/// Why a single property could not be bound. Never escapes a parse: the
/// binder logs it and skips the property.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropertyError {
    #[error("unknown property `{0}`")]
    Unknown(String),
    #[error("property `{name}` expects a number, got {value:?}")]
    InvalidNumber { name: String, value: String },
    #[error("property `{name}` expects a boolean, got {value:?}")]
    InvalidBool { name: String, value: String },
    #[error("property `{name}` expects start/center/end/stretch, got {value:?}")]
    InvalidAlignment { name: String, value: String },
}

// ─── Binder ──────────────────────────────────────────────────────────────

/// Canonical property key: lowercase with `-` and `_` removed.
pub fn canonical_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '-' && *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Bind every attribute onto `node`, logging and skipping failures.
pub fn apply_props(node: &mut SceneNode, props: &Props, layout: HexLayout) {
    apply_props_except(node, props, &[], layout);
}

/// Bind every attribute except those named in `skip` (matched by
/// canonical name). Component factories use this for the attributes they
/// consume themselves.
pub fn apply_props_except(node: &mut SceneNode, props: &Props, skip: &[&str], layout: HexLayout) {
    for attr in props.iter() {
        let key = canonical_name(&attr.name);
        if skip.iter().any(|s| canonical_name(s) == key) {
            continue;
        }
        match apply_property(node, &attr.name, &attr.value, layout) {
            Ok(()) => {}
            Err(PropertyError::Unknown(name)) => {
                log::debug!("dropping unknown property `{name}` on {}", node.id);
            }
            Err(e) => log::warn!("{e} on {}; property skipped", node.id),
        }
    }
}

/// Bind a single property onto `node`.
///
/// # Errors
/// Unknown names and unparseable numbers, booleans or alignments. Colors
/// never fail; they fall back to black.
pub fn apply_property(
    node: &mut SceneNode,
    name: &str,
    value: &str,
    layout: HexLayout,
) -> Result<(), PropertyError> {
    let key = canonical_name(name);
    let raw = value;
    let value = value.trim();
    let (default_w, default_h) = node.kind.default_size();
    let state_defaults = WidgetState::default();

    let number = |default: f32| parse_number(name, value, default);
    let boolean = |default: bool| parse_bool(name, value, default);
    let color = || (!value.is_empty()).then(|| resolve_color(value, layout));
    let handler = || (!value.is_empty()).then(|| value.to_string());
    let alignment = || {
        if value.is_empty() {
            return Ok(Alignment::default());
        }
        Alignment::parse(value).ok_or_else(|| PropertyError::InvalidAlignment {
            name: name.to_string(),
            value: value.to_string(),
        })
    };

    match key.as_str() {
        "id" => {
            if let Some(id) = NodeId::from_attr(value) {
                node.id = id;
            }
        }

        // Geometry
        "x" | "left" => node.x = number(0.0)?,
        "y" | "top" => node.y = number(0.0)?,
        "width" | "w" => node.set_width(number(default_w)?),
        "height" | "h" => node.set_height(number(default_h)?),

        // Style
        "background" | "backgroundcolor" | "bg" | "bgcolor" => node.style.background = color(),
        "bordercolor" | "border" => node.style.border_color = color(),
        "borderwidth" | "borderthickness" | "strokewidth" => {
            node.style.border_width = number(0.0)?.max(0.0);
        }
        "borderradius" | "cornerradius" | "radius" | "corner" => {
            node.style.corner_radius = number(0.0)?.max(0.0);
        }
        "fill" | "fillcolor" => node.style.fill = color(),
        "color" | "textcolor" | "foreground" | "fontcolor" => node.style.text_color = color(),
        "size" | "fontsize" => node.style.font_size = number(DEFAULT_FONT_SIZE)?.max(0.0),

        // Content
        "text" | "content" => node.text = raw.to_string(),
        "src" | "source" | "image" | "imagepath" => node.image_path = value.to_string(),

        // Layout hints
        "visible" => node.layout.visible = boolean(true)?,
        "hidden" => node.layout.visible = !boolean(false)?,
        "align" | "alignment" | "alignitems" => node.layout.align = alignment()?,
        "justify" | "justification" | "justifycontent" => node.layout.justify = alignment()?,
        "margin" => node.layout.margin = number(0.0)?,
        "padding" => node.layout.padding = number(0.0)?,

        // Widget state
        "value" if node.kind == NodeKind::Slider => {
            node.state.current = number(state_defaults.current)?;
        }
        "value" => node.state.value = raw.to_string(),
        "placeholder" | "hint" => node.state.placeholder = raw.to_string(),
        "checked" => node.state.checked = boolean(false)?,
        "selected" => node.state.selected = boolean(false)?,
        "group" | "groupname" | "name" => node.state.group = handler(),
        "min" | "minvalue" | "minimum" => node.state.min = number(state_defaults.min)?,
        "max" | "maxvalue" | "maximum" => node.state.max = number(state_defaults.max)?,
        "current" | "currentvalue" => node.state.current = number(state_defaults.current)?,

        // Events
        "onclick" | "click" => node.handlers.on_click = handler(),
        "onhover" | "hover" | "onmouseenter" => node.handlers.on_hover = handler(),
        "onfocus" | "focus" => node.handlers.on_focus = handler(),
        "onchange" | "change" => node.handlers.on_change = handler(),
        "onblur" | "blur" => node.handlers.on_blur = handler(),

        _ => return Err(PropertyError::Unknown(name.to_string())),
    }
    Ok(())
}

/// Parse a float, accepting an optional `px` suffix. Empty means `default`.
fn parse_number(name: &str, value: &str, default: f32) -> Result<f32, PropertyError> {
    if value.is_empty() {
        return Ok(default);
    }
    let digits = value.strip_suffix("px").unwrap_or(value).trim();
    digits
        .parse::<f32>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| PropertyError::InvalidNumber {
            name: name.to_string(),
            value: value.to_string(),
        })
}

fn parse_bool(name: &str, value: &str, default: bool) -> Result<bool, PropertyError> {
    if value.is_empty() {
        return Ok(default);
    }
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(PropertyError::InvalidBool {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}
