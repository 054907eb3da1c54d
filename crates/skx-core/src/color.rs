//! Color values and the soft color resolver used by the property binder.
//!
//! Accepted spellings: palette names (`red`, `SlateGray`), hex
//! (`#RGB`, `#RRGGBB`, eight-digit with alpha), and the CSS functions
//! `rgb(r, g, b)` / `rgba(r, g, b, a)` where `a` is a 0–1 float.
//! Anything else resolves to opaque black and logs a warning.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// 8-bit straight-alpha RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Channel order of eight-digit hex literals.
///
/// Markup attributes follow the `#AARRGGBB` convention; JSON scene
/// literals use `#RRGGBBAA`. Three- and six-digit forms are unaffected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HexLayout {
    #[default]
    Argb,
    Rgba,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RGB`, `#RRGGBB` or an eight-digit literal in `layout` order.
    /// The leading `#` is optional.
    pub fn from_hex(hex: &str, layout: HexLayout) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        match bytes.len() {
            3 => {
                let r = hex_val(bytes[0])?;
                let g = hex_val(bytes[1])?;
                let b = hex_val(bytes[2])?;
                Some(Self::rgb(r * 17, g * 17, b * 17))
            }
            6 => Some(Self::rgb(
                hex_byte(bytes[0], bytes[1])?,
                hex_byte(bytes[2], bytes[3])?,
                hex_byte(bytes[4], bytes[5])?,
            )),
            8 => {
                let c0 = hex_byte(bytes[0], bytes[1])?;
                let c1 = hex_byte(bytes[2], bytes[3])?;
                let c2 = hex_byte(bytes[4], bytes[5])?;
                let c3 = hex_byte(bytes[6], bytes[7])?;
                Some(match layout {
                    HexLayout::Argb => Self::rgba(c1, c2, c3, c0),
                    HexLayout::Rgba => Self::rgba(c0, c1, c2, c3),
                })
            }
            _ => None,
        }
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    /// Parse `rgb(r, g, b)` or `rgba(r, g, b, a)` (function name case-insensitive).
    ///
    /// Channels are clamped to 0–255; alpha is a 0–1 float scaled to a byte.
    pub fn from_css_function(s: &str) -> Option<Self> {
        let s = s.trim();
        let open = s.find('(')?;
        let name = s[..open].trim().to_ascii_lowercase();
        let args = s[open + 1..].strip_suffix(')')?;
        let parts: Vec<&str> = args.split(',').map(str::trim).collect();

        let channel = |p: &str| -> Option<u8> {
            let v: f32 = p.parse().ok()?;
            Some(v.clamp(0.0, 255.0).round() as u8)
        };

        match (name.as_str(), parts.as_slice()) {
            ("rgb", [r, g, b]) => Some(Self::rgb(channel(r)?, channel(g)?, channel(b)?)),
            ("rgba", [r, g, b, a]) => {
                let alpha: f32 = a.parse().ok()?;
                let alpha = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
                Some(Self::rgba(channel(r)?, channel(g)?, channel(b)?, alpha))
            }
            _ => None,
        }
    }

    /// Look up a palette name, ignoring ASCII case.
    pub fn named(name: &str) -> Option<Self> {
        let name = name.trim();
        NAMED_COLORS
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|&(_, c)| c)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        try_resolve_color(&s, HexLayout::Rgba)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color {s:?}")))
    }
}

/// Resolve a color string strictly; `None` when no spelling matches.
pub fn try_resolve_color(value: &str, layout: HexLayout) -> Option<Color> {
    let value = value.trim();
    if value.starts_with('#') {
        Color::from_hex(value, layout)
    } else if value.get(..3).is_some_and(|p| p.eq_ignore_ascii_case("rgb")) {
        Color::from_css_function(value)
    } else {
        Color::named(value)
    }
}

/// Resolve a color string, falling back to opaque black.
pub fn resolve_color(value: &str, layout: HexLayout) -> Color {
    try_resolve_color(value, layout).unwrap_or_else(|| {
        log::warn!("unrecognized color {value:?}, using black");
        Color::BLACK
    })
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

fn hex_byte(hi: u8, lo: u8) -> Option<u8> {
    Some(hex_val(hi)? << 4 | hex_val(lo)?)
}

/// Palette names (CSS named colors subset).
static NAMED_COLORS: &[(&str, Color)] = &[
    ("transparent", Color::TRANSPARENT),
    ("black", Color::rgb(0, 0, 0)),
    ("white", Color::rgb(255, 255, 255)),
    ("red", Color::rgb(255, 0, 0)),
    ("green", Color::rgb(0, 128, 0)),
    ("blue", Color::rgb(0, 0, 255)),
    ("yellow", Color::rgb(255, 255, 0)),
    ("cyan", Color::rgb(0, 255, 255)),
    ("aqua", Color::rgb(0, 255, 255)),
    ("magenta", Color::rgb(255, 0, 255)),
    ("fuchsia", Color::rgb(255, 0, 255)),
    ("gray", Color::rgb(128, 128, 128)),
    ("grey", Color::rgb(128, 128, 128)),
    ("darkgray", Color::rgb(169, 169, 169)),
    ("darkgrey", Color::rgb(169, 169, 169)),
    ("lightgray", Color::rgb(211, 211, 211)),
    ("lightgrey", Color::rgb(211, 211, 211)),
    ("dimgray", Color::rgb(105, 105, 105)),
    ("silver", Color::rgb(192, 192, 192)),
    ("gainsboro", Color::rgb(220, 220, 220)),
    ("whitesmoke", Color::rgb(245, 245, 245)),
    ("slategray", Color::rgb(112, 128, 144)),
    ("darkslategray", Color::rgb(47, 79, 79)),
    ("maroon", Color::rgb(128, 0, 0)),
    ("darkred", Color::rgb(139, 0, 0)),
    ("crimson", Color::rgb(220, 20, 60)),
    ("firebrick", Color::rgb(178, 34, 34)),
    ("tomato", Color::rgb(255, 99, 71)),
    ("coral", Color::rgb(255, 127, 80)),
    ("salmon", Color::rgb(250, 128, 114)),
    ("orange", Color::rgb(255, 165, 0)),
    ("darkorange", Color::rgb(255, 140, 0)),
    ("gold", Color::rgb(255, 215, 0)),
    ("khaki", Color::rgb(240, 230, 140)),
    ("olive", Color::rgb(128, 128, 0)),
    ("lime", Color::rgb(0, 255, 0)),
    ("limegreen", Color::rgb(50, 205, 50)),
    ("lightgreen", Color::rgb(144, 238, 144)),
    ("darkgreen", Color::rgb(0, 100, 0)),
    ("seagreen", Color::rgb(46, 139, 87)),
    ("teal", Color::rgb(0, 128, 128)),
    ("turquoise", Color::rgb(64, 224, 208)),
    ("lightblue", Color::rgb(173, 216, 230)),
    ("skyblue", Color::rgb(135, 206, 235)),
    ("steelblue", Color::rgb(70, 130, 180)),
    ("royalblue", Color::rgb(65, 105, 225)),
    ("dodgerblue", Color::rgb(30, 144, 255)),
    ("navy", Color::rgb(0, 0, 128)),
    ("darkblue", Color::rgb(0, 0, 139)),
    ("indigo", Color::rgb(75, 0, 130)),
    ("purple", Color::rgb(128, 0, 128)),
    ("violet", Color::rgb(238, 130, 238)),
    ("orchid", Color::rgb(218, 112, 214)),
    ("plum", Color::rgb(221, 160, 221)),
    ("pink", Color::rgb(255, 192, 203)),
    ("hotpink", Color::rgb(255, 105, 180)),
    ("brown", Color::rgb(165, 42, 42)),
    ("chocolate", Color::rgb(210, 105, 30)),
    ("tan", Color::rgb(210, 180, 140)),
    ("beige", Color::rgb(245, 245, 220)),
    ("ivory", Color::rgb(255, 255, 240)),
];
