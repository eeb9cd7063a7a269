//! Style descriptors and the fixed registry of style slots.
//!
//! Every semantic role (body text, heading levels, code, quotes, links,
//! table header/body) has one [`Style`]. The registry is configured once
//! before rendering and only read afterwards; frames hold their own copies.

use serde::{Deserialize, Serialize};

/// Bitset of font style flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FontFlags(u8);

impl FontFlags {
    pub const NONE: Self = Self(0);
    pub const BOLD: Self = Self(1);
    pub const ITALIC: Self = Self(1 << 1);

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub const fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    #[must_use]
    pub const fn with(mut self, other: Self) -> Self {
        self.insert(other);
        self
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for FontFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.contains(Self::BOLD) {
            f.write_str("b")?;
        }
        if self.contains(Self::ITALIC) {
            f.write_str("i")?;
        }
        Ok(())
    }
}

impl From<FontFlags> for String {
    fn from(flags: FontFlags) -> Self {
        flags.to_string()
    }
}

impl TryFrom<String> for FontFlags {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let mut flags = Self::NONE;
        for ch in value.chars() {
            match ch.to_ascii_lowercase() {
                'b' => flags.insert(Self::BOLD),
                'i' => flags.insert(Self::ITALIC),
                other => return Err(format!("unknown font style flag '{other}'")),
            }
        }
        Ok(flags)
    }
}

/// Font family used for measurement and emission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    #[default]
    Sans,
    Serif,
    Mono,
}

/// RGB color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Self = Self(0, 0, 0);
    pub const WHITE: Self = Self(255, 255, 255);
}

/// A text style: font, flags, size and line spacing (points).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    pub family: FontFamily,
    pub flags: FontFlags,
    pub size: f64,
    pub spacing: f64,
    pub text_color: Rgb,
    pub fill_color: Rgb,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            family: FontFamily::Sans,
            flags: FontFlags::NONE,
            size: 12.0,
            spacing: 2.0,
            text_color: Rgb::BLACK,
            fill_color: Rgb::WHITE,
        }
    }
}

impl Style {
    /// Height of one line of text in this style.
    pub fn line_height(&self) -> f64 {
        self.size + self.spacing
    }

    const fn sized(flags: FontFlags, size: f64, spacing: f64) -> Self {
        Self {
            family: FontFamily::Sans,
            flags,
            size,
            spacing,
            text_color: Rgb::BLACK,
            fill_color: Rgb::WHITE,
        }
    }
}

/// The style registry: one style per semantic role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleSheet {
    pub normal: Style,
    pub link: Style,
    pub code: Style,
    pub blockquote: Style,
    pub headings: [Style; 6],
    pub table_header: Style,
    pub table_body: Style,
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self {
            normal: Style::default(),
            link: Style {
                flags: FontFlags::BOLD,
                text_color: Rgb(0, 0, 255),
                ..Style::default()
            },
            code: Style {
                family: FontFamily::Mono,
                text_color: Rgb(37, 27, 14),
                fill_color: Rgb(200, 200, 200),
                ..Style::default()
            },
            blockquote: Style {
                flags: FontFlags::ITALIC,
                ..Style::default()
            },
            headings: [
                Style::sized(FontFlags::BOLD, 24.0, 5.0),
                Style::sized(FontFlags::BOLD, 22.0, 5.0),
                Style::sized(FontFlags::BOLD, 20.0, 5.0),
                Style::sized(FontFlags::BOLD, 18.0, 5.0),
                Style::sized(FontFlags::BOLD, 16.0, 5.0),
                Style::sized(FontFlags::BOLD, 14.0, 5.0),
            ],
            table_header: Style {
                flags: FontFlags::BOLD,
                fill_color: Rgb(180, 180, 180),
                ..Style::default()
            },
            table_body: Style {
                fill_color: Rgb(240, 240, 240),
                ..Style::default()
            },
        }
    }
}

impl StyleSheet {
    /// Style for heading `level` (1-6; out-of-range levels are clamped).
    pub fn heading(&self, level: u8) -> Style {
        let index = usize::from(level.clamp(1, 6)) - 1;
        self.headings[index]
    }

    /// Load a style sheet from JSON. Missing slots keep their defaults.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed or a field has the wrong type.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_insert_is_idempotent() {
        let mut flags = FontFlags::NONE;
        flags.insert(FontFlags::ITALIC);
        flags.insert(FontFlags::ITALIC);
        assert!(flags.contains(FontFlags::ITALIC));
        flags.remove(FontFlags::ITALIC);
        assert!(flags.is_empty());
    }

    #[test]
    fn test_flags_string_round_trip() {
        let flags = FontFlags::BOLD.with(FontFlags::ITALIC);
        assert_eq!(flags.to_string(), "bi");
        assert_eq!(FontFlags::try_from("IB".to_string()), Ok(flags));
        assert!(FontFlags::try_from("bx".to_string()).is_err());
    }

    #[test]
    fn test_heading_levels_shrink() {
        let sheet = StyleSheet::default();
        assert!((sheet.heading(1).size - 24.0).abs() < f64::EPSILON);
        assert!((sheet.heading(6).size - 14.0).abs() < f64::EPSILON);
        assert_eq!(sheet.heading(9), sheet.heading(6));
        assert_eq!(sheet.heading(0), sheet.heading(1));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let sheet = StyleSheet::from_json(r#"{ "normal": { "size": 10, "flags": "i" } }"#).unwrap();
        assert!((sheet.normal.size - 10.0).abs() < f64::EPSILON);
        assert!((sheet.normal.spacing - 2.0).abs() < f64::EPSILON);
        assert!(sheet.normal.flags.contains(FontFlags::ITALIC));
        assert_eq!(sheet.code, StyleSheet::default().code);
    }

    #[test]
    fn test_copy_does_not_touch_registry() {
        let sheet = StyleSheet::default();
        let mut local = sheet.normal;
        local.flags.insert(FontFlags::BOLD);
        assert!(sheet.normal.flags.is_empty());
    }
}
