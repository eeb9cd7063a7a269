//! Paper sizes and orientation.

use serde::{Deserialize, Serialize};

/// Default margin on every side: one centimetre, in points.
pub const DEFAULT_MARGIN: f64 = 28.35;

#[derive(clap::ValueEnum, Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    #[default]
    A4,
    Letter,
    Legal,
}

impl PageSize {
    /// Portrait width and height in points.
    pub const fn dimensions(self) -> (f64, f64) {
        match self {
            Self::A4 => (595.28, 841.89),
            Self::Letter => (612.0, 792.0),
            Self::Legal => (612.0, 1008.0),
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "a4" => Some(Self::A4),
            "letter" => Some(Self::Letter),
            "legal" => Some(Self::Legal),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A4 => "a4",
            Self::Letter => "letter",
            Self::Legal => "legal",
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    /// Width and height of `size` in this orientation.
    pub const fn apply(self, size: PageSize) -> (f64, f64) {
        let (width, height) = size.dimensions();
        match self {
            Self::Portrait => (width, height),
            Self::Landscape => (height, width),
        }
    }
}
