//! Symbolic anchor to page coordinate resolution.
//!
//! Coordinates use the PDF convention: origin at the bottom-left corner of the
//! page, y increasing upward. The resolved point is the lower-left corner of
//! the placed object.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Default distance from the page edge, in points
pub const DEFAULT_MARGIN: f32 = 50.0;

/// One of the nine placement anchors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Anchor {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    #[default]
    Center,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Horizontal {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Vertical {
    Top,
    Middle,
    Bottom,
}

impl Anchor {
    /// All anchors, row by row from the top
    pub const ALL: [Anchor; 9] = [
        Anchor::TopLeft,
        Anchor::TopCenter,
        Anchor::TopRight,
        Anchor::MiddleLeft,
        Anchor::Center,
        Anchor::MiddleRight,
        Anchor::BottomLeft,
        Anchor::BottomCenter,
        Anchor::BottomRight,
    ];

    /// Parse an anchor name. Unknown names fall back to `Center`.
    ///
    /// Accepts `-`, `_` or spaces as separators and either word order
    /// (`left-top`). The first word for an axis wins. A name that fixes only
    /// one axis must complete it with `middle` or `center` (`top-middle`,
    /// `center-right`); a lone `top` or `right` is unknown.
    pub fn parse(name: &str) -> Self {
        let normalized = name.trim().to_lowercase().replace(['_', ' '], "-");
        let mut vertical = None;
        let mut horizontal = None;
        let mut centered = false;

        for word in normalized.split('-').filter(|w| !w.is_empty()) {
            match word {
                "top" => {
                    vertical.get_or_insert(Vertical::Top);
                }
                "bottom" => {
                    vertical.get_or_insert(Vertical::Bottom);
                }
                "left" => {
                    horizontal.get_or_insert(Horizontal::Left);
                }
                "right" => {
                    horizontal.get_or_insert(Horizontal::Right);
                }
                "middle" | "center" | "centre" => centered = true,
                other => {
                    tracing::debug!("Unknown anchor {:?} (word {:?}), using center", name, other);
                    return Anchor::Center;
                }
            }
        }

        match (vertical, horizontal) {
            (Some(v), Some(h)) => Self::from_parts(v, h),
            (Some(v), None) if centered => Self::from_parts(v, Horizontal::Center),
            (None, Some(h)) if centered => Self::from_parts(Vertical::Middle, h),
            (None, None) if centered => Anchor::Center,
            _ => {
                tracing::debug!("Incomplete anchor {:?}, using center", name);
                Anchor::Center
            }
        }
    }

    fn from_parts(vertical: Vertical, horizontal: Horizontal) -> Self {
        match (vertical, horizontal) {
            (Vertical::Top, Horizontal::Left) => Anchor::TopLeft,
            (Vertical::Top, Horizontal::Center) => Anchor::TopCenter,
            (Vertical::Top, Horizontal::Right) => Anchor::TopRight,
            (Vertical::Middle, Horizontal::Left) => Anchor::MiddleLeft,
            (Vertical::Middle, Horizontal::Center) => Anchor::Center,
            (Vertical::Middle, Horizontal::Right) => Anchor::MiddleRight,
            (Vertical::Bottom, Horizontal::Left) => Anchor::BottomLeft,
            (Vertical::Bottom, Horizontal::Center) => Anchor::BottomCenter,
            (Vertical::Bottom, Horizontal::Right) => Anchor::BottomRight,
        }
    }

    fn parts(self) -> (Vertical, Horizontal) {
        match self {
            Anchor::TopLeft => (Vertical::Top, Horizontal::Left),
            Anchor::TopCenter => (Vertical::Top, Horizontal::Center),
            Anchor::TopRight => (Vertical::Top, Horizontal::Right),
            Anchor::MiddleLeft => (Vertical::Middle, Horizontal::Left),
            Anchor::Center => (Vertical::Middle, Horizontal::Center),
            Anchor::MiddleRight => (Vertical::Middle, Horizontal::Right),
            Anchor::BottomLeft => (Vertical::Bottom, Horizontal::Left),
            Anchor::BottomCenter => (Vertical::Bottom, Horizontal::Center),
            Anchor::BottomRight => (Vertical::Bottom, Horizontal::Right),
        }
    }

    /// Canonical name used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Anchor::TopLeft => "top-left",
            Anchor::TopCenter => "top-center",
            Anchor::TopRight => "top-right",
            Anchor::MiddleLeft => "middle-left",
            Anchor::Center => "center",
            Anchor::MiddleRight => "middle-right",
            Anchor::BottomLeft => "bottom-left",
            Anchor::BottomCenter => "bottom-center",
            Anchor::BottomRight => "bottom-right",
        }
    }

    /// Anchor used for page numbers when none is given
    pub fn bottom_center() -> Self {
        Anchor::BottomCenter
    }
}

impl Serialize for Anchor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Anchor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Anchor::parse(&name))
    }
}

/// Resolve an anchor to the lower-left corner of an object of the given size.
pub fn resolve(
    anchor: Anchor,
    width: f32,
    height: f32,
    page_width: f32,
    page_height: f32,
    margin: f32,
) -> (f32, f32) {
    let (vertical, horizontal) = anchor.parts();

    let x = match horizontal {
        Horizontal::Left => margin,
        Horizontal::Center => (page_width - width) / 2.0,
        Horizontal::Right => page_width - width - margin,
    };
    let y = match vertical {
        Vertical::Bottom => margin,
        Vertical::Middle => (page_height - height) / 2.0,
        Vertical::Top => page_height - height - margin,
    };

    (x, y)
}
