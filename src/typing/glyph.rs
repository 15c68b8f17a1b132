use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;

/// Weight/slant of a glyph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlyphStyle {
    #[default]
    Plain,
    Bold,
    Italic,
}

impl GlyphStyle {
    pub const ALL: [GlyphStyle; 3] = [GlyphStyle::Plain, GlyphStyle::Bold, GlyphStyle::Italic];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Plain => "Plain",
            Self::Bold => "Bold",
            Self::Italic => "Italic",
        }
    }
}

/// One styled character of the typing document.
///
/// Deserialization goes through [`RawGlyph`], so a record with a multi-char
/// string or a non-positive size never becomes a `Glyph`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawGlyph")]
pub struct Glyph {
    #[serde(rename = "char")]
    pub ch: char,
    pub size: u32,
    pub style: GlyphStyle,
}

impl Glyph {
    pub fn new(ch: char, size: u32, style: GlyphStyle) -> Self {
        Self { ch, size, style }
    }

    pub fn line_style(&self) -> LineStyle {
        LineStyle {
            size: self.size,
            style: self.style,
        }
    }
}

/// Glyph as it appears on disk, before validation
#[derive(Debug, Deserialize)]
pub struct RawGlyph {
    #[serde(rename = "char")]
    ch: String,
    size: i64,
    style: GlyphStyle,
}

impl TryFrom<RawGlyph> for Glyph {
    type Error = PersistenceError;

    fn try_from(raw: RawGlyph) -> Result<Self, Self::Error> {
        let mut chars = raw.ch.chars();
        let ch = match (chars.next(), chars.next()) {
            (Some(ch), None) => ch,
            _ => {
                return Err(PersistenceError::InvalidRecord(format!(
                    "glyph must be exactly one character, got {:?}",
                    raw.ch
                )));
            }
        };
        let size = u32::try_from(raw.size)
            .ok()
            .filter(|size| *size > 0)
            .ok_or_else(|| {
                PersistenceError::InvalidRecord(format!("glyph size must be positive, got {}", raw.size))
            })?;
        Ok(Self {
            ch,
            size,
            style: raw.style,
        })
    }
}

/// Size/style pair remembered per row and used for the current selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineStyle {
    pub size: u32,
    pub style: GlyphStyle,
}

impl LineStyle {
    pub fn new(size: u32, style: GlyphStyle) -> Self {
        Self { size, style }
    }

    pub fn glyph(&self, ch: char) -> Glyph {
        Glyph::new(ch, self.size, self.style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyph_wire_format() {
        let glyph = Glyph::new('a', 25, GlyphStyle::Bold);
        let json = serde_json::to_string(&glyph).unwrap();
        assert_eq!(json, r#"{"char":"a","size":25,"style":"bold"}"#);
        let parsed: Glyph = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, glyph);
    }

    #[test]
    fn test_invalid_glyphs_rejected() {
        for json in [
            r#"{"char":"ab","size":25,"style":"plain"}"#,
            r#"{"char":"","size":25,"style":"plain"}"#,
            r#"{"char":"a","size":0,"style":"plain"}"#,
            r#"{"char":"a","size":-4,"style":"plain"}"#,
            r#"{"char":"a","size":25,"style":"wavy"}"#,
            r#"{"char":"a","style":"plain"}"#,
        ] {
            assert!(serde_json::from_str::<Glyph>(json).is_err(), "accepted {json}");
        }
    }

    #[test]
    fn test_non_ascii_char_accepted() {
        let parsed: Glyph = serde_json::from_str(r#"{"char":"é","size":50,"style":"italic"}"#).unwrap();
        assert_eq!(parsed.ch, 'é');
        assert_eq!(parsed.line_style(), LineStyle::new(50, GlyphStyle::Italic));
    }
}
