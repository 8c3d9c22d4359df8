/*! The shaping boundary. A [`Shaper`] turns a run of text in one font into
   positioned glyphs; the typesetter only ever looks at the resulting advances.
 */

use crate::metrics::Font;

/// Writing direction of a text run.
#[derive(Clone,Copy,Debug,PartialEq,Eq,Default)]
pub enum Direction {
    #[default]
    LeftToRight,
    RightToLeft,
}

/// One shaped glyph. All measures are in scaled points.
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub struct GlyphInfo {
    pub codepoint: char,
    /// byte offset of the cluster this glyph belongs to
    pub cluster: usize,
    pub x_advance: i32,
    pub y_advance: i32,
    pub x_offset: i32,
    pub y_offset: i32,
}

pub trait Shaper {
    /// Shape `text` in logical order.
    fn shape(&self, font: &Font, text: &str, direction: Direction, script: &str) -> Vec<GlyphInfo>;

    /// Total horizontal advance of `text`, saturating at the bounds of `i32`.
    fn width(&self, font: &Font, text: &str, direction: Direction, script: &str) -> i32 {
        self.shape(font, text, direction, script).iter().fold(0i32, |w, g| w.saturating_add(g.x_advance))
    }
}

/// One glyph per character, no kerning, no ligatures.
#[derive(Clone,Copy,Debug,Default)]
pub struct SimpleShaper;
impl Shaper for SimpleShaper {
    fn shape(&self, font: &Font, text: &str, direction: Direction, script: &str) -> Vec<GlyphInfo> {
        log::trace!(target:"shaper","shaping {:?} ({:?}, {}) in {:?}",text,direction,script,font);
        text.char_indices().map(|(cluster,codepoint)| GlyphInfo {
            codepoint, cluster,
            x_advance: font.advance(codepoint),
            y_advance: 0, x_offset: 0, y_offset: 0,
        }).collect()
    }
}
