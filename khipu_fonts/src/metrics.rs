/*! Font metrics as seen by the typesetter: a mapping from code points to advance
   widths in font units, plus a size that scales them to *scaled points*
   (65536sp = 1bp).
 */

use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use crate::standard::StandardFont;

/// Scaled points per big point.
pub const SP_PER_BP: i32 = 65536;

/// The metric information the paragraph builder needs from a font.
pub trait FontMetrics: Send + Sync {
    fn name(&self) -> &str;
    /// Advance width of `c` in font units.
    fn advance(&self, c: char) -> u16;
    fn units_per_em(&self) -> u16 { 1000 }
    /// Height above the baseline, in font units.
    fn ascender(&self) -> i32;
    /// Depth below the baseline, in font units; negative.
    fn descender(&self) -> i32;
}

impl FontMetrics for &'static crate::standard::StandardMetrics {
    fn name(&self) -> &str { (*self).name() }
    fn advance(&self, c: char) -> u16 { (*self).advance(c) }
    fn ascender(&self) -> i32 { (*self).ascender() }
    fn descender(&self) -> i32 { (*self).descender() }
}

/// Every glyph has the same advance. Useful where expected line breaks must be
/// computable by hand.
#[derive(Clone,Copy,Debug)]
pub struct FixedWidthMetrics;
impl FontMetrics for FixedWidthMetrics {
    fn name(&self) -> &str { "fixed-width" }
    fn advance(&self, _c: char) -> u16 { 1000 }
    fn ascender(&self) -> i32 { 750 }
    fn descender(&self) -> i32 { -250 }
}

/// A font at a given size.
#[derive(Clone)]
pub struct Font {
    metrics: Arc<dyn FontMetrics>,
    /// size of one em in scaled points
    size: i32,
}
impl Font {
    pub fn new(metrics: Arc<dyn FontMetrics>, size: i32) -> Self {
        Font { metrics, size }
    }
    /// One of the standard fonts at `size_bp` big points.
    pub fn standard(font: StandardFont, size_bp: i32) -> Self {
        Font::new(Arc::new(font.metrics()), size_bp * SP_PER_BP)
    }
    /// Every glyph is exactly `width` scaled points wide.
    pub fn fixed_width(width: i32) -> Self {
        Font::new(Arc::new(FixedWidthMetrics), width)
    }
    pub fn name(&self) -> &str { self.metrics.name() }
    pub fn size(&self) -> i32 { self.size }
    pub fn metrics(&self) -> &dyn FontMetrics { &*self.metrics }

    fn scale(&self, units: i64) -> i32 {
        let upem = i64::from(self.metrics.units_per_em().max(1));
        (units * i64::from(self.size) / upem).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    }
    /// Advance of `c` in scaled points.
    pub fn advance(&self, c: char) -> i32 {
        self.scale(i64::from(self.metrics.advance(c)))
    }
    /// Sum of the advances of all characters of `text`, in scaled points,
    /// saturating at `i32::MAX`.
    pub fn text_width(&self, text: &str) -> i32 {
        text.chars().fold(0i32, |w, c| w.saturating_add(self.advance(c)))
    }
    pub fn height(&self) -> i32 { self.scale(i64::from(self.metrics.ascender())) }
    pub fn depth(&self) -> i32 { self.scale(-i64::from(self.metrics.descender())) }
}
impl Debug for Font {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f,"<font {} at {}sp>",self.name(),self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaling() {
        let f = Font::standard(StandardFont::Helvetica, 10);
        // 'H' is 722/1000 em
        assert_eq!(f.advance('H'), 722 * 10 * SP_PER_BP / 1000);
        assert_eq!(f.text_width("HH"), 2 * f.advance('H'));
        assert!(f.height() > 0 && f.depth() > 0);
    }

    #[test]
    fn fixed_width() {
        let f = Font::fixed_width(10 * SP_PER_BP);
        assert_eq!(f.advance('W'), 10 * SP_PER_BP);
        assert_eq!(f.advance('i'), 10 * SP_PER_BP);
        assert_eq!(f.text_width("quick"), 50 * SP_PER_BP);
        assert_eq!(f.text_width(&"m".repeat(5000)), i32::MAX);
    }
}
