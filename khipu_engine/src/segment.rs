/*! Segmentation of paragraph text at break opportunities.

   A [`UnicodeBreaker`] knows where, according to some rule set, a line may
   (or must, or must not) be broken; it reports these opportunities as
   [`Break`]s, i.e. byte offsets with a penalty. The [`Segmenter`] combines a
   *primary* breaker (line wrap opportunities after UAX #14) with a
   *secondary* one (the borders of whitespace spans) and yields the text
   between any two adjacent boundaries of either breaker as a [`Segment`]
   carrying both breakers' penalties.

   Everything is lazy: segments are produced one at a time, sequences end
   with the text and cannot be restarted. Segmenters keep no state between
   texts.
 */

use std::fmt::{Debug, Formatter};
use std::iter::Peekable;
use arrayvec::ArrayVec;
use icu_segmenter::{LineSegmenter, LineSegmenterBorrowed};
use icu_segmenter::options::LineBreakOptions;
use unicode_segmentation::UnicodeSegmentation;
use crate::khipu::knots::{PENALTY_FORCE, PENALTY_INFINITY};

/// A break is mandatory here.
pub const PENALTY_MANDATORY: i32 = PENALTY_FORCE;
/// A break is allowed here.
pub const PENALTY_ALLOWED: i32 = 0;
/// A break is not allowed here.
pub const PENALTY_PROHIBITED: i32 = PENALTY_INFINITY;
/// The breaker has no opinion on this boundary.
pub const PENALTY_NONE: i32 = 0;
/// Boundary at the start of a whitespace span.
pub const PENALTY_BEFORE_WHITESPACE: i32 = 1000;
/// Boundary at the end of a whitespace span.
pub const PENALTY_AFTER_WHITESPACE: i32 = -50;

/// Segments longer than this (in bytes) are split without regard to break opportunities.
pub const MAX_SEGMENT_LEN: usize = 64 * 1024;

/// A break opportunity: byte offset into the text and the penalty for breaking there.
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub struct Break {
    pub offset:usize,
    pub penalty:i32,
}

/// A source of break opportunities.
pub trait UnicodeBreaker {
    fn name(&self) -> &'static str;
    /// The break opportunities of `text` in ascending order. Offset 0 is never
    /// reported.
    fn breaks<'t>(&'t self,text:&'t str) -> Box<dyn Iterator<Item=Break> + 't>;
}

/// Line wrap opportunities after UAX #14, from ICU4X's compiled data.
/// Breaks after hard line breaks and at the end of the text are mandatory,
/// all others are allowed.
pub struct LineWrap { segmenter:LineSegmenterBorrowed<'static> }
impl LineWrap {
    pub fn new() -> Self {
        LineWrap { segmenter:LineSegmenter::new_for_non_complex_scripts(LineBreakOptions::default()) }
    }
}
impl Default for LineWrap {
    fn default() -> Self { Self::new() }
}
impl Debug for LineWrap {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { f.write_str("LineWrap") }
}

/// Classes BK, CR, LF and NL of UAX #14.
fn is_hard_break(c:char) -> bool {
    matches!(c,'\n' | '\r' | '\u{000B}' | '\u{000C}' | '\u{0085}' | '\u{2028}' | '\u{2029}')
}
/// Classes GL, WJ and ZWJ, after which ICU4X occasionally reports an opportunity
/// (unicode-org/icu4x#4146).
fn is_glue(c:char) -> bool {
    matches!(c,'\u{00A0}' | '\u{2007}' | '\u{202F}' | '\u{2060}' | '\u{FEFF}' | '\u{200D}')
}

impl UnicodeBreaker for LineWrap {
    fn name(&self) -> &'static str { "linewrap" }
    fn breaks<'t>(&'t self, text: &'t str) -> Box<dyn Iterator<Item=Break> + 't> {
        Box::new(self.segmenter.segment_str(text).filter_map(move |offset| {
            let c = text[..offset].chars().next_back()?;
            if offset == text.len() || is_hard_break(c) {
                Some(Break { offset, penalty:PENALTY_MANDATORY })
            } else if is_glue(c) {
                None
            } else {
                Some(Break { offset, penalty:PENALTY_ALLOWED })
            }
        }))
    }
}

/// Reports the borders of whitespace spans: [`PENALTY_BEFORE_WHITESPACE`] where a span
/// starts, [`PENALTY_AFTER_WHITESPACE`] where it ends, and [`PENALTY_NONE`] at the
/// end of text not preceded by whitespace.
#[derive(Clone,Copy,Debug,Default)]
pub struct WhitespaceBreaker;
impl UnicodeBreaker for WhitespaceBreaker {
    fn name(&self) -> &'static str { "whitespace" }
    fn breaks<'t>(&'t self, text: &'t str) -> Box<dyn Iterator<Item=Break> + 't> {
        let mut chars = text.char_indices();
        let mut in_space = false;
        let mut done = text.is_empty();
        Box::new(std::iter::from_fn(move || {
            for (offset,c) in chars.by_ref() {
                let space = c.is_whitespace();
                if space != in_space {
                    in_space = space;
                    if offset > 0 {
                        let penalty = if space { PENALTY_BEFORE_WHITESPACE } else { PENALTY_AFTER_WHITESPACE };
                        return Some(Break { offset, penalty })
                    }
                }
            }
            if done { return None }
            done = true;
            Some(Break { offset:text.len(), penalty:if in_space { PENALTY_AFTER_WHITESPACE } else { PENALTY_NONE } })
        }))
    }
}

/// Word boundaries after UAX #29. Every boundary is an allowed break.
#[derive(Clone,Copy,Debug,Default)]
pub struct WordBreaker;
impl WordBreaker {
    /// The pieces between word boundaries, with their byte offsets; words as
    /// well as the punctuation and spaces between them.
    pub fn words<'t>(&self,text:&'t str) -> impl Iterator<Item=(usize,&'t str)> + 't {
        text.split_word_bound_indices()
    }
}
impl UnicodeBreaker for WordBreaker {
    fn name(&self) -> &'static str { "word" }
    fn breaks<'t>(&'t self, text: &'t str) -> Box<dyn Iterator<Item=Break> + 't> {
        Box::new(self.words(text).map(|(o,w)| Break { offset:o + w.len(), penalty:PENALTY_ALLOWED }))
    }
}

/// A piece of text between two adjacent break opportunities, with the
/// penalties both breakers assign to its end.
#[derive(Clone,Debug,PartialEq,Eq)]
pub struct Segment<'t> {
    text:&'t str,
    start:usize,
    penalties:ArrayVec<i32,2>,
}
impl<'t> Segment<'t> {
    pub fn text(&self) -> &'t str { self.text }
    pub fn bytes(&self) -> &'t [u8] { self.text.as_bytes() }
    /// Byte offset of the segment in the segmented text.
    pub fn start(&self) -> usize { self.start }
    pub fn end(&self) -> usize { self.start + self.text.len() }
    pub fn penalties(&self) -> &[i32] { &self.penalties }
    pub fn primary(&self) -> i32 { self.penalties.first().copied().unwrap_or(PENALTY_PROHIBITED) }
    pub fn secondary(&self) -> i32 { self.penalties.get(1).copied().unwrap_or(PENALTY_NONE) }
    /// The combined opinion of both breakers on breaking after this segment:
    /// any mandatory break wins, then any prohibition, then the primary breaker.
    pub fn verdict(&self) -> i32 {
        if self.penalties.iter().any(|p| *p <= PENALTY_MANDATORY) { PENALTY_MANDATORY }
        else if self.penalties.iter().any(|p| *p >= PENALTY_PROHIBITED) { PENALTY_PROHIBITED }
        else { self.primary() }
    }
    pub fn is_whitespace(&self) -> bool { self.text.chars().all(char::is_whitespace) }
}

/// Combines a primary and a secondary [`UnicodeBreaker`].
pub struct Segmenter {
    primary:Box<dyn UnicodeBreaker>,
    secondary:Box<dyn UnicodeBreaker>,
    max_len:usize,
}
impl Default for Segmenter {
    fn default() -> Self { Self::new() }
}
impl Debug for Segmenter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f,"Segmenter({} + {})",self.primary.name(),self.secondary.name())
    }
}
impl Segmenter {
    /// UAX #14 line wrapping plus whitespace spans.
    pub fn new() -> Self {
        Self::with_breakers(Box::new(LineWrap::new()),Box::new(WhitespaceBreaker))
    }
    pub fn with_breakers(primary:Box<dyn UnicodeBreaker>,secondary:Box<dyn UnicodeBreaker>) -> Self {
        Segmenter { primary, secondary, max_len:MAX_SEGMENT_LEN }
    }
    /// Changes the length above which segments are force-split.
    pub fn with_max_len(mut self,max_len:usize) -> Self {
        self.max_len = max_len.max(4);
        self
    }
    /// The segments of `text`; they borrow the text only, not the segmenter.
    pub fn segments<'s,'t:'s>(&'s self,text:&'t str) -> Segments<'s,'t> {
        log::trace!(target:"segment","segmenting {} bytes with {:?}",text.len(),self);
        Segments {
            text, start:0, max_len:self.max_len,
            primary:self.primary.breaks(text).peekable(),
            secondary:self.secondary.breaks(text).peekable(),
        }
    }
}

/// The [`Segment`]s of a text; see [`Segmenter::segments`].
pub struct Segments<'s,'t:'s> {
    text:&'t str,
    start:usize,
    max_len:usize,
    primary:Peekable<Box<dyn Iterator<Item=Break> + 's>>,
    secondary:Peekable<Box<dyn Iterator<Item=Break> + 's>>,
}
impl<'s,'t:'s> Segments<'s,'t> {
    fn segment(&mut self,end:usize,primary:i32,secondary:i32) -> Segment<'t> {
        let mut penalties = ArrayVec::new();
        penalties.push(primary);
        penalties.push(secondary);
        let seg = Segment { text:&self.text[self.start..end], start:self.start, penalties };
        self.start = end;
        seg
    }
}
impl<'s,'t:'s> Iterator for Segments<'s,'t> {
    type Item = Segment<'t>;
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.start >= self.text.len() { return None }
            let p = self.primary.peek().map(|b| b.offset);
            let s = self.secondary.peek().map(|b| b.offset);
            let end = match (p,s) {
                (Some(p),Some(s)) => p.min(s),
                (Some(o),None) | (None,Some(o)) => o,
                (None,None) => self.text.len()
            }.min(self.text.len());
            if end > self.start + self.max_len {
                let mut cut = self.start + self.max_len;
                while !self.text.is_char_boundary(cut) { cut -= 1 }
                log::debug!(target:"segment","force-splitting overlong segment at {}",cut);
                return Some(self.segment(cut,PENALTY_PROHIBITED,PENALTY_NONE))
            }
            let primary = if p == Some(end) { self.primary.next().map(|b| b.penalty) } else { None };
            let secondary = if s == Some(end) { self.secondary.next().map(|b| b.penalty) } else { None };
            if end <= self.start { continue }
            return Some(self.segment(end,primary.unwrap_or(PENALTY_PROHIBITED),secondary.unwrap_or(PENALTY_NONE)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(text:&str) -> Vec<(String,i32,i32)> {
        let s = Segmenter::new();
        s.segments(text).map(|s| (s.text().to_string(),s.primary(),s.secondary())).collect()
    }

    #[test]
    fn hello_world() {
        assert_eq!(collect("Hello world!"), vec![
            ("Hello".to_string(), PENALTY_PROHIBITED, PENALTY_BEFORE_WHITESPACE),
            (" ".to_string(), PENALTY_ALLOWED, PENALTY_AFTER_WHITESPACE),
            ("world!".to_string(), PENALTY_MANDATORY, PENALTY_NONE),
        ]);
    }

    #[test]
    fn verdicts() {
        let segs:Vec<_> = Segmenter::new().segments("Hello world!").collect();
        assert_eq!(segs[0].verdict(), PENALTY_PROHIBITED);
        assert_eq!(segs[1].verdict(), PENALTY_ALLOWED);
        assert_eq!(segs[2].verdict(), PENALTY_MANDATORY);
        assert!(segs[1].is_whitespace());
        assert_eq!((segs[2].start(), segs[2].end()), (6, 12));
        assert_eq!(segs[2].bytes(), b"world!");
    }

    #[test]
    fn hard_line_breaks_are_mandatory() {
        let segs:Vec<_> = Segmenter::new().segments("one\ntwo").collect();
        let newline = segs.iter().find(|s| s.text() == "\n").unwrap();
        assert_eq!(newline.verdict(), PENALTY_MANDATORY);
    }

    #[test]
    fn whitespace_breaker() {
        let b:Vec<_> = WhitespaceBreaker.breaks(" a  b ").collect();
        assert_eq!(b, vec![
            Break { offset:1, penalty:PENALTY_AFTER_WHITESPACE },
            Break { offset:2, penalty:PENALTY_BEFORE_WHITESPACE },
            Break { offset:4, penalty:PENALTY_AFTER_WHITESPACE },
            Break { offset:5, penalty:PENALTY_BEFORE_WHITESPACE },
            Break { offset:6, penalty:PENALTY_AFTER_WHITESPACE },
        ]);
        assert_eq!(WhitespaceBreaker.breaks("").count(), 0);
    }

    #[test]
    fn segments_cover_the_text() {
        let text = "The quick brown fox\u{2028}jumps over the lazy dog — twice.";
        let segs:Vec<_> = Segmenter::new().segments(text).collect();
        assert_eq!(segs.iter().map(|s| s.text()).collect::<String>(), text);
        assert!(segs.iter().all(|s| !s.text().is_empty()));
        assert_eq!(segs.last().unwrap().primary(), PENALTY_MANDATORY);
    }

    #[test]
    fn segments_outlive_the_segmenter() {
        let text = String::from("a b");
        let segs:Vec<Segment> = {
            let segmenter = Segmenter::new();
            segmenter.segments(&text).collect()
        };
        assert_eq!(segs.iter().map(|s| s.text()).collect::<Vec<_>>(), vec!["a", " ", "b"]);
    }

    #[test]
    fn overlong_segments_are_split() {
        let text = "äöüäöüäöü";
        let segs:Vec<_> = Segmenter::new().with_max_len(5).segments(text).collect();
        assert!(segs.len() > 1);
        assert!(segs.iter().all(|s| s.text().len() <= 5));
        assert_eq!(segs.iter().map(|s| s.text()).collect::<String>(), text);
        assert_eq!(segs[0].verdict(), PENALTY_PROHIBITED);
    }

    #[test]
    fn words() {
        let w:Vec<_> = WordBreaker.words("can't stop, won't").map(|(_,w)| w).collect();
        assert_eq!(w, vec!["can't", " ", "stop", ",", " ", "won't"]);
        assert_eq!(WordBreaker.breaks("ab cd").map(|b| b.offset).collect::<Vec<_>>(), vec![2, 3, 5]);
    }
}
