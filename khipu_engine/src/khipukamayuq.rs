/*! The *khipukamayuq* knots khipus: it turns paragraph text into a [`Khipu`].

   1. The text is normalized to NFC.
   2. The [`Segmenter`] cuts it at every line wrap opportunity and at the
      borders of whitespace spans.
   3. Every whitespace segment becomes inter-word [`Glue`] followed by a
      penalty carrying the segmenter's verdict; every other segment becomes a
      [`TextBox`] followed by a penalty, which is infinite where the text box
      borders on whitespace without a wrap opportunity.
   4. The paragraph is closed with the paragraph fill glue, a zero penalty and
      an empty text box marking the end.
   5. If hyphenation is enabled in the registers, text boxes are split at
      syllable boundaries, with [`Discretionary`] hyphens in between.

   Encoding is total: undecodable input is replaced and reported, a missing
   dictionary only disables hyphenation.
 */

use std::fmt::{Debug, Formatter};
use std::io::Read;
use std::sync::Arc;
use icu_normalizer::ComposingNormalizerBorrowed;
use khipu_fonts::metrics::Font;
use khipu_fonts::shaper::{Shaper, SimpleShaper};
use crate::dimen::Dimen;
use crate::hyphenation::{bounded, Hyphenator};
use crate::khipu::Khipu;
use crate::khipu::knots::{Discretionary, Glue, Knot, TextBox, PENALTY_INFINITY};
use crate::registers::TypesettingRegisters;
use crate::segment::{Segmenter, WordBreaker};
use crate::utils::diagnostics::{Diagnostics, Location};

/// Everything the khipukamayuq needs besides the registers.
#[derive(Clone)]
pub struct PipelineConfig {
    pub font:Font,
    pub shaper:Arc<dyn Shaper + Send + Sync>,
    /// glue for a span of whitespace
    pub interword_glue:Glue,
    /// glue closing the last line, TeX's `\parfillskip`
    pub parfill_glue:Glue,
    pub hyphenator:Hyphenator,
}
impl PipelineConfig {
    /// Inter-word glue `5bp plus 2bp minus 1bp` and `\parfillskip` `0bp plus 1fil`.
    pub fn new(font:Font) -> Self {
        PipelineConfig {
            font,
            shaper:Arc::new(SimpleShaper),
            interword_glue:Glue::from_dimens(Dimen::BP * 5,Dimen::BP * 2,Dimen::BP),
            parfill_glue:Glue::fil(),
            hyphenator:Hyphenator::new(),
        }
    }
    pub fn with_interword_glue(mut self,glue:Glue) -> Self {
        self.interword_glue = glue;
        self
    }
    pub fn with_hyphenator(mut self,hyphenator:Hyphenator) -> Self {
        self.hyphenator = hyphenator;
        self
    }
    pub fn with_shaper(mut self,shaper:Arc<dyn Shaper + Send + Sync>) -> Self {
        self.shaper = shaper;
        self
    }
}
impl Debug for PipelineConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("font",&self.font)
            .field("interword_glue",&self.interword_glue)
            .field("parfill_glue",&self.parfill_glue)
            .field("hyphenator",&self.hyphenator)
            .finish()
    }
}

/// Turns text into khipus. Keeps no state between paragraphs.
#[derive(Debug)]
pub struct Khipukamayuq {
    config:PipelineConfig,
    segmenter:Segmenter,
}
impl Khipukamayuq {
    pub fn new(config:PipelineConfig) -> Self {
        Khipukamayuq { config, segmenter:Segmenter::new() }
    }
    pub fn with_segmenter(config:PipelineConfig,segmenter:Segmenter) -> Self {
        Khipukamayuq { config, segmenter }
    }
    pub fn config(&self) -> &PipelineConfig { &self.config }

    /// Reads one paragraph from `input` and encodes it. Invalid UTF-8 is
    /// replaced by U+FFFD; read errors end the input. Both are reported to `diagnostics`.
    pub fn encode<R:Read,D:Diagnostics>(&self,mut input:R,regs:&TypesettingRegisters,mut diagnostics:D) -> Khipu {
        let mut buf = Vec::new();
        if let Err(e) = input.read_to_end(&mut buf) {
            diagnostics.input_decoding(buf.len(),format!("reading paragraph failed: {}",e));
        }
        if let Err(e) = std::str::from_utf8(&buf) {
            diagnostics.input_decoding(e.valid_up_to(),format!("invalid UTF-8 at byte {}; replaced",e.valid_up_to()));
        }
        let text = String::from_utf8_lossy(&buf);
        self.encode_str(&text,regs,diagnostics)
    }

    /// Encodes one paragraph of text.
    pub fn encode_str<D:Diagnostics>(&self,text:&str,regs:&TypesettingRegisters,mut diagnostics:D) -> Khipu {
        let text = ComposingNormalizerBorrowed::new_nfc().normalize(text);
        let mut khipu = Khipu::new();
        let mut segments = self.segmenter.segments(&text).peekable();
        while let Some(seg) = segments.next() {
            let last = segments.peek().is_none();
            if seg.is_whitespace() {
                khipu.append(Knot::Glue(self.config.interword_glue))
                    .append(Knot::penalty(seg.verdict()));
            } else {
                let penalty = if last { PENALTY_INFINITY } else { seg.verdict() };
                khipu.append(Knot::TextBox(self.text_box(seg.text(),regs)))
                    .append(Knot::penalty(penalty));
            }
        }
        if !khipu.is_empty() {
            self.end_paragraph(&mut khipu);
        }
        log::debug!(target:"khipu","encoded {} characters into {} knots",text.chars().count(),khipu.len());
        log::trace!(target:"khipu","{}",khipu);
        if regs.hyphenation_enabled() {
            self.hyphenate(&mut khipu,regs,&mut diagnostics);
        }
        khipu
    }

    fn text_box(&self,text:&str,regs:&TypesettingRegisters) -> TextBox {
        let font = &self.config.font;
        let width = self.config.shaper.width(font,text,regs.text_direction(),regs.script());
        TextBox::new(text,Dimen(width),Dimen(font.height()),Dimen(font.depth()))
    }

    fn end_paragraph(&self,khipu:&mut Khipu) {
        let n = khipu.len();
        if n >= 2 && matches!(khipu.knot(n - 2),Some(Knot::Glue(_))) {
            khipu.truncate(n - 2);
        }
        khipu.append(Knot::Glue(self.config.parfill_glue))
            .append(Knot::penalty(0))
            .append(Knot::TextBox(TextBox::default()));
    }

    /// Splits every text box at the syllable boundaries of the words it contains,
    /// inserting a [`Discretionary`] with the hyphen character at every boundary.
    /// Only words of at least `minhyphenlength` letters are considered.
    pub fn hyphenate<D:Diagnostics>(&self,khipu:&mut Khipu,regs:&TypesettingRegisters,mut diagnostics:D) {
        let language = regs.language();
        let dictionary = match self.config.hyphenator.dictionary(language) {
            Ok(d) => d,
            Err(e) => {
                log::debug!(target:"hyphenation","{}",e);
                diagnostics.hyphenation_unavailable(language);
                return
            }
        };
        let min = usize::try_from(regs.min_hyphen_length()).unwrap_or(usize::MAX);
        let hyphen = self.text_box(&regs.hyphen_char().to_string(),regs);
        let mut pos = khipu.len();
        while pos > 0 {
            pos -= 1;
            let Some(Knot::TextBox(tb)) = khipu.knot(pos) else { continue };
            let mut cuts = Vec::new();
            for (offset,word) in WordBreaker.words(&tb.text) {
                if word.chars().count() < min || !word.chars().all(char::is_alphabetic) { continue }
                let syllables = bounded(dictionary.syllables(word),word);
                if syllables.len() < 2 { continue }
                let mut o = offset;
                for s in &syllables[..syllables.len() - 1] {
                    o += s.len();
                    cuts.push(o);
                }
            }
            if cuts.is_empty() { continue }
            let text = tb.text.clone();
            let mut knots = Vec::with_capacity(2 * cuts.len() + 1);
            let mut last = 0;
            for c in cuts {
                knots.push(Knot::TextBox(self.text_box(&text[last..c],regs)));
                knots.push(Knot::Discretionary(Discretionary::hyphen(hyphen.clone())));
                last = c;
            }
            knots.push(Knot::TextBox(self.text_box(&text[last..],regs)));
            log::trace!(target:"hyphenation","{} → {} knots",text,knots.len());
            khipu.splice(pos,knots);
        }
    }
}

/// The location of the knot at `pos` for diagnostics.
pub fn location(khipu:&Khipu,pos:usize) -> Location {
    Location::Paragraph { knot:pos, offset:khipu.char_offset(pos) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::ParameterKey;
    use crate::utils::diagnostics::{Collect, DiagnosticKind, Discard};

    fn kamayuq() -> Khipukamayuq {
        Khipukamayuq::new(PipelineConfig::new(Font::fixed_width(Dimen::BP.0 * 10)))
    }

    #[test]
    fn glue_between_words() {
        let k = kamayuq().encode_str("Hello world!", &TypesettingRegisters::new(), Discard);
        assert_eq!(k.len(), 9);
        assert_eq!(k.knot(0), Some(&Knot::TextBox(TextBox::new("Hello", Dimen::BP * 50, Dimen::BP * 7 + Dimen::BP / 2, Dimen::BP * 5 / 2))));
        assert_eq!(k.knot(1), Some(&Knot::Penalty(PENALTY_INFINITY)));
        assert!(matches!(k.knot(2), Some(Knot::Glue(g)) if g.width == Dimen::BP * 5));
        assert_eq!(k.knot(3), Some(&Knot::Penalty(0)));
        assert_eq!(k.knot(5), Some(&Knot::Penalty(PENALTY_INFINITY)));
        assert_eq!(k.knot(6), Some(&Knot::Glue(Glue::fil())));
        assert_eq!(k.knot(8), Some(&Knot::TextBox(TextBox::default())));
    }

    #[test]
    fn trailing_whitespace_is_dropped() {
        let regs = TypesettingRegisters::new();
        let k = kamayuq().encode_str("Hello  ", &regs, Discard);
        assert_eq!(k.len(), 5);
        assert_eq!(k.text(0, k.len()), "Hello ");
        assert!(kamayuq().encode_str("", &regs, Discard).is_empty());
    }

    #[test]
    fn input_is_normalized() {
        let regs = TypesettingRegisters::new();
        let k = kamayuq().encode_str("Cafe\u{0301}", &regs, Discard);
        assert_eq!(k.text(0, 1), "Café");
        assert_eq!(k.knot(0).unwrap().width(), Dimen::BP * 40);
    }

    #[test]
    fn very_long_words_saturate() {
        use khipu_fonts::standard::StandardFont;
        use crate::linebreak::{knuthplass, RectangularParshape};
        use crate::linebreak::LineBreakParameters;
        use crate::khipu::Cursor;
        let kamayuq = Khipukamayuq::new(PipelineConfig::new(Font::standard(StandardFont::Helvetica, 10)));
        let k = kamayuq.encode_str(&"m".repeat(5000), &TypesettingRegisters::new(), Discard);
        assert_eq!(k.len(), 5);
        assert_eq!(k.knot(0).unwrap().width(), Dimen::MAX);
        let parshape = RectangularParshape::new(Dimen::BP * 100).unwrap();
        let mut diag = Collect::new();
        let breaks = knuthplass::find_breakpoints(&mut Cursor::new(&k), &parshape, &LineBreakParameters::default(), &mut diag);
        assert!(breaks.lines[0].is_overfull());
        assert!(diag.has(DiagnosticKind::OverfullBox));
    }

    #[test]
    fn invalid_utf8_is_reported() {
        let mut diag = Collect::new();
        let k = kamayuq().encode(&b"ab\xffcd"[..], &TypesettingRegisters::new(), &mut diag);
        assert!(diag.has(DiagnosticKind::InputDecoding));
        assert_eq!(k.text(0, 1), "ab\u{FFFD}cd");
    }

    #[test]
    fn hyphenation() {
        let mut regs = TypesettingRegisters::new();
        regs.set(ParameterKey::MinHyphenLength, 5).unwrap();
        regs.set(ParameterKey::HyphenChar, '=').unwrap();
        let k = kamayuq().encode_str("extraordinary", &regs, Discard);
        let discretionaries: Vec<_> = k.iter().filter_map(|k| match k {
            Knot::Discretionary(d) => Some(d),
            _ => None
        }).collect();
        assert!(!discretionaries.is_empty());
        assert!(matches!(discretionaries[0].pre.as_deref(), Some(Knot::TextBox(t)) if t.text == "="));
        // the last three knots close the paragraph
        assert_eq!(k.text(0, k.len() - 3), "extraordinary");
    }

    #[test]
    fn unknown_language_disables_hyphenation() {
        let mut regs = TypesettingRegisters::new();
        regs.set(ParameterKey::MinHyphenLength, 3).unwrap();
        regs.set(ParameterKey::Language, "tlh").unwrap();
        let mut diag = Collect::new();
        let k = kamayuq().encode_str("extraordinary", &regs, &mut diag);
        assert!(diag.has(DiagnosticKind::HyphenationUnavailable));
        assert!(!k.iter().any(|k| matches!(k, Knot::Discretionary(_))));
    }
}
