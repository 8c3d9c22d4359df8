/*! The fourteen standard fonts every PDF consumer provides.

   Widths are given in 1/1000 em for the printable ASCII range `32..=126`,
   taken from the Adobe core font metrics. The tables are kept as text and
   parsed once on first use; each line reads `Name ascender descender : w₃₂ … w₁₂₆`,
   where `w*n` repeats a width `n` times. A line `Name = Other` shares the
   metrics of `Other` (the oblique faces have the widths of their upright
   counterparts).
 */

use std::fmt::{Display, Formatter};
use lazy_static::lazy_static;
use crate::HMap;
use crate::metrics::FontMetrics;
use crate::parsing::Parser;

const FIRST_CHAR: u32 = 32;
const LAST_CHAR: u32 = 126;
const TABLE_LEN: usize = (LAST_CHAR - FIRST_CHAR + 1) as usize;

static STANDARD_TABLES: &str = "
Helvetica 718 -207 :
  278 278 355 556 556 889 667 191 333 333 389 584 278 333 278 278 556*10
  278 278 584 584 584 556 1015
  667 667 722 722 667 611 778 722 278 500 667 556 833 722 778 667 778 722 667 611 722 667 944 667 667 611
  278 278 278 469 556 333
  556 556 500 556 556 278 556 556 222 222 500 222 833 556 556 556 556 333 500 278 556 500 722 500 500 500
  334 260 334 584
Helvetica-Bold 718 -207 :
  278 333 474 556 556 889 722 238 333 333 389 584 278 333 278 278 556*10
  333 333 584 584 584 611 975
  722 722 722 722 667 611 778 722 278 556 722 611 833 722 778 667 778 722 667 611 722 667 944 667 667 611
  333 278 333 584 556 333
  556 611 556 611 556 333 611 611 278 278 556 278 889 611 611 611 611 389 556 333 611 556 778 556 556 500
  389 280 389 584
Helvetica-Oblique = Helvetica
Helvetica-BoldOblique = Helvetica-Bold
Times-Roman 683 -217 :
  250 333 408 500 500 833 778 180 333 333 500 564 250 333 250 278 500*10
  278 278 564 564 564 444 921
  722 667 667 722 611 556 722 722 333 389 722 611 889 722 722 556 722 667 556 611 722 722 944 722 722 611
  333 278 333 469 500 333
  444 500 444 500 444 333 500 500 278 278 500 278 778 500 500 500 500 333 389 278 500 500 722 500 500 444
  480 200 480 541
Times-Bold 676 -205 :
  250 333 555 500 500 1000 833 278 333 333 500 570 250 333 250 278 500*10
  333 333 570 570 570 500 930
  722 667 722 722 667 611 778 778 389 500 778 667 944 722 778 611 778 722 556 667 722 722 1000 722 722 667
  333 278 333 581 500 333
  500 556 444 556 444 333 500 556 278 333 556 278 833 556 500 556 556 444 389 333 556 500 722 500 500 444
  394 220 394 520
Times-Italic 683 -205 :
  250 333 420 500 500 833 778 214 333 333 500 675 250 333 250 278 500*10
  333 333 675 675 675 500 920
  611 611 667 722 611 611 722 722 333 444 667 556 833 667 722 611 722 611 500 556 722 611 833 611 556 556
  389 278 389 422 500 333
  500 500 444 500 444 278 500 500 278 278 444 278 722 500 500 500 500 389 389 278 500 444 667 444 444 389
  400 275 400 541
Times-BoldItalic 683 -205 :
  250 389 555 500 500 833 778 278 333 333 500 570 250 333 250 278 500*10
  333 333 570 570 570 500 832
  667 667 667 722 667 667 722 778 389 500 667 611 889 722 722 611 722 667 556 611 722 667 889 667 611 611
  333 278 333 570 500 333
  500 500 444 500 444 333 500 556 278 278 500 278 778 556 500 500 500 389 389 278 556 444 667 500 444 389
  348 220 348 570
Courier 629 -157 : 600*95
Courier-Bold = Courier
Courier-Oblique = Courier
Courier-BoldOblique = Courier
Symbol 1010 -293 :
  250 333 713 500 549 833 778 439 333 333 500 549 250 549 250 278 500*10
  278 278 549 549 549 444 549
  722 667 722 612 611 763 603 722 333 631 722 686 889 722 722 768 741 556 592 611 690 439 768 645 795 611
  333 863 333 658 500 500
  631 549 549 494 439 521 411 603 329 603 549 549 576 521 549 549 521 549 603 439 576 713 686 493 686 494
  480 200 480 549
ZapfDingbats 820 -143 :
  278 974 961 974 980 719 789 790 791 690 960 939 549 855 911 933
  911 945 974 755 846 762 761 571 677 763
  760 759 754 494 552 537 577
  692 786 788 788 790 793 794 816 823 789 841 823 833 816 831 923 744 723 749 790 792 695 776 768 792 759
  707 708 682 701 826 815
  789 789 707 687 696 689 786 787 713 791 785 791 873 761 762 762 759 759 892 892 788 784 438 138 277 415
  392 392 668 668
";

/// One of the fourteen standard fonts.
#[derive(Clone,Copy,Debug,PartialEq,Eq,Hash)]
pub enum StandardFont {
    Helvetica, HelveticaBold, HelveticaOblique, HelveticaBoldOblique,
    TimesRoman, TimesBold, TimesItalic, TimesBoldItalic,
    Courier, CourierBold, CourierOblique, CourierBoldOblique,
    Symbol, ZapfDingbats
}
impl StandardFont {
    pub const ALL: [StandardFont;14] = [
        Self::Helvetica, Self::HelveticaBold, Self::HelveticaOblique, Self::HelveticaBoldOblique,
        Self::TimesRoman, Self::TimesBold, Self::TimesItalic, Self::TimesBoldItalic,
        Self::Courier, Self::CourierBold, Self::CourierOblique, Self::CourierBoldOblique,
        Self::Symbol, Self::ZapfDingbats
    ];
    /// The PostScript name of the font, as used in a PDF font dictionary.
    pub fn name(self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::HelveticaBoldOblique => "Helvetica-BoldOblique",
            Self::TimesRoman => "Times-Roman",
            Self::TimesBold => "Times-Bold",
            Self::TimesItalic => "Times-Italic",
            Self::TimesBoldItalic => "Times-BoldItalic",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
            Self::CourierOblique => "Courier-Oblique",
            Self::CourierBoldOblique => "Courier-BoldOblique",
            Self::Symbol => "Symbol",
            Self::ZapfDingbats => "ZapfDingbats",
        }
    }
    pub fn from_name(name:&str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.name() == name)
    }
    /// The (lazily parsed) metrics of this font.
    pub fn metrics(self) -> &'static StandardMetrics {
        match STANDARD_METRICS.get(self.name()) {
            Some(m) => m,
            None => unreachable!("every standard font has an embedded table")
        }
    }
}
impl Display for StandardFont {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Width table and vertical extent of one standard font.
#[derive(Clone,Debug)]
pub struct StandardMetrics {
    pub name: &'static str,
    pub ascender: i32,
    pub descender: i32,
    widths: [u16;TABLE_LEN],
}
impl StandardMetrics {
    /// The width used for characters outside the embedded range: the width of `n`,
    /// which is close to the average lowercase width in the text faces.
    pub fn missing_width(&self) -> u16 {
        self.widths[('n' as u32 - FIRST_CHAR) as usize]
    }
}
impl FontMetrics for StandardMetrics {
    fn name(&self) -> &str { self.name }
    fn advance(&self, c: char) -> u16 {
        let code = c as u32;
        if (FIRST_CHAR..=LAST_CHAR).contains(&code) {
            self.widths[(code - FIRST_CHAR) as usize]
        } else if c.is_whitespace() {
            self.widths[0]
        } else {
            self.missing_width()
        }
    }
    fn ascender(&self) -> i32 { self.ascender }
    fn descender(&self) -> i32 { self.descender }
}

lazy_static! {
    static ref STANDARD_METRICS: HMap<&'static str,StandardMetrics> = parse_tables(STANDARD_TABLES);
}

fn parse_tables(src:&'static str) -> HMap<&'static str,StandardMetrics> {
    let mut map: HMap<&'static str,StandardMetrics> = HMap::default();
    let mut parser = Parser::new(src);
    while !parser.is_empty() {
        let name = parser.read_until_ws();
        if parser.drop("=") {
            let other = parser.read_until_ws();
            match map.get(other) {
                Some(m) => {
                    let copy = StandardMetrics { name, ..m.clone() };
                    map.insert(name, copy);
                }
                None => log::error!(target:"fonts","font table {} refers to unknown table {}",name,other),
            }
            continue
        }
        let ascender = parser.read_number().unwrap_or_default();
        let descender = parser.read_number().unwrap_or_default();
        parser.drop(":");
        let mut widths = [0u16;TABLE_LEN];
        let mut i = 0usize;
        while let Some(w) = parser.read_number() {
            let times = if parser.drop("*") { parser.read_number().unwrap_or(1) } else { 1 };
            for _ in 0..times {
                if i < TABLE_LEN { widths[i] = w as u16; }
                i += 1;
            }
        }
        if i != TABLE_LEN {
            log::error!(target:"fonts","font table {} has {} entries instead of {}",name,i,TABLE_LEN);
        }
        log::trace!(target:"fonts","parsed width table of {}",name);
        map.insert(name, StandardMetrics { name, ascender, descender, widths });
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::FontMetrics;

    #[test]
    fn all_fonts_present() {
        for f in StandardFont::ALL {
            let m = f.metrics();
            assert_eq!(m.name, f.name());
            assert!(m.advance(' ') > 0, "{} has no space width", f);
            assert_eq!(StandardFont::from_name(f.name()), Some(f));
        }
    }

    #[test]
    fn known_widths() {
        assert_eq!(StandardFont::Helvetica.metrics().advance('H'), 722);
        assert_eq!(StandardFont::Helvetica.metrics().advance('i'), 222);
        assert_eq!(StandardFont::HelveticaOblique.metrics().advance('i'), 222);
        assert_eq!(StandardFont::TimesRoman.metrics().advance('W'), 944);
        assert_eq!(StandardFont::TimesBold.metrics().advance('%'), 1000);
        assert_eq!(StandardFont::CourierBoldOblique.metrics().advance('~'), 600);
        assert_eq!(StandardFont::ZapfDingbats.metrics().advance('~'), 668);
        assert_eq!(StandardFont::Symbol.metrics().advance('a'), 631);
    }

    #[test]
    fn characters_outside_the_table() {
        let m = StandardFont::TimesRoman.metrics();
        assert_eq!(m.advance('ü'), m.advance('n'));
        assert_eq!(m.advance('\u{00A0}'), m.advance(' '));
    }
}
