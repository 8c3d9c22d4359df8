/*! The six kinds of [`Knot`]s a khipu is made of, and [`Wss`], the
   (natural, minimum, maximum) width of a sequence of knots.
 */

use std::fmt::{Display, Formatter};
use crate::dimen::Dimen;

/// Penalty at or above which a break is impossible.
pub const PENALTY_INFINITY: i32 = 10000;
/// Penalty at or below which a break is mandatory.
pub const PENALTY_FORCE: i32 = -10000;

/// Clamps a penalty to `[PENALTY_FORCE, PENALTY_INFINITY]`.
pub fn clamp_penalty(p:i32) -> i32 { p.clamp(PENALTY_FORCE,PENALTY_INFINITY) }

/// Stretchability or shrinkability of glue: finite, or one of three orders of infinity.
/// The infinite amounts are fixed-point numbers with 65536 = 1fil.
#[derive(Clone,Copy,Eq,PartialEq,Debug)]
pub enum StretchShrink { Dim(Dimen), Fil(i32), Fill(i32), Filll(i32) }
impl StretchShrink {
    /// Interprets a plain dimension: magnitudes of at least [`Dimen::FIL`]
    /// ([`FILL`](Dimen::FILL), [`FILLL`](Dimen::FILLL)) denote one unit of the respective
    /// infinite order.
    pub fn from_dimen(d:Dimen) -> Self {
        let a = d.abs();
        if a >= Dimen::FILLL { Self::Filll(d.scale(65536,Dimen::FILLL.0).0) }
        else if a >= Dimen::FILL { Self::Fill(d.scale(65536,Dimen::FILL.0).0) }
        else if a >= Dimen::FIL { Self::Fil(d.scale(65536,Dimen::FIL.0).0) }
        else { Self::Dim(d) }
    }
    /// 0 for finite amounts, 1-3 for fil, fill and filll.
    pub fn order(&self) -> usize {
        match self { Self::Dim(_) => 0, Self::Fil(_) => 1, Self::Fill(_) => 2, Self::Filll(_) => 3 }
    }
    /// The amount within its order.
    pub fn amount(&self) -> Dimen {
        match self { Self::Dim(d) => *d, Self::Fil(i) | Self::Fill(i) | Self::Filll(i) => Dimen(*i) }
    }
    /// The amount as a plain dimension, infinite orders mapped to their distinguished magnitudes.
    pub fn magnitude(&self) -> Dimen {
        match self {
            Self::Dim(d) => *d,
            Self::Fil(i) => Dimen::FIL.scale(*i,65536),
            Self::Fill(i) => Dimen::FILL.scale(*i,65536),
            Self::Filll(i) => Dimen::FILLL.scale(*i,65536),
        }
    }
    fn is_zero(&self) -> bool { self.amount() == Dimen::ZERO }
}
impl Display for StretchShrink {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dim(d) => write!(f, "{}", d),
            Self::Fil(i) => Dimen::display_num(*i, "fil", f),
            Self::Fill(i) => Dimen::display_num(*i, "fill", f),
            Self::Filll(i) => Dimen::display_num(*i, "filll", f),
        }
    }
}

/// Elastic whitespace.
#[derive(Clone,Copy,Eq,PartialEq,Debug,Default)]
pub struct Glue {
    pub width:Dimen,
    pub stretch:Option<StretchShrink>,
    pub shrink:Option<StretchShrink>
}
impl Glue {
    pub fn new(width:Dimen,stretch:Option<StretchShrink>,shrink:Option<StretchShrink>) -> Self {
        Glue { width,
            stretch: stretch.filter(|s| !s.is_zero()),
            shrink: shrink.filter(|s| !s.is_zero())
        }
    }
    /// Glue from three plain dimensions; see [`StretchShrink::from_dimen`] for
    /// how infinite stretch is expressed.
    pub fn from_dimens(width:Dimen,stretch:Dimen,shrink:Dimen) -> Self {
        Self::new(width,Some(StretchShrink::from_dimen(stretch)),Some(StretchShrink::from_dimen(shrink)))
    }
    /// `0bp plus 1fil`, the glue ending a paragraph.
    pub fn fil() -> Self {
        Glue { width:Dimen::ZERO, stretch:Some(StretchShrink::Fil(65536)), shrink:None }
    }
    pub fn zero() -> Self { Glue::default() }
    pub fn min_width(&self) -> Dimen {
        self.width.saturating_sub(self.shrink.map(|s| s.magnitude()).unwrap_or_default())
    }
    pub fn max_width(&self) -> Dimen {
        self.width.saturating_add(self.stretch.map(|s| s.magnitude()).unwrap_or_default())
    }
}
impl Display for Glue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f,"{}",self.width)?;
        if let Some(stretch) = &self.stretch {
            write!(f," plus {}",stretch)?;
        }
        if let Some(shrink) = &self.shrink {
            write!(f," minus {}",shrink)?;
        }
        Ok(())
    }
}

/// A run of shaped glyphs with fixed dimensions.
#[derive(Clone,Eq,PartialEq,Debug,Default)]
pub struct TextBox {
    pub text:String,
    pub width:Dimen,
    pub height:Dimen,
    pub depth:Dimen,
}
impl TextBox {
    pub fn new<S:Into<String>>(text:S,width:Dimen,height:Dimen,depth:Dimen) -> Self {
        TextBox { text:text.into(), width, height, depth }
    }
}

/// A conditional break: `pre` ends the line if the break is taken, `post` starts
/// the next one; `no_break` is set if it is not.
#[derive(Clone,Eq,PartialEq,Debug,Default)]
pub struct Discretionary {
    pub pre:Option<Box<Knot>>,
    pub post:Option<Box<Knot>>,
    pub no_break:Option<Box<Knot>>,
}
impl Discretionary {
    /// A hyphenation point: the hyphen appears only if the line is broken here.
    pub fn hyphen(hyphen:TextBox) -> Self {
        Discretionary { pre:Some(Box::new(Knot::TextBox(hyphen))), post:None, no_break:None }
    }
    pub fn pre_width(&self) -> Dimen { self.pre.as_ref().map(|k| k.width()).unwrap_or_default() }
    pub fn post_width(&self) -> Dimen { self.post.as_ref().map(|k| k.width()).unwrap_or_default() }
    pub fn no_break_width(&self) -> Dimen { self.no_break.as_ref().map(|k| k.width()).unwrap_or_default() }
}

#[derive(Clone,Copy,Debug,PartialEq,Eq,Hash)]
pub enum KnotKind { TextBox, Glue, Kern, Penalty, Discretionary, Mark }

/// The unit of a khipu.
#[derive(Clone,Eq,PartialEq,Debug)]
pub enum Knot {
    TextBox(TextBox),
    Glue(Glue),
    Kern(Dimen),
    /// cost of breaking here, in `[-10000, 10000]`
    Penalty(i32),
    Discretionary(Discretionary),
    /// an invisible anchor
    Mark(u32),
}
impl Knot {
    /// A penalty knot, clamped into the legal range.
    pub fn penalty(p:i32) -> Self { Knot::Penalty(clamp_penalty(p)) }
    pub fn kind(&self) -> KnotKind {
        match self {
            Knot::TextBox(_) => KnotKind::TextBox,
            Knot::Glue(_) => KnotKind::Glue,
            Knot::Kern(_) => KnotKind::Kern,
            Knot::Penalty(_) => KnotKind::Penalty,
            Knot::Discretionary(_) => KnotKind::Discretionary,
            Knot::Mark(_) => KnotKind::Mark,
        }
    }
    /// Natural width.
    pub fn width(&self) -> Dimen {
        match self {
            Knot::TextBox(b) => b.width,
            Knot::Glue(g) => g.width,
            Knot::Kern(d) => *d,
            Knot::Discretionary(d) => d.no_break_width(),
            Knot::Penalty(_) | Knot::Mark(_) => Dimen::ZERO,
        }
    }
    pub fn min_width(&self) -> Dimen {
        match self {
            Knot::Glue(g) => g.min_width(),
            k => k.width()
        }
    }
    pub fn max_width(&self) -> Dimen {
        match self {
            Knot::Glue(g) => g.max_width(),
            k => k.width()
        }
    }
    pub fn height(&self) -> Dimen {
        match self {
            Knot::TextBox(b) => b.height,
            Knot::Discretionary(d) => d.no_break.as_ref().map(|k| k.height()).unwrap_or_default(),
            _ => Dimen::ZERO
        }
    }
    pub fn depth(&self) -> Dimen {
        match self {
            Knot::TextBox(b) => b.depth,
            Knot::Discretionary(d) => d.no_break.as_ref().map(|k| k.depth()).unwrap_or_default(),
            _ => Dimen::ZERO
        }
    }
    /// Glue, kerns and penalties vanish at the start of a line.
    pub fn is_discardable(&self) -> bool {
        matches!(self,Knot::Glue(_) | Knot::Kern(_) | Knot::Penalty(_))
    }
    pub fn wss(&self) -> Wss {
        let mut w = Wss::default();
        w.add_knot(self);
        w
    }
}
impl Display for Knot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Knot::TextBox(b) => write!(f,"[{:?}]",b.text),
            Knot::Glue(g) => write!(f,"~{}",g.width),
            Knot::Kern(d) => write!(f,"<kern {}>",d),
            Knot::Penalty(p) if *p >= PENALTY_INFINITY => write!(f,"{{∞}}"),
            Knot::Penalty(p) if *p <= PENALTY_FORCE => write!(f,"{{-∞}}"),
            Knot::Penalty(p) => write!(f,"{{{}}}",p),
            Knot::Discretionary(d) => match d.pre.as_deref() {
                Some(Knot::TextBox(b)) => write!(f,"\\-{}",b.text),
                _ => write!(f,"\\-"),
            },
            Knot::Mark(m) => write!(f,"<mark {}>",m),
        }
    }
}

/// Width, stretch and shrink of a sequence of knots, with stretch and shrink
/// kept per order of infinity (index 0 finite, 1-3 fil, fill, filll).
#[derive(Clone,Copy,Eq,PartialEq,Debug,Default)]
pub struct Wss {
    pub width:Dimen,
    pub stretch:[Dimen;4],
    pub shrink:[Dimen;4],
}
impl Wss {
    pub fn from_width(width:Dimen) -> Self { Wss { width, ..Default::default() } }
    pub fn add_knot(&mut self,knot:&Knot) {
        match knot {
            Knot::Glue(g) => self.add_glue(g),
            k => self.width = self.width.saturating_add(k.width())
        }
    }
    pub fn add_glue(&mut self,g:&Glue) {
        self.width = self.width.saturating_add(g.width);
        if let Some(s) = g.stretch { self.stretch[s.order()] = self.stretch[s.order()].saturating_add(s.amount()) }
        if let Some(s) = g.shrink { self.shrink[s.order()] = self.shrink[s.order()].saturating_add(s.amount()) }
    }
    pub fn add(&self,other:&Wss) -> Wss {
        let mut r = *self;
        r.width = r.width.saturating_add(other.width);
        for i in 0..4 {
            r.stretch[i] = r.stretch[i].saturating_add(other.stretch[i]);
            r.shrink[i] = r.shrink[i].saturating_add(other.shrink[i]);
        }
        r
    }
    pub fn subtract(&self,other:&Wss) -> Wss {
        let mut r = *self;
        r.width = r.width.saturating_sub(other.width);
        for i in 0..4 {
            r.stretch[i] = r.stretch[i].saturating_sub(other.stretch[i]);
            r.shrink[i] = r.shrink[i].saturating_sub(other.shrink[i]);
        }
        r
    }
    /// Highest order with non-zero stretch.
    pub fn stretch_order(&self) -> usize {
        (0..4).rev().find(|i| self.stretch[*i] != Dimen::ZERO).unwrap_or(0)
    }
    /// Highest order with non-zero shrink.
    pub fn shrink_order(&self) -> usize {
        (0..4).rev().find(|i| self.shrink[*i] != Dimen::ZERO).unwrap_or(0)
    }
    /// Natural width.
    pub fn w(&self) -> Dimen { self.width }
    /// Width when shrunk as far as possible.
    pub fn min(&self) -> Dimen {
        if self.shrink_order() > 0 { Dimen::MIN } else { self.width.saturating_sub(self.shrink[0]) }
    }
    /// Width when stretched as far as finitely possible; saturates with infinite stretch.
    pub fn max(&self) -> Dimen {
        if self.stretch_order() > 0 { Dimen::MAX } else { self.width.saturating_add(self.stretch[0]) }
    }
}
impl Display for Wss {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f,"{{{} < {} < ",self.min(),self.w())?;
        if self.stretch_order() > 0 { write!(f,"∞}}") } else { write!(f,"{}}}",self.max()) }
    }
}
