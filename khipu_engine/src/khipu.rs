/*! A [`Khipu`] is the knot list of one paragraph: an ordered sequence of
   [`Knot`]s, navigated with a [`Cursor`].

   Khipus are built once by the [khipukamayuq](crate::khipukamayuq) and only
   modified afterwards by the hyphenation pass, which splices discretionaries
   into the positions of text boxes. [`Mark`]s taken before such a
   modification are invalidated by it.
 */

pub mod knots;
pub mod cursor;

use std::fmt::{Display, Formatter};
use crate::dimen::Dimen;
use knots::{Knot, Wss};
pub use cursor::{Cursor, Mark};

/// An ordered sequence of knots; positions run from 0 to `len()-1`.
#[derive(Clone,Debug,Default,PartialEq,Eq)]
pub struct Khipu { knots:Vec<Knot> }
impl Khipu {
    pub fn new() -> Self { Khipu::default() }
    pub fn with_capacity(capacity:usize) -> Self { Khipu { knots:Vec::with_capacity(capacity) } }
    pub fn len(&self) -> usize { self.knots.len() }
    pub fn is_empty(&self) -> bool { self.knots.is_empty() }
    pub fn knots(&self) -> &[Knot] { &self.knots }
    pub fn knot(&self,pos:usize) -> Option<&Knot> { self.knots.get(pos) }
    pub fn last(&self) -> Option<&Knot> { self.knots.last() }
    pub fn iter(&self) -> std::slice::Iter<'_,Knot> { self.knots.iter() }

    /// Appends a knot; returns `self` for chaining.
    pub fn append(&mut self,knot:Knot) -> &mut Self {
        self.knots.push(knot);
        self
    }
    pub fn append_khipu(&mut self,other:Khipu) -> &mut Self {
        self.knots.extend(other.knots);
        self
    }
    pub(crate) fn truncate(&mut self,len:usize) { self.knots.truncate(len) }

    /// Replaces the knot at `pos`, returning the old one.
    ///
    /// # Panics
    /// if `pos` is out of range.
    pub fn replace_knot(&mut self,pos:usize,knot:Knot) -> Knot {
        std::mem::replace(&mut self.knots[pos],knot)
    }
    /// Replaces the knot at `pos` by the sequence `knots`.
    ///
    /// # Panics
    /// if `pos` is out of range.
    pub fn splice<I:IntoIterator<Item=Knot>>(&mut self,pos:usize,knots:I) {
        self.knots.splice(pos..=pos,knots);
    }

    /// Width, stretch and shrink of the knots in `from..to`.
    pub fn measure(&self,from:usize,to:usize) -> Wss {
        let to = to.min(self.len());
        let mut wss = Wss::default();
        if from < to {
            for k in &self.knots[from..to] { wss.add_knot(k) }
        }
        wss
    }
    /// The first position at or after `from` at which the natural width of
    /// `from..=pos` exceeds `width`; `None` if the rest of the khipu fits.
    pub fn reach(&self,from:usize,width:Dimen) -> Option<usize> {
        let mut w = Dimen::ZERO;
        for (i,k) in self.knots.iter().enumerate().skip(from) {
            w = w.saturating_add(k.width());
            if w > width { return Some(i) }
        }
        None
    }
    /// Maximal height and depth of the knots in `from..to`.
    pub fn max_height_and_depth(&self,from:usize,to:usize) -> (Dimen,Dimen) {
        let to = to.min(self.len());
        if from >= to { return (Dimen::ZERO,Dimen::ZERO) }
        self.knots[from..to].iter().fold((Dimen::ZERO,Dimen::ZERO),|(h,d),k| (h.max(k.height()),d.max(k.depth())))
    }
    /// The text of the text boxes in `from..to`, with a space for every glue.
    pub fn text(&self,from:usize,to:usize) -> String {
        let to = to.min(self.len());
        let mut s = String::new();
        if from >= to { return s }
        for k in &self.knots[from..to] {
            match k {
                Knot::TextBox(b) => s.push_str(&b.text),
                Knot::Glue(_) => s.push(' '),
                _ => ()
            }
        }
        s
    }
    /// Character offset in the paragraph text at which the knot at `pos` starts.
    pub fn char_offset(&self,pos:usize) -> usize {
        let pos = pos.min(self.len());
        self.knots[..pos].iter().map(|k| match k {
            Knot::TextBox(b) => b.text.chars().count(),
            Knot::Glue(_) => 1,
            _ => 0
        }).sum()
    }
}
impl Display for Khipu {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for k in &self.knots {
            if !first { f.write_str(" ")? }
            first = false;
            write!(f,"{}",k)?
        }
        Ok(())
    }
}
impl FromIterator<Knot> for Khipu {
    fn from_iter<T: IntoIterator<Item=Knot>>(iter: T) -> Self {
        Khipu { knots:iter.into_iter().collect() }
    }
}
impl<'a> IntoIterator for &'a Khipu {
    type Item = &'a Knot;
    type IntoIter = std::slice::Iter<'a,Knot>;
    fn into_iter(self) -> Self::IntoIter { self.knots.iter() }
}
