use std::ops::{Deref, DerefMut};
use crate::khipu::Khipu;
use crate::khipu::knots::Knot;

/// A position in a khipu together with the knot found there. Only valid as
/// long as the khipu is not structurally modified.
#[derive(Clone,Debug,PartialEq,Eq)]
pub struct Mark {
    pub position:isize,
    pub knot:Knot,
}
impl Mark {
    /// The mark before the first knot, standing for the start of the paragraph.
    pub fn start() -> Self { Mark { position:-1, knot:Knot::Mark(0) } }
    pub fn is_start(&self) -> bool { self.position < 0 }
    /// The position as an index, or `None` for [`Mark::start`].
    pub fn index(&self) -> Option<usize> { usize::try_from(self.position).ok() }
}

/**
  Navigates a khipu. A new cursor is positioned *before* the first knot
  (position -1); [`next`](Cursor::next) moves it onto the first one.

  `K` is either `&Khipu`, for navigation, or `&mut Khipu`, which additionally
  allows [`replace_knot`](Cursor::replace_knot).

  ```
  use khipu_engine::khipu::{Khipu, Cursor};
  use khipu_engine::khipu::knots::Knot;
  let mut k = Khipu::new();
  k.append(Knot::penalty(0)).append(Knot::penalty(10000));
  let mut c = Cursor::new(&k);
  assert!(c.next());
  assert_eq!(c.peek(), Some(&Knot::Penalty(10000)));
  assert!(c.next());
  assert!(!c.next());
  ```
*/
#[derive(Debug)]
pub struct Cursor<K> {
    khipu:K,
    pos:isize,
}
impl<K:Deref<Target=Khipu>> Cursor<K> {
    pub fn new(khipu:K) -> Self { Cursor { khipu, pos:-1 } }
    pub fn khipu(&self) -> &Khipu { &self.khipu }
    pub fn position(&self) -> isize { self.pos }
    /// Whether the cursor is on a knot (and not before the first or after the last one).
    pub fn is_valid_position(&self) -> bool {
        self.pos >= 0 && (self.pos as usize) < self.khipu.len()
    }
    /// Moves to the next knot; `false` once the cursor moves past the end.
    pub fn next(&mut self) -> bool {
        let len = self.khipu.len() as isize;
        if self.pos < len { self.pos += 1 }
        self.pos < len
    }
    /// Moves to the previous knot; `false` once the cursor moves before the start.
    pub fn prev(&mut self) -> bool {
        if self.pos >= 0 { self.pos -= 1 }
        self.pos >= 0
    }
    /// The knot at the current position.
    pub fn knot(&self) -> Option<&Knot> {
        if self.is_valid_position() { self.khipu.knot(self.pos as usize) } else { None }
    }
    /// The knot after the current position, without moving.
    pub fn peek(&self) -> Option<&Knot> {
        let next = self.pos + 1;
        if next >= 0 { self.khipu.knot(next as usize) } else { None }
    }
    /// A mark for the current position; [`Mark::start`] before the first knot.
    pub fn mark(&self) -> Mark {
        match self.knot() {
            Some(k) => Mark { position:self.pos, knot:k.clone() },
            None if self.pos < 0 => Mark::start(),
            None => Mark { position:self.pos, knot:Knot::Mark(0) }
        }
    }
    /// Moves to `mark`.
    pub fn set_position(&mut self,mark:&Mark) {
        self.pos = mark.position.clamp(-1,self.khipu.len() as isize);
    }
}
impl<K:DerefMut<Target=Khipu>> Cursor<K> {
    /// Replaces the knot at the current position, returning the old one.
    ///
    /// # Panics
    /// if the cursor is not on a knot.
    pub fn replace_knot(&mut self,knot:Knot) -> Knot {
        assert!(self.is_valid_position(),"replace_knot at invalid cursor position {}",self.pos);
        let pos = self.pos as usize;
        self.khipu.replace_knot(pos,knot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimen::Dimen;
    use crate::khipu::knots::{Glue, TextBox};

    fn sample() -> Khipu {
        let mut k = Khipu::new();
        k.append(Knot::TextBox(TextBox::new("a", Dimen::BP, Dimen::ZERO, Dimen::ZERO)))
            .append(Knot::Glue(Glue::fil()))
            .append(Knot::penalty(-10000));
        k
    }

    #[test]
    fn navigation() {
        let k = sample();
        let mut c = Cursor::new(&k);
        assert_eq!(c.position(), -1);
        assert!(!c.is_valid_position());
        assert_eq!(c.knot(), None);
        assert_eq!(c.mark(), Mark::start());
        let mut seen = 0;
        while c.next() {
            assert!(c.is_valid_position());
            seen += 1;
        }
        assert_eq!(seen, 3);
        assert_eq!(c.position(), 3);
        assert!(!c.next());
        assert!(c.prev());
        assert_eq!(c.knot(), Some(&Knot::Penalty(-10000)));
        assert_eq!(c.peek(), None);
        while c.prev() {}
        assert_eq!(c.position(), -1);
        assert!(matches!(c.peek(), Some(Knot::TextBox(_))));
    }

    #[test]
    fn replacing_a_knot_with_its_mark_is_a_no_op() {
        let mut k = sample();
        let original = k.clone();
        for i in 0..original.len() {
            let mut c = Cursor::new(&mut k);
            for _ in 0..=i { c.next(); }
            let m = c.mark();
            assert_eq!(m.position, i as isize);
            c.replace_knot(m.knot);
            assert_eq!(c.khipu(), &original);
        }
    }

    #[test]
    #[should_panic]
    fn replacing_before_start_panics() {
        let mut k = sample();
        let mut c = Cursor::new(&mut k);
        c.replace_knot(Knot::penalty(0));
    }
}
