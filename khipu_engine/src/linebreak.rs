/*! Breaking a khipu into lines.

   Two line breakers share the measures defined here:
   * [`knuthplass`] finds the sequence of breakpoints with minimal total
     demerits, as TeX does;
   * [`firstfit`] greedily fills each line up to the last break that fits.

   Both walk the khipu with a [`Cursor`](crate::khipu::Cursor) and return
   [`Breakpoints`]: the list of [`Mark`]s at which lines end, preceded by
   [`Mark::start`].

   Badness and demerits are computed in integers exactly as in TeX
   (B-Book §108, §859). Penalties and badness are limited to
   `[-10000,10000]`; demerits are not limited and add up in 64 bits.
 */

pub mod firstfit;
pub mod knuthplass;

use crate::dimen::Dimen;
use crate::khipu::{Khipu, Mark};
use crate::khipu::knots::{Glue, Knot, Wss, PENALTY_FORCE, PENALTY_INFINITY};
use crate::registers::TypesettingRegisters;
use crate::utils::errors::ConfigError;

/// Badness of a line that cannot be stretched far enough.
pub const INF_BAD: i32 = 10000;
/// Badness marking an overfull line, i.e. one that cannot be shrunk far enough.
pub const OVERFULL_BADNESS: i32 = INF_BAD + 1;

/// Parameters of the line breakers.
#[derive(Clone,Debug,PartialEq,Eq)]
pub struct LineBreakParameters {
    /// Maximal badness of a feasible line in the second and third pass.
    pub tolerance:i32,
    /// Maximal badness of a feasible line in the first pass, which ignores
    /// discretionaries. Negative values skip the first pass.
    pub pretolerance:i32,
    /// Added to the badness of every line before squaring.
    pub line_penalty:i32,
    /// Penalty for breaking at a discretionary.
    pub hyphen_penalty:i32,
    /// Demerits for two consecutive lines ending at discretionaries.
    pub adjacent_demerits:i32,
    /// Demerits for a hyphenated second to last line.
    pub final_hyphen_demerits:i32,
    /// Stretch assumed in addition to the actual stretch of each line in the third pass.
    pub emergency_stretch:Dimen,
    pub left_skip:Glue,
    pub right_skip:Glue,
    /// Keep only the best edge into every breakpoint per line count; inferior
    /// edges are moved to [`BreakGraph::pruned_edges`](knuthplass::BreakGraph::pruned_edges).
    pub prune:bool,
}
impl Default for LineBreakParameters {
    fn default() -> Self {
        LineBreakParameters {
            tolerance:5000,
            pretolerance:100,
            line_penalty:10,
            hyphen_penalty:50,
            adjacent_demerits:0,
            final_hyphen_demerits:50,
            emergency_stretch:Dimen::BP * 50,
            left_skip:Glue::zero(),
            right_skip:Glue::zero(),
            prune:true,
        }
    }
}
impl LineBreakParameters {
    /// The defaults, with the hyphen penalty taken from the registers if set there.
    pub fn from_registers(regs:&TypesettingRegisters) -> Self {
        let mut ret = Self::default();
        if regs.hyphen_penalty() != 0 {
            ret.hyphen_penalty = regs.hyphen_penalty();
        }
        ret
    }
}

/// The target length of each line of a paragraph.
pub trait Parshape {
    /// The length of line `line`, counting from 1.
    fn line_length(&self,line:usize) -> Dimen;
}
impl<F:Fn(usize) -> Dimen> Parshape for F {
    fn line_length(&self, line: usize) -> Dimen { self(line) }
}

/// All lines have the same length.
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub struct RectangularParshape(Dimen);
impl RectangularParshape {
    pub fn new(length:Dimen) -> Result<Self,ConfigError> {
        if length <= Dimen::ZERO { Err(ConfigError::NonPositiveLineLength(length)) } else { Ok(RectangularParshape(length)) }
    }
    pub fn length(&self) -> Dimen { self.0 }
}
impl Parshape for RectangularParshape {
    fn line_length(&self, _line: usize) -> Dimen { self.0 }
}

/// Explicit lengths for the first lines; the last one repeats, like TeX's `\parshape`.
#[derive(Clone,Debug,PartialEq,Eq)]
pub struct VariableParshape(Vec<Dimen>);
impl VariableParshape {
    pub fn new(lengths:Vec<Dimen>) -> Result<Self,ConfigError> {
        match lengths.iter().find(|l| **l <= Dimen::ZERO) {
            Some(l) => Err(ConfigError::NonPositiveLineLength(*l)),
            None if lengths.is_empty() => Err(ConfigError::NonPositiveLineLength(Dimen::ZERO)),
            None => Ok(VariableParshape(lengths))
        }
    }
}
impl Parshape for VariableParshape {
    fn line_length(&self, line: usize) -> Dimen {
        let i = line.saturating_sub(1).min(self.0.len() - 1);
        self.0[i]
    }
}

/// TeX's badness: roughly `100·(t/s)³`, computed in integers (B-Book §108).
pub fn badness(t:Dimen,s:Dimen) -> i32 {
    let (t,s) = (i64::from(t.0),i64::from(s.0));
    if t == 0 { return 0 }
    if s <= 0 { return INF_BAD }
    let r = if t <= 7230584 { t * 297 / s }
        else if s >= 1663497 { t / (s / 297) }
        else { t };
    if r > 1290 { INF_BAD } else { ((r * r * r + 0x20000) / 0x40000) as i32 }
}

/// How well a line with measures `wss` fills `length`.
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub struct Fit {
    pub badness:i32,
    /// how much the line is too wide even when shrunk; zero unless overfull
    pub excess:Dimen,
}
impl Fit {
    /// `background` is stretch assumed in addition to the line's own finite stretch.
    pub fn new(wss:&Wss,length:Dimen,background:Dimen) -> Self {
        let shortfall = length.saturating_sub(wss.w());
        if shortfall > Dimen::ZERO {
            if wss.stretch_order() > 0 { return Fit { badness:0, excess:Dimen::ZERO } }
            Fit { badness:badness(shortfall,wss.stretch[0].saturating_add(background)), excess:Dimen::ZERO }
        } else if shortfall < Dimen::ZERO {
            if wss.shrink_order() > 0 { return Fit { badness:0, excess:Dimen::ZERO } }
            let excess = -shortfall;
            if excess > wss.shrink[0] {
                Fit { badness:OVERFULL_BADNESS, excess:excess - wss.shrink[0] }
            } else {
                Fit { badness:badness(excess,wss.shrink[0]), excess:Dimen::ZERO }
            }
        } else {
            Fit { badness:0, excess:Dimen::ZERO }
        }
    }
    pub fn is_overfull(&self) -> bool { self.badness > INF_BAD }
}

/// A legal breakpoint.
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub struct Candidate {
    pub penalty:i32,
    /// a break at a discretionary
    pub flagged:bool,
}
impl Candidate {
    pub fn is_forced(&self) -> bool { self.penalty <= PENALTY_FORCE }
}

/// Demerits of a line with badness `badness` ending at `candidate`, TeX's §859.
/// `previous_flagged` tells whether the line before ended at a discretionary,
/// `last` whether this is the last line of the paragraph.
pub fn demerits(params:&LineBreakParameters,badness:i32,candidate:&Candidate,previous_flagged:bool,last:bool) -> i64 {
    let b = i64::from(badness.min(INF_BAD));
    let mut d = i64::from(params.line_penalty) + b;
    d = if d.abs() >= 10000 { 100_000_000 } else { d * d };
    let p = i64::from(candidate.penalty);
    if p > 0 { d += p * p } else if p > i64::from(PENALTY_FORCE) { d -= p * p }
    if previous_flagged {
        if last { d += i64::from(params.final_hyphen_demerits) }
        else if candidate.flagged { d += i64::from(params.adjacent_demerits) }
    }
    d
}

/// Cumulative measures of a khipu, for measuring arbitrary lines in constant time.
pub(crate) struct Paragraph<'k> {
    khipu:&'k Khipu,
    /// `sums[i]` measures the knots `0..i`
    sums:Vec<Wss>,
    skips:Wss,
}
impl<'k> Paragraph<'k> {
    pub(crate) fn new(khipu:&'k Khipu,params:&LineBreakParameters) -> Self {
        let mut sums = Vec::with_capacity(khipu.len() + 1);
        let mut acc = Wss::default();
        sums.push(acc);
        for k in khipu {
            acc.add_knot(k);
            sums.push(acc);
        }
        let mut skips = Wss::default();
        skips.add_glue(&params.left_skip);
        skips.add_glue(&params.right_skip);
        Paragraph { khipu, sums, skips }
    }
    pub(crate) fn len(&self) -> usize { self.khipu.len() }
    pub(crate) fn khipu(&self) -> &'k Khipu { self.khipu }

    /// Whether the paragraph may be broken at `pos`, and at what cost.
    pub(crate) fn legal_break(&self,pos:usize,params:&LineBreakParameters,discretionaries:bool) -> Option<Candidate> {
        if pos + 1 == self.len() {
            return Some(Candidate { penalty:PENALTY_FORCE, flagged:false })
        }
        match self.khipu.knot(pos)? {
            Knot::Penalty(p) if *p < PENALTY_INFINITY => Some(Candidate { penalty:*p, flagged:false }),
            Knot::Glue(_) if pos > 0 && self.khipu.knot(pos - 1).is_some_and(|k| !k.is_discardable()) =>
                Some(Candidate { penalty:0, flagged:false }),
            Knot::Discretionary(_) if discretionaries =>
                Some(Candidate { penalty:params.hyphen_penalty, flagged:true }),
            _ => None
        }
    }

    /// First knot of a line following a break at `from`: discardable knots after
    /// the break are dropped.
    pub(crate) fn line_start(&self,from:isize) -> usize {
        let Ok(from) = usize::try_from(from) else { return 0 };
        let mut start = from + 1;
        if let Some(Knot::Discretionary(d)) = self.khipu.knot(from) {
            if d.post.is_some() { return start }
        }
        while start + 1 < self.len() && self.khipu.knot(start).is_some_and(Knot::is_discardable) {
            start += 1
        }
        start
    }
    /// End (exclusive) of a line broken at `to`: glue and penalties right before the
    /// break are dropped. The last knot ends the paragraph and belongs to its line.
    pub(crate) fn line_end(&self,to:usize) -> usize {
        if to + 1 >= self.len() { return self.len() }
        let mut end = to;
        while end > 0 && matches!(self.khipu.knot(end - 1),Some(Knot::Glue(_) | Knot::Penalty(_))) {
            end -= 1
        }
        end
    }
    /// Measures of the line from the break at `from` to the break at `to`,
    /// including the material of discretionaries taken at either end and the
    /// left and right skips.
    pub(crate) fn line(&self,from:isize,to:usize) -> Wss {
        let start = self.line_start(from);
        let end = self.line_end(to).max(start);
        let mut wss = self.sums[end].subtract(&self.sums[start]);
        if let Some(Knot::Discretionary(d)) = usize::try_from(from).ok().and_then(|f| self.khipu.knot(f)) {
            wss.width = wss.width.saturating_add(d.post_width());
        }
        if to + 1 < self.len() {
            if let Some(Knot::Discretionary(d)) = self.khipu.knot(to) {
                wss.width = wss.width.saturating_add(d.pre_width());
            }
        }
        wss.add(&self.skips)
    }
}

/// One line of a broken paragraph.
#[derive(Clone,Debug,PartialEq,Eq)]
pub struct Line {
    /// counting from 1
    pub number:usize,
    /// the break ending the previous line; -1 for the first line
    pub from:isize,
    /// the break ending this line
    pub to:usize,
    /// the knots of the line proper are `start..end`
    pub start:usize,
    pub end:usize,
    pub length:Dimen,
    pub wss:Wss,
    pub badness:i32,
    pub demerits:i64,
}
impl Line {
    pub(crate) fn new(para:&Paragraph,number:usize,from:isize,to:usize,length:Dimen,badness:i32,demerits:i64) -> Self {
        let start = para.line_start(from);
        Line {
            number, from, to, start, end:para.line_end(to).max(start), length,
            wss:para.line(from,to), badness, demerits
        }
    }
    pub fn is_overfull(&self) -> bool { self.wss.min() > self.length }
    /// Adjustment ratio: the share of their stretch (positive) or shrink (negative)
    /// by which glues of the highest present order are set. For display only.
    pub fn ratio(&self) -> f64 {
        let shortfall = self.length.saturating_sub(self.wss.w());
        let total = if shortfall >= Dimen::ZERO { self.wss.stretch[self.wss.stretch_order()] } else { self.wss.shrink[self.wss.shrink_order()] };
        if total == Dimen::ZERO { 0.0 } else { f64::from(shortfall.0) / f64::from(total.0) }
    }
    /// The width `glue` is set to in this line. Finite shrink is never exceeded.
    pub fn glue_width(&self,glue:&Glue) -> Dimen {
        let shortfall = self.length.saturating_sub(self.wss.w());
        if shortfall > Dimen::ZERO {
            let order = self.wss.stretch_order();
            match glue.stretch {
                Some(s) if s.order() == order && self.wss.stretch[order] > Dimen::ZERO =>
                    glue.width.saturating_add(s.amount().scale(shortfall.0,self.wss.stretch[order].0)),
                _ => glue.width
            }
        } else if shortfall < Dimen::ZERO {
            let order = self.wss.shrink_order();
            let total = self.wss.shrink[order];
            let shortfall = if order == 0 { shortfall.max(-total) } else { shortfall };
            match glue.shrink {
                Some(s) if s.order() == order && total > Dimen::ZERO =>
                    glue.width.saturating_add(s.amount().scale(shortfall.0,total.0)),
                _ => glue.width
            }
        } else { glue.width }
    }
}

/// The result of breaking a paragraph.
#[derive(Clone,Debug,PartialEq,Eq)]
pub struct Breakpoints {
    /// [`Mark::start`], followed by the break ending each line
    pub marks:Vec<Mark>,
    pub lines:Vec<Line>,
    /// sum of the demerits of all lines
    pub demerits:i64,
    /// the pass that found the breaks: 1 without, 2 with discretionaries, 3 with
    /// emergency stretch; 0 for the first-fit breaker
    pub pass:u8,
}
impl Breakpoints {
    pub(crate) fn empty() -> Self {
        Breakpoints { marks:vec![Mark::start()], lines:Vec::new(), demerits:0, pass:0 }
    }
    pub fn positions(&self) -> Vec<isize> { self.marks.iter().map(|m| m.position).collect() }
    pub fn line_count(&self) -> usize { self.lines.len() }
}
