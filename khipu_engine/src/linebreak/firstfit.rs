/*! Greedy line breaking: every line is filled up to the last legal break at
   which it still fits when all its glue is shrunk. Forced breaks are always
   taken. A line without any break that fits is set overfull up to the first
   legal break.
 */

use std::ops::Deref;
use crate::dimen::Dimen;
use crate::khipu::{Cursor, Khipu, Mark};
use crate::khipukamayuq::location;
use crate::linebreak::{demerits, Breakpoints, Candidate, Fit, Line, LineBreakParameters, Paragraph, Parshape, INF_BAD};
use crate::utils::diagnostics::Diagnostics;

struct Breaker<'p,D:Diagnostics> {
    para:Paragraph<'p>,
    parshape:&'p dyn Parshape,
    params:&'p LineBreakParameters,
    diagnostics:D,
    marks:Vec<Mark>,
    lines:Vec<Line>,
    demerits:i64,
    from:isize,
    flagged:bool,
}
impl<D:Diagnostics> Breaker<'_,D> {
    fn commit(&mut self,to:usize,mark:Mark,candidate:&Candidate) {
        let number = self.lines.len() + 1;
        let length = self.parshape.line_length(number);
        let wss = self.para.line(self.from,to);
        let fit = Fit::new(&wss,length,Dimen::ZERO);
        let d = demerits(self.params,fit.badness,candidate,self.flagged,to + 1 == self.para.len());
        let line = Line::new(&self.para,number,self.from,to,length,fit.badness.min(INF_BAD),d);
        if line.is_overfull() {
            self.diagnostics.overfull(number,line.wss.min() - length,location(self.para.khipu(),to));
        } else if fit.badness > self.params.tolerance {
            self.diagnostics.underfull(number,fit.badness,location(self.para.khipu(),to));
        }
        log::trace!(target:"firstfit","line {} ends at {}",number,to);
        self.demerits = self.demerits.saturating_add(d);
        self.lines.push(line);
        self.marks.push(mark);
        self.from = to as isize;
        self.flagged = candidate.flagged;
    }
}

/// Breaks the paragraph greedily. The cursor is left on the last breakpoint.
pub fn find_breakpoints<K:Deref<Target=Khipu>,D:Diagnostics>(cursor:&mut Cursor<K>,parshape:&dyn Parshape,params:&LineBreakParameters,diagnostics:D) -> Breakpoints {
    let ret = break_paragraph(cursor.khipu(),parshape,params,diagnostics);
    if let Some(m) = ret.marks.last() { cursor.set_position(m) }
    ret
}

fn break_paragraph<D:Diagnostics>(khipu:&Khipu,parshape:&dyn Parshape,params:&LineBreakParameters,diagnostics:D) -> Breakpoints {
    if khipu.is_empty() { return Breakpoints::empty() }
    let mut b = Breaker {
        para:Paragraph::new(khipu,params), parshape, params, diagnostics,
        marks:vec![Mark::start()], lines:Vec::new(), demerits:0, from:-1, flagged:false
    };
    let mut cursor = Cursor::new(khipu);
    // the last break of the current line that fits
    let mut fitting:Option<(usize,Mark,Candidate)> = None;
    while cursor.next() {
        let pos = cursor.position() as usize;
        let Some(candidate) = b.para.legal_break(pos,params,true) else { continue };
        loop {
            let length = parshape.line_length(b.lines.len() + 1);
            if b.para.line(b.from,pos).min() <= length {
                if candidate.is_forced() {
                    b.commit(pos,cursor.mark(),&candidate);
                    fitting = None;
                } else {
                    fitting = Some((pos,cursor.mark(),candidate));
                }
                break
            }
            match fitting.take() {
                // the current break starts a new line; try again from there
                Some((to,mark,c)) => b.commit(to,mark,&c),
                None => {
                    b.commit(pos,cursor.mark(),&candidate);
                    break
                }
            }
        }
    }
    log::debug!(target:"firstfit","{} lines",b.lines.len());
    Breakpoints { marks:b.marks, lines:b.lines, demerits:b.demerits, pass:0 }
}
