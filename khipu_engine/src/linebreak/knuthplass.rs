/*! Optimal line breaking after Knuth and Plass.

   Feasible breakpoints and the lines between them form a DAG, the
   [`BreakGraph`]. Nodes are kept in an arena keyed by khipu position; each
   node holds, per line count, the minimal total demerits of any path reaching
   it and the predecessor on that path. Edges are values keyed by
   `(from, to, linecount)`.

   While the cursor walks the khipu, a *horizon* of active `(position,
   linecount)` pairs is maintained. At every legal break, a line from every
   active pair is tried; feasible lines become edges. Pairs from which the
   line would already be overfull, and all pairs at a forced break, are
   deactivated.

   As in TeX, up to three passes are made: without discretionaries under
   `pretolerance`, with discretionaries under `tolerance`, and finally with
   `emergency_stretch`. Only the last pass may give up on the tolerance: if the
   horizon runs empty, the best deactivated pair is connected to the current
   break by an overfull line.
 */

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::ops::Deref;
use crate::dimen::Dimen;
use crate::khipu::{Cursor, Khipu, Mark};
use crate::khipukamayuq::location;
use crate::linebreak::{demerits, Breakpoints, Fit, Line, LineBreakParameters, Paragraph, Parshape, INF_BAD};
use crate::utils::HMap;
use crate::utils::diagnostics::Diagnostics;

/// A line from the break at `from` to the break at `to`, as line number `linecount`.
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub struct Edge {
    pub from:isize,
    pub to:isize,
    pub linecount:usize,
    /// demerits of the line
    pub cost:i32,
    /// demerits of the best path to `from` plus `cost`
    pub total:i64,
    pub badness:i32,
    /// the line is overfull and was only accepted because nothing else was left
    pub artificial:bool,
}

/// Best path into a node for one line count.
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
struct Book {
    total:i64,
    predecessor:Option<isize>,
}

#[derive(Clone,Debug)]
struct Node {
    mark:Mark,
    flagged:bool,
    books:BTreeMap<usize,Book>,
}

/// The graph of feasible breakpoints built by one pass.
#[derive(Clone,Debug)]
pub struct BreakGraph {
    nodes:BTreeMap<isize,Node>,
    edges:HMap<(isize,isize,usize),Edge>,
    pruned:Vec<Edge>,
    prune:bool,
}
impl BreakGraph {
    fn new(prune:bool) -> Self {
        let mut nodes = BTreeMap::new();
        let mut books = BTreeMap::new();
        books.insert(0,Book { total:0, predecessor:None });
        nodes.insert(-1,Node { mark:Mark::start(), flagged:false, books });
        BreakGraph { nodes, edges:HMap::default(), pruned:Vec::new(), prune }
    }
    /// The live edges.
    pub fn edges(&self) -> impl Iterator<Item=&Edge> { self.edges.values() }
    /// Edges replaced by better ones.
    pub fn pruned_edges(&self) -> &[Edge] { &self.pruned }
    pub fn edge(&self,from:isize,to:isize,linecount:usize) -> Option<&Edge> { self.edges.get(&(from,to,linecount)) }
    /// Positions of all feasible breakpoints, including the paragraph start.
    pub fn nodes(&self) -> impl Iterator<Item=&Mark> { self.nodes.values().map(|n| &n.mark) }
    /// Minimal total demerits of reaching `pos` with `linecount` lines.
    pub fn total(&self,pos:isize,linecount:usize) -> Option<i64> {
        self.book(pos,linecount).map(|b| b.total)
    }
    fn book(&self,pos:isize,linecount:usize) -> Option<&Book> {
        self.nodes.get(&pos).and_then(|n| n.books.get(&linecount))
    }
    fn flagged(&self,pos:isize) -> bool { self.nodes.get(&pos).is_some_and(|n| n.flagged) }

    /// The breakpoints on the best path to `pos` with `linecount` lines, paragraph start excluded.
    fn chain(&self,mut pos:isize,mut linecount:usize) -> Vec<isize> {
        let mut ret = Vec::with_capacity(linecount);
        while let Some(book) = self.book(pos,linecount) {
            if pos >= 0 { ret.push(pos) }
            match book.predecessor {
                Some(p) => { pos = p; linecount -= 1 }
                None => break
            }
        }
        ret.reverse();
        ret
    }
    /// Orders two candidate predecessors of the same line count: earlier breakpoints first.
    fn compare_paths(&self,a:isize,b:isize,linecount:usize) -> Ordering {
        let mut ca = self.chain(a,linecount);
        let mut cb = self.chain(b,linecount);
        if a >= 0 && ca.last() != Some(&a) { ca.push(a) }
        if b >= 0 && cb.last() != Some(&b) { cb.push(b) }
        ca.cmp(&cb)
    }

    /// Adds `edge`; the book of its target is updated if the edge improves on it.
    ///
    /// # Panics
    /// if the edge does not lead forward.
    fn add_edge(&mut self,edge:Edge,mark:&Mark,flagged:bool) {
        assert!(edge.from < edge.to,"breakpoint graph edge {} → {} does not lead forward",edge.from,edge.to);
        let previous = self.book(edge.to,edge.linecount).copied();
        let better = match previous {
            None => true,
            Some(book) => edge.total < book.total || (edge.total == book.total && match book.predecessor {
                Some(p) => self.compare_paths(edge.from,p,edge.linecount - 1) == Ordering::Less,
                None => false
            })
        };
        let node = self.nodes.entry(edge.to).or_insert_with(|| Node { mark:mark.clone(), flagged, books:BTreeMap::new() });
        if better {
            node.books.insert(edge.linecount,Book { total:edge.total, predecessor:Some(edge.from) });
            if let Some(Book { predecessor:Some(p), .. }) = previous {
                if self.prune {
                    if let Some(old) = self.edges.remove(&(p,edge.to,edge.linecount)) {
                        log::trace!(target:"knuthplass","pruning {:?}",old);
                        self.pruned.push(old)
                    }
                }
            }
            self.edges.insert((edge.from,edge.to,edge.linecount),edge);
        } else if self.prune {
            self.pruned.push(edge)
        } else {
            self.edges.insert((edge.from,edge.to,edge.linecount),edge);
        }
    }

    /// The best way of reaching `pos`: minimal total, then fewest lines. Books are
    /// ordered by line count, so on equal totals the first one stays.
    fn best(&self,pos:isize) -> Option<(usize,i64)> {
        let node = self.nodes.get(&pos)?;
        node.books.iter().fold(None,|best,(l,book)| match best {
            Some((_,t)) if t <= book.total => best,
            _ => Some((*l,book.total))
        })
    }

    /// The edges of the best path to `pos` with `linecount` lines, in paragraph order.
    fn path(&self,mut pos:isize,mut linecount:usize) -> Vec<Edge> {
        let mut ret = Vec::with_capacity(linecount);
        while let Some(Book { predecessor:Some(p), .. }) = self.book(pos,linecount) {
            match self.edges.get(&(*p,pos,linecount)) {
                Some(e) => ret.push(*e),
                None => break
            }
            pos = *p;
            linecount -= 1;
        }
        ret.reverse();
        ret
    }
}

struct Pass {
    number:u8,
    threshold:i32,
    discretionaries:bool,
    background:Dimen,
    last:bool,
}

fn run_pass<K:Deref<Target=Khipu>>(cursor:&mut Cursor<K>,para:&Paragraph,parshape:&dyn Parshape,params:&LineBreakParameters,pass:&Pass) -> BreakGraph {
    log::debug!(target:"knuthplass","pass {} (threshold {})",pass.number,pass.threshold);
    let mut graph = BreakGraph::new(params.prune);
    let mut active:Vec<(isize,usize)> = vec![(-1,0)];
    let last = para.len() as isize - 1;
    cursor.set_position(&Mark::start());
    while cursor.next() {
        let pos = cursor.position();
        let Some(candidate) = para.legal_break(pos as usize,params,pass.discretionaries) else { continue };
        let mark = cursor.mark();
        let mut found = false;
        let mut deactivated:Vec<(isize,usize)> = Vec::new();
        let mut best_overfull:Option<(i64,isize,usize)> = None;
        for &(from,linecount) in &active {
            let Some(total) = graph.total(from,linecount) else { continue };
            let line = linecount + 1;
            let wss = para.line(from,pos as usize);
            let fit = Fit::new(&wss,parshape.line_length(line),pass.background);
            if fit.is_overfull() || candidate.is_forced() {
                deactivated.push((from,linecount));
            }
            if fit.is_overfull() {
                if best_overfull.map_or(true,|(t,_,l)| total < t || (total == t && linecount < l)) {
                    best_overfull = Some((total,from,linecount));
                }
                continue
            }
            if fit.badness > pass.threshold && !candidate.is_forced() { continue }
            let cost = demerits(params,fit.badness,&candidate,graph.flagged(from),pos == last);
            let cost = i32::try_from(cost).unwrap_or(i32::MAX);
            graph.add_edge(Edge {
                from, to:pos, linecount:line, cost, total:total.saturating_add(i64::from(cost)),
                badness:fit.badness, artificial:false
            },&mark,candidate.flagged);
            found = true;
        }
        active.retain(|a| !deactivated.contains(a));
        if !found && active.is_empty() {
            match best_overfull {
                Some((total,from,linecount)) if pass.last => {
                    log::debug!(target:"knuthplass","no feasible line ends at {}; accepting an overfull line from {}",pos,from);
                    let cost = demerits(params,INF_BAD,&candidate,graph.flagged(from),pos == last);
                    let cost = i32::try_from(cost).unwrap_or(i32::MAX);
                    graph.add_edge(Edge {
                        from, to:pos, linecount:linecount + 1, cost, total:total.saturating_add(i64::from(cost)),
                        badness:INF_BAD, artificial:true
                    },&mark,candidate.flagged);
                    found = true;
                }
                _ => {
                    log::debug!(target:"knuthplass","pass {} failed at {}",pass.number,pos);
                    return graph
                }
            }
        }
        if found {
            if let Some(node) = graph.nodes.get(&pos) {
                for l in node.books.keys() {
                    if !active.contains(&(pos,*l)) { active.push((pos,*l)) }
                }
            }
        }
        log::trace!(target:"knuthplass","{} active after {}",active.len(),pos);
    }
    graph
}

/// Finds the breakpoints with minimal total demerits; see the [module documentation](self).
/// The cursor is left on the last breakpoint.
pub fn find_breakpoints<K:Deref<Target=Khipu>,D:Diagnostics>(cursor:&mut Cursor<K>,parshape:&dyn Parshape,params:&LineBreakParameters,diagnostics:D) -> Breakpoints {
    find_breakpoints_with_graph(cursor,parshape,params,diagnostics).0
}

/// Like [`find_breakpoints`], but also returns the graph of the successful pass.
pub fn find_breakpoints_with_graph<K:Deref<Target=Khipu>,D:Diagnostics>(cursor:&mut Cursor<K>,parshape:&dyn Parshape,params:&LineBreakParameters,diagnostics:D) -> (Breakpoints,BreakGraph) {
    let ret = break_paragraph(cursor.khipu(),parshape,params,diagnostics);
    if let Some(m) = ret.0.marks.last() { cursor.set_position(m) }
    ret
}

fn break_paragraph<D:Diagnostics>(khipu:&Khipu,parshape:&dyn Parshape,params:&LineBreakParameters,mut diagnostics:D) -> (Breakpoints,BreakGraph) {
    if khipu.is_empty() {
        return (Breakpoints::empty(),BreakGraph::new(params.prune))
    }
    let para = Paragraph::new(khipu,params);
    let last = para.len() as isize - 1;
    let emergency = params.emergency_stretch > Dimen::ZERO;
    let mut passes = Vec::with_capacity(3);
    if params.pretolerance >= 0 {
        passes.push(Pass { number:1, threshold:params.pretolerance, discretionaries:false, background:Dimen::ZERO, last:false });
    }
    passes.push(Pass { number:2, threshold:params.tolerance, discretionaries:true, background:Dimen::ZERO, last:!emergency });
    if emergency {
        passes.push(Pass { number:3, threshold:params.tolerance, discretionaries:true, background:params.emergency_stretch, last:true });
    }
    let mut cursor = Cursor::new(khipu);
    let mut graph = BreakGraph::new(params.prune);
    let mut number = 0;
    for pass in &passes {
        graph = run_pass(&mut cursor,&para,parshape,params,pass);
        number = pass.number;
        if graph.best(last).is_some() { break }
    }
    let Some((linecount,total)) = graph.best(last) else {
        log::warn!(target:"knuthplass","no breaks found; setting the paragraph as a single line");
        let length = parshape.line_length(1);
        let line = Line::new(&para,1,-1,last as usize,length,INF_BAD,0);
        diagnostics.overfull(1,line.wss.min().saturating_sub(length).max(Dimen::ZERO),location(khipu,last as usize));
        cursor.set_position(&Mark { position:last, knot:Mark::start().knot });
        let marks = vec![Mark::start(),cursor.mark()];
        return (Breakpoints { marks, lines:vec![line], demerits:0, pass:number },graph)
    };
    let path = graph.path(last,linecount);
    let mut marks = Vec::with_capacity(path.len() + 1);
    marks.push(Mark::start());
    let mut lines = Vec::with_capacity(path.len());
    for e in &path {
        if let Some(n) = graph.nodes.get(&e.to) { marks.push(n.mark.clone()) }
        let length = parshape.line_length(e.linecount);
        let line = Line::new(&para,e.linecount,e.from,e.to as usize,length,e.badness,i64::from(e.cost));
        if e.artificial || line.is_overfull() {
            diagnostics.overfull(e.linecount,line.wss.min().saturating_sub(length),location(khipu,e.to as usize));
        } else if e.badness > params.tolerance {
            diagnostics.underfull(e.linecount,e.badness,location(khipu,e.to as usize));
        }
        lines.push(line);
    }
    log::debug!(target:"knuthplass","{} lines, {} demerits (pass {})",lines.len(),total,number);
    (Breakpoints { marks, lines, demerits:total, pass:number },graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::khipu::knots::{Glue, Knot, TextBox};
    use crate::linebreak::RectangularParshape;
    use crate::utils::diagnostics::{Collect, DiagnosticKind, Discard};

    fn word(n:i32) -> Knot { Knot::TextBox(TextBox::new("x".repeat(n as usize), Dimen::BP * 10 * n, Dimen::ZERO, Dimen::ZERO)) }
    fn space(k:&mut Khipu) {
        k.append(Knot::penalty(10000))
            .append(Knot::Glue(Glue::from_dimens(Dimen::BP * 10, Dimen::BP * 5, Dimen::BP * 3)))
            .append(Knot::penalty(0));
    }
    fn paragraph(words:&[i32]) -> Khipu {
        let mut k = Khipu::new();
        for (i,w) in words.iter().enumerate() {
            if i > 0 { space(&mut k) }
            k.append(word(*w));
        }
        k.append(Knot::penalty(10000)).append(Knot::Glue(Glue::fil())).append(Knot::penalty(0))
            .append(Knot::TextBox(TextBox::default()));
        k
    }

    #[test]
    fn single_line() {
        let k = paragraph(&[2, 3]);
        let p = RectangularParshape::new(Dimen::BP * 100).unwrap();
        let b = find_breakpoints(&mut Cursor::new(&k), &p, &LineBreakParameters::default(), Discard);
        assert_eq!(b.positions(), vec![-1, k.len() as isize - 1]);
        assert_eq!(b.demerits, 100);
        assert_eq!(b.pass, 1);
    }

    #[test]
    fn forced_break_is_taken() {
        let mut k = Khipu::new();
        k.append(word(3)).append(Knot::penalty(-10000)).append(word(3))
            .append(Knot::Glue(Glue::fil())).append(Knot::penalty(0)).append(Knot::TextBox(TextBox::default()));
        let p = RectangularParshape::new(Dimen::BP * 100).unwrap();
        let mut diag = Collect::new();
        let b = find_breakpoints(&mut Cursor::new(&k), &p, &LineBreakParameters::default(), &mut diag);
        assert_eq!(b.positions(), vec![-1, 1, 5]);
        // the first line cannot stretch
        assert!(diag.has(DiagnosticKind::UnderfullBox));
    }

    #[test]
    fn overfull_lines_are_reported() {
        let k = paragraph(&[20, 2]);
        let p = RectangularParshape::new(Dimen::BP * 100).unwrap();
        let mut diag = Collect::new();
        let b = find_breakpoints(&mut Cursor::new(&k), &p, &LineBreakParameters::default(), &mut diag);
        assert!(!b.marks.is_empty());
        assert_eq!(b.marks.last().unwrap().position, k.len() as isize - 1);
        assert!(diag.has(DiagnosticKind::OverfullBox));
        assert_eq!(b.pass, 3);
    }

    /// Every line gets so much stretch from the left skip that any line that is
    /// not overfull has badness 0.
    fn loose() -> LineBreakParameters {
        LineBreakParameters {
            pretolerance:-1,
            left_skip:Glue::from_dimens(Dimen::ZERO, Dimen::BP * 1000, Dimen::ZERO),
            ..Default::default()
        }
    }

    #[test]
    fn ties_prefer_earlier_breaks() {
        // "x x | x" and "x | x x" both cost 200
        let k = paragraph(&[1, 1, 1]);
        let p = RectangularParshape::new(Dimen::BP * 40).unwrap();
        let (b,graph) = find_breakpoints_with_graph(&mut Cursor::new(&k), &p, &loose(), Discard);
        assert_eq!(b.positions(), vec![-1, 3, 12]);
        assert_eq!(b.demerits, 200);
        let loser = graph.pruned_edges().iter().find(|e| e.from == 7 && e.to == 12).unwrap();
        assert_eq!(loser.total, 200);
        assert!(graph.nodes().any(|m| m.position == 3));
        for e in graph.edges().chain(graph.pruned_edges().iter()) {
            assert!(e.from < e.to);
        }
    }

    #[test]
    fn ties_prefer_fewer_lines() {
        // with a fil right skip and no line penalty every line costs nothing
        let mut k = Khipu::new();
        k.append(word(5)).append(Knot::penalty(0)).append(word(5));
        let p = RectangularParshape::new(Dimen::BP * 100).unwrap();
        let params = LineBreakParameters { line_penalty:0, right_skip:Glue::fil(), ..LineBreakParameters::default() };
        let (b,graph) = find_breakpoints_with_graph(&mut Cursor::new(&k), &p, &params, Discard);
        assert_eq!(graph.total(2, 1), Some(0));
        assert_eq!(graph.total(2, 2), Some(0));
        assert_eq!(b.positions(), vec![-1, 2]);
        assert_eq!(b.line_count(), 1);
        assert_eq!(b.demerits, 0);
    }

    #[test]
    fn pruning_keeps_the_best_edge() {
        let k = paragraph(&[2, 2, 2, 2, 2, 2]);
        let p = RectangularParshape::new(Dimen::BP * 50).unwrap();
        let pruned = loose();
        let kept = LineBreakParameters { prune:false, ..pruned.clone() };
        let (b1,g1) = find_breakpoints_with_graph(&mut Cursor::new(&k), &p, &pruned, Discard);
        let (b2,g2) = find_breakpoints_with_graph(&mut Cursor::new(&k), &p, &kept, Discard);
        assert_eq!(b1.positions(), b2.positions());
        assert_eq!(b1.demerits, b2.demerits);
        assert_eq!(b1.line_count(), 3);
        assert!(!g1.pruned_edges().is_empty());
        assert!(g2.pruned_edges().is_empty());
        assert_eq!(g1.edges().count() + g1.pruned_edges().len(), g2.edges().count());
        for e in g1.edges() {
            assert!(g1.pruned_edges().iter().all(|p| (p.to, p.linecount) != (e.to, e.linecount) || p.total >= e.total));
        }
    }

    #[test]
    #[should_panic]
    fn backward_edges_panic() {
        let mut g = BreakGraph::new(true);
        g.add_edge(Edge { from:5, to:3, linecount:1, cost:0, total:0, badness:0, artificial:false }, &Mark::start(), false);
    }

    /// Minimal total demerits over all sequences of feasible lines, by exhaustive search.
    fn brute_force(k:&Khipu, len:Dimen, params:&LineBreakParameters) -> Option<i64> {
        let para = Paragraph::new(k, params);
        let last = k.len() - 1;
        fn go(para:&Paragraph, params:&LineBreakParameters, len:Dimen, from:isize, flagged:bool, last:usize) -> Option<i64> {
            let mut best = None;
            for to in (from + 1) as usize..=last {
                let Some(c) = para.legal_break(to, params, true) else { continue };
                let fit = Fit::new(&para.line(from, to), len, Dimen::ZERO);
                if fit.is_overfull() || (fit.badness > params.tolerance && !c.is_forced()) { continue }
                let d = demerits(params, fit.badness, &c, flagged, to == last);
                let rest = if to == last { Some(0) } else { go(para, params, len, to as isize, c.flagged, last) };
                if let Some(r) = rest {
                    let t = d + r;
                    if best.map_or(true, |b| t < b) { best = Some(t) }
                }
                if c.is_forced() { break }
            }
            best
        }
        go(&para, params, len, -1, false, last)
    }

    #[test]
    fn optimal_against_exhaustive_search() {
        let params = LineBreakParameters { pretolerance:-1, emergency_stretch:Dimen::ZERO, ..Default::default() };
        for (words,len) in [
            (vec![3, 2, 5, 1, 4, 2, 3, 6, 2], 90),
            (vec![1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1], 40),
            (vec![5, 4, 3, 2, 1, 2, 3, 4, 5], 120),
        ] {
            let k = paragraph(&words);
            let length = Dimen::BP * len;
            let p = RectangularParshape::new(length).unwrap();
            let b = find_breakpoints(&mut Cursor::new(&k), &p, &params, Discard);
            if let Some(optimum) = brute_force(&k, length, &params) {
                assert_eq!(b.demerits, optimum, "for {:?}", words);
            }
            assert_eq!(b.lines.iter().map(|l| l.demerits).sum::<i64>(), b.demerits);
        }
    }
}
