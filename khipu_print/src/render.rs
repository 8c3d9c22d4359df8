/*! What goes on a page: positioned text runs and rules, serialised to
   PDF content stream operators.
 */

use std::fmt::Write as _;
use std::io::Write;
use khipu_engine::dimen::{Dimen, Point, Rect};
use khipu_engine::khipu::Khipu;
use khipu_engine::khipu::knots::Knot;
use khipu_engine::linebreak::{Breakpoints, Line, LineBreakParameters};
use khipu_fonts::metrics::Font;

#[derive(Clone,Debug,PartialEq,Eq)]
pub enum RenderItem {
    /// A run of text with its baseline starting at `at`.
    Text { at:Point, font:String, size:Dimen, text:String },
    /// A filled rectangle.
    Rule(Rect),
}

/// The content of one page, in page coordinates (origin top left, `y` downwards).
#[derive(Clone,Debug,Default,PartialEq,Eq)]
pub struct RenderTree { items:Vec<RenderItem> }
impl RenderTree {
    pub fn new() -> Self { RenderTree::default() }
    pub fn items(&self) -> &[RenderItem] { &self.items }
    pub fn len(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn push(&mut self,item:RenderItem) -> &mut Self {
        self.items.push(item);
        self
    }
    pub fn text<S:Into<String>>(&mut self,at:Point,font:&Font,text:S) -> &mut Self {
        self.push(RenderItem::Text { at, font:font.name().to_string(), size:Dimen(font.size()), text:text.into() })
    }
    pub fn rule(&mut self,rect:Rect) -> &mut Self {
        self.push(RenderItem::Rule(rect.normalize()))
    }
    pub fn append(&mut self,other:RenderTree) -> &mut Self {
        self.items.extend(other.items);
        self
    }

    /// Writes the content stream for a page of height `page_height`.
    pub fn write_content<W:Write>(&self,page_height:Dimen,out:&mut W) -> std::io::Result<()> {
        for item in &self.items {
            match item {
                RenderItem::Text { at, font, size, text } => writeln!(out,"BT /{} {} Tf {} {} Td ({}) Tj ET",
                    font.replace(' ',""),num(*size),num(at.x),num(page_height - at.y),escape(text))?,
                RenderItem::Rule(r) => writeln!(out,"{} {} {} {} re f",
                    num(r.top_l.x),num(page_height - r.bot_r.y),num(r.width()),num(r.height()))?,
            }
        }
        Ok(())
    }
    pub fn to_content(&self,page_height:Dimen) -> Vec<u8> {
        let mut ret = Vec::new();
        // writing to a Vec cannot fail
        let _ = self.write_content(page_height,&mut ret);
        ret
    }
}

/// Big points with at most two decimals, without trailing zeros.
fn num(d:Dimen) -> String {
    let mut s = format!("{:.2}",d.points());
    while s.ends_with('0') { s.pop(); }
    if s.ends_with('.') { s.pop(); }
    if s == "-0" { s = "0".to_string() }
    s
}

/// A PDF literal string body: delimiters are escaped, bytes outside printable
/// ASCII are written as octal escapes of their UTF-8 encoding.
fn escape(text:&str) -> String {
    let mut ret = String::with_capacity(text.len());
    for b in text.bytes() {
        match b {
            b'(' | b')' | b'\\' => { ret.push('\\'); ret.push(char::from(b)) }
            0x20..=0x7E => ret.push(char::from(b)),
            b => { let _ = write!(ret,"\\{:03o}",b); }
        }
    }
    ret
}

/// Sets the lines of a broken paragraph with `font`: the first baseline lies
/// the font's height below `origin`, the following ones `baseline_skip` apart.
/// Glue is stretched or shrunk as its line demands.
pub fn set_paragraph(khipu:&Khipu,breaks:&Breakpoints,params:&LineBreakParameters,font:&Font,origin:Point,baseline_skip:Dimen) -> RenderTree {
    let mut tree = RenderTree::new();
    let mut y = origin.y + Dimen(font.height());
    for line in &breaks.lines {
        set_line(khipu,line,params,font,Point::new(origin.x,y),&mut tree);
        y += baseline_skip;
    }
    log::debug!(target:"print","set {} lines into {} items",breaks.lines.len(),tree.len());
    tree
}

fn set_line(khipu:&Khipu,line:&Line,params:&LineBreakParameters,font:&Font,baseline:Point,tree:&mut RenderTree) {
    let mut x = baseline.x + line.glue_width(&params.left_skip);
    let put = |knot:&Knot,x:&mut Dimen,tree:&mut RenderTree| match knot {
        Knot::TextBox(tb) => {
            if !tb.text.is_empty() {
                tree.text(Point::new(*x,baseline.y),font,tb.text.as_str());
            }
            *x += tb.width
        }
        Knot::Glue(g) => *x += line.glue_width(g),
        Knot::Kern(d) => *x += *d,
        _ => ()
    };
    if let Some(Knot::Discretionary(d)) = usize::try_from(line.from).ok().and_then(|f| khipu.knot(f)) {
        if let Some(post) = &d.post { put(post,&mut x,tree) }
    }
    for knot in &khipu.knots()[line.start..line.end] {
        match knot {
            Knot::Discretionary(d) => if let Some(nb) = &d.no_break { put(nb,&mut x,tree) },
            k => put(k,&mut x,tree)
        }
    }
    if line.to + 1 < khipu.len() {
        if let Some(Knot::Discretionary(d)) = khipu.knot(line.to) {
            if let Some(pre) = &d.pre { put(pre,&mut x,tree) }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use khipu_engine::khipu::Cursor;
    use khipu_engine::khipu::knots::{Glue, TextBox};
    use khipu_engine::linebreak::{knuthplass, RectangularParshape};
    use khipu_engine::utils::diagnostics::Discard;

    #[test]
    fn content_stream() {
        let font = Font::fixed_width(Dimen::BP.0 * 10);
        let mut tree = RenderTree::new();
        tree.text(Point::new(Dimen::BP * 10,Dimen::BP * 20),&font,"a(b)")
            .rule(Rect::new(Point::new(Dimen::BP * 5,Dimen::BP * 40),Point::new(Dimen::BP,Dimen::BP * 30)));
        let content = String::from_utf8(tree.to_content(Dimen::BP * 100)).unwrap();
        assert_eq!(content,"BT /fixed-width 10 Tf 10 80 Td (a\\(b\\)) Tj ET\n1 60 4 10 re f\n");
        assert_eq!(num(Dimen::BP / 2),"0.5");
    }

    #[test]
    fn escaping() {
        assert_eq!(escape("a(b)\\"),"a\\(b\\)\\\\");
        assert_eq!(escape("Köln"),"K\\303\\266ln");
        assert_eq!(escape("a\tb"),"a\\011b");
        assert!(escape("Grüße – ok").bytes().all(|b| (0x20..=0x7E).contains(&b)));
    }

    #[test]
    fn justified_lines() {
        let font = Font::fixed_width(Dimen::BP.0 * 10);
        let mut k = Khipu::new();
        for (i,w) in ["aaaa","bbbb","cccc","dd"].iter().enumerate() {
            if i > 0 {
                k.append(Knot::Glue(Glue::from_dimens(Dimen::BP * 10,Dimen::BP * 10,Dimen::BP * 5)));
            }
            k.append(Knot::TextBox(TextBox::new(*w,Dimen::BP * 10 * w.len() as i32,Dimen::ZERO,Dimen::ZERO)));
        }
        k.append(Knot::Glue(Glue::fil())).append(Knot::penalty(0)).append(Knot::TextBox(TextBox::default()));
        let params = LineBreakParameters::default();
        let parshape = RectangularParshape::new(Dimen::BP * 100).unwrap();
        let breaks = knuthplass::find_breakpoints(&mut Cursor::new(&k),&parshape,&params,Discard);
        assert_eq!(breaks.line_count(),2);
        let tree = set_paragraph(&k,&breaks,&params,&font,Point::ORIGIN,Dimen::BP * 12);
        let runs:Vec<(Dimen,Dimen,&str)> = tree.items().iter().filter_map(|i| match i {
            RenderItem::Text { at, text, .. } => Some((at.x,at.y,text.as_str())),
            _ => None
        }).collect();
        // "aaaa bbbb" stretched to 100bp, the last line at natural width
        assert_eq!(runs,vec![
            (Dimen::ZERO,Dimen::BP * 15 / 2,"aaaa"),
            (Dimen::BP * 60,Dimen::BP * 15 / 2,"bbbb"),
            (Dimen::ZERO,Dimen::BP * 39 / 2,"cccc"),
            (Dimen::BP * 50,Dimen::BP * 39 / 2,"dd"),
        ]);
    }
}
