/*! Where finished pages go. */

use std::io::Write;
use khipu_engine::dimen::Rect;

/// Receives pages in ascending order, one call per page, from the printer's
/// consumer task.
pub trait Sink: Send + 'static {
    fn emit_page(&mut self,number:u32,media_box:&Rect,crop_box:&Rect,content:&[u8]) -> std::io::Result<()>;
    /// Called once after the last page.
    fn finish(&mut self) -> std::io::Result<()> { Ok(()) }
}

/// Writes every page as a record
/// ```text
/// %page 1
/// /MediaBox [0 0 595.28 841.89]
/// /CropBox [0 0 595.28 841.89]
/// stream
/// ...
/// endstream
/// ```
/// in big points, with the origin in the lower left corner.
#[derive(Debug)]
pub struct WriterSink<W:Write + Send + 'static> { out:W, pages:u32 }
impl<W:Write + Send + 'static> WriterSink<W> {
    pub fn new(out:W) -> Self { WriterSink { out, pages:0 } }
    pub fn pages(&self) -> u32 { self.pages }
    pub fn into_inner(self) -> W { self.out }
}

fn pdf_box(r:&Rect,page_height:f64) -> String {
    let r = r.normalize();
    format!("[{} {} {} {}]",r.top_l.x.points(),page_height - r.bot_r.y.points(),r.bot_r.x.points(),page_height - r.top_l.y.points())
}

impl<W:Write + Send + 'static> Sink for WriterSink<W> {
    fn emit_page(&mut self,number:u32,media_box:&Rect,crop_box:&Rect,content:&[u8]) -> std::io::Result<()> {
        let height = media_box.height().points();
        writeln!(self.out,"%page {}",number)?;
        writeln!(self.out,"/MediaBox {}",pdf_box(media_box,height))?;
        writeln!(self.out,"/CropBox {}",pdf_box(crop_box,height))?;
        self.out.write_all(b"stream\n")?;
        self.out.write_all(content)?;
        self.out.write_all(b"endstream\n")?;
        self.pages += 1;
        Ok(())
    }
    fn finish(&mut self) -> std::io::Result<()> {
        writeln!(self.out,"%%EOF {} pages",self.pages)?;
        self.out.flush()
    }
}
