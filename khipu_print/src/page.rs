/*! Pages on their way from the producer to the sink. */

use std::cmp::Ordering;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::sync::atomic::{AtomicU8, Ordering as AtomicOrdering};
use khipu_engine::dimen::{Dimen, Point, Rect};
use crate::render::RenderTree;

#[derive(Clone,Copy,Debug,PartialEq,Eq,PartialOrd,Ord)]
#[repr(u8)]
pub enum PageStatus {
    /// announced, rendering has not begun
    Queued = 0,
    /// content being rendered
    Printing = 1,
    /// rendered and waiting for its turn
    Assembled = 2,
    /// handed to the sink
    Printed = 3,
}
impl PageStatus {
    fn from_u8(u:u8) -> Self {
        match u {
            0 => Self::Queued,
            1 => Self::Printing,
            2 => Self::Assembled,
            _ => Self::Printed,
        }
    }
}

/// Media box and crop box of a page.
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub struct PageGeometry {
    pub media_box:Rect,
    pub crop_box:Rect,
}
impl PageGeometry {
    /// `paper` scaled by `scale`, cropped to itself.
    pub fn of_paper(paper:Point,scale:f64) -> Self {
        let media_box = Rect::of_size(paper).scale_float(scale);
        PageGeometry { media_box, crop_box:media_box }
    }
    pub fn height(&self) -> Dimen { self.media_box.height() }
}

pub struct Page {
    number:u32,
    geometry:PageGeometry,
    status:AtomicU8,
    tree:Mutex<RenderTree>,
    content:OnceLock<Vec<u8>>,
}
/// Shared access to a [`Page`] between its producer and the printer.
pub type PageHandle = Arc<Page>;

impl Page {
    pub(crate) fn new(number:u32,geometry:PageGeometry,tree:RenderTree) -> Self {
        Page { number, geometry, status:AtomicU8::new(PageStatus::Queued as u8), tree:Mutex::new(tree), content:OnceLock::new() }
    }
    pub fn number(&self) -> u32 { self.number }
    pub fn geometry(&self) -> &PageGeometry { &self.geometry }
    pub fn status(&self) -> PageStatus { PageStatus::from_u8(self.status.load(AtomicOrdering::Acquire)) }

    /// Moves from [`PageStatus::Queued`] to [`PageStatus::Printing`]. Returns
    /// false if rendering had begun already.
    pub fn begin(&self) -> bool {
        let begun = self.status.compare_exchange(PageStatus::Queued as u8,PageStatus::Printing as u8,AtomicOrdering::AcqRel,AtomicOrdering::Acquire).is_ok();
        if begun { log::trace!(target:"print","rendering page {}",self.number) }
        begun
    }

    /// The page's content; changes after the page is complete are not printed.
    /// Rendering a queued page begins here.
    pub fn tree(&self) -> MutexGuard<'_,RenderTree> {
        self.begin();
        self.tree.lock().unwrap_or_else(PoisonError::into_inner)
    }
    /// The serialised content, once the page is complete.
    pub fn content(&self) -> Option<&[u8]> { self.content.get().map(Vec::as_slice) }

    /// Serialises the content and moves on to [`PageStatus::Assembled`], by way
    /// of [`PageStatus::Printing`]. Returns false if the page was complete already.
    pub(crate) fn assemble(&self) -> bool {
        self.begin();
        if self.status.compare_exchange(PageStatus::Printing as u8,PageStatus::Assembled as u8,AtomicOrdering::AcqRel,AtomicOrdering::Acquire).is_err() {
            return false
        }
        let content = self.tree().to_content(self.geometry.height());
        let _ = self.content.set(content);
        true
    }
    pub(crate) fn printed(&self) {
        self.status.store(PageStatus::Printed as u8,AtomicOrdering::Release);
    }
}
impl Debug for Page {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f,"<page {} ({:?})>",self.number,self.status())
    }
}

/// Heap entry; ordered by page number only.
pub(crate) struct Queued(pub PageHandle);
impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool { self.0.number == other.0.number }
}
impl Eq for Queued {}
impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}
impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering { self.0.number.cmp(&other.0.number) }
}
