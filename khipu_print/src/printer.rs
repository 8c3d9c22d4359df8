/*! The ordered page assembler.

   Producers announce pages with [`Printer::print_page`], render into them and
   signal [`Printer::page_complete`], or [`Printer::page_failed`], which puts an
   error page in place of the failed one. Completed pages go to a min-heap on the
   page number; one consumer task, spawned by [`Printer::start`], pops them as
   soon as the next expected page is on top and hands them to the [`Sink`].
   It stops after the page given to [`Printer::set_max_page`], which may come
   at any time, even after that page is out.

   If the heap holds `high_water` pages, `page_complete` waits until the
   consumer has brought it down to `low_water`. The page the consumer waits for
   is always admitted.
 */

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};
use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::task::{Context, Poll};
use tokio::sync::{broadcast, mpsc, Notify};
use tokio::task::JoinHandle;
use khipu_engine::dimen::{Dimen, Point, DINA4};
use khipu_fonts::metrics::Font;
use khipu_fonts::standard::StandardFont;
use crate::errors::PrintError;
use crate::page::{Page, PageGeometry, PageHandle, PageStatus, Queued};
use crate::render::RenderTree;
use crate::sink::Sink;

#[derive(Clone,Copy,Debug,PartialEq)]
pub struct PrinterConfig {
    pub paper:Point,
    pub scale:f64,
    /// number of waiting pages at which `page_complete` starts to block
    pub high_water:usize,
    /// number of waiting pages at which blocked producers resume
    pub low_water:usize,
}
impl PrinterConfig {
    pub fn new(paper:Point,scale:f64) -> Self {
        PrinterConfig { paper, scale, high_water:64, low_water:16 }
    }
    pub fn with_water_marks(mut self,high:usize,low:usize) -> Self {
        self.high_water = high;
        self.low_water = low;
        self
    }
    fn validate(&self) -> Result<(),PrintError> {
        if self.paper.x.0 <= 0 || self.paper.y.0 <= 0 {
            return Err(PrintError::InvalidPaper(self.paper))
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(PrintError::NonPositiveScale(self.scale))
        }
        if self.high_water == 0 || self.low_water >= self.high_water {
            return Err(PrintError::InvalidWaterMarks { high:self.high_water, low:self.low_water })
        }
        Ok(())
    }
}
impl Default for PrinterConfig {
    fn default() -> Self { PrinterConfig::new(DINA4,1.0) }
}

/// What wakes the consumer.
#[derive(Clone,Copy,Debug)]
enum Event {
    Completed(u32),
    MaxPage(u32),
}

struct Shared {
    heap:RwLock<BinaryHeap<Reverse<Queued>>>,
    /// last page handed to the sink
    emitted:AtomicU32,
    /// 0 while unknown
    max_page:AtomicU32,
    stopped:AtomicBool,
    cancelled:AtomicBool,
    /// signalled whenever the heap shrinks or the consumer stops
    drained:Notify,
}
impl Shared {
    fn heap_len(&self) -> usize {
        self.heap.read().unwrap_or_else(PoisonError::into_inner).len()
    }
    fn next_is_ready(&self) -> bool {
        let next = self.emitted.load(Ordering::Acquire) + 1;
        self.heap.read().unwrap_or_else(PoisonError::into_inner).peek().is_some_and(|Reverse(q)| q.0.number() == next)
    }
    fn pop(&self) -> Option<PageHandle> {
        self.heap.write().unwrap_or_else(PoisonError::into_inner).pop().map(|Reverse(q)| q.0)
    }
    fn push(&self,page:PageHandle) {
        self.heap.write().unwrap_or_else(PoisonError::into_inner).push(Reverse(Queued(page)));
    }
    fn is_done(&self) -> bool {
        let max = self.max_page.load(Ordering::Acquire);
        max > 0 && self.emitted.load(Ordering::Acquire) >= max
    }
    fn stop(&self) {
        self.stopped.store(true,Ordering::Release);
        self.drained.notify_waiters();
    }
}

/// Resolves when the consumer task ends: with the sink after the last page, or
/// with the first error.
pub struct Completion<S:Sink> { handle:JoinHandle<Result<S,PrintError>> }
impl<S:Sink> Future for Completion<S> {
    type Output = Result<S,PrintError>;
    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.handle).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(r)) => Poll::Ready(r),
            Poll::Ready(Err(e)) => Poll::Ready(Err(PrintError::Consumer(e.to_string()))),
        }
    }
}

pub struct Printer {
    config:PrinterConfig,
    shared:Arc<Shared>,
    /// all pages announced so far
    seen:Mutex<BTreeMap<u32,Weak<Page>>>,
    events:mpsc::Sender<Event>,
    receiver:Mutex<Option<mpsc::Receiver<Event>>>,
    shutdown:broadcast::Sender<()>,
}
impl Printer {
    pub fn new(config:PrinterConfig) -> Result<Self,PrintError> {
        config.validate()?;
        let (events,receiver) = mpsc::channel(config.high_water);
        let (shutdown,_) = broadcast::channel(1);
        Ok(Printer {
            config,
            shared:Arc::new(Shared {
                heap:RwLock::new(BinaryHeap::new()),
                emitted:AtomicU32::new(0),
                max_page:AtomicU32::new(0),
                stopped:AtomicBool::new(false),
                cancelled:AtomicBool::new(false),
                drained:Notify::new(),
            }),
            seen:Mutex::new(BTreeMap::new()),
            events,
            receiver:Mutex::new(Some(receiver)),
            shutdown,
        })
    }
    pub fn config(&self) -> &PrinterConfig { &self.config }
    /// The paper, scaled.
    pub fn geometry(&self) -> PageGeometry { PageGeometry::of_paper(self.config.paper,self.config.scale) }

    /// Spawns the consumer task on the current tokio runtime. A printer can be
    /// started only once.
    pub fn start<S:Sink>(&self,sink:S) -> Result<Completion<S>,PrintError> {
        let receiver = self.receiver.lock().unwrap_or_else(PoisonError::into_inner).take()
            .ok_or(PrintError::AlreadyStarted)?;
        let shared = self.shared.clone();
        let shutdown = self.shutdown.subscribe();
        log::debug!(target:"print","starting page assembly");
        Ok(Completion { handle:tokio::spawn(consume(shared,sink,receiver,shutdown)) })
    }

    /// Announces page `number`; render into [`Page::tree`] and call
    /// [`page_complete`](Self::page_complete) when done.
    pub fn print_page(&self,number:u32,geometry:PageGeometry,content:RenderTree) -> Result<PageHandle,PrintError> {
        if number == 0 { return Err(PrintError::PageZero) }
        if self.shared.stopped.load(Ordering::Acquire) { return Err(PrintError::Stopped) }
        let max = self.shared.max_page.load(Ordering::Acquire);
        if max > 0 && number > max {
            return Err(PrintError::BeyondMaxPage { page:number, max })
        }
        let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
        if seen.contains_key(&number) {
            return Err(PrintError::DuplicatePage(number))
        }
        let page = Arc::new(Page::new(number,geometry,content));
        seen.insert(number,Arc::downgrade(&page));
        log::trace!(target:"print","page {} queued",number);
        Ok(page)
    }

    /// Signals that `page` is fully rendered. Calling this again for the same
    /// page does nothing.
    pub async fn page_complete(&self,page:&PageHandle) -> Result<(),PrintError> {
        if page.status() >= PageStatus::Assembled { return Ok(()) }
        self.admit(page.number()).await?;
        if !page.assemble() { return Ok(()) }
        self.shared.push(page.clone());
        log::trace!(target:"print","page {} complete, {} waiting",page.number(),self.shared.heap_len());
        if self.events.send(Event::Completed(page.number())).await.is_err() {
            return Err(self.stop_reason())
        }
        Ok(())
    }

    /// Signals that rendering `page` failed. Its content is replaced by a page
    /// naming the error, which then takes the failed page's place in the
    /// document. Does nothing for pages already complete.
    pub async fn page_failed<E:Display>(&self,page:&PageHandle,error:E) -> Result<(),PrintError> {
        if page.status() >= PageStatus::Assembled { return Ok(()) }
        log::warn!(target:"print","rendering page {} failed: {}",page.number(),error);
        *page.tree() = error_page(page.number(),&error.to_string());
        self.page_complete(page).await
    }

    /// Waits while the heap is too full, unless `number` is the page the consumer waits for.
    async fn admit(&self,number:u32) -> Result<(),PrintError> {
        let shared = &self.shared;
        if shared.heap_len() < self.config.high_water { return self.check_running() }
        log::debug!(target:"print","page {} waits for the queue to drain",number);
        loop {
            let drained = shared.drained.notified();
            self.check_running()?;
            if shared.heap_len() <= self.config.low_water || shared.emitted.load(Ordering::Acquire) + 1 == number {
                return Ok(())
            }
            drained.await;
        }
    }

    fn check_running(&self) -> Result<(),PrintError> {
        if self.shared.stopped.load(Ordering::Acquire) { Err(self.stop_reason()) } else { Ok(()) }
    }
    fn stop_reason(&self) -> PrintError {
        if self.shared.cancelled.load(Ordering::Acquire) { PrintError::Cancelled } else { PrintError::Stopped }
    }

    /// Declares `max` to be the last page. May be called before or after that
    /// page was printed, but not below the number of pages already out.
    pub fn set_max_page(&self,max:u32) -> Result<(),PrintError> {
        if max == 0 { return Err(PrintError::PageZero) }
        self.check_running()?;
        let emitted = self.shared.emitted.load(Ordering::Acquire);
        if max < emitted {
            return Err(PrintError::MaxPageBelowEmitted { max, emitted })
        }
        self.shared.max_page.store(max,Ordering::Release);
        log::debug!(target:"print","last page is {}",max);
        // a full channel wakes the consumer anyway; a closed one means it is gone
        let _ = self.events.try_send(Event::MaxPage(max));
        Ok(())
    }

    /// Number of pages handed to the sink so far.
    pub fn page_count(&self) -> u32 { self.shared.emitted.load(Ordering::Acquire) }

    /// Status of page `number`; `None` for pages never announced. A page whose
    /// handles were all dropped before completion stays [`PageStatus::Queued`].
    pub fn status(&self,number:u32) -> Option<PageStatus> {
        if number > 0 && number <= self.page_count() { return Some(PageStatus::Printed) }
        let seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
        seen.get(&number).map(|page| page.upgrade().map_or(PageStatus::Queued,|p| p.status()))
    }

    /// Stops the consumer. Pages already written stay written; producers see
    /// [`PrintError::Cancelled`] at their next `page_complete`.
    pub fn cancel(&self) {
        log::debug!(target:"print","cancelled after {} pages",self.page_count());
        self.shared.cancelled.store(true,Ordering::Release);
        let _ = self.shutdown.send(());
        self.shared.stop();
    }
}

fn error_page(number:u32,message:&str) -> RenderTree {
    let font = Font::standard(StandardFont::Helvetica,12);
    let mut tree = RenderTree::new();
    tree.text(Point::new(Dimen::BP * 20,Dimen::BP * 20),&font,format!("Error rendering page [{}]",number))
        .text(Point::new(Dimen::BP * 20,Dimen::BP * 40),&font,message);
    tree
}

async fn consume<S:Sink>(shared:Arc<Shared>,mut sink:S,mut events:mpsc::Receiver<Event>,mut shutdown:broadcast::Receiver<()>) -> Result<S,PrintError> {
    let ret = run(&shared,&mut sink,&mut events,&mut shutdown).await;
    shared.stop();
    match ret {
        Ok(()) => {
            log::debug!(target:"print","all {} pages out",shared.emitted.load(Ordering::Acquire));
            Ok(sink)
        }
        Err(e) => {
            log::warn!(target:"print","page assembly stopped: {}",e);
            Err(e)
        }
    }
}

async fn run<S:Sink>(shared:&Shared,sink:&mut S,events:&mut mpsc::Receiver<Event>,shutdown:&mut broadcast::Receiver<()>) -> Result<(),PrintError> {
    loop {
        if shared.cancelled.load(Ordering::Acquire) { return Err(PrintError::Cancelled) }
        while !shared.is_done() && shared.next_is_ready() {
            let Some(page) = shared.pop() else { break };
            let geometry = page.geometry();
            sink.emit_page(page.number(),&geometry.media_box,&geometry.crop_box,page.content().unwrap_or_default())?;
            page.printed();
            shared.emitted.store(page.number(),Ordering::Release);
            shared.drained.notify_waiters();
            log::trace!(target:"print","page {} out",page.number());
        }
        if shared.is_done() {
            sink.finish()?;
            return Ok(())
        }
        tokio::select! {
            _ = shutdown.recv() => return Err(PrintError::Cancelled),
            event = events.recv() => match event {
                Some(Event::Completed(n)) => log::trace!(target:"print","consumer woken by page {}",n),
                Some(Event::MaxPage(n)) => log::trace!(target:"print","consumer woken by last page {}",n),
                None => return Err(PrintError::Stopped),
            }
        }
    }
}
