#[doc(hidden)]
#[cfg(any(test,doctest))]
#[allow(dead_code)]
pub mod test_utils {
    use std::sync::{Arc, Mutex};
    use khipu_engine::dimen::Rect;
    use crate::sink::Sink;

    #[allow(unused_must_use)]
    pub fn debug() {
        env_logger::builder().filter_level(log::LevelFilter::Debug).try_init();
    }
    #[allow(unused_must_use)]
    pub fn trace() {
        env_logger::builder().filter_level(log::LevelFilter::Trace).try_init();
    }

    /// Remembers the numbers of all pages it receives.
    #[derive(Clone,Default)]
    pub struct Recorder(pub Arc<Mutex<Vec<u32>>>);
    impl Recorder {
        pub fn pages(&self) -> Vec<u32> { self.0.lock().unwrap().clone() }
    }
    impl Sink for Recorder {
        fn emit_page(&mut self, number: u32, _: &Rect, _: &Rect, _: &[u8]) -> std::io::Result<()> {
            self.0.lock().unwrap().push(number);
            Ok(())
        }
    }

    /// Fails at the given page.
    pub struct Failing(pub u32);
    impl Sink for Failing {
        fn emit_page(&mut self, number: u32, _: &Rect, _: &Rect, _: &[u8]) -> std::io::Result<()> {
            if number == self.0 { Err(std::io::Error::other("disk full")) } else { Ok(()) }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;
    use khipu_engine::dimen::{Dimen, Point};
    use crate::errors::PrintError;
    use crate::page::PageStatus;
    use crate::printer::{Printer, PrinterConfig};
    use crate::render::RenderTree;
    use crate::sink::WriterSink;
    use crate::tests::test_utils::*;

    fn printer() -> Printer {
        Printer::new(PrinterConfig::new(Point::new(Dimen(20000),Dimen(20000)),1.0)).unwrap()
    }

    async fn wait_for(printer:&Printer,pages:u32) {
        tokio::time::timeout(Duration::from_secs(5),async {
            while printer.page_count() < pages { tokio::time::sleep(Duration::from_millis(1)).await }
        }).await.unwrap()
    }

    #[tokio::test]
    async fn late_max_page() {
        debug();
        let printer = printer();
        let sink = Recorder::default();
        let done = printer.start(sink.clone()).unwrap();
        let p1 = printer.print_page(1,printer.geometry(),RenderTree::new()).unwrap();
        let p2 = printer.print_page(2,printer.geometry(),RenderTree::new()).unwrap();
        printer.page_complete(&p1).await.unwrap();
        printer.page_complete(&p2).await.unwrap();
        printer.set_max_page(2).unwrap();
        done.await.unwrap();
        assert_eq!(printer.page_count(),2);
        assert_eq!(sink.pages(),vec![1,2]);
        assert_eq!(p2.status(),PageStatus::Printed);
    }

    #[tokio::test]
    async fn early_max_page() {
        let printer = printer();
        let sink = Recorder::default();
        let done = printer.start(sink.clone()).unwrap();
        printer.set_max_page(2).unwrap();
        let p1 = printer.print_page(1,printer.geometry(),RenderTree::new()).unwrap();
        printer.page_complete(&p1).await.unwrap();
        let p2 = printer.print_page(2,printer.geometry(),RenderTree::new()).unwrap();
        printer.page_complete(&p2).await.unwrap();
        done.await.unwrap();
        assert_eq!(printer.page_count(),2);
        assert_eq!(sink.pages(),vec![1,2]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn pages_come_out_in_order() {
        const N:u32 = 100;
        let printer = Arc::new(printer());
        let sink = Recorder::default();
        let done = printer.start(sink.clone()).unwrap();
        // a fixed permutation of 1..=N
        let mut order:Vec<u32> = (1..=N).collect();
        let mut seed = 0x2545_F491_u32;
        for i in (1..order.len()).rev() {
            seed ^= seed << 13; seed ^= seed >> 17; seed ^= seed << 5;
            order.swap(i,seed as usize % (i + 1));
        }
        let tasks:Vec<_> = order.into_iter().map(|n| {
            let printer = printer.clone();
            tokio::spawn(async move {
                let page = printer.print_page(n,printer.geometry(),RenderTree::new())?;
                tokio::time::sleep(Duration::from_micros(u64::from(n % 7) * 100)).await;
                printer.page_complete(&page).await
            })
        }).collect();
        for t in tasks { t.await.unwrap().unwrap() }
        printer.set_max_page(N).unwrap();
        done.await.unwrap();
        assert_eq!(sink.pages(),(1..=N).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn completing_twice_is_harmless() {
        let printer = printer();
        let sink = Recorder::default();
        let done = printer.start(sink.clone()).unwrap();
        let p1 = printer.print_page(1,printer.geometry(),RenderTree::new()).unwrap();
        printer.page_complete(&p1).await.unwrap();
        printer.page_complete(&p1).await.unwrap();
        printer.set_max_page(1).unwrap();
        done.await.unwrap();
        assert_eq!(sink.pages(),vec![1]);
        assert_eq!(printer.status(1),Some(PageStatus::Printed));
    }

    #[tokio::test]
    async fn backpressure() {
        let printer = Printer::new(PrinterConfig::new(Point::new(Dimen(20000),Dimen(20000)),1.0).with_water_marks(4,1)).unwrap();
        let sink = Recorder::default();
        let done = printer.start(sink.clone()).unwrap();
        let pages:Vec<_> = (1..=6).map(|n| printer.print_page(n,printer.geometry(),RenderTree::new()).unwrap()).collect();
        for p in &pages[1..5] { printer.page_complete(p).await.unwrap() }
        assert_eq!(printer.status(5),Some(PageStatus::Assembled));
        // four pages wait for page 1; page 6 has to wait as well
        assert!(tokio::time::timeout(Duration::from_millis(50),printer.page_complete(&pages[5])).await.is_err());
        assert_eq!(pages[5].status(),PageStatus::Queued);
        // page 1 is always admitted
        printer.page_complete(&pages[0]).await.unwrap();
        wait_for(&printer,5).await;
        printer.page_complete(&pages[5]).await.unwrap();
        printer.set_max_page(6).unwrap();
        done.await.unwrap();
        assert_eq!(sink.pages(),vec![1,2,3,4,5,6]);
    }

    #[tokio::test]
    async fn failed_pages_are_replaced() {
        let printer = printer();
        let done = printer.start(WriterSink::new(Vec::new())).unwrap();
        let pages:Vec<_> = (1..=3).map(|n| printer.print_page(n,printer.geometry(),RenderTree::new()).unwrap()).collect();
        pages[1].begin();
        assert_eq!(printer.status(2),Some(PageStatus::Printing));
        printer.page_failed(&pages[1],"missing glyph").await.unwrap();
        assert_eq!(printer.status(2),Some(PageStatus::Assembled));
        printer.page_complete(&pages[2]).await.unwrap();
        printer.page_complete(&pages[0]).await.unwrap();
        printer.set_max_page(3).unwrap();
        let out = String::from_utf8(done.await.unwrap().into_inner()).unwrap();
        assert_eq!(out.matches("%page").count(),3);
        assert!(out.contains("(Error rendering page [2]) Tj"));
        assert!(out.contains("(missing glyph) Tj"));
        // complete pages are left alone
        printer.page_failed(&pages[0],"too late").await.unwrap();
        assert_eq!(pages[0].status(),PageStatus::Printed);
    }

    #[tokio::test]
    async fn protocol_errors() {
        assert!(matches!(Printer::new(PrinterConfig::new(Point::new(Dimen(0),Dimen(20000)),1.0)),Err(PrintError::InvalidPaper(_))));
        assert!(matches!(Printer::new(PrinterConfig::new(Point::new(Dimen(20000),Dimen(20000)),0.0)),Err(PrintError::NonPositiveScale(_))));
        let printer = printer();
        let sink = Recorder::default();
        let _done = printer.start(sink.clone()).unwrap();
        assert!(matches!(printer.start(Recorder::default()),Err(PrintError::AlreadyStarted)));
        assert!(matches!(printer.print_page(0,printer.geometry(),RenderTree::new()),Err(PrintError::PageZero)));
        let p1 = printer.print_page(1,printer.geometry(),RenderTree::new()).unwrap();
        assert!(matches!(printer.print_page(1,printer.geometry(),RenderTree::new()),Err(PrintError::DuplicatePage(1))));
        assert_eq!(printer.status(1),Some(PageStatus::Queued));
        p1.begin();
        assert_eq!(printer.status(1),Some(PageStatus::Printing));
        assert_eq!(printer.status(7),None);
        let p2 = printer.print_page(2,printer.geometry(),RenderTree::new()).unwrap();
        printer.page_complete(&p1).await.unwrap();
        printer.page_complete(&p2).await.unwrap();
        wait_for(&printer,2).await;
        assert!(matches!(printer.set_max_page(1),Err(PrintError::MaxPageBelowEmitted { max:1, emitted:2 })));
        printer.set_max_page(3).unwrap();
        assert!(matches!(printer.print_page(4,printer.geometry(),RenderTree::new()),Err(PrintError::BeyondMaxPage { page:4, max:3 })));
    }

    #[tokio::test]
    async fn cancel() {
        let printer = printer();
        let sink = Recorder::default();
        let done = printer.start(sink.clone()).unwrap();
        let p1 = printer.print_page(1,printer.geometry(),RenderTree::new()).unwrap();
        let p3 = printer.print_page(3,printer.geometry(),RenderTree::new()).unwrap();
        printer.page_complete(&p1).await.unwrap();
        wait_for(&printer,1).await;
        printer.cancel();
        assert!(matches!(done.await,Err(PrintError::Cancelled)));
        assert!(matches!(printer.page_complete(&p3).await,Err(PrintError::Cancelled)));
        assert!(matches!(printer.print_page(4,printer.geometry(),RenderTree::new()),Err(PrintError::Stopped)));
        assert_eq!(sink.pages(),vec![1]);
    }

    #[tokio::test]
    async fn sink_errors_end_the_assembly() {
        let printer = printer();
        let done = printer.start(Failing(2)).unwrap();
        let pages:Vec<_> = (1..=3).map(|n| printer.print_page(n,printer.geometry(),RenderTree::new()).unwrap()).collect();
        for p in &pages[..2] { printer.page_complete(p).await.unwrap() }
        match done.await {
            Err(PrintError::Io(e)) => assert_eq!(e.to_string(),"disk full"),
            Err(e) => panic!("unexpected error {}",e),
            Ok(_) => panic!("sink error was swallowed"),
        }
        assert_eq!(printer.page_count(),1);
        assert!(matches!(printer.page_complete(&pages[2]).await,Err(PrintError::Stopped)));
    }
}
