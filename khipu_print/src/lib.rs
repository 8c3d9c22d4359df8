/*! Ordered assembly of pages.

Pages are rendered by any number of tasks, in any order and without knowing
how many pages there will be. The [`Printer`](printer::Printer) hands them to a
[`Sink`](sink::Sink) strictly in ascending page order, from one consumer task.

```
use khipu_engine::dimen::{Dimen, Point};
use khipu_print::printer::{Printer, PrinterConfig};
use khipu_print::render::RenderTree;
use khipu_print::sink::WriterSink;

# tokio::runtime::Runtime::new().unwrap().block_on(async {
let printer = Printer::new(PrinterConfig::new(Point::new(Dimen(20000),Dimen(20000)),1.0)).unwrap();
let done = printer.start(WriterSink::new(Vec::new())).unwrap();
let second = printer.print_page(2,printer.geometry(),RenderTree::new()).unwrap();
let first = printer.print_page(1,printer.geometry(),RenderTree::new()).unwrap();
printer.page_complete(&second).await.unwrap();
printer.page_complete(&first).await.unwrap();
printer.set_max_page(2).unwrap();
let sink = done.await.unwrap();
assert_eq!(printer.page_count(),2);
assert!(sink.into_inner().starts_with(b"%page 1"));
# });
```
*/

pub mod errors;
pub mod render;
pub mod page;
pub mod sink;
pub mod printer;

#[doc(hidden)]
pub mod tests;
