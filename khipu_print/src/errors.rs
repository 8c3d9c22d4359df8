/*! Errors of the page assembly. */

use std::sync::Arc;
use thiserror::Error;
use khipu_engine::dimen::Point;

#[derive(Debug,Clone,Error)]
pub enum PrintError {
    #[error("invalid paper size {0}")]
    InvalidPaper(Point),
    #[error("scale must be positive, got {0}")]
    NonPositiveScale(f64),
    #[error("low water mark {low} must be below high water mark {high}")]
    InvalidWaterMarks { high:usize, low:usize },
    #[error("pages are numbered from 1")]
    PageZero,
    #[error("page {0} was printed before")]
    DuplicatePage(u32),
    #[error("page {page} lies beyond the last page {max}")]
    BeyondMaxPage { page:u32, max:u32 },
    #[error("cannot set the last page to {max}; {emitted} pages are already out")]
    MaxPageBelowEmitted { max:u32, emitted:u32 },
    #[error("the printer was already started")]
    AlreadyStarted,
    #[error("writing page failed: {0}")]
    Io(Arc<std::io::Error>),
    #[error("printing was cancelled")]
    Cancelled,
    #[error("the printer has stopped")]
    Stopped,
    #[error("page assembly task failed: {0}")]
    Consumer(String),
}
impl From<std::io::Error> for PrintError {
    fn from(e: std::io::Error) -> Self { PrintError::Io(Arc::new(e)) }
}
