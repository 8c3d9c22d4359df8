/*! Reporting of non-fatal conditions.

   An instance of [`Diagnostics`] is handed to every operation that may run into
   something worth telling the user about without giving up: an overfull or
   underfull line, a language without hyphenation patterns, input that was not
   valid UTF-8. The provided methods build the [`Diagnostic`]s; implementors only
   decide what to do with them.
 */

use std::fmt::{Display, Formatter};
use crate::dimen::Dimen;

#[derive(Clone,Copy,Debug,PartialEq,Eq,PartialOrd,Ord)]
pub enum Severity { Info, Warning }

#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub enum DiagnosticKind {
    OverfullBox,
    UnderfullBox,
    HyphenationUnavailable,
    InputDecoding,
    Other,
}

/// Where a diagnostic originates.
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub enum Location {
    /// A position in a paragraph: the knot index in the khipu and the
    /// character offset in the paragraph text.
    Paragraph { knot:usize, offset:usize },
    Page(u32),
    Unknown,
}

#[derive(Clone,Debug,PartialEq,Eq)]
pub struct Diagnostic {
    pub severity:Severity,
    pub kind:DiagnosticKind,
    pub message:String,
    pub location:Location,
}
impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.location {
            Location::Paragraph { knot, offset } => write!(f,"{} (at knot {}, offset {})",self.message,knot,offset),
            Location::Page(p) => write!(f,"{} (page {})",self.message,p),
            Location::Unknown => f.write_str(&self.message),
        }
    }
}

/// Receiver of [`Diagnostic`]s.
pub trait Diagnostics {
    fn report(&mut self,diagnostic:Diagnostic);

    /// "Overfull \hbox (x too wide) in paragraph"
    fn overfull(&mut self,line:usize,excess:Dimen,location:Location) {
        self.report(Diagnostic {
            severity:Severity::Warning, kind:DiagnosticKind::OverfullBox, location,
            message:format!("Overfull line {} ({} too wide)",line,excess)
        })
    }
    /// "Underfull \hbox (badness b) in paragraph"
    fn underfull(&mut self,line:usize,badness:i32,location:Location) {
        self.report(Diagnostic {
            severity:Severity::Warning, kind:DiagnosticKind::UnderfullBox, location,
            message:format!("Underfull line {} (badness {})",line,badness)
        })
    }
    fn hyphenation_unavailable(&mut self,language:&str) {
        self.report(Diagnostic {
            severity:Severity::Info, kind:DiagnosticKind::HyphenationUnavailable, location:Location::Unknown,
            message:format!("No hyphenation patterns for language {}; words stay unhyphenated",language)
        })
    }
    fn input_decoding(&mut self,offset:usize,message:String) {
        self.report(Diagnostic {
            severity:Severity::Warning, kind:DiagnosticKind::InputDecoding,
            location:Location::Paragraph { knot:0, offset }, message
        })
    }
}
impl<D:Diagnostics + ?Sized> Diagnostics for &mut D {
    fn report(&mut self, diagnostic: Diagnostic) { (**self).report(diagnostic) }
}

/// Drops every diagnostic.
#[derive(Clone,Copy,Debug,Default)]
pub struct Discard;
impl Diagnostics for Discard {
    fn report(&mut self, _diagnostic: Diagnostic) {}
}

/// Keeps every diagnostic for later inspection.
#[derive(Clone,Debug,Default)]
pub struct Collect(pub Vec<Diagnostic>);
impl Collect {
    pub fn new() -> Self { Collect(Vec::new()) }
    pub fn of_kind(&self,kind:DiagnosticKind) -> impl Iterator<Item=&Diagnostic> {
        self.0.iter().filter(move |d| d.kind == kind)
    }
    pub fn has(&self,kind:DiagnosticKind) -> bool { self.of_kind(kind).next().is_some() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn into_inner(self) -> Vec<Diagnostic> { self.0 }
}
impl Diagnostics for Collect {
    fn report(&mut self, diagnostic: Diagnostic) { self.0.push(diagnostic) }
}

/// Forwards every diagnostic to the [`log`] facade.
#[derive(Clone,Copy,Debug,Default)]
pub struct Log;
impl Diagnostics for Log {
    fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Warning => log::warn!(target:"diagnostics","{}",diagnostic),
            Severity::Info => log::info!(target:"diagnostics","{}",diagnostic),
        }
    }
}
