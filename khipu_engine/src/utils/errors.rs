/*! Errors that abort the operation that triggered them.

   Conditions the paragraph builder can recover from (overfull lines, missing
   hyphenation patterns, undecodable input) are not errors; they are reported
   through [`Diagnostics`](crate::utils::diagnostics::Diagnostics) instead.
 */

use thiserror::Error;

#[derive(Debug,Clone,PartialEq,Eq,Error)]
pub enum ConfigError {
    #[error("unknown typesetting parameter `{0}`")]
    UnknownParameter(String),
    #[error("typesetting parameter `{key}` expects {expected}, got {got}")]
    ParameterType { key:&'static str, expected:&'static str, got:String },
    #[error("no hyphenation dictionary for language `{0}`")]
    UnknownLanguage(String),
    #[error("invalid dimension `{0}`")]
    InvalidDimension(String),
    #[error("line length must be positive, got {0}")]
    NonPositiveLineLength(crate::dimen::Dimen),
}
