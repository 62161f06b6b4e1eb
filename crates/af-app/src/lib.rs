//! asciiforge : image ou motif procédural → art en caractères (PNG ou texte).
//!
//! Library entry point is [`pipeline::render`]; the `asciiforge` binary wraps it.

pub mod batch;
pub mod cli;
pub mod pipeline;
