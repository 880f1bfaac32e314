//! HTML rendering primitives
//!
//! Every control renders itself into a single shared [`HtmlBuffer`] so that a
//! page render performs one buffer allocation sized from the control tree's
//! own estimate rather than one allocation per control.

mod buffer;

pub use buffer::{escape_html, HtmlBuffer};
