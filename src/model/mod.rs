//! Document model types.
//!
//! Fragments are the output unit; blocks are the transient records passed
//! from layout detection to text recognition.

mod block;
mod document;
mod fragment;

pub use block::{Block, LayoutCategory};
pub use document::{Document, Metadata, PageResult, PageRoute, ProcessingMethod};
pub use fragment::{BBox, Fragment, FragmentKind, FragmentSource};
