//! OCR through remote vision-language models.
//!
//! A page image goes to the layout detector once; every detected block is
//! then cropped and sent to the text recognizer. Both stages sit behind
//! traits so the [`ScanPipeline`] can run against any backend.

mod client;
pub mod image;
mod layout;
pub mod prompts;
mod pipeline;
mod recognizer;
#[cfg(test)]
mod test_server;

pub use client::{strip_code_fence, strip_reasoning, ChatClient};
pub use layout::{finalize_blocks, parse_layout_response, LayoutDetector, RemoteLayoutDetector};
pub use pipeline::{BlockOrder, ScanPipeline};
pub use recognizer::{RemoteTextRecognizer, TextRecognizer};
