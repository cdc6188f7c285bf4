//! onepass: a single-pass Markdown to HTML renderer.
//!
//! The input is walked once, left to right. At every position an ordered
//! table of recognizers is consulted; the first one that matches writes its
//! HTML straight to the output and reports how many bytes it consumed. Nested
//! constructs are rendered by recursing over sub-slices of the input. No
//! syntax tree is built.
//!
//! ```
//! let html = onepass::to_html(b"# Hello\n\nSome *text*.", false);
//! assert_eq!(html, b"<h1>Hello</h1>\n<p>Some <em>text</em>.</p>\n");
//! ```

mod block;
mod escape;
mod inline;
mod list;
mod rules;
mod table;

pub mod error;
pub mod page;
pub mod render;
pub mod serve;
pub mod sink;

pub use error::Error;
pub use escape::write_escaped;
pub use render::{render, to_html, Context, RenderOptions, Renderer, Step};
pub use sink::{HtmlSink, IoSink};
