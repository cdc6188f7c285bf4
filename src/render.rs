// src/render.rs
//
// Render session and the dispatch loop.
//
// The loop walks the input once. At every position it offers the text to the
// recognizers in priority order; the first one that matches writes its own
// HTML (recursing into `process` for nested content) and says how far to
// advance and in which context the next position starts. Nothing is buffered
// and no tree is built.

use memchr::memmem;

use crate::escape::{decode_lossy, write_escaped, write_escaped_char};
use crate::rules::Recurse;
use crate::sink::HtmlSink;
use crate::table::TableState;
use crate::{block, inline, list, table};

/// Whether the current position starts a new block or continues inline text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Context {
    Block,
    Inline,
}

/// Outcome of a successful match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    /// Bytes consumed from the front of the slice. Always non-zero.
    pub consumed: usize,
    /// Context the dispatch loop continues in.
    pub next: Context,
}

impl Step {
    pub(crate) fn block(consumed: usize) -> Option<Step> {
        Some(Step { consumed, next: Context::Block })
    }

    pub(crate) fn inline(consumed: usize) -> Option<Step> {
        Some(Step { consumed, next: Context::Inline })
    }
}

/// Per-render configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Escape raw HTML and comments instead of passing them through.
    pub no_html: bool,
}

/// Signature shared by every recognizer: try to match at the front of `text`.
pub(crate) type Recognizer = fn(&mut Renderer<'_>, &[u8], Context) -> Option<Step>;

/// Evaluated priority order.
const RECOGNIZERS: &[(&str, Recognizer)] = &[
    ("row-end", table::row_end),
    ("underline", block::underline_heading),
    ("comment", block::comment),
    ("fence", block::code_fence),
    ("line-prefix", block::line_prefix),
    ("list", list::list),
    ("table", table::table),
    ("paragraph", block::paragraph),
    ("surround", inline::surround),
    ("link", inline::link),
    ("autolink", inline::autolink),
    ("html", inline::raw_html),
    ("replace", inline::replace),
];

/// State of one document render.
///
/// A renderer is built for a single document and consumed by
/// [`Renderer::render`], so paragraph and table state never leak from one
/// document into the next.
pub struct Renderer<'o> {
    out: &'o mut dyn HtmlSink,
    pub(crate) options: RenderOptions,
    in_paragraph: bool,
    pub(crate) table: TableState,
}

impl<'o> Renderer<'o> {
    pub fn new(out: &'o mut dyn HtmlSink, options: RenderOptions) -> Self {
        Self {
            out,
            options,
            in_paragraph: false,
            table: TableState::default(),
        }
    }

    /// Render a whole document.
    pub fn render(mut self, input: &[u8]) {
        log::debug!(
            "rendering {} bytes (no_html: {})",
            input.len(),
            self.options.no_html
        );
        self.process(input, Context::Block);
        table::finish(&mut self);
    }

    /* ============================== Output ============================== */

    #[inline]
    pub(crate) fn emit(&mut self, s: &str) {
        self.out.write_str(s);
    }

    #[inline]
    pub(crate) fn emit_raw(&mut self, bytes: &[u8]) {
        self.out.write_bytes(bytes);
    }

    #[inline]
    pub(crate) fn emit_escaped(&mut self, bytes: &[u8]) {
        write_escaped(&mut *self.out, bytes);
    }

    pub(crate) fn sink(&mut self) -> &mut dyn HtmlSink {
        &mut *self.out
    }

    /// Write `text` escaped, or render it again inline or as blocks.
    pub(crate) fn render_as(&mut self, recurse: Recurse, text: &[u8]) {
        match recurse {
            Recurse::Raw => self.emit_escaped(text),
            Recurse::Inline => self.nested(text, Context::Inline),
            Recurse::Block => self.nested(text, Context::Block),
        }
    }

    /// Render nested content. It starts outside any table, and a table it
    /// opens is closed before the enclosing table state comes back.
    pub(crate) fn nested(&mut self, text: &[u8], ctx: Context) {
        let outer = std::mem::take(&mut self.table);
        self.process(text, ctx);
        table::finish(self);
        self.table = outer;
    }

    pub(crate) fn start_paragraph(&mut self) {
        self.emit("<p>");
        self.in_paragraph = true;
    }

    /// Close a `<p>` left open by an enclosing paragraph.
    pub(crate) fn end_paragraph(&mut self) {
        if self.in_paragraph {
            self.emit("</p>\n");
            self.in_paragraph = false;
        }
    }

    /* =========================== Dispatch loop ========================== */

    /// Render `text` starting in `ctx`.
    pub(crate) fn process(&mut self, text: &[u8], mut ctx: Context) {
        let n = text.len();
        let mut i = 0usize;

        while i < n {
            if ctx == Context::Block {
                while i < n && text[i] == b'\n' {
                    i += 1;
                }
                if i == n {
                    return;
                }
            }

            let rest = &text[i..];
            match self.dispatch(rest, ctx) {
                Some(step) => {
                    i = (i + step.consumed).min(n);
                    ctx = step.next;
                }
                None => {
                    let (c, len) = decode_lossy(rest);
                    write_escaped_char(&mut *self.out, c);
                    i += len;
                    ctx = Context::Inline;
                }
            }

            // Don't print a single newline at the end.
            if i + 1 == n && text[i] == b'\n' {
                return;
            }
            if i + 1 < n && text[i] == b'\n' && text[i + 1] == b'\n' {
                ctx = Context::Block;
                // A blank line ends any table.
                table::finish(self);
            }
        }
    }

    fn dispatch(&mut self, text: &[u8], ctx: Context) -> Option<Step> {
        for &(name, recognize) in RECOGNIZERS {
            if let Some(step) = recognize(self, text, ctx) {
                debug_assert!(step.consumed > 0, "{name} matched without consuming");
                log::trace!("{name}: {} bytes, next {:?}", step.consumed, step.next);
                return Some(step);
            }
        }
        None
    }
}

/// Render `input` into a fresh buffer.
pub fn render(input: &[u8], options: RenderOptions) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len() + input.len() / 4 + 64);
    Renderer::new(&mut out, options).render(input);
    out
}

/// Render `input`, optionally with raw HTML disabled.
pub fn to_html(input: &[u8], no_html: bool) -> Vec<u8> {
    render(input, RenderOptions { no_html })
}

/* =========================== Shared helpers ============================= */

#[inline]
pub(crate) fn is_space(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

/// First occurrence of `needle` at or after `from` that is not preceded by a
/// backslash.
pub(crate) fn find_unescaped(text: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    let mut k = from;
    while k < text.len() {
        let at = k + memmem::find(&text[k..], needle)?;
        if at > 0 && text[at - 1] == b'\\' {
            k = at + 1;
            continue;
        }
        return Some(at);
    }
    None
}

/// Where a block-level rule may start: at a block boundary, or right after a
/// newline in running text. Returns the offset of the candidate line.
pub(crate) fn block_start(text: &[u8], ctx: Context) -> Option<usize> {
    match ctx {
        Context::Block => Some(0),
        Context::Inline if text.first() == Some(&b'\n') => Some(1),
        Context::Inline => None,
    }
}
