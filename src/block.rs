// src/block.rs
//
// Block recognizers: setext headings, comments, code fences, the line-prefix
// family (indented code, blockquotes, ATX headings, rules) and paragraphs.

use memchr::{memchr, memmem};

use crate::render::{block_start, find_unescaped, Context, Renderer, Step};
use crate::rules::{LINE_PREFIXES, UNDERLINES};

const CODE_FENCE: &[u8] = b"```";
const COMMENT_OPEN: &[u8] = b"<!--";
const COMMENT_CLOSE: &[u8] = b"-->";

/// End of the line starting at `i`: index of its '\n', or `text.len()`.
#[inline]
pub(crate) fn line_end(text: &[u8], i: usize) -> usize {
    memchr(b'\n', &text[i..]).map_or(text.len(), |off| i + off)
}

/* =========================== Setext headings ============================ */

/// `Title` followed by a line of three or more `=` or `-`.
pub(crate) fn underline_heading(r: &mut Renderer<'_>, text: &[u8], ctx: Context) -> Option<Step> {
    if ctx != Context::Block {
        return None;
    }
    let title_len = line_end(text, 0);
    let under = title_len + 1;
    if title_len == 0 || under >= text.len() {
        return None;
    }
    let under_end = line_end(text, under);
    let underline = &text[under..under_end];

    for rule in UNDERLINES {
        let ch = rule.delim[0];
        if underline.len() >= 3 && underline.iter().all(|&b| b == ch) {
            r.end_paragraph();
            r.emit(rule.open);
            r.render_as(rule.recurse, &text[..title_len]);
            r.emit(rule.close);
            return Step::block(under_end);
        }
    }
    None
}

/* =============================== Comments =============================== */

/// `<!-- ... -->` copied through untouched.
pub(crate) fn comment(r: &mut Renderer<'_>, text: &[u8], ctx: Context) -> Option<Step> {
    if r.options.no_html || !text.starts_with(COMMENT_OPEN) {
        return None;
    }
    let end = memmem::find(text, COMMENT_CLOSE)? + COMMENT_CLOSE.len();
    r.emit_raw(&text[..end]);
    r.emit("\n");
    Some(Step { consumed: end, next: ctx })
}

/* ============================== Code fences ============================= */

/// Fenced code. An unterminated fence runs to the end of the input.
pub(crate) fn code_fence(r: &mut Renderer<'_>, text: &[u8], ctx: Context) -> Option<Step> {
    if ctx != Context::Block || !text.starts_with(CODE_FENCE) {
        return None;
    }
    let lang_end = line_end(text, CODE_FENCE.len());
    let lang = text[CODE_FENCE.len()..lang_end].trim_ascii();
    let body_start = (lang_end + 1).min(text.len());

    let (body_end, consumed) = match find_unescaped(text, CODE_FENCE, body_start) {
        Some(close) => (close, close + CODE_FENCE.len()),
        None => (text.len(), text.len()),
    };

    r.end_paragraph();
    if lang.is_empty() {
        r.emit("<pre><code>");
    } else {
        r.emit("<pre><code class=\"language-");
        r.emit_escaped(lang);
        r.emit("\">");
    }
    r.emit_escaped(&text[body_start..body_end]);
    r.emit("</code></pre>\n");
    Step::block(consumed)
}

/* ============================= Line prefixes ============================ */

/// Indented code, blockquotes, ATX headings and horizontal rules.
pub(crate) fn line_prefix(r: &mut Renderer<'_>, text: &[u8], ctx: Context) -> Option<Step> {
    let start = block_start(text, ctx)?;
    let line = &text[start..];

    let rule = LINE_PREFIXES.iter().find(|rule| line.starts_with(rule.delim))?;
    let single_line = rule.delim.ends_with(b"\n");
    let is_quote = rule.delim[0] == b'>';
    // A multi-line prefix needs something after it, not counting the space
    // a blockquote marker may carry.
    let mut body = rule.delim.len();
    if is_quote && line.get(body) == Some(&b' ') {
        body += 1;
    }
    if !single_line && line.len() <= body {
        return None;
    }

    if start == 1 {
        r.emit("\n");
    }
    r.end_paragraph();
    r.emit(rule.open);

    if single_line {
        r.emit("\n");
        return Step::block(start + rule.delim.len());
    }

    let mut captured = Vec::new();
    let mut p = start;
    while text[p..].starts_with(rule.delim) && p + rule.delim.len() < text.len() {
        p += rule.delim.len();
        if is_quote && text[p] == b' ' {
            p += 1;
        }
        let end = (line_end(text, p) + 1).min(text.len());
        captured.extend_from_slice(&text[p..end]);
        p = end;
    }

    let keep = captured.iter().rposition(|&b| b != b'\n').map_or(0, |i| i + 1);
    captured.truncate(keep);

    r.render_as(rule.recurse, &captured);
    r.emit(rule.close);
    r.emit("\n");
    Step::block(p)
}

/* ============================== Paragraphs ============================== */

/// Where a paragraph starting at `text[0]` stops: a blank line or a fence.
fn paragraph_end(text: &[u8]) -> usize {
    if text.len() < 2 {
        return text.len();
    }
    let tail = &text[1..];
    let blank = memmem::find(tail, b"\n\n");
    let fence = memmem::find(tail, b"\n```");
    match (blank, fence) {
        (Some(a), Some(b)) => 1 + a.min(b),
        (Some(a), None) | (None, Some(a)) => 1 + a,
        (None, None) => text.len(),
    }
}

pub(crate) fn paragraph(r: &mut Renderer<'_>, text: &[u8], ctx: Context) -> Option<Step> {
    if ctx != Context::Block {
        return None;
    }
    let end = paragraph_end(text);
    r.start_paragraph();
    r.nested(&text[..end], Context::Inline);
    r.end_paragraph();
    Step::block(end)
}

#[cfg(test)]
mod tests {
    use crate::render::to_html;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn html(input: &str) -> String {
        String::from_utf8(to_html(input.as_bytes(), false)).unwrap()
    }

    #[rstest]
    #[case("# Hello", "<h1>Hello</h1>\n")]
    #[case("# Hello\n", "<h1>Hello</h1>\n")]
    #[case("### Three *em*", "<h3>Three <em>em</em></h3>\n")]
    #[case("###### Six", "<h6>Six</h6>\n")]
    #[case("#hashtag", "<p>#hashtag</p>\n")]
    fn atx_headings(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(html(input), expected);
    }

    #[rstest]
    #[case("Title\n=====", "<h1>Title</h1>\n")]
    #[case("Title\n---\n\nbody", "<h2>Title</h2>\n<p>body</p>\n")]
    #[case("Title\n==", "<p>Title\n==</p>\n")]
    #[case("Title\n===x", "<p>Title\n===x</p>\n")]
    fn setext_headings(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(html(input), expected);
    }

    #[test]
    fn horizontal_rules() {
        assert_eq!(html("---\nafter"), "<hr />\n<p>after</p>\n");
        assert_eq!(html("- - -\n"), "<hr />\n");
    }

    #[test]
    fn heading_after_text_line_closes_paragraph() {
        assert_eq!(html("text\n# h"), "<p>text\n</p>\n<h1>h</h1>\n");
        assert_eq!(
            html("text\n> quote"),
            "<p>text\n</p>\n<blockquote><p>quote</p>\n</blockquote>\n"
        );
    }

    #[rstest]
    #[case(">", "<p>&gt;</p>\n")]
    #[case("> ", "<p>&gt; </p>\n")]
    #[case("#", "<p>#</p>\n")]
    fn bare_prefix_is_text(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(html(input), expected);
    }

    #[test]
    fn indented_code_is_escaped() {
        assert_eq!(
            html("    let a = b < c;\n    done\n"),
            "<pre><code>let a = b &lt; c;\ndone\n</code></pre>\n"
        );
        assert_eq!(html("\tx"), "<pre><code>x\n</code></pre>\n");
    }

    #[test]
    fn blockquote_recurses_as_blocks() {
        assert_eq!(
            html("> # Quote\n> text *here*\n"),
            "<blockquote><h1>Quote</h1>\n<p>text <em>here</em></p>\n</blockquote>\n"
        );
    }

    #[test]
    fn table_inside_blockquote_closes_with_it() {
        assert_eq!(
            html("> |a\n\nafter"),
            "<blockquote><table>\n<tr><th>a</th></tr>\n</table>\n</blockquote>\n<p>after</p>\n"
        );
    }

    #[test]
    fn blockquote_stops_at_unprefixed_line() {
        assert_eq!(
            html(">a\n\nb"),
            "<blockquote><p>a</p>\n</blockquote>\n<p>b</p>\n"
        );
    }

    #[test]
    fn code_fence_with_language() {
        assert_eq!(
            html("```rust\nfn main() {}\n```\n"),
            "<pre><code class=\"language-rust\">fn main() {}\n</code></pre>\n"
        );
    }

    #[test]
    fn unterminated_fence_runs_to_end() {
        assert_eq!(
            html("```\n<b>\n\nmore"),
            "<pre><code>&lt;b&gt;\n\nmore</code></pre>\n"
        );
    }

    #[test]
    fn escaped_fence_does_not_close() {
        assert_eq!(
            html("```\na \\``` b\n```"),
            "<pre><code>a \\``` b\n</code></pre>\n"
        );
    }

    #[test]
    fn paragraph_stops_before_fence() {
        assert_eq!(
            html("text\n```\ncode\n```"),
            "<p>text</p>\n<pre><code>code\n</code></pre>\n"
        );
    }

    #[test]
    fn comments_pass_through_unless_disabled() {
        assert_eq!(html("<!-- note -->"), "<!-- note -->\n");
        let escaped = to_html(b"<!-- note -->", true);
        assert_eq!(
            String::from_utf8(escaped).unwrap(),
            "<p>&lt;!-- note --&gt;</p>\n"
        );
    }

    #[test]
    fn unterminated_comment_is_text() {
        assert_eq!(html("<!-- open"), "<p>&lt;!-- open</p>\n");
    }
}
