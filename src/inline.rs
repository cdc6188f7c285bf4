// src/inline.rs
//
// Inline recognizers: emphasis and code spans, links and images, autolinks,
// raw HTML tags and the literal replacement table.

use memchr::{memchr, memchr2, memmem};

use crate::escape::write_char_refs;
use crate::render::{find_unescaped, is_space, Context, Renderer, Step};
use crate::rules::{REPLACEMENTS, SURROUNDS};

/* =============================== Surrounds ============================== */

/// Code spans and emphasis. The closing delimiter is the nearest one after
/// the opener that is not backslash-escaped.
pub(crate) fn surround(r: &mut Renderer<'_>, text: &[u8], _ctx: Context) -> Option<Step> {
    for rule in SURROUNDS {
        let len = rule.delim.len();
        if text.len() < 2 * len || !text.starts_with(rule.delim) {
            continue;
        }
        let Some(stop) = find_unescaped(text, rule.delim, len) else {
            continue;
        };
        if stop == len {
            continue;
        }

        // `` ` code ` `` loses one space on each side.
        let (mut start, mut end) = (len, stop);
        if end - start >= 2 && text[start] == b' ' && text[end - 1] == b' ' {
            start += 1;
            end -= 1;
        }

        r.emit(rule.open);
        r.render_as(rule.recurse, &text[start..end]);
        r.emit(rule.close);
        return Step::inline(stop + len);
    }
    None
}

/* ================================= Links ================================ */

/// Split a link destination into URL and optional quoted title.
///
/// A title that is not closed by the same quote character is not a title; the
/// whole destination is then used as the URL.
fn split_title(dest: &[u8]) -> (&[u8], Option<&[u8]>) {
    let Some(open) = memchr2(b'"', b'\'', dest) else {
        return (dest, None);
    };
    let quote = dest[open];
    let close = dest
        .iter()
        .rposition(|&b| !is_space(b) && b != b'\n')
        .unwrap_or(0);
    if close <= open || dest[close] != quote {
        return (dest, None);
    }
    let url_len = dest[..open]
        .iter()
        .rposition(|&b| !is_space(b))
        .map_or(0, |i| i + 1);
    (&dest[..url_len], Some(&dest[open + 1..close]))
}

/// Index of the `)` that balances the `(` just before `from`.
fn closing_paren(text: &[u8], from: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut p = from;
    loop {
        let at = p + memchr2(b'(', b')', text.get(p..)?)?;
        if text[at] == b'(' {
            depth += 1;
        } else {
            depth -= 1;
            if depth == 0 {
                return Some(at);
            }
        }
        p = at + 1;
    }
}

/// `[text](url "title")` and `![alt](src "title")`.
pub(crate) fn link(r: &mut Renderer<'_>, text: &[u8], _ctx: Context) -> Option<Step> {
    let (is_image, desc_start) = if text.starts_with(b"![") {
        (true, 2)
    } else if text.first() == Some(&b'[') {
        (false, 1)
    } else {
        return None;
    };
    let desc_end = desc_start + memmem::find(&text[desc_start..], b"](")?;
    let dest_start = desc_end + 2;
    let close = closing_paren(text, dest_start)?;

    let desc = &text[desc_start..desc_end];
    let (mut url, title) = split_title(&text[dest_start..close]);
    if url.len() >= 2 && url[0] == b'<' && url[url.len() - 1] == b'>' {
        url = &url[1..url.len() - 1];
    }

    if is_image {
        r.emit("<img src=\"");
        r.emit_escaped(url);
        r.emit("\" alt=\"");
        r.emit_escaped(desc);
        r.emit("\"");
        if let Some(title) = title {
            r.emit(" title=\"");
            r.emit_escaped(title);
            r.emit("\"");
        }
        r.emit(" />");
    } else {
        r.emit("<a href=\"");
        r.emit_escaped(url);
        r.emit("\"");
        if let Some(title) = title {
            r.emit(" title=\"");
            r.emit_escaped(title);
            r.emit("\"");
        }
        r.emit(">");
        r.nested(desc, Context::Inline);
        r.emit("</a>");
    }
    Step::inline(close + 1)
}

/* =============================== Autolinks ============================== */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AutoKind {
    Url,
    Email,
}

/// `<https://example.org>` and `<someone@example.org>`. Mail addresses are
/// written as numeric character references.
pub(crate) fn autolink(r: &mut Renderer<'_>, text: &[u8], _ctx: Context) -> Option<Step> {
    if text.first() != Some(&b'<') {
        return None;
    }
    let mut kind = None;
    for (p, &b) in text.iter().enumerate().skip(1) {
        match b {
            b' ' | b'\t' | b'\n' => return None,
            // A scheme or fragment marker wins over an `@` seen earlier.
            b'#' | b':' => kind = Some(AutoKind::Url),
            b'@' if kind.is_none() => kind = Some(AutoKind::Email),
            b'>' => {
                let address = &text[1..p];
                match kind? {
                    AutoKind::Email => {
                        r.emit("<a href=\"");
                        write_char_refs(r.sink(), b"mailto:");
                        write_char_refs(r.sink(), address);
                        r.emit("\">");
                        write_char_refs(r.sink(), address);
                        r.emit("</a>");
                    }
                    AutoKind::Url => {
                        r.emit("<a href=\"");
                        r.emit_escaped(address);
                        r.emit("\">");
                        r.emit_escaped(address);
                        r.emit("</a>");
                    }
                }
                return Step::inline(p + 1);
            }
            _ => {}
        }
    }
    None
}

/* =============================== Raw HTML =============================== */

/// An inline tag copied through verbatim: up to its matching close tag if
/// there is one, otherwise up to the end of the opening tag.
pub(crate) fn raw_html(r: &mut Renderer<'_>, text: &[u8], _ctx: Context) -> Option<Step> {
    if r.options.no_html || text.len() <= 2 || text[0] != b'<' {
        return None;
    }
    if !(text[1].is_ascii_alphabetic() || text[1] == b'_') {
        return None;
    }
    let name_end = 1 + text[1..].iter().take_while(|b| b.is_ascii_alphanumeric()).count();
    if name_end == 1 {
        return None;
    }

    let close_tag = [b"</", &text[1..name_end], b">"].concat();
    let end = match memmem::find(&text[name_end..], &close_tag) {
        Some(off) => name_end + off + close_tag.len(),
        None => name_end + memchr(b'>', &text[name_end..])? + 1,
    };
    r.emit_raw(&text[..end]);
    Step::inline(end)
}

/* ============================== Replacements ============================ */

/// Backslash escapes, HTML specials and hard line breaks.
pub(crate) fn replace(r: &mut Renderer<'_>, text: &[u8], _ctx: Context) -> Option<Step> {
    let (literal, replacement) = REPLACEMENTS
        .iter()
        .find(|(literal, _)| text.starts_with(literal))?;
    r.emit(replacement);
    Step::inline(literal.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::to_html;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn html(input: &str) -> String {
        String::from_utf8(to_html(input.as_bytes(), false)).unwrap()
    }

    fn inline(input: &str) -> String {
        let html = html(input);
        html.strip_prefix("<p>")
            .and_then(|h| h.strip_suffix("</p>\n"))
            .unwrap_or(&html)
            .to_string()
    }

    #[rstest]
    #[case("*em*", "<em>em</em>")]
    #[case("_em_", "<em>em</em>")]
    #[case("**strong**", "<strong>strong</strong>")]
    #[case("__strong__", "<strong>strong</strong>")]
    #[case("***both***", "<strong><em>both</em></strong>")]
    #[case("**a *b* c**", "<strong>a <em>b</em> c</strong>")]
    #[case("`a<&`", "<code>a&lt;&amp;</code>")]
    #[case("`` a`b ``", "<code>a`b</code>")]
    #[case("`*not em*`", "<code>*not em*</code>")]
    #[case("** **", "<strong> </strong>")]
    fn surrounds(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(inline(input), expected);
    }

    #[rstest]
    #[case("**", "**")]
    #[case("*open", "*open")]
    #[case("\\*x*", "*x*")]
    #[case("*a\\*", "*a*")]
    fn unmatched_delimiters_are_text(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(inline(input), expected);
    }

    #[test]
    fn split_title_variants() {
        assert_eq!(split_title(b"u"), (&b"u"[..], None));
        assert_eq!(split_title(b"u \"t\""), (&b"u"[..], Some(&b"t"[..])));
        assert_eq!(split_title(b"u  't' "), (&b"u"[..], Some(&b"t"[..])));
        assert_eq!(split_title(b"u \"t'"), (&b"u \"t'"[..], None));
        assert_eq!(split_title(b"it's"), (&b"it's"[..], None));
    }

    #[rstest]
    #[case("[text](http://x)", "<a href=\"http://x\">text</a>")]
    #[case(
        "[text](http://x \"a title\")",
        "<a href=\"http://x\" title=\"a title\">text</a>"
    )]
    #[case("[*em*](u)", "<a href=\"u\"><em>em</em></a>")]
    #[case("[w](<a b>)", "<a href=\"a b\">w</a>")]
    #[case("[w](f(x))", "<a href=\"f(x)\">w</a>")]
    #[case("[q](a?b=\"c\")", "<a href=\"a?b=\" title=\"c\">q</a>")]
    #[case("![alt](i.png)", "<img src=\"i.png\" alt=\"alt\" />")]
    #[case(
        "![alt](i.png 'T')",
        "<img src=\"i.png\" alt=\"alt\" title=\"T\" />"
    )]
    fn links_and_images(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(inline(input), expected);
    }

    #[test]
    fn unbalanced_link_is_text() {
        assert_eq!(inline("[a](b"), "[a](b");
        assert_eq!(inline("[a] (b)"), "[a] (b)");
    }

    #[test]
    fn url_autolink() {
        assert_eq!(
            inline("<https://example.org/?a&b>"),
            "<a href=\"https://example.org/?a&amp;b\">https://example.org/?a&amp;b</a>"
        );
    }

    #[test]
    fn email_autolink_is_obfuscated() {
        assert_eq!(
            inline("<a@b>"),
            "<a href=\"&#109;&#97;&#105;&#108;&#116;&#111;&#58;&#97;&#64;&#98;\">\
             &#97;&#64;&#98;</a>"
        );
    }

    #[test]
    fn autolink_needs_a_marker() {
        assert_eq!(inline("<plain>"), "<plain>");
        assert_eq!(
            String::from_utf8(to_html(b"<plain>", true)).unwrap(),
            "<p>&lt;plain&gt;</p>\n"
        );
    }

    #[rstest]
    #[case("<b>bold</b> text", "<b>bold</b> text")]
    #[case("a <br/> b", "a <br/> b")]
    #[case("<span class=\"x\">*y*</span>", "<span class=\"x\">*y*</span>")]
    #[case("<3 you", "&lt;3 you")]
    #[case("<_>", "&lt;_&gt;")]
    fn raw_html_tags(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(inline(input), expected);
    }

    #[test]
    fn raw_html_disabled() {
        assert_eq!(
            String::from_utf8(to_html(b"<b>x</b>", true)).unwrap(),
            "<p>&lt;b&gt;x&lt;/b&gt;</p>\n"
        );
    }

    #[rstest]
    #[case("a & b", "a &amp; b")]
    #[case("&amp;", "&amp;")]
    #[case("\\[x\\]", "[x]")]
    #[case("\\\\", "\\")]
    #[case("\\<", "&lt;")]
    #[case("line  \nnext", "line<br />\nnext")]
    fn replacements(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(inline(input), expected);
    }
}
