// src/rules.rs
//
// Static delimiter tables. Order is precedence: the first matching entry wins.

/// How the text captured by a rule is rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Recurse {
    /// Escaped verbatim, never re-parsed.
    Raw,
    /// Rendered again as inline text.
    Inline,
    /// Rendered again as a sequence of blocks.
    Block,
}

/// A delimiter with the tags written around what it captures.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Rule {
    pub delim: &'static [u8],
    pub recurse: Recurse,
    pub open: &'static str,
    pub close: &'static str,
}

const fn rule(
    delim: &'static [u8],
    recurse: Recurse,
    open: &'static str,
    close: &'static str,
) -> Rule {
    Rule { delim, recurse, open, close }
}

/* ============================= Line prefixes ============================ */

pub(crate) const LINE_PREFIXES: &[Rule] = &[
    rule(b"    ", Recurse::Raw, "<pre><code>", "\n</code></pre>"),
    rule(b"\t", Recurse::Raw, "<pre><code>", "\n</code></pre>"),
    rule(b">", Recurse::Block, "<blockquote>", "</blockquote>"),
    rule(b"###### ", Recurse::Inline, "<h6>", "</h6>"),
    rule(b"##### ", Recurse::Inline, "<h5>", "</h5>"),
    rule(b"#### ", Recurse::Inline, "<h4>", "</h4>"),
    rule(b"### ", Recurse::Inline, "<h3>", "</h3>"),
    rule(b"## ", Recurse::Inline, "<h2>", "</h2>"),
    rule(b"# ", Recurse::Inline, "<h1>", "</h1>"),
    rule(b"- - -\n", Recurse::Inline, "<hr />", ""),
    rule(b"---\n", Recurse::Inline, "<hr />", ""),
];

/* =============================== Underlines ============================= */

pub(crate) const UNDERLINES: &[Rule] = &[
    rule(b"=", Recurse::Inline, "<h1>", "</h1>\n"),
    rule(b"-", Recurse::Inline, "<h2>", "</h2>\n"),
];

/* =============================== Surrounds ============================== */

pub(crate) const SURROUNDS: &[Rule] = &[
    rule(b"```", Recurse::Raw, "<code>", "</code>"),
    rule(b"``", Recurse::Raw, "<code>", "</code>"),
    rule(b"`", Recurse::Raw, "<code>", "</code>"),
    rule(b"___", Recurse::Inline, "<strong><em>", "</em></strong>"),
    rule(b"***", Recurse::Inline, "<strong><em>", "</em></strong>"),
    rule(b"__", Recurse::Inline, "<strong>", "</strong>"),
    rule(b"**", Recurse::Inline, "<strong>", "</strong>"),
    rule(b"_", Recurse::Inline, "<em>", "</em>"),
    rule(b"*", Recurse::Inline, "<em>", "</em>"),
];

/* ============================= Replacements ============================= */

pub(crate) const REPLACEMENTS: &[(&[u8], &str)] = &[
    (b"\\\\", "\\"),
    (b"\\`", "`"),
    (b"\\*", "*"),
    (b"\\_", "_"),
    (b"\\{", "{"),
    (b"\\}", "}"),
    (b"\\[", "["),
    (b"\\]", "]"),
    (b"\\(", "("),
    (b"\\)", ")"),
    (b"\\#", "#"),
    (b"\\+", "+"),
    (b"\\-", "-"),
    (b"\\.", "."),
    (b"\\!", "!"),
    (b"\\\"", "&quot;"),
    (b"\\$", "$"),
    (b"\\%", "%"),
    (b"\\&", "&amp;"),
    (b"\\'", "'"),
    (b"\\,", ","),
    (b"\\/", "/"),
    (b"\\:", ":"),
    (b"\\;", ";"),
    (b"\\<", "&lt;"),
    (b"\\>", "&gt;"),
    (b"\\=", "="),
    (b"\\?", "?"),
    (b"\\@", "@"),
    (b"\\^", "^"),
    (b"\\|", "|"),
    (b"\\~", "~"),
    (b"<", "&lt;"),
    (b">", "&gt;"),
    (b"&amp;", "&amp;"),
    (b"&", "&amp;"),
    (b"  \n", "<br />\n"),
];
