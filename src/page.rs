// src/page.rs
//
// Standalone page output: a small `{{.field}}` template wrapped around the
// rendered body, plus the built-in template and stylesheet.

use memchr::memmem;

use crate::error::Error;

pub const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>{{.title}}</title>
    <style>{{.css}}</style>
</head>
<body>
    {{.body}}
</body>
</html>"#;

pub const DEFAULT_CSS: &str = r#"
body {
  font-family: sans-serif;
  font-size: 16px;
  text-size-adjust: none;
  max-width: 680px;
  margin: 30px auto 0 auto;
}
@media (max-width: 980px) {
  body {
    max-width: 90%;
    font-size: 2em;
  }
}
h1, h2, h3, h4, h5, h6 {
  margin-bottom: 0.5em;
}
h1 {
  font-size: 48px;
  text-align: center;
}
h2 {
  border-bottom: 3px black solid;
}
h1 > a, h2 > a {
  text-decoration: none;
}
a:hover {
  opacity: 0.5;
}
p, ul {
  margin: 0 auto 0.5em auto;
}
code {
  background: #eee;
  padding: 0.3rem;
  tab-size: 4;
}
pre code {
  display: block;
  overflow-x: auto;
  padding: 0.3rem 0.6rem;
}
"#;

/// Text of the first `<h1>` element in `body`, trimmed. Empty when there is
/// none.
pub fn extract_title(body: &[u8]) -> &[u8] {
    let Some(open) = memmem::find(body, b"<h1>") else {
        return b"";
    };
    let start = open + b"<h1>".len();
    match memmem::find(&body[start..], b"</h1>") {
        Some(len) => body[start..start + len].trim_ascii(),
        None => b"",
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    Title,
    Css,
    Body,
}

impl Field {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b".title" => Some(Field::Title),
            b".css" => Some(Field::Css),
            b".body" => Some(Field::Body),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Text(Vec<u8>),
    Field(Field),
}

/// Values substituted into a [`Template`].
#[derive(Clone, Copy, Debug, Default)]
pub struct PageParts<'a> {
    pub title: &'a [u8],
    pub css: &'a [u8],
    pub body: &'a [u8],
}

impl<'a> PageParts<'a> {
    /// Parts for `body`, with the title taken from its first heading.
    pub fn for_body(body: &'a [u8], css: &'a [u8]) -> Self {
        PageParts {
            title: extract_title(body),
            css,
            body,
        }
    }

    fn get(&self, field: Field) -> &'a [u8] {
        match field {
            Field::Title => self.title,
            Field::Css => self.css,
            Field::Body => self.body,
        }
    }
}

/// A parsed page template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub fn builtin() -> Self {
        // Only known fields appear in the built-in template.
        Self::parse(DEFAULT_TEMPLATE.as_bytes()).unwrap_or_else(|_| Template {
            segments: vec![Segment::Field(Field::Body)],
        })
    }

    /// Parse `src`, rejecting unterminated actions and unknown fields.
    pub fn parse(src: &[u8]) -> Result<Self, Error> {
        let mut segments = Vec::new();
        let mut i = 0usize;
        while let Some(off) = memmem::find(&src[i..], b"{{") {
            let open = i + off;
            if open > i {
                segments.push(Segment::Text(src[i..open].to_vec()));
            }
            let inner_start = open + 2;
            let Some(len) = memmem::find(&src[inner_start..], b"}}") else {
                return Err(Error::Template {
                    offset: open,
                    message: "unclosed action".to_string(),
                });
            };
            let name = src[inner_start..inner_start + len].trim_ascii();
            let field = Field::from_name(name).ok_or_else(|| Error::Template {
                offset: open,
                message: format!("unknown field {:?}", String::from_utf8_lossy(name)),
            })?;
            segments.push(Segment::Field(field));
            i = inner_start + len + 2;
        }
        if i < src.len() {
            segments.push(Segment::Text(src[i..].to_vec()));
        }
        log::debug!("parsed template with {} segments", segments.len());
        Ok(Template { segments })
    }

    /// Substitute `parts` into the template. Values are inserted verbatim.
    pub fn fill(&self, parts: &PageParts<'_>) -> Vec<u8> {
        let mut out = Vec::with_capacity(parts.body.len() + parts.css.len() + 512);
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.extend_from_slice(text),
                Segment::Field(field) => out.extend_from_slice(parts.get(*field)),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("<h1>Hello</h1>\n<p>x</p>\n", "Hello")]
    #[case("<p>a</p>\n<h1>  Spaced  </h1>\n<h1>Second</h1>", "Spaced")]
    #[case("<h2>Not a title</h2>", "")]
    #[case("<h1>unterminated", "")]
    fn title_is_first_h1(#[case] body: &str, #[case] title: &str) {
        assert_eq!(extract_title(body.as_bytes()), title.as_bytes());
    }

    #[test]
    fn fills_fields_verbatim() {
        let template = Template::parse(b"<t>{{.title}}</t>{{ .css }}|{{.body}}").unwrap();
        let page = template.fill(&PageParts {
            title: b"T & U",
            css: b"p{}",
            body: b"<p>b</p>",
        });
        assert_eq!(String::from_utf8(page).unwrap(), "<t>T & U</t>p{}|<p>b</p>");
    }

    #[test]
    fn builtin_page_carries_title_and_style() {
        let body = b"<h1>Doc</h1>\n<p>text</p>\n";
        let page = Template::builtin().fill(&PageParts::for_body(body, DEFAULT_CSS.as_bytes()));
        let page = String::from_utf8(page).unwrap();
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>Doc</title>"));
        assert!(page.contains("max-width: 680px;"));
        assert!(page.contains("    <h1>Doc</h1>\n<p>text</p>\n\n</body>"));
    }

    #[test]
    fn text_without_actions_is_kept() {
        let template = Template::parse(b"plain { braces }").unwrap();
        assert_eq!(template.fill(&PageParts::default()), b"plain { braces }");
    }

    #[test]
    fn rejects_unclosed_action() {
        let err = Template::parse(b"ok {{.title").unwrap_err();
        assert!(matches!(err, Error::Template { offset: 3, .. }), "{err}");
    }

    #[test]
    fn rejects_unknown_field() {
        let err = Template::parse(b"{{.author}}").unwrap_err();
        assert_eq!(
            err.to_string(),
            "template error at byte 0: unknown field \".author\""
        );
    }
}
