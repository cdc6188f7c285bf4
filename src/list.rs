// src/list.rs
//
// Ordered and unordered lists.
//
// Items are collected line by line into a scratch buffer with the item
// indentation stripped, then rendered recursively: as blocks when the list is
// loose, as inline text otherwise.

use crate::render::{block_start, is_space, Context, Renderer, Step};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Marker {
    /// `-`, `*` or `+`.
    Bullet(u8),
    /// Digits followed by `.` or `)`, with the first number.
    Ordered(u64),
}

/// Parse a list marker at the front of `line`.
/// Returns the marker and the item indentation (marker plus whitespace).
fn parse_marker(line: &[u8]) -> Option<(Marker, usize)> {
    let (marker, mut p) = match *line.first()? {
        b @ (b'-' | b'*' | b'+') => (Marker::Bullet(b), 1),
        _ => {
            let digits = line.iter().take_while(|b| b.is_ascii_digit()).count();
            if digits == 0 || !matches!(line.get(digits), Some(b'.' | b')')) {
                return None;
            }
            // A start number too large to represent is dropped.
            let start = line[..digits]
                .iter()
                .try_fold(0u64, |n, &d| n.checked_mul(10)?.checked_add(u64::from(d - b'0')))
                .unwrap_or(1);
            (Marker::Ordered(start), digits + 1)
        }
    };
    if !line.get(p).copied().is_some_and(is_space) {
        return None;
    }
    p += 1;
    while p < line.len() && is_space(line[p]) {
        p += 1;
    }
    // Nothing after the marker.
    if p >= line.len() {
        return None;
    }
    Some((marker, p))
}

/// How a line following an item relates to the list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LineKind {
    /// Starts the next item.
    NextItem,
    /// Indented by the item indentation; belongs to the current item.
    Continuation,
    /// Not enough indentation; the list is over.
    End,
    /// Overshoots the indentation; taken into the item as-is.
    Lazy,
}

fn classify_line(line: &[u8], marker: Marker, indent: usize) -> LineKind {
    let mut j = 0usize;
    match marker {
        Marker::Bullet(m) => {
            if line.first() == Some(&m) {
                j = 1;
            }
        }
        Marker::Ordered(_) => {
            while j < line.len() && j < indent && line[j].is_ascii_digit() {
                j += 1;
            }
            if j >= line.len() {
                return LineKind::End;
            }
            if j > 0 && matches!(line[j], b'.' | b')') {
                j += 1;
            } else {
                j = 0;
            }
        }
    }
    if indent < line.len() {
        while j < indent && is_space(line[j]) {
            j += 1;
        }
    }

    if j == indent {
        if is_space(line[0]) {
            LineKind::Continuation
        } else {
            LineKind::NextItem
        }
    } else if j < indent {
        LineKind::End
    } else {
        LineKind::Lazy
    }
}

pub(crate) fn list(r: &mut Renderer<'_>, text: &[u8], ctx: Context) -> Option<Step> {
    let start = block_start(text, ctx)?;
    let (marker, indent) = parse_marker(&text[start..])?;

    if start == 1 {
        r.emit("\n");
    }
    r.end_paragraph();
    let close = match marker {
        Marker::Bullet(_) => {
            r.emit("<ul>\n");
            "</ul>\n"
        }
        Marker::Ordered(1) => {
            r.emit("<ol>\n");
            "</ol>\n"
        }
        Marker::Ordered(n) => {
            r.emit(&format!("<ol start=\"{n}\">\n"));
            "</ol>\n"
        }
    };

    let n = text.len();
    let mut p = start + indent;
    let mut blank_lines = 0usize;
    let mut more = true;
    let mut item = Vec::new();

    while p < n && more {
        item.clear();
        while p < n && more {
            if text[p] == b'\n' {
                if p + 1 == n {
                    break;
                }
                let mut q = p + 1;
                while q < n && is_space(text[q]) {
                    q += 1;
                }
                if q < n && text[q] == b'\n' {
                    item.push(b'\n');
                    blank_lines += 1;
                    more = false;
                    p = q;
                }

                let q = p + 1;
                match classify_line(&text[q..], marker, indent) {
                    LineKind::NextItem => {
                        item.push(b'\n');
                        more = true;
                        p += indent;
                        break;
                    }
                    LineKind::Continuation => {
                        item.push(b'\n');
                        more = true;
                        p += indent + 1;
                    }
                    LineKind::End => more = false,
                    LineKind::Lazy => {}
                }
            }
            item.push(text[p]);
            p += 1;
        }

        let loose = blank_lines > 1 || (blank_lines == 1 && more);
        r.emit("<li>");
        r.nested(&item, if loose { Context::Block } else { Context::Inline });
        r.emit("</li>\n");
        // Step over the separator before the next item.
        p += 1;
    }
    r.emit(close);

    // `p` sits two past the last byte taken; give back trailing newlines.
    let mut last = p.saturating_sub(2).min(n - 1);
    while last > 0 && text[last] == b'\n' {
        last -= 1;
    }
    Step::block(last + 1)
}
