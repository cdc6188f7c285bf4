// src/table.rs
//
// Pipe tables.
//
// The table recognizer only writes the structural tags. Cell text between
// pipes is left to the enclosing dispatch loop, so the table state has to
// survive from one recognizer call to the next for the rest of the document.

use crate::block::line_end;
use crate::render::{block_start, is_space, Context, Renderer, Step};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Phase {
    #[default]
    Outside,
    Header,
    /// Header row closed; the next pipe line is the delimiter row.
    AlignmentRow,
    Body,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Row {
    #[default]
    Closed,
    Header,
    Body,
}

impl Row {
    fn cell_tag(self) -> &'static str {
        match self {
            Row::Header => "th",
            _ => "td",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum Alignment {
    #[default]
    None,
    Left,
    Right,
    Center,
}

impl Alignment {
    /// `:--` left, `--:` right, `:-:` center.
    fn from_segment(seg: &[u8]) -> Self {
        match (seg.starts_with(b":"), seg.ends_with(b":")) {
            (true, true) => Alignment::Center,
            (true, false) => Alignment::Left,
            (false, true) => Alignment::Right,
            (false, false) => Alignment::None,
        }
    }

    fn attr(self) -> &'static str {
        match self {
            Alignment::None => "",
            Alignment::Left => " style=\"text-align: left\"",
            Alignment::Right => " style=\"text-align: right\"",
            Alignment::Center => " style=\"text-align: center\"",
        }
    }
}

/// Column alignments from a delimiter row such as `|---|:--:|`.
pub(crate) fn parse_alignments(line: &[u8]) -> Vec<Alignment> {
    let line = line.trim_ascii();
    let line = line.strip_prefix(b"|").unwrap_or(line);
    let line = line.strip_suffix(b"|").unwrap_or(line);
    line.split(|&b| b == b'|')
        .map(|seg| Alignment::from_segment(seg.trim_ascii()))
        .collect()
}

/// Table progress within one document.
#[derive(Debug, Default)]
pub(crate) struct TableState {
    phase: Phase,
    row: Row,
    cell: usize,
    columns: Vec<Alignment>,
}

impl TableState {
    pub(crate) fn is_open(&self) -> bool {
        self.phase != Phase::Outside
    }

    fn open(&mut self, columns: Vec<Alignment>) {
        *self = TableState {
            phase: Phase::Header,
            row: Row::Header,
            cell: 0,
            columns,
        };
    }

    fn close(&mut self) {
        *self = TableState::default();
    }

    fn alignment(&self, cell: usize) -> Alignment {
        self.columns.get(cell).copied().unwrap_or_default()
    }
}

/// Line end of `text[from..]` when only spaces or tabs come before it.
fn rest_of_line_blank(text: &[u8], from: usize) -> Option<usize> {
    let mut p = from;
    while p < text.len() && is_space(text[p]) {
        p += 1;
    }
    (p == text.len() || text[p] == b'\n').then_some(p)
}

fn close_table(r: &mut Renderer<'_>) {
    r.emit("\n</table>\n");
    r.table.close();
    log::debug!("table closed");
}

/// Close the open cell and its row.
fn end_row(r: &mut Renderer<'_>) {
    let row = r.table.row;
    r.emit(&format!("</{}></tr>", row.cell_tag()));
    if row == Row::Header {
        r.table.phase = Phase::AlignmentRow;
    }
    r.table.row = Row::Closed;
}

/// Close whatever is open: cell, row and table.
pub(crate) fn finish(r: &mut Renderer<'_>) {
    if !r.table.is_open() {
        return;
    }
    if r.table.row != Row::Closed {
        end_row(r);
    }
    close_table(r);
}

/// A row without a trailing pipe ends with its line. The table goes on only
/// if the next line is another pipe line.
pub(crate) fn row_end(r: &mut Renderer<'_>, text: &[u8], _ctx: Context) -> Option<Step> {
    if r.table.row == Row::Closed || text.first() != Some(&b'\n') {
        return None;
    }
    end_row(r);
    if text.get(1) != Some(&b'|') {
        close_table(r);
        return Step::block(1);
    }
    r.emit("\n");
    Step::inline(1)
}

/// Write the opening tag of the next cell; `pipe` is the pipe starting it.
fn open_cell(r: &mut Renderer<'_>, text: &[u8], pipe: usize) -> Option<Step> {
    let tag = r.table.row.cell_tag();
    if r.table.cell != 0 {
        r.emit(&format!("</{tag}>"));
    }
    let align = r.table.alignment(r.table.cell);
    r.emit(&format!("<{tag}{}>", align.attr()));
    r.table.cell += 1;

    let mut p = pipe + 1;
    while p < text.len() && is_space(text[p]) {
        p += 1;
    }
    Step::inline(p)
}

/// A pipe line at a block boundary, or right after a newline, starts a table.
fn open_table(r: &mut Renderer<'_>, text: &[u8], ctx: Context) -> Option<Step> {
    let start = block_start(text, ctx)?;
    if text.get(start) != Some(&b'|') {
        return None;
    }
    let first_end = line_end(text, start);
    let columns = if first_end < text.len() {
        parse_alignments(&text[first_end + 1..line_end(text, first_end + 1)])
    } else {
        Vec::new()
    };

    if start == 1 {
        r.emit("\n");
    }
    r.end_paragraph();
    log::debug!("table opened with {} aligned columns", columns.len());
    r.table.open(columns);
    r.emit("<table>\n<tr>");
    open_cell(r, text, start)
}

pub(crate) fn table(r: &mut Renderer<'_>, text: &[u8], ctx: Context) -> Option<Step> {
    if !r.table.is_open() {
        return open_table(r, text, ctx);
    }

    // Inside a row, spaces before a pipe belong to the cell boundary.
    let pipe = if r.table.row != Row::Closed {
        text.iter().take_while(|&&b| is_space(b)).count()
    } else {
        0
    };
    if text.get(pipe) != Some(&b'|') {
        return None;
    }

    if r.table.phase == Phase::AlignmentRow {
        r.table.phase = Phase::Body;
        let eol = line_end(text, 0);
        if text.get(eol + 1) != Some(&b'|') {
            close_table(r);
            return Step::block(eol);
        }
        return Step::inline(eol + 1);
    }

    // A trailing pipe closes the cell and the row, and the table with it
    // unless another pipe line follows.
    if r.table.row != Row::Closed {
        if let Some(eol) = rest_of_line_blank(text, pipe + 1) {
            end_row(r);
            if text.get(eol + 1) != Some(&b'|') {
                close_table(r);
                return Step::block(eol);
            }
            return Step::inline(eol);
        }
    } else {
        r.table.row = Row::Body;
        r.table.cell = 0;
        r.emit("<tr>");
    }

    open_cell(r, text, pipe)
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

    #[test]
    fn parses_delimiter_row() {
        assert_eq!(
            parse_alignments(b"|---|:--|--:|:-:|"),
            vec![
                Alignment::None,
                Alignment::Left,
                Alignment::Right,
                Alignment::Center
            ]
        );
        assert_eq!(
            parse_alignments(b"| --- | ---: |"),
            vec![Alignment::None, Alignment::Right]
        );
    }

    #[test]
    fn header_delimiter_and_body() {
        assert_eq!(
            html("| a | b |\n|---|---:|\n| 1 | 2 |\n"),
            "<table>\n<tr><th>a</th><th style=\"text-align: right\">b</th></tr>\n\
             <tr><td>1</td><td style=\"text-align: right\">2</td></tr>\n</table>\n"
        );
    }

    #[test]
    fn table_followed_by_paragraph() {
        assert_eq!(
            html("|x|\n|-|\n|y|\nafter"),
            "<table>\n<tr><th>x</th></tr>\n<tr><td>y</td></tr>\n</table>\n<p>after</p>\n"
        );
    }

    #[test]
    fn header_only_table_closes() {
        assert_eq!(html("|h|"), "<table>\n<tr><th>h</th></tr>\n</table>\n");
        assert_eq!(
            html("|h|\n|:-:|"),
            "<table>\n<tr><th style=\"text-align: center\">h</th></tr>\n\n</table>\n"
        );
    }

    #[test]
    fn ragged_rows_fall_back_to_unaligned() {
        assert_eq!(
            html("|a|\n|--:|\n|1|2|3|"),
            "<table>\n<tr><th style=\"text-align: right\">a</th></tr>\n\
             <tr><td style=\"text-align: right\">1</td><td>2</td><td>3</td></tr>\n</table>\n"
        );
    }

    #[test]
    fn cells_render_inline_markup() {
        assert_eq!(
            html("|*a*|`b`|\n|-|-|\n|[c](d)|e|"),
            "<table>\n<tr><th><em>a</em></th><th><code>b</code></th></tr>\n\
             <tr><td><a href=\"d\">c</a></td><td>e</td></tr>\n</table>\n"
        );
    }

    #[test]
    fn unterminated_last_row_is_closed_at_end() {
        assert_eq!(
            html("|a|\n|-|\n|b"),
            "<table>\n<tr><th>a</th></tr>\n<tr><td>b</td></tr>\n</table>\n"
        );
    }

    #[test]
    fn table_after_text_line_closes_paragraph() {
        assert_eq!(
            html("Results:\n|a|b|\n|-|-|\n|1|2|\n"),
            "<p>Results:\n</p>\n<table>\n<tr><th>a</th><th>b</th></tr>\n\
             <tr><td>1</td><td>2</td></tr>\n</table>\n"
        );
    }

    #[rstest]
    #[case("|a\n\nafter", "<table>\n<tr><th>a</th></tr>\n</table>\n<p>after</p>\n")]
    #[case("|a\nb", "<table>\n<tr><th>a</th></tr>\n</table>\n<p>b</p>\n")]
    #[case(
        "|h\n|-|\n|x|",
        "<table>\n<tr><th>h</th></tr>\n<tr><td>x</td></tr>\n</table>\n"
    )]
    fn row_without_trailing_pipe_ends_at_line_end(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(html(input), expected);
    }

    #[test]
    fn table_in_loose_list_item_stays_inside_it() {
        assert_eq!(
            html("- |a\n\n- b\n"),
            "<ul>\n<li><table>\n<tr><th>a</th></tr>\n</table>\n</li>\n<li><p>b</p>\n</li>\n</ul>\n"
        );
    }

    #[test]
    fn pipe_inside_paragraph_is_text() {
        assert_eq!(html("a | b"), "<p>a | b</p>\n");
    }
}
