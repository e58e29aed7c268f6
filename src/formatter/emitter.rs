//! Indentation-aware output buffer with elastic tab stops.
//!
//! Text is collected line by line as cells. A cell is closed by a soft
//! separator (alignment only) or a hard one (also keeps an empty column).
//! Consecutive lines of one section that have a cell in the same column are
//! padded to a common width when the buffer is finished, the way `gofmt`
//! lines up struct fields, grouped specs and trailing comments.

use std::ops::Range;

/// Spaces between the widest cell of a column and the next column.
const PADDING: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Term {
    Soft,
    Hard,
}

#[derive(Debug, Default)]
struct Line {
    indent: usize,
    cells: Vec<(String, Term)>,
    /// Text after the last closed cell; never padded.
    tail: String,
    /// Alignment does not carry over from the line above.
    section: bool,
    /// Continuation line of a multi-line literal, printed as written.
    verbatim: bool,
}

impl Line {
    fn is_empty(&self) -> bool {
        self.cells.is_empty() && self.tail.is_empty()
    }
}

pub(crate) struct Emitter {
    lines: Vec<Line>,
    line: Line,
    indent: usize,
    at_line_start: bool,
    next_section: bool,
}

impl Emitter {
    pub(crate) fn new() -> Self {
        Self {
            lines: Vec::new(),
            line: Line::default(),
            indent: 0,
            at_line_start: true,
            next_section: false,
        }
    }

    /// A buffer for text that continues a line already started at `indent`.
    pub(crate) fn nested(indent: usize) -> Self {
        Self {
            indent,
            at_line_start: false,
            ..Self::new()
        }
    }

    pub(crate) fn indent(&mut self) {
        self.indent += 1;
    }

    pub(crate) fn dedent(&mut self) {
        debug_assert!(self.indent > 0);
        self.indent = self.indent.saturating_sub(1);
    }

    pub(crate) fn level(&self) -> usize {
        self.indent
    }

    fn start_line(&mut self) {
        if self.at_line_start {
            self.line.indent = self.indent;
            self.at_line_start = false;
        }
    }

    /// Append text to the current cell. Embedded newlines start verbatim
    /// continuation lines.
    pub(crate) fn write(&mut self, s: &str) {
        let mut parts = s.split('\n');
        if let Some(first) = parts.next() {
            if !first.is_empty() {
                self.start_line();
                self.line.tail.push_str(first);
            }
        }
        for part in parts {
            self.end_line();
            self.at_line_start = false;
            self.line.verbatim = true;
            self.line.section = true;
            self.next_section = true;
            self.line.tail.push_str(part);
        }
    }

    fn close_cell(&mut self, term: Term) {
        self.start_line();
        let text = std::mem::take(&mut self.line.tail);
        self.line.cells.push((text, term));
    }

    /// Close the current cell for alignment.
    pub(crate) fn sep(&mut self) {
        self.close_cell(Term::Soft);
    }

    /// Close the current cell; an empty column closed this way is kept.
    pub(crate) fn tab(&mut self) {
        self.close_cell(Term::Hard);
    }

    fn end_line(&mut self) {
        let next = Line {
            section: std::mem::take(&mut self.next_section),
            ..Line::default()
        };
        let done = std::mem::replace(&mut self.line, next);
        self.lines.push(done);
    }

    pub(crate) fn newline(&mut self) {
        self.end_line();
        self.at_line_start = true;
    }

    /// End the line; the next one starts a new alignment section.
    pub(crate) fn formfeed(&mut self) {
        self.next_section = true;
        self.newline();
    }

    pub(crate) fn blank_line(&mut self) {
        if !self.line.is_empty() {
            self.newline();
        }
        match self.lines.last() {
            None => return,
            Some(last) if last.is_empty() && !last.verbatim => return,
            Some(_) => {}
        }
        self.newline();
    }

    /// Number of lines ended so far.
    pub(crate) fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub(crate) fn finish(mut self) -> String {
        let pending = !self.line.is_empty();
        if pending {
            self.end_line();
        }
        let mut out = String::new();
        let mut start = 0;
        for i in 1..=self.lines.len() {
            if i == self.lines.len() || starts_section(&self.lines[i - 1], &self.lines[i]) {
                render_section(&self.lines[start..i], &mut out);
                start = i;
            }
        }
        if pending {
            out.pop();
        }
        out
    }
}

fn starts_section(prev: &Line, line: &Line) -> bool {
    line.section
        || line.verbatim
        || prev.verbatim
        || line.indent != prev.indent
        || line.is_empty()
        || prev.is_empty()
}

/// Width of every closed cell in `range`, column by column. A column block
/// is a run of consecutive lines that all have a closed cell in that column;
/// each block is sized independently.
fn column_widths(lines: &[Line], column: usize, range: Range<usize>, widths: &mut [Vec<usize>]) {
    let mut row = range.start;
    while row < range.end {
        if lines[row].cells.len() <= column {
            row += 1;
            continue;
        }
        let block = row;
        let mut width = 0;
        let mut discardable = true;
        while row < range.end && lines[row].cells.len() > column {
            let (text, term) = &lines[row].cells[column];
            let w = text.chars().count();
            width = width.max(w + PADDING);
            if w > 0 || *term == Term::Hard {
                discardable = false;
            }
            row += 1;
        }
        if discardable {
            width = 0;
        }
        for w in &mut widths[block..row] {
            w.push(width);
        }
        column_widths(lines, column + 1, block..row, widths);
    }
}

fn render_section(lines: &[Line], out: &mut String) {
    let mut widths = vec![Vec::new(); lines.len()];
    column_widths(lines, 0, 0..lines.len(), &mut widths);

    for (line, widths) in lines.iter().zip(widths) {
        if line.is_empty() {
            out.push('\n');
            continue;
        }
        if !line.verbatim {
            for _ in 0..line.indent {
                out.push('\t');
            }
        }
        let mut content_end = out.len();
        for ((text, _), width) in line.cells.iter().zip(widths) {
            out.push_str(text);
            if !text.is_empty() {
                content_end = out.len();
            }
            let w = text.chars().count();
            for _ in w..width {
                out.push(' ');
            }
        }
        if line.tail.is_empty() {
            out.truncate(content_end);
        } else {
            out.push_str(&line.tail);
        }
        out.push('\n');
    }
}
