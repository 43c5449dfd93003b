//! Parse-error rendering with source context.
//!
//! A [`Diagnostic`] pins a message to a span of the offending source and
//! renders it with the source line and a caret underline, so a misplaced
//! token in a clause file is locatable without counting characters.

use std::fmt;

/// A span in the source text (byte offsets, end exclusive).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// A parse error with enough context to render the offending line.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    message: String,
    source: String,
    span: Span,
}

impl Diagnostic {
    pub fn new(source: impl Into<String>, span: Span, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: source.into(),
            span,
        }
    }

    /// The bare message, without source context.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The span the diagnostic points at.
    pub fn span(&self) -> Span {
        self.span
    }

    /// 1-based line and column of an offset. An offset at or past the end
    /// of the source resolves to just past the last character.
    fn line_col(&self, offset: usize) -> (usize, usize) {
        let mut line = 1;
        let mut col = 1;
        for (i, ch) in self.source.char_indices() {
            if i >= offset {
                break;
            }
            if ch == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }
        (line, col)
    }

    /// The full text of the line containing `offset`.
    fn line_text(&self, offset: usize) -> &str {
        let start = self.source[..offset.min(self.source.len())]
            .rfind('\n')
            .map(|i| i + 1)
            .unwrap_or(0);
        let end = self.source[start..]
            .find('\n')
            .map(|i| start + i)
            .unwrap_or(self.source.len());
        &self.source[start..end]
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (line, col) = self.line_col(self.span.start);
        writeln!(f, "{}", self.message)?;
        writeln!(f, " --> line {line}, column {col}")?;

        let text = self.line_text(self.span.start);
        let gutter = line.to_string();
        writeln!(f, "{} |", " ".repeat(gutter.len()))?;
        writeln!(f, "{gutter} | {text}")?;

        let width = (self.span.end.saturating_sub(self.span.start)).max(1);
        write!(
            f,
            "{} | {}{}",
            " ".repeat(gutter.len()),
            " ".repeat(col.saturating_sub(1)),
            "^".repeat(width.min(text.len().saturating_sub(col - 1).max(1))),
        )
    }
}
