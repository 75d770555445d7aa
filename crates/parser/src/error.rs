use std::io;

use annotate_snippets::{Level, Renderer, Snippet};
use smol_str::SmolStr;
use thiserror::Error;

use crate::{syntax::Rule, Span};

#[derive(Debug, Error)]
#[allow(clippy::large_enum_variant)]
pub enum Error {
    #[error("number out of bounds")]
    NumberOutOfBounds(Span),

    #[error("{0}")]
    SyntaxError(pest::error::Error<Rule>),

    #[error("undefined value: `{0}`")]
    UndefinedValue(SmolStr, Span),

    #[error("unknown inst: `{0}`")]
    UnknownInst(SmolStr, Span),

    #[error("value name `{0}` is already defined")]
    DuplicateValueName(SmolStr, Span),

    #[error("`{inst}` has no result to name")]
    UnexpectedResultName { inst: ir::Opcode, span: Span },

    #[error("expected `{expected}` number of arguments, but given `{actual}`")]
    InstArgNumMismatch {
        expected: usize,
        actual: usize,
        span: Span,
    },
}

impl Error {
    pub fn span(&self) -> Span {
        match self {
            Error::NumberOutOfBounds(span) => *span,
            Error::SyntaxError(err) => match err.location {
                pest::error::InputLocation::Pos(p) => Span::from_range(p..p),
                pest::error::InputLocation::Span((s, e)) => Span::from_range(s..e),
            },
            Error::UndefinedValue(_, span) => *span,
            Error::UnknownInst(_, span) => *span,
            Error::DuplicateValueName(_, span) => *span,
            Error::UnexpectedResultName { span, .. } => *span,
            Error::InstArgNumMismatch { span, .. } => *span,
        }
    }

    pub fn print(
        &self,
        mut w: impl io::Write,
        path: &str,
        content: &str,
        colors: bool,
    ) -> io::Result<()> {
        let label = self.to_string();
        let message = Level::Error.title("parse error").snippet(
            Snippet::source(content)
                .line_start(1)
                .origin(path)
                .fold(true)
                .annotation(Level::Error.span(self.span().as_range()).label(&label)),
        );
        let rend = if colors {
            Renderer::styled()
        } else {
            Renderer::plain()
        };
        let rendered = rend.render(message).to_string();
        writeln!(w, "{rendered}")
    }

    pub fn print_to_string(&self, path: &str, content: &str, colors: bool) -> String {
        let mut v = vec![];
        // Writing into a `Vec` cannot fail.
        let _ = self.print(&mut v, path, content, colors);
        String::from_utf8_lossy(&v).into_owned()
    }
}
