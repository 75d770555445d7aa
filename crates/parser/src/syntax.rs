use std::ops::Range;

#[derive(pest_derive::Parser)]
#[grammar = "stackify.pest"]
pub struct Parser;

/// Byte range into the parsed source.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Span(pub u32, pub u32);

impl Span {
    /// Offsets past `u32::MAX` are clamped to it.
    pub fn from_range(r: Range<usize>) -> Self {
        let offset = |pos: usize| u32::try_from(pos).unwrap_or(u32::MAX);
        Self(offset(r.start), offset(r.end))
    }

    pub fn from_pest(span: pest::Span<'_>) -> Self {
        Self::from_range(span.start()..span.end())
    }

    pub fn as_range(&self) -> Range<usize> {
        self.0 as usize..self.1 as usize
    }
}
