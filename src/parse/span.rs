use std::ops::Range;

/// Half-open byte range into one specific source buffer.
/// Spans from different buffers must never be mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TextSpan {
    pub start: usize,
    pub end: usize,
}

impl TextSpan {
    pub fn new(start: usize, end: usize) -> Self {
        TextSpan {
            start,
            end: end.max(start),
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Shift this span so it is expressed relative to `origin`
    pub fn relative_to(&self, origin: usize) -> TextSpan {
        TextSpan::new(
            self.start.saturating_sub(origin),
            self.end.saturating_sub(origin),
        )
    }

    /// Move this span forward by `delta` bytes
    pub fn offset(&self, delta: usize) -> TextSpan {
        TextSpan::new(self.start + delta, self.end + delta)
    }

    /// Restrict this span to `0..len`
    pub fn clamp(&self, len: usize) -> TextSpan {
        TextSpan::new(self.start.min(len), self.end.min(len))
    }

    pub fn contains(&self, other: &TextSpan) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Smallest span covering both
    pub fn cover(&self, other: &TextSpan) -> TextSpan {
        TextSpan::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// Grow the start back over one whitespace character of `text`, if the
    /// character just before the span is whitespace.
    pub fn with_leading_space(&self, text: &str) -> TextSpan {
        let Some(before) = text.get(..self.start) else {
            return *self;
        };
        match before.chars().next_back() {
            Some(c) if c.is_whitespace() => TextSpan::new(self.start - c.len_utf8(), self.end),
            _ => *self,
        }
    }

    /// The text covered by this span, if it lies on char boundaries of `text`
    pub fn slice<'a>(&self, text: &'a str) -> Option<&'a str> {
        text.get(self.range())
    }
}

impl From<Range<usize>> for TextSpan {
    fn from(range: Range<usize>) -> Self {
        TextSpan::new(range.start, range.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_and_offset() {
        let span = TextSpan::new(10, 14);
        assert_eq!(span.relative_to(6), TextSpan::new(4, 8));
        assert_eq!(span.relative_to(6).offset(6), span);
        assert_eq!(span.relative_to(12), TextSpan::new(0, 2));
    }

    #[test]
    fn test_new_never_inverts() {
        let span = TextSpan::new(5, 3);
        assert!(span.is_empty());
        assert_eq!(span.len(), 0);
    }

    #[test]
    fn test_clamp_and_cover() {
        assert_eq!(TextSpan::clamp(&TextSpan::new(2, 20), 8), TextSpan::new(2, 8));
        assert_eq!(
            TextSpan::new(2, 4).cover(&TextSpan::new(3, 9)),
            TextSpan::new(2, 9)
        );
        assert!(TextSpan::new(0, 10).contains(&TextSpan::new(3, 9)));
    }

    #[test]
    fn test_with_leading_space() {
        let text = "A #one";
        assert_eq!(
            TextSpan::new(2, 6).with_leading_space(text),
            TextSpan::new(1, 6)
        );
        assert_eq!(
            TextSpan::new(0, 1).with_leading_space(text),
            TextSpan::new(0, 1)
        );
        let text = "A\u{3000}#tag";
        assert_eq!(
            TextSpan::new(4, 8).with_leading_space(text),
            TextSpan::new(1, 8)
        );
    }

    #[test]
    fn test_slice_respects_char_boundaries() {
        let text = "héllo";
        assert_eq!(TextSpan::new(0, 1).slice(text), Some("h"));
        assert_eq!(TextSpan::new(0, 2).slice(text), None);
    }
}
