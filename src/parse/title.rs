use crate::parse::span::TextSpan;

/// Line breaks inside a card are stored in the document as this sigil
pub const LINE_BREAK: &str = "<br>";

/// Turn literal newlines into the line-break sigil
pub fn encode_line_breaks(text: &str) -> String {
    text.replace("\r\n", LINE_BREAK).replace('\n', LINE_BREAK)
}

/// Turn line-break sigils back into literal newlines
pub fn decode_line_breaks(text: &str) -> String {
    text.replace(LINE_BREAK, "\n")
}

/// Build a display title by dropping every span from `raw` in one pass.
///
/// All spans must be offsets into `raw` as it was when they were recorded.
/// Overlapping or adjacent spans merge; spans that fall outside `raw` or off
/// a char boundary are ignored. Line-break sigils are decoded afterwards.
pub fn reconstruct_title(raw: &str, spans: &[TextSpan]) -> String {
    let mut skips: Vec<TextSpan> = spans
        .iter()
        .map(|span| span.clamp(raw.len()))
        .filter(|span| {
            !span.is_empty() && raw.is_char_boundary(span.start) && raw.is_char_boundary(span.end)
        })
        .collect();
    skips.sort();

    let mut out = String::with_capacity(raw.len());
    let mut cursor = 0;
    for skip in skips {
        if skip.end <= cursor {
            continue;
        }
        if skip.start > cursor {
            out.push_str(&raw[cursor..skip.start]);
        }
        cursor = skip.end;
    }
    out.push_str(&raw[cursor..]);

    decode_line_breaks(&out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_spans_returns_raw() {
        assert_eq!(reconstruct_title("Plain card", &[]), "Plain card");
    }

    #[test]
    fn test_spans_use_original_offsets() {
        let raw = "A #one B #two";
        let spans = [TextSpan::new(8, 13), TextSpan::new(1, 6)];
        assert_eq!(reconstruct_title(raw, &spans), "A B");
    }

    #[test]
    fn test_overlapping_and_adjacent_spans_merge() {
        let raw = "0123456789";
        let spans = [
            TextSpan::new(2, 5),
            TextSpan::new(4, 6),
            TextSpan::new(6, 7),
            TextSpan::new(3, 4),
        ];
        assert_eq!(reconstruct_title(raw, &spans), "01789");
    }

    #[test]
    fn test_out_of_range_spans_are_ignored() {
        let raw = "héllo";
        let spans = [TextSpan::new(1, 2), TextSpan::new(40, 50)];
        assert_eq!(reconstruct_title(raw, &spans), "héllo");
    }

    #[test]
    fn test_line_breaks_decoded_after_removal() {
        let raw = "first<br>second #tag";
        let spans = [TextSpan::new(15, 20)];
        assert_eq!(reconstruct_title(raw, &spans), "first\nsecond");
    }

    #[test]
    fn test_encode_line_breaks() {
        assert_eq!(encode_line_breaks("a\nb\r\nc"), "a<br>b<br>c");
        assert_eq!(decode_line_breaks("a<br>b"), "a\nb");
    }
}
