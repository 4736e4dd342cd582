use crate::model::board::{BoardError, BoardErrorKind, Frontmatter};
use crate::parse::span::TextSpan;

const DELIMITER: &str = "---";

/// Locate a leading `---` delimited block.
/// Returns the YAML span and the offset where the document body starts.
pub fn split_frontmatter(source: &str) -> Option<(TextSpan, usize)> {
    let mut lines = line_spans(source);

    let first = lines.next()?;
    if trim_line(&source[first.range()]) != DELIMITER {
        return None;
    }

    for line in lines {
        if trim_line(&source[line.range()]) == DELIMITER {
            return Some((TextSpan::new(first.end, line.start), line.end));
        }
    }
    None
}

/// Decode frontmatter YAML. Invalid YAML degrades to an empty bag and an
/// error record.
pub fn parse_frontmatter(yaml: &str) -> (Frontmatter, Option<BoardError>) {
    if yaml.trim().is_empty() {
        return (Frontmatter::new(), None);
    }

    let decoded = serde_yaml::from_str::<serde_yaml::Value>(yaml).and_then(|value| {
        if value.is_null() {
            Ok(Frontmatter::new())
        } else {
            serde_yaml::from_value::<Frontmatter>(value)
        }
    });

    match decoded {
        Ok(frontmatter) => (frontmatter, None),
        Err(e) => (
            Frontmatter::new(),
            Some(BoardError::new(BoardErrorKind::InvalidFrontmatter, e.to_string())),
        ),
    }
}

/// Render the frontmatter block, including the blank lines that follow it
pub fn frontmatter_to_md(frontmatter: &Frontmatter) -> String {
    let yaml = serde_yaml::to_string(frontmatter).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not encode frontmatter, writing an empty block");
        "{}\n".to_string()
    });
    [DELIMITER, "", yaml.as_str(), DELIMITER, "", ""].join("\n")
}

/// Byte spans of each line, newline included
fn line_spans(source: &str) -> impl Iterator<Item = TextSpan> + '_ {
    source.split_inclusive('\n').scan(0, |offset, line| {
        let span = TextSpan::new(*offset, *offset + line.len());
        *offset = span.end;
        Some(span)
    })
}

fn trim_line(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}
