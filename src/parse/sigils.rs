use regex::{Captures, Regex};

use crate::model::config::ParserConfig;
use crate::parse::markdown::{Node, NodeKind};
use crate::parse::span::TextSpan;

/// Inline token grammar. Alternatives are tried left to right at each
/// position, so times win over dates when the date trigger prefixes the
/// time trigger.
const INLINE_TEMPLATE: &str = concat!(
    r"(?P<time>%TIME%\{(?P<time_value>[^{}\n]+)\})",
    r"|(?P<date>%DATE%\{(?P<date_value>[^{}\n]+)\})",
    r"|(?P<date_link>%DATE%\[\[(?P<date_link_value>[^\[\]|\n]+)(?:\|[^\[\]\n]*)?\]\])",
    r"|(?P<wikilink>(?P<embed>!)?\[\[(?P<target>[^\[\]|#^\n]*)(?P<subpath>[#^][^\[\]|\n]*)?(?:\|[^\[\]\n]*)?\]\])",
    r"|(?P<tag>#(?P<tag_value>[\p{L}\p{N}_/\-]+))",
);

const BLOCK_ID_PATTERN: &str = r"(?:^|[ \t])\^(?P<id>[A-Za-z0-9\-]+)$";

/// Compiled recognizers for the inline sigils of one parser configuration
#[derive(Debug, Clone)]
pub struct Sigils {
    inline: Regex,
    block_id: Regex,
}

impl Sigils {
    pub fn new(config: &ParserConfig) -> Result<Self, regex::Error> {
        let pattern = INLINE_TEMPLATE
            .replace("%TIME%", &regex::escape(&config.time_trigger))
            .replace("%DATE%", &regex::escape(&config.date_trigger));
        Ok(Sigils {
            inline: Regex::new(&pattern)?,
            block_id: Regex::new(BLOCK_ID_PATTERN)?,
        })
    }

    /// Replace runs of adjacent text nodes with text and sigil nodes.
    /// Non-text nodes pass through untouched.
    pub(crate) fn tokenize(&self, source: &str, children: Vec<Node>) -> Vec<Node> {
        let mut out = Vec::with_capacity(children.len());
        let mut run: Option<TextSpan> = None;

        for node in children {
            if node.kind == NodeKind::Text {
                run = match run {
                    Some(span) if span.end == node.span.start => Some(span.cover(&node.span)),
                    Some(span) => {
                        self.scan_run(source, span, &mut out);
                        Some(node.span)
                    }
                    None => Some(node.span),
                };
                continue;
            }
            if let Some(span) = run.take() {
                self.scan_run(source, span, &mut out);
            }
            out.push(node);
        }
        if let Some(span) = run {
            self.scan_run(source, span, &mut out);
        }
        out
    }

    /// Split a trailing `^id` off the last text node of a paragraph
    pub(crate) fn split_block_id(&self, source: &str, children: &mut Vec<Node>) {
        let Some(last) = children.last() else {
            return;
        };
        if last.kind != NodeKind::Text {
            return;
        }
        let span = last.span;
        let Some(text) = span.slice(source) else {
            return;
        };
        let Some(id) = self.block_id.captures(text).and_then(|caps| caps.name("id")) else {
            return;
        };

        let caret = span.start + id.start() - 1;
        children.pop();
        let head = TextSpan::new(span.start, caret);
        if !head.is_empty() {
            children.push(Node::new(NodeKind::Text, head));
        }
        children.push(Node::new(
            NodeKind::BlockId(id.as_str().to_string()),
            TextSpan::new(caret, span.end),
        ));
    }

    fn scan_run(&self, source: &str, run: TextSpan, out: &mut Vec<Node>) {
        let Some(text) = run.slice(source) else {
            out.push(Node::new(NodeKind::Text, run));
            return;
        };

        let mut cursor = 0;
        let mut search = 0;
        while search <= text.len() {
            let Some(caps) = self.inline.captures_at(text, search) else {
                break;
            };
            let Some(whole) = caps.get(0) else {
                break;
            };

            match self.token_kind(&caps, source, run.start + whole.start()) {
                Some(kind) => {
                    if whole.start() > cursor {
                        out.push(Node::new(
                            NodeKind::Text,
                            TextSpan::new(run.start + cursor, run.start + whole.start()),
                        ));
                    }
                    out.push(Node::new(
                        kind,
                        TextSpan::new(run.start + whole.start(), run.start + whole.end()),
                    ));
                    cursor = whole.end();
                    search = whole.end();
                }
                None => {
                    // Not a real token: resume one character later
                    let step = text[whole.start()..]
                        .chars()
                        .next()
                        .map_or(1, char::len_utf8);
                    search = whole.start() + step;
                }
            }
        }

        if cursor < text.len() {
            out.push(Node::new(
                NodeKind::Text,
                TextSpan::new(run.start + cursor, run.end),
            ));
        }
    }

    /// Validate a candidate match. `at` is its absolute offset in `source`.
    fn token_kind(&self, caps: &Captures<'_>, source: &str, at: usize) -> Option<NodeKind> {
        let value = |name: &str| caps.name(name).map(|m| m.as_str().trim().to_string());

        if caps.name("time").is_some() {
            return value("time_value")
                .filter(|v| !v.is_empty())
                .map(NodeKind::Time);
        }
        if caps.name("date").is_some() {
            return value("date_value")
                .filter(|v| !v.is_empty())
                .map(NodeKind::Date);
        }
        if caps.name("date_link").is_some() {
            return value("date_link_value")
                .filter(|v| !v.is_empty())
                .map(NodeKind::DateLink);
        }
        if caps.name("wikilink").is_some() {
            let target = value("target").unwrap_or_default();
            if target.is_empty() {
                return None;
            }
            return Some(NodeKind::Wikilink {
                target,
                subpath: value("subpath").filter(|s| s.len() > 1),
                embed: caps.name("embed").is_some(),
            });
        }
        if caps.name("tag").is_some() {
            let tag = value("tag_value")?;
            let glued = source[..at]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_alphanumeric() || matches!(c, '_' | '#' | '\\' | '&'));
            if glued || tag.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            return Some(NodeKind::Tag(tag));
        }
        None
    }
}
