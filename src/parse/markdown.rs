use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag};

use crate::parse::sigils::Sigils;
use crate::parse::span::TextSpan;

/// The kind of a node in the parsed document tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Heading(u8),
    Paragraph,
    List { ordered: bool },
    ListItem { checked: Option<bool> },
    ThematicBreak,
    CodeBlock { info: Option<String> },
    BlockQuote,
    HtmlBlock,
    /// Any other block container
    Block,

    Emphasis,
    Strong,
    Strikethrough,
    Link { dest: String },
    Image { dest: String },
    Text,
    /// Inline code, holding its content without backticks
    Code(String),
    Html,
    SoftBreak,
    HardBreak,
    /// Any other inline leaf
    Inline,

    /// `#value`
    Tag(String),
    /// `@{value}`
    Date(String),
    /// `@[[value]]`
    DateLink(String),
    /// `@@{value}`
    Time(String),
    /// Trailing `^value`
    BlockId(String),
    /// `[[target#subpath|alias]]`, or `![[...]]` when `embed`
    Wikilink {
        target: String,
        subpath: Option<String>,
        embed: bool,
    },
}

impl NodeKind {
    fn has_inline_children(&self) -> bool {
        matches!(
            self,
            NodeKind::Paragraph
                | NodeKind::Heading(_)
                | NodeKind::Emphasis
                | NodeKind::Strong
                | NodeKind::Strikethrough
                | NodeKind::Link { .. }
                | NodeKind::Image { .. }
        )
    }
}

/// A node of the parsed document, positioned in the original buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: TextSpan,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind, span: TextSpan) -> Self {
        Node {
            kind,
            span,
            children: Vec::new(),
        }
    }

    /// Range from the first child's start to the last child's end, leaving out
    /// a trailing block id and the whitespace before it.
    pub fn content_boundary(&self, source: &str) -> TextSpan {
        let body = match self.children.split_last() {
            Some((last, rest)) if matches!(last.kind, NodeKind::BlockId(_)) => rest,
            _ => &self.children[..],
        };

        let (Some(first), Some(last)) = (body.first(), body.last()) else {
            let at = self
                .children
                .first()
                .map_or(self.span.end, |node| node.span.start);
            return TextSpan::new(at, at);
        };

        let span = TextSpan::new(first.span.start, last.span.end);
        let trimmed = span.slice(source).map_or(0, |s| s.trim_end().len());
        TextSpan::new(span.start, span.start + trimmed)
    }

    /// This node's own source range with surrounding whitespace trimmed,
    /// markup included.
    pub fn block_boundary(&self, source: &str) -> TextSpan {
        let Some(text) = self.span.slice(source) else {
            return TextSpan::new(self.span.start, self.span.start);
        };
        let start = self.span.start + (text.len() - text.trim_start().len());
        TextSpan::new(start, start + text.trim().len())
    }

    /// Plain text of this subtree, without markup
    pub fn plain_text(&self, source: &str) -> String {
        let mut out = String::new();
        self.push_plain_text(source, &mut out);
        out
    }

    fn push_plain_text(&self, source: &str, out: &mut String) {
        match &self.kind {
            NodeKind::Code(code) => out.push_str(code),
            NodeKind::Text
            | NodeKind::Inline
            | NodeKind::Tag(_)
            | NodeKind::Date(_)
            | NodeKind::DateLink(_)
            | NodeKind::Time(_)
            | NodeKind::BlockId(_)
            | NodeKind::Wikilink { .. } => {
                out.push_str(self.span.slice(source).unwrap_or_default());
            }
            _ => {
                for child in &self.children {
                    child.push_plain_text(source, out);
                }
            }
        }
    }

    /// Concatenated source of the text leaves, as for a code block body
    pub fn literal(&self, source: &str) -> String {
        self.children
            .iter()
            .filter(|child| child.kind == NodeKind::Text)
            .filter_map(|child| child.span.slice(source))
            .collect()
    }
}

/// Parse a whole buffer into a document tree
pub fn parse_markdown(source: &str, sigils: &Sigils) -> Node {
    parse_markdown_from(source, 0, sigils)
}

/// Parse `source[start..]`. Every span in the result stays relative to the
/// full `source`.
pub fn parse_markdown_from(source: &str, start: usize, sigils: &Sigils) -> Node {
    let start = if source.is_char_boundary(start) { start } else { 0 };
    let body = &source[start..];

    let mut options = Options::empty();
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut builder = TreeBuilder::new(source, start, sigils);
    for (event, range) in Parser::new_ext(body, options).into_offset_iter() {
        builder.push_event(event, TextSpan::from(range).offset(start));
    }
    builder.finish()
}

struct Frame {
    node: Node,
    /// Wraps the inline content of a tight list item
    synthetic: bool,
}

struct TreeBuilder<'a> {
    source: &'a str,
    sigils: &'a Sigils,
    stack: Vec<Frame>,
}

impl<'a> TreeBuilder<'a> {
    fn new(source: &'a str, start: usize, sigils: &'a Sigils) -> Self {
        TreeBuilder {
            source,
            sigils,
            stack: vec![Frame {
                node: Node::new(NodeKind::Document, TextSpan::new(start, source.len())),
                synthetic: false,
            }],
        }
    }

    fn push_event(&mut self, event: Event<'_>, span: TextSpan) {
        match event {
            Event::Start(tag) => {
                let (kind, is_block) = kind_for_tag(&tag);
                if is_block {
                    self.close_synthetic();
                } else {
                    self.open_synthetic(span);
                }
                self.stack.push(Frame {
                    node: Node::new(kind, span),
                    synthetic: false,
                });
            }
            Event::End(_) => {
                self.close_synthetic();
                self.pop();
            }
            Event::Text(_) => {
                self.open_synthetic(span);
                self.leaf(NodeKind::Text, span);
            }
            Event::Code(code) => {
                self.open_synthetic(span);
                self.leaf(NodeKind::Code(code.to_string()), span);
            }
            Event::InlineHtml(_) => {
                self.open_synthetic(span);
                self.leaf(NodeKind::Html, span);
            }
            Event::Html(_) => self.leaf(NodeKind::Html, span),
            Event::SoftBreak => {
                self.open_synthetic(span);
                self.leaf(NodeKind::SoftBreak, span);
            }
            Event::HardBreak => {
                self.open_synthetic(span);
                self.leaf(NodeKind::HardBreak, span);
            }
            Event::Rule => {
                self.close_synthetic();
                self.leaf(NodeKind::ThematicBreak, span);
            }
            Event::TaskListMarker(checked) => {
                if let Some(frame) = self
                    .stack
                    .iter_mut()
                    .rev()
                    .find(|frame| matches!(frame.node.kind, NodeKind::ListItem { .. }))
                {
                    frame.node.kind = NodeKind::ListItem {
                        checked: Some(checked),
                    };
                }
            }
            _ => {
                self.open_synthetic(span);
                self.leaf(NodeKind::Inline, span);
            }
        }
    }

    fn top_is_block_container(&self) -> bool {
        self.stack
            .last()
            .is_some_and(|frame| matches!(frame.node.kind, NodeKind::ListItem { .. }))
    }

    fn leaf(&mut self, kind: NodeKind, span: TextSpan) {
        if let Some(top) = self.stack.last_mut() {
            top.node.children.push(Node::new(kind, span));
        }
    }

    fn open_synthetic(&mut self, span: TextSpan) {
        if self.top_is_block_container() {
            self.stack.push(Frame {
                node: Node::new(NodeKind::Paragraph, span),
                synthetic: true,
            });
        }
    }

    fn close_synthetic(&mut self) {
        if self.stack.last().is_some_and(|frame| frame.synthetic) {
            if let Some(frame) = self.stack.last_mut() {
                if let (Some(first), Some(last)) =
                    (frame.node.children.first(), frame.node.children.last())
                {
                    frame.node.span = TextSpan::new(first.span.start, last.span.end);
                }
            }
            self.pop();
        }
    }

    fn pop(&mut self) {
        if self.stack.len() < 2 {
            return;
        }
        let Some(Frame { mut node, .. }) = self.stack.pop() else {
            return;
        };

        if node.kind.has_inline_children() {
            let children = std::mem::take(&mut node.children);
            node.children = self.sigils.tokenize(self.source, children);
            if node.kind == NodeKind::Paragraph {
                self.sigils.split_block_id(self.source, &mut node.children);
            }
        }

        if let Some(parent) = self.stack.last_mut() {
            parent.node.children.push(node);
        }
    }

    fn finish(mut self) -> Node {
        while self.stack.len() > 1 {
            self.close_synthetic();
            self.pop();
        }
        match self.stack.pop() {
            Some(frame) => frame.node,
            None => Node::new(NodeKind::Document, TextSpan::new(0, self.source.len())),
        }
    }
}

/// Node kind for a container tag, and whether it is a block
fn kind_for_tag(tag: &Tag<'_>) -> (NodeKind, bool) {
    match tag {
        Tag::Paragraph => (NodeKind::Paragraph, true),
        Tag::Heading { level, .. } => (NodeKind::Heading(heading_depth(*level)), true),
        Tag::List(start) => (
            NodeKind::List {
                ordered: start.is_some(),
            },
            true,
        ),
        Tag::Item => (NodeKind::ListItem { checked: None }, true),
        Tag::CodeBlock(kind) => {
            let info = match kind {
                CodeBlockKind::Fenced(info) if !info.is_empty() => Some(info.to_string()),
                _ => None,
            };
            (NodeKind::CodeBlock { info }, true)
        }
        Tag::BlockQuote(..) => (NodeKind::BlockQuote, true),
        Tag::HtmlBlock => (NodeKind::HtmlBlock, true),
        Tag::Emphasis => (NodeKind::Emphasis, false),
        Tag::Strong => (NodeKind::Strong, false),
        Tag::Strikethrough => (NodeKind::Strikethrough, false),
        Tag::Link { dest_url, .. } => (
            NodeKind::Link {
                dest: dest_url.to_string(),
            },
            false,
        ),
        Tag::Image { dest_url, .. } => (
            NodeKind::Image {
                dest: dest_url.to_string(),
            },
            false,
        ),
        _ => (NodeKind::Block, true),
    }
}

fn heading_depth(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::ParserConfig;

    fn parse(source: &str) -> Node {
        let sigils = Sigils::new(&ParserConfig::default()).unwrap();
        parse_markdown(source, &sigils)
    }

    #[test]
    fn test_top_level_structure() {
        let source = "## Todo\n\n- [ ] one\n- [x] two\n\n***\n\n## Archive\n";
        let root = parse(source);
        let kinds: Vec<&NodeKind> = root.children.iter().map(|n| &n.kind).collect();
        assert_eq!(
            kinds,
            vec![
                &NodeKind::Heading(2),
                &NodeKind::List { ordered: false },
                &NodeKind::ThematicBreak,
                &NodeKind::Heading(2),
            ]
        );
        assert_eq!(root.children[0].plain_text(source), "Todo");
    }

    #[test]
    fn test_tight_item_gets_paragraph() {
        let source = "- [x] Done #tag\n  - [ ] nested\n";
        let root = parse(source);
        let item = &root.children[0].children[0];
        assert_eq!(item.kind, NodeKind::ListItem { checked: Some(true) });
        assert_eq!(item.children[0].kind, NodeKind::Paragraph);
        assert_eq!(item.children[1].kind, NodeKind::List { ordered: false });

        let paragraph = &item.children[0];
        let boundary = paragraph.content_boundary(source);
        assert_eq!(boundary.slice(source), Some("Done #tag"));
    }

    #[test]
    fn test_loose_item_paragraph() {
        let source = "- [ ] first\n\n- [ ] second\n";
        let root = parse(source);
        let list = &root.children[0];
        assert_eq!(list.children.len(), 2);
        let paragraph = &list.children[1].children[0];
        assert_eq!(paragraph.kind, NodeKind::Paragraph);
        assert_eq!(paragraph.content_boundary(source).slice(source), Some("second"));
        assert_eq!(list.children[1].kind, NodeKind::ListItem { checked: Some(false) });
    }

    #[test]
    fn test_block_id_leaves_boundary() {
        let source = "- [x] Done ^abc123\n";
        let root = parse(source);
        let paragraph = &root.children[0].children[0].children[0];
        assert_eq!(
            paragraph.children.last().map(|n| &n.kind),
            Some(&NodeKind::BlockId("abc123".to_string()))
        );
        assert_eq!(paragraph.content_boundary(source).slice(source), Some("Done"));
    }

    #[test]
    fn test_spans_relative_to_full_buffer() {
        let sigils = Sigils::new(&ParserConfig::default()).unwrap();
        let source = "---\na: 1\n---\n## Lane\n";
        let root = parse_markdown_from(source, 13, &sigils);
        let heading = &root.children[0];
        assert_eq!(heading.kind, NodeKind::Heading(2));
        assert_eq!(heading.content_boundary(source).slice(source), Some("Lane"));
    }

    #[test]
    fn test_code_block_literal() {
        let source = "%% kanban:settings\n```\n{\"a\":1}\n```\n%%\n";
        let root = parse(source);
        assert_eq!(root.children[0].kind, NodeKind::Paragraph);
        assert_eq!(root.children[0].plain_text(source), "%% kanban:settings");
        assert_eq!(root.children[1].kind, NodeKind::CodeBlock { info: None });
        assert_eq!(root.children[1].literal(source), "{\"a\":1}\n");
    }

    #[test]
    fn test_strong_plain_text() {
        let source = "**Complete**\n";
        let root = parse(source);
        assert_eq!(root.children[0].plain_text(source), "Complete");
    }

    #[test]
    fn test_links_and_images() {
        let source = "- [ ] see [notes](notes.md) and ![img](pic.png)\n";
        let root = parse(source);
        let paragraph = &root.children[0].children[0].children[0];
        assert!(paragraph.children.iter().any(|n| n.kind
            == NodeKind::Link {
                dest: "notes.md".to_string()
            }));
        assert!(paragraph.children.iter().any(|n| n.kind
            == NodeKind::Image {
                dest: "pic.png".to_string()
            }));
    }
}
