use crate::model::board::{FileAccessor, FileMetadata, ItemData, LinkKind};
use crate::parse::markdown::{Node, NodeKind, parse_markdown};
use crate::parse::sigils::Sigils;
use crate::parse::span::TextSpan;
use crate::parse::title::{decode_line_breaks, reconstruct_title};

/// Extraction result for one card: its data plus the spans that were
/// removed from the raw text to produce the title.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDraft {
    pub data: ItemData,
    /// Offsets into the card's raw content, before line-break decoding
    pub spans: Vec<TextSpan>,
}

/// What one visited node contributes to a card
#[derive(Debug, Clone, PartialEq)]
enum MetadataUpdate {
    BlockId(String),
    Tag(String, TextSpan),
    Date(String, TextSpan),
    Time(String, TextSpan),
    /// Embeds set the accessor and leave file metadata alone
    Embed(FileAccessor),
    /// Links set the accessor and replace file metadata
    Link(FileAccessor, Option<FileMetadata>),
}

impl ItemDraft {
    fn new(is_complete: bool) -> Self {
        ItemDraft {
            data: ItemData {
                is_complete,
                ..ItemData::default()
            },
            spans: Vec::new(),
        }
    }

    /// Merge one update. Spans arrive absolute and are stored relative to
    /// `boundary`; spans reaching outside the card content are not stripped.
    fn apply(mut self, update: MetadataUpdate, boundary: TextSpan, content: &str) -> Self {
        let metadata = &mut self.data.metadata;
        let strip = match update {
            MetadataUpdate::BlockId(id) => {
                self.data.block_id = Some(id);
                None
            }
            MetadataUpdate::Tag(tag, span) => {
                metadata.tags.push(format!("#{}", tag));
                Some(span)
            }
            MetadataUpdate::Date(date, span) => {
                metadata.date_str = Some(date);
                Some(span)
            }
            MetadataUpdate::Time(time, span) => {
                metadata.time_str = Some(time);
                Some(span)
            }
            MetadataUpdate::Embed(accessor) => {
                metadata.file_accessor = Some(accessor);
                None
            }
            MetadataUpdate::Link(accessor, file_metadata) => {
                metadata.file_accessor = Some(accessor);
                metadata.file_metadata = file_metadata;
                None
            }
        };

        if let Some(span) = strip.filter(|span| boundary.contains(span)) {
            self.spans
                .push(span.relative_to(boundary.start).with_leading_space(content));
        }
        self
    }
}

/// Extract a card from a list item node of `source`.
///
/// Only the item's first block is read; nested lists and other blocks after
/// it stay in place and are never inspected. A first block that is not a
/// paragraph (`# heading`, `> quote`, `1. step`) is kept whole, markup
/// included, and only a paragraph can carry the trailing block id.
pub fn extract_item(source: &str, list_item: &Node) -> ItemDraft {
    let is_complete = matches!(list_item.kind, NodeKind::ListItem { checked: Some(true) });
    let first = list_item.children.first();
    let is_paragraph = first.is_some_and(|node| node.kind == NodeKind::Paragraph);

    let boundary = match first {
        Some(node) if is_paragraph => node.content_boundary(source),
        Some(node) => node.block_boundary(source),
        None => TextSpan::new(list_item.span.end, list_item.span.end),
    };
    let content = boundary.slice(source).unwrap_or_default();

    let updates = first.map(|node| collect_updates(&node.children)).unwrap_or_default();
    let mut draft = updates
        .into_iter()
        .filter(|update| is_paragraph || !matches!(update, MetadataUpdate::BlockId(_)))
        .fold(ItemDraft::new(is_complete), |draft, update| {
            draft.apply(update, boundary, content)
        });

    draft.data.title_raw = decode_line_breaks(content);
    draft.data.title = reconstruct_title(content, &draft.spans);
    draft
}

/// Parse a standalone single-bullet fragment such as `- [ ] text ^id` into
/// card data. Falls back to the fragment text when it holds no list item.
pub fn parse_item_fragment(sigils: &Sigils, fragment: &str) -> ItemData {
    let root = parse_markdown(fragment, sigils);
    let list_item = root
        .children
        .iter()
        .find(|node| matches!(node.kind, NodeKind::List { .. }))
        .and_then(|list| list.children.first());

    match list_item {
        Some(item) => extract_item(fragment, item).data,
        None => ItemData {
            title_raw: decode_line_breaks(fragment),
            title: decode_line_breaks(fragment),
            ..ItemData::default()
        },
    }
}

/// Walk inline nodes in document order, collecting what each contributes
fn collect_updates(nodes: &[Node]) -> Vec<MetadataUpdate> {
    nodes
        .iter()
        .flat_map(|node| {
            node_update(node)
                .into_iter()
                .chain(collect_updates(&node.children))
        })
        .collect()
}

fn node_update(node: &Node) -> Option<MetadataUpdate> {
    match &node.kind {
        NodeKind::BlockId(id) => Some(MetadataUpdate::BlockId(id.clone())),
        NodeKind::Tag(tag) => Some(MetadataUpdate::Tag(tag.clone(), node.span)),
        NodeKind::Date(date) | NodeKind::DateLink(date) => {
            Some(MetadataUpdate::Date(date.clone(), node.span))
        }
        NodeKind::Time(time) => Some(MetadataUpdate::Time(time.clone(), node.span)),
        NodeKind::Wikilink {
            target,
            subpath,
            embed,
        } => {
            let accessor = FileAccessor {
                target: target.clone(),
                subpath: subpath.clone(),
                kind: LinkKind::Wikilink,
                is_embed: *embed,
            };
            if *embed {
                Some(MetadataUpdate::Embed(accessor))
            } else {
                Some(MetadataUpdate::Link(accessor, None))
            }
        }
        NodeKind::Link { dest } => {
            markdown_accessor(dest, false).map(|accessor| MetadataUpdate::Link(accessor, None))
        }
        NodeKind::Image { dest } => markdown_accessor(dest, true).map(MetadataUpdate::Embed),
        _ => None,
    }
}

/// Accessor for a markdown link destination, if it points at a local file
fn markdown_accessor(dest: &str, is_embed: bool) -> Option<FileAccessor> {
    let dest = dest.trim();
    if dest.is_empty() || dest.starts_with('#') || has_scheme(dest) {
        return None;
    }

    let (target, subpath) = match dest.find('#') {
        Some(idx) => (&dest[..idx], Some(dest[idx..].to_string())),
        None => (dest, None),
    };
    Some(FileAccessor {
        target: target.replace("%20", " "),
        subpath,
        kind: LinkKind::Markdown,
        is_embed,
    })
}

/// `https:`, `mailto:`, `obsidian:` and the like
fn has_scheme(dest: &str) -> bool {
    match dest.find(':') {
        Some(idx) if idx > 1 => dest[..idx]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')),
        _ => false,
    }
}
