use crate::context::BoardContext;
use crate::model::board::{Board, BoardData, Item, Lane, LaneData};
use crate::model::config::ParserConfig;
use crate::parse::frontmatter::{parse_frontmatter, split_frontmatter};
use crate::parse::item_parser::extract_item;
use crate::parse::markdown::{Node, NodeKind, parse_markdown_from};
use crate::parse::settings_block::{is_settings_marker, read_settings};

/// What the forward scan after a heading found
#[derive(Debug, Default)]
struct LaneBody<'a> {
    list: Option<&'a Node>,
    should_mark_items_complete: bool,
}

/// Parse a board document into a Board.
///
/// Walks the top-level nodes looking for headings. After each heading the
/// following siblings are scanned for its list: a complete-marker paragraph
/// flags the lane, a settings-marker paragraph or the next heading ends the
/// scan, anything else is skipped. A heading matching the archive label
/// right after a thematic break collects archive cards instead of creating
/// a lane. Never fails; anomalies end up in `board.data.errors`.
pub fn parse_board(ctx: &BoardContext, id: &str, source: &str) -> Board {
    let config = ctx.config();
    let mut data = BoardData::default();

    let body_start = match split_frontmatter(source) {
        Some((yaml, body_start)) => {
            let (frontmatter, error) = parse_frontmatter(yaml.slice(source).unwrap_or_default());
            data.frontmatter = frontmatter;
            if let Some(error) = error {
                tracing::warn!(board = id, %error, "frontmatter ignored");
                data.errors.push(error);
            }
            body_start
        }
        None => 0,
    };

    let root = parse_markdown_from(source, body_start, ctx.sigils());
    let (settings, settings_errors) = read_settings(&root, source, config);
    data.settings = settings;
    data.errors.extend(settings_errors);

    let mut lanes = Vec::new();
    for (idx, node) in root.children.iter().enumerate() {
        if !matches!(node.kind, NodeKind::Heading(_)) {
            continue;
        }

        let title = node
            .content_boundary(source)
            .slice(source)
            .unwrap_or_default()
            .to_string();
        let follows_break = idx
            .checked_sub(1)
            .is_some_and(|prev| root.children[prev].kind == NodeKind::ThematicBreak);
        let is_archive = follows_break && node.plain_text(source).trim() == config.archive_label;

        let body = scan_lane_body(&root.children[idx + 1..], source, config);
        let items = body
            .list
            .map(|list| list_items(ctx, source, list))
            .unwrap_or_default();

        if is_archive && body.list.is_some() {
            data.archive.extend(items);
            continue;
        }

        if body.list.is_none() {
            tracing::debug!(board = id, lane = %title, "heading without a list");
        }
        lanes.push(Lane {
            id: ctx.next_id(),
            children: items,
            data: LaneData {
                title,
                should_mark_items_complete: body.should_mark_items_complete,
            },
        });
    }

    tracing::debug!(
        board = id,
        lanes = lanes.len(),
        archived = data.archive.len(),
        errors = data.errors.len(),
        "assembled board"
    );

    Board {
        id: id.to_string(),
        children: lanes,
        data,
    }
}

/// Scan the siblings after a heading for its list
fn scan_lane_body<'a>(siblings: &'a [Node], source: &str, config: &ParserConfig) -> LaneBody<'a> {
    let mut body = LaneBody::default();

    for node in siblings {
        match node.kind {
            NodeKind::List { .. } => {
                body.list = Some(node);
                break;
            }
            NodeKind::Heading(_) => break,
            NodeKind::Paragraph if is_settings_marker(node, source, config) => break,
            NodeKind::Paragraph => {
                if node.plain_text(source).trim() == config.complete_label {
                    body.should_mark_items_complete = true;
                }
            }
            _ => {}
        }
    }
    body
}

fn list_items(ctx: &BoardContext, source: &str, list: &Node) -> Vec<Item> {
    list.children
        .iter()
        .filter(|node| matches!(node.kind, NodeKind::ListItem { .. }))
        .map(|node| Item {
            id: ctx.next_id(),
            data: extract_item(source, node).data,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::board::BoardErrorKind;
    use crate::util::ids::SequentialIds;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn ctx() -> BoardContext {
        BoardContext::new(ParserConfig::default())
            .unwrap()
            .with_ids(Arc::new(SequentialIds::new("id")))
    }

    fn titles(lane: &Lane) -> Vec<&str> {
        lane.children.iter().map(|i| i.data.title.as_str()).collect()
    }

    #[test]
    fn test_lanes_in_document_order() {
        let source = "## Todo\n\n- [ ] one\n- [ ] two\n\n## Done\n\n- [x] three\n";
        let board = parse_board(&ctx(), "b.md", source);
        assert_eq!(board.id, "b.md");
        assert_eq!(board.children.len(), 2);
        assert_eq!(board.children[0].data.title, "Todo");
        assert_eq!(titles(&board.children[0]), vec!["one", "two"]);
        assert_eq!(board.children[1].data.title, "Done");
        assert!(board.children[1].children[0].data.is_complete);
        assert!(board.data.errors.is_empty());
    }

    #[test]
    fn test_ids_are_unique() {
        let source = "## A\n\n- [ ] one\n\n## B\n\n- [ ] two\n- [ ] three\n";
        let board = parse_board(&ctx(), "b.md", source);
        let mut ids: Vec<&str> = board.children.iter().map(|l| l.id.as_str()).collect();
        ids.extend(board.items().map(|i| i.id.as_str()));
        let count = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), count);
    }

    #[test]
    fn test_archive_detection() {
        let source = "## Todo\n\n- [ ] current\n\n***\n\n## Archive\n\n- [ ] old task\n";
        let board = parse_board(&ctx(), "b.md", source);
        assert_eq!(board.children.len(), 1);
        assert!(board.children.iter().all(|l| l.data.title != "Archive"));
        assert_eq!(board.data.archive.len(), 1);
        assert_eq!(board.data.archive[0].data.title, "old task");
    }

    #[test]
    fn test_archive_heading_without_break_is_a_lane() {
        let source = "## Archive\n\n- [ ] still a lane\n";
        let board = parse_board(&ctx(), "b.md", source);
        assert_eq!(board.children.len(), 1);
        assert_eq!(board.children[0].data.title, "Archive");
        assert!(board.data.archive.is_empty());
    }

    #[test]
    fn test_emphasized_archive_heading() {
        let source = "## Todo\n\n- [ ] a\n\n***\n\n## **Archive**\n\n- [ ] old\n";
        let board = parse_board(&ctx(), "b.md", source);
        assert_eq!(board.children.len(), 1);
        assert_eq!(board.children[0].data.title, "Todo");
        assert_eq!(board.data.archive[0].data.title, "old");
    }

    #[test]
    fn test_emphasized_lane_title_kept_raw() {
        let board = parse_board(&ctx(), "b.md", "## **Urgent**\n\n- [ ] a\n");
        assert_eq!(board.children[0].data.title, "**Urgent**");
    }

    #[test]
    fn test_complete_marker_lane() {
        let source = "## Doing\n\n**Complete**\n\n- [ ] x\n";
        let board = parse_board(&ctx(), "b.md", source);
        let lane = &board.children[0];
        assert!(lane.data.should_mark_items_complete);
        assert_eq!(titles(lane), vec!["x"]);
        assert_eq!(lane.children[0].data.title_raw, "x");
    }

    #[test]
    fn test_complete_marker_directly_above_list() {
        let source = "## Doing\n\n**Complete**\n- [ ] x\n";
        let board = parse_board(&ctx(), "b.md", source);
        assert!(board.children[0].data.should_mark_items_complete);
        assert_eq!(titles(&board.children[0]), vec!["x"]);
    }

    #[test]
    fn test_complete_marker_matches_text_not_markup() {
        for marker in ["Complete", "__Complete__", "*Complete*", "**Complete**"] {
            let source = format!("## Doing\n\n{}\n\n- [ ] x\n", marker);
            let board = parse_board(&ctx(), "b.md", &source);
            assert!(board.children[0].data.should_mark_items_complete, "{}", marker);
        }

        let board = parse_board(&ctx(), "b.md", "## Doing\n\nCompleted\n\n- [ ] x\n");
        assert!(!board.children[0].data.should_mark_items_complete);
    }

    #[test]
    fn test_empty_lane() {
        let source = "## Empty\n\n## Full\n\n- [ ] a\n";
        let board = parse_board(&ctx(), "b.md", source);
        assert_eq!(board.children.len(), 2);
        assert!(board.children[0].children.is_empty());
        assert_eq!(board.children[1].children.len(), 1);
    }

    #[test]
    fn test_settings_marker_stops_scan() {
        let source = "## Last\n\n%% kanban:settings\n```\n{\"kanban-plugin\":\"basic\"}\n```\n%%\n\n- [ ] stray\n";
        let board = parse_board(&ctx(), "b.md", source);
        assert_eq!(board.children.len(), 1);
        assert!(board.children[0].children.is_empty());
        assert_eq!(
            board.data.settings.get("kanban-plugin"),
            Some(&serde_json::json!("basic"))
        );
    }

    #[test]
    fn test_stray_paragraph_is_skipped() {
        let source = "## Todo\n\nsome notes\n\n- [ ] a\n";
        let board = parse_board(&ctx(), "b.md", source);
        assert!(!board.children[0].data.should_mark_items_complete);
        assert_eq!(titles(&board.children[0]), vec!["a"]);
    }

    #[test]
    fn test_frontmatter_captured() {
        let source = "---\n\nkanban-plugin: basic\n\n---\n\n## Todo\n\n- [ ] a #tag\n";
        let board = parse_board(&ctx(), "b.md", source);
        assert_eq!(
            board.data.frontmatter.get("kanban-plugin"),
            Some(&serde_json::json!("basic"))
        );
        assert_eq!(board.children[0].children[0].data.metadata.tags, vec!["#tag"]);
    }

    #[test]
    fn test_invalid_frontmatter_is_recorded() {
        let source = "---\na: [broken\n---\n\n## Todo\n";
        let board = parse_board(&ctx(), "b.md", source);
        assert!(board.data.frontmatter.is_empty());
        assert_eq!(board.data.errors[0].kind, BoardErrorKind::InvalidFrontmatter);
        assert_eq!(board.children.len(), 1);
    }

    #[test]
    fn test_missing_frontmatter_and_empty_input() {
        let board = parse_board(&ctx(), "b.md", "");
        assert!(board.children.is_empty());
        assert!(board.data.frontmatter.is_empty());
        assert!(board.data.errors.is_empty());
    }

    #[test]
    fn test_custom_labels() {
        let config = ParserConfig {
            archive_label: "Archiv".to_string(),
            complete_label: "Erledigt".to_string(),
            ..ParserConfig::default()
        };
        let ctx = BoardContext::new(config).unwrap();
        let source = "## Fertig\n\n**Erledigt**\n\n- [x] a\n\n***\n\n## Archiv\n\n- [ ] b\n";
        let board = parse_board(&ctx, "b.md", source);
        assert_eq!(board.children.len(), 1);
        assert!(board.children[0].data.should_mark_items_complete);
        assert_eq!(board.data.archive[0].data.title, "b");
    }
}
