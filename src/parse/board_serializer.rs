use crate::model::board::{Board, Item, Lane};
use crate::model::config::ParserConfig;
use crate::parse::frontmatter::frontmatter_to_md;
use crate::parse::settings_block::settings_to_md;
use crate::parse::title::encode_line_breaks;

/// Serialize a board to its canonical text form: frontmatter, lanes, the
/// archive when it has cards, then the settings block.
pub fn serialize_board(board: &Board, config: &ParserConfig) -> String {
    let mut out = frontmatter_to_md(&board.data.frontmatter);
    for lane in &board.children {
        out.push_str(&lane_to_md(lane, config));
    }
    out.push_str(&archive_to_md(&board.data.archive, config));
    out.push_str(&settings_to_md(&board.data.settings, config));
    out
}

/// One bullet line. The block id is always re-appended as a trailing anchor.
pub fn item_to_md(item: &Item) -> String {
    let check = if item.data.is_complete { 'x' } else { ' ' };
    let text = encode_line_breaks(&item.data.title_raw);
    let anchor = item
        .data
        .block_id
        .as_ref()
        .map(|id| format!(" ^{}", id))
        .unwrap_or_default();
    format!("- [{}] {}{}", check, text.trim(), anchor)
}

/// A lane section, ending in the blank lines that separate it from the next
pub fn lane_to_md(lane: &Lane, config: &ParserConfig) -> String {
    let mut lines = vec![format!("## {}", lane.data.title), String::new()];
    if lane.data.should_mark_items_complete {
        lines.push(config.complete_marker());
    }
    lines.extend(lane.children.iter().map(item_to_md));
    lines.extend(std::iter::repeat_n(String::new(), 3));
    lines.join("\n")
}

/// The archive section, or nothing when there are no archived cards
pub fn archive_to_md(archive: &[Item], config: &ParserConfig) -> String {
    if archive.is_empty() {
        return String::new();
    }
    let mut lines = vec![
        config.archive_marker.clone(),
        String::new(),
        format!("## {}", config.archive_label),
        String::new(),
    ];
    lines.extend(archive.iter().map(item_to_md));
    lines.join("\n")
}
