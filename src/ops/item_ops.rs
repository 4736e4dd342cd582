use crate::context::BoardContext;
use crate::model::board::{Board, Item, ItemData, Lane};
use crate::ops::hydrate::{hydrate_board, hydrate_item};
use crate::parse::board_parser::parse_board;
use crate::parse::item_parser::parse_item_fragment;
use crate::parse::title::encode_line_breaks;

/// Create a card from free text, as if it were a bullet in a board.
pub async fn new_item(ctx: &BoardContext, text: &str, is_complete: bool) -> Item {
    let item = Item {
        id: ctx.next_id(),
        data: item_data(ctx, text, is_complete, None),
    };
    hydrate_item(ctx, ctx.settings(), item).await
}

/// Create a card for `lane`, complete when the lane marks new cards complete.
pub async fn new_item_in_lane(ctx: &BoardContext, lane: &Lane, text: &str) -> Item {
    new_item(ctx, text, lane.data.should_mark_items_complete).await
}

/// Replace a card's text. Identity, completion and block id carry over.
pub async fn update_item_content(ctx: &BoardContext, item: &Item, text: &str) -> Item {
    let data = item_data(
        ctx,
        text,
        item.data.is_complete,
        item.data.block_id.as_deref(),
    );
    hydrate_item(ctx, ctx.settings(), item.with_data(data)).await
}

/// Re-derive every card of a board from its own raw text, keeping lane and
/// card identities and order.
pub async fn reparse_board(ctx: &BoardContext, board: &Board) -> Board {
    let reparse = |item: &Item| {
        item.with_data(item_data(
            ctx,
            &item.data.title_raw,
            item.data.is_complete,
            item.data.block_id.as_deref(),
        ))
    };

    let mut rebuilt = board.clone();
    for lane in &mut rebuilt.children {
        lane.children = lane.children.iter().map(reparse).collect();
    }
    rebuilt.data.archive = rebuilt.data.archive.iter().map(reparse).collect();

    tracing::debug!(board = %board.id, items = rebuilt.items().count(), "reparsed board");
    hydrate_board(ctx, rebuilt).await
}

/// Parse a document and hydrate every card in it
pub async fn load_board(ctx: &BoardContext, id: &str, source: &str) -> Board {
    hydrate_board(ctx, parse_board(ctx, id, source)).await
}

fn item_data(
    ctx: &BoardContext,
    text: &str,
    is_complete: bool,
    block_id: Option<&str>,
) -> ItemData {
    let body = encode_line_breaks(text.trim());
    if body.is_empty() && block_id.is_none() {
        return ItemData {
            is_complete,
            ..ItemData::default()
        };
    }

    let check = if is_complete { 'x' } else { ' ' };
    let anchor = block_id.map(|id| format!(" ^{}", id)).unwrap_or_default();
    let fragment = format!("- [{}] {}{}", check, body, anchor);
    let mut data = parse_item_fragment(ctx.sigils(), &fragment);
    data.is_complete = is_complete;
    if block_id.is_some() {
        data.block_id = block_id.map(str::to_string);
    }
    data
}
