use serde::Serialize;

use crate::model::board::{Board, BoardError};

#[derive(Serialize)]
pub struct CheckJson<'a> {
    pub board: &'a str,
    pub lanes: usize,
    pub items: usize,
    pub archived: usize,
    pub errors: &'a [BoardError],
}

impl<'a> CheckJson<'a> {
    pub fn new(board: &'a Board) -> Self {
        CheckJson {
            board: &board.id,
            lanes: board.children.len(),
            items: board.children.iter().map(|lane| lane.children.len()).sum(),
            archived: board.data.archive.len(),
            errors: &board.data.errors,
        }
    }
}

/// Human-readable check report, one line per problem
pub fn format_check(board: &Board) -> String {
    let summary = CheckJson::new(board);
    let mut lines = vec![format!(
        "{}: {} lanes, {} cards, {} archived",
        summary.board, summary.lanes, summary.items, summary.archived
    )];
    if board.data.errors.is_empty() {
        lines.push("no problems found".to_string());
    } else {
        lines.extend(board.data.errors.iter().map(|err| format!("  {}", err)));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::board::BoardErrorKind;

    #[test]
    fn test_format_check_clean() {
        let board = Board::empty("b.md");
        assert_eq!(
            format_check(&board),
            "b.md: 0 lanes, 0 cards, 0 archived\nno problems found"
        );
    }

    #[test]
    fn test_format_check_with_errors() {
        let mut board = Board::empty("b.md");
        board.data.errors.push(BoardError::new(
            BoardErrorKind::DuplicateSettings,
            "settings block at byte 10 ignored",
        ));
        assert!(format_check(&board).ends_with("  duplicate settings: settings block at byte 10 ignored"));
    }
}
