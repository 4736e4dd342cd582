use chrono::{NaiveDate, NaiveTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::settings::Settings;

/// Frontmatter key that marks a document as a board
pub const FRONTMATTER_KEY: &str = "kanban-plugin";

/// Leading key/value block of a board document
pub type Frontmatter = IndexMap<String, serde_json::Value>;

/// Fields surfaced from a linked file during hydration
pub type FileMetadata = IndexMap<String, serde_json::Value>;

/// How a card refers to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// `[[target]]` or `![[target]]`
    Wikilink,
    /// `[text](target)` or `![alt](target)`
    Markdown,
}

/// Opaque reference to a file linked from a card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAccessor {
    /// Link target with any `#heading` / `^block` subpath removed
    pub target: String,
    /// The `#heading` or `^block` suffix, if one was given
    pub subpath: Option<String>,
    pub kind: LinkKind,
    /// Whether the link was an embed (`!` prefix)
    pub is_embed: bool,
}

/// Metadata pulled out of a card's text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemMetadata {
    /// Tags in encounter order, each including the leading `#`
    pub tags: Vec<String>,
    /// Date as written in the source
    pub date_str: Option<String>,
    /// Time as written in the source
    pub time_str: Option<String>,
    /// Resolved date (hydration only)
    pub date: Option<NaiveDate>,
    /// Resolved time (hydration only)
    pub time: Option<NaiveTime>,
    pub file_accessor: Option<FileAccessor>,
    /// Linked file fields (hydration only)
    pub file_metadata: Option<FileMetadata>,
}

/// Everything a card knows about itself
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemData {
    /// Source text with line-break sigils decoded to newlines
    pub title_raw: String,
    /// Display title: `title_raw` minus the stripped sigils
    pub title: String,
    /// Lowercased search string (hydration only)
    pub title_search: String,
    /// Trailing `^id` anchor, without the caret
    pub block_id: Option<String>,
    pub is_complete: bool,
    pub metadata: ItemMetadata,
}

impl ItemData {
    /// A copy with every hydration-only field cleared
    pub fn unenriched(&self) -> ItemData {
        ItemData {
            title_search: String::new(),
            metadata: ItemMetadata {
                date: None,
                time: None,
                file_metadata: None,
                ..self.metadata.clone()
            },
            ..self.clone()
        }
    }
}

/// A single card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub data: ItemData,
}

impl Item {
    /// Same identity, new contents. Items are never edited in place.
    pub fn with_data(&self, data: ItemData) -> Item {
        Item {
            id: self.id.clone(),
            data,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneData {
    pub title: String,
    /// New cards in this lane start out complete
    pub should_mark_items_complete: bool,
}

/// A named column of cards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    pub id: String,
    pub children: Vec<Item>,
    pub data: LaneData,
}

/// The kind of recoverable anomaly found while assembling a board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardErrorKind {
    InvalidFrontmatter,
    InvalidSettings,
    DuplicateSettings,
}

/// A recoverable anomaly recorded on the board instead of aborting the parse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardError {
    pub kind: BoardErrorKind,
    pub message: String,
}

impl BoardError {
    pub fn new(kind: BoardErrorKind, message: impl Into<String>) -> Self {
        BoardError {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for BoardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            BoardErrorKind::InvalidFrontmatter => "invalid frontmatter",
            BoardErrorKind::InvalidSettings => "invalid settings",
            BoardErrorKind::DuplicateSettings => "duplicate settings",
        };
        write!(f, "{}: {}", kind, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardData {
    pub settings: Settings,
    pub frontmatter: Frontmatter,
    /// Archived cards, never members of any lane
    pub archive: Vec<Item>,
    pub is_searching: bool,
    pub errors: Vec<BoardError>,
}

/// A parsed board document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    /// Identifier of the source document
    pub id: String,
    pub children: Vec<Lane>,
    pub data: BoardData,
}

impl Board {
    /// A board with no lanes and the basic board frontmatter
    pub fn empty(id: impl Into<String>) -> Self {
        let mut frontmatter = Frontmatter::new();
        frontmatter.insert(FRONTMATTER_KEY.to_string(), "basic".into());
        Board {
            id: id.into(),
            children: Vec::new(),
            data: BoardData {
                frontmatter,
                ..BoardData::default()
            },
        }
    }

    /// Find a lane by instance id
    pub fn lane(&self, id: &str) -> Option<&Lane> {
        self.children.iter().find(|lane| lane.id == id)
    }

    /// All cards in lane order, then the archive
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.children
            .iter()
            .flat_map(|lane| lane.children.iter())
            .chain(self.data.archive.iter())
    }

    /// Structural equality ignoring instance ids and hydration-only fields.
    pub fn content_eq(&self, other: &Board) -> bool {
        fn items_eq(a: &[Item], b: &[Item]) -> bool {
            a.len() == b.len()
                && a
                    .iter()
                    .zip(b)
                    .all(|(x, y)| x.data.unenriched() == y.data.unenriched())
        }

        self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(a, b)| a.data == b.data && items_eq(&a.children, &b.children))
            && items_eq(&self.data.archive, &other.data.archive)
            && self.data.settings == other.data.settings
            && self.data.frontmatter == other.data.frontmatter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, title: &str) -> Item {
        Item {
            id: id.to_string(),
            data: ItemData {
                title_raw: title.to_string(),
                title: title.to_string(),
                ..ItemData::default()
            },
        }
    }

    fn board(id_prefix: &str) -> Board {
        let mut board = Board::empty("board.md");
        board.children.push(Lane {
            id: format!("{}-lane", id_prefix),
            children: vec![item(&format!("{}-1", id_prefix), "First")],
            data: LaneData {
                title: "Todo".to_string(),
                should_mark_items_complete: false,
            },
        });
        board
    }

    #[test]
    fn test_empty_board_has_basic_frontmatter() {
        let board = Board::empty("b.md");
        assert_eq!(board.id, "b.md");
        assert!(board.children.is_empty());
        assert_eq!(
            board.data.frontmatter.get(FRONTMATTER_KEY),
            Some(&serde_json::Value::from("basic"))
        );
    }

    #[test]
    fn test_content_eq_ignores_ids() {
        assert!(board("a").content_eq(&board("b")));
    }

    #[test]
    fn test_content_eq_ignores_enrichment() {
        let a = board("a");
        let mut b = board("a");
        b.children[0].children[0].data.title_search = "first".to_string();
        b.children[0].children[0].data.metadata.date = NaiveDate::from_ymd_opt(2024, 1, 1);
        assert!(a.content_eq(&b));
    }

    #[test]
    fn test_content_eq_detects_title_change() {
        let a = board("a");
        let mut b = board("a");
        b.children[0].children[0].data.title_raw = "Other".to_string();
        assert!(!a.content_eq(&b));
    }

    #[test]
    fn test_with_data_keeps_identity() {
        let original = item("x-1", "Before");
        let updated = original.with_data(ItemData {
            title_raw: "After".to_string(),
            ..ItemData::default()
        });
        assert_eq!(updated.id, "x-1");
        assert_eq!(updated.data.title_raw, "After");
        assert_eq!(original.data.title_raw, "Before");
    }

    #[test]
    fn test_items_iterates_lanes_then_archive() {
        let mut board = board("a");
        board.data.archive.push(item("old", "Old"));
        let ids: Vec<&str> = board.items().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a-1", "old"]);
    }
}
