pub mod board_parser;
pub mod board_serializer;
pub mod frontmatter;
pub mod item_parser;
pub mod markdown;
pub mod settings_block;
pub mod sigils;
pub mod span;
pub mod title;

pub use board_parser::parse_board;
pub use board_serializer::{item_to_md, serialize_board};
pub use item_parser::{ItemDraft, extract_item, parse_item_fragment};
pub use markdown::{Node, NodeKind, parse_markdown};
pub use sigils::Sigils;
pub use span::TextSpan;
pub use title::{decode_line_breaks, encode_line_breaks, reconstruct_title};
