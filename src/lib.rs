//! Bidirectional conversion between markdown kanban documents and a typed
//! board model.
//!
//! A board document is a list of `## Lane` headings, each followed by a
//! checklist of cards. Cards carry inline sigils (`#tag`, `@{date}`,
//! `@@{time}`, `[[links]]`, trailing `^block-id`) that are pulled out into
//! metadata and stripped from the display title. [`parse::parse_board`]
//! reads a document, [`parse::serialize_board`] writes one back, and the
//! helpers in [`ops`] edit single cards without re-reading the document.

pub mod cli;
pub mod context;
pub mod io;
pub mod model;
pub mod ops;
pub mod parse;
pub mod util;

pub use context::BoardContext;
pub use model::{Board, Item, ItemData, Lane, ParserConfig, Settings};
pub use parse::{parse_board, serialize_board};
