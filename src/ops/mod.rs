pub mod hydrate;
pub mod item_ops;

pub use hydrate::{
    HydrateError, Hydrator, LinkedPages, StandardHydrator, hydrate_board, hydrate_item,
    hydrate_items,
};
pub use item_ops::{load_board, new_item, new_item_in_lane, reparse_board, update_item_content};
