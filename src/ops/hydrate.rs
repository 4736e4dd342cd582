use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use futures::future::join_all;

use crate::context::BoardContext;
use crate::model::board::{Board, FileAccessor, FileMetadata, Item, ItemData, Lane};
use crate::model::settings::{LayeredSettings, SettingsProvider, metadata_keys};

const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
const DEFAULT_TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, thiserror::Error)]
pub enum HydrateError {
    #[error("date {value:?} does not match format {format:?}")]
    InvalidDate { value: String, format: String },
    #[error("time {value:?} does not match format {format:?}")]
    InvalidTime { value: String, format: String },
    #[error("metadata provider failed: {0}")]
    Provider(String),
}

/// Post-parse enrichment of one card
#[async_trait]
pub trait Hydrator: Send + Sync {
    /// Return the enriched data for `item`. The item itself is left as is.
    async fn hydrate(
        &self,
        item: &Item,
        settings: &dyn SettingsProvider,
    ) -> Result<ItemData, HydrateError>;
}

/// Field lookup for pages that cards link to
pub trait LinkedPages: Send + Sync {
    fn page_fields(&self, accessor: &FileAccessor) -> Option<FileMetadata>;
}

/// Resolves dates and times, surfaces linked page fields and builds the
/// search string.
#[derive(Clone, Default)]
pub struct StandardHydrator {
    pages: Option<Arc<dyn LinkedPages>>,
}

impl StandardHydrator {
    pub fn new() -> Self {
        StandardHydrator::default()
    }

    pub fn with_pages(pages: Arc<dyn LinkedPages>) -> Self {
        StandardHydrator { pages: Some(pages) }
    }

    fn linked_fields(
        &self,
        accessor: Option<&FileAccessor>,
        settings: &dyn SettingsProvider,
    ) -> Option<FileMetadata> {
        let (pages, accessor) = (self.pages.as_ref()?, accessor?);
        let keys = metadata_keys(settings);
        if keys.is_empty() {
            return None;
        }

        let fields = pages.page_fields(accessor)?;
        let selected: FileMetadata = keys
            .into_iter()
            .filter_map(|key| fields.get(&key).cloned().map(|value| (key, value)))
            .collect();
        (!selected.is_empty()).then_some(selected)
    }
}

#[async_trait]
impl Hydrator for StandardHydrator {
    async fn hydrate(
        &self,
        item: &Item,
        settings: &dyn SettingsProvider,
    ) -> Result<ItemData, HydrateError> {
        let mut data = item.data.clone();
        let metadata = &mut data.metadata;

        if let Some(value) = &metadata.date_str {
            let format = settings.setting_str("date-format").unwrap_or(DEFAULT_DATE_FORMAT);
            match resolve_date(value, format) {
                Ok(date) => metadata.date = Some(date),
                Err(e) => tracing::debug!(item = %item.id, error = %e, "date left unresolved"),
            }
        }

        if let Some(value) = &metadata.time_str {
            let format = settings.setting_str("time-format").unwrap_or(DEFAULT_TIME_FORMAT);
            match resolve_time(value, format) {
                Ok(time) => metadata.time = Some(time),
                Err(e) => tracing::debug!(item = %item.id, error = %e, "time left unresolved"),
            }
        }

        if let Some(fields) = self.linked_fields(metadata.file_accessor.as_ref(), settings) {
            metadata.file_metadata = Some(fields);
        }

        data.title_search = search_text(&data);
        Ok(data)
    }
}

fn resolve_date(value: &str, format: &str) -> Result<NaiveDate, HydrateError> {
    NaiveDate::parse_from_str(value, format).map_err(|_| HydrateError::InvalidDate {
        value: value.to_string(),
        format: format.to_string(),
    })
}

fn resolve_time(value: &str, format: &str) -> Result<NaiveTime, HydrateError> {
    NaiveTime::parse_from_str(value, format).map_err(|_| HydrateError::InvalidTime {
        value: value.to_string(),
        format: format.to_string(),
    })
}

/// Lowercased title, tags and linked field values, space separated
fn search_text(data: &ItemData) -> String {
    let mut parts = vec![data.title.clone()];
    parts.extend(data.metadata.tags.iter().cloned());
    if let Some(fields) = &data.metadata.file_metadata {
        for (key, value) in fields {
            parts.push(key.clone());
            match value {
                serde_json::Value::String(s) => parts.push(s.clone()),
                other => parts.push(other.to_string()),
            }
        }
    }
    parts.join(" ").to_lowercase()
}

/// Enrich one item. Without a hydrator, or when hydration fails, the item
/// comes back with its extracted fields only.
pub async fn hydrate_item(ctx: &BoardContext, settings: &dyn SettingsProvider, item: Item) -> Item {
    let Some(hydrator) = ctx.hydrator() else {
        return item;
    };
    match hydrator.hydrate(&item, settings).await {
        Ok(data) => item.with_data(data),
        Err(e) => {
            tracing::warn!(item = %item.id, error = %e, "hydration failed, keeping extracted data");
            item
        }
    }
}

/// Enrich a batch concurrently. Output order is input order.
pub async fn hydrate_items(
    ctx: &BoardContext,
    settings: &dyn SettingsProvider,
    items: Vec<Item>,
) -> Vec<Item> {
    join_all(items.into_iter().map(|item| hydrate_item(ctx, settings, item))).await
}

/// Enrich every lane and archive item of a board, looking settings up in
/// the board first and the context second.
pub async fn hydrate_board(ctx: &BoardContext, board: Board) -> Board {
    if ctx.hydrator().is_none() {
        return board;
    }

    let Board {
        id,
        children,
        mut data,
    } = board;
    let board_settings = data.settings.clone();
    let layered = LayeredSettings {
        board: &board_settings,
        fallback: ctx.settings(),
    };
    let settings: &dyn SettingsProvider = &layered;

    let lanes = join_all(children.into_iter().map(|lane| async move {
        let Lane { id, children, data } = lane;
        Lane {
            id,
            children: hydrate_items(ctx, settings, children).await,
            data,
        }
    }));
    let archive = hydrate_items(ctx, settings, std::mem::take(&mut data.archive));
    let (children, archive) = futures::join!(lanes, archive);

    data.archive = archive;
    Board { id, children, data }
}
