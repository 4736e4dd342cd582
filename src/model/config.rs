use serde::{Deserialize, Serialize};

/// Structural markers the parser compares against. Swap these to change
/// the document locale without touching parsing logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Heading text of the archive section
    #[serde(default = "default_archive_label")]
    pub archive_label: String,
    /// Paragraph text that marks a lane as completing its cards
    #[serde(default = "default_complete_label")]
    pub complete_label: String,
    /// Prefix of `@{date}` and `@[[date]]` tokens
    #[serde(default = "default_date_trigger")]
    pub date_trigger: String,
    /// Prefix of `@@{time}` tokens
    #[serde(default = "default_time_trigger")]
    pub time_trigger: String,
    /// First line of the trailing settings block
    #[serde(default = "default_settings_marker")]
    pub settings_marker: String,
    /// Thematic break emitted before the archive heading
    #[serde(default = "default_archive_marker")]
    pub archive_marker: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            archive_label: default_archive_label(),
            complete_label: default_complete_label(),
            date_trigger: default_date_trigger(),
            time_trigger: default_time_trigger(),
            settings_marker: default_settings_marker(),
            archive_marker: default_archive_marker(),
        }
    }
}

impl ParserConfig {
    /// The marker line written under a lane heading, e.g. `**Complete**`
    pub fn complete_marker(&self) -> String {
        format!("**{}**", self.complete_label)
    }
}

fn default_archive_label() -> String {
    "Archive".to_string()
}

fn default_complete_label() -> String {
    "Complete".to_string()
}

fn default_date_trigger() -> String {
    "@".to_string()
}

fn default_time_trigger() -> String {
    "@@".to_string()
}

fn default_settings_marker() -> String {
    "%% kanban:settings".to_string()
}

fn default_archive_marker() -> String {
    "***".to_string()
}
