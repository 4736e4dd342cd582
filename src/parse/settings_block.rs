use indexmap::IndexMap;

use crate::model::board::{BoardError, BoardErrorKind};
use crate::model::config::ParserConfig;
use crate::model::settings::Settings;
use crate::parse::markdown::{Node, NodeKind};

/// Read the settings block(s) among the top-level nodes of a document.
///
/// A settings block is a paragraph starting with the settings marker,
/// directly followed by a code block holding a JSON object. The first valid
/// block wins; later ones and undecodable ones are reported as errors.
pub fn read_settings(
    root: &Node,
    source: &str,
    config: &ParserConfig,
) -> (Settings, Vec<BoardError>) {
    let mut settings: Option<Settings> = None;
    let mut errors = Vec::new();

    for pair in root.children.windows(2) {
        let (marker, block) = (&pair[0], &pair[1]);
        if !is_settings_marker(marker, source, config)
            || !matches!(block.kind, NodeKind::CodeBlock { .. })
        {
            continue;
        }

        let literal = block.literal(source);
        match serde_json::from_str::<IndexMap<String, serde_json::Value>>(literal.trim()) {
            Ok(_) if settings.is_some() => {
                tracing::warn!(offset = block.span.start, "ignoring duplicate settings block");
                errors.push(BoardError::new(
                    BoardErrorKind::DuplicateSettings,
                    format!("settings block at byte {} ignored", block.span.start),
                ));
            }
            Ok(values) => settings = Some(Settings(values)),
            Err(e) => {
                tracing::warn!(offset = block.span.start, error = %e, "undecodable settings block");
                errors.push(BoardError::new(
                    BoardErrorKind::InvalidSettings,
                    format!("settings block at byte {}: {}", block.span.start, e),
                ));
            }
        }
    }

    (settings.unwrap_or_default(), errors)
}

/// Whether a top-level paragraph opens a settings block
pub fn is_settings_marker(node: &Node, source: &str, config: &ParserConfig) -> bool {
    node.kind == NodeKind::Paragraph
        && node
            .plain_text(source)
            .trim_start()
            .starts_with(&config.settings_marker)
}

/// Render the trailing settings block
pub fn settings_to_md(settings: &Settings, config: &ParserConfig) -> String {
    let json = serde_json::to_string(settings).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not encode settings, writing an empty object");
        "{}".to_string()
    });
    [
        "",
        "",
        config.settings_marker.as_str(),
        "```",
        json.as_str(),
        "```",
        "%%",
    ]
    .join("\n")
}
