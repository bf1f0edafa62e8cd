//! Normalization of analysis pages into the flat result mapping.

use crate::extraction::types::AnalysisPage;
use serde_json::{Map, Value};

/// Flatten pages into an alias → answer mapping.
///
/// Pages are walked in order, answers in order within each page; a later answer
/// sharing an alias overwrites the earlier one.
pub(crate) fn collect_answers(pages: &[AnalysisPage]) -> Map<String, Value> {
    let mut mapping = Map::new();
    for page in pages {
        for answer in &page.answers {
            let previous = mapping.insert(
                answer.alias.clone(),
                Value::String(answer.text.clone()),
            );
            if previous.is_some() {
                tracing::debug!(alias = %answer.alias, "Alias answered more than once; keeping the later answer");
            }
        }
    }
    mapping
}
