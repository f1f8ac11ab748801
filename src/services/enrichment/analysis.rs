//! Website discovery and the heuristic analysis summary

use crate::core::classifier::is_fetchable_url;
use crate::core::{FieldAliases, FieldMapping};

const KEY_POINTS: [&str; 3] = [
    "Website content extracted and analyzed",
    "Industry context considered",
    "Company information integrated",
];

/// Pick the URL to fetch for a row.
///
/// Prefers a fetchable value under a website-like key, then any fetchable value.
pub fn discover_url<K: AsRef<str>, M: AsRef<str>>(
    mapping: &FieldMapping,
    website_keys: &[K],
    disallowed_markers: &[M],
) -> Option<String> {
    let entries = mapping.lookup_entries();

    let is_website_key = |key: &str| {
        let key = key.to_lowercase();
        website_keys
            .iter()
            .any(|k| key.contains(&k.as_ref().to_lowercase()))
    };

    entries
        .iter()
        .find(|&&(key, value)| is_website_key(key) && is_fetchable_url(value, disallowed_markers))
        .or_else(|| {
            entries
                .iter()
                .find(|&&(_, value)| is_fetchable_url(value, disallowed_markers))
        })
        .map(|(_, value)| value.trim().to_string())
}

/// Fixed-shape summary of the extracted page text for one prospect
pub fn build_analysis(
    text: &str,
    mapping: &FieldMapping,
    aliases: &FieldAliases,
    char_budget: usize,
) -> String {
    let company = mapping.resolve_or(&aliases.analysis_company_name, "");
    let industry = mapping.resolve_or(&aliases.industry, "");

    let excerpt = if text.chars().count() > char_budget {
        let prefix: String = text.chars().take(char_budget).collect();
        format!("{prefix}...")
    } else {
        text.to_string()
    };

    let key_points = KEY_POINTS
        .iter()
        .map(|point| format!("- {point}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Company Analysis for {company}\n\
         Industry: {industry}\n\
         \n\
         Website Content Analysis:\n\
         {excerpt}\n\
         \n\
         Key Points:\n\
         {key_points}\n\
         \n\
         This analysis can be used to generate personalized communication templates."
    )
}
