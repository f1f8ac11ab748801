use crate::core::types::{SessionId, SourceType, Table};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Metadata about the currently loaded file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub session: SessionId,
    pub name: String,
    pub source_type: SourceType,
    pub loaded_at: DateTime<Local>,
    pub row_count: usize,
    pub column_count: usize,
}

impl FileRecord {
    pub fn new(name: String, source_type: SourceType, table: &Table) -> Self {
        Self {
            session: SessionId::new(),
            name,
            source_type,
            loaded_at: Local::now(),
            row_count: table.row_count(),
            column_count: table.column_count(),
        }
    }

    /// Short label for title bars, e.g. `leads.csv (csv, 12 rows, loaded 14:02)`
    pub fn label(&self) -> String {
        format!(
            "{} ({}, {} rows, loaded {})",
            self.name,
            self.source_type,
            self.row_count,
            self.loaded_at.format("%H:%M")
        )
    }
}

/// Static sender identity used by the message templates.
///
/// Configured once at startup and shared read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SenderContext {
    pub company_name: String,
    pub industry: String,
    pub role: String,
    pub products: Vec<String>,
    pub value_proposition: String,
    pub communication_style: String,
}

impl Default for SenderContext {
    fn default() -> Self {
        Self {
            company_name: "IgnitionAI".to_string(),
            industry: "Technology/AI".to_string(),
            role: "Sales Development Representative".to_string(),
            products: vec![
                "AI-powered prospect analysis".to_string(),
                "Automated lead generation".to_string(),
                "Intelligent communication templates".to_string(),
            ],
            value_proposition:
                "Help businesses optimize their sales process with AI-driven insights and automation"
                    .to_string(),
            communication_style: "Professional, consultative, and solution-focused".to_string(),
        }
    }
}

/// Ordered candidate headers per semantic field; the first non-empty match wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldAliases {
    pub contact_name: Vec<String>,
    pub company_name: Vec<String>,
    /// Company name as read by the analysis summary header
    pub analysis_company_name: Vec<String>,
    pub industry: Vec<String>,
    /// Header fragments marking a column as the website column
    pub website_keys: Vec<String>,
}

impl Default for FieldAliases {
    fn default() -> Self {
        fn list(v: &[&str]) -> Vec<String> {
            v.iter().map(|s| s.to_string()).collect()
        }
        Self {
            contact_name: list(&["Contact Name", "Nom"]),
            company_name: list(&["Company Name", "Société"]),
            analysis_company_name: list(&["Company Name", "Nom"]),
            industry: list(&["Industry", "Industrie"]),
            website_keys: list(&["website", "site", "url"]),
        }
    }
}

/// Whether enrichment results outlive the detail view that produced them
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Discard a row's result when its detail view closes
    #[default]
    PerView,
    /// Keep results until a new file is loaded
    Session,
}

/// Enrichment pipeline settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    pub timeout_secs: u64,
    /// Characters of extracted text kept in the analysis summary
    pub analysis_char_budget: usize,
    /// URLs containing any of these (case-insensitive) are never fetched
    pub disallowed_url_markers: Vec<String>,
    pub cache_policy: CachePolicy,
    pub user_agent: String,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            analysis_char_budget: 500,
            disallowed_url_markers: vec!["bing".to_string()],
            cache_policy: CachePolicy::PerView,
            user_agent: concat!("leadscope/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
