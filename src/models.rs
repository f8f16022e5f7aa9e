use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Raw profile records, as published by the upstream profile service
// ---------------------------------------------------------------------------

/// A full public profile snapshot. Every collection defaults to empty so a
/// profile that omits a source still loads.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub e_score: f64,
    #[serde(default)]
    pub b_score: f64,
    #[serde(default)]
    pub i_score: f64,
    #[serde(default)]
    pub qiita_articles: Vec<QiitaArticle>,
    #[serde(default)]
    pub zenn_articles: Vec<ZennArticle>,
    #[serde(default)]
    pub blog_articles: Vec<BlogArticle>,
    #[serde(default)]
    pub note_articles: Vec<NoteArticle>,
    #[serde(default)]
    pub speaker_deck_slides: Vec<SpeakerDeckSlide>,
    #[serde(default)]
    pub github_repositories: Vec<GithubRepository>,
    #[serde(default)]
    pub teratail_replies: Vec<TeratailReply>,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub activities: Vec<Activity>,
}

// Date fields stay optional at load time so that a record without one is
// reported by the normalizer with its kind and title instead of failing the
// whole JSON parse with a bare serde message.

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct QiitaArticle {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub headlines: Vec<String>,
    #[serde(default)]
    pub stockers_count: u64,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ZennArticle {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub posted_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BlogArticle {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub posted_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NoteArticle {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SpeakerDeckSlide {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    #[serde(default)]
    pub star_count: u64,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub presentation_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GithubRepository {
    #[serde(default)]
    pub id: u64,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub is_oss: bool,
    #[serde(default)]
    pub is_fork: bool,
    #[serde(default)]
    pub is_owner: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stargazers_count: StarCount,
    #[serde(default)]
    pub forks: u64,
    #[serde(default)]
    pub contributions: u64,
    #[serde(default)]
    pub language: Option<String>,
}

/// Star counts arrive as strings from the upstream API, occasionally as numbers.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum StarCount {
    Number(u64),
    Text(String),
}

impl Default for StarCount {
    fn default() -> Self {
        StarCount::Number(0)
    }
}

impl StarCount {
    /// Numeric value; text that does not parse counts as zero.
    pub fn value(&self) -> u64 {
        match self {
            StarCount::Number(n) => *n,
            StarCount::Text(s) => s.trim().parse().unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TeratailReply {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_best_answer: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Event {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub is_presenter: bool,
    #[serde(default)]
    pub is_organizer: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Activity {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub date: Option<String>,
    /// Source type such as `github`, `github_pr`, `qiita` or `connpass`.
    #[serde(rename = "type")]
    pub kind: String,
}

// ---------------------------------------------------------------------------
// Normalized items and derived views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Code,
    Article,
    Reply,
    Slide,
    Event,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Code => write!(f, "code"),
            ItemKind::Article => write!(f, "article"),
            ItemKind::Reply => write!(f, "reply"),
            ItemKind::Slide => write!(f, "slide"),
            ItemKind::Event => write!(f, "event"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryRef {
    pub full_name: String,
    pub url: String,
}

/// One activity record in the shape every downstream view consumes.
///
/// `repository` is only ever set on `ItemKind::Code` items whose title
/// carried an `org/repo - ...` prefix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedItem {
    pub kind: ItemKind,
    pub title: String,
    pub url: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_best_answer: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<RepositoryRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeBucket {
    pub anchor: DateTime<Utc>,
    pub items: Vec<NormalizedItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepositoryGroup {
    pub full_name: String,
    pub url: String,
    pub items: Vec<NormalizedItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrganizationGroup {
    pub org_name: String,
    pub repositories: Vec<RepositoryGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesPoint {
    pub period_start: DateTime<Utc>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepositorySlice {
    pub full_name: String,
    pub count: usize,
    pub color: &'static str,
    pub items: Vec<NormalizedItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedSeriesPoint {
    pub period_start: DateTime<Utc>,
    pub total: usize,
    pub repositories: Vec<RepositorySlice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileSummary {
    pub qiita_articles: usize,
    pub zenn_articles: usize,
    pub blog_articles: usize,
    pub note_articles: usize,
    pub total_articles: usize,
    pub replies: usize,
    pub best_answers: usize,
    pub best_answer_rate: Option<u32>,
    pub repositories: usize,
    pub total_stars: u64,
    pub total_contributions: u64,
    pub events: usize,
    pub presenter_events: usize,
    pub latest_activity: Option<DateTime<Utc>>,
    pub activity_types: Vec<(String, usize)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduledEvent {
    pub title: String,
    pub url: String,
    pub date: DateTime<Utc>,
    pub is_presenter: bool,
    pub is_organizer: bool,
}
