use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use tracing::debug;

use crate::models::{ItemKind, NormalizedItem, Profile, RepositoryRef};

/// Activity types that describe code contributions.
pub const CODE_ACTIVITY_TYPES: [&str; 2] = ["github", "github_pr"];

const TITLE_SEPARATOR: &str = " - ";
const REPOSITORY_BASE_URL: &str = "https://github.com";

/// Calendar years accepted from profile data. Bucket anchors step back up to
/// a month from the parsed date, which must stay representable.
const SUPPORTED_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("{kind} record {title:?} has no `{field}` date")]
    MissingDate {
        kind: ItemKind,
        title: String,
        field: &'static str,
    },

    #[error("{kind} record {title:?} has unparseable `{field}` date {value:?}")]
    InvalidDate {
        kind: ItemKind,
        title: String,
        field: &'static str,
        value: String,
    },
}

/// Parses the date shapes seen in profile exports into a UTC instant.
///
/// Offsets are honoured when present; naive timestamps and bare dates are
/// taken as UTC. Years outside 1..=9999 are rejected.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    parse_any_timestamp(value.trim()).filter(|ts| SUPPORTED_YEARS.contains(&ts.year()))
}

fn parse_any_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

fn required_timestamp(
    kind: ItemKind,
    title: &str,
    field: &'static str,
    value: Option<&str>,
) -> Result<DateTime<Utc>, NormalizeError> {
    let value = value.ok_or_else(|| NormalizeError::MissingDate {
        kind,
        title: title.to_string(),
        field,
    })?;

    parse_timestamp(value).ok_or_else(|| NormalizeError::InvalidDate {
        kind,
        title: title.to_string(),
        field,
        value: value.to_string(),
    })
}

/// Splits a code-activity title of the form `org/repo - description`.
///
/// Only the first separator counts; the description keeps any later ones.
/// Without a separator (or with an empty repository segment) the title is
/// returned unchanged and no repository is attached. An empty description
/// falls back to the full title.
pub fn parse_code_title(title: &str) -> (String, Option<RepositoryRef>) {
    let Some((full_name, description)) = title.split_once(TITLE_SEPARATOR) else {
        return (title.to_string(), None);
    };

    let full_name = full_name.trim();
    if full_name.is_empty() {
        return (title.to_string(), None);
    }

    let display_title = if description.is_empty() {
        title.to_string()
    } else {
        description.to_string()
    };

    let repository = RepositoryRef {
        full_name: full_name.to_string(),
        url: format!("{REPOSITORY_BASE_URL}/{full_name}"),
    };

    (display_title, Some(repository))
}

fn article(
    title: &str,
    url: &str,
    timestamp: DateTime<Utc>,
    source: &str,
    tags: &[String],
) -> NormalizedItem {
    NormalizedItem {
        kind: ItemKind::Article,
        title: title.to_string(),
        url: url.to_string(),
        timestamp,
        source_label: Some(source.to_string()),
        tags: Some(tags.to_vec()),
        is_best_answer: None,
        repository: None,
    }
}

/// Flattens every source collection of a profile into one list of items,
/// most recent first. Equal timestamps keep the order the sources were read in.
pub fn normalize_profile(profile: &Profile) -> Result<Vec<NormalizedItem>, NormalizeError> {
    let mut items = Vec::new();

    for activity in profile
        .activities
        .iter()
        .filter(|a| CODE_ACTIVITY_TYPES.contains(&a.kind.as_str()))
    {
        let timestamp = required_timestamp(
            ItemKind::Code,
            &activity.title,
            "date",
            activity.date.as_deref(),
        )?;
        let (title, repository) = parse_code_title(&activity.title);
        items.push(NormalizedItem {
            kind: ItemKind::Code,
            title,
            url: activity.url.clone(),
            timestamp,
            source_label: None,
            tags: None,
            is_best_answer: None,
            repository,
        });
    }

    for a in &profile.qiita_articles {
        let ts = required_timestamp(
            ItemKind::Article,
            &a.title,
            "updated_at",
            a.updated_at.as_deref(),
        )?;
        items.push(article(&a.title, &a.url, ts, "Qiita", &a.tags));
    }
    for a in &profile.zenn_articles {
        let ts = required_timestamp(
            ItemKind::Article,
            &a.title,
            "posted_at",
            a.posted_at.as_deref(),
        )?;
        items.push(article(&a.title, &a.url, ts, "Zenn", &a.tags));
    }
    for a in &profile.blog_articles {
        let ts = required_timestamp(
            ItemKind::Article,
            &a.title,
            "posted_at",
            a.posted_at.as_deref(),
        )?;
        items.push(article(&a.title, &a.url, ts, "Blog", &a.tags));
    }
    for a in &profile.note_articles {
        let ts = required_timestamp(
            ItemKind::Article,
            &a.title,
            "published_at",
            a.published_at.as_deref(),
        )?;
        items.push(article(&a.title, &a.url, ts, "Note", &a.tags));
    }

    for slide in &profile.speaker_deck_slides {
        let timestamp = required_timestamp(
            ItemKind::Slide,
            &slide.title,
            "presentation_date",
            slide.presentation_date.as_deref(),
        )?;
        items.push(NormalizedItem {
            kind: ItemKind::Slide,
            title: slide.title.clone(),
            url: slide.url.clone(),
            timestamp,
            source_label: Some("Speaker Deck".to_string()),
            tags: None,
            is_best_answer: None,
            repository: None,
        });
    }

    for reply in &profile.teratail_replies {
        let timestamp = required_timestamp(
            ItemKind::Reply,
            &reply.title,
            "created_at",
            reply.created_at.as_deref(),
        )?;
        items.push(NormalizedItem {
            kind: ItemKind::Reply,
            title: reply.title.clone(),
            url: reply.url.clone(),
            timestamp,
            source_label: Some("teratail".to_string()),
            tags: Some(reply.tags.clone()),
            is_best_answer: Some(reply.is_best_answer),
            repository: None,
        });
    }

    for event in &profile.events {
        let timestamp =
            required_timestamp(ItemKind::Event, &event.title, "date", event.date.as_deref())?;
        items.push(NormalizedItem {
            kind: ItemKind::Event,
            title: event.title.clone(),
            url: event.url.clone(),
            timestamp,
            source_label: None,
            tags: None,
            is_best_answer: None,
            repository: None,
        });
    }

    // Vec::sort_by is stable, so ties keep source order.
    items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    debug!(count = items.len(), "normalized profile items");
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Activity, BlogArticle, Event, NoteArticle, QiitaArticle, SpeakerDeckSlide, TeratailReply,
        ZennArticle,
    };
    use chrono::TimeZone;

    fn activity(kind: &str, title: &str, date: &str) -> Activity {
        Activity {
            title: title.to_string(),
            url: format!("https://example.com/{}", title.len()),
            date: Some(date.to_string()),
            kind: kind.to_string(),
        }
    }

    #[test]
    fn splits_repository_from_title() {
        let (title, repo) = parse_code_title("acme/widget - fix bug");
        assert_eq!(title, "fix bug");
        let repo = repo.expect("repository");
        assert_eq!(repo.full_name, "acme/widget");
        assert_eq!(repo.url, "https://github.com/acme/widget");
    }

    #[test]
    fn keeps_later_separators_in_description() {
        let (title, repo) = parse_code_title("acme/widget - merge - part two");
        assert_eq!(title, "merge - part two");
        assert_eq!(repo.unwrap().full_name, "acme/widget");
    }

    #[test]
    fn title_without_separator_has_no_repository() {
        let (title, repo) = parse_code_title("standalone-repo");
        assert_eq!(title, "standalone-repo");
        assert!(repo.is_none());
    }

    #[test]
    fn empty_description_falls_back_to_full_title() {
        let (title, repo) = parse_code_title("acme/widget - ");
        assert_eq!(title, "acme/widget - ");
        assert_eq!(repo.unwrap().full_name, "acme/widget");
    }

    #[test]
    fn parses_supported_date_shapes() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 5, 12, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2024-03-05T12:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-05T21:30:00+09:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-05T12:30:00.000"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-05 12:30:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-03-05"),
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("last tuesday"), None);
    }

    #[test]
    fn rejects_years_outside_supported_range() {
        assert_eq!(parse_timestamp("-262143-01-01"), None);
        assert_eq!(parse_timestamp("0000-01-01T00:00:00Z"), None);
        assert_eq!(parse_timestamp("+10000-01-01T00:00:00"), None);
        assert!(parse_timestamp("0001-01-01").is_some());

        let profile = Profile {
            activities: vec![activity("github", "acme/widget - fix", "-262143-01-01")],
            ..Profile::default()
        };
        let err = normalize_profile(&profile).unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidDate { kind: ItemKind::Code, .. }));
    }

    #[test]
    fn only_code_activity_types_are_included() {
        let profile = Profile {
            activities: vec![
                activity("github", "acme/widget - fix bug", "2024-03-05T00:00:00Z"),
                activity("github_pr", "acme/widget - add test", "2024-03-20T00:00:00Z"),
                activity("qiita", "Some article", "2024-03-21T00:00:00Z"),
            ],
            ..Profile::default()
        };

        let items = normalize_profile(&profile).unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.kind == ItemKind::Code));
        assert_eq!(items[0].title, "add test");
        assert_eq!(items[1].title, "fix bug");
    }

    #[test]
    fn merges_sources_most_recent_first() {
        let profile = Profile {
            activities: vec![activity("github", "acme/widget - fix", "2024-01-01T00:00:00Z")],
            qiita_articles: vec![QiitaArticle {
                title: "Rust tips".to_string(),
                url: "https://qiita.com/x".to_string(),
                tags: vec!["rust".to_string()],
                updated_at: Some("2024-02-01T00:00:00Z".to_string()),
                ..QiitaArticle::default()
            }],
            teratail_replies: vec![TeratailReply {
                title: "How to borrow".to_string(),
                url: "https://teratail.com/q/1".to_string(),
                tags: vec![],
                is_best_answer: true,
                created_at: Some("2024-03-01T00:00:00Z".to_string()),
            }],
            ..Profile::default()
        };

        let items = normalize_profile(&profile).unwrap();
        let kinds: Vec<ItemKind> = items.iter().map(|i| i.kind).collect();
        assert_eq!(kinds, vec![ItemKind::Reply, ItemKind::Article, ItemKind::Code]);
        assert_eq!(items[0].is_best_answer, Some(true));
        assert_eq!(items[1].source_label.as_deref(), Some("Qiita"));
        assert_eq!(items[1].tags, Some(vec!["rust".to_string()]));
    }

    #[test]
    fn maps_each_source_to_its_label_and_date_field() {
        let tags = vec!["rust".to_string()];
        let profile = Profile {
            zenn_articles: vec![ZennArticle {
                title: "zenn".to_string(),
                url: "https://zenn.dev/a".to_string(),
                tags: tags.clone(),
                posted_at: Some("2024-05-01T00:00:00Z".to_string()),
            }],
            blog_articles: vec![BlogArticle {
                title: "blog".to_string(),
                url: "https://blog.example.com/a".to_string(),
                tags: tags.clone(),
                posted_at: Some("2024-04-01T00:00:00Z".to_string()),
            }],
            note_articles: vec![NoteArticle {
                title: "note".to_string(),
                url: "https://note.com/a".to_string(),
                tags: tags.clone(),
                published_at: Some("2024-03-01T00:00:00Z".to_string()),
                ..NoteArticle::default()
            }],
            speaker_deck_slides: vec![SpeakerDeckSlide {
                title: "slide".to_string(),
                url: "https://speakerdeck.com/a".to_string(),
                presentation_date: Some("2024-02-01".to_string()),
                ..SpeakerDeckSlide::default()
            }],
            events: vec![Event {
                title: "event".to_string(),
                url: "https://connpass.com/event/1".to_string(),
                date: Some("2024-01-01T19:00:00+09:00".to_string()),
                ..Event::default()
            }],
            ..Profile::default()
        };

        let items = normalize_profile(&profile).unwrap();
        let by_title = |title: &str| items.iter().find(|i| i.title == title).unwrap();

        let articles = [("zenn", "Zenn", 5), ("blog", "Blog", 4), ("note", "Note", 3)];
        for (title, label, month) in articles {
            let item = by_title(title);
            assert_eq!(item.kind, ItemKind::Article);
            assert_eq!(item.source_label.as_deref(), Some(label));
            assert_eq!(item.tags.as_ref(), Some(&tags));
            assert_eq!(item.timestamp, Utc.with_ymd_and_hms(2024, month, 1, 0, 0, 0).unwrap());
        }

        let slide = by_title("slide");
        assert_eq!(slide.kind, ItemKind::Slide);
        assert_eq!(slide.source_label.as_deref(), Some("Speaker Deck"));
        assert_eq!(slide.timestamp, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());

        let event = by_title("event");
        assert_eq!(event.kind, ItemKind::Event);
        assert_eq!(event.url, "https://connpass.com/event/1");
        assert_eq!(event.timestamp, Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap());
        assert!(event.repository.is_none());
    }

    #[test]
    fn equal_timestamps_keep_source_order() {
        let profile = Profile {
            activities: vec![
                activity("github", "acme/a - first", "2024-03-05T00:00:00Z"),
                activity("github", "acme/b - second", "2024-03-05T00:00:00Z"),
            ],
            ..Profile::default()
        };

        let items = normalize_profile(&profile).unwrap();
        assert_eq!(items[0].title, "first");
        assert_eq!(items[1].title, "second");
    }

    #[test]
    fn missing_date_fails_normalization() {
        let profile = Profile {
            events: vec![Event {
                title: "RustConf".to_string(),
                url: "https://example.com".to_string(),
                date: None,
                ..Event::default()
            }],
            ..Profile::default()
        };

        let err = normalize_profile(&profile).unwrap_err();
        assert_eq!(
            err,
            NormalizeError::MissingDate {
                kind: ItemKind::Event,
                title: "RustConf".to_string(),
                field: "date",
            }
        );
    }

    #[test]
    fn unparseable_date_fails_normalization() {
        let profile = Profile {
            activities: vec![activity("github", "acme/widget - fix", "yesterday")],
            ..Profile::default()
        };

        let err = normalize_profile(&profile).unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidDate { kind: ItemKind::Code, .. }));
        assert!(err.to_string().contains("yesterday"));
    }
}
