use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::models::{GithubRepository, Profile, ProfileSummary, ScheduledEvent};
use crate::normalize::parse_timestamp;

pub fn summarize_profile(profile: &Profile) -> ProfileSummary {
    let total_articles = profile.qiita_articles.len()
        + profile.zenn_articles.len()
        + profile.blog_articles.len()
        + profile.note_articles.len();

    let replies = profile.teratail_replies.len();
    let best_answers = profile
        .teratail_replies
        .iter()
        .filter(|r| r.is_best_answer)
        .count();

    ProfileSummary {
        qiita_articles: profile.qiita_articles.len(),
        zenn_articles: profile.zenn_articles.len(),
        blog_articles: profile.blog_articles.len(),
        note_articles: profile.note_articles.len(),
        total_articles,
        replies,
        best_answers,
        best_answer_rate: best_answer_rate(best_answers, replies),
        repositories: profile.github_repositories.len(),
        total_stars: profile
            .github_repositories
            .iter()
            .map(|r| r.stargazers_count.value())
            .sum(),
        total_contributions: profile.github_repositories.iter().map(|r| r.contributions).sum(),
        events: profile.events.len(),
        presenter_events: profile.events.iter().filter(|e| e.is_presenter).count(),
        latest_activity: profile
            .activities
            .first()
            .and_then(|a| a.date.as_deref())
            .and_then(parse_timestamp),
        activity_types: count_activity_types(profile),
    }
}

/// Share of best answers as a whole percentage; `None` without replies.
pub fn best_answer_rate(best_answers: usize, replies: usize) -> Option<u32> {
    if replies == 0 {
        return None;
    }
    Some(((best_answers as f64 / replies as f64) * 100.0).round() as u32)
}

fn count_activity_types(profile: &Profile) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for activity in &profile.activities {
        match index.get(activity.kind.as_str()) {
            Some(slot) => counts[*slot].1 += 1,
            None => {
                index.insert(activity.kind.as_str(), counts.len());
                counts.push((activity.kind.clone(), 1));
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Events happening at or after `now`, soonest first.
pub fn upcoming_events(profile: &Profile, now: DateTime<Utc>, limit: usize) -> Vec<ScheduledEvent> {
    let mut events: Vec<ScheduledEvent> = profile
        .events
        .iter()
        .filter_map(|event| {
            let Some(date) = event.date.as_deref().and_then(parse_timestamp) else {
                warn!(title = %event.title, "skipping event without a usable date");
                return None;
            };
            Some(ScheduledEvent {
                title: event.title.clone(),
                url: event.url.clone(),
                date,
                is_presenter: event.is_presenter,
                is_organizer: event.is_organizer,
            })
        })
        .filter(|event| event.date >= now)
        .collect();

    events.sort_by_key(|e| e.date);
    events.truncate(limit);
    events
}

/// Repositories with the most stars first.
pub fn top_repositories(profile: &Profile, limit: usize) -> Vec<GithubRepository> {
    let mut repositories = profile.github_repositories.clone();
    repositories.sort_by(|a, b| b.stargazers_count.value().cmp(&a.stargazers_count.value()));
    repositories.truncate(limit);
    repositories
}
