use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::charts::monthly_activity_counts;
use crate::grouping::{group_by_organization, group_by_repository};
use crate::models::{NormalizedItem, Profile};
use crate::stats::{summarize_profile, top_repositories, upcoming_events};
use crate::timeline::{group_by_time_unit, TimeUnit};

const RECENT_MONTHS: usize = 3;
const UPCOMING_EVENTS: usize = 5;
const TOP_REPOSITORIES: usize = 6;

/// Renders a markdown digest of the profile and its normalized activity.
pub fn build_report(profile: &Profile, items: &[NormalizedItem], now: DateTime<Utc>) -> String {
    let summary = summarize_profile(profile);
    let repositories = group_by_repository(items);
    let organizations = group_by_organization(&repositories);

    let mut output = String::new();
    let name = if profile.name.is_empty() {
        "unnamed profile"
    } else {
        profile.name.as_str()
    };

    let _ = writeln!(output, "# Activity Digest: {}", name);
    if !profile.description.is_empty() {
        let _ = writeln!(output, "{}", profile.description);
    }
    let _ = writeln!(
        output,
        "Scores: engineering {:.1}, business {:.1}, influence {:.1}",
        profile.e_score, profile.b_score, profile.i_score
    );
    let _ = writeln!(output);

    let _ = writeln!(output, "## Summary");
    let _ = writeln!(
        output,
        "- Articles: {} (Qiita {}, Zenn {}, Blog {}, Note {})",
        summary.total_articles,
        summary.qiita_articles,
        summary.zenn_articles,
        summary.blog_articles,
        summary.note_articles
    );
    let _ = writeln!(
        output,
        "- GitHub: {} repositories, {} stars, {} contributions",
        summary.repositories, summary.total_stars, summary.total_contributions
    );
    let _ = writeln!(
        output,
        "- Events: {} ({} as presenter)",
        summary.events, summary.presenter_events
    );
    match summary.best_answer_rate {
        Some(rate) => {
            let _ = writeln!(
                output,
                "- Replies: {} ({} best answers, {}%)",
                summary.replies, summary.best_answers, rate
            );
        }
        None => {
            let _ = writeln!(output, "- Replies: none");
        }
    }
    if let Some(latest) = summary.latest_activity {
        let _ = writeln!(output, "- Latest activity: {}", latest.format("%Y-%m-%d"));
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Monthly Activity");
    let series = monthly_activity_counts(items);
    if series.is_empty() {
        let _ = writeln!(output, "No activity recorded.");
    } else {
        for point in &series {
            let _ = writeln!(
                output,
                "- {}: {}",
                point.period_start.format("%Y-%m"),
                point.count
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Organizations");
    if organizations.is_empty() {
        let _ = writeln!(output, "No repository activity recorded.");
    } else {
        for org in &organizations {
            let _ = writeln!(output, "### {}", org.org_name);
            for repo in &org.repositories {
                let _ = writeln!(
                    output,
                    "- [{}]({}): {} contributions",
                    repo.full_name,
                    repo.url,
                    repo.items.len()
                );
            }
        }
    }

    let top = top_repositories(profile, TOP_REPOSITORIES);
    if !top.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Top Repositories");
        for repo in &top {
            let _ = writeln!(
                output,
                "- [{}]({}) {} stars{}",
                repo.title,
                repo.url,
                repo.stargazers_count.value(),
                repo.language
                    .as_deref()
                    .map(|l| format!(", {l}"))
                    .unwrap_or_default()
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Activity");
    let months = group_by_time_unit(items, TimeUnit::Month);
    if months.is_empty() {
        let _ = writeln!(output, "No activity recorded.");
    } else {
        for bucket in months.iter().take(RECENT_MONTHS) {
            let _ = writeln!(output, "### {}", bucket.anchor.format("%B %Y"));
            for item in &bucket.items {
                let _ = writeln!(
                    output,
                    "- {} [{}] [{}]({})",
                    item.timestamp.format("%Y-%m-%d"),
                    item.kind,
                    item.title,
                    item.url
                );
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Upcoming Events");
    let events = upcoming_events(profile, now, UPCOMING_EVENTS);
    if events.is_empty() {
        let _ = writeln!(output, "No upcoming events.");
    } else {
        for event in &events {
            let role = if event.is_presenter { " (presenting)" } else { "" };
            let _ = writeln!(
                output,
                "- {} [{}]({}){}",
                event.date.format("%Y-%m-%d"),
                event.title,
                event.url,
                role
            );
        }
    }

    output
}
