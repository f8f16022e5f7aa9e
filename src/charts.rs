use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::{ItemKind, NormalizedItem, RepositorySlice, SeriesPoint, StackedSeriesPoint};
use crate::timeline::month_anchor;

/// Series colors, assigned to repositories month by month and reused once
/// exhausted.
pub const REPO_COLORS: [&str; 8] = [
    "rgb(59, 130, 246)",
    "rgb(16, 185, 129)",
    "rgb(236, 72, 153)",
    "rgb(139, 92, 246)",
    "rgb(245, 158, 11)",
    "rgb(239, 68, 68)",
    "rgb(14, 165, 233)",
    "rgb(168, 85, 247)",
];

pub fn color_for_index(index: usize) -> &'static str {
    REPO_COLORS[index % REPO_COLORS.len()]
}

/// Number of items per month across every kind, oldest month first.
pub fn monthly_activity_counts(items: &[NormalizedItem]) -> Vec<SeriesPoint> {
    let mut counts: HashMap<DateTime<Utc>, usize> = HashMap::new();
    for item in items {
        *counts.entry(month_anchor(item.timestamp)).or_insert(0) += 1;
    }

    let mut series: Vec<SeriesPoint> = counts
        .into_iter()
        .map(|(period_start, count)| SeriesPoint {
            period_start,
            count,
        })
        .collect();
    series.sort_by_key(|p| p.period_start);
    series
}

struct MonthCells {
    period_start: DateTime<Utc>,
    // (full_name, items) in first-seen order within the month
    cells: Vec<(String, Vec<NormalizedItem>)>,
}

/// Per-month code activity broken down by repository, oldest month first.
///
/// Each repository keeps one color for the whole result. Colors are handed
/// out by walking months in the order they were opened and, within each
/// month, repositories in the order they appeared there, so a differently
/// ordered input may color the same repository differently.
pub fn stacked_monthly_activity(items: &[NormalizedItem]) -> Vec<StackedSeriesPoint> {
    let mut months: Vec<MonthCells> = Vec::new();
    let mut month_index: HashMap<DateTime<Utc>, usize> = HashMap::new();

    for item in items.iter().filter(|i| i.kind == ItemKind::Code) {
        let Some(repository) = &item.repository else {
            continue;
        };
        let name = &repository.full_name;

        let anchor = month_anchor(item.timestamp);
        let slot = *month_index.entry(anchor).or_insert_with(|| {
            months.push(MonthCells {
                period_start: anchor,
                cells: Vec::new(),
            });
            months.len() - 1
        });

        let month = &mut months[slot];
        match month.cells.iter().position(|(n, _)| n == name) {
            Some(pos) => month.cells[pos].1.push(item.clone()),
            None => month.cells.push((name.clone(), vec![item.clone()])),
        }
    }

    let mut colors: HashMap<String, &'static str> = HashMap::new();
    for month in &months {
        for (name, _) in &month.cells {
            if !colors.contains_key(name) {
                colors.insert(name.clone(), color_for_index(colors.len()));
            }
        }
    }

    let mut series: Vec<StackedSeriesPoint> = months
        .into_iter()
        .map(|month| {
            let mut repositories: Vec<RepositorySlice> = month
                .cells
                .into_iter()
                .map(|(full_name, items)| RepositorySlice {
                    color: colors.get(&full_name).copied().unwrap_or(REPO_COLORS[0]),
                    count: items.len(),
                    full_name,
                    items,
                })
                .collect();
            repositories.sort_by(|a, b| b.count.cmp(&a.count));

            StackedSeriesPoint {
                period_start: month.period_start,
                total: repositories.iter().map(|r| r.count).sum(),
                repositories,
            }
        })
        .collect();
    series.sort_by_key(|p| p.period_start);
    series
}
