use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::charts::{monthly_activity_counts, stacked_monthly_activity};
use crate::grouping::{group_by_organization, group_by_repository};
use crate::models::{
    NormalizedItem, OrganizationGroup, RepositoryGroup, SeriesPoint, StackedSeriesPoint,
    TimeBucket,
};
use crate::timeline::{group_by_time_unit, TimeUnit};

/// Every derived view of one normalized item list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedViews {
    pub items: Vec<NormalizedItem>,
    pub weekly: Vec<TimeBucket>,
    pub monthly: Vec<TimeBucket>,
    pub repositories: Vec<RepositoryGroup>,
    pub organizations: Vec<OrganizationGroup>,
    pub monthly_counts: Vec<SeriesPoint>,
    pub stacked_monthly: Vec<StackedSeriesPoint>,
}

pub fn build_views(items: &[NormalizedItem]) -> DerivedViews {
    let repositories = group_by_repository(items);
    DerivedViews {
        items: items.to_vec(),
        weekly: group_by_time_unit(items, TimeUnit::Week),
        monthly: group_by_time_unit(items, TimeUnit::Month),
        organizations: group_by_organization(&repositories),
        repositories,
        monthly_counts: monthly_activity_counts(items),
        stacked_monthly: stacked_monthly_activity(items),
    }
}

pub fn write_json<W: Write>(writer: W, views: &DerivedViews) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(writer, views)?;
    Ok(())
}

fn month_label(period_start: DateTime<Utc>) -> String {
    period_start.format("%Y-%m").to_string()
}

pub fn write_monthly_csv<W: Write>(writer: W, series: &[SeriesPoint]) -> anyhow::Result<()> {
    #[derive(Serialize)]
    struct Row {
        month: String,
        count: usize,
    }

    let mut csv_writer = csv::Writer::from_writer(writer);
    for point in series {
        csv_writer.serialize(Row {
            month: month_label(point.period_start),
            count: point.count,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// One row per (month, repository) cell, in chart order.
pub fn write_stacked_csv<W: Write>(
    writer: W,
    series: &[StackedSeriesPoint],
) -> anyhow::Result<()> {
    #[derive(Serialize)]
    struct Row<'a> {
        month: String,
        repository: &'a str,
        count: usize,
        color: &'a str,
        month_total: usize,
    }

    let mut csv_writer = csv::Writer::from_writer(writer);
    for point in series {
        for repo in &point.repositories {
            csv_writer.serialize(Row {
                month: month_label(point.period_start),
                repository: &repo.full_name,
                count: repo.count,
                color: repo.color,
                month_total: point.total,
            })?;
        }
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemKind;
    use crate::normalize::parse_code_title;
    use chrono::TimeZone;

    fn code(title: &str, m: u32, d: u32) -> NormalizedItem {
        let (display, repository) = parse_code_title(title);
        NormalizedItem {
            kind: ItemKind::Code,
            title: display,
            url: "https://github.com/acme/widget/pull/7".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, m, d, 8, 0, 0).unwrap(),
            source_label: None,
            tags: None,
            is_best_answer: None,
            repository,
        }
    }

    #[test]
    fn views_cover_every_grouping() {
        let items = vec![
            code("acme/widget - add test", 3, 20),
            code("acme/widget - fix bug", 3, 5),
            code("standalone-repo", 2, 1),
        ];

        let views = build_views(&items);
        assert_eq!(views.items.len(), 3);
        assert_eq!(views.monthly.len(), 2);
        assert_eq!(views.repositories.len(), 1);
        assert_eq!(views.organizations[0].org_name, "acme");
        assert_eq!(views.monthly_counts.len(), 2);
        assert_eq!(views.stacked_monthly.len(), 1);
    }

    #[test]
    fn monthly_csv_has_header_and_rows() {
        let items = vec![code("acme/widget - a", 1, 2), code("acme/widget - b", 3, 4)];
        let mut out = Vec::new();
        write_monthly_csv(&mut out, &monthly_activity_counts(&items)).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "month,count\n2024-01,1\n2024-03,1\n");
    }

    #[test]
    fn stacked_csv_lists_each_cell() {
        let items = vec![
            code("acme/widget - a", 1, 2),
            code("acme/gadget - b", 1, 3),
            code("acme/gadget - c", 1, 4),
        ];
        let mut out = Vec::new();
        write_stacked_csv(&mut out, &stacked_monthly_activity(&items)).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "month,repository,count,color,month_total");
        assert_eq!(lines[1], "2024-01,acme/gadget,2,\"rgb(16, 185, 129)\",3");
        assert_eq!(lines[2], "2024-01,acme/widget,1,\"rgb(59, 130, 246)\",3");
    }

    #[test]
    fn json_bundle_names_each_view() {
        let items = vec![code("acme/widget - a", 1, 2)];
        let mut out = Vec::new();
        write_json(&mut out, &build_views(&items)).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["repositories"][0]["full_name"], "acme/widget");
        assert_eq!(value["items"][0]["kind"], "code");
        assert_eq!(value["stacked_monthly"][0]["total"], 1);
    }
}
