use std::collections::HashMap;

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc};

use crate::models::{NormalizedItem, TimeBucket};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TimeUnit {
    Week,
    Month,
}

fn at_midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Start of the Sunday-based week containing `timestamp`, at midnight UTC.
pub fn week_anchor(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    let date = timestamp.date_naive();
    let offset = u64::from(date.weekday().num_days_from_sunday());
    at_midnight(date - Days::new(offset))
}

/// First day of the month containing `timestamp`, at midnight UTC.
pub fn month_anchor(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    let date = timestamp.date_naive();
    at_midnight(date - Days::new(u64::from(date.day0())))
}

pub fn anchor_for(unit: TimeUnit, timestamp: DateTime<Utc>) -> DateTime<Utc> {
    match unit {
        TimeUnit::Week => week_anchor(timestamp),
        TimeUnit::Month => month_anchor(timestamp),
    }
}

/// Buckets items by week or month, newest bucket first.
///
/// Items keep their incoming relative order within a bucket. Only periods
/// that contain at least one item are returned.
pub fn group_by_time_unit(items: &[NormalizedItem], unit: TimeUnit) -> Vec<TimeBucket> {
    let mut buckets: Vec<TimeBucket> = Vec::new();
    let mut index: HashMap<DateTime<Utc>, usize> = HashMap::new();

    for item in items {
        let anchor = anchor_for(unit, item.timestamp);
        let slot = *index.entry(anchor).or_insert_with(|| {
            buckets.push(TimeBucket {
                anchor,
                items: Vec::new(),
            });
            buckets.len() - 1
        });
        buckets[slot].items.push(item.clone());
    }

    buckets.sort_by(|a, b| b.anchor.cmp(&a.anchor));
    buckets
}
