//! Daily RSVP time series.
//!
//! Replies are bucketed, under their current answer, by the UTC calendar
//! day they were last changed on.
//! Every day in the window gets a bucket, including days without activity,
//! so charts never have to fill gaps themselves.

use chrono::{DateTime, NaiveDate, Utc};
use evt_db::models::{RsvpActivity, RsvpResponse};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResponseTally {
    pub attending: i64,
    pub declined: i64,
    pub maybe: i64,
    pub total: i64,
}

impl ResponseTally {
    fn add(&mut self, response: RsvpResponse) {
        match response {
            RsvpResponse::Attending => self.attending += 1,
            RsvpResponse::Declined => self.declined += 1,
            RsvpResponse::Maybe => self.maybe += 1,
        }
        self.total += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyBucket {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub tally: ResponseTally,
}

/// Bucket activity into one entry per day from `from` to `to`, both inclusive.
///
/// Activity outside the window is ignored. An inverted window yields no buckets.
pub fn daily_series(activity: &[RsvpActivity], from: NaiveDate, to: NaiveDate) -> Vec<DailyBucket> {
    if to < from {
        return Vec::new();
    }

    let mut buckets: Vec<DailyBucket> = from
        .iter_days()
        .take_while(|day| *day <= to)
        .map(|date| DailyBucket {
            date,
            tally: ResponseTally::default(),
        })
        .collect();

    for item in activity {
        let day = item.answered_at.date_naive();
        if day < from || day > to {
            continue;
        }
        // Buckets are contiguous, so the offset from `from` is the index
        let index = (day - from).num_days() as usize;
        buckets[index].tally.add(item.response);
    }

    buckets
}

/// Sum of all buckets
pub fn totals(series: &[DailyBucket]) -> ResponseTally {
    series.iter().fold(ResponseTally::default(), |mut acc, bucket| {
        acc.attending += bucket.tally.attending;
        acc.declined += bucket.tally.declined;
        acc.maybe += bucket.tally.maybe;
        acc.total += bucket.tally.total;
        acc
    })
}

/// First instant of `day` in UTC
pub fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(chrono::NaiveTime::MIN).and_utc()
}
