//! Pure presentation: everything here is a function of the event list, the
//! view mode and an anchor date. No mutation, no network.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use std::fmt::Write;

use crate::types::{EventDraft, EventRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Day,
    Week,
    Month,
}

fn midnight(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

/// Date span shown for a view mode: the anchor's day, its Monday-based week,
/// or its calendar month. The end bound is exclusive.
pub fn visible_range(view: ViewMode, anchor: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    match view {
        ViewMode::Day => (midnight(anchor), midnight(anchor + chrono::Days::new(1))),
        ViewMode::Week => {
            let monday = anchor.week(Weekday::Mon).first_day();
            (midnight(monday), midnight(monday + chrono::Days::new(7)))
        }
        ViewMode::Month => {
            let first = anchor.with_day(1).unwrap_or(anchor);
            let next = if first.month() == 12 {
                NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
            } else {
                NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
            }
            .unwrap_or(first);
            (midnight(first), midnight(next))
        }
    }
}

/// Events overlapping the half-open span `[start, end)`.
pub fn events_in_range<'a>(
    events: &'a [EventRecord],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<&'a EventRecord> {
    events
        .iter()
        .filter(|e| e.start < end && e.end > start)
        .collect()
}

/// Plain-text calendar grid for the given view. Day and Week list every day;
/// Month skips empty days. An event spanning midnight shows on each day it
/// overlaps.
pub fn render_grid(events: &[EventRecord], view: ViewMode, anchor: NaiveDate) -> String {
    let (start, end) = visible_range(view, anchor);
    let days = (end.date_naive() - start.date_naive()).num_days();

    let mut out = String::new();
    for offset in 0..days {
        let day = start.date_naive() + chrono::Days::new(offset as u64);
        let on_day = events_in_range(events, midnight(day), midnight(day + chrono::Days::new(1)));

        if on_day.is_empty() && view == ViewMode::Month {
            continue;
        }

        let _ = writeln!(out, "{} {}", day.format("%a"), day);
        if on_day.is_empty() {
            let _ = writeln!(out, "  (no events)");
        }
        for event in on_day {
            let _ = writeln!(
                out,
                "  {}-{}  {}",
                event.start.format("%H:%M"),
                event.end.format("%H:%M"),
                event.title
            );
        }
    }
    out
}

/// Text rendering of the editor modal for the open draft.
pub fn render_editor(draft: &EventDraft) -> String {
    let title = if draft.title.is_empty() {
        "(untitled)"
    } else {
        &draft.title
    };
    let mut out = format!(
        "{} - {}\n{}\n",
        draft.start.format("%Y-%m-%d %H:%M"),
        draft.end.format("%Y-%m-%d %H:%M"),
        title
    );
    if !draft.description.is_empty() {
        let _ = writeln!(out, "{}", draft.description);
    }
    out
}
