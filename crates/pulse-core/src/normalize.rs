use crate::summary::TimelineSeries;
use crate::types::{Event, Source};
use chrono::Datelike;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Deduplicate a fetch batch and bucket it into the monthly timeline.
///
/// Events with identical `(source, id)` collapse to one, keeping the
/// most recently fetched version (last-write-wins by input order). The
/// surviving version sits in the slot where its key first appeared, so
/// repeated normalization is a fixpoint.
pub fn normalize(events: Vec<Event>) -> (Vec<Event>, TimelineSeries) {
    let mut deduped: Vec<Event> = Vec::with_capacity(events.len());
    let mut slots: HashMap<(Source, String), usize> = HashMap::new();

    for event in events {
        match slots.entry((event.source, event.id.clone())) {
            Entry::Occupied(slot) => deduped[*slot.get()] = event,
            Entry::Vacant(slot) => {
                slot.insert(deduped.len());
                deduped.push(event);
            }
        }
    }

    let timeline = build_timeline(&deduped);
    (deduped, timeline)
}

/// Months since year zero. Gives contiguous indices across year breaks.
fn month_ordinal(event: &Event) -> i64 {
    let ts = event.timestamp;
    i64::from(ts.year()) * 12 + i64::from(ts.month0())
}

fn month_label(ordinal: i64) -> String {
    format!("{:04}-{:02}", ordinal.div_euclid(12), ordinal.rem_euclid(12) + 1)
}

/// Build the per-source monthly series, zero-filling any months between
/// the earliest and latest event with no activity. Zero events yield an
/// empty series, not an error.
fn build_timeline(events: &[Event]) -> TimelineSeries {
    let mut timeline = TimelineSeries::default();

    let Some(min) = events.iter().map(month_ordinal).min() else {
        return timeline;
    };
    let max = events.iter().map(month_ordinal).max().unwrap_or(min);
    let len = (max - min + 1) as usize;

    timeline.months = (min..=max).map(month_label).collect();
    for source in Source::ALL {
        *timeline.series_mut(source) = vec![0; len];
    }

    for event in events {
        let idx = (month_ordinal(event) - min) as usize;
        timeline.series_mut(event.source)[idx] += 1;
    }

    timeline
}
