//! Itinerary events and the log that collects them.
//!
//! Every event carries a typed [`EventKind`] next to its human-readable
//! label, so presentation code never has to parse labels to find out what
//! an event is.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::EditError;
use crate::window::as_hours;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreakKind {
    Lunch,
    Prayer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Travel,
    Visit,
    Break(BreakKind),
    DayEnd,
    Overnight,
    Arrival,
}

impl EventKind {
    /// Zero-length markers rather than spans of activity.
    pub fn is_marker(&self) -> bool {
        matches!(self, EventKind::DayEnd | EventKind::Overnight | EventKind::Arrival)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryEvent {
    /// Mission day, starting at 1.
    pub day: u32,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub kind: EventKind,
    pub label: String,
    /// Share of the leg distance covered by this travel piece; zero otherwise.
    #[serde(default)]
    pub distance_km: f64,
}

impl ItineraryEvent {
    pub fn new(
        day: u32,
        start: NaiveDateTime,
        end: NaiveDateTime,
        kind: EventKind,
        label: impl Into<String>,
    ) -> Self {
        Self {
            day,
            start,
            end,
            kind,
            label: label.into(),
            distance_km: 0.0,
        }
    }

    pub fn hours(&self) -> f64 {
        as_hours(self.end - self.start)
    }

    fn check(&self) -> Result<(), EditError> {
        if self.day == 0 {
            return Err(EditError::DayZero);
        }
        if self.end < self.start {
            return Err(EditError::EndsBeforeStart);
        }
        Ok(())
    }
}

/// Totals recomputed from the events of a log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LogSummary {
    pub total_days: u32,
    pub total_km: f64,
    pub total_visit_hours: f64,
    pub total_travel_hours: f64,
    pub total_break_hours: f64,
}

/// Chronologically ordered events.
///
/// Scheduling only appends. Manual edits afterwards go through
/// [`EventLog::replace`], [`EventLog::insert`] and [`EventLog::remove`],
/// which keep the `(day, start)` ordering with a stable sort.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<ItineraryEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, event: ItineraryEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[ItineraryEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ItineraryEvent> {
        self.events.iter()
    }

    pub fn for_day(&self, day: u32) -> impl Iterator<Item = &ItineraryEvent> {
        self.events.iter().filter(move |event| event.day == day)
    }

    /// Distinct day numbers present in the log, ascending.
    pub fn days(&self) -> Vec<u32> {
        self.events
            .iter()
            .map(|event| event.day)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn is_chronological(&self) -> bool {
        self.events.iter().all(|event| event.start <= event.end)
            && self
                .events
                .windows(2)
                .all(|pair| (pair[0].day, pair[0].start) <= (pair[1].day, pair[1].start))
    }

    /// Overwrite the event at `index`.
    pub fn replace(
        &mut self,
        index: usize,
        event: ItineraryEvent,
    ) -> Result<ItineraryEvent, EditError> {
        self.bounds(index)?;
        event.check()?;
        let previous = std::mem::replace(&mut self.events[index], event);
        self.sort();
        Ok(previous)
    }

    /// Add an event at its chronological position, after any event sharing
    /// its `(day, start)` key.
    pub fn insert(&mut self, event: ItineraryEvent) -> Result<usize, EditError> {
        event.check()?;
        let key = (event.day, event.start);
        let index = self
            .events
            .partition_point(|existing| (existing.day, existing.start) <= key);
        self.events.insert(index, event);
        Ok(index)
    }

    pub fn remove(&mut self, index: usize) -> Result<ItineraryEvent, EditError> {
        self.bounds(index)?;
        Ok(self.events.remove(index))
    }

    pub fn summarize(&self) -> LogSummary {
        let mut summary = LogSummary {
            total_days: self.events.iter().map(|event| event.day).max().unwrap_or(0),
            ..LogSummary::default()
        };
        for event in &self.events {
            match event.kind {
                EventKind::Travel => {
                    summary.total_km += event.distance_km;
                    summary.total_travel_hours += event.hours();
                }
                EventKind::Visit => summary.total_visit_hours += event.hours(),
                EventKind::Break(_) => summary.total_break_hours += event.hours(),
                EventKind::DayEnd | EventKind::Overnight | EventKind::Arrival => {}
            }
        }
        summary
    }

    pub fn into_events(self) -> Vec<ItineraryEvent> {
        self.events
    }

    fn bounds(&self, index: usize) -> Result<(), EditError> {
        if index < self.events.len() {
            Ok(())
        } else {
            Err(EditError::OutOfRange {
                index,
                len: self.events.len(),
            })
        }
    }

    fn sort(&mut self) {
        self.events.sort_by_key(|event| (event.day, event.start));
    }
}

impl<'a> IntoIterator for &'a EventLog {
    type Item = &'a ItineraryEvent;
    type IntoIter = std::slice::Iter<'a, ItineraryEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
