//! Itinerary scheduling.
//!
//! Walks an ordered site list and expands it into dated, timed events:
//! travel legs, visits, lunch/prayer breaks and day-boundary markers. The
//! walk keeps a single pointer in time which moves forward; whenever a leg
//! or a visit would overrun the allowed hours, the current day is closed and
//! the pointer jumps to the next morning. The only step back is on a day
//! with no events yet, whose first leg may leave at the travel-window start
//! rather than at the activity start it resumed at.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{OverrunPolicy, ScheduleOptions};
use crate::event::{BreakKind, EventKind, EventLog, ItineraryEvent};
use crate::matrix::{Segment, TravelMatrix, segments_along};
use crate::order::Order;
use crate::site::{Coordinate, Site};
use crate::solver::{SolveOptions, solve_order};
use crate::traits::LegEstimator;
use crate::window::{
    BreakBounds, MAX_SPAN_HOURS, advance, as_hours, date_of_day, hours, seconds,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ItineraryStats {
    pub total_days: u32,
    pub total_km: f64,
    /// Visit hours actually placed in the itinerary.
    pub total_visit_hours: f64,
    /// Visit hours asked for by the sites, before any truncation.
    pub requested_visit_hours: f64,
}

/// Non-fatal findings; the schedule is complete regardless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScheduleWarning {
    DayLimitExceeded { required: u32, max: u32 },
    VisitTruncated { site: String, dropped_hours: f64 },
    FallbackTravel { leg: usize, duration: bool, distance: bool },
    /// A leg or visit longer than [`MAX_SPAN_HOURS`] was shortened to it.
    DurationCapped { subject: String, requested_hours: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub events: EventLog,
    pub ordered_sites: Vec<Site>,
    pub ordered_coords: Vec<Coordinate>,
    pub stats: ItineraryStats,
    pub warnings: Vec<ScheduleWarning>,
}

/// Where the pointer currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    AtTravel,
    AtVisit,
    AtBreak,
    DayClosed,
}

/// Solve the order, read its legs and schedule it in one go.
pub fn plan<E: LegEstimator>(
    sites: &[Site],
    coords: &[Coordinate],
    matrix: &TravelMatrix,
    start_date: NaiveDate,
    solve_options: &SolveOptions,
    options: &ScheduleOptions,
    estimator: Option<&E>,
) -> (Order, Schedule) {
    let order = solve_order(matrix.durations(), solve_options);
    let segments = segments_along(&order, matrix, coords, estimator);
    let schedule = schedule(coords, sites, &order, &segments, start_date, options);
    (order, schedule)
}

/// Expand `order` into an itinerary.
///
/// `segments[k]` is the leg from the `k`-th to the `k+1`-th site of the
/// order. Missing legs, and legs with a non-positive duration or distance,
/// use the fallbacks from `options`. The result is a pure function of the
/// inputs.
pub fn schedule(
    coords: &[Coordinate],
    sites: &[Site],
    order: &Order,
    segments: &[Segment],
    start_date: NaiveDate,
    options: &ScheduleOptions,
) -> Schedule {
    let ordered_sites: Vec<Site> = order
        .as_slice()
        .iter()
        .filter_map(|&index| sites.get(index).cloned())
        .collect();
    let ordered_coords: Vec<Coordinate> = order
        .as_slice()
        .iter()
        .filter_map(|&index| coords.get(index).copied())
        .collect();

    let mut acc = Accumulator::new(start_date, options);

    for (position, site) in ordered_sites.iter().enumerate() {
        if position > 0 {
            let leg = position - 1;
            acc.travel(leg, segments.get(leg), &ordered_sites[leg], site);
        }
        acc.visit(site, position + 1 == ordered_sites.len());
    }

    if let Some(last) = ordered_sites.last() {
        let at = acc.pointer;
        acc.emit(
            EventKind::Arrival,
            at,
            at,
            format!("Arrival {} – end of mission", last.name.to_uppercase()),
        );
    }

    acc.finish(ordered_sites, ordered_coords)
}

struct Accumulator<'a> {
    options: &'a ScheduleOptions,
    start_date: NaiveDate,
    day: u32,
    pointer: NaiveDateTime,
    phase: Phase,
    /// Nothing but markers emitted since the day began.
    fresh_day: bool,
    /// Where the previous day was closed; today never starts before it.
    day_floor: NaiveDateTime,
    lunch_days: BTreeSet<u32>,
    prayer_days: BTreeSet<u32>,
    total_km: f64,
    visited: TimeDelta,
    requested: TimeDelta,
    log: EventLog,
    warnings: Vec<ScheduleWarning>,
}

impl<'a> Accumulator<'a> {
    fn new(start_date: NaiveDate, options: &'a ScheduleOptions) -> Self {
        Self {
            options,
            start_date,
            day: 1,
            pointer: options.travel.start_on(start_date),
            phase: Phase::AtTravel,
            fresh_day: true,
            day_floor: options.travel.start_on(start_date),
            lunch_days: BTreeSet::new(),
            prayer_days: BTreeSet::new(),
            total_km: 0.0,
            visited: TimeDelta::zero(),
            requested: TimeDelta::zero(),
            log: EventLog::new(),
            warnings: Vec::new(),
        }
    }

    fn date(&self) -> NaiveDate {
        date_of_day(self.start_date, self.day)
    }

    fn travel_end(&self) -> NaiveDateTime {
        self.options.travel.end_on(self.date())
    }

    fn activity_end(&self) -> NaiveDateTime {
        self.options.activity.end_on(self.date())
    }

    fn emit(&mut self, kind: EventKind, start: NaiveDateTime, end: NaiveDateTime, label: String) {
        self.push_event(kind, start, end, label, 0.0);
    }

    fn push_event(
        &mut self,
        kind: EventKind,
        start: NaiveDateTime,
        end: NaiveDateTime,
        label: String,
        distance_km: f64,
    ) {
        if !kind.is_marker() {
            self.fresh_day = false;
        }
        if kind == EventKind::Visit {
            self.visited += end - start;
        }
        let mut event = ItineraryEvent::new(self.day, start, end, kind, label);
        event.distance_km = distance_km;
        self.log.push(event);
    }

    /// Emit end-of-day and overnight markers no earlier than `at`, then move
    /// to the next day at `resume`.
    fn close_day(&mut self, location: &str, at: NaiveDateTime, resume: NaiveTime) {
        let mark = at.max(self.pointer);
        debug!("Closing day {} at {} during {:?}", self.day, mark, self.phase);
        self.emit(EventKind::DayEnd, mark, mark, "End of day".to_string());
        self.emit(EventKind::Overnight, mark, mark, format!("Overnight at {location}"));

        self.phase = Phase::DayClosed;
        self.day += 1;
        self.pointer = self.date().and_time(resume).max(mark);
        self.fresh_day = true;
        self.day_floor = mark;
    }

    /// The break to inject into a segment running from the pointer to `end`,
    /// if one is configured, unused today and overlapping. Lunch wins over
    /// prayer.
    fn pending_break(&self, end: NaiveDateTime) -> Option<(BreakKind, BreakBounds)> {
        let date = self.date();
        let lunch = self
            .options
            .lunch
            .filter(|_| !self.lunch_days.contains(&self.day))
            .map(|lunch| (BreakKind::Lunch, lunch.bounds_on(date)))
            .filter(|(_, bounds)| bounds.overlaps(self.pointer, end));
        if lunch.is_some() {
            return lunch;
        }
        self.options
            .prayer
            .filter(|_| !self.prayer_days.contains(&self.day))
            .map(|prayer| (BreakKind::Prayer, prayer.bounds_on(date)))
            .filter(|(_, bounds)| bounds.overlaps(self.pointer, end))
    }

    fn take_break(&mut self, kind: BreakKind, start: NaiveDateTime, end: NaiveDateTime) {
        let label = match kind {
            BreakKind::Lunch => {
                self.lunch_days.insert(self.day);
                "Lunch break".to_string()
            }
            BreakKind::Prayer => {
                self.prayer_days.insert(self.day);
                "Prayer break".to_string()
            }
        };
        debug!("{:?} on day {} from {} to {}", kind, self.day, start, end);
        self.phase = Phase::AtBreak;
        self.emit(EventKind::Break(kind), start, end, label);
        self.pointer = end;
    }

    fn travel(&mut self, leg: usize, segment: Option<&Segment>, from: &Site, to: &Site) {
        self.phase = Phase::AtTravel;

        let mut secs = segment.map_or(0.0, |s| s.duration_secs);
        let mut km = segment.map_or(0.0, |s| s.distance_m / 1000.0);
        let missing_duration = !secs.is_finite() || secs <= 0.0;
        let missing_distance = !km.is_finite() || km <= 0.0;
        if missing_duration {
            secs = self.options.fallback_travel_secs;
        }
        if missing_distance {
            km = self.options.fallback_distance_km;
        }
        if missing_duration || missing_distance {
            warn!(
                "Leg {} ({} -> {}) is missing data, using fallback {:.0}s / {:.1} km",
                leg, from.name, to.name, secs, km
            );
            self.warnings.push(ScheduleWarning::FallbackTravel {
                leg,
                duration: missing_duration,
                distance: missing_distance,
            });
        }
        self.total_km += km;

        let label = travel_label(&from.name, &to.name, km, secs);
        if secs > MAX_SPAN_HOURS * 3600.0 {
            self.cap_warning(label.clone(), secs / 3600.0);
        }
        let duration = seconds(secs);
        let mut arrival = advance(self.pointer, duration);

        if arrival > self.travel_end() {
            let earliest = self.options.travel.start_on(self.date()).max(self.day_floor);
            if self.fresh_day && advance(earliest, duration) <= self.travel_end() {
                // Nothing has happened today, so the leg may leave at the travel-window start.
                self.pointer = earliest;
            } else if !self.fresh_day || duration <= self.options.travel.length() {
                let at = self.travel_end();
                self.close_day(&from.name, at, self.options.travel.start);
                self.phase = Phase::AtTravel;
            }
            arrival = advance(self.pointer, duration);
        }

        let share = |piece: TimeDelta| {
            if duration > TimeDelta::zero() {
                km * piece.num_milliseconds() as f64 / duration.num_milliseconds() as f64
            } else {
                km
            }
        };

        if let Some((kind, bounds)) = self.pending_break(arrival) {
            let (break_start, break_end) = bounds.clip(self.pointer);
            if break_start > self.pointer {
                let start = self.pointer;
                let piece = share(break_start - start);
                self.push_event(EventKind::Travel, start, break_start, label.clone(), piece);
            }
            let remaining = arrival - break_start;
            self.take_break(kind, break_start, break_end);
            self.phase = Phase::AtTravel;
            arrival = advance(break_end, remaining);
        }

        if self.pointer < arrival {
            let start = self.pointer;
            let piece = share(arrival - start);
            self.push_event(EventKind::Travel, start, arrival, label, piece);
        }
        self.pointer = arrival;
    }

    fn visit(&mut self, site: &Site, is_last: bool) {
        let planned = hours(site.planned_hours());
        if planned <= TimeDelta::zero() {
            return;
        }
        if site.planned_hours() > MAX_SPAN_HOURS {
            self.cap_warning(site.name.clone(), site.planned_hours());
        }
        self.phase = Phase::AtVisit;
        self.requested += planned;
        let visited_before = self.visited;

        let activity = self.options.activity;
        let start_of_activity = activity.start_on(self.date());
        if self.pointer < start_of_activity {
            self.pointer = start_of_activity;
        }

        let label = site.visit_label();
        let continued = format!("Suite {label}");
        let mut current = label.clone();
        let mut end = advance(self.pointer, planned);
        let mut clamped_at = None;

        let splittable =
            site.can_extend || self.options.non_extendable_overrun == OverrunPolicy::Continue;
        let tolerance = hours(self.options.tolerance_hours);

        while activity.start < activity.end {
            let activity_end = self.activity_end();
            if end <= activity_end {
                break;
            }
            if site.can_extend && end <= advance(activity_end, tolerance) {
                debug!("{} overruns the activity window within tolerance", site.name);
                break;
            }
            if splittable {
                if self.pointer < activity_end {
                    let start = self.pointer;
                    let partial = format!("{current} (to continue)");
                    self.emit(EventKind::Visit, start, activity_end, partial);
                }
                let remaining = end - activity_end.max(self.pointer);
                self.close_day(&site.name, activity_end, activity.start);
                self.phase = Phase::AtVisit;
                end = advance(self.pointer, remaining);
                current = continued.clone();
                continue;
            }
            if self.pointer >= activity_end {
                // Nothing left of today's activity window; start over tomorrow.
                self.close_day(&site.name, activity_end, activity.start);
                self.phase = Phase::AtVisit;
                end = advance(self.pointer, planned);
                continue;
            }
            end = activity_end;
            clamped_at = Some(activity_end);
            break;
        }

        if end <= self.activity_end() {
            if let Some((kind, bounds)) = self.pending_break(end) {
                let (break_start, break_end) = bounds.clip(self.pointer);
                if break_start > self.pointer {
                    let start = self.pointer;
                    self.emit(EventKind::Visit, start, break_start, current.clone());
                    current = continued.clone();
                }
                let remaining = end - break_start;
                self.take_break(kind, break_start, break_end);
                self.phase = Phase::AtVisit;
                end = advance(break_end, remaining);
                if let Some(limit) = clamped_at {
                    end = end.min(limit).max(self.pointer);
                }
            }
        }

        if self.pointer < end {
            let start = self.pointer;
            self.emit(EventKind::Visit, start, end, current);
            self.pointer = end;
        }

        let dropped = planned - (self.visited - visited_before);
        if dropped > TimeDelta::zero() {
            let dropped_hours = as_hours(dropped);
            warn!(
                "Visit to {} clamped to the activity window, {:.2}h dropped",
                site.name, dropped_hours
            );
            self.warnings.push(ScheduleWarning::VisitTruncated {
                site: site.name.clone(),
                dropped_hours,
            });
        }

        if !is_last {
            let left = self.travel_end() - self.pointer;
            if clamped_at.is_some() || left < hours(self.options.early_close_hours) {
                let at = self.pointer;
                self.close_day(&site.name, at, activity.start);
            }
        }
    }

    fn cap_warning(&mut self, subject: String, requested_hours: f64) {
        warn!(
            "{} lasts {:.0}h, capped at {:.0}h",
            subject, requested_hours, MAX_SPAN_HOURS
        );
        self.warnings.push(ScheduleWarning::DurationCapped {
            subject,
            requested_hours,
        });
    }

    fn finish(mut self, ordered_sites: Vec<Site>, ordered_coords: Vec<Coordinate>) -> Schedule {
        if let Some(max) = self.options.max_days.filter(|&max| max > 0) {
            if self.day > max {
                warn!("Itinerary needs {} days (maximum {})", self.day, max);
                self.warnings.push(ScheduleWarning::DayLimitExceeded {
                    required: self.day,
                    max,
                });
            }
        }

        let stats = ItineraryStats {
            total_days: self.day,
            total_km: self.total_km,
            total_visit_hours: as_hours(self.visited),
            requested_visit_hours: as_hours(self.requested),
        };
        info!(
            "Scheduled {} events over {} days, {:.1} km, {:.2}h of visits",
            self.log.len(),
            stats.total_days,
            stats.total_km,
            stats.total_visit_hours
        );

        Schedule {
            events: self.log,
            ordered_sites,
            ordered_coords,
            stats,
            warnings: self.warnings,
        }
    }
}

fn travel_label(from: &str, to: &str, km: f64, secs: f64) -> String {
    let duration = if secs >= 3600.0 {
        format!("{:.1}h", secs / 3600.0)
    } else {
        format!("{:.0}min", secs / 60.0)
    };
    format!("{from} → {to} ({km:.1} km, {duration})")
}
