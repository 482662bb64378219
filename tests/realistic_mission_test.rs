//! Realistic mission tests using real Senegalese cities.
//!
//! These tests run the full pipeline: bracket the sites with the base,
//! build a haversine matrix, solve the order and schedule the itinerary.

mod fixtures;

use chrono::NaiveDate;

use mission_planner::config::ScheduleOptions;
use mission_planner::event::{BreakKind, EventKind};
use mission_planner::haversine::HaversineMatrix;
use mission_planner::matrix::TravelMatrix;
use mission_planner::order::Order;
use mission_planner::scheduler::{Schedule, ScheduleWarning, plan};
use mission_planner::site::{Coordinate, Site, bracket_with_base};
use mission_planner::solver::SolveOptions;
use mission_planner::traits::DistanceMatrixProvider;
use mission_planner::window::PrayerBreak;

use fixtures::{CITIES, City, DAKAR};

// ============================================================================
// Test Infrastructure
// ============================================================================

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

/// Bracket `cities` with Dakar; every site may run over into the next day.
fn mission(cities: &[City], hours: f64) -> (Vec<Site>, Vec<Coordinate>) {
    let sites = cities
        .iter()
        .map(|city| city.site("Health post", hours).can_extend(true))
        .collect();
    let coords = cities.iter().map(City::coordinate).collect();
    bracket_with_base(DAKAR.name, DAKAR.coordinate(), sites, coords)
}

fn assert_valid_order(order: &Order, n: usize) {
    let mut sorted = order.as_slice().to_vec();
    sorted.sort_unstable();
    assert_eq!(sorted, (0..n).collect::<Vec<_>>(), "order must be a permutation");
    assert_eq!(order.as_slice()[0], 0, "departure must stay first");
    assert_eq!(order.as_slice()[n - 1], n - 1, "return must stay last");
}

/// Checks that hold for any complete itinerary.
fn assert_consistent(schedule: &Schedule) {
    assert!(schedule.events.is_chronological());

    let summary = schedule.events.summarize();
    assert_eq!(summary.total_days, schedule.stats.total_days);
    assert!((summary.total_km - schedule.stats.total_km).abs() < 1e-6);
    assert!((summary.total_visit_hours - schedule.stats.total_visit_hours).abs() < 1e-6);

    // Every closed day is followed by an overnight marker.
    let events = schedule.events.events();
    for (i, event) in events.iter().enumerate() {
        if event.kind == EventKind::DayEnd {
            assert_eq!(events[i + 1].kind, EventKind::Overnight);
            assert_eq!(events[i + 1].start, event.start);
        }
    }
    assert_eq!(events.last().map(|e| e.kind), Some(EventKind::Arrival));
}

// ============================================================================
// Exact Branch
// ============================================================================

#[test]
fn test_coastal_mission() {
    let (sites, coords) = mission(&CITIES[..5], 3.0);
    let matrix = HaversineMatrix::default().matrix_for(&coords);
    let estimator = HaversineMatrix::default();

    let (order, schedule) = plan(
        &sites,
        &coords,
        &matrix,
        start_date(),
        &SolveOptions::default(),
        &ScheduleOptions::default(),
        Some(&estimator),
    );

    assert_valid_order(&order, sites.len());
    assert_consistent(&schedule);

    let first = &schedule.events.events()[0];
    assert_eq!(first.kind, EventKind::Travel);
    assert_eq!(first.start, start_date().and_hms_opt(7, 30, 0).unwrap());
    assert!(first.label.starts_with("Dakar → "));
    assert_eq!(
        schedule.events.events().last().map(|e| e.label.as_str()),
        Some("Arrival DAKAR – end of mission")
    );

    assert!(schedule.ordered_sites[0].is_base());
    assert!(schedule.ordered_sites[sites.len() - 1].is_base());
    assert_eq!(schedule.ordered_coords.len(), sites.len());

    // Extendable sites keep all of their hours.
    assert!((schedule.stats.total_visit_hours - 15.0).abs() < 1e-9);
    assert!((schedule.stats.requested_visit_hours - 15.0).abs() < 1e-9);
    assert!(schedule.warnings.is_empty());
    assert!(schedule.stats.total_days >= 2, "15 hours of visits cannot fit one day");

    // Distance is the matrix distance along the solved order.
    let expected_km: f64 = order
        .as_slice()
        .windows(2)
        .map(|pair| matrix.distance(pair[0], pair[1]) / 1000.0)
        .sum();
    assert!((schedule.stats.total_km - expected_km).abs() < 1e-6);
}

#[test]
fn test_missing_distances_recomputed_from_coordinates() {
    let (sites, coords) = mission(&CITIES[..4], 2.0);
    let estimator = HaversineMatrix::default();
    let full = estimator.matrix_for(&coords);
    let durations_only = TravelMatrix::from_durations(full.durations().to_vec());

    let (order, with_distances) = plan(
        &sites,
        &coords,
        &full,
        start_date(),
        &SolveOptions::default(),
        &ScheduleOptions::default(),
        Some(&estimator),
    );
    let (recomputed_order, recomputed) = plan(
        &sites,
        &coords,
        &durations_only,
        start_date(),
        &SolveOptions::default(),
        &ScheduleOptions::default(),
        Some(&estimator),
    );

    assert_eq!(order, recomputed_order);
    assert!(recomputed.warnings.is_empty(), "no fallback once coordinates fill the gaps");
    assert!((recomputed.stats.total_km - with_distances.stats.total_km).abs() < 1e-6);
}

#[test]
fn test_missing_distances_without_estimator_use_fallback() {
    let (sites, coords) = mission(&CITIES[..3], 1.0);
    let full = HaversineMatrix::default().matrix_for(&coords);
    let durations_only = TravelMatrix::from_durations(full.durations().to_vec());

    let (_, schedule) = plan::<HaversineMatrix>(
        &sites,
        &coords,
        &durations_only,
        start_date(),
        &SolveOptions::default(),
        &ScheduleOptions::default(),
        None,
    );

    // Four legs, each falling back to 50 km.
    assert_eq!(schedule.warnings.len(), 4);
    assert!(schedule.warnings.iter().all(|w| matches!(
        w,
        ScheduleWarning::FallbackTravel {
            duration: false,
            distance: true,
            ..
        }
    )));
    assert!((schedule.stats.total_km - 200.0).abs() < 1e-9);
    assert_consistent(&schedule);
}

// ============================================================================
// Heuristic Branch
// ============================================================================

#[test]
fn test_national_tour() {
    // 14 cities plus departure and return: beyond the exact threshold.
    let (sites, coords) = mission(CITIES, 4.0);
    let estimator = HaversineMatrix::default();
    let matrix = estimator.matrix_for(&coords);
    let options = ScheduleOptions {
        prayer: Some(PrayerBreak::default()),
        max_days: Some(5),
        ..ScheduleOptions::default()
    };

    let (order, schedule) = plan(
        &sites,
        &coords,
        &matrix,
        start_date(),
        &SolveOptions::default(),
        &options,
        Some(&estimator),
    );

    assert_valid_order(&order, sites.len());
    assert_consistent(&schedule);
    assert!((schedule.stats.total_visit_hours - 56.0).abs() < 1e-9);
    assert!(schedule.stats.total_days > 5);
    assert!(schedule.warnings.contains(&ScheduleWarning::DayLimitExceeded {
        required: schedule.stats.total_days,
        max: 5
    }));

    // One lunch at most per day.
    for day in schedule.events.days() {
        let lunches = schedule
            .events
            .for_day(day)
            .filter(|e| e.kind == EventKind::Break(BreakKind::Lunch))
            .count();
        assert!(lunches <= 1, "day {day} has {lunches} lunches");
    }
}

#[test]
fn test_national_tour_is_deterministic() {
    let (sites, coords) = mission(CITIES, 2.5);
    let estimator = HaversineMatrix::default();
    let matrix = estimator.matrix_for(&coords);

    let run = || {
        plan(
            &sites,
            &coords,
            &matrix,
            start_date(),
            &SolveOptions::default(),
            &ScheduleOptions::default(),
            Some(&estimator),
        )
    };

    assert_eq!(run(), run());
}
