use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use super::countdown::DAY_MS;
use super::goal::Goal;

/// Pacing analysis of a goal's logged effort against its estimate and
/// deadline. Recomputed on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeAnalysis {
    pub total_worked_hours: f64,
    pub estimated_hours: f64,
    pub remaining_hours: f64,
    pub days_until_deadline: i64,
    pub suggested_daily_hours: f64,
    pub is_on_track: bool,
    /// Worked share of the estimate, capped at 100.
    pub progress_percentage: f64,
    pub average_hours_per_day: f64,
}

pub fn total_worked_hours(goal: &Goal) -> f64 {
    goal.work_sessions.iter().map(|s| s.hours).sum()
}

/// Number of distinct calendar dates with at least one session.
pub fn working_days_count(goal: &Goal) -> usize {
    goal.work_sessions
        .iter()
        .map(|s| s.date)
        .collect::<BTreeSet<_>>()
        .len()
}

pub fn today_worked_hours(goal: &Goal, today: NaiveDate) -> f64 {
    goal.work_sessions
        .iter()
        .filter(|s| s.date == today)
        .map(|s| s.hours)
        .sum()
}

/// Hours logged since the start of the current week (Monday).
pub fn weekly_worked_hours(goal: &Goal, today: NaiveDate) -> f64 {
    let week_start = today - Duration::days(today.weekday().num_days_from_monday() as i64);
    goal.work_sessions
        .iter()
        .filter(|s| s.date >= week_start)
        .map(|s| s.hours)
        .sum()
}

fn ceil_days(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    let ms = (to - from).num_milliseconds();
    ms.div_euclid(DAY_MS) + if ms.rem_euclid(DAY_MS) > 0 { 1 } else { 0 }
}

pub fn time_analysis(goal: &Goal, now: NaiveDateTime) -> TimeAnalysis {
    let total_worked_hours = self::total_worked_hours(goal);
    let estimated_hours = goal.estimated_hours.unwrap_or(0.0);
    let remaining_hours = (estimated_hours - total_worked_hours).max(0.0);

    let days_until_deadline = ceil_days(now, goal.deadline).max(0);

    let suggested_daily_hours = if days_until_deadline > 0 {
        remaining_hours / days_until_deadline as f64
    } else {
        0.0
    };

    let progress_percentage = if estimated_hours > 0.0 {
        (total_worked_hours / estimated_hours * 100.0).min(100.0)
    } else {
        0.0
    };

    // Linear pacing target over the goal's lifespan. Legacy goals without a
    // creation instant fall back to the deadline itself, which degenerates
    // the span to zero; the guard keeps such goals trivially on track instead
    // of dividing by zero.
    let created = goal.created_at.unwrap_or(goal.deadline);
    let lifespan_days = ceil_days(created, goal.deadline);
    let expected_hours_worked = if estimated_hours > 0.0 && lifespan_days > 0 {
        estimated_hours * (1.0 - days_until_deadline as f64 / lifespan_days as f64)
    } else {
        total_worked_hours
    };

    let is_on_track = total_worked_hours >= expected_hours_worked * 0.8;

    let days_worked = working_days_count(goal);
    let average_hours_per_day = if days_worked > 0 {
        total_worked_hours / days_worked as f64
    } else {
        0.0
    };

    TimeAnalysis {
        total_worked_hours,
        estimated_hours,
        remaining_hours,
        days_until_deadline,
        suggested_daily_hours,
        is_on_track,
        progress_percentage,
        average_hours_per_day,
    }
}

pub fn time_analysis_now(goal: &Goal) -> TimeAnalysis {
    time_analysis(goal, super::now())
}

pub fn format_hours(hours: f64) -> String {
    if hours == 0.0 {
        return "0h".to_string();
    }
    if hours < 1.0 {
        let minutes = (hours * 60.0).round() as i64;
        if minutes == 60 {
            return "1h".to_string();
        }
        return format!("{}min", minutes);
    }

    let mut whole = hours.floor() as i64;
    let mut minutes = ((hours - hours.floor()) * 60.0).round() as i64;
    // carry a rounded-up remainder instead of rendering "1h 60min"
    if minutes == 60 {
        whole += 1;
        minutes = 0;
    }

    if minutes == 0 {
        format!("{}h", whole)
    } else {
        format!("{}h {}min", whole, minutes)
    }
}
