use crate::roster::Student;
use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// Width of the inclusive due-soon window, in days after today.
pub const DUE_SOON_DAYS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Overdue,
    DueSoon,
    Ok,
}

/// The fixed three-day rule. Callers with a configured window use `classify_within`.
pub fn classify(due_date: NaiveDate, today: NaiveDate) -> Urgency {
    classify_within(due_date, today, DUE_SOON_DAYS)
}

/// Both ends of `[today, today + window_days]` count as due soon.
pub fn classify_within(due_date: NaiveDate, today: NaiveDate, window_days: i64) -> Urgency {
    if due_date < today {
        return Urgency::Overdue;
    }
    // Saturate at the calendar's end rather than overflow.
    let last_due_soon = today
        .checked_add_signed(Duration::days(window_days))
        .unwrap_or(NaiveDate::MAX);
    if due_date <= last_due_soon {
        Urgency::DueSoon
    } else {
        Urgency::Ok
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub total: usize,
    pub overdue_count: usize,
    pub due_soon_count: usize,
    pub total_collected: f64,
}

impl Dashboard {
    pub fn ok_count(&self) -> usize {
        self.total - self.overdue_count - self.due_soon_count
    }
}

pub fn dashboard(roster: &[Student], today: NaiveDate) -> Dashboard {
    tally(roster, |due| classify(due, today))
}

pub fn dashboard_within(roster: &[Student], today: NaiveDate, window_days: i64) -> Dashboard {
    tally(roster, |due| classify_within(due, today, window_days))
}

fn tally(roster: &[Student], urgency_of: impl Fn(NaiveDate) -> Urgency) -> Dashboard {
    let mut overdue_count = 0usize;
    let mut due_soon_count = 0usize;
    let mut total_collected = 0.0f64;

    for s in roster {
        match urgency_of(s.next_payment_due) {
            Urgency::Overdue => overdue_count += 1,
            Urgency::DueSoon => due_soon_count += 1,
            Urgency::Ok => {}
        }
        total_collected += s.last_payment_amount;
    }

    Dashboard {
        total: roster.len(),
        overdue_count,
        due_soon_count,
        total_collected,
    }
}

/// One listed row: the student's own fields plus its position and urgency.
#[derive(Debug, Clone, Serialize)]
pub struct RosterRow<'a> {
    pub index: usize,
    #[serde(flatten)]
    pub student: &'a Student,
    pub urgency: Urgency,
}

pub fn roster_rows(roster: &[Student], today: NaiveDate, window_days: i64) -> Vec<RosterRow<'_>> {
    roster
        .iter()
        .enumerate()
        .map(|(index, student)| RosterRow {
            index,
            student,
            urgency: classify_within(student.next_payment_due, today, window_days),
        })
        .collect()
}

/// Renders an amount the way the dashboard shows it, e.g. `$100.0`.
pub fn format_amount(symbol: &str, amount: f64) -> String {
    format!("{}{}", symbol, decimal_text(amount))
}

/// Integral values keep one fractional digit (`50.0`); others print as-is.
pub fn decimal_text(amount: f64) -> String {
    if amount.is_finite() && amount.fract() == 0.0 {
        format!("{:.1}", amount)
    } else {
        format!("{}", amount)
    }
}
