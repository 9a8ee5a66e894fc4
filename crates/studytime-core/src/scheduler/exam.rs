//! In-class exam placement.
//!
//! Under [`ExamPolicy::InClass`](crate::schedule::ExamPolicy::InClass) an exam
//! task is not studied for; it is shown once, at its class time on the exam
//! date, or for an hour from its due time when no class matches.

use chrono::{Duration, NaiveDateTime, NaiveTime};

use super::{ScheduleEvent, ScheduleStatus};
use crate::schedule::{CommitmentKind, FixedCommitment, Task};
use crate::timeline::Urgency;

const UNMATCHED_EXAM_MINUTES: i64 = 60;

/// The class an exam belongs to, matched by name.
///
/// A class matches when its label appears in the exam name, or when the exam
/// name starts with the first three characters of the label. Case-insensitive;
/// the first match in commitment order wins.
pub fn matching_class<'a>(task: &Task, commitments: &'a [FixedCommitment]) -> Option<&'a FixedCommitment> {
    let name = task.name.to_uppercase();

    commitments
        .iter()
        .filter(|c| c.kind == CommitmentKind::Class)
        .find(|class| {
            let label = class.label.trim().to_uppercase();
            if label.is_empty() {
                return false;
            }
            let prefix: String = label.chars().take(3).collect();
            name.contains(&label) || name.starts_with(&prefix)
        })
}

/// Build the calendar event for an exam task
pub fn exam_event(task: &Task, commitments: &[FixedCommitment], now: NaiveDateTime) -> ScheduleEvent {
    let (start, end) = match matching_class(task, commitments) {
        Some(class) => (class.start, class.end),
        None => {
            let start = task.due.time();
            let (end, wrapped) = start.overflowing_add_signed(Duration::minutes(UNMATCHED_EXAM_MINUTES));
            let end = if wrapped == 0 { end } else { last_minute_of_day() };
            (start, end)
        }
    };

    ScheduleEvent {
        title: format!("EXAM: {}", task.name),
        task_id: task.id.clone(),
        date: task.due.date(),
        start,
        end,
        duration_minutes: (end - start).num_minutes(),
        difficulty: task.difficulty,
        status: ScheduleStatus::Exam,
        urgency: Urgency::classify(task.due, now),
    }
}

fn last_minute_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 0).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::Difficulty;
    use chrono::{NaiveDate, Weekday};

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 3).unwrap().and_time(t(8, 0))
    }

    fn exam(name: &str, due: NaiveDateTime) -> Task {
        Task::new("x", name, 60, due, Difficulty::Hard).as_exam()
    }

    fn commitments() -> Vec<FixedCommitment> {
        vec![
            FixedCommitment::new("Gym", CommitmentKind::Break, vec![Weekday::Wed], t(7, 0), t(8, 0)),
            FixedCommitment::new("Biology", CommitmentKind::Class, vec![Weekday::Wed], t(10, 0), t(11, 15)),
            FixedCommitment::new("Chem 201", CommitmentKind::Class, vec![Weekday::Thu], t(13, 0), t(14, 30)),
        ]
    }

    #[test]
    fn test_matches_by_contained_label() {
        let task = exam("Chem 201 Midterm", now() + Duration::days(3));
        assert_eq!(matching_class(&task, &commitments()).unwrap().label, "Chem 201");
    }

    #[test]
    fn test_matches_by_prefix() {
        let task = exam("bio final", now() + Duration::days(2));
        assert_eq!(matching_class(&task, &commitments()).unwrap().label, "Biology");
    }

    #[test]
    fn test_non_class_commitments_never_match() {
        let task = exam("Gym fitness test", now() + Duration::days(2));
        assert!(matching_class(&task, &commitments()).is_none());
    }

    #[test]
    fn test_matched_exam_uses_class_time() {
        let due = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap().and_time(t(23, 59));
        let event = exam_event(&exam("Biology Quiz", due), &commitments(), now());
        assert_eq!(event.title, "EXAM: Biology Quiz");
        assert_eq!(event.date, due.date());
        assert_eq!((event.start, event.end), (t(10, 0), t(11, 15)));
        assert_eq!(event.duration_minutes, 75);
        assert_eq!(event.status, ScheduleStatus::Exam);
    }

    #[test]
    fn test_unmatched_exam_lasts_an_hour_from_due() {
        let due = NaiveDate::from_ymd_opt(2025, 3, 6).unwrap().and_time(t(18, 30));
        let event = exam_event(&exam("Driving theory", due), &commitments(), now());
        assert_eq!((event.start, event.end), (t(18, 30), t(19, 30)));
        assert_eq!(event.duration_minutes, 60);
    }

    #[test]
    fn test_unmatched_late_exam_stops_at_midnight() {
        let due = NaiveDate::from_ymd_opt(2025, 3, 6).unwrap().and_time(t(23, 30));
        let event = exam_event(&exam("Night exam", due), &[], now());
        assert_eq!(event.end, t(23, 59));
        assert_eq!(event.duration_minutes, 29);
    }
}
