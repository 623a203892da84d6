//! Pure reminder conditions.
//!
//! Every function takes the record plus "now" and returns the notification
//! that should be shown, or `None`. Storage and delivery live in the worker.

use crate::calendar::days_until;
use crate::clock::DAY_MS;
use crate::model::savings::SavingsGoal;
use crate::model::task::Task;
use crate::model::water::WaterIntake;
use crate::model::TimeRange;
use crate::reminder::notification::{Notification, NotificationId, ReminderCategory};
use chrono::TimeZone;

/// Savings goals untouched for longer than this get a nudge.
pub const SAVINGS_STALE_AFTER_MS: i64 = DAY_MS;
/// Trailing window checked for recent transactions.
pub const TRANSACTION_WINDOW_MS: i64 = DAY_MS;

/// Where a task stands relative to its due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueStatus {
    /// Due in exactly the task's lead time.
    DueSoon { days: i64 },
    DueToday,
    Overdue { days: i64 },
}

/// Water reminder: fires once the configured interval has passed since the
/// last glass, at most once per interval.
pub fn water_reminder(record: &WaterIntake, now_ms: i64) -> Option<Notification> {
    if record.target_reached() {
        return None;
    }
    let interval_ms = record.interval.as_millis();
    if interval_ms <= 0 {
        return None;
    }

    let last_drink = record.last_drink_at.unwrap_or(record.meta.created_at);
    if now_ms - last_drink <= interval_ms {
        return None;
    }
    if let Some(reminded_at) = record.last_reminded_at {
        if now_ms - reminded_at < interval_ms {
            return None;
        }
    }

    let remaining = record.target_glasses - record.glasses_drunk;
    Some(Notification {
        id: NotificationId::for_record(ReminderCategory::Water, Some(record.meta.id)),
        category: ReminderCategory::Water,
        title: "Time for a glass of water".to_string(),
        body: format!(
            "{} of {} glasses so far today, {} to go.",
            record.glasses_drunk, record.target_glasses, remaining
        ),
        deep_link: Some("hearth://water".to_string()),
    })
}

/// Daily nag for incomplete tasks that opted in.
pub fn task_daily_reminder(task: &Task) -> Option<Notification> {
    if task.completed || !task.daily_reminder {
        return None;
    }
    Some(task_notification(
        task,
        ReminderCategory::TaskDaily,
        "Daily reminder".to_string(),
        format!("Don't forget: {}", task.title),
    ))
}

/// Classifies an incomplete task against its due date.
///
/// `DueSoon` only fires on the exact lead day, so a task with a three-day
/// lead time is announced once, three days out.
pub fn task_due_status<Tz: TimeZone>(task: &Task, now_ms: i64, tz: &Tz) -> Option<DueStatus> {
    if task.completed {
        return None;
    }
    let due_at = task.due_at?;
    let days = days_until(now_ms, due_at, tz);
    match days {
        d if d < 0 => Some(DueStatus::Overdue { days: -d }),
        0 => Some(DueStatus::DueToday),
        d if d == i64::from(task.reminder_lead_days) => Some(DueStatus::DueSoon { days: d }),
        _ => None,
    }
}

pub fn task_due_reminder<Tz: TimeZone>(task: &Task, now_ms: i64, tz: &Tz) -> Option<Notification> {
    let notification = match task_due_status(task, now_ms, tz)? {
        DueStatus::DueSoon { days } => task_notification(
            task,
            ReminderCategory::TaskDueSoon,
            "Task due soon".to_string(),
            format!("{} is due in {} day(s).", task.title, days),
        ),
        DueStatus::DueToday => task_notification(
            task,
            ReminderCategory::TaskDueToday,
            "Task due today".to_string(),
            format!("{} is due today.", task.title),
        ),
        DueStatus::Overdue { days } => task_notification(
            task,
            ReminderCategory::TaskOverdue,
            "Task overdue".to_string(),
            format!("{} is {} day(s) overdue.", task.title, days),
        ),
    };
    Some(notification)
}

/// Savings nudge: below target and not updated for a day.
pub fn savings_reminder(goal: &SavingsGoal, now_ms: i64) -> Option<Notification> {
    if goal.is_reached() || now_ms - goal.meta.updated_at <= SAVINGS_STALE_AFTER_MS {
        return None;
    }
    Some(Notification {
        id: NotificationId::for_record(ReminderCategory::SavingsStale, Some(goal.meta.id)),
        category: ReminderCategory::SavingsStale,
        title: "Keep your savings going".to_string(),
        body: format!(
            "You haven't added to \"{}\" in a while. {:.2} left to reach your goal.",
            goal.name,
            goal.remaining()
        ),
        deep_link: Some(format!("hearth://savings/{}", goal.meta.id)),
    })
}

/// Window inspected by the transaction reminder; includes `now_ms` itself.
pub fn transaction_window(now_ms: i64) -> TimeRange {
    TimeRange::new(now_ms - TRANSACTION_WINDOW_MS, now_ms + 1)
}

/// True when none of `occurred_at` falls into the trailing window.
pub fn transactions_stale(occurred_at: &[i64], now_ms: i64) -> bool {
    let window = transaction_window(now_ms);
    !occurred_at.iter().any(|instant| window.contains(*instant))
}

/// Fires when no transaction was logged in the trailing window.
pub fn transaction_reminder(count_in_window: u64) -> Option<Notification> {
    if count_in_window > 0 {
        return None;
    }
    Some(Notification {
        id: NotificationId::for_record(ReminderCategory::TransactionStale, None),
        category: ReminderCategory::TransactionStale,
        title: "Log today's spending".to_string(),
        body: "No income or expense recorded in the last 24 hours.".to_string(),
        deep_link: Some("hearth://expenses".to_string()),
    })
}

fn task_notification(
    task: &Task,
    category: ReminderCategory,
    title: String,
    body: String,
) -> Notification {
    Notification {
        id: NotificationId::for_record(category, Some(task.meta.id)),
        category,
        title,
        body,
        deep_link: Some(format!("hearth://tasks/{}", task.meta.id)),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        savings_reminder, task_daily_reminder, task_due_reminder, task_due_status,
        transaction_reminder, transactions_stale, water_reminder, DueStatus,
    };
    use crate::clock::{DAY_MS, HOUR_MS, MINUTE_MS};
    use crate::model::savings::SavingsGoal;
    use crate::model::task::Task;
    use crate::model::water::{ReminderInterval, WaterIntake};
    use crate::reminder::notification::ReminderCategory;
    use chrono::{FixedOffset, NaiveDate, TimeZone};

    const NOW: i64 = 1_717_200_000_000;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).expect("valid offset")
    }

    fn water(interval: ReminderInterval) -> WaterIntake {
        let day = NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date");
        let mut record = WaterIntake::new(day, 8, interval);
        record.meta.created_at = NOW - 10 * HOUR_MS;
        record
    }

    #[test]
    fn water_interval_in_hours_is_converted_before_comparison() {
        let mut record = water(ReminderInterval::hours(2));
        record.last_drink_at = Some(NOW - 90 * MINUTE_MS);
        // 90 minutes < 120 minutes: a raw "2 vs 90" comparison would fire.
        assert!(water_reminder(&record, NOW).is_none());

        record.last_drink_at = Some(NOW - 121 * MINUTE_MS);
        assert!(water_reminder(&record, NOW).is_some());
    }

    #[test]
    fn water_does_not_refire_within_interval_after_reminding() {
        let mut record = water(ReminderInterval::minutes(30));
        record.last_drink_at = Some(NOW - 3 * HOUR_MS);
        record.last_reminded_at = Some(NOW - 10 * MINUTE_MS);
        assert!(water_reminder(&record, NOW).is_none());

        record.last_reminded_at = Some(NOW - 31 * MINUTE_MS);
        assert!(water_reminder(&record, NOW).is_some());
    }

    #[test]
    fn water_is_quiet_once_target_is_reached() {
        let mut record = water(ReminderInterval::minutes(30));
        record.glasses_drunk = 8;
        record.last_drink_at = Some(NOW - 5 * HOUR_MS);
        assert!(water_reminder(&record, NOW).is_none());
    }

    #[test]
    fn daily_reminder_only_for_opted_in_incomplete_tasks() {
        let mut task = Task::new("water plants");
        assert!(task_daily_reminder(&task).is_none());
        task.daily_reminder = true;
        let fired = task_daily_reminder(&task).expect("daily reminder should fire");
        assert_eq!(fired.category, ReminderCategory::TaskDaily);
        task.set_completed(true, NOW);
        assert!(task_daily_reminder(&task).is_none());
    }

    #[test]
    fn due_status_covers_lead_today_and_overdue() {
        let tz = utc();
        let now = tz
            .with_ymd_and_hms(2024, 6, 1, 22, 0, 0)
            .single()
            .expect("valid time")
            .timestamp_millis();
        let mut task = Task::new("pay rent");
        task.reminder_lead_days = 2;

        task.due_at = Some(now + 2 * DAY_MS - 20 * HOUR_MS);
        assert_eq!(task_due_status(&task, now, &tz), Some(DueStatus::DueSoon { days: 2 }));

        task.due_at = Some(now + HOUR_MS);
        assert_eq!(task_due_status(&task, now, &tz), Some(DueStatus::DueToday));

        task.due_at = Some(now - DAY_MS);
        assert_eq!(task_due_status(&task, now, &tz), Some(DueStatus::Overdue { days: 1 }));

        task.due_at = Some(now + 5 * DAY_MS);
        assert_eq!(task_due_status(&task, now, &tz), None);
    }

    #[test]
    fn due_variants_use_distinct_categories() {
        let tz = utc();
        let mut task = Task::new("dentist");
        task.due_at = Some(NOW);
        let today = task_due_reminder(&task, NOW, &tz).expect("due today");
        task.due_at = Some(NOW - 3 * DAY_MS);
        let overdue = task_due_reminder(&task, NOW, &tz).expect("overdue");
        assert_eq!(today.category, ReminderCategory::TaskDueToday);
        assert_eq!(overdue.category, ReminderCategory::TaskOverdue);
        assert_ne!(today.id, overdue.id);
    }

    #[test]
    fn savings_goal_fires_after_a_day_without_updates() {
        let mut goal = SavingsGoal::new("bike", 500.0);
        goal.saved_amount = 100.0;
        goal.meta.updated_at = NOW - 23 * HOUR_MS;
        assert!(savings_reminder(&goal, NOW).is_none());

        goal.meta.updated_at = NOW - 25 * HOUR_MS;
        assert!(savings_reminder(&goal, NOW).is_some());

        goal.saved_amount = 500.0;
        assert!(savings_reminder(&goal, NOW).is_none());
    }

    #[test]
    fn transaction_staleness_over_trailing_day() {
        let earlier = NOW - 25 * HOUR_MS;
        assert!(transactions_stale(&[earlier], NOW));
        assert!(!transactions_stale(&[earlier, NOW - 2 * HOUR_MS], NOW));
        assert!(transaction_reminder(0).is_some());
        assert!(transaction_reminder(1).is_none());
    }
}
