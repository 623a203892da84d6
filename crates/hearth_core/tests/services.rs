use chrono::{Duration, FixedOffset, NaiveDate};
use hearth_core::assistant::{
    AssistantError, AssistantProvider, AssistantRegistry, AssistantRequest, AssistantResult,
    AssistantTask,
};
use hearth_core::calendar::start_of_day_ms;
use hearth_core::clock::{DAY_MS, HOUR_MS};
use hearth_core::db::open_db_in_memory;
use hearth_core::model::chat::ChatRole;
use hearth_core::model::savings::SavingsGoal;
use hearth_core::model::transaction::{Transaction, TransactionKind};
use hearth_core::model::water::ReminderInterval;
use hearth_core::service::{
    AssistantService, ExpenseFilter, ExpenseService, SavingsService, TaskFilter, TaskService,
    WaterDefaults, WaterService,
};
use hearth_core::{
    FixedClock, JsonReportExporter, ServiceError, SqliteRepository, TimeRange, ValidationError,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// 2024-06-01T08:00:00Z
const NOW: i64 = 1_717_200_000_000 + 8 * HOUR_MS;

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

#[test]
fn task_toggle_stamps_and_clears_completed_at() {
    let conn = open_db_in_memory().unwrap();
    let clock = Arc::new(FixedClock::new(NOW));
    let service = TaskService::new(
        SqliteRepository::try_with_clock(&conn, clock.clone()).unwrap(),
        clock.clone(),
        utc(),
    );
    let states = service.state().subscribe();

    let task = service.add(service.draft("call plumber")).unwrap();
    clock.advance_ms(HOUR_MS);
    let done = service.toggle_complete(task.meta.id).unwrap();
    assert!(done.completed);
    assert_eq!(done.completed_at, Some(NOW + HOUR_MS));

    let reopened = service.toggle_complete(task.meta.id).unwrap();
    assert!(!reopened.completed);
    assert_eq!(reopened.completed_at, None);

    let latest = states.try_iter().last().unwrap();
    assert!(!latest.loading);
    assert_eq!(latest.items, vec![reopened]);
}

#[test]
fn task_list_filter_sticks_across_mutations() {
    let conn = open_db_in_memory().unwrap();
    let clock = Arc::new(FixedClock::new(NOW));
    let service = TaskService::new(
        SqliteRepository::try_with_clock(&conn, clock.clone()).unwrap(),
        clock.clone(),
        utc(),
    );
    let first = service.add(service.draft("laundry")).unwrap();
    service.add(service.draft("dishes")).unwrap();
    service.toggle_complete(first.meta.id).unwrap();

    let active = service.list(TaskFilter::Active).unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].title, "dishes");

    service.add(service.draft("vacuum")).unwrap();
    let snapshot = service.state().snapshot();
    assert_eq!(snapshot.items.len(), 2);
    assert!(snapshot.items.iter().all(|task| !task.completed));

    let found = service.search("LAUND").unwrap();
    assert!(found.is_empty());
    service.list(TaskFilter::All).unwrap();
    assert_eq!(service.search("laund").unwrap().len(), 1);
}

#[test]
fn task_errors_are_published_and_returned() {
    let conn = open_db_in_memory().unwrap();
    let clock = Arc::new(FixedClock::new(NOW));
    let service = TaskService::new(
        SqliteRepository::try_with_clock(&conn, clock.clone()).unwrap(),
        clock,
        utc(),
    );

    let err = service.add(service.draft("   ")).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::BlankField("title"))
    ));
    assert_eq!(
        service.state().snapshot().error.as_deref(),
        Some("title must not be blank")
    );

    let missing = Uuid::new_v4();
    assert!(matches!(
        service.toggle_complete(missing).unwrap_err(),
        ServiceError::NotFound(id) if id == missing
    ));
}

#[test]
fn weekly_task_completion_rate_counts_tasks_due_in_window() {
    let conn = open_db_in_memory().unwrap();
    let clock = Arc::new(FixedClock::new(NOW));
    let service = TaskService::new(
        SqliteRepository::try_with_clock(&conn, clock.clone()).unwrap(),
        clock.clone(),
        utc(),
    );
    for (title, due_offset, done) in [
        ("a", -2 * DAY_MS, true),
        ("b", -DAY_MS, false),
        ("c", HOUR_MS, true),
        ("d", -6 * DAY_MS, true),
        ("outside", -8 * DAY_MS, true),
    ] {
        let mut task = service.draft(title);
        task.due_at = Some(NOW + due_offset);
        task.completed = done;
        service.add(task).unwrap();
    }

    let rate = service.weekly_completion_rate().unwrap();
    assert!((rate - 0.75).abs() < 1e-9);
}

#[test]
fn savings_deposits_must_be_positive() {
    let conn = open_db_in_memory().unwrap();
    let service = SavingsService::new(SqliteRepository::try_new(&conn).unwrap());
    let mut goal = SavingsGoal::new("emergency fund", 1000.0);
    goal.daily_saving = 40.0;
    let goal = service.create(goal).unwrap();

    let updated = service.add_savings(goal.meta.id, 250.0).unwrap();
    assert_eq!(updated.saved_amount, 250.0);

    for bad in [0.0, -10.0, f64::NAN] {
        assert!(matches!(
            service.add_savings(goal.meta.id, bad).unwrap_err(),
            ServiceError::Validation(_)
        ));
    }

    let progress = service.progress(goal.meta.id).unwrap();
    assert_eq!(progress.percent, 25.0);
    assert_eq!(progress.estimated_days, 19);
    assert_eq!(service.list().unwrap()[0].saved_amount, 250.0);
}

#[test]
fn expense_summary_categories_and_export() {
    let conn = open_db_in_memory().unwrap();
    let clock = Arc::new(FixedClock::new(NOW));
    let service = ExpenseService::new(
        SqliteRepository::try_with_clock(&conn, clock.clone()).unwrap(),
        clock,
    );
    let entries = [
        (TransactionKind::Income, "salary", 2000.0, NOW - 3 * DAY_MS),
        (TransactionKind::Expense, " groceries ", 80.0, NOW - 2 * DAY_MS),
        (TransactionKind::Expense, "groceries", 20.0, NOW - HOUR_MS),
        (TransactionKind::Expense, "transport", 15.0, NOW - 40 * DAY_MS),
    ];
    for (kind, category, amount, at) in entries {
        service
            .add(Transaction::new(kind, category, amount, at))
            .unwrap();
    }

    let month = TimeRange::trailing(NOW + 1, 30 * DAY_MS);
    let summary = service.summary(Some(month)).unwrap();
    assert_eq!(summary.total_income, 2000.0);
    assert_eq!(summary.total_expense, 100.0);
    assert_eq!(summary.balance, 1900.0);

    let totals = service.category_totals(None).unwrap();
    assert_eq!(totals[0].category, "groceries");
    assert_eq!(totals[0].total, 100.0);
    assert_eq!(totals[0].count, 2);

    let filtered = service
        .list(ExpenseFilter {
            kind: Some(TransactionKind::Expense),
            category: Some("groceries".to_string()),
            ..ExpenseFilter::default()
        })
        .unwrap();
    assert_eq!(filtered.len(), 2);

    let exported = service
        .export(Some(month), &JsonReportExporter::default())
        .unwrap();
    assert_eq!(exported.file_name, format!("hearth-report-{NOW}.json"));
    let json: serde_json::Value = serde_json::from_slice(&exported.bytes).unwrap();
    assert_eq!(json["rows"].as_array().unwrap().len(), 3);
    assert_eq!(json["summary"]["balance"], 1900.0);
}

#[test]
fn water_day_progress_and_reset() {
    let conn = open_db_in_memory().unwrap();
    let clock = Arc::new(FixedClock::new(NOW));
    let service = WaterService::new(
        SqliteRepository::try_with_clock(&conn, clock.clone()).unwrap(),
        clock.clone(),
        utc(),
        WaterDefaults::default(),
    );

    let today = service.today().unwrap();
    assert_eq!(today.target_glasses, 8);
    assert_eq!(today.glasses_drunk, 0);
    assert_eq!(service.today().unwrap().meta.id, today.meta.id);

    for _ in 0..4 {
        service.add_glass().unwrap();
    }
    assert_eq!(service.progress().unwrap(), 50.0);
    assert_eq!(
        service.state().snapshot().items[0].last_drink_at,
        Some(NOW)
    );

    let reset = service.reset_today().unwrap();
    assert_eq!(reset.glasses_drunk, 0);
    assert_eq!(service.progress().unwrap(), 0.0);

    let floor = service.remove_glass().unwrap();
    assert_eq!(floor.glasses_drunk, 0);
}

#[test]
fn water_settings_survive_midnight() {
    let conn = open_db_in_memory().unwrap();
    let clock = Arc::new(FixedClock::new(NOW));
    let service = WaterService::new(
        SqliteRepository::try_with_clock(&conn, clock.clone()).unwrap(),
        clock.clone(),
        utc(),
        WaterDefaults::default(),
    );

    service
        .update_settings(12, ReminderInterval::hours(3))
        .unwrap();
    clock.advance_ms(DAY_MS);

    let next_day = service.today().unwrap();
    assert_eq!(next_day.target_glasses, 12);
    assert_eq!(next_day.interval.as_minutes(), 180);
    assert_eq!(service.progress().unwrap(), 0.0);
}

#[test]
fn water_settings_and_weekly_average() {
    let conn = open_db_in_memory().unwrap();
    let day_start = start_of_day_ms(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(), &utc());
    let clock = Arc::new(FixedClock::new(day_start + HOUR_MS));
    let service = WaterService::new(
        SqliteRepository::try_with_clock(&conn, clock.clone()).unwrap(),
        clock.clone(),
        utc(),
        WaterDefaults {
            target_glasses: 4,
            interval: ReminderInterval::minutes(45),
        },
    );

    let updated = service
        .update_settings(2, ReminderInterval::hours(2))
        .unwrap();
    assert_eq!(updated.target_glasses, 2);
    assert_eq!(updated.interval.as_minutes(), 120);
    service.add_glass().unwrap();
    service.add_glass().unwrap();

    let last_glass_at = day_start + HOUR_MS;

    clock.advance_ms(Duration::days(1).num_milliseconds());
    let day_two = service.today().unwrap();
    assert_ne!(day_two.meta.id, updated.meta.id);
    assert_eq!(day_two.target_glasses, 2);
    assert_eq!(day_two.interval.as_minutes(), 120);
    assert_eq!(day_two.glasses_drunk, 0);
    assert_eq!(day_two.last_drink_at, Some(last_glass_at));
    service.add_glass().unwrap();

    // Day one 2/2, day two 1/2, five empty days.
    let average = service.weekly_average().unwrap();
    assert!((average - 1.5 / 7.0).abs() < 1e-9);

    assert!(matches!(
        service.update_settings(0, ReminderInterval::minutes(30)).unwrap_err(),
        ServiceError::Validation(_)
    ));
}

struct ScriptedProvider {
    calls: AtomicUsize,
    requests: Mutex<Vec<AssistantRequest>>,
}

impl ScriptedProvider {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl AssistantProvider for ScriptedProvider {
    fn provider_id(&self) -> &str {
        "scripted"
    }

    fn complete(&self, request: &AssistantRequest) -> AssistantResult<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if request.prompt.contains("fail") {
            return Err(AssistantError::new("scripted", "quota", "quota exceeded", true));
        }
        Ok(format!("reply {call}"))
    }
}

fn assistant_with(
    provider: Arc<ScriptedProvider>,
) -> (rusqlite::Connection, AssistantRegistry) {
    let conn = open_db_in_memory().unwrap();
    let mut registry = AssistantRegistry::new();
    registry.register(provider).unwrap();
    (conn, registry)
}

#[test]
fn assistant_rejects_blank_input_before_calling_provider() {
    let provider = Arc::new(ScriptedProvider::new());
    let (conn, registry) = assistant_with(provider.clone());
    let service = AssistantService::new(SqliteRepository::try_new(&conn).unwrap(), registry);

    assert!(matches!(
        service.summarize("  ").unwrap_err(),
        ServiceError::Validation(_)
    ));
    assert!(matches!(
        service.translate("hello", " ").unwrap_err(),
        ServiceError::Validation(_)
    ));
    assert!(matches!(
        service.chat("\n").unwrap_err(),
        ServiceError::Validation(_)
    ));
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn assistant_one_shot_tasks_render_prompts() {
    let provider = Arc::new(ScriptedProvider::new());
    let (conn, registry) = assistant_with(provider.clone());
    let service = AssistantService::new(SqliteRepository::try_new(&conn).unwrap(), registry);

    assert_eq!(service.translate("selamat pagi", "English").unwrap(), "reply 0");
    let requests = provider.requests.lock().unwrap();
    assert!(matches!(
        &requests[0].task,
        AssistantTask::Translate { target_language } if target_language == "English"
    ));
    assert!(requests[0].prompt.contains("selamat pagi"));
    assert!(requests[0].history.is_empty());
}

#[test]
fn assistant_chat_persists_and_replays_history() {
    let provider = Arc::new(ScriptedProvider::new());
    let (conn, registry) = assistant_with(provider.clone());
    let service = AssistantService::new(SqliteRepository::try_new(&conn).unwrap(), registry);

    let first = service.chat("plan my week").unwrap();
    assert_eq!(first.role, ChatRole::Assistant);
    service.chat("add gym on monday").unwrap();

    let history = service.history().unwrap();
    let roles = history.iter().map(|m| m.role).collect::<Vec<_>>();
    assert_eq!(
        roles,
        vec![
            ChatRole::User,
            ChatRole::Assistant,
            ChatRole::User,
            ChatRole::Assistant
        ]
    );
    let second_request = provider.requests.lock().unwrap()[1].clone();
    assert_eq!(second_request.history.len(), 2);
    assert_eq!(second_request.history[0].content, "plan my week");

    let err = service.chat("please fail").unwrap_err();
    assert!(matches!(err, ServiceError::Provider(ref e) if e.code == "quota"));
    assert_eq!(service.history().unwrap().len(), 4);
    assert!(service.state().snapshot().error.is_some());

    assert_eq!(service.clear_history().unwrap(), 4);
    assert!(service.history().unwrap().is_empty());
    assert!(service.state().snapshot().items.is_empty());
}

#[test]
fn assistant_without_provider_reports_not_selected() {
    let conn = open_db_in_memory().unwrap();
    let service = AssistantService::new(
        SqliteRepository::try_new(&conn).unwrap(),
        AssistantRegistry::new(),
    );
    let err = service.paraphrase("tidy this sentence").unwrap_err();
    assert!(matches!(err, ServiceError::Provider(ref e) if e.code == "provider_not_selected"));
}
