//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Translate core records into flat DTOs with string ids.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every DB-backed call opens its own connection and returns an envelope
//!   with `ok` + `message` instead of an error type.

use hearth_core::cipher;
use hearth_core::model::note::Note;
use hearth_core::model::savings::SavingsGoal;
use hearth_core::model::task::{Task, TaskPriority};
use hearth_core::model::transaction::{Transaction, TransactionKind};
use hearth_core::model::water::{IntervalUnit, ReminderInterval, WaterIntake};
use hearth_core::progress::progress_percent;
use hearth_core::reminder::Notification;
use hearth_core::repo::record_repo::Record;
use hearth_core::service::{
    ExpenseFilter, ExpenseService, NoteService, SavingsProgress, SavingsService, TaskFilter,
    TaskService, WaterDefaults, WaterService,
};
use hearth_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, open_db,
    ping as ping_inner, system_clock, CollectingSink, CoreConfig, JsonReportExporter, RecordId,
    ReminderJob, ReminderWorker, SqliteRepository, TimeRange,
};
use log::warn;
use rusqlite::Connection;
use std::sync::{Arc, OnceLock};
use uuid::Uuid;

const SEARCH_DEFAULT_LIMIT: u32 = 20;
const SEARCH_LIMIT_MAX: u32 = 50;
static CONFIG: OnceLock<CoreConfig> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Reconfiguration attempts with different level or directory return error.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// Id of the created or affected record.
    pub id: Option<String>,
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, id: RecordId) -> Self {
        Self {
            ok: true,
            id: Some(id.to_string()),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }

    fn from_result(operation: &str, done: &str, result: Result<RecordId, String>) -> Self {
        match result {
            Ok(id) => Self::success(done, id),
            Err(err) => Self::failure(format!("{operation} failed: {err}")),
        }
    }
}

/// List response envelope; `items` is empty on failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ListResponse<T> {
    pub ok: bool,
    pub items: Vec<T>,
    pub message: String,
}

impl<T> ListResponse<T> {
    fn from_result(operation: &str, result: Result<Vec<T>, String>) -> Self {
        match result {
            Ok(items) => Self {
                ok: true,
                message: format!("{} item(s).", items.len()),
                items,
            },
            Err(err) => Self {
                ok: false,
                items: Vec::new(),
                message: format!("{operation} failed: {err}"),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub due_at: Option<i64>,
    /// `low|medium|high`.
    pub priority: String,
    pub completed: bool,
    pub daily_reminder: bool,
    pub reminder_lead_days: u32,
    pub updated_at: i64,
}

impl From<Task> for TaskItem {
    fn from(task: Task) -> Self {
        Self {
            id: task.meta.id.to_string(),
            priority: task.priority.as_str().to_string(),
            title: task.title,
            description: task.description,
            due_at: task.due_at,
            completed: task.completed,
            daily_reminder: task.daily_reminder,
            reminder_lead_days: task.reminder_lead_days,
            updated_at: task.meta.updated_at,
        }
    }
}

/// Creates a task.
///
/// `priority` accepts `low|medium|high`; blank means `medium`.
#[flutter_rust_bridge::frb(sync)]
pub fn task_add(
    title: String,
    description: String,
    due_at: Option<i64>,
    priority: String,
    daily_reminder: bool,
    reminder_lead_days: Option<u32>,
) -> ActionResponse {
    let result = parse_priority(&priority).and_then(|priority| {
        with_conn(|conn, config| {
            let service = task_service(conn, config)?;
            let mut task = service.draft(title.trim());
            task.description = description.trim().to_string();
            task.due_at = due_at;
            task.priority = priority;
            task.daily_reminder = daily_reminder;
            if let Some(days) = reminder_lead_days {
                task.reminder_lead_days = days;
            }
            service
                .add(task)
                .map(|task| task.meta.id)
                .map_err(|err| err.to_string())
        })
    });
    ActionResponse::from_result("task_add", "Task created.", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn task_toggle(id: String) -> ActionResponse {
    let result = parse_id(&id).and_then(|id| {
        with_conn(|conn, config| {
            task_service(conn, config)?
                .toggle_complete(id)
                .map(|task| task.meta.id)
                .map_err(|err| err.to_string())
        })
    });
    ActionResponse::from_result("task_toggle", "Task updated.", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn task_delete(id: String) -> ActionResponse {
    let result = parse_id(&id).and_then(|id| {
        with_conn(|conn, config| {
            task_service(conn, config)?
                .delete(id)
                .map(|()| id)
                .map_err(|err| err.to_string())
        })
    });
    ActionResponse::from_result("task_delete", "Task deleted.", result)
}

/// Lists tasks; `filter` is `all|active|completed` (blank means `all`).
#[flutter_rust_bridge::frb(sync)]
pub fn task_list(filter: String) -> ListResponse<TaskItem> {
    let result = parse_task_filter(&filter).and_then(|filter| {
        with_conn(|conn, config| {
            task_service(conn, config)?
                .list(filter)
                .map_err(|err| err.to_string())
        })
    });
    ListResponse::from_result("task_list", result.map(into_items))
}

#[flutter_rust_bridge::frb(sync)]
pub fn task_search(text: String) -> ListResponse<TaskItem> {
    let result = with_conn(|conn, config| {
        task_service(conn, config)?
            .search(&text)
            .map_err(|err| err.to_string())
    });
    ListResponse::from_result("task_search", result.map(into_items))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub id: String,
    pub title: String,
    pub content: String,
    pub preview_text: Option<String>,
    pub preview_image: Option<String>,
    pub updated_at: i64,
}

impl From<Note> for NoteItem {
    fn from(note: Note) -> Self {
        Self {
            id: note.meta.id.to_string(),
            title: note.title,
            content: note.content,
            preview_text: note.preview_text,
            preview_image: note.preview_image,
            updated_at: note.meta.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSearchItem {
    pub id: String,
    pub title: String,
    pub snippet: String,
}

#[flutter_rust_bridge::frb(sync)]
pub fn note_create(title: String, content: String) -> ActionResponse {
    let result = with_conn(|conn, _| {
        note_service(conn)?
            .create(title.trim(), content)
            .map(|note| note.meta.id)
            .map_err(|err| err.to_string())
    });
    ActionResponse::from_result("note_create", "Note created.", result)
}

/// Replaces a note's title and content.
#[flutter_rust_bridge::frb(sync)]
pub fn note_update(id: String, title: String, content: String) -> ActionResponse {
    let result = parse_id(&id).and_then(|id| {
        with_conn(|conn, _| {
            note_service(conn)?
                .update(id, title.trim(), content)
                .map(|note| note.meta.id)
                .map_err(|err| err.to_string())
        })
    });
    ActionResponse::from_result("note_update", "Note updated.", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn note_delete(id: String) -> ActionResponse {
    let result = parse_id(&id).and_then(|id| {
        with_conn(|conn, _| {
            note_service(conn)?
                .delete(id)
                .map(|()| id)
                .map_err(|err| err.to_string())
        })
    });
    ActionResponse::from_result("note_delete", "Note deleted.", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn note_list() -> ListResponse<NoteItem> {
    let result = with_conn(|conn, _| note_service(conn)?.list().map_err(|err| err.to_string()));
    ListResponse::from_result("note_list", result.map(into_items))
}

/// Keyword search over notes; `limit` is clamped to `1..=50` (default 20).
#[flutter_rust_bridge::frb(sync)]
pub fn note_search(text: String, limit: Option<u32>) -> ListResponse<NoteSearchItem> {
    let limit = normalize_search_limit(limit);
    let result = with_conn(|conn, _| {
        note_service(conn)?
            .search(&text, limit)
            .map_err(|err| err.to_string())
    });
    let items = result.map(|hits| {
        hits.into_iter()
            .map(|hit| NoteSearchItem {
                id: hit.note_id.to_string(),
                title: hit.title,
                snippet: hit.snippet,
            })
            .collect()
    });
    ListResponse::from_result("note_search", items)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SavingsItem {
    pub id: String,
    pub name: String,
    pub target_amount: f64,
    pub saved_amount: f64,
    pub daily_saving: f64,
    pub deadline_at: Option<i64>,
    pub percent: f64,
    pub remaining: f64,
    pub estimated_days: u64,
    pub reached: bool,
}

impl From<SavingsGoal> for SavingsItem {
    fn from(goal: SavingsGoal) -> Self {
        let progress = SavingsProgress::of(&goal);
        Self {
            id: goal.meta.id.to_string(),
            name: goal.name,
            target_amount: goal.target_amount,
            saved_amount: goal.saved_amount,
            daily_saving: goal.daily_saving,
            deadline_at: goal.deadline_at,
            percent: progress.percent,
            remaining: progress.remaining,
            estimated_days: progress.estimated_days,
            reached: progress.reached,
        }
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn savings_create(
    name: String,
    target_amount: f64,
    daily_saving: f64,
    deadline_at: Option<i64>,
) -> ActionResponse {
    let result = with_conn(|conn, _| {
        let mut goal = SavingsGoal::new(name.trim(), target_amount);
        goal.daily_saving = daily_saving;
        goal.deadline_at = deadline_at;
        savings_service(conn)?
            .create(goal)
            .map(|goal| goal.meta.id)
            .map_err(|err| err.to_string())
    });
    ActionResponse::from_result("savings_create", "Goal created.", result)
}

/// Adds a strictly positive deposit to a goal.
#[flutter_rust_bridge::frb(sync)]
pub fn savings_add(id: String, amount: f64) -> ActionResponse {
    let result = parse_id(&id).and_then(|id| {
        with_conn(|conn, _| {
            savings_service(conn)?
                .add_savings(id, amount)
                .map(|goal| goal.meta.id)
                .map_err(|err| err.to_string())
        })
    });
    ActionResponse::from_result("savings_add", "Savings added.", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn savings_delete(id: String) -> ActionResponse {
    let result = parse_id(&id).and_then(|id| {
        with_conn(|conn, _| {
            savings_service(conn)?
                .delete(id)
                .map(|()| id)
                .map_err(|err| err.to_string())
        })
    });
    ActionResponse::from_result("savings_delete", "Goal deleted.", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn savings_list() -> ListResponse<SavingsItem> {
    let result = with_conn(|conn, _| savings_service(conn)?.list().map_err(|err| err.to_string()));
    ListResponse::from_result("savings_list", result.map(into_items))
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionItem {
    pub id: String,
    /// `income|expense`.
    pub kind: String,
    pub category: String,
    pub amount: f64,
    pub memo: String,
    pub occurred_at: i64,
}

impl From<Transaction> for TransactionItem {
    fn from(transaction: Transaction) -> Self {
        Self {
            id: transaction.meta.id.to_string(),
            kind: transaction.kind.as_str().to_string(),
            category: transaction.category,
            amount: transaction.amount,
            memo: transaction.memo,
            occurred_at: transaction.occurred_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseSummaryResponse {
    pub ok: bool,
    pub total_income: f64,
    pub total_expense: f64,
    pub balance: f64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResponse {
    pub ok: bool,
    pub file_name: String,
    /// UTF-8 JSON document; empty on failure.
    pub content: String,
    pub message: String,
}

#[flutter_rust_bridge::frb(sync)]
pub fn expense_add(
    kind: String,
    category: String,
    amount: f64,
    memo: String,
    occurred_at: i64,
) -> ActionResponse {
    let result = parse_kind(&kind).and_then(|kind| {
        with_conn(|conn, _| {
            let mut transaction = Transaction::new(kind, category, amount, occurred_at);
            transaction.memo = memo.trim().to_string();
            expense_service(conn)?
                .add(transaction)
                .map(|transaction| transaction.meta.id)
                .map_err(|err| err.to_string())
        })
    });
    ActionResponse::from_result("expense_add", "Transaction recorded.", result)
}

#[flutter_rust_bridge::frb(sync)]
pub fn expense_delete(id: String) -> ActionResponse {
    let result = parse_id(&id).and_then(|id| {
        with_conn(|conn, _| {
            expense_service(conn)?
                .delete(id)
                .map(|()| id)
                .map_err(|err| err.to_string())
        })
    });
    ActionResponse::from_result("expense_delete", "Transaction deleted.", result)
}

/// Lists transactions in `[start_ms, end_ms)`; blank `kind`/`category` match all.
#[flutter_rust_bridge::frb(sync)]
pub fn expense_list(
    start_ms: Option<i64>,
    end_ms: Option<i64>,
    kind: String,
    category: String,
) -> ListResponse<TransactionItem> {
    let kind = if kind.trim().is_empty() {
        Ok(None)
    } else {
        parse_kind(&kind).map(Some)
    };
    let result = kind.and_then(|kind| {
        with_conn(|conn, _| {
            let filter = ExpenseFilter {
                range: to_range(start_ms, end_ms),
                kind,
                category: Some(category.clone()),
            };
            expense_service(conn)?
                .list(filter)
                .map_err(|err| err.to_string())
        })
    });
    ListResponse::from_result("expense_list", result.map(into_items))
}

#[flutter_rust_bridge::frb(sync)]
pub fn expense_summary(start_ms: Option<i64>, end_ms: Option<i64>) -> ExpenseSummaryResponse {
    let result = with_conn(|conn, _| {
        expense_service(conn)?
            .summary(to_range(start_ms, end_ms))
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(summary) => ExpenseSummaryResponse {
            ok: true,
            total_income: summary.total_income,
            total_expense: summary.total_expense,
            balance: summary.balance,
            message: String::new(),
        },
        Err(err) => ExpenseSummaryResponse {
            ok: false,
            total_income: 0.0,
            total_expense: 0.0,
            balance: 0.0,
            message: format!("expense_summary failed: {err}"),
        },
    }
}

/// Renders a JSON report; PDF rendering stays on the host.
#[flutter_rust_bridge::frb(sync)]
pub fn expense_export_json(start_ms: Option<i64>, end_ms: Option<i64>) -> ExportResponse {
    let result = with_conn(|conn, _| {
        let exporter = JsonReportExporter { pretty: true };
        let report = expense_service(conn)?
            .export(to_range(start_ms, end_ms), &exporter)
            .map_err(|err| err.to_string())?;
        let content = String::from_utf8(report.bytes).map_err(|err| err.to_string())?;
        Ok((report.file_name, content))
    });
    match result {
        Ok((file_name, content)) => ExportResponse {
            ok: true,
            file_name,
            content,
            message: "Report exported.".to_string(),
        },
        Err(err) => ExportResponse {
            ok: false,
            file_name: String::new(),
            content: String::new(),
            message: format!("expense_export_json failed: {err}"),
        },
    }
}

/// Today's water state.
#[derive(Debug, Clone, PartialEq)]
pub struct WaterResponse {
    pub ok: bool,
    pub day: String,
    pub target_glasses: u32,
    pub glasses_drunk: u32,
    pub interval_value: u32,
    /// `minutes|hours`.
    pub interval_unit: String,
    pub percent: f64,
    pub message: String,
}

impl WaterResponse {
    fn from_result(operation: &str, result: Result<WaterIntake, String>) -> Self {
        match result {
            Ok(record) => Self {
                ok: true,
                day: record.day.to_string(),
                target_glasses: record.target_glasses,
                glasses_drunk: record.glasses_drunk,
                interval_value: record.interval.value,
                interval_unit: record.interval.unit.as_str().to_string(),
                percent: progress_percent(
                    f64::from(record.glasses_drunk),
                    f64::from(record.target_glasses),
                ),
                message: String::new(),
            },
            Err(err) => Self {
                ok: false,
                day: String::new(),
                target_glasses: 0,
                glasses_drunk: 0,
                interval_value: 0,
                interval_unit: String::new(),
                percent: 0.0,
                message: format!("{operation} failed: {err}"),
            },
        }
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn water_today() -> WaterResponse {
    water_call("water_today", |service| service.today())
}

#[flutter_rust_bridge::frb(sync)]
pub fn water_add_glass() -> WaterResponse {
    water_call("water_add_glass", |service| service.add_glass())
}

#[flutter_rust_bridge::frb(sync)]
pub fn water_remove_glass() -> WaterResponse {
    water_call("water_remove_glass", |service| service.remove_glass())
}

#[flutter_rust_bridge::frb(sync)]
pub fn water_reset() -> WaterResponse {
    water_call("water_reset", |service| service.reset_today())
}

/// Updates today's target and reminder interval (`minutes|hours`).
#[flutter_rust_bridge::frb(sync)]
pub fn water_update_settings(
    target_glasses: u32,
    interval_value: u32,
    interval_unit: String,
) -> WaterResponse {
    let unit = match IntervalUnit::parse(interval_unit.trim()) {
        Some(unit) => unit,
        None => {
            return WaterResponse::from_result(
                "water_update_settings",
                Err(format!("unknown interval unit `{interval_unit}`")),
            )
        }
    };
    water_call("water_update_settings", |service| {
        service.update_settings(
            target_glasses,
            ReminderInterval {
                value: interval_value,
                unit,
            },
        )
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn cipher_encrypt(text: String, key: i32) -> String {
    cipher::encrypt(&text, key)
}

#[flutter_rust_bridge::frb(sync)]
pub fn cipher_decrypt(text: String, key: i32) -> String {
    cipher::decrypt(&text, key)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationItem {
    /// Platform notification id; replaces an earlier one with the same id.
    pub id: u32,
    pub category: String,
    pub title: String,
    pub body: String,
    pub deep_link: Option<String>,
}

impl From<Notification> for NotificationItem {
    fn from(notification: Notification) -> Self {
        Self {
            id: notification.id.0,
            category: notification.category.as_str().to_string(),
            title: notification.title,
            body: notification.body,
            deep_link: notification.deep_link,
        }
    }
}

/// Result of one host-triggered reminder pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderRunResponse {
    pub ok: bool,
    /// Host scheduler should retry sooner when true.
    pub retry: bool,
    pub notifications: Vec<NotificationItem>,
    pub failed_items: u32,
    pub message: String,
}

/// Runs one reminder job and returns the notifications the host must show.
///
/// `job` accepts `water|task_daily|task_due|savings|transaction` with or
/// without the `_reminder` suffix.
#[flutter_rust_bridge::frb(sync)]
pub fn reminders_run(job: String) -> ReminderRunResponse {
    let Some(job) = ReminderJob::parse(job.trim()) else {
        return ReminderRunResponse {
            ok: false,
            retry: false,
            notifications: Vec::new(),
            failed_items: 0,
            message: format!("unknown reminder job `{}`", job.trim()),
        };
    };

    let sink = Arc::new(CollectingSink::new());
    let result = with_conn(|conn, config| {
        let worker = ReminderWorker::new(sink.clone(), system_clock(), config.local_offset())
            .with_water_defaults(WaterDefaults::from_config(config));
        worker.run(conn, job).map_err(|err| err.to_string())
    });
    match result {
        Ok(report) => ReminderRunResponse {
            ok: true,
            retry: false,
            notifications: sink.take().into_iter().map(NotificationItem::from).collect(),
            failed_items: u32::try_from(report.failures.len()).unwrap_or(u32::MAX),
            message: format!(
                "{} evaluated, {} fired.",
                report.evaluated,
                report.fired.len()
            ),
        },
        Err(err) => ReminderRunResponse {
            ok: false,
            retry: true,
            notifications: Vec::new(),
            failed_items: 0,
            message: format!("reminders_run failed: {err}"),
        },
    }
}

fn config() -> &'static CoreConfig {
    CONFIG.get_or_init(|| {
        CoreConfig::from_env().unwrap_or_else(|err| {
            warn!("event=config_load module=ffi status=error error={err}");
            CoreConfig::default()
        })
    })
}

fn with_conn<T>(
    f: impl FnOnce(&Connection, &CoreConfig) -> Result<T, String>,
) -> Result<T, String> {
    let config = config();
    let conn = open_db(&config.db_path).map_err(|err| format!("DB open failed: {err}"))?;
    f(&conn, config)
}

fn repo<R: Record>(
    conn: &Connection,
) -> Result<SqliteRepository<'_, R>, String> {
    SqliteRepository::try_new(conn).map_err(|err| format!("repo init failed: {err}"))
}

fn task_service<'conn>(
    conn: &'conn Connection,
    config: &CoreConfig,
) -> Result<TaskService<SqliteRepository<'conn, Task>>, String> {
    Ok(
        TaskService::new(repo::<Task>(conn)?, system_clock(), config.local_offset())
            .with_default_lead_days(config.task_default_lead_days),
    )
}

fn note_service(conn: &Connection) -> Result<NoteService<'_>, String> {
    Ok(NoteService::new(repo::<Note>(conn)?))
}

fn savings_service(
    conn: &Connection,
) -> Result<SavingsService<SqliteRepository<'_, SavingsGoal>>, String> {
    Ok(SavingsService::new(repo::<SavingsGoal>(conn)?))
}

fn expense_service(
    conn: &Connection,
) -> Result<ExpenseService<SqliteRepository<'_, Transaction>>, String> {
    Ok(ExpenseService::new(repo::<Transaction>(conn)?, system_clock()))
}

fn water_call(
    operation: &str,
    f: impl FnOnce(
        &WaterService<SqliteRepository<'_, WaterIntake>>,
    ) -> hearth_core::ServiceResult<WaterIntake>,
) -> WaterResponse {
    let result = with_conn(|conn, config| {
        let service = WaterService::new(
            repo::<WaterIntake>(conn)?,
            system_clock(),
            config.local_offset(),
            WaterDefaults::from_config(config),
        );
        f(&service).map_err(|err| err.to_string())
    });
    WaterResponse::from_result(operation, result)
}

fn into_items<S, T: From<S>>(records: Vec<S>) -> Vec<T> {
    records.into_iter().map(T::from).collect()
}

fn parse_id(raw: &str) -> Result<RecordId, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid id `{raw}`"))
}

fn parse_priority(raw: &str) -> Result<TaskPriority, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(TaskPriority::default());
    }
    TaskPriority::parse(&raw.to_ascii_lowercase()).ok_or_else(|| format!("unknown priority `{raw}`"))
}

fn parse_task_filter(raw: &str) -> Result<TaskFilter, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(TaskFilter::All);
    }
    TaskFilter::parse(&raw.to_ascii_lowercase()).ok_or_else(|| format!("unknown filter `{raw}`"))
}

fn parse_kind(raw: &str) -> Result<TransactionKind, String> {
    TransactionKind::parse(&raw.trim().to_ascii_lowercase())
        .ok_or_else(|| format!("unknown transaction kind `{}`", raw.trim()))
}

fn normalize_search_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => SEARCH_DEFAULT_LIMIT,
        Some(value) => value.min(SEARCH_LIMIT_MAX),
    }
}

fn to_range(start_ms: Option<i64>, end_ms: Option<i64>) -> Option<TimeRange> {
    match (start_ms, end_ms) {
        (None, None) => None,
        (start, end) => Some(TimeRange::new(
            start.unwrap_or(i64::MIN),
            end.unwrap_or(i64::MAX),
        )),
    }
}
