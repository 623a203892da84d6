//! Day-record lifecycle for the water table.
//!
//! # Responsibility
//! - Resolve the record for a calendar day, creating it on first access.
//! - Stamp reminder bookkeeping without rewriting user-owned columns.
//!
//! # Invariants
//! - A created day is seeded from the latest stored day, so user settings
//!   survive midnight; defaults apply only to an empty table.
//! - Two writers racing to create the same day both end up with the stored
//!   row (`day` is unique).

use crate::model::water::{WaterDefaults, WaterIntake};
use crate::model::RecordId;
use crate::repo::record_repo::{RecordQuery, RepoError, RepoResult, Repository};
use crate::repo::tables::day_to_db;
use chrono::NaiveDate;
use log::{info, warn};
use rusqlite::Connection;

/// Record stored for `day`, if any.
pub fn find_water_day<R: Repository<WaterIntake>>(
    repo: &R,
    day: NaiveDate,
) -> RepoResult<Option<WaterIntake>> {
    let query = RecordQuery::all().eq("day", day_to_db(day)).limit(1);
    Ok(repo.list(&query)?.into_iter().next())
}

/// Record for `day`, created from the latest stored day when missing.
pub fn open_water_day<R: Repository<WaterIntake>>(
    repo: &R,
    day: NaiveDate,
    defaults: WaterDefaults,
) -> RepoResult<WaterIntake> {
    if let Some(record) = find_water_day(repo, day)? {
        return Ok(record);
    }

    let latest = match repo.scan(&RecordQuery::all().limit(1))?.into_iter().next() {
        Some(Ok(previous)) => Some(previous),
        Some(Err(err)) => {
            warn!("event=water_day_seed module=repo status=error day={day} error={err}");
            None
        }
        None => None,
    };
    let mut record = match latest.as_ref() {
        Some(previous) => WaterIntake::carried_over(previous, day),
        None => WaterIntake::new(day, defaults.target_glasses, defaults.interval),
    };

    match repo.insert(&mut record) {
        Ok(_) => {
            info!(
                "event=water_day_create module=repo status=ok day={day} seeded_from={} target={} interval_min={}",
                if latest.is_some() { "previous_day" } else { "defaults" },
                record.target_glasses,
                record.interval.as_minutes()
            );
            Ok(record)
        }
        Err(err @ RepoError::Db(_)) => find_water_day(repo, day)?.ok_or(err),
        Err(err) => Err(err),
    }
}

/// Sets `last_reminded_at` (and `updated_at`) on one record, leaving the
/// counters a concurrent writer may have changed untouched.
pub fn stamp_water_reminded(conn: &Connection, id: RecordId, now_ms: i64) -> RepoResult<()> {
    let changed = conn.execute(
        "UPDATE water_intake SET last_reminded_at = ?1, updated_at = ?1 WHERE id = ?2;",
        rusqlite::params![now_ms, id.to_string()],
    )?;
    if changed == 0 {
        return Err(RepoError::NotFound(id));
    }
    Ok(())
}
