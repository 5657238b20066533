use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use log::debug;
use std::sync::Arc;

use super::model::{AdminStateDB, NewAdminStateDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::admin_state::dsl as admin_state_dsl;
use bandwatch_core::admin::{AdminState, AdminStore};
use bandwatch_core::Result;

pub struct AdminRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl AdminRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

/// Collapses the run-state table back to exactly one row and returns it.
///
/// A fresh database has zero rows; anything other than one row is replaced
/// with a single blank row. Every read and write path passes through here
/// first.
fn ensure_single_row(
    conn: &mut SqliteConnection,
) -> std::result::Result<AdminStateDB, StorageError> {
    let mut rows = admin_state_dsl::admin_state
        .select(AdminStateDB::as_select())
        .load::<AdminStateDB>(conn)?;

    if rows.len() == 1 {
        return Ok(rows.remove(0));
    }

    debug!(
        "Run-state table holds {} rows, resetting to a single blank row",
        rows.len()
    );
    diesel::delete(admin_state_dsl::admin_state).execute(conn)?;
    diesel::insert_into(admin_state_dsl::admin_state)
        .values(&NewAdminStateDB::default())
        .execute(conn)?;

    admin_state_dsl::admin_state
        .select(AdminStateDB::as_select())
        .first::<AdminStateDB>(conn)
        .map_err(StorageError::from)
}

#[async_trait]
impl AdminStore for AdminRepository {
    // =========================================================================
    // Reads
    // =========================================================================

    fn state(&self) -> Result<AdminState> {
        let mut conn = get_connection(&self.pool)?;
        let row = ensure_single_row(&mut conn)?;
        Ok(AdminState::from(row))
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    async fn set_last_weekly_update(&self, date: NaiveDate) -> Result<()> {
        let date_str = date.format("%Y-%m-%d").to_string();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                ensure_single_row(conn)?;
                diesel::update(admin_state_dsl::admin_state)
                    .set(admin_state_dsl::last_weekly_update.eq(&date_str))
                    .execute(conn)
                    .map_err(|e| StorageError::QueryFailed(e))?;
                Ok(())
            })
            .await
    }

    async fn set_last_groom_run(&self, date: NaiveDate) -> Result<()> {
        let date_str = date.format("%Y-%m-%d").to_string();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                ensure_single_row(conn)?;
                diesel::update(admin_state_dsl::admin_state)
                    .set(admin_state_dsl::last_groom_run.eq(&date_str))
                    .execute(conn)
                    .map_err(|e| StorageError::QueryFailed(e))?;
                Ok(())
            })
            .await
    }

    async fn rewind_weekly_update(&self, today: NaiveDate) -> Result<()> {
        let today_str = today.format("%Y-%m-%d").to_string();
        let rewound_str = (today - Duration::days(7)).format("%Y-%m-%d").to_string();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                ensure_single_row(conn)?;
                diesel::update(
                    admin_state_dsl::admin_state
                        .filter(admin_state_dsl::last_weekly_update.eq(&today_str)),
                )
                .set(admin_state_dsl::last_weekly_update.eq(&rewound_str))
                .execute(conn)
                .map_err(|e| StorageError::QueryFailed(e))?;
                Ok(())
            })
            .await
    }
}
