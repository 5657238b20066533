//! Database model for the run-state singleton.

use chrono::NaiveDate;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use bandwatch_core::admin::AdminState;

/// Database model for the run-state row.
#[derive(Queryable, Identifiable, Selectable, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[diesel(table_name = crate::schema::admin_state)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct AdminStateDB {
    pub id: i64,
    pub last_weekly_update: Option<String>,
    pub last_groom_run: Option<String>,
}

/// Insert payload for a blank run-state row.
#[derive(Insertable, Debug, Clone, Default)]
#[diesel(table_name = crate::schema::admin_state)]
pub struct NewAdminStateDB {
    pub last_weekly_update: Option<String>,
    pub last_groom_run: Option<String>,
}

impl From<AdminStateDB> for AdminState {
    fn from(db: AdminStateDB) -> Self {
        let parse_date =
            |s: &str| -> Option<NaiveDate> { NaiveDate::parse_from_str(s, "%Y-%m-%d").ok() };

        AdminState {
            last_weekly_update: db.last_weekly_update.as_deref().and_then(parse_date),
            last_groom_run: db.last_groom_run.as_deref().and_then(parse_date),
        }
    }
}
