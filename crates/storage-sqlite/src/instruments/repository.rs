use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use super::model::{InstrumentDB, InstrumentUpdateDB, NewInstrumentDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::instruments::dsl as instruments_dsl;
use bandwatch_core::instruments::{Instrument, InstrumentStore, InstrumentUpdate, WatchEntry};
use bandwatch_core::Result;

pub struct InstrumentRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl InstrumentRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl InstrumentStore for InstrumentRepository {
    // =========================================================================
    // Reads
    // =========================================================================

    fn all(&self) -> Result<Vec<Instrument>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = instruments_dsl::instruments
            .order(instruments_dsl::symbol.asc())
            .select(InstrumentDB::as_select())
            .load::<InstrumentDB>(&mut conn)
            .into_core()?;

        Ok(rows.into_iter().map(Instrument::from).collect())
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    async fn insert(&self, entry: &WatchEntry) -> Result<bool> {
        let new_row = NewInstrumentDB::from(entry);
        let symbol = entry.symbol.clone();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<bool> {
                let existing: i64 = instruments_dsl::instruments
                    .filter(instruments_dsl::symbol.eq(&symbol))
                    .count()
                    .get_result(conn)
                    .map_err(|e| StorageError::QueryFailed(e))?;
                if existing > 0 {
                    return Ok(false);
                }

                diesel::insert_into(instruments_dsl::instruments)
                    .values(&new_row)
                    .execute(conn)
                    .map_err(|e| StorageError::QueryFailed(e))?;
                Ok(true)
            })
            .await
    }

    async fn apply_update(&self, instrument_id: i64, update: &InstrumentUpdate) -> Result<()> {
        if update.is_empty() {
            return Ok(());
        }
        let changes = InstrumentUpdateDB::from(update);

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::update(instruments_dsl::instruments.find(instrument_id))
                    .set(&changes)
                    .execute(conn)
                    .map_err(|e| StorageError::QueryFailed(e))?;
                Ok(())
            })
            .await
    }

    async fn delete(&self, instrument_id: i64) -> Result<()> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::delete(instruments_dsl::instruments.find(instrument_id))
                    .execute(conn)
                    .map_err(|e| StorageError::QueryFailed(e))?;
                Ok(())
            })
            .await
    }

    async fn mark_history_downloaded(&self, instrument_id: i64) -> Result<()> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::update(instruments_dsl::instruments.find(instrument_id))
                    .set(instruments_dsl::full_history_downloaded.eq(true))
                    .execute(conn)
                    .map_err(|e| StorageError::QueryFailed(e))?;
                Ok(())
            })
            .await
    }

    async fn rewind_price_dates(&self, today: NaiveDate) -> Result<usize> {
        let today_str = today.format("%Y-%m-%d").to_string();
        let yesterday_str = (today - Duration::days(1)).format("%Y-%m-%d").to_string();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let count = diesel::update(
                    instruments_dsl::instruments
                        .filter(instruments_dsl::current_price_date.eq(&today_str)),
                )
                .set(instruments_dsl::current_price_date.eq(&yesterday_str))
                .execute(conn)
                .map_err(|e| StorageError::QueryFailed(e))?;
                Ok(count)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, run_migrations, write_actor::spawn_writer};
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    async fn create_test_repository() -> (InstrumentRepository, tempfile::TempDir) {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");
        let db_path_str = db_path.to_string_lossy().to_string();

        let pool = create_pool(&db_path_str).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");

        let writer = spawn_writer((*pool).clone());
        let repo = InstrumentRepository::new(Arc::clone(&pool), writer);
        (repo, temp_dir)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_insert_seeds_a_blank_row() {
        let (repo, _temp_dir) = create_test_repository().await;

        let entry = WatchEntry::new("Acme Corp", "ACME", dec!(10), dec!(12));
        let inserted = repo.insert(&entry).await.expect("Failed to insert");
        assert!(inserted);

        let all = repo.all().expect("Failed to load instruments");
        assert_eq!(all.len(), 1);
        let instrument = &all[0];
        assert!(instrument.id > 0);
        assert_eq!(instrument.symbol, "ACME");
        assert_eq!(instrument.buy_price, dec!(10));
        assert_eq!(instrument.current_price, dec!(0));
        assert_eq!(instrument.current_price_date, None);
        assert!(!instrument.full_history_downloaded);
    }

    #[tokio::test]
    async fn test_insert_skips_existing_symbol() {
        let (repo, _temp_dir) = create_test_repository().await;

        let entry = WatchEntry::new("Acme Corp", "ACME", dec!(10), dec!(12));
        assert!(repo.insert(&entry).await.expect("Failed to insert"));

        let again = WatchEntry::new("Acme Renamed", "ACME", dec!(11), dec!(13));
        let inserted = repo.insert(&again).await.expect("Failed to re-insert");
        assert!(!inserted, "Second insert for the same symbol must be a no-op");

        let all = repo.all().expect("Failed to load instruments");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Acme Corp");
    }

    #[tokio::test]
    async fn test_apply_update_touches_only_set_fields() {
        let (repo, _temp_dir) = create_test_repository().await;

        let entry = WatchEntry::new("Acme Corp", "ACME", dec!(10), dec!(12));
        repo.insert(&entry).await.expect("Failed to insert");
        let id = repo.all().expect("Failed to load")[0].id;

        let update = InstrumentUpdate {
            current_price: Some(dec!(11.25)),
            current_price_date: Some(date(2023, 6, 15)),
            ..Default::default()
        };
        repo.apply_update(id, &update)
            .await
            .expect("Failed to apply update");

        let instrument = repo.all().expect("Failed to load")[0].clone();
        assert_eq!(instrument.current_price, dec!(11.25));
        assert_eq!(instrument.current_price_date, Some(date(2023, 6, 15)));
        assert_eq!(instrument.name, "Acme Corp", "Name must stay untouched");
        assert_eq!(instrument.buy_price, dec!(10));
    }

    #[tokio::test]
    async fn test_mark_history_downloaded_flips_the_flag() {
        let (repo, _temp_dir) = create_test_repository().await;

        let entry = WatchEntry::new("Acme Corp", "ACME", dec!(10), dec!(12));
        repo.insert(&entry).await.expect("Failed to insert");
        let id = repo.all().expect("Failed to load")[0].id;

        repo.mark_history_downloaded(id)
            .await
            .expect("Failed to mark");

        assert!(repo.all().expect("Failed to load")[0].full_history_downloaded);
    }

    #[tokio::test]
    async fn test_rewind_moves_only_cursors_stamped_today() {
        let (repo, _temp_dir) = create_test_repository().await;
        let today = date(2023, 6, 15);

        for symbol in ["ACME", "GLOBEX"] {
            let entry = WatchEntry::new(format!("{symbol} Inc"), symbol, dec!(10), dec!(12));
            repo.insert(&entry).await.expect("Failed to insert");
        }
        let all = repo.all().expect("Failed to load");
        let stamped_today = all.iter().find(|i| i.symbol == "ACME").unwrap().id;
        let stamped_before = all.iter().find(|i| i.symbol == "GLOBEX").unwrap().id;

        let stamp = |d: NaiveDate| InstrumentUpdate {
            current_price_date: Some(d),
            ..Default::default()
        };
        repo.apply_update(stamped_today, &stamp(today))
            .await
            .expect("Failed to stamp");
        repo.apply_update(stamped_before, &stamp(date(2023, 6, 12)))
            .await
            .expect("Failed to stamp");

        let moved = repo.rewind_price_dates(today).await.expect("Failed to rewind");
        assert_eq!(moved, 1);

        let all = repo.all().expect("Failed to load");
        let acme = all.iter().find(|i| i.symbol == "ACME").unwrap();
        let globex = all.iter().find(|i| i.symbol == "GLOBEX").unwrap();
        assert_eq!(acme.current_price_date, Some(date(2023, 6, 14)));
        assert_eq!(globex.current_price_date, Some(date(2023, 6, 12)));
    }

    #[tokio::test]
    async fn test_delete_removes_the_row() {
        let (repo, _temp_dir) = create_test_repository().await;

        let entry = WatchEntry::new("Acme Corp", "ACME", dec!(10), dec!(12));
        repo.insert(&entry).await.expect("Failed to insert");
        let id = repo.all().expect("Failed to load")[0].id;

        repo.delete(id).await.expect("Failed to delete");
        assert!(repo.all().expect("Failed to load").is_empty());
    }
}
