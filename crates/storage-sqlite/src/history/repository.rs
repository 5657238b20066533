use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::model::PriceHistoryDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::price_history::dsl as price_history_dsl;
use bandwatch_core::history::{HistoryStore, PricePoint, SeriesKind};
use bandwatch_core::Result;

pub struct HistoryRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl HistoryRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl HistoryStore for HistoryRepository {
    // =========================================================================
    // Reads
    // =========================================================================

    fn points(
        &self,
        instrument_id: i64,
        series: SeriesKind,
        since: NaiveDate,
    ) -> Result<Vec<PricePoint>> {
        let mut conn = get_connection(&self.pool)?;
        let since_str = since.format("%Y-%m-%d").to_string();

        let rows = price_history_dsl::price_history
            .filter(price_history_dsl::instrument_id.eq(instrument_id))
            .filter(price_history_dsl::series.eq(series.as_str()))
            .filter(price_history_dsl::price_date.gt(&since_str))
            .order(price_history_dsl::price_date.asc())
            .select(PriceHistoryDB::as_select())
            .load::<PriceHistoryDB>(&mut conn)
            .into_core()?;

        Ok(rows.into_iter().map(PricePoint::from).collect())
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    async fn append(
        &self,
        instrument_id: i64,
        series: SeriesKind,
        points: &[(NaiveDate, Decimal)],
    ) -> Result<usize> {
        if points.is_empty() {
            return Ok(0);
        }

        let rows: Vec<PriceHistoryDB> = points
            .iter()
            .map(|(date, price)| PriceHistoryDB::new(instrument_id, series, *date, *price))
            .collect();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let mut written = 0;
                for chunk in rows.chunks(1_000) {
                    written += diesel::replace_into(price_history_dsl::price_history)
                        .values(chunk)
                        .execute(conn)
                        .map_err(|e| StorageError::QueryFailed(e))?;
                }
                Ok(written)
            })
            .await
    }

    async fn copy_daily_to_weekly(&self, instrument_id: i64, date: NaiveDate) -> Result<usize> {
        let date_str = date.format("%Y-%m-%d").to_string();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let daily = price_history_dsl::price_history
                    .filter(price_history_dsl::instrument_id.eq(instrument_id))
                    .filter(price_history_dsl::series.eq(SeriesKind::Daily.as_str()))
                    .filter(price_history_dsl::price_date.eq(&date_str))
                    .select(PriceHistoryDB::as_select())
                    .first::<PriceHistoryDB>(conn)
                    .optional()
                    .map_err(|e| StorageError::QueryFailed(e))?;

                match daily {
                    Some(row) => {
                        let weekly = PriceHistoryDB {
                            series: SeriesKind::Weekly.as_str().to_string(),
                            ..row
                        };
                        diesel::replace_into(price_history_dsl::price_history)
                            .values(&weekly)
                            .execute(conn)
                            .map_err(|e| StorageError::QueryFailed(e))?;
                        Ok(1)
                    }
                    None => Ok(0),
                }
            })
            .await
    }

    async fn delete_older_than(&self, series: SeriesKind, threshold: NaiveDate) -> Result<usize> {
        let threshold_str = threshold.format("%Y-%m-%d").to_string();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let count = diesel::delete(
                    price_history_dsl::price_history
                        .filter(price_history_dsl::series.eq(series.as_str()))
                        .filter(price_history_dsl::price_date.le(&threshold_str)),
                )
                .execute(conn)
                .map_err(|e| StorageError::QueryFailed(e))?;
                Ok(count)
            })
            .await
    }

    async fn delete_for_instrument(&self, instrument_id: i64) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                // One statement per series, mirroring the explicit cascade the
                // reconcile path promises.
                let mut removed = 0;
                for series in [SeriesKind::Daily, SeriesKind::Weekly] {
                    removed += diesel::delete(
                        price_history_dsl::price_history
                            .filter(price_history_dsl::instrument_id.eq(instrument_id))
                            .filter(price_history_dsl::series.eq(series.as_str())),
                    )
                    .execute(conn)
                    .map_err(|e| StorageError::QueryFailed(e))?;
                }
                Ok(removed)
            })
            .await
    }

    async fn delete_on_date(&self, date: NaiveDate) -> Result<usize> {
        let date_str = date.format("%Y-%m-%d").to_string();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let count = diesel::delete(
                    price_history_dsl::price_history
                        .filter(price_history_dsl::price_date.eq(&date_str)),
                )
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
    use crate::db::{create_pool, run_migrations, write_actor::spawn_writer, DbPool};
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    async fn create_test_repository() -> (HistoryRepository, Arc<DbPool>, tempfile::TempDir) {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");
        let db_path_str = db_path.to_string_lossy().to_string();

        let pool = create_pool(&db_path_str).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");

        let writer = spawn_writer((*pool).clone());
        let repo = HistoryRepository::new(Arc::clone(&pool), writer);
        (repo, pool, temp_dir)
    }

    /// Seeds an instrument row so history inserts satisfy the foreign key.
    fn create_test_instrument(pool: &Arc<DbPool>, id: i64, symbol: &str) {
        let mut conn = get_connection(pool).expect("Failed to get connection");
        diesel::sql_query(format!(
            "INSERT INTO instruments (id, name, symbol) VALUES ({}, '{} Inc', '{}')",
            id, symbol, symbol
        ))
        .execute(&mut conn)
        .expect("Failed to seed instrument");
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_points_filter_by_series_and_cutoff() {
        let (repo, pool, _temp_dir) = create_test_repository().await;
        create_test_instrument(&pool, 1, "ACME");

        repo.append(
            1,
            SeriesKind::Daily,
            &[
                (date(2023, 6, 14), dec!(11.0)),
                (date(2023, 6, 15), dec!(11.2)),
                (date(2023, 6, 16), dec!(11.4)),
            ],
        )
        .await
        .expect("Failed to append");

        let all = repo
            .points(1, SeriesKind::Daily, date(2023, 6, 13))
            .expect("Failed to read points");
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].date, date(2023, 6, 14), "Points come oldest first");

        let after_cutoff = repo
            .points(1, SeriesKind::Daily, date(2023, 6, 15))
            .expect("Failed to read points");
        assert_eq!(after_cutoff.len(), 1, "Cutoff day itself is excluded");
        assert_eq!(after_cutoff[0].date, date(2023, 6, 16));

        let weekly = repo
            .points(1, SeriesKind::Weekly, date(2023, 6, 13))
            .expect("Failed to read points");
        assert!(weekly.is_empty(), "Series must not bleed into each other");
    }

    #[tokio::test]
    async fn test_append_replaces_same_date_point() {
        let (repo, pool, _temp_dir) = create_test_repository().await;
        create_test_instrument(&pool, 1, "ACME");

        repo.append(1, SeriesKind::Daily, &[(date(2023, 6, 16), dec!(11.0))])
            .await
            .expect("Failed to append");
        repo.append(1, SeriesKind::Daily, &[(date(2023, 6, 16), dec!(11.5))])
            .await
            .expect("Failed to re-append");

        let points = repo
            .points(1, SeriesKind::Daily, date(2023, 6, 1))
            .expect("Failed to read points");
        assert_eq!(points.len(), 1, "Same-date append must replace, not duplicate");
        assert_eq!(points[0].price, dec!(11.5));
    }

    #[tokio::test]
    async fn test_copy_daily_to_weekly_needs_a_daily_point() {
        let (repo, pool, _temp_dir) = create_test_repository().await;
        create_test_instrument(&pool, 1, "ACME");
        let anchor = date(2023, 6, 16);

        let copied = repo
            .copy_daily_to_weekly(1, anchor)
            .await
            .expect("Failed to copy");
        assert_eq!(copied, 0, "Nothing to copy without a daily point");

        repo.append(1, SeriesKind::Daily, &[(anchor, dec!(11.4))])
            .await
            .expect("Failed to append");
        let copied = repo
            .copy_daily_to_weekly(1, anchor)
            .await
            .expect("Failed to copy");
        assert_eq!(copied, 1);

        let weekly = repo
            .points(1, SeriesKind::Weekly, date(2023, 6, 1))
            .expect("Failed to read points");
        assert_eq!(weekly.len(), 1);
        assert_eq!(weekly[0].date, anchor);
        assert_eq!(weekly[0].price, dec!(11.4));
    }

    #[tokio::test]
    async fn test_delete_older_than_includes_the_threshold_day() {
        let (repo, pool, _temp_dir) = create_test_repository().await;
        create_test_instrument(&pool, 1, "ACME");

        let points: Vec<(NaiveDate, Decimal)> = (1..=20)
            .map(|day| (date(2023, 6, day), dec!(11)))
            .collect();
        repo.append(1, SeriesKind::Daily, &points)
            .await
            .expect("Failed to append");

        let removed = repo
            .delete_older_than(SeriesKind::Daily, date(2023, 6, 10))
            .await
            .expect("Failed to groom");
        assert_eq!(removed, 10);

        let kept = repo
            .points(1, SeriesKind::Daily, date(2023, 5, 31))
            .expect("Failed to read points");
        assert_eq!(kept.len(), 10);
        assert_eq!(kept[0].date, date(2023, 6, 11), "Threshold day itself is gone");
    }

    #[tokio::test]
    async fn test_delete_for_instrument_clears_both_series_only_for_it() {
        let (repo, pool, _temp_dir) = create_test_repository().await;
        create_test_instrument(&pool, 1, "ACME");
        create_test_instrument(&pool, 2, "GLOBEX");

        for id in [1, 2] {
            repo.append(id, SeriesKind::Daily, &[(date(2023, 6, 16), dec!(11))])
                .await
                .expect("Failed to append");
            repo.append(id, SeriesKind::Weekly, &[(date(2023, 6, 16), dec!(11))])
                .await
                .expect("Failed to append");
        }

        let removed = repo
            .delete_for_instrument(1)
            .await
            .expect("Failed to delete");
        assert_eq!(removed, 2);

        assert!(repo
            .points(1, SeriesKind::Daily, date(2023, 6, 1))
            .expect("Failed to read")
            .is_empty());
        assert!(repo
            .points(1, SeriesKind::Weekly, date(2023, 6, 1))
            .expect("Failed to read")
            .is_empty());
        assert_eq!(
            repo.points(2, SeriesKind::Daily, date(2023, 6, 1))
                .expect("Failed to read")
                .len(),
            1,
            "Other instruments keep their history"
        );
    }

    #[tokio::test]
    async fn test_delete_on_date_hits_both_series_across_instruments() {
        let (repo, pool, _temp_dir) = create_test_repository().await;
        create_test_instrument(&pool, 1, "ACME");
        create_test_instrument(&pool, 2, "GLOBEX");

        let today = date(2023, 6, 16);
        for id in [1, 2] {
            repo.append(
                id,
                SeriesKind::Daily,
                &[(date(2023, 6, 15), dec!(11)), (today, dec!(11.5))],
            )
            .await
            .expect("Failed to append");
        }
        repo.append(1, SeriesKind::Weekly, &[(today, dec!(11.5))])
            .await
            .expect("Failed to append");

        let removed = repo.delete_on_date(today).await.expect("Failed to delete");
        assert_eq!(removed, 3);

        let daily = repo
            .points(1, SeriesKind::Daily, date(2023, 6, 1))
            .expect("Failed to read");
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].date, date(2023, 6, 15));
    }
}
