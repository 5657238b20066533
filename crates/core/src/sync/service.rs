//! Price update orchestration service.
//!
//! Runs the daily cycle against the stores and the quote provider:
//!
//! 1. **Scan** - reload the instrument cache and collect stale symbols
//! 2. **Backfill** - download full history for instruments missing it
//! 3. **Refresh** - fetch quotes and persist what changed
//! 4. **Snapshot** - record the weekly marker when one was due
//! 5. **Groom** - trim history past the retention horizons
//!
//! Everything is at most daily: if no instrument is stale the cycle ends
//! at the scan, and a price refreshed today is never fetched again. One
//! instrument failing never stops the others; only a store that cannot
//! be read at all aborts the cycle.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use chrono::{Duration, NaiveDate};
use log::{debug, info, warn};
use rust_decimal::Decimal;

use bandwatch_market_data::{ProviderError, QuoteProvider, SeriesFrequency};

use super::results::{ReconcileSummary, ResetSummary, UpdateSummary};
use crate::admin::AdminStore;
use crate::errors::{Error, Result};
use crate::history::{HistoryStore, RetentionPolicy, SeriesKind};
use crate::instruments::{Instrument, InstrumentStore, WatchEntry};
use crate::schedule;

/// What happened to one instrument during the refresh pass.
enum RefreshOutcome {
    /// Changed fields persisted and a daily point recorded
    Updated,
    /// Fetched successfully, nothing new
    Unchanged,
    /// Fetch failed or the price was unusable
    Skipped,
}

/// Orchestrates the daily update, watchlist reconciliation, and state
/// rollback against the storage traits and a quote provider.
pub struct PriceUpdateService<I, H, A, P>
where
    I: InstrumentStore,
    H: HistoryStore,
    A: AdminStore,
    P: QuoteProvider,
{
    /// Instrument storage.
    instrument_store: Arc<I>,
    /// History storage.
    history_store: Arc<H>,
    /// Run-state storage.
    admin_store: Arc<A>,
    /// Quote provider, already wrapped in whatever retry policy applies.
    provider: Arc<P>,
    /// Retention horizons for the two history series.
    retention: RetentionPolicy,
    /// In-memory cache of tracked instruments, keyed by symbol.
    instruments: RwLock<HashMap<String, Instrument>>,
}

impl<I, H, A, P> PriceUpdateService<I, H, A, P>
where
    I: InstrumentStore + 'static,
    H: HistoryStore + 'static,
    A: AdminStore + 'static,
    P: QuoteProvider + 'static,
{
    /// Create a new update service. The instrument cache starts empty and
    /// fills on the first operation.
    pub fn new(
        instrument_store: Arc<I>,
        history_store: Arc<H>,
        admin_store: Arc<A>,
        provider: Arc<P>,
        retention: RetentionPolicy,
    ) -> Self {
        Self {
            instrument_store,
            history_store,
            admin_store,
            provider,
            retention,
            instruments: RwLock::new(HashMap::new()),
        }
    }

    /// Reloads the in-memory instrument cache from the store.
    ///
    /// Returns the number of tracked instruments.
    pub fn load_instruments(&self) -> Result<usize> {
        let all = self.instrument_store.all()?;
        let mut cache = self.instruments.write().unwrap();
        *cache = all
            .into_iter()
            .map(|instrument| (instrument.symbol.clone(), instrument))
            .collect();
        Ok(cache.len())
    }

    /// Currently cached instruments, ordered by symbol.
    pub fn instruments(&self) -> Vec<Instrument> {
        let cache = self.instruments.read().unwrap();
        let mut all: Vec<Instrument> = cache.values().cloned().collect();
        all.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        all
    }

    /// Runs one daily update cycle for `today`.
    ///
    /// With nothing stale the cycle ends immediately, leaving the weekly
    /// marker and grooming schedule untouched.
    pub async fn run_daily_update(&self, today: NaiveDate) -> Result<UpdateSummary> {
        let mut summary = UpdateSummary::default();

        let tracked = self.load_instruments()?;
        debug!("Starting daily update for {} tracked instruments", tracked);

        let mut stale: Vec<String> = {
            let cache = self.instruments.read().unwrap();
            cache
                .values()
                .filter(|i| schedule::needs_refresh(i.current_price_date, today))
                .map(|i| i.symbol.clone())
                .collect()
        };
        stale.sort();

        if stale.is_empty() {
            info!("All instrument prices are current");
            return Ok(summary);
        }

        summary.backfilled = self.backfill_missing_history(today).await;

        let admin = self.admin_store.state()?;
        let weekly_due = schedule::weekly_due(today, admin.last_weekly_update);
        let anchor = schedule::weekly_anchor(today);

        for symbol in &stale {
            match self
                .refresh_instrument(symbol, today, weekly_due, anchor)
                .await
            {
                Ok(RefreshOutcome::Updated) => summary.refreshed += 1,
                Ok(RefreshOutcome::Unchanged) => summary.unchanged += 1,
                Ok(RefreshOutcome::Skipped) => summary.skipped += 1,
                Err(e) => {
                    warn!("Skipping {} after update failure: {}", symbol, e);
                    summary.errors.push((symbol.clone(), e.to_string()));
                }
            }
        }

        if weekly_due {
            self.admin_store.set_last_weekly_update(today).await?;
            debug!("Recorded weekly snapshot date {}", today);
        }

        if schedule::grooming_due(today, admin.last_groom_run) {
            self.groom_history(today).await?;
            self.admin_store.set_last_groom_run(today).await?;
            summary.groomed = true;
        }

        info!("{}", summary.summary());
        Ok(summary)
    }

    /// Reconciles the tracked set against the authoritative watchlist.
    ///
    /// Instruments absent from the watchlist are deleted along with their
    /// history, changed names and bands are applied, new entries are
    /// inserted, and any instrument still missing its full history is
    /// backfilled.
    pub async fn reconcile_watchlist(
        &self,
        entries: Vec<WatchEntry>,
        today: NaiveDate,
    ) -> Result<ReconcileSummary> {
        let mut summary = ReconcileSummary::default();

        let mut wanted: BTreeMap<String, WatchEntry> = BTreeMap::new();
        for entry in entries {
            if let Err(e) = entry.validate() {
                warn!("Dropping watchlist entry {:?}: {}", entry.symbol, e);
                summary.invalid += 1;
                continue;
            }
            wanted.insert(entry.symbol.clone(), entry);
        }

        self.load_instruments()?;

        let mut obsolete: Vec<Instrument> = {
            let cache = self.instruments.read().unwrap();
            cache
                .values()
                .filter(|i| !wanted.contains_key(&i.symbol))
                .cloned()
                .collect()
        };
        obsolete.sort_by(|a, b| a.symbol.cmp(&b.symbol));

        for instrument in obsolete {
            match self.remove_instrument(&instrument).await {
                Ok(()) => {
                    info!("Stopped tracking {}", instrument.symbol);
                    summary.removed += 1;
                }
                Err(e) => {
                    warn!("Could not remove {}: {}", instrument.symbol, e);
                    summary.errors.push((instrument.symbol.clone(), e.to_string()));
                }
            }
        }

        for (symbol, entry) in &wanted {
            let existing = {
                let cache = self.instruments.read().unwrap();
                cache.get(symbol).cloned()
            };
            match existing {
                Some(instrument) => {
                    let update = instrument.watch_changes(entry);
                    if update.is_empty() {
                        continue;
                    }
                    match self.instrument_store.apply_update(instrument.id, &update).await {
                        Ok(()) => {
                            info!("Updated watch settings for {}", symbol);
                            summary.updated += 1;
                        }
                        Err(e) => {
                            warn!("Could not update {}: {}", symbol, e);
                            summary.errors.push((symbol.clone(), e.to_string()));
                        }
                    }
                }
                None => match self.instrument_store.insert(entry).await {
                    Ok(true) => {
                        info!("Now tracking {}", symbol);
                        summary.added += 1;
                    }
                    Ok(false) => debug!("{} is already tracked", symbol),
                    Err(e) => {
                        warn!("Could not insert {}: {}", symbol, e);
                        summary.errors.push((symbol.clone(), e.to_string()));
                    }
                },
            }
        }

        self.load_instruments()?;
        summary.backfilled = self.backfill_missing_history(today).await;
        summary.backfill_complete = {
            let cache = self.instruments.read().unwrap();
            cache.values().all(|i| i.full_history_downloaded)
        };

        info!("{}", summary.summary());
        Ok(summary)
    }

    /// Rolls back today's update state so the daily cycle can run again.
    ///
    /// Refresh cursors stamped today move to yesterday, today's daily and
    /// weekly points are removed, and a weekly marker stamped today
    /// rewinds by one week. The grooming marker is left alone.
    pub async fn reset_daily_state(&self, today: NaiveDate) -> Result<ResetSummary> {
        let instruments_rewound = self.instrument_store.rewind_price_dates(today).await?;
        let points_deleted = self.history_store.delete_on_date(today).await?;
        self.admin_store.rewind_weekly_update(today).await?;
        self.load_instruments()?;

        let summary = ResetSummary {
            instruments_rewound,
            points_deleted,
        };
        info!("{}", summary.summary());
        Ok(summary)
    }

    /// Downloads full history for every cached instrument still missing
    /// it. Returns how many completed.
    async fn backfill_missing_history(&self, today: NaiveDate) -> usize {
        let mut pending: Vec<String> = {
            let cache = self.instruments.read().unwrap();
            cache
                .values()
                .filter(|i| !i.full_history_downloaded)
                .map(|i| i.symbol.clone())
                .collect()
        };
        if pending.is_empty() {
            return 0;
        }
        pending.sort();
        info!("Backfilling price history for {} instruments", pending.len());

        let mut completed = 0;
        for symbol in &pending {
            match self.backfill_instrument(symbol, today).await {
                Ok(true) => completed += 1,
                Ok(false) => {}
                Err(e) => warn!("History backfill for {} failed: {}", symbol, e),
            }
        }
        completed
    }

    /// Downloads and stores both history series for one instrument.
    ///
    /// The completion flag is only set once daily and weekly points have
    /// both been persisted; a provider with no data yet leaves the
    /// instrument pending for the next cycle. Returns whether the flag
    /// was set.
    async fn backfill_instrument(&self, symbol: &str, today: NaiveDate) -> Result<bool> {
        let instrument_id = self.cached(symbol)?.id;

        let daily_start = today - Duration::days(self.retention.horizon_days(SeriesKind::Daily));
        let daily = match self
            .provider
            .fetch_historical_series(symbol, daily_start, today, SeriesFrequency::Daily)
            .await
        {
            Ok(points) => points,
            Err(ProviderError::NoData) => {
                debug!("No daily history available yet for {}", symbol);
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };
        let daily_points: Vec<(NaiveDate, Decimal)> =
            daily.iter().map(|p| (p.date, p.price)).collect();
        self.history_store
            .append(instrument_id, SeriesKind::Daily, &daily_points)
            .await?;

        let weekly_start = today - Duration::days(self.retention.horizon_days(SeriesKind::Weekly));
        let weekly = match self
            .provider
            .fetch_historical_series(symbol, weekly_start, today, SeriesFrequency::Weekly)
            .await
        {
            Ok(points) => points,
            Err(ProviderError::NoData) => {
                debug!("No weekly history available yet for {}", symbol);
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };
        let weekly_points: Vec<(NaiveDate, Decimal)> =
            weekly.iter().map(|p| (p.date, p.price)).collect();
        self.history_store
            .append(instrument_id, SeriesKind::Weekly, &weekly_points)
            .await?;

        self.instrument_store
            .mark_history_downloaded(instrument_id)
            .await?;
        {
            let mut cache = self.instruments.write().unwrap();
            if let Some(cached) = cache.get_mut(symbol) {
                cached.full_history_downloaded = true;
            }
        }
        info!("Downloaded full price history for {}", symbol);
        Ok(true)
    }

    /// Fetches one instrument's quote and persists whatever changed.
    async fn refresh_instrument(
        &self,
        symbol: &str,
        today: NaiveDate,
        weekly_due: bool,
        anchor: NaiveDate,
    ) -> Result<RefreshOutcome> {
        let snapshot = match self.provider.fetch_current_quote(symbol).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Could not fetch a quote for {}: {}", symbol, e);
                return Ok(RefreshOutcome::Skipped);
            }
        };

        if snapshot.current_price <= Decimal::ZERO {
            warn!(
                "Ignoring non-positive price {} for {}",
                snapshot.current_price, symbol
            );
            return Ok(RefreshOutcome::Skipped);
        }

        let instrument = self.cached(symbol)?;
        let update = instrument.quote_changes(&snapshot, today);
        if update.is_empty() {
            debug!("No quote changes for {}", symbol);
            return Ok(RefreshOutcome::Unchanged);
        }

        self.instrument_store
            .apply_update(instrument.id, &update)
            .await?;
        self.history_store
            .append(
                instrument.id,
                SeriesKind::Daily,
                &[(today, snapshot.current_price)],
            )
            .await?;

        if weekly_due {
            let copied = self
                .history_store
                .copy_daily_to_weekly(instrument.id, anchor)
                .await?;
            if copied == 0 {
                debug!(
                    "{} has no daily price on {} to copy into the weekly series",
                    symbol, anchor
                );
            }
        }

        {
            let mut cache = self.instruments.write().unwrap();
            if let Some(cached) = cache.get_mut(symbol) {
                cached.apply(&update);
            }
        }

        debug!("Refreshed {} at {}", symbol, snapshot.current_price);
        Ok(RefreshOutcome::Updated)
    }

    /// Trims both history series back to their retention horizons.
    async fn groom_history(&self, today: NaiveDate) -> Result<()> {
        let daily_cutoff = today - Duration::days(self.retention.horizon_days(SeriesKind::Daily));
        let weekly_cutoff = today - Duration::days(self.retention.horizon_days(SeriesKind::Weekly));

        let daily_removed = self
            .history_store
            .delete_older_than(SeriesKind::Daily, daily_cutoff)
            .await?;
        let weekly_removed = self
            .history_store
            .delete_older_than(SeriesKind::Weekly, weekly_cutoff)
            .await?;

        info!(
            "Groomed price history: {} daily and {} weekly points removed",
            daily_removed, weekly_removed
        );
        Ok(())
    }

    /// Deletes an instrument and its history, history rows first.
    async fn remove_instrument(&self, instrument: &Instrument) -> Result<()> {
        self.history_store
            .delete_for_instrument(instrument.id)
            .await?;
        self.instrument_store.delete(instrument.id).await?;
        Ok(())
    }

    /// Clones one instrument out of the cache.
    fn cached(&self, symbol: &str) -> Result<Instrument> {
        let cache = self.instruments.read().unwrap();
        cache
            .get(symbol)
            .cloned()
            .ok_or_else(|| Error::Unexpected(format!("{symbol} is not in the instrument cache")))
    }
}
