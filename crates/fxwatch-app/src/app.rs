//! Application orchestration.

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::supervisor::ConnectionSupervisor;
use fxwatch_feed::PriceTable;
use fxwatch_persistence::HoldingsStore;
use fxwatch_portfolio::PortfolioBook;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// The fxwatch application: feed supervision, reconciliation, and
/// portfolio valuation over persisted holdings.
pub struct Application {
    config: AppConfig,
    supervisor: Arc<ConnectionSupervisor>,
    book: Arc<PortfolioBook>,
    store: HoldingsStore,
}

impl Application {
    /// Build the application, loading any previously saved holdings.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let store = HoldingsStore::new(&config.persistence.data_dir)?;
        let holdings = store.load()?;
        info!(count = holdings.len(), "Holdings restored");

        let book = Arc::new(PortfolioBook::with_holdings(holdings));
        let table = Arc::new(PriceTable::new());
        let supervisor = Arc::new(ConnectionSupervisor::new(config.connection_config(), table));

        Ok(Self {
            config,
            supervisor,
            book,
            store,
        })
    }

    /// Run until interrupted: start the feed, log a valuation summary on
    /// an interval, and save holdings on the way out.
    pub async fn run(self) -> AppResult<()> {
        info!(
            pairs = self.config.pairs.len(),
            url = %self.config.ws_url,
            "Starting application"
        );

        self.supervisor.start().await?;

        let mut valuation_interval =
            tokio::time::interval(Duration::from_secs(self.config.valuation_interval_secs));
        // The first tick fires immediately.
        valuation_interval.tick().await;

        loop {
            tokio::select! {
                _ = valuation_interval.tick() => {
                    self.log_valuation();
                }

                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        self.supervisor.stop();
        self.store.save(&self.book.holdings())?;

        let stats = self.supervisor.price_table().stats();
        info!(
            batches = stats.applied(),
            ticks = stats.ticks(),
            dropped = stats.dropped(),
            "Shutting down"
        );
        Ok(())
    }

    fn log_valuation(&self) {
        let connected = self.supervisor.check_connection();
        let table = self.supervisor.price_table();
        let valuation = self.book.valuate(table);

        info!(
            connected,
            symbols = table.len(),
            positions = valuation.positions.len(),
            total_value = %valuation.total_value,
            total_profit_loss = %valuation.total_profit_loss,
            "Portfolio valuation"
        );
    }
}
