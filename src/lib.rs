pub mod cli;
pub mod core;
pub mod providers;
pub mod reader;
pub mod refresh;
pub mod scheduler;
pub mod server;
pub mod store;
pub mod warmer;

#[cfg(test)]
pub(crate) mod test_support;

use crate::core::config::AppConfig;
use crate::core::{Clock, PairKey, PairRegistry, QuoteSource, RateStore, SystemClock, TradingPair};
use crate::reader::{RateReader, RateRequest};
use crate::server::AppState;
use crate::store::StoreHandles;
use crate::warmer::CacheWarmer;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub enum AppCommand {
    Serve,
    Get {
        from_denom: String,
        to_denom: String,
        ttl_seconds: Option<u64>,
    },
    Warm,
    List,
    AddPair {
        from_denom: String,
        to_denom: String,
    },
}

/// Reader, warmer and store wired from one configuration.
pub struct App {
    pub config: AppConfig,
    pub stores: StoreHandles,
    pub reader: RateReader,
    pub warmer: CacheWarmer,
}

impl App {
    pub async fn from_config(config: AppConfig) -> Result<Self> {
        let stores = store::open_store(&config).await?;
        let source = Arc::new(providers::VpsQuoteSource::new(&config.upstream)?);
        Ok(Self::with_parts(config, stores, source, Arc::new(SystemClock)))
    }

    pub fn with_parts(
        config: AppConfig,
        stores: StoreHandles,
        source: Arc<dyn QuoteSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let reader = RateReader::new(stores.rates.clone(), source.clone(), &config.cache)
            .with_clock(clock.clone());
        let warmer = CacheWarmer::new(
            stores.rates.clone(),
            stores.registry.clone(),
            source,
            &config.cache,
            &config.warmer,
        )
        .with_clock(clock);

        App {
            config,
            stores,
            reader,
            warmer,
        }
    }

    pub fn state(&self) -> Arc<AppState> {
        Arc::new(AppState {
            reader: self.reader.clone(),
            warmer: self.warmer.clone(),
            request_timeout: self.config.server.request_timeout(),
        })
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let app = App::from_config(config).await?;

    match command {
        AppCommand::Serve => {
            let _scheduler = app.config.warmer.interval_seconds.map(|secs| {
                scheduler::start_warm_scheduler(app.warmer.clone(), Duration::from_secs(secs))
            });
            info!("Rate cache starting...");
            server::serve(app.state(), &app.config.server.bind).await
        }
        AppCommand::Get {
            from_denom,
            to_denom,
            ttl_seconds,
        } => {
            let request = RateRequest {
                from_denom: Some(from_denom),
                to_denom: Some(to_denom),
                ttl_seconds,
            };
            let lookup = app.reader.get_rate(&request).await?;
            let pair = PairKey::from_request(
                request.from_denom.as_deref(),
                request.to_denom.as_deref(),
            )?;
            println!("{}", cli::rates::display_lookup(&pair, &lookup));
            Ok(())
        }
        AppCommand::Warm => {
            let spinner = cli::ui::new_spinner("Warming rate cache");
            let result = app.warmer.warm_all().await;
            spinner.finish_and_clear();
            println!("{}", cli::rates::display_warm_report(&result?));
            Ok(())
        }
        AppCommand::List => {
            let entries = app.stores.rates.entries().await?;
            println!(
                "{}",
                cli::rates::display_entries(&entries, SystemClock.now())
            );
            Ok(())
        }
        AppCommand::AddPair {
            from_denom,
            to_denom,
        } => {
            let pair = PairKey::from_request(Some(&from_denom), Some(&to_denom))?;
            app.stores
                .registry
                .register(TradingPair {
                    from_denom: pair.from_denom.clone(),
                    to_denom: pair.to_denom.clone(),
                    is_active: true,
                })
                .await?;
            println!(
                "Registered {}",
                cli::ui::style_text(&pair.to_string(), cli::ui::StyleType::Label)
            );
            Ok(())
        }
    }
}
