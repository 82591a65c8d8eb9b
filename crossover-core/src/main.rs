use anyhow::{bail, Context};
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser};
use dotenv::dotenv;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crossover_core::{
    backtest::{BacktestConfig, BacktestEngine, BacktestResult},
    config::{Provider, Settings},
    market_data::{CsvSource, PriceSource, YahooSource},
    report,
};

#[derive(Parser)]
#[command(name = "crossover")]
#[command(about = "Dual moving average crossover backtester")]
enum Commands {
    /// Run the backtest and print the performance report
    Backtest(RunArgs),
    /// Run the backtest and print the most recent bars with their signals
    Signals {
        #[command(flatten)]
        run: RunArgs,
        #[arg(long, default_value = "20")]
        rows: usize,
    },
}

#[derive(Args, Default)]
struct RunArgs {
    #[arg(short, long)]
    ticker: Option<String>,
    /// First date, YYYY-MM-DD
    #[arg(long)]
    start: Option<NaiveDate>,
    /// End date (exclusive), YYYY-MM-DD
    #[arg(long)]
    end: Option<NaiveDate>,
    #[arg(long)]
    short_window: Option<usize>,
    #[arg(long)]
    long_window: Option<usize>,
    #[arg(short, long)]
    initial_capital: Option<f64>,
    /// Read bars from a CSV export instead of downloading
    #[arg(long)]
    csv: Option<String>,
    /// Print the full result as JSON
    #[arg(long)]
    json: bool,
}

impl RunArgs {
    fn backtest_config(&self, settings: &Settings) -> BacktestConfig {
        let end_date = self.end.unwrap_or_else(|| Utc::now().date_naive());
        let mut config = settings.backtest_config(end_date);

        if let Some(start) = self.start {
            config.start_date = start;
        }
        if let Some(ticker) = &self.ticker {
            config.ticker = ticker.clone();
        }
        if let Some(short_window) = self.short_window {
            config.short_window = short_window;
        }
        if let Some(long_window) = self.long_window {
            config.long_window = long_window;
        }
        if let Some(initial_capital) = self.initial_capital {
            config.initial_capital = initial_capital;
        }
        config
    }

    fn price_source(&self, settings: &Settings) -> anyhow::Result<Arc<dyn PriceSource>> {
        if let Some(path) = &self.csv {
            return Ok(Arc::new(CsvSource::new(path)));
        }

        match settings.data.provider {
            Provider::Csv => match &settings.data.csv_path {
                Some(path) => Ok(Arc::new(CsvSource::new(path))),
                None => bail!("data.provider is csv but no csv_path is configured"),
            },
            Provider::Yahoo => {
                let source = YahooSource::with_base_url(&settings.data.yahoo_url)?
                    .with_adjusted_close(settings.data.adjusted_close);
                Ok(Arc::new(source))
            }
        }
    }

    async fn run(&self, settings: &Settings) -> anyhow::Result<BacktestResult> {
        let config = self.backtest_config(settings);
        let source = self.price_source(settings)?;
        let engine = BacktestEngine::new(source, config);

        engine
            .run()
            .await
            .with_context(|| format!("backtest for {} failed", engine.config().ticker))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::new().context("failed to load settings")?;

    let command = if std::env::args().len() > 1 {
        Commands::parse()
    } else {
        Commands::Backtest(RunArgs::default())
    };

    match command {
        Commands::Backtest(args) => {
            let result = args.run(&settings).await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                report::print_report(&result);
            }
            info!("Backtest finished with {} warnings", result.warnings.len());
        }

        Commands::Signals { run, rows } => {
            let result = run.run(&settings).await?;
            if run.json {
                let tail = result.bars.len().saturating_sub(rows);
                println!("{}", serde_json::to_string_pretty(&result.bars[tail..])?);
            } else {
                print!("{}", report::render_header(&result.config));
                println!();
                print!("{}", report::render_signal_table(&result, rows));
                println!();
                print!("{}", report::render_crossovers(&result));
            }
        }
    }

    Ok(())
}
