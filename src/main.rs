use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use indexbot::api::{now_ist, to_ist, CandleRequest, CandleSource, CandleWindow, SmartApiClient};
use indexbot::backtest::{MarketScenario, SyntheticCandleSource};
use indexbot::execution::{PositionTracker, SignalPipeline};
use indexbot::indicators::Series;
use indexbot::notify::{format_signal_message, Notifier, TelegramNotifier};
use indexbot::settings::Settings;
use indexbot::strategy::{Evaluation, Position, Readiness};
use indexbot::{Interval, MarketIndex, Result, Signal};
use tokio::time::{interval, Duration, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SourceKind {
    /// SmartAPI historical candles (needs INDEXBOT_API_KEY and INDEXBOT_JWT_TOKEN)
    Live,
    /// Seeded random candles, no broker needed
    Synthetic,
}

/// Live NIFTY/BANKNIFTY signal engine
#[derive(Debug, Parser)]
#[command(name = "indexbot", version)]
struct Cli {
    /// Index to track
    #[arg(long, value_enum, default_value_t = MarketIndex::Nifty)]
    symbol: MarketIndex,

    /// Candle interval, by wire name (FIVE_MINUTE) or label ("5 Minute")
    #[arg(long, default_value_t = Interval::FiveMinute)]
    interval: Interval,

    /// First date (YYYY-MM-DD), defaults to yesterday
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    to: Option<NaiveDate>,

    #[arg(long, value_enum, default_value_t = SourceKind::Live)]
    source: SourceKind,

    /// Scenario for the synthetic source
    #[arg(long, value_enum, default_value_t = MarketScenario::Sideways)]
    scenario: MarketScenario,

    /// Seed for the synthetic source
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Run a single refresh and exit
    #[arg(long)]
    once: bool,

    /// Send actionable signals to Telegram
    #[arg(long)]
    notify: bool,

    /// Rows to show in the table
    #[arg(long, default_value_t = 20)]
    rows: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load()?;
    setup_logging();

    tracing::info!("🚀 indexbot starting");

    let notifier = if cli.notify {
        match settings.telegram() {
            Some((token, chat_id)) => Some(TelegramNotifier::with_base_url(
                settings.telegram_base_url.clone(),
                token,
                chat_id,
            )),
            None => {
                tracing::warn!("--notify given but Telegram is not configured, notifications off");
                None
            }
        }
    } else {
        None
    };

    match cli.source {
        SourceKind::Live => {
            let (api_key, jwt_token) = settings
                .broker_credentials()
                .ok_or("INDEXBOT_API_KEY and INDEXBOT_JWT_TOKEN must be set for the live source")?;
            let client = SmartApiClient::with_base_url(settings.api_base_url.clone(), api_key, jwt_token);
            run(&cli, &settings, client, notifier).await
        }
        SourceKind::Synthetic => {
            let source = SyntheticCandleSource::for_index(cli.seed, cli.scenario, cli.symbol);
            run(&cli, &settings, source, notifier).await
        }
    }
}

fn setup_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("indexbot=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Refresh loop: one fetch/evaluate cycle per tick until Ctrl+C
async fn run<S: CandleSource>(
    cli: &Cli,
    settings: &Settings,
    source: S,
    notifier: Option<TelegramNotifier>,
) -> Result<()> {
    let pipeline = SignalPipeline::new(settings.indicator_config(), settings.signal_config());
    let tracker = PositionTracker::new(Position::new(settings.quantity));
    let mut last_notified: Option<Signal> = None;

    tracing::info!("📊 Configuration:");
    tracing::info!("  Symbol: {}", cli.symbol);
    tracing::info!("  Interval: {}", cli.interval.label());
    tracing::info!("  Source: {}", source.name());
    tracing::info!("  Refresh: every {}s", settings.refresh_secs);

    let mut ticker = interval(Duration::from_secs(settings.refresh_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("⚠️  Received Ctrl+C, shutting down...");
                break;
            }
        }

        let request = CandleRequest {
            index: cli.symbol,
            interval: cli.interval,
            window: window_for(cli),
        };

        let rows = source.fetch_candles(&request).await;
        let Some((series, evaluation)) = tracker.try_evaluate(&pipeline, &rows) else {
            continue;
        };

        render(cli, &request, &series, &evaluation);

        if let Some(notifier) = &notifier {
            let signal = evaluation.signal;
            if signal.is_actionable() && last_notified != Some(signal) {
                notifier
                    .notify(&format_signal_message(cli.symbol, signal, now_ist()))
                    .await;
            }
            last_notified = Some(signal);
        }

        if cli.once {
            break;
        }
    }

    let position = tracker.snapshot().await;
    tracing::info!(
        "👋 indexbot stopped (position entry: {:?})",
        position.entry_price()
    );
    Ok(())
}

fn window_for(cli: &Cli) -> CandleWindow {
    let now = now_ist();
    match (cli.from, cli.to) {
        (None, None) => CandleWindow::default_for(now),
        (from, to) => {
            let end = to.unwrap_or(now.date());
            let start = from.unwrap_or_else(|| end.pred_opt().unwrap_or(end));
            CandleWindow::for_dates(start, end, now)
        }
    }
}

fn render(cli: &Cli, request: &CandleRequest, series: &Series, evaluation: &Evaluation) {
    println!();
    println!(
        "{} | {} | {} → {}",
        cli.symbol,
        cli.interval.label(),
        request.window.from_param(),
        request.window.to_param()
    );

    match evaluation.readiness {
        Readiness::NoData => {
            println!(
                "No candle data returned for the selected date range/interval. \
                 Try a different date range, ensure it's a trading day and within market hours, or change the interval."
            );
            return;
        }
        Readiness::IndicatorsNotReady => {
            println!("Not enough candles to compute indicators yet. Showing data only.");
        }
        Readiness::Ready => {}
    }

    println!("📊 Latest Signal: {}", evaluation.signal);
    if let Some(pnl) = evaluation.pnl {
        println!("💰 Profit/Loss: ₹{:.2}", pnl);
    }

    println!(
        "{:<20} {:>10} {:>10} {:>10} {:>10} {:>10} {:>6} {:>9} {:>6}",
        "Time", "Close", "EMA20", "EMA50", "RSI", "MACD", "Vol", "AvgVol", "Spike"
    );
    println!("{}", "─".repeat(100));

    for row in series.tail(cli.rows) {
        println!(
            "{:<20} {:>10.2} {:>10} {:>10} {:>10} {:>10} {:>6} {:>9} {:>6}",
            to_ist(row.timestamp).format("%Y-%m-%d %H:%M").to_string(),
            row.close,
            fmt_opt(row.ema_short),
            fmt_opt(row.ema_long),
            fmt_opt(row.rsi),
            fmt_opt(row.macd.map(|m| m.macd)),
            row.volume.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string()),
            fmt_opt(row.avg_volume),
            row.volume_spike.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string()),
        );
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "-".to_string())
}
