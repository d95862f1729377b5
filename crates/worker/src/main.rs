use anyhow::Context;
use clap::Parser;
use dealpost_core::pipeline::{RunOutcome, RunStatus};
use dealpost_core::time::schedule;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "dealpost_worker")]
struct Args {
    /// Report date (YYYY-MM-DD). Implies a single run. Defaults to today in
    /// the schedule's UTC+8 clock.
    #[arg(long)]
    date: Option<String>,

    /// Run the pipeline once and exit instead of starting the daily loop.
    #[arg(long)]
    once: bool,

    /// Fetch and rank only; skip rendering and delivery.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = dealpost_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let source = dealpost_core::ingest::build_source(&settings)?;

    if args.dry_run {
        let date = dealpost_core::time::resolve_run_date(args.date.as_deref(), chrono::Utc::now())?;
        return dry_run(&settings, source.as_ref(), date).await;
    }

    if args.once || args.date.is_some() {
        let date = dealpost_core::time::resolve_run_date(args.date.as_deref(), chrono::Utc::now())?;
        let outcome = dealpost_core::pipeline::run(&settings, source.as_ref(), date).await;
        deliver(&outcome);
        return Ok(());
    }

    run_daily_loop(&settings, source.as_ref()).await
}

async fn run_daily_loop(
    settings: &dealpost_core::config::Settings,
    source: &dyn dealpost_core::ingest::DealSource,
) -> anyhow::Result<()> {
    let (hour, minute) = schedule::parse_schedule_time(&settings.schedule_time);
    tracing::info!(hour, minute, "daily report loop started");

    loop {
        let delay = schedule::next_run_delay(chrono::Utc::now(), hour, minute);
        tracing::info!(delay_secs = delay.as_secs(), "sleeping until next run");

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            res = tokio::signal::ctrl_c() => {
                res.context("failed to listen for shutdown signal")?;
                tracing::info!("shutdown signal received, exiting loop");
                return Ok(());
            }
        }

        let date = dealpost_core::time::local_today(chrono::Utc::now());
        let outcome = dealpost_core::pipeline::run(settings, source, date).await;
        deliver(&outcome);
    }
}

async fn dry_run(
    settings: &dealpost_core::config::Settings,
    source: &dyn dealpost_core::ingest::DealSource,
    date: chrono::NaiveDate,
) -> anyhow::Result<()> {
    let records = match source.fetch(&settings.brands).await {
        Ok(records) => records,
        Err(err) => {
            tracing::error!(error = %err, "dry-run fetch failed");
            return Ok(());
        }
    };

    let deals: Vec<_> = records
        .into_iter()
        .map(|raw| dealpost_core::normalize::normalize(raw, date))
        .collect();
    let (ordered, best_index) = dealpost_core::rank::rank(deals);

    tracing::info!(
        %date,
        dry_run = true,
        deals = ordered.len(),
        ?best_index,
        theme = dealpost_core::theme::resolve(date).map(|t| t.name),
        "dry-run complete"
    );
    Ok(())
}

/// Hand the outcome to the notification channel. The actual transport lives
/// outside this binary; here delivery is a structured log plus a stdout line
/// a wrapper can forward.
fn deliver(outcome: &RunOutcome) {
    match outcome.status {
        RunStatus::Success => {
            tracing::info!(
                path = ?outcome.artifact_path,
                caption = %outcome.caption,
                "report ready"
            );
        }
        RunStatus::NoData | RunStatus::FetchFailed | RunStatus::RenderFailed => {
            tracing::warn!(status = ?outcome.status, caption = %outcome.caption, "report degraded");
        }
    }

    match &outcome.artifact_path {
        Some(path) => println!("{}\t{}", outcome.caption, path.display()),
        None => println!("{}", outcome.caption),
    }
}

fn init_sentry(settings: &dealpost_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
