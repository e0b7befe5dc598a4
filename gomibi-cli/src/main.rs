//! Command line notifier for Saga City trash collection days.
#![expect(
    clippy::print_stdout,
    reason = "commands report their results on stdout"
)]

mod cli;
mod dry_run;
mod logging;

use std::{path::PathBuf, process::ExitCode, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use gomibi_core::{
    ConfigKey, FileConfig, NotifyService, RelayPort, Settings, TrashCategory, config,
    date_heading,
};
use gomibi_relay_discord as discord;
use reqwest::Client;

use crate::cli::{Cli, Command, DigestArgs, NotifyArgs, ShowArgs, WebhookArgs};
use crate::dry_run::DryRunRelay;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let dotenv_path = dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Some(path) = dotenv_path {
        tracing::debug!(path = %path.display(), "loaded environment file");
    }

    let config_file = cli.config;
    match cli.command {
        Command::Notify(args) => notify(config_file, &args).await,
        Command::Show(args) => show(config_file, &args),
        Command::Digest(args) => digest(config_file, &args).await,
        Command::SelfTest => self_test(config_file),
        Command::CheckConfig(args) => check_config(config_file, &args),
    }
}

async fn notify(config_file: Option<PathBuf>, args: &NotifyArgs) -> Result<ExitCode> {
    let settings = load_settings(config_file, args.webhook.webhook_url.as_deref())?;
    let service = build_service(&settings, relay_for(&settings, args.dry_run)?);

    let now = Local::now().naive_local();
    tracing::info!(%now, "collection notification started");
    let outcome = service.run(now, args.day.map(Into::into)).await;
    tracing::info!(?outcome, "collection notification finished");

    Ok(ExitCode::SUCCESS)
}

fn show(config_file: Option<PathBuf>, args: &ShowArgs) -> Result<ExitCode> {
    let settings = load_settings(config_file, None)?;
    let calculator = settings.calculator();
    let start = args.date.unwrap_or_else(|| Local::now().date_naive());

    for date in start.iter_days().take(usize::try_from(args.days)?) {
        let categories = calculator.categories_for(date);
        println!("{date} {} {}", date_heading(date), labels(&categories));
    }

    Ok(ExitCode::SUCCESS)
}

async fn digest(config_file: Option<PathBuf>, args: &DigestArgs) -> Result<ExitCode> {
    let settings = load_settings(config_file, args.webhook.webhook_url.as_deref())?;
    let service = build_service(&settings, relay_for(&settings, args.dry_run)?);
    let interval = args
        .interval_ms
        .map_or(settings.digest_interval, Duration::from_millis);

    let report = service
        .digest(Local::now().date_naive(), args.days, interval)
        .await;
    println!(
        "{} collection days: {} sent, {} failed, {} skipped",
        report.total, report.sent, report.failed, report.skipped
    );

    Ok(ExitCode::SUCCESS)
}

fn self_test(config_file: Option<PathBuf>) -> Result<ExitCode> {
    let settings = load_settings(config_file, None)?;
    let service = build_service(&settings, Arc::new(DryRunRelay));

    let report = service.self_test();
    for case in &report.cases {
        let verdict = if case.passed() { "ok" } else { "FAILED" };
        println!(
            "{} {verdict}: expected {}, got {}",
            case.date,
            labels(&case.expected),
            labels(&case.actual)
        );
    }
    println!("{}/{} passed", report.passed(), report.cases.len());

    Ok(if report.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn check_config(config_file: Option<PathBuf>, args: &WebhookArgs) -> Result<ExitCode> {
    let settings = load_settings(config_file, args.webhook_url.as_deref())?;

    for key in ConfigKey::ALL {
        let state = if config::process_env(key).is_some() {
            "set"
        } else {
            "unset"
        };
        println!("{key}: {state}");
    }
    println!("webhook: {}", settings.webhook);

    Ok(if settings.check_configuration() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn load_settings(config_file: Option<PathBuf>, webhook_url: Option<&str>) -> Result<Settings> {
    let file = match config::config_path(config_file, config::process_env) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config file");
            FileConfig::load(&path)
                .with_context(|| format!("failed to load config from {}", path.display()))?
        }
        None => FileConfig::default(),
    };

    Settings::resolve(file, webhook_url, config::process_env).context("invalid configuration")
}

fn relay_for(settings: &Settings, dry_run: bool) -> Result<Arc<dyn RelayPort>> {
    if dry_run {
        return Ok(Arc::new(DryRunRelay));
    }

    let client = Client::builder()
        .user_agent(concat!("gomibi/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(discord::relay(client, settings.webhook.clone()))
}

fn build_service(settings: &Settings, relay: Arc<dyn RelayPort>) -> NotifyService {
    NotifyService::new(
        settings.calculator(),
        settings.eras.clone(),
        settings.window,
        relay,
    )
}

fn labels(categories: &[TrashCategory]) -> String {
    if categories.is_empty() {
        return "-".to_owned();
    }
    categories
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("、")
}
