//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - builds the backend client from env + flags
//! - dispatches to the live dashboard or a one-shot command
//! - prints reports and writes optional exports

use std::time::Duration;

use clap::Parser;
use log::info;

use crate::cli::{Command, DayArgs, WatchArgs};
use crate::data::{ApiClient, ClientConfig, DashboardApi, date_key, today};
use crate::domain::{DataSource, PollConfig, SyncResult};
use crate::error::AppError;
use crate::io::{SummaryFile, read_summary_json, write_summary_json};
use crate::poller::{Poller, run_loop};
use crate::report::{self, TerminalSink};

pub mod pipeline;

/// Entry point for the `fit2go` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    if let Command::Day(args) = &cli.command {
        if let Some(path) = &args.from_file {
            let file = read_summary_json(path)?;
            println!("{}", report::format_integrated_summary(&date_key(file.date), &file.summary));
            return Ok(());
        }
    }

    let config = ClientConfig::from_env()?.with_base_url(cli.base_url);
    let client = ApiClient::new(&config)?;
    info!("Using backend {}", client.base_url());

    match cli.command {
        Command::Watch(args) => handle_watch(client, &args),
        Command::Day(args) => handle_day(&client, &args),
        Command::Calendar => {
            println!("{}", report::format_session_list(&client.session_dates()?));
            Ok(())
        }
        Command::Session { id } => {
            println!("{}", report::format_session_detail(&client.session_detail(id)?));
            Ok(())
        }
        Command::Stats { date } => {
            let date = date.unwrap_or_else(today);
            println!("Stats for {}", date_key(date));
            println!("{}", report::format_daily_buckets(&client.daily_stats(Some(date))?));
            Ok(())
        }
        Command::Cumulative => {
            println!("{}", report::format_cumulative(&client.cumulative()?));
            Ok(())
        }
        Command::End { id, no_auto_sync } => {
            let config = PollConfig { auto_sync: !no_auto_sync, ..PollConfig::default() };
            let mut poller = Poller::new(client, TerminalSink::stdout(), config);
            let resp = poller.end_session(id)?;
            if !resp.success {
                return Err(AppError::sync(format!(
                    "Session {id} was not ended: {}",
                    resp.error.as_deref().unwrap_or("unknown error")
                )));
            }
            resp.sync_result.as_ref().map_or(Ok(()), check_sync)
        }
        Command::Sync { id } => {
            let mut poller = Poller::new(client, TerminalSink::stdout(), PollConfig::default());
            check_sync(&poller.sync_session(id)?)
        }
    }
}

pub fn poll_config_from_args(args: &WatchArgs) -> Result<PollConfig, AppError> {
    if args.live_interval == 0 || args.summary_interval == 0 || args.cumulative_interval == 0 {
        return Err(AppError::config("Refresh intervals must be at least 1 second."));
    }
    if args.history_minutes <= 0 {
        return Err(AppError::config("History window must be at least 1 minute."));
    }
    Ok(PollConfig {
        live_interval: Duration::from_secs(args.live_interval),
        summary_interval: Duration::from_secs(args.summary_interval),
        cumulative_interval: Duration::from_secs(args.cumulative_interval),
        history_window: chrono::Duration::minutes(args.history_minutes),
        auto_sync: !args.no_auto_sync,
        run_for: args.duration.map(Duration::from_secs),
    })
}

fn handle_watch(client: ApiClient, args: &WatchArgs) -> Result<(), AppError> {
    let config = poll_config_from_args(args)?;
    let mut poller = Poller::new(client, TerminalSink::stdout(), config);
    run_loop(&mut poller);
    Ok(())
}

fn handle_day(client: &ApiClient, args: &DayArgs) -> Result<(), AppError> {
    let date = args.date.unwrap_or_else(today);
    let sources = if args.sources.is_empty() {
        DataSource::ALL.to_vec()
    } else {
        args.sources.clone()
    };

    let file = if args.server {
        SummaryFile::new(date, sources, client.integrated(date)?)
    } else {
        let out = pipeline::run_daily(date, &sources, |source, date| client.source_daily(source, date));
        for (source, err) in &out.failed {
            eprintln!("warning: {} skipped: {err}", source.display_name());
        }
        SummaryFile::new(out.date, out.loaded, out.summary)
    };

    println!("{}", report::format_integrated_summary(&date_key(date), &file.summary));

    if let Some(path) = &args.export {
        write_summary_json(path, &file)?;
        info!("Wrote {}", path.display());
    }

    Ok(())
}

/// Any failed target makes the command fail; the sink has already shown
/// each target's outcome.
fn check_sync(result: &SyncResult) -> Result<(), AppError> {
    let failed: Vec<&str> = result
        .targets()
        .into_iter()
        .filter(|(_, outcome)| !outcome.success)
        .map(|(target, _)| target.display_name())
        .collect();
    if failed.is_empty() {
        Ok(())
    } else {
        Err(AppError::sync(format!("Sync failed for {}", failed.join(", "))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn watch_args() -> WatchArgs {
        WatchArgs {
            live_interval: 1,
            summary_interval: 60,
            cumulative_interval: 60,
            history_minutes: 30,
            no_auto_sync: false,
            duration: None,
        }
    }

    #[test]
    fn poll_config_from_defaults() {
        let config = poll_config_from_args(&watch_args()).unwrap();
        assert_eq!(config.live_interval, Duration::from_secs(1));
        assert_eq!(config.history_window, chrono::Duration::minutes(30));
        assert!(config.auto_sync);
        assert_eq!(config.run_for, None);
    }

    #[test]
    fn poll_config_rejects_zero_interval() {
        let args = WatchArgs { live_interval: 0, ..watch_args() };
        assert!(poll_config_from_args(&args).is_err());
        let args = WatchArgs { history_minutes: 0, ..watch_args() };
        assert!(poll_config_from_args(&args).is_err());
    }

    #[test]
    fn poll_config_accepts_huge_intervals() {
        let args = WatchArgs { summary_interval: u64::MAX, duration: Some(u64::MAX), ..watch_args() };
        let config = poll_config_from_args(&args).unwrap();
        assert_eq!(config.summary_interval, Duration::from_secs(u64::MAX));

        let start = std::time::Instant::now();
        let mut schedule = crate::poller::Schedule::new(&config, start);
        assert_eq!(schedule.due(start).len(), 3);
        assert!(schedule.due(start).is_empty());
    }

    #[test]
    fn failed_sync_target_fails_the_command() {
        use crate::domain::TargetOutcome;
        let ok = TargetOutcome { success: true, error: None };
        let all_ok = SyncResult { google_fit: ok.clone(), health_connect: ok.clone() };
        assert!(check_sync(&all_ok).is_ok());

        let partial = SyncResult {
            google_fit: ok,
            health_connect: TargetOutcome { success: false, error: Some("not linked".to_string()) },
        };
        let err = check_sync(&partial).unwrap_err();
        assert_eq!(err.exit_code(), 5);
        assert_eq!(err.to_string(), "Sync failed for Health Connect");
    }
}
