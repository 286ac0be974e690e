//! Long running watcher behind `ibc monitor`: alerts on boiler errors, records the
//! daily cycle counts and sends a weekly summary.

use std::{path::PathBuf, time::Duration};

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, Timelike, Weekday};
use tracing::{debug, info, warn};

use crate::{
    boiler::{Boiler, BoilerData},
    cycles::{self, DailyCycles, WeeklySummary},
    report::{Html, StatusReport, WeeklyHtml},
};

/// How often the boiler is polled.
pub const CHECK_INTERVAL: Duration = Duration::from_secs(5 * 60);

// The daily record is taken on the first check after this time
const DAILY_RECORD_AFTER: (u32, u32) = (23, 50);

/// Delivers alert and summary messages. The body is HTML.
pub trait Notifier {
    fn notify(&mut self, subject: &str, body: &str) -> anyhow::Result<()>;
}

/// Reports notifications through the log.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, subject: &str, body: &str) -> anyhow::Result<()> {
        info!(subject, bytes = body.len(), "notification");
        debug!("{}", body);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// CSV file holding one row of cycle counts per day
    pub daily_log_file: PathBuf,
    /// Don't alert on warnings, only on errors
    pub ignore_warnings: bool,
    /// Minimum time between two notifications
    pub mute: chrono::Duration,
    /// Send a status notification on startup
    pub notify_on_start: bool,
}

/// Returns true when the boiler is in a state worth alerting about.
pub fn needs_alert(data: &BoilerData, ignore_warnings: bool) -> bool {
    let normal = data.system_status().map_or(false, |status| status.is_normal());
    !normal || (data.warnings > 0 && !ignore_warnings)
}

/// The daily record is due once per day, late in the evening.
pub fn is_daily_record_due(now: NaiveDateTime, last_recorded: Option<NaiveDate>) -> bool {
    (now.hour(), now.minute()) >= DAILY_RECORD_AFTER && last_recorded != Some(now.date())
}

/// Tracks the last notification to rate limit alerts.
#[derive(Debug, Clone)]
pub struct Mute {
    duration: chrono::Duration,
    last_notified: Option<DateTime<Local>>,
}

impl Mute {
    pub fn new(duration: chrono::Duration) -> Self {
        Self {
            duration,
            last_notified: None,
        }
    }

    pub fn is_muted(&self, now: DateTime<Local>) -> bool {
        self.last_notified
            .map_or(false, |last| now <= last + self.duration)
    }

    pub fn notified(&mut self, now: DateTime<Local>) {
        self.last_notified = Some(now);
    }
}

pub struct Monitor<N: Notifier> {
    boiler: Boiler,
    config: MonitorConfig,
    notifier: N,
    mute: Mute,
    last_recorded: Option<NaiveDate>,
}

impl<N: Notifier> Monitor<N> {
    pub fn new(boiler: Boiler, config: MonitorConfig, notifier: N) -> Self {
        let mute = Mute::new(config.mute);
        Self {
            boiler,
            config,
            notifier,
            mute,
            last_recorded: None,
        }
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Fetches everything shown in a status report.
    pub async fn status_report(&self) -> anyhow::Result<StatusReport> {
        Ok(StatusReport {
            boiler: self.boiler.get_boiler_data().await?,
            detail: self.boiler.get_boiler_ext_detail_data().await?,
            loads: self.boiler.get_load_status_data().await?,
        })
    }

    /// Sends the current boiler status.
    pub async fn notify_status(&mut self, now: DateTime<Local>) -> anyhow::Result<()> {
        let report = self.status_report().await?;
        let fault = report.detail.fault();
        info!(
            status = %report.detail.status,
            category = %fault.category,
            fault = fault.label,
            "sending boiler alert"
        );

        self.notifier
            .notify("Boiler Alert", &Html(&report).to_string())?;
        self.mute.notified(now);
        Ok(())
    }

    /// Alerts when the boiler reports an error, or a warning unless those are ignored.
    pub async fn check_errors(&mut self, now: DateTime<Local>) -> anyhow::Result<()> {
        let data = self.boiler.get_boiler_data().await?;
        if !needs_alert(&data, self.config.ignore_warnings) {
            return Ok(());
        }

        if self.mute.is_muted(now) {
            debug!(status = data.status, "alert muted");
            return Ok(());
        }
        self.notify_status(now).await
    }

    /// Appends today's cycle counts when due. On Saturdays the weekly summary follows.
    pub async fn record_daily_cycles(&mut self, now: DateTime<Local>) -> anyhow::Result<()> {
        if !is_daily_record_due(now.naive_local(), self.last_recorded) {
            return Ok(());
        }

        let detail = self.boiler.get_boiler_ext_detail_data().await?;
        let loads = self.boiler.get_load_status_data().await?;
        let row = DailyCycles::new(now.date_naive(), detail.cycles, &loads);
        cycles::append(&self.config.daily_log_file, &row)?;
        self.last_recorded = Some(now.date_naive());
        info!(date = %row.date, total = row.counts[0], "recorded daily cycles");

        if now.weekday() == Weekday::Sat {
            self.send_weekly_summary()?;
        }
        Ok(())
    }

    /// Sends the weekly cycle comparison built from the daily CSV.
    pub fn send_weekly_summary(&mut self) -> anyhow::Result<()> {
        let summary = WeeklySummary::load(&self.config.daily_log_file)?;
        self.notifier
            .notify("Weekly Boiler Summary", &WeeklyHtml(&summary).to_string())
    }

    /// Runs until Ctrl-C. Failures of a single check are logged and the next check proceeds.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        // Fail early when the daily CSV can't be written
        cycles::touch(&self.config.daily_log_file)?;

        let now = Local::now();
        log_failure("daily record", self.record_daily_cycles(now).await);
        if self.config.notify_on_start {
            log_failure("status notification", self.notify_status(now).await);
        } else {
            log_failure("error check", self.check_errors(now).await);
        }

        info!("monitoring...");
        let start = tokio::time::Instant::now() + CHECK_INTERVAL;
        let mut ticker = tokio::time::interval_at(start, CHECK_INTERVAL);
        let sig = tokio::signal::ctrl_c();
        tokio::pin!(sig);

        loop {
            tokio::select! {
                biased;
                _ = &mut sig => {
                    info!("shutdown requested");
                    break;
                }
                _ = ticker.tick() => {
                    let now = Local::now();
                    log_failure("daily record", self.record_daily_cycles(now).await);
                    log_failure("error check", self.check_errors(now).await);
                }
            }
        }

        Ok(())
    }
}

fn log_failure(what: &str, result: anyhow::Result<()>) {
    if let Err(e) = result {
        warn!(error = %e, "{} failed", what);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Default)]
    struct Recorder {
        sent: Vec<(String, String)>,
    }

    impl Notifier for Recorder {
        fn notify(&mut self, subject: &str, body: &str) -> anyhow::Result<()> {
            self.sent.push((subject.to_string(), body.to_string()));
            Ok(())
        }
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2019, 1, 5)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_needs_alert() {
        let data = |status, warnings| BoilerData {
            status,
            warnings,
            ..Default::default()
        };

        assert!(!needs_alert(&data(0, 0), false));
        assert!(!needs_alert(&data(3, 0), false));
        assert!(!needs_alert(&data(6, 0), false));

        // Purging and error states alert, as do unknown states
        assert!(needs_alert(&data(1, 0), false));
        assert!(needs_alert(&data(5, 0), true));
        assert!(needs_alert(&data(42, 0), false));

        assert!(needs_alert(&data(3, 2), false));
        assert!(!needs_alert(&data(3, 2), true));
    }

    #[test]
    fn test_daily_record_due() {
        let today = at(0, 0).date();
        let yesterday = today.pred_opt().unwrap();

        assert!(!is_daily_record_due(at(12, 0), None));
        assert!(!is_daily_record_due(at(23, 49), None));
        assert!(is_daily_record_due(at(23, 50), None));
        assert!(is_daily_record_due(at(23, 55), Some(yesterday)));
        assert!(!is_daily_record_due(at(23, 55), Some(today)));
    }

    #[test]
    fn test_mute() {
        let mut mute = Mute::new(chrono::Duration::minutes(60));
        let start = Local.with_ymd_and_hms(2019, 1, 5, 10, 0, 0).unwrap();

        assert!(!mute.is_muted(start));
        mute.notified(start);
        assert!(mute.is_muted(start + chrono::Duration::minutes(30)));
        assert!(mute.is_muted(start + chrono::Duration::minutes(60)));
        assert!(!mute.is_muted(start + chrono::Duration::minutes(61)));
    }

    #[test]
    fn test_weekly_summary_notification() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("daily.csv");
        for day in 1..=3 {
            let row = DailyCycles {
                date: format!("2019-01-0{}", day),
                counts: [10, 1, 0, 0, 0],
            };
            cycles::append(&path, &row).unwrap();
        }

        let config = MonitorConfig {
            daily_log_file: path,
            ignore_warnings: false,
            mute: chrono::Duration::minutes(60),
            notify_on_start: false,
        };
        let mut monitor = Monitor::new(
            Boiler::new("http://127.0.0.1:9").unwrap(),
            config,
            Recorder::default(),
        );
        monitor.send_weekly_summary().unwrap();

        let sent = &monitor.notifier().sent;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "Weekly Boiler Summary");
        assert!(sent[0].1.contains("<tr><td>This Week</td><td>30</td><td>3</td>"));
    }

    #[tokio::test]
    async fn test_record_not_due_skips_boiler() {
        let dir = tempfile::tempdir().unwrap();
        let config = MonitorConfig {
            daily_log_file: dir.path().join("daily.csv"),
            ignore_warnings: false,
            mute: chrono::Duration::minutes(60),
            notify_on_start: false,
        };
        let mut monitor = Monitor::new(
            Boiler::new("http://127.0.0.1:9").unwrap(),
            config,
            Recorder::default(),
        );

        // The boiler is unreachable, so this only passes if no request is made
        let noon = Local.with_ymd_and_hms(2019, 1, 5, 12, 0, 0).unwrap();
        monitor.record_daily_cycles(noon).await.unwrap();
        assert!(monitor.notifier().sent.is_empty());
    }
}
