//! Periodic telemetry rows appended to a CSV file by `ibc log`.

use std::{
    fs::OpenOptions,
    io::{self, Write},
    path::Path,
    time::Duration,
};

use chrono::{DateTime, Local, SecondsFormat};
use tracing::{info, warn};

use crate::{
    boiler::{Boiler, BoilerExtDetailData},
    loads::join_loads,
};

pub const HEADER: [&str; 23] = [
    "time",
    "status",
    "errors",
    "warnings",
    "servicingLoads",
    "fault",
    "airTemp",
    "cycles",
    "indoorTemp",
    "mbh",
    "opStatus",
    "outdoorTemp",
    "pumps",
    "returnTemp",
    "secondaryTemp",
    "servicing",
    "stackTemp",
    "supplyTemp",
    "tankTemp",
    "targetTemp",
    "deltaPressure",
    "inletPressure",
    "outletPressure",
];

/// Builds the CSV fields for one telemetry sample.
pub fn record(time: DateTime<Local>, d: &BoilerExtDetailData) -> Vec<String> {
    vec![
        time.to_rfc3339_opts(SecondsFormat::Secs, false),
        d.status.clone(),
        d.errors.clone(),
        d.warnings.clone(),
        join_loads(&d.servicing_loads()),
        d.fault().label.to_string(),
        d.air_temp.to_string(),
        d.cycles.to_string(),
        d.indoor_temp.to_string(),
        d.mbh.to_string(),
        d.op_status.to_string(),
        d.outdoor_temp.to_string(),
        d.pumps.to_string(),
        d.return_temp.to_string(),
        d.secondary_temp.to_string(),
        d.servicing.to_string(),
        d.stack_temp.to_string(),
        d.supply_temp.to_string(),
        d.tank_temp.to_string(),
        d.target_temp.to_string(),
        format!("{:.2}", d.delta_pressure),
        format!("{:.2}", d.inlet_pressure),
        format!("{:.2}", d.outlet_pressure),
    ]
}

/// Writes a single CSV record, quoting fields that need it.
pub fn write_record<W: Write, S: AsRef<str>>(w: &mut W, fields: &[S]) -> io::Result<()> {
    let line = fields
        .iter()
        .map(|field| quote(field.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    writeln!(w, "{}", line)
}

fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) || field.starts_with(' ') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Appends telemetry rows to a CSV file.
pub struct CsvLogger<W: Write> {
    writer: W,
}

impl CsvLogger<std::fs::File> {
    /// Opens `path` for appending. The header is written when the file is new or empty.
    pub fn open(path: &Path) -> io::Result<Self> {
        let f = OpenOptions::new().append(true).create(true).open(path)?;
        let empty = f.metadata()?.len() == 0;
        CsvLogger::new(f, empty)
    }
}

impl<W: Write> CsvLogger<W> {
    pub fn new(writer: W, write_header: bool) -> io::Result<Self> {
        let mut logger = Self { writer };
        if write_header {
            write_record(&mut logger.writer, &HEADER[..])?;
            logger.writer.flush()?;
        }
        Ok(logger)
    }

    pub fn log(&mut self, time: DateTime<Local>, detail: &BoilerExtDetailData) -> io::Result<()> {
        write_record(&mut self.writer, record(time, detail).as_slice())?;
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Polls the boiler every `interval` and logs a row, until Ctrl-C.
/// A failed poll is reported and skipped.
pub async fn run<W: Write>(
    boiler: &Boiler,
    logger: &mut CsvLogger<W>,
    interval: Duration,
) -> anyhow::Result<()> {
    let mut ticker = tokio::time::interval(interval);
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
                match boiler.get_boiler_ext_detail_data().await {
                    Ok(detail) => {
                        logger.log(Local::now(), &detail)?;
                        info!(status = %detail.status, fault = detail.fault().label, "logged boiler data");
                    }
                    Err(e) => warn!(error = %e, "failed to poll boiler"),
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_quote() {
        assert_eq!(quote("Heating"), "Heating");
        assert_eq!(quote("1,2"), "\"1,2\"");
        assert_eq!(quote("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(quote(""), "");
    }

    #[test]
    fn test_log_rows() {
        let detail = BoilerExtDetailData {
            status: "Heating".into(),
            servicing: 0x3,
            minor_error: 0x0200,
            cycles: 42,
            outdoor_temp: -8,
            inlet_pressure: 14.5,
            outlet_pressure: 15.0,
            delta_pressure: 0.75,
            ..Default::default()
        };
        let time = Local.with_ymd_and_hms(2019, 1, 5, 10, 30, 0).unwrap();

        let mut logger = CsvLogger::new(Vec::new(), true).unwrap();
        logger.log(time, &detail).unwrap();
        let out = String::from_utf8(logger.into_inner()).unwrap();

        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], HEADER.join(","));

        let expected_time = time.to_rfc3339_opts(SecondsFormat::Secs, false);
        assert_eq!(
            lines[1],
            format!(
                "{},Heating,,,\"1,2\",Fan Pressure,0,42,0,0,0,-8,0,0,0,3,0,0,0,0,0.75,14.50,15.00",
                expected_time
            )
        );
    }

    #[test]
    fn test_no_header_when_appending() {
        let logger = CsvLogger::new(Vec::new(), false).unwrap();
        assert!(logger.into_inner().is_empty());
    }

    #[test]
    fn test_open_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("boiler.csv");

        let detail = BoilerExtDetailData::default();
        for _ in 0..2 {
            let mut logger = CsvLogger::open(&path).unwrap();
            logger.log(Local::now(), &detail).unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 3);
        assert!(contents.starts_with("time,status,"));
    }
}
