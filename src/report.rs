//! Console and HTML renderings of the boiler state, used by `ibc status` and the
//! monitor notifications.

use std::fmt::{self, Display, Formatter};

use crate::{
    boiler::{temp_as_f, BoilerData, BoilerExtDetailData, LoadStatusData},
    cycles::{WeeklySummary, COLUMNS},
    loads::join_loads,
};

/// Everything shown in a status report.
#[derive(Debug, Clone, Default)]
pub struct StatusReport {
    pub boiler: BoilerData,
    pub detail: BoilerExtDetailData,
    pub loads: Vec<LoadStatusData>,
}

/// Plain text rendering of a [`StatusReport`].
pub struct Console<'a>(pub &'a StatusReport);

/// HTML rendering of a [`StatusReport`], suitable for a mail body.
pub struct Html<'a>(pub &'a StatusReport);

/// HTML rendering of a [`WeeklySummary`].
pub struct WeeklyHtml<'a>(pub &'a WeeklySummary);

struct Row<'a> {
    label: &'a str,
    value: String,
}

impl StatusReport {
    fn rows(&self) -> Vec<Row<'static>> {
        let b = &self.boiler;
        let d = &self.detail;
        let row = |label: &'static str, value: String| Row { label, value };

        vec![
            row("Boiler Model", b.model.clone()),
            row(
                "Firmware",
                format!("{} {}", b.firmware_version, b.firmware_date),
            ),
            row("Boiler Status", d.status.clone()),
            row("Errors", d.errors.clone()),
            row("Warnings", d.warnings.clone()),
            row("Fault", d.fault().label.to_string()),
            row("Supply Temp", format!("{}F", temp_as_f(d.supply_temp))),
            row("Return Temp", format!("{}F", temp_as_f(d.return_temp))),
            row("DWH Tank Temp", format!("{}F", temp_as_f(d.tank_temp))),
            row("Cycles", d.cycles.to_string()),
            row("Servicing", join_loads(&d.servicing_loads())),
            row("Calling", join_loads(&d.calling_loads())),
            row("Circulating", join_loads(&d.circulating_loads())),
        ]
    }
}

fn load_rows(load: &LoadStatusData) -> [Row<'static>; 3] {
    [
        Row {
            label: "Load Type",
            value: load.load_type_name().to_string(),
        },
        Row {
            label: "Heat Output",
            value: format!("{} MBtu", load.heat_out),
        },
        Row {
            label: "Load Cycles",
            value: load.cycles.to_string(),
        },
    ]
}

impl Display for Console<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for row in self.0.rows() {
            // Values line up after the longest label
            let line = format!("{:<15}{}", format!("{}:", row.label), row.value);
            writeln!(f, "{}", line.trim_end())?;
        }
        writeln!(f)?;

        for load in &self.0.loads {
            writeln!(f, "Load Number: {}", load.load_number())?;
            for row in load_rows(load) {
                writeln!(f, "{}: {}", row.label, row.value)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Display for Html<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "<body>")?;
        writeln!(f, "<div>")?;
        writeln!(f, "<h1>Boiler Status</h1>")?;
        for row in self.0.rows() {
            writeln!(f, "{}: {}<br/>", row.label, Escaped(&row.value))?;
        }
        writeln!(f, "</div>")?;

        for load in &self.0.loads {
            writeln!(f, "<div>")?;
            writeln!(f, "<h2>Load {} Status</h2>", load.load_number())?;
            for row in load_rows(load) {
                writeln!(f, "{}: {}<br/>", row.label, Escaped(&row.value))?;
            }
            writeln!(f, "</div>")?;
        }
        writeln!(f, "</body>")
    }
}

impl Display for WeeklyHtml<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let summary = self.0;
        writeln!(f, "<body>")?;
        writeln!(f, "<div>")?;
        writeln!(f, "<h1>Boiler Weekly Summary</h1>")?;

        for day in &summary.days {
            writeln!(f, "<div>")?;
            writeln!(f, "<h3>{}</h3>", Escaped(&day.date))?;
            writeln!(f, "Total Cycles: {}<br/>", day.counts[0])?;
            for (i, count) in day.counts[1..].iter().enumerate() {
                writeln!(f, "Load {}: {}<br/>", i + 1, count)?;
            }
            writeln!(f, "</div>")?;
        }

        writeln!(f, "<div>")?;
        writeln!(f, "<h2>Weekly Comparison:</h2>")?;
        writeln!(f, "<table>")?;
        write!(f, "<tr><th>Week</th><th>Total</th>")?;
        for load in 1..COLUMNS {
            write!(f, "<th>Load {}</th>", load)?;
        }
        writeln!(f, "</tr>")?;
        for (name, values) in [
            ("This Week", &summary.current),
            ("Last Week", &summary.last),
            ("Delta", &summary.delta),
        ] {
            write!(f, "<tr><td>{}</td>", name)?;
            for v in values {
                write!(f, "<td>{}</td>", v)?;
            }
            writeln!(f, "</tr>")?;
        }
        writeln!(f, "</table>")?;
        writeln!(f, "</div>")?;
        writeln!(f, "</div>")?;
        writeln!(f, "</body>")
    }
}

struct Escaped<'a>(&'a str);

impl Display for Escaped<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for c in self.0.chars() {
            match c {
                '<' => f.write_str("&lt;")?,
                '>' => f.write_str("&gt;")?,
                '&' => f.write_str("&amp;")?,
                '"' => f.write_str("&#34;")?,
                '\'' => f.write_str("&#39;")?,
                c => write!(f, "{}", c)?,
            }
        }
        Ok(())
    }
}
