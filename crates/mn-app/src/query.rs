//! Query helpers for extracting data from loaded runs.

use std::fmt::Write as _;
use std::str::FromStr;

use mn_results::TimeseriesRecord;

use crate::error::{AppError, AppResult};

/// Summary of a run's time range and value envelopes.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub time_range: (f64, f64),
    pub record_count: usize,
    pub v_range: (f64, f64),
    pub x_range: (f64, f64),
    pub i_range: (f64, f64),
    pub xsv_excursions: usize,
}

/// Recorded quantity of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variable {
    /// Capacitor voltage (V)
    V,
    /// Memristor state
    X,
    /// Input current (A)
    I,
}

impl Variable {
    pub const ALL: [Variable; 3] = [Variable::V, Variable::X, Variable::I];

    pub fn column(&self) -> &'static str {
        match self {
            Variable::V => "v",
            Variable::X => "x",
            Variable::I => "i",
        }
    }

    fn of(&self, record: &TimeseriesRecord) -> f64 {
        match self {
            Variable::V => record.v,
            Variable::X => record.x,
            Variable::I => record.i,
        }
    }
}

impl FromStr for Variable {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "v" | "vc" | "voltage" => Ok(Variable::V),
            "x" | "xsv" | "state" => Ok(Variable::X),
            "i" | "input" | "current" => Ok(Variable::I),
            _ => Err(AppError::InvalidInput(format!("Unknown variable: {}", s))),
        }
    }
}

fn envelope(records: &[TimeseriesRecord], var: Variable) -> (f64, f64) {
    records
        .iter()
        .map(|r| var.of(r))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        })
}

/// Get run summary from timeseries records.
pub fn get_run_summary(records: &[TimeseriesRecord]) -> AppResult<RunSummary> {
    let (first, last) = match (records.first(), records.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(AppError::InvalidInput("No records in run".to_string())),
    };

    Ok(RunSummary {
        time_range: (first.t, last.t),
        record_count: records.len(),
        v_range: envelope(records, Variable::V),
        x_range: envelope(records, Variable::X),
        i_range: envelope(records, Variable::I),
        xsv_excursions: records.iter().filter(|r| !r.xsv_in_range()).count(),
    })
}

/// `(t, value)` pairs for one variable.
pub fn extract_series(records: &[TimeseriesRecord], var: Variable) -> Vec<(f64, f64)> {
    records.iter().map(|r| (r.t, var.of(r))).collect()
}

/// CSV with a `t` column followed by the requested variables.
///
/// An empty `vars` selects all of them.
pub fn to_csv(records: &[TimeseriesRecord], vars: &[Variable]) -> String {
    let vars = if vars.is_empty() { &Variable::ALL[..] } else { vars };

    let mut csv = String::from("t");
    for var in vars {
        csv.push(',');
        csv.push_str(var.column());
    }
    csv.push('\n');

    for record in records {
        // Writing into a String cannot fail.
        let _ = write!(csv, "{}", record.t);
        for var in vars {
            let _ = write!(csv, ",{}", var.of(record));
        }
        csv.push('\n');
    }
    csv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<TimeseriesRecord> {
        vec![
            TimeseriesRecord {
                t: 0.0,
                v: 0.2,
                x: 0.2,
                i: 35e-6,
            },
            TimeseriesRecord {
                t: 1e-3,
                v: 0.31,
                x: 1.02,
                i: 36e-6,
            },
            TimeseriesRecord {
                t: 2e-3,
                v: 0.05,
                x: 0.5,
                i: 34e-6,
            },
        ]
    }

    #[test]
    fn summary_reports_envelopes_and_excursions() {
        let summary = get_run_summary(&records()).unwrap();
        assert_eq!(summary.record_count, 3);
        assert_eq!(summary.time_range, (0.0, 2e-3));
        assert_eq!(summary.v_range, (0.05, 0.31));
        assert_eq!(summary.x_range, (0.2, 1.02));
        assert_eq!(summary.i_range, (34e-6, 36e-6));
        assert_eq!(summary.xsv_excursions, 1);
    }

    #[test]
    fn empty_run_has_no_summary() {
        assert!(matches!(
            get_run_summary(&[]),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn variable_names_parse() {
        assert_eq!("VC".parse::<Variable>().unwrap(), Variable::V);
        assert_eq!("xsv".parse::<Variable>().unwrap(), Variable::X);
        assert_eq!("input".parse::<Variable>().unwrap(), Variable::I);
        assert!("pressure".parse::<Variable>().is_err());
    }

    #[test]
    fn series_follows_record_order() {
        let series = extract_series(&records(), Variable::X);
        assert_eq!(series, vec![(0.0, 0.2), (1e-3, 1.02), (2e-3, 0.5)]);
    }

    #[test]
    fn csv_layout() {
        let all = to_csv(&records()[..1], &[]);
        assert_eq!(all, "t,v,x,i\n0,0.2,0.2,0.000035\n");

        let one = to_csv(&records()[1..2], &[Variable::V]);
        assert_eq!(one, "t,v\n0.001,0.31\n");
    }
}
