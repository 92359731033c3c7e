//! Results ledger assembly and append.
//!
//! One invocation contributes exactly one comma-separated row to
//! a shared append-only ledger file. The row head comes from two
//! timestamp marker files plus the module name and clock period;
//! the tail is the extraction result of the report scan.

use itertools::Itertools;
use std::fs::{ File, OpenOptions };
use std::io::{ BufRead, BufReader, Write };

use crate::{ MetricsError, ReportMetrics };

/// Read a timestamp marker file: first line, surrounding
/// whitespace stripped. An empty file yields an empty field.
pub fn read_timestamp(
    marker_file: &str
) -> Result<String, MetricsError> {
    let f = File::open(marker_file).map_err(|source| {
        MetricsError::MissingInputFile {
            path: marker_file.to_string(), source
        }
    })?;
    let mut first = String::new();
    BufReader::new(f).read_line(&mut first).map_err(|source| {
        MetricsError::Io {
            path: marker_file.to_string(), source
        }
    })?;
    Ok(first.trim().to_string())
}

/// Assemble one ledger row with a trailing newline.
///
/// Field order: begin timestamp, end timestamp, module name,
/// clock period, realops, latency, throughput, critpath, then
/// the nine area scores. Fields are joined raw: values are
/// numeric-ish report tokens and contain no commas.
///
/// The optional scalar groups are emitted only when the scan
/// matched them; a report without a `Max Delay:` line produces a
/// row that is one column narrower, with later columns shifted
/// left. Downstream consumers of mixed ledgers must account for
/// that drift.
pub fn build_row(
    date_begin: &str, date_end: &str,
    module: &str, clk_per: &str,
    metrics: &ReportMetrics
) -> String {
    let mut fields: Vec<&str> = vec![
        date_begin, date_end, module, clk_per
    ];
    if let Some(t) = &metrics.totals {
        fields.push(&t.realops);
        fields.push(&t.latency);
        fields.push(&t.throughput);
    }
    if let Some(cp) = &metrics.critpath {
        fields.push(cp);
    }
    fields.extend(metrics.area.snapshot());
    format!("{}\n", fields.iter().join(","))
}

/// Append one prebuilt row to the shared ledger, creating the
/// file on first use. The file handle lives only for this one
/// write; nothing guards against concurrent appenders.
pub fn append_row(
    ledger_file: &str, row: &str
) -> Result<(), MetricsError> {
    let mut f = OpenOptions::new()
        .append(true)
        .create(true)
        .open(ledger_file)
        .map_err(|source| MetricsError::MissingInputFile {
            path: ledger_file.to_string(), source
        })?;
    f.write_all(row.as_bytes()).map_err(|source| {
        MetricsError::Io {
            path: ledger_file.to_string(), source
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn full_row_in_fixed_order() {
        let mut m = ReportMetrics::new();
        for line in [
            "  Design Total:  120  3.5  0.8",
            "  MUX: foo 2.0 (10.0%)",
            "  Max Delay: 4.2",
        ] {
            m.feed_line(line);
        }
        let row = build_row(
            "2024-01-01", "2024-01-02", "top", "10", &m);
        assert_eq!(
            row,
            "2024-01-01,2024-01-02,top,10,120,3.5,0.8,4.2,\
             2.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0\n"
        );
    }

    #[test]
    fn missing_max_delay_shifts_columns() {
        let mut m = ReportMetrics::new();
        m.feed_line("  Design Total:  120  3.5  0.8");
        let row = build_row("b", "e", "top", "10", &m);
        assert_eq!(
            row,
            "b,e,top,10,120,3.5,0.8,\
             0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0\n"
        );
        assert_eq!(row.trim_end().split(',').count(), 16);
    }

    #[test]
    fn empty_scan_emits_head_and_defaults() {
        let m = ReportMetrics::new();
        let row = build_row("b", "e", "m", "5", &m);
        assert_eq!(
            row,
            "b,e,m,5,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0\n"
        );
    }

    #[test]
    fn timestamp_marker_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("hls.begin");
        fs::write(&marker, "  2024-01-01 10:00  \nsecond line\n")
            .unwrap();
        assert_eq!(
            read_timestamp(marker.to_str().unwrap()).unwrap(),
            "2024-01-01 10:00"
        );
    }

    #[test]
    fn empty_marker_yields_empty_field() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("hls");
        fs::write(&marker, "").unwrap();
        assert_eq!(
            read_timestamp(marker.to_str().unwrap()).unwrap(),
            ""
        );
    }

    #[test]
    fn missing_marker_is_fatal() {
        let e = read_timestamp("no/such/marker").unwrap_err();
        assert!(matches!(
            e, MetricsError::MissingInputFile { .. }));
    }

    #[test]
    fn append_creates_then_accumulates() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = dir.path().join("results.csv");
        let ledger = ledger.to_str().unwrap();
        append_row(ledger, "a,b,c\n").unwrap();
        append_row(ledger, "d,e,f\n").unwrap();
        assert_eq!(
            fs::read_to_string(ledger).unwrap(),
            "a,b,c\nd,e,f\n"
        );
    }
}
