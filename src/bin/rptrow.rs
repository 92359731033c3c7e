//! Synthesis report to results ledger.
//!
//! This program scrapes the timing, throughput and area scores
//! out of one module's synthesis report and appends them as one
//! comma-separated row to the shared `results.csv` ledger, so
//! that runs across modules and clock-period configurations can
//! be compared side by side.
//!
//! The two timestamp marker files and the report are expected in
//! the working directory, already produced by the surrounding
//! synthesis flow. Concurrent invocations are not serialized
//! here; the batch driver calling this must run them one at a
//! time.

use hlsmetrics::{
    MetricsError, ReportMetrics,
    read_timestamp, build_row, append_row,
};

/// Begin-of-run timestamp marker.
const BEGIN_MARKER: &str = "hls.begin";
/// End-of-run timestamp marker.
const END_MARKER: &str = "hls";
/// The shared results ledger.
const LEDGER: &str = "results.csv";

#[derive(clap::Parser, Debug)]
struct RptRowArgs {
    /// The synthesized module name.
    ///
    /// The report is read from `Catapult/<module>.v1/rtl.rpt`.
    module: String,
    /// The clock period configuration, recorded verbatim.
    clk_per: String,
}

fn run(args: &RptRowArgs) -> Result<(), MetricsError> {
    let date_begin = read_timestamp(BEGIN_MARKER)?;
    let date_end = read_timestamp(END_MARKER)?;

    let rpt_file = format!("Catapult/{}.v1/rtl.rpt", args.module);
    let mut metrics = ReportMetrics::new();
    metrics.feed_report(&rpt_file)?;

    if metrics.totals.is_none() {
        clilog::warn!(
            HLSM_NO_TOTAL,
            "{} has no Design Total line, \
             the row will omit realops/latency/throughput",
            rpt_file
        );
    }
    if metrics.critpath.is_none() {
        clilog::warn!(
            HLSM_NO_CRIT,
            "{} has no Max Delay line, \
             the row will omit the critpath column",
            rpt_file
        );
    }

    let row = build_row(
        &date_begin, &date_end,
        &args.module, &args.clk_per, &metrics
    );
    append_row(LEDGER, &row)?;
    clilog::info!(
        HLSM_ROW,
        "appended row for module {} (clk_per {}) to {}",
        args.module, args.clk_per, LEDGER
    );
    Ok(())
}

fn main() {
    clilog::init_stderr_color_debug();
    let args = <RptRowArgs as clap::Parser>::parse();
    if let Err(e) = run(&args) {
        clilog::error!(HLSM_FAIL, "{}", e);
        std::process::exit(1);
    }
}
