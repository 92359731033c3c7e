//! ## `hlsmetrics`: HLS report metric extraction
//!
//! This contains the core functionalities and data structures
//! for scraping synthesis-quality metrics (timing, throughput,
//! area scores) out of a high-level-synthesis report and
//! recording them as one row of a shared results ledger.
//!
//! See the binary for example usage.

use compact_str::CompactString;
use indexmap::IndexMap;
use regex::Regex;
use std::fs::File;
use std::io::{ self, BufRead, BufReader };
use std::sync::LazyLock;

pub mod ledger;
pub use ledger::{ read_timestamp, build_row, append_row };

/// Errors that abort an invocation.
///
/// Everything else in the scan is best-effort: unmatched report
/// lines and unknown area categories are skipped silently.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("cannot open required input file {path}: {source}")]
    MissingInputFile {
        path: String,
        source: io::Error,
    },
    #[error("i/o error on {path}: {source}")]
    Io {
        path: String,
        source: io::Error,
    },
}

/// One of the fixed area-score classes reported per design.
///
/// Declaration order is significant: it is the column order of
/// the emitted ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AreaCategory {
    Mux,
    Func,
    Logic,
    Buffer,
    Mem,
    Rom,
    Reg,
    FsmReg,
    FsmComb,
}

/// All known categories, in column order.
pub const AREA_CATEGORIES: [AreaCategory; 9] = [
    AreaCategory::Mux,
    AreaCategory::Func,
    AreaCategory::Logic,
    AreaCategory::Buffer,
    AreaCategory::Mem,
    AreaCategory::Rom,
    AreaCategory::Reg,
    AreaCategory::FsmReg,
    AreaCategory::FsmComb,
];

impl AreaCategory {
    /// The tag spelling used in the report (and the ledger
    /// column name).
    #[inline]
    pub fn tag(self) -> &'static str {
        match self {
            AreaCategory::Mux => "MUX",
            AreaCategory::Func => "FUNC",
            AreaCategory::Logic => "LOGIC",
            AreaCategory::Buffer => "BUFFER",
            AreaCategory::Mem => "MEM",
            AreaCategory::Rom => "ROM",
            AreaCategory::Reg => "REG",
            AreaCategory::FsmReg => "FSM-REG",
            AreaCategory::FsmComb => "FSM-COMB",
        }
    }

    /// Look up a report tag against the whitelist.
    #[inline]
    pub fn from_tag(tag: &str) -> Option<AreaCategory> {
        AREA_CATEGORIES.iter().copied()
            .find(|c| c.tag() == tag)
    }
}

/// The per-invocation area score accumulator.
///
/// Scores are kept as verbatim report strings, defaulting to
/// `"0.0"` for categories the report never mentions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaScores {
    scores: IndexMap<AreaCategory, CompactString>,
}

impl AreaScores {
    /// Create a fresh accumulator with all categories at the
    /// default score.
    pub fn new() -> AreaScores {
        AreaScores {
            scores: AREA_CATEGORIES.iter()
                .map(|&c| (c, CompactString::from("0.0")))
                .collect()
        }
    }

    /// Overwrite the score of a known category. The last call
    /// per category wins; there is no aggregation.
    #[inline]
    pub fn update(
        &mut self, category: AreaCategory, score: CompactString
    ) {
        if let Some(v) = self.scores.get_mut(&category) {
            *v = score;
        }
    }

    /// The nine scores, in fixed column order.
    #[inline]
    pub fn snapshot(&self) -> impl Iterator<Item = &str> {
        self.scores.values().map(|s| s.as_str())
    }
}

impl Default for AreaScores {
    fn default() -> AreaScores {
        AreaScores::new()
    }
}

/// The design-wide totals triple from a `Design Total:` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignTotals {
    pub realops: CompactString,
    pub latency: CompactString,
    pub throughput: CompactString,
}

/// A single extraction produced by one report line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineMatch {
    DesignTotals(DesignTotals),
    AreaScore {
        category: AreaCategory,
        score: CompactString,
    },
    CritPath(CompactString),
}

static DESIGN_TOTAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*Design Total:\s+(\S+)\s+(\S+)\s+(\S+)").unwrap()
});

static AREA_SCORE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Z-]+):.*\s([0-9.]+)\s+\([0-9.]+%\)\s*$").unwrap()
});

static CRIT_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*Max Delay:\s+(\S+)").unwrap()
});

#[inline]
fn match_design_totals(line: &str) -> Option<LineMatch> {
    let c = DESIGN_TOTAL_RE.captures(line)?;
    Some(LineMatch::DesignTotals(DesignTotals {
        realops: c[1].into(),
        latency: c[2].into(),
        throughput: c[3].into(),
    }))
}

#[inline]
fn match_area_score(line: &str) -> Option<LineMatch> {
    let c = AREA_SCORE_RE.captures(line)?;
    // lines shaped like an area row but naming an unknown
    // category are not extractions at all.
    let category = AreaCategory::from_tag(&c[1])?;
    Some(LineMatch::AreaScore {
        category,
        score: c[2].into(),
    })
}

#[inline]
fn match_crit_path(line: &str) -> Option<LineMatch> {
    let c = CRIT_PATH_RE.captures(line)?;
    Some(LineMatch::CritPath(c[1].into()))
}

/// Try the extraction rules on one report line, in precedence
/// order. The first rule that fires wins; lines matching no rule
/// yield `None` and are skipped by the scanner.
pub fn match_line(line: &str) -> Option<LineMatch> {
    match_design_totals(line)
        .or_else(|| match_area_score(line))
        .or_else(|| match_crit_path(line))
}

/// Everything extracted from one module's report.
///
/// The scalar groups stay `None` when the report never carried
/// the corresponding line; the area scores always hold all nine
/// categories (defaulted to `"0.0"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportMetrics {
    pub totals: Option<DesignTotals>,
    pub critpath: Option<CompactString>,
    pub area: AreaScores,
}

impl ReportMetrics {
    /// Create an empty extraction state with default scores.
    pub fn new() -> ReportMetrics {
        ReportMetrics {
            totals: None,
            critpath: None,
            area: AreaScores::new(),
        }
    }

    /// Apply one line's extraction. Repeated matches rebind:
    /// the last occurrence in file order wins.
    #[inline]
    pub fn feed_line(&mut self, line: &str) {
        match match_line(line) {
            Some(LineMatch::DesignTotals(t)) => {
                self.totals = Some(t);
            }
            Some(LineMatch::AreaScore { category, score }) => {
                self.area.update(category, score);
            }
            Some(LineMatch::CritPath(v)) => {
                self.critpath = Some(v);
            }
            None => {}
        }
    }

    /// Feed a whole report file to this extraction state,
    /// line by line.
    pub fn feed_report(
        &mut self, rpt_file: &str
    ) -> Result<(), MetricsError> {
        let f = File::open(rpt_file).map_err(|source| {
            MetricsError::MissingInputFile {
                path: rpt_file.to_string(), source
            }
        })?;
        let f = BufReader::with_capacity(65536, f);
        for line in f.lines() {
            let line = line.map_err(|source| MetricsError::Io {
                path: rpt_file.to_string(), source
            })?;
            self.feed_line(&line);
        }
        Ok(())
    }
}

impl Default for ReportMetrics {
    fn default() -> ReportMetrics {
        ReportMetrics::new()
    }
}
