//! Verification and benchmark harness.
//!
//! Every strategy goes through the same gauntlet, strictly one strategy at
//! a time so a multi-threaded scan never skews another strategy's timings:
//!
//! 1. Capability probe; unsupported hardware fails fast with a diagnostic.
//! 2. Verification: `find` over every fixture, strict equality against the
//!    expected result. Any mismatch aborts the strategy's benchmark.
//! 3. Warmup passes, then timed iterations: one [`TimingSample`] per full
//!    fixture pass.
//! 4. Mean / median / standard deviation over the series; ranking ascending
//!    by mean.
//!
//! # Invariants
//! - A failed strategy contributes no timing data and is reported apart
//!   from the ranking. No retries, no partial credit.
//! - Failures are strategy-scoped: one strategy failing never prevents the
//!   others from being verified and timed.
//! - Fixture order is insertion order; report order is deterministic.
//!
//! # Budget
//! Each strategy gets a wall-clock budget covering its verification and
//! timing loop. The budget is enforced cooperatively between fixtures and
//! between iterations: a scan that has returned is cheap to check, and no
//! scan in this crate blocks indefinitely (worker joins are bounded by the
//! scan itself finishing).

use std::fmt;
use std::time::{Duration, Instant};

use crate::pattern::{Pattern, PatternParseError};
use crate::scan::{CapabilityError, Scanner};

mod stats;

pub use stats::TimingSeries;

/// One elapsed-duration measurement for a (strategy, fixture set) pass.
pub type TimingSample = Duration;

/// A pattern with its known ground-truth result.
#[derive(Clone, Debug)]
pub struct Fixture {
    text: String,
    pattern: Pattern,
    /// `None` marks a fixture that must not be found anywhere.
    expected: Option<usize>,
}

impl Fixture {
    /// Fixture whose pattern is expected at `offset`.
    pub fn found(text: &str, offset: usize) -> Result<Self, PatternParseError> {
        Ok(Self {
            text: text.to_string(),
            pattern: Pattern::parse(text)?,
            expected: Some(offset),
        })
    }

    /// Fixture whose pattern must be absent (the NotFound path).
    pub fn absent(text: &str) -> Result<Self, PatternParseError> {
        Ok(Self {
            text: text.to_string(),
            pattern: Pattern::parse(text)?,
            expected: None,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn expected(&self) -> Option<usize> {
        self.expected
    }
}

/// Ordered fixture collection; iteration order is insertion order.
#[derive(Clone, Debug, Default)]
pub struct FixtureSet {
    fixtures: Vec<Fixture>,
}

impl FixtureSet {
    pub fn new(fixtures: Vec<Fixture>) -> Self {
        Self { fixtures }
    }

    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }
}

/// Harness tuning knobs.
#[derive(Clone, Copy, Debug)]
pub struct HarnessConfig {
    /// Untimed fixture passes before measurement.
    pub warmup_iterations: usize,
    /// Timed fixture passes, one sample each.
    pub timed_iterations: usize,
    /// Wall-clock budget per strategy (probe + verify + all iterations).
    pub strategy_budget: Duration,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            warmup_iterations: 2,
            timed_iterations: 10,
            strategy_budget: Duration::from_secs(120),
        }
    }
}

/// Why a strategy was excluded from the ranking.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum StrategyError {
    /// Capability probe failed; the strategy never ran.
    Unsupported(CapabilityError),
    /// A fixture result disagreed with ground truth.
    Mismatch {
        fixture: String,
        expected: Option<usize>,
        actual: Option<usize>,
    },
    /// The strategy exceeded its wall-clock budget.
    Budget { elapsed: Duration, budget: Duration },
}

impl fmt::Display for StrategyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported(err) => write!(f, "unsupported: {err}"),
            Self::Mismatch {
                fixture,
                expected,
                actual,
            } => write!(
                f,
                "mismatch on fixture {fixture:?}: expected {expected:?}, got {actual:?}"
            ),
            Self::Budget { elapsed, budget } => write!(
                f,
                "budget exceeded: {:?} elapsed of {:?} allowed",
                elapsed, budget
            ),
        }
    }
}

impl std::error::Error for StrategyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Unsupported(err) => Some(err),
            _ => None,
        }
    }
}

/// Outcome for one strategy: a timing series or the reason it failed.
#[derive(Debug)]
pub struct StrategyReport {
    pub name: &'static str,
    pub outcome: Result<TimingSeries, StrategyError>,
}

impl StrategyReport {
    pub fn passed(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// All strategy outcomes, in registry order.
#[derive(Debug, Default)]
pub struct BenchmarkReport {
    pub strategies: Vec<StrategyReport>,
}

impl BenchmarkReport {
    /// Passing strategies ascending by mean time, name as tie-break.
    pub fn ranking(&self) -> Vec<&StrategyReport> {
        let mut passed: Vec<&StrategyReport> =
            self.strategies.iter().filter(|r| r.passed()).collect();
        passed.sort_by(|a, b| {
            let (Ok(sa), Ok(sb)) = (&a.outcome, &b.outcome) else {
                unreachable!("ranking only holds passing reports");
            };
            sa.mean().cmp(&sb.mean()).then_with(|| a.name.cmp(b.name))
        });
        passed
    }

    /// Failed strategies in registry order.
    pub fn failures(&self) -> impl Iterator<Item = &StrategyReport> {
        self.strategies.iter().filter(|r| !r.passed())
    }
}

/// Verifies and times every strategy over the shared corpus.
///
/// Strategies run strictly sequentially: one strategy's run, including any
/// multi-threaded sub-scan, fully completes before the next starts.
pub fn run_benchmark(
    scanners: &[Box<dyn Scanner>],
    hay: &[u8],
    fixtures: &FixtureSet,
    config: &HarnessConfig,
) -> BenchmarkReport {
    let mut report = BenchmarkReport::default();
    for scanner in scanners {
        report.strategies.push(StrategyReport {
            name: scanner.name(),
            outcome: run_strategy(scanner.as_ref(), hay, fixtures, config),
        });
    }
    report
}

fn run_strategy(
    scanner: &dyn Scanner,
    hay: &[u8],
    fixtures: &FixtureSet,
    config: &HarnessConfig,
) -> Result<TimingSeries, StrategyError> {
    scanner.probe().map_err(StrategyError::Unsupported)?;

    let started = Instant::now();
    let deadline = |started: Instant| -> Result<(), StrategyError> {
        let elapsed = started.elapsed();
        if elapsed > config.strategy_budget {
            Err(StrategyError::Budget {
                elapsed,
                budget: config.strategy_budget,
            })
        } else {
            Ok(())
        }
    };

    // Verification pass: strict equality on every fixture before any timing.
    for fixture in fixtures.fixtures() {
        let actual = scanner.find(hay, fixture.pattern());
        if actual != fixture.expected() {
            return Err(StrategyError::Mismatch {
                fixture: fixture.text().to_string(),
                expected: fixture.expected(),
                actual,
            });
        }
        deadline(started)?;
    }

    for _ in 0..config.warmup_iterations {
        run_fixture_pass(scanner, hay, fixtures);
        deadline(started)?;
    }

    let mut series = TimingSeries::with_capacity(config.timed_iterations);
    for _ in 0..config.timed_iterations {
        let t = Instant::now();
        run_fixture_pass(scanner, hay, fixtures);
        series.push(t.elapsed());
        deadline(started)?;
    }

    Ok(series)
}

/// One full pass over the fixture set. Results are discarded; correctness
/// was already established by the verification pass.
#[inline]
fn run_fixture_pass(scanner: &dyn Scanner, hay: &[u8], fixtures: &FixtureSet) {
    for fixture in fixtures.fixtures() {
        let result = scanner.find(hay, fixture.pattern());
        std::hint::black_box(result);
    }
}
