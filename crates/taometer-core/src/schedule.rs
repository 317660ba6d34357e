// crates/taometer-core/src/schedule.rs
//
// Interval scheduling: converts a wall-clock interval name and a subnet's
// epoch recurrence into the exact list of epoch-event blocks to sample.
//
// A subnet pays dividends every `tempo + 1` blocks. For a subnet-specific
// run the window is rounded up to a whole number of periods; for a
// root-network run the window is the raw block count and every subnet
// contributes its own recurrence.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::CalcConfig;
use crate::error::TaometerError;

/// A wall-clock interval over which yield is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interval {
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl Interval {
    /// Nominal length of the interval in seconds.
    pub fn seconds(&self) -> u64 {
        match self {
            Interval::Hour => 60 * 60,
            Interval::Day => 60 * 60 * 24,
            Interval::Week => 60 * 60 * 24 * 7,
            Interval::Month => 60 * 60 * 24 * 30,
            Interval::Year => 60 * 60 * 24 * 365,
        }
    }

    /// The CLI spelling of the interval.
    pub fn name(&self) -> &'static str {
        match self {
            Interval::Hour => "1h",
            Interval::Day => "24h",
            Interval::Week => "7d",
            Interval::Month => "30d",
            Interval::Year => "year",
        }
    }

    /// All intervals, shortest first. Used by the CLI's sweep mode.
    pub fn all() -> [Interval; 5] {
        [
            Interval::Hour,
            Interval::Day,
            Interval::Week,
            Interval::Month,
            Interval::Year,
        ]
    }
}

impl FromStr for Interval {
    type Err = TaometerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1h" => Ok(Interval::Hour),
            "24h" => Ok(Interval::Day),
            "7d" => Ok(Interval::Week),
            "30d" => Ok(Interval::Month),
            "year" => Ok(Interval::Year),
            other => Err(TaometerError::Config(format!(
                "unknown interval '{}' (expected 1h, 24h, 7d, 30d, or year)",
                other
            ))),
        }
    }
}

/// One dividend-payment opportunity: a block at which a subnet's epoch
/// recurrence lands inside the requested window. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochEvent {
    /// Block height of the epoch event.
    pub block: u64,
    /// Subnet the event belongs to.
    pub netuid: u16,
    /// Epoch period of that subnet in blocks (`tempo + 1`).
    pub period: u64,
}

/// Subnet metadata needed for scheduling, as returned by the chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubnetInfo {
    /// Numeric subnet identifier; 0 is the root network.
    pub netuid: u16,
    /// Blocks between epoch events, minus one.
    pub tempo: u64,
    /// Block of the most recent epoch event at the queried height.
    pub last_epoch_block: u64,
    /// Blocks elapsed since the most recent epoch event.
    pub blocks_since_epoch: u64,
}

/// Smallest multiple of `tempo + 1` that covers the interval.
///
/// The raw block count `interval_seconds / block_seconds` is rounded up to a
/// whole number of epoch periods so the window always contains complete
/// epochs. Example: tempo 360 over 24h at 12s/block gives 7200 raw blocks,
/// rounded up to 7220 (20 periods of 361).
pub fn interval_blocks(tempo: u64, interval: Interval, cfg: &CalcConfig) -> u64 {
    let raw = interval.seconds().div_ceil(cfg.block_seconds.max(1));
    let period = tempo + 1;
    let rounded = raw / period * period;
    if rounded < raw {
        rounded + period
    } else {
        rounded
    }
}

/// Raw window size in blocks for a root-network run, where each subnet has
/// its own tempo and no single rounding applies.
pub fn root_interval_blocks(interval: Interval, cfg: &CalcConfig) -> u64 {
    interval.seconds() / cfg.block_seconds.max(1)
}

/// Derive the epoch events for one subnet inside the requested window.
///
/// Starting from `last_epoch_block`, steps backward by `tempo + 1` while the
/// cursor stays at or above `as_of_block - interval_blocks`. The result is a
/// strictly descending, evenly spaced sequence. An empty result (the last
/// epoch already predates the window) is valid and yields zero downstream.
pub fn derive_events(
    netuid: u16,
    tempo: u64,
    interval: Interval,
    as_of_block: u64,
    last_epoch_block: u64,
    cfg: &CalcConfig,
) -> Vec<EpochEvent> {
    let period = tempo + 1;
    let window = interval_blocks(tempo, interval, cfg);
    let window_start = as_of_block.saturating_sub(window);
    walk_periods(netuid, period, last_epoch_block, window_start)
}

/// Derive the pooled epoch events for a root-network run.
///
/// Every subnet contributes its own recurrence anchored at
/// `as_of_block - blocks_since_epoch`. Events are sorted ascending by
/// `(block, netuid)` for deterministic processing; subnets whose recurrence
/// coincides on a block are compounded together by the aggregator.
pub fn derive_root_events(
    subnets: &[SubnetInfo],
    interval: Interval,
    as_of_block: u64,
    cfg: &CalcConfig,
) -> Vec<EpochEvent> {
    let window_start = as_of_block.saturating_sub(root_interval_blocks(interval, cfg));

    let mut events = Vec::new();
    for subnet in subnets {
        let period = subnet.tempo + 1;
        let last_epoch = as_of_block.saturating_sub(subnet.blocks_since_epoch);
        events.extend(walk_periods(subnet.netuid, period, last_epoch, window_start));
    }

    events.sort_by_key(|e| (e.block, e.netuid));
    events
}

/// Step backward from `last_epoch_block` by `period` while inside the window.
fn walk_periods(netuid: u16, period: u64, last_epoch_block: u64, window_start: u64) -> Vec<EpochEvent> {
    let mut events = Vec::new();
    let mut cursor = last_epoch_block;
    loop {
        if cursor < window_start {
            break;
        }
        events.push(EpochEvent {
            block: cursor,
            netuid,
            period,
        });
        match cursor.checked_sub(period) {
            Some(next) => cursor = next,
            None => break,
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_parsing() {
        assert_eq!("24h".parse::<Interval>().unwrap(), Interval::Day);
        assert_eq!("year".parse::<Interval>().unwrap(), Interval::Year);
        assert!(matches!(
            "2d".parse::<Interval>(),
            Err(TaometerError::Config(_))
        ));
    }

    #[test]
    fn test_interval_blocks_rounds_up_to_whole_periods() {
        let cfg = CalcConfig::default();
        // 24h at 12s/block = 7200 raw blocks; 19 periods of 361 = 6859 < 7200,
        // so the window rounds up to 20 periods = 7220.
        assert_eq!(interval_blocks(360, Interval::Day, &cfg), 7220);
        // Exact fit: tempo 99 gives period 100, and 7200 is already a multiple.
        assert_eq!(interval_blocks(99, Interval::Day, &cfg), 7200);
    }

    #[test]
    fn test_derive_events_is_descending_arithmetic() {
        let cfg = CalcConfig::default();
        let events = derive_events(3, 360, Interval::Day, 1_000_000, 999_900, &cfg);

        let window = interval_blocks(360, Interval::Day, &cfg);
        let expected_count = (999_900 - (1_000_000 - window)) / 361 + 1;
        assert_eq!(events.len() as u64, expected_count);

        for pair in events.windows(2) {
            assert_eq!(pair[0].block - pair[1].block, 361);
        }
        assert!(events.iter().all(|e| e.netuid == 3 && e.period == 361));
    }

    #[test]
    fn test_derive_events_empty_when_epoch_predates_window() {
        let cfg = CalcConfig::default();
        // Last epoch far before the window start: valid, empty schedule.
        let events = derive_events(1, 360, Interval::Hour, 1_000_000, 900_000, &cfg);
        assert!(events.is_empty());
    }

    #[test]
    fn test_derive_events_near_genesis_does_not_underflow() {
        let cfg = CalcConfig::default();
        let events = derive_events(1, 360, Interval::Year, 500, 400, &cfg);
        // Window start saturates at 0; the walk stops at the lowest reachable epoch.
        assert_eq!(events.last().unwrap().block, 400 % 361);
    }

    #[test]
    fn test_root_events_pooled_and_sorted() {
        let cfg = CalcConfig::default();
        let subnets = vec![
            SubnetInfo {
                netuid: 2,
                tempo: 99,
                last_epoch_block: 0,
                blocks_since_epoch: 10,
            },
            SubnetInfo {
                netuid: 1,
                tempo: 49,
                last_epoch_block: 0,
                blocks_since_epoch: 10,
            },
        ];
        let events = derive_root_events(&subnets, Interval::Hour, 10_000, &cfg);

        assert!(!events.is_empty());
        for pair in events.windows(2) {
            assert!((pair[0].block, pair[0].netuid) < (pair[1].block, pair[1].netuid));
        }
        // Both recurrences anchor at block 9990 and coincide there.
        let at_anchor: Vec<_> = events.iter().filter(|e| e.block == 9990).collect();
        assert_eq!(at_anchor.len(), 2);
    }
}
