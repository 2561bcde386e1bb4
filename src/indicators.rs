// src/indicators.rs
//
// Pure indicator functions over a bounded price series. No state, no I/O;
// safe to call from any thread.
use crate::errors::IndicatorError;
use rust_decimal::{Decimal, MathematicalOps};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bands {
    pub middle: Decimal,
    pub upper: Decimal,
    pub lower: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossover {
    Bullish,
    Bearish,
    None,
}

/// Rolling mean over `window` points; output length is
/// `series.len() - window + 1`.
pub fn simple_moving_average(
    series: &[Decimal],
    window: usize,
) -> Result<Vec<Decimal>, IndicatorError> {
    if window == 0 || series.len() < window {
        return Err(IndicatorError::InsufficientData {
            have: series.len(),
            need: window.max(1),
        });
    }

    let divisor = Decimal::from(window as u64);
    let mut out = Vec::with_capacity(series.len() - window + 1);
    let mut sum: Decimal = series[..window].iter().copied().sum();
    out.push(sum / divisor);
    for i in window..series.len() {
        sum += series[i] - series[i - window];
        out.push(sum / divisor);
    }
    Ok(out)
}

/// Bollinger bands over the trailing `window`: middle = SMA, upper/lower =
/// middle +/- k * stddev. Population standard deviation (divides by N,
/// not N-1), matching the rest of the indicator suite.
pub fn bollinger_bands(
    series: &[Decimal],
    window: usize,
    k: Decimal,
) -> Result<Bands, IndicatorError> {
    if window == 0 || series.len() < window {
        return Err(IndicatorError::InsufficientData {
            have: series.len(),
            need: window.max(1),
        });
    }

    let tail = &series[series.len() - window..];
    let n = Decimal::from(window as u64);
    let middle = tail.iter().copied().sum::<Decimal>() / n;
    let variance = tail
        .iter()
        .map(|p| {
            let diff = *p - middle;
            diff * diff
        })
        .sum::<Decimal>()
        / n;
    let stddev = variance.sqrt().unwrap_or(Decimal::ZERO);

    Ok(Bands {
        middle,
        upper: middle + k * stddev,
        lower: middle - k * stddev,
    })
}

/// Compares the two most recent points of a fast and a slow MA series.
/// Bullish when the fast line crossed above the slow one on the latest
/// step, Bearish on the opposite cross, None otherwise or when either
/// series has fewer than 2 points.
pub fn crossover_state(fast: &[Decimal], slow: &[Decimal]) -> Crossover {
    if fast.len() < 2 || slow.len() < 2 {
        return Crossover::None;
    }
    let (f_prev, f_last) = (fast[fast.len() - 2], fast[fast.len() - 1]);
    let (s_prev, s_last) = (slow[slow.len() - 2], slow[slow.len() - 1]);

    if f_prev <= s_prev && f_last > s_last {
        Crossover::Bullish
    } else if f_prev >= s_prev && f_last < s_last {
        Crossover::Bearish
    } else {
        Crossover::None
    }
}
