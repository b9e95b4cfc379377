//! Derived columns: Returns, Price_Range, VWAP.

use crate::domain::Bar;

/// Fill in the derived columns over one fetch window, in place.
///
/// The baseline is the window itself, not the persisted history: the first
/// row's return is `None`, and VWAP accumulates from the window's first row.
/// This matches the upstream behavior this crate reproduces — each fetch
/// window recomputes VWAP independently, so appended rows do not continue the
/// cumulative sums of earlier runs. Bars must already be sorted ascending.
pub fn apply_derived(bars: &mut [Bar]) {
    let mut prev_close: Option<f64> = None;
    let mut cum_pv = 0.0;
    let mut cum_volume = 0.0;

    for bar in bars.iter_mut() {
        bar.returns = prev_close.map(|prev| bar.close / prev - 1.0);
        bar.price_range = bar.high - bar.low;

        cum_pv += bar.volume as f64 * bar.close;
        cum_volume += bar.volume as f64;
        bar.vwap = if cum_volume > 0.0 {
            cum_pv / cum_volume
        } else {
            f64::NAN
        };

        prev_close = Some(bar.close);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn bars_with_closes(closes: &[f64], volumes: &[u64]) -> Vec<Bar> {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        closes
            .iter()
            .zip(volumes)
            .enumerate()
            .map(|(i, (&close, &volume))| {
                Bar::raw(
                    t0 + Duration::minutes(i as i64),
                    close,
                    close + 1.0,
                    close - 1.0,
                    close,
                    volume,
                )
            })
            .collect()
    }

    #[test]
    fn returns_match_worked_example() {
        let mut bars = bars_with_closes(&[100.0, 102.0, 99.0], &[10, 10, 10]);
        apply_derived(&mut bars);

        assert_eq!(bars[0].returns, None);
        assert!((bars[1].returns.unwrap() - 0.02).abs() < 1e-12);
        assert!((bars[2].returns.unwrap() - (-0.029411764705882353)).abs() < 1e-12);
    }

    #[test]
    fn price_range_is_high_minus_low() {
        let mut bars = bars_with_closes(&[100.0, 102.0], &[10, 10]);
        apply_derived(&mut bars);
        for bar in &bars {
            assert_eq!(bar.price_range, bar.high - bar.low);
        }
    }

    #[test]
    fn vwap_is_cumulative_within_window() {
        let mut bars = bars_with_closes(&[100.0, 102.0, 99.0], &[10, 20, 30]);
        apply_derived(&mut bars);

        // Row 0: 10*100 / 10
        assert!((bars[0].vwap - 100.0).abs() < 1e-9);
        // Row 1: (10*100 + 20*102) / 30
        assert!((bars[1].vwap - (3040.0 / 30.0)).abs() < 1e-9);
        // Row 2: (10*100 + 20*102 + 30*99) / 60
        assert!((bars[2].vwap - (6010.0 / 60.0)).abs() < 1e-9);
    }

    #[test]
    fn zero_volume_prefix_yields_nan_vwap() {
        let mut bars = bars_with_closes(&[100.0, 102.0], &[0, 10]);
        apply_derived(&mut bars);
        assert!(bars[0].vwap.is_nan());
        assert!(bars[1].vwap.is_finite());
    }
}
