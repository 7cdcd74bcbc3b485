//! Series Reconciliation
//!
//! Turns the raw per-day records from the history provider into a clean,
//! converted series: invalid entries dropped, dates strictly ascending and
//! unique, day-over-day percent change computed on the tola price.

use tracing::{debug, warn};

use crate::error::{AppError, Result};
use crate::models::{DerivedPricePoint, ExchangeRate, MetalSymbol, RawPricePoint};
use crate::services::convert::{derive_retail, MarginSchedule};

/// Reconcile raw history into a derived series.
///
/// An empty result after filtering is a fetch failure (`EmptySeries`), not a
/// valid empty series.
pub fn reconcile(
    raw_points: Vec<RawPricePoint>,
    rate: &ExchangeRate,
    symbol: MetalSymbol,
) -> Result<Vec<DerivedPricePoint>> {
    let margin = MarginSchedule::for_metal(symbol);
    let raw_count = raw_points.len();

    let mut derived: Vec<DerivedPricePoint> = raw_points
        .into_iter()
        .filter_map(|point| {
            if !point.spot_price_usd.is_finite() || point.spot_price_usd <= 0.0 {
                debug!(
                    date = %point.date,
                    spot = point.spot_price_usd,
                    "Discarding invalid raw point"
                );
                return None;
            }

            let retail = derive_retail(point.spot_price_usd, rate.rate_npr_per_usd, &margin);
            if retail.price_per_gram_npr <= 0 || retail.price_per_tola_npr <= 0 {
                debug!(date = %point.date, "Discarding point with non-positive derived price");
                return None;
            }

            Some(DerivedPricePoint {
                date: point.date,
                spot_price_usd: point.spot_price_usd,
                price_per_gram_npr: retail.price_per_gram_npr,
                price_per_tola_npr: retail.price_per_tola_npr,
                percent_change: 0.0,
            })
        })
        .collect();

    derived.sort_by_key(|point| point.date);
    derived.dedup_by_key(|point| point.date);

    if derived.is_empty() {
        warn!(%symbol, raw_count, "No valid points left after filtering");
        return Err(AppError::EmptySeries(symbol.as_str().to_string()));
    }

    for i in 1..derived.len() {
        let previous = derived[i - 1].price_per_tola_npr;
        let current = derived[i].price_per_tola_npr;
        let change = if previous > 0 {
            (current - previous) as f64 / previous as f64 * 100.0
        } else {
            0.0
        };
        derived[i].percent_change = if change.is_finite() { change } else { 0.0 };
    }

    Ok(derived)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, Utc};

    fn test_rate() -> ExchangeRate {
        ExchangeRate {
            rate_npr_per_usd: 144.5737,
            valid_until: Utc::now() + Duration::hours(6),
            fetched_at: Utc::now(),
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn raw(day: &str, spot: f64) -> RawPricePoint {
        RawPricePoint {
            date: date(day),
            spot_price_usd: spot,
        }
    }

    #[test]
    fn sorts_ascending_and_zeroes_first_change() {
        let points = vec![
            raw("2025-08-03", 5050.00),
            raw("2025-08-01", 4994.50),
            raw("2025-08-02", 5010.00),
        ];

        let series = reconcile(points, &test_rate(), MetalSymbol::Gold).unwrap();

        let dates: Vec<_> = series.iter().map(|p| p.date).collect();
        assert_eq!(
            dates,
            vec![date("2025-08-01"), date("2025-08-02"), date("2025-08-03")]
        );
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(series[0].percent_change, 0.0);
    }

    #[test]
    fn percent_change_uses_tola_price() {
        let points = vec![raw("2025-08-01", 4994.50), raw("2025-08-02", 5050.00)];

        let series = reconcile(points, &test_rate(), MetalSymbol::Gold).unwrap();

        assert_eq!(series[0].price_per_tola_npr, 302856);
        assert_eq!(series[1].price_per_tola_npr, 306168);
        let expected = (306168 - 302856) as f64 / 302856.0 * 100.0;
        assert!((series[1].percent_change - expected).abs() < 1e-12);
    }

    #[test]
    fn discards_invalid_points_but_keeps_valid_ones() {
        // One negative, one NaN, one valid: reconciles to a single point
        let points = vec![
            raw("2025-08-01", -5.0),
            raw("2025-08-02", f64::NAN),
            raw("2025-08-03", 4994.50),
        ];

        let series = reconcile(points, &test_rate(), MetalSymbol::Gold).unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(series[0].date, date("2025-08-03"));
        assert_eq!(series[0].percent_change, 0.0);
    }

    #[test]
    fn all_invalid_is_a_fetch_failure() {
        let points = vec![raw("2025-08-01", 0.0), raw("2025-08-02", -12.5)];

        let result = reconcile(points, &test_rate(), MetalSymbol::Silver);

        assert!(matches!(result, Err(AppError::EmptySeries(_))));
    }

    #[test]
    fn duplicate_dates_are_collapsed() {
        let points = vec![
            raw("2025-08-01", 4994.50),
            raw("2025-08-01", 5050.00),
            raw("2025-08-02", 5010.00),
        ];

        let series = reconcile(points, &test_rate(), MetalSymbol::Gold).unwrap();

        assert_eq!(series.len(), 2);
        // First record for a date wins
        assert_eq!(series[0].spot_price_usd, 4994.50);
    }
}
