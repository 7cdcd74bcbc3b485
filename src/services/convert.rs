//! Spot-to-Retail Price Conversion
//!
//! Pure functions turning a USD-per-troy-ounce spot quote into Nepal-market
//! retail prices (NPR per gram and per tola) for a given metal.
//!
//! Conversion order:
//! 1. USD/ounce -> USD/gram (troy-ounce constant)
//! 2. USD/gram -> NPR/gram (exchange rate)
//! 3. Percentage markup + flat per-tola surcharge in per-gram terms, rounded
//! 4. NPR/gram -> NPR/tola, rounded
//!
//! Rounding happens after each stage: the gram price is rounded to a whole
//! rupee before the tola multiplication. `f64::round` rounds half away from
//! zero, which is half-up over this positive domain.

use crate::constants::{
    GOLD_FLAT_SURCHARGE_NPR_PER_TOLA, GOLD_MARKUP_FACTOR, GRAMS_PER_TOLA, GRAMS_PER_TROY_OUNCE,
    SILVER_FLAT_SURCHARGE_NPR_PER_TOLA, SILVER_MARKUP_FACTOR,
};
use crate::models::MetalSymbol;

/// Retail margin parameters for one metal
#[derive(Debug, Clone, Copy)]
pub struct MarginSchedule {
    /// Percentage markup as a factor (1.10 = +10%)
    pub markup_factor: f64,

    /// Flat surcharge in NPR per tola
    pub flat_surcharge_npr_per_tola: f64,
}

impl MarginSchedule {
    /// Default margin schedule for a metal
    pub fn for_metal(symbol: MetalSymbol) -> Self {
        match symbol {
            MetalSymbol::Gold => Self {
                markup_factor: GOLD_MARKUP_FACTOR,
                flat_surcharge_npr_per_tola: GOLD_FLAT_SURCHARGE_NPR_PER_TOLA,
            },
            MetalSymbol::Silver => Self {
                markup_factor: SILVER_MARKUP_FACTOR,
                flat_surcharge_npr_per_tola: SILVER_FLAT_SURCHARGE_NPR_PER_TOLA,
            },
        }
    }

    /// Flat surcharge expressed in NPR per gram
    pub fn flat_surcharge_npr_per_gram(&self) -> f64 {
        self.flat_surcharge_npr_per_tola / GRAMS_PER_TOLA
    }
}

/// Margined retail quote for one trading day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetailPrice {
    pub price_per_gram_npr: i64,
    pub price_per_tola_npr: i64,
}

/// Convert a spot quote into a retail quote.
///
/// Invalid numeric input (NaN, non-positive) is the caller's responsibility
/// to filter; see `reconcile`.
pub fn derive_retail(
    spot_usd_per_ounce: f64,
    rate_npr_per_usd: f64,
    margin: &MarginSchedule,
) -> RetailPrice {
    let usd_per_gram = spot_usd_per_ounce / GRAMS_PER_TROY_OUNCE;
    let npr_per_gram = usd_per_gram * rate_npr_per_usd;

    let price_per_gram_npr =
        (npr_per_gram * margin.markup_factor + margin.flat_surcharge_npr_per_gram()).round() as i64;
    let price_per_tola_npr = (price_per_gram_npr as f64 * GRAMS_PER_TOLA).round() as i64;

    RetailPrice {
        price_per_gram_npr,
        price_per_tola_npr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE_RATE: f64 = 144.5737;

    #[test]
    fn gold_reference_scenario() {
        let margin = MarginSchedule::for_metal(MetalSymbol::Gold);
        let retail = derive_retail(4994.50, REFERENCE_RATE, &margin);

        // spot 4994.50 / 31.1035 = 160.5768 USD/gram, * 144.5737 = 23215.18
        // NPR/gram unmargined; margined and stage-rounded:
        assert_eq!(retail.price_per_gram_npr, 25965);
        assert_eq!(retail.price_per_tola_npr, 302856);
    }

    #[test]
    fn silver_reference_scenario() {
        let margin = MarginSchedule::for_metal(MetalSymbol::Silver);
        let retail = derive_retail(57.25, REFERENCE_RATE, &margin);

        assert_eq!(retail.price_per_gram_npr, 313);
        assert_eq!(retail.price_per_tola_npr, 3651);
    }

    #[test]
    fn tola_is_rounded_gram_times_tola_grams() {
        for symbol in MetalSymbol::ALL {
            let margin = MarginSchedule::for_metal(symbol);
            for spot in [0.5, 12.0, 57.25, 1999.99, 4994.50, 12000.0] {
                for rate in [95.0, 120.25, 144.5737, 180.0] {
                    let retail = derive_retail(spot, rate, &margin);
                    assert!(retail.price_per_gram_npr > 0);
                    assert!(retail.price_per_tola_npr > 0);
                    assert_eq!(
                        retail.price_per_tola_npr,
                        (retail.price_per_gram_npr as f64 * GRAMS_PER_TOLA).round() as i64
                    );
                }
            }
        }
    }

    #[test]
    fn margin_exceeds_unmargined_value_by_at_least_flat_surcharge() {
        for symbol in MetalSymbol::ALL {
            let margin = MarginSchedule::for_metal(symbol);
            for spot in [10.0, 100.0, 2500.0, 4994.50] {
                let retail = derive_retail(spot, REFERENCE_RATE, &margin);
                let unmargined = spot / GRAMS_PER_TROY_OUNCE * REFERENCE_RATE;
                assert!(
                    retail.price_per_gram_npr as f64
                        >= unmargined + margin.flat_surcharge_npr_per_gram() - 1.0,
                    "{symbol}: margined {} vs unmargined {}",
                    retail.price_per_gram_npr,
                    unmargined
                );
            }
        }
    }

    #[test]
    fn conversion_is_deterministic() {
        let margin = MarginSchedule::for_metal(MetalSymbol::Gold);
        let first = derive_retail(4994.50, REFERENCE_RATE, &margin);
        let second = derive_retail(4994.50, REFERENCE_RATE, &margin);
        assert_eq!(first, second);
    }
}
