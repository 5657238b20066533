//! Band classification for tracked instruments.
//!
//! An instrument carries a buy price and a sell price; the span between
//! them is its band. Classification places the current price into one of
//! five zones across that band and scores how deep into the zone it sits,
//! which is what the daily report sorts on.

use std::cmp::Ordering;

use log::error;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Price zones across an instrument's band, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Zone {
    Buy,
    NearBuy,
    Middle,
    NearSell,
    Sell,
}

impl Zone {
    /// All zones in display order, Buy first.
    pub const ALL: [Zone; 5] = [
        Zone::Buy,
        Zone::NearBuy,
        Zone::Middle,
        Zone::NearSell,
        Zone::Sell,
    ];

    /// Human-readable group name used in reports.
    pub fn display_name(&self) -> &'static str {
        match self {
            Zone::Buy => "Buy",
            Zone::NearBuy => "Near buy",
            Zone::Middle => "Middle",
            Zone::NearSell => "Near sell",
            Zone::Sell => "Sell",
        }
    }
}

/// A zone together with how deep into it the price sits.
///
/// Ratings are fractions, not percentages: a price 80% of the way across
/// the band rates 0.8 in the NearSell zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneAssignment {
    pub zone: Zone,
    pub rating: Decimal,
}

/// Places `current` into a zone across the `buy`..`sell` band.
///
/// Callers must supply a usable band (positive buy price, sell above buy);
/// the ratings divide by the buy price and by the band width.
///
/// Zones and their ratings:
/// - below the buy price: `Buy`, rated by depth below as a fraction of buy
/// - within the bottom quarter of the band: `NearBuy`
/// - above the sell price: `Sell`, rated by excess as a fraction of sell
/// - within the top quarter of the band: `NearSell`
/// - otherwise `Middle`
///
/// Band-relative ratings are the price's position across the band, so a
/// NearBuy rating is small and a NearSell rating approaches one.
pub fn classify(buy: Decimal, sell: Decimal, current: Decimal) -> ZoneAssignment {
    let range = sell - buy;

    if current < buy {
        return ZoneAssignment {
            zone: Zone::Buy,
            rating: (buy - current) / buy,
        };
    }
    if current - buy < dec!(0.25) * range {
        return ZoneAssignment {
            zone: Zone::NearBuy,
            rating: (current - buy) / range,
        };
    }
    if current > sell {
        return ZoneAssignment {
            zone: Zone::Sell,
            rating: (current - sell) / sell,
        };
    }
    if current - buy > dec!(0.75) * range {
        return ZoneAssignment {
            zone: Zone::NearSell,
            rating: (current - buy) / range,
        };
    }
    ZoneAssignment {
        zone: Zone::Middle,
        rating: (current - buy) / range,
    }
}

/// Ordering of ratings within one zone's report group.
///
/// Deeper Buy discounts list first, so the Buy zone sorts descending;
/// every other zone sorts ascending, reading bottom of band to top.
pub fn rating_order(zone: Zone, a: Decimal, b: Decimal) -> Ordering {
    match zone {
        Zone::Buy => b.cmp(&a),
        _ => a.cmp(&b),
    }
}

/// Percent move from the previous close, e.g. `2.5` for a 2.5% rise.
///
/// Returns zero when the previous close is missing or non-positive.
pub fn percent_change_today(current: Decimal, previous_close: Decimal) -> Decimal {
    if previous_close <= Decimal::ZERO {
        error!(
            "Previous close {} is not usable, reporting 0% change",
            previous_close
        );
        return Decimal::ZERO;
    }
    (current - previous_close) / previous_close * dec!(100)
}

/// Current price as a percentage of the 52-week high.
///
/// Returns zero when the high is missing or non-positive.
pub fn percent_of_52_week_high(current: Decimal, high_52_week: Decimal) -> Decimal {
    if high_52_week <= Decimal::ZERO {
        error!(
            "52-week high {} is not usable, reporting 0%",
            high_52_week
        );
        return Decimal::ZERO;
    }
    current / high_52_week * dec!(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_below_buy_classifies_as_buy() {
        let assignment = classify(dec!(10), dec!(12), dec!(9.9));
        assert_eq!(assignment.zone, Zone::Buy);
        assert_eq!(assignment.rating, dec!(0.01));
    }

    #[test]
    fn test_price_at_buy_classifies_as_near_buy() {
        let assignment = classify(dec!(10), dec!(12), dec!(10));
        assert_eq!(assignment.zone, Zone::NearBuy);
        assert_eq!(assignment.rating, Decimal::ZERO);
    }

    #[test]
    fn test_price_midband_classifies_as_middle() {
        let assignment = classify(dec!(10), dec!(12), dec!(11));
        assert_eq!(assignment.zone, Zone::Middle);
        assert_eq!(assignment.rating, dec!(0.5));
    }

    #[test]
    fn test_price_in_top_quarter_classifies_as_near_sell() {
        let assignment = classify(dec!(10), dec!(12), dec!(11.6));
        assert_eq!(assignment.zone, Zone::NearSell);
        assert_eq!(assignment.rating, dec!(0.8));
    }

    #[test]
    fn test_price_above_sell_classifies_as_sell() {
        let assignment = classify(dec!(10), dec!(12), dec!(12.6));
        assert_eq!(assignment.zone, Zone::Sell);
        assert_eq!(assignment.rating, dec!(0.05));
    }

    #[test]
    fn test_quarter_boundaries_fall_in_middle() {
        // Exactly a quarter across is not NearBuy, exactly three quarters
        // across is not NearSell
        let lower = classify(dec!(10), dec!(12), dec!(10.5));
        assert_eq!(lower.zone, Zone::Middle);
        assert_eq!(lower.rating, dec!(0.25));

        let upper = classify(dec!(10), dec!(12), dec!(11.5));
        assert_eq!(upper.zone, Zone::Middle);
        assert_eq!(upper.rating, dec!(0.75));
    }

    #[test]
    fn test_price_at_sell_classifies_as_near_sell() {
        let assignment = classify(dec!(10), dec!(12), dec!(12));
        assert_eq!(assignment.zone, Zone::NearSell);
        assert_eq!(assignment.rating, dec!(1));
    }

    #[test]
    fn test_buy_zone_sorts_deepest_discount_first() {
        assert_eq!(
            rating_order(Zone::Buy, dec!(0.01), dec!(0.20)),
            Ordering::Greater
        );
        assert_eq!(
            rating_order(Zone::Middle, dec!(0.30), dec!(0.60)),
            Ordering::Less
        );
    }

    #[test]
    fn test_percent_change_today() {
        assert_eq!(percent_change_today(dec!(102), dec!(100)), dec!(2));
        assert_eq!(percent_change_today(dec!(99), dec!(100)), dec!(-1));
    }

    #[test]
    fn test_percent_change_with_missing_close_is_zero() {
        assert_eq!(percent_change_today(dec!(102), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_percent_of_52_week_high() {
        assert_eq!(percent_of_52_week_high(dec!(75), dec!(100)), dec!(75));
        assert_eq!(percent_of_52_week_high(dec!(75), Decimal::ZERO), Decimal::ZERO);
    }
}
