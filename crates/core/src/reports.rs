//! Daily watch report assembly.
//!
//! Builds the plain-text report summarizing every tracked instrument:
//! a subject line counting instruments per zone, and a fixed-width body
//! grouped Buy through Sell with each group ranked by zone rating.

use std::collections::BTreeMap;

use log::warn;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::instruments::Instrument;
use crate::zones::{
    classify, percent_change_today, percent_of_52_week_high, rating_order, Zone,
};

/// A composed plain-text report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub subject: String,
    pub body: String,
}

const COLUMN_HEADINGS: &str = "   rating, current,     buy,    sell,   %52wk,    %chg";

/// Composes the daily report over the tracked instruments.
///
/// Instruments are grouped by zone in display order; groups with no
/// members are left out entirely. Within a group, rows sort by rating,
/// deepest discount first in the Buy group and ascending everywhere
/// else. Instruments without a usable band are skipped with a warning.
///
/// Returns `None` when there is nothing to report.
pub fn compose_daily_report(instruments: &[Instrument]) -> Option<Report> {
    let mut groups: BTreeMap<Zone, Vec<(&Instrument, Decimal)>> = BTreeMap::new();
    for instrument in instruments {
        if !instrument.has_valid_band() {
            warn!(
                "Skipping {} in the report: band {}..{} is not usable",
                instrument.symbol, instrument.buy_price, instrument.sell_price
            );
            continue;
        }
        let assignment = classify(
            instrument.buy_price,
            instrument.sell_price,
            instrument.current_price,
        );
        groups
            .entry(assignment.zone)
            .or_default()
            .push((instrument, assignment.rating));
    }

    if groups.is_empty() {
        return None;
    }

    let subject = groups
        .iter()
        .map(|(zone, members)| format!("{} {}", members.len(), zone.display_name()))
        .collect::<Vec<_>>()
        .join(", ");

    let mut body = format!("{:<43}{}", "symbol.name: ", COLUMN_HEADINGS);
    for (zone, members) in &mut groups {
        members.sort_by(|a, b| rating_order(*zone, a.1, b.1));

        body.push_str(&format!("\n{}\n", zone.display_name()));
        for (instrument, rating) in members.iter() {
            let label = format!("{}.{}: ", instrument.symbol, instrument.name);
            let pct_of_high = percent_of_52_week_high(
                instrument.current_price,
                instrument.high_52_week,
            );
            let pct_change =
                percent_change_today(instrument.current_price, instrument.previous_close);
            body.push_str(&format!(
                "{:<45}{:7.2}%, {:7.2}, {:7.2}, {:7.2}, {:7.2}%, {:7.2}%\n",
                label,
                display(*rating * dec!(100)),
                display(instrument.current_price),
                display(instrument.buy_price),
                display(instrument.sell_price),
                display(pct_of_high),
                display(pct_change),
            ));
        }
    }

    Some(Report { subject, body })
}

fn display(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}
