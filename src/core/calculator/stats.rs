//! Daily statistics: hours, earnings and tax.

use crate::models::{DailyStats, Entry, Settings};
use crate::utils::time::round_hours;

pub fn daily_stats(entries: &[Entry], settings: &Settings) -> DailyStats {
    let mut synced = 0.0;
    let mut unsynced = 0.0;

    for entry in entries.iter().filter(|e| !e.deleted) {
        if let Some(hours) = entry.duration_hours() {
            if entry.synced {
                synced += hours;
            } else {
                unsynced += hours;
            }
        }
    }

    let total = synced + unsynced;
    let earnings = total * settings.rate;
    let tax_amount = earnings * settings.tax / 100.0;

    DailyStats {
        total_hours: round_hours(total),
        synced_hours: round_hours(synced),
        unsynced_hours: round_hours(unsynced),
        earnings: round_cents(earnings),
        tax_amount: round_cents(tax_amount),
        net: round_cents(earnings - tax_amount),
    }
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
