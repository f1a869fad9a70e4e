use chrono::{DateTime, Utc};

use market::MarketCalendar;

use crate::format::format_clock;

/// `✅ *Bot started*` with the market clock, gate state and next scan.
pub fn startup_message(calendar: &MarketCalendar, now: DateTime<Utc>) -> String {
    let open = calendar.is_open(now);

    let next_scan = if open {
        "Now".to_string()
    } else {
        calendar
            .next_open(now)
            .map(|at| at.format("%a %b %-d, %I:%M %p %Z").to_string())
            .unwrap_or_else(|| "unknown".to_string())
    };

    format!(
        "✅ *Bot started*\nTime: {}\nMarket: {}\nNext scan: {next_scan}",
        format_clock(now, calendar.timezone()),
        if open { "OPEN" } else { "CLOSED" },
    )
}
