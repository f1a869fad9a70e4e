//! Telegram Markdown rendering for alerts and reports.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use market::sentiment::sentiment;
use market::types::ExtendedSession;
use market::{AlertEvent, MoverRecord, RuleKind};

/// `*SYM* | +5.20% | $4.10 | Vol: 1,234,567`; absent fields are omitted.
pub fn format_stock(m: &MoverRecord) -> String {
    let mut parts = vec![format!("*{}*", m.symbol)];

    if let Some(pct) = m.change_percent {
        parts.push(format!("{pct:+.2}%"));
    }
    if let Some(price) = m.price {
        parts.push(format!("${price:.2}"));
    }
    if let Some(volume) = m.volume {
        parts.push(format!("Vol: {}", format_count(volume)));
    }

    parts.join(" | ")
}

/// Whole number with thousands separators.
pub fn format_count(v: f64) -> String {
    let n = v.round() as i64;
    let digits = n.unsigned_abs().to_string();

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    if n < 0 { format!("-{out}") } else { out }
}

/// `12:05 PM EST` in the market's zone.
pub fn format_clock(at: DateTime<Utc>, tz: Tz) -> String {
    at.with_timezone(&tz).format("%I:%M %p %Z").to_string()
}

pub fn header(kind: RuleKind) -> &'static str {
    match kind {
        RuleKind::GainThreshold => "📈 *Gain Threshold Alerts*",
        RuleKind::VolumeSpike => "📊 *Volume Spike Alerts*",
        RuleKind::HistoryVolumeSpike => "📊 *Day-over-Day Volume Spikes*",
        RuleKind::BidExact => "🎯 *Bid Match Alerts*",
        RuleKind::BidHighValue => "💰 *High-Value Bid Alerts*",
        RuleKind::UnusualActivity => "⚠️ *Unusual Activity*",
        RuleKind::TradingHalt => "⛔ *Trading Halts*",
        RuleKind::UnusualOption => "🧨 *Unusual Options Activity*",
        RuleKind::GapUp => "🚀 *Gap Up Digest*",
        RuleKind::ExtendedHours => "🌙 *Pre-Market / After-Hours Movers*",
        RuleKind::LargeSale => "🔔 *Watchlist Volume Alerts*",
    }
}

pub fn format_event(event: &AlertEvent) -> String {
    match event {
        AlertEvent::Gain { mover, .. } => format_stock(mover),

        AlertEvent::VolumeSpike { mover, ratio } => {
            format!("{} (x{ratio:.1})", format_stock(mover))
        }

        AlertEvent::HistoryVolumeSpike {
            symbol,
            today_volume,
            yesterday_volume,
            ratio,
        } => format!(
            "*{symbol}* | Today: {} vs Yesterday: {} (x{ratio:.1})",
            format_count(*today_volume),
            format_count(*yesterday_volume)
        ),

        AlertEvent::BidExact {
            mover,
            bid,
            bid_size,
        }
        | AlertEvent::BidHighValue {
            mover,
            bid,
            bid_size,
        } => format!(
            "{} | Bid: ${bid:.2} x {}",
            format_stock(mover),
            format_count(*bid_size)
        ),

        AlertEvent::UnusualActivity {
            mover,
            volume_ratio,
            ..
        } => match volume_ratio {
            Some(r) => format!("{} (x{r:.1} avg vol)", format_stock(mover)),
            None => format_stock(mover),
        },

        AlertEvent::Halt { mover } => match mover.display_name() {
            Some(name) => format!("*{}* ({name}) | HALTED", mover.symbol),
            None => format!("*{}* | HALTED", mover.symbol),
        },

        AlertEvent::UnusualOption {
            contract,
            vol_oi_ratio,
        } => {
            let mut parts = vec![format!("*{}*", contract.symbol)];

            let details: Vec<String> = [
                contract.underlying.clone(),
                contract.kind.clone(),
                contract.strike.map(|s| format!("${s:.2}")),
                contract.expiration.as_ref().map(|e| format!("exp {e}")),
            ]
            .into_iter()
            .flatten()
            .collect();
            if !details.is_empty() {
                parts.push(details.join(" "));
            }

            if let Some(v) = contract.volume {
                parts.push(format!("Vol: {}", format_count(v)));
            }
            if let Some(oi) = contract.open_interest {
                parts.push(format!("OI: {}", format_count(oi)));
            }
            parts.push(format!("Vol/OI: {vol_oi_ratio:.1}"));

            parts.join(" | ")
        }

        AlertEvent::GapUp { mover, gap_percent } => {
            format!("{} | Gap: {gap_percent:+.2}%", format_stock(mover))
        }

        AlertEvent::ExtendedHours {
            mover,
            session,
            change_percent,
        } => {
            let label = match session {
                ExtendedSession::PreMarket => "Pre-Market",
                ExtendedSession::AfterHours => "After-Hours",
            };
            format!("{} | {label}: {change_percent:+.2}%", format_stock(mover))
        }

        AlertEvent::LargeSale {
            symbol,
            reason,
            volume,
            delta,
        } => format!(
            "*{symbol}* ({reason}) | Vol: {} (+{})",
            format_count(*volume),
            format_count(*delta)
        ),
    }
}

/// One message per rule kind, in the order kinds first appear.
pub fn render_events(events: &[AlertEvent]) -> Vec<String> {
    let mut kinds: Vec<RuleKind> = Vec::new();
    for e in events {
        if !kinds.contains(&e.kind()) {
            kinds.push(e.kind());
        }
    }

    kinds
        .into_iter()
        .map(|kind| {
            let lines: Vec<String> = events
                .iter()
                .filter(|e| e.kind() == kind)
                .map(|e| format!("- {}", format_event(e)))
                .collect();
            format!("{}\n{}", header(kind), lines.join("\n"))
        })
        .collect()
}

/// Top gainers table with a sentiment label per row.
pub fn render_top(movers: &[MoverRecord], n: usize) -> Option<String> {
    if movers.is_empty() {
        return None;
    }

    let rows: Vec<String> = movers
        .iter()
        .take(n)
        .map(|m| match sentiment(m) {
            Some(s) => format!("- {} | {} {}", format_stock(m), s.emoji(), s.label()),
            None => format!("- {}", format_stock(m)),
        })
        .collect();

    Some(format!("🏆 *Top {n} Gainers*\n{}", rows.join("\n")))
}
