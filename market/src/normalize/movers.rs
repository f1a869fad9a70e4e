use serde_json::Value;

use super::{first_number, first_string, unwrap_rows};
use crate::types::MoverRecord;

const SYMBOL_KEYS: &[&str] = &["symbol", "ticker"];
const CHANGE_PERCENT_KEYS: &[&str] = &[
    "change_percent",
    "changePercent",
    "percent_change",
    "regularMarketChangePercent",
];
const PRICE_KEYS: &[&str] = &["price", "last", "regularMarketPrice", "lastSalePrice"];
const VOLUME_KEYS: &[&str] = &["volume", "regularMarketVolume"];
const AVG_VOLUME_KEYS: &[&str] = &[
    "avg_volume",
    "averageVolume",
    "averageDailyVolume3Month",
    "averageDailyVolume10Day",
];

/// Raw fields copied into `MoverRecord::extra` when present.
const EXTRA_KEYS: &[&str] = &[
    "bid",
    "bidSize",
    "ask",
    "askSize",
    "marketState",
    "preMarketPrice",
    "preMarketChangePercent",
    "postMarketPrice",
    "postMarketChangePercent",
    "regularMarketPreviousClose",
    "previousClose",
    "fiftyDayAverage",
    "twoHundredDayAverage",
    "shortName",
];

/// Converts a movers/screener/quotes payload into mover records.
///
/// Rows without a symbol are dropped silently; upstream routinely mixes in
/// non-tradable rows.
pub fn normalize_movers(payload: &Value) -> Vec<MoverRecord> {
    unwrap_rows(payload)
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|row| {
            let symbol = first_string(row, SYMBOL_KEYS).filter(|s| !s.is_empty())?;

            let mut mover = MoverRecord::new(symbol);
            mover.change_percent = first_number(row, CHANGE_PERCENT_KEYS);
            mover.price = first_number(row, PRICE_KEYS);
            mover.volume = first_number(row, VOLUME_KEYS);
            mover.avg_volume = first_number(row, AVG_VOLUME_KEYS);

            for key in EXTRA_KEYS {
                if let Some(v) = row.get(*key).filter(|v| !v.is_null()) {
                    mover.extra.insert((*key).to_string(), v.clone());
                }
            }

            Some(mover)
        })
        .collect()
}
