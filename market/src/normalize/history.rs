use chrono::{DateTime, Utc};
use serde_json::Value;

use super::{first_number, unwrap_rows};
use crate::types::HistoryBar;

const TIMESTAMP_KEYS: &[&str] = &["date_utc", "timestamp", "t"];
const VOLUME_KEYS: &[&str] = &["volume", "v"];

/// Keys under which history endpoints return a timestamp-keyed object.
const KEYED_WRAPPERS: &[&str] = &["body", "items", "data"];

/// Converts an intraday history payload into bars sorted by time.
///
/// Accepts either a row array (bare or wrapped) or an object keyed by
/// timestamp. Bars without a parseable epoch-seconds timestamp or volume
/// are dropped.
pub fn normalize_history(payload: &Value) -> Vec<HistoryBar> {
    let rows: Vec<&Value> = {
        let listed = unwrap_rows(payload);
        if !listed.is_empty() {
            listed.iter().collect()
        } else {
            keyed_rows(payload)
        }
    };

    let mut bars: Vec<HistoryBar> = rows
        .into_iter()
        .filter_map(Value::as_object)
        .filter_map(|row| {
            let secs = first_number(row, TIMESTAMP_KEYS)?;
            let ts = DateTime::<Utc>::from_timestamp(secs as i64, 0)?;
            let volume = first_number(row, VOLUME_KEYS)?;
            Some(HistoryBar { ts, volume })
        })
        .collect();

    bars.sort_by_key(|b| b.ts);
    bars
}

fn keyed_rows(payload: &Value) -> Vec<&Value> {
    let Some(map) = payload.as_object() else {
        return Vec::new();
    };

    KEYED_WRAPPERS
        .iter()
        .find_map(|k| map.get(*k).and_then(Value::as_object))
        .map(|inner| inner.values().collect())
        .unwrap_or_default()
}
