use serde_json::Value;

use super::{first_number, first_string, unwrap_rows};
use crate::types::{OptionContract, safe_ratio};

const SYMBOL_KEYS: &[&str] = &["symbol", "contractSymbol", "optionSymbol"];
const UNDERLYING_KEYS: &[&str] = &["baseSymbol", "underlyingSymbol", "underlying"];
const KIND_KEYS: &[&str] = &["symbolType", "type", "optionType"];
const STRIKE_KEYS: &[&str] = &["strikePrice", "strike"];
const EXPIRATION_KEYS: &[&str] = &["expirationDate", "expiration"];
const LAST_PRICE_KEYS: &[&str] = &["lastPrice", "last", "price"];
const VOLUME_KEYS: &[&str] = &["volume"];
const OPEN_INTEREST_KEYS: &[&str] = &["openInterest", "open_interest"];
const RATIO_KEYS: &[&str] = &["volumeOpenInterestRatio", "volOIRatio", "vol_oi_ratio"];

/// Converts an unusual-options payload into contracts.
///
/// When upstream omits the volume/open-interest ratio it is derived, with
/// a zero open interest leaving the ratio absent.
pub fn normalize_options(payload: &Value) -> Vec<OptionContract> {
    unwrap_rows(payload)
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|row| {
            let symbol = first_string(row, SYMBOL_KEYS).filter(|s| !s.is_empty())?;

            let mut c = OptionContract::new(symbol);
            c.underlying = first_string(row, UNDERLYING_KEYS);
            c.kind = first_string(row, KIND_KEYS);
            c.strike = first_number(row, STRIKE_KEYS);
            c.expiration = first_string(row, EXPIRATION_KEYS);
            c.last_price = first_number(row, LAST_PRICE_KEYS);
            c.volume = first_number(row, VOLUME_KEYS);
            c.open_interest = first_number(row, OPEN_INTEREST_KEYS);
            c.vol_oi_ratio = first_number(row, RATIO_KEYS)
                .or_else(|| safe_ratio(c.volume?, c.open_interest?));

            Some(c)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_unusual_activity_rows() {
        let payload = json!({"body": [{
            "symbol": "XYZ260116C00050000",
            "baseSymbol": "XYZ",
            "symbolType": "Call",
            "strikePrice": "50.00",
            "expirationDate": "01/16/26",
            "lastPrice": "1.25",
            "volume": "4,500",
            "openInterest": "120",
            "volumeOpenInterestRatio": "37.50"
        }]});

        let out = normalize_options(&payload);
        assert_eq!(out.len(), 1);

        let c = &out[0];
        assert_eq!(c.underlying.as_deref(), Some("XYZ"));
        assert_eq!(c.kind.as_deref(), Some("Call"));
        assert_eq!(c.strike, Some(50.0));
        assert_eq!(c.volume, Some(4500.0));
        assert_eq!(c.vol_oi_ratio, Some(37.5));
    }

    #[test]
    fn derives_ratio_when_missing() {
        let payload = json!([{"contractSymbol": "C1", "volume": 3000, "openInterest": 100}]);
        assert_eq!(normalize_options(&payload)[0].vol_oi_ratio, Some(30.0));
    }

    #[test]
    fn zero_open_interest_leaves_ratio_absent() {
        let payload = json!([{"symbol": "C1", "volume": 3000, "openInterest": 0}]);
        assert_eq!(normalize_options(&payload)[0].vol_oi_ratio, None);
    }
}
