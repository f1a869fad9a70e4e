//! Presentational trend label. Never gates an alert.

use std::fmt;

use crate::types::MoverRecord;

const PERCENT_WEIGHT: f64 = 0.6;
const VOLUME_WEIGHT: f64 = 0.3 * 20.0;
const AVERAGES_BONUS: f64 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sentiment {
    VeryBullish,
    Bullish,
    Neutral,
    Bearish,
    VeryBearish,
}

impl Sentiment {
    pub fn label(&self) -> &'static str {
        match self {
            Sentiment::VeryBullish => "Very Bullish",
            Sentiment::Bullish => "Bullish",
            Sentiment::Neutral => "Neutral",
            Sentiment::Bearish => "Bearish",
            Sentiment::VeryBearish => "Very Bearish",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Sentiment::VeryBullish => "🚀",
            Sentiment::Bullish => "📈",
            Sentiment::Neutral => "➖",
            Sentiment::Bearish => "📉",
            Sentiment::VeryBearish => "🔻",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `0.6*pct + 0.3*20*(volumeRatio-1) + bonus`.
///
/// A missing volume ratio counts as 1.0 (no volume contribution). The bonus
/// is +2 above both the 50- and 200-day averages, -2 below both.
pub fn score(mover: &MoverRecord) -> Option<f64> {
    let pct = mover.change_percent?;
    let ratio = mover.volume_ratio().unwrap_or(1.0);

    Some(PERCENT_WEIGHT * pct + VOLUME_WEIGHT * (ratio - 1.0) + averages_bonus(mover))
}

fn averages_bonus(mover: &MoverRecord) -> f64 {
    let (Some(price), Some(fifty), Some(two_hundred)) = (
        mover.price,
        mover.extra_f64("fiftyDayAverage"),
        mover.extra_f64("twoHundredDayAverage"),
    ) else {
        return 0.0;
    };

    if price > fifty && price > two_hundred {
        AVERAGES_BONUS
    } else if price < fifty && price < two_hundred {
        -AVERAGES_BONUS
    } else {
        0.0
    }
}

pub fn classify(score: f64) -> Sentiment {
    if score >= 15.0 {
        Sentiment::VeryBullish
    } else if score >= 7.0 {
        Sentiment::Bullish
    } else if score > -4.0 {
        Sentiment::Neutral
    } else if score > -10.0 {
        Sentiment::Bearish
    } else {
        Sentiment::VeryBearish
    }
}

pub fn sentiment(mover: &MoverRecord) -> Option<Sentiment> {
    score(mover).map(classify)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cutoffs() {
        assert_eq!(classify(15.0), Sentiment::VeryBullish);
        assert_eq!(classify(14.99), Sentiment::Bullish);
        assert_eq!(classify(7.0), Sentiment::Bullish);
        assert_eq!(classify(6.99), Sentiment::Neutral);
        assert_eq!(classify(-3.99), Sentiment::Neutral);
        assert_eq!(classify(-4.0), Sentiment::Bearish);
        assert_eq!(classify(-9.99), Sentiment::Bearish);
        assert_eq!(classify(-10.0), Sentiment::VeryBearish);
    }

    #[test]
    fn weights() {
        let mut m = MoverRecord::new("ABC");
        m.change_percent = Some(10.0);
        m.volume = Some(200.0);
        m.avg_volume = Some(100.0);

        // 0.6*10 + 6*(2-1) = 12
        assert!((score(&m).unwrap() - 12.0).abs() < 1e-9);
        assert_eq!(sentiment(&m), Some(Sentiment::Bullish));
    }

    #[test]
    fn averages_bonus_applies_both_ways() {
        let base = |price: f64| {
            let mut m = MoverRecord::new("ABC")
                .with_extra("fiftyDayAverage", json!(10.0))
                .with_extra("twoHundredDayAverage", json!(12.0));
            m.change_percent = Some(0.0);
            m.price = Some(price);
            m
        };

        assert_eq!(score(&base(13.0)), Some(2.0));
        assert_eq!(score(&base(9.0)), Some(-2.0));
        assert_eq!(score(&base(11.0)), Some(0.0));
    }

    #[test]
    fn missing_percent_has_no_sentiment() {
        assert_eq!(sentiment(&MoverRecord::new("ABC")), None);
    }
}
