use std::str::FromStr;
use std::time::Duration;

use market::RealertPolicy;
use market::rules::RuleThresholds;
use scheduler::SchedulerConfig;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// How the API key is attached to data-source requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthMode {
    /// `Authorization: Bearer <key>`.
    #[default]
    Bearer,
    /// `?apikey=<key>`.
    Query,
}

impl FromStr for AuthMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bearer" | "header" => Ok(AuthMode::Bearer),
            "query" | "apikey" => Ok(AuthMode::Query),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct MboumConfig {
    pub api_key: String,
    pub base_url: String,
    pub auth_mode: AuthMode,

    /// Per-request timeout, connect included.
    pub http_timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    pub api_url: String,
    pub http_timeout: Duration,
}

/// How often each job runs while the market is open.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobIntervals {
    pub scan: Duration,
    pub watchlist: Duration,
    pub options: Duration,
    pub gaps: Duration,
    pub top: Duration,
    pub status: Duration,
}

impl Default for JobIntervals {
    fn default() -> Self {
        Self {
            scan: Duration::from_secs(60),
            watchlist: Duration::from_secs(60),
            options: Duration::from_secs(120),
            gaps: Duration::from_secs(300),
            top: Duration::from_secs(300),
            status: Duration::from_secs(3_600),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    // =========================
    // External services
    // =========================
    pub mboum: MboumConfig,
    pub telegram: TelegramConfig,

    // =========================
    // Scheduler configuration
    // =========================
    /// Tick cadence, closed-market cadence, per-task timeout and the
    /// backoff after a failed task.
    pub scheduler: SchedulerConfig,

    pub intervals: JobIntervals,

    // =========================
    // Alerting configuration
    // =========================
    pub thresholds: RuleThresholds,

    /// Re-alert policy for the gain threshold rule. Ratio-based rules always
    /// re-alert on a strict increase only.
    pub realert_policy: RealertPolicy,

    /// Watchlist entries with no alert for this long are dropped.
    pub watchlist_ttl: Duration,

    /// Movers requested per scan.
    pub movers_limit: usize,

    /// Rows in the top gainers report.
    pub top_n: usize,

    /// Leading movers that also get a day-over-day history check per scan.
    ///
    /// Each one costs an extra request, so keep this small.
    pub history_symbols: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };

        let http_timeout = env.secs("HTTP_TIMEOUT_SECS", 10)?;

        let mboum = MboumConfig {
            api_key: env.required("MBOUM_API_KEY")?,
            base_url: env.string("MBOUM_BASE_URL", "https://api.mboum.com"),
            auth_mode: env.parsed("MBOUM_AUTH_MODE", AuthMode::Bearer)?,
            http_timeout,
        };

        let telegram = TelegramConfig {
            bot_token: env.required("TELEGRAM_BOT_TOKEN")?,
            chat_id: env.required("TELEGRAM_CHAT_ID")?,
            api_url: env.string("TELEGRAM_API_URL", "https://api.telegram.org"),
            http_timeout,
        };

        let scheduler = SchedulerConfig {
            tick: Duration::from_millis(env.parsed("TICK_MS", 1_000)?),
            closed_tick: env.secs("CLOSED_TICK_SECS", 5)?,
            task_timeout: env.secs("TASK_TIMEOUT_SECS", 60)?,
            error_backoff: env.secs("ERROR_BACKOFF_SECS", 5)?,
            slow_task: env.secs("SLOW_TASK_SECS", 10)?,
        };

        let d = JobIntervals::default();
        let intervals = JobIntervals {
            scan: env.secs("SCAN_INTERVAL_SECS", d.scan.as_secs())?,
            watchlist: env.secs("WATCHLIST_INTERVAL_SECS", d.watchlist.as_secs())?,
            options: env.secs("OPTIONS_INTERVAL_SECS", d.options.as_secs())?,
            gaps: env.secs("GAP_INTERVAL_SECS", d.gaps.as_secs())?,
            top: env.secs("TOP_INTERVAL_SECS", d.top.as_secs())?,
            status: env.secs("STATUS_INTERVAL_SECS", d.status.as_secs())?,
        };

        let t = RuleThresholds::default();
        let thresholds = RuleThresholds {
            gain_percent: env.parsed("GAIN_THRESHOLD", t.gain_percent)?,
            volume_spike_ratio: env.parsed("VOLUME_SPIKE_MULTIPLIER", t.volume_spike_ratio)?,
            history_spike_ratio: env.parsed("HISTORY_SPIKE_MULTIPLIER", t.history_spike_ratio)?,

            bid_exact_price: env.parsed("BID_EXACT_PRICE", t.bid_exact_price)?,
            bid_exact_tolerance: env.parsed("BID_EXACT_TOLERANCE", t.bid_exact_tolerance)?,
            bid_exact_size: env.parsed("BID_EXACT_SIZE", t.bid_exact_size)?,
            bid_high_min_price: env.parsed("BID_HIGH_MIN_PRICE", t.bid_high_min_price)?,
            bid_high_min_size: env.parsed("BID_HIGH_MIN_SIZE", t.bid_high_min_size)?,

            unusual_change_percent: env
                .parsed("UNUSUAL_CHANGE_PERCENT", t.unusual_change_percent)?,
            unusual_volume_ratio: env.parsed("UNUSUAL_VOLUME_RATIO", t.unusual_volume_ratio)?,

            option_vol_oi_ratio: env.parsed("OPTION_VOL_OI_RATIO", t.option_vol_oi_ratio)?,
            option_min_volume: env.parsed("OPTION_MIN_VOLUME", t.option_min_volume)?,

            gap_percent: env.parsed("GAP_THRESHOLD", t.gap_percent)?,
            extended_hours_percent: env
                .parsed("EXTENDED_HOURS_THRESHOLD", t.extended_hours_percent)?,

            large_sale_delta: env.parsed("LARGE_SALE_DELTA", t.large_sale_delta)?,
        };

        Ok(Self {
            mboum,
            telegram,
            scheduler,
            intervals,
            thresholds,
            realert_policy: env.parsed("REALERT_POLICY", RealertPolicy::StrictIncrease)?,
            watchlist_ttl: env.secs("WATCHLIST_TTL_SECS", 86_400)?,
            movers_limit: env.parsed("MOVERS_LIMIT", 50)?,
            top_n: env.parsed("TOP_N", 10)?,
            history_symbols: env.parsed("HISTORY_SYMBOLS", 5)?,
        })
    }
}

struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key).ok_or(ConfigError::Missing(key))
    }

    fn string(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T: FromStr>(&self, key: &'static str, default: T) -> Result<T, ConfigError> {
        match self.get(key) {
            None => Ok(default),
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::Invalid { key, value }),
        }
    }

    fn secs(&self, key: &'static str, default: u64) -> Result<Duration, ConfigError> {
        self.parsed(key, default).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: &[(&str, &str)] = &[
        ("MBOUM_API_KEY", "key"),
        ("TELEGRAM_BOT_TOKEN", "token"),
        ("TELEGRAM_CHAT_ID", "-100123"),
    ];

    #[test]
    fn defaults_apply_when_only_credentials_are_set() {
        let cfg = AppConfig::from_lookup(lookup(REQUIRED)).unwrap();

        assert_eq!(cfg.mboum.base_url, "https://api.mboum.com");
        assert_eq!(cfg.mboum.auth_mode, AuthMode::Bearer);
        assert_eq!(cfg.telegram.chat_id, "-100123");
        assert_eq!(cfg.scheduler.tick, Duration::from_secs(1));
        assert_eq!(cfg.scheduler.closed_tick, Duration::from_secs(5));
        assert_eq!(cfg.intervals, JobIntervals::default());
        assert_eq!(cfg.thresholds, RuleThresholds::default());
        assert_eq!(cfg.realert_policy, RealertPolicy::StrictIncrease);
        assert_eq!(cfg.watchlist_ttl, Duration::from_secs(86_400));
        assert_eq!(cfg.movers_limit, 50);
        assert_eq!(cfg.top_n, 10);
    }

    #[test]
    fn each_credential_is_required() {
        for missing in ["MBOUM_API_KEY", "TELEGRAM_BOT_TOKEN", "TELEGRAM_CHAT_ID"] {
            let pairs: Vec<(&str, &str)> = REQUIRED
                .iter()
                .copied()
                .filter(|(k, _)| *k != missing)
                .collect();

            let err = AppConfig::from_lookup(lookup(&pairs)).unwrap_err();
            assert_eq!(err, ConfigError::Missing(missing));
        }
    }

    #[test]
    fn blank_credential_counts_as_missing() {
        let mut pairs = REQUIRED.to_vec();
        pairs[0] = ("MBOUM_API_KEY", "   ");

        assert_eq!(
            AppConfig::from_lookup(lookup(&pairs)).unwrap_err(),
            ConfigError::Missing("MBOUM_API_KEY")
        );
    }

    #[test]
    fn overrides_are_parsed() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("MBOUM_AUTH_MODE", "query"),
            ("REALERT_POLICY", "change"),
            ("GAIN_THRESHOLD", "7.5"),
            ("SCAN_INTERVAL_SECS", "30"),
            ("TICK_MS", "250"),
        ]);

        let cfg = AppConfig::from_lookup(lookup(&pairs)).unwrap();

        assert_eq!(cfg.mboum.auth_mode, AuthMode::Query);
        assert_eq!(cfg.realert_policy, RealertPolicy::AnyChange);
        assert_eq!(cfg.thresholds.gain_percent, 7.5);
        assert_eq!(cfg.intervals.scan, Duration::from_secs(30));
        assert_eq!(cfg.scheduler.tick, Duration::from_millis(250));
    }

    #[test]
    fn unparseable_value_is_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("TOP_N", "ten"));

        assert_eq!(
            AppConfig::from_lookup(lookup(&pairs)).unwrap_err(),
            ConfigError::Invalid {
                key: "TOP_N",
                value: "ten".into()
            }
        );
    }
}
