use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

const DEFAULT_JWT_EXPIRES: &str = "7d";
const DEFAULT_RESET_EXPIRES: &str = "30m";
/// Upper bound for configured expiries (100 years).
pub const MAX_DURATION_SECS: u64 = 100 * 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub expires_in: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountConfig {
    pub jwt: JwtConfig,
    pub reset_token_ttl: Duration,
}

impl AccountConfig {
    /// Reads `.env` (if present) and then the process environment.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .context("JWT_SECRET must be set")?;

        let expires_raw = lookup("JWT_EXPIRES_TIME").unwrap_or_else(|| DEFAULT_JWT_EXPIRES.into());
        let expires_in = parse_duration(&expires_raw)
            .with_context(|| format!("invalid JWT_EXPIRES_TIME {expires_raw:?}"))?;

        let reset_raw =
            lookup("RESET_TOKEN_EXPIRES_TIME").unwrap_or_else(|| DEFAULT_RESET_EXPIRES.into());
        let reset_token_ttl = parse_duration(&reset_raw)
            .with_context(|| format!("invalid RESET_TOKEN_EXPIRES_TIME {reset_raw:?}"))?;

        Ok(Self {
            jwt: JwtConfig { secret, expires_in },
            reset_token_ttl,
        })
    }
}

/// Parses `90`, `45s`, `30m`, `12h`, `7d` or `2w`. Bare numbers are seconds.
pub fn parse_duration(raw: &str) -> anyhow::Result<Duration> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split);
    if digits.is_empty() {
        anyhow::bail!("duration must start with a number");
    }
    let value: u64 = digits.parse().context("duration value out of range")?;
    let multiplier = match unit.trim() {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 60 * 60 * 24,
        "w" => 60 * 60 * 24 * 7,
        other => anyhow::bail!("unknown duration unit {other:?}"),
    };
    let secs = value
        .checked_mul(multiplier)
        .filter(|secs| *secs <= MAX_DURATION_SECS)
        .context("duration value out of range")?;
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn parses_duration_units() {
        assert_eq!(parse_duration("90").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration("45s").unwrap(), Duration::from_secs(45));
        assert_eq!(parse_duration("30m").unwrap(), Duration::from_secs(1800));
        assert_eq!(parse_duration("12h").unwrap(), Duration::from_secs(43_200));
        assert_eq!(parse_duration("7d").unwrap(), Duration::from_secs(604_800));
        assert_eq!(parse_duration(" 2w ").unwrap(), Duration::from_secs(1_209_600));
    }

    #[test]
    fn rejects_bad_durations() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("d").is_err());
        assert!(parse_duration("10y").is_err());
        assert!(parse_duration("99999999999999999999").is_err());
    }

    #[test]
    fn rejects_durations_past_the_cap() {
        assert!(parse_duration("1000000000000s").is_err());
        assert!(parse_duration("9223372036854775808").is_err());
        assert_eq!(
            parse_duration("5200w").unwrap(),
            Duration::from_secs(5200 * 7 * 24 * 60 * 60)
        );
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let cfg = AccountConfig::from_lookup(lookup_from(&[("JWT_SECRET", "s3cret")])).unwrap();
        assert_eq!(cfg.jwt.secret, "s3cret");
        assert_eq!(cfg.jwt.expires_in, Duration::from_secs(7 * 24 * 60 * 60));
        assert_eq!(cfg.reset_token_ttl, Duration::from_secs(30 * 60));
    }

    #[test]
    fn reads_explicit_values() {
        let cfg = AccountConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", "abc"),
            ("JWT_EXPIRES_TIME", "1h"),
            ("RESET_TOKEN_EXPIRES_TIME", "10m"),
        ]))
        .unwrap();
        assert_eq!(cfg.jwt.expires_in, Duration::from_secs(3600));
        assert_eq!(cfg.reset_token_ttl, Duration::from_secs(600));
    }

    #[test]
    fn missing_or_blank_secret_is_an_error() {
        let err = AccountConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
        assert!(AccountConfig::from_lookup(lookup_from(&[("JWT_SECRET", "  ")])).is_err());
    }

    #[test]
    fn invalid_expiry_names_the_variable() {
        let err = AccountConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", "abc"),
            ("JWT_EXPIRES_TIME", "soon"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("JWT_EXPIRES_TIME"));
    }
}
