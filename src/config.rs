use anyhow::{bail, Context};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

/// How the `session_token` cookie value is produced and checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionScheme {
    /// `user_<username>`, unsigned.
    Legacy,
    /// HS256 token signed with `SESSION_SECRET`.
    Signed,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub scheme: SessionScheme,
    pub secret: Option<String>,
    pub ttl_hours: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database_path: String,
    pub env: Environment,
    pub static_dir: String,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(v) => v.trim().parse::<u16>().with_context(|| format!("invalid PORT {v:?}"))?,
            None => 8080,
        };

        let scheme = match get("SESSION_SCHEME").as_deref().map(str::trim) {
            None | Some("legacy") => SessionScheme::Legacy,
            Some("signed") => SessionScheme::Signed,
            Some(other) => bail!("unknown SESSION_SCHEME {other:?} (expected legacy or signed)"),
        };
        let secret = get("SESSION_SECRET");
        if scheme == SessionScheme::Signed && secret.is_none() {
            bail!("SESSION_SECRET is required when SESSION_SCHEME=signed");
        }
        let ttl_hours = match get("SESSION_TTL_HOURS") {
            Some(v) => v
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|h| *h > 0)
                .with_context(|| format!("invalid SESSION_TTL_HOURS {v:?}"))?,
            None => 24,
        };

        Ok(Self {
            port,
            database_path: get("DB_PATH").unwrap_or_else(|| "./data/weights.db".into()),
            env: get("ENV")
                .map(|v| Environment::parse(&v))
                .unwrap_or(Environment::Development),
            static_dir: get("STATIC_DIR").unwrap_or_else(|| "static".into()),
            session: SessionConfig {
                scheme,
                secret,
                ttl_hours,
            },
        })
    }

    pub fn is_production(&self) -> bool {
        self.env == Environment::Production
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = config_from(&[]).unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.database_path, "./data/weights.db");
        assert_eq!(cfg.env, Environment::Development);
        assert_eq!(cfg.session.scheme, SessionScheme::Legacy);
        assert_eq!(cfg.session.ttl_hours, 24);
        assert!(!cfg.is_production());
    }

    #[test]
    fn empty_values_fall_back_to_defaults() {
        let cfg = config_from(&[("PORT", ""), ("DB_PATH", "  ")]).unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.database_path, "./data/weights.db");
    }

    #[test]
    fn reads_overrides() {
        let cfg = config_from(&[
            ("PORT", "9000"),
            ("DB_PATH", "/tmp/w.db"),
            ("ENV", "production"),
            ("SESSION_SCHEME", "signed"),
            ("SESSION_SECRET", "s3cret"),
            ("SESSION_TTL_HOURS", "12"),
        ])
        .unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.database_path, "/tmp/w.db");
        assert!(cfg.is_production());
        assert_eq!(cfg.session.scheme, SessionScheme::Signed);
        assert_eq!(cfg.session.secret.as_deref(), Some("s3cret"));
        assert_eq!(cfg.session.ttl_hours, 12);
    }

    #[test]
    fn signed_scheme_requires_secret() {
        let err = config_from(&[("SESSION_SCHEME", "signed")]).unwrap_err();
        assert!(err.to_string().contains("SESSION_SECRET"));
    }

    #[test]
    fn rejects_garbage() {
        assert!(config_from(&[("PORT", "eighty")]).is_err());
        assert!(config_from(&[("SESSION_SCHEME", "cookie")]).is_err());
        assert!(config_from(&[("SESSION_TTL_HOURS", "0")]).is_err());
    }
}
