//! Server configuration

use crate::error::{ServerError, ServerResult};

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Local development: missing billing configuration degrades to
    /// simulated checkout sessions instead of failing
    Development,
    /// Production: missing price identifiers are a hard failure
    Production,
}

impl Environment {
    /// Load from `PROPFOLIO_ENV` ("production" / "prod" selects Production)
    pub fn from_env() -> Self {
        match std::env::var("PROPFOLIO_ENV").ok().as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// Subscription plan offered at checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    Premium,
    Pro,
}

impl Plan {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "premium" => Some(Plan::Premium),
            "pro" => Some(Plan::Pro),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Premium => "premium",
            Plan::Pro => "pro",
        }
    }
}

/// Billing interval offered at checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillingPeriod {
    Month,
    Year,
}

impl BillingPeriod {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "month" => Some(BillingPeriod::Month),
            "year" => Some(BillingPeriod::Year),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BillingPeriod::Month => "month",
            BillingPeriod::Year => "year",
        }
    }
}

/// Billing provider configuration
#[derive(Debug, Clone, Default)]
pub struct BillingConfig {
    /// Provider API secret key (None = no live provider, dev fallback only)
    pub secret_key: Option<String>,
    /// Shared secret for webhook signature verification
    /// (None = accept events unverified; dev only, logged loudly)
    pub webhook_secret: Option<String>,
    pub price_premium_monthly: Option<String>,
    pub price_premium_yearly: Option<String>,
    pub price_pro_monthly: Option<String>,
    pub price_pro_yearly: Option<String>,
}

impl BillingConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        Self {
            secret_key: std::env::var("PROPFOLIO_BILLING_SECRET_KEY").ok(),
            webhook_secret: std::env::var("PROPFOLIO_WEBHOOK_SECRET").ok(),
            price_premium_monthly: std::env::var("PROPFOLIO_PRICE_PREMIUM_MONTHLY").ok(),
            price_premium_yearly: std::env::var("PROPFOLIO_PRICE_PREMIUM_YEARLY").ok(),
            price_pro_monthly: std::env::var("PROPFOLIO_PRICE_PRO_MONTHLY").ok(),
            price_pro_yearly: std::env::var("PROPFOLIO_PRICE_PRO_YEARLY").ok(),
        }
    }

    /// Resolve the provider price identifier for a plan/period pair
    pub fn price_id(&self, plan: Plan, period: BillingPeriod) -> Option<&str> {
        let price = match (plan, period) {
            (Plan::Premium, BillingPeriod::Month) => &self.price_premium_monthly,
            (Plan::Premium, BillingPeriod::Year) => &self.price_premium_yearly,
            (Plan::Pro, BillingPeriod::Month) => &self.price_pro_monthly,
            (Plan::Pro, BillingPeriod::Year) => &self.price_pro_yearly,
        };
        price.as_deref()
    }
}

/// SMTP relay configuration (second link in the notifier chain)
#[derive(Debug, Clone, Default)]
pub struct SmtpConfig {
    /// Relay host (None = SMTP notifier disabled)
    pub host: Option<String>,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
}

impl SmtpConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("PROPFOLIO_SMTP_HOST").ok(),
            port: std::env::var("PROPFOLIO_SMTP_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(587),
            username: std::env::var("PROPFOLIO_SMTP_USER").ok(),
            password: std::env::var("PROPFOLIO_SMTP_PASS").ok(),
            from: std::env::var("PROPFOLIO_SMTP_FROM")
                .unwrap_or_else(|_| "no-reply@propfolio.local".to_string()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.host.is_some()
    }
}

/// Transactional email API configuration (first link in the notifier chain)
#[derive(Debug, Clone, Default)]
pub struct EmailApiConfig {
    /// API endpoint (None = HTTP notifier disabled)
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub from: String,
}

impl EmailApiConfig {
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("PROPFOLIO_EMAIL_API_URL").ok(),
            api_key: std::env::var("PROPFOLIO_EMAIL_API_KEY").ok(),
            from: std::env::var("PROPFOLIO_EMAIL_FROM")
                .unwrap_or_else(|_| "no-reply@propfolio.local".to_string()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.url.is_some()
    }
}

/// Alert sweep configuration
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Disable the background sweep (for testing)
    pub disabled: bool,
    /// Seconds between sweeps
    pub interval_secs: u64,
    /// Probability that a stored alert "matches" on a given sweep.
    /// Placeholder for real listing-match logic.
    pub match_chance: f64,
    /// Alerts with this many notification attempts are skipped
    pub max_notifications: u32,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            disabled: false,
            interval_secs: 30,
            match_chance: 0.15,
            max_notifications: 999,
        }
    }
}

impl SweepConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            disabled: std::env::var("PROPFOLIO_SWEEP_DISABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            interval_secs: std::env::var("PROPFOLIO_SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.interval_secs),
            match_chance: std::env::var("PROPFOLIO_SWEEP_MATCH_CHANCE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.match_chance),
            max_notifications: std::env::var("PROPFOLIO_SWEEP_MAX_NOTIFICATIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_notifications),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    /// Secret for signing bearer tokens
    pub token_secret: String,
    /// Base URL of the frontend, used in checkout redirect URLs
    pub frontend_url: String,
    pub billing: BillingConfig,
    pub smtp: SmtpConfig,
    pub email_api: EmailApiConfig,
    pub sweep: SweepConfig,
}

impl Config {
    /// Load from environment variables.
    ///
    /// Production refuses to start on the default token secret.
    pub fn from_env() -> ServerResult<Self> {
        let environment = Environment::from_env();
        let token_secret = std::env::var("PROPFOLIO_TOKEN_SECRET")
            .unwrap_or_else(|_| "dev_secret_token_change_me".to_string());
        if environment.is_production() && token_secret == "dev_secret_token_change_me" {
            return Err(ServerError::Config(
                "PROPFOLIO_TOKEN_SECRET must be set in production".into(),
            ));
        }

        Ok(Self {
            environment,
            token_secret,
            frontend_url: std::env::var("PROPFOLIO_FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            billing: BillingConfig::from_env(),
            smtp: SmtpConfig::from_env(),
            email_api: EmailApiConfig::from_env(),
            sweep: SweepConfig::from_env(),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            token_secret: "dev_secret_token_change_me".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            billing: BillingConfig::default(),
            smtp: SmtpConfig::default(),
            email_api: EmailApiConfig::default(),
            sweep: SweepConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    // ========== Plan / BillingPeriod Tests ==========

    #[test]
    fn test_plan_parse() {
        assert_eq!(Plan::parse("premium"), Some(Plan::Premium));
        assert_eq!(Plan::parse("pro"), Some(Plan::Pro));
        assert_eq!(Plan::parse("basic"), None);
        assert_eq!(Plan::parse("Premium"), None);
    }

    #[test]
    fn test_billing_period_parse() {
        assert_eq!(BillingPeriod::parse("month"), Some(BillingPeriod::Month));
        assert_eq!(BillingPeriod::parse("year"), Some(BillingPeriod::Year));
        assert_eq!(BillingPeriod::parse("week"), None);
    }

    #[test]
    fn test_plan_round_trip() {
        for plan in [Plan::Premium, Plan::Pro] {
            assert_eq!(Plan::parse(plan.as_str()), Some(plan));
        }
        for period in [BillingPeriod::Month, BillingPeriod::Year] {
            assert_eq!(BillingPeriod::parse(period.as_str()), Some(period));
        }
    }

    // ========== BillingConfig Tests ==========

    #[test]
    fn test_price_id_lookup() {
        let config = BillingConfig {
            price_premium_monthly: Some("price_pm".into()),
            price_pro_yearly: Some("price_py".into()),
            ..Default::default()
        };

        assert_eq!(
            config.price_id(Plan::Premium, BillingPeriod::Month),
            Some("price_pm")
        );
        assert_eq!(
            config.price_id(Plan::Pro, BillingPeriod::Year),
            Some("price_py")
        );
        assert_eq!(config.price_id(Plan::Pro, BillingPeriod::Month), None);
        assert_eq!(config.price_id(Plan::Premium, BillingPeriod::Year), None);
    }

    #[test]
    #[serial]
    fn test_billing_config_from_env() {
        std::env::set_var("PROPFOLIO_BILLING_SECRET_KEY", "sk_test_123");
        std::env::set_var("PROPFOLIO_WEBHOOK_SECRET", "whsec_abc");
        std::env::set_var("PROPFOLIO_PRICE_PREMIUM_MONTHLY", "price_1");

        let config = BillingConfig::from_env();
        assert_eq!(config.secret_key.as_deref(), Some("sk_test_123"));
        assert_eq!(config.webhook_secret.as_deref(), Some("whsec_abc"));
        assert_eq!(config.price_premium_monthly.as_deref(), Some("price_1"));

        std::env::remove_var("PROPFOLIO_BILLING_SECRET_KEY");
        std::env::remove_var("PROPFOLIO_WEBHOOK_SECRET");
        std::env::remove_var("PROPFOLIO_PRICE_PREMIUM_MONTHLY");
    }

    // ========== Environment Tests ==========

    #[test]
    #[serial]
    fn test_environment_from_env() {
        std::env::remove_var("PROPFOLIO_ENV");
        assert_eq!(Environment::from_env(), Environment::Development);

        std::env::set_var("PROPFOLIO_ENV", "production");
        assert_eq!(Environment::from_env(), Environment::Production);
        assert!(Environment::from_env().is_production());

        std::env::set_var("PROPFOLIO_ENV", "staging");
        assert_eq!(Environment::from_env(), Environment::Development);

        std::env::remove_var("PROPFOLIO_ENV");
    }

    // ========== SweepConfig Tests ==========

    #[test]
    fn test_sweep_config_default() {
        let config = SweepConfig::default();
        assert!(!config.disabled);
        assert_eq!(config.interval_secs, 30);
        assert!((config.match_chance - 0.15).abs() < f64::EPSILON);
        assert_eq!(config.max_notifications, 999);
    }

    #[test]
    #[serial]
    fn test_sweep_config_from_env() {
        std::env::set_var("PROPFOLIO_SWEEP_INTERVAL_SECS", "5");
        std::env::set_var("PROPFOLIO_SWEEP_MATCH_CHANCE", "0.5");
        std::env::set_var("PROPFOLIO_SWEEP_DISABLED", "1");

        let config = SweepConfig::from_env();
        assert_eq!(config.interval_secs, 5);
        assert!((config.match_chance - 0.5).abs() < f64::EPSILON);
        assert!(config.disabled);

        std::env::remove_var("PROPFOLIO_SWEEP_INTERVAL_SECS");
        std::env::remove_var("PROPFOLIO_SWEEP_MATCH_CHANCE");
        std::env::remove_var("PROPFOLIO_SWEEP_DISABLED");
    }

    #[test]
    #[serial]
    fn test_sweep_config_invalid_values_fall_back() {
        std::env::set_var("PROPFOLIO_SWEEP_INTERVAL_SECS", "not-a-number");

        let config = SweepConfig::from_env();
        assert_eq!(config.interval_secs, 30);

        std::env::remove_var("PROPFOLIO_SWEEP_INTERVAL_SECS");
    }

    // ========== SmtpConfig Tests ==========

    #[test]
    #[serial]
    fn test_smtp_config_disabled_without_host() {
        std::env::remove_var("PROPFOLIO_SMTP_HOST");
        let config = SmtpConfig::from_env();
        assert!(!config.is_enabled());
        assert_eq!(config.port, 587);
    }

    #[test]
    #[serial]
    fn test_smtp_config_from_env() {
        std::env::set_var("PROPFOLIO_SMTP_HOST", "smtp.example.com");
        std::env::set_var("PROPFOLIO_SMTP_PORT", "2525");
        std::env::set_var("PROPFOLIO_SMTP_FROM", "alerts@example.com");

        let config = SmtpConfig::from_env();
        assert!(config.is_enabled());
        assert_eq!(config.host.as_deref(), Some("smtp.example.com"));
        assert_eq!(config.port, 2525);
        assert_eq!(config.from, "alerts@example.com");

        std::env::remove_var("PROPFOLIO_SMTP_HOST");
        std::env::remove_var("PROPFOLIO_SMTP_PORT");
        std::env::remove_var("PROPFOLIO_SMTP_FROM");
    }

    // ========== Config Tests ==========

    #[test]
    #[serial]
    fn test_config_default_secret_rejected_in_production() {
        std::env::set_var("PROPFOLIO_ENV", "production");
        std::env::remove_var("PROPFOLIO_TOKEN_SECRET");

        let result = Config::from_env();
        assert!(matches!(result, Err(ServerError::Config(_))));

        std::env::set_var("PROPFOLIO_TOKEN_SECRET", "real-secret");
        let result = Config::from_env();
        assert!(result.is_ok());

        std::env::remove_var("PROPFOLIO_ENV");
        std::env::remove_var("PROPFOLIO_TOKEN_SECRET");
    }

    #[test]
    #[serial]
    fn test_config_dev_defaults() {
        std::env::remove_var("PROPFOLIO_ENV");
        std::env::remove_var("PROPFOLIO_TOKEN_SECRET");
        std::env::remove_var("PROPFOLIO_FRONTEND_URL");

        let config = Config::from_env().unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.token_secret, "dev_secret_token_change_me");
        assert_eq!(config.frontend_url, "http://localhost:5173");
    }
}
