use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development except
/// the secrets (JWT, payment providers), which must be set. The config is
/// constructed once in `main` and injected through `AppState`; business
/// logic never reads the environment directly.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Payment provider configuration (billing + credit orders).
    pub payments: PaymentConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            payments: PaymentConfig::from_env(),
        }
    }
}

/// Payment provider configuration.
///
/// Two providers are involved: a recurring-billing provider behind
/// `billing_*` (subscriptions, checkout sessions, customer portal) and an
/// instant-payment provider behind `orders_*` (credit top-up orders with QR
/// codes). Both feed state back through signature-verified webhooks.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    /// Billing provider API base URL.
    pub billing_base_url: String,
    /// Billing provider secret API key.
    pub billing_secret_key: String,
    /// Billing webhook signing secret.
    pub billing_webhook_secret: String,
    /// Display name of the subscription plan on checkout pages.
    pub plan_name: String,
    /// Monthly plan price in the provider's minor currency unit.
    pub plan_amount: i64,
    /// URL the provider redirects to after checkout or portal sessions.
    pub account_url: String,
    /// Orders provider API base URL.
    pub orders_base_url: String,
    /// Orders provider bearer token.
    pub orders_token: String,
    /// Orders webhook signing secret.
    pub orders_webhook_secret: String,
    /// Webhook callback URL registered with the orders provider.
    pub orders_notification_url: Option<String>,
}

impl PaymentConfig {
    /// Load payment configuration from environment variables.
    ///
    /// Secrets have no defaults; `from_env` panics when they are missing so
    /// that misconfiguration fails at startup, not at first use.
    pub fn from_env() -> Self {
        Self {
            billing_base_url: std::env::var("BILLING_API_URL")
                .unwrap_or_else(|_| "https://api.stripe.com/v1".into()),
            billing_secret_key: std::env::var("BILLING_SECRET_KEY")
                .expect("BILLING_SECRET_KEY must be set"),
            billing_webhook_secret: std::env::var("BILLING_WEBHOOK_SECRET")
                .expect("BILLING_WEBHOOK_SECRET must be set"),
            plan_name: std::env::var("BILLING_PLAN_NAME")
                .unwrap_or_else(|_| "Servia Professional".into()),
            plan_amount: std::env::var("BILLING_PLAN_AMOUNT")
                .unwrap_or_else(|_| "100".into())
                .parse()
                .expect("BILLING_PLAN_AMOUNT must be a valid i64"),
            account_url: std::env::var("BILLING_ACCOUNT_URL")
                .unwrap_or_else(|_| "http://localhost:5173/professional/account".into()),
            orders_base_url: std::env::var("ORDERS_API_URL")
                .unwrap_or_else(|_| "https://api.pagseguro.com".into()),
            orders_token: std::env::var("ORDERS_TOKEN").expect("ORDERS_TOKEN must be set"),
            orders_webhook_secret: std::env::var("ORDERS_WEBHOOK_SECRET")
                .expect("ORDERS_WEBHOOK_SECRET must be set"),
            orders_notification_url: std::env::var("ORDERS_NOTIFICATION_URL").ok(),
        }
    }
}
