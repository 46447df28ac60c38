use anyhow::Context;
use serde::Deserialize;
use time::UtcOffset;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Generative content API (Gemini REST).
#[derive(Debug, Clone, Deserialize)]
pub struct GenAiConfig {
    pub api_key: String,
    pub model: String,
    pub vision_model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

/// Mobile-money gateway (Flutterwave).
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    pub api_key: String,
    pub base_url: String,
    pub currency: String,
    pub country: String,
    pub redirect_url: String,
}

/// Push notifications. Without a server key, sends are skipped.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    pub server_key: Option<String>,
    pub endpoint: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlanConfig {
    pub total_weeks: u32,
    pub stages: u32,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub genai: GenAiConfig,
    pub payments: PaymentConfig,
    pub notifications: NotificationConfig,
    pub plan: PlanConfig,
    /// Local offset used to date landings and similar "today" keys.
    pub utc_offset: UtcOffset,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET")?,
            issuer: env_or("JWT_ISSUER", "iki"),
            audience: env_or("JWT_AUDIENCE", "iki-users"),
            ttl_minutes: env_parse("JWT_TTL_MINUTES", 60),
            refresh_ttl_minutes: env_parse("JWT_REFRESH_TTL_MINUTES", 60 * 24 * 14),
        };
        let genai = GenAiConfig {
            api_key: std::env::var("GOOGLE_API_KEY").context("GOOGLE_API_KEY")?,
            model: env_or("GENAI_MODEL", "gemini-2.5-pro-exp-03-25"),
            vision_model: env_or("GENAI_VISION_MODEL", "gemini-2.0-flash"),
            base_url: env_or("GENAI_BASE_URL", "https://generativelanguage.googleapis.com"),
            timeout_secs: env_parse("GENAI_TIMEOUT_SECS", 120),
        };
        let payments = PaymentConfig {
            api_key: std::env::var("FLUTTERWAVE_API_KEY").context("FLUTTERWAVE_API_KEY")?,
            base_url: env_or("FLUTTERWAVE_BASE_URL", "https://api.flutterwave.com"),
            currency: env_or("PAYMENT_CURRENCY", "KES"),
            country: env_or("PAYMENT_COUNTRY", "KE"),
            redirect_url: env_or("PAYMENT_REDIRECT_URL", "https://ikiwellnessdev.co.ke/callback"),
        };
        let notifications = NotificationConfig {
            server_key: std::env::var("FCM_SERVER_KEY").ok().filter(|k| !k.is_empty()),
            endpoint: env_or("FCM_ENDPOINT", "https://fcm.googleapis.com/fcm/send"),
        };
        let plan = PlanConfig {
            total_weeks: env_parse("PLAN_TOTAL_WEEKS", 12),
            stages: env_parse("PLAN_STAGES", 3),
        };
        let utc_offset = UtcOffset::from_hms(env_parse("APP_UTC_OFFSET_HOURS", 3i8), 0, 0)
            .context("APP_UTC_OFFSET_HOURS out of range")?;

        Ok(Self {
            database_url,
            jwt,
            genai,
            payments,
            notifications,
            plan,
            utc_offset,
        })
    }
}
