//! Policy configuration for the credential subsystem
//!
//! All components receive an immutable [`AuthPolicy`] snapshot at
//! construction time. The snapshot is built once at startup, either from
//! defaults or from environment variables; nothing mutates it afterwards.

use serde::{Deserialize, Serialize};

/// Token signing and expiry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenPolicy {
    /// Secret key for HMAC signing; rotating it invalidates all
    /// outstanding tokens (no key versioning)
    pub secret: String,

    /// Issuer claim embedded in every token
    pub issuer: String,

    /// Plain login token lifetime in seconds
    pub access_token_expiry: i64,

    /// "Remember me" login token lifetime in seconds
    pub refresh_token_expiry: i64,

    /// Token lifetime for freshly registered accounts in seconds
    pub register_token_expiry: i64,
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            secret: String::from("change-this-secret-in-production"),
            issuer: String::from("accountkit"),
            access_token_expiry: 604_800,    // 7 days
            refresh_token_expiry: 2_592_000, // 30 days
            register_token_expiry: 604_800,  // 7 days
        }
    }
}

impl TokenPolicy {
    /// Create a new token policy with an explicit secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Set the plain login token expiry in days
    pub fn with_access_expiry_days(mut self, days: i64) -> Self {
        self.access_token_expiry = days * 86_400;
        self
    }

    /// Set the "remember me" token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86_400;
        self
    }

    /// Check if the policy still carries the default secret
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == "change-this-secret-in-production"
    }
}

/// SMS verification code configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmsCodePolicy {
    /// Number of decimal digits in a code
    pub code_length: usize,

    /// Code time-to-live in seconds
    pub expire_seconds: u64,

    /// Minimum seconds between two sends to the same mobile
    pub resend_cooldown_seconds: u64,

    /// Maximum sends per mobile per rolling 24h window
    pub daily_limit: i64,
}

impl Default for SmsCodePolicy {
    fn default() -> Self {
        Self {
            code_length: 6,
            expire_seconds: 300,
            resend_cooldown_seconds: 60,
            daily_limit: 10,
        }
    }
}

/// Login failure and lockout configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginPolicy {
    /// Consecutive failures that trigger an account lock
    pub max_fail_attempts: u32,

    /// How long an account stays locked, in minutes
    pub lock_duration_minutes: u64,

    /// Rolling window for the failure counter, in minutes
    pub fail_window_minutes: u64,
}

impl Default for LoginPolicy {
    fn default() -> Self {
        Self {
            max_fail_attempts: 5,
            lock_duration_minutes: 30,
            fail_window_minutes: 60,
        }
    }
}

/// Format rules for mobiles, usernames and passwords
///
/// Length limits count characters, not bytes, since usernames and
/// passwords may contain CJK characters.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CredentialRules {
    pub mobile_pattern: String,
    pub username_min_length: usize,
    pub username_max_length: usize,
    pub username_pattern: String,
    pub password_min_length: usize,
    pub password_max_length: usize,
    pub password_pattern: String,
}

impl Default for CredentialRules {
    fn default() -> Self {
        Self {
            mobile_pattern: String::from(r"^1[3-9]\d{9}$"),
            username_min_length: 2,
            username_max_length: 20,
            username_pattern: String::from(r"^[a-zA-Z0-9_\u{4e00}-\u{9fa5}]+$"),
            password_min_length: 6,
            password_max_length: 20,
            password_pattern: String::from(
                r#"^[a-zA-Z0-9\u{4e00}-\u{9fa5}!@#$%^&*()_+\-=\[\]{};':"\\|,.<>/?]+$"#,
            ),
        }
    }
}

/// Complete policy snapshot for the credential subsystem
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthPolicy {
    pub token: TokenPolicy,
    pub sms: SmsCodePolicy,
    pub login: LoginPolicy,
    pub rules: CredentialRules,
}

impl AuthPolicy {
    /// Build a policy from environment variables, falling back to
    /// defaults for anything unset or unparsable
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            token: TokenPolicy {
                secret: env_string("AUTH_TOKEN_SECRET", defaults.token.secret),
                issuer: env_string("AUTH_TOKEN_ISSUER", defaults.token.issuer),
                access_token_expiry: env_parse(
                    "AUTH_ACCESS_TOKEN_EXPIRY",
                    defaults.token.access_token_expiry,
                ),
                refresh_token_expiry: env_parse(
                    "AUTH_REFRESH_TOKEN_EXPIRY",
                    defaults.token.refresh_token_expiry,
                ),
                register_token_expiry: env_parse(
                    "AUTH_REGISTER_TOKEN_EXPIRY",
                    defaults.token.register_token_expiry,
                ),
            },
            sms: SmsCodePolicy {
                code_length: env_parse("SMS_CODE_LENGTH", defaults.sms.code_length),
                expire_seconds: env_parse("SMS_CODE_EXPIRE_SECONDS", defaults.sms.expire_seconds),
                resend_cooldown_seconds: env_parse(
                    "SMS_RESEND_COOLDOWN_SECONDS",
                    defaults.sms.resend_cooldown_seconds,
                ),
                daily_limit: env_parse("SMS_DAILY_LIMIT", defaults.sms.daily_limit),
            },
            login: LoginPolicy {
                max_fail_attempts: env_parse(
                    "LOGIN_MAX_FAIL_ATTEMPTS",
                    defaults.login.max_fail_attempts,
                ),
                lock_duration_minutes: env_parse(
                    "LOGIN_LOCK_DURATION_MINUTES",
                    defaults.login.lock_duration_minutes,
                ),
                fail_window_minutes: env_parse(
                    "LOGIN_FAIL_WINDOW_MINUTES",
                    defaults.login.fail_window_minutes,
                ),
            },
            rules: defaults.rules,
        }
    }
}

fn env_string(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
