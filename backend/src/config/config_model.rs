use crate::config::stage::Stage;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub stage: Stage,
    pub backend_server: BackendServer,
    pub database: Database,
    pub auth: AuthSecret,
    pub razorpay: Razorpay,
    pub billing: Billing,
    pub cors: Cors,
}

#[derive(Debug, Clone)]
pub struct BackendServer {
    pub port: u16,
    /// MiB
    pub body_limit: u64,
    /// Seconds
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Clone)]
pub struct AuthSecret {
    pub jwt_secret: String,
}

impl std::fmt::Debug for AuthSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSecret")
            .field("jwt_secret", &"[REDACTED]")
            .finish()
    }
}

#[derive(Clone)]
pub struct Razorpay {
    pub api_base: String,
    pub key_id: String,
    pub key_secret: String,
    pub webhook_secret: String,
}

impl std::fmt::Debug for Razorpay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Razorpay")
            .field("api_base", &self.api_base)
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct Billing {
    pub currency: String,
    pub grace_days: i64,
    pub trial_days: i64,
}

#[derive(Debug, Clone)]
pub struct Cors {
    /// Empty means any origin.
    pub allowed_origins: Vec<String>,
}
