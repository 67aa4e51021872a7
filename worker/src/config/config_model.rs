#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub worker_server: WorkerServer,
    pub database: Database,
    pub sweep: Sweep,
}

#[derive(Debug, Clone)]
pub struct WorkerServer {
    pub port: u16,
    /// Seconds
    pub timeout: u64,
    /// MiB
    pub body_limit: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Clone)]
pub struct Sweep {
    pub interval_secs: u64,
    pub grace_days: i64,
    /// Unset disables the HTTP trigger.
    pub internal_token: Option<String>,
}

impl std::fmt::Debug for Sweep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sweep")
            .field("interval_secs", &self.interval_secs)
            .field("grace_days", &self.grace_days)
            .field(
                "internal_token",
                &self.internal_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}
