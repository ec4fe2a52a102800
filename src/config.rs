use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailBackend {
    Log,
    Ses,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub backend: MailBackend,
    pub from: String,
}

/// Credentials of the admin account created at startup when missing.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl HttpConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    /// `None` keeps resumes in process memory.
    pub s3: Option<S3Config>,
    pub mail: MailConfig,
    pub bootstrap_admin: Option<AdminSeed>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = HttpConfig::default();
        let http = HttpConfig {
            host: var("APP_HOST").unwrap_or(defaults.host),
            port: match var("APP_PORT") {
                Some(port) => port
                    .parse()
                    .map_err(|_| anyhow::anyhow!("APP_PORT must be a port number, got {port:?}"))?,
                None => defaults.port,
            },
        };

        let store_backend = match var("STORE_BACKEND").as_deref() {
            None | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(other) => anyhow::bail!("unknown STORE_BACKEND {other:?}"),
        };
        let database_url = var("DATABASE_URL");
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL is required for the postgres store");
        }

        let jwt = JwtConfig {
            secret: var("JWT_SECRET")
                .ok_or_else(|| anyhow::anyhow!("JWT_SECRET is required"))?,
            issuer: var("JWT_ISSUER").unwrap_or_else(|| "interviewer".into()),
            audience: var("JWT_AUDIENCE").unwrap_or_else(|| "interviewer-users".into()),
            ttl_minutes: var("JWT_TTL_MINUTES")
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            refresh_ttl_minutes: var("JWT_REFRESH_TTL_MINUTES")
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };

        let s3 = match var("S3_ENDPOINT") {
            Some(endpoint) => Some(S3Config {
                endpoint,
                bucket: var("S3_BUCKET").unwrap_or_else(|| "resumes".into()),
                access_key: var("S3_ACCESS_KEY")
                    .ok_or_else(|| anyhow::anyhow!("S3_ACCESS_KEY is required with S3_ENDPOINT"))?,
                secret_key: var("S3_SECRET_KEY")
                    .ok_or_else(|| anyhow::anyhow!("S3_SECRET_KEY is required with S3_ENDPOINT"))?,
                region: var("S3_REGION").unwrap_or_else(|| "us-east-1".into()),
            }),
            None => None,
        };

        let mail = MailConfig {
            backend: match var("MAIL_BACKEND").as_deref() {
                None | Some("log") => MailBackend::Log,
                Some("ses") => MailBackend::Ses,
                Some(other) => anyhow::bail!("unknown MAIL_BACKEND {other:?}"),
            },
            from: var("MAIL_FROM").unwrap_or_else(|| "no-reply@interviewer.local".into()),
        };

        let bootstrap_admin = match (var("BOOTSTRAP_ADMIN_EMAIL"), var("BOOTSTRAP_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminSeed { email, password }),
            _ => None,
        };

        Ok(Self {
            http,
            store_backend,
            database_url,
            jwt,
            s3,
            mail,
            bootstrap_admin,
        })
    }
}
