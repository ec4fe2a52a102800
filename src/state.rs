use std::sync::Arc;

use crate::config::{AppConfig, HttpConfig, JwtConfig, MailBackend, MailConfig, StoreBackend};
use crate::notify::{LogNotifier, Notifier, SesNotifier};
use crate::storage::{InMemoryStorage, Storage, StorageClient};
use crate::store::{MemoryStore, PgStore, Store};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
    pub storage: Arc<dyn StorageClient>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store: Arc<dyn Store> = match config.store_backend {
            StoreBackend::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is not set"))?;
                Arc::new(PgStore::connect(url).await?)
            }
            StoreBackend::Memory => {
                tracing::warn!("using the in-memory store; data is lost on restart");
                Arc::new(MemoryStore::new())
            }
        };

        let storage: Arc<dyn StorageClient> = match &config.s3 {
            Some(s3) => Arc::new(Storage::new(s3).await?),
            None => {
                tracing::warn!("S3_ENDPOINT not set; resumes are kept in memory");
                Arc::new(InMemoryStorage::new())
            }
        };

        let notifier: Arc<dyn Notifier> = match config.mail.backend {
            MailBackend::Ses => Arc::new(SesNotifier::from_env(&config.mail.from).await),
            MailBackend::Log => Arc::new(LogNotifier),
        };

        Ok(Self {
            store,
            config,
            storage,
            notifier,
        })
    }

    pub fn from_parts(
        store: Arc<dyn Store>,
        config: Arc<AppConfig>,
        storage: Arc<dyn StorageClient>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            config,
            storage,
            notifier,
        }
    }

    /// Everything in memory, mail to the log. For tests and local demos.
    pub fn in_memory(jwt: JwtConfig) -> Self {
        let config = Arc::new(AppConfig {
            http: HttpConfig::default(),
            store_backend: StoreBackend::Memory,
            database_url: None,
            jwt,
            s3: None,
            mail: MailConfig {
                backend: MailBackend::Log,
                from: "test@interviewer.local".into(),
            },
            bootstrap_admin: None,
        });
        Self::from_parts(
            Arc::new(MemoryStore::new()),
            config,
            Arc::new(InMemoryStorage::new()),
            Arc::new(LogNotifier),
        )
    }
}
