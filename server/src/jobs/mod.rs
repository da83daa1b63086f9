use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::AppState;

pub mod bug_notifications;
pub mod worker;

#[derive(Debug, Error)]
pub enum EnqueueError {
    #[error("SqlxError: {0}")]
    SqlxError(#[from] sqlx::Error),
    #[error("SerdeJsonError: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

#[async_trait::async_trait]
pub(crate) trait Job:
    Serialize + DeserializeOwned + Send + Sync + std::fmt::Debug + Clone + 'static
{
    const NAME: &'static str;

    async fn run(&self, app_state: AppState) -> color_eyre::Result<()>;

    #[instrument(name = "jobs.run_from_value", skip(app_state), fields(job.name = Self::NAME), err)]
    async fn run_from_value(
        value: serde_json::Value,
        app_state: AppState,
    ) -> color_eyre::Result<()> {
        let job: Self = serde_json::from_value(value)?;

        job.run(app_state).await
    }

    #[instrument(name = "jobs.enqueue", skip(app_state), fields(job.name = Self::NAME), err)]
    async fn enqueue(self, app_state: &AppState, context: String) -> Result<(), EnqueueError> {
        sqlx::query(
            "
        INSERT INTO jobs (job_id, name, payload, priority, run_at, created_at, context)
        VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(uuid::Uuid::new_v4())
        .bind(Self::NAME)
        .bind(serde_json::to_value(self)?)
        .bind(0)
        .bind(chrono::Utc::now())
        .bind(chrono::Utc::now())
        .bind(context)
        .execute(app_state.db())
        .await?;

        Ok(())
    }
}

#[async_trait::async_trait]
pub(crate) trait JobRegistry: Send + Sync + 'static {
    async fn run_job(&self, job: &worker::JobFromDB, app_state: AppState) -> color_eyre::Result<()>;
}

macro_rules! impl_job_registry {
    ($($job_type:ty),*) => {
        pub(crate) struct Jobs;

        #[async_trait::async_trait]
        impl $crate::jobs::JobRegistry for Jobs {
            async fn run_job(
                &self,
                job: &$crate::jobs::worker::JobFromDB,
                app_state: $crate::AppState,
            ) -> color_eyre::Result<()> {
                use $crate::jobs::Job as _;

                let payload = job.payload.clone();

                match job.name.as_str() {
                    $(
                        <$job_type>::NAME => <$job_type>::run_from_value(payload, app_state).await,
                    )*
                    _ => Err(color_eyre::eyre::eyre!("Unknown job type: {}", job.name)),
                }
            }
        }
    };
}

impl_job_registry!(
    bug_notifications::NotifyBugReported,
    bug_notifications::NotifyBugUpdated
);
