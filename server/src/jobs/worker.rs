use std::{future::Future, time::Duration};

use thiserror::Error;
use tokio::sync::watch;
use tracing::Span;

use crate::AppState;

use super::JobRegistry;

/// A job that has failed this many times is dropped instead of retried.
pub(crate) const MAX_ATTEMPTS: i32 = 5;
const RETRY_DELAY_SECONDS: i32 = 60;
const IDLE_SLEEP: Duration = Duration::from_secs(5);

pub(super) type RunJobResult = Result<RunJobSuccess, JobError>;

#[derive(Debug)]
pub(super) struct RunJobSuccess(JobFromDB);

#[derive(Debug, sqlx::FromRow)]
pub struct JobFromDB {
    pub job_id: uuid::Uuid,
    pub name: String,
    pub payload: serde_json::Value,
    pub priority: i32,
    pub run_at: chrono::DateTime<chrono::Utc>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub error_count: i32,
    pub context: String,
}

#[derive(Debug, Error)]
#[error("JobError(id:${}) ${1}", self.0.job_id)]
pub(crate) struct JobError(JobFromDB, color_eyre::Report);

struct Worker<R: JobRegistry> {
    id: uuid::Uuid,
    state: AppState,
    registry: R,
}

impl<R: JobRegistry> Worker<R> {
    fn new(state: AppState, registry: R) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            state,
            registry,
        }
    }

    #[tracing::instrument(
        name = "worker.run_job",
        skip(self, job),
        fields(
            job.id = %job.job_id,
            job.name = job.name,
            job.priority = job.priority,
            job.run_at = %job.run_at,
            job.created_at = %job.created_at,
            job.error_count = job.error_count,
            job.context = job.context,
            worker.id = %self.id,
        )
        err,
    )]
    async fn run_job(&self, job: &JobFromDB) -> color_eyre::Result<()> {
        self.registry.run_job(job, self.state.clone()).await
    }

    pub(crate) async fn run_next_job(&self, job: JobFromDB) -> color_eyre::Result<RunJobResult> {
        let job_result = self.run_job(&job).await;

        if let Err(e) = job_result {
            if job.error_count + 1 >= MAX_ATTEMPTS {
                sqlx::query(
                    "
                    DELETE FROM jobs
                    WHERE job_id = $1 AND locked_by = $2
                    ",
                )
                .bind(job.job_id)
                .bind(self.id.to_string())
                .execute(self.state.db())
                .await?;

                tracing::error!(
                    worker.id =% self.id,
                    job_id =% job.job_id,
                    job.name = %job.name,
                    attempts = job.error_count + 1,
                    "Job failed too many times, dropping it"
                );
            } else {
                sqlx::query(
                    "
                    UPDATE jobs
                    SET locked_by = NULL,
                        locked_at = NULL,
                        error_count = error_count + 1,
                        run_at = now() + make_interval(secs => $3)
                    WHERE job_id = $1 AND locked_by = $2
                    ",
                )
                .bind(job.job_id)
                .bind(self.id.to_string())
                .bind(f64::from(RETRY_DELAY_SECONDS))
                .execute(self.state.db())
                .await?;
            }

            return Ok(Err(JobError(job, e)));
        }

        sqlx::query(
            "
                DELETE FROM jobs
                WHERE job_id = $1 AND locked_by = $2
                ",
        )
        .bind(job.job_id)
        .bind(self.id.to_string())
        .execute(self.state.db())
        .await?;

        Ok(Ok(RunJobSuccess(job)))
    }

    #[tracing::instrument(
        name = "worker.fetch_next_job",
        skip(self),
        fields(
            worker.id = %self.id,
            job.id,
            job.name,
        ),
        err,
    )]
    async fn fetch_next_job(&self) -> color_eyre::Result<Option<JobFromDB>> {
        let job = sqlx::query_as::<_, JobFromDB>(
            "
            UPDATE jobs
            SET LOCKED_BY = $1, LOCKED_AT = NOW()
            WHERE job_id = (
                SELECT job_id
                FROM jobs
                WHERE run_at <= NOW() AND locked_by IS NULL
                ORDER BY priority DESC, created_at ASC
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING job_id, name, payload, priority, run_at, created_at, error_count, context
            ",
        )
        .bind(self.id.to_string())
        .fetch_optional(self.state.db())
        .await?;

        if let Some(job) = &job {
            let span = Span::current();
            span.record("job.id", job.job_id.to_string());
            span.record("job.name", &job.name);
        }

        Ok(job)
    }

    /// Runs at most one job. Returns `false` when the queue had nothing runnable.
    #[tracing::instrument(
        name = "worker.tick",
        skip(self),
        fields(
            worker.id = %self.id,
        ),
    )]
    async fn tick(&self) -> color_eyre::Result<bool> {
        let Some(job) = self.fetch_next_job().await? else {
            return Ok(false);
        };

        let result = self.run_next_job(job).await?;

        match result {
            Ok(RunJobSuccess(job)) => {
                tracing::info!(worker.id =% self.id, job_id =% job.job_id, "Job Ran");
            }
            Err(job_error) => {
                tracing::error!(
                    worker.id =% self.id,
                    job_id =% job_error.0.job_id,
                    error_msg =% job_error.1,
                    "Job Errored"
                );
            }
        }

        Ok(true)
    }
}

/// Polls the jobs table until `shutdown` flips to `true`. A job in flight is finished first.
pub(crate) async fn job_worker(
    app_state: AppState,
    registry: impl JobRegistry,
    shutdown: watch::Receiver<bool>,
) -> color_eyre::Result<()> {
    let worker = Worker::new(app_state, registry);

    poll_jobs(|| worker.tick(), IDLE_SLEEP, shutdown).await;

    tracing::info!(worker.id =% worker.id, "Job worker shutting down");

    Ok(())
}

/// Calls `tick` until shutdown. Sleeps when the queue is empty or a tick fails, so a
/// database outage only pauses the worker.
async fn poll_jobs<F, Fut>(mut tick: F, idle_sleep: Duration, mut shutdown: watch::Receiver<bool>)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = color_eyre::Result<bool>>,
{
    while !*shutdown.borrow() {
        match tick().await {
            Ok(true) => continue,
            Ok(false) => {
                tracing::debug!(duration = ?idle_sleep, "No Job to Run, sleeping for requested duration");
            }
            Err(e) => {
                tracing::error!(error = ?e, duration = ?idle_sleep, "Job worker tick failed, retrying after sleep");
            }
        }

        tokio::select! {
            () = tokio::time::sleep(idle_sleep) => {}
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
}
