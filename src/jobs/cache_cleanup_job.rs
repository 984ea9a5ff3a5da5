use tracing::info;

use crate::errors::AppError;
use crate::services::job_scheduler_service::{JobContext, JobResult};

pub async fn cleanup_failure_cache(ctx: JobContext) -> Result<JobResult, AppError> {
    let removed = ctx.state.failure_cache.cleanup_expired();
    info!(
        "🗑️ Removed {} expired failure cache entries ({} remain)",
        removed,
        ctx.state.failure_cache.len()
    );

    Ok(JobResult {
        items_processed: removed,
        items_failed: 0,
    })
}
