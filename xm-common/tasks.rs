use std::time::Duration;
use tokio::task::JoinHandle;

const GRACEFUL_STOP_MILLIS: u64 = 500;
const ABORT_STOP_MILLIS: u64 = 500;

/// Waits for a cancelled task to end, aborting it if it does not finish in time.\
/// Returns `true` if the task has finished.
pub async fn wait_for_task<T>(task: Option<JoinHandle<T>>, task_name: &str) -> bool {
    let Some(mut task) = task else {
        return true;
    };

    if tokio::time::timeout(Duration::from_millis(GRACEFUL_STOP_MILLIS), &mut task)
        .await
        .is_ok()
    {
        return true;
    }

    tracing::warn!("Task {task_name} did not stop in {GRACEFUL_STOP_MILLIS} milliseconds, aborting it");
    task.abort();

    if tokio::time::timeout(Duration::from_millis(ABORT_STOP_MILLIS), task).await.is_ok() {
        true
    } else {
        tracing::error!("Failed to abort {task_name} task in {ABORT_STOP_MILLIS} milliseconds for an unknown reason.");
        false
    }
}
