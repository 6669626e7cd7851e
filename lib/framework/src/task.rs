use std::future::Future;
use std::sync::LazyLock;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::Instrument;
use tracing::Span;
use tracing::error;
use tracing::info;
use tracing::trace;

static TASK_TRACKER: LazyLock<TaskTracker> = LazyLock::new(TaskTracker::new);
static SHUTDOWN: LazyLock<CancellationToken> = LazyLock::new(CancellationToken::new);

pub fn spawn<F>(task: F) -> JoinHandle<()>
where
    F: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    let span = Span::current();

    let task_wrapper = async move {
        let result = task.await;
        if let Err(err) = result {
            error!("task failed, error={err:?}");
        }
    };

    TASK_TRACKER.spawn(task_wrapper.instrument(span))
}

// runs action every period until shutdown, first run after one period
pub fn spawn_interval<F>(name: &'static str, period: Duration, mut action: F) -> JoinHandle<()>
where
    F: FnMut() + Send + 'static,
{
    spawn(async move {
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.tick().await;
        loop {
            tokio::select! {
                _ = SHUTDOWN.cancelled() => break,
                _ = interval.tick() => {
                    trace!(task = name, "run interval task");
                    action();
                }
            }
        }
        Ok(())
    })
}

pub async fn shutdown() {
    info!("waiting for {} task(s) to finish", TASK_TRACKER.len());
    SHUTDOWN.cancel();
    TASK_TRACKER.close();
    TASK_TRACKER.wait().await;
    info!("tasks finished");
}
