use core::fmt::Display;
use core::mem;
use core::time::Duration;
use std::sync::{Arc, RwLock};
use std::thread;

use crossbeam_channel::{bounded, Sender, TryRecvError};
use tracing::{debug, error, warn};

use crate::util::lock::LockExt;

/**
   A handle to a background task spawned with [`spawn_background_task`].

   When the handle is dropped, the task is signalled to stop and the
   calling thread blocks until the task has terminated.
*/
pub struct TaskHandle {
    shutdown_sender: Sender<()>,
    stopped: Arc<RwLock<bool>>,
    join_handle: DropJoinHandle,
}

/// The error returned by a single step of a background task.
pub enum TaskError<E> {
    /// Log the error and keep running the task.
    Ignore(E),

    /// Log the error and stop the task.
    Fatal(E),
}

/// Whether a background task should keep running after a step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Next {
    Continue,
    Abort,
}

/**
   Spawn a long-running task on a dedicated thread.

   `step_runner` is called repeatedly until it returns [`Next::Abort`] or a
   [`TaskError::Fatal`], or until the task handle is shut down. When
   `interval_pause` is set, the thread sleeps that long between steps.
*/
pub fn spawn_background_task<E: Display>(
    span: tracing::Span,
    interval_pause: Option<Duration>,
    mut step_runner: impl FnMut() -> Result<Next, TaskError<E>> + Send + 'static,
) -> TaskHandle {
    debug!(parent: &span, "spawning");

    let stopped = Arc::new(RwLock::new(false));
    let write_stopped = stopped.clone();

    let (shutdown_sender, receiver) = bounded(1);

    let join_handle = thread::spawn(move || {
        let _entered = span.enter();

        loop {
            match receiver.try_recv() {
                Ok(()) | Err(TryRecvError::Disconnected) => break,
                Err(TryRecvError::Empty) => match step_runner() {
                    Ok(Next::Continue) => {}
                    Ok(Next::Abort) => {
                        debug!("aborting");
                        break;
                    }
                    Err(TaskError::Ignore(e)) => {
                        warn!("encountered ignorable error: {}", e);
                    }
                    Err(TaskError::Fatal(e)) => {
                        error!("aborting after encountering fatal error: {}", e);
                        break;
                    }
                },
            }

            if let Some(interval) = interval_pause {
                thread::sleep(interval);
            }
        }

        *write_stopped.acquire_write() = true;
        debug!("terminated");
    });

    TaskHandle {
        shutdown_sender,
        stopped,
        join_handle: DropJoinHandle(Some(join_handle)),
    }
}

impl TaskHandle {
    /// Wait for the task to terminate.
    pub fn join(mut self) {
        if let Some(handle) = mem::take(&mut self.join_handle.0) {
            let _ = handle.join();
        }
    }

    /// Signal the task to stop without waiting for it to terminate.
    pub fn shutdown(&self) {
        let _ = self.shutdown_sender.try_send(());
    }

    /// Signal the task to stop and wait for it to terminate.
    pub fn shutdown_and_wait(self) {
        self.shutdown();
        self.join();
    }

    pub fn is_stopped(&self) -> bool {
        *self.stopped.acquire_read()
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        let _ = self.shutdown_sender.try_send(());
    }
}

struct DropJoinHandle(Option<thread::JoinHandle<()>>);

impl Drop for DropJoinHandle {
    fn drop(&mut self) {
        if let Some(handle) = mem::take(&mut self.0) {
            let _ = handle.join();
        }
    }
}
