//! Runtime abstraction layer for async operations
//!
//! Debounce timers and POST fetches are spawned through this module so the
//! layer code stays independent of the executor. Tokio is used when the
//! `tokio-runtime` feature is enabled; otherwise each task gets a dedicated
//! thread driven by `futures::executor`.

use crate::prelude::{Future, Pin};

/// A trait for spawning async tasks (object-safe version)
pub trait AsyncSpawner: Send + Sync + 'static {
    /// Spawn a future and return a handle to it
    fn spawn_boxed(
        &self,
        future: Pin<Box<dyn Future<Output = ()> + Send + 'static>>,
    ) -> Box<dyn AsyncHandle>;
}

/// Handle to a spawned async task
pub trait AsyncHandle: Send + Sync {
    /// Check if the task is finished
    fn is_finished(&self) -> bool;

    /// Cancel the task. A task that already completed is unaffected.
    fn cancel(&self);
}

/// Spawn a future on the global runtime
pub fn spawn<F>(future: F) -> Box<dyn AsyncHandle>
where
    F: Future<Output = ()> + Send + 'static,
{
    log::trace!("runtime::spawn");
    runtime().spawn_boxed(Box::pin(future))
}

/// Default spawner implementations
pub mod spawners {
    use super::*;

    #[cfg(feature = "tokio-runtime")]
    pub mod tokio_impl {
        use super::*;
        use ::tokio::task::JoinHandle;

        /// Tokio-based async spawner
        pub struct TokioSpawner;

        impl AsyncSpawner for TokioSpawner {
            fn spawn_boxed(
                &self,
                future: Pin<Box<dyn Future<Output = ()> + Send + 'static>>,
            ) -> Box<dyn AsyncHandle> {
                let handle = ::tokio::spawn(future);
                Box::new(TokioHandle(handle))
            }
        }

        struct TokioHandle(JoinHandle<()>);

        impl AsyncHandle for TokioHandle {
            fn is_finished(&self) -> bool {
                self.0.is_finished()
            }

            fn cancel(&self) {
                self.0.abort();
            }
        }
    }

    pub mod thread_impl {
        use super::*;
        use futures::future::{AbortHandle, Abortable};
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;

        /// Runs every task to completion on its own OS thread
        pub struct ThreadSpawner;

        impl AsyncSpawner for ThreadSpawner {
            fn spawn_boxed(
                &self,
                future: Pin<Box<dyn Future<Output = ()> + Send + 'static>>,
            ) -> Box<dyn AsyncHandle> {
                let (abort, registration) = AbortHandle::new_pair();
                let finished = Arc::new(AtomicBool::new(false));
                let finished_flag = finished.clone();

                std::thread::spawn(move || {
                    let _ = futures::executor::block_on(Abortable::new(future, registration));
                    finished_flag.store(true, Ordering::Release);
                });

                Box::new(ThreadHandle { abort, finished })
            }
        }

        struct ThreadHandle {
            abort: AbortHandle,
            finished: Arc<AtomicBool>,
        }

        impl AsyncHandle for ThreadHandle {
            fn is_finished(&self) -> bool {
                self.finished.load(Ordering::Acquire)
            }

            fn cancel(&self) {
                self.abort.abort();
            }
        }
    }
}

/// Runtime-independent sleep
pub async fn async_delay(duration: std::time::Duration) {
    #[cfg(feature = "tokio-runtime")]
    {
        tokio::time::sleep(duration).await;
    }

    #[cfg(not(feature = "tokio-runtime"))]
    {
        thread_delay(duration).await;
    }
}

/// Sleep backed by a helper thread that fires a oneshot after `duration`.
/// The awaiting task stays pollable, so an abort ends the wait at once.
#[cfg_attr(feature = "tokio-runtime", allow(dead_code))]
pub(crate) async fn thread_delay(duration: std::time::Duration) {
    let (tx, rx) = futures::channel::oneshot::channel::<()>();
    std::thread::spawn(move || {
        std::thread::sleep(duration);
        let _ = tx.send(());
    });
    let _ = rx.await;
}

/// Global runtime instance
static RUNTIME: std::sync::OnceLock<Box<dyn AsyncSpawner>> = std::sync::OnceLock::new();

/// Initialize the runtime with a specific spawner. Only the first call wins.
pub fn init_runtime(spawner: Box<dyn AsyncSpawner>) {
    if RUNTIME.set(spawner).is_err() {
        log::debug!("runtime already initialized, keeping the existing spawner");
    }
}

/// Get the global runtime spawner
pub fn runtime() -> &'static dyn AsyncSpawner {
    RUNTIME
        .get_or_init(|| {
            #[cfg(feature = "tokio-runtime")]
            {
                Box::new(spawners::tokio_impl::TokioSpawner)
            }

            #[cfg(not(feature = "tokio-runtime"))]
            {
                Box::new(spawners::thread_impl::ThreadSpawner)
            }
        })
        .as_ref()
}
