//! Debounced, single-flight execution of sampling passes.
//!
//! A [`DebounceScheduler`] owns two threads:
//! - a timer thread that holds the most recently armed request and fires it
//!   once its delay has elapsed without being replaced;
//! - a single worker thread that runs passes strictly one at a time, in the
//!   order they were fired.
//!
//! Every request mints a new [`Token`] and makes it the current one. A pass
//! only publishes its output if its token is still current when it finishes;
//! the check and the transition back to idle happen under one lock.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::PlotError;

/// Identifies one recompute request. Newer requests have larger tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token(u64);

impl Token {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Armed { token: Token, fire_at: Instant },
    Running(Token),
}

/// Output of a pass that was still current when it finished.
#[derive(Debug)]
pub struct Completed<R> {
    pub token: Token,
    pub output: R,
}

enum TimerMessage<J> {
    Arm {
        token: Token,
        job: J,
        fire_at: Instant,
    },
    Shutdown,
}

struct WorkItem<J> {
    token: Token,
    job: J,
}

struct Shared {
    state: SchedulerState,
    current: Option<Token>,
    next_generation: u64,
}

type Waker = Arc<dyn Fn() + Send + Sync>;

pub struct DebounceScheduler<J> {
    shared: Arc<Mutex<Shared>>,
    timer_tx: Sender<TimerMessage<J>>,
    timer_handle: Option<JoinHandle<()>>,
    worker_handle: Option<JoinHandle<()>>,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    // The guarded section never panics, but recover rather than propagate
    // poisoning into the UI thread.
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<J: Send + 'static> DebounceScheduler<J> {
    /// Start the timer and worker threads. `pass` runs on the worker for
    /// every fired request; still-current outputs arrive on the returned
    /// receiver.
    pub fn spawn<R, F>(pass: F) -> Result<(Self, Receiver<Completed<R>>), PlotError>
    where
        R: Send + 'static,
        F: Fn(J) -> R + Send + 'static,
    {
        Self::spawn_with_waker(pass, || {})
    }

    /// Like [`spawn`](Self::spawn), additionally calling `waker` after each
    /// delivered output so an event loop can wake up and drain the receiver.
    pub fn spawn_with_waker<R, F, W>(
        pass: F,
        waker: W,
    ) -> Result<(Self, Receiver<Completed<R>>), PlotError>
    where
        R: Send + 'static,
        F: Fn(J) -> R + Send + 'static,
        W: Fn() + Send + Sync + 'static,
    {
        let shared = Arc::new(Mutex::new(Shared {
            state: SchedulerState::Idle,
            current: None,
            next_generation: 1,
        }));
        let (timer_tx, timer_rx) = mpsc::channel::<TimerMessage<J>>();
        let (work_tx, work_rx) = mpsc::channel::<WorkItem<J>>();
        let (done_tx, done_rx) = mpsc::channel::<Completed<R>>();
        let waker: Waker = Arc::new(waker);

        let worker_shared = Arc::clone(&shared);
        let worker_handle = thread::Builder::new()
            .name("fnplot-sampler".to_string())
            .spawn(move || worker_main(work_rx, done_tx, worker_shared, pass, waker))
            .map_err(|e| PlotError::WorkerSpawn(e.to_string()))?;

        let timer_shared = Arc::clone(&shared);
        let timer_handle = thread::Builder::new()
            .name("fnplot-debounce".to_string())
            .spawn(move || timer_main(timer_rx, work_tx, timer_shared))
            .map_err(|e| PlotError::WorkerSpawn(e.to_string()))?;

        Ok((
            Self {
                shared,
                timer_tx,
                timer_handle: Some(timer_handle),
                worker_handle: Some(worker_handle),
            },
            done_rx,
        ))
    }

    /// Schedule `job` to run after `delay`, superseding any earlier request.
    ///
    /// A pass already running for an older token is not interrupted; its
    /// output is discarded when it finishes.
    pub fn request(&self, job: J, delay: Duration) -> Token {
        let fire_at = Instant::now() + delay;
        let token = {
            let mut shared = lock(&self.shared);
            let token = Token(shared.next_generation);
            shared.next_generation += 1;
            shared.current = Some(token);
            shared.state = SchedulerState::Armed { token, fire_at };
            token
        };
        tracing::trace!("Armed recompute {} in {:?}", token.0, delay);
        if self
            .timer_tx
            .send(TimerMessage::Arm {
                token,
                job,
                fire_at,
            })
            .is_err()
        {
            tracing::error!("Debounce timer thread is gone, request {} dropped", token.0);
        }
        token
    }

    /// Invalidate the current token without scheduling anything new.
    pub fn cancel(&self) {
        let mut shared = lock(&self.shared);
        if shared.current.is_some() {
            tracing::trace!("Cancelled pending recompute");
        }
        shared.current = None;
        shared.state = SchedulerState::Idle;
    }

    pub fn current(&self) -> Option<Token> {
        lock(&self.shared).current
    }

    pub fn is_current(&self, token: Token) -> bool {
        lock(&self.shared).current == Some(token)
    }

    pub fn state(&self) -> SchedulerState {
        lock(&self.shared).state
    }
}

impl<J> Drop for DebounceScheduler<J> {
    fn drop(&mut self) {
        let _ = self.timer_tx.send(TimerMessage::Shutdown);
        // The worker exits once the timer drops its end of the work queue.
        if let Some(handle) = self.timer_handle.take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.worker_handle.take() {
            let _ = handle.join();
        }
    }
}

fn timer_main<J>(rx: Receiver<TimerMessage<J>>, work_tx: Sender<WorkItem<J>>, shared: Arc<Mutex<Shared>>) {
    let mut armed: Option<(Token, J, Instant)> = None;
    loop {
        let message = match &armed {
            None => match rx.recv() {
                Ok(message) => Some(message),
                Err(_) => break,
            },
            Some((_, _, fire_at)) => {
                let now = Instant::now();
                if *fire_at <= now {
                    None
                } else {
                    match rx.recv_timeout(*fire_at - now) {
                        Ok(message) => Some(message),
                        Err(RecvTimeoutError::Timeout) => None,
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            }
        };

        match message {
            Some(TimerMessage::Arm {
                token,
                job,
                fire_at,
            }) => {
                // Only the latest request matters; earlier ones are coalesced.
                armed = Some((token, job, fire_at));
            }
            Some(TimerMessage::Shutdown) => break,
            None => {
                if let Some((token, job, _)) = armed.take() {
                    fire(token, job, &work_tx, &shared);
                }
            }
        }
    }
    tracing::debug!("Debounce timer thread exiting");
}

fn fire<J>(token: Token, job: J, work_tx: &Sender<WorkItem<J>>, shared: &Mutex<Shared>) {
    let mut guard = lock(shared);
    if guard.current != Some(token) {
        tracing::trace!("Timer for stale recompute {} ignored", token.0);
        return;
    }
    guard.state = SchedulerState::Running(token);
    if work_tx.send(WorkItem { token, job }).is_err() {
        tracing::error!("Sampling worker is gone, recompute {} dropped", token.0);
        guard.state = SchedulerState::Idle;
    }
}

fn worker_main<J, R, F>(
    rx: Receiver<WorkItem<J>>,
    done_tx: Sender<Completed<R>>,
    shared: Arc<Mutex<Shared>>,
    pass: F,
    waker: Waker,
) where
    F: Fn(J) -> R,
{
    for WorkItem { token, job } in rx {
        let started = Instant::now();
        let output = pass(job);

        let mut guard = lock(&shared);
        if guard.current != Some(token) {
            tracing::debug!(
                "Discarding stale pass {} after {:?}",
                token.0,
                started.elapsed()
            );
            continue;
        }
        guard.state = SchedulerState::Idle;
        tracing::debug!("Pass {} finished in {:?}", token.0, started.elapsed());
        // Sent while still holding the lock so a newer request cannot
        // slip in between the check and the delivery.
        if done_tx.send(Completed { token, output }).is_err() {
            tracing::debug!("Result receiver dropped, pass {} not delivered", token.0);
        }
        drop(guard);
        waker();
    }
    tracing::debug!("Sampling worker thread exiting");
}
