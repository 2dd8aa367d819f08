use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use fnplot::processing::scheduler::{DebounceScheduler, SchedulerState};

#[test]
fn burst_of_requests_runs_once_with_last_job() {
    let runs = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&runs);
    let (scheduler, rx) = DebounceScheduler::spawn(move |job: u32| {
        if let Ok(mut seen) = seen.lock() {
            seen.push(job);
        }
        job
    })
    .unwrap();

    let mut last = None;
    for job in 1..=5 {
        last = Some(scheduler.request(job, Duration::from_millis(200)));
        thread::sleep(Duration::from_millis(10));
    }

    let done = rx.recv_timeout(Duration::from_secs(3)).unwrap();
    assert_eq!(Some(done.token), last);
    assert_eq!(done.output, 5);
    assert!(rx.recv_timeout(Duration::from_millis(400)).is_err());
    assert_eq!(*runs.lock().unwrap(), vec![5]);
}

#[test]
fn result_of_superseded_pass_is_discarded() {
    let passes = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&passes);
    let (scheduler, rx) = DebounceScheduler::spawn(move |job: u32| {
        counter.fetch_add(1, Ordering::SeqCst);
        if job == 1 {
            thread::sleep(Duration::from_millis(300));
        }
        job
    })
    .unwrap();

    let first = scheduler.request(1, Duration::ZERO);
    thread::sleep(Duration::from_millis(80));
    assert_eq!(scheduler.state(), SchedulerState::Running(first));

    let second = scheduler.request(2, Duration::ZERO);
    let done = rx.recv_timeout(Duration::from_secs(3)).unwrap();
    assert_eq!(done.token, second);
    assert_eq!(done.output, 2);
    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    assert_eq!(passes.load(Ordering::SeqCst), 2);
    assert_eq!(scheduler.state(), SchedulerState::Idle);
}

#[test]
fn passes_never_overlap() {
    let active = Arc::new(AtomicUsize::new(0));
    let max_active = Arc::new(AtomicUsize::new(0));
    let (a, m) = (Arc::clone(&active), Arc::clone(&max_active));
    let (scheduler, rx) = DebounceScheduler::spawn(move |job: u32| {
        let now = a.fetch_add(1, Ordering::SeqCst) + 1;
        m.fetch_max(now, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(30));
        a.fetch_sub(1, Ordering::SeqCst);
        job
    })
    .unwrap();

    for job in 0..6 {
        scheduler.request(job, Duration::ZERO);
        thread::sleep(Duration::from_millis(15));
    }
    // Earlier passes may be delivered on a slow machine; wait for the last.
    let mut finished = false;
    while let Ok(done) = rx.recv_timeout(Duration::from_secs(3)) {
        if done.output == 5 {
            finished = true;
            break;
        }
    }
    assert!(finished);
    assert_eq!(max_active.load(Ordering::SeqCst), 1);
}
