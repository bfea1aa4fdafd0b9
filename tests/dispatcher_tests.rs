//! Integration tests for the main-thread dispatcher: ordering, thread
//! affinity, synchronous dispatch, priorities and shutdown.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use common::{bound_dispatcher, bound_dispatcher_with, on_worker, options_with_policy, pump_until};
use desktop_toolkit::config::ShutdownPolicy;
use desktop_toolkit::{DispatchError, Dispatcher, DispatcherOptions, Priority};
use parking_lot::Mutex;

const PUMP_TIMEOUT: Duration = Duration::from_secs(10);

#[test]
fn test_items_from_one_submitter_run_in_order() {
    let dispatcher = bound_dispatcher();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let worker = {
        let dispatcher = dispatcher.clone();
        let seen = Arc::clone(&seen);
        thread::spawn(move || {
            for i in 0..101 {
                let seen = Arc::clone(&seen);
                dispatcher.dispatch_on_main(move || seen.lock().push(i)).unwrap();
            }
            // Barrier: returns only after every earlier item ran.
            let seen = Arc::clone(&seen);
            dispatcher
                .dispatch_on_main_sync(move || seen.lock().len())
                .unwrap()
        })
    };

    assert!(pump_until(&dispatcher, PUMP_TIMEOUT, || worker.is_finished()));
    assert_eq!(worker.join().unwrap(), 101);
    assert_eq!(*seen.lock(), (0..101).collect::<Vec<_>>());
}

#[test]
fn test_concurrent_decrements_reach_zero() {
    const THREADS: usize = 10;
    const PER_THREAD: usize = 1_000;

    let dispatcher = bound_dispatcher();
    let counter = Arc::new(AtomicI64::new((THREADS * PER_THREAD) as i64));
    let workers: Vec<_> = (0..THREADS)
        .map(|_| {
            let dispatcher = dispatcher.clone();
            let counter = Arc::clone(&counter);
            thread::spawn(move || {
                for _ in 0..PER_THREAD {
                    let counter = Arc::clone(&counter);
                    dispatcher
                        .dispatch_on_main(move || {
                            counter.fetch_sub(1, Ordering::Relaxed);
                        })
                        .unwrap();
                }
                dispatcher.dispatch_on_main_sync(|| ()).unwrap();
            })
        })
        .collect();

    assert!(pump_until(&dispatcher, PUMP_TIMEOUT, || {
        workers.iter().all(|w| w.is_finished())
    }));
    for worker in workers {
        worker.join().unwrap();
    }
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[test]
fn test_each_submitter_keeps_its_own_order() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 500;

    let dispatcher = bound_dispatcher();
    let seen = Arc::new(Mutex::new(Vec::with_capacity(THREADS * PER_THREAD)));
    let workers: Vec<_> = (0..THREADS)
        .map(|thread_index| {
            let dispatcher = dispatcher.clone();
            let seen = Arc::clone(&seen);
            thread::spawn(move || {
                for seq in 0..PER_THREAD {
                    let seen = Arc::clone(&seen);
                    dispatcher
                        .dispatch_on_main(move || seen.lock().push((thread_index, seq)))
                        .unwrap();
                }
                dispatcher.dispatch_on_main_sync(|| ()).unwrap();
            })
        })
        .collect();

    assert!(pump_until(&dispatcher, PUMP_TIMEOUT, || {
        workers.iter().all(|w| w.is_finished())
    }));
    for worker in workers {
        worker.join().unwrap();
    }

    let seen = seen.lock();
    assert_eq!(seen.len(), THREADS * PER_THREAD);
    let mut next = vec![0usize; THREADS];
    for &(thread_index, seq) in seen.iter() {
        // Strictly increasing per thread, with no gaps or repeats.
        assert_eq!(seq, next[thread_index], "thread {thread_index} out of order");
        next[thread_index] += 1;
    }
    assert!(next.iter().all(|&count| count == PER_THREAD));
}

#[test]
fn test_is_main_thread_only_inside_dispatched_work() {
    let dispatcher = bound_dispatcher();
    assert!(dispatcher.is_main_thread());

    let on_worker_thread = {
        let dispatcher = dispatcher.clone();
        on_worker(move || dispatcher.is_main_thread())
    };
    assert!(!on_worker_thread);

    let inside = Arc::new(AtomicBool::new(false));
    let worker = {
        let dispatcher = dispatcher.clone();
        let inside = Arc::clone(&inside);
        thread::spawn(move || {
            let affinity_check = dispatcher.clone();
            dispatcher
                .dispatch_on_main(move || inside.store(affinity_check.is_main_thread(), Ordering::SeqCst))
                .unwrap();
        })
    };
    worker.join().unwrap();
    assert_eq!(dispatcher.drain(), Ok(1));
    assert!(inside.load(Ordering::SeqCst));
}

#[test]
fn test_nested_dispatch_runs_in_same_drain() {
    let dispatcher = bound_dispatcher();
    let order = Arc::new(Mutex::new(Vec::new()));

    {
        let inner_dispatcher = dispatcher.clone();
        let order = Arc::clone(&order);
        dispatcher
            .dispatch_on_main(move || {
                order.lock().push(1);
                let nested = Arc::clone(&order);
                inner_dispatcher
                    .dispatch_on_main(move || nested.lock().push(3))
                    .unwrap();
                order.lock().push(2);
            })
            .unwrap();
    }

    assert_eq!(dispatcher.drain(), Ok(2));
    assert_eq!(*order.lock(), vec![1, 2, 3]);
}

#[test]
fn test_wait_after_nested_drain_times_out() {
    let dispatcher = bound_dispatcher();
    let inner_dispatcher = dispatcher.clone();
    dispatcher
        .dispatch_on_main(move || inner_dispatcher.dispatch_on_main(|| ()).unwrap())
        .unwrap();

    assert_eq!(dispatcher.wait(Some(Duration::from_millis(1))), Ok(true));
    assert_eq!(dispatcher.drain(), Ok(2));
    assert_eq!(dispatcher.pending(), 0);
    // Nothing queued and no wake requested: the wait must run out.
    assert_eq!(dispatcher.wait(Some(Duration::from_millis(100))), Ok(false));
}

#[test]
fn test_sync_dispatch_returns_value_from_worker() {
    let dispatcher = bound_dispatcher();
    let worker = {
        let dispatcher = dispatcher.clone();
        thread::spawn(move || {
            let affinity_check = dispatcher.clone();
            dispatcher.dispatch_on_main_sync(move || (affinity_check.is_main_thread(), "answer".to_string()))
        })
    };

    assert!(pump_until(&dispatcher, PUMP_TIMEOUT, || worker.is_finished()));
    assert_eq!(worker.join().unwrap(), Ok((true, "answer".to_string())));
}

#[test]
fn test_sync_dispatch_propagates_panic() {
    let dispatcher = bound_dispatcher();
    let worker = {
        let dispatcher = dispatcher.clone();
        thread::spawn(move || dispatcher.dispatch_on_main_sync(|| -> u32 { panic!("kaboom") }))
    };

    assert!(pump_until(&dispatcher, PUMP_TIMEOUT, || worker.is_finished()));
    assert_eq!(
        worker.join().unwrap(),
        Err(DispatchError::Panicked("kaboom".to_string()))
    );

    // The dispatcher keeps working after the panic.
    let ran = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&ran);
    dispatcher
        .dispatch_on_main(move || flag.store(true, Ordering::SeqCst))
        .unwrap();
    dispatcher.drain().unwrap();
    assert!(ran.load(Ordering::SeqCst));
}

#[test]
fn test_sync_dispatch_times_out_when_main_thread_is_busy() {
    let options = DispatcherOptions {
        sync_timeout: Some(Duration::from_millis(20)),
        ..DispatcherOptions::default()
    };
    let dispatcher = bound_dispatcher_with(options);

    let result = {
        let dispatcher = dispatcher.clone();
        on_worker(move || dispatcher.dispatch_on_main_sync(|| 1))
    };
    assert_eq!(result, Err(DispatchError::Timeout));

    // The abandoned item still runs; nobody is left to receive its result.
    assert_eq!(dispatcher.drain(), Ok(1));
}

#[test]
fn test_high_priority_overtakes_pending_normal_items() {
    let dispatcher = bound_dispatcher();
    let order = Arc::new(Mutex::new(Vec::new()));

    for (priority, label) in [
        (Priority::Normal, "normal-1"),
        (Priority::Normal, "normal-2"),
        (Priority::High, "high-1"),
        (Priority::Normal, "normal-3"),
        (Priority::High, "high-2"),
    ] {
        let order = Arc::clone(&order);
        dispatcher
            .dispatch_on_main_with_priority(priority, move || order.lock().push(label))
            .unwrap();
    }

    assert_eq!(dispatcher.drain(), Ok(5));
    assert_eq!(
        *order.lock(),
        vec!["high-1", "high-2", "normal-1", "normal-2", "normal-3"]
    );
}

#[test]
fn test_drain_from_foreign_thread_is_rejected() {
    let dispatcher = bound_dispatcher();
    let result = {
        let dispatcher = dispatcher.clone();
        on_worker(move || (dispatcher.drain(), dispatcher.wait(Some(Duration::ZERO))))
    };
    assert_eq!(result.0, Err(DispatchError::NotMainThread));
    assert_eq!(result.1, Err(DispatchError::NotMainThread));
}

#[test]
fn test_wake_releases_waiting_main_thread() {
    let dispatcher = bound_dispatcher();
    let waker = dispatcher.clone();
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        waker.wake();
    });
    assert_eq!(dispatcher.wait(Some(PUMP_TIMEOUT)), Ok(true));
    handle.join().unwrap();
    assert_eq!(dispatcher.pending(), 0);
}

#[test]
fn test_close_on_main_thread_drains_then_rejects() {
    let dispatcher = bound_dispatcher_with(options_with_policy(ShutdownPolicy::Drain));
    let ran = Arc::new(AtomicUsize::new(0));
    for _ in 0..5 {
        let ran = Arc::clone(&ran);
        dispatcher
            .dispatch_on_main(move || {
                ran.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
    }

    dispatcher.close();
    assert_eq!(ran.load(Ordering::SeqCst), 5);
    assert!(dispatcher.is_closed());
    assert_eq!(dispatcher.pending(), 0);
    assert_eq!(dispatcher.dispatch_on_main(|| {}), Err(DispatchError::Closed));
}

#[test]
fn test_close_from_worker_leaves_items_for_main_loop() {
    let dispatcher = bound_dispatcher_with(options_with_policy(ShutdownPolicy::Drain));
    let ran = Arc::new(AtomicUsize::new(0));
    {
        let ran = Arc::clone(&ran);
        dispatcher
            .dispatch_on_main(move || {
                ran.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
    }

    {
        let dispatcher = dispatcher.clone();
        on_worker(move || dispatcher.close());
    }
    assert_eq!(ran.load(Ordering::SeqCst), 0);
    assert_eq!(dispatcher.pending(), 1);

    assert_eq!(dispatcher.drain(), Ok(1));
    assert_eq!(ran.load(Ordering::SeqCst), 1);
}

#[test]
fn test_cancel_policy_releases_sync_waiters() {
    let dispatcher = bound_dispatcher_with(options_with_policy(ShutdownPolicy::Cancel));
    let worker = {
        let dispatcher = dispatcher.clone();
        thread::spawn(move || dispatcher.dispatch_on_main_sync(|| 7))
    };

    // Let the worker enqueue its item without draining it.
    while dispatcher.pending() == 0 && !worker.is_finished() {
        thread::sleep(Duration::from_millis(1));
    }
    dispatcher.close();

    assert_eq!(worker.join().unwrap(), Err(DispatchError::Cancelled));
    assert_eq!(dispatcher.pending(), 0);
    assert_eq!(dispatcher.drain(), Ok(0));
}

#[test]
fn test_run_processes_work_until_closed() {
    let dispatcher = Dispatcher::default();
    let ran = Arc::new(AtomicUsize::new(0));

    let main = {
        let dispatcher = dispatcher.clone();
        thread::spawn(move || dispatcher.run())
    };

    for _ in 0..50 {
        let ran = Arc::clone(&ran);
        dispatcher
            .dispatch_on_main(move || {
                ran.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
    }
    let main_thread_seen = {
        let affinity_check = dispatcher.clone();
        dispatcher.dispatch_on_main_sync(move || affinity_check.is_main_thread())
    };
    assert_eq!(main_thread_seen, Ok(true));

    dispatcher.close();
    assert_eq!(main.join().unwrap(), Ok(()));
    assert_eq!(ran.load(Ordering::SeqCst), 50);
}

#[test]
fn test_second_thread_cannot_bind() {
    let dispatcher = bound_dispatcher();
    let result = {
        let dispatcher = dispatcher.clone();
        on_worker(move || dispatcher.bind_to_current_thread())
    };
    assert_eq!(result, Err(DispatchError::AlreadyBound));
}
