use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use bindery_runtime::dispatcher::{DispatchError, DispatchState, Dispatcher};
use proptest::prelude::*;

const PRODUCERS: usize = 8;
const PER_PRODUCER: usize = 500;

#[test]
fn concurrent_producers_each_task_runs_once_in_order() {
    let dispatcher = Dispatcher::new();
    let handle = dispatcher.handle();
    let seen: Arc<Mutex<Vec<(usize, usize)>>> = Arc::new(Mutex::new(Vec::new()));

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|p| {
            let handle = handle.clone();
            let seen = Arc::clone(&seen);
            thread::spawn(move || {
                for i in 0..PER_PRODUCER {
                    let seen = Arc::clone(&seen);
                    handle
                        .run_on_ui_thread(move || seen.lock().unwrap().push((p, i)))
                        .unwrap();
                }
            })
        })
        .collect();

    let closer = {
        let handle = handle.clone();
        thread::spawn(move || {
            for producer in producers {
                producer.join().unwrap();
            }
            handle.close();
        })
    };

    let ran = dispatcher.run_until_closed(Duration::from_millis(20));
    closer.join().unwrap();

    assert_eq!(ran, PRODUCERS * PER_PRODUCER);
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), PRODUCERS * PER_PRODUCER);
    for p in 0..PRODUCERS {
        let order: Vec<usize> = seen.iter().filter(|(q, _)| *q == p).map(|(_, i)| *i).collect();
        assert_eq!(order, (0..PER_PRODUCER).collect::<Vec<_>>(), "producer {p}");
    }
    assert_eq!(dispatcher.state(), DispatchState::Idle);
}

#[test]
fn tasks_enqueued_while_draining_are_not_lost() {
    let dispatcher = Dispatcher::new();
    let handle = dispatcher.handle();
    let counter = Arc::new(AtomicUsize::new(0));

    // Each task schedules a follow-up until the chain is 1000 long, while a
    // second thread keeps adding independent tasks.
    fn chain(handle: bindery_runtime::DispatchHandle, counter: Arc<AtomicUsize>, left: usize) {
        let next = handle.clone();
        let _ = handle.run_on_ui_thread(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            if left > 1 {
                chain(next, counter, left - 1);
            }
        });
    }
    chain(handle.clone(), Arc::clone(&counter), 1000);

    let side = {
        let handle = handle.clone();
        let counter = Arc::clone(&counter);
        thread::spawn(move || {
            for _ in 0..1000 {
                let counter = Arc::clone(&counter);
                handle
                    .run_on_ui_thread(move || {
                        counter.fetch_add(1, Ordering::SeqCst);
                    })
                    .unwrap();
            }
        })
    };

    let mut ran = 0;
    while ran < 2000 {
        ran += dispatcher.wait_and_drain(Duration::from_millis(50));
    }
    side.join().unwrap();
    ran += dispatcher.drain();

    assert_eq!(ran, 2000);
    assert_eq!(counter.load(Ordering::SeqCst), 2000);
    assert_eq!(dispatcher.pending(), 0);
}

#[test]
fn closed_dispatcher_rejects_from_any_thread() {
    let dispatcher = Dispatcher::new();
    let handle = dispatcher.handle();
    handle.close();
    let remote = thread::spawn(move || handle.run_on_ui_thread(|| {}))
        .join()
        .unwrap();
    assert_eq!(remote, Err(DispatchError::Closed));
    assert_eq!(dispatcher.run_until_closed(Duration::from_millis(1)), 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn single_producer_order_is_preserved(values in proptest::collection::vec(any::<u16>(), 0..200)) {
        let dispatcher = Dispatcher::new();
        let handle = dispatcher.handle();
        let out = Arc::new(Mutex::new(Vec::new()));
        for v in values.clone() {
            let out = Arc::clone(&out);
            handle.run_on_ui_thread(move || out.lock().unwrap().push(v)).unwrap();
        }
        prop_assert_eq!(dispatcher.drain(), values.len());
        prop_assert_eq!(&*out.lock().unwrap(), &values);
    }
}
