use super::*;

use std::sync::{Arc, Mutex};

#[test]
fn pending_callbacks_run_in_order_on_the_owner() {
    let queue = CallbackQueue::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sender = queue.sender();
    for i in 0..3 {
        let seen = Arc::clone(&seen);
        sender.dispatch(move || seen.lock().unwrap().push(i));
    }
    assert_eq!(queue.run_pending(), 3);
    assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
    assert_eq!(queue.run_pending(), 0);
}

#[test]
fn run_until_waits_for_other_threads() {
    let queue = CallbackQueue::new();
    let sender = queue.sender();
    let owner = std::thread::current().id();
    let ran_on = Arc::new(Mutex::new(None));
    let ran_on2 = Arc::clone(&ran_on);
    std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(20));
        sender.dispatch(move || *ran_on2.lock().unwrap() = Some(std::thread::current().id()));
    });
    assert_eq!(queue.run_until(1, Duration::from_secs(5)), 1);
    assert_eq!(*ran_on.lock().unwrap(), Some(owner));
}

#[test]
fn run_until_times_out() {
    let queue = CallbackQueue::new();
    assert_eq!(queue.run_until(1, Duration::from_millis(10)), 0);
}

#[test]
fn dispatch_after_queue_drop_is_ignored() {
    let queue = CallbackQueue::new();
    let sender = queue.sender();
    drop(queue);
    sender.dispatch(|| panic!("must not run"));
}
