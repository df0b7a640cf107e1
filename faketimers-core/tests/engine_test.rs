use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use faketimers_core::prelude::*;

const TICK: Duration = Duration::from_millis(10);

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

/// Creates a timer whose callback counts firings.
fn counted(
    timers: &mut FakeTimers<()>,
    period: Duration,
    behavior: TimerBehavior,
) -> (TimerHandle, Rc<Cell<u64>>) {
    let count = Rc::new(Cell::new(0));
    let seen = Rc::clone(&count);
    let handle = timers
        .create("TEST", period, behavior, (), move |_, _, _| seen.set(seen.get() + 1))
        .expect("valid period");
    (handle, count)
}

#[test]
fn period_not_a_multiple_of_tick_is_rejected() {
    let mut timers: FakeTimers<()> = FakeTimers::new(TICK);
    for period in [ms(1), ms(15), ms(105), Duration::from_micros(10_500)] {
        assert!(matches!(
            timers.create("bad", period, TimerBehavior::SingleShot, (), |_, _, _| {}),
            Err(TimerError::InvalidPeriod { .. })
        ));
    }
    assert_eq!(timers.timer_count(), 0);
}

#[test]
fn consecutive_creations_yield_distinct_valid_handles() {
    let mut timers: FakeTimers<()> = FakeTimers::new(TICK);
    let (a, _) = counted(&mut timers, ms(100), TimerBehavior::SingleShot);
    let (b, _) = counted(&mut timers, ms(100), TimerBehavior::SingleShot);
    assert!(a.is_valid());
    assert!(b.is_valid());
    assert_ne!(a, b);
    assert_eq!(timers.name(a), "TEST");
    assert_eq!(timers.period(b), ms(100));
}

#[test]
fn delete_bounds() {
    let mut timers: FakeTimers<()> = FakeTimers::new(TICK);
    let (handle, _) = counted(&mut timers, ms(100), TimerBehavior::SingleShot);

    assert_eq!(
        timers.delete(TimerHandle::INVALID),
        Err(TimerError::InvalidHandle(TimerHandle::INVALID))
    );
    let beyond = TimerHandle::from_raw(handle.as_raw() + 1);
    assert_eq!(timers.delete(beyond), Err(TimerError::InvalidHandle(beyond)));
    assert_eq!(timers.delete(handle), Ok(()));
    // The slot is free but still in range.
    assert_eq!(timers.delete(handle), Ok(()));
}

#[test]
fn mutators_reject_invalid_handles() {
    let mut timers: FakeTimers<()> = FakeTimers::new(TICK);
    let bad = TimerHandle::from_raw(3);
    assert!(timers.start(bad).is_err());
    assert!(timers.stop(bad).is_err());
    assert!(timers.reset(bad).is_err());
    assert!(timers.change_period(bad, ms(10)).is_err());
    assert!(timers.set_behavior(bad, TimerBehavior::AutoReload).is_err());
    assert!(timers.set_context(bad, ()).is_err());
    assert!(timers.start(TimerHandle::INVALID).is_err());
    assert!(!timers.is_active(bad));
}

#[test]
fn created_timer_never_fires_without_start() {
    let mut timers: FakeTimers<()> = FakeTimers::new(TICK);
    let (handle, count) = counted(&mut timers, ms(100), TimerBehavior::AutoReload);
    timers.advance_time(Duration::from_secs(100));
    assert_eq!(count.get(), 0);
    assert!(!timers.is_active(handle));
    assert_eq!(timers.expiry_time(handle), None);
}

#[test]
fn single_shot_fires_once() {
    let mut timers: FakeTimers<()> = FakeTimers::new(TICK);
    let (handle, count) = counted(&mut timers, ms(100), TimerBehavior::SingleShot);
    timers.start(handle).unwrap();
    assert!(timers.is_active(handle));

    timers.advance_time(ms(90));
    assert_eq!(count.get(), 0);
    timers.advance_time(ms(10));
    assert_eq!(count.get(), 1);
    timers.advance_time(Duration::from_secs(10));
    assert_eq!(count.get(), 1);
    assert!(!timers.is_active(handle));

    timers.reset(handle).unwrap();
    timers.advance_time(ms(100));
    assert_eq!(count.get(), 2);
}

#[test]
fn single_shot_over_many_periods_fires_once() {
    let mut timers: FakeTimers<()> = FakeTimers::new(TICK);
    let (handle, count) = counted(&mut timers, ms(1000), TimerBehavior::SingleShot);
    timers.start(handle).unwrap();
    timers.advance_time(ms(100_000));
    assert_eq!(count.get(), 1);
}

#[test]
fn auto_reload_over_two_advances() {
    let mut timers: FakeTimers<()> = FakeTimers::new(TICK);
    let (handle, count) = counted(&mut timers, ms(100), TimerBehavior::AutoReload);
    timers.start(handle).unwrap();

    timers.advance_time(ms(150));
    assert_eq!(count.get(), 1);
    assert_eq!(timers.expiry_time(handle), Some(ms(200)));

    timers.advance_time(ms(50));
    assert_eq!(count.get(), 2);
    assert_eq!(timers.now(), ms(200));
}

#[test]
fn firing_lands_on_the_period_boundary() {
    let mut timers: FakeTimers<()> = FakeTimers::new(TICK);
    let instants = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&instants);
    let handle = timers
        .create("stamp", ms(30), TimerBehavior::AutoReload, (), move |timers, _, _| {
            sink.borrow_mut().push(timers.now().as_millis() as u64)
        })
        .unwrap();
    timers.start(handle).unwrap();
    timers.advance_time(ms(95));
    assert_eq!(*instants.borrow(), vec![30, 60, 90]);
}

#[test]
fn expiry_time_tracks_activity() {
    let mut timers: FakeTimers<()> = FakeTimers::new(TICK);
    let (handle, _) = counted(&mut timers, ms(100), TimerBehavior::SingleShot);
    timers.advance_time(ms(40));
    timers.start(handle).unwrap();
    assert_eq!(timers.expiry_time(handle), Some(ms(140)));

    timers.stop(handle).unwrap();
    assert_eq!(timers.expiry_time(handle), None);

    timers.start(handle).unwrap();
    timers.advance_time(ms(100));
    assert_eq!(timers.expiry_time(handle), None);
}

#[test]
fn start_restarts_from_now() {
    let mut timers: FakeTimers<()> = FakeTimers::new(TICK);
    let (handle, count) = counted(&mut timers, ms(100), TimerBehavior::SingleShot);
    timers.start(handle).unwrap();
    timers.advance_time(ms(80));
    timers.start(handle).unwrap();
    timers.advance_time(ms(80));
    assert_eq!(count.get(), 0);
    timers.advance_time(ms(20));
    assert_eq!(count.get(), 1);
}

#[test]
fn change_period_re_anchors() {
    let mut timers: FakeTimers<()> = FakeTimers::new(TICK);
    let (handle, count) = counted(&mut timers, ms(100), TimerBehavior::AutoReload);
    timers.start(handle).unwrap();
    timers.advance_time(ms(70));

    timers.change_period(handle, ms(50)).unwrap();
    assert_eq!(timers.period(handle), ms(50));
    assert_eq!(timers.expiry_time(handle), Some(ms(120)));

    timers.advance_time(ms(30));
    assert_eq!(count.get(), 0);
    timers.advance_time(ms(20));
    assert_eq!(count.get(), 1);
}

#[test]
fn change_period_activates_stopped_timer() {
    let mut timers: FakeTimers<()> = FakeTimers::new(TICK);
    let (handle, count) = counted(&mut timers, ms(100), TimerBehavior::SingleShot);
    assert!(!timers.is_active(handle));
    timers.change_period(handle, ms(20)).unwrap();
    assert!(timers.is_active(handle));
    timers.advance_time(ms(20));
    assert_eq!(count.get(), 1);
}

#[test]
fn behavior_can_be_switched() {
    let mut timers: FakeTimers<()> = FakeTimers::new(TICK);
    let (handle, count) = counted(&mut timers, ms(10), TimerBehavior::SingleShot);
    assert_eq!(timers.behavior(handle), TimerBehavior::SingleShot);
    timers.set_behavior(handle, TimerBehavior::AutoReload).unwrap();
    assert_eq!(timers.behavior(handle), TimerBehavior::AutoReload);
    timers.start(handle).unwrap();
    timers.advance_time(ms(50));
    assert_eq!(count.get(), 5);
}

#[test]
fn tick_equals_one_quantum_advance() {
    let mut by_tick: FakeTimers<()> = FakeTimers::new(TICK);
    let mut by_advance: FakeTimers<()> = FakeTimers::new(TICK);
    let (a, tick_count) = counted(&mut by_tick, ms(30), TimerBehavior::AutoReload);
    let (b, advance_count) = counted(&mut by_advance, ms(30), TimerBehavior::AutoReload);
    by_tick.start(a).unwrap();
    by_advance.start(b).unwrap();

    for _ in 0..10 {
        let lhs = by_tick.tick();
        let rhs = by_advance.advance_time(TICK);
        assert_eq!(lhs, rhs);
        assert_eq!(by_tick.now(), by_advance.now());
        assert_eq!(tick_count.get(), advance_count.get());
    }
    assert_eq!(tick_count.get(), 3);
}

#[test]
fn deferred_calls_run_in_order_before_timers() {
    let mut timers: FakeTimers<()> = FakeTimers::new(TICK);
    let log = Rc::new(RefCell::new(Vec::<String>::new()));

    let sink = Rc::clone(&log);
    let handle = timers
        .create("timer", TICK, TimerBehavior::SingleShot, (), move |_, _, _| {
            sink.borrow_mut().push("timer".into())
        })
        .unwrap();
    timers.start(handle).unwrap();

    for i in 0..3u32 {
        let sink = Rc::clone(&log);
        assert!(timers.enqueue_deferred_call(
            move |_, context: &'static str, parameter: u32| {
                sink.borrow_mut().push(format!("{}{}", context, parameter))
            },
            "call",
            i,
        ));
    }
    assert_eq!(timers.pending_deferred_calls(), 3);

    timers.tick();
    assert_eq!(*log.borrow(), vec!["call0", "call1", "call2", "timer"]);
}

#[test]
fn deferred_calls_enqueued_while_draining_run_in_same_drain() {
    let mut timers: FakeTimers<()> = FakeTimers::new(TICK);
    let log = Rc::new(RefCell::new(Vec::new()));

    let sink = Rc::clone(&log);
    timers.enqueue_deferred_call(
        move |timers: &mut FakeTimers<()>, _: (), _: ()| {
            sink.borrow_mut().push(1);
            let inner = Rc::clone(&sink);
            timers.enqueue_deferred_call(move |_, _: (), _: ()| inner.borrow_mut().push(2), (), ());
        },
        (),
        (),
    );

    let report = timers.advance_time(Duration::ZERO);
    assert_eq!(report.deferred_calls, 2);
    assert_eq!(*log.borrow(), vec![1, 2]);
    assert_eq!(timers.pending_deferred_calls(), 0);
}

#[test]
fn deferred_call_enqueued_by_timer_waits_for_next_advance() {
    let mut timers: FakeTimers<()> = FakeTimers::new(TICK);
    let ran = Rc::new(Cell::new(0));

    let flag = Rc::clone(&ran);
    let handle = timers
        .create("defer", TICK, TimerBehavior::SingleShot, (), move |timers, _, _| {
            let flag = Rc::clone(&flag);
            timers.enqueue_deferred_call(move |_, _: (), _: ()| flag.set(flag.get() + 1), (), ());
        })
        .unwrap();
    timers.start(handle).unwrap();

    timers.advance_time(ms(50));
    assert_eq!(ran.get(), 0);
    assert_eq!(timers.pending_deferred_calls(), 1);
    timers.tick();
    assert_eq!(ran.get(), 1);
}

#[test]
fn deleted_slot_is_reused_and_other_handles_survive_growth() {
    let mut timers: FakeTimers<()> = FakeTimers::with_capacity(TICK, 1);
    let handles: Vec<_> = (0..16)
        .map(|_| counted(&mut timers, ms(10), TimerBehavior::SingleShot).0)
        .collect();
    assert_eq!(timers.slot_count(), 16);

    timers.delete(handles[3]).unwrap();
    let (reused, _) = counted(&mut timers, ms(20), TimerBehavior::SingleShot);
    assert_eq!(reused, handles[3]);
    assert_eq!(timers.period(reused), ms(20));
    assert_eq!(timers.period(handles[15]), ms(10));
    assert_eq!(timers.slot_count(), 16);
}

#[test]
fn deleted_timer_is_reset_before_reuse() {
    let mut timers: FakeTimers<()> = FakeTimers::new(TICK);
    let (handle, old_count) = counted(&mut timers, ms(10), TimerBehavior::AutoReload);
    timers.start(handle).unwrap();
    timers.delete(handle).unwrap();

    let (reused, new_count) = counted(&mut timers, ms(10), TimerBehavior::SingleShot);
    assert_eq!(reused, handle);
    assert!(!timers.is_active(reused));
    timers.advance_time(ms(100));
    assert_eq!(old_count.get(), 0);
    assert_eq!(new_count.get(), 0);
}

#[test]
fn equal_deadlines_fire_in_slot_order() {
    let mut timers: FakeTimers<u32> = FakeTimers::new(TICK);
    let order = Rc::new(RefCell::new(Vec::new()));
    let periods = [ms(40), ms(20), ms(40), ms(20)];
    for (id, period) in periods.into_iter().enumerate() {
        let sink = Rc::clone(&order);
        let handle = timers
            .create("t", period, TimerBehavior::SingleShot, id as u32, move |_, _, id| {
                sink.borrow_mut().push(id)
            })
            .unwrap();
        timers.start(handle).unwrap();
    }
    timers.advance_time(ms(40));
    assert_eq!(*order.borrow(), vec![1, 3, 0, 2]);
}

#[test]
#[should_panic(expected = "not allocated")]
fn querying_never_created_handle_panics() {
    let timers: FakeTimers<()> = FakeTimers::new(TICK);
    timers.expiry_time(TimerHandle::from_raw(1));
}
