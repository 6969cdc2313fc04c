#[cfg(test)]
mod tests {
    use crate::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn store_at(start_ms: u64) -> (CounterStore, ManualClock) {
        let clock = ManualClock::new(start_ms);
        (CounterStore::with_clock(Bounds::default(), clock.clone()), clock)
    }

    #[test]
    fn test_starts_at_minimum_with_empty_history() {
        let store = CounterStore::new();
        assert_eq!(store.value(), 0);
        assert!(store.is_empty());
        assert!(store.can_increment());
        assert!(!store.can_decrement());
    }

    #[test]
    fn test_increment_records_entry() {
        let (mut store, _clock) = store_at(1_000);
        let e = store.increment().cloned().unwrap();
        assert_eq!(e.operation(), Operation::Increment);
        assert_eq!((e.before(), e.after()), (0, 1));
        assert_eq!(e.timestamp(), 1_000);
        assert_eq!(store.value(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_increment_then_decrement_restores_value() {
        let (mut store, clock) = store_at(0);
        store.increment();
        store.increment();
        clock.advance(5);
        store.increment();
        clock.advance(5);
        store.decrement();
        assert_eq!(store.value(), 2);
        assert_eq!(store.len(), 4);

        let front = store.history().next().unwrap();
        assert_eq!(front.to_string(), "Decremented from 3 to 2");
    }

    #[test]
    fn test_ten_increments_hit_maximum() {
        let (mut store, clock) = store_at(0);
        for _ in 0..10 {
            clock.advance(100);
            assert!(store.increment().is_some());
        }
        assert_eq!(store.value(), 10);
        assert!(!store.can_increment());
        assert_eq!(store.len(), 10);

        let front = store.history().next().unwrap();
        assert_eq!(front.operation(), Operation::Increment);
        assert_eq!((front.before(), front.after()), (9, 10));
    }

    #[test]
    fn test_increment_at_maximum_is_noop() {
        let (mut store, _clock) = store_at(0);
        for _ in 0..10 {
            store.increment();
        }
        assert!(store.increment().is_none());
        assert_eq!(store.value(), 10);
        assert_eq!(store.len(), 10);
        assert_eq!(
            store.try_increment().unwrap_err(),
            TransitionError::AtMaximum { max: 10 }
        );
        assert_eq!(store.len(), 10);
    }

    #[test]
    fn test_decrement_at_minimum_is_noop() {
        let (mut store, _clock) = store_at(0);
        assert!(store.decrement().is_none());
        assert_eq!(store.value(), 0);
        assert!(store.is_empty());
        assert_eq!(
            store.try_decrement().unwrap_err(),
            TransitionError::AtMinimum { min: 0 }
        );
    }

    #[test]
    fn test_value_stays_in_bounds_for_any_sequence() {
        let (mut store, clock) = store_at(0);
        // Deterministic pseudo-random walk biased by the seed bits.
        let mut seed: u32 = 0x9E37_79B9;
        let mut accepted = 0;
        for _ in 0..500 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            clock.advance(1);
            let op = if seed & 1 == 0 {
                Operation::Increment
            } else {
                Operation::Decrement
            };
            if store.apply(op).is_some() {
                accepted += 1;
            }
            assert!(store.bounds().contains(store.value()));
        }
        assert_eq!(store.len(), accepted);
        for e in store.history() {
            assert_eq!(e.after() - e.before(), e.operation().delta());
        }
    }

    #[test]
    fn test_value_matches_newest_entry() {
        let (mut store, _clock) = store_at(0);
        store.increment();
        store.increment();
        store.decrement();
        assert_eq!(store.latest().map(|e| e.after()), Some(store.value()));
        assert_eq!(store.history().next(), store.latest());
    }

    #[test]
    fn test_timestamps_strictly_decreasing_newest_first() {
        let (mut store, clock) = store_at(500);
        store.increment();
        // Same millisecond.
        store.increment();
        // Clock stepped backwards.
        clock.set(100);
        store.increment();
        clock.set(2_000);
        store.decrement();

        let ts: Vec<u64> = store.history().map(|e| e.timestamp()).collect();
        assert_eq!(ts, vec![2_000, 502, 501, 500]);
        assert!(ts.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_custom_bounds() {
        let bounds = Bounds::new(-2, 1).unwrap();
        let mut store = CounterStore::with_clock(bounds, ManualClock::new(0));
        assert_eq!(store.value(), -2);
        for _ in 0..5 {
            store.increment();
        }
        assert_eq!(store.value(), 1);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_single_value_bounds_disable_both() {
        let store = CounterStore::with_bounds(Bounds::new(3, 3).unwrap());
        assert!(!store.can_increment());
        assert!(!store.can_decrement());
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        assert_eq!(
            Bounds::new(5, 1).unwrap_err(),
            BoundsError::Inverted { min: 5, max: 1 }
        );
    }

    #[test]
    fn test_subscribe_runs_only_on_accepted_transitions() {
        let (mut store, _clock) = store_at(0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        store.subscribe(move |e| s.borrow_mut().push(e.after()));

        store.decrement();
        store.increment();
        store.increment();
        store.decrement();
        assert_eq!(*seen.borrow(), vec![1, 2, 1]);
    }

    #[test]
    fn test_snapshot_is_newest_first() {
        let (mut store, clock) = store_at(10);
        store.increment();
        clock.advance(10);
        store.increment();
        let snap = store.snapshot();
        assert_eq!(snap.value, 2);
        assert_eq!(snap.bounds, Bounds::DEFAULT);
        assert_eq!(snap.history.len(), 2);
        assert_eq!(snap.history[0].timestamp(), 20);
        assert_eq!(snap.history[1].timestamp(), 10);
    }

    #[test]
    fn test_entry_sentences() {
        let (mut store, _clock) = store_at(0);
        for _ in 0..4 {
            store.increment();
        }
        let up = store.history().next().unwrap().to_string();
        assert_eq!(up, "Incremented from 3 to 4");
        let down = store.decrement().unwrap().to_string();
        assert_eq!(down, "Decremented from 4 to 3");
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            TransitionError::AtMaximum { max: 10 }.to_string(),
            "counter is already at its maximum of 10"
        );
        assert_eq!(
            BoundsError::Inverted { min: 2, max: 1 }.to_string(),
            "minimum 2 is greater than maximum 1"
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_snapshot_serializes() {
        let (mut store, _clock) = store_at(42);
        store.increment();
        let json = serde_json::to_value(store.snapshot()).unwrap();
        assert_eq!(json["value"], 1);
        assert_eq!(json["history"][0]["operation"], "increment");
        assert_eq!(json["history"][0]["timestamp"], 42);
        let back: CounterState = serde_json::from_value(json).unwrap();
        assert_eq!(back, store.snapshot());
    }

    #[test]
    fn test_timestamp_at_clock_limit_saturates() {
        let (mut store, _clock) = store_at(u64::MAX);
        store.increment();
        let e = store.increment().cloned().unwrap();
        assert_eq!(e.timestamp(), u64::MAX);
        assert_eq!(store.value(), 2);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_rejects_inverted_bounds() {
        let json = serde_json::json!({ "min": 5, "max": 1 });
        let err = serde_json::from_value::<Bounds>(json).unwrap_err();
        assert!(err.to_string().contains("minimum 5 is greater than maximum 1"));

        let json = serde_json::json!({ "min": 1, "max": 5 });
        let ok: Bounds = serde_json::from_value(json).unwrap();
        assert_eq!((ok.min(), ok.max()), (1, 5));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_rejects_inconsistent_entry() {
        let json = serde_json::json!({
            "timestamp": 7,
            "operation": "increment",
            "before": 3,
            "after": 5,
        });
        let err = serde_json::from_value::<HistoryEntry>(json).unwrap_err();
        assert!(err.to_string().contains("Increment cannot go from 3 to 5"));

        let json = serde_json::json!({
            "timestamp": 7,
            "operation": "decrement",
            "before": 3,
            "after": 2,
        });
        let e: HistoryEntry = serde_json::from_value(json).unwrap();
        assert_eq!(e.to_string(), "Decremented from 3 to 2");
    }
}
