mod tests {
    use embassy_time::Duration;
    use tilt_dice::TimerBank;

    const TICK: Duration = Duration::from_millis(1);

    #[test]
    fn test_fires_once_per_crossing() {
        let mut timers = TimerBank::<4>::new();
        timers.advance(Duration::from_millis(5));
        assert!(!timers.test(0, Duration::from_millis(10)));

        timers.advance(Duration::from_millis(5));
        assert!(timers.test(0, Duration::from_millis(10)));
        assert_eq!(timers.elapsed(0), Duration::from_millis(0));
        assert!(!timers.test(0, Duration::from_millis(10)));
    }

    #[test]
    fn test_periodic_firing_count() {
        let mut timers = TimerBank::<2>::new();
        let mut fired = 0;
        for _ in 0..100 {
            timers.advance(TICK);
            if timers.test(1, Duration::from_millis(10)) {
                fired += 1;
            }
        }
        assert_eq!(fired, 10);
    }

    #[test]
    fn test_large_step_fires_once() {
        let mut timers = TimerBank::<1>::new();
        timers.advance(Duration::from_millis(48));
        assert!(timers.test(0, Duration::from_millis(10)));
        assert!(!timers.test(0, Duration::from_millis(10)));
    }

    #[test]
    fn test_reset_is_per_slot() {
        let mut timers = TimerBank::<3>::new();
        timers.advance(Duration::from_millis(7));
        timers.reset(1);
        assert_eq!(timers.elapsed(0), Duration::from_millis(7));
        assert_eq!(timers.elapsed(1), Duration::from_millis(0));
        assert_eq!(timers.elapsed(2), Duration::from_millis(7));

        timers.advance(TICK);
        assert_eq!(timers.elapsed(1), TICK);
    }

    #[test]
    fn test_zero_threshold_fires_every_call() {
        let mut timers = TimerBank::<1>::new();
        assert!(timers.test(0, Duration::from_millis(0)));
        assert!(timers.test(0, Duration::from_millis(0)));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "out of range")]
    fn test_out_of_range_slot_panics_in_debug() {
        let mut timers = TimerBank::<2>::new();
        timers.reset(2);
    }
}
