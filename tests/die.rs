mod common;

mod tests {
    use tilt_dice::{DieConfig, MAX_LEVEL, OperatingState, PowerMode};

    use crate::common::{Sim, face};

    fn awake_config(start_state: OperatingState) -> DieConfig {
        DieConfig {
            start_state,
            ..DieConfig::DEFAULT
        }
    }

    /// Power-on gesture from the default config: faces 5, 0, 4
    fn wake_up(sim: &mut Sim) {
        sim.show(face(5));
        assert!(sim.run_until(20, |die| die.state() == OperatingState::PowerOn2).is_some());
        sim.show(face(0));
        assert!(sim.run_until(20, |die| die.state() == OperatingState::PowerOn3).is_some());
        sim.show(face(4));
        assert!(sim.run_until(200, |die| die.state() == OperatingState::Idle).is_some());
    }

    #[test]
    fn test_starts_off_in_low_power() {
        let mut sim = Sim::new(DieConfig::DEFAULT);
        assert_eq!(sim.die.state(), OperatingState::Off);
        assert_eq!(sim.die.mode(), PowerMode::LowPower);
        assert!(sim.die.levels().iter().all(|level| *level == 0));

        sim.step();
        assert_eq!(sim.die.state(), OperatingState::PowerOn1);
        assert!(sim.mode_changes.is_empty());
    }

    #[test]
    fn test_sample_cadence_follows_mode() {
        let mut sim = Sim::new(DieConfig::DEFAULT);
        sim.run_for(10);
        assert_eq!(sim.sensor.requests, 10);

        let mut sim = Sim::new(awake_config(OperatingState::Idle));
        sim.run_for(12);
        assert_eq!(sim.sensor.requests, 3);
        assert_eq!(sim.output.writes, 12);
    }

    #[test]
    fn test_power_on_sequence_reaches_idle() {
        let mut sim = Sim::new(DieConfig::DEFAULT);
        wake_up(&mut sim);
        assert_eq!(sim.die.mode(), PowerMode::Normal);
        assert_eq!(sim.mode_changes, vec![PowerMode::Normal]);
        assert_eq!(sim.die.face(), Some(face(4)));
    }

    #[test]
    fn test_wrong_face_does_not_advance() {
        let mut sim = Sim::new(DieConfig::DEFAULT);
        sim.show(face(0));
        sim.run_for(50);
        assert_eq!(sim.die.state(), OperatingState::PowerOn1);
    }

    #[test]
    fn test_gesture_timeout_in_power_on_2() {
        let mut sim = Sim::new(DieConfig::DEFAULT);
        sim.show(face(5));
        assert!(sim.run_until(20, |die| die.state() == OperatingState::PowerOn2).is_some());

        // Low-power ticks are 16 ms; 90 of them stay under the 1500 ms timeout
        sim.show(face(2));
        sim.run_for(90);
        assert_eq!(sim.die.state(), OperatingState::PowerOn2);
        assert!(sim.run_until(10, |die| die.state() == OperatingState::PowerOn1).is_some());
    }

    #[test]
    fn test_gesture_timeout_in_power_on_3() {
        let mut sim = Sim::new(DieConfig::DEFAULT);
        sim.show(face(5));
        assert!(sim.run_until(20, |die| die.state() == OperatingState::PowerOn2).is_some());
        sim.show(face(0));
        assert!(sim.run_until(20, |die| die.state() == OperatingState::PowerOn3).is_some());
        assert_eq!(sim.die.mode(), PowerMode::Normal);

        let ticks = sim.run_until(2000, |die| die.state() == OperatingState::PowerOn1);
        assert!(matches!(ticks, Some(1499..=1501)));
        assert_eq!(sim.die.mode(), PowerMode::LowPower);
        assert_eq!(sim.mode_changes, vec![PowerMode::Normal, PowerMode::LowPower]);
    }

    #[test]
    fn test_idle_powers_off_after_fade() {
        let mut sim = Sim::new(awake_config(OperatingState::Idle));
        sim.show(face(4));

        let mut lit = false;
        let mut dark_before_off = false;
        let mut ticks = 0;
        while sim.die.state() != OperatingState::Off {
            assert!(ticks < 5000, "did not power off");
            dark_before_off = sim.die.machine().is_powering_down()
                && sim.die.levels().iter().all(|level| *level == 0);
            lit |= sim.die.levels().iter().any(|level| *level > 0);
            sim.step();
            ticks += 1;
        }

        assert!(lit);
        assert!(dark_before_off);
        assert!(ticks > 4000);
        assert_eq!(sim.die.mode(), PowerMode::LowPower);
        assert_eq!(sim.mode_changes, vec![PowerMode::LowPower]);
    }

    #[test]
    fn test_face_change_restarts_power_off_delay() {
        let mut sim = Sim::new(awake_config(OperatingState::Idle));
        sim.show(face(4));
        sim.run_for(3000);
        sim.show(face(2));
        sim.run_for(3000);
        assert_eq!(sim.die.state(), OperatingState::Idle);
        assert!(!sim.die.machine().is_powering_down());
    }

    #[test]
    fn test_roll_result_idle() {
        let mut sim = Sim::new(awake_config(OperatingState::Idle));
        sim.show(face(4));
        sim.run_for(200);
        assert_eq!(sim.die.state(), OperatingState::Idle);

        // Tumble: a new face every 100 ms
        let tumble = [0, 2, 1, 3, 5, 0, 4, 3];
        let mut rolled = false;
        for index in tumble {
            sim.show(face(index));
            for _ in 0..100 {
                sim.step();
                rolled |= sim.die.state() == OperatingState::Rolling;
                assert_ne!(sim.die.state(), OperatingState::Result);
            }
        }
        assert!(rolled);
        assert_eq!(sim.die.state(), OperatingState::Rolling);

        // Landed on face 3
        assert!(sim.run_until(3000, |die| die.state() == OperatingState::Result).is_some());
        assert_eq!(sim.die.face(), Some(face(3)));
        assert_eq!(sim.die.machine().blink().face(), Some(face(3)));

        let ticks = sim.run_until(4000, |die| die.state() == OperatingState::Idle);
        assert!(matches!(ticks, Some(2999..=3001)), "{ticks:?}");
    }

    #[test]
    fn test_start_in_rolling_settles_on_held_face() {
        let mut sim = Sim::new(awake_config(OperatingState::Rolling));
        assert_eq!(sim.die.mode(), PowerMode::Normal);
        sim.show(face(3));

        sim.run_for(100);
        assert_eq!(sim.die.state(), OperatingState::Rolling);
        assert_eq!(sim.die.face(), Some(face(3)));

        assert!(sim.run_until(2000, |die| die.state() == OperatingState::Result).is_some());
        assert_eq!(sim.die.machine().blink().face(), Some(face(3)));

        let ticks = sim.run_until(4000, |die| die.state() == OperatingState::Idle);
        assert!(matches!(ticks, Some(2999..=3001)), "{ticks:?}");
    }

    #[test]
    fn test_unbounded_baseline_does_not_overflow() {
        let config = DieConfig {
            rolling: tilt_dice::config::RollingConfig {
                baseline: tilt_dice::Duration::MAX,
                ..DieConfig::DEFAULT.rolling
            },
            ..awake_config(OperatingState::Idle)
        };
        let mut sim = Sim::new(config);
        // Two quick changes still leave a saturated interval in the history
        for index in [0, 2] {
            sim.show(face(index));
            sim.run_for(100);
            assert_eq!(sim.die.state(), OperatingState::Idle);
        }
    }

    #[test]
    fn test_result_highlights_landed_face() {
        let mut sim = Sim::new(awake_config(OperatingState::Idle));
        sim.show(face(4));
        sim.run_for(200);
        for index in [0, 2, 1, 5] {
            sim.show(face(index));
            sim.run_for(100);
        }
        assert!(sim.run_until(3000, |die| die.state() == OperatingState::Result).is_some());

        let mut brightest_face = 0;
        for _ in 0..1000 {
            sim.step();
            brightest_face = brightest_face.max(sim.die.levels()[5]);
            assert!(sim.die.machine().blink().rising().is_none_or(|channel| channel == 5));
        }
        assert_eq!(brightest_face, MAX_LEVEL);
        // Everything but the result face has dimmed out
        let levels = sim.die.levels();
        assert!(levels.iter().enumerate().all(|(channel, level)| channel == 5 || *level == 0));
        assert_eq!(sim.die.state(), OperatingState::Result);
    }

    #[test]
    fn test_face_test_mode_shows_up_face() {
        let config = DieConfig {
            face_test: true,
            ..DieConfig::DEFAULT
        };
        let mut sim = Sim::new(config);
        assert_eq!(sim.die.mode(), PowerMode::Normal);
        sim.show(face(2));
        sim.run_for(100);
        assert_eq!(sim.die.levels(), &[0, 0, 10, 0, 0, 0]);
        assert!(sim.die.leds().rendered()[2] < 10);

        sim.run_for(300);
        assert_eq!(sim.die.leds().rendered(), &[0, 0, 10, 0, 0, 0]);
        assert_eq!(sim.die.state(), OperatingState::Off);
        assert!(sim.mode_changes.is_empty());
    }

    #[test]
    fn test_calibrate_from_latest_sample() {
        let mut sim = Sim::new(DieConfig::DEFAULT);
        assert!(sim.die.calibrate(255).is_none());
        sim.sample = tilt_dice::Sample::new(16, -1, 220);
        sim.step();
        let calibration = sim.die.calibrate(255).unwrap();
        assert_eq!(calibration.offset, tilt_dice::Sample::new(16, -1, -35));
        assert_eq!(sim.die.orientation().config().calibration, calibration);
    }
}
