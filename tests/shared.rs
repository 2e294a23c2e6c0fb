mod common;

mod tests {
    use tilt_dice::{Die, DieConfig, OperatingState, Sample, SampleChannel, SharedDie, TrySendError};

    use crate::common::{FrameOutput, PendingSensor, face, face_sample};

    static DIE: SharedDie<4> = SharedDie::new();

    static SINGLE_SLOT_DIE: SharedDie<1> = SharedDie::new();

    #[test]
    fn test_shared_die_entry_points() {
        let mut output = FrameOutput::default();
        let mut sensor = PendingSensor::default();

        assert_eq!(DIE.run(), None);
        assert_eq!(DIE.with(|die| die.state()), None);
        DIE.on_tick(&mut output, &mut sensor);
        assert_eq!(output.writes, 0);

        DIE.install(Die::new(DieConfig::DEFAULT));
        DIE.on_tick(&mut output, &mut sensor);
        assert_eq!(output.writes, 1);
        assert!(sensor.pending);

        for _ in 0..4 {
            assert_eq!(DIE.on_sample(face_sample(face(1))), None);
        }
        // A full queue makes room for the newest sample
        let newest = face_sample(face(5));
        assert_eq!(DIE.on_sample(newest), Some(face_sample(face(1))));
        assert_eq!(DIE.pending_samples(), 4);

        assert_eq!(DIE.run(), None);
        assert_eq!(DIE.pending_samples(), 0);
        assert_eq!(DIE.with(|die| die.state()), Some(OperatingState::PowerOn1));
        assert_eq!(DIE.with(|die| die.orientation().sample()), Some(Some(newest)));
    }

    #[test]
    fn test_newest_sample_reaches_filter() {
        SINGLE_SLOT_DIE.install(Die::new(DieConfig::DEFAULT));
        let older = Sample::new(255, 0, 0);
        let newer = Sample::new(0, 0, -255);
        assert_eq!(SINGLE_SLOT_DIE.on_sample(older), None);
        assert_eq!(SINGLE_SLOT_DIE.on_sample(newer), Some(older));

        SINGLE_SLOT_DIE.run();
        assert_eq!(
            SINGLE_SLOT_DIE.with(|die| die.orientation().sample()),
            Some(Some(newer))
        );
    }

    #[test]
    fn test_channel_keeps_order() {
        let channel = SampleChannel::<3>::new();
        assert!(channel.is_empty());
        channel.try_send(Sample::new(1, 0, 0)).unwrap();
        channel.try_send(Sample::new(2, 0, 0)).unwrap();
        assert_eq!(channel.len(), 2);
        assert_eq!(channel.try_receive(), Some(Sample::new(1, 0, 0)));
        assert_eq!(channel.try_receive(), Some(Sample::new(2, 0, 0)));
        assert_eq!(channel.try_receive(), None);
    }

    #[test]
    fn test_try_send_rejects_when_full() {
        let channel = SampleChannel::<1>::new();
        channel.try_send(Sample::new(1, 0, 0)).unwrap();
        let rejected = Sample::new(2, 0, 0);
        assert_eq!(channel.try_send(rejected), Err(TrySendError(rejected)));
        assert_eq!(channel.try_receive(), Some(Sample::new(1, 0, 0)));
    }

    #[test]
    fn test_full_queue_evicts_oldest() {
        let channel = SampleChannel::<2>::default();
        let sender = channel.sender();
        let receiver = channel.receiver();

        assert!(sender.send(Sample::new(1, 0, 0)));
        assert!(sender.send(Sample::new(2, 0, 0)));
        assert!(!sender.send(Sample::new(3, 0, 0)));
        assert_eq!(channel.len(), 2);
        assert_eq!(channel.try_receive(), Some(Sample::new(2, 0, 0)));

        assert_eq!(channel.send_latest(Sample::new(4, 0, 0)), None);
        assert_eq!(receiver.take_latest(), Some(Sample::new(4, 0, 0)));
        assert!(channel.is_empty());
        assert_eq!(receiver.take_latest(), None);
    }
}
