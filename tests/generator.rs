// Copyright (c) 2024 Mike Tsao

use ensnare_generator::prelude::*;
use float_cmp::approx_eq;
use more_asserts::{assert_gt, assert_lt};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn generator_with(values: &[(ParameterId, ParameterType)]) -> Generator {
    Generator::new_with(
        ParameterSet::new_with(values).unwrap(),
        GeneratorConfig::default(),
    )
}

fn close(a: f64, b: f64) -> bool {
    approx_eq!(f64, a, b, epsilon = 1e-9)
}

// A short, unsustained C4 from start to finish.
#[test]
fn end_to_end_unsustained_note() {
    init_logging();
    let mut transport = OfflineTransport::default();
    let mut generator = generator_with(&[
        (ParameterId::Attack, 10.0),
        (ParameterId::Decay, 200.0),
        (ParameterId::Sustain, 0.0),
        (ParameterId::Release, 200.0),
    ]);
    let events = generator.subscribe();

    let voice = generator
        .note_on("C4".parse().unwrap(), &mut transport, Seconds::ZERO)
        .unwrap();
    assert_eq!(generator.voice_count(), 1);
    assert_eq!(generator.last_note(), Some(Note::C4));

    let (gain, source) = {
        let v = generator.voice(voice).unwrap();
        (v.stage().gain().clone(), v.source().clone())
    };
    let peak = 0.5;
    let plateau = 0.5 * 0.7;
    assert_eq!(gain.value_at(Seconds::ZERO), 0.0);
    assert!(close(gain.value_at(Seconds(0.005)), peak / 2.0));
    assert!(close(gain.value_at(Seconds(0.01)), peak));
    assert!(close(gain.value_at(Seconds(0.21)), plateau));
    assert!(close(gain.value_at(Seconds(0.31)), plateau / 2.0));
    assert!(close(gain.value_at(Seconds(0.41)), 0.0));
    assert_eq!(gain.value_at(Seconds(0.45)), 0.0);

    let release = generator.voice(voice).unwrap().release().unwrap();
    assert_eq!(release.cause, ReleaseCause::Automatic);
    assert!(close(release.start.0, 0.21));
    assert!(close(release.end.0, 0.41));
    assert!(close(source.stop_time().unwrap().0, 1.41));
    assert!(close(transport.pending_tasks().last().unwrap().0 .0, 0.51));

    assert_eq!(transport.run_until(Seconds(0.5), &mut generator), 1);
    assert_eq!(generator.voice_count(), 1, "still releasing");
    assert_eq!(
        events.try_recv().unwrap(),
        GeneratorEvent::NoteOn {
            voice,
            note: Note::C4
        }
    );
    assert!(events.try_recv().is_err());

    assert_eq!(transport.run_until(Seconds(0.52), &mut generator), 1);
    assert_eq!(generator.voice_count(), 0);
    assert!(generator.voice(voice).is_none());
    assert_eq!(transport.routes().count(), 0, "stage was disconnected");
    assert_eq!(
        events.try_recv().unwrap(),
        GeneratorEvent::NoteOff {
            voice,
            note: Note::C4
        }
    );
    assert_eq!(generator.last_note(), Some(Note::C4), "survives note-off");
}

#[test]
fn release_during_attack_starts_from_actual_level() {
    init_logging();
    let mut transport = OfflineTransport::default();
    let mut generator = generator_with(&[(ParameterId::Attack, 100.0)]);
    let voice = generator
        .note_on(Note::A4, &mut transport, Seconds::ZERO)
        .unwrap();
    assert!(generator
        .note_off(voice, &mut transport, Seconds(0.05))
        .is_ok());

    let gain = generator.voice(voice).unwrap().stage().gain().clone();
    let held = gain.value_at(Seconds(0.05));
    assert!(close(held, 0.25), "halfway up a 0.5 peak");
    assert_lt!(held, 0.5);

    // The curve up to the release is untouched, and the ramp down begins at
    // the held level rather than the nominal peak.
    assert!(close(gain.value_at(Seconds(0.025)), 0.125));
    assert!(close(gain.value_at(Seconds(0.15)), 0.125));
    assert!(close(gain.value_at(Seconds(0.25)), 0.0));
    assert!(gain
        .events()
        .iter()
        .all(|e| e.when <= Seconds(0.05) || e.value == 0.0));
}

#[test]
fn glide_follows_previous_note() {
    init_logging();
    let mut transport = OfflineTransport::default();
    let a = Note::A4;
    let b: Note = "C5".parse().unwrap();
    let f_a = EqualTemperament::default().note_to_frequency(a).0;
    let f_b = EqualTemperament::default().note_to_frequency(b).0;

    let mut generator = generator_with(&[(ParameterId::Glide, 100.0)]);
    let first = generator.note_on(a, &mut transport, Seconds::ZERO).unwrap();
    let frequency = generator.voice(first).unwrap().source().frequency().clone();
    assert!(frequency.events().is_empty(), "nothing to glide from");
    assert_eq!(frequency.value(), f_a);

    let second = generator.note_on(b, &mut transport, Seconds(1.0)).unwrap();
    let frequency = generator.voice(second).unwrap().source().frequency().clone();
    assert!(close(frequency.value_at(Seconds(1.0)), f_a));
    assert_gt!(frequency.value_at(Seconds(1.1)), f_a);
    assert_lt!(frequency.value_at(Seconds(1.1)), f_b);
    assert!(close(frequency.value_at(Seconds(1.21)), f_b));
    assert_eq!(generator.last_note(), Some(b));

    let mut generator = generator_with(&[(ParameterId::Glide, 0.0)]);
    assert!(generator.note_on(a, &mut transport, Seconds(2.0)).is_ok());
    let third = generator.note_on(b, &mut transport, Seconds(2.0)).unwrap();
    let frequency = generator.voice(third).unwrap().source().frequency().clone();
    assert!(frequency.events().is_empty());
    assert!(close(frequency.value_at(Seconds(2.0)), f_b));

    let mut generator = generator_with(&[(ParameterId::Glide, 50.0)]);
    assert!(generator.note_on(a, &mut transport, Seconds(3.0)).is_ok());
    let fourth = generator.note_on(b, &mut transport, Seconds(3.0)).unwrap();
    let frequency = generator.voice(fourth).unwrap().source().frequency().clone();
    assert!(close(frequency.value_at(Seconds(3.105)), f_b), "half the span");
}

#[test]
fn detune_updates_sounding_voices() {
    init_logging();
    let mut transport = OfflineTransport::default();
    let mut generator = Generator::default();
    let first = generator
        .note_on(Note::C4, &mut transport, Seconds::ZERO)
        .unwrap();
    let second = generator
        .note_on(Note::A4, &mut transport, Seconds::ZERO)
        .unwrap();
    assert!(generator
        .note_off(second, &mut transport, Seconds(0.5))
        .is_ok());

    assert!(generator.set_parameter(ParameterId::Finetune, 12.0).is_ok());
    assert!(generator.set_parameter(ParameterId::NoteDetune, 1.0).is_ok());
    for voice in [first, second] {
        assert_eq!(
            generator.voice(voice).unwrap().source().detune().value(),
            112.0,
            "releasing voices are still sounding"
        );
    }

    let third = generator
        .note_on(Note::C4, &mut transport, Seconds(1.0))
        .unwrap();
    assert_eq!(
        generator.voice(third).unwrap().source().detune().value(),
        112.0
    );

    let effective = generator
        .voice(third)
        .unwrap()
        .source()
        .effective_frequency_at(Seconds(1.0));
    let c4 = EqualTemperament::default().note_to_frequency(Note::C4);
    assert!(approx_eq!(
        f64,
        effective.0,
        c4.0 * 2.0f64.powf(112.0 / 1200.0),
        epsilon = 1e-9
    ));
}

#[test]
fn sequential_notes_are_independent() {
    init_logging();
    let mut transport = OfflineTransport::default();
    let mut generator = Generator::default();
    let a = generator
        .note_on(Note::C4, &mut transport, Seconds::ZERO)
        .unwrap();
    let b = generator
        .note_on(Note::C4, &mut transport, Seconds(0.1))
        .unwrap();
    assert_ne!(a, b);
    assert_eq!(generator.voice_count(), 2);
    assert_eq!(generator.voices().len(), 2);
    assert_eq!(generator.last_note(), Some(Note::C4));
    assert!(!generator
        .voice(a)
        .unwrap()
        .stage()
        .ptr_eq(generator.voice(b).unwrap().stage()));

    assert!(generator.note_off(a, &mut transport, Seconds(1.0)).is_ok());
    transport.run_until(Seconds(5.0), &mut generator);
    assert_eq!(generator.voice_count(), 1);
    assert!(generator.voice(b).is_some());
    assert!(!generator.voice(b).unwrap().is_releasing());
}

#[test]
fn misuse_is_reported() {
    init_logging();
    let mut transport = OfflineTransport::default();
    let mut generator = Generator::default();
    let voice = generator
        .note_on(Note::C4, &mut transport, Seconds::ZERO)
        .unwrap();

    assert_eq!(
        generator.note_off(VoiceUid(9999), &mut transport, Seconds(1.0)),
        Err(VoiceError::InvalidVoiceHandle(VoiceUid(9999)))
    );
    assert!(generator
        .note_off(voice, &mut transport, Seconds(1.0))
        .is_ok());
    assert_eq!(
        generator.note_off(voice, &mut transport, Seconds(1.5)),
        Err(VoiceError::AlreadyReleased(voice))
    );

    transport.run_until(Seconds(3.0), &mut generator);
    assert_eq!(
        generator.note_on(Note::C4, &mut transport, Seconds(2.0)),
        Err(VoiceError::Scheduling {
            requested: Seconds(2.0),
            current: Seconds(3.0)
        })
    );
    assert_eq!(
        generator.note_off(voice, &mut transport, Seconds(4.0)),
        Err(VoiceError::InvalidVoiceHandle(voice))
    );
    let error = generator
        .note_on(Note::C4, &mut transport, Seconds(2.0))
        .unwrap_err();
    assert!(error.to_string().contains("earliest allowed time is 3s"));
}

#[test]
fn note_on_always_precedes_note_off() {
    init_logging();
    let mut transport = OfflineTransport::default();
    let mut generator = Generator::default();
    let events = generator.subscribe();
    let voice = generator
        .note_on(Note::C4, &mut transport, Seconds(1.0))
        .unwrap();

    assert!(matches!(
        generator.note_off(voice, &mut transport, Seconds(0.5)),
        Err(VoiceError::Scheduling { .. })
    ));
    assert!(generator
        .note_off(voice, &mut transport, Seconds(1.5))
        .is_ok());

    transport.run_until(Seconds(3.0), &mut generator);
    assert_eq!(generator.voice_count(), 0);
    assert_eq!(
        events.try_iter().collect::<Vec<_>>(),
        vec![
            GeneratorEvent::NoteOn {
                voice,
                note: Note::C4
            },
            GeneratorEvent::NoteOff {
                voice,
                note: Note::C4
            }
        ]
    );
}

#[test]
fn clamped_scheduling_moves_to_now() {
    init_logging();
    let config = GeneratorConfig::from_json_str(r#"{ "scheduling": "clamp" }"#).unwrap();
    let mut generator = Generator::new_with(ParameterSet::default(), config);
    let mut transport = OfflineTransport::default();
    transport.run_until(Seconds(1.0), &mut generator);

    let voice = generator
        .note_on(Note::C4, &mut transport, Seconds(0.5))
        .unwrap();
    assert_eq!(generator.voice(voice).unwrap().start_time(), Seconds(1.0));
    assert!(generator
        .note_off(voice, &mut transport, Seconds(0.0))
        .is_ok());
    assert_eq!(
        generator.voice(voice).unwrap().release().unwrap().start,
        Seconds(1.0)
    );
}

#[test]
fn voices_route_to_configured_destination() {
    init_logging();
    let config = GeneratorConfigBuilder::default()
        .destination(Destination(7))
        .build()
        .unwrap();
    let mut generator = Generator::new_with(ParameterSet::default(), config);
    let mut transport = OfflineTransport::default();
    assert!(generator
        .note_on(Note::C4, &mut transport, Seconds::ZERO)
        .is_ok());
    assert_eq!(transport.routes().next().unwrap().1, Destination(7));
}

#[test]
fn rendered_note_is_audible_then_silent() {
    init_logging();
    let mut transport = OfflineTransport::new_with(SampleRate::new(8000));
    let mut generator = generator_with(&[
        (ParameterId::Type, 1.0),
        (ParameterId::Sustain, 0.0),
        (ParameterId::Volume, 100.0),
    ]);
    assert_eq!(generator.waveform(), Waveform::Triangle);
    assert!(generator
        .note_on(Note::A4, &mut transport, Seconds::ZERO)
        .is_ok());

    let mut buffer = vec![Sample::default(); 800];
    assert!(transport.render(&mut generator, &mut buffer));
    let peak = buffer.iter().map(|s| s.0.abs()).fold(0.0, f64::max);
    assert_gt!(peak, 0.5);
    assert!(peak <= 1.0);

    // Past the end of the release, and past the disconnect.
    let mut buffer = vec![Sample::default(); 8000];
    transport.render(&mut generator, &mut buffer);
    assert_eq!(generator.voice_count(), 0);
    let mut buffer = vec![Sample::default(); 800];
    assert!(!transport.render(&mut generator, &mut buffer));
    assert!(!transport.generate(&mut buffer));
}
