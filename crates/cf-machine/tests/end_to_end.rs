//! Full machine runs against the offline audio output

use std::io::Cursor;

use approx::assert_relative_eq;

use cf_audio::{AudioHandle, Bus, write_wav_to};
use cf_core::{PrizeItem, PrizePool, RngSource, SequenceSource};
use cf_machine::{ClawMachine, ForcedOutcome, MachineConfig, SpinSession};
use cf_stage::{EventTrace, MachineEvent, MusicMode, SpinState};

const FRAME_MS: f64 = 1000.0 / 60.0;

fn pool() -> Vec<PrizeItem> {
    vec![
        PrizeItem::new("common", "common.png", 0.50).with_name("Magikarp"),
        PrizeItem::new("uncommon", "uncommon.png", 5.0).with_name("Eevee"),
        PrizeItem::new("rare", "rare.png", 20.0)
            .with_name("Gengar")
            .with_full_image("rare-full.png"),
        PrizeItem::new("ultra", "ultra.png", 75.0).with_name("Charizard"),
    ]
}

#[test]
fn test_full_spin_with_audio() {
    let (audio, slot) = AudioHandle::offline(8000);
    let mut machine = ClawMachine::with_sources(
        pool(),
        MachineConfig::default(),
        audio,
        Box::new(SequenceSource::new([0.8, 0.0]).with_fallback(0.5)),
        Box::new(RngSource::seeded(7)),
    )
    .unwrap();
    let rx = machine.subscribe();
    let mut trace = EventTrace::new();

    machine.announce();
    assert!(machine.request_spin());

    let strip = machine.session().strip().unwrap().clone();
    assert_eq!(strip.len(), 60);
    assert_eq!(strip.get(48).unwrap().id, "rare");

    let probe = slot.lock().clone().unwrap();
    let mut now = 0.0;
    while now < 6000.0 {
        machine.on_frame(now);
        probe.advance(FRAME_MS / 1000.0);
        machine.service_music();
        now += FRAME_MS;
    }
    trace.drain_from(&rx);

    assert_eq!(trace.events_by_type("drop_rate").len(), 4);
    let started = trace.position_of("spin_started").unwrap();
    let settled = trace.position_of("settled").unwrap();
    let reveal = trace.position_of("reveal_ready").unwrap();
    assert!(started < settled && settled < reveal);

    let crossings = trace.center_indices();
    assert!(crossings.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(crossings.last(), Some(&48));
    assert!(crossings.len() <= 48);

    match &trace.events[settled].event {
        MachineEvent::Settled { winner, index } => {
            assert_eq!(winner.id, "rare");
            assert_eq!(*index, 48);
        }
        other => panic!("expected settled, got {other:?}"),
    }
    assert_eq!(machine.state(), SpinState::Revealed);
    assert_relative_eq!(machine.session().offset(), machine.session().clock().target());
    assert_eq!(machine.music_state().mode, MusicMode::Idle);
    assert!(machine.music_state().playing);

    let tones = probe.scheduled();
    assert!(tones.iter().any(|t| t.bus == Bus::Melody));
    assert!(tones.iter().any(|t| t.bus == Bus::Bass));
    assert!(tones.iter().any(|t| t.bus == Bus::Direct));

    let samples = probe.take_samples();
    assert!(!samples.is_empty());
    assert!(samples.iter().all(|s| (-1.0..=1.0).contains(s)));
    assert!(samples.iter().any(|s| s.abs() > 1e-4));

    let mut wav = Cursor::new(Vec::new());
    write_wav_to(&mut wav, &samples, probe.sample_rate()).unwrap();
    assert!(wav.get_ref().len() > samples.len() * 4);

    assert_eq!(
        machine.request_share().as_deref(),
        Some("I just pulled Gengar from the ClawForge machine!")
    );

    machine.dispose();
    assert!(probe.is_closed());
}

#[test]
fn test_forced_item_spin() {
    let mut machine = ClawMachine::with_sources(
        pool(),
        MachineConfig::default(),
        AudioHandle::disabled(),
        Box::new(RngSource::seeded(11)),
        Box::new(RngSource::seeded(12)),
    )
    .unwrap();

    assert!(machine.request_spin_forced(ForcedOutcome::Item("ultra".into())));
    let mut now = 0.0;
    while machine.state() == SpinState::Spinning {
        machine.on_frame(now);
        now += FRAME_MS;
    }
    assert_eq!(machine.last_winner().unwrap().id, "ultra");

    assert!(machine.dismiss());
    assert!(!machine.request_spin_forced(ForcedOutcome::Item("missing".into())));
    assert_eq!(machine.state(), SpinState::Idle);
}

#[test]
fn test_tier_frequencies_follow_drop_rates() {
    let config = MachineConfig::default();
    let mut session = SpinSession::new(
        PrizePool::from_items(pool()),
        &config,
        Box::new(RngSource::seeded(2024)),
    )
    .unwrap();

    const SPINS: usize = 20_000;
    let mut counts = [0usize; 4];
    for _ in 0..SPINS {
        session.begin(None).unwrap().unwrap();
        counts[session.selection().unwrap().tier_index] += 1;
        session.cancel();
    }

    for (tier, count) in session.tiers().iter().zip(counts) {
        let observed = count as f64 / SPINS as f64;
        assert!(
            (observed - tier.probability).abs() < 0.02,
            "tier {} observed {:.3}, expected {:.2}",
            tier.tag,
            observed,
            tier.probability
        );
    }
}

#[test]
fn test_config_file_drives_machine() {
    let json = r#"{
        "timing": { "profile": "turbo", "spin_duration_ms": 2500.0, "reveal_delay_ms": 200.0 },
        "audio": { "music_enabled": false, "sfx_volume": 0.5 },
        "share_template": "Got {name}"
    }"#;
    let config = MachineConfig::from_json_str(json).unwrap();
    let mut machine = ClawMachine::with_sources(
        pool(),
        config,
        AudioHandle::disabled(),
        Box::new(RngSource::seeded(5)),
        Box::new(RngSource::seeded(6)),
    )
    .unwrap();
    assert_eq!(machine.sfx_state().volume, 0.5);

    machine.request_spin();
    let mut now = 0.0;
    while now < 2800.0 {
        machine.on_frame(now);
        now += FRAME_MS;
    }
    assert_eq!(machine.state(), SpinState::Revealed);
    assert!(machine.reveal().unwrap().is_open());
    assert!(!machine.music_state().playing);
    assert!(machine.request_share().unwrap().starts_with("Got "));
}
