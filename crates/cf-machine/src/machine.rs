//! ClawMachine — the host-facing facade
//!
//! Single cooperative timeline: the host drives `on_frame` from its frame
//! callback and `service_music` from a short timer (or spawns the music
//! service thread). Neither blocks.

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Receiver;
use parking_lot::Mutex;

use cf_audio::{AudioHandle, SfxState, SoundEffects};
use cf_core::{CfError, CfResult, PrizeItem, PrizePool, RandomSource, RngSource};
use cf_music::{MusicEngineState, MusicSequencer, ServiceThread};
use cf_roulette::Strip;
use cf_stage::{EventBus, MachineEvent, MusicMode, SpinState, TimedEvent};

use crate::config::MachineConfig;
use crate::prefetch::{ImagePrefetcher, NoopPrefetcher};
use crate::reveal::{RevealPanel, share_text};
use crate::session::{ForcedOutcome, SpinSession};

/// One claw machine: session, audio and event feed
pub struct ClawMachine {
    config: MachineConfig,
    session: SpinSession,
    bus: EventBus,
    audio: AudioHandle,
    sfx: SoundEffects,
    music: Arc<Mutex<MusicSequencer>>,
    music_enabled: bool,
    /// Music waits for the first spin (the first user gesture)
    music_started: bool,
    prefetcher: Box<dyn ImagePrefetcher>,
    reveal: Option<RevealPanel>,
    /// Host reported the winner's reveal image loaded before the panel existed
    winner_image_loaded: bool,
    last_winner: Option<PrizeItem>,
    now_ms: f64,
    disposed: bool,
}

impl ClawMachine {
    /// Machine with entropy-seeded randomness
    pub fn new(
        items: impl IntoIterator<Item = PrizeItem>,
        config: MachineConfig,
        audio: AudioHandle,
    ) -> CfResult<Self> {
        Self::with_sources(
            items,
            config,
            audio,
            Box::new(RngSource::from_entropy()),
            Box::new(RngSource::from_entropy()),
        )
    }

    /// Machine with explicit random sources for the draw/strip and the tick pitch
    pub fn with_sources(
        items: impl IntoIterator<Item = PrizeItem>,
        config: MachineConfig,
        audio: AudioHandle,
        spin_rng: Box<dyn RandomSource>,
        tick_rng: Box<dyn RandomSource>,
    ) -> CfResult<Self> {
        let pool = PrizePool::from_items(items);
        let session = SpinSession::new(pool, &config, spin_rng)?;

        let mut sfx = SoundEffects::new(config.sfx.clone(), audio.clone(), tick_rng);
        sfx.set_enabled(config.audio.sfx_enabled);
        sfx.set_volume(config.audio.sfx_volume);

        let mut music = MusicSequencer::new(config.music.clone(), audio.clone());
        music.set_volume(config.audio.music_volume);

        log::info!(
            "Claw machine ready: {} prizes, {} tiers",
            session.pool().len(),
            session.tiers().len()
        );

        Ok(Self {
            music_enabled: config.audio.music_enabled,
            config,
            session,
            bus: EventBus::new(),
            audio,
            sfx,
            music: Arc::new(Mutex::new(music)),
            music_started: false,
            prefetcher: Box::new(NoopPrefetcher),
            reveal: None,
            winner_image_loaded: false,
            last_winner: None,
            now_ms: 0.0,
            disposed: false,
        })
    }

    pub fn with_prefetcher(mut self, prefetcher: Box<dyn ImagePrefetcher>) -> Self {
        self.prefetcher = prefetcher;
        self
    }

    // ═══════════════════════════════════════════════════════════════════════
    // EVENT FEED
    // ═══════════════════════════════════════════════════════════════════════

    /// New subscriber to the event feed
    pub fn subscribe(&mut self) -> Receiver<TimedEvent> {
        self.bus.subscribe()
    }

    fn publish(&mut self, event: MachineEvent) {
        self.bus.publish(event, self.now_ms);
    }

    /// Drop-rate table as events, lowest tier first
    pub fn drop_rates(&self) -> Vec<MachineEvent> {
        self.session
            .tiers()
            .iter()
            .map(|tier| MachineEvent::DropRate {
                label: tier.label.clone(),
                tag: tier.tag.clone(),
                probability: tier.probability,
            })
            .collect()
    }

    /// Publish the drop rates (and `PoolUnavailable` for an empty pool)
    pub fn announce(&mut self) {
        for event in self.drop_rates() {
            self.publish(event);
        }
        if self.session.pool().is_empty() {
            self.publish(MachineEvent::PoolUnavailable);
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // SPIN LIFECYCLE
    // ═══════════════════════════════════════════════════════════════════════

    /// Request a spin. Ignored while a spin is in flight.
    ///
    /// Returns true if a spin started.
    pub fn request_spin(&mut self) -> bool {
        self.start_spin(None)
    }

    /// Request a spin with a predetermined outcome
    pub fn request_spin_forced(&mut self, outcome: ForcedOutcome) -> bool {
        self.start_spin(Some(&outcome))
    }

    /// Spin again from the reveal
    pub fn play_again(&mut self) -> bool {
        if self.session.state() != SpinState::Revealed {
            return false;
        }
        self.start_spin(None)
    }

    fn start_spin(&mut self, forced: Option<&ForcedOutcome>) -> bool {
        if self.disposed {
            return false;
        }

        match self.session.begin(forced) {
            Ok(Some(started)) => {
                if let Some(winner) = self.session.winner() {
                    let image_ref = winner.reveal_image_ref().to_string();
                    if let Err(e) = self.prefetcher.prefetch(&image_ref) {
                        log::debug!("Prefetch of {} failed: {}", image_ref, e);
                    }
                }
                self.reveal = None;
                self.winner_image_loaded = false;
                self.ensure_music();
                self.publish(started);
                self.sync_music_mode();
                true
            }
            Ok(None) => false,
            Err(CfError::EmptyPool) => {
                log::warn!("Spin refused: no prizes available");
                self.publish(MachineEvent::PoolUnavailable);
                false
            }
            Err(e) => {
                log::error!("Spin failed: {}", e);
                false
            }
        }
    }

    /// Abort the spin in flight
    pub fn cancel_spin(&mut self) -> bool {
        if !self.session.cancel() {
            return false;
        }
        self.reveal = None;
        self.publish(MachineEvent::SpinCancelled);
        self.sync_music_mode();
        true
    }

    /// Close the reveal panel
    pub fn dismiss(&mut self) -> bool {
        if !self.session.dismiss() {
            return false;
        }
        self.reveal = None;
        true
    }

    /// Host frame callback
    pub fn on_frame(&mut self, now_ms: f64) {
        if self.disposed {
            return;
        }
        self.now_ms = now_ms;

        for event in self.session.tick(now_ms) {
            match &event {
                MachineEvent::CenterCrossed { .. } => {
                    self.sfx.on_center_crossed(now_ms);
                    self.publish(event);
                }
                MachineEvent::Settled { winner, .. } => {
                    let mut panel = RevealPanel::new(winner.clone());
                    if self.winner_image_loaded {
                        panel.mark_loaded(winner.reveal_image_ref());
                    }
                    self.reveal = Some(panel);
                    self.last_winner = Some(winner.clone());
                    self.publish(event);
                    self.sfx.on_settled();
                    self.sync_music_mode();
                }
                MachineEvent::RevealReady { .. } => {
                    if let Some(panel) = self.reveal.as_mut() {
                        panel.open();
                    }
                    self.publish(event);
                }
                _ => self.publish(event),
            }
        }
    }

    /// Share the last revealed prize. Returns the share text.
    pub fn request_share(&mut self) -> Option<String> {
        let winner = self.last_winner.as_ref()?;
        let text = share_text(&self.config.share_template, winner);
        self.publish(MachineEvent::ShareRequested { text: text.clone() });
        Some(text)
    }

    /// Host reports an image finished loading.
    ///
    /// A load of the winner's reveal image during the spin is kept and
    /// applied to the panel at settlement. Returns true if it was the
    /// winner's image.
    pub fn image_loaded(&mut self, image_ref: &str) -> bool {
        if let Some(panel) = self.reveal.as_mut() {
            return panel.mark_loaded(image_ref);
        }
        let is_winner_image = self.session.state() == SpinState::Spinning
            && self
                .session
                .winner()
                .is_some_and(|winner| winner.reveal_image_ref() == image_ref);
        if is_winner_image {
            self.winner_image_loaded = true;
        }
        is_winner_image
    }

    /// Fresh pre-spin preview strip
    pub fn idle_preview(&mut self) -> CfResult<Strip> {
        self.session.idle_preview()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // AUDIO
    // ═══════════════════════════════════════════════════════════════════════

    fn ensure_music(&mut self) {
        if self.music_started {
            return;
        }
        self.music_started = true;
        if self.music_enabled {
            self.music.lock().start();
        }
    }

    /// Follow the session state with the music pattern
    fn sync_music_mode(&mut self) {
        let mode = MusicMode::for_state(self.session.state());
        let changed = self.music.lock().set_mode(mode);
        if changed {
            self.publish(MachineEvent::ModeChanged { mode });
        }
    }

    pub fn set_sfx_enabled(&mut self, enabled: bool) {
        self.sfx.set_enabled(enabled);
    }

    pub fn set_sfx_volume(&mut self, volume: f32) {
        self.sfx.set_volume(volume);
    }

    /// Toggle music. Turning it on before the first spin only arms it.
    pub fn set_music_enabled(&mut self, enabled: bool) {
        if self.disposed {
            return;
        }
        self.music_enabled = enabled;
        let mut music = self.music.lock();
        if !enabled {
            music.stop();
        } else if self.music_started {
            music.start();
        }
    }

    pub fn set_music_volume(&mut self, volume: f32) {
        if self.disposed {
            return;
        }
        self.music.lock().set_volume(volume);
    }

    /// Music look-ahead tick; call every `music.service_interval_ms`
    pub fn service_music(&mut self) -> usize {
        if self.disposed {
            return 0;
        }
        self.music.lock().service()
    }

    /// Drive the music from a background thread instead of `service_music`
    pub fn spawn_music_service(&self) -> CfResult<ServiceThread> {
        ServiceThread::spawn(
            Arc::clone(&self.music),
            Duration::from_millis(self.config.music.service_interval_ms),
        )
    }

    /// Stop everything and release the audio graph
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.session.cancel();
        self.music.lock().dispose();
        self.audio.close();
        self.disposed = true;
        log::info!("Claw machine disposed");
    }

    // ═══════════════════════════════════════════════════════════════════════
    // STATE
    // ═══════════════════════════════════════════════════════════════════════

    pub fn state(&self) -> SpinState {
        self.session.state()
    }

    pub fn session(&self) -> &SpinSession {
        &self.session
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn reveal(&self) -> Option<&RevealPanel> {
        self.reveal.as_ref()
    }

    pub fn last_winner(&self) -> Option<&PrizeItem> {
        self.last_winner.as_ref()
    }

    pub fn sfx_state(&self) -> SfxState {
        *self.sfx.state()
    }

    pub fn music_state(&self) -> MusicEngineState {
        *self.music.lock().state()
    }

    pub fn audio(&self) -> &AudioHandle {
        &self.audio
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_audio::{Bus, OfflineProbe, Waveform};
    use cf_core::SequenceSource;

    const FRAME_MS: f64 = 1000.0 / 60.0;

    fn items() -> Vec<PrizeItem> {
        vec![
            PrizeItem::new("a", "a.png", 0.5).with_name("Pikachu"),
            PrizeItem::new("b", "b.png", 5.0),
            PrizeItem::new("c", "c.png", 20.0).with_full_image("c-large.png"),
            PrizeItem::new("d", "d.png", 75.0),
        ]
    }

    fn offline_machine() -> (ClawMachine, Arc<Mutex<Option<OfflineProbe>>>) {
        let (audio, probe) = AudioHandle::offline(8000);
        let machine = ClawMachine::with_sources(
            items(),
            MachineConfig::default(),
            audio,
            Box::new(RngSource::seeded(21)),
            Box::new(RngSource::seeded(22)),
        )
        .unwrap();
        (machine, probe)
    }

    fn run_frames(machine: &mut ClawMachine, start: f64, until: f64) -> f64 {
        let mut now = start;
        while now <= until {
            machine.on_frame(now);
            now += FRAME_MS;
        }
        now
    }

    fn drain(rx: &Receiver<TimedEvent>) -> Vec<MachineEvent> {
        rx.try_iter().map(|t| t.event).collect()
    }

    #[test]
    fn test_announce_drop_rates() {
        let (mut machine, _) = offline_machine();
        let rx = machine.subscribe();
        machine.announce();
        let events = drain(&rx);
        assert_eq!(events.len(), 4);
        assert_eq!(
            events[0],
            MachineEvent::DropRate {
                label: "$0 – $1".into(),
                tag: "Common".into(),
                probability: 0.45
            }
        );
    }

    #[test]
    fn test_empty_pool_reports_unavailable() {
        let mut machine =
            ClawMachine::new(Vec::new(), MachineConfig::default(), AudioHandle::disabled())
                .unwrap();
        let rx = machine.subscribe();
        assert!(!machine.request_spin());
        assert_eq!(machine.state(), SpinState::Idle);
        assert_eq!(drain(&rx), vec![MachineEvent::PoolUnavailable]);

        machine.announce();
        assert_eq!(drain(&rx).last(), Some(&MachineEvent::PoolUnavailable));
    }

    #[test]
    fn test_spin_event_order() {
        let (mut machine, _) = offline_machine();
        let rx = machine.subscribe();

        assert!(machine.request_spin());
        assert!(!machine.request_spin());
        run_frames(&mut machine, 0.0, 5600.0);

        let events = drain(&rx);
        let names: Vec<&str> = events.iter().map(|e| e.type_name()).collect();
        assert_eq!(names[0], "spin_started");
        assert_eq!(events[1], MachineEvent::ModeChanged { mode: MusicMode::Spin });

        let settled = names.iter().position(|n| *n == "settled").unwrap();
        assert!(names[2..settled].iter().all(|n| *n == "center_crossed"));
        assert_eq!(
            events[settled - 1],
            MachineEvent::CenterCrossed { index: 48 }
        );
        assert_eq!(events[settled + 1], MachineEvent::ModeChanged { mode: MusicMode::Idle });
        assert_eq!(names[settled + 2], "reveal_ready");
        assert_eq!(names.len(), settled + 3);

        assert_eq!(machine.state(), SpinState::Revealed);
        assert!(machine.reveal().unwrap().is_open());
        assert_eq!(machine.music_state().mode, MusicMode::Idle);
    }

    #[test]
    fn test_chime_follows_settle() {
        let (mut machine, slot) = offline_machine();
        machine.request_spin();
        let probe = slot.lock().clone().unwrap();

        let mut now = 0.0;
        while machine.state() == SpinState::Spinning {
            machine.on_frame(now);
            now += FRAME_MS;
            if machine.state() == SpinState::Spinning {
                let chimes = probe
                    .scheduled()
                    .iter()
                    .filter(|t| t.bus == Bus::Direct && t.waveform == Waveform::Triangle)
                    .count();
                assert_eq!(chimes, 0);
            }
        }
        let chimes: Vec<f32> = probe
            .scheduled()
            .iter()
            .filter(|t| t.bus == Bus::Direct && t.waveform == Waveform::Triangle)
            .map(|t| t.frequency)
            .collect();
        assert_eq!(chimes, vec![523.0, 659.0, 784.0, 1047.0]);

        let ticks = probe
            .scheduled()
            .iter()
            .filter(|t| t.bus == Bus::Direct && t.waveform == Waveform::Sine)
            .count();
        assert!(ticks > 0);
    }

    #[test]
    fn test_music_starts_on_first_spin() {
        let (mut machine, slot) = offline_machine();
        assert!(!machine.music_state().playing);
        machine.set_music_enabled(true);
        assert!(!machine.music_state().playing);
        assert!(slot.lock().is_none());

        machine.request_spin();
        assert!(machine.music_state().playing);
        let probe = slot.lock().clone().unwrap();
        assert!(probe.scheduled().iter().any(|t| t.bus == Bus::Melody));

        machine.set_music_enabled(false);
        assert!(!machine.music_state().playing);
        machine.set_music_enabled(true);
        assert!(machine.music_state().playing);
    }

    #[test]
    fn test_cancel_and_restart() {
        let (mut machine, _) = offline_machine();
        let rx = machine.subscribe();
        machine.request_spin();
        run_frames(&mut machine, 0.0, 1000.0);

        assert!(machine.cancel_spin());
        assert!(!machine.cancel_spin());
        assert_eq!(machine.state(), SpinState::Idle);
        let events = drain(&rx);
        let tail: Vec<&str> = events.iter().rev().take(2).map(|e| e.type_name()).collect();
        assert_eq!(tail, vec!["mode_changed", "spin_cancelled"]);

        run_frames(&mut machine, 1000.0, 7000.0);
        assert!(drain(&rx).is_empty());

        assert!(machine.request_spin());
        run_frames(&mut machine, 7000.0, 13_000.0);
        assert_eq!(machine.state(), SpinState::Revealed);
    }

    #[test]
    fn test_play_again_and_dismiss() {
        let (mut machine, _) = offline_machine();
        assert!(!machine.play_again());
        machine.request_spin();
        assert!(!machine.play_again());
        run_frames(&mut machine, 0.0, 5500.0);
        assert_eq!(machine.state(), SpinState::Revealed);

        assert!(machine.play_again());
        assert_eq!(machine.state(), SpinState::Spinning);
        assert!(machine.reveal().is_none());
        run_frames(&mut machine, 6000.0, 11_500.0);

        assert!(machine.dismiss());
        assert_eq!(machine.state(), SpinState::Idle);
        assert!(machine.reveal().is_none());
        assert!(machine.last_winner().is_some());
    }

    #[test]
    fn test_share_and_prefetch() {
        let fetched = Arc::new(Mutex::new(Vec::<String>::new()));
        let log = Arc::clone(&fetched);
        let (audio, _) = AudioHandle::offline(8000);
        let mut machine = ClawMachine::with_sources(
            items(),
            MachineConfig::default(),
            audio,
            Box::new(SequenceSource::new([0.8, 0.0]).with_fallback(0.5)),
            Box::new(RngSource::seeded(1)),
        )
        .unwrap()
        .with_prefetcher(Box::new(move |image_ref: &str| -> CfResult<()> {
            log.lock().push(image_ref.to_string());
            Err(CfError::InvalidConfig("offline".into()))
        }));

        assert_eq!(machine.request_share(), None);
        machine.request_spin();
        assert_eq!(fetched.lock().as_slice(), ["c-large.png".to_string()]);

        run_frames(&mut machine, 0.0, 5500.0);
        let panel = machine.reveal().unwrap();
        assert_eq!(panel.winner().id, "c");
        assert_eq!(panel.display_image(), None);
        assert!(machine.image_loaded("c-large.png"));
        assert_eq!(machine.reveal().unwrap().display_image(), Some("c-large.png"));

        let rx = machine.subscribe();
        let text = machine.request_share().unwrap();
        assert_eq!(text, "I just pulled c from the ClawForge machine!");
        assert_eq!(drain(&rx), vec![MachineEvent::ShareRequested { text }]);
    }

    #[test]
    fn test_image_loaded_during_spin_reaches_panel() {
        let (audio, _) = AudioHandle::offline(8000);
        let mut machine = ClawMachine::with_sources(
            items(),
            MachineConfig::default(),
            audio,
            Box::new(SequenceSource::new([0.8, 0.0]).with_fallback(0.5)),
            Box::new(RngSource::seeded(1)),
        )
        .unwrap();
        let rx = machine.subscribe();

        assert!(!machine.image_loaded("c-large.png"));
        machine.request_spin();
        machine.on_frame(0.0);
        machine.on_frame(FRAME_MS);
        assert!(!machine.image_loaded("a.png"));
        assert!(machine.image_loaded("c-large.png"));
        assert!(machine.reveal().is_none());

        let mut now = 2.0 * FRAME_MS;
        while !drain(&rx).iter().any(|e| e.type_name() == "reveal_ready") {
            machine.on_frame(now);
            now += FRAME_MS;
            assert!(now < 10_000.0);
        }
        let panel = machine.reveal().unwrap();
        assert!(panel.is_open());
        assert_eq!(panel.display_image(), Some("c-large.png"));

        // next spin starts over with the placeholder
        assert!(machine.play_again());
        let mut now = now + 1000.0;
        while machine.state() == SpinState::Spinning {
            machine.on_frame(now);
            now += FRAME_MS;
        }
        assert_eq!(machine.reveal().unwrap().display_image(), None);
    }

    #[test]
    fn test_disabled_audio_still_spins() {
        let mut machine = ClawMachine::with_sources(
            items(),
            MachineConfig::default(),
            AudioHandle::disabled(),
            Box::new(RngSource::seeded(3)),
            Box::new(RngSource::seeded(4)),
        )
        .unwrap();
        assert!(machine.request_spin());
        assert!(!machine.music_state().playing);
        run_frames(&mut machine, 0.0, 5500.0);
        assert_eq!(machine.state(), SpinState::Revealed);
        assert_eq!(machine.service_music(), 0);
    }

    #[test]
    fn test_settings_and_dispose() {
        let (mut machine, slot) = offline_machine();
        machine.set_sfx_volume(1.7);
        assert_eq!(machine.sfx_state().volume, 1.0);
        machine.set_sfx_enabled(false);
        assert!(!machine.sfx_state().enabled);
        machine.set_music_volume(0.25);
        assert_eq!(machine.music_state().volume, 0.25);

        machine.request_spin();
        let probe = slot.lock().clone().unwrap();
        machine.dispose();
        assert!(machine.is_disposed());
        assert!(probe.is_closed());
        assert_eq!(machine.state(), SpinState::Idle);
        assert!(!machine.request_spin());
        machine.on_frame(100.0);
        assert_eq!(machine.service_music(), 0);
    }
}
