//! Device output through cpal
//!
//! `cpal::Stream` is not `Send`, so the stream lives on its own thread.
//! Tones and gain changes reach the callback through an rtrb ring buffer;
//! the audio clock is the callback's sample counter.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::JoinHandle;

use cpal::SampleFormat;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Sender, bounded};
use rtrb::{Producer, RingBuffer};

use crate::error::{AudioError, AudioResult};
use crate::mixer::Mixer;
use crate::output::AudioOutput;
use crate::tone::{GainStage, Tone};

/// Command slots between the scheduler and the callback
const COMMAND_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy)]
enum Command {
    Play(Tone),
    Gain(GainStage, f32, Option<f64>),
}

/// Default output device driven by a [`Mixer`]
pub struct CpalOutput {
    commands: Producer<Command>,
    clock: Arc<AtomicU64>,
    sample_rate: u32,
    stop: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl CpalOutput {
    /// Open the default output device and start its stream
    pub fn open() -> AudioResult<Self> {
        let (producer, mut consumer) = RingBuffer::<Command>::new(COMMAND_CAPACITY);
        let clock = Arc::new(AtomicU64::new(0));
        let callback_clock = Arc::clone(&clock);
        let (ready_tx, ready_rx) = bounded::<AudioResult<u32>>(1);
        let (stop_tx, stop_rx) = bounded::<()>(1);

        let thread = std::thread::Builder::new()
            .name("clawforge-audio".into())
            .spawn(move || {
                let built = (|| -> AudioResult<(cpal::Stream, u32)> {
                    let host = cpal::default_host();
                    let device = host.default_output_device().ok_or(AudioError::NoDevice)?;
                    let supported = device
                        .default_output_config()
                        .map_err(|e| AudioError::ConfigError(e.to_string()))?;
                    if supported.sample_format() != SampleFormat::F32 {
                        return Err(AudioError::ConfigError(format!(
                            "unsupported sample format {:?}",
                            supported.sample_format()
                        )));
                    }

                    let sample_rate = supported.sample_rate().0;
                    let channels = supported.channels() as usize;
                    let config = supported.config();
                    let mut mixer = Mixer::new(sample_rate);

                    let stream = device
                        .build_output_stream(
                            &config,
                            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                                while let Ok(command) = consumer.pop() {
                                    match command {
                                        Command::Play(tone) => {
                                            mixer.schedule(tone);
                                        }
                                        Command::Gain(stage, value, tau) => {
                                            mixer.set_gain(stage, value, tau)
                                        }
                                    }
                                }
                                mixer.render(data, channels);
                                callback_clock.store(mixer.samples(), Ordering::Release);
                            },
                            move |err| {
                                log::error!("Audio output stream error: {}", err);
                            },
                            None,
                        )
                        .map_err(|e| AudioError::StreamBuildError(e.to_string()))?;
                    stream
                        .play()
                        .map_err(|e| AudioError::StreamError(e.to_string()))?;
                    Ok((stream, sample_rate))
                })();

                match built {
                    Ok((stream, sample_rate)) => {
                        let _ = ready_tx.send(Ok(sample_rate));
                        // Keep the stream alive until stopped or the output is dropped
                        let _ = stop_rx.recv();
                        drop(stream);
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                    }
                }
            })
            .map_err(|e| AudioError::StreamError(e.to_string()))?;

        let sample_rate = ready_rx
            .recv()
            .map_err(|e| AudioError::StreamError(e.to_string()))??;

        log::info!("Audio device output started at {} Hz", sample_rate);

        Ok(Self {
            commands: producer,
            clock,
            sample_rate,
            stop: Some(stop_tx),
            thread: Some(thread),
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn send(&mut self, command: Command) {
        if self.stop.is_none() {
            return;
        }
        if self.commands.push(command).is_err() {
            log::warn!("Audio command queue full, dropping {:?}", command);
        }
    }
}

impl AudioOutput for CpalOutput {
    fn now(&self) -> f64 {
        self.clock.load(Ordering::Acquire) as f64 / self.sample_rate.max(1) as f64
    }

    fn play(&mut self, tone: Tone) {
        self.send(Command::Play(tone));
    }

    fn set_gain(&mut self, stage: GainStage, value: f32, time_constant: Option<f64>) {
        self.send(Command::Gain(stage, value, time_constant));
    }

    fn close(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for CpalOutput {
    fn drop(&mut self) {
        self.close();
    }
}
