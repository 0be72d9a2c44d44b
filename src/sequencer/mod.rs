//! Playback of a merged timeline against a tempo map.
//!
//! The [`Sequencer`] owns all mutable playback state. It never blocks: a
//! host calls [`Sequencer::process_tick`] on a fixed cadence and every
//! public operation runs to completion before returning.

mod dispatch;
mod fast_forward;
mod listeners;
mod notes;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{Result, SequencerError};
use crate::output::{CommandEmitter, CommandSink};
use crate::recording::{LoopWindow, Recording};
use crate::timing::{
    PlaybackClock, TempoMap, TimeSource, Timeline, Transport, default_seconds_per_tick,
    format_time,
};

pub use fast_forward::{ChannelLatch, SeekTarget};
pub use listeners::{ListenerId, SequencerListener};
pub use notes::{SoundingNote, SoundingNotes};

use listeners::Listeners;

struct Prepared {
    name: String,
    timeline: Arc<Timeline>,
    tempo_map: TempoMap,
    duration: f64,
    loop_window: LoopWindow,
}

fn prepare(recording: Recording) -> Result<Prepared> {
    if recording.tracks.is_empty() {
        return Err(SequencerError::NoTracks);
    }
    if recording.time_division == 0 {
        return Err(SequencerError::InvalidTimeDivision(recording.time_division));
    }

    let timeline = Timeline::build(recording.tracks);
    let last_tick = timeline.last_tick().ok_or(SequencerError::EmptyTimeline)?;
    let tempo_map = TempoMap::new(recording.tempo_changes, recording.time_division);
    let duration = tempo_map.ticks_to_seconds(last_tick);

    info!(
        "Loaded \"{}\": {} events, total time {}",
        recording.name,
        timeline.len(),
        format_time(duration)
    );

    Ok(Prepared {
        name: recording.name,
        timeline: Arc::new(timeline),
        tempo_map,
        duration,
        loop_window: recording.loop_window,
    })
}

pub struct Sequencer<S: CommandSink, T: TimeSource> {
    name: String,
    timeline: Arc<Timeline>,
    tempo_map: TempoMap,
    duration: f64,
    emitter: CommandEmitter<S>,
    clock: PlaybackClock<T>,
    /// Next unprocessed timeline index.
    event_index: usize,
    /// Time of `timeline[event_index]`, integrated with the tempo seen so far.
    played_time: f64,
    seconds_per_tick: f64,
    sounding: SoundingNotes,
    listeners: Listeners,
    loop_enabled: bool,
    loop_window: LoopWindow,
}

impl<S: CommandSink, T: TimeSource> Sequencer<S, T> {
    /// Fails without tracks, without events or with a zero time division.
    /// The new sequencer is paused at 0.
    pub fn new(recording: Recording, sink: S, time_source: T) -> Result<Self> {
        let prepared = prepare(recording)?;
        let seconds_per_tick = default_seconds_per_tick(prepared.tempo_map.time_division());

        Ok(Self {
            name: prepared.name,
            timeline: prepared.timeline,
            tempo_map: prepared.tempo_map,
            duration: prepared.duration,
            emitter: CommandEmitter::new(sink),
            clock: PlaybackClock::new(time_source),
            event_index: 0,
            played_time: 0.0,
            seconds_per_tick,
            sounding: SoundingNotes::new(),
            listeners: Listeners::default(),
            loop_enabled: true,
            loop_window: prepared.loop_window,
        })
    }

    /// Replaces the sequence in place. On error the current sequence is
    /// left untouched.
    pub fn load_recording(&mut self, recording: Recording) -> Result<()> {
        let prepared = prepare(recording)?;

        self.stop();
        self.sounding.clear();
        self.name = prepared.name;
        self.timeline = prepared.timeline;
        self.tempo_map = prepared.tempo_map;
        self.duration = prepared.duration;
        self.loop_window = prepared.loop_window;
        self.event_index = 0;
        self.played_time = 0.0;
        self.seconds_per_tick = default_seconds_per_tick(self.tempo_map.time_division());
        self.clock.pause_at(0.0);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn tempo_map(&self) -> &TempoMap {
        &self.tempo_map
    }

    pub fn time_division(&self) -> u16 {
        self.tempo_map.time_division()
    }

    pub fn ticks_to_seconds(&self, tick: u64) -> f64 {
        self.tempo_map.ticks_to_seconds(tick)
    }

    pub fn current_time(&self) -> f64 {
        self.clock.current_time()
    }

    /// Seeks by time. Values outside `[0, duration]` snap to 0.
    pub fn set_current_time(&mut self, time: f64) {
        let time = if time.is_finite() && (0.0..=self.duration).contains(&time) {
            time
        } else {
            debug!("seek target {time} out of range, snapping to 0");
            0.0
        };

        self.stop();
        self.sounding.clear();
        self.clock.clear_pause();
        self.play_to(SeekTarget::Time(time));
        self.clock.anchor_at(time);
        self.resume();
        self.listeners.time_changed(time);
    }

    /// Tick-precise seek.
    pub fn set_time_ticks(&mut self, tick: u64) {
        self.stop();
        self.sounding.clear();
        self.clock.clear_pause();
        self.play_to(SeekTarget::Ticks(tick));

        let Some(next) = self.timeline.get(self.event_index) else {
            // Nothing left to play past the target.
            debug!("tick seek to {tick} is past the last event");
            self.clock.pause_at(self.duration);
            self.listeners.time_changed(self.duration);
            return;
        };

        // `played_time` is the next event's time; back off to the tick itself.
        let time = if next.tick > tick {
            self.played_time - self.seconds_per_tick * (next.tick - tick) as f64
        } else {
            self.played_time
        };
        self.clock.anchor_at(time);
        self.resume();
        let time = self.current_time();
        self.listeners.time_changed(time);
    }

    pub fn playback_rate(&self) -> f64 {
        self.clock.playback_rate()
    }

    /// `rate` must be positive. Takes effect on the next time read.
    pub fn set_playback_rate(&mut self, rate: f64) {
        self.clock.set_playback_rate(rate);
    }

    pub fn loop_enabled(&self) -> bool {
        self.loop_enabled
    }

    pub fn set_loop(&mut self, enabled: bool) {
        self.loop_enabled = enabled;
    }

    pub fn loop_window(&self) -> LoopWindow {
        self.loop_window
    }

    pub fn set_loop_window(&mut self, window: LoopWindow) {
        self.loop_window = window;
    }

    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn transport(&self) -> Transport {
        self.clock.transport()
    }

    pub fn event_index(&self) -> usize {
        self.event_index
    }

    pub fn sounding_notes(&self) -> &SoundingNotes {
        &self.sounding
    }

    pub fn add_listener(&mut self, listener: Box<dyn SequencerListener>) -> ListenerId {
        self.listeners.add(listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> Option<Box<dyn SequencerListener>> {
        self.listeners.remove(id)
    }

    /// Starts or resumes playback. A finished sequence, or `reset_time`,
    /// restarts from 0.
    pub fn play(&mut self, reset_time: bool) {
        if reset_time || self.current_time() >= self.duration {
            self.set_current_time(0.0);
            return;
        }
        if self.clock.is_running() {
            debug!("already playing");
            return;
        }
        self.resume();
    }

    pub fn pause(&mut self) {
        if self.clock.is_paused() {
            warn!("Already paused");
            return;
        }
        let time = self.current_time();
        self.stop();
        self.clock.pause_at(time);
        debug!("paused at {time:.3}s");
    }

    /// Deregisters the timer and silences every channel. Pause state and
    /// position are kept.
    pub fn stop(&mut self) {
        self.clock.stop();
        self.emitter.silence_all();
    }

    /// Restores the sounding notes and registers the timer.
    fn resume(&mut self) {
        for note in self.sounding.iter() {
            self.emitter.note_on(note.channel, note.key, note.velocity);
        }
        self.clock.start();
    }

    /// Timeline exhausted with looping off.
    fn finish(&mut self) {
        let time = self.current_time().min(self.duration);
        self.stop();
        self.clock.pause_at(time);
        debug!("reached end of \"{}\" at {time:.3}s", self.name);
    }
}
