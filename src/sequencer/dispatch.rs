use std::sync::Arc;

use tracing::{debug, trace, warn};

use super::Sequencer;
use crate::events::{EventKind, MetaKind, TimedEvent};
use crate::output::CommandSink;
use crate::timing::{TimeSource, seconds_per_tick};

const SYSTEM_EXCLUSIVE: u8 = 0xF0;

impl<S: CommandSink, T: TimeSource> Sequencer<S, T> {
    /// One timer invocation: releases every event whose time has been
    /// reached, in timeline order, then handles loop wrap or the end of
    /// the sequence. Does nothing unless the timer is registered.
    pub fn process_tick(&mut self) {
        if !self.clock.is_running() {
            return;
        }
        if self.event_index >= self.timeline.len() {
            self.end_of_sequence();
            return;
        }

        let timeline = Arc::clone(&self.timeline);
        let events = timeline.events();

        while self.played_time <= self.clock.current_time() {
            let event = &events[self.event_index];
            self.process_event(event);
            self.event_index += 1;

            let exhausted = self.event_index >= events.len();
            if self.loop_enabled && (exhausted || event.tick >= self.loop_window.end) {
                debug!("loop wrap at tick {} to {}", event.tick, self.loop_window.start);
                self.set_time_ticks(self.loop_window.start);
                return;
            }
            if exhausted {
                self.finish();
                return;
            }

            let next = &events[self.event_index];
            self.played_time += self.seconds_per_tick * (next.tick - event.tick) as f64;
        }
    }

    fn end_of_sequence(&mut self) {
        if self.loop_enabled {
            self.set_time_ticks(self.loop_window.start);
        } else {
            self.finish();
        }
    }

    pub(super) fn process_event(&mut self, event: &TimedEvent) {
        match event.kind {
            EventKind::Channel { status } => {
                self.emitter.emit_with_status(status, &event.data);
                self.sounding.track(event);
            }
            EventKind::SystemExclusive => {
                self.emitter.emit_with_status(SYSTEM_EXCLUSIVE, &event.data);
            }
            EventKind::Meta(kind) => self.process_meta(kind, &event.data),
        }
    }

    fn process_meta(&mut self, kind: MetaKind, data: &[u8]) {
        match kind {
            MetaKind::SetTempo => {
                let [a, b, c, ..] = *data else {
                    warn!("tempo event with {} payload bytes ignored", data.len());
                    return;
                };
                let micros = u32::from_be_bytes([0, a, b, c]);
                self.seconds_per_tick = seconds_per_tick(micros, self.tempo_map.time_division());
            }

            MetaKind::EndOfTrack
            | MetaKind::ChannelPrefix
            | MetaKind::TimeSignature
            | MetaKind::SongPosition
            | MetaKind::ActiveSensing
            | MetaKind::KeySignature
            | MetaKind::Port => {}

            kind if kind.is_text() => self.listeners.text_event(data, kind),

            other => trace!("Unrecognized event: {:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{MetaKind, TimedEvent};
    use crate::recording::{LoopWindow, Recording};
    use crate::timing::{ManualClock, TempoPoint};
    use crossbeam::channel::{Receiver, Sender, unbounded};

    fn sequencer(
        tracks: Vec<Vec<TimedEvent>>,
    ) -> (Sequencer<Sender<String>, ManualClock>, Receiver<String>, ManualClock) {
        let recording = Recording {
            name: "dispatch".into(),
            time_division: 480,
            tempo_changes: vec![TempoPoint::new(0, 500_000)],
            loop_window: LoopWindow { start: 0, end: 1920 },
            tracks,
        };
        let (tx, rx) = unbounded();
        let clock = ManualClock::new();
        let mut seq = Sequencer::new(recording, tx, clock.clone()).unwrap();
        seq.set_loop(false);
        (seq, rx, clock)
    }

    fn note_commands(rx: &Receiver<String>) -> Vec<String> {
        rx.try_iter()
            .filter(|c| c.starts_with("midi,9") || c.starts_with("midi,8"))
            .collect()
    }

    #[test]
    fn test_nothing_dispatched_while_paused() {
        let (mut seq, rx, clock) = sequencer(vec![vec![TimedEvent::note_on(0, 0, 60, 100)]]);
        clock.advance(1.0);
        seq.process_tick();
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn test_coarse_tick_releases_all_due_events_in_order() {
        let (mut seq, rx, clock) = sequencer(vec![vec![
            TimedEvent::note_on(0, 0, 60, 100),
            TimedEvent::note_on(240, 0, 62, 100),
            TimedEvent::note_on(480, 0, 64, 100),
            TimedEvent::note_off(1920, 0, 60),
        ]]);
        seq.play(false);
        rx.try_iter().for_each(drop);

        clock.advance(0.6);
        seq.process_tick();
        assert_eq!(
            note_commands(&rx),
            vec!["midi,90,3c,64", "midi,90,3e,64", "midi,90,40,64"]
        );
        assert_eq!(seq.event_index(), 3);
        assert_eq!(seq.sounding_notes().len(), 3);
    }

    #[test]
    fn test_tempo_event_changes_dispatch_rate() {
        let (mut seq, rx, clock) = sequencer(vec![vec![
            TimedEvent::tempo(0, 250_000),
            TimedEvent::note_on(480, 0, 60, 100),
            TimedEvent::note_off(960, 0, 60),
        ]]);
        seq.play(false);
        rx.try_iter().for_each(drop);

        // 480 ticks at 240 BPM take 0.25s.
        clock.advance(0.26);
        seq.process_tick();
        assert_eq!(note_commands(&rx), vec!["midi,90,3c,64"]);
    }

    #[test]
    fn test_text_events_reach_listeners() {
        use parking_lot::Mutex;
        use std::sync::Arc;

        struct Lyrics(Arc<Mutex<Vec<(Vec<u8>, MetaKind)>>>);
        impl crate::sequencer::SequencerListener for Lyrics {
            fn on_text_event(&mut self, payload: &[u8], kind: MetaKind) {
                self.0.lock().push((payload.to_vec(), kind));
            }
        }

        let (mut seq, _rx, clock) = sequencer(vec![vec![
            TimedEvent::meta(0, MetaKind::Lyric, b"la".to_vec()),
            TimedEvent::meta(0, MetaKind::Unknown(0x42), b"??".to_vec()),
            TimedEvent::meta(0, MetaKind::TimeSignature, vec![4, 2, 24, 8]),
            TimedEvent::note_on(960, 0, 60, 100),
        ]]);
        let seen = Arc::new(Mutex::new(Vec::new()));
        seq.add_listener(Box::new(Lyrics(seen.clone())));
        seq.play(false);
        clock.advance(0.1);
        seq.process_tick();

        assert_eq!(*seen.lock(), vec![(b"la".to_vec(), MetaKind::Lyric)]);
    }

    #[test]
    fn test_malformed_tempo_keeps_previous_rate() {
        let (mut seq, _rx, clock) = sequencer(vec![vec![
            TimedEvent::tempo(0, 250_000),
            TimedEvent::meta(0, MetaKind::SetTempo, vec![1]),
            TimedEvent::note_on(480, 0, 60, 100),
            TimedEvent::note_off(960, 0, 60),
        ]]);
        seq.play(false);
        clock.advance(0.26);
        seq.process_tick();
        assert_eq!(seq.event_index(), 3);
    }

    #[test]
    fn test_zero_tempo_falls_back_to_120_bpm() {
        let (mut seq, _rx, clock) = sequencer(vec![vec![
            TimedEvent::tempo(0, 0),
            TimedEvent::note_on(480, 0, 60, 100),
            TimedEvent::note_off(960, 0, 60),
        ]]);
        seq.play(false);
        clock.advance(0.4);
        seq.process_tick();
        assert_eq!(seq.event_index(), 1);
        clock.advance(0.2);
        seq.process_tick();
        assert_eq!(seq.event_index(), 2);
    }

    #[test]
    fn test_sysex_forwarded() {
        let (mut seq, rx, clock) = sequencer(vec![vec![
            TimedEvent {
                tick: 0,
                kind: EventKind::SystemExclusive,
                data: vec![0x7E, 0x7F, 0x09, 0x01, 0xF7],
            },
            TimedEvent::note_on(960, 0, 60, 100),
        ]]);
        seq.play(false);
        rx.try_iter().for_each(drop);
        clock.advance(0.01);
        seq.process_tick();
        assert_eq!(
            rx.try_iter().collect::<Vec<_>>(),
            vec!["midi,f0,7e,7f,9,1,f7".to_string()]
        );
    }
}
