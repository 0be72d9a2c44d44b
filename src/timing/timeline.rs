use crate::events::TimedEvent;

/// All tracks merged into one tick-ascending sequence.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    events: Vec<TimedEvent>,
}

impl Timeline {
    /// Flattens tracks in order and sorts by tick. The sort is stable so
    /// equal ticks keep their merge order.
    pub fn build(tracks: Vec<Vec<TimedEvent>>) -> Self {
        let mut events: Vec<TimedEvent> = tracks.into_iter().flatten().collect();
        events.sort_by_key(|e| e.tick);
        Self { events }
    }

    pub fn events(&self) -> &[TimedEvent] {
        &self.events
    }

    pub fn get(&self, idx: usize) -> Option<&TimedEvent> {
        self.events.get(idx)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn last_tick(&self) -> Option<u64> {
        self.events.last().map(|e| e.tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MetaKind;

    #[test]
    fn test_merge_orders_by_tick() {
        let timeline = Timeline::build(vec![
            vec![TimedEvent::note_on(0, 0, 60, 90), TimedEvent::note_off(480, 0, 60)],
            vec![TimedEvent::note_on(240, 1, 64, 90)],
        ]);
        let ticks: Vec<u64> = timeline.events().iter().map(|e| e.tick).collect();
        assert_eq!(ticks, vec![0, 240, 480]);
        assert_eq!(timeline.last_tick(), Some(480));
    }

    #[test]
    fn test_equal_ticks_keep_track_order() {
        let timeline = Timeline::build(vec![
            vec![
                TimedEvent::meta(0, MetaKind::TrackName, b"a".to_vec()),
                TimedEvent::note_on(10, 0, 60, 90),
            ],
            vec![TimedEvent::program_change(10, 0, 5)],
            vec![TimedEvent::note_on(10, 1, 62, 90)],
        ]);
        let at_ten: Vec<Option<u8>> = timeline
            .events()
            .iter()
            .filter(|e| e.tick == 10)
            .map(|e| e.message_type())
            .collect();
        assert_eq!(at_ten, vec![Some(0x9), Some(0xC), Some(0x9)]);
        assert_eq!(timeline.get(3).and_then(|e| e.channel_number()), Some(1));
    }

    #[test]
    fn test_empty_tracks() {
        let timeline = Timeline::build(vec![vec![], vec![]]);
        assert!(timeline.is_empty());
        assert_eq!(timeline.last_tick(), None);
    }
}
