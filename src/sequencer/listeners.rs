use crate::events::MetaKind;

/// Observer for sequencer notifications. Both hooks default to no-ops.
pub trait SequencerListener: Send {
    /// Fired synchronously for text-class meta events, during both
    /// dispatch and fast-forward.
    fn on_text_event(&mut self, _payload: &[u8], _kind: MetaKind) {}

    /// Fired whenever the position is set programmatically.
    fn on_time_change(&mut self, _time: f64) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
pub struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, Box<dyn SequencerListener>)>,
}

impl Listeners {
    pub fn add(&mut self, listener: Box<dyn SequencerListener>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub fn remove(&mut self, id: ListenerId) -> Option<Box<dyn SequencerListener>> {
        let idx = self.entries.iter().position(|(entry_id, _)| *entry_id == id)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn text_event(&mut self, payload: &[u8], kind: MetaKind) {
        for (_, listener) in &mut self.entries {
            listener.on_text_event(payload, kind);
        }
    }

    pub fn time_changed(&mut self, time: f64) {
        for (_, listener) in &mut self.entries {
            listener.on_time_change(time);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl SequencerListener for Recorder {
        fn on_text_event(&mut self, payload: &[u8], kind: MetaKind) {
            self.0
                .lock()
                .push(format!("{:?}:{}", kind, String::from_utf8_lossy(payload)));
        }

        fn on_time_change(&mut self, time: f64) {
            self.0.lock().push(format!("time:{time}"));
        }
    }

    #[test]
    fn test_broadcast_and_remove() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut listeners = Listeners::default();
        let first = listeners.add(Box::new(Recorder(log.clone())));
        listeners.add(Box::new(Recorder(log.clone())));
        assert_eq!(listeners.len(), 2);

        listeners.text_event(b"hi", MetaKind::Lyric);
        assert_eq!(log.lock().len(), 2);

        assert!(listeners.remove(first).is_some());
        assert!(listeners.remove(first).is_none());
        listeners.time_changed(1.5);
        assert_eq!(log.lock().last().map(String::as_str), Some("time:1.5"));
        assert_eq!(log.lock().len(), 3);
    }
}
