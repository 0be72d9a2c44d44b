use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::{error::Result, events::TimedEvent, timing::TempoPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopWindow {
    pub start: u64,
    pub end: u64,
}

/// A recording as handed over by the file parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recording {
    pub name: String,
    /// Ticks per quarter note.
    pub time_division: u16,
    pub tempo_changes: Vec<TempoPoint>,
    pub loop_window: LoopWindow,
    pub tracks: Vec<Vec<TimedEvent>>,
}

impl Recording {
    pub fn save(&self, path: &Path) -> Result<()> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        fs::write(path, ron_string)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let ron_string = fs::read_to_string(path)?;
        Self::from_ron(&ron_string)
    }

    pub fn from_ron(source: &str) -> Result<Self> {
        Ok(ron::from_str(source)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventKind, MetaKind};

    #[test]
    fn test_from_ron() {
        let source = r#"(
            name: "demo",
            time_division: 480,
            tempo_changes: [(tick: 0, micros_per_quarter: 500000)],
            loop_window: (start: 0, end: 960),
            tracks: [
                [
                    (tick: 0, kind: Meta(TrackName), data: [65]),
                    (tick: 0, kind: Channel(status: 144), data: [60, 100]),
                    (tick: 480, kind: Channel(status: 128), data: [60, 0]),
                ],
            ],
        )"#;
        let recording = Recording::from_ron(source).unwrap();
        assert_eq!(recording.name, "demo");
        assert_eq!(recording.loop_window, LoopWindow { start: 0, end: 960 });
        assert_eq!(recording.tracks[0].len(), 3);
        assert_eq!(recording.tracks[0][0].kind, EventKind::Meta(MetaKind::TrackName));
        assert_eq!(recording.tracks[0][1].kind, EventKind::Channel { status: 0x90 });
    }

    #[test]
    fn test_save_then_load() {
        let recording = Recording {
            name: "saved".into(),
            time_division: 96,
            tempo_changes: vec![TempoPoint::new(0, 600_000)],
            loop_window: LoopWindow { start: 0, end: 384 },
            tracks: vec![vec![
                TimedEvent::note_on(0, 2, 60, 100),
                TimedEvent::meta(48, MetaKind::Lyric, b"la".to_vec()),
                TimedEvent::note_off(96, 2, 60),
            ]],
        };
        let path = std::env::temp_dir().join(format!("seqplay-save-{}.ron", std::process::id()));

        recording.save(&path).unwrap();
        let loaded = Recording::load(&path);
        fs::remove_file(&path).unwrap();
        let loaded = loaded.unwrap();

        assert_eq!(loaded.name, "saved");
        assert_eq!(loaded.time_division, 96);
        assert_eq!(loaded.tempo_changes, recording.tempo_changes);
        assert_eq!(loaded.loop_window, recording.loop_window);
        assert_eq!(loaded.tracks, recording.tracks);
    }

    #[test]
    fn test_malformed_ron_is_an_error() {
        assert!(Recording::from_ron("(name: 3)").is_err());
    }
}
