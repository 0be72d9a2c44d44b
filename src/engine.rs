use crate::output::CommandSink;
use crate::sequencer::{Sequencer, SequencerListener};
use crate::timing::SystemClock;
use crate::{MetaKind, PlayerConfig, Recording, error::Result};
use crossbeam::channel::{Receiver, RecvTimeoutError, Sender};
use tracing::{debug, error, info};

#[derive(Debug, Clone)]
pub enum PlayerCommand {
    LoadRecording(Recording),
    Play,
    Restart,
    Pause,
    Stop,
    Seek(f64),
    SeekTicks(u64),
    SetPlaybackRate(f64),
    SetLoop(bool),
    Shutdown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerUpdate {
    TextEvent { payload: Vec<u8>, kind: MetaKind },
    TimeChanged { time: f64 },
    PlaybackState { paused: bool, current_time: f64 },
    Finished,
    Error { message: String },
}

pub struct PlayerHandle {
    pub command_tx: Sender<PlayerCommand>,
    pub update_rx: Receiver<PlayerUpdate>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl PlayerHandle {
    /// Asks the player thread to exit and waits for it.
    pub fn shutdown(mut self) {
        let _ = self.command_tx.send(PlayerCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Forwards sequencer notifications to the update channel.
struct UpdateForwarder {
    update_tx: Sender<PlayerUpdate>,
}

impl SequencerListener for UpdateForwarder {
    fn on_text_event(&mut self, payload: &[u8], kind: MetaKind) {
        let _ = self.update_tx.send(PlayerUpdate::TextEvent {
            payload: payload.to_vec(),
            kind,
        });
    }

    fn on_time_change(&mut self, time: f64) {
        let _ = self.update_tx.send(PlayerUpdate::TimeChanged { time });
    }
}

/// Builds the sequencer on the calling thread, so a bad recording is
/// reported here, then hands it to a player thread that acts as the
/// periodic timer.
pub fn spawn_player<S>(recording: Recording, config: PlayerConfig, sink: S) -> Result<PlayerHandle>
where
    S: CommandSink + Send + 'static,
{
    let mut sequencer = Sequencer::new(recording, sink, SystemClock::new())?;
    sequencer.set_loop(config.loop_playback);
    sequencer.set_playback_rate(config.playback_rate);

    let (command_tx, command_rx) = crossbeam::channel::unbounded();
    let (update_tx, update_rx) = crossbeam::channel::unbounded();

    sequencer.add_listener(Box::new(UpdateForwarder {
        update_tx: update_tx.clone(),
    }));

    let thread = std::thread::spawn(move || {
        player_thread(sequencer, config, command_rx, update_tx);
    });

    Ok(PlayerHandle {
        command_tx,
        update_rx,
        thread: Some(thread),
    })
}

fn player_thread<S: CommandSink>(
    mut sequencer: Sequencer<S, SystemClock>,
    config: PlayerConfig,
    command_rx: Receiver<PlayerCommand>,
    update_tx: Sender<PlayerUpdate>,
) {
    let tick_interval = config.tick_interval();
    info!(
        "Player started for \"{}\", tick every {:?}",
        sequencer.name(),
        tick_interval
    );

    if config.autoplay {
        sequencer.play(false);
        send_state(&sequencer, &update_tx);
    }

    loop {
        match command_rx.recv_timeout(tick_interval) {
            Ok(PlayerCommand::LoadRecording(recording)) => {
                match sequencer.load_recording(recording) {
                    Ok(()) => sequencer.play(true),
                    Err(e) => {
                        error!("Failed to load recording: {}", e);
                        let _ = update_tx.send(PlayerUpdate::Error {
                            message: format!("Failed to load recording: {}", e),
                        });
                    }
                }
                send_state(&sequencer, &update_tx);
            }
            Ok(PlayerCommand::Play) => {
                sequencer.play(false);
                send_state(&sequencer, &update_tx);
            }
            Ok(PlayerCommand::Restart) => {
                sequencer.play(true);
                send_state(&sequencer, &update_tx);
            }
            Ok(PlayerCommand::Pause) => {
                sequencer.pause();
                send_state(&sequencer, &update_tx);
            }
            Ok(PlayerCommand::Stop) => {
                sequencer.stop();
                send_state(&sequencer, &update_tx);
            }
            Ok(PlayerCommand::Seek(time)) => sequencer.set_current_time(time),
            Ok(PlayerCommand::SeekTicks(tick)) => sequencer.set_time_ticks(tick),
            Ok(PlayerCommand::SetPlaybackRate(rate)) => sequencer.set_playback_rate(rate),
            Ok(PlayerCommand::SetLoop(enabled)) => sequencer.set_loop(enabled),
            Ok(PlayerCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                let was_running = sequencer.is_running();
                sequencer.process_tick();
                if was_running && sequencer.is_paused() {
                    send_state(&sequencer, &update_tx);
                    let _ = update_tx.send(PlayerUpdate::Finished);
                }
            }
        }
    }

    sequencer.stop();
    debug!("Player thread for \"{}\" exited", sequencer.name());
}

fn send_state<S: CommandSink>(
    sequencer: &Sequencer<S, SystemClock>,
    update_tx: &Sender<PlayerUpdate>,
) {
    let _ = update_tx.send(PlayerUpdate::PlaybackState {
        paused: sequencer.is_paused(),
        current_time: sequencer.current_time(),
    });
}
