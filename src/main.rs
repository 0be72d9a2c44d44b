use seqplay::{PlayerCommand, PlayerConfig, PlayerUpdate, Recording, spawn_player};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut args = std::env::args().skip(1);
    let Some(recording_path) = args.next().map(PathBuf::from) else {
        eprintln!("usage: seqplay <recording.ron> [config.ron]");
        std::process::exit(2);
    };

    if let Err(e) = run(recording_path, args.next().map(PathBuf::from)) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(recording_path: PathBuf, config_path: Option<PathBuf>) -> seqplay::Result<()> {
    let recording = Recording::load(&recording_path)?;
    let config = match config_path {
        Some(path) => PlayerConfig::load(&path)?,
        None => PlayerConfig::default(),
    };
    let loop_playback = config.loop_playback;
    let start = startup_command(&config);

    // Stand-in renderer: print every command on its own thread.
    let (command_tx, command_rx) = crossbeam::channel::unbounded::<String>();
    std::thread::spawn(move || {
        for command in command_rx {
            println!("{}", command);
        }
    });

    let player = spawn_player(recording, config, command_tx)?;
    if let Some(command) = start {
        let _ = player.command_tx.send(command);
    }
    if !loop_playback {
        info!("Playing once, exiting when finished");
    }

    for update in player.update_rx.iter() {
        match update {
            PlayerUpdate::TextEvent { payload, kind } => {
                info!("{:?}: {}", kind, String::from_utf8_lossy(&payload));
            }
            PlayerUpdate::TimeChanged { time } => info!("Time changed to {:.2}s", time),
            PlayerUpdate::PlaybackState {
                paused,
                current_time,
            } => info!("paused: {}, at {:.2}s", paused, current_time),
            PlayerUpdate::Finished => break,
            PlayerUpdate::Error { message } => error!("{}", message),
        }
    }

    player.shutdown();
    Ok(())
}

/// The player waits for a `Play` when autoplay is off; the CLI has no
/// other way to send one.
fn startup_command(config: &PlayerConfig) -> Option<PlayerCommand> {
    (!config.autoplay).then_some(PlayerCommand::Play)
}
