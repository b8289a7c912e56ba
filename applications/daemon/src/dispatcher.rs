/// Routes control messages to the playback state machine
use crate::command::Command;
use loud_playback::{AdvanceOutcome, PlaybackManager};
use std::ops::ControlFlow;
use std::path::Path;
use tracing::{debug, info};

#[derive(Clone)]
pub struct Dispatcher {
    manager: PlaybackManager,
}

impl Dispatcher {
    pub fn new(manager: PlaybackManager) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &PlaybackManager {
        &self.manager
    }

    /// Handle one raw message
    ///
    /// Returns `Break` once the daemon has been asked to quit. May block on
    /// file I/O while a track is opened.
    pub fn dispatch(&self, message: &str) -> ControlFlow<()> {
        self.execute(Command::parse(message))
    }

    pub fn execute(&self, command: Command) -> ControlFlow<()> {
        debug!("Command: {}", command);

        match command {
            Command::Stop => self.manager.stop(),
            Command::Next => {
                if self.manager.next() == AdvanceOutcome::NothingToPlay {
                    debug!("Nothing queued after the current track");
                }
            }
            Command::Previous => self.manager.previous(),
            Command::Quit => {
                self.manager.quit();
                info!("Quit received");
                return ControlFlow::Break(());
            }
            Command::Play(path) => {
                if is_directory(&path) {
                    self.manager.play_directory(&path);
                } else {
                    self.manager.play_file(&path);
                }
            }
            Command::Enqueue(path) => {
                if is_directory(&path) {
                    self.manager.enqueue_directory(&path);
                } else {
                    self.manager.enqueue_file(&path);
                }
            }
            Command::Legacy(path) => self.manager.play_legacy(&path),
        }

        ControlFlow::Continue(())
    }
}

fn is_directory(path: &Path) -> bool {
    !path.as_os_str().is_empty() && path.is_dir()
}
