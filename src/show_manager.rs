//! The ShowManager decides which show is playing on each tick, either one
//! show forever or a jukebox rotating through them on a timer.

use crate::common_structs::Sample3;
use crate::laser_generator::LaserGenerator;
use crate::shows::ShowMode;

use anyhow::{anyhow, Result};
use config::Config;
use log::info;
use rand::Rng;

/// Ticks spent on each jukebox show when settings don't say otherwise
pub const DEFAULT_JUKEBOX_TICKS: usize = 30 * 20_000;

/// State machine for the show manager.  Both states carry the show
/// currently selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShowManagerState {
    /// Chosen when settings.toml names a single show.  It plays forever.
    Static(ShowMode),

    /// Cycles through the jukebox shows on a fixed timer.  The second value
    /// is the number of ticks spent in the current show.
    Jukebox(ShowMode, usize),
}

pub struct ShowManager {
    state: ShowManagerState,
    jukebox_ticks: usize,
    rng: rand::rngs::ThreadRng,
}

impl ShowManager {
    /// Play `mode` forever
    pub fn new_static(mode: ShowMode) -> Self {
        info!("Loading static show {}", mode.name());
        Self {
            state: ShowManagerState::Static(mode),
            jukebox_ticks: DEFAULT_JUKEBOX_TICKS,
            rng: rand::thread_rng(),
        }
    }

    /// Rotate through the jukebox shows, `ticks` on each
    pub fn new_jukebox(ticks: usize) -> Self {
        info!("Loading jukebox mode, {} ticks per show", ticks);
        Self {
            state: ShowManagerState::Jukebox(ShowMode::JUKEBOX[0], 0),
            jukebox_ticks: ticks.max(1),
            rng: rand::thread_rng(),
        }
    }

    /// Build from the `show` and `jukebox_ticks` settings.  A missing `show`
    /// means jukebox mode.
    pub fn from_settings(settings: &Config) -> Result<Self> {
        let jukebox_ticks = match settings.get::<usize>("jukebox_ticks") {
            Ok(ticks) => ticks,
            Err(config::ConfigError::NotFound(_)) => DEFAULT_JUKEBOX_TICKS,
            Err(e) => return Err(e.into()),
        };
        match settings.get::<String>("show") {
            Ok(show) if show == "jukebox" => Ok(Self::new_jukebox(jukebox_ticks)),
            Ok(show) => match ShowMode::from_name(&show) {
                Some(mode) => Ok(Self::new_static(mode)),
                None => Err(anyhow!("Unknown show {}", show)),
            },
            Err(config::ConfigError::NotFound(_)) => {
                info!("No show specified, going to jukebox");
                Ok(Self::new_jukebox(jukebox_ticks))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// The show currently selected
    pub fn current(&self) -> ShowMode {
        match self.state {
            ShowManagerState::Static(mode) => mode,
            ShowManagerState::Jukebox(mode, _) => mode,
        }
    }

    /// Run one tick of whichever show is selected, moving the jukebox on
    /// when its time is up
    pub fn step(&mut self, generator: &mut LaserGenerator) -> Sample3 {
        match &mut self.state {
            ShowManagerState::Static(mode) => generator.get_point(*mode),

            ShowManagerState::Jukebox(mode, ticks_in_current) => {
                let sample = generator.get_point(*mode);
                *ticks_in_current += 1;
                if *ticks_in_current >= self.jukebox_ticks {
                    let next = ShowMode::JUKEBOX[self.rng.gen_range(0..ShowMode::JUKEBOX.len())];
                    info!("Jukebox: transitioning to {}", next.name());
                    self.state = ShowManagerState::Jukebox(next, 0);
                }
                sample
            }
        }
    }
}
