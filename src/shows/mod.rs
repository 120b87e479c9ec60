//! The laser shows.  Each show is a state machine which produces one point
//! per face on every tick.

use crate::common_structs::{Sample3, SoundEffect};
use crate::inputs::{AudioCursor, SharedInputs, WandSnapshot};
use crate::sierpinski::Sierpinski;
use crate::tuning::ShowTuning;

pub mod audio_visualizer;
pub mod calibration;
pub mod circle;
pub mod equation;
pub mod pong;
pub mod spirograph;
pub mod wand_trail;

use audio_visualizer::AudioVisualizer;
use calibration::Calibration;
use circle::Circle;
use equation::Equation;
use pong::Pong;
use spirograph::SpirographShow;
use wand_trail::WandTrail;

/// Everything a show can look at during one tick
pub struct ShowContext<'a> {
    pub sierpinski: &'a Sierpinski,

    /// Wand readings, copied once at the start of the tick
    pub wands: WandSnapshot,

    pub inputs: &'a SharedInputs,
    pub audio: &'a mut AudioCursor,
    pub tuning: &'a ShowTuning,

    /// Pending sound effect for the audio side to collect
    pub sound_effect: &'a mut Option<SoundEffect>,
}

impl<'a> ShowContext<'a> {
    /// Read the next audio sample from the ring
    pub fn next_audio(&mut self) -> u8 {
        self.audio.next(self.inputs)
    }

    /// Queue a sound effect.  A newer effect replaces one not yet collected.
    pub fn raise(&mut self, effect: SoundEffect) {
        *self.sound_effect = Some(effect);
    }
}

/// Interface implemented by every show
pub trait Show {
    /// Create a new instance of the show.  This is called the first time the
    /// show is selected, after which the instance lives for the lifetime of
    /// the engine.  Any buffers the show needs are allocated here.
    fn new(sierpinski: &Sierpinski, tuning: &ShowTuning) -> Box<dyn Show>
    where
        Self: Sized;

    /// Produce the points for the next tick.  This is called at the laser
    /// sample rate, so it must do a small, bounded amount of work and must
    /// not allocate.
    fn step(&mut self, ctx: &mut ShowContext) -> Sample3;

    fn get_name(&self) -> &'static str;
}

/// The shows the engine knows about, with the mode numbers used to select
/// them over the control link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShowMode {
    Circle,
    AudioVisualizer,
    Equation,
    Spirograph,
    Pong,
    WandTrail,
    Calibration,
}

pub const SHOW_COUNT: usize = 7;

impl ShowMode {
    pub const ALL: [ShowMode; SHOW_COUNT] = [
        ShowMode::Circle,
        ShowMode::AudioVisualizer,
        ShowMode::Equation,
        ShowMode::Spirograph,
        ShowMode::Pong,
        ShowMode::WandTrail,
        ShowMode::Calibration,
    ];

    /// Shows which the jukebox rotates through.  Calibration is only ever
    /// selected explicitly.
    pub const JUKEBOX: [ShowMode; SHOW_COUNT - 1] = [
        ShowMode::Circle,
        ShowMode::AudioVisualizer,
        ShowMode::Equation,
        ShowMode::Spirograph,
        ShowMode::Pong,
        ShowMode::WandTrail,
    ];

    pub fn from_code(code: u8) -> Option<ShowMode> {
        match code {
            1 => Some(ShowMode::Circle),
            2 => Some(ShowMode::AudioVisualizer),
            3 => Some(ShowMode::Equation),
            4 => Some(ShowMode::Spirograph),
            5 => Some(ShowMode::Pong),
            7 | 8 => Some(ShowMode::WandTrail),
            9 => Some(ShowMode::Calibration),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            ShowMode::Circle => 1,
            ShowMode::AudioVisualizer => 2,
            ShowMode::Equation => 3,
            ShowMode::Spirograph => 4,
            ShowMode::Pong => 5,
            ShowMode::WandTrail => 7,
            ShowMode::Calibration => 9,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ShowMode::Circle => Circle::NAME,
            ShowMode::AudioVisualizer => AudioVisualizer::NAME,
            ShowMode::Equation => Equation::NAME,
            ShowMode::Spirograph => SpirographShow::NAME,
            ShowMode::Pong => Pong::NAME,
            ShowMode::WandTrail => WandTrail::NAME,
            ShowMode::Calibration => Calibration::NAME,
        }
    }

    pub fn from_name(name: &str) -> Option<ShowMode> {
        ShowMode::ALL.iter().copied().find(|mode| mode.name() == name)
    }

    /// Position in `ALL`, used to index per-show storage
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn create(&self, sierpinski: &Sierpinski, tuning: &ShowTuning) -> Box<dyn Show> {
        match self {
            ShowMode::Circle => Circle::new(sierpinski, tuning),
            ShowMode::AudioVisualizer => AudioVisualizer::new(sierpinski, tuning),
            ShowMode::Equation => Equation::new(sierpinski, tuning),
            ShowMode::Spirograph => SpirographShow::new(sierpinski, tuning),
            ShowMode::Pong => Pong::new(sierpinski, tuning),
            ShowMode::WandTrail => WandTrail::new(sierpinski, tuning),
            ShowMode::Calibration => Calibration::new(sierpinski, tuning),
        }
    }
}

/// Owns everything a `ShowContext` borrows, so single shows can be stepped
/// in tests without the engine
#[cfg(test)]
pub(crate) struct TestRig {
    pub sierpinski: Sierpinski,
    pub inputs: SharedInputs,
    pub audio: AudioCursor,
    pub tuning: ShowTuning,
    pub sound_effect: Option<SoundEffect>,
}

#[cfg(test)]
impl TestRig {
    pub fn new() -> Self {
        Self {
            sierpinski: Sierpinski::new(),
            inputs: SharedInputs::new(),
            audio: AudioCursor::default(),
            tuning: ShowTuning::default(),
            sound_effect: None,
        }
    }

    pub fn ctx(&mut self) -> ShowContext<'_> {
        ShowContext {
            sierpinski: &self.sierpinski,
            wands: self.inputs.snapshot(),
            inputs: &self.inputs,
            audio: &mut self.audio,
            tuning: &self.tuning,
            sound_effect: &mut self.sound_effect,
        }
    }

    pub fn step(&mut self, show: &mut dyn Show) -> Sample3 {
        let mut ctx = self.ctx();
        show.step(&mut ctx)
    }
}
