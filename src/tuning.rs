//! Every knob the shows expose.  Loaded from the `[tuning]` table of
//! settings.toml; anything missing falls back to the values below.

use anyhow::Result;
use config::{Config, ConfigError};
use log::info;
use serde_derive::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShowTuning {
    /// Circle radius at silence, DAC units
    pub circle_radius: f64,
    /// Radius change per unit of audio amplitude away from silence
    pub circle_audio_gain: f64,
    /// Degrees advanced per tick
    pub circle_step_deg: i32,

    /// Circles in each face's cluster
    pub visualizer_circles: usize,
    pub visualizer_min_radius: f64,
    pub visualizer_max_radius: f64,
    /// Radius change per tick is scaled by audio amplitude times this
    pub visualizer_audio_gain: f64,
    /// Points drawn around each circle before moving to the next one
    pub visualizer_points_per_circle: usize,

    /// Longest step between interpolated equation points
    pub equation_segment_distance: i32,
    /// Edge length of the box each equation is scaled into, DAC units
    pub equation_size: f64,
    /// Times each shape is traced before moving to the next
    pub equation_traces_per_shape: usize,
    /// Distance the shape moves after each trace
    pub equation_speed: i32,

    /// Ticks spent in point mode or line mode before swapping
    pub spirograph_mode_period: usize,
    /// In point mode the pen only moves every this many ticks
    pub spirograph_point_hold: usize,

    /// Ball movement per physics step
    pub pong_ball_speed: i32,
    /// Length of a paddle, DAC units
    pub pong_paddle_length: i32,
    /// Physics steps before a new ball is served after a goal
    pub pong_reset_delay: usize,
    /// Most a computer controlled paddle can move per physics step
    pub pong_ai_speed: i32,
    /// Ticks the ball marker is held for on each cycle
    pub pong_ball_dwell: usize,
    pub pong_segment_distance: i32,

    /// Points kept in the wand trail
    pub wand_trail_length: usize,

    pub calibration_segment_distance: i32,
}

impl Default for ShowTuning {
    fn default() -> Self {
        Self {
            circle_radius: 200.0,
            circle_audio_gain: 2.5,
            circle_step_deg: 1,

            visualizer_circles: 6,
            visualizer_min_radius: 20.0,
            visualizer_max_radius: 200.0,
            visualizer_audio_gain: 0.05,
            visualizer_points_per_circle: 40,

            equation_segment_distance: 16,
            equation_size: 300.0,
            equation_traces_per_shape: 12,
            equation_speed: 4,

            spirograph_mode_period: 2000,
            spirograph_point_hold: 4,

            pong_ball_speed: 12,
            pong_paddle_length: 120,
            pong_reset_delay: 60,
            pong_ai_speed: 6,
            pong_ball_dwell: 8,
            pong_segment_distance: 16,

            wand_trail_length: 64,

            calibration_segment_distance: 8,
        }
    }
}

impl ShowTuning {
    /// Read the `[tuning]` table.  A missing table gives the defaults, a
    /// malformed one is an error.
    pub fn from_settings(settings: &Config) -> Result<Self> {
        match settings.get::<ShowTuning>("tuning") {
            Ok(tuning) => Ok(tuning),
            Err(ConfigError::NotFound(_)) => {
                info!("No [tuning] table in settings, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_partial_table() {
        let source = config::Config::builder()
            .add_source(config::File::from_str(
                "circle_audio_gain = 5.0\npong_reset_delay = 10\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let tuning: ShowTuning = source.try_deserialize().unwrap();
        assert_eq!(tuning.circle_audio_gain, 5.0);
        assert_eq!(tuning.pong_reset_delay, 10);
        assert_eq!(tuning.circle_radius, ShowTuning::default().circle_radius);
    }

    fn settings(toml: &str) -> Config {
        Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
    }

    #[test]
    fn test_from_settings() {
        let tuning = ShowTuning::from_settings(&settings("fps = 30\n")).unwrap();
        assert_eq!(tuning, ShowTuning::default());

        let tuning =
            ShowTuning::from_settings(&settings("[tuning]\nwand_trail_length = 16\n")).unwrap();
        assert_eq!(tuning.wand_trail_length, 16);
        assert_eq!(tuning.pong_ball_speed, ShowTuning::default().pong_ball_speed);

        let malformed = settings("[tuning]\npong_ball_speed = \"fast\"\n");
        assert!(ShowTuning::from_settings(&malformed).is_err());
    }
}
