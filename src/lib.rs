//! Show engine for the Sierpinski laser sculpture: three laser scanners each
//! project onto one face of a tetrahedron, and a handheld wand is tracked
//! onto whichever face it points at.
//!
//! The engine turns a show selection plus the latest wand and audio inputs
//! into one point per scanner per tick.  The binary in `main.rs` drives it
//! from settings.toml.

pub mod circular_buffer;
pub mod common_structs;
pub mod equations;
pub mod geometry;
pub mod inputs;
pub mod laser_generator;
pub mod laser_objects;
pub mod laser_output;
pub mod linalg;
pub mod show_manager;
pub mod shows;
pub mod sierpinski;
pub mod sim_inputs;
pub mod spirograph;
pub mod tuning;
pub mod ws_server;
