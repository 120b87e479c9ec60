//! Structs shared between the show generators, the engine and the driver
//! loop, kept here so none of them has to depend on the others.

use serde::Serialize;

/// Largest addressable scanner DAC coordinate
pub const LASER_MAX: u16 = 4095;

/// Scanner DAC coordinate of the middle of the output range
pub const LASER_CENTER: u16 = 2048;

/// Number of bytes one `LaserPoint` occupies on the wire
pub const POINT_WIRE_LEN: usize = 6;

/// Number of bytes one `Sample3` occupies on the wire
pub const SAMPLE_WIRE_LEN: usize = POINT_WIRE_LEN * 3;

/// 8-bit per channel colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// One scanner output point.  `x` and `y` are 12-bit DAC coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LaserPoint {
    pub x: u16,
    pub y: u16,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl LaserPoint {
    /// Build a point from signed coordinates, clamping them into the DAC
    /// range so that off-scale content can never wrap around
    pub fn new(x: i32, y: i32, colour: Rgb) -> Self {
        Self {
            x: x.clamp(0, LASER_MAX as i32) as u16,
            y: y.clamp(0, LASER_MAX as i32) as u16,
            r: colour.r,
            g: colour.g,
            b: colour.b,
        }
    }

    /// A point with the beam switched off
    pub fn blank(x: i32, y: i32) -> Self {
        Self::new(x, y, Rgb::BLACK)
    }

    pub fn colour(&self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }

    pub fn is_blank(&self) -> bool {
        self.colour() == Rgb::BLACK
    }

    /// Pack into the 6-byte wire format used by the scanner drivers:
    /// 12 bits of x, 12 bits of y, then r, g, b.
    pub fn to_bytes(&self) -> [u8; POINT_WIRE_LEN] {
        [
            ((self.x >> 4) & 0xff) as u8,
            (((self.x & 0x0f) << 4) | ((self.y >> 8) & 0x0f)) as u8,
            (self.y & 0xff) as u8,
            self.r,
            self.g,
            self.b,
        ]
    }

    /// Inverse of `to_bytes`
    #[cfg(test)]
    fn from_bytes(buf: &[u8; POINT_WIRE_LEN]) -> Self {
        Self {
            x: ((buf[0] as u16) << 4) | ((buf[1] as u16) >> 4),
            y: (((buf[1] & 0x0f) as u16) << 8) | buf[2] as u16,
            r: buf[3],
            g: buf[4],
            b: buf[5],
        }
    }
}

/// The output of one engine tick: exactly one point for each of the three
/// faces (and therefore each of the three scanners)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Sample3(pub [LaserPoint; 3]);

impl Sample3 {
    /// Send the same point to all three scanners
    pub fn uniform(point: LaserPoint) -> Self {
        Self([point; 3])
    }

    pub fn is_blank(&self) -> bool {
        self.0.iter().all(LaserPoint::is_blank)
    }

    /// Append the packed sample to `buf`, face 0 first
    pub fn write_bytes(&self, buf: &mut Vec<u8>) {
        for point in self.0.iter() {
            buf.extend_from_slice(&point.to_bytes());
        }
    }
}

/// Discrete sound effects raised by the games for the audio subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    Wall = 0,
    Paddle = 1,
    GameOver = 2,
}

impl SoundEffect {
    /// Code used on the audio side.  `-1` is reserved for "no effect".
    pub fn code(&self) -> i8 {
        *self as i8
    }
}
