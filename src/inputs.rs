//! Latest-value snapshots of everything the show engine reads from the
//! outside world: up to two wand orientations, how many wands are
//! connected, and a ring of 8-bit audio amplitude samples.
//!
//! Each value is written by one collaborator thread and read by the engine
//! without locking.  Readers see the last completed write of each value but
//! no consistency between values, which is all the shows need.

use crate::geometry::Quaternion;
use std::sync::atomic::{AtomicU64, AtomicU8, AtomicUsize, Ordering};

/// Number of samples in the audio ring
pub const AUDIO_BUFFER_SIZE: usize = 1024;

/// Audio sample value representing silence
pub const AUDIO_SILENCE: u8 = 128;

/// Number of wand slots
pub const WAND_SLOTS: usize = 2;

/// Raw sensor reading of a wand at rest, `x, y, z, w` order
pub const RAW_IDENTITY: [u16; 4] = [16384, 16384, 16384, 32768];

fn pack_raw(raw: [u16; 4]) -> u64 {
    raw.iter()
        .enumerate()
        .fold(0, |packed, (i, v)| packed | (*v as u64) << (16 * i))
}

fn unpack_raw(packed: u64) -> [u16; 4] {
    std::array::from_fn(|i| (packed >> (16 * i)) as u16)
}

/// A copy of the wand inputs taken at the start of a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WandSnapshot {
    pub connected: u8,
    pub raw: [[u16; 4]; WAND_SLOTS],
}

impl Default for WandSnapshot {
    fn default() -> Self {
        Self {
            connected: 0,
            raw: [RAW_IDENTITY; WAND_SLOTS],
        }
    }
}

impl WandSnapshot {
    /// Orientation of the wand in `slot`, or None if that wand isn't
    /// connected
    pub fn quaternion(&self, slot: usize) -> Option<Quaternion> {
        if slot < WAND_SLOTS && (self.connected as usize) > slot {
            Some(Quaternion::from_raw(self.raw[slot]))
        } else {
            None
        }
    }
}

pub struct SharedInputs {
    wands: [AtomicU64; WAND_SLOTS],
    wands_connected: AtomicU8,
    audio: [AtomicU8; AUDIO_BUFFER_SIZE],
    audio_write: AtomicUsize,
}

impl Default for SharedInputs {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedInputs {
    pub fn new() -> Self {
        Self {
            wands: std::array::from_fn(|_| AtomicU64::new(pack_raw(RAW_IDENTITY))),
            wands_connected: AtomicU8::new(0),
            audio: std::array::from_fn(|_| AtomicU8::new(AUDIO_SILENCE)),
            audio_write: AtomicUsize::new(0),
        }
    }

    /// Store the latest raw reading for the wand in `slot`
    pub fn set_wand(&self, slot: usize, raw: [u16; 4]) {
        if let Some(wand) = self.wands.get(slot) {
            wand.store(pack_raw(raw), Ordering::Relaxed);
        }
    }

    pub fn set_wands_connected(&self, connected: u8) {
        self.wands_connected.store(connected, Ordering::Relaxed);
    }

    /// Append one sample to the audio ring, overwriting the oldest
    pub fn push_audio(&self, sample: u8) {
        let index = self.audio_write.fetch_add(1, Ordering::Relaxed) % AUDIO_BUFFER_SIZE;
        self.audio[index].store(sample, Ordering::Relaxed);
    }

    pub fn audio_sample(&self, index: usize) -> u8 {
        self.audio[index % AUDIO_BUFFER_SIZE].load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> WandSnapshot {
        WandSnapshot {
            connected: self.wands_connected.load(Ordering::Relaxed),
            raw: std::array::from_fn(|i| unpack_raw(self.wands[i].load(Ordering::Relaxed))),
        }
    }
}

/// The engine's own read position in the audio ring.  It advances one
/// sample per read regardless of where the writer is.
#[derive(Debug, Default, Clone)]
pub struct AudioCursor {
    index: usize,
}

impl AudioCursor {
    pub fn next(&mut self, inputs: &SharedInputs) -> u8 {
        let sample = inputs.audio_sample(self.index);
        self.index = (self.index + 1) % AUDIO_BUFFER_SIZE;
        sample
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_wand_slots() {
        let inputs = SharedInputs::new();
        assert_eq!(inputs.snapshot().quaternion(0), None);

        inputs.set_wand(1, [1, 2, 3, 65535]);
        inputs.set_wands_connected(1);
        let snapshot = inputs.snapshot();
        assert_eq!(snapshot.quaternion(0), Some(Quaternion::IDENTITY));
        // Slot 2 is absent until two wands are connected
        assert_eq!(snapshot.quaternion(1), None);
        assert_eq!(snapshot.raw[1], [1, 2, 3, 65535]);

        inputs.set_wands_connected(2);
        assert!(inputs.snapshot().quaternion(1).is_some());
        // Out of range slots are ignored
        inputs.set_wand(5, [0; 4]);
        assert_eq!(inputs.snapshot().quaternion(5), None);
    }

    #[test]
    fn test_audio_ring() {
        let inputs = SharedInputs::new();
        let mut cursor = AudioCursor::default();
        assert_eq!(cursor.next(&inputs), AUDIO_SILENCE);

        for i in 0..AUDIO_BUFFER_SIZE + 2 {
            inputs.push_audio((i % 256) as u8);
        }
        // The first two slots have been overwritten by the wrap
        assert_eq!(inputs.audio_sample(0), (AUDIO_BUFFER_SIZE % 256) as u8);
        assert_eq!(inputs.audio_sample(1), ((AUDIO_BUFFER_SIZE + 1) % 256) as u8);
        assert_eq!(inputs.audio_sample(2), 2);

        // The cursor keeps its own position and wraps independently
        assert_eq!(cursor.next(&inputs), ((AUDIO_BUFFER_SIZE + 1) % 256) as u8);
        for _ in 2..AUDIO_BUFFER_SIZE {
            cursor.next(&inputs);
        }
        assert_eq!(cursor.next(&inputs), (AUDIO_BUFFER_SIZE % 256) as u8);
    }

    #[test]
    fn test_cross_thread_writes() {
        let inputs = Arc::new(SharedInputs::new());
        let writer = inputs.clone();
        std::thread::spawn(move || {
            writer.set_wand(0, [100, 200, 300, 400]);
            writer.set_wands_connected(1);
        })
        .join()
        .unwrap();
        assert_eq!(inputs.snapshot().raw[0], [100, 200, 300, 400]);
        assert_eq!(inputs.snapshot().connected, 1);
    }
}
