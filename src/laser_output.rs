//! Feeds frames of laser samples to the scanner sink on a thread of its own,
//! packed in the 6-byte-per-point wire format.

use crate::common_structs::Sample3;

use anyhow::{anyhow, Result};
use log::{error, info, warn};
use std::io::Write;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

/// One frame's worth of samples
pub type LaserFrame = Vec<Sample3>;

/// Abstraction for the laser scanner output.  The sink is owned by the
/// output thread once it's started.
pub struct LaserOutput {
    // Taken by the thread when it starts
    sink: Option<Box<dyn Write + Send>>,
    rx: Option<Receiver<LaserFrame>>,

    // Left behind for the main thread
    tx: Sender<LaserFrame>,
}

impl LaserOutput {
    pub fn new(sink: Box<dyn Write + Send>) -> Self {
        let (tx, rx) = channel();
        Self {
            sink: Some(sink),
            rx: Some(rx),
            tx,
        }
    }

    /// Open (creating or truncating) the file at `path` as the sink
    pub fn to_file(path: &str) -> Result<Self> {
        let file = std::fs::File::create(path)?;
        info!("Laser output going to {}", path);
        Ok(Self::new(Box::new(std::io::BufWriter::new(file))))
    }

    /// Write a blanked sample to the sink.  Used for the start-up check.
    pub fn test(&mut self) -> Result<()> {
        match self.sink.as_mut() {
            Some(sink) => write_frame(sink, &[Sample3::default()]),
            None => Err(anyhow!("Laser output thread already started")),
        }
    }

    /// Start up the output thread.  Does nothing if it's already running.
    pub fn start_thread(&mut self) -> Result<()> {
        if let (Some(sink), Some(rx)) = (self.sink.take(), self.rx.take()) {
            thread::Builder::new()
                .name("SIERPINSKI LASER".into())
                .spawn(move || {
                    if let Err(e) = Self::output_thread(sink, rx) {
                        error!("Laser output thread failed: {:#}", e);
                    }
                })?;
        }
        Ok(())
    }

    fn output_thread(mut sink: Box<dyn Write + Send>, rx: Receiver<LaserFrame>) -> Result<()> {
        // Setup a SIGTERM handler to blank the scanners before quitting
        let (sigterm_tx, sigterm_rx) = channel();
        ctrlc::set_handler(move || {
            let _ = sigterm_tx.send(());
        })?;

        info!("Laser output thread running.");

        loop {
            if sigterm_rx.try_recv().is_ok() {
                info!("Laser output thread handling SIGTERM.  Goodbye.");
                write_frame(&mut sink, &[Sample3::default()])?;
                std::process::exit(0);
            }

            // Wait briefly for a frame so the exit check keeps running
            match rx.recv_timeout(std::time::Duration::from_millis(100)) {
                Ok(frame) => write_frame(&mut sink, &frame)?,
                Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {}
                Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => {
                    warn!("Laser output channel closed, blanking");
                    return write_frame(&mut sink, &[Sample3::default()]);
                }
            }
        }
    }

    /// Queue a frame for output
    pub fn laser_update(&self, frame: LaserFrame) -> Result<()> {
        self.tx.send(frame)?;
        Ok(())
    }
}

/// Pack and write `frame`, flushing so the scanner sees it promptly
pub fn write_frame<W: Write + ?Sized>(sink: &mut W, frame: &[Sample3]) -> Result<()> {
    let mut buf = Vec::with_capacity(frame.len() * crate::common_structs::SAMPLE_WIRE_LEN);
    for sample in frame {
        sample.write_bytes(&mut buf);
    }
    sink.write_all(&buf)?;
    sink.flush()?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::common_structs::{LaserPoint, Rgb, SAMPLE_WIRE_LEN};

    #[test]
    fn test_write_frame() {
        let frame = vec![
            Sample3::uniform(LaserPoint::new(100, 200, Rgb::RED)),
            Sample3::default(),
        ];
        let mut buf: Vec<u8> = vec![];
        write_frame(&mut buf, &frame).unwrap();
        assert_eq!(buf.len(), 2 * SAMPLE_WIRE_LEN);

        let mut expected = vec![];
        frame[0].write_bytes(&mut expected);
        assert_eq!(&buf[..SAMPLE_WIRE_LEN], &expected[..]);
        assert!(buf[SAMPLE_WIRE_LEN..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_start_up_check_writes_blank() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("laser.bin");
        let mut output = LaserOutput::to_file(path.to_str().unwrap()).unwrap();
        output.test().unwrap();
        drop(output);
        let written = std::fs::read(&path).unwrap();
        assert_eq!(written, vec![0; SAMPLE_WIRE_LEN]);
    }
}
