use std::io::Write;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Destination for rendered dashboard frames.
pub trait FrameSink: Send + 'static {
    fn present(&mut self, frame: &str);
}

pub struct StdoutSink {
    clear_screen: bool,
}

impl StdoutSink {
    pub fn new(clear_screen: bool) -> Self {
        Self { clear_screen }
    }

    fn write_frame(&self, frame: &str) -> std::io::Result<()> {
        let mut out = std::io::stdout().lock();
        if self.clear_screen {
            out.write_all(CLEAR_SCREEN.as_bytes())?;
        }
        writeln!(out, "{}", frame)?;
        if !self.clear_screen {
            writeln!(out)?;
        }
        out.flush()
    }
}

impl FrameSink for StdoutSink {
    fn present(&mut self, frame: &str) {
        if let Err(error) = self.write_frame(frame) {
            log::warn!("frame_write_failed target=stdout error={}", error);
        }
    }
}

#[cfg(test)]
pub(crate) use capture::CaptureSink;
