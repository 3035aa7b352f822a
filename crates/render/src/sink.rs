//! Output side of the renderer.

use std::io;

use crate::frame::Frame;

/// Something a finished frame can be drawn to, such as a terminal.
pub trait RenderSink {
    /// Draw `frame`, replacing whatever was shown before.
    fn draw(&mut self, frame: &Frame) -> io::Result<()>;
}

/// Sink that keeps the last frame as plain text lines.
#[derive(Debug, Default, Clone)]
pub struct TextSink {
    lines: Vec<String>,
    frames: usize,
}

impl TextSink {
    /// An empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines of the last frame drawn.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Frames drawn so far.
    pub fn frames(&self) -> usize {
        self.frames
    }
}

impl RenderSink for TextSink {
    fn draw(&mut self, frame: &Frame) -> io::Result<()> {
        self.lines = frame.to_text();
        self.frames += 1;
        Ok(())
    }
}
