//! Owned pixel buffer backing a grid instance

use super::frame::Frame;

/// ARGB pixel buffer in device pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelSurface {
    buffer: Vec<u32>,
    width: usize,
    height: usize,
}

impl PixelSurface {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            buffer: vec![0; width * height],
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.buffer
    }

    /// Reallocate the backing buffer. Previous contents are discarded.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.buffer = vec![0; width * height];
    }

    /// Drawing view over the whole buffer
    pub fn frame(&mut self) -> Frame<'_> {
        Frame::new(&mut self.buffer, self.width, self.height)
    }

    /// Copy the buffer as RGBA bytes (for PNG encoders)
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(self.buffer.len() * 4);
        for &pixel in &self.buffer {
            rgba.push(((pixel >> 16) & 0xFF) as u8);
            rgba.push(((pixel >> 8) & 0xFF) as u8);
            rgba.push((pixel & 0xFF) as u8);
            rgba.push(((pixel >> 24) & 0xFF) as u8);
        }
        rgba
    }
}
