use super::CHANNELS;

/// Owning BGRA pixel grid, row-major with no row padding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl FrameBuffer {
    /// Creates a zero-filled buffer. Zero is the overlay's transparent color key.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * CHANNELS],
        }
    }

    /// Creates a buffer with every pixel set to `bgra`.
    pub fn filled(width: u32, height: u32, bgra: [u8; 4]) -> Self {
        let mut buffer = Self::new(width, height);
        buffer.fill(bgra);
        buffer
    }

    /// Wraps raw BGRA bytes. Returns `None` if the length does not match.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        (data.len() == width as usize * height as usize * CHANNELS).then_some(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> usize {
        CHANNELS
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize * CHANNELS
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride();
        &self.data[start..start + self.stride()]
    }

    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let stride = self.stride();
        let start = y as usize * stride;
        &mut self.data[start..start + stride]
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = y as usize * self.stride() + x as usize * CHANNELS;
        let px = &self.data[offset..offset + CHANNELS];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Writes one pixel; out-of-bounds writes are ignored.
    pub fn put_pixel(&mut self, x: u32, y: u32, bgra: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let offset = y as usize * self.stride() + x as usize * CHANNELS;
        self.data[offset..offset + CHANNELS].copy_from_slice(&bgra);
    }

    pub fn fill(&mut self, bgra: [u8; 4]) {
        for px in self.data.chunks_exact_mut(CHANNELS) {
            px.copy_from_slice(&bgra);
        }
    }

    /// Returns a zeroed buffer of the new size holding the overlapping
    /// top-left part of this one.
    pub fn resized(&self, width: u32, height: u32) -> FrameBuffer {
        let mut out = FrameBuffer::new(width, height);
        let keep_w = self.width.min(width) as usize * CHANNELS;
        for y in 0..self.height.min(height) {
            out.row_mut(y)[..keep_w].copy_from_slice(&self.row(y)[..keep_w]);
        }
        out
    }
}
