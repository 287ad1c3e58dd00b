use image::GrayImage;

/// 解码后的视频帧 - 只保留亮度平面
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    /// Bytes per row, at least `width`
    pub stride: usize,
    pub y_plane: Vec<u8>,
    /// Presentation timestamp in time base units
    pub pts: i64,
}

impl VideoFrame {
    pub fn new(width: u32, height: u32, y_plane: Vec<u8>, pts: i64) -> Self {
        Self::with_stride(width, height, width as usize, y_plane, pts)
    }

    pub fn with_stride(width: u32, height: u32, stride: usize, y_plane: Vec<u8>, pts: i64) -> Self {
        Self {
            width,
            height,
            stride,
            y_plane,
            pts,
        }
    }

    pub fn filled(width: u32, height: u32, value: u8, pts: i64) -> Self {
        Self::new(width, height, vec![value; (width * height) as usize], pts)
    }

    pub fn from_gray_image(image: &GrayImage, pts: i64) -> Self {
        Self::new(image.width(), image.height(), image.as_raw().clone(), pts)
    }

    /// True when every row `0..height` is fully backed by `y_plane`.
    pub fn is_consistent(&self) -> bool {
        self.stride >= self.width as usize
            && self.y_plane.len() >= self.stride * self.height as usize
    }

    /// Row `y`, `width` bytes long. Caller checks `is_consistent`.
    pub fn row(&self, y: usize) -> &[u8] {
        let start = y * self.stride;
        &self.y_plane[start..start + self.width as usize]
    }

    pub fn luma(&self, x: usize, y: usize) -> u8 {
        self.y_plane[y * self.stride + x]
    }
}

/// Container-level packet metadata, available before decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketInfo {
    pub pts: i64,
    pub dts: i64,
    /// Decodable without any other packet
    pub keyframe: bool,
}

/// Rational stream time base: one tick lasts `num / den` seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBase {
    pub num: i32,
    pub den: i32,
}

impl TimeBase {
    pub fn new(num: i32, den: i32) -> Self {
        Self { num, den }
    }

    /// Whole ticks per second, `None` for a degenerate time base.
    pub fn ticks_per_second(&self) -> Option<i64> {
        if self.num <= 0 || self.den <= 0 {
            return None;
        }
        let ticks = self.den as i64 / self.num as i64;
        (ticks > 0).then_some(ticks)
    }
}
