use thiserror::Error;

#[derive(Debug, Error)]
pub enum VideoError {
    #[error("Could not open {locator}: {reason}")]
    Open { locator: String, reason: String },
    #[error("No video stream in {0}")]
    NoVideoStream(String),
    #[error("Could not read packet: {0}")]
    Read(String),
    #[error("Could not decode frame: {0}")]
    Decode(String),
    #[error("Invalid time base {num}/{den}")]
    InvalidTimeBase { num: i32, den: i32 },
    #[error("Frame {width}x{height} (stride {stride}) cannot hold the overlay band: {reason}")]
    FrameGeometry {
        width: u32,
        height: u32,
        stride: usize,
        reason: String,
    },
    #[error("No line capacity requested")]
    ZeroCapacity,
    #[error("Video needs more than {capacity} lines")]
    CapacityExceeded { capacity: usize },
    #[error("No overlay line read from {0}")]
    NoLines(String),
    #[error("Cell {cell} outside a {cells} character half line")]
    CellOutOfRange { cell: usize, cells: usize },
}
