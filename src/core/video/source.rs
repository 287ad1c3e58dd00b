//! Frame source collaborator
//!
//! Container demuxing and codec decoding live outside this crate. A source
//! hands out packet metadata first so callers can skip packets without
//! paying for a decode.

use super::error::VideoError;
use super::frame::{PacketInfo, TimeBase, VideoFrame};

pub trait FrameSource {
    /// Time base of the video stream's timestamps.
    fn time_base(&self) -> TimeBase;

    /// Next packet of the video stream, `None` at end of stream.
    fn next_packet(&mut self) -> Result<Option<PacketInfo>, VideoError>;

    /// Decode the packet last returned by `next_packet`.
    fn decode_packet(&mut self) -> Result<VideoFrame, VideoError>;
}

/// Opens a frame source by locator (file path or URL).
pub trait OpenFrameSource {
    type Source: FrameSource;

    fn open(&self, locator: &str) -> Result<Self::Source, VideoError>;
}

/// In-memory source replaying prepared packets and frames.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    time_base: TimeBase,
    packets: Vec<(PacketInfo, VideoFrame)>,
    cursor: usize,
    decoded: usize,
}

impl ScriptedSource {
    pub fn new(time_base: TimeBase, packets: Vec<(PacketInfo, VideoFrame)>) -> Self {
        Self {
            time_base,
            packets,
            cursor: 0,
            decoded: 0,
        }
    }

    /// Number of packets handed out so far.
    pub fn packets_read(&self) -> usize {
        self.cursor
    }

    /// Number of packets decoded so far.
    pub fn frames_decoded(&self) -> usize {
        self.decoded
    }
}

impl FrameSource for ScriptedSource {
    fn time_base(&self) -> TimeBase {
        self.time_base
    }

    fn next_packet(&mut self) -> Result<Option<PacketInfo>, VideoError> {
        let packet = self.packets.get(self.cursor).map(|(info, _)| *info);
        if packet.is_some() {
            self.cursor += 1;
        }
        Ok(packet)
    }

    fn decode_packet(&mut self) -> Result<VideoFrame, VideoError> {
        let index = self
            .cursor
            .checked_sub(1)
            .ok_or_else(|| VideoError::Decode("no packet read yet".to_string()))?;
        self.decoded += 1;
        Ok(self.packets[index].1.clone())
    }
}
