pub mod char_line;
pub mod error;
pub mod frame;
pub mod source;

pub use char_line::CharLine;
pub use error::VideoError;
pub use frame::{PacketInfo, TimeBase, VideoFrame};
pub use source::{FrameSource, OpenFrameSource, ScriptedSource};
