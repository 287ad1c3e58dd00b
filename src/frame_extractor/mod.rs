//! 叠加层文字行提取 - 从行车记录仪视频中每秒读取一行
//!
//! 核心策略：
//! 1. 字形相关匹配 - 固定字符集，无需 OCR
//! 2. 状态机驱动 - 先按秒位变化校准，再每秒只解码一个关键帧

pub mod line_reader;
pub mod pipeline;
pub mod state_machine;

pub use line_reader::{Half, LineExtractor, LineReader, MockLineReader};
pub use pipeline::TemporalSampler;
pub use state_machine::{SamplerAction, SamplerEvent, SamplerMachine, SamplerState};
