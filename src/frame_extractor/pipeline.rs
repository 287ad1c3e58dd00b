use log::{debug, info};

use crate::core::config::SamplerConfig;
use crate::core::video::{CharLine, FrameSource, OpenFrameSource, VideoError};
use crate::frame_extractor::line_reader::LineReader;
use crate::frame_extractor::state_machine::{SamplerAction, SamplerEvent, SamplerMachine};

/// One overlay line per elapsed second of video.
pub struct TemporalSampler {
    config: SamplerConfig,
}

impl TemporalSampler {
    pub fn new(config: SamplerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Open `locator` and sample it. Zero capacity fails before opening.
    pub fn sample<O>(
        &self,
        opener: &O,
        locator: &str,
        reader: &dyn LineReader,
    ) -> Result<Vec<CharLine>, VideoError>
    where
        O: OpenFrameSource + ?Sized,
    {
        if self.config.max_lines == 0 {
            return Err(VideoError::ZeroCapacity);
        }

        info!("🎬 Opening {}", locator);
        let mut source = opener.open(locator)?;
        self.sample_source(&mut source, reader)
    }

    pub fn sample_source<S>(
        &self,
        source: &mut S,
        reader: &dyn LineReader,
    ) -> Result<Vec<CharLine>, VideoError>
    where
        S: FrameSource + ?Sized,
    {
        let capacity = self.config.max_lines;
        if capacity == 0 {
            return Err(VideoError::ZeroCapacity);
        }

        let time_base = source.time_base();
        let ticks_per_second =
            time_base
                .ticks_per_second()
                .ok_or(VideoError::InvalidTimeBase {
                    num: time_base.num,
                    den: time_base.den,
                })?;

        let mut machine = SamplerMachine::new(capacity, ticks_per_second);
        let mut lines = Vec::new();

        loop {
            let event = match source.next_packet()? {
                Some(packet) => SamplerEvent::Packet(packet),
                None => SamplerEvent::EndOfStream,
            };

            match machine.process_event(event) {
                SamplerAction::Decode => {
                    let frame = source.decode_packet()?;
                    let line = reader.read_line(&frame)?;
                    let seconds_digit = line
                        .right_from_end(self.config.seconds_digit_from_end)
                        .unwrap_or(b' ');

                    let calibrating = machine.calibration_offset().is_none();
                    let decoded = SamplerEvent::Decoded {
                        pts: frame.pts,
                        seconds_digit,
                    };
                    if machine.process_event(decoded) == SamplerAction::Keep {
                        debug!("Line {} at pts {}: {}", lines.len(), frame.pts, line);
                        lines.push(line);
                    }
                    if let (true, Some(offset)) = (calibrating, machine.calibration_offset()) {
                        info!("⏱️ Calibrated on seconds change at pts {}", offset);
                    }
                }
                SamplerAction::CapacityExceeded => {
                    return Err(VideoError::CapacityExceeded { capacity });
                }
                SamplerAction::Finish => break,
                SamplerAction::Skip | SamplerAction::Keep | SamplerAction::Discard => {}
            }
        }

        info!("✅ Sampled {} lines", lines.len());
        Ok(lines)
    }
}

impl Default for TemporalSampler {
    fn default() -> Self {
        Self::new(SamplerConfig::default())
    }
}
