use crate::core::video::PacketInfo;

/// 采样状态
///
/// Calibration decodes every packet until the overlay's seconds digit
/// changes; that frame's timestamp anchors one-line-per-second sampling.
#[derive(Debug, Clone, PartialEq)]
pub enum SamplerState {
    Calibrating { reference_digit: Option<u8> },
    Sampling { calibration_offset: i64, next_index: u64 },
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SamplerEvent {
    Packet(PacketInfo),
    /// The last packet was decoded and read
    Decoded { pts: i64, seconds_digit: u8 },
    EndOfStream,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SamplerAction {
    Skip,
    Decode,
    Keep,
    Discard,
    CapacityExceeded,
    Finish,
}

/// Inputs of a transition that live outside the state.
#[derive(Debug, Clone, Copy)]
pub struct SamplerLimits {
    pub capacity: usize,
    pub ticks_per_second: i64,
}

impl SamplerState {
    pub fn new() -> Self {
        SamplerState::Calibrating {
            reference_digit: None,
        }
    }

    pub fn transition(
        &self,
        event: SamplerEvent,
        emitted: usize,
        limits: &SamplerLimits,
    ) -> (SamplerState, SamplerAction) {
        match (self, event) {
            (SamplerState::Done, _) | (_, SamplerEvent::EndOfStream) => {
                (SamplerState::Done, SamplerAction::Finish)
            }

            (SamplerState::Calibrating { .. }, SamplerEvent::Packet(_)) => {
                (self.clone(), SamplerAction::Decode)
            }

            (
                SamplerState::Calibrating { reference_digit },
                SamplerEvent::Decoded { pts, seconds_digit },
            ) => match reference_digit {
                None => (
                    SamplerState::Calibrating {
                        reference_digit: Some(seconds_digit),
                    },
                    SamplerAction::Keep,
                ),
                Some(reference) if *reference == seconds_digit => {
                    (self.clone(), SamplerAction::Discard)
                }
                Some(_) => (
                    SamplerState::Sampling {
                        calibration_offset: pts,
                        next_index: 0,
                    },
                    SamplerAction::Discard,
                ),
            },

            (
                SamplerState::Sampling {
                    calibration_offset,
                    next_index,
                },
                SamplerEvent::Packet(packet),
            ) => {
                let due = (*next_index as i64)
                    .saturating_mul(limits.ticks_per_second)
                    .saturating_add(*calibration_offset);
                if packet.dts < due || !packet.keyframe {
                    (self.clone(), SamplerAction::Skip)
                } else if emitted >= limits.capacity {
                    (SamplerState::Done, SamplerAction::CapacityExceeded)
                } else {
                    (self.clone(), SamplerAction::Decode)
                }
            }

            (
                SamplerState::Sampling {
                    calibration_offset,
                    next_index,
                },
                SamplerEvent::Decoded { .. },
            ) => (
                SamplerState::Sampling {
                    calibration_offset: *calibration_offset,
                    next_index: next_index + 1,
                },
                SamplerAction::Keep,
            ),
        }
    }
}

impl Default for SamplerState {
    fn default() -> Self {
        Self::new()
    }
}

pub struct SamplerMachine {
    state: SamplerState,
    limits: SamplerLimits,
    kept: usize,
}

impl SamplerMachine {
    pub fn new(capacity: usize, ticks_per_second: i64) -> Self {
        Self {
            state: SamplerState::new(),
            limits: SamplerLimits {
                capacity,
                ticks_per_second,
            },
            kept: 0,
        }
    }

    pub fn process_event(&mut self, event: SamplerEvent) -> SamplerAction {
        let (new_state, action) = self.state.transition(event, self.kept, &self.limits);
        self.state = new_state;

        if action == SamplerAction::Keep {
            self.kept += 1;
        }
        action
    }

    pub fn current_state(&self) -> &SamplerState {
        &self.state
    }

    /// Calibration offset once sampling started.
    pub fn calibration_offset(&self) -> Option<i64> {
        match self.state {
            SamplerState::Sampling {
                calibration_offset, ..
            } => Some(calibration_offset),
            _ => None,
        }
    }

    pub fn kept_count(&self) -> usize {
        self.kept
    }
}
