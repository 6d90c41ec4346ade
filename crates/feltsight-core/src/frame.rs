//! Command frame codec
//!
//! The glove firmware consumes a fixed 32-byte frame: a start marker, ten
//! 3-byte channel blocks of `[file index][volume][speed]`, and an end
//! marker. The current device model has no per-channel addressing, so the
//! periodic sender fills every channel with the same triple.

use thiserror::Error;

/// Total frame length in bytes
pub const FRAME_LEN: usize = 32;
/// First byte of every frame
pub const START_MARKER: u8 = 0xFE;
/// Last byte of every frame
pub const END_MARKER: u8 = 0xFF;
/// Number of 3-byte channel blocks
pub const CHANNEL_COUNT: usize = 10;
/// File index played on every channel
pub const FILE_INDEX: u8 = 1;
/// Speed byte for 1.0x playback
pub const MIN_SPEED_BYTE: u8 = 10;
/// Speed byte for 4.0x playback
pub const MAX_SPEED_BYTE: u8 = 40;

/// Frame validation failure
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FrameError {
    #[error("invalid frame length {0} (expected {FRAME_LEN})")]
    Length(usize),

    #[error("invalid start marker {0:#04X} (expected {START_MARKER:#04X})")]
    StartMarker(u8),

    #[error("invalid end marker {0:#04X} (expected {END_MARKER:#04X})")]
    EndMarker(u8),
}

/// One 3-byte channel block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Channel {
    pub file_index: u8,
    pub volume: u8,
    pub speed: u8,
}

/// Build a frame carrying the same speed/volume on all ten channels.
pub fn encode(speed_byte: u8, volume_byte: u8) -> [u8; FRAME_LEN] {
    encode_channels(
        &[Channel {
            file_index: FILE_INDEX,
            volume: volume_byte,
            speed: speed_byte,
        }; CHANNEL_COUNT],
    )
}

/// Build a frame from explicit per-channel triples.
pub fn encode_channels(channels: &[Channel; CHANNEL_COUNT]) -> [u8; FRAME_LEN] {
    let mut frame = [0u8; FRAME_LEN];
    frame[0] = START_MARKER;

    for (index, channel) in channels.iter().enumerate() {
        let offset = 1 + index * 3;
        frame[offset] = channel.file_index;
        frame[offset + 1] = channel.volume;
        frame[offset + 2] = channel.speed;
    }

    frame[FRAME_LEN - 1] = END_MARKER;
    frame
}

/// Cycling exercise pattern: file index 1-10, volume 50-100, speed 10-40.
/// Used to drive the device without hand tracking attached.
pub fn test_pattern(counter: u32) -> [u8; FRAME_LEN] {
    let mut channels = [Channel {
        file_index: FILE_INDEX,
        volume: 0,
        speed: MIN_SPEED_BYTE,
    }; CHANNEL_COUNT];

    for (index, channel) in channels.iter_mut().enumerate() {
        let step = counter as usize + index;
        channel.file_index = (step % 10 + 1) as u8;
        channel.volume = (50 + step % 51) as u8;
        channel.speed = MIN_SPEED_BYTE + (step % 31) as u8;
    }

    encode_channels(&channels)
}

/// Validate a frame and parse its channel blocks.
///
/// Diagnostics/testing aid; the device itself is a passive consumer and
/// never echoes frames back.
pub fn decode(frame: &[u8]) -> Result<[Channel; CHANNEL_COUNT], FrameError> {
    if frame.len() != FRAME_LEN {
        return Err(FrameError::Length(frame.len()));
    }
    if frame[0] != START_MARKER {
        return Err(FrameError::StartMarker(frame[0]));
    }
    if frame[FRAME_LEN - 1] != END_MARKER {
        return Err(FrameError::EndMarker(frame[FRAME_LEN - 1]));
    }

    let mut channels = [Channel {
        file_index: 0,
        volume: 0,
        speed: 0,
    }; CHANNEL_COUNT];

    for (index, channel) in channels.iter_mut().enumerate() {
        let offset = 1 + index * 3;
        channel.file_index = frame[offset];
        channel.volume = frame[offset + 1];
        channel.speed = frame[offset + 2];
    }

    Ok(channels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_structure() {
        let frame = encode(25, 75);

        assert_eq!(frame.len(), FRAME_LEN);
        assert_eq!(frame[0], START_MARKER);
        assert_eq!(frame[31], END_MARKER);

        for channel in 0..CHANNEL_COUNT {
            let offset = 1 + channel * 3;
            assert_eq!(frame[offset], FILE_INDEX);
            assert_eq!(frame[offset + 1], 75);
            assert_eq!(frame[offset + 2], 25);
        }
    }

    #[test]
    fn test_round_trip() {
        let frame = encode(40, 0);
        let channels = decode(&frame).unwrap();

        for channel in channels {
            assert_eq!(
                channel,
                Channel {
                    file_index: FILE_INDEX,
                    volume: 0,
                    speed: 40
                }
            );
        }
    }

    #[test]
    fn test_corrupt_start_marker_rejected() {
        let mut frame = encode(10, 75);
        frame[0] = 0x00;
        assert_eq!(decode(&frame), Err(FrameError::StartMarker(0x00)));
    }

    #[test]
    fn test_corrupt_end_marker_rejected() {
        let mut frame = encode(10, 75);
        frame[31] = 0xFE;
        assert_eq!(decode(&frame), Err(FrameError::EndMarker(0xFE)));
    }

    #[test]
    fn test_wrong_length_rejected() {
        let frame = encode(10, 75);
        assert_eq!(decode(&frame[..31]), Err(FrameError::Length(31)));
        assert!(decode(&[]).is_err());
    }

    #[test]
    fn test_per_channel_encode() {
        let mut channels = [Channel {
            file_index: 1,
            volume: 50,
            speed: 10,
        }; CHANNEL_COUNT];
        channels[3].volume = 90;
        channels[7].speed = 33;

        let decoded = decode(&encode_channels(&channels)).unwrap();
        assert_eq!(decoded, channels);
    }

    #[test]
    fn test_test_pattern_stays_in_range() {
        for counter in 0..100 {
            let channels = decode(&test_pattern(counter)).unwrap();
            for channel in channels {
                assert!((1..=10).contains(&channel.file_index));
                assert!((50..=100).contains(&channel.volume));
                assert!((MIN_SPEED_BYTE..=MAX_SPEED_BYTE).contains(&channel.speed));
            }
        }
    }

    #[test]
    fn test_test_pattern_cycles() {
        let first = decode(&test_pattern(0)).unwrap();
        let wrapped = decode(&test_pattern(10)).unwrap();
        assert_eq!(first[0].file_index, wrapped[0].file_index);
        assert_ne!(test_pattern(0), test_pattern(1));
    }
}
