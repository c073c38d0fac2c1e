use crate::error::{Result, TreeError};

/// Zero bytes that open every frame
pub const HEADER_LEN: usize = 4;
/// Bytes per LED: brightness, blue, green, red
pub const RECORD_LEN: usize = 4;
/// Zero bytes that close a 25 LED frame
pub const TRAILER_LEN: usize = 5;

/// Top three bits of every brightness byte
pub const BRIGHTNESS_MARKER: u8 = 0b1110_0000;
pub const BRIGHTNESS_MASK: u8 = 0b0001_1111;
pub const MAX_BRIGHTNESS: u32 = 31;

/// Encode a brightness level (0..=31) into its on-wire byte
pub fn encode_brightness(level: u32) -> Result<u8> {
    if level > MAX_BRIGHTNESS {
        return Err(TreeError::BrightnessRange(level));
    }
    Ok(BRIGHTNESS_MARKER | level as u8)
}

/// Recover the brightness level from an on-wire byte
pub fn decode_brightness(byte: u8) -> u8 {
    byte & BRIGHTNESS_MASK
}

/// Geometry of one frame: start marker, LED records, end marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    pub nled: usize,
    pub header_len: usize,
    pub trailer_len: usize,
}

impl FrameLayout {
    pub fn new(nled: usize) -> Self {
        FrameLayout {
            nled,
            header_len: HEADER_LEN,
            trailer_len: TRAILER_LEN,
        }
    }

    /// Check that the markers are long enough to clock out `nled` records
    pub fn validate(&self) -> Result<()> {
        if self.nled == 0 {
            return Err(TreeError::Configuration("LED count must be at least 1".into()));
        }
        if self.header_len < HEADER_LEN {
            return Err(TreeError::Configuration(format!(
                "start marker must be at least {} bytes, got {}",
                HEADER_LEN, self.header_len
            )));
        }
        // The end marker needs one clock edge per two LEDs
        let min_trailer = self.nled.div_ceil(16);
        if self.trailer_len < min_trailer {
            return Err(TreeError::Configuration(format!(
                "end marker of {} bytes is too short for {} LEDs (need {})",
                self.trailer_len, self.nled, min_trailer
            )));
        }
        Ok(())
    }

    /// Total frame length in bytes
    pub fn len(&self) -> usize {
        self.header_len + self.nled * RECORD_LEN + self.trailer_len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Byte offset of the record for LED `index`
    pub fn record_offset(&self, index: usize) -> usize {
        self.header_len + index * RECORD_LEN
    }
}

/// Fixed-length transmit buffer. Only record bytes change after construction.
#[derive(Debug, Clone)]
pub struct Frame {
    layout: FrameLayout,
    bytes: Vec<u8>,
}

impl Frame {
    pub fn new(layout: FrameLayout) -> Self {
        Frame {
            layout,
            bytes: vec![0u8; layout.len()],
        }
    }

    pub fn layout(&self) -> &FrameLayout {
        &self.layout
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Zero every byte, markers included
    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    /// Decoded `[brightness, r, g, b]` of one LED
    pub(crate) fn read(&self, index: usize) -> [u8; 4] {
        let s = self.layout.record_offset(index);
        let record = &self.bytes[s..s + RECORD_LEN];
        [decode_brightness(record[0]), record[3], record[2], record[1]]
    }

    /// Store R,G,B in wire order (B,G,R), leaving the brightness byte alone
    pub(crate) fn write_rgb(&mut self, index: usize, [r, g, b]: [u8; 3]) {
        let s = self.layout.record_offset(index);
        self.bytes[s + 1] = b;
        self.bytes[s + 2] = g;
        self.bytes[s + 3] = r;
    }

    /// Store an already encoded brightness byte
    pub(crate) fn write_brightness(&mut self, index: usize, byte: u8) {
        let s = self.layout.record_offset(index);
        self.bytes[s] = byte;
    }

    pub(crate) fn brightness_byte(&self, index: usize) -> u8 {
        self.bytes[self.layout.record_offset(index)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_length() {
        let layout = FrameLayout::new(25);
        assert!(layout.validate().is_ok());
        assert_eq!(layout.len(), 109);
        assert!(!layout.is_empty());
        assert_eq!(layout.record_offset(0), 4);
        assert_eq!(layout.record_offset(24), 100);
    }

    #[test]
    fn test_layout_rejects_short_trailer() {
        let layout = FrameLayout {
            nled: 100,
            header_len: HEADER_LEN,
            trailer_len: 5,
        };
        assert!(matches!(layout.validate(), Err(TreeError::Configuration(_))));
    }

    #[test]
    fn test_layout_rejects_empty() {
        assert!(matches!(
            FrameLayout::new(0).validate(),
            Err(TreeError::Configuration(_))
        ));
    }

    #[test]
    fn test_brightness_encoding() {
        assert_eq!(encode_brightness(0).unwrap(), 0xE0);
        assert_eq!(encode_brightness(1).unwrap(), 0xE1);
        assert_eq!(encode_brightness(31).unwrap(), 0xFF);
        for level in 0..=MAX_BRIGHTNESS {
            let byte = encode_brightness(level).unwrap();
            assert_eq!(decode_brightness(byte) as u32, level);
        }
    }

    #[test]
    fn test_brightness_out_of_range() {
        assert!(matches!(
            encode_brightness(32),
            Err(TreeError::BrightnessRange(32))
        ));
    }

    #[test]
    fn test_record_is_bgr_on_wire() {
        let mut frame = Frame::new(FrameLayout::new(25));
        frame.write_brightness(2, 0xE5);
        frame.write_rgb(2, [255, 128, 0]); // Orange
        assert_eq!(&frame.as_bytes()[12..16], &[0xE5, 0, 128, 255]);
        assert_eq!(frame.read(2), [5, 255, 128, 0]);
    }

    #[test]
    fn test_write_rgb_keeps_brightness() {
        let mut frame = Frame::new(FrameLayout::new(25));
        frame.write_brightness(0, 0xE7);
        frame.write_rgb(0, [1, 2, 3]);
        assert_eq!(frame.brightness_byte(0), 0xE7);
    }

    #[test]
    fn test_clear_zeroes_markers() {
        let mut frame = Frame::new(FrameLayout::new(25));
        frame.write_brightness(24, 0xFF);
        frame.clear();
        assert!(frame.as_bytes().iter().all(|&b| b == 0));
        assert_eq!(frame.as_bytes().len(), 109);
    }
}
