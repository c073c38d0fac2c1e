use crate::error::{Result, TreeError};
use crate::frame::encode_brightness;

/// Requested LED color, optionally with a brightness level.
///
/// Channels are wider than a byte so out-of-range input can be rejected
/// rather than silently truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub brightness: Option<u32>,
    pub red: u32,
    pub green: u32,
    pub blue: u32,
}

impl Color {
    /// Color at the LED's current brightness
    pub const fn rgb(red: u32, green: u32, blue: u32) -> Self {
        Color {
            brightness: None,
            red,
            green,
            blue,
        }
    }

    pub const fn with_brightness(brightness: u32, red: u32, green: u32, blue: u32) -> Self {
        Color {
            brightness: Some(brightness),
            red,
            green,
            blue,
        }
    }

    /// Build from `[r, g, b]` or `[brightness, r, g, b]`
    pub fn from_channels(channels: &[u32]) -> Result<Self> {
        match *channels {
            [r, g, b] => Ok(Color::rgb(r, g, b)),
            [level, r, g, b] => Ok(Color::with_brightness(level, r, g, b)),
            _ => Err(TreeError::ColorLength(channels.len())),
        }
    }

    /// Validate and convert to wire values: encoded brightness byte and R,G,B
    pub(crate) fn encode(&self) -> Result<(Option<u8>, [u8; 3])> {
        let brightness = self.brightness.map(encode_brightness).transpose()?;
        let mut rgb = [0u8; 3];
        for (slot, value) in rgb.iter_mut().zip([self.red, self.green, self.blue]) {
            *slot = u8::try_from(value).map_err(|_| TreeError::ChannelRange(value))?;
        }
        Ok((brightness, rgb))
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Color::rgb(r.into(), g.into(), b.into())
    }
}

impl From<[u8; 4]> for Color {
    fn from([level, r, g, b]: [u8; 4]) -> Self {
        Color::with_brightness(level.into(), r.into(), g.into(), b.into())
    }
}

/// Colors for a `set` call: one color for every addressed LED, or one per LED
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Paint {
    Uniform(Color),
    PerLed(Vec<Color>),
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Paint::Uniform(color)
    }
}

impl From<[u8; 3]> for Paint {
    fn from(rgb: [u8; 3]) -> Self {
        Paint::Uniform(rgb.into())
    }
}

impl From<Vec<Color>> for Paint {
    fn from(colors: Vec<Color>) -> Self {
        Paint::PerLed(colors)
    }
}

/// Decoded `[brightness, r, g, b]` values, shaped like the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reading {
    One([u8; 4]),
    Many(Vec<[u8; 4]>),
}

impl Reading {
    /// Flatten to a list regardless of shape
    pub fn into_vec(self) -> Vec<[u8; 4]> {
        match self {
            Reading::One(record) => vec![record],
            Reading::Many(records) => records,
        }
    }
}
