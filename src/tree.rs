use crate::color::{Paint, Reading};
use crate::config::TreeConfig;
use crate::error::{Result, TreeError};
use crate::frame::{decode_brightness, encode_brightness, Frame, FrameLayout};
use crate::topology::{resolve, Position};
use crate::transport::{Transport, TransportError};

/// Frame buffer for the 25 LED tree, bound to the transport that sends it.
///
/// Writes only touch the buffer; nothing reaches the LEDs until
/// [`commit`](Self::commit) unless autocommit is on.
pub struct ChristmasTree<T: Transport> {
    frame: Frame,
    transport: Option<T>,
    autocommit: bool,
    default_brightness: u32,
}

impl<T: Transport> ChristmasTree<T> {
    /// Take ownership of `transport`, blank the LEDs and switch them off at
    /// the configured brightness.
    pub fn new(mut transport: T, config: &TreeConfig) -> Result<Self> {
        if let Err(e) = config.validate() {
            if let Err(close_err) = transport.close() {
                log::warn!("Failed to close transport: {}", close_err);
            }
            return Err(e);
        }

        let mut tree = ChristmasTree {
            frame: Frame::new(FrameLayout::new(config.led_count)),
            transport: Some(transport),
            autocommit: config.autocommit,
            default_brightness: config.brightness,
        };
        // Dropping `tree` on any failure below releases the transport
        tree.reset()?;
        tree.set_brightness(config.brightness)?;
        tree.off()?;

        log::debug!(
            "Tree ready ({} LEDs, brightness {}, autocommit {})",
            config.led_count,
            config.brightness,
            config.autocommit
        );
        Ok(tree)
    }

    pub fn len(&self) -> usize {
        self.frame.layout().nled
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn autocommit(&self) -> bool {
        self.autocommit
    }

    pub fn set_autocommit(&mut self, autocommit: bool) {
        self.autocommit = autocommit;
    }

    /// The raw frame exactly as it would be sent
    pub fn frame(&self) -> &[u8] {
        self.frame.as_bytes()
    }

    /// Write colors to every LED `position` names.
    ///
    /// Colors are validated up front. LEDs are then written in resolution
    /// order; an out-of-range index leaves the ones before it written.
    pub fn set(&mut self, position: impl Into<Position>, paint: impl Into<Paint>) -> Result<()> {
        self.write(&position.into(), &paint.into())?;
        if self.autocommit {
            self.commit()?;
        }
        Ok(())
    }

    /// Read back `[brightness, r, g, b]` for every LED `position` names
    pub fn get(&self, position: impl Into<Position>) -> Result<Reading> {
        let position = position.into();
        let indices = resolve(&position, self.len())?;
        let mut records = Vec::with_capacity(indices.len());
        for index in indices {
            self.check_index(index)?;
            records.push(self.frame.read(index));
        }

        if position.is_single() && records.len() == 1 {
            return Ok(Reading::One(records[0]));
        }
        Ok(Reading::Many(records))
    }

    /// Mean brightness level across all LEDs
    pub fn brightness(&self) -> f32 {
        let total: u32 = (0..self.len())
            .map(|i| decode_brightness(self.frame.brightness_byte(i)) as u32)
            .sum();
        total as f32 / self.len() as f32
    }

    /// Set every LED's brightness without touching colors. Does not commit.
    pub fn set_brightness(&mut self, level: u32) -> Result<()> {
        let byte = encode_brightness(level)?;
        for i in 0..self.len() {
            self.frame.write_brightness(i, byte);
        }
        Ok(())
    }

    /// Send the frame as it stands
    pub fn commit(&mut self) -> Result<()> {
        let transport = self.transport.as_mut().ok_or(TransportError::Closed)?;
        if log::log_enabled!(log::Level::Trace) {
            let hex: String = self
                .frame
                .as_bytes()
                .iter()
                .map(|b| format!("{:02x}", b))
                .collect::<Vec<_>>()
                .join(" ");
            log::trace!("Frame: {}", hex);
        }
        transport.transfer(self.frame.as_bytes())?;
        Ok(())
    }

    /// Black out every LED at the configured brightness, then send once
    pub fn off(&mut self) -> Result<()> {
        let byte = encode_brightness(self.default_brightness)?;
        for i in 0..self.len() {
            self.frame.write_brightness(i, byte);
            self.frame.write_rgb(i, [0, 0, 0]);
        }
        log::debug!("Off");
        self.commit()
    }

    /// Zero the whole frame, markers included, and send it
    pub fn reset(&mut self) -> Result<()> {
        self.frame.clear();
        log::debug!("Reset");
        self.commit()
    }

    /// Like [`reset`](Self::reset), then put each LED's brightness byte back
    /// without sending again
    pub fn reset_keep_brightness(&mut self) -> Result<()> {
        let saved: Vec<u8> = (0..self.len()).map(|i| self.frame.brightness_byte(i)).collect();
        self.reset()?;
        for (i, byte) in saved.into_iter().enumerate() {
            self.frame.write_brightness(i, byte);
        }
        Ok(())
    }

    /// Run `f` with autocommit suspended. If autocommit was on and `f`
    /// succeeds, the frame is sent exactly once at the end.
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> Result<R>) -> Result<R> {
        let autocommit = std::mem::replace(&mut self.autocommit, false);
        let result = f(self);
        self.autocommit = autocommit;
        let value = result?;
        if autocommit {
            self.commit()?;
        }
        Ok(value)
    }

    /// Release the transport. Dropping the tree does the same.
    pub fn close(mut self) -> Result<()> {
        self.release()
    }

    fn release(&mut self) -> Result<()> {
        match self.transport.take() {
            Some(mut transport) => {
                log::debug!("Closing transport");
                transport.close()?;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.len() {
            return Err(TreeError::IndexOutOfRange {
                index,
                limit: self.len(),
            });
        }
        Ok(())
    }

    fn write(&mut self, position: &Position, paint: &Paint) -> Result<()> {
        let indices = resolve(position, self.len())?;
        if let Paint::PerLed(colors) = paint {
            if colors.len() != indices.len() {
                return Err(TreeError::DimensionMismatch {
                    expected: indices.len(),
                    actual: colors.len(),
                });
            }
        }

        // Colors are checked before anything is written
        let encoded = match paint {
            Paint::Uniform(color) => vec![color.encode()?],
            Paint::PerLed(colors) => colors
                .iter()
                .map(|color| color.encode())
                .collect::<Result<Vec<_>>>()?,
        };

        for (n, index) in indices.into_iter().enumerate() {
            self.check_index(index)?;
            let (brightness, rgb) = encoded[n.min(encoded.len() - 1)];
            if let Some(byte) = brightness {
                self.frame.write_brightness(index, byte);
            }
            self.frame.write_rgb(index, rgb);
        }
        Ok(())
    }
}

impl<T: Transport> Drop for ChristmasTree<T> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            log::warn!("Failed to close transport: {}", e);
        }
    }
}
