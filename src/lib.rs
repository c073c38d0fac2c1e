//! Frame buffer driver for a 25 LED RGB Christmas tree.
//!
//! The tree is a chain of APA102-style LEDs: 24 on eight branches of three
//! plus a star on top. [`ChristmasTree`] keeps one frame of the wire
//! protocol in memory, lets callers address LEDs by flat index, grid
//! position, range or the star alias, and hands the frame to a
//! [`Transport`] on [`commit`](ChristmasTree::commit).

pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod topology;
pub mod transport;
pub mod tree;

pub use color::{Color, Paint, Reading};
pub use config::{Config, TransportConfig, TreeConfig};
pub use error::{Result, TreeError};
pub use topology::{Position, Selector, Span};
pub use transport::{SerialTransport, Transport, TransportError};
pub use tree::ChristmasTree;
