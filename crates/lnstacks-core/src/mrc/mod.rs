//! MRC volume codec.
//!
//! A volume is a 1024-byte header followed by `frames` contiguous blocks of
//! `rows * cols` little-endian float32 samples in row-major order.

mod header;
mod reader;
mod writer;

#[cfg(test)]
mod tests;

pub use header::{read_header, write_header, MrcHeader, MODE_FLOAT32};
pub use reader::{decode_frame, MrcReader};
pub use writer::MrcWriter;
