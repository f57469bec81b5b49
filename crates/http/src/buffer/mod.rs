//! Owned byte storage shared by the receiver and the parser.
//!
//! - [`GrowableBuffer`]: resizable bytes with doubling growth, used for raw
//!   socket data and for every text field of a parsed request

mod growable_buffer;

pub use growable_buffer::GrowableBuffer;
