//! Decoder sessions

mod local;

pub use local::SymphoniaSession;
