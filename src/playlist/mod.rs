//! Output playlist generation

pub mod emitter;

pub use emitter::PlaylistEmitter;
