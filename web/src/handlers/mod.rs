//! Ready-made handlers.

pub mod fallback;
