pub mod consts;
pub mod error;
pub mod exposure;
pub mod fft;
pub mod io;
pub mod pipeline;
pub mod stack;
