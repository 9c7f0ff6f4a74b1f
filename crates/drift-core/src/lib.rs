pub mod align;
pub mod compute;
pub mod config;
pub mod consts;
pub mod error;
pub mod frame;
pub mod io;
pub mod progress;
