//! Domain models for the Palm Oil Intelligence platform

mod company;
mod news;
mod plantation;
mod weather;

pub use company::*;
pub use news::*;
pub use plantation::*;
pub use weather::*;
