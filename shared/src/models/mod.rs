//! Domain models for the Kopi Nglurah production tracker

mod batch;
mod harvest;
mod schedule;
mod stage;
mod weather;

pub use batch::*;
pub use harvest::*;
pub use schedule::*;
pub use stage::*;
pub use weather::*;
