mod account;
mod catalog;
mod coins;
mod info;
mod transfer;

pub use account::*;
pub use catalog::*;
pub use coins::*;
pub use info::*;
pub use transfer::*;
