pub mod codec;
mod pointer;
mod profiles;

pub use pointer::{CurrentPointer, PointerStyle};
pub use profiles::ProfileStore;
