mod name;
mod profile;

pub use name::{ProfileName, CURRENT_ENTRY};
pub use profile::{ConnectionProfile, SslMode, StoredProfile};
