//! Store operations called by the CLI.
//!
//! Each function takes the `StoreConfig` built at process start and
//! performs one command's worth of filesystem work.

mod list;
mod mutations;
mod show;
mod types;

pub use list::list_profiles;
pub use mutations::{create_profile, create_profile_with, delete_profile, set_current, CreateOptions};
pub use show::read_profile;
pub use types::ProfileEntry;
