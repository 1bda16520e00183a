use std::fmt;

use serde::Serialize;

/// One row of `list` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileEntry {
    pub name: String,
    pub current: bool,
}

impl fmt::Display for ProfileEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.current {
            write!(f, "*{}", self.name)
        } else {
            f.write_str(&self.name)
        }
    }
}
