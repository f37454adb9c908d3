//! Process exit codes, stable for scripting.

use quarry_error::{ErrorKind, QuarryError};

pub const FAILURE: i32 = 1;
pub const USAGE: i32 = 2;
pub const SOURCE: i32 = 3;
pub const UNAVAILABLE: i32 = 4;

pub fn for_error(err: &QuarryError) -> i32 {
    match err.kind() {
        ErrorKind::UnknownName
        | ErrorKind::UnsupportedFormat
        | ErrorKind::MalformedQuery
        | ErrorKind::Transform => USAGE,
        ErrorKind::Source => SOURCE,
        ErrorKind::MissingOptionalDependency => UNAVAILABLE,
        _ => FAILURE,
    }
}
