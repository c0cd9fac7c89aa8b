//! Standard exit codes (BSD sysexits.h compatible)

/// No tip matched the pattern
pub const NOMATCH: i32 = 2;

/// MRCA found but it has no name to print
pub const UNNAMED: i32 = 3;

/// Command line usage error
pub const USAGE: i32 = 64;

/// Data format error
pub const DATAERR: i32 = 65;

/// Cannot open input
pub const NOINPUT: i32 = 66;

/// Input/output error
pub const IOERR: i32 = 74;

/// Configuration error
pub const CONFIG: i32 = 78;
