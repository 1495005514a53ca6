/// Smallest exit code a guest program may request through `EXIT`.
pub const EXIT_CODE_MIN: i64 = 0;

/// Largest exit code a guest program may request through `EXIT`.
pub const EXIT_CODE_MAX: i64 = 49;

/// Maximum number of operands any instruction takes.
pub const MAX_OPERANDS: usize = 3;

/// Number of decimal digits in a string escape sequence (`\DDD`).
pub const ESCAPE_DIGITS: usize = 3;
