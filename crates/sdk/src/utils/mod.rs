/// Fixed number convertions.
pub mod fixed;

/// Test utils.
#[cfg(test)]
pub mod test;

pub use self::fixed::{amount_to_decimal, decimal_to_amount, value_to_decimal};
