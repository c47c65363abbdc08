//! Contains modules for field, ring and matrix arithmetic

pub(crate) mod field;
mod matrix_arith;
mod ring_arith;

// Export all the underlying types
pub(crate) use matrix_arith::*;
pub(crate) use ring_arith::*;
