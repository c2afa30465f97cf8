//! Typed, range-validated job settings and the JSON batch configuration they are built from.

pub(crate) mod batch;
pub(crate) mod options;
