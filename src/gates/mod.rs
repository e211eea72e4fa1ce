//! Request gates: pure or near-pure checks that can abort a request before
//! any mutation happens.

pub mod unique;
pub mod validate;
