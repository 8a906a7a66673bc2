//! Graph algorithms operating on the trail graph in place

pub mod simplify;
