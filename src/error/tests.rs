use assert2::check;

use crate::error::{InvalidIterations, NewMeshError};

#[test]
fn display() {
    let error = InvalidIterations::new(99, "exceeds MAX_SUBDIVISIONS");

    check!(error.to_string() == "invalid refinement depth (got 99): exceeds MAX_SUBDIVISIONS");
    check!(NewMeshError::from(error).to_string() == error.to_string());
}

#[test]
fn source_points_at_the_cause() {
    use std::error::Error;

    let error = NewMeshError::from(InvalidIterations::new(15, "exceeds MAX_SUBDIVISIONS"));

    check!(error.source().is_some());
}
