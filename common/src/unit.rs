//! Marker types.

/// Marker type describing an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker type describing an entity cancellation.
#[derive(Clone, Copy, Debug)]
pub struct Cancellation;

/// Marker type describing an entity confirmation.
#[derive(Clone, Copy, Debug)]
pub struct Confirmation;
