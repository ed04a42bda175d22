//! Common types used throughout the crate.

// =============================================================================
// Audio Buffer Limits
// =============================================================================
//
// Upper bound for the number of channels a buffer view can carry. Host buffer
// views use fixed-size stack storage sized by this constant so building one in
// the audio callback never allocates. Layouts above the limit are rejected at
// preparation time.
// =============================================================================

/// Maximum number of audio channels per bus.
pub const MAX_CHANNELS: usize = 32;

/// Parameter identifier (FNV-1a hash of the parameter key).
pub type ParameterId = u32;

/// Parameter value, normalized (0.0 to 1.0) or plain depending on the call.
pub type ParameterValue = f64;
