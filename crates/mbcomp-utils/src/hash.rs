//! Hash functions for stable ID generation.
//!
//! Parameter keys such as `"Attack_Low_Band"` are human readable, but hosts and
//! automation lanes address parameters by a `u32`. The mapping between the two
//! must never change between builds, so it is a fixed, const-evaluable hash.

/// Compute FNV-1a 32-bit hash of a string.
///
/// Deterministic across platforms and compiler versions, allocation free and
/// usable in const context, so parameter IDs can be declared as constants.
///
/// # Examples
///
/// ```
/// use mbcomp_utils::fnv1a_32;
///
/// let id = fnv1a_32("Gain_in");
///
/// const GAIN_OUT_ID: u32 = fnv1a_32("Gain_out");
/// assert_ne!(id, GAIN_OUT_ID);
/// ```
///
/// # Collisions
///
/// Two keys can in principle hash to the same ID. Parameter collections
/// check for this once at preparation time (see `Parameters::validate` in
/// `mbcomp-core`), never on the audio thread.
#[inline]
pub const fn fnv1a_32(s: &str) -> u32 {
    const FNV_OFFSET: u32 = 2166136261;
    const FNV_PRIME: u32 = 16777619;

    let bytes = s.as_bytes();
    let mut hash = FNV_OFFSET;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    hash
}
