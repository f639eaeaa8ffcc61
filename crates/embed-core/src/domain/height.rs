//! Height clamping policy.
//!
//! The embedded page reports its content height, but the report comes from a
//! semi-trusted frame and may be missing, negative, `NaN`, or absurdly large.
//! [`clamp_height`] turns such a report into a pixel height that is never
//! smaller than the configured minimum, or rejects it outright.

use serde_json::Value;

/// Reconciles a reported content height against `min_height`.
///
/// Returns `None` (meaning "leave the current height alone") when the
/// candidate is absent, not a JSON number, not finite, or not strictly
/// positive.  Otherwise returns `max(ceil(candidate), min_height)`, saturated
/// at `u32::MAX`.
///
/// # Example
///
/// ```rust
/// use embed_core::clamp_height;
/// use serde_json::json;
///
/// assert_eq!(clamp_height(Some(&json!(500)), 700), Some(700));
/// assert_eq!(clamp_height(Some(&json!(900)), 700), Some(900));
/// assert_eq!(clamp_height(Some(&json!("900")), 700), None);
/// ```
pub fn clamp_height(candidate: Option<&Value>, min_height: u32) -> Option<u32> {
    let reported = candidate?.as_f64()?;
    if !reported.is_finite() || reported <= 0.0 {
        return None;
    }
    // `as` saturates float-to-int conversions, so huge reports pin to u32::MAX.
    let reported = reported.ceil() as u32;
    Some(reported.max(min_height))
}
