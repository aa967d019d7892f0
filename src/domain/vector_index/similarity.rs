/// Convert a squared Euclidean distance between unit vectors into a
/// similarity score in `[0, 1]`.
///
/// For unit vectors `d = 2 - 2cos`, so this is the cosine clamped at zero.
pub fn distance_to_similarity(distance: f32) -> f32 {
    (1.0 - distance / 2.0).max(0.0)
}
