/// Mean review score rounded half-up, or `None` when there are no reviews.
///
/// Scores are positive, so `(2 * sum + count) / (2 * count)` is exactly
/// `floor(sum / count + 1/2)` in integer arithmetic.
#[must_use]
pub fn rating_from(sum: i64, count: i64) -> Option<i32> {
    if count <= 0 {
        return None;
    }
    i32::try_from((2 * sum + count) / (2 * count)).ok()
}

#[must_use]
pub fn rating_of(scores: &[i32]) -> Option<i32> {
    let sum: i64 = scores.iter().map(|&s| i64::from(s)).sum();
    let count = i64::try_from(scores.len()).ok()?;
    rating_from(sum, count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_reviews_has_no_rating() {
        assert_eq!(rating_of(&[]), None);
        assert_eq!(rating_from(0, 0), None);
    }

    #[test]
    fn test_half_rounds_up() {
        assert_eq!(rating_of(&[7, 8, 9, 10]), Some(9));
        assert_eq!(rating_of(&[1, 2]), Some(2));
        assert_eq!(rating_of(&[9, 10]), Some(10));
    }

    #[test]
    fn test_rounds_to_nearest() {
        assert_eq!(rating_of(&[1, 1, 2]), Some(1));
        assert_eq!(rating_of(&[1, 2, 2]), Some(2));
        assert_eq!(rating_of(&[10]), Some(10));
    }
}
