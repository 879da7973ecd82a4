pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}

/// `part / whole` as a whole-number percentage, rounded half away from zero.
/// An empty `whole` is 0%.
pub fn rounded_percent(part: u32, whole: u32) -> u32 {
    match whole {
        0 => 0,
        _ => (f64::from(part) / f64::from(whole) * 100.0).round() as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[10., 20., 30., 15., 22.]), Some(19.4));
        assert_eq!(mean(&[2.5, 5.0]), Some(3.75));
    }

    #[test]
    fn test_mean_single_value() {
        assert_eq!(mean(&[42.0]), Some(42.0));
    }

    #[test]
    fn test_mean_empty_slice() {
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_rounded_percent() {
        assert_eq!(rounded_percent(7, 10), 70);
        assert_eq!(rounded_percent(10, 10), 100);
        assert_eq!(rounded_percent(1, 3), 33);
        assert_eq!(rounded_percent(2, 3), 67);
        assert_eq!(rounded_percent(1, 8), 13);
    }

    #[test]
    fn test_rounded_percent_no_rounds() {
        assert_eq!(rounded_percent(0, 0), 0);
    }
}
