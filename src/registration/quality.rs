/// Dice overlap `2|A ∩ B| / (|A| + |B|)` of two equally sized masks. Two
/// empty masks overlap perfectly.
pub fn dice_coefficient(a: &[bool], b: &[bool]) -> f64 {
    let mut both = 0usize;
    let mut total = 0usize;
    for (&x, &y) in a.iter().zip(b) {
        both += usize::from(x && y);
        total += usize::from(x) + usize::from(y);
    }
    if total == 0 {
        1.0
    } else {
        2.0 * both as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dice_counts_overlap() {
        let a = [true, true, false, false];
        let b = [false, true, true, false];
        assert!((dice_coefficient(&a, &b) - 0.5).abs() < 1e-12);
        assert_eq!(dice_coefficient(&a, &a), 1.0);
        assert_eq!(dice_coefficient(&[false; 3], &[false; 3]), 1.0);
    }
}
