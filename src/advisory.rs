use crate::NoiseLevel;

const MEDIUM_TIPS: [&str; 4] = [
    "Shield Your Cables: Use shielded cables to minimize electrostatic noise.",
    "Use Twisted Pair Cables: Helps eliminate normal mode noise.",
    "Isolate Signals: Prevent ground loops by isolating noisy devices.",
    "Use Differential Measurements: Reduces common mode noise and improves signal integrity.",
];

const HIGH_TIPS: [&str; 4] = [
    "Ground Wires Properly: Establish a ground plane for stable reference potential.",
    "Route Wires Strategically: Segregate high and low voltage lines to avoid interference.",
    "Use Anti-Aliasing Filters: Minimize aliasing and filter high-frequency noise.",
    "Consider Application-Specific Noise Control: Consult vendors and follow component instructions.",
];

/// Noise reduction tips for a level, in display order.
pub fn noise_reduction_tips(level: NoiseLevel) -> &'static [&'static str] {
    match level {
        NoiseLevel::Low => &[],
        NoiseLevel::Medium => &MEDIUM_TIPS,
        NoiseLevel::High => &HIGH_TIPS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_noise_has_no_tips() {
        assert!(noise_reduction_tips(NoiseLevel::Low).is_empty());
    }

    #[test]
    fn medium_and_high_have_four_tips_each() {
        for level in [NoiseLevel::Medium, NoiseLevel::High] {
            let tips = noise_reduction_tips(level);
            assert_eq!(tips.len(), 4);
            assert!(tips.iter().all(|tip| !tip.is_empty()));
            assert_eq!(tips, noise_reduction_tips(level));
        }
    }

    #[test]
    fn tip_lists_differ_by_level() {
        assert_ne!(
            noise_reduction_tips(NoiseLevel::Medium),
            noise_reduction_tips(NoiseLevel::High)
        );
        assert!(noise_reduction_tips(NoiseLevel::High)[0].starts_with("Ground Wires Properly"));
    }
}
