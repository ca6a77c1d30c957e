//! Total order over quality tiers and the upgrade eligibility rule.

use std::cmp::Ordering;

use crate::metadata::QualityTier;

pub fn rank(tier: QualityTier) -> i32 {
    tier.rank()
}

/// Natural comparison by rank.
pub fn compare(a: QualityTier, b: QualityTier) -> Ordering {
    rank(a).cmp(&rank(b))
}

/// Whether `new` should replace a held `current` under a `preferred` ceiling.
///
/// `new` must be strictly better than `current`, and either stay within the
/// ceiling or replace something that was still below it.
pub fn is_upgrade(new: QualityTier, current: QualityTier, preferred: QualityTier) -> bool {
    rank(new) > rank(current) && (rank(current) < rank(preferred) || rank(new) <= rank(preferred))
}

/// Stable sort, best quality first.
pub fn sort_best_first<T>(items: &mut [T], quality: impl Fn(&T) -> QualityTier) {
    items.sort_by(|a, b| compare(quality(b), quality(a)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use QualityTier::*;

    #[test]
    fn test_rank_monotonic() {
        assert!(rank(Uhd2160) > rank(FullHd1080));
        assert!(rank(FullHd1080) > rank(Hd720));
        assert!(rank(Hd720) > rank(Sd480));
        assert!(rank(Sd480) > rank(Unknown));
        assert!(rank(Uhd4k) > rank(Uhd2160));
    }

    #[test]
    fn test_compare() {
        assert_eq!(compare(FullHd1080, Hd720), Ordering::Greater);
        assert_eq!(compare(Unknown, Other), Ordering::Less);
        assert_eq!(compare(Hd720, Hd720), Ordering::Equal);
    }

    #[test]
    fn test_is_upgrade_within_ceiling() {
        assert!(is_upgrade(FullHd1080, Hd720, FullHd1080));
    }

    #[test]
    fn test_is_upgrade_overshoot_when_below_ceiling() {
        assert!(is_upgrade(Uhd2160, Hd720, FullHd1080));
        assert!(is_upgrade(Uhd2160, FullHd1080, Uhd4k));
    }

    #[test]
    fn test_is_upgrade_rejects_overshoot_at_ceiling() {
        // current already meets the ceiling and new exceeds it
        assert!(!is_upgrade(Uhd2160, FullHd1080, Hd720));
        assert!(!is_upgrade(Uhd2160, FullHd1080, FullHd1080));
    }

    #[test]
    fn test_is_upgrade_never_sideways_or_down() {
        assert!(!is_upgrade(FullHd1080, FullHd1080, Uhd4k));
        assert!(!is_upgrade(Hd720, FullHd1080, Uhd4k));
    }

    #[test]
    fn test_unknown_current_is_upgradable() {
        assert!(is_upgrade(Other, Unknown, FullHd1080));
        assert!(is_upgrade(Sd480, Unknown, Hd720));
        assert!(!is_upgrade(Unknown, Unknown, FullHd1080));
    }

    #[test]
    fn test_sort_best_first_is_stable() {
        let mut items = vec![("a", Hd720), ("b", FullHd1080), ("c", Hd720), ("d", Unknown)];
        sort_best_first(&mut items, |(_, q)| *q);
        let order: Vec<_> = items.iter().map(|(n, _)| *n).collect();
        assert_eq!(order, vec!["b", "a", "c", "d"]);
    }
}
