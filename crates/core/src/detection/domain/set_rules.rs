//! The Set matching rule and exhaustive search over detected cards.

use super::card::Card;

/// Three cards forming a valid Set, stored sorted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetectedSet {
    cards: [Card; 3],
}

impl DetectedSet {
    /// Builds a set without re-checking the rule; callers go through
    /// [`find_sets`] or [`is_set`].
    fn new(mut cards: [Card; 3]) -> Self {
        cards.sort();
        Self { cards }
    }

    pub fn cards(&self) -> &[Card; 3] {
        &self.cards
    }
}

impl Ord for DetectedSet {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.cards.cmp(&other.cards)
    }
}

impl PartialOrd for DetectedSet {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// A triple is a Set when every attribute is all-same or all-different
/// across the three cards.
pub fn is_set(c0: &Card, c1: &Card, c2: &Card) -> bool {
    fn uniform<T: Eq>(a: T, b: T, c: T) -> bool {
        let same = a == b && b == c;
        let all_diff = a != b && b != c && a != c;
        same || all_diff
    }

    uniform(c0.count, c1.count, c2.count)
        && uniform(c0.shape.color, c1.shape.color, c2.shape.color)
        && uniform(c0.shape.symbol, c1.shape.symbol, c2.shape.symbol)
        && uniform(c0.shape.shading, c1.shape.shading, c2.shape.shading)
}

/// Enumerates every card triple and returns all valid Sets, sorted.
///
/// O(n³) over the cards visible in one frame; a full table shows at most
/// around twenty cards, so the triple count stays in the low thousands.
pub fn find_sets(cards: &[Card]) -> Vec<DetectedSet> {
    let mut sets = Vec::new();
    for i in 0..cards.len() {
        for j in (i + 1)..cards.len() {
            for k in (j + 1)..cards.len() {
                if is_set(&cards[i], &cards[j], &cards[k]) {
                    sets.push(DetectedSet::new([cards[i], cards[j], cards[k]]));
                }
            }
        }
    }
    sets.sort();
    sets
}
