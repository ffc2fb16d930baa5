use std::fmt;

/// Symbol color printed on a Set card.
///
/// `Unknown` covers hue readings outside every tuned band (glare,
/// washed-out lighting); such symbols still participate in matching so a
/// card with three identically-unreadable symbols is not dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Color {
    Red,
    Green,
    Purple,
    Unknown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    Diamond,
    Squiggle,
    Oval,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Shading {
    Solid,
    Striped,
    Open,
}

/// The classified appearance of one printed symbol: color, outline
/// symbol, and interior shading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Shape {
    pub color: Color,
    pub symbol: Symbol,
    pub shading: Shading,
}

impl Shape {
    pub fn new(color: Color, symbol: Symbol, shading: Shading) -> Self {
        Self {
            color,
            symbol,
            shading,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?} {:?}(s)", self.shading, self.color, self.symbol)
    }
}

/// One detected card: a symbol appearance, how many symbols it carries,
/// and the index of its border contour in the detection outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Card {
    pub shape: Shape,
    pub count: usize,
    pub outline_index: usize,
}

impl Card {
    pub fn new(shape: Shape, count: usize, outline_index: usize) -> Self {
        Self {
            shape,
            count,
            outline_index,
        }
    }
}

impl Ord for Card {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Count, then shape; outline index last so equal-looking cards
        // still sort deterministically.
        (self.count, self.shape, self.outline_index).cmp(&(
            other.count,
            other.shape,
            other.outline_index,
        ))
    }
}

impl PartialOrd for Card {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.count, self.shape)
    }
}
