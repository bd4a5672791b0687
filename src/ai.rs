use std::collections::{BTreeSet, HashMap};

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::card::{Card, Rank};

/// What the computer opponent is allowed to know about the table.
#[derive(Debug, Clone, Copy)]
pub struct TableView<'a> {
    pub cards: &'a [Card],
    pub matched: &'a BTreeSet<usize>,
    pub flipped: &'a [usize],
    /// Every index that has been face up at some point this game.
    pub seen: &'a BTreeSet<usize>,
}

impl TableView<'_> {
    /// Positions that can still be flipped, in scan order.
    fn open(&self) -> Vec<usize> {
        (0..self.cards.len())
            .filter(|i| !self.matched.contains(i) && !self.flipped.contains(i))
            .collect()
    }
}

/// Pick two cards for the AI to flip, or `None` when fewer than two are left.
///
/// 1. A remembered pair (both positions seen, neither matched) is always taken.
/// 2. Otherwise probe: an unseen card first, then any other open card.
/// 3. If everything open has been seen, any two open cards.
pub fn find_move<R: Rng + ?Sized>(table: &TableView<'_>, rng: &mut R) -> Option<(usize, usize)> {
    let open = table.open();
    if open.len() < 2 {
        return None;
    }

    if let Some(pair) = known_pair(table, &open) {
        return Some(pair);
    }

    let unseen: Vec<usize> = open
        .iter()
        .copied()
        .filter(|i| !table.seen.contains(i))
        .collect();
    if let Some(&first) = unseen.choose(rng) {
        let rest: Vec<usize> = open.iter().copied().filter(|&i| i != first).collect();
        let &second = rest.choose(rng)?;
        return Some((first, second));
    }

    match open.choose_multiple(rng, 2).copied().collect::<Vec<_>>()[..] {
        [first, second] => Some((first, second)),
        _ => None,
    }
}

/// First pair of seen, still-open positions sharing a rank, in scan order.
fn known_pair(table: &TableView<'_>, open: &[usize]) -> Option<(usize, usize)> {
    let mut remembered: HashMap<Rank, usize> = HashMap::new();
    for &index in open.iter().filter(|&&i| table.seen.contains(&i)) {
        let rank = table.cards[index].rank;
        if let Some(&first) = remembered.get(&rank) {
            return Some((first, index));
        }
        remembered.insert(rank, index);
    }
    None
}
