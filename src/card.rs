use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of standard 52-card decks pooled together when dealing.
/// A 12×12 grid needs 72 pairs, more than one deck can provide.
pub const DECK_COPIES: usize = 4;

/// The four French suits. Purely cosmetic: matching only looks at the rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

impl Suit {
    /// All four suits, in canonical order.
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

    pub fn symbol(self) -> &'static str {
        match self {
            Suit::Spades => "♠",
            Suit::Hearts => "♥",
            Suit::Diamonds => "♦",
            Suit::Clubs => "♣",
        }
    }

    pub fn is_red(self) -> bool {
        matches!(self, Suit::Hearts | Suit::Diamonds)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rank {
    Ace,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
        }
    }
}

/// A card on the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
    pub face_up: bool,
    /// Under the player's cursor.
    pub selected: bool,
}

impl Card {
    pub fn new(suit: Suit, rank: Rank) -> Self {
        Card {
            suit,
            rank,
            face_up: false,
            selected: false,
        }
    }

    /// Two cards form a pair when their ranks agree; suits are ignored.
    pub fn matches(self, other: Card) -> bool {
        self.rank == other.rank
    }

    pub fn label(self) -> String {
        format!("{}{}", self.rank.label(), self.suit.symbol())
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DeckError {
    #[error("requested {requested} pairs but the pool only holds {available}")]
    NotEnoughPairs { requested: usize, available: usize },
}

/// One standard 52-card deck, face down.
pub fn standard_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(52);
    for &suit in &Suit::ALL {
        for &rank in &Rank::ALL {
            deck.push(Card::new(suit, rank));
        }
    }

    debug_assert_eq!(deck.len(), 52, "Deck must have exactly 52 cards");
    deck
}

/// Build `pairs` matching pairs (`2 * pairs` cards) in random order.
///
/// Pairs are drawn in rounds over a freshly shuffled rank order, so the
/// first thirteen pairs all have distinct ranks and larger grids reuse
/// every rank as evenly as possible.
pub fn paired_deck<R: Rng + ?Sized>(pairs: usize, rng: &mut R) -> Result<Vec<Card>, DeckError> {
    let mut groups: BTreeMap<Rank, Vec<Card>> = BTreeMap::new();
    for _ in 0..DECK_COPIES {
        for card in standard_deck() {
            groups.entry(card.rank).or_default().push(card);
        }
    }

    let by_rank: Vec<Vec<(Card, Card)>> = groups
        .into_values()
        .map(|mut cards| {
            cards.shuffle(rng);
            cards.chunks_exact(2).map(|two| (two[0], two[1])).collect()
        })
        .collect();

    let available: usize = by_rank.iter().map(Vec::len).sum();
    if pairs > available {
        return Err(DeckError::NotEnoughPairs {
            requested: pairs,
            available,
        });
    }

    let mut chosen = Vec::with_capacity(pairs);
    let mut round = 0;
    while chosen.len() < pairs {
        let mut order: Vec<usize> = (0..by_rank.len()).collect();
        order.shuffle(rng);
        for rank in order {
            if chosen.len() == pairs {
                break;
            }
            if let Some(&pair) = by_rank[rank].get(round) {
                chosen.push(pair);
            }
        }
        round += 1;
    }

    let mut deck: Vec<Card> = chosen.into_iter().flat_map(|(a, b)| [a, b]).collect();
    deck.shuffle(rng);
    Ok(deck)
}
