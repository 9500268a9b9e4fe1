use sevens_core::model::card::Card;
use sevens_core::model::hand::Hand;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// Primary-clear cards split by whether playing them moves one of this hand's
/// unclear cards closer to the table.
///
/// `blocks` is rebuilt on every selection and never outlives it. When one card sits
/// in the branch of several unclear cards it is paired with the farthest of them,
/// higher rank first on a tie.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockerSplit {
    blocks: BTreeMap<Card, Card>,
    holders: Vec<Card>,
}

impl BlockerSplit {
    pub fn from_hand(hand: &Hand) -> Self {
        let primary: Vec<Card> = hand.primary_clear().collect();
        let mut blocks = BTreeMap::new();

        for unclear in hand.unclear() {
            for ancestor in unclear.branch() {
                if !primary.contains(&ancestor) {
                    continue;
                }
                match blocks.entry(ancestor) {
                    Entry::Vacant(slot) => {
                        slot.insert(unclear);
                    }
                    Entry::Occupied(mut slot) => {
                        if outranks(unclear, *slot.get()) {
                            slot.insert(unclear);
                        }
                    }
                }
            }
        }

        let holders = primary
            .into_iter()
            .filter(|card| !blocks.contains_key(card))
            .collect();

        Self { blocks, holders }
    }

    pub fn blockers(&self) -> impl Iterator<Item = Card> + '_ {
        self.blocks.keys().copied()
    }

    pub fn holders(&self) -> impl Iterator<Item = Card> + '_ {
        self.holders.iter().copied()
    }

    pub fn has_blockers(&self) -> bool {
        !self.blocks.is_empty()
    }

    /// The unclear card `card` was paired with, if it is a blocker.
    pub fn blocked_by(&self, card: Card) -> Option<Card> {
        self.blocks.get(&card).copied()
    }
}

fn outranks(candidate: Card, current: Card) -> bool {
    (candidate.distance(), candidate.rank) > (current.distance(), current.rank)
}
