//! Line-driven helper for playing a real game: the user enters their hand, reports
//! other players' moves, and asks the bot which card to play next.

use std::io::{self, BufRead, Write};

use sevens_bot::{Policy, PolicyContext};
use sevens_core::model::board::Board;
use sevens_core::model::card::Card;
use sevens_core::model::hand::Hand;

const RULE: &str = "***********************************************";
const ADVISED_SEAT: usize = 0;

pub struct Advisor<R, W> {
    input: R,
    output: W,
    policy: Box<dyn Policy>,
    board: Board,
    hand: Option<Hand>,
}

impl<R: BufRead, W: Write> Advisor<R, W> {
    pub fn new(input: R, output: W, policy: Box<dyn Policy>) -> Self {
        Self {
            input,
            output,
            policy,
            board: Board::new(),
            hand: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn hand(&self) -> Option<&Hand> {
        self.hand.as_ref()
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Runs until the user exits or input ends.
    pub fn run(&mut self) -> io::Result<()> {
        let cards = self.read_hand()?;
        let mut hand = Hand::deal(cards, &self.board);

        loop {
            hand.refresh(&self.board);
            self.print_state(&hand)?;
            writeln!(
                self.output,
                "Enter choice:\n 1. Enter someone else's move\n 2. Play a card\n 3. Exit"
            )?;
            let Some(choice) = self.read_line()? else {
                break;
            };
            writeln!(self.output, "{RULE}")?;
            match choice.as_str() {
                "1" => {
                    if !self.record_other_move(&hand)? {
                        break;
                    }
                }
                "2" => self.play_own_card(&mut hand)?,
                "3" => break,
                other => writeln!(self.output, "Unknown choice '{other}'")?,
            }
        }

        self.hand = Some(hand);
        Ok(())
    }

    fn read_hand(&mut self) -> io::Result<Vec<Card>> {
        writeln!(
            self.output,
            "Enter cards in your hand in the format 7H, JD, 10S, AC, etc (Q to end):"
        )?;
        let mut cards: Vec<Card> = Vec::new();
        while let Some(line) = self.read_line()? {
            if line.eq_ignore_ascii_case("q") {
                break;
            }
            match line.parse::<Card>() {
                Ok(card) if cards.contains(&card) => {
                    writeln!(self.output, "{card} already entered")?
                }
                Ok(card) => {
                    writeln!(self.output, "{card}")?;
                    cards.push(card);
                }
                Err(err) => writeln!(self.output, "Invalid card: {err}")?,
            }
        }
        Ok(cards)
    }

    /// Returns `false` if input ended before a card was entered.
    fn record_other_move(&mut self, hand: &Hand) -> io::Result<bool> {
        writeln!(self.output, "Card played:")?;
        let Some(line) = self.read_line()? else {
            return Ok(false);
        };
        let card = match line.parse::<Card>() {
            Ok(card) => card,
            Err(err) => {
                writeln!(self.output, "Invalid card: {err}")?;
                return Ok(true);
            }
        };
        if hand.holds(card) {
            writeln!(self.output, "{card} is in your hand; choose 2 to play it")?;
            return Ok(true);
        }
        if let Err(err) = self.board.play(card) {
            writeln!(self.output, "Invalid move: {err}")?;
        }
        Ok(true)
    }

    fn play_own_card(&mut self, hand: &mut Hand) -> io::Result<()> {
        let choice = {
            let ctx = PolicyContext {
                seat: ADVISED_SEAT,
                hand,
                board: &self.board,
            };
            self.policy.choose_play(&ctx)
        };
        let Some(card) = choice else {
            writeln!(self.output, "I pass!")?;
            return Ok(());
        };
        if let Err(err) = hand.mark_played(card) {
            writeln!(self.output, "Cannot play {card}: {err}")?;
            return Ok(());
        }
        match self.board.play(card) {
            Ok(()) => writeln!(self.output, "I played: {card}"),
            Err(err) => writeln!(self.output, "Invalid move: {err}"),
        }
    }

    fn print_state(&mut self, hand: &Hand) -> io::Result<()> {
        writeln!(self.output, "{RULE}")?;
        writeln!(self.output, "{}", self.board)?;
        writeln!(self.output, "{RULE}")?;
        if hand.unclear().next().is_none() && !hand.is_empty() {
            writeln!(self.output, "{} cards, all clear!", hand.remaining_len())?;
        }
        writeln!(self.output, "{hand}")?;
        writeln!(self.output, "{RULE}")
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}
