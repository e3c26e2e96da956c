//! Interactive operator menu.
//!
//! [`Shell`] reads menu choices and prompts from any `BufRead` and writes to
//! any `Write`, driving a [`ParkingDfa`] one car at a time.

use std::io::{BufRead, Write};

use anyhow::Result;

use crate::dfa::{CarId, GateDelay, ParkingDfa, Token};
use crate::ui::Screen;

const MENU: &[&str] = &[
    "1. Show DFA States",
    "2. Show Input Alphabet",
    "3. Show Transition Table",
    "4. Add a Car (Entry)",
    "5. Remove a Car (Exit)",
    "6. Show Log",
    "7. Show Statistics",
    "8. Exit",
];

pub struct Shell<'a, D, R, W> {
    dfa: &'a mut ParkingDfa<D>,
    input: R,
    out: W,
    screen: Screen,
}

impl<'a, D: GateDelay, R: BufRead, W: Write> Shell<'a, D, R, W> {
    pub fn new(dfa: &'a mut ParkingDfa<D>, input: R, out: W) -> Self {
        Self {
            dfa,
            input,
            out,
            screen: Screen::new(),
        }
    }

    /// Run the menu until the operator picks "Exit" or input ends.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            writeln!(self.out)?;
            writeln!(
                self.out,
                "========== Parking Lot DFA ({} spaces) ==========",
                self.dfa.capacity()
            )?;
            for line in MENU {
                writeln!(self.out, "{line}")?;
            }

            let Some(choice) = self.prompt("Enter your choice: ")? else {
                break;
            };

            match choice.as_str() {
                "1" => writeln!(self.out, "{}", self.screen.states(self.dfa.states()))?,
                "2" => writeln!(self.out, "{}", self.screen.alphabet(self.dfa.alphabet()))?,
                "3" => write!(
                    self.out,
                    "{}",
                    self.screen.transition_table(self.dfa.transition_table())
                )?,
                "4" => self.add_car().await?,
                "5" => self.remove_car()?,
                "6" => write!(self.out, "{}", self.screen.log(self.dfa.log()))?,
                "7" => write!(self.out, "{}", self.screen.stats(&self.dfa.stats()))?,
                "8" => {
                    writeln!(self.out, "Exiting Program...")?;
                    break;
                }
                _ => writeln!(self.out, "Invalid choice. Try again.")?,
            }
        }
        Ok(())
    }

    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.out, "{label}")?;
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn prompt_car(&mut self, label: &str) -> Result<Option<CarId>> {
        let Some(raw) = self.prompt(label)? else {
            return Ok(None);
        };
        match CarId::new(&raw) {
            Ok(car) => Ok(Some(car)),
            Err(e) => {
                writeln!(self.out, "{}", self.screen.warning(&e.to_string()))?;
                Ok(None)
            }
        }
    }

    /// Entry dialogue. The car id is still asked for on a full lot so the
    /// capacity rejection reaches the log with the car that was turned away.
    /// The token prompt is skipped whenever the gate will refuse the car anyway.
    async fn add_car(&mut self) -> Result<()> {
        writeln!(self.out, "{}", self.screen.heading("Adding a Car"))?;
        if self.dfa.spaces_remaining() == 0 {
            writeln!(self.out, "{}", self.screen.warning("Parking lot is full."))?;
        }

        let Some(car) = self.prompt_car("Enter car ID or license plate: ")? else {
            return Ok(());
        };

        let token = if self.dfa.spaces_remaining() == 0 || self.dfa.is_inside(&car) {
            // The workflow refuses these before the token is read.
            Token::Invalid
        } else {
            let Some(raw) = self.prompt("Enter token status (ValidToken / InvalidToken): ")? else {
                return Ok(());
            };
            if !Token::is_recognized(&raw) {
                writeln!(
                    self.out,
                    "{}",
                    self.screen.warning("Invalid token input. Rejecting entry.")
                )?;
            }
            let token = Token::normalize(&raw);
            writeln!(self.out, "Token scanned for {car}: {}", token.symbol())?;
            if token == Token::Valid {
                writeln!(
                    self.out,
                    "Car {car} entering gate, closing in {} ms...",
                    self.dfa.gate_close_delay().as_millis()
                )?;
            }
            token
        };

        let report = self.dfa.run_entry(car, token).await;
        writeln!(
            self.out,
            "{}",
            self.screen.entry(&report, &self.dfa.stats())
        )?;
        Ok(())
    }

    fn remove_car(&mut self) -> Result<()> {
        writeln!(self.out, "{}", self.screen.heading("Removing a Car"))?;
        if self.dfa.occupancy().is_empty() {
            writeln!(self.out, "Parking lot is empty!")?;
            return Ok(());
        }

        let inside: Vec<&str> = self.dfa.occupancy().iter().map(CarId::as_str).collect();
        writeln!(self.out, "Cars currently inside: {}", inside.join(", "))?;

        let Some(car) = self.prompt_car("Enter the car ID to remove: ")? else {
            return Ok(());
        };
        let outcome = self.dfa.run_exit(car.clone());
        writeln!(
            self.out,
            "{}",
            self.screen.exit(&car, outcome, &self.dfa.stats())
        )?;
        Ok(())
    }
}
