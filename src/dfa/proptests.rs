//! Property-based tests for the gate automaton.
//!
//! Random sequences of entries, exits and raw inputs are replayed against a
//! zero-delay engine and the lot invariants are checked after every step.

use std::collections::HashSet;
use std::time::Duration;

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

use super::delay::NoDelay;
use super::engine::{EntryOutcome, ParkingDfa};
use super::state::{CarId, Input, InputSymbol, State, Symbol, Token};

const CARS: [&str; 5] = ["A", "B", "C", "D", "E"];

#[derive(Debug, Clone)]
enum Op {
    Enter { car: usize, valid: bool },
    Exit { car: usize },
}

#[derive(Debug, Clone)]
enum RawOp {
    Reset,
    Feed { symbol: usize, car: Option<usize> },
}

prop_compose! {
    fn arbitrary_op()(kind in 0..3u8, car in 0..CARS.len(), valid in any::<bool>()) -> Op {
        match kind {
            0 | 1 => Op::Enter { car, valid },
            _ => Op::Exit { car },
        }
    }
}

prop_compose! {
    fn arbitrary_raw_op()(
        reset in prop::bool::weighted(0.2),
        symbol in 0..=Symbol::ALL.len(),
        car in prop::option::of(0..CARS.len()),
    ) -> RawOp {
        if reset { RawOp::Reset } else { RawOp::Feed { symbol, car } }
    }
}

fn car(idx: usize) -> CarId {
    CarId::new(CARS[idx]).unwrap()
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

fn assert_registry_invariants(dfa: &ParkingDfa<NoDelay>) -> Result<(), TestCaseError> {
    prop_assert!(dfa.occupancy().len() <= dfa.capacity());
    let unique: HashSet<_> = dfa.occupancy().iter().collect();
    prop_assert_eq!(unique.len(), dfa.occupancy().len());
    prop_assert_eq!(
        dfa.spaces_remaining(),
        dfa.capacity() - dfa.occupancy().len()
    );
    Ok(())
}

proptest! {
    #[test]
    fn workflows_keep_lot_invariants(
        capacity in 1..4usize,
        ops in prop::collection::vec(arbitrary_op(), 0..40),
    ) {
        block_on(async {
            let mut dfa = ParkingDfa::new(capacity, Duration::ZERO, NoDelay).unwrap();
            let mut terminal_outcomes = 0u64;

            for op in ops {
                let occupancy_before = dfa.occupancy().len();
                match op {
                    Op::Enter { car: idx, valid } => {
                        let token = if valid { Token::Valid } else { Token::Invalid };
                        let report = dfa.run_entry(car(idx), token).await;
                        if report.outcome != EntryOutcome::RejectedDuplicate {
                            terminal_outcomes += 1;
                        }
                        if report.outcome == EntryOutcome::Admitted {
                            prop_assert_eq!(dfa.occupancy().len(), occupancy_before + 1);
                            let last = dfa.log().last().unwrap();
                            prop_assert_eq!(&last.symbol, &InputSymbol::Known(Symbol::Timer));
                            prop_assert_eq!(last.state, State::Accept);
                        } else {
                            prop_assert_eq!(dfa.occupancy().len(), occupancy_before);
                        }
                    }
                    Op::Exit { car: idx } => {
                        let was_inside = dfa.is_inside(&car(idx));
                        let rejected = dfa.total_rejected();
                        let accepted = dfa.total_accepted();
                        dfa.run_exit(car(idx));
                        let expected = if was_inside {
                            occupancy_before - 1
                        } else {
                            occupancy_before
                        };
                        prop_assert_eq!(dfa.occupancy().len(), expected);
                        prop_assert_eq!(dfa.total_rejected(), rejected);
                        prop_assert_eq!(dfa.total_accepted(), accepted);
                    }
                }

                assert_registry_invariants(&dfa)?;
                prop_assert_eq!(
                    dfa.total_accepted() + dfa.total_rejected(),
                    terminal_outcomes
                );
            }
            Ok::<(), TestCaseError>(())
        })?;
    }

    #[test]
    fn every_raw_input_logs_once_and_counts_rejections_once(
        capacity in 1..4usize,
        ops in prop::collection::vec(arbitrary_raw_op(), 0..60),
    ) {
        let mut dfa = ParkingDfa::new(capacity, Duration::ZERO, NoDelay).unwrap();

        for op in ops {
            match op {
                RawOp::Reset => {
                    let log_len = dfa.log().len();
                    dfa.reset();
                    prop_assert_eq!(dfa.current_state(), State::START);
                    prop_assert_eq!(dfa.log().len(), log_len);
                }
                RawOp::Feed { symbol, car: car_idx } => {
                    let text = Symbol::ALL.get(symbol).map(Symbol::name).unwrap_or("Honk");
                    let Ok(input) = Input::parse(text, car_idx.map(|i| CARS[i])) else {
                        continue;
                    };
                    let log_len = dfa.log().len();
                    let rejected = dfa.total_rejected();
                    dfa.feed(input);

                    prop_assert_eq!(dfa.log().len(), log_len + 1);
                    let last_symbol = &dfa.log().last().unwrap().symbol;
                    let entered_reject = dfa.current_state() == State::Reject
                        && *last_symbol != InputSymbol::Known(Symbol::CarExits);
                    let expected = if entered_reject {
                        rejected + 1
                    } else {
                        rejected
                    };
                    prop_assert_eq!(dfa.total_rejected(), expected);
                    prop_assert_eq!(dfa.log().last().unwrap().occupancy, dfa.occupancy().len());
                }
            }
            assert_registry_invariants(&dfa)?;
        }
    }

    #[test]
    fn queries_are_idempotent(ops in prop::collection::vec(arbitrary_op(), 0..20)) {
        block_on(async {
            let mut dfa = ParkingDfa::new(2, Duration::ZERO, NoDelay).unwrap();
            for op in ops {
                match op {
                    Op::Enter { car: idx, valid } => {
                        let token = if valid { Token::Valid } else { Token::Invalid };
                        dfa.run_entry(car(idx), token).await;
                    }
                    Op::Exit { car: idx } => {
                        dfa.run_exit(car(idx));
                    }
                }
            }
            let first = dfa.stats();
            let log_len = dfa.log().len();
            let _ = (dfa.states(), dfa.alphabet(), dfa.transition_table());
            prop_assert_eq!(dfa.stats(), first);
            prop_assert_eq!(dfa.log().len(), log_len);
            Ok::<(), TestCaseError>(())
        })?;
    }
}
