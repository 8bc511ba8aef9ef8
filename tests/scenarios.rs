//! End-to-end programs run through the engine.

use bf::cpu::{Mode, TickReport};
use bf::{assemble, Engine, Geometry};

fn run(source: &str, ticks: u64) -> (Engine, Vec<TickReport>) {
    let mut engine = Engine::from_source(Geometry::default(), source);
    let reports = (0..ticks).map(|_| engine.tick()).collect();
    (engine, reports)
}

#[test]
fn increment_then_output() {
    let (engine, reports) = run("+.", 4);

    // two warm-up ticks, '+', then '.'
    assert_eq!(reports[2].tape_write.map(|w| w.value), Some(1));
    assert_eq!(reports[3].output, Some(1));
    assert_eq!(engine.state().output(), Some(1));
    assert!(reports[..3].iter().all(|r| r.output.is_none()));
}

#[test]
fn countdown_loop_runs_three_times() {
    let (_, reports) = run("+++[-].", 100);

    let decrements = reports
        .iter()
        .filter(|r| !r.skipped && r.byte == b'-')
        .count();
    assert_eq!(decrements, 3);

    let first = reports.iter().find_map(|r| r.output);
    assert_eq!(first, Some(0));
}

#[test]
fn transfer_loop_moves_value() {
    let mut engine = Engine::from_source(Geometry::default(), "++[->+<].");
    assert_eq!(engine.run_until_output(100), Some(0));
    assert_eq!(engine.tape().read(0), 0);
    assert_eq!(engine.tape().read(1), 2);
}

#[test]
fn net_zero_move_never_writes_or_outputs() {
    let (engine, reports) = run("><", 256 * 3);

    assert!(reports.iter().all(|r| r.tape_write.is_none()));
    assert!(reports.iter().all(|r| r.output.is_none()));
    assert_eq!(engine.state().ptr, 0);
    assert!(engine.tape().as_bytes().iter().all(|&c| c == 0));
}

#[test]
fn back_skip_rescans_to_matching_open() {
    let (_, reports) = run("++[-]", 20);

    // ']' at address 6 triggers a back-skip over '-' to '[' at 4
    let skipped: Vec<usize> = reports
        .iter()
        .take_while(|r| r.pc != 7)
        .filter(|r| r.skipped)
        .map(|r| r.pc)
        .collect();
    assert_eq!(skipped, vec![5, 4]);
}

#[test]
fn counter_demo_counts_up() {
    let mut engine = Engine::from_source(Geometry::default(), include_str!("../demos/counter.b"));
    let outputs = engine.run_ticks(400);
    assert_eq!(outputs[..3], [1u8, 2, 3]);
}

#[test]
fn unmatched_open_skips_through_address_space() {
    let mut engine = Engine::new(Geometry::new(4, 4).unwrap(), &assemble("[+."));
    let outputs = engine.run_ticks(64);

    // the skip never finds a partner, so nothing executes
    assert!(outputs.is_empty());
    assert_eq!(engine.state().mode, Mode::Skip);
    assert!(engine.tape().as_bytes().iter().all(|&c| c == 0));
}

#[test]
fn unmatched_close_scans_backward_forever() {
    let mut engine = Engine::new(Geometry::new(4, 4).unwrap(), &assemble("+]"));
    engine.run_ticks(64);

    assert_eq!(engine.state().mode, Mode::Skip);
    assert_eq!(engine.tape().read(0), 1);
}

#[test]
fn input_symbol_is_inert() {
    let (engine, reports) = run(",,,.", 6);
    assert_eq!(reports[5].output, Some(0));
    assert_eq!(engine.state().ptr, 0);
}
