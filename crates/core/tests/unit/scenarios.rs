use pretty_assertions::assert_eq;
use tomasulo_core::asm;
use tomasulo_core::config::Config;
use tomasulo_core::engine::{Engine, Termination};

fn run_with(source: &str, config: Config, seed: &[(usize, i64)]) -> tomasulo_core::engine::RunReport {
    let program = asm::parse(source).expect("program should parse");
    let mut engine = Engine::new(config);
    for &(reg, val) in seed {
        engine.set_register(reg, val);
    }
    engine.run(&program)
}

/// Installs a test-writer `tracing` subscriber once per test binary, so a
/// traced run's `debug!`/`info!` events land in the captured test output
/// instead of being silently dropped by the default no-op subscriber.
fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[test]
fn straight_line_raw_chain_commits_in_order() {
    // R2 = R1 + R1, R3 = R2 + R1 — each instruction depends on the one
    // before it, so issue must stall on a reservation station tag before
    // the chain can resolve.
    let report = run_with(
        "ADD R2, R1, R1\nADD R3, R2, R1\nHALT\n",
        Config::wide(),
        &[(1, 5)],
    );
    assert_eq!(report.termination, Termination::Halted);
    assert_eq!(report.registers[2], 10);
    assert_eq!(report.registers[3], 15);
}

#[test]
fn independent_multiply_and_add_commit_in_program_order_despite_differing_latency() {
    let report = run_with(
        "MUL R2, R1, R1\nADD R3, R1, R1\nHALT\n",
        Config::wide(),
        &[(1, 4)],
    );
    // ADD (1-cycle) finishes before MUL (2-cycle), but both must still be
    // visible in final architectural state regardless of completion order.
    assert_eq!(report.termination, Termination::Halted);
    assert_eq!(report.registers[2], 16);
    assert_eq!(report.registers[3], 8);
}

#[test]
fn division_by_zero_yields_zero_not_a_trap() {
    let report = run_with("DIV R2, R1, R3\nHALT\n", Config::wide(), &[(1, 7), (3, 0)]);
    assert_eq!(report.termination, Termination::Halted);
    assert_eq!(report.registers[2], 0);
}

#[test]
fn store_then_load_round_trips_through_memory() {
    let report = run_with(
        "SW R1, 4(R0)\nLW R2, 4(R0)\nHALT\n",
        Config::wide(),
        &[(1, 77)],
    );
    assert_eq!(report.termination, Termination::Halted);
    assert_eq!(report.registers[2], 77);
}

#[test]
fn taken_branch_flushes_younger_in_flight_work() {
    let src = "BEQ R1, R2, skip\nADD R3, R3, R4\nskip: HALT\n";
    let report = run_with(src, Config::wide(), &[(1, 1), (2, 1), (4, 9)]);
    assert_eq!(report.termination, Termination::Halted);
    assert_eq!(report.registers[3], 0, "the skipped ADD must never commit");
}

#[test]
fn not_taken_branch_falls_through_and_commits_the_next_instruction() {
    let src = "BEQ R1, R2, skip\nADD R3, R3, R4\nskip: HALT\n";
    let report = run_with(src, Config::wide(), &[(1, 1), (2, 2), (4, 9)]);
    assert_eq!(report.termination, Termination::Halted);
    assert_eq!(report.registers[3], 9);
}

#[test]
fn backward_branch_loop_terminates_within_the_cycle_cap() {
    let src = "loop: ADD R1, R1, R2\n\
               BLT R1, R3, loop\n\
               HALT\n";
    let report = run_with(src, Config::wide(), &[(2, 1), (3, 5)]);
    assert_eq!(report.termination, Termination::Halted);
    assert_eq!(report.registers[1], 5);
    assert!(report.cycles <= 100);
}

#[test]
fn rerunning_the_same_program_is_deterministic() {
    let src = "ADD R1, R2, R2\nMUL R3, R1, R1\nHALT\n";
    let program = asm::parse(src).unwrap();

    let mut first = Engine::new(Config::default());
    first.set_register(2, 3);
    let a = first.run(&program);

    let mut second = Engine::new(Config::default());
    second.set_register(2, 3);
    let b = second.run(&program);

    assert_eq!(a.registers, b.registers);
    assert_eq!(a.cycles, b.cycles);
    assert_eq!(a.termination, b.termination);
}

#[test]
fn narrow_config_stalls_but_reaches_the_same_final_state_as_wide() {
    let src = "ADD R2, R1, R1\nADD R3, R2, R1\nHALT\n";
    let program = asm::parse(src).unwrap();

    let mut narrow = Engine::new(Config::default());
    narrow.set_register(1, 3);
    let narrow_report = narrow.run(&program);

    let mut wide = Engine::new(Config::wide());
    wide.set_register(1, 3);
    let wide_report = wide.run(&program);

    assert_eq!(narrow_report.registers, wide_report.registers);
    assert!(narrow_report.cycles >= wide_report.cycles);
}

#[test]
fn program_exhaustion_without_halt_still_terminates() {
    let program = asm::parse("ADD R1, R2, R2\n").unwrap();
    let mut engine = Engine::new(Config::wide());
    engine.set_register(2, 5);
    let report = engine.run(&program);
    assert_eq!(report.termination, Termination::ProgramExhausted);
    assert_eq!(report.registers[1], 10);
}

#[test]
fn branch_target_past_program_end_clamps_to_last_instruction() {
    // `J 9999` in a 3-instruction program: the assembler never range-checks
    // a literal target, so commit must clamp the redirected PC to the last
    // valid instruction index instead of handing `issue` an address it can
    // never fetch from.
    let report = run_with("J 9999\nADD R1, R1, R1\nHALT\n", Config::wide(), &[]);
    assert_eq!(report.termination, Termination::Halted);
}

#[test]
fn traced_run_records_a_nonempty_cycle_trace() {
    init_tracing();
    let mut config = Config::wide();
    config.general.trace = true;
    let report = run_with("ADD R2, R1, R1\nHALT\n", config, &[(1, 3)]);
    assert_eq!(report.termination, Termination::Halted);
    assert!(!report.trace.is_empty());

    let stats = tomasulo_core::stats::SimStats::from_report(&report);
    assert_eq!(stats.committed, 2);
}

#[test]
fn reservation_stations_smaller_than_program_still_completes() {
    let mut config = Config::default();
    config.sizes.reservation_stations = 1;
    config.sizes.rob_capacity = 1;
    let report = run_with(
        "ADD R2, R1, R1\nADD R3, R1, R1\nADD R4, R1, R1\nHALT\n",
        config,
        &[(1, 2)],
    );
    assert_eq!(report.termination, Termination::Halted);
    assert_eq!(report.registers[2], 4);
    assert_eq!(report.registers[3], 4);
    assert_eq!(report.registers[4], 4);
}
