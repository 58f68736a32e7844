use proptest::prelude::*;
use tomasulo_core::asm;
use tomasulo_core::config::Config;
use tomasulo_core::engine::Engine;

proptest! {
    /// Running the same program against two fresh engines seeded with the
    /// same register must always land on the same final state — nothing in
    /// the engine is allowed to depend on allocation order, hashing, or any
    /// other source of nondeterminism.
    #[test]
    fn rerunning_the_same_program_is_deterministic(seed in -1000i64..1000) {
        let program = asm::parse("ADD R1, R2, R2\nMUL R3, R1, R1\nHALT\n").unwrap();

        let mut first = Engine::new(Config::default());
        first.set_register(2, seed);
        let a = first.run(&program);

        let mut second = Engine::new(Config::default());
        second.set_register(2, seed);
        let b = second.run(&program);

        prop_assert_eq!(a.registers, b.registers);
        prop_assert_eq!(a.cycles, b.cycles);
        prop_assert_eq!(a.termination, b.termination);
    }

    /// A straight-line chain of arithmetic ops, each reading the running
    /// total and a fixed operand, must commute to the same result as a
    /// plain sequential interpreter regardless of how the out-of-order
    /// engine schedules and renames the chain internally.
    #[test]
    fn straight_line_chain_matches_a_sequential_interpreter(
        operand in -50i64..50,
        start in -50i64..50,
        ops in proptest::collection::vec(0u8..3, 1..8),
    ) {
        let mnemonics: Vec<&str> = ops
            .iter()
            .map(|op| match op {
                0 => "ADD",
                1 => "SUB",
                _ => "MUL",
            })
            .collect();

        let mut src = String::new();
        for m in &mnemonics {
            src.push_str(&format!("{m} R3, R3, R1\n"));
        }
        src.push_str("HALT\n");
        let program = asm::parse(&src).unwrap();

        let mut engine = Engine::new(Config::wide());
        engine.set_register(1, operand);
        engine.set_register(3, start);
        let report = engine.run(&program);

        let mut expected = start;
        for m in &mnemonics {
            expected = match *m {
                "ADD" => expected.wrapping_add(operand),
                "SUB" => expected.wrapping_sub(operand),
                _ => expected.wrapping_mul(operand),
            };
        }

        prop_assert_eq!(report.registers[3], expected);
    }
}
