use rstest::rstest;
use tomasulo_core::asm;
use tomasulo_core::config::Config;
use tomasulo_core::engine::Engine;

#[rstest]
#[case::add("ADD", 5, 3, 8)]
#[case::sub("SUB", 5, 3, 2)]
#[case::mul("MUL", 5, 3, 15)]
#[case::div("DIV", 6, 3, 2)]
#[case::div_by_zero("DIV", 6, 0, 0)]
fn arithmetic_opcode_computes_expected_result(
    #[case] mnemonic: &str,
    #[case] lhs: i64,
    #[case] rhs: i64,
    #[case] expected: i64,
) {
    let src = format!("{mnemonic} R3, R1, R2\nHALT\n");
    let program = asm::parse(&src).expect("program should parse");

    let mut engine = Engine::new(Config::wide());
    engine.set_register(1, lhs);
    engine.set_register(2, rhs);
    let report = engine.run(&program);

    assert_eq!(report.registers[3], expected);
}

#[rstest]
#[case::narrow(Config::default())]
#[case::wide(Config::wide())]
fn raw_chain_reaches_the_same_result_at_any_width(#[case] config: Config) {
    let program = asm::parse("ADD R2, R1, R1\nADD R3, R2, R1\nHALT\n").expect("program should parse");
    let mut engine = Engine::new(config);
    engine.set_register(1, 7);
    let report = engine.run(&program);

    assert_eq!(report.registers[2], 14);
    assert_eq!(report.registers[3], 21);
}
