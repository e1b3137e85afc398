//! Executes translated programs on the Hack machine interpreter and checks
//! the resulting memory state, instead of comparing assembly text.

use hack_machine::Machine;
use vm_translator::{translate_unit, CodeWriter};

/// Translates the given units (optionally behind the bootstrap), assembles
/// the result, and loads it into a machine. Callers set up RAM and run.
fn build(units: &[(&str, &str)], bootstrap: bool) -> Machine {
    let mut writer = CodeWriter::new(Vec::new());
    if bootstrap {
        writer.write_bootstrap().unwrap();
    }
    for (name, source) in units {
        translate_unit(name, source.as_bytes(), &mut writer).unwrap();
    }
    let asm = String::from_utf8(writer.into_inner()).unwrap();
    let lines: Vec<String> = asm.lines().map(String::from).collect();
    let words = hack_assembler::assemble(&lines).unwrap();
    Machine::from_binary_text(&words).unwrap()
}

/// Single-unit program without bootstrap; SP is seeded by hand.
fn run_unit(source: &str, steps: usize) -> Machine {
    let mut machine = build(&[("Test", source)], false);
    machine.ram[0] = 256;
    machine.run(steps);
    machine
}

#[test]
fn push_push_add() {
    let m = run_unit("push constant 7\npush constant 8\nadd\n", 1000);
    assert_eq!(m.sp(), 257);
    assert_eq!(m.ram[256], 15);
}

#[test]
fn arithmetic_battery() {
    let m = run_unit(
        "push constant 5\npush constant 3\nsub\n\
         push constant 2\nneg\n\
         push constant 12\npush constant 10\nand\n\
         push constant 12\npush constant 10\nor\n\
         push constant 0\nnot\n",
        2000,
    );
    assert_eq!(m.sp(), 261);
    assert_eq!(m.ram[256], 2); // 5 - 3
    assert_eq!(m.ram[257], 2u16.wrapping_neg()); // -2
    assert_eq!(m.ram[258], 8); // 12 & 10
    assert_eq!(m.ram[259], 14); // 12 | 10
    assert_eq!(m.ram[260], 0xFFFF); // !0
}

#[test]
fn comparisons_push_minus_one_or_zero() {
    let m = run_unit(
        "push constant 5\npush constant 5\neq\n\
         push constant 5\npush constant 3\neq\n\
         push constant 5\npush constant 3\ngt\n\
         push constant 3\npush constant 5\ngt\n\
         push constant 3\npush constant 5\nlt\n\
         push constant 5\npush constant 3\nlt\n",
        4000,
    );
    assert_eq!(m.sp(), 262);
    assert_eq!(m.ram[256], 0xFFFF); // 5 == 5
    assert_eq!(m.ram[257], 0); // 5 == 3
    assert_eq!(m.ram[258], 0xFFFF); // 5 > 3
    assert_eq!(m.ram[259], 0); // 3 > 5
    assert_eq!(m.ram[260], 0xFFFF); // 3 < 5
    assert_eq!(m.ram[261], 0); // 5 < 3
}

#[test]
fn virtual_segments_address_through_their_bases() {
    let mut machine = build(
        &[(
            "Test",
            "push constant 10\npop local 0\n\
             push constant 21\npop argument 2\n\
             push constant 36\npop this 6\n\
             push constant 42\npop that 5\n\
             push local 0\npush argument 2\nadd\n",
        )],
        false,
    );
    machine.ram[0] = 256;
    machine.ram[1] = 300; // LCL
    machine.ram[2] = 400; // ARG
    machine.ram[3] = 3000; // THIS
    machine.ram[4] = 3010; // THAT
    machine.run(2000);

    assert_eq!(machine.ram[300], 10);
    assert_eq!(machine.ram[402], 21);
    assert_eq!(machine.ram[3006], 36);
    assert_eq!(machine.ram[3015], 42);
    assert_eq!(machine.sp(), 257);
    assert_eq!(machine.ram[256], 31);
}

#[test]
fn temp_and_pointer_use_fixed_bases() {
    let m = run_unit(
        "push constant 42\npop temp 3\n\
         push constant 3030\npop pointer 0\n\
         push constant 3040\npop pointer 1\n\
         push temp 3\npush pointer 0\nadd\npush pointer 1\nadd\n",
        2000,
    );
    assert_eq!(m.ram[8], 42); // temp base 5
    assert_eq!(m.ram[3], 3030); // pointer 0 aliases THIS
    assert_eq!(m.ram[4], 3040); // pointer 1 aliases THAT
    assert_eq!(m.ram[256], 42 + 3030 + 3040);
}

#[test]
fn static_cells_survive_round_trips() {
    let m = run_unit(
        "push constant 111\npop static 0\n\
         push constant 222\npop static 1\n\
         push static 0\npush static 1\nadd\n",
        2000,
    );
    assert_eq!(m.sp(), 257);
    assert_eq!(m.ram[256], 333);
}

#[test]
fn sp_moves_by_pushes_minus_pops() {
    let m = run_unit(
        "push constant 1\npush constant 2\npush constant 3\n\
         pop temp 0\npush constant 4\npop temp 1\n",
        2000,
    );
    // 4 pushes - 2 pops
    assert_eq!(m.sp(), 256 + 2);
}

#[test]
fn if_goto_pops_and_branches_on_nonzero() {
    let m = run_unit(
        "push constant 1\nif-goto TAKEN\n\
         push constant 111\npop static 0\n\
         label TAKEN\n\
         push constant 0\nif-goto SKIPPED\n\
         push constant 222\npop static 1\n\
         label SKIPPED\n",
        2000,
    );
    // First branch taken: 111 never stored. Second not taken: 222 stored.
    assert_eq!(m.sp(), 256);
    let stored: Vec<u16> = m.ram[16..18].to_vec();
    assert!(!stored.contains(&111));
    assert!(stored.contains(&222));
}

#[test]
fn call_and_return_restore_the_caller_frame() {
    let sys = "function Sys.init 0\n\
               push constant 21\n\
               call Main.double 1\n\
               label HALT\n\
               goto HALT\n";
    let main = "function Main.double 1\n\
                push argument 0\n\
                push argument 0\n\
                add\n\
                pop local 0\n\
                push local 0\n\
                return\n";
    let mut machine = build(&[("Sys", sys), ("Main", main)], true);
    machine.run(50_000);

    // Sys.init's frame: bootstrap call leaves SP=261, so the argument sat
    // at 261 and the return value must replace it.
    assert_eq!(machine.sp(), 262);
    assert_eq!(machine.stack_top(), 42);
    // Sys.init's pointers are back in place after the inner return.
    assert_eq!(machine.ram[1], 261); // LCL
    assert_eq!(machine.ram[2], 256); // ARG
}

#[test]
fn recursive_fibonacci() {
    let sys = "function Sys.init 0\n\
               push constant 7\n\
               call Main.fib 1\n\
               label HALT\n\
               goto HALT\n";
    let main = "function Main.fib 0\n\
                push argument 0\n\
                push constant 2\n\
                lt\n\
                if-goto BASE\n\
                push argument 0\n\
                push constant 1\n\
                sub\n\
                call Main.fib 1\n\
                push argument 0\n\
                push constant 2\n\
                sub\n\
                call Main.fib 1\n\
                add\n\
                return\n\
                label BASE\n\
                push argument 0\n\
                return\n";
    let mut machine = build(&[("Sys", sys), ("Main", main)], true);
    machine.run(500_000);

    assert_eq!(machine.stack_top(), 13); // fib(7)
    assert_eq!(machine.sp(), 262);
}

#[test]
fn zero_argument_call_keeps_return_address() {
    // With no arguments, *ARG overlaps *(FRAME-5); the return address must
    // be latched before the return value overwrites it.
    let sys = "function Sys.init 0\n\
               call Main.answer 0\n\
               pop static 0\n\
               push constant 1\n\
               label HALT\n\
               goto HALT\n";
    let main = "function Main.answer 0\n\
                push constant 42\n\
                return\n";
    let mut machine = build(&[("Sys", sys), ("Main", main)], true);
    machine.run(50_000);

    // Execution continued past the call site: the marker push happened.
    assert_eq!(machine.stack_top(), 1);
    assert_eq!(machine.sp(), 262);
}
