//! Drives compiled Jack code through the whole toolchain: Jack -> VM ->
//! assembly -> binary, then executes the binary and checks the machine
//! state. OS calls are avoided, so the programs stand alone.

use hack_machine::Machine;
use jack_compiler::compile_source;
use vm_translator::{translate_unit, CodeWriter};

/// `Sys.init` hands control to `Main.main` and parks in a halt loop.
const SYS_VM: &str = "function Sys.init 0\n\
                      call Main.main 0\n\
                      label HALT\n\
                      goto HALT\n";

fn run_main_class(jack_source: &str, steps: usize) -> Machine {
    let vm = String::from_utf8(compile_source(jack_source, Vec::new()).unwrap()).unwrap();

    let mut writer = CodeWriter::new(Vec::new());
    writer.write_bootstrap().unwrap();
    translate_unit("Sys", SYS_VM.as_bytes(), &mut writer).unwrap();
    translate_unit("Main", vm.as_bytes(), &mut writer).unwrap();
    let asm = String::from_utf8(writer.into_inner()).unwrap();

    let lines: Vec<String> = asm.lines().map(String::from).collect();
    let words = hack_assembler::assemble(&lines).unwrap();

    let mut machine = Machine::from_binary_text(&words).unwrap();
    machine.run(steps);
    machine
}

#[test]
fn iterative_sum_of_first_ten_numbers() {
    let machine = run_main_class(
        "class Main {
             function int main() {
                 var int i, sum;
                 let sum = 0;
                 let i = 0;
                 while (i < 10) {
                     let sum = sum + i;
                     let i = i + 1;
                 }
                 return sum;
             }
         }",
        200_000,
    );
    // Main.main's value replaced its (zero) arguments one above Sys.init's
    // working stack.
    assert_eq!(machine.stack_top(), 45);
    assert_eq!(machine.sp(), 262);
}

#[test]
fn recursive_sum_through_call_and_return() {
    let machine = run_main_class(
        "class Main {
             function int main() {
                 return Main.sum(10);
             }
             function int sum(int n) {
                 if (n < 1) {
                     return 0;
                 }
                 return n + Main.sum(n - 1);
             }
         }",
        500_000,
    );
    assert_eq!(machine.stack_top(), 55);
    assert_eq!(machine.sp(), 262);
}

#[test]
fn branches_and_boolean_logic() {
    let machine = run_main_class(
        "class Main {
             function int main() {
                 var int r;
                 if ((3 < 5) & (~(2 > 4))) {
                     let r = 100;
                 } else {
                     let r = 200;
                 }
                 return r;
             }
         }",
        200_000,
    );
    assert_eq!(machine.stack_top(), 100);
}

#[test]
fn statics_hold_state_between_calls() {
    let machine = run_main_class(
        "class Main {
             static int acc;
             function int main() {
                 let acc = 0;
                 do Main.bump(7);
                 do Main.bump(35);
                 return acc;
             }
             function void bump(int by) {
                 let acc = acc + by;
                 return;
             }
         }",
        200_000,
    );
    assert_eq!(machine.stack_top(), 42);
}
