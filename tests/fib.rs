use std::{error::Error, path::Path};

use test_utils::{check_run, check_run_with_args, Expected};

const SRC_PATH: &str = "./demos/fib.monkey";
const EXPECTED: Expected = Expected {
    stdout: "6765\n",
    stderr: "",
};

#[test]
fn run_fib_on_the_vm() -> Result<(), Box<dyn Error>> {
    check_run(env!("CARGO_BIN_EXE_monkey"), Path::new(SRC_PATH), EXPECTED)
}

#[test]
fn run_fib_on_the_evaluator() -> Result<(), Box<dyn Error>> {
    check_run_with_args(
        env!("CARGO_BIN_EXE_monkey"),
        Path::new(SRC_PATH),
        &["--engine", "eval"],
        EXPECTED,
    )
}
