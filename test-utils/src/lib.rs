use std::{
    error::Error,
    io,
    path::Path,
    process::{Command, Output},
    str,
};

pub struct Expected<'a> {
    pub stdout: &'a str,
    pub stderr: &'a str,
}

impl<'a> Expected<'a> {
    fn assert_matches(self, output: &Output) -> Result<(), Box<dyn Error>> {
        assert_eq!(str::from_utf8(&output.stdout)?, self.stdout);
        assert_eq!(str::from_utf8(&output.stderr)?, self.stderr);
        Ok(())
    }
}

fn run_script(binary: &str, src_path: &Path, extra_args: &[&str]) -> Result<Output, io::Error> {
    Command::new(binary)
        .arg("run")
        .args(extra_args)
        .arg(src_path)
        .output()
}

pub fn check_run(binary: &str, src_path: &Path, expected: Expected) -> Result<(), Box<dyn Error>> {
    check_run_with_args(binary, src_path, &[], expected)
}

pub fn check_run_with_args(
    binary: &str,
    src_path: &Path,
    extra_args: &[&str],
    expected: Expected,
) -> Result<(), Box<dyn Error>> {
    let output = run_script(binary, src_path, extra_args)?;

    assert!(
        output.status.success(),
        "interpreter exited with status {:?}: {}",
        output.status.code(),
        str::from_utf8(&output.stderr)?
    );

    expected.assert_matches(&output)?;

    Ok(())
}
