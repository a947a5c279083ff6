use assert_cmd::Command;
use predicates::str::contains;

fn lc3sim() -> Command {
    let mut cmd = Command::cargo_bin("lc3sim").unwrap();
    cmd.env_remove("LC3SIM_TRACE").env("NO_COLOR", "1");
    cmd
}

#[test]
fn runs_without_arguments() {
    lc3sim().assert().success().stdout(contains("lc3sim"));
}

#[test]
fn runs_to_halt() {
    lc3sim()
        .arg("run")
        .arg("tests/files/count.txt")
        .arg("--minimal")
        .assert()
        .success()
        .stdout(contains("processed 3\n"))
        .stdout(contains("R0 0000000000000010\n"))
        .stdout(contains("PC 0011000000000011\n"))
        .stdout(contains("CC 001\n"));
}

#[test]
fn runs_path_without_subcommand() {
    lc3sim()
        .arg("tests/files/count.txt")
        .assert()
        .success()
        .stdout(contains("Halted"))
        .stdout(contains("after 3 instruction(s)"));
}

#[test]
fn pokes_and_dumps_memory() {
    lc3sim()
        .arg("run")
        .arg("tests/files/double.txt")
        .arg("--minimal")
        .args(["--poke", "x3100=0000000000001111"])
        .args(["--dump", "x3101", "--dump", "0x3100"])
        .assert()
        .success()
        .stdout(contains("processed 4\n"))
        .stdout(contains("x3101 0000000000011110\n"))
        .stdout(contains("x3100 0000000000001111\n"));
}

#[test]
fn reports_invalid_opcode() {
    lc3sim()
        .arg("run")
        .arg("tests/files/invalid.txt")
        .arg("--minimal")
        .assert()
        .failure()
        .stderr(contains("INVALID"))
        .stderr(contains("0x3001"));
}

#[test]
fn rti_needs_supervisor_mode() {
    lc3sim()
        .arg("run")
        .arg("tests/files/rti.txt")
        .assert()
        .failure()
        .stderr(contains("RTI"));

    lc3sim()
        .arg("run")
        .arg("tests/files/rti.txt")
        .arg("--minimal")
        .arg("--supervisor")
        .assert()
        .success()
        .stdout(contains("processed 2\n"));
}

#[test]
fn stops_at_instruction_limit() {
    lc3sim()
        .arg("run")
        .arg("tests/files/spin.txt")
        .args(["--limit", "1000"])
        .assert()
        .failure()
        .stderr(contains("did not halt within 1000 instructions"));

    lc3sim()
        .arg("run")
        .arg("tests/files/count.txt")
        .args(["--limit", "3"])
        .assert()
        .success();
}

#[test]
fn traces_each_instruction() {
    lc3sim()
        .env("LC3SIM_TRACE", "1")
        .arg("run")
        .arg("tests/files/count.txt")
        .arg("--minimal")
        .assert()
        .success()
        .stderr(contains("x3000  0001000000100001  ADD\n"))
        .stderr(contains("x3002  1111000000100101  TRAP\n"));
}

#[test]
fn checks_images() {
    lc3sim()
        .arg("check")
        .arg("tests/files/count.txt")
        .assert()
        .success()
        .stdout(contains("3 word(s) from x3000"));

    lc3sim()
        .arg("check")
        .arg("tests/files/malformed.txt")
        .assert()
        .failure()
        .stderr(contains("malformed word"));
}

#[test]
fn rejects_bad_arguments() {
    lc3sim()
        .arg("run")
        .arg("tests/files/count.txt")
        .args(["--poke", "x3100=12"])
        .assert()
        .failure()
        .stderr(contains("Invalid memory poke"));

    lc3sim()
        .arg("run")
        .arg("tests/files/count.txt")
        .args(["--dump", "xZZZZ"])
        .assert()
        .failure()
        .stderr(contains("Invalid address"));

    lc3sim()
        .arg("run")
        .arg("tests/files/missing.txt")
        .assert()
        .failure();
}

#[test]
fn no_color_strips_escapes() {
    let output = lc3sim()
        .arg("run")
        .arg("tests/files/double.txt")
        .args(["--dump", "x3101"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("x3101 = "));
    assert!(stdout.contains("PC"));
    assert!(!stdout.contains('\x1b'), "escape in stdout: {stdout:?}");
}

#[test]
fn accepts_every_hex_prefix() {
    lc3sim()
        .arg("run")
        .arg("tests/files/double.txt")
        .arg("--minimal")
        .args(["--poke", "0X3100=0000000000000011"])
        .args(["--dump", "0X3101", "--dump", "X3101", "--dump", "12545"])
        .assert()
        .success()
        .stdout(contains("x3101 0000000000000110\n"))
        .stdout(contains("x3101 0000000000000110\nx3101 0000000000000110\nx3101 0000000000000110\n"));
}
