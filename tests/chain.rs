use test_util::run_line;

#[test]
fn and_chain_short_circuits() {
    assert!(!run_line("false && echo A").stdout.contains('A'));
    assert_eq!(run_line("true && echo A").stdout, "A\n");
}

#[test]
fn or_chain_short_circuits() {
    assert_eq!(run_line("false || echo A").stdout, "A\n");
    assert!(!run_line("true || echo A").stdout.contains('A'));
}

#[test]
fn operator_is_judged_on_the_command_it_follows() {
    assert_eq!(run_line("true && echo A && false && echo B").stdout, "A\n");
    assert_eq!(run_line("false || false || echo C || echo D").stdout, "C\n");
    // stops at the failure before `&&`; the later `||` is never reached
    assert_eq!(run_line("false && echo A || echo B").stdout, "");
}

#[test]
fn chain_exit_code_is_last_command_run() {
    assert_eq!(run_line("true && false").code, 1);
    assert_eq!(run_line("false || true").code, 0);
}

#[test]
fn sequential_runs_every_segment() {
    let r = run_line("false ; echo A ; false ; echo B");
    assert_eq!(r.stdout, "A\nB\n");
}

#[test]
fn sequential_limit_is_five() {
    let r = run_line("echo 1; echo 2; echo 3; echo 4; echo 5; echo 6");
    assert_eq!(r.stdout, "");
    assert!(r.stderr.contains("too many sequential chain segments"), "{}", r.stderr);
}

#[test]
fn conditional_limit_is_six() {
    let r = run_line("true && true && true && true && true && echo ok");
    assert_eq!(r.stdout, "ok\n");
    let r = run_line("true && true && true && true && true && true && echo ok");
    assert_eq!(r.stdout, "");
}

#[test]
fn segment_over_argument_limit_is_skipped_as_failure() {
    let r = run_line("echo 1 2 3 4 5 6 || echo fallback");
    assert_eq!(r.stdout, "fallback\n");
    assert!(r.stderr.contains("too many arguments"));
}
