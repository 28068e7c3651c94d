use std::io::Write;
use std::time::{Duration, Instant};
use test_util::{read_until, run_line, run_script, spawn_interactive};

#[test]
fn background_returns_immediately_and_fg_waits() {
    let mut child = spawn_interactive();
    let mut stdin = child.stdin.take().unwrap();
    let mut stdout = child.stdout.take().unwrap();
    let mut acc = String::new();
    let start = Instant::now();
    stdin.write_all(b"sleep 1 &\necho ready\n").unwrap();
    read_until(&mut stdout, &mut acc, "ready");
    assert!(start.elapsed() < Duration::from_millis(900), "background launch blocked");

    stdin.write_all(b"fg\necho done\n").unwrap();
    read_until(&mut stdout, &mut acc, "done");
    assert!(start.elapsed() >= Duration::from_secs(1), "fg returned before the job ended");
    drop(stdin);
    assert!(child.wait().unwrap().success());
}

#[test]
fn fg_with_no_jobs_reports_and_does_not_block() {
    let r = run_line("fg");
    assert_eq!(r.code, 1);
    assert!(r.stdout.contains("No background processes"));
}

#[test]
fn fg_drains_jobs_last_first() {
    let r = run_script("true &\ntrue &\nfg\nfg\nfg\n");
    assert_eq!(r.stdout.matches("No background processes").count(), 1);
}
