use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn monedero_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("monedero"))
}

fn run_ok(home: &tempfile::TempDir, args: &[&str]) {
    let mut cmd = monedero_cmd();
    cmd.env("MONEDERO_HOME", home.path());
    cmd.env("TZ", "UTC");
    cmd.args(args);
    cmd.assert().success();
}

fn run_ok_out(home: &tempfile::TempDir, args: &[&str]) -> String {
    let mut cmd = monedero_cmd();
    cmd.env("MONEDERO_HOME", home.path());
    cmd.env("TZ", "UTC");
    cmd.args(args);
    let out = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(out).expect("utf8 stdout")
}

fn db_path(home: &tempfile::TempDir) -> std::path::PathBuf {
    home.path().join("data").join("monedero.sqlite3")
}

#[test]
fn new_account_balance_is_its_starting_balance() {
    let home = tempfile::tempdir().expect("tempdir");

    run_ok(
        &home,
        &["account", "add", "Checking", "--kind", "bank", "--balance", "100.00"],
    );

    let out = run_ok_out(&home, &["balance", "--format", "tsv"]);
    assert!(out.contains("Checking\tbank\t100.00"));
    assert!(out.contains("total\t\t100.00"));
}

#[test]
fn negative_starting_balance_is_allowed() {
    let home = tempfile::tempdir().expect("tempdir");

    run_ok(
        &home,
        &["account", "add", "Visa", "--kind", "credit-card", "--balance=-250.50"],
    );

    let out = run_ok_out(&home, &["balance", "--format", "tsv"]);
    assert!(out.contains("Visa\tcredit-card\t-250.50"));
}

#[test]
fn balance_with_no_accounts_prints_sentinel() {
    let home = tempfile::tempdir().expect("tempdir");

    let out = run_ok_out(&home, &["balance"]);
    assert!(out.contains("(no accounts)"));
    assert!(!out.contains("$0.00"));
}

#[test]
fn duplicate_account_name_is_rejected_and_adds_no_row() {
    let home = tempfile::tempdir().expect("tempdir");

    run_ok(&home, &["account", "add", "Checking", "--kind", "bank"]);

    let mut cmd = monedero_cmd();
    cmd.env("MONEDERO_HOME", home.path());
    cmd.args(["account", "add", "Checking", "--kind", "cash"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    let conn = rusqlite::Connection::open(db_path(&home)).expect("open sqlite");
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM accounts", [], |row| row.get(0))
        .expect("count accounts");
    assert_eq!(count, 1);
}

#[test]
fn account_name_kind_and_balance_are_validated() {
    let home = tempfile::tempdir().expect("tempdir");

    let mut cmd = monedero_cmd();
    cmd.env("MONEDERO_HOME", home.path());
    cmd.args(["account", "add", "", "--kind", "cash"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Account name is required"));

    let mut cmd = monedero_cmd();
    cmd.env("MONEDERO_HOME", home.path());
    cmd.args(["account", "add", "Boat", "--kind", "yacht"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unknown account kind"));

    let mut cmd = monedero_cmd();
    cmd.env("MONEDERO_HOME", home.path());
    cmd.args(["account", "add", "Vault", "--kind", "savings", "--balance", "1000000000"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Starting balance too large"));
}

#[test]
fn account_list_shows_created_accounts() {
    let home = tempfile::tempdir().expect("tempdir");

    run_ok(&home, &["account", "add", "Wallet", "--kind", "cash"]);
    run_ok(
        &home,
        &["account", "add", "Nest Egg", "--kind", "savings", "--balance", "5000"],
    );

    let out = run_ok_out(&home, &["account", "list", "--format", "tsv"]);
    assert!(out.contains("Wallet\tcash\t"));
    assert!(out.contains("Nest Egg\tsavings\t"));

    let table = run_ok_out(&home, &["account", "list"]);
    assert!(table.contains("NAME"));
    assert!(table.contains("Savings"));
}
