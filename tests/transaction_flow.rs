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

#[test]
fn income_and_expense_move_the_balance() {
    let home = tempfile::tempdir().expect("tempdir");

    run_ok(
        &home,
        &["account", "add", "Checking", "--kind", "bank", "--balance", "100.00"],
    );

    run_ok(&home, &["income", "Checking", "50", "Paycheck"]);
    let out = run_ok_out(&home, &["balance", "--format", "tsv"]);
    assert!(out.contains("Checking\tbank\t150.00"));

    run_ok(
        &home,
        &["expense", "Checking", "30", "Groceries", "--category", "Food"],
    );
    let out = run_ok_out(&home, &["balance", "--format", "tsv"]);
    assert!(out.contains("Checking\tbank\t120.00"));
}

#[test]
fn transaction_amount_and_description_are_validated() {
    let home = tempfile::tempdir().expect("tempdir");

    run_ok(&home, &["account", "add", "Checking", "--kind", "bank"]);

    let mut cmd = monedero_cmd();
    cmd.env("MONEDERO_HOME", home.path());
    cmd.args(["expense", "Checking", "0", "Nothing"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Amount must be greater than zero"));

    let mut cmd = monedero_cmd();
    cmd.env("MONEDERO_HOME", home.path());
    cmd.args(["expense", "Checking", "1000000000", "Everything"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Amount too large"));

    let mut cmd = monedero_cmd();
    cmd.env("MONEDERO_HOME", home.path());
    cmd.args(["expense", "Checking", "10", ""]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Description is required"));

    let long_description = "x".repeat(201);
    let mut cmd = monedero_cmd();
    cmd.env("MONEDERO_HOME", home.path());
    cmd.args(["expense", "Checking", "10", &long_description]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Description too long"));
}

#[test]
fn unknown_account_is_rejected() {
    let home = tempfile::tempdir().expect("tempdir");

    let mut cmd = monedero_cmd();
    cmd.env("MONEDERO_HOME", home.path());
    cmd.args(["income", "Ghost", "10", "Found money"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("No such account: 'Ghost'"));
}

#[test]
fn ledger_lists_newest_first_with_signs_and_categories() {
    let home = tempfile::tempdir().expect("tempdir");

    run_ok(&home, &["account", "add", "Checking", "--kind", "bank"]);

    run_ok(
        &home,
        &[
            "expense",
            "Checking",
            "30",
            "Groceries",
            "--category",
            "Food",
            "--date",
            "2026-03-01T10:00:00Z",
        ],
    );
    run_ok(
        &home,
        &["income", "Checking", "50", "Paycheck", "--date", "2026-03-02T10:00:00Z"],
    );

    let out = run_ok_out(&home, &["ledger", "--format", "tsv"]);
    let newest = out
        .find("03/02\tPaycheck\t+$50.00\tIncome\tUncategorized\tChecking")
        .expect("income row");
    let oldest = out
        .find("03/01\tGroceries\t-$30.00\tExpense\tFood\tChecking")
        .expect("expense row");
    assert!(newest < oldest);
}

#[test]
fn ledger_filters_by_account_and_category() {
    let home = tempfile::tempdir().expect("tempdir");

    run_ok(&home, &["account", "add", "Checking", "--kind", "bank"]);
    run_ok(&home, &["account", "add", "Wallet", "--kind", "cash"]);

    run_ok(
        &home,
        &["expense", "Checking", "30", "Groceries", "--category", "Food"],
    );
    run_ok(&home, &["expense", "Wallet", "5", "Coffee"]);

    let out = run_ok_out(&home, &["ledger", "--account", "Wallet", "--format", "tsv"]);
    assert!(out.contains("Coffee"));
    assert!(!out.contains("Groceries"));

    let out = run_ok_out(&home, &["ledger", "--category", "Food", "--format", "tsv"]);
    assert!(out.contains("Groceries"));
    assert!(!out.contains("Coffee"));
}

#[test]
fn empty_ledger_prints_sentinel() {
    let home = tempfile::tempdir().expect("tempdir");

    run_ok(&home, &["account", "add", "Checking", "--kind", "bank"]);

    let out = run_ok_out(&home, &["ledger"]);
    assert!(out.contains("(no transactions)"));
}
