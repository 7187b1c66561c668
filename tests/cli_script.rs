use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn shell(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ibudget_cli").unwrap();
    cmd.env("IBUDGET_CLI_SCRIPT", "1")
        .env("IBUDGET_HOME", home.path())
        .env_remove("API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn script_mode_runs_basic_flow() {
    let home = TempDir::new().unwrap();
    let input = "add 100 income Paycheck\n\
                 add 30 food Groceries\n\
                 add 20 \"Food & Drink\" Pizza night\n\
                 balance\n\
                 budget set food 40\n\
                 budget list\n\
                 history pizza\n\
                 exit\n";

    shell(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Balance: $50.00"))
        .stdout(contains("Food & Drink limit set to $40.00."))
        .stdout(contains("over budget"))
        .stdout(contains("Pizza night"));

    let stored = std::fs::read_to_string(home.path().join("data").join("transactions.json")).unwrap();
    assert!(stored.contains("\"Groceries\""));
}

#[test]
fn data_persists_between_runs() {
    let home = TempDir::new().unwrap();
    shell(&home)
        .write_stdin("add 12.5 transport Bus pass\n")
        .assert()
        .success();

    shell(&home)
        .write_stdin("recent\nspending\n")
        .assert()
        .success()
        .stdout(contains("Bus pass"))
        .stdout(contains("Transport"))
        .stdout(contains("$12.50"));
}

#[test]
fn offline_quick_add_and_insights_use_fallbacks() {
    let home = TempDir::new().unwrap();
    shell(&home)
        .write_stdin("insights\nquick Coffee 5\ninsights\n")
        .assert()
        .success()
        .stdout(contains("Add some transactions to see AI insights!"))
        .stdout(contains("Added $5.00 in Other: Coffee 5"))
        .stdout(contains("AI insights are unavailable (No API Key)"))
        .stdout(contains("Manual tracking enabled"));
}

#[test]
fn recurring_rules_can_be_added_and_listed() {
    let home = TempDir::new().unwrap();
    shell(&home)
        .write_stdin("recurring add 9.99 entertainment monthly Streaming\nrecurring list\n")
        .assert()
        .success()
        .stdout(contains("Monthly recurring $9.99 in Entertainment saved"))
        .stdout(contains("Streaming"));
}

#[test]
fn bad_input_is_reported_and_the_loop_continues() {
    let home = TempDir::new().unwrap();
    shell(&home)
        .write_stdin("add -5 food Refund\nbudget set income 10\nbalanse\nbalance\n")
        .assert()
        .success()
        .stdout(contains("amount must be a non-negative number"))
        .stdout(contains("Income cannot have a budget limit"))
        .stdout(contains("Did you mean `balance`?"))
        .stdout(contains("Balance: $0.00"));
}

#[test]
fn clear_removes_everything_in_script_mode() {
    let home = TempDir::new().unwrap();
    shell(&home)
        .write_stdin("add 3 food Tea\nclear\nhistory\n")
        .assert()
        .success()
        .stdout(contains("Removed 1 transaction(s)."))
        .stdout(contains("No transactions found."));
}

#[test]
fn config_changes_are_saved() {
    let home = TempDir::new().unwrap();
    shell(&home)
        .write_stdin("config set currency €\nconfig set ai off\nadd 2 food Gum\nbalance\n")
        .assert()
        .success()
        .stdout(contains("Balance: -€2.00"));

    let config =
        std::fs::read_to_string(home.path().join("config").join("config.json")).unwrap();
    assert!(config.contains("\"currency_symbol\": \"€\""));
    assert!(config.contains("\"enabled\": false"));
}

#[test]
fn help_lists_commands_and_version_prints_metadata() {
    let home = TempDir::new().unwrap();
    shell(&home)
        .write_stdin("help\nhelp recurring\nversion\n")
        .assert()
        .success()
        .stdout(contains("Available commands"))
        .stdout(contains("Usage: recurring"))
        .stdout(contains("iBudget Core").and(contains("Build hash")));
}
