//! CLI integration tests for the api-design binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("api-design"))
}

mod routes_command {
    use super::*;

    #[test]
    fn prints_full_paths() {
        cmd()
            .arg("routes")
            .assert()
            .success()
            .stdout(predicate::str::contains("/cellar/accounts/:accountID"))
            .stdout(predicate::str::contains("account#show"))
            .stdout(predicate::str::contains(
                "/cellar/accounts/:accountID/bottles/:bottleID",
            ))
            .stdout(predicate::str::contains("/vintages/:year/bottles"));
    }

    #[test]
    fn base_path_override() {
        cmd()
            .args(["routes", "--base-path", "/v2"])
            .assert()
            .success()
            .stdout(predicate::str::contains("/v2/accounts/:accountID"))
            .stdout(predicate::str::contains("/cellar").not());
    }

    #[test]
    fn conflicting_base_path_fails() {
        cmd()
            .args(["routes", "--base-path", "/v1/:accountID"])
            .assert()
            .code(1)
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains(
                r#"duplicate wildcard "accountID" in resource base path "/v1/:accountID/accounts" and action route "/:accountID""#,
            ))
            .stderr(predicate::str::contains(r#"resource "account" / action "show""#))
            .stderr(predicate::str::contains("design has 1 error(s)"));
    }
}

mod show_command {
    use super::*;

    #[test]
    fn prints_design_json() {
        cmd()
            .arg("show")
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""name":"cellar""#))
            .stdout(predicate::str::contains(r#""name":"CreateBottlePayload""#))
            .stdout(predicate::str::contains(r#""name":"RateBottlePayload""#));
    }

    #[test]
    fn pretty_output() {
        cmd()
            .args(["show", "--pretty"])
            .assert()
            .success()
            .stdout(predicate::str::contains("{\n"));
    }

    #[test]
    fn single_resource() {
        cmd()
            .args(["show", "--resource", "account"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""name":"account""#))
            .stdout(predicate::str::contains(r#""name":"UpdateAccountPayload""#))
            .stdout(predicate::str::contains("bottles").not());
    }

    #[test]
    fn unknown_resource() {
        cmd()
            .args(["show", "--resource", "cellar"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("unknown resource cellar"));
    }
}
