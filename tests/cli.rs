use std::fs;
use std::path::Path;

use predicates::prelude::*;

fn ietm(data_dir: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("ietm");
    cmd.env_remove("IETM_DATA_DIR")
        .env_remove("IETM_CATALOG")
        .env_remove("IETM_REQUIRE_LOGIN")
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

fn login(data_dir: &Path) {
    ietm(data_dir)
        .args(["login", "--username", "technician", "--password", "tech2024"])
        .assert()
        .success()
        .stdout("Logged in as technician\n");
}

#[test]
fn rust_log_debug_emits_debug_line_to_stderr() {
    let tmp = tempfile::tempdir().expect("tempdir");
    ietm(tmp.path())
        .env("RUST_LOG", "debug")
        .args(["catalog", "dump"])
        .assert()
        .success()
        .stderr(predicate::str::contains("parsed cli"));
}

#[test]
fn login_persists_session_across_invocations() {
    let tmp = tempfile::tempdir().expect("tempdir");
    login(tmp.path());
    assert!(tmp.path().join("ietm_auth.json").exists());

    ietm(tmp.path())
        .arg("whoami")
        .assert()
        .success()
        .stdout("technician\n");

    ietm(tmp.path())
        .arg("logout")
        .assert()
        .success()
        .stdout("Logged out\n");
    assert!(!tmp.path().join("ietm_auth.json").exists());

    ietm(tmp.path())
        .arg("whoami")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not logged in"));
}

#[test]
fn wrong_password_is_rejected_and_nothing_is_stored() {
    let tmp = tempfile::tempdir().expect("tempdir");
    ietm(tmp.path())
        .args(["login", "--username", "technician", "--password", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid username or password"));
    assert!(!tmp.path().join("ietm_auth.json").exists());
}

#[test]
fn reading_requires_login_unless_disabled() {
    let tmp = tempfile::tempdir().expect("tempdir");
    ietm(tmp.path())
        .args(["search", "radar"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not logged in"));

    ietm(tmp.path())
        .env("IETM_REQUIRE_LOGIN", "false")
        .args(["search", "error codes"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("1 result for \"error codes\"\n"));
}

#[test]
fn search_lists_title_matches_first() {
    let tmp = tempfile::tempdir().expect("tempdir");
    login(tmp.path());

    let output = ietm(tmp.path())
        .args(["search", "calibration"])
        .output()
        .expect("run search");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf-8 stdout");
    assert!(stdout.starts_with("1 result for \"calibration\"\n"), "{stdout}");
    assert!(stdout.contains("[Calibration] Procedures  (User Handbook / uh-calibration)"));
    assert!(stdout.contains("$ ietm show --type user --section uh-calibration"));

    ietm(tmp.path())
        .args(["search", "   "])
        .assert()
        .success()
        .stdout("Enter keywords to find relevant sections in the radar manuals\n");
}

#[test]
fn show_reports_position_and_neighbours() {
    let tmp = tempfile::tempdir().expect("tempdir");
    login(tmp.path());

    ietm(tmp.path())
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "Introduction  [Not bookmarked]\nSection 1 of 8 - User Handbook\nDocument: /manuals/user-handbook.pdf, page 1\n",
        ))
        .stdout(predicate::str::contains(
            "< (first section) | System Overview (uh-overview) >\n",
        ));

    ietm(tmp.path())
        .args(["show", "--type", "technical", "--section", "tm-specifications"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Section 8 of 8 - Technical Manual"))
        .stdout(predicate::str::contains(
            "< Repair Procedures (tm-repair) | (last section) >\n",
        ));

    ietm(tmp.path())
        .args(["show", "--section", "tm-repair"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "Introduction  [Not bookmarked]\nSection 1 of 8 - User Handbook\n",
        ));
}

#[test]
fn toc_expands_only_requested_sections() {
    let tmp = tempfile::tempdir().expect("tempdir");
    login(tmp.path());

    ietm(tmp.path())
        .args(["toc", "--type", "technical", "--expand", "tm-diagnostics"])
        .assert()
        .success()
        .stdout(
            "Radar System Technical Manual\n\
             \x20 [+] System Architecture  (tm-architecture)\n\
             \x20 [-] Diagnostics & Troubleshooting  (tm-diagnostics)\n\
             \x20       Error Codes Reference  (tm-error-codes)\n\
             \x20       Repair Procedures  (tm-repair)\n\
             \x20     Technical Specifications  (tm-specifications)\n",
        );
}

#[test]
fn bookmarks_add_list_remove() {
    let tmp = tempfile::tempdir().expect("tempdir");
    login(tmp.path());

    ietm(tmp.path())
        .args(["bookmarks", "list"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("No bookmarks yet\n"));

    ietm(tmp.path())
        .args(["bookmarks", "add", "--type", "technical", "--section", "tm-repair"])
        .assert()
        .success()
        .stdout("Bookmarked: Repair Procedures\n");
    ietm(tmp.path())
        .args(["bookmarks", "add", "--type", "technical", "--section", "tm-repair"])
        .assert()
        .success()
        .stdout("Already bookmarked: Repair Procedures\n");

    let stored = fs::read_to_string(tmp.path().join("ietm_bookmarks.json")).expect("read blob");
    let stored: serde_json::Value = serde_json::from_str(&stored).expect("parse blob");
    assert_eq!(stored[0]["id"], "tm-repair");
    assert_eq!(stored[0]["manualType"], "technical");
    assert!(stored[0]["createdAt"].is_string());

    ietm(tmp.path())
        .args(["bookmarks", "list"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("1 bookmark saved\n"))
        .stdout(predicate::str::contains("Repair Procedures  (tm-repair)"))
        .stdout(predicate::str::contains("  Technical Manual - Saved "));

    ietm(tmp.path())
        .args(["show", "--type", "technical", "--section", "tm-repair"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Repair Procedures  [Bookmarked]\n"));

    ietm(tmp.path())
        .args(["bookmarks", "remove", "--id", "tm-repair"])
        .assert()
        .success()
        .stdout("Removed bookmark tm-repair\n");
    ietm(tmp.path())
        .args(["bookmarks", "remove", "--id", "tm-repair"])
        .assert()
        .success()
        .stdout("No bookmark for tm-repair\n");
}

#[test]
fn bookmarking_a_section_from_the_other_manual_fails() {
    let tmp = tempfile::tempdir().expect("tempdir");
    login(tmp.path());
    ietm(tmp.path())
        .args(["bookmarks", "add", "--section", "tm-repair"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no section tm-repair in the User Handbook"));
}

#[test]
fn corrupt_bookmarks_are_quarantined_with_a_warning() {
    let tmp = tempfile::tempdir().expect("tempdir");
    login(tmp.path());
    fs::write(tmp.path().join("ietm_bookmarks.json"), "{not json").expect("write blob");

    ietm(tmp.path())
        .args(["bookmarks", "list"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("No bookmarks yet\n"))
        .stderr(predicate::str::contains("warning: stored bookmarks were unreadable"));
    assert!(tmp.path().join("ietm_bookmarks.corrupt.json").exists());
}

#[test]
fn read_steps_through_sections_from_stdin() {
    let tmp = tempfile::tempdir().expect("tempdir");
    login(tmp.path());

    let output = ietm(tmp.path())
        .args(["read", "--type", "technical"])
        .write_stdin("prev\nnext\nbookmark\nopen tm-specifications\nnext\nquit\n")
        .output()
        .expect("run read");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf-8 stdout");
    assert!(stdout.contains("already at the first section"), "{stdout}");
    assert!(stdout.contains("Hardware Components  [Not bookmarked]"));
    assert!(stdout.contains("bookmarked\n"));
    assert!(stdout.contains("Technical Specifications  [Not bookmarked]"));
    assert!(stdout.contains("already at the last section"));

    ietm(tmp.path())
        .args(["bookmarks", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hardware Components  (tm-hardware)"));
}

#[test]
fn catalog_dump_round_trips_through_check() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let output = ietm(tmp.path())
        .args(["catalog", "dump"])
        .output()
        .expect("run catalog dump");
    assert!(output.status.success());
    let catalog_path = tmp.path().join("catalog.yaml");
    fs::write(&catalog_path, &output.stdout).expect("write catalog");

    ietm(tmp.path())
        .args(["catalog", "check", "--file"])
        .arg(&catalog_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("user: Radar System User Handbook (8 sections)"))
        .stdout(predicate::str::contains("technical: Radar System Technical Manual (8 sections)"))
        .stdout(predicate::str::contains("ok: "));
}

#[test]
fn custom_catalog_replaces_builtin_manuals() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let catalog_path = tmp.path().join("catalog.yaml");
    fs::write(
        &catalog_path,
        r#"user:
  id: mini-user
  title: Mini Handbook
  description: Two sections
  sections:
    - id: a
      title: Alpha
      level: 1
      content: First page
    - id: b
      title: Beta
      level: 1
technical:
  id: mini-tech
  title: Mini Technical
  description: One section
  sections:
    - id: t
      title: Torque Table
      level: 1
      content: Fastener torque values
"#,
    )
    .expect("write catalog");

    ietm(tmp.path())
        .env("IETM_REQUIRE_LOGIN", "0")
        .arg("--catalog")
        .arg(&catalog_path)
        .args(["search", "torque"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[Torque] Table  (Technical Manual / t)"));

    let broken = tmp.path().join("broken.yaml");
    fs::write(
        &broken,
        fs::read_to_string(&catalog_path)
            .expect("read catalog")
            .replace("id: b", "id: a"),
    )
    .expect("write broken catalog");
    ietm(tmp.path())
        .args(["catalog", "check", "--file"])
        .arg(&broken)
        .assert()
        .failure()
        .stderr(predicate::str::contains("catalog check"));
}
