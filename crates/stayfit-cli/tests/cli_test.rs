//! End-to-end tests for the `stayfit` binary.
//!
//! The offline commands run against a temporary config directory. The
//! account/profile/plan flow runs against its own temporary database from
//! `stayfit-test-utils`.

use std::path::Path;
use std::process::{Command, Output};

use stayfit_test_utils::{create_test_db, drop_test_db, pg_url};

/// A `stayfit` command isolated from the caller's config and credentials.
fn stayfit(config_home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_stayfit"));
    cmd.env("XDG_CONFIG_HOME", config_home)
        .env("RUST_LOG", "warn")
        .env_remove("STAYFIT_DATABASE_URL")
        .env_remove("STAYFIT_AUTH_SECRET")
        .env_remove("STAYFIT_PASSWORD")
        .env_remove("GEMINI_API_KEY");
    cmd
}

fn run(cmd: &mut Command) -> Output {
    cmd.output().expect("failed to run stayfit")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "stayfit failed\nstdout: {}\nstderr: {}",
        stdout(output),
        String::from_utf8_lossy(&output.stderr)
    );
}

const PROFILE_ARGS: [&str; 10] = [
    "--name", "Riley", "--age", "32", "--weight", "80", "--height", "178", "--goal",
    "muscle_gain",
];

#[test]
fn preview_prints_standard_plan() {
    let tmp = tempfile::TempDir::new().unwrap();
    let output = run(stayfit(tmp.path()).args(["plan", "preview"]).args(PROFILE_ARGS));
    assert_success(&output);

    let text = stdout(&output);
    assert!(text.contains("Protein:  176 g per day"), "{text}");
    assert!(text.contains("Carbs:    4-6 g per kg body weight"), "{text}");
    assert!(text.contains("Water:    2.5-3 liters per day"), "{text}");
    assert!(text.contains("BMI:    25.2"), "{text}");
}

#[test]
fn preview_json_is_a_diet_plan() {
    let tmp = tempfile::TempDir::new().unwrap();
    let output = run(stayfit(tmp.path())
        .args(["plan", "preview", "--json"])
        .args(PROFILE_ARGS));
    assert_success(&output);

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(plan["proteinIntakeGrams"], serde_json::json!(176.0));
    assert_eq!(plan["creatineAdviceText"], "5g daily consistently");
}

#[test]
fn preview_rejects_bad_input() {
    let tmp = tempfile::TempDir::new().unwrap();

    let output = run(stayfit(tmp.path()).args([
        "plan", "preview", "--name", "Riley", "--age", "32", "--weight", "80", "--height",
        "178", "--goal", "bulk",
    ]));
    assert!(!output.status.success());

    let output = run(stayfit(tmp.path()).args([
        "plan", "preview", "--name", "Riley", "--age", "32", "--weight", "80", "--height",
        "0", "--goal", "fat_loss",
    ]));
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("height"), "unexpected error: {stderr}");
}

#[test]
fn init_writes_config_once() {
    let tmp = tempfile::TempDir::new().unwrap();
    let output = run(stayfit(tmp.path()).args(["init", "--db-url", "postgresql://h:5432/db"]));
    assert_success(&output);

    let path = tmp.path().join("stayfit").join("config.toml");
    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("url = \"postgresql://h:5432/db\""), "{contents}");
    assert!(contents.contains("secret = "), "{contents}");
    assert!(!contents.contains("[gemini]"), "{contents}");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    let again = run(stayfit(tmp.path()).args(["init"]));
    assert!(!again.status.success());

    let forced = run(stayfit(tmp.path()).args(["init", "--force", "--gemini-api-key", "k"]));
    assert_success(&forced);
    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("[gemini]"), "{contents}");
}

#[test]
fn commands_needing_the_database_require_a_secret() {
    let tmp = tempfile::TempDir::new().unwrap();
    let output = run(stayfit(tmp.path()).args([
        "plan", "show", "--email", "a@b.com", "--password", "secret1",
    ]));
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("auth secret not found"), "{stderr}");
}

#[tokio::test]
async fn account_profile_and_plan_flow() {
    let (pool, db_name) = create_test_db().await;
    let db_url = format!("{}/{db_name}", pg_url().await);
    let tmp = tempfile::TempDir::new().unwrap();

    let cmd = |args: &[&str]| {
        let mut cmd = stayfit(tmp.path());
        cmd.env("STAYFIT_AUTH_SECRET", "5e".repeat(32))
            .env("STAYFIT_PASSWORD", "correct-horse")
            .args(["--database-url", db_url.as_str()])
            .args(args);
        run(&mut cmd)
    };

    let output = cmd(&["signup", "--email", "riley@example.com"]);
    assert_success(&output);
    assert!(stdout(&output).contains("riley@example.com"));

    let output = cmd(&["signup", "--email", "riley@example.com"]);
    assert!(!output.status.success(), "duplicate signup should fail");

    let output = cmd(&["profile", "show", "--email", "riley@example.com"]);
    assert_success(&output);
    assert!(stdout(&output).contains("No profile yet"));

    let mut create = vec!["profile", "create", "--email", "riley@example.com"];
    create.extend(PROFILE_ARGS);
    let output = cmd(&create);
    assert_success(&output);
    let text = stdout(&output);
    assert!(text.contains("Protein:  176 g per day"), "{text}");
    assert!(text.contains("standard plan"), "{text}");

    let output = cmd(&["plan", "show", "--email", "riley@example.com", "--json"]);
    assert_success(&output);
    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(plan["proteinIntakeGrams"], serde_json::json!(176.0));

    let output = cmd(&[
        "profile", "update", "--email", "riley@example.com", "--name", "Riley", "--age", "32",
        "--weight", "70", "--height", "178", "--goal", "fat_loss",
    ]);
    assert_success(&output);

    // Updating the profile leaves the plan alone.
    let output = cmd(&["plan", "show", "--email", "riley@example.com"]);
    assert!(stdout(&output).contains("Protein:  176 g per day"));

    let output = cmd(&["plan", "regenerate", "--email", "riley@example.com"]);
    assert_success(&output);
    let text = stdout(&output);
    assert!(text.contains("Protein:  112 g per day"), "{text}");
    assert!(text.contains("Carbs:    2-3 g per kg body weight"), "{text}");

    let output = run(stayfit(tmp.path())
        .env("STAYFIT_AUTH_SECRET", "5e".repeat(32))
        .args(["--database-url", db_url.as_str()])
        .args(["plan", "show", "--email", "riley@example.com", "--password", "wrong-pass"]));
    assert!(!output.status.success());

    pool.close().await;
    drop_test_db(&db_name).await;
}
