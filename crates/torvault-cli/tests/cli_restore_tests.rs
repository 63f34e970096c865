//! CLI integration tests
//!
//! Drive the `torvault` binary through a backup import followed by a restore
//! plan and execute against a JSON client state file.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::{TimeZone, Utc};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;
use torvault_core::model::CategorySnapshot;
use torvault_core::{BackupManifest, LiveState, LiveTorrent, ManifestItem};

struct Repo {
    dir: TempDir,
}

impl Repo {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn run(&self, args: &[&str]) -> Output {
        let db = self.path("ledger.db");
        let cas = self.path("cas");
        Command::new(env!("CARGO_BIN_EXE_torvault"))
            .current_dir(self.dir.path())
            .args(args)
            .args(["--db", db.to_str().unwrap(), "--cas", cas.to_str().unwrap()])
            .output()
            .expect("Failed to execute CLI")
    }

    fn run_json(&self, args: &[&str]) -> serde_json::Value {
        let mut with_json = args.to_vec();
        with_json.push("--json");
        let output = self.run(&with_json);
        assert!(
            output.status.success(),
            "stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }

    fn import(&self) -> String {
        self.import_manifest(&manifest())
    }

    fn import_manifest(&self, manifest: &BackupManifest) -> String {
        let manifest_path = self.path("manifest.json");
        std::fs::write(&manifest_path, manifest.to_json_pretty().unwrap()).unwrap();
        let out = self.run_json(&[
            "backup",
            "import",
            "--manifest",
            manifest_path.to_str().unwrap(),
            "--instance",
            "home",
        ]);
        out["run_id"].as_str().unwrap().to_string()
    }
}

fn manifest() -> BackupManifest {
    let mut manifest = BackupManifest::new(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap());
    manifest
        .categories
        .insert("Movies".to_string(), CategorySnapshot::new("/m"));
    manifest.tags.insert("4k".to_string());
    manifest.items.push(
        ManifestItem::new("abc", "Some Movie", 4_000)
            .with_category("Movies")
            .with_tags(["4k"])
            .with_torrent_blob(b"d4:infod4:name10:Some Moviee".to_vec()),
    );
    manifest
}

fn write_state(path: &Path, state: &LiveState) {
    std::fs::write(path, serde_json::to_vec_pretty(state).unwrap()).unwrap();
}

fn read_state(path: &Path) -> LiveState {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

#[test]
fn test_import_then_list_and_show() {
    let repo = Repo::new();
    let run_id = repo.import();

    let runs = repo.run_json(&["backup", "list", "--instance", "home"]);
    assert_eq!(runs.as_array().unwrap().len(), 1);
    assert_eq!(runs[0]["run_id"], run_id.as_str());
    assert_eq!(runs[0]["torrent_count"], 1);

    let show = repo.run_json(&["backup", "show", "--run", run_id.as_str()]);
    assert_eq!(show["payloads"], 1);

    let other = repo.run_json(&["backup", "list", "--instance", "seedbox"]);
    assert!(other.as_array().unwrap().is_empty());
}

#[test]
fn test_plan_is_deterministic_and_honors_exclusions() {
    let repo = Repo::new();
    let run_id = repo.import();
    let state = repo.path("state.json");
    let state_arg = state.to_str().unwrap();

    let args = [
        "restore", "plan", "--run", run_id.as_str(), "--state", state_arg, "--mode", "incremental",
    ];
    let first = repo.run_json(&args);
    let second = repo.run_json(&args);
    assert_eq!(first["digest"], second["digest"]);
    assert_eq!(first["plan"]["torrents"]["add"].as_array().unwrap().len(), 1);

    let mut excluded_args = args.to_vec();
    excluded_args.extend(["--exclude", "abc"]);
    let excluded = repo.run_json(&excluded_args);
    assert!(excluded["plan"]["torrents"]["add"].as_array().unwrap().is_empty());
    assert_eq!(excluded["plan"]["categories"]["create"].as_array().unwrap().len(), 1);
    assert_ne!(excluded["digest"], first["digest"]);

    // Planning never writes the state file
    assert!(!state.exists());
}

#[test]
fn test_execute_writes_state_back_and_dry_run_does_not() {
    let repo = Repo::new();
    let run_id = repo.import();
    let state = repo.path("state.json");
    let mut live = LiveState::default();
    live.torrents
        .insert("xyz".to_string(), LiveTorrent::new("xyz", "Stray"));
    write_state(&state, &live);
    let state_arg = state.to_str().unwrap();

    let dry = repo.run_json(&[
        "restore", "execute", "--run", run_id.as_str(), "--state", state_arg, "--mode", "complete",
        "--dry-run",
    ]);
    assert_eq!(dry["dry_run"], true);
    assert_eq!(dry["applied"]["torrents"]["deleted"], 1);
    assert_eq!(read_state(&state), live);

    let real = repo.run_json(&[
        "restore", "execute", "--run", run_id.as_str(), "--state", state_arg, "--mode", "complete",
    ]);
    assert_eq!(real["applied"], dry["applied"]);

    let restored = read_state(&state);
    assert!(restored.torrents.contains_key("abc"));
    assert!(!restored.torrents.contains_key("xyz"));
    assert_eq!(restored.categories["Movies"].save_path, "/m");
}

#[test]
fn test_markdown_output_by_default() {
    let repo = Repo::new();
    let run_id = repo.import();
    let state = repo.path("state.json");

    let output = repo.run(&[
        "restore",
        "plan",
        "--run",
        run_id.as_str(),
        "--state",
        state.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("## Restore Plan"));
    assert!(stdout.contains("Plan digest:"));
}

#[test]
fn test_unknown_run_fails_with_snapshot_not_found() {
    let repo = Repo::new();
    let state = repo.path("state.json");

    let output = repo.run(&[
        "restore",
        "plan",
        "--run",
        "no-such-run",
        "--state",
        state.to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERR_SNAPSHOT_NOT_FOUND"), "stderr: {}", stderr);
}

#[test]
fn test_settings_file_sets_default_mode() {
    let repo = Repo::new();
    let run_id = repo.import();
    let state = repo.path("state.json");
    let mut live = LiveState::default();
    live.torrents
        .insert("xyz".to_string(), LiveTorrent::new("xyz", "Stray"));
    write_state(&state, &live);
    let config = repo.path("torvault.toml");
    std::fs::write(&config, "default_mode = \"complete\"\n").unwrap();

    let plan = repo.run_json(&[
        "restore",
        "plan",
        "--run",
        run_id.as_str(),
        "--state",
        state.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ]);
    assert_eq!(plan["plan"]["mode"], "complete");
    assert_eq!(plan["plan"]["torrents"]["delete"][0], "xyz");

    // The command line wins over the file
    let plan = repo.run_json(&[
        "restore",
        "plan",
        "--run",
        run_id.as_str(),
        "--state",
        state.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--mode",
        "overwrite",
    ]);
    assert!(plan["plan"]["torrents"]["delete"].as_array().unwrap().is_empty());
}

#[test]
fn test_api_version_makes_save_path_changeable() {
    let repo = Repo::new();
    let mut recorded = manifest();
    recorded.items[0].save_path = Some("/m/abc".to_string());
    let run_id = repo.import_manifest(&recorded);

    let state = repo.path("state.json");
    let mut live = LiveState::default();
    live.categories
        .insert("Movies".to_string(), CategorySnapshot::new("/m"));
    live.tags.insert("4k".to_string());
    live.torrents.insert(
        "abc".to_string(),
        LiveTorrent::new("abc", "Some Movie")
            .with_category("Movies")
            .with_tags(["4k"])
            .with_save_path("/old"),
    );
    write_state(&state, &live);
    let base = ["restore", "plan", "--run", run_id.as_str(), "--state", state.to_str().unwrap()];

    let fixed = repo.run_json(&base);
    let change = &fixed["plan"]["torrents"]["update"][0]["changes"][0];
    assert_eq!(change["field"], "save_path");
    assert_eq!(change["supported"], false);

    let mut versioned_args = base.to_vec();
    versioned_args.extend(["--api-version", "2.8.4"]);
    let versioned = repo.run_json(&versioned_args);
    let change = &versioned["plan"]["torrents"]["update"][0]["changes"][0];
    assert_eq!(change["field"], "save_path");
    assert_eq!(change["supported"], true);

    let mut execute_args = versioned_args.clone();
    execute_args[1] = "execute";
    let result = repo.run_json(&execute_args);
    assert_eq!(result["applied"]["torrents"]["updated"], 1);
    assert!(result["warnings"].as_array().unwrap().is_empty());
    assert_eq!(
        read_state(&state).torrents["abc"].save_path.as_deref(),
        Some("/m/abc")
    );
}

#[test]
fn test_api_version_from_settings_file() {
    let repo = Repo::new();
    let mut recorded = manifest();
    recorded.items[0].save_path = Some("/m/abc".to_string());
    let run_id = repo.import_manifest(&recorded);

    let state = repo.path("state.json");
    let mut live = LiveState::default();
    live.torrents.insert(
        "abc".to_string(),
        LiveTorrent::new("abc", "Some Movie")
            .with_category("Movies")
            .with_tags(["4k"])
            .with_save_path("/old"),
    );
    write_state(&state, &live);
    let config = repo.path("torvault.toml");
    std::fs::write(&config, "api_version = \"2.9.0\"\n").unwrap();

    let plan = repo.run_json(&[
        "restore",
        "plan",
        "--run",
        run_id.as_str(),
        "--state",
        state.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ]);
    let change = &plan["plan"]["torrents"]["update"][0]["changes"][0];
    assert_eq!(change["field"], "save_path");
    assert_eq!(change["supported"], true);
}
