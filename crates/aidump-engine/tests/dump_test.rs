use aidump_config::Config;
use aidump_core::parse_dump;
use aidump_engine::{apply, restore, Dumper, WriteMode, WriteStatus};
use aidump_sources::{Candidate, CandidateSource, RepoSource};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: impl AsRef<[u8]>) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn project() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    write(root, "src/main.rs", "fn main() {\n    let key = \"abc123\";\n}\n");
    write(root, "src/lib.rs", "pub fn lib() {}\n");
    write(root, "README.md", "# Demo\n");
    write(root, ".env", "API_KEY=abc123\nEMPTY=\n");
    write(root, ".gitignore", "target/\nlogs/\n");
    write(root, "target/out.txt", "build output\n");
    write(root, "logs/keep/app.log", "log line\n");
    write(root, "vendor/readme.txt", "vendor docs\n");
    write(root, "vendor/libs/a.js", "export const a = 1;\n");
    write(root, "assets/logo.png", [0x89, b'P', b'N', b'G', 0x00, 0x01]);
    write(root, ".aidump.toml", "hide_env = true\n");
    dir
}

fn config(blacklist: &[&str], whitelist: &[&str]) -> Config {
    Config {
        blacklisted_paths: blacklist.iter().map(|s| s.to_string()).collect(),
        whitelisted_paths: whitelist.iter().map(|s| s.to_string()).collect(),
        ..Config::default()
    }
}

#[test]
fn test_repo_dump_selection() {
    let dir = project();
    let dumper = Dumper::new(dir.path(), config(&["vendor/", ".env"], &["vendor/libs/"])).unwrap();

    let report = dumper.run(&RepoSource::new(dir.path()), &[]).unwrap();

    assert_eq!(report.kind, "repo-dump");
    assert_eq!(
        report.files,
        vec!["README.md", "src/lib.rs", "src/main.rs", "vendor/libs/a.js"]
    );
    // .env, .gitignore, vendor/readme.txt
    assert_eq!(report.excluded_by_rule, 3);
}

#[test]
fn test_env_values_are_masked() {
    let dir = project();
    let dumper = Dumper::new(dir.path(), config(&[".env"], &[])).unwrap();

    let report = dumper.run(&RepoSource::new(dir.path()), &[]).unwrap();

    assert!(!report.text.contains("abc123"));
    assert!(report.text.contains("let key = \"[HIDDEN_ENV_VALUE]\";"));
    assert_eq!(report.redactions, 1);
}

#[test]
fn test_hide_env_disabled_keeps_values() {
    let dir = project();
    let config = Config {
        hide_env: false,
        ..config(&[".env"], &[])
    };
    let dumper = Dumper::new(dir.path(), config).unwrap();

    let report = dumper.run(&RepoSource::new(dir.path()), &[]).unwrap();

    assert!(report.text.contains("abc123"));
    assert_eq!(report.redactions, 0);
}

#[test]
fn test_whitelist_brings_back_gitignored_files() {
    let dir = project();
    let dumper = Dumper::new(dir.path(), config(&[], &["logs/keep/"])).unwrap();

    let report = dumper.run(&RepoSource::new(dir.path()), &[]).unwrap();

    assert!(report.files.contains(&"logs/keep/app.log".to_string()));
    assert!(!report.files.contains(&"target/out.txt".to_string()));
}

#[test]
fn test_config_and_binary_files_are_never_dumped() {
    let dir = project();
    let dumper = Dumper::new(dir.path(), Config::default()).unwrap();

    let report = dumper.run(&RepoSource::new(dir.path()), &[]).unwrap();

    assert!(!report.files.contains(&".aidump.toml".to_string()));
    assert!(!report.files.contains(&"assets/logo.png".to_string()));
    assert!(!report.files.contains(&".gitignore".to_string()));
}

#[test]
fn test_scope_paths_limit_the_dump() {
    let dir = project();
    let dumper = Dumper::new(dir.path(), Config::default()).unwrap();

    let report = dumper
        .run(&RepoSource::new(dir.path()), &["./src/".to_string()])
        .unwrap();

    assert_eq!(report.files, vec!["src/lib.rs", "src/main.rs"]);
}

#[test]
fn test_dump_format() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.py", "print('a')");
    write(dir.path(), "b.unknown", "b");
    let dumper = Dumper::new(dir.path(), Config::default()).unwrap();

    let report = dumper.run(&RepoSource::new(dir.path()), &[]).unwrap();

    assert_eq!(
        report.text,
        "---\nFile: a.py\n---\n```python\nprint('a')\n```\n\n---\nFile: b.unknown\n---\n```\nb\n```"
    );
    assert_eq!(report.line_count, 13);
}

#[test]
fn test_empty_dump() {
    let dir = tempfile::tempdir().unwrap();
    let dumper = Dumper::new(dir.path(), Config::default()).unwrap();

    let report = dumper.run(&RepoSource::new(dir.path()), &[]).unwrap();

    assert!(report.is_empty());
    assert_eq!(report.text, "");
    assert_eq!(report.line_count, 0);
}

struct FixedSource(Vec<Candidate>);

impl CandidateSource for FixedSource {
    fn name(&self) -> &'static str {
        "git-staged"
    }

    fn candidates(&self) -> aidump_core::Result<Vec<Candidate>> {
        Ok(self.0.clone())
    }
}

#[test]
fn test_custom_source_goes_through_rules() {
    let dir = project();
    let dumper = Dumper::new(dir.path(), config(&["*.md"], &[])).unwrap();
    let source = FixedSource(vec![
        Candidate::new("src/lib.rs", false),
        Candidate::new("README.md", false),
    ]);

    let report = dumper.run(&source, &[]).unwrap();

    assert_eq!(report.kind, "git-staged");
    assert_eq!(report.files, vec!["src/lib.rs"]);
    assert_eq!(report.excluded_by_rule, 1);
}

#[test]
fn test_report_serializes_without_text() {
    let dir = project();
    let dumper = Dumper::new(dir.path(), Config::default()).unwrap();
    let report = dumper.run(&RepoSource::new(dir.path()), &["README.md".to_string()]).unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["files"], serde_json::json!(["README.md"]));
    assert!(json.get("text").is_none());
}

#[test]
fn test_restore_round_trip() {
    let source = project();
    let dumper = Dumper::new(source.path(), config(&[".env"], &[])).unwrap();
    let report = dumper.run(&RepoSource::new(source.path()), &["src".to_string()]).unwrap();

    let target = tempfile::tempdir().unwrap();
    let outcomes = restore(target.path(), &report.text, WriteMode::Write);

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o.status == WriteStatus::Created));
    assert_eq!(
        fs::read_to_string(target.path().join("src/lib.rs")).unwrap(),
        "pub fn lib() {}\n"
    );
    assert_eq!(
        parse_dump(&report.text)[1].content,
        fs::read_to_string(target.path().join("src/main.rs")).unwrap()
    );
}

#[test]
fn test_apply_writes_whole_files() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "src/app.py", "old\n");

    let response = "Here you go.\n\nUpdate `src/app.py` with this:\n\n```python\nprint('new')\n```\n\nAnd a new file **docs/notes.md**\n\n```markdown\n# Notes\n```\n";
    let outcomes = apply(dir.path(), response, WriteMode::Write);

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].status, WriteStatus::Updated);
    assert_eq!(outcomes[1].status, WriteStatus::Created);
    assert_eq!(
        fs::read_to_string(dir.path().join("src/app.py")).unwrap(),
        "print('new')\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("docs/notes.md")).unwrap(),
        "# Notes\n"
    );
}

#[test]
fn test_apply_dry_run_leaves_disk_alone() {
    let dir = tempfile::tempdir().unwrap();
    let response = "new.txt\n\n```\nhello\n```";

    let outcomes = apply(dir.path(), response, WriteMode::DryRun);

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].path, "new.txt");
    assert_eq!(outcomes[0].status, WriteStatus::Created);
    assert!(!dir.path().join("new.txt").exists());
}

#[test]
fn test_restore_rejects_paths_outside_root() {
    let dir = tempfile::tempdir().unwrap();
    let dump = "---\nFile: ../escape.txt\n---\n```\nx\n```\n\n---\nFile: ok.txt\n---\n```\ny\n```";

    let outcomes = restore(dir.path(), dump, WriteMode::Write);

    assert_eq!(outcomes.len(), 2);
    assert!(matches!(outcomes[0].status, WriteStatus::Rejected(_)));
    assert!(outcomes[1].is_ok());
    assert!(!dir.path().parent().unwrap().join("escape.txt").exists());
}

#[test]
fn test_no_scope_dumps_whole_project() {
    let dir = project();
    let dumper = Dumper::new(dir.path(), config(&[".env"], &[])).unwrap();
    let source = RepoSource::new(dir.path());

    let unscoped = dumper.run(&source, &[]).unwrap();
    let root_scoped = dumper.run(&source, &[".".to_string()]).unwrap();

    assert_eq!(unscoped.files, root_scoped.files);
    assert!(unscoped.files.contains(&"README.md".to_string()));
    assert!(unscoped.files.contains(&"src/main.rs".to_string()));
}

#[cfg(unix)]
#[test]
fn test_apply_refuses_dangling_symlink_out_of_root() {
    let outside = tempfile::tempdir().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let victim = outside.path().join("victim.txt");
    std::os::unix::fs::symlink(&victim, dir.path().join("out.txt")).unwrap();

    let outcomes = apply(dir.path(), "out.txt\n```\npwned\n```", WriteMode::Write);

    assert_eq!(outcomes.len(), 1);
    assert!(matches!(outcomes[0].status, WriteStatus::Rejected(_)));
    assert!(!victim.exists());
}
