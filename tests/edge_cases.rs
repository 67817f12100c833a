//! Edge case and error handling tests for pystruct

mod harness;

use assert_cmd::Command;
use harness::{TestTree, run_pystruct};
use predicates::prelude::*;
use std::fs;
use std::os::unix::fs::{PermissionsExt, symlink};

fn pystruct(tree: &TestTree) -> Command {
    let mut cmd = Command::cargo_bin("pystruct").expect("binary should build");
    cmd.current_dir(tree.path())
        .env_remove("OPENAI_API_KEY")
        .env_remove("OPENAI_BASE_URL")
        .env_remove("RUST_LOG")
        .args(["--color", "never"]);
    cmd
}

// ============================================================================
// Root Errors
// ============================================================================

#[test]
fn test_missing_root_is_fatal() {
    let tree = TestTree::new();

    pystruct(&tree)
        .arg("does-not-exist")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::starts_with("pystruct: cannot access 'does-not-exist'"));
}

#[test]
fn test_file_root_is_fatal() {
    let tree = TestTree::new();
    tree.add_file("script.py", "def f(): pass\n");

    pystruct(&tree)
        .arg("script.py")
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("cannot access 'script.py'"));
}

#[test]
fn test_empty_root() {
    let tree = TestTree::new();
    pystruct(&tree).assert().success().stdout("");
}

#[test]
fn test_root_named_like_ignored_folder() {
    let tree = TestTree::new();
    tree.add_file("skip/inner.py", "def inner(): pass\n");

    // Only paths below the root are matched against ignored names.
    pystruct(&tree)
        .args(["skip", "-I", "skip"])
        .assert()
        .success()
        .stdout("inner.py\n    Function: inner()\n");
}

// ============================================================================
// Parse Errors
// ============================================================================

#[test]
fn test_syntax_error_keeps_file_line() {
    let tree = TestTree::new();
    tree.add_file("broken.py", "def broken(:\n    pass\n");
    tree.add_file("fine.py", "def fine(): pass\n");

    pystruct(&tree)
        .assert()
        .success()
        .stdout("broken.py\nfine.py\n    Function: fine()\n")
        .stderr(predicate::str::contains("broken.py"));
}

#[test]
fn test_quiet_hides_warnings() {
    let tree = TestTree::new();
    tree.add_file("broken.py", "class Broken(\n");

    pystruct(&tree)
        .arg("-q")
        .assert()
        .success()
        .stdout("broken.py\n")
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_missing_colon_is_parse_error() {
    let tree = TestTree::new();
    tree.add_file("legacy.py", "class Old\n    def run(self):\n        pass\n");

    let (stdout, stderr, success) = run_pystruct(tree.path(), &["--color", "never"]);
    assert!(success);
    assert_eq!(stdout, "legacy.py\n");
    assert!(stderr.contains("legacy.py"), "parse error should be reported: {}", stderr);
}

#[test]
fn test_indentation_errors_are_parse_errors() {
    let tree = TestTree::new();
    tree.add_file("no_block.py", "def f():\npass\n");
    tree.add_file("stray_indent.py", "class C:\n  x = 1\n    def m(self): pass\n");
    tree.add_file("py2.py", "print \"hello\"\n\ndef f():\n    pass\n");

    let (stdout, stderr, success) = run_pystruct(tree.path(), &["--color", "never"]);
    assert!(success);
    assert_eq!(stdout, "no_block.py\npy2.py\nstray_indent.py\n");
    for name in ["no_block.py", "stray_indent.py", "py2.py"] {
        assert!(stderr.contains(name), "{} should be reported: {}", name, stderr);
    }
}

#[test]
fn test_deeply_nested_error_does_not_abort() {
    let tree = TestTree::new();
    let depth = 30_000;
    tree.add_file(
        "deep.py",
        &format!("x = {}1 2{}\n\ndef f():\n    pass\n", "[".repeat(depth), "]".repeat(depth)),
    );
    tree.add_file("fine.py", "def ok(): pass\n");

    pystruct(&tree)
        .assert()
        .success()
        .stdout("deep.py\nfine.py\n    Function: ok()\n")
        .stderr(predicate::str::contains("deep.py"));
}

#[test]
fn test_binary_file_with_py_extension() {
    let tree = TestTree::new();
    let path = tree.path().join("blob.py");
    fs::write(&path, [0u8, 159, 146, 150, 255, 0]).expect("Failed to write binary");

    let (stdout, stderr, success) = run_pystruct(tree.path(), &["--color", "never"]);
    assert!(success, "binary source should not abort the walk");
    assert_eq!(stdout, "blob.py\n");
    assert!(stderr.contains("blob.py"));
}

#[test]
fn test_max_file_size() {
    let tree = TestTree::new();
    tree.add_file("big.py", &"def f(): pass\n".repeat(200));
    tree.add_file("small.py", "def s(): pass\n");

    pystruct(&tree)
        .args(["--max-file-size", "1K"])
        .assert()
        .success()
        .stdout("big.py\nsmall.py\n    Function: s()\n")
        .stderr(predicate::str::contains("big.py"));
}

#[test]
fn test_invalid_max_file_size() {
    let tree = TestTree::new();
    pystruct(&tree)
        .args(["--max-file-size", "lots"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid --max-file-size 'lots'"));
}

// ============================================================================
// Annotation
// ============================================================================

#[test]
fn test_explain_without_api_key_is_fatal() {
    let tree = TestTree::new();
    tree.add_file("mod.py", "def f(): pass\n");

    pystruct(&tree)
        .arg("--explain")
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("API key"));
}

#[test]
fn test_explain_with_unreachable_server_uses_placeholder() {
    let tree = TestTree::new();
    tree.add_file("mod.py", "def f(): pass\n\nclass C:\n    pass\n");

    pystruct(&tree)
        .args([
            "--explain",
            "--api-key",
            "sk-test",
            "--api-base",
            "http://127.0.0.1:9/v1",
            "--timeout",
            "2",
        ])
        .assert()
        .success()
        .stdout(
            "mod.py\n    Function: f() - (explanation unavailable)\n    Class: C - (explanation unavailable)\n",
        )
        .stderr(predicate::str::contains("annotation"));
}

#[test]
fn test_api_key_from_dotenv_file() {
    let tree = TestTree::new();
    tree.add_file("mod.py", "def f(): pass\n");
    tree.add_file(
        ".env",
        "OPENAI_API_KEY=sk-from-dotenv\nOPENAI_BASE_URL=http://127.0.0.1:9/v1\n",
    );

    pystruct(&tree)
        .args(["--explain", "--timeout", "2"])
        .assert()
        .success()
        .stdout("mod.py\n    Function: f() - (explanation unavailable)\n")
        .stderr(predicate::str::contains("API key").not());
}

// ============================================================================
// Symlink Edge Cases
// ============================================================================

#[test]
fn test_symlink_to_file() {
    let tree = TestTree::new();
    tree.add_file("target.py", "def target(): pass\n");
    symlink(tree.path().join("target.py"), tree.path().join("link.py"))
        .expect("Failed to create symlink");

    let (stdout, _stderr, success) = run_pystruct(tree.path(), &["--color", "never"]);
    assert!(success);
    assert_eq!(
        stdout,
        "link.py\n    Function: target()\ntarget.py\n    Function: target()\n"
    );
}

#[test]
fn test_symlink_to_parent_no_infinite_loop() {
    let tree = TestTree::new();
    tree.add_file("subdir/file.py", "def file(): pass\n");
    symlink("..", tree.path().join("subdir").join("parent"))
        .expect("Failed to create parent symlink");

    let (stdout, _stderr, success) = run_pystruct(tree.path(), &["--color", "never"]);
    assert!(success, "pystruct should not hang on parent symlink");
    assert_eq!(stdout, "subdir/\n    file.py\n        Function: file()\n    parent/\n");
}

#[test]
fn test_broken_symlink() {
    let tree = TestTree::new();
    tree.add_file("real.py", "");
    symlink(tree.path().join("missing.py"), tree.path().join("dangling.py"))
        .expect("Failed to create symlink");

    let (stdout, _stderr, success) = run_pystruct(tree.path(), &["--color", "never"]);
    assert!(success, "broken symlink should not abort the walk");
    assert_eq!(stdout, "real.py\n");
}

// ============================================================================
// Permission Error Handling
// ============================================================================

#[test]
#[cfg(unix)]
fn test_unreadable_directory() {
    let tree = TestTree::new();
    tree.add_file("readable/file.py", "def readable(): pass\n");

    let unreadable = tree.path().join("unreadable");
    fs::create_dir(&unreadable).expect("Failed to create dir");
    fs::write(unreadable.join("hidden.py"), "def hidden(): pass\n").expect("Failed to write file");

    let mut perms = fs::metadata(&unreadable).unwrap().permissions();
    perms.set_mode(0o000);
    fs::set_permissions(&unreadable, perms).expect("Failed to set permissions");

    let (stdout, _stderr, success) = run_pystruct(tree.path(), &["--color", "never"]);

    // Restore permissions for cleanup
    let mut perms = fs::metadata(&unreadable).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&unreadable, perms).expect("Failed to restore permissions");

    assert!(success, "pystruct should handle unreadable directories gracefully");
    assert!(stdout.contains("readable/"));
    assert!(stdout.contains("Function: readable()"));
    assert!(stdout.contains("unreadable/"));
}

// ============================================================================
// Special Filenames
// ============================================================================

#[test]
fn test_filename_with_spaces() {
    let tree = TestTree::new();
    tree.add_file("my module.py", "def spaced(): pass\n");

    let (stdout, _stderr, success) = run_pystruct(tree.path(), &["--color", "never"]);
    assert!(success);
    assert_eq!(stdout, "my module.py\n    Function: spaced()\n");
}

#[test]
fn test_filename_with_unicode() {
    let tree = TestTree::new();
    tree.add_file("データ/処理.py", "def 処理(): pass\n");

    let (stdout, _stderr, success) = run_pystruct(tree.path(), &["--color", "never"]);
    assert!(success);
    assert_eq!(stdout, "データ/\n    処理.py\n        Function: 処理()\n");
}

#[test]
fn test_uppercase_extension_is_not_source() {
    let tree = TestTree::new();
    tree.add_file("LEGACY.PY", "def shout(): pass\n");
    tree.add_file("stub.pyi", "def typed() -> int: ...\n");

    let (stdout, _stderr, success) = run_pystruct(tree.path(), &["--color", "never"]);
    assert!(success);
    assert_eq!(stdout, "");

    let (stdout, _stderr, success) = run_pystruct(tree.path(), &["-a", "--color", "never"]);
    assert!(success);
    assert_eq!(stdout, "LEGACY.PY\nstub.pyi\n");
}

// ============================================================================
// Source Edge Cases
// ============================================================================

#[test]
fn test_empty_and_whitespace_files() {
    let tree = TestTree::new();
    tree.add_file("empty.py", "");
    tree.add_file("spaces.py", "   \n\n\t\n");

    let (stdout, _stderr, success) = run_pystruct(tree.path(), &["--color", "never"]);
    assert!(success);
    assert_eq!(stdout, "empty.py\nspaces.py\n");
}

#[test]
fn test_bom_and_crlf() {
    let tree = TestTree::new();
    tree.add_file("win.py", "\u{feff}def first():\r\n    pass\r\n\r\nclass Second:\r\n    pass\r\n");

    let (stdout, _stderr, success) = run_pystruct(tree.path(), &["--color", "never"]);
    assert!(success);
    assert_eq!(stdout, "win.py\n    Function: first()\n    Class: Second\n");
}

#[test]
fn test_very_deep_nesting() {
    let tree = TestTree::new();
    let dirs: Vec<String> = (0..20).map(|i| format!("d{i}")).collect();
    tree.add_file(&format!("{}/leaf.py", dirs.join("/")), "def leaf(): pass\n");

    let (stdout, _stderr, success) = run_pystruct(tree.path(), &["--color", "never"]);
    assert!(success);
    let last = stdout.lines().last().unwrap();
    assert_eq!(last, format!("{}Function: leaf()", " ".repeat(4 * 21)));
}

#[test]
fn test_many_files_in_directory() {
    let tree = TestTree::new();
    for i in 0..200 {
        tree.add_file(&format!("mods/m{:03}.py", i), &format!("def f{i}(): pass\n"));
    }

    let (stdout, _stderr, success) = run_pystruct(tree.path(), &["--color", "never"]);
    assert!(success);
    assert_eq!(stdout.lines().count(), 1 + 200 * 2);
    assert!(stdout.contains("    m000.py\n        Function: f0()\n    m001.py\n"));
}
