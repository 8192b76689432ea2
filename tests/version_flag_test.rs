use std::process::Command;

#[test]
fn test_version_flag() {
    let output = Command::new(env!("CARGO_BIN_EXE_chairside"))
        .arg("--version")
        .output()
        .expect("Failed to execute binary");

    assert!(output.status.success(), "Version flag should exit with code 0");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let version = stdout.trim().strip_prefix("chairside ").unwrap_or("");
    assert_eq!(version, env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_help_flag_lists_chat_types() {
    let output = Command::new(env!("CARGO_BIN_EXE_chairside"))
        .arg("--help")
        .output()
        .expect("Failed to execute binary");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for chat_type in ["help", "aidentist", "receptionist", "triage", "documentation-summarize"] {
        assert!(stdout.contains(chat_type), "missing {}", chat_type);
    }
}

#[test]
fn test_unknown_chat_type_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_chairside"))
        .args(["billing", "hello"])
        .output()
        .expect("Failed to execute binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown chat type"));
}
