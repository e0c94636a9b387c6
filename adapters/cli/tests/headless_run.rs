use std::{
    fs,
    process::Command,
    time::{SystemTime, UNIX_EPOCH},
};

fn scratch_dir(name: &str) -> std::path::PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();
    let dir = std::env::temp_dir().join(format!("waveguard-cli-{name}-{nanos}"));
    fs::create_dir_all(&dir).expect("scratch dir created");
    dir
}

#[test]
fn short_headless_match_prints_banner_and_hud() {
    let output = Command::new(env!("CARGO_BIN_EXE_waveguard"))
        .args(["--map", "canyon", "--difficulty", "easy", "--seconds", "12"])
        .output()
        .expect("failed to launch the waveguard binary");

    assert!(output.status.success(), "headless run should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Welcome to Waveguard."));
    assert!(stdout.contains("wave 1"));
}

#[test]
fn layout_and_account_files_are_honoured() {
    let dir = scratch_dir("files");
    let layout = dir.join("layout.toml");
    let account = dir.join("account.json");
    fs::write(
        &layout,
        "[[towers]]\nkind = \"basic\"\nx = 100.0\ny = 260.0\nupgrades = 1\n",
    )
    .expect("layout written");

    let status = Command::new(env!("CARGO_BIN_EXE_waveguard"))
        .args(["--seconds", "3", "--fast", "--token", "tester"])
        .arg("--layout")
        .arg(&layout)
        .arg("--account")
        .arg(&account)
        .status()
        .expect("failed to launch the waveguard binary");
    assert!(status.success());

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&account).expect("account file written"))
            .expect("account file is json");
    let money = saved["tester"]["money"].as_u64().expect("money recorded");
    assert!(money < 100, "placement and upgrade spend money before the first wave reward");

    fs::remove_dir_all(&dir).expect("scratch dir removed");
}

#[test]
fn malformed_lobby_message_fails_cleanly() {
    let output = Command::new(env!("CARGO_BIN_EXE_waveguard"))
        .args(["--lobby-message", "{\"type\":\"chat\",\"from\":\"a\",\"text\":\"b\"}"])
        .output()
        .expect("failed to launch the waveguard binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does not start a game"));
}
