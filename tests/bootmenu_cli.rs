use std::process::Command;

fn combined_output(output: &std::process::Output) -> String {
    let mut combined = String::new();
    combined.push_str(&String::from_utf8_lossy(&output.stdout));
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    combined
}

fn bootmenu_bin() -> &'static str {
    option_env!("CARGO_BIN_EXE_bootmenu").expect("bootmenu test binary not built")
}

#[test]
fn bootmenu_help_mentions_name() {
    let output = Command::new(bootmenu_bin())
        .arg("--help")
        .output()
        .expect("run bootmenu --help");
    assert!(output.status.success());
    let combined = combined_output(&output);
    assert!(combined.contains("Bootmenu"));
    assert!(combined.contains("--input"));
}

#[test]
fn bootmenu_version_matches_package() {
    let output = Command::new(bootmenu_bin())
        .arg("--version")
        .output()
        .expect("run bootmenu --version");
    assert!(output.status.success());
    assert!(combined_output(&output).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn bootmenu_rejects_out_of_range_width_before_touching_the_terminal() {
    let output = Command::new(bootmenu_bin())
        .args(["--width", "1"])
        .env_remove("BOOTMENU_LOGS")
        .output()
        .expect("run bootmenu --width 1");
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("--width must be between"));
}

#[test]
fn bootmenu_rejects_slow_rate_above_fast_rate() {
    let output = Command::new(bootmenu_bin())
        .args(["--fast-fps", "30", "--slow-fps", "45"])
        .output()
        .expect("run bootmenu with bad rates");
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("--slow-fps"));
}
