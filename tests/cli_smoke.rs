use std::path::PathBuf;

use mkflag::DesignMetrics;

fn exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_mkflag")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "mkflag.exe"
            } else {
                "mkflag"
            });
            p
        })
}

fn system_font_available() -> bool {
    mkflag::load_font(&DesignMetrics::default().font_family, None).is_ok()
}

#[test]
fn version_flag_exits_zero() {
    let status = std::process::Command::new(exe())
        .arg("--version")
        .stdout(std::process::Stdio::null())
        .status()
        .unwrap();
    assert!(status.success());
}

#[test]
fn missing_required_arguments_fail() {
    let output = std::process::Command::new(exe()).output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--text"), "usage must name the missing flag");
}

#[test]
fn malformed_colors_fail() {
    let status = std::process::Command::new(exe())
        .args(["-t", "OK", "-c", "red,green,blue", "-f", "x", "-s", "1.0"])
        .stderr(std::process::Stdio::null())
        .status()
        .unwrap();
    assert!(!status.success());
}

#[test]
fn cli_renders_the_badge_set() {
    if !system_font_available() {
        return;
    }
    let dir = PathBuf::from("target").join("cli_smoke");
    std::fs::create_dir_all(&dir).unwrap();
    let prefix = dir.join("flag");
    let _ = std::fs::remove_file(dir.join("flag_none_2.0.png"));

    let status = std::process::Command::new(exe())
        .args([
            "-t",
            "OK",
            "-c",
            "FFFFFFFF,FF0000FF,FF000000",
            "-f",
            prefix.to_str().unwrap(),
            "-s",
            "2.0",
        ])
        .status()
        .unwrap();

    assert!(status.success());
    for tag in ["none", "lt", "tc", "rc", "bl"] {
        assert!(dir.join(format!("flag_{tag}_2.0.png")).exists(), "tag {tag}");
    }
}

#[test]
fn dump_layout_emits_one_entry_per_style() {
    if !system_font_available() {
        return;
    }
    let output = std::process::Command::new(exe())
        .args([
            "-t",
            "OK",
            "-c",
            "FFFFFFFF,FF0000FF,FF000000",
            "-f",
            "flag",
            "-s",
            "1.0",
            "--dump-layout",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 13);
    assert_eq!(entries[0]["style"], "none");
    assert_eq!(entries[0]["file"], "flag_none_1.0.png");
    assert!(entries[5]["export_rect"]["height"].as_u64().unwrap() > 0);
}
