mod common;

use std::{path::PathBuf, process::Command};

fn exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_cubereel")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "cubereel.exe"
            } else {
                "cubereel"
            });
            p
        })
}

#[test]
fn cli_pieces_json_lists_catalog() {
    let _guard = common::exec_lock();
    let out = Command::new(exe()).args(["pieces", "--json"]).output().unwrap();
    assert!(out.status.success());

    let pieces: Vec<cubereel::puzzle::Piece> = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(pieces, cubereel::puzzle::catalog());
}

#[test]
fn cli_frames_prints_encode_order() {
    let _guard = common::exec_lock();
    let dir = tempfile::tempdir().unwrap();
    for name in ["puzzle_state10.png", "puzzle_state9.png", "puzzle_state08.png"] {
        std::fs::write(dir.path().join(name), b"").unwrap();
    }

    let out = Command::new(exe())
        .arg("frames")
        .arg("--workdir")
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(out.status.success());

    let stdout = String::from_utf8(out.stdout).unwrap();
    let indices: Vec<&str> = stdout
        .lines()
        .map(|l| l.split('\t').next().unwrap())
        .collect();
    assert_eq!(indices, vec!["8", "9", "10"]);
}

#[test]
fn cli_encode_without_frames_exits_non_zero() {
    let _guard = common::exec_lock();
    let dir = tempfile::tempdir().unwrap();
    let out = Command::new(exe())
        .arg("encode")
        .arg("--workdir")
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("puzzle_state*.png"));
    assert!(!dir.path().join("mount_puzzle.mp4").exists());
}

#[test]
fn cli_rejects_zero_fps() {
    let _guard = common::exec_lock();
    let dir = tempfile::tempdir().unwrap();
    let status = Command::new(exe())
        .arg("encode")
        .arg("--workdir")
        .arg(dir.path())
        .args(["--fps", "0"])
        .status()
        .unwrap();
    assert!(!status.success());
}

#[cfg(unix)]
#[test]
fn cli_run_with_stub_tools_writes_both_videos() {
    let _guard = common::exec_lock();
    let tools = common::stub_tools(true, None);
    let work = common::workdir_with_script();

    let config = tools.root().join("cubereel.json");
    std::fs::write(
        &config,
        serde_json::json!({
            "render": { "blender": tools.blender },
            "encode": { "ffmpeg": tools.ffmpeg },
        })
        .to_string(),
    )
    .unwrap();

    let status = Command::new(exe())
        .arg("--config")
        .arg(&config)
        .arg("--workdir")
        .arg(work.path())
        .status()
        .unwrap();

    assert!(status.success());
    assert!(work.path().join("mount_puzzle.mp4").metadata().unwrap().len() > 0);
    assert!(work.path().join("dismount_puzzle.mp4").metadata().unwrap().len() > 0);
}

#[cfg(unix)]
#[test]
fn cli_render_passes_through_renderer_exit_code() {
    let _guard = common::exec_lock();
    let tools = common::stub_tools(false, None);
    common::write_script(&tools.blender, "exit 7\n");
    let work = common::workdir_with_script();

    let out = Command::new(exe())
        .arg("render")
        .arg("--blender")
        .arg(&tools.blender)
        .arg("--workdir")
        .arg(work.path())
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(7));
    assert!(String::from_utf8_lossy(&out.stderr).contains("exited with"));
}

#[test]
fn cli_failure_without_subprocess_exits_one() {
    let _guard = common::exec_lock();
    let dir = tempfile::tempdir().unwrap();
    let status = Command::new(exe())
        .arg("encode")
        .arg("--workdir")
        .arg(dir.path())
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(1));
}
