//! End-to-end checks of the `pixelbench` command line.

use image::{Rgb, RgbImage};
use pixelbench_core::benchmark::parse_elapsed;
use std::path::Path;
use std::process::{Command, Output};

fn pixelbench(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pixelbench"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

/// Lay out `input/` with `images` samples and a config pointing at it.
fn workspace(images: usize) -> (tempfile::TempDir, std::path::PathBuf) {
    let root = tempfile::tempdir().unwrap();
    let input = root.path().join("input");
    std::fs::create_dir(&input).unwrap();
    for i in 0..images {
        RgbImage::from_fn(16, 16, |x, y| Rgb([(x * 16) as u8, (y * 16) as u8, i as u8]))
            .save(input.join(format!("photo_{i}.jpg")))
            .unwrap();
    }

    let config = root.path().join("config.toml");
    let toml = format!(
        "[paths]\n\
         input_dir = {:?}\n\
         process_output_dir = {:?}\n\
         thread_output_dir = {:?}\n\
         \n\
         [benchmark]\n\
         worker_counts = [1, 2]\n",
        input,
        root.path().join("out_process"),
        root.path().join("out_thread"),
    );
    std::fs::write(&config, toml).unwrap();
    (root, config)
}

#[test]
fn run_prints_summary_lines() {
    let (root, config) = workspace(3);

    for model in ["thread", "process"] {
        let output = pixelbench(&config, &["run", "--model", model, "--workers", "2"]);
        assert!(output.status.success(), "{model}: {output:?}");

        let stdout = String::from_utf8(output.stdout).unwrap();
        assert!(stdout.contains("Processing complete."));
        assert!(stdout.contains("Images processed successfully: 3/3"));
        assert!(parse_elapsed(&stdout).is_some(), "no timing in: {stdout}");
    }

    assert!(root.path().join("out_thread/photo_0.jpg").exists());
    assert!(root.path().join("out_process/photo_2.jpg").exists());
}

#[test]
fn run_clears_stale_output_but_keeps_placeholder() {
    let (root, config) = workspace(1);
    let out = root.path().join("out_thread");
    std::fs::create_dir(&out).unwrap();
    std::fs::write(out.join("stale.jpg"), b"old").unwrap();
    std::fs::write(out.join(".gitkeep"), b"").unwrap();

    let output = pixelbench(&config, &["run", "--model", "thread"]);
    assert!(output.status.success());
    assert!(!out.join("stale.jpg").exists());
    assert!(out.join(".gitkeep").exists());
    assert!(out.join("photo_0.jpg").exists());
}

#[test]
fn run_with_missing_input_dir_fails() {
    let (root, config) = workspace(0);
    let missing = root.path().join("nowhere");

    let output = pixelbench(
        &config,
        &["run", "--model", "thread", "--input", missing.to_str().unwrap()],
    );
    assert!(!output.status.success());
    assert!(!String::from_utf8_lossy(&output.stdout).contains("Time taken"));
}

#[test]
fn run_with_empty_input_dir_fails() {
    let (_root, config) = workspace(0);
    let output = pixelbench(&config, &["run", "--model", "process"]);
    assert!(!output.status.success());
}

#[test]
fn corrupt_image_does_not_change_exit_status() {
    let (root, config) = workspace(2);
    std::fs::write(root.path().join("input/zz.png"), b"garbage").unwrap();

    let output = pixelbench(&config, &["run", "--model", "thread"]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Images processed successfully: 2/3"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("1 of 3 images failed"), "{stderr}");
}

#[test]
fn bench_prints_one_table_per_model() {
    let (_root, config) = workspace(2);

    let output = pixelbench(&config, &["bench", "--in-process"]);
    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Dataset Size: 2 images"));
    assert!(stdout.contains("Testing worker counts: [1, 2]"));
    assert!(stdout.contains("--- Benchmarking Multiprocessing (process) ---"));
    assert!(stdout.contains("--- Benchmarking Threading (thread) ---"));
    assert_eq!(stdout.matches("Workers    | Time (s)").count(), 2);
    assert!(stdout
        .lines()
        .any(|l| l.starts_with("1          | ") && l.contains("| 1.00       | 1.00")));
}

#[test]
fn bench_spawning_runs_reports_timings() {
    let (_root, config) = workspace(1);

    let output = pixelbench(
        &config,
        &["bench", "--models", "thread", "--workers-list", "1"],
    );
    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8(output.stdout).unwrap();
    let row = stdout
        .lines()
        .find(|l| l.starts_with("1          | "))
        .unwrap();
    assert!(!row.contains("Failed"), "{row}");
}

#[test]
fn config_path_reports_override() {
    let (_root, config) = workspace(0);
    let output = pixelbench(&config, &["config", "path"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap().trim(),
        config.display().to_string()
    );
}

#[test]
fn config_show_names_the_loaded_file() {
    let (_root, config) = workspace(0);
    let output = pixelbench(&config, &["config", "show"]);
    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(
        stdout.lines().next().unwrap(),
        format!("# Source: {}", config.display())
    );
    assert!(stdout.contains("worker_counts = ["), "{stdout}");
    let reloaded: toml::Value = toml::from_str(&stdout).unwrap();
    assert!(reloaded.get("paths").is_some());
}
