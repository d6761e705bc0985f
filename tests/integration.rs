use std::{env, fs, path::PathBuf, process::Command};

#[test]
fn basic_workflow() {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("basic_workflow");

    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir(&test_dir).expect("failed to create test directory");

    let config_path = test_dir.join("config.toml");
    let config_contents = String::new()
        + "[agent]\n"
        + "max_velocity = 4.0\n"
        + "max_steering_angle = 3.141592653589793\n"
        + "impulse = 0.5\n"
        + "body_length = 30.0\n"
        + "ray_angles = [ -0.7853981633974483, 0.7853981633974483,]\n"
        + "\n"
        + "[population]\n"
        + "n_agents = 20\n"
        + "ttl = 120\n"
        + "mutation_rate = 0.1\n"
        + "crossover = \"uniform\"\n"
        + "\n"
        + "[track]\n"
        + "layout = \"circular\"\n"
        + "width = 800.0\n"
        + "height = 800.0\n"
        + "n_segments = 5\n"
        + "\n"
        + "[output]\n"
        + "generations = 4\n"
        + "seed = 2024\n"
        + "save_frames = true\n";

    fs::write(&config_path, config_contents).expect("failed to write config file");

    fn run_bin(args: &[&str]) {
        let bin = PathBuf::from(env!("CARGO_BIN_EXE_evodrive"));

        let output = Command::new(bin)
            .args(args)
            .output()
            .expect("failed to execute command");

        let stdout_str =
            std::str::from_utf8(&output.stdout).expect("failed to convert stdout to string");
        let stderr_str =
            std::str::from_utf8(&output.stderr).expect("failed to convert stderr to string");

        assert!(
            output.status.success(),
            "failed to run binary with {args:?}\nstdout:\n{stdout_str}\nstderr:\n{stderr_str}\n"
        );
    }

    let test_dir_str = test_dir
        .to_str()
        .expect("failed to convert test directory to string");

    run_bin(&["--sim-dir", test_dir_str, "create"]);
    run_bin(&["--sim-dir", test_dir_str, "create"]);

    for run in ["run-0000", "run-0001"] {
        assert!(test_dir.join(run).join("history.msgpack").is_file());
        assert!(test_dir.join(run).join("frames.msgpack").is_file());
    }

    run_bin(&["--sim-dir", test_dir_str, "analyze"]);

    let results = fs::read_to_string(test_dir.join("run-0000").join("results.json"))
        .expect("failed to read results");
    let results: serde_json::Value =
        serde_json::from_str(&results).expect("failed to parse results");
    assert_eq!(results["n_generations"], 4);

    // Same seed, same history.
    let history_0 = fs::read(test_dir.join("run-0000").join("history.msgpack")).unwrap();
    let history_1 = fs::read(test_dir.join("run-0001").join("history.msgpack")).unwrap();
    assert_eq!(history_0, history_1);

    run_bin(&["--sim-dir", test_dir_str, "clean"]);
    assert!(!test_dir.join("run-0000").exists());

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn invalid_config_fails() {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("invalid_config_fails");

    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir(&test_dir).expect("failed to create test directory");
    fs::write(test_dir.join("config.toml"), "[agent]\nmax_velocity = -1.0\n")
        .expect("failed to write config file");

    let output = Command::new(env!("CARGO_BIN_EXE_evodrive"))
        .args(["--sim-dir", test_dir.to_str().unwrap(), "create"])
        .output()
        .expect("failed to execute command");
    assert!(!output.status.success());

    fs::remove_dir_all(&test_dir).ok();
}
