//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::path::Path;
use std::process::Output;

impl Test {
    /// Create a rollwave command running in the project directory.
    ///
    /// The environment is cleared except for `PATH`, and colors are off.
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("rollwave").expect("failed to find rollwave binary");
        cmd.env_clear();
        if let Some(path) = std::env::var_os("PATH") {
            cmd.env("PATH", path);
        }
        cmd.env("NO_COLOR", "1");
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// Run rollwave with `args` and the given extra environment.
    pub fn run(&self, args: &[&str], env: &[(&str, &str)]) -> Output {
        let mut cmd = self.cmd();
        cmd.args(args);
        for (k, v) in env {
            cmd.env(k, v);
        }
        cmd.output().expect("failed to run rollwave")
    }

    /// Run rollwave against a specific docker binary.
    pub fn run_with_docker(&self, docker: &Path, args: &[&str], env: &[(&str, &str)]) -> Output {
        let mut cmd = self.cmd();
        cmd.env("ROLLWAVE_DOCKER", docker);
        cmd.args(args);
        for (k, v) in env {
            cmd.env(k, v);
        }
        cmd.output().expect("failed to run rollwave")
    }

    /// Shortcut for `rollwave init`.
    pub fn init_cmd(&self) -> Output {
        self.run(&["init"], &[])
    }

    /// Shortcut for `rollwave deploy --dry-run` plus extra flags.
    pub fn deploy_dry_run(&self, extra: &[&str], env: &[(&str, &str)]) -> Output {
        let mut args = vec!["deploy", "--dry-run"];
        args.extend_from_slice(extra);
        self.run(&args, env)
    }
}
