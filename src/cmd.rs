use std::{
    ffi::OsStr,
    fmt::Display,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use indexmap::IndexMap;

use crate::error::Error;

/// A fully described external command. Environment entries mapped to `None`
/// are removed from the child's inherited environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cmd {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub envs: IndexMap<String, Option<String>>,
}

impl Cmd {
    pub fn new(program: impl Into<String>) -> Self {
        Cmd {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            self = self.arg(arg);
        }
        self
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.cwd = Some(dir.to_path_buf());
        self
    }

    pub fn env(mut self, key: &str, value: impl Into<String>) -> Self {
        self.envs.insert(key.to_string(), Some(value.into()));
        self
    }

    pub fn env_remove(mut self, key: &str) -> Self {
        self.envs.insert(key.to_string(), None);
        self
    }

    pub fn envs(mut self, envs: &IndexMap<String, Option<String>>) -> Self {
        for (key, value) in envs {
            self.envs.insert(key.clone(), value.clone());
        }
        self
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        for (key, value) in &self.envs {
            match value {
                Some(value) => cmd.env(key, value),
                None => cmd.env_remove(key),
            };
        }
        cmd
    }
}

impl Display for Cmd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(' ') {
                write!(f, " {arg:?}")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Executes external tools. Every failure is fatal to the current run.
pub trait Runner {
    /// Runs the command with inherited stdio and fails on a non-zero exit.
    fn status(&self, cmd: &Cmd) -> Result<(), Error>;

    /// Runs the command and returns its stdout. Fails on a non-zero exit.
    fn output(&self, cmd: &Cmd) -> Result<String, Error>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl Runner for SystemRunner {
    fn status(&self, cmd: &Cmd) -> Result<(), Error> {
        log::debug!("Calling: {}", cmd);
        let status = cmd.to_command().status().map_err(|source| Error::Spawn {
            program: cmd.program.clone(),
            source,
        })?;

        if !status.success() {
            return Err(Error::CommandFailed {
                program: cmd.program.clone(),
                code: status.code(),
            });
        }
        Ok(())
    }

    fn output(&self, cmd: &Cmd) -> Result<String, Error> {
        log::debug!("Calling: {}", cmd);
        let output = cmd
            .to_command()
            .stderr(Stdio::inherit())
            .output()
            .map_err(|source| Error::Spawn {
                program: cmd.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(Error::CommandFailed {
                program: cmd.program.clone(),
                code: output.status.code(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        log::trace!("Output: {:?}", stdout);
        Ok(stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_quotes_awkward_args() {
        let cmd = Cmd::new("xcodebuild")
            .args(["-destination", "generic/platform=macOS,variant=Mac Catalyst"])
            .arg("CODE_SIGN_IDENTITY=")
            .arg("");
        assert_eq!(
            cmd.to_string(),
            "xcodebuild -destination \"generic/platform=macOS,variant=Mac Catalyst\" CODE_SIGN_IDENTITY= \"\""
        );
    }

    #[test]
    fn test_later_env_entries_override_earlier_ones() {
        let mut base = IndexMap::new();
        base.insert("REALM_BUILD_STATIC".to_string(), Some("1".to_string()));
        let cmd = Cmd::new("pod").envs(&base).env_remove("REALM_BUILD_STATIC");
        assert_eq!(cmd.envs.get("REALM_BUILD_STATIC"), Some(&None));
    }

    #[test]
    fn test_system_runner_reports_spawn_failure() {
        let result = SystemRunner.status(&Cmd::new("nonexistent-command-12345"));
        let err = result.unwrap_err();
        assert!(matches!(err, Error::Spawn { .. }));
        assert!(err.to_string().contains("nonexistent-command-12345"));
    }

    #[test]
    fn test_system_runner_reports_exit_code() {
        let result = SystemRunner.status(&Cmd::new("sh").args(["-c", "exit 3"]));
        assert!(matches!(
            result,
            Err(Error::CommandFailed { code: Some(3), .. })
        ));
    }

    #[test]
    fn test_system_runner_captures_stdout_with_env() {
        let output = SystemRunner
            .output(
                &Cmd::new("sh")
                    .args(["-c", "echo \"$INSTALL_MATRIX_PROBE\""])
                    .env("INSTALL_MATRIX_PROBE", "15.2"),
            )
            .unwrap();
        assert_eq!(output, "15.2\n");
    }
}
