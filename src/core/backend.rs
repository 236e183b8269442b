// Copyright @yucwang 2023

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

pub const NOT_FOUND_EXIT_CODE: i32 = 6;

#[derive(Debug)]
pub enum BackendError {
    Spawn(std::io::Error),
}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        BackendError::Spawn(err)
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Spawn(err) => write!(f, "failed to run backend: {}", err),
        }
    }
}

impl std::error::Error for BackendError {}

/// Where the retrieval backend and its database live. `OFFVIEW_BACKEND` and
/// `OFFVIEW_DATABASE` override the defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    pub executable: PathBuf,
    pub database: PathBuf,
    pub backend_dir: PathBuf,
}

impl Default for BackendConfig {
    fn default() -> Self {
        let backend_dir = PathBuf::from("Backend");
        let executable = if cfg!(target_os = "macos") {
            backend_dir.join("macOS")
        } else if cfg!(target_os = "windows") {
            backend_dir.join("windows.exe")
        } else {
            backend_dir.join("backend")
        };
        let database = backend_dir.join("database.db");

        Self { executable, database, backend_dir }
    }
}

impl BackendConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(exe) = env::var_os("OFFVIEW_BACKEND") {
            config.executable = PathBuf::from(exe);
        }
        if let Some(db) = env::var_os("OFFVIEW_DATABASE") {
            config.database = PathBuf::from(db);
        }
        config
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    Query,
    Store,
}

impl BackendCommand {
    fn flag(&self) -> &'static str {
        match self {
            BackendCommand::Query => "--query",
            BackendCommand::Store => "--store",
        }
    }
}

/// Command line for one backend invocation. `append` and `overwrite` never
/// hold together; append wins.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendArgs {
    command: BackendCommand,
    input_file: Option<String>,
    database: Option<String>,
    append: bool,
    overwrite: bool,
    debug: bool,
}

impl BackendArgs {
    pub fn new(command: BackendCommand) -> Self {
        Self {
            command,
            input_file: None,
            database: None,
            append: false,
            overwrite: false,
            debug: false,
        }
    }

    pub fn input_file<S: Into<String>>(mut self, input_file: S) -> Self {
        self.input_file = Some(input_file.into()).filter(|s| !s.is_empty());
        self
    }

    pub fn database<S: Into<String>>(mut self, database: S) -> Self {
        self.database = Some(database.into()).filter(|s| !s.is_empty());
        self
    }

    pub fn append(mut self, append: bool) -> Self {
        self.append = append;
        if append {
            self.overwrite = false;
        }
        self
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        if !self.append {
            self.overwrite = overwrite;
        }
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn command(&self) -> BackendCommand {
        self.command
    }

    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![self.command.flag().to_string()];
        if let Some(input) = &self.input_file {
            args.push(input.clone());
        }
        if let Some(db) = &self.database {
            args.push(String::from("--database"));
            args.push(db.clone());
        }
        if self.append {
            args.push(String::from("--append"));
        }
        if self.overwrite {
            args.push(String::from("--overwrite"));
        }
        if self.debug {
            args.push(String::from("--debug"));
        }
        args
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReturnType {
    Ok,
    NotFound,
    Error,
}

impl ReturnType {
    /// `None` stands for a process killed by a signal.
    pub fn from_exit_code(code: Option<i32>) -> Self {
        match code {
            Some(0) => ReturnType::Ok,
            Some(NOT_FOUND_EXIT_CODE) => ReturnType::NotFound,
            _ => ReturnType::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackendResult {
    pub output_data: Vec<String>,
    pub error_data: Vec<String>,
    pub return_type: ReturnType,
}

impl BackendResult {
    /// Result file paths printed by a query, with the backend's `./` prefix
    /// resolved against `backend_dir`.
    pub fn result_paths(&self, backend_dir: &Path) -> Vec<PathBuf> {
        self.output_data
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .map(|line| match line.strip_prefix("./") {
                Some(rest) => backend_dir.join(rest),
                None => PathBuf::from(line),
            })
            .collect()
    }
}

fn split_lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(|l| l.to_string())
        .collect()
}

pub struct Backend {
    config: BackendConfig,
    debug: bool,
}

impl Backend {
    pub fn new(config: BackendConfig) -> Self {
        Self { config, debug: false }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    pub fn query<S: Into<String>>(&self, input_file: S) -> Result<BackendResult, BackendError> {
        let args = BackendArgs::new(BackendCommand::Query)
            .input_file(input_file)
            .database(self.config.database.to_string_lossy().into_owned())
            .debug(self.debug);
        self.run(&args)
    }

    pub fn store<S: Into<String>>(&self, input_file: S) -> Result<BackendResult, BackendError> {
        let args = BackendArgs::new(BackendCommand::Store)
            .input_file(input_file)
            .database(self.config.database.to_string_lossy().into_owned())
            .append(true)
            .debug(self.debug);
        self.run(&args)
    }

    pub fn run(&self, args: &BackendArgs) -> Result<BackendResult, BackendError> {
        let argv = args.to_args();
        log::info!("Running backend {} {}.", self.config.executable.display(), argv.join(" "));

        let output = Command::new(&self.config.executable)
            .args(&argv)
            .output()?;

        let result = BackendResult {
            output_data: split_lines(&output.stdout),
            error_data: split_lines(&output.stderr),
            return_type: ReturnType::from_exit_code(output.status.code()),
        };
        log::debug!("Backend finished with {:?} ({} output lines).",
                    result.return_type, result.output_data.len());
        Ok(result)
    }
}
