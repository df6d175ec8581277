//! Configuration.
//!
//! This module primarily contains the type [`Config`] that holds all the
//! configuration used by the mock server. It can be loaded both from a TOML
//! formatted config file and command line options.
//!
//! Note that the mock response itself is not part of the configuration. It
//! always starts out with fixed defaults and is changed at runtime through
//! the control endpoint. See the [`mock`][crate::mock] module for that.

use std::{fmt, fs};
use std::io::Read;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use clap::{Args, ArgAction, ArgMatches, Command, FromArgMatches};
use log::{LevelFilter, error};
use crate::error::Failed;


//------------ Defaults for Some Values --------------------------------------

/// The default port to listen on.
const DEFAULT_PORT: u16 = 10000;

/// The default path of the request journal.
const DEFAULT_JOURNAL_FILE: &str = "simple-mock.log";

/// The default maximum size of a request body in bytes.
const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// The default log level for the operator log.
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Warn;


//------------ Config --------------------------------------------------------

/// Mock server configuration.
///
/// All values are public and can be accessed directly.
///
/// The function [`config_args`] adds the global command line options to a
/// clap command. Its matches can then be used to create the config via
/// [`from_arg_matches`]. Finally, [`to_toml`] produces a TOML table that
/// can be used as a config file representing the current configuration.
///
/// [`config_args`]: #method.config_args
/// [`from_arg_matches`]: #method.from_arg_matches
/// [`to_toml`]: #method.to_toml
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// Path to the config file the configuration was read from, if any.
    pub config_file: Option<PathBuf>,

    /// The socket address to accept HTTP connections on.
    pub listen: SocketAddr,

    /// Path to the request journal.
    pub journal_file: PathBuf,

    /// The maximum size of a request body in bytes.
    ///
    /// Larger bodies are rejected before they reach a handler.
    pub max_body_size: usize,

    /// The log level filter for the operator log.
    pub log_level: LevelFilter,

    /// Where to write the operator log to.
    pub log_target: LogTarget,
}


impl Config {
    /// Adds the global arguments to a clap command.
    ///
    /// The function follows clap’s builder pattern: it takes a command,
    /// adds a bunch of arguments to it and returns it at the end.
    pub fn config_args(app: Command) -> Command {
        GlobalArgs::augment_args(app)
    }

    /// Creates a configuration from command line matches.
    ///
    /// The function attempts to read a config file if provided via the
    /// config file option (`-c` or `--config`). Otherwise it starts with a
    /// default configuration. No other files and no environment variables
    /// are consulted.
    ///
    /// All relative paths given in command line arguments will be
    /// interpreted relative to `cur_dir`. Conversely, paths in the config
    /// file are treated as relative to the config file’s directory.
    pub fn from_arg_matches(
        matches: &ArgMatches,
        cur_dir: &Path,
    ) -> Result<Self, Failed> {
        let args = GlobalArgs::from_arg_matches(matches).map_err(|err| {
            error!("Failed to process command line arguments: {}", err);
            Failed
        })?;
        let mut res = match args.config.as_ref() {
            Some(path) => {
                let path = cur_dir.join(path);
                match ConfigFile::read(&path)? {
                    Some(file) => Self::from_config_file(file)?,
                    None => {
                        error!("Cannot read config file {}", path.display());
                        return Err(Failed);
                    }
                }
            }
            None => Self::default(),
        };
        res.apply_args(args, cur_dir)?;
        Ok(res)
    }

    /// Applies the command line arguments to a configuration.
    ///
    /// The path arguments in `args` will be interpreted relative to
    /// `cur_dir`.
    fn apply_args(
        &mut self,
        args: GlobalArgs,
        cur_dir: &Path,
    ) -> Result<(), Failed> {
        // listen
        if let Some(addr) = args.listen {
            self.listen = addr
        }

        // journal_file
        if let Some(path) = args.journal_file {
            self.journal_file = cur_dir.join(path)
        }

        // max_body_size
        if let Some(size) = args.max_body_size {
            if size == 0 {
                error!("Invalid value for max-body-size: must not be zero.");
                return Err(Failed)
            }
            self.max_body_size = size
        }

        // log_target
        if let Some(file) = args.logfile.as_ref() {
            if file == "-" {
                self.log_target = LogTarget::Stderr
            }
            else {
                self.log_target = LogTarget::File(cur_dir.join(file))
            }
        }

        // log_level
        if args.verbose > 1 {
            self.log_level = LevelFilter::Debug
        }
        else if args.verbose == 1 {
            self.log_level = LevelFilter::Info
        }
        else if args.quiet > 1 {
            self.log_level = LevelFilter::Off
        }
        else if args.quiet == 1 {
            self.log_level = LevelFilter::Error
        }

        Ok(())
    }

    /// Creates a base config from a config file.
    fn from_config_file(mut file: ConfigFile) -> Result<Self, Failed> {
        let log_target = Self::log_target_from_config_file(&mut file)?;
        let max_body_size = file.take_usize("max-body-size")?
            .unwrap_or(DEFAULT_MAX_BODY_SIZE);
        if max_body_size == 0 {
            error!(
                "Failed in config file {}: \
                 'max-body-size' must not be zero.",
                file.path.display()
            );
            return Err(Failed)
        }
        let res = Config {
            config_file: Some(file.path.clone()),
            listen: {
                file.take_from_str("listen")?.unwrap_or_else(default_listen)
            },
            journal_file: {
                file.take_path("journal-file")?
                    .unwrap_or_else(|| DEFAULT_JOURNAL_FILE.into())
            },
            max_body_size,
            log_level: {
                file.take_from_str("log-level")?.unwrap_or(DEFAULT_LOG_LEVEL)
            },
            log_target,
        };
        file.check_exhausted()?;
        Ok(res)
    }

    /// Determines the logging target from the config file.
    fn log_target_from_config_file(
        file: &mut ConfigFile
    ) -> Result<LogTarget, Failed> {
        let log_target = file.take_string("log")?;
        let log_file = file.take_path("log-file")?;
        match log_target.as_deref() {
            Some("stderr") | None => Ok(LogTarget::Stderr),
            Some("file") => {
                match log_file {
                    Some(file) => Ok(LogTarget::File(file)),
                    None => {
                        error!(
                            "Failed in config file {}: \
                             log target \"file\" requires 'log-file' value.",
                            file.path.display()
                        );
                        Err(Failed)
                    }
                }
            }
            Some(value) => {
                error!(
                    "Failed in config file {}: \
                     invalid log target '{}'",
                     file.path.display(),
                     value
                );
                Err(Failed)
            }
        }
    }

    /// Returns a TOML representation of the config.
    ///
    /// The table displays as a complete TOML document that can be used as
    /// a config file.
    pub fn to_toml(&self) -> toml::Table {
        let mut res = toml::Table::new();
        res.insert("listen".into(), self.listen.to_string().into());
        res.insert(
            "journal-file".into(),
            self.journal_file.display().to_string().into()
        );
        res.insert(
            "max-body-size".into(),
            i64::try_from(self.max_body_size).unwrap_or(i64::MAX).into()
        );
        res.insert(
            "log-level".into(),
            self.log_level.to_string().to_lowercase().into()
        );
        match self.log_target {
            LogTarget::Stderr => {
                res.insert("log".into(), "stderr".into());
            }
            LogTarget::File(ref file) => {
                res.insert("log".into(), "file".into());
                res.insert(
                    "log-file".into(),
                    file.display().to_string().into()
                );
            }
        }
        res
    }
}


//--- Default

impl Default for Config {
    fn default() -> Self {
        Config {
            config_file: None,
            listen: default_listen(),
            journal_file: DEFAULT_JOURNAL_FILE.into(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            log_level: DEFAULT_LOG_LEVEL,
            log_target: LogTarget::default(),
        }
    }
}


//--- Display

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_toml())
    }
}


//------------ LogTarget -----------------------------------------------------

/// The target to write the operator log to.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum LogTarget {
    /// Stderr.
    #[default]
    Stderr,

    /// A file.
    ///
    /// The argument is the file name.
    File(PathBuf)
}


//------------ GlobalArgs ----------------------------------------------------

#[derive(Clone, Debug, Args)]
struct GlobalArgs {
    /// Read base configuration from this file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Listen on this address for HTTP requests
    #[arg(short, long, value_name = "ADDR:PORT")]
    listen: Option<SocketAddr>,

    /// Append the request journal to this file
    #[arg(long, value_name = "PATH")]
    journal_file: Option<PathBuf>,

    /// Reject request bodies larger than this many bytes
    #[arg(long, value_name = "BYTES")]
    max_body_size: Option<usize>,

    /// Log more information, twice for even more
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Log less information, twice for no information
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "verbose")]
    quiet: u8,

    /// Log to this file, '-' for stderr
    #[arg(long = "logfile", value_name = "PATH")]
    logfile: Option<String>,
}


//------------ ConfigFile ----------------------------------------------------

/// The content of a config file.
///
/// This is a thin wrapper around `toml::Table` to make dealing with it more
/// convenient.
#[derive(Clone, Debug)]
struct ConfigFile {
    /// The content of the file.
    content: toml::value::Table,

    /// The path to the config file.
    path: PathBuf,

    /// The directory we found the file in.
    ///
    /// This is used in relative paths.
    dir: PathBuf,
}

impl ConfigFile {
    /// Reads the config file at the given path.
    ///
    /// If there is no such file, returns `None`. If there is a file but it
    /// is broken, aborts.
    fn read(path: &Path) -> Result<Option<Self>, Failed> {
        let mut file = match fs::File::open(path) {
            Ok(file) => file,
            Err(_) => return Ok(None)
        };
        let mut config = String::new();
        if let Err(err) = file.read_to_string(&mut config) {
            error!(
                "Failed to read config file {}: {}",
                path.display(), err
            );
            return Err(Failed);
        }
        Self::parse(&config, path).map(Some)
    }

    /// Parses the content of the file from a string.
    ///
    /// `path` should be absolute. A path without a parent directory is
    /// treated as living in the current directory.
    fn parse(content: &str, path: &Path) -> Result<Self, Failed> {
        let content = match toml::from_str(content) {
            Ok(toml::Value::Table(content)) => content,
            Ok(_) => {
                error!(
                    "Failed to parse config file {}: Not a mapping.",
                    path.display()
                );
                return Err(Failed);
            }
            Err(err) => {
                error!(
                    "Failed to parse config file {}: {}",
                    path.display(), err
                );
                return Err(Failed);
            }
        };
        Ok(ConfigFile {
            content,
            path: path.into(),
            dir: path.parent().map(Into::into).unwrap_or_default(),
        })
    }

    /// Takes an unsigned integer value from the config file.
    ///
    /// The value is taken from the given `key`. Returns `Ok(None)` if there
    /// is no such key. Returns an error if the key exists but the value
    /// isn’t an integer or if it is negative.
    fn take_usize(&mut self, key: &str) -> Result<Option<usize>, Failed> {
        match self.content.remove(key) {
            Some(value) => {
                if let toml::Value::Integer(res) = value {
                    match usize::try_from(res) {
                        Ok(res) => Ok(Some(res)),
                        Err(_) => {
                            error!(
                                "Failed in config file {}: \
                                '{}' expected to be a positive integer.",
                                self.path.display(), key
                            );
                            Err(Failed)
                        }
                    }
                }
                else {
                    error!(
                        "Failed in config file {}: \
                         '{}' expected to be an integer.",
                        self.path.display(), key
                    );
                    Err(Failed)
                }
            }
            None => Ok(None)
        }
    }

    /// Takes a string value from the config file.
    ///
    /// The value is taken from the given `key`. Returns `Ok(None)` if there
    /// is no such key. Returns an error if the key exists but the value
    /// isn’t a string.
    fn take_string(&mut self, key: &str) -> Result<Option<String>, Failed> {
        match self.content.remove(key) {
            Some(value) => {
                if let toml::Value::String(res) = value {
                    Ok(Some(res))
                }
                else {
                    error!(
                        "Failed in config file {}: \
                         '{}' expected to be a string.",
                        self.path.display(), key
                    );
                    Err(Failed)
                }
            }
            None => Ok(None)
        }
    }

    /// Takes a string encoded value from the config file.
    ///
    /// The value is taken from the given `key`. It is expected to be a
    /// string and will be converted to the final type via `FromStr::from_str`.
    ///
    /// Returns `Ok(None)` if the key doesn’t exist. Returns an error if the
    /// key exists but the value isn’t a string or conversion fails.
    fn take_from_str<T>(&mut self, key: &str) -> Result<Option<T>, Failed>
    where T: FromStr, T::Err: fmt::Display {
        match self.take_string(key)? {
            Some(value) => {
                match T::from_str(&value) {
                    Ok(some) => Ok(Some(some)),
                    Err(err) => {
                        error!(
                            "Failed in config file {}: \
                             illegal value in '{}': {}.",
                            self.path.display(), key, err
                        );
                        Err(Failed)
                    }
                }
            }
            None => Ok(None)
        }
    }

    /// Takes a path value from the config file.
    ///
    /// The path is taken from the given `key`. It must be a string value.
    /// It is treated as relative to the directory of the config file. If it
    /// is indeed a relative path, it is expanded accordingly based on the
    /// directory of the config file.
    fn take_path(&mut self, key: &str) -> Result<Option<PathBuf>, Failed> {
        self.take_string(key).map(|opt| opt.map(|path| self.dir.join(path)))
    }

    /// Checks whether the config file is now empty.
    ///
    /// If it isn’t, logs a complaint and returns an error.
    fn check_exhausted(&self) -> Result<(), Failed> {
        if !self.content.is_empty() {
            let keys: Vec<_> = self.content.keys().map(String::as_str)
                .collect();
            error!(
                "Failed in config file {}: Unknown settings {}.",
                self.path.display(), keys.join(",")
            );
            Err(Failed)
        }
        else {
            Ok(())
        }
    }
}


//------------ Helpers -------------------------------------------------------

fn default_listen() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT))
}


//============ Tests =========================================================
