//! What the mock server can do for you.
//!
//! This module implements all the commands users can ask for. They are
//! encapsulated in the type [`Operation`] which can determine the command
//! from the command line arguments and then execute it.
//!
//! [`Operation`]: enum.Operation.html

use std::future::Future;
use std::sync::Arc;
use clap::ArgMatches;
use futures::future::{select, Either};
use futures::pin_mut;
use log::{error, warn};
use crate::config::Config;
use crate::error::{ExitError, Failed};
use crate::http::{HttpListener, State};
use crate::journal::Journal;
use crate::mock::SharedMock;
use crate::process::Process;

#[cfg(unix)] use tokio::signal::unix::{Signal, SignalKind, signal};


//------------ Operation -----------------------------------------------------

/// The command to execute.
///
/// You can create a value from the command line arguments. First, you add
/// all necessary sub-commands and arguments to a clap `Command` via
/// [`config_args`] and then process the argument matches into a value in
/// [`from_arg_matches`]. Finally, you can execute the created command
/// through the [`run`] method.
///
/// [`config_args`]: #method.config_args
/// [`from_arg_matches`]: #method.from_arg_matches
/// [`run`]: #method.run
pub enum Operation {
    Server(Server),
    PrintConfig(PrintConfig),
}

impl Operation {
    /// Prepares everything.
    ///
    /// Call this before doing anything else.
    pub fn prepare() -> Result<(), Failed> {
        Process::init()
    }

    /// Adds the command configuration to a clap app.
    pub fn config_args(app: clap::Command) -> clap::Command {
        let app = Server::config_args(app);
        PrintConfig::config_args(app)
    }

    /// Creates a command from clap matches.
    ///
    /// Without a command, the server is started.
    pub fn from_arg_matches(matches: &ArgMatches) -> Self {
        match matches.subcommand() {
            Some(("config", _)) => Operation::PrintConfig(PrintConfig),
            _ => Operation::Server(Server),
        }
    }

    /// Runs the command.
    pub fn run(self, config: Config) -> Result<(), ExitError> {
        let process = Process::new(config);
        match self {
            Operation::Server(cmd) => cmd.run(process),
            Operation::PrintConfig(cmd) => cmd.run(process),
        }
    }
}


//------------ Server --------------------------------------------------------

/// Run the mock server.
pub struct Server;

impl Server {
    /// Adds the command configuration to a clap app.
    pub fn config_args(app: clap::Command) -> clap::Command {
        app.subcommand(
            clap::Command::new("server")
            .about("Starts the mock server (default)")
            .after_help(AFTER_HELP)
        )
    }

    /// Runs the server until a termination signal arrives.
    ///
    /// Everything that can fail at startup, i.e., setting up logging,
    /// binding the listener, and attaching to the signals, is done before
    /// the first request is accepted.
    pub fn run(self, process: Process) -> Result<(), ExitError> {
        process.switch_logging()?;
        let config = process.config();
        let journal = Arc::new(Journal::new(config.journal_file.clone()));
        process.install_panic_hook(journal.clone());
        let listener = HttpListener::bind(config.listen)?;
        let state = Arc::new(State::new(
            config, SharedMock::default(), journal.clone()
        ));

        process.block_on(async move {
            let mut signals = SignalListener::new()?;
            Self::serve_until(listener, state, &journal, signals.next()).await
        })?.map_err(Into::into)
    }

    /// Serves requests until `shutdown` resolves.
    ///
    /// The shutdown future resolves to the name of the reason for shutting
    /// down. This is recorded in the journal and results in `Ok(())`. If the
    /// server stops on its own, that is an error.
    async fn serve_until(
        listener: HttpListener,
        state: Arc<State>,
        journal: &Journal,
        shutdown: impl Future<Output = &'static str>,
    ) -> Result<(), Failed> {
        let addr = listener.local_addr().map_err(|err| {
            error!("Fatal: cannot determine listen address: {}", err);
            Failed
        })?;
        warn!("Mock API listening on {}", addr);
        journal.record(
            format!("Server started, listening on {}", addr)
        ).await;

        let server = listener.run(state);
        pin_mut!(server);
        pin_mut!(shutdown);
        match select(server, shutdown).await {
            Either::Left((res, _)) => {
                error!("HTTP server stopped unexpectedly.");
                journal.record("Server stopped unexpectedly").await;
                res.and(Err(Failed))
            }
            Either::Right((name, _)) => {
                warn!("Received {}, shutting down.", name);
                journal.record(
                    format!("Received {}, shutting down", name)
                ).await;
                Ok(())
            }
        }
    }
}


//------------ PrintConfig ---------------------------------------------------

/// Shows the current configuration.
pub struct PrintConfig;

impl PrintConfig {
    /// Adds the command configuration to a clap app.
    pub fn config_args(app: clap::Command) -> clap::Command {
        app.subcommand(
            clap::Command::new("config")
            .about("Prints the current config and exits")
            .after_help(AFTER_HELP)
        )
    }

    /// Prints the current configuration to stdout and exits.
    fn run(self, process: Process) -> Result<(), ExitError> {
        print!("{}", process.config());
        Ok(())
    }
}


//------------ SignalListener ------------------------------------------------

/// Waits for a signal telling us to quit.
#[cfg(unix)]
struct SignalListener {
    int: Signal,
    term: Signal,
}

#[cfg(unix)]
impl SignalListener {
    pub fn new() -> Result<Self, Failed> {
        Ok(SignalListener {
            int: match signal(SignalKind::interrupt()) {
                Ok(int) => int,
                Err(err) => {
                    error!("Attaching to signal INT failed: {err}");
                    return Err(Failed)
                }
            },
            term: match signal(SignalKind::terminate()) {
                Ok(term) => term,
                Err(err) => {
                    error!("Attaching to signal TERM failed: {err}");
                    return Err(Failed)
                }
            },
        })
    }

    /// Waits for the next signal.
    ///
    /// Returns the name of the signal.
    pub async fn next(&mut self) -> &'static str {
        tokio::select! {
            _ = self.int.recv() => "SIGINT",
            _ = self.term.recv() => "SIGTERM",
        }
    }
}

#[cfg(not(unix))]
struct SignalListener;

#[cfg(not(unix))]
impl SignalListener {
    pub fn new() -> Result<Self, Failed> {
        Ok(SignalListener)
    }

    /// Waits for Ctrl-C.
    ///
    /// If waiting fails, waits forever instead.
    pub async fn next(&mut self) -> &'static str {
        if tokio::signal::ctrl_c().await.is_err() {
            futures::future::pending::<()>().await;
        }
        "Ctrl-C"
    }
}


//------------ Constants -----------------------------------------------------

/// The after help message pointing to the main help.
const AFTER_HELP: &str =
    "Additional global options are available. \
    Please consult 'simple-mock --help' for those.";


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    fn operation(args: &[&str]) -> Operation {
        let matches = Operation::config_args(
            Config::config_args(clap::Command::new("simple-mock"))
        ).try_get_matches_from(args).unwrap();
        Operation::from_arg_matches(&matches)
    }

    #[test]
    fn commands() {
        assert!(matches!(
            operation(&["simple-mock"]), Operation::Server(_)
        ));
        assert!(matches!(
            operation(&["simple-mock", "-v", "server"]), Operation::Server(_)
        ));
        assert!(matches!(
            operation(&["simple-mock", "config"]), Operation::PrintConfig(_)
        ));
    }

    #[tokio::test]
    async fn shutdown_is_journalled() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            listen: "127.0.0.1:0".parse().unwrap(),
            journal_file: dir.path().join("simple-mock.log"),
            ..Default::default()
        };
        let journal = Arc::new(Journal::new(config.journal_file.clone()));
        let state = Arc::new(State::new(
            &config, SharedMock::default(), journal.clone()
        ));
        let listener = HttpListener::bind(config.listen).unwrap();
        let addr = listener.local_addr().unwrap();

        let res = Server::serve_until(
            listener, state, &journal, async { "SIGTERM" }
        ).await;
        assert!(res.is_ok());

        let content = journal.read_all().await.unwrap();
        let messages: Vec<_> = content.lines().map(|line| {
            line.split_once("] ").unwrap().1
        }).collect();
        assert_eq!(
            messages,
            [
                format!("Server started, listening on {}", addr),
                String::from("Received SIGTERM, shutting down"),
            ]
        );
    }
}
