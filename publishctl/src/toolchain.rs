//! Running the external toolchain.
use std::io;

use log::debug;

use super::PublishCommand;

/// Something that can run a publish command.
pub trait Toolchain {
    /// Run the command and wait for it to finish.
    ///
    /// Returns the exit code, or None if the process was terminated by a signal.
    fn execute(&mut self, command: &PublishCommand) -> io::Result<Option<i32>>;
}

/// Runs the commands as child processes, sharing our stdin, stdout and stderr.
#[derive(Debug, Default)]
pub struct Process;

impl Toolchain for Process {
    fn execute(&mut self, command: &PublishCommand) -> io::Result<Option<i32>> {
        let status = command.to_command().status()?;
        debug!("{} exited with {status}", command.program);
        Ok(status.code())
    }
}
