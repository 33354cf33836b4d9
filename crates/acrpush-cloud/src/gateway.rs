use crate::error::ExecError;
use crate::executor::{CommandExecutor, RealExecutor};
use crate::sink::OutputSink;

pub(crate) const AZ: &str = "az";
pub(crate) const DOCKER: &str = "docker";

/// Registry and build-engine operations, parameterized over the executor
/// for testability.
///
/// The operations themselves live in [`crate::az`] and [`crate::docker`].
pub struct Gateway<E: CommandExecutor = RealExecutor> {
    executor: E,
    sink: OutputSink,
}

impl Gateway<RealExecutor> {
    pub fn new() -> Self {
        Self::with_executor(RealExecutor)
    }
}

impl Default for Gateway<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CommandExecutor> Gateway<E> {
    pub fn with_executor(executor: E) -> Self {
        Self {
            executor,
            sink: OutputSink::discard(),
        }
    }

    /// Publish command echoes and output lines of every call to `sink`.
    pub fn with_sink(mut self, sink: OutputSink) -> Self {
        self.sink = sink;
        self
    }

    pub(crate) async fn run(&self, program: &str, args: Vec<String>) -> Result<String, ExecError> {
        self.sink.command(program, &args);
        tracing::debug!(program, ?args, "running command");
        self.executor.exec(program, &args, &self.sink).await
    }
}

pub(crate) fn args<const N: usize>(a: [&str; N]) -> Vec<String> {
    a.iter().map(|s| (*s).to_owned()).collect()
}
