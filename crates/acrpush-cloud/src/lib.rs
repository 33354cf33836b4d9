//! Gateway over the two external tools acr-push drives.
//!
//! Every operation takes typed arguments, builds an argument vector (never
//! a shell string), runs it through a [`CommandExecutor`], and maps a
//! failure to a [`ToolError`]. Command echoes and streamed output lines are
//! published on the gateway's [`OutputSink`]; nothing downstream of the
//! sink can change the outcome of a call.

pub mod az;
pub mod docker;
pub mod error;
pub mod executor;
pub mod gateway;
pub mod sink;

pub use az::{Account, Registry};
pub use error::{ExecError, ToolError};
pub use executor::{CommandExecutor, RealExecutor};
pub use gateway::Gateway;
pub use sink::{GatewayEvent, OutputSink, render_command};
