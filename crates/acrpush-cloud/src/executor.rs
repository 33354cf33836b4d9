use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::error::ExecError;
use crate::sink::{OutputSink, render_command};

/// Abstraction over external process execution for testability.
///
/// Production code uses [`RealExecutor`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait CommandExecutor: Send + Sync {
    /// Run `program` with `args` to completion.
    ///
    /// Every line of stdout and stderr is forwarded to `sink` as it is
    /// produced. On a zero exit the captured stdout is returned; any other
    /// exit is an error carrying the merged output.
    async fn exec(
        &self,
        program: &str,
        args: &[String],
        sink: &OutputSink,
    ) -> Result<String, ExecError>;
}

/// Runs commands as child processes via tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealExecutor;

impl CommandExecutor for RealExecutor {
    async fn exec(
        &self,
        program: &str,
        args: &[String],
        sink: &OutputSink,
    ) -> Result<String, ExecError> {
        let command = render_command(program, args);
        let io_err = |source: std::io::Error| ExecError::Io {
            command: command.clone(),
            source,
        };

        let mut child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ExecError::NotFound {
                    program: program.to_owned(),
                    source: e,
                },
                _ => io_err(e),
            })?;

        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            return Err(io_err(std::io::Error::other("child output pipes missing")));
        };
        let mut stdout = BufReader::new(stdout);
        let mut stderr = BufReader::new(stderr);
        let (mut out_buf, mut err_buf) = (Vec::new(), Vec::new());
        let (mut stdout_open, mut stderr_open) = (true, true);

        let mut captured = Vec::new();
        let mut merged = Vec::new();

        // read_until keeps partial lines in the buffer when the other branch
        // wins, so a pipe may close with bytes still pending.
        while stdout_open || stderr_open {
            tokio::select! {
                read = stdout.read_until(b'\n', &mut out_buf), if stdout_open => {
                    stdout_open = read.map_err(io_err)? > 0;
                    if out_buf.is_empty() {
                        continue;
                    }
                    let line = decode_line(&out_buf);
                    out_buf.clear();
                    sink.output(&line);
                    captured.push(line.clone());
                    merged.push(line);
                }
                read = stderr.read_until(b'\n', &mut err_buf), if stderr_open => {
                    stderr_open = read.map_err(io_err)? > 0;
                    if err_buf.is_empty() {
                        continue;
                    }
                    let line = decode_line(&err_buf);
                    err_buf.clear();
                    sink.output(&line);
                    merged.push(line);
                }
            }
        }

        let status = child.wait().await.map_err(io_err)?;
        if status.success() {
            Ok(captured.join("\n"))
        } else {
            Err(ExecError::CommandFailed {
                command,
                status,
                output: merged.join("\n"),
            })
        }
    }
}

/// One output line without its terminator. Bytes that are not UTF-8 are
/// replaced rather than failing the run.
fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}
