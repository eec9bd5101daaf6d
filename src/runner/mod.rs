mod console;
mod spawn;
mod tee;

pub use console::Console;

use std::process::ExitStatus;

use crate::cli::Args;
use crate::config::AppConfig;
use crate::error::RunnerError;

/// Fully resolved inputs for one run: CLI flags override the config file,
/// the config file overrides built-in defaults.
#[derive(Debug, Clone)]
pub struct RunArgs {
    pub program1: String,
    pub program2: String,
    pub disable_stdout: bool,
    pub program1_stdout_prefix: String,
    pub program1_stderr_prefix: String,
    pub program2_stdout_prefix: String,
    pub program2_stderr_prefix: String,
    pub max_line_bytes: usize,
}

impl RunArgs {
    pub fn new(args: &Args, cfg: &AppConfig) -> Self {
        let pick = |flag: &Option<String>, fallback: &str| {
            flag.clone().unwrap_or_else(|| fallback.to_string())
        };

        Self {
            program1: args.program1.clone(),
            program2: args.program2.clone(),
            disable_stdout: args.disable_stdout || cfg.runner.disable_stdout,
            program1_stdout_prefix: pick(&args.program1_stdout_prefix, &cfg.prefixes.program1_stdout),
            program1_stderr_prefix: pick(&args.program1_stderr_prefix, &cfg.prefixes.program1_stderr),
            program2_stdout_prefix: pick(&args.program2_stdout_prefix, &cfg.prefixes.program2_stdout),
            program2_stderr_prefix: pick(&args.program2_stderr_prefix, &cfg.prefixes.program2_stderr),
            max_line_bytes: cfg.runner.max_line_bytes,
        }
    }
}

/// Spawn both programs, run the four copy routes to completion, then wait for
/// both exits and report them in fixed order.
///
/// A failed route is logged and surfaced only after the remaining routes have
/// drained and both exit codes are printed.
pub async fn run(args: RunArgs) -> Result<(i32, i32), RunnerError> {
    let argv1 = spawn::split_command_line(&args.program1)?;
    let argv2 = spawn::split_command_line(&args.program2)?;

    let mut child1 = spawn::spawn(&argv1)?;
    let mut child2 = match spawn::spawn(&argv2) {
        Ok(c) => c,
        Err(e) => {
            let _ = child1.start_kill();
            return Err(e);
        }
    };
    tracing::info!(program1 = %argv1[0], program2 = %argv2[0], "programs spawned");

    let stdin1 = child1
        .stdin
        .take()
        .ok_or_else(|| RunnerError::Spawn("program 1 stdin not captured".into()))?;
    let stdout1 = child1
        .stdout
        .take()
        .ok_or_else(|| RunnerError::Spawn("program 1 stdout not captured".into()))?;
    let stderr1 = child1
        .stderr
        .take()
        .ok_or_else(|| RunnerError::Spawn("program 1 stderr not captured".into()))?;
    let stdin2 = child2
        .stdin
        .take()
        .ok_or_else(|| RunnerError::Spawn("program 2 stdin not captured".into()))?;
    let stdout2 = child2
        .stdout
        .take()
        .ok_or_else(|| RunnerError::Spawn("program 2 stdout not captured".into()))?;
    let stderr2 = child2
        .stderr
        .take()
        .ok_or_else(|| RunnerError::Spawn("program 2 stderr not captured".into()))?;

    let console = Console::stdout();
    let max = args.max_line_bytes;

    let echo1 = (!args.disable_stdout)
        .then(|| (console.clone(), args.program1_stdout_prefix.into_bytes()));
    let echo2 = (!args.disable_stdout)
        .then(|| (console.clone(), args.program2_stdout_prefix.into_bytes()));

    // Each route owns its source and sinks; when a task returns, its peer
    // stdin handle drops and the peer sees end-of-stream.
    let routes = [
        (
            "program 1 stdout",
            tee::tee_stdout(stdout1, stdin2, echo1, "program 1 stdout", max),
        ),
        (
            "program 2 stdout",
            tee::tee_stdout(stdout2, stdin1, echo2, "program 2 stdout", max),
        ),
        (
            "program 1 stderr",
            tee::tee_stderr(
                stderr1,
                console.clone(),
                args.program1_stderr_prefix.into_bytes(),
                "program 1 stderr",
                max,
            ),
        ),
        (
            "program 2 stderr",
            tee::tee_stderr(
                stderr2,
                console.clone(),
                args.program2_stderr_prefix.into_bytes(),
                "program 2 stderr",
                max,
            ),
        ),
    ];

    let mut first_err: Option<RunnerError> = None;
    for (stream, handle) in routes {
        match handle.await {
            Ok(Ok(bytes)) => tracing::debug!(stream, bytes, "route drained"),
            Ok(Err(e)) => {
                tracing::warn!(stream, error = %e, "route failed");
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
            Err(e) => {
                tracing::warn!(stream, error = %e, "route task aborted");
                if first_err.is_none() {
                    first_err = Some(RunnerError::Task(e.to_string()));
                }
            }
        }
    }

    let code1 = child1
        .wait()
        .await
        .map(exit_code)
        .map_err(|e| RunnerError::Wait {
            program: "program 1",
            source: e,
        })?;
    let code2 = child2
        .wait()
        .await
        .map(exit_code)
        .map_err(|e| RunnerError::Wait {
            program: "program 2",
            source: e,
        })?;

    for (label, code) in [("Program 1", code1), ("Program 2", code2)] {
        console
            .write_record(b"", format!("{label} Exit Code: {code}\n").as_bytes())
            .await
            .map_err(|e| RunnerError::StreamIo {
                stream: "console",
                source: e,
            })?;
    }
    tracing::info!(code1, code2, "programs exited");

    if let Some(e) = first_err {
        return Err(e);
    }
    Ok((code1, code2))
}

/// A signal death has no exit code; report it the way the event-loop runtimes
/// do, as the negated signal number.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(sig) = status.signal() {
            return -sig;
        }
    }
    -1
}
