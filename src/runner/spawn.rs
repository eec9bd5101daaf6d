use std::process::Stdio;

use tokio::process::{Child, Command};

use crate::error::RunnerError;

/// Tokenize a shell-style command line into argv words.
pub fn split_command_line(raw: &str) -> Result<Vec<String>, RunnerError> {
    let words =
        shlex::split(raw).ok_or_else(|| RunnerError::CommandLine(raw.to_string()))?;
    if words.is_empty() {
        return Err(RunnerError::CommandLine(raw.to_string()));
    }
    Ok(words)
}

pub fn spawn(argv: &[String]) -> Result<Child, RunnerError> {
    let mut cmd = Command::new(&argv[0]);
    cmd.args(&argv[1..])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    cmd.spawn()
        .map_err(|e| RunnerError::Spawn(format!("{}: {e}", argv[0])))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_quoted_words() {
        let argv = split_command_line("sh -c 'echo \"a b\"'").unwrap();
        assert_eq!(argv, vec!["sh", "-c", "echo \"a b\""]);
    }

    #[test]
    fn rejects_unclosed_quote() {
        let err = split_command_line("sh -c 'oops").unwrap_err();
        assert!(matches!(err, RunnerError::CommandLine(_)));
    }

    #[test]
    fn rejects_empty_command_line() {
        let err = split_command_line("   ").unwrap_err();
        assert!(matches!(err, RunnerError::CommandLine(_)));
    }

    #[tokio::test]
    async fn spawn_failure_reports_program_name() {
        let argv = vec!["/definitely/not/a/real/binary".to_string()];
        let err = spawn(&argv).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/a/real/binary"));
    }
}
