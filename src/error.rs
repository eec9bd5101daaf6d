use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(String),

    #[error("runner failed: {0}")]
    Runner(#[from] RunnerError),
}

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("unparseable command line: {0:?}")]
    CommandLine(String),

    #[error("spawn failed: {0}")]
    Spawn(String),

    #[error("stream io error: {stream}: {source}")]
    StreamIo {
        stream: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("line exceeds {limit} bytes on {stream}")]
    LineTooLong { stream: &'static str, limit: usize },

    #[error("wait failed for {program}: {source}")]
    Wait {
        program: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("route task failed: {0}")]
    Task(String),
}
