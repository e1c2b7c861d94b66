//! Bounded execution of a single solver.
//!
//! Every run happens in a fresh `tsp-runtime solve` child process. The request
//! goes in as json on stdin and the tour comes back as json on stdout. A child
//! that outlives its budget is killed, so a solver never has to cooperate with
//! cancellation.
use log::{debug, info, warn};
use std::{
    ffi::OsString,
    path::PathBuf,
    process::{ExitStatus, Stdio},
    time::{Duration, Instant},
};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWriteExt},
    process::Command,
    task::JoinHandle,
    time,
};
use tsp_structs::core::{
    Algorithm, AlgorithmResult, CitySet, Failure, FailureKind, OutputData, SolveRequest,
};
use tsp_utils::{dejsonify, jsonify};

pub const SOLVE_SUBCOMMAND: &str = "solve";
/// Exit code of a solver process that ran to completion but reported an error.
pub const SOLVER_ERROR_EXIT_CODE: i32 = 86;
const STDERR_TAIL_BYTES: usize = 2048;

#[derive(Debug, Clone)]
pub struct Harness {
    program: PathBuf,
    args: Vec<OsString>,
    start_city: usize,
}

enum Outcome {
    Exited {
        status: ExitStatus,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
    },
    TimedOut,
    DispatchFailed(String),
}

impl Harness {
    /// `program` must understand the `solve` subcommand.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            start_city: 0,
        }
    }

    /// Re-executes the running binary as the solver process.
    pub fn current_exe() -> anyhow::Result<Self> {
        Ok(Self::new(std::env::current_exe()?))
    }

    /// Extra argument appended after `solve` on every child invocation.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn start_city(mut self, start_city: usize) -> Self {
        self.start_city = start_city;
        self
    }

    /// Runs `algorithm` on `cities` in a child process and waits at most
    /// `timeout` for it. Never fails: every problem becomes a `Failed` or
    /// `TimedOut` result.
    pub async fn run(
        &self,
        algorithm: Algorithm,
        cities: &CitySet,
        timeout: Duration,
    ) -> AlgorithmResult {
        if algorithm == Algorithm::NearestNeighbor && self.start_city >= cities.len() {
            let failure = Failure::new(
                FailureKind::InvalidInput,
                format!(
                    "Start city {} is out of range for {} cities",
                    self.start_city,
                    cities.len()
                ),
            );
            warn!("{}: {}", algorithm, failure);
            return AlgorithmResult::failed(algorithm, failure, Duration::ZERO, timeout);
        }

        let request = SolveRequest {
            algorithm,
            cities: cities.clone(),
            start_city: self.start_city,
        };
        info!(
            "{}: dispatching {} cities (timeout {:.3}s)",
            algorithm,
            cities.len(),
            timeout.as_secs_f64()
        );
        let start = Instant::now();
        let outcome = self.execute(&request, timeout).await;
        let elapsed = start.elapsed();

        let result = match outcome {
            Outcome::Exited {
                status,
                stdout,
                stderr,
            } => interpret_exit(algorithm, cities, status, &stdout, &stderr, elapsed, timeout),
            Outcome::TimedOut => AlgorithmResult::timed_out(algorithm, elapsed, timeout),
            Outcome::DispatchFailed(message) => AlgorithmResult::failed(
                algorithm,
                Failure::new(FailureKind::Dispatch, message),
                elapsed,
                timeout,
            ),
        };
        match (&result.failure, result.distance) {
            (Some(failure), _) => warn!("{}: {}", algorithm, failure),
            (None, Some(distance)) => info!(
                "{}: completed in {:.3}s, distance {:.2}",
                algorithm,
                elapsed.as_secs_f64(),
                distance
            ),
            (None, None) => warn!(
                "{}: exceeded time limit of {:.3}s, process killed",
                algorithm,
                timeout.as_secs_f64()
            ),
        }
        result
    }

    async fn execute(&self, request: &SolveRequest, timeout: Duration) -> Outcome {
        let mut child = match Command::new(&self.program)
            .arg(SOLVE_SUBCOMMAND)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                return Outcome::DispatchFailed(format!(
                    "failed to start {}: {}",
                    self.program.display(),
                    e
                ))
            }
        };
        debug!("spawned solver process {:?}", child.id());

        let stdout_reader = spawn_reader(child.stdout.take());
        let stderr_reader = spawn_reader(child.stderr.take());
        let mut stdin = child.stdin.take();
        let input = jsonify(request);

        let waited = time::timeout(timeout, async {
            if let Some(mut stdin) = stdin.take() {
                // a child that dies before reading shows up in its exit status
                if let Err(e) = stdin.write_all(input.as_bytes()).await {
                    debug!("could not write request to solver process: {}", e);
                }
            }
            child.wait().await
        })
        .await;

        match waited {
            Ok(Ok(status)) => Outcome::Exited {
                status,
                stdout: stdout_reader.await.unwrap_or_default(),
                stderr: stderr_reader.await.unwrap_or_default(),
            },
            Ok(Err(e)) => {
                stdout_reader.abort();
                stderr_reader.abort();
                Outcome::DispatchFailed(format!("failed to wait for solver process: {}", e))
            }
            Err(_) => {
                if let Err(e) = child.kill().await {
                    warn!("failed to kill solver process: {}", e);
                }
                stdout_reader.abort();
                stderr_reader.abort();
                Outcome::TimedOut
            }
        }
    }
}

fn spawn_reader<R>(reader: Option<R>) -> JoinHandle<Vec<u8>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buffer = Vec::new();
        if let Some(mut reader) = reader {
            if let Err(e) = reader.read_to_end(&mut buffer).await {
                debug!("failed to read solver output: {}", e);
            }
        }
        buffer
    })
}

fn interpret_exit(
    algorithm: Algorithm,
    cities: &CitySet,
    status: ExitStatus,
    stdout: &[u8],
    stderr: &[u8],
    elapsed: Duration,
    timeout: Duration,
) -> AlgorithmResult {
    let failed = |kind: FailureKind, message: String| {
        AlgorithmResult::failed(algorithm, Failure::new(kind, message), elapsed, timeout)
    };

    if !status.success() && status.code() != Some(SOLVER_ERROR_EXIT_CODE) {
        let stderr = stderr_tail(stderr);
        return failed(
            FailureKind::AbnormalExit,
            if stderr.is_empty() {
                describe_exit(&status)
            } else {
                format!("{}: {}", describe_exit(&status), stderr)
            },
        );
    }

    let stdout = String::from_utf8_lossy(stdout);
    let output: OutputData = match dejsonify(stdout.trim()) {
        Ok(output) => output,
        Err(e) => {
            return failed(
                FailureKind::Protocol,
                format!("could not parse solver output: {}", e),
            )
        }
    };
    if output.algorithm != algorithm {
        return failed(
            FailureKind::Protocol,
            format!("expected output for {}, got {}", algorithm, output.algorithm),
        );
    }
    if let Some(err) = output.error {
        return AlgorithmResult::failed(algorithm, err.into(), elapsed, timeout);
    }
    let Some(tour) = output.tour else {
        return failed(FailureKind::Protocol, "solver reported no tour".to_string());
    };
    match cities.verify_tour(&tour) {
        Ok(distance) => AlgorithmResult::completed(algorithm, tour, distance, elapsed, timeout),
        Err(e) => failed(FailureKind::Protocol, format!("invalid tour: {}", e)),
    }
}

fn describe_exit(status: &ExitStatus) -> String {
    if let Some(code) = status.code() {
        return format!("exited with code {}", code);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return format!("killed by signal {}", signal);
        }
    }
    "terminated abnormally".to_string()
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    if text.len() <= STDERR_TAIL_BYTES {
        return text.to_string();
    }
    let mut cut = text.len() - STDERR_TAIL_BYTES;
    while !text.is_char_boundary(cut) {
        cut += 1;
    }
    format!("...{}", &text[cut..])
}
