//! Running jobs.

use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::error::DriverError;
use crate::execution::incremental::IncrementalCompilationState;
use crate::execution::job::{Job, JobKind};
use crate::virtual_path::VirtualPath;

/// Captured result of a one-shot sub-invocation.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// A job set plus the incremental decisions that go with it.
#[derive(Debug, Clone, Default)]
pub struct Workload {
    pub jobs: Vec<Job>,
    pub incremental_state: Option<IncrementalCompilationState>,
}

/// Knobs the dispatcher hands to the executor.
#[derive(Debug, Clone)]
pub struct ExecutionPolicy {
    pub num_parallel_jobs: usize,
    pub continue_building_after_errors: bool,
    pub force_response_files: bool,
    /// Emit machine-readable began/finished messages on stdout.
    pub parseable_output: bool,
    /// Emit a remark as each job is scheduled and finishes.
    pub show_job_lifecycle: bool,
}

impl Default for ExecutionPolicy {
    fn default() -> Self {
        ExecutionPolicy {
            num_parallel_jobs: 1,
            continue_building_after_errors: false,
            force_response_files: false,
            parseable_output: false,
            show_job_lifecycle: false,
        }
    }
}

/// The capability the driver core calls jobs through.
pub trait DriverExecutor {
    /// Run one job synchronously, capturing stdout/stderr. Used for the
    /// `-print-target-info` sub-invocation.
    fn execute_and_capture(
        &self,
        job: &Job,
        env: &FxHashMap<String, String>,
    ) -> Result<ProcessOutput, DriverError>;

    /// Run one job in the driver's place, inheriting stdio. Returns the
    /// child's exit code.
    fn execute(&self, job: &Job, env: &FxHashMap<String, String>) -> Result<i32, DriverError>;

    /// Run a whole workload. Returns the first failing exit code, or 0.
    fn execute_workload(
        &self,
        workload: &Workload,
        policy: &ExecutionPolicy,
        env: &FxHashMap<String, String>,
    ) -> Result<i32, DriverError>;

    /// Human-readable rendering of a job.
    fn description(&self, job: &Job) -> String {
        job.rendered_command_line()
    }
}

/// Executor that spawns real subprocesses.
///
/// Parallelism is a bounded worker loop over an index counter; jobs that
/// link run after everything else so their inputs exist. Temporary paths
/// are materialized under one temporary directory per workload.
#[derive(Debug, Default)]
pub struct SubprocessExecutor;

impl SubprocessExecutor {
    pub fn new() -> Self {
        SubprocessExecutor
    }

    fn command_for(
        job: &Job,
        env: &FxHashMap<String, String>,
        resolve: &dyn Fn(&str) -> String,
        force_response_files: bool,
    ) -> Result<(Command, Option<tempfile::NamedTempFile>), DriverError> {
        let tool = resolve(&job.tool.path_string());
        let args: Vec<String> = job.command_line.iter().map(|a| resolve(a)).collect();

        let mut command = Command::new(&tool);
        command.env_clear();
        command.envs(env);

        let mut response_file = None;
        if force_response_files {
            let mut file = tempfile::NamedTempFile::new().map_err(|e| DriverError::Io {
                path: "<response file>".to_string(),
                error: e.to_string(),
            })?;
            for arg in &args {
                writeln!(file, "{}", escape_response_token(arg)).map_err(|e| DriverError::Io {
                    path: file.path().display().to_string(),
                    error: e.to_string(),
                })?;
            }
            command.arg(format!("@{}", file.path().display()));
            response_file = Some(file);
        } else {
            command.args(&args);
        }
        Ok((command, response_file))
    }
}

/// Quote a token for a response file so the tokenizer reads it back intact.
fn escape_response_token(token: &str) -> String {
    if !token.chars().any(|c| c.is_whitespace() || c == '"' || c == '\\' || c == '\'') {
        return token.to_string();
    }
    let mut escaped = String::with_capacity(token.len() + 2);
    escaped.push('"');
    for c in token.chars() {
        if c == '"' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('"');
    escaped
}

impl DriverExecutor for SubprocessExecutor {
    fn execute_and_capture(
        &self,
        job: &Job,
        env: &FxHashMap<String, String>,
    ) -> Result<ProcessOutput, DriverError> {
        let identity = |s: &str| s.to_string();
        let (mut command, _guard) = Self::command_for(job, env, &identity, false)?;
        debug!(tool = %job.tool, "running {}", job.kind);
        let output = command
            .stdin(Stdio::null())
            .output()
            .map_err(|e| DriverError::Io {
                path: job.tool.path_string(),
                error: e.to_string(),
            })?;
        Ok(ProcessOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    fn execute(&self, job: &Job, env: &FxHashMap<String, String>) -> Result<i32, DriverError> {
        let identity = |s: &str| s.to_string();
        let (mut command, _guard) = Self::command_for(job, env, &identity, false)?;
        let status = command.status().map_err(|e| DriverError::Io {
            path: job.tool.path_string(),
            error: e.to_string(),
        })?;
        Ok(status.code().unwrap_or(-1))
    }

    fn execute_workload(
        &self,
        workload: &Workload,
        policy: &ExecutionPolicy,
        env: &FxHashMap<String, String>,
    ) -> Result<i32, DriverError> {
        let temp_dir = tempfile::tempdir().map_err(|e| DriverError::Io {
            path: "<temporary directory>".to_string(),
            error: e.to_string(),
        })?;
        let temp_root = temp_dir.path().to_path_buf();

        // Rewrite temporary paths to live under the workload's directory.
        let temp_tokens: Vec<String> = workload
            .jobs
            .iter()
            .flat_map(|job| job.inputs.iter().chain(&job.outputs))
            .filter(|typed| typed.file.is_temporary())
            .map(|typed| typed.file.path_string())
            .collect();
        let resolve = move |token: &str| -> String {
            if temp_tokens.iter().any(|t| t == token) {
                temp_root.join(token).display().to_string()
            } else {
                token.to_string()
            }
        };

        let skipped: Vec<VirtualPath> = workload
            .incremental_state
            .as_ref()
            .map(|state| state.skipped_inputs.iter().map(|t| t.file.clone()).collect())
            .unwrap_or_default();
        let runnable: Vec<&Job> = workload
            .jobs
            .iter()
            .filter(|job| {
                job.kind != JobKind::Compile
                    || !job
                        .primary_inputs
                        .iter()
                        .all(|input| skipped.contains(&input.file))
                    || job.primary_inputs.is_empty()
            })
            .collect();

        // Linking waits for every producer; everything else shares the pool.
        let (link_jobs, pool_jobs): (Vec<&Job>, Vec<&Job>) =
            runnable.into_iter().partition(|job| job.kind == JobKind::Link);

        let next = AtomicUsize::new(0);
        let stop = AtomicBool::new(false);
        let first_failure = Mutex::new(None::<i32>);
        let width = policy.num_parallel_jobs.max(1).min(pool_jobs.len().max(1));

        std::thread::scope(|scope| {
            for _ in 0..width {
                scope.spawn(|| loop {
                    if stop.load(Ordering::SeqCst) {
                        break;
                    }
                    let index = next.fetch_add(1, Ordering::SeqCst);
                    let Some(job) = pool_jobs.get(index).copied() else {
                        break;
                    };
                    match run_one(job, policy, env, &resolve) {
                        Ok(0) => {}
                        Ok(code) => {
                            let mut failure = first_failure.lock().unwrap();
                            failure.get_or_insert(code);
                            if !policy.continue_building_after_errors {
                                stop.store(true, Ordering::SeqCst);
                            }
                        }
                        Err(err) => {
                            warn!("job failed to launch: {err}");
                            let mut failure = first_failure.lock().unwrap();
                            failure.get_or_insert(-1);
                            if !policy.continue_building_after_errors {
                                stop.store(true, Ordering::SeqCst);
                            }
                        }
                    }
                });
            }
        });

        let mut exit_code = first_failure.lock().unwrap().unwrap_or(0);
        if exit_code == 0 || policy.continue_building_after_errors {
            for job in link_jobs {
                let code = run_one(job, policy, env, &resolve)?;
                if code != 0 && exit_code == 0 {
                    exit_code = code;
                }
            }
        }
        Ok(exit_code)
    }
}

fn run_one(
    job: &Job,
    policy: &ExecutionPolicy,
    env: &FxHashMap<String, String>,
    resolve: &dyn Fn(&str) -> String,
) -> Result<i32, DriverError> {
    if policy.show_job_lifecycle {
        eprintln!("remark: starting {} job", job.kind);
    }
    if policy.parseable_output {
        print_parseable_message("began", job, None);
    }
    let (mut command, _guard) =
        SubprocessExecutor::command_for(job, env, resolve, policy.force_response_files)?;
    let status = command.status().map_err(|e| DriverError::Io {
        path: job.tool.path_string(),
        error: e.to_string(),
    })?;
    let code = status.code().unwrap_or(-1);
    if policy.parseable_output {
        print_parseable_message("finished", job, Some(code));
    }
    if policy.show_job_lifecycle {
        eprintln!("remark: finished {} job (exit code {code})", job.kind);
    }
    Ok(code)
}

/// One framed JSON message per event, newline-delimited, length-prefixed
/// the way build systems expect parseable output to be.
fn print_parseable_message(name: &str, job: &Job, exit_code: Option<i32>) {
    let mut message = serde_json::json!({
        "kind": name,
        "name": job.kind.name(),
        "command": job.rendered_command_line(),
        "inputs": job.inputs.iter().map(|t| t.file.path_string()).collect::<Vec<_>>(),
        "outputs": job.outputs.iter().map(|t| t.file.path_string()).collect::<Vec<_>>(),
    });
    if let Some(code) = exit_code {
        message["exit-status"] = serde_json::json!(code);
    }
    let rendered = serde_json::to_string_pretty(&message).unwrap_or_default();
    println!("{}", rendered.len());
    println!("{rendered}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_token_escaping() {
        assert_eq!(escape_response_token("plain"), "plain");
        assert_eq!(escape_response_token("with space"), "\"with space\"");
        assert_eq!(escape_response_token("q\"uote"), "\"q\\\"uote\"");
    }

    #[test]
    fn policy_default_is_serial() {
        let policy = ExecutionPolicy::default();
        assert_eq!(policy.num_parallel_jobs, 1);
        assert!(!policy.continue_building_after_errors);
    }
}
