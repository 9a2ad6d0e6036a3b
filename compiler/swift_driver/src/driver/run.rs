//! The run dispatcher.
//!
//! Given planned jobs, the first matching special mode wins: the
//! `-driver-print-*` family renders and returns, a lone job may run in the
//! driver's place, and everything else goes to the executor as a workload.

use rustc_hash::FxHashMap;
use swift_options::OptId;
use tracing::debug;

use crate::driver::Driver;
use crate::error::DriverError;
use crate::execution::{ExecutionPolicy, Job, JobKind, Workload};

impl Driver {
    /// Execute (or print) the planned jobs. Returns the process exit code.
    pub fn run(&mut self, jobs: Vec<Job>) -> Result<i32, DriverError> {
        if self.parsed_options.has_argument(&[OptId::Verbose]) {
            eprintln!("{}", self.version_banner());
        }

        if self.parsed_options.has_argument(&[OptId::DriverPrintJobs]) {
            for job in &jobs {
                println!("{}", self.executor.description(job));
            }
            return Ok(0);
        }

        if self
            .parsed_options
            .has_argument(&[OptId::DriverPrintOutputFileMap])
        {
            match &self.output_file_map {
                Some(map) => {
                    print!("{}", map.dump());
                    return Ok(0);
                }
                None => {
                    self.diagnostics.error("no output file map specified");
                    return Ok(1);
                }
            }
        }

        if self
            .parsed_options
            .has_argument(&[OptId::DriverPrintBindings])
        {
            for job in &jobs {
                println!("{}", self.binding_line(job));
            }
            return Ok(0);
        }

        if self
            .parsed_options
            .has_argument(&[OptId::DriverPrintActions])
        {
            print!("{}", render_actions(&jobs));
            return Ok(0);
        }

        if self
            .parsed_options
            .has_argument(&[OptId::DriverPrintGraphviz])
        {
            print!("{}", render_graphviz(&jobs));
            return Ok(0);
        }

        let parseable_output = self.parsed_options.has_argument(&[OptId::ParseableOutput]);
        let show_job_lifecycle = self
            .parsed_options
            .has_argument(&[OptId::DriverShowJobLifecycle]);

        let exit_code = if let Some(job) = self.in_place_job(&jobs, parseable_output) {
            if job.kind == JobKind::VersionRequest {
                println!("{}", self.version_banner());
            }
            debug!(kind = %job.kind, "executing in place");
            self.executor.execute(&job, &self.env)?
        } else {
            let workload = Workload {
                jobs,
                incremental_state: self.incremental_state.clone(),
            };
            let policy = ExecutionPolicy {
                num_parallel_jobs: self.num_parallel_jobs,
                continue_building_after_errors: self.continue_building_after_errors,
                force_response_files: self.force_response_files,
                parseable_output,
                show_job_lifecycle,
            };
            self.executor.execute_workload(&workload, &policy, &self.env)?
        };

        self.write_build_record()?;

        if self
            .parsed_options
            .has_argument(&[OptId::DriverWarnUnusedOptions])
        {
            for option in self.parsed_options.unconsumed() {
                self.diagnostics
                    .warning(format!("option '{}' is unused", option.option.spelling()));
            }
        }

        Ok(exit_code)
    }

    /// In-place execution applies when the single job demands it, or when
    /// there is exactly one job and nothing needs the outer process
    /// (no parseable output, no build record).
    fn in_place_job(&self, jobs: &[Job], parseable_output: bool) -> Option<Job> {
        let [job] = jobs else { return None };
        if job.requires_in_place_execution
            || (!parseable_output && self.build_record_path().is_none())
        {
            return Some(job.clone());
        }
        None
    }

    /// One `-driver-print-bindings` line.
    fn binding_line(&self, job: &Job) -> String {
        let inputs = job
            .inputs
            .iter()
            .map(|input| format!("\"{}\"", input.file.path_string()))
            .collect::<Vec<_>>()
            .join(", ");
        let outputs = job
            .outputs
            .iter()
            .map(|output| format!("{}: \"{}\"", output.file_type, output.file.path_string()))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "# \"{}\" - \"{}\", inputs: [{}], output: {{{}}}",
            self.target_triple,
            job.tool_basename(),
            inputs,
            outputs
        )
    }
}

/// `-driver-print-actions`: integer IDs assigned to inputs and jobs in
/// encounter order; inputs print on first sight.
fn render_actions(jobs: &[Job]) -> String {
    let mut out = String::new();
    let mut next_id = 0usize;
    let mut input_ids: FxHashMap<String, usize> = FxHashMap::default();
    let mut output_producers: FxHashMap<String, usize> = FxHashMap::default();

    for job in jobs {
        let mut referenced: Vec<usize> = Vec::new();
        for input in &job.inputs {
            let key = input.file.path_string();
            if let Some(producer) = output_producers.get(&key) {
                referenced.push(*producer);
                continue;
            }
            let id = *input_ids.entry(key.clone()).or_insert_with(|| {
                let id = next_id;
                next_id += 1;
                out.push_str(&format!(
                    "{id}: input, \"{key}\", {}\n",
                    input.file_type
                ));
                id
            });
            referenced.push(id);
        }

        let job_id = next_id;
        next_id += 1;
        for output in &job.outputs {
            output_producers.insert(output.file.path_string(), job_id);
        }
        let out_type = job
            .outputs
            .first()
            .map(|o| o.file_type.name())
            .unwrap_or("none");
        let refs = referenced
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!("{job_id}: {}, {{{refs}}}, {out_type}\n", job.kind));
    }
    out
}

/// `-driver-print-graphviz`: the job graph as DOT.
fn render_graphviz(jobs: &[Job]) -> String {
    let mut out = String::from("digraph Jobs {\n");
    let node_name = |index: usize, job: &Job| format!("\"{} {}\"", job.kind, index);

    let mut producers: FxHashMap<String, String> = FxHashMap::default();
    for (index, job) in jobs.iter().enumerate() {
        for output in &job.outputs {
            producers.insert(output.file.path_string(), node_name(index, job));
        }
    }
    for (index, job) in jobs.iter().enumerate() {
        let node = node_name(index, job);
        out.push_str(&format!("  {node};\n"));
        for input in &job.inputs {
            let key = input.file.path_string();
            match producers.get(&key) {
                Some(producer) if *producer != node => {
                    out.push_str(&format!("  {producer} -> {node};\n"));
                }
                Some(_) => {}
                None => {
                    out.push_str(&format!("  \"{key}\" -> {node};\n"));
                }
            }
        }
    }
    out.push_str("}\n");
    out
}
