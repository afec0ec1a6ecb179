use std::thread;
use std::time::Duration;

pub const DEFAULT_SIMULATED_STEPS: &[&str] = &[
    "Analyzing memory bank context...",
    "Reading specifications from specs.md...",
    "Generating code for the active task...",
    "Running unit tests...",
    "Tests passed. Updating project_flow.mmd...",
];

/// Progress lines from a remote run, in the order they happen.
pub type ExecutionLog = Box<dyn Iterator<Item = String> + Send>;

/// Downstream agent that carries out an approved instruction.
pub trait RemoteExecutor {
    fn execute(&self, instruction: &str) -> ExecutionLog;
}

/// Stand-in for the remote agent: emits canned progress lines and touches nothing.
#[derive(Debug, Clone)]
pub struct SimulatedRemoteExecutor {
    steps: Vec<String>,
    step_delay: Duration,
}

impl SimulatedRemoteExecutor {
    pub fn new(step_delay: Duration) -> Self {
        Self {
            steps: DEFAULT_SIMULATED_STEPS
                .iter()
                .map(|step| step.to_string())
                .collect(),
            step_delay,
        }
    }

    pub fn with_steps(steps: Vec<String>, step_delay: Duration) -> Self {
        Self { steps, step_delay }
    }
}

impl RemoteExecutor for SimulatedRemoteExecutor {
    fn execute(&self, _instruction: &str) -> ExecutionLog {
        let delay = self.step_delay;
        let header = std::iter::once("> Sending request to remote agent...".to_string());
        let steps = self.steps.clone().into_iter().map(move |step| {
            if !delay.is_zero() {
                thread::sleep(delay);
            }
            format!("[Remote] {step}")
        });
        let footer = std::iter::once("[Remote] Task completed.".to_string());
        Box::new(header.chain(steps).chain(footer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_run_reports_each_step_between_header_and_footer() {
        let executor = SimulatedRemoteExecutor::with_steps(
            vec!["Compiling".to_string(), "Testing".to_string()],
            Duration::ZERO,
        );
        let lines = executor.execute("do it").collect::<Vec<_>>();
        assert_eq!(
            lines,
            vec![
                "> Sending request to remote agent...",
                "[Remote] Compiling",
                "[Remote] Testing",
                "[Remote] Task completed.",
            ]
        );
    }

    #[test]
    fn default_steps_are_used() {
        let lines = SimulatedRemoteExecutor::new(Duration::ZERO)
            .execute("x")
            .count();
        assert_eq!(lines, DEFAULT_SIMULATED_STEPS.len() + 2);
    }
}
