//! Shared command-line arguments for operations that can wait
//!
//! Flatten [`WaitArgs`] into any clap command that triggers a load or flush
//! so users get consistent `--wait` flags.

use crate::policy::TimeoutPolicy;
use clap::Args;
use std::time::Duration;

/// Common CLI arguments for async operations
#[derive(Args, Debug, Clone)]
pub struct WaitArgs {
    /// Wait for operation to complete
    #[arg(long)]
    pub wait: bool,

    /// Maximum time to wait in seconds (0 checks once)
    #[arg(long, default_value = "300", requires = "wait")]
    pub wait_timeout: u64,

    /// Polling interval in milliseconds
    #[arg(long, default_value = "500", requires = "wait")]
    pub wait_interval: u64,
}

impl WaitArgs {
    /// Policy for the client call, `None` when the user did not ask to wait
    pub fn policy(&self) -> Option<TimeoutPolicy> {
        if !self.wait {
            return None;
        }
        Some(
            TimeoutPolicy::from_secs(self.wait_timeout)
                .with_poll_interval(Duration::from_millis(self.wait_interval)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::WaitMode;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        wait: WaitArgs,
    }

    #[test]
    fn test_no_wait_means_no_policy() {
        let cli = TestCli::try_parse_from(["test"]).unwrap();
        assert!(cli.wait.policy().is_none());
    }

    #[test]
    fn test_wait_defaults() {
        let cli = TestCli::try_parse_from(["test", "--wait"]).unwrap();
        let policy = cli.wait.policy().unwrap();
        assert_eq!(policy.mode(), WaitMode::Bounded(Duration::from_secs(300)));
        assert_eq!(policy.poll_interval(), Duration::from_millis(500));
    }

    #[test]
    fn test_wait_overrides() {
        let cli = TestCli::try_parse_from([
            "test",
            "--wait",
            "--wait-timeout",
            "10",
            "--wait-interval",
            "100",
        ])
        .unwrap();
        let policy = cli.wait.policy().unwrap();
        assert_eq!(policy.budget(), Duration::from_secs(10));
        assert_eq!(policy.poll_interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_zero_timeout_checks_once() {
        let cli = TestCli::try_parse_from(["test", "--wait", "--wait-timeout", "0"]).unwrap();
        assert!(cli.wait.policy().unwrap().is_instant());
    }

    #[test]
    fn test_timeout_requires_wait() {
        assert!(TestCli::try_parse_from(["test", "--wait-timeout", "10"]).is_err());
    }
}
