pub mod application;
pub mod commands;
pub mod journal;
pub mod package;
pub mod runtime;

/// Test utilities for cross-platform path handling.
#[cfg(test)]
pub mod test_utils {
    use crate::runtime::MockRuntime;
    use std::path::PathBuf;

    /// Returns the test project directory path based on the platform.
    /// - Unix: `/home/user/app`
    /// - Windows: `C:\Users\user\app`
    pub fn test_project() -> PathBuf {
        #[cfg(not(windows))]
        {
            PathBuf::from("/home/user/app")
        }
        #[cfg(windows)]
        {
            PathBuf::from(r"C:\Users\user\app")
        }
    }

    /// Configure a mock runtime with common defaults for tests.
    /// - current_dir set to [`test_project`]
    pub fn configure_mock_runtime_basics(runtime: &mut MockRuntime) {
        runtime.expect_current_dir().returning(|| Ok(test_project()));
    }
}
