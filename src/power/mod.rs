//! System sleep inhibition.
//!
//! While a break overlay is shown, the daemon holds a single "stay awake"
//! assertion so the machine cannot idle-sleep mid-break. The assertion is
//! acquired on entering break mode and released on every exit from it,
//! including forced and abnormal exits; leaking it would keep the machine
//! awake indefinitely, which makes the matched acquire/release pairing the
//! most safety-critical invariant in the daemon.
//!
//! The macOS implementation keeps a `caffeinate(8)` child process alive
//! for the duration of the assertion; killing the child releases it. A
//! counting mock backs the leak tests.

pub mod error;

pub use error::PowerError;

use std::path::Path;
use std::process::{Child, Command, Stdio};

use tracing::{debug, warn};

/// Path to the caffeinate helper.
const CAFFEINATE_PATH: &str = "/usr/bin/caffeinate";

// ============================================================================
// SleepInhibitor
// ============================================================================

/// Holds at most one system sleep assertion.
///
/// Both operations are idempotent: acquiring while held and releasing
/// while not held are defined no-ops, never errors.
pub trait SleepInhibitor {
    /// Acquires the assertion. No-op if already held.
    fn acquire(&mut self) -> Result<(), PowerError>;

    /// Releases the assertion. No-op if not held.
    fn release(&mut self);

    /// Returns true if the assertion is currently held.
    fn is_held(&self) -> bool;
}

// ============================================================================
// CaffeinateInhibitor
// ============================================================================

/// Sleep inhibitor that keeps a `caffeinate -d -i` child process alive
/// while the assertion is held.
#[derive(Debug, Default)]
pub struct CaffeinateInhibitor {
    /// Live helper process, present exactly while the assertion is held
    child: Option<Child>,
}

impl CaffeinateInhibitor {
    /// Creates an inhibitor with no assertion held.
    pub fn new() -> Self {
        Self { child: None }
    }

    /// Returns true if the caffeinate helper exists on this system.
    #[must_use]
    pub fn helper_exists() -> bool {
        Path::new(CAFFEINATE_PATH).exists()
    }
}

impl SleepInhibitor for CaffeinateInhibitor {
    fn acquire(&mut self) -> Result<(), PowerError> {
        if self.child.is_some() {
            debug!("スリープ抑制は既に有効です");
            return Ok(());
        }

        if !Self::helper_exists() {
            return Err(PowerError::HelperNotFound(CAFFEINATE_PATH.to_string()));
        }

        // -d prevents display sleep, -i prevents idle system sleep.
        let child = Command::new(CAFFEINATE_PATH)
            .args(["-d", "-i"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| PowerError::AcquireFailed(e.to_string()))?;

        debug!(pid = child.id(), "スリープ抑制を開始しました");
        self.child = Some(child);
        Ok(())
    }

    fn release(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                warn!("スリープ抑制の解除に失敗しました: {}", e);
            }
            // Reap the child so it does not linger as a zombie
            let _ = child.wait();
            debug!("スリープ抑制を解除しました");
        }
    }

    fn is_held(&self) -> bool {
        self.child.is_some()
    }
}

impl Drop for CaffeinateInhibitor {
    fn drop(&mut self) {
        self.release();
    }
}

// ============================================================================
// MockSleepInhibitor
// ============================================================================

/// Shared counters of a [`MockSleepInhibitor`], for assertions after the
/// mock has been moved into the state machine.
#[derive(Debug, Clone, Default)]
pub struct MockInhibitorProbe {
    state: std::sync::Arc<std::sync::Mutex<MockInhibitorState>>,
}

#[derive(Debug, Default)]
struct MockInhibitorState {
    held: bool,
    acquire_count: u32,
    release_count: u32,
    fail_acquire: bool,
}

impl MockInhibitorProbe {
    /// Returns true if the assertion is currently held.
    pub fn is_held(&self) -> bool {
        self.state.lock().unwrap().held
    }

    /// Number of effective (non-redundant) acquires.
    pub fn acquire_count(&self) -> u32 {
        self.state.lock().unwrap().acquire_count
    }

    /// Number of effective (non-redundant) releases.
    pub fn release_count(&self) -> u32 {
        self.state.lock().unwrap().release_count
    }

    /// Makes subsequent acquires fail.
    pub fn set_fail_acquire(&self, fail: bool) {
        self.state.lock().unwrap().fail_acquire = fail;
    }
}

/// Counting inhibitor used by tests.
#[derive(Debug, Default)]
pub struct MockSleepInhibitor {
    state: std::sync::Arc<std::sync::Mutex<MockInhibitorState>>,
}

impl MockSleepInhibitor {
    /// Creates a mock inhibitor and a probe sharing its counters.
    pub fn new() -> (Self, MockInhibitorProbe) {
        let mock = Self::default();
        let probe = MockInhibitorProbe {
            state: std::sync::Arc::clone(&mock.state),
        };
        (mock, probe)
    }
}

impl SleepInhibitor for MockSleepInhibitor {
    fn acquire(&mut self) -> Result<(), PowerError> {
        let mut state = self.state.lock().unwrap();
        if state.held {
            return Ok(());
        }
        if state.fail_acquire {
            return Err(PowerError::AcquireFailed("mock failure".to_string()));
        }
        state.held = true;
        state.acquire_count += 1;
        Ok(())
    }

    fn release(&mut self) {
        let mut state = self.state.lock().unwrap();
        if state.held {
            state.held = false;
            state.release_count += 1;
        }
    }

    fn is_held(&self) -> bool {
        self.state.lock().unwrap().held
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_acquire_release_pairing() {
        let (mut mock, probe) = MockSleepInhibitor::new();

        assert!(!mock.is_held());
        mock.acquire().unwrap();
        assert!(mock.is_held());
        assert_eq!(probe.acquire_count(), 1);

        mock.release();
        assert!(!mock.is_held());
        assert_eq!(probe.release_count(), 1);
    }

    #[test]
    fn test_mock_acquire_is_idempotent() {
        let (mut mock, probe) = MockSleepInhibitor::new();

        mock.acquire().unwrap();
        mock.acquire().unwrap();
        mock.acquire().unwrap();

        // Redundant acquires are no-ops, not stacked assertions
        assert_eq!(probe.acquire_count(), 1);
    }

    #[test]
    fn test_mock_release_is_idempotent() {
        let (mut mock, probe) = MockSleepInhibitor::new();

        mock.release();
        assert_eq!(probe.release_count(), 0);

        mock.acquire().unwrap();
        mock.release();
        mock.release();
        assert_eq!(probe.release_count(), 1);
    }

    #[test]
    fn test_mock_acquire_failure() {
        let (mut mock, probe) = MockSleepInhibitor::new();
        probe.set_fail_acquire(true);

        assert!(mock.acquire().is_err());
        assert!(!mock.is_held());
    }

    #[test]
    fn test_caffeinate_inhibitor_starts_unheld() {
        let inhibitor = CaffeinateInhibitor::new();
        assert!(!inhibitor.is_held());
    }

    #[test]
    fn test_caffeinate_release_when_unheld_is_noop() {
        let mut inhibitor = CaffeinateInhibitor::new();
        inhibitor.release();
        assert!(!inhibitor.is_held());
    }

    #[test]
    fn test_caffeinate_acquire_without_helper() {
        // On systems without /usr/bin/caffeinate the acquire must fail
        // cleanly instead of panicking.
        let mut inhibitor = CaffeinateInhibitor::new();
        if !CaffeinateInhibitor::helper_exists() {
            assert!(matches!(
                inhibitor.acquire(),
                Err(PowerError::HelperNotFound(_))
            ));
            assert!(!inhibitor.is_held());
        }
    }
}
