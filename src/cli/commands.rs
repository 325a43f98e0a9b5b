//! Command definitions for the PomoLock CLI.
//!
//! Uses clap derive macro for argument parsing.

use clap::{Args, Parser, Subcommand};

// ============================================================================
// CLI Structure
// ============================================================================

/// PomoLock - a break-enforcing work timer for macOS
#[derive(Parser, Debug)]
#[command(
    name = "pomolock",
    version,
    about = "macOS専用の休憩強制タイマーCLI",
    long_about = "作業タイマーが切れると全ディスプレイを休憩オーバーレイで覆い、\n\
                  休憩中はシステムスリープを抑止するタイマー。\n\
                  メニューバーの残り時間表示と通知に対応しています。",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start (or resume) the work countdown
    Start,

    /// Pause the countdown
    Pause,

    /// Stop the countdown and reset it to the full duration
    Stop,

    /// Reset the countdown to the full duration of the current mode
    Reset,

    /// Start a break immediately (overlays + sleep inhibition)
    Break,

    /// Dismiss the break overlay
    Dismiss(DismissArgs),

    /// Update daemon settings
    Set(SetArgs),

    /// Show current timer status
    Status,

    /// Run the daemon (state machine, overlays, menu bar, IPC server)
    Daemon,

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Dismiss Command Arguments
// ============================================================================

/// Arguments for the dismiss command
#[derive(Args, Debug, Clone, Default)]
pub struct DismissArgs {
    /// Immediately start a new work cycle after dismissing
    #[arg(long)]
    pub start_new: bool,
}

// ============================================================================
// Set Command Arguments
// ============================================================================

/// Arguments for the set command
#[derive(Args, Debug, Clone, Default)]
pub struct SetArgs {
    /// Work duration in minutes (1-120)
    #[arg(
        short,
        long,
        value_parser = clap::value_parser!(u32).range(1..=120)
    )]
    pub work: Option<u32>,

    /// Break duration in minutes (1-60)
    #[arg(
        short,
        long = "break",
        value_parser = clap::value_parser!(u32).range(1..=60)
    )]
    pub break_time: Option<u32>,

    /// Automatically return to work when the break countdown ends
    #[arg(long, value_name = "BOOL")]
    pub auto_end_break: Option<bool>,

    /// Show the countdown in the menu bar
    #[arg(long, value_name = "BOOL")]
    pub show_indicator: Option<bool>,
}

impl SetArgs {
    /// Returns true if no setting was given.
    pub fn is_empty(&self) -> bool {
        self.work.is_none()
            && self.break_time.is_none()
            && self.auto_end_break.is_none()
            && self.show_indicator.is_none()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // Cli Tests
    // ------------------------------------------------------------------------

    mod cli_tests {
        use super::*;

        #[test]
        fn test_parse_no_args() {
            let cli = Cli::parse_from(["pomolock"]);
            assert!(cli.command.is_none());
            assert!(!cli.verbose);
        }

        #[test]
        fn test_parse_verbose_flag() {
            let cli = Cli::parse_from(["pomolock", "--verbose"]);
            assert!(cli.verbose);
        }

        #[test]
        fn test_parse_short_verbose_flag() {
            let cli = Cli::parse_from(["pomolock", "-v"]);
            assert!(cli.verbose);
        }

        #[test]
        fn test_parse_start_command() {
            let cli = Cli::parse_from(["pomolock", "start"]);
            assert!(matches!(cli.command, Some(Commands::Start)));
        }

        #[test]
        fn test_parse_pause_command() {
            let cli = Cli::parse_from(["pomolock", "pause"]);
            assert!(matches!(cli.command, Some(Commands::Pause)));
        }

        #[test]
        fn test_parse_stop_command() {
            let cli = Cli::parse_from(["pomolock", "stop"]);
            assert!(matches!(cli.command, Some(Commands::Stop)));
        }

        #[test]
        fn test_parse_reset_command() {
            let cli = Cli::parse_from(["pomolock", "reset"]);
            assert!(matches!(cli.command, Some(Commands::Reset)));
        }

        #[test]
        fn test_parse_break_command() {
            let cli = Cli::parse_from(["pomolock", "break"]);
            assert!(matches!(cli.command, Some(Commands::Break)));
        }

        #[test]
        fn test_parse_status_command() {
            let cli = Cli::parse_from(["pomolock", "status"]);
            assert!(matches!(cli.command, Some(Commands::Status)));
        }

        #[test]
        fn test_parse_daemon_command() {
            let cli = Cli::parse_from(["pomolock", "daemon"]);
            assert!(matches!(cli.command, Some(Commands::Daemon)));
        }

        #[test]
        fn test_parse_completions_bash() {
            let cli = Cli::parse_from(["pomolock", "completions", "bash"]);
            match cli.command {
                Some(Commands::Completions { shell }) => {
                    assert_eq!(shell, clap_complete::Shell::Bash);
                }
                _ => panic!("Expected Completions command"),
            }
        }

        #[test]
        fn test_parse_completions_zsh() {
            let cli = Cli::parse_from(["pomolock", "completions", "zsh"]);
            match cli.command {
                Some(Commands::Completions { shell }) => {
                    assert_eq!(shell, clap_complete::Shell::Zsh);
                }
                _ => panic!("Expected Completions command"),
            }
        }
    }

    // ------------------------------------------------------------------------
    // Dismiss Command Tests
    // ------------------------------------------------------------------------

    mod dismiss_args_tests {
        use super::*;

        #[test]
        fn test_parse_dismiss_defaults() {
            let cli = Cli::parse_from(["pomolock", "dismiss"]);
            match cli.command {
                Some(Commands::Dismiss(args)) => {
                    assert!(!args.start_new);
                }
                _ => panic!("Expected Dismiss command"),
            }
        }

        #[test]
        fn test_parse_dismiss_start_new() {
            let cli = Cli::parse_from(["pomolock", "dismiss", "--start-new"]);
            match cli.command {
                Some(Commands::Dismiss(args)) => {
                    assert!(args.start_new);
                }
                _ => panic!("Expected Dismiss command"),
            }
        }
    }

    // ------------------------------------------------------------------------
    // Set Command Tests
    // ------------------------------------------------------------------------

    mod set_args_tests {
        use super::*;

        #[test]
        fn test_parse_set_defaults() {
            let cli = Cli::parse_from(["pomolock", "set"]);
            match cli.command {
                Some(Commands::Set(args)) => {
                    assert!(args.is_empty());
                }
                _ => panic!("Expected Set command"),
            }
        }

        #[test]
        fn test_parse_set_work() {
            let cli = Cli::parse_from(["pomolock", "set", "--work", "30"]);
            match cli.command {
                Some(Commands::Set(args)) => {
                    assert_eq!(args.work, Some(30));
                    assert!(args.break_time.is_none());
                }
                _ => panic!("Expected Set command"),
            }
        }

        #[test]
        fn test_parse_set_work_short() {
            let cli = Cli::parse_from(["pomolock", "set", "-w", "45"]);
            match cli.command {
                Some(Commands::Set(args)) => {
                    assert_eq!(args.work, Some(45));
                }
                _ => panic!("Expected Set command"),
            }
        }

        #[test]
        fn test_parse_set_break() {
            let cli = Cli::parse_from(["pomolock", "set", "--break", "10"]);
            match cli.command {
                Some(Commands::Set(args)) => {
                    assert_eq!(args.break_time, Some(10));
                }
                _ => panic!("Expected Set command"),
            }
        }

        #[test]
        fn test_parse_set_auto_end_break() {
            let cli = Cli::parse_from(["pomolock", "set", "--auto-end-break", "false"]);
            match cli.command {
                Some(Commands::Set(args)) => {
                    assert_eq!(args.auto_end_break, Some(false));
                }
                _ => panic!("Expected Set command"),
            }
        }

        #[test]
        fn test_parse_set_show_indicator() {
            let cli = Cli::parse_from(["pomolock", "set", "--show-indicator", "true"]);
            match cli.command {
                Some(Commands::Set(args)) => {
                    assert_eq!(args.show_indicator, Some(true));
                }
                _ => panic!("Expected Set command"),
            }
        }

        #[test]
        fn test_parse_set_all_options() {
            let cli = Cli::parse_from([
                "pomolock",
                "set",
                "--work",
                "50",
                "--break",
                "10",
                "--auto-end-break",
                "true",
                "--show-indicator",
                "false",
            ]);
            match cli.command {
                Some(Commands::Set(args)) => {
                    assert_eq!(args.work, Some(50));
                    assert_eq!(args.break_time, Some(10));
                    assert_eq!(args.auto_end_break, Some(true));
                    assert_eq!(args.show_indicator, Some(false));
                    assert!(!args.is_empty());
                }
                _ => panic!("Expected Set command"),
            }
        }

        #[test]
        fn test_parse_set_boundary_work() {
            let cli = Cli::parse_from(["pomolock", "set", "--work", "1"]);
            match cli.command {
                Some(Commands::Set(args)) => assert_eq!(args.work, Some(1)),
                _ => panic!("Expected Set command"),
            }

            let cli = Cli::parse_from(["pomolock", "set", "--work", "120"]);
            match cli.command {
                Some(Commands::Set(args)) => assert_eq!(args.work, Some(120)),
                _ => panic!("Expected Set command"),
            }
        }

        #[test]
        fn test_parse_set_boundary_break() {
            let cli = Cli::parse_from(["pomolock", "set", "--break", "1"]);
            match cli.command {
                Some(Commands::Set(args)) => assert_eq!(args.break_time, Some(1)),
                _ => panic!("Expected Set command"),
            }

            let cli = Cli::parse_from(["pomolock", "set", "--break", "60"]);
            match cli.command {
                Some(Commands::Set(args)) => assert_eq!(args.break_time, Some(60)),
                _ => panic!("Expected Set command"),
            }
        }
    }

    // ------------------------------------------------------------------------
    // Error Case Tests (using try_parse)
    // ------------------------------------------------------------------------

    mod error_tests {
        use super::*;

        #[test]
        fn test_parse_set_work_too_low() {
            let result = Cli::try_parse_from(["pomolock", "set", "--work", "0"]);
            assert!(result.is_err());
        }

        #[test]
        fn test_parse_set_work_too_high() {
            let result = Cli::try_parse_from(["pomolock", "set", "--work", "121"]);
            assert!(result.is_err());
        }

        #[test]
        fn test_parse_set_break_too_low() {
            let result = Cli::try_parse_from(["pomolock", "set", "--break", "0"]);
            assert!(result.is_err());
        }

        #[test]
        fn test_parse_set_break_too_high() {
            let result = Cli::try_parse_from(["pomolock", "set", "--break", "61"]);
            assert!(result.is_err());
        }

        #[test]
        fn test_parse_set_work_not_number() {
            let result = Cli::try_parse_from(["pomolock", "set", "--work", "abc"]);
            assert!(result.is_err());
        }

        #[test]
        fn test_parse_set_auto_end_break_not_bool() {
            let result = Cli::try_parse_from(["pomolock", "set", "--auto-end-break", "yes"]);
            assert!(result.is_err());
        }

        #[test]
        fn test_parse_unknown_command() {
            let result = Cli::try_parse_from(["pomolock", "unknown"]);
            assert!(result.is_err());
        }

        #[test]
        fn test_parse_completions_invalid_shell() {
            let result = Cli::try_parse_from(["pomolock", "completions", "invalid"]);
            assert!(result.is_err());
        }
    }
}
