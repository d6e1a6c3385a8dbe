mod attendance;
mod config_cmd;
mod dashboard;
mod gyms;
mod login;
mod logout;
mod memberships;
mod notices;
mod signup;
mod whoami;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

pub use login::LoginCommand;
pub use signup::SignupCommand;

use crate::api::ApiClient;
use crate::config::Config;

#[derive(Parser)]
#[command(name = "gymhub")]
#[command(about = "Find gyms, manage memberships and track attendance from the terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to configuration file
    #[arg(long, global = true, env = "GYMHUB_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in to GymHub
    Login(LoginCommand),

    /// Create an account and log in
    Signup(SignupCommand),

    /// Log out and forget stored tokens
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Browse gyms and join one
    #[command(subcommand)]
    Gyms(GymsSubcommands),

    /// List your memberships
    Memberships {
        /// Only show memberships with this status
        #[arg(short, long)]
        status: Option<String>,
    },

    /// Check in and see streaks
    #[command(subcommand)]
    Attendance(AttendanceSubcommands),

    /// Show notices from your gyms
    Notices,

    /// Show dashboard statistics
    Dashboard,

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigSubcommands),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum GymsSubcommands {
    /// List approved gyms
    List {
        /// Filter by city (matched against the address)
        #[arg(short, long)]
        city: Option<String>,
    },

    /// Show a gym's membership plans
    Plans {
        /// Gym ID
        gym: Uuid,
    },

    /// Request a membership on one of a gym's plans
    Join {
        /// Gym ID
        gym: Uuid,

        /// Plan ID
        plan: Uuid,
    },
}

#[derive(Subcommand)]
enum AttendanceSubcommands {
    /// Check in for today
    Mark {
        /// Gym ID
        gym: Uuid,
    },

    /// Show your attendance statistics
    Stats {
        /// Gym ID
        gym: Uuid,
    },

    /// Show the gym's top attenders
    Leaderboard {
        /// Gym ID
        gym: Uuid,
    },
}

#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Show current configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let path = self.config.as_deref();

        match self.command {
            Commands::Login(cmd) => cmd.execute(path).await,
            Commands::Signup(cmd) => cmd.execute(path).await,
            Commands::Logout => logout::logout(path).await,
            Commands::Whoami => whoami::whoami(path).await,
            Commands::Gyms(subcmd) => match subcmd {
                GymsSubcommands::List { city } => gyms::list_gyms(path, city.as_deref()).await,
                GymsSubcommands::Plans { gym } => gyms::show_plans(path, gym).await,
                GymsSubcommands::Join { gym, plan } => gyms::join_gym(path, gym, plan).await,
            },
            Commands::Memberships { status } => {
                memberships::list_memberships(path, status.as_deref()).await
            }
            Commands::Attendance(subcmd) => match subcmd {
                AttendanceSubcommands::Mark { gym } => attendance::mark(path, gym).await,
                AttendanceSubcommands::Stats { gym } => attendance::stats(path, gym).await,
                AttendanceSubcommands::Leaderboard { gym } => {
                    attendance::leaderboard(path, gym).await
                }
            },
            Commands::Notices => notices::list_notices(path).await,
            Commands::Dashboard => dashboard::show_dashboard(path).await,
            Commands::Config(subcmd) => match subcmd {
                ConfigSubcommands::Show => config_cmd::show_config(path),
                ConfigSubcommands::Init { force } => config_cmd::init_config(path, force),
            },
            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(())
            }
        }
    }
}

/// Client for commands that need a logged-in user
fn authenticated_client(path: Option<&std::path::Path>) -> Result<ApiClient> {
    let config = Config::load(path)?;
    if !config.is_authenticated() {
        anyhow::bail!("You are not logged in. Use 'gymhub login' to authenticate.");
    }
    ApiClient::new(config)
}

fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_attendance_mark() {
        let gym = Uuid::new_v4();
        let cli = Cli::try_parse_from(["gymhub", "attendance", "mark", &gym.to_string()]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Attendance(AttendanceSubcommands::Mark { gym: parsed }) if parsed == gym
        ));
    }

    #[test]
    fn test_rejects_malformed_gym_id() {
        assert!(Cli::try_parse_from(["gymhub", "gyms", "plans", "not-a-uuid"]).is_err());
    }
}
