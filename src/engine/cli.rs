//! Fleetdesk CLI Module
//! Command-line interface for inspecting and editing role permissions

pub mod formatter;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fleetdesk")]
#[command(author = "Fleetdesk Team")]
#[command(version)]
#[command(about = "Role permission matrix for the fleet back-office", long_about = None)]
pub struct Cli {
    /// Project directory holding fleetdesk.config.json (defaults to current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Output format (json for scripting)
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Start from a role table JSON file instead of the built-in defaults
    #[arg(long, global = true)]
    pub table: Option<PathBuf>,

    /// Grant a permission for this session (ROLE:MODULE:ACTION)
    #[arg(long, global = true, value_name = "ROLE:MODULE:ACTION")]
    pub grant: Vec<String>,

    /// Revoke a permission for this session (ROLE:MODULE:ACTION)
    #[arg(long, global = true, value_name = "ROLE:MODULE:ACTION")]
    pub revoke: Vec<String>,

    /// Reset a role to its built-in permissions, after grants and revokes
    #[arg(long, global = true, value_name = "ROLE")]
    pub reset: Vec<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List roles
    Roles,

    /// Show the permission grid of a role
    Matrix {
        /// Role name (defaults to the configured selected role)
        role: Option<String>,
    },

    /// Check a single permission
    Check {
        role: String,
        module: String,
        action: String,
    },

    /// Show what a role can do, module by module
    Effective {
        /// Role name (defaults to the configured form role)
        role: Option<String>,
    },

    /// List users from a JSON file with their effective permissions
    Users {
        /// JSON array of users
        #[arg(long)]
        file: PathBuf,

        /// Search text matched against name, email, phone and id
        #[arg(short, long, default_value = "")]
        query: String,

        /// Only users with this role
        #[arg(short, long)]
        role: Option<String>,

        /// Only active users
        #[arg(long)]
        active: bool,
    },
}

impl Cli {
    pub fn get_project_dir(&self) -> PathBuf {
        self.project
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }
}
