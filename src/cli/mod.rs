//! CLI module - Command-line interface for AITMUS
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// AITMUS - Facility monitoring dashboard
/// Live facility status, event log and sign-up approval
#[derive(Parser)]
#[command(name = "aitmus")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    #[command(alias = "daemon", alias = "-d")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Create an approved super administrator, or promote an existing account
    CreateAdmin {
        /// Login email
        email: String,
        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Manage monitored facilities
    Facility {
        #[command(subcommand)]
        command: FacilityCommands,
    },

    /// Review sign-up requests
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
pub enum FacilityCommands {
    /// Register a facility
    Add {
        /// Display name
        #[arg(long)]
        name: String,
        /// Street address
        #[arg(long, default_value = "")]
        address: String,
        /// Latitude
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Longitude
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
    },
    /// List facilities and their status
    #[command(alias = "ls")]
    List,
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// List pending sign-ups
    #[command(alias = "ls")]
    Pending,
    /// Approve a pending sign-up and assign it to a facility
    Approve {
        /// Profile ID
        id: i32,
        /// Facility to assign
        #[arg(long)]
        facility: Option<i32>,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Reject a pending sign-up
    Reject {
        /// Profile ID
        id: i32,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

pub use commands::*;
