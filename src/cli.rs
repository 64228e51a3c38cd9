//! CLI interface for the probe binary.

use crate::api::{GroupDefaultsEntry, MessageQuery, StatsUpdate};
use crate::client::StoreClient;
use crate::config::ProbeConfig;
use crate::error::ConfigError;
use crate::scenario::ProbeSuite;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mqprobe")]
#[command(about = "HTTP probe for a priority message store")]
#[command(version)]
pub struct Cli {
    /// Store host, overrides the config file
    #[arg(long)]
    pub host: Option<String>,
    /// Store port, overrides the config file
    #[arg(short, long)]
    pub port: Option<u16>,
    /// JSON config file with host/port
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn resolve_base_url(&self) -> Result<String, ConfigError> {
        let config = match &self.config {
            Some(path) => ProbeConfig::open(path)?,
            None => ProbeConfig::default(),
        };
        Ok(config
            .with_overrides(self.host.clone(), self.port)
            .base_url())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full probe scenario suite
    Suite,
    #[command(subcommand)]
    Msg(MsgCommands),
    #[command(subcommand)]
    Group(GroupCommands),
    #[command(subcommand)]
    Defaults(DefaultsCommands),
    #[command(subcommand)]
    Stats(StatsCommands),
    /// Print the store-wide report
    Store,
}

#[derive(Subcommand)]
pub enum MsgCommands {
    /// Store a message
    Add { priority: i32, msg: String },
    /// Fetch one message
    Get {
        #[arg(long)]
        uuid: Option<String>,
        #[arg(long)]
        priority: Option<i32>,
        #[arg(long)]
        reverse: bool,
    },
    /// Move a message to a new priority
    Mv { uuid: String, priority: i32 },
    /// Remove a message
    Rm { uuid: String },
}

#[derive(Subcommand)]
pub enum GroupCommands {
    Report {
        #[arg(long)]
        priority: Option<i32>,
        #[arg(long)]
        include_msg_data: bool,
    },
    /// Remove every message in a priority group
    Clear { priority: i32 },
}

#[derive(Subcommand)]
pub enum DefaultsCommands {
    Get {
        #[arg(long)]
        priority: Option<i32>,
    },
    Set {
        priority: i32,
        #[arg(long)]
        max_byte_size: Option<u64>,
    },
    Rm { priority: i32 },
}

#[derive(Subcommand)]
pub enum StatsCommands {
    Get,
    Set {
        #[arg(long)]
        inserted: Option<u64>,
        #[arg(long)]
        deleted: Option<u64>,
        #[arg(long)]
        pruned: Option<u64>,
    },
    /// Zero the counters, printing their previous values
    Reset,
}

/// Dispatches one CLI command. Returns false when the command failed, so
/// the caller can exit non-zero.
pub async fn handle_cli_command(client: &StoreClient, command: Commands) -> bool {
    match command {
        Commands::Suite => handle_suite_command(client).await,
        Commands::Msg(msg_cmd) => handle_msg_command(client, msg_cmd).await,
        Commands::Group(group_cmd) => handle_group_command(client, group_cmd).await,
        Commands::Defaults(defaults_cmd) => handle_defaults_command(client, defaults_cmd).await,
        Commands::Stats(stats_cmd) => handle_stats_command(client, stats_cmd).await,
        Commands::Store => handle_store_command(client).await,
    }
}

async fn handle_suite_command(client: &StoreClient) -> bool {
    let report = ProbeSuite::new(client.clone()).run().await;
    println!("{report}");
    report.passed()
}

async fn handle_msg_command(client: &StoreClient, msg_cmd: MsgCommands) -> bool {
    match msg_cmd {
        MsgCommands::Add { priority, msg } => match client.add_message(priority, &msg).await {
            Ok(uuid) => {
                println!("Stored message at priority {priority} with uuid: {uuid}");
                true
            }
            Err(e) => {
                println!("Failed to store message: {e}");
                false
            }
        },
        MsgCommands::Get {
            uuid,
            priority,
            reverse,
        } => {
            let query = MessageQuery {
                uuid,
                priority,
                reverse: if reverse { Some(true) } else { None },
            };
            match client.get_message(&query).await {
                Ok(Some(message)) => {
                    println!("{} {}", message.uuid, message.msg);
                    true
                }
                Ok(None) => {
                    println!("No message found");
                    true
                }
                Err(e) => {
                    println!("Failed to fetch message: {e}");
                    false
                }
            }
        }
        MsgCommands::Mv { uuid, priority } => {
            match client.reprioritize_message(&uuid, priority).await {
                Ok(()) => {
                    println!("Moved message {uuid} to priority {priority}");
                    true
                }
                Err(e) => {
                    println!("Failed to move message {uuid}: {e}");
                    false
                }
            }
        }
        MsgCommands::Rm { uuid } => match client.delete_message(&uuid).await {
            Ok(()) => {
                println!("Removed message {uuid}");
                true
            }
            Err(e) => {
                println!("Failed to remove message {uuid}: {e}");
                false
            }
        },
    }
}

async fn handle_group_command(client: &StoreClient, group_cmd: GroupCommands) -> bool {
    match group_cmd {
        GroupCommands::Report {
            priority: Some(priority),
            include_msg_data,
        } => match client.group_report(priority, include_msg_data).await {
            Ok(Some(report)) => {
                print_group_report(&report);
                true
            }
            Ok(None) => {
                println!("No group at priority {priority}");
                true
            }
            Err(e) => {
                println!("Failed to fetch group report: {e}");
                false
            }
        },
        GroupCommands::Report {
            priority: None,
            include_msg_data,
        } => match client.group_reports(include_msg_data).await {
            Ok(reports) => {
                if reports.is_empty() {
                    println!("No groups");
                } else {
                    println!("Groups ({}):", reports.len());
                    for report in &reports {
                        print_group_report(report);
                    }
                }
                true
            }
            Err(e) => {
                println!("Failed to fetch group reports: {e}");
                false
            }
        },
        GroupCommands::Clear { priority } => match client.clear_group(priority).await {
            Ok(()) => {
                println!("Cleared group at priority {priority}");
                true
            }
            Err(e) => {
                println!("Failed to clear group at priority {priority}: {e}");
                false
            }
        },
    }
}

fn print_group_report(report: &crate::api::GroupReport) {
    print!(
        "priority {} [{} msgs, {} bytes",
        report.priority, report.msg_count, report.byte_size
    );
    if let Some(max) = report.max_byte_size {
        print!(", max {max}");
    }
    println!("]");
    for message in &report.messages {
        println!("  {} ({} bytes)", message.uuid, message.byte_size);
    }
}

async fn handle_defaults_command(client: &StoreClient, defaults_cmd: DefaultsCommands) -> bool {
    match defaults_cmd {
        DefaultsCommands::Get { priority } => match client.group_defaults(priority).await {
            Ok(entries) => {
                if entries.is_empty() {
                    println!("No group defaults");
                } else {
                    for entry in &entries {
                        match entry.max_byte_size {
                            Some(max) => println!("priority {}: max {} bytes", entry.priority, max),
                            None => println!("priority {}: no limit", entry.priority),
                        }
                    }
                }
                true
            }
            Err(e) => {
                println!("Failed to fetch group defaults: {e}");
                false
            }
        },
        DefaultsCommands::Set {
            priority,
            max_byte_size,
        } => {
            let entry = GroupDefaultsEntry {
                priority,
                max_byte_size,
            };
            match client.set_group_defaults(&entry).await {
                Ok(()) => {
                    println!("Set defaults for priority {priority}");
                    true
                }
                Err(e) => {
                    println!("Failed to set defaults for priority {priority}: {e}");
                    false
                }
            }
        }
        DefaultsCommands::Rm { priority } => match client.delete_group_defaults(priority).await {
            Ok(()) => {
                println!("Removed defaults for priority {priority}");
                true
            }
            Err(e) => {
                println!("Failed to remove defaults for priority {priority}: {e}");
                false
            }
        },
    }
}

async fn handle_stats_command(client: &StoreClient, stats_cmd: StatsCommands) -> bool {
    match stats_cmd {
        StatsCommands::Get => match client.stats().await {
            Ok(stats) => {
                println!(
                    "inserted: {}, deleted: {}, pruned: {}",
                    stats.inserted, stats.deleted, stats.pruned
                );
                true
            }
            Err(e) => {
                println!("Failed to fetch stats: {e}");
                false
            }
        },
        StatsCommands::Set {
            inserted,
            deleted,
            pruned,
        } => {
            let update = StatsUpdate {
                inserted,
                deleted,
                pruned,
            };
            match client.update_stats(&update).await {
                Ok(()) => {
                    println!("Updated stats");
                    true
                }
                Err(e) => {
                    println!("Failed to update stats: {e}");
                    false
                }
            }
        }
        StatsCommands::Reset => match client.reset_stats().await {
            Ok(stats) => {
                println!(
                    "Reset stats (was inserted: {}, deleted: {}, pruned: {})",
                    stats.inserted, stats.deleted, stats.pruned
                );
                true
            }
            Err(e) => {
                println!("Failed to reset stats: {e}");
                false
            }
        },
    }
}

async fn handle_store_command(client: &StoreClient) -> bool {
    match client.store_report().await {
        Ok(report) => {
            print!("{} msgs in {} groups, {} bytes", report.msg_count, report.group_count, report.byte_size);
            match report.max_byte_size {
                Some(max) => println!(" (max {max})"),
                None => println!(),
            }
            for group in &report.groups {
                println!(
                    "  priority {}: {} msgs, {} bytes",
                    group.priority, group.msg_count, group.byte_size
                );
            }
            true
        }
        Err(e) => {
            println!("Failed to fetch store report: {e}");
            false
        }
    }
}
