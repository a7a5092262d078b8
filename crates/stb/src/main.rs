//! stb — operator console for the support ticket bot.
//!
//! Edits the deployment's persisted configuration document directly; the
//! in-chat admin surface (`stb_core::admin`) is what platform actors go
//! through. The document path comes from `--config` or `STB_CONFIG_FILE`,
//! defaulting to `ticket_config.json` in the working directory.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use stb_core::{
    config::GlobalConfig,
    domain::{ChannelId, RoleId, UserId},
    store::{ConfigStore, JsonFileStore},
};

#[derive(Parser, Debug)]
#[command(name = "stb")]
#[command(version, about = "Operator console for the support ticket bot")]
struct Args {
    /// Path of the persisted configuration document
    #[arg(long, env = "STB_CONFIG_FILE", default_value = "ticket_config.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show settings, the ticket counter and all tracked tickets
    Status,
    /// Set the category new ticket channels are created under
    SetCategory { category: u64 },
    /// Set the audit/log destination channel
    SetLogChannel { channel: u64 },
    /// Set the verification role
    SetVerifyRole { role: u64 },
    /// Manage the configured admin roles
    AdminRole {
        #[command(subcommand)]
        action: AdminRoleAction,
    },
    /// Manage the per-user authorization whitelist
    Whitelist {
        #[command(subcommand)]
        action: WhitelistAction,
    },
}

#[derive(Subcommand, Debug)]
enum AdminRoleAction {
    Add { role: u64 },
    Remove { role: u64 },
    List,
}

#[derive(Subcommand, Debug)]
enum WhitelistAction {
    Add { user: u64 },
    Remove { user: u64 },
}

fn main() -> Result<()> {
    stb_core::logging::init("stb")?;
    let args = Args::parse();

    let store = JsonFileStore::new(&args.config);
    let mut cfg = store.load()?;

    match args.command {
        Command::Status => {
            print_status(&cfg);
            return Ok(());
        }
        Command::SetCategory { category } => {
            cfg.ticket_category_id = Some(ChannelId(category));
            println!("ticket category set to {category}");
        }
        Command::SetLogChannel { channel } => {
            cfg.log_channel_id = Some(ChannelId(channel));
            println!("log channel set to {channel}");
        }
        Command::SetVerifyRole { role } => {
            cfg.verify_role_id = Some(RoleId(role));
            println!("verify role set to {role}");
        }
        Command::AdminRole { action } => match action {
            AdminRoleAction::Add { role } => {
                if cfg.admin_role_ids.insert(RoleId(role)) {
                    println!("role {role} added to admin roles");
                } else {
                    println!("role {role} is already an admin role");
                }
            }
            AdminRoleAction::Remove { role } => {
                if cfg.admin_role_ids.remove(&RoleId(role)) {
                    println!("role {role} removed from admin roles");
                } else {
                    println!("role {role} is not an admin role");
                }
            }
            AdminRoleAction::List => {
                if cfg.admin_role_ids.is_empty() {
                    println!("no admin roles configured");
                } else {
                    for role in &cfg.admin_role_ids {
                        println!("{}", role.0);
                    }
                }
                return Ok(());
            }
        },
        Command::Whitelist { action } => match action {
            WhitelistAction::Add { user } => {
                if cfg.whitelist_user_ids.insert(UserId(user)) {
                    println!("user {user} added to the whitelist");
                } else {
                    println!("user {user} is already whitelisted");
                }
            }
            WhitelistAction::Remove { user } => {
                if cfg.whitelist_user_ids.remove(&UserId(user)) {
                    println!("user {user} removed from the whitelist");
                } else {
                    println!("user {user} is not on the whitelist");
                }
            }
        },
    }

    store.save(&cfg)?;
    Ok(())
}

fn print_status(cfg: &GlobalConfig) {
    let fmt_channel = |c: Option<ChannelId>| {
        c.map(|c| c.0.to_string()).unwrap_or_else(|| "unset".into())
    };
    println!("ticket counter:  {}", cfg.ticket_count);
    println!("ticket category: {}", fmt_channel(cfg.ticket_category_id));
    println!("log channel:     {}", fmt_channel(cfg.log_channel_id));
    println!(
        "verify role:     {}",
        cfg.verify_role_id
            .map(|r| r.0.to_string())
            .unwrap_or_else(|| "unset".into())
    );
    println!("admin roles:     {}", cfg.admin_role_ids.len());
    println!("whitelist:       {}", cfg.whitelist_user_ids.len());
    println!("tickets:         {}", cfg.tickets.len());
    for (channel, t) in &cfg.tickets {
        println!(
            "  #{} channel={} owner={} state={:?} created={}",
            t.number,
            channel.0,
            t.owner_id.0,
            t.state,
            t.created_at.to_rfc3339()
        );
    }
}
