//! `firecheck` - CLI and web server for the brigade checklists.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use serde::de::DeserializeOwned;

use firecheck::checklist::{MaintenanceRequest, PostJobRequest, SubmissionKind};
use firecheck::cli::{
    AdminsCommand, Cli, Command, ConfigCommand, ImportCommand, ServeCommand, SubmitCommand,
};
use firecheck::reference::{by_display_name, ReferenceKind};
use firecheck::{init_logging, Config, Outcome, Station};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    let config_path = cli.config.clone();
    let station = || -> anyhow::Result<Station> {
        let config =
            Config::load_from(config_path.clone()).context("failed to load configuration")?;
        Ok(Station::new(config))
    };

    // Execute the command
    match cli.command {
        Command::Serve(serve_cmd) => handle_serve(station()?, &serve_cmd),
        Command::Crew(list) => handle_crew(&station()?, list.json),
        Command::Equipment(list) => handle_equipment(&station()?, list.json),
        Command::Tasks(list) => handle_tasks(&station()?, list.json),
        Command::Admins(admins_cmd) => handle_admins(&station()?, admins_cmd),
        Command::Import(import_cmd) => handle_import(&station()?, &import_cmd),
        Command::Submit(submit_cmd) => handle_submit(&station()?, &submit_cmd),
        Command::Config(config_cmd) => handle_config(cli.config, config_cmd),
    }
}

fn handle_serve(station: Station, cmd: &ServeCommand) -> anyhow::Result<()> {
    let addr = match cmd.bind {
        Some(addr) => addr,
        None => station.config().bind_addr()?,
    };
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(firecheck::server::serve(station, addr))?;
    Ok(())
}

fn handle_equipment(station: &Station, json: bool) -> anyhow::Result<()> {
    let equipment = station.equipment()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&equipment)?);
    } else {
        for (appliance, items) in &equipment {
            println!("{appliance}");
            for item in items {
                println!("  {item}");
            }
        }
    }
    Ok(())
}

fn handle_tasks(station: &Station, json: bool) -> anyhow::Result<()> {
    let tasks = station.tasks()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
    } else {
        for (appliance, records) in &tasks {
            println!("{appliance}");
            for record in records {
                println!("  {:<40} {:<20} {}", record.task, record.area, record.training);
            }
        }
    }
    Ok(())
}

fn handle_crew(station: &Station, json: bool) -> anyhow::Result<()> {
    let crew = station.crew()?;
    if json {
        let members: Vec<_> = by_display_name(&crew);
        println!("{}", serde_json::to_string_pretty(&members)?);
    } else {
        println!("{:<30} {:<24} PASSWORD", "NAME", "USERNAME");
        for member in by_display_name(&crew) {
            println!(
                "{:<30} {:<24} {}",
                member.name, member.username, member.password
            );
        }
        println!();
        println!(
            "Users export: {}",
            station.users_export_path().display()
        );
    }
    Ok(())
}

fn handle_admins(station: &Station, cmd: AdminsCommand) -> anyhow::Result<()> {
    let admins = match cmd {
        AdminsCommand::List => station.admins()?,
        AdminsCommand::Set { users } => station.save_admins(&users)?,
    };
    for admin in &admins {
        println!("{admin}");
    }
    Ok(())
}

fn handle_import(station: &Station, cmd: &ImportCommand) -> anyhow::Result<()> {
    let kind = ReferenceKind::from(cmd.kind);
    let content = std::fs::read(&cmd.file)
        .with_context(|| format!("failed to read {}", cmd.file.display()))?;
    let path = station.replace_reference(kind, &content)?;
    println!("Replaced {kind} list: {}", path.display());
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("invalid submission in {}", path.display()))
}

fn handle_submit(station: &Station, cmd: &SubmitCommand) -> anyhow::Result<()> {
    let outcome = match SubmissionKind::from(cmd.kind) {
        SubmissionKind::PostJob => {
            let request: PostJobRequest = read_json(&cmd.file)?;
            station.submit_post_job(&request)?
        }
        SubmissionKind::Maintenance => {
            let request: MaintenanceRequest = read_json(&cmd.file)?;
            station.submit_maintenance(&request)?
        }
    };

    match outcome {
        Outcome::Persisted(receipt) => {
            println!(
                "Checklist saved: {} ({} rows)",
                receipt.path.display(),
                receipt.rows
            );
            Ok(())
        }
        Outcome::Rejected(rejection) => bail!("checklist rejected: {rejection}"),
    }
}

fn handle_config(
    config_path: Option<PathBuf>,
    cmd: ConfigCommand,
) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = Config::load_from(config_path).context("failed to load configuration")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                print_config(&config);
            }
        }
        ConfigCommand::Path => {
            println!(
                "{}",
                config_path
                    .unwrap_or_else(Config::default_config_path)
                    .display()
            );
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => bail!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

fn print_config(config: &Config) {
    println!("Current Configuration");
    println!("=====================");
    println!();
    println!("[Storage]");
    println!("  Data directory:     {}", config.data_dir().display());
    println!("  Crew list:          {}", config.storage.crew_file);
    println!("  Equipment list:     {}", config.storage.equipment_file);
    println!("  Maintenance tasks:  {}", config.storage.maintenance_file);
    println!("  Admin list:         {}", config.storage.admin_file);
    println!("  Submissions:        {}", config.storage.submissions_dir);
    println!();
    println!("[Checklist]");
    println!("  Appliances:         {}", config.checklist.appliances.join(", "));
    println!(
        "  Post-job statuses:  {}",
        config.checklist.post_job_statuses.join(", ")
    );
    println!(
        "  Maintenance:        {}",
        config.checklist.maintenance_statuses.join(", ")
    );
    println!();
    println!("[Access]");
    println!("  Default admin:      {}", config.access.default_admin);
    println!();
    println!("[Server]");
    println!("  Bind:               {}", config.server.bind);
    println!("  App name:           {}", config.server.app_name);
    println!("  Session lifetime:   {}s", config.server.session_ttl_secs);
    if let Some(dir) = &config.server.static_dir {
        println!("  Static files:       {}", dir.display());
    }
}
