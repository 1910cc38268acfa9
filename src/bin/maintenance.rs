use std::env;

use anyhow::{Context, Result};

use appeal_bot::{
    bootstrap::{self, sync_managers},
    config::AppConfig,
    replies::{status_label, topic_label},
    store::{AppealFilter, AppealStore},
};

const USAGE: &str = "Usage: maintenance <sync-managers|open-appeals>";

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let mut args = env::args().skip(1);
    match args.next().as_deref() {
        Some("sync-managers") => run_sync_managers().await?,
        Some("open-appeals") => list_open_appeals().await?,
        Some(cmd) => {
            eprintln!("Unknown command: {cmd}\n{USAGE}");
            std::process::exit(1);
        }
        None => {
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    }

    Ok(())
}

async fn run_sync_managers() -> Result<()> {
    let config = AppConfig::from_env()?;
    let store = bootstrap::connect(&config).await?;
    let inserted = sync_managers(store.as_ref(), &config.managers)
        .await
        .context("failed to sync managers")?;
    let managers = store
        .list_managers()
        .await
        .context("failed to load managers")?;

    println!("Inserted {inserted} managers, {} in total.", managers.len());
    for manager in managers {
        println!(
            "#{} vk_id={} {} ({})",
            manager.id,
            manager.vk_id,
            manager.name,
            topic_label(manager.topic)
        );
    }
    Ok(())
}

async fn list_open_appeals() -> Result<()> {
    let config = AppConfig::from_env()?;
    let store = bootstrap::connect(&config).await?;

    let appeals = store
        .list_appeals(AppealFilter::unresolved())
        .await
        .context("failed to load appeals")?;

    if appeals.is_empty() {
        println!("No open appeals.");
        return Ok(());
    }

    for appeal in appeals {
        let manager = appeal
            .manager_id
            .map(|id| format!("manager #{id}"))
            .unwrap_or_else(|| "unassigned".to_string());
        println!(
            "#{} [{}] {} student={} {} created {}: {}",
            appeal.id,
            status_label(appeal.status),
            topic_label(appeal.topic),
            appeal.student_id,
            manager,
            appeal.created_at.format("%Y-%m-%d %H:%M"),
            appeal.text
        );
    }
    Ok(())
}
