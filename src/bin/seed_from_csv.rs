use anyhow::{bail, Context, Result};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};

use school_scheduler::app::{get_default_db_path, AppState};
use school_scheduler::importer::CsvSeedLoader;
use school_scheduler::logging;

// 用法: seed_from_csv <data_dir> [db_path] [--reset]
fn main() -> Result<()> {
    logging::init();

    let mut positional = Vec::new();
    let mut reset = false;
    for arg in std::env::args().skip(1) {
        if arg == "--reset" {
            reset = true;
        } else {
            positional.push(arg);
        }
    }

    let data_dir = match positional.first() {
        Some(dir) => PathBuf::from(dir),
        None => bail!("用法: seed_from_csv <data_dir> [db_path] [--reset]"),
    };
    let db_path = positional
        .get(1)
        .cloned()
        .unwrap_or_else(get_default_db_path);

    if reset {
        backup_and_reset_db(&db_path)?;
    }

    let state = AppState::new(db_path.clone())
        .map_err(anyhow::Error::msg)
        .context("初始化数据库失败")?;

    let loader = CsvSeedLoader::new(state.repos.clone());
    let report = loader
        .load_dir(&data_dir)
        .with_context(|| format!("加载目录失败: {}", data_dir.display()))?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    eprintln!("Seeded {} from {}", db_path, data_dir.display());
    Ok(())
}

fn backup_and_reset_db(db_path: &str) -> Result<()> {
    let path = Path::new(db_path);
    if !path.exists() {
        return Ok(());
    }

    let ts = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup_path = format!("{}.bak.{}", db_path, ts);
    fs::copy(path, &backup_path)?;
    fs::remove_file(path)?;

    eprintln!("Backed up {} -> {}", db_path, backup_path);
    Ok(())
}
