//! `wellspring`: command-line client for the Wellspring tracker.
//!
//! # Usage
//!
//! ```
//! wellspring --uid alice mood happy
//! wellspring --uid alice journal "Long walk, early night."
//! wellspring --uid alice habits "walk = yes, read = no"
//! wellspring --config ~/.config/wellspring/config.toml dashboard
//! ```

mod client;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use wellspring_core::{
  category::Category,
  entry::{EntryValue, SortOrder},
  tracker::AlertEvaluation,
};

/// Moods fed to a mood reflection when no text is given.
const REFLECT_MOOD_WINDOW: usize = 7;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "wellspring", about = "Command-line client for the Wellspring tracker")]
struct Args {
  /// Path to a TOML config file (url, uid).
  #[arg(short, long, value_name = "FILE")]
  config: Option<std::path::PathBuf>,

  /// Base URL of the wellspring server (default: http://localhost:8080).
  #[arg(long, env = "WELLSPRING_URL")]
  url: Option<String>,

  /// Owner identifier sent with every request.
  #[arg(long, env = "WELLSPRING_UID")]
  uid: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Record today's mood.
  Mood { mood: String },
  /// Record today's journal entry.
  Journal {
    #[arg(required = true, num_args = 1..)]
    text: Vec<String>,
  },
  /// Record today's habit checklist, e.g. "walk = yes, read = no".
  Habits { checklist: String },
  /// List past entries for a category.
  History {
    category: Category,
    /// Oldest first.
    #[arg(long, conflicts_with = "desc")]
    asc:      bool,
    /// Newest first.
    #[arg(long)]
    desc:     bool,
  },
  /// Show the current streak for a category.
  Streak { category: Category },
  /// Show today's summary.
  Dashboard,
  /// Show the mood distribution.
  Distribution {
    /// Only the most recent N moods.
    #[arg(long)]
    window: Option<usize>,
  },
  /// List alerts, newest first.
  Alerts,
  /// Run today's missing-entry check.
  Check,
  /// Mark the alert created at the given RFC 3339 timestamp as read.
  Read { created_at: DateTime<Utc> },
  /// Ask for a reflection on the given text, or on recent entries.
  Reflect {
    category: Category,
    text:     Option<String>,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url: String,
  #[serde(default)]
  uid: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:8080".to_string()),
    uid:      args
      .uid
      .or_else(|| (!file_cfg.uid.is_empty()).then(|| file_cfg.uid.clone()))
      .unwrap_or_default(),
  };
  let needs_uid = !matches!(args.command, Command::Reflect { text: Some(_), .. });
  if needs_uid && api_config.uid.trim().is_empty() {
    bail!("no uid given; pass --uid or set WELLSPRING_UID");
  }

  let client = ApiClient::new(api_config)?;
  run(&client, args.command).await
}

async fn run(client: &ApiClient, command: Command) -> Result<()> {
  match command {
    Command::Mood { mood } => insert(client, Category::Mood, &mood).await,
    Command::Journal { text } => insert(client, Category::Journal, &text.join(" ")).await,
    Command::Habits { checklist } => insert(client, Category::Habit, &checklist).await,

    Command::History { category, asc, desc } => {
      let order = match (asc, desc) {
        (true, _) => Some(SortOrder::Asc),
        (_, true) => Some(SortOrder::Desc),
        _ => None,
      };
      for entry in client.history(category, order).await? {
        println!(
          "{}  {}",
          entry.created_at.format("%Y-%m-%d %H:%M"),
          entry.value.to_text()
        );
      }
      Ok(())
    }

    Command::Streak { category } => {
      let streak = client.streak(category).await?;
      println!("{category}: {streak} day(s)");
      Ok(())
    }

    Command::Dashboard => {
      let d = client.dashboard().await?;
      println!("Today        {}", d.today);
      println!(
        "Last mood    {}",
        d.last_mood.map_or_else(|| "-".to_string(), |m| m.to_string())
      );
      println!("Journal      {}", if d.journal_today { "written" } else { "not yet" });
      match d.habits_today {
        Some(h) => println!("Habits       {}/{} done", h.done, h.total),
        None => println!("Habits       not yet"),
      }
      println!(
        "Streaks      mood {}, journal {}, habit {}",
        d.streaks.mood, d.streaks.journal, d.streaks.habit
      );
      Ok(())
    }

    Command::Distribution { window } => {
      match client.distribution(window).await? {
        Some(dist) => {
          for (mood, pct) in dist {
            println!("{mood:<10} {pct:>6.2}%");
          }
        }
        None => println!("Not enough mood entries yet."),
      }
      Ok(())
    }

    Command::Alerts => {
      for alert in client.alerts().await? {
        let marker = if alert.is_unread() { "*" } else { " " };
        println!(
          "{marker} {}  {}",
          alert.created_at.to_rfc3339(),
          alert.message
        );
      }
      Ok(())
    }

    Command::Check => {
      match client.evaluate().await? {
        AlertEvaluation::AlreadyAlerted => println!("Already reminded today."),
        AlertEvaluation::AllPresent => println!("All entries in for today."),
        AlertEvaluation::Alerted { alert } => println!("{}", alert.message),
      }
      Ok(())
    }

    Command::Read { created_at } => {
      client.mark_read(created_at).await?;
      println!("Marked as read.");
      Ok(())
    }

    Command::Reflect { category, text } => {
      let text = match text {
        Some(t) => t,
        None => recent_text(client, category).await?,
      };
      println!("{}", client.analyze(category, &text).await?);
      Ok(())
    }
  }
}

async fn insert(client: &ApiClient, category: Category, raw: &str) -> Result<()> {
  if client.insert_entry(category, raw).await? {
    println!("Saved.");
  } else {
    println!("Already submitted today.");
  }
  Ok(())
}

/// The text a reflection is based on when none is given: the last few moods
/// space-separated, or the latest journal or checklist.
async fn recent_text(client: &ApiClient, category: Category) -> Result<String> {
  let entries = client.history(category, Some(SortOrder::Desc)).await?;
  let text = match category {
    Category::Mood => {
      let mut moods: Vec<String> = entries
        .iter()
        .take(REFLECT_MOOD_WINDOW)
        .filter_map(|e| match e.value {
          EntryValue::Mood(m) => Some(m.to_string()),
          _ => None,
        })
        .collect();
      moods.reverse();
      moods.join(" ")
    }
    Category::Journal | Category::Habit => entries
      .first()
      .map(|e| e.value.to_text())
      .unwrap_or_default(),
  };
  if text.is_empty() {
    bail!("no {category} entries to reflect on");
  }
  Ok(text)
}
