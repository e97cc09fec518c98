//! Binary entrypoint for the Soulbound CLI.
//!
//! Commands:
//! - `init` - write a starter `soulbound.toml`
//! - `status` - signed-in user, ledger and quest summary
//! - `quests [--id <n>]`, `toggle --quest <n> --task <n>` - quest log
//! - `wish [--ten]`, `inventory`, `achievements` - collection views
//! - `inbox`, `read --message <n>` - messages
//! - `login`, `signup`, `logout` - account
//! - `reset`, `export`, `import`, `publish` - account reset and admin tools
//!
//! `--offline` swaps the remote service for a local JSON state file.
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use soulbound::config::Config;
use soulbound::journey::achievement::{evaluate_achievements, format_achievement, quest_stats};
use soulbound::journey::currency::format_ledger;
use soulbound::journey::inbox::format_inbox;
use soulbound::journey::inventory::format_inventory_compact;
use soulbound::journey::quest::{format_quest_list, format_quest_status};
use soulbound::journey::reward::format_quantity;
use soulbound::journey::wish::format_stars;
use soulbound::journey::{AppMode, ExportBundle, JourneyState, WishKind};
use soulbound::logutil::redact_email;
use soulbound::metrics;
use soulbound::remote::{
    AuthProvider, HttpAuthProvider, HttpRemoteStore, MemoryRemoteStore, RemoteStore,
    StaticAuthProvider,
};
use soulbound::sync::{AutoSave, AutoSaveHandle, BootOutcome, Bootstrap, LoadedJourney};

#[derive(Parser)]
#[command(name = "soulbound")]
#[command(about = "A narrative-gated quest journal with cloud-synced progress")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "soulbound.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Keep all data in a local state file instead of the remote service
    #[arg(long, global = true)]
    offline: bool,

    /// State file used with --offline
    #[arg(long, default_value = ".soulbound-offline.json", global = true)]
    offline_file: String,

    /// Account used with --offline
    #[arg(long, default_value = "traveler@localhost", global = true)]
    offline_user: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,
    /// Show the signed-in traveler, currencies and quest summary
    Status,
    /// List quests, or show one quest in detail
    Quests {
        #[arg(long)]
        id: Option<u32>,
    },
    /// Toggle a task; completing the last task pays out the quest rewards
    Toggle {
        #[arg(short, long)]
        quest: u32,
        #[arg(short, long)]
        task: u32,
    },
    /// Make a wish (cosmetic; the first wish unlocks a quest)
    Wish {
        /// Ten pulls instead of one
        #[arg(long)]
        ten: bool,
    },
    /// List messages
    Inbox {
        /// Mark every message read
        #[arg(long)]
        mark_all: bool,
    },
    /// Open a message
    Read {
        #[arg(short, long)]
        message: u32,
        /// Delete the message after showing it
        #[arg(long)]
        delete: bool,
    },
    /// Evaluate achievements
    Achievements,
    /// Show the inventory
    Inventory,
    /// Sign in
    Login {
        #[arg(short, long)]
        email: String,
    },
    /// Create an account and sign in
    Signup {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        username: Option<String>,
    },
    /// Sign out and forget the cached session
    Logout,
    /// Reset this account to the default quests, inventory and currencies
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Export quests, inventory, narratives and messages as JSON (admin)
    Export {
        #[arg(short, long)]
        out: String,
    },
    /// Import a JSON bundle written by `export` (admin)
    Import {
        #[arg(short, long)]
        file: String,
    },
    /// Publish the current quests, inventory and narratives as global templates (admin)
    Publish,
}

/// Remote collaborators for this run.
struct Backend {
    store: Arc<dyn RemoteStore>,
    auth: Arc<dyn AuthProvider>,
    offline: Option<(Arc<MemoryRemoteStore>, PathBuf)>,
}

impl Backend {
    async fn open(cli: &Cli, config: &Config) -> Result<Self> {
        if !cli.offline {
            return Ok(Self {
                store: Arc::new(HttpRemoteStore::new(&config.service)),
                auth: Arc::new(HttpAuthProvider::new(&config.auth, &config.service)),
                offline: None,
            });
        }

        let path = PathBuf::from(&cli.offline_file);
        let memory = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => MemoryRemoteStore::restore(&raw)
                .map_err(|e| anyhow!("Failed to read offline state {}: {}", path.display(), e))?,
            Err(_) => MemoryRemoteStore::new(),
        };
        let memory = Arc::new(memory);
        let auth = StaticAuthProvider::new(config.auth.admin_emails.clone());
        auth.sign_in(&cli.offline_user, "")
            .await
            .map_err(|e| anyhow!("Offline sign-in failed: {}", e))?;
        info!("offline mode: {}", path.display());
        Ok(Self {
            store: memory.clone(),
            auth: Arc::new(auth),
            offline: Some((memory, path)),
        })
    }

    async fn persist_offline(&self) -> Result<()> {
        if let Some((memory, path)) = &self.offline {
            let raw = memory
                .dump()
                .map_err(|e| anyhow!("Failed to serialize offline state: {}", e))?;
            tokio::fs::write(path, raw)
                .await
                .map_err(|e| anyhow!("Failed to write offline state {}: {}", path.display(), e))?;
        }
        Ok(())
    }
}

/// A loaded journey with auto-save attached.
struct Open {
    journey: LoadedJourney,
    saver: AutoSaveHandle,
}

async fn open_journey(backend: &Backend, config: &Config) -> Result<Open> {
    let boot = Bootstrap::new(
        backend.auth.clone(),
        backend.store.clone(),
        config.currencies.clone(),
    );
    let mut journey = match boot.initialize().await {
        BootOutcome::Ready(loaded) => *loaded,
        BootOutcome::Unauthenticated => {
            return Err(anyhow!("Not signed in. Run `soulbound login --email <address>` first."))
        }
    };
    if journey.state.progress_saves_held() {
        println!("(saved progress could not be loaded; changes in this session will not be saved)");
    } else if journey.sources.global_fetch_failed {
        println!("(service unreachable; showing built-in content)");
    }

    let events = journey.state.subscribe();
    let saver = AutoSave::spawn(
        backend.store.clone(),
        Arc::new(journey.session.clone()),
        &config.autosave,
        events,
    );

    if journey.state.mode() == AppMode::Cutscene {
        println!("{}\n", journey.state.narratives().prologue);
        journey.state.finish_prologue()?;
    }
    Ok(Open { journey, saver })
}

impl Open {
    fn state(&mut self) -> &mut JourneyState {
        &mut self.journey.state
    }

    fn enter_public(&mut self) -> Result<()> {
        if self.state().mode() == AppMode::Selection {
            self.state().enter_public()?;
        }
        Ok(())
    }

    fn enter_admin(&mut self) -> Result<()> {
        if self.state().mode() != AppMode::Admin {
            self.state().enter_admin()?;
        }
        Ok(())
    }

    async fn close(self) {
        self.saver.shutdown().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Init = cli.command {
        init_logging(&None, cli.verbose);
        if Path::new(&cli.config).exists() {
            return Err(anyhow!("{} already exists", cli.config));
        }
        Config::create_default(&cli.config).await?;
        println!("Wrote {}", cli.config);
        return Ok(());
    }

    let config = Config::load_or_default(&cli.config).await?;
    init_logging(&Some(config.clone()), cli.verbose);
    let backend = Backend::open(&cli, &config).await?;

    let result = run(&cli, &config, &backend).await;
    backend.persist_offline().await?;
    result
}

async fn run(cli: &Cli, config: &Config, backend: &Backend) -> Result<()> {
    match &cli.command {
        Commands::Init => Ok(()),
        Commands::Login { email } => {
            let password = rpassword::prompt_password("Password: ")?;
            let session = backend
                .auth
                .sign_in(email, &password)
                .await
                .map_err(|e| anyhow!("Sign-in failed: {}", e))?;
            println!("Welcome back, {} ({})", session.username, session.role.name());
            Ok(())
        }
        Commands::Signup { email, username } => {
            let password = rpassword::prompt_password("Choose a password: ")?;
            let session = backend
                .auth
                .sign_up(email, &password, username.as_deref())
                .await
                .map_err(|e| anyhow!("Sign-up failed: {}", e))?;
            println!("Account created for {}", redact_email(&session.email));
            Ok(())
        }
        Commands::Logout => {
            backend
                .auth
                .sign_out()
                .await
                .map_err(|e| anyhow!("Sign-out failed: {}", e))?;
            println!("Signed out");
            Ok(())
        }
        command => {
            let mut open = open_journey(backend, config).await?;
            let result = run_journey(command, &mut open, backend).await;
            open.close().await;
            let m = metrics::snapshot();
            info!(
                "saves: {} attempted, {} ok, {} failed, {} coalesced",
                m.saves_attempted, m.saves_succeeded, m.saves_failed, m.events_coalesced
            );
            if m.saves_failed > 0 {
                eprintln!("warning: {} background saves failed", m.saves_failed);
            }
            result
        }
    }
}

async fn run_journey(command: &Commands, open: &mut Open, backend: &Backend) -> Result<()> {
    match command {
        Commands::Status => {
            let state = &open.journey.state;
            let session = &open.journey.session;
            println!("{} ({})", session.username, session.role.name());
            println!("{}", format_ledger(state.ledger(), state.currency_names()));
            let stats = quest_stats(state.quests());
            println!(
                "Quests: {}/{} complete, average progress {}%",
                stats.completed, stats.total, stats.average_progress
            );
            if state.all_quests_complete() {
                println!("\n{}", state.narratives().epilogue);
            }
        }
        Commands::Quests { id } => {
            open.enter_public()?;
            let state = open.state();
            match id {
                Some(id) => {
                    let quest = state
                        .quest(*id)
                        .ok_or_else(|| anyhow!("No quest with id {}", id))?;
                    print!("{}", format_quest_status(quest));
                }
                None => {
                    for line in format_quest_list(state.quests()) {
                        println!("{}", line);
                    }
                }
            }
        }
        Commands::Toggle { quest, task } => {
            open.enter_public()?;
            let state = open.state();
            if state.quest(*quest).and_then(|q| q.task(*task)).is_none() {
                return Err(anyhow!("No task {} in quest {}", task, quest));
            }
            let reports = state.toggle_task(*quest, *task);
            if let Some(q) = state.quest(*quest) {
                println!("{}: {}%", q.title, q.progress);
            }
            let names = state.currency_names().clone();
            for report in reports {
                println!("Quest complete! Rewards:");
                for (kind, amount, total) in &report.currency {
                    println!(
                        "  +{} {} (now {})",
                        format_quantity(*amount),
                        names.name_of(*kind),
                        format_quantity(*total)
                    );
                }
                println!("  {} inventory updates", report.items.len());
            }
        }
        Commands::Wish { ten } => {
            open.enter_public()?;
            let kind = if *ten { WishKind::Ten } else { WishKind::Single };
            let outcome = open.state().make_wish(kind, &mut rand::thread_rng());
            println!("Wish ({} Primogems): {}", kind.price(), format_stars(&outcome.stars));
            if let Some(quest) = outcome.unlocked {
                println!("New quest unlocked: {}", quest.title);
            }
        }
        Commands::Inbox { mark_all } => {
            open.enter_public()?;
            if *mark_all {
                let changed = open.state().mark_all_read();
                println!("Marked {} messages read", changed);
            }
            for line in format_inbox(open.state().messages()) {
                println!("{}", line);
            }
        }
        Commands::Read { message, delete } => {
            open.enter_public()?;
            let m = open.state().open_message(*message)?;
            println!("{}\nFrom {} at {}\n\n{}", m.title, m.sender, m.timestamp, m.content);
            if *delete {
                open.state().delete_message(*message)?;
                println!("(deleted)");
            }
        }
        Commands::Achievements => {
            open.enter_public()?;
            for achievement in evaluate_achievements(open.state().quests()) {
                println!("{}", format_achievement(&achievement));
            }
        }
        Commands::Inventory => {
            open.enter_public()?;
            for line in format_inventory_compact(open.state().inventory()) {
                println!("{}", line);
            }
        }
        Commands::Reset { yes } => {
            if !yes {
                return Err(anyhow!("Reset erases all progress; re-run with --yes to confirm"));
            }
            if let Err(e) = backend.store.reset_user(&open.journey.session).await {
                warn!("remote reset failed: {}", e);
            }
            open.state().factory_reset();
            println!("Journey reset to defaults");
        }
        Commands::Export { out } => {
            open.enter_admin()?;
            let json = open.state().export_bundle().to_json()?;
            tokio::fs::write(out, json)
                .await
                .map_err(|e| anyhow!("Failed to write {}: {}", out, e))?;
            println!("Exported to {}", out);
        }
        Commands::Import { file } => {
            open.enter_admin()?;
            let raw = tokio::fs::read_to_string(file)
                .await
                .map_err(|e| anyhow!("Failed to read {}: {}", file, e))?;
            let bundle = ExportBundle::from_json(&raw)?;
            open.state().import_bundle(bundle)?;
            println!("Imported {}", file);
        }
        Commands::Publish => {
            open.enter_admin()?;
            let session = open.journey.session.clone();
            let state = &open.journey.state;
            let templates = state.template_snapshot();
            backend
                .store
                .save_global_quests(&session, &templates.quests)
                .await
                .map_err(|e| anyhow!("Publishing quests failed: {}", e))?;
            backend
                .store
                .save_global_inventory(&session, &templates.inventory)
                .await
                .map_err(|e| anyhow!("Publishing inventory failed: {}", e))?;
            backend
                .store
                .save_narratives(&session, state.narratives())
                .await
                .map_err(|e| anyhow!("Publishing narratives failed: {}", e))?;
            println!(
                "Published {} quests and {} items",
                templates.quests.len(),
                templates.inventory.len()
            );
        }
        Commands::Init | Commands::Login { .. } | Commands::Signup { .. } | Commands::Logout => {}
    }
    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .and_then(|c| c.logging.level.parse().ok())
            .unwrap_or(log::LevelFilter::Warn),
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let file = config
        .as_ref()
        .and_then(|c| c.logging.file.as_ref())
        .and_then(|path| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
        });

    match file {
        Some(f) => {
            let sink = std::sync::Mutex::new(f);
            // echo to the terminal only when a user is watching stderr
            let is_tty = atty::is(atty::Stream::Stderr);
            builder.format(move |fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                let line = format!("{} [{}] {}", ts, record.level(), record.args());
                if let Ok(mut guard) = sink.lock() {
                    let _ = writeln!(guard, "{}", line);
                }
                if is_tty {
                    writeln!(fmt, "{}", line)
                } else {
                    Ok(())
                }
            });
        }
        None => {
            builder.format(|fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
            });
        }
    }
    let _ = builder.try_init();
}
