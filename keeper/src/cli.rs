//! Keeper CLI - subcommands over the record collections and the advisor

use std::path::PathBuf;

use advisor::{AdvisoryClient, AdvisoryState, LlmBackend};
use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use clap::{Parser, Subcommand};
use records::calculator::{self, AntSize, FeedingFrequency, VolumeUnit};
use records::{
    AntCategory, Census, Colony, ColonyLog, Expense, ExpenseCategory, FavoriteItem, FavoriteType,
    InventoryItem, LogActivity, SetupGuide, Species, ValidationError,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::session::Session;

#[derive(Debug, Parser)]
#[command(name = "keeper")]
#[command(about = "Ant-keeping records, calculators, and advice")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "keeper.yaml", env = "KEEPER_CONFIG")]
    pub config: PathBuf,

    /// Data directory (overrides config file)
    #[arg(short, long, env = "KEEPER_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Browse the species catalog
    #[command(subcommand)]
    Species(SpeciesCommands),

    /// Track colonies and their activity logs
    #[command(subcommand)]
    Colony(ColonyCommands),

    /// Record and total expenses
    #[command(subcommand)]
    Expense(ExpenseCommands),

    /// Equipment owned and needed
    #[command(subcommand)]
    Inventory(InventoryCommands),

    /// Setup guides and step progress
    #[command(subcommand)]
    Guide(GuideCommands),

    /// Saved favorites
    #[command(subcommand)]
    Favorite(FavoriteCommands),

    /// Ask the ant-keeping advisor
    Ask {
        /// Question text
        question: String,
        /// Save the answer as a favorite
        #[arg(long)]
        save: bool,
    },

    /// Material calculators
    #[command(subcommand)]
    Calc(CalcCommands),
}

#[derive(Debug, Subcommand)]
pub enum SpeciesCommands {
    /// List species
    List {
        /// Only this category
        #[arg(short, long, value_parser = parse_raw::<AntCategory>)]
        category: Option<AntCategory>,
    },
    /// Search by name, scientific name, or category
    Search { query: String },
}

#[derive(Debug, Subcommand)]
pub enum ColonyCommands {
    /// List colonies
    List,
    /// Add a colony
    Add {
        #[arg(long)]
        name: String,
        /// Species label
        #[arg(long)]
        species: String,
        /// Founding date (YYYY-MM-DD or RFC 3339); defaults to now
        #[arg(long, value_parser = parse_date)]
        founded: Option<DateTime<Utc>>,
        #[arg(long, default_value_t = 1)]
        queens: u32,
        #[arg(long, default_value_t = 0)]
        workers: u32,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Append an activity log to a colony
    Log {
        /// Colony id
        colony: Uuid,
        #[arg(short, long, value_parser = parse_raw::<LogActivity>)]
        activity: LogActivity,
        #[arg(short, long)]
        notes: String,
        /// Log date (YYYY-MM-DD or RFC 3339); defaults to now
        #[arg(long, value_parser = parse_date)]
        date: Option<DateTime<Utc>>,
    },
}

#[derive(Debug, Subcommand)]
pub enum ExpenseCommands {
    /// List expenses
    List {
        #[arg(short, long, value_parser = parse_raw::<ExpenseCategory>)]
        category: Option<ExpenseCategory>,
    },
    /// Record an expense
    Add {
        #[arg(allow_negative_numbers = true)]
        amount: f64,
        description: String,
        #[arg(short, long, default_value = "Other", value_parser = parse_raw::<ExpenseCategory>)]
        category: ExpenseCategory,
        /// Expense date (YYYY-MM-DD or RFC 3339); defaults to now
        #[arg(long, value_parser = parse_date)]
        date: Option<DateTime<Utc>>,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Show the all-time and current month totals
    Total,
}

#[derive(Debug, Subcommand)]
pub enum InventoryCommands {
    /// List inventory items
    List {
        /// Only owned items
        #[arg(long, conflicts_with = "needed")]
        owned: bool,
        /// Only items still needed
        #[arg(long)]
        needed: bool,
    },
    /// Items with a reminder in the next seven days
    Reminders,
}

#[derive(Debug, Subcommand)]
pub enum GuideCommands {
    /// List guides with their steps
    List,
    /// Mark a step complete, or incomplete with --undo
    Step {
        guide: Uuid,
        step: Uuid,
        #[arg(long)]
        undo: bool,
    },
    /// Create a templated guide for a request
    Generate { prompt: String },
}

#[derive(Debug, Subcommand)]
pub enum FavoriteCommands {
    /// List favorites
    List {
        #[arg(short = 't', long = "type", value_parser = parse_raw::<FavoriteType>)]
        kind: Option<FavoriteType>,
        /// Ten most recent only
        #[arg(long)]
        recent: bool,
    },
    /// Favorite a species or guide by id
    Add {
        #[arg(value_parser = parse_raw::<FavoriteType>)]
        kind: FavoriteType,
        reference: Uuid,
    },
    /// Remove a favorite by its own id
    Remove { id: Uuid },
    /// Remove every favorite
    Clear,
}

#[derive(Debug, Subcommand)]
pub enum CalcCommands {
    /// Split a substrate volume by percentage
    Substrate {
        /// Total volume in cups
        total: f64,
        #[arg(long, default_value_t = 50.0)]
        sand: f64,
        #[arg(long, default_value_t = 30.0)]
        clay: f64,
        #[arg(long, default_value_t = 20.0)]
        soil: f64,
        #[arg(long)]
        save: bool,
    },
    /// Enclosure volume, substrate, and water capacity
    Volume {
        length: f64,
        width: f64,
        height: f64,
        /// cm or in
        #[arg(long, default_value = "cm", value_parser = parse_raw::<VolumeUnit>)]
        unit: VolumeUnit,
        #[arg(long)]
        save: bool,
    },
    /// Feeding amounts for a colony
    Feeding {
        /// Number of workers
        colony_size: u32,
        #[arg(long, default_value = "Small", value_parser = parse_raw::<AntSize>)]
        ant_size: AntSize,
        #[arg(long, default_value = "Weekly", value_parser = parse_raw::<FeedingFrequency>)]
        frequency: FeedingFrequency,
        #[arg(long)]
        save: bool,
    },
}

/// Parse an enum from its stored raw value, e.g. `"Books & Education"`.
fn parse_raw<T: DeserializeOwned>(value: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .map_err(|_| format!("unknown value '{value}'"))
}

/// Stored raw value of an enum.
fn raw<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        _ => String::new(),
    }
}

fn parse_date(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    let day = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("expected YYYY-MM-DD or RFC 3339, got '{value}'"))?;
    day.and_hms_opt(0, 0, 0)
        .map(|midnight| Utc.from_utc_datetime(&midnight))
        .ok_or_else(|| format!("invalid date '{value}'"))
}

fn short_date(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Run one command. Returns the text to print.
///
/// Fails when a collection could not be read, or when a change could not be
/// written even though it was applied in memory.
pub async fn execute<B: LlmBackend>(
    session: &mut Session,
    advisor: &AdvisoryClient<B>,
    command: Commands,
) -> Result<String> {
    let now = Utc::now();
    let output = match command {
        Commands::Species(cmd) => species(session, cmd),
        Commands::Colony(cmd) => colony(session, cmd, now)?,
        Commands::Expense(cmd) => expense(session, cmd, now)?,
        Commands::Inventory(cmd) => inventory(session, cmd, now),
        Commands::Guide(cmd) => guide(session, cmd)?,
        Commands::Favorite(cmd) => favorite(session, cmd, now)?,
        Commands::Ask { question, save } => ask(session, advisor, &question, save, now).await?,
        Commands::Calc(cmd) => calc(session, cmd, now)?,
    };

    if let Some(error) = session.storage_errors().first() {
        bail!("Storage error: {error}");
    }
    Ok(output)
}

fn species(session: &Session, command: SpeciesCommands) -> String {
    let found = match command {
        SpeciesCommands::List { category: Some(c) } => session.species.by_category(c),
        SpeciesCommands::List { category: None } => session.species.all().iter().collect(),
        SpeciesCommands::Search { query } => session.species.search(&query),
    };
    format_species(&found)
}

fn format_species(species: &[&Species]) -> String {
    if species.is_empty() {
        return "No species found".to_string();
    }
    let mut output = String::new();
    for s in species {
        output.push_str(&format!(
            "{}  {} ({}) - {}, {}\n",
            s.id,
            s.name,
            s.scientific_name,
            raw(&s.category),
            raw(&s.difficulty)
        ));
        output.push_str(&format!(
            "    colony {}, {} / {}, food: {}\n",
            s.colony_size, s.temperature, s.humidity, s.feeding_info
        ));
    }
    output
}

fn colony(session: &mut Session, command: ColonyCommands, now: DateTime<Utc>) -> Result<String> {
    match command {
        ColonyCommands::List => Ok(format_colonies(session.colonies.all())),

        ColonyCommands::Add {
            name,
            species,
            founded,
            queens,
            workers,
            notes,
        } => {
            ValidationError::require_text("name", &name)?;
            ValidationError::require_text("species", &species)?;
            let colony = Colony::new(name, species, founded.unwrap_or(now))
                .with_census(Census {
                    queens,
                    workers,
                    ..Default::default()
                })
                .with_notes(notes);
            let id = colony.id;
            session.colonies.add(colony);
            Ok(format!("Added colony {id}"))
        }

        ColonyCommands::Log {
            colony,
            activity,
            notes,
            date,
        } => {
            ValidationError::require_text("notes", &notes)?;
            let log = ColonyLog::new(date.unwrap_or(now), activity, notes);
            if !session.colonies.add_log(colony, log) {
                bail!("No colony with id {colony}");
            }
            Ok(format!("Logged {} for {colony}", raw(&activity)))
        }
    }
}

fn format_colonies(colonies: &[Colony]) -> String {
    if colonies.is_empty() {
        return "No colonies".to_string();
    }
    let mut output = String::new();
    for c in colonies {
        let census = c.census();
        output.push_str(&format!("{}  {} ({})\n", c.id, c.name, c.species));
        output.push_str(&format!(
            "    founded {}, queens {}, workers {}, brood {}/{}/{}\n",
            short_date(&c.founded_date),
            census.queens,
            census.workers,
            census.eggs,
            census.larvae,
            census.pupae
        ));
        output.push_str(&format!(
            "    last fed {}, last cleaned {}, {} logs\n",
            c.last_fed.as_ref().map(short_date).unwrap_or_else(|| "never".into()),
            c.last_cleaned.as_ref().map(short_date).unwrap_or_else(|| "never".into()),
            c.logs.len()
        ));
    }
    output
}

fn expense(session: &mut Session, command: ExpenseCommands, now: DateTime<Utc>) -> Result<String> {
    match command {
        ExpenseCommands::List { category } => {
            let expenses: Vec<&Expense> = match category {
                Some(c) => session.expenses.by_category(c),
                None => session.expenses.all().iter().collect(),
            };
            if expenses.is_empty() {
                return Ok("No expenses".to_string());
            }
            Ok(expenses
                .iter()
                .map(|e| {
                    format!(
                        "{}  {} {:>8.2}  {} [{}]\n",
                        e.id,
                        short_date(&e.date),
                        e.amount,
                        e.description,
                        raw(&e.category)
                    )
                })
                .collect())
        }

        ExpenseCommands::Add {
            amount,
            description,
            category,
            date,
            notes,
        } => {
            ValidationError::require_text("description", &description)?;
            let expense =
                Expense::new(amount, description, category, date.unwrap_or(now))?.with_notes(notes);
            let id = expense.id;
            session.expenses.add(expense);
            Ok(format!("Added expense {id}"))
        }

        ExpenseCommands::Total => Ok(format!(
            "Total: {:.2}\nThis month: {:.2}",
            session.expenses.total(),
            session.expenses.monthly_total(now)
        )),
    }
}

fn inventory(session: &Session, command: InventoryCommands, now: DateTime<Utc>) -> String {
    let items: Vec<&InventoryItem> = match command {
        InventoryCommands::List { owned: true, .. } => session.inventory.owned(),
        InventoryCommands::List { needed: true, .. } => session.inventory.needed(),
        InventoryCommands::List { .. } => session.inventory.all().iter().collect(),
        InventoryCommands::Reminders => session.inventory.upcoming_reminders(now),
    };
    if items.is_empty() {
        return "No items".to_string();
    }
    items
        .iter()
        .map(|i| {
            let status = if i.is_owned {
                format!("owned x{}", i.quantity)
            } else {
                "needed".to_string()
            };
            let reminder = i
                .reminder_date
                .as_ref()
                .map(|d| format!(", remind {}", short_date(d)))
                .unwrap_or_default();
            format!("{}  {} [{}] {}{}\n", i.id, i.name, raw(&i.category), status, reminder)
        })
        .collect()
}

fn guide(session: &mut Session, command: GuideCommands) -> Result<String> {
    match command {
        GuideCommands::List => Ok(format_guides(session.guides.all())),

        GuideCommands::Step { guide, step, undo } => {
            if !session.guides.set_step_completion(guide, step, !undo) {
                bail!("No step {step} in guide {guide}");
            }
            let updated = session
                .guides
                .get(guide)
                .ok_or_else(|| anyhow!("No guide with id {guide}"))?;
            Ok(format!(
                "{}: {}/{} steps ({:.0}%)",
                updated.title,
                updated.completed_steps(),
                updated.steps.len(),
                updated.progress * 100.0
            ))
        }

        GuideCommands::Generate { prompt } => {
            let id = session
                .guides
                .generate_from_prompt(&prompt)
                .ok_or(ValidationError::Blank("prompt"))?;
            Ok(format!("Generated guide {id}"))
        }
    }
}

fn format_guides(guides: &[SetupGuide]) -> String {
    if guides.is_empty() {
        return "No guides".to_string();
    }
    let mut output = String::new();
    for g in guides {
        output.push_str(&format!(
            "{}  {} [{}, {}] {:.0}%{}\n",
            g.id,
            g.title,
            raw(&g.category),
            g.estimated_time,
            g.progress * 100.0,
            if g.is_completed { " done" } else { "" }
        ));
        for s in &g.steps {
            let mark = if s.is_completed { "x" } else { " " };
            output.push_str(&format!("    [{mark}] {}  {}\n", s.id, s.title));
        }
    }
    output
}

fn favorite(session: &mut Session, command: FavoriteCommands, now: DateTime<Utc>) -> Result<String> {
    match command {
        FavoriteCommands::List { kind, recent } => {
            let favorites: Vec<&FavoriteItem> = match (kind, recent) {
                (_, true) => session.favorites.recent(),
                (Some(k), false) => session.favorites.by_type(k),
                (None, false) => session.favorites.all().iter().collect(),
            };
            Ok(format_favorites(&*session, &favorites))
        }

        FavoriteCommands::Add { kind, reference } => {
            let favorite = match kind {
                FavoriteType::Species => session
                    .species
                    .get(reference)
                    .map(|s| FavoriteItem::for_species(s, now)),
                FavoriteType::Guide => session
                    .guides
                    .get(reference)
                    .map(|g| FavoriteItem::for_guide(g, now)),
                other => bail!("{} favorites are saved with --save", raw(&other)),
            }
            .ok_or_else(|| anyhow!("No {} with id {reference}", raw(&kind)))?;

            if session.favorites.is_favorited(&favorite.reference_id, kind) {
                return Ok(format!("{} is already a favorite", favorite.title));
            }
            let id = favorite.id;
            session.favorites.add(favorite);
            Ok(format!("Added favorite {id}"))
        }

        FavoriteCommands::Remove { id } => {
            if !session.favorites.remove(id) {
                bail!("No favorite with id {id}");
            }
            Ok(format!("Removed favorite {id}"))
        }

        FavoriteCommands::Clear => {
            let count = session.favorites.clear();
            Ok(format!("Removed {count} favorites"))
        }
    }
}

/// Whether a favorite's target still exists; `None` when it has no stored target.
fn resolves(session: &Session, favorite: &FavoriteItem) -> Option<bool> {
    let target = favorite.reference_uuid();
    match favorite.kind {
        FavoriteType::Species => Some(target.and_then(|id| session.species.get(id)).is_some()),
        FavoriteType::Guide => Some(target.and_then(|id| session.guides.get(id)).is_some()),
        FavoriteType::Calculation | FavoriteType::Advice => None,
    }
}

fn format_favorites(session: &Session, favorites: &[&FavoriteItem]) -> String {
    if favorites.is_empty() {
        return "No favorites".to_string();
    }
    favorites
        .iter()
        .map(|f| {
            let missing = if resolves(session, f) == Some(false) {
                " (missing)"
            } else {
                ""
            };
            format!(
                "{}  [{}] {}{} - {}\n",
                f.id,
                raw(&f.kind),
                f.title,
                missing,
                f.description
            )
        })
        .collect()
}

async fn ask<B: LlmBackend>(
    session: &mut Session,
    advisor: &AdvisoryClient<B>,
    question: &str,
    save: bool,
    now: DateTime<Utc>,
) -> Result<String> {
    ValidationError::require_text("question", question)?;
    let reply = advisor.ask(question.trim()).await;

    if save {
        match advisor.state() {
            AdvisoryState::Answered(answer) => {
                session
                    .favorites
                    .add(FavoriteItem::advice(&answer, Uuid::new_v4(), now));
            }
            _ => return Ok(format!("{reply}\n(not saved: no answer)")),
        }
    }
    Ok(reply)
}

fn calc(session: &mut Session, command: CalcCommands, now: DateTime<Utc>) -> Result<String> {
    let (title, summary, save) = match command {
        CalcCommands::Substrate {
            total,
            sand,
            clay,
            soil,
            save,
        } => {
            let mix = calculator::substrate(total, sand, clay, soil);
            if !mix.is_balanced() {
                bail!("Percentages add up to {}%, expected 100%", mix.percent_total);
            }
            let summary = format!(
                "Sand {:.1} cups, clay {:.1} cups, soil {:.1} cups",
                mix.sand_cups, mix.clay_cups, mix.soil_cups
            );
            ("Substrate Mix", summary, save)
        }

        CalcCommands::Volume {
            length,
            width,
            height,
            unit,
            save,
        } => {
            let estimate = calculator::volume(length, width, height, unit)
                .ok_or_else(|| anyhow!("Dimensions must be non-negative numbers"))?;
            let summary = format!(
                "Volume {:.1} {}, substrate {:.1} cups, water {:.1} ml",
                estimate.volume,
                unit.cubic_label(),
                estimate.substrate_cups,
                estimate.water_ml
            );
            ("Enclosure Volume", summary, save)
        }

        CalcCommands::Feeding {
            colony_size,
            ant_size,
            frequency,
            save,
        } => {
            let plan = calculator::feeding(colony_size, ant_size, frequency);
            let summary = format!(
                "Protein: {}\nSugar: {}\nFrequency: {}\n{}",
                plan.protein_amount,
                plan.sugar_amount,
                plan.frequency.as_str(),
                plan.notes
            );
            ("Feeding Plan", summary, save)
        }
    };

    if save {
        session
            .favorites
            .add(FavoriteItem::calculation(title, summary.clone(), now));
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor::{LlmError, MockBackend};
    use records::{BlobStore, MemoryStore, StoreError};
    use std::sync::Arc;

    fn session() -> Session {
        Session::open(Arc::new(MemoryStore::new()))
    }

    fn parse(args: &[&str]) -> Commands {
        let mut argv = vec!["keeper"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().command
    }

    async fn run(session: &mut Session, args: &[&str]) -> Result<String> {
        let advisor = AdvisoryClient::new(MockBackend::default().with_response(" Keep it humid. "));
        execute(session, &advisor, parse(args)).await
    }

    #[test]
    fn test_raw_values_parse() {
        assert_eq!(
            parse_raw::<ExpenseCategory>("Books & Education"),
            Ok(ExpenseCategory::Books)
        );
        assert_eq!(parse_raw::<FavoriteType>("AI Advice"), Ok(FavoriteType::Advice));
        assert!(parse_raw::<AntCategory>("Bullet").is_err());
        assert_eq!(raw(&FeedingFrequency::Biweekly), "Bi-weekly");
    }

    #[test]
    fn test_parse_date_forms() {
        let day = parse_date("2024-05-01").unwrap();
        assert_eq!(day, Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());
        let stamp = parse_date("2024-05-01T09:30:00+02:00").unwrap();
        assert_eq!(stamp, Utc.with_ymd_and_hms(2024, 5, 1, 7, 30, 0).unwrap());
        assert!(parse_date("May 1st").is_err());
    }

    #[tokio::test]
    async fn test_colony_add_and_log() {
        let mut session = session();
        run(&mut session, &["colony", "add", "--name", "Beta", "--species", "Lasius niger"])
            .await
            .unwrap();
        let id = session.colonies.all().last().unwrap().id.to_string();

        run(
            &mut session,
            &["colony", "log", id.as_str(), "-a", "Feeding", "-n", "honey", "--date", "2024-05-02"],
        )
        .await
        .unwrap();

        let colony = session.colonies.all().last().unwrap();
        assert_eq!(colony.last_fed, parse_date("2024-05-02").ok());
        assert!(run(&mut session, &["colony", "list"]).await.unwrap().contains("Beta"));
    }

    #[tokio::test]
    async fn test_colony_log_rejects_unknown_colony() {
        let mut session = session();
        let id = Uuid::new_v4().to_string();
        let result = run(&mut session, &["colony", "log", id.as_str(), "-a", "Cleaning", "-n", "x"]).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_expense_validation() {
        let mut session = session();
        let result = run(&mut session, &["expense", "add", "-5", "refund"]).await;
        assert!(result.is_err());

        run(
            &mut session,
            &["expense", "add", "12.5", "Books", "-c", "Books & Education"],
        )
        .await
        .unwrap();
        assert_eq!(session.expenses.by_category(ExpenseCategory::Books).len(), 1);
    }

    #[tokio::test]
    async fn test_favorite_add_checks_duplicates() {
        let mut session = session();
        let species_id = session.species.all()[0].id.to_string();

        run(&mut session, &["favorite", "add", "Species", species_id.as_str()]).await.unwrap();
        let again = run(&mut session, &["favorite", "add", "Species", species_id.as_str()])
            .await
            .unwrap();

        assert!(again.contains("already a favorite"));
        assert_eq!(session.favorites.len(), 1);
    }

    #[tokio::test]
    async fn test_deleted_target_shows_missing() {
        let mut session = session();
        let target = session.species.all()[0].id;
        let reference = target.to_string();
        run(&mut session, &["favorite", "add", "Species", reference.as_str()])
            .await
            .unwrap();
        session.species.delete(target);

        let listing = run(&mut session, &["favorite", "list"]).await.unwrap();
        assert!(listing.contains("(missing)"));
    }

    #[tokio::test]
    async fn test_guide_step_toggle() {
        let mut session = session();
        let guide = session.guides.all()[0].clone();
        let (guide_id, step_id) = (guide.id.to_string(), guide.steps[0].id.to_string());

        let output = run(&mut session, &["guide", "step", guide_id.as_str(), step_id.as_str()]).await.unwrap();
        assert!(output.contains("1/3"));

        run(&mut session, &["guide", "step", guide_id.as_str(), step_id.as_str(), "--undo"])
            .await
            .unwrap();
        assert_eq!(session.guides.get(guide.id).unwrap().completed_steps(), 0);
    }

    #[tokio::test]
    async fn test_ask_saves_answer() {
        let mut session = session();
        let reply = run(&mut session, &["ask", "Humidity for Lasius?", "--save"])
            .await
            .unwrap();

        assert_eq!(reply, "Keep it humid.");
        let saved = session.favorites.by_type(FavoriteType::Advice);
        assert_eq!(saved[0].description, "Keep it humid.");
    }

    #[tokio::test]
    async fn test_failed_ask_is_not_saved() {
        let mut session = session();
        let advisor = AdvisoryClient::new(
            MockBackend::default().with_error(LlmError::Network("offline".into())),
        );
        let reply = execute(&mut session, &advisor, parse(&["ask", "x", "--save"]))
            .await
            .unwrap();

        assert!(reply.contains("not saved"));
        assert!(session.favorites.is_empty());
    }

    #[tokio::test]
    async fn test_calc_commands() {
        let mut session = session();
        let output = run(&mut session, &["calc", "feeding", "200", "--ant-size", "Large"])
            .await
            .unwrap();
        assert!(output.starts_with("Protein: 6 small insects"));

        assert!(run(&mut session, &["calc", "substrate", "4", "--soil", "30"]).await.is_err());

        run(&mut session, &["calc", "volume", "10", "10", "10", "--save"])
            .await
            .unwrap();
        assert_eq!(session.favorites.by_type(FavoriteType::Calculation).len(), 1);
    }

    /// Store that can never be read.
    struct UnreadableStore;

    impl BlobStore for UnreadableStore {
        fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, StoreError> {
            Err(StoreError::Io(std::io::Error::other("EIO")))
        }

        fn set(&self, _key: &str, _bytes: &[u8]) -> Result<(), StoreError> {
            Ok(())
        }

        fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_unreadable_store_fails_commands() {
        let mut session = Session::open(Arc::new(UnreadableStore));
        assert_eq!(session.storage_errors().len(), 6);

        let error = run(&mut session, &["species", "list"]).await.unwrap_err();
        assert!(error.to_string().starts_with("Storage error: Read failed"));
    }
}
