use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use nutrigenie_core::calories::{ActivityLevel, Profile, Sex};
use nutrigenie_core::prompt;
use nutrigenie_core::sections::{SectionedResponse, sectioned_response};
use nutrigenie_db::HistoryStore;
use nutrigenie_gateway::bootstrap;
use nutrigenie_providers::speech::SpeechService;
use nutrigenie_providers::{CommandSpeech, GenerationRequest, ImagePayload};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "nutrigenie",
    version,
    about = "NutriGenie - AI-powered nutrition assistant"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway server
    Start {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(long, default_value = "3000")]
        port: u16,
    },

    /// Show gateway status
    Status,

    /// Create the config directory layout
    Init,

    /// Get dietary recommendations for a health concern
    Recommend {
        /// Health problem, e.g. "diabetes" or "high blood pressure"
        condition: String,
    },

    /// Analyze a meal photo for calories and macros
    Analyze {
        /// Path to a jpg/jpeg/png image
        image: PathBuf,
    },

    /// Estimate daily calorie needs (Mifflin-St Jeor, local computation)
    Calories {
        #[arg(long)]
        age: u32,

        /// male or female
        #[arg(long)]
        sex: String,

        #[arg(long)]
        height_cm: f64,

        #[arg(long)]
        weight_kg: f64,

        /// sedentary, light, moderate, very, or extra
        #[arg(long)]
        activity: String,
    },

    /// Suggest recipes from a dietary preference, goal, and pantry contents
    Recipes {
        #[arg(long, default_value = "")]
        preference: String,

        #[arg(long, default_value = "")]
        goal: String,

        /// Comma-separated ingredients on hand
        ingredients: String,
    },

    /// Build a shopping list for planned recipes
    ShoppingList {
        /// Comma-separated recipes to cook
        planned: String,

        /// Comma-separated ingredients already at home
        available: String,
    },

    /// Show saved searches, newest first
    History {
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Speak a health concern and hear the recommendations
    Ask,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    let config_loader = nutrigenie_config::ConfigLoader::new()?;
    config_loader.ensure_dirs()?;
    let config = config_loader.load()?;
    let data_dir = config_loader.data_dir(&config);

    match cli.command {
        Commands::Start { host, port } => {
            let mut config = config;
            config.gateway.host = host;
            config.gateway.port = port;

            let server = nutrigenie_gateway::GatewayServer::new(config, data_dir);
            server.run().await?;
        }
        Commands::Status => {
            let resp = reqwest::Client::new()
                .get(format!(
                    "http://{}:{}/api/status",
                    config.gateway.host, config.gateway.port
                ))
                .send()
                .await
                .with_context(|| {
                    format!(
                        "gateway is not running at {}:{}",
                        config.gateway.host, config.gateway.port
                    )
                })?;

            let body = resp.json::<serde_json::Value>().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Commands::Init => {
            println!("NutriGenie setup");
            println!("Config directory: {}", config_loader.config_dir().display());
            println!("Directories created. Edit config.yml to get started.");
        }
        Commands::Recommend { condition } => {
            let text = recommend(&config, &data_dir, &condition).await?;
            print_recommendation(&text);
        }
        Commands::Analyze { image } => {
            if !config.features.image_analysis {
                bail!("image analysis is disabled in config.yml");
            }

            let mime_type = mime_for_path(&image)?;
            let data = std::fs::read(&image)
                .with_context(|| format!("failed to read {}", image.display()))?;

            let provider = bootstrap::build_provider(&config)?;
            let request =
                GenerationRequest::text(prompt::meal_analysis()).with_image(ImagePayload {
                    mime_type: mime_type.to_string(),
                    data,
                });
            let response = provider.generate(&request).await?;

            record_or_warn(&data_dir, &format!("meal image ({mime_type})"), &response.text);
            println!("{}", response.text);
        }
        Commands::Calories {
            age,
            sex,
            height_cm,
            weight_kg,
            activity,
        } => {
            let profile = Profile {
                age,
                sex: sex.parse::<Sex>()?,
                height_cm,
                weight_kg,
                activity: activity.parse::<ActivityLevel>()?,
            };
            let kcal = nutrigenie_core::calories::daily_calories(&profile)?;

            println!("Activity level: {}", profile.activity.label());
            println!("BMR: {:.2} kcal", profile.bmr());
            println!("Recommended daily calorie intake: {kcal} kcal");
        }
        Commands::Recipes {
            preference,
            goal,
            ingredients,
        } => {
            if !config.features.recipes {
                bail!("recipe suggestions are disabled in config.yml");
            }

            let instruction = prompt::recipes(&preference, &goal, &ingredients)?;
            let provider = bootstrap::build_provider(&config)?;
            let response = provider
                .generate(&GenerationRequest::text(instruction))
                .await?;

            record_or_warn(&data_dir, &format!("recipes: {}", ingredients.trim()), &response.text);
            println!("{}", response.text);
        }
        Commands::ShoppingList { planned, available } => {
            if !config.features.shopping_list {
                bail!("shopping list generation is disabled in config.yml");
            }

            let instruction = prompt::shopping_list(&planned, &available)?;
            let provider = bootstrap::build_provider(&config)?;
            let response = provider
                .generate(&GenerationRequest::text(instruction))
                .await?;

            record_or_warn(&data_dir, &format!("shopping list: {}", planned.trim()), &response.text);
            println!("{}", response.text);
        }
        Commands::History { limit } => {
            let store = open_history(&data_dir)?;
            let records = match limit {
                Some(limit) => store.recent(limit)?,
                None => store.list_all()?,
            };

            if records.is_empty() {
                println!("No previous searches yet.");
            }
            for record in records {
                println!(
                    "[{}] {}",
                    record.created_at.format("%Y-%m-%d %H:%M"),
                    record.query
                );
            }
        }
        Commands::Ask => {
            if !config.features.speech {
                bail!("speech is disabled in config.yml (set features.speech: true)");
            }

            let listen_command = config.speech.listen_command.clone().unwrap_or_default();
            let speak_command = config.speech.speak_command.clone().unwrap_or_default();
            let mut speech = CommandSpeech::new(listen_command, speak_command)?
                .with_listen_timeout(std::time::Duration::from_secs(
                    config.speech.listen_timeout_secs,
                ));

            println!("Listening... speak now.");
            let condition = speech.listen().await?;
            println!("You said: {condition}");

            let text = recommend(&config, &data_dir, &condition).await?;
            print_recommendation(&text);

            speech.speak(&text).await?;
            speech.shutdown().await?;
        }
    }

    Ok(())
}

async fn recommend(
    config: &nutrigenie_config::AppConfig,
    data_dir: &Path,
    condition: &str,
) -> Result<String> {
    let instruction = prompt::recommendation(condition)?;
    let provider = bootstrap::build_provider(config)?;
    let response = provider
        .generate(&GenerationRequest::text(instruction))
        .await?;

    record_or_warn(data_dir, condition.trim(), &response.text);
    Ok(response.text)
}

fn print_recommendation(text: &str) {
    match sectioned_response(text, &prompt::RECOMMENDATION_SECTIONS) {
        SectionedResponse::Sections { sections } => {
            for section in sections {
                println!("== {} ==", section.title);
                println!("{}\n", section.body.trim());
            }
        }
        SectionedResponse::Unsectioned { text } => println!("{text}"),
    }
}

fn open_history(data_dir: &Path) -> Result<HistoryStore> {
    Ok(HistoryStore::open(&bootstrap::history_db_path(data_dir))?)
}

/// History failures are logged, never fatal: the user still gets the
/// response they asked for.
fn record_or_warn(data_dir: &Path, query: &str, response: &str) {
    match open_history(data_dir) {
        Ok(store) => {
            if let Err(e) = store.record(query, response) {
                tracing::warn!("failed to record search history: {e}");
            }
        }
        Err(e) => tracing::warn!("failed to open search history: {e}"),
    }
}

fn mime_for_path(path: &Path) -> Result<&'static str> {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => Ok("image/jpeg"),
        Some("png") => Ok("image/png"),
        other => bail!(
            "unsupported image type {:?} (expected jpg, jpeg, or png)",
            other.unwrap_or("none")
        ),
    }
}
