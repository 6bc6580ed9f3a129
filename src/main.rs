use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use tripcraft::completion::{CompletionService, OpenAiClient, Role};
use tripcraft::models::{Accommodation, BudgetTier, Choice, Interest, Mobility, Purpose};
use tripcraft::prompts::PromptLibrary;
use tripcraft::{
    AppState, BasicsForm, ItineraryPlanner, PlannerSession, RefinementsForm, TripCraftConfig,
    TripCraftError, telemetry, web,
};

#[derive(Parser)]
#[command(
    name = "tripcraft",
    version,
    about = "AI-assisted trip planning wizard that turns travel preferences into a day-by-day itinerary"
)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the web wizard (default)
    Serve {
        /// Interface to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
    },
    /// Walk through the wizard from flags and print the itinerary
    Plan(TripArgs),
    /// Print the messages that would be sent, without calling the API
    Prompt(TripArgs),
}

#[derive(Args)]
struct TripArgs {
    /// Where you are going, e.g. "Paris, France"
    #[arg(long, default_value = "")]
    destination: String,

    /// Trip duration in days
    #[arg(long, default_value_t = 5)]
    days: u32,

    /// low, moderate or high
    #[arg(long, default_value = "moderate", value_parser = parse_choice::<BudgetTier>)]
    budget: BudgetTier,

    /// Concrete range for a moderate budget, e.g. "$800-$1200 USD"
    #[arg(long)]
    budget_range: Option<String>,

    /// relaxation, adventure or cultural
    #[arg(long, default_value = "relaxation", value_parser = parse_choice::<Purpose>)]
    purpose: Purpose,

    /// Interests (at least 2): food, history, nature, shopping, art, sports
    #[arg(long = "interest", value_delimiter = ',', value_parser = parse_choice::<Interest>)]
    interests: Vec<Interest>,

    /// budget-hostel, mid-range-hotel, luxury-resort or central-location
    #[arg(long, default_value = "mid-range-hotel", value_parser = parse_choice::<Accommodation>)]
    accommodation: Accommodation,

    /// no-restrictions, limited-walking or wheelchair-accessible
    #[arg(long, default_value = "no-restrictions", value_parser = parse_choice::<Mobility>)]
    mobility: Mobility,

    /// Dietary preferences, e.g. "Vegetarian"
    #[arg(long, default_value = "")]
    dietary: String,
}

fn parse_choice<C: Choice>(value: &str) -> std::result::Result<C, String> {
    C::parse(value).ok_or_else(|| {
        let accepted: Vec<&str> = C::ALL.iter().map(|choice| choice.slug()).collect();
        format!("expected one of: {}", accepted.join(", "))
    })
}

impl TripArgs {
    /// Run both wizard steps so the same guards apply as in the browser
    fn into_session(self) -> tripcraft::Result<PlannerSession> {
        let mut session = PlannerSession::new();
        session.submit_basics(BasicsForm {
            destination: self.destination,
            duration_days: self.days,
            budget: self.budget,
            purpose: self.purpose,
            preferences: self.interests,
        })?;
        session.submit_refinements(RefinementsForm {
            budget_range: self.budget_range,
            accommodation: self.accommodation,
            mobility: self.mobility,
            dietary: self.dietary,
        })?;
        Ok(session)
    }
}

fn completion_client(config: &TripCraftConfig) -> Result<Arc<dyn CompletionService>> {
    let client = OpenAiClient::from_config(&config.completion)
        .context("Failed to create completion client")?;
    Ok(Arc::new(client))
}

async fn serve(mut config: TripCraftConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if config.completion.api_key.is_none() {
        warn!("No API key configured; itineraries will fail until OPENAI_API_KEY is set");
    }

    let completion = completion_client(&config)?;
    let state = Arc::new(AppState::new(completion, &config.session)?);

    info!(model = %config.completion.model, "Starting TripCraft");
    web::run(&config.bind_address(), state).await
}

async fn plan(config: &TripCraftConfig, trip: TripArgs) -> Result<()> {
    let session = trip.into_session().map_err(exit_message)?;
    let planner = ItineraryPlanner::new(Arc::new(PromptLibrary::new()?), completion_client(config)?);
    let itinerary = planner
        .generate(session.trip())
        .await
        .map_err(exit_message)?;
    println!("{itinerary}");
    Ok(())
}

fn prompt(config: &TripCraftConfig, trip: TripArgs) -> Result<()> {
    let session = trip.into_session().map_err(exit_message)?;
    let planner = ItineraryPlanner::new(Arc::new(PromptLibrary::new()?), completion_client(config)?);
    let request = planner.build_request(session.trip())?;

    println!("model: {}\n", config.completion.model);
    println!("[system]\n{}\n", request.content_of(Role::System).unwrap_or_default());
    println!("[user]\n{}", request.content_of(Role::User).unwrap_or_default());
    Ok(())
}

fn exit_message(err: TripCraftError) -> anyhow::Error {
    anyhow::anyhow!("{}", err.user_message()).context(err.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = TripCraftConfig::load_from_path(cli.config.clone())?;
    telemetry::init(&config.logging, cli.verbose)?;

    match cli.command.unwrap_or(Command::Serve {
        host: None,
        port: None,
    }) {
        Command::Serve { host, port } => serve(config, host, port).await,
        Command::Plan(trip) => plan(&config, trip).await,
        Command::Prompt(trip) => prompt(&config, trip),
    }
}
