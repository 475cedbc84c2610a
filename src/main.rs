use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use postnummeruppror_core::{
    init_logger, log_info,
    location::{
        AuthorizationStatus, ChannelLocationProvider, FixQuality, LocationEvent, LocationFix,
        LocationSampler,
    },
    logging::LogContext,
    pipeline::{HttpTransport, RegistrationClient, ReportBuilder, SubmissionClient},
    screen::{GateDecision, Presenter, RegistrationScreen, ReportScreen},
    storage::FileIdentityStore,
    validation::FieldId,
    ServiceConfig,
};

#[derive(Parser)]
#[command(version, about = "Report postal codes to postnummeruppror")]
struct CliParser {
    /// Base URL of the collection service (overrides POSTNUMMERUPPROR_API_URL).
    #[arg(long)]
    api_url: Option<String>,

    /// Directory holding the local identity record.
    #[arg(long, default_value = ".postnummeruppror")]
    data_dir: PathBuf,

    /// Stable device id used for a first registration.
    #[arg(long)]
    device_id: Option<String>,

    /// Command to execute.
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register (or re-register) the local account.
    Register {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long, default_value = "")]
        email: String,
        /// Accept that reports are published under CC0.
        #[arg(long)]
        accept_license: bool,
    },
    /// Send one address report.
    Report {
        #[arg(long)]
        postal_code: String,
        #[arg(long)]
        postal_town: String,
        #[arg(long)]
        street_name: String,
        #[arg(long)]
        house_number: String,
        #[arg(long, default_value = "")]
        house_name: String,
        #[arg(long, requires = "longitude", allow_hyphen_values = true)]
        latitude: Option<f64>,
        #[arg(long, requires = "latitude", allow_hyphen_values = true)]
        longitude: Option<f64>,
        /// Horizontal accuracy in metres.
        #[arg(long, default_value_t = 0.0)]
        accuracy: f64,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        altitude: f64,
    },
}

/// Presenter for a terminal session.
struct ConsolePresenter;

impl Presenter for ConsolePresenter {
    fn show_busy(&self) {
        println!("Skickar...");
    }

    fn hide_busy(&self) {}

    fn show_alert(&self, title: &str, message: &str) {
        println!("{}: {}", title, message);
    }

    fn navigate_to_registration(&self) {
        println!("Inget konto registrerat. Kör `postnummeruppror register` först.");
    }

    fn navigate_back(&self) {
        println!("Kontot är sparat.");
    }

    fn show_accuracy(&self, accuracy_meters: f64, quality: FixQuality) {
        match quality {
            FixQuality::Poor => println!("Noggrannhet: {} m (dålig)", accuracy_meters),
            _ => println!("Noggrannhet: {} m", accuracy_meters),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();
    let cli_args = CliParser::parse();

    let mut config = ServiceConfig::from_env().context("reading service configuration")?;
    if let Some(url) = &cli_args.api_url {
        config = config.with_base_url(url)?;
    }

    let ctx = LogContext::session();
    let store = Arc::new(
        FileIdentityStore::new(&cli_args.data_dir)
            .with_context(|| format!("opening {}", cli_args.data_dir.display()))?,
    );
    let transport = Arc::new(HttpTransport::new(config.timeout)?);
    let presenter: Arc<dyn Presenter> = Arc::new(ConsolePresenter);

    match cli_args.command {
        Command::Register {
            first_name,
            last_name,
            email,
            accept_license,
        } => {
            let client = RegistrationClient::new(
                transport,
                store.clone(),
                &config.account_endpoint(),
                cli_args.device_id.as_deref(),
                &ctx,
            );
            let mut screen = RegistrationScreen::open(store.as_ref(), client, presenter, &ctx);
            screen.set_first_name(&first_name);
            screen.set_last_name(&last_name);
            screen.set_email(&email);
            screen.set_license_accepted(accept_license);

            let outcome = screen.save().await?;
            log_info!(ctx, "CLI_REGISTER_DONE", outcome = outcome.as_str());
            if !outcome.is_success() {
                bail!("registration failed: {}", outcome.as_str());
            }
        }
        Command::Report {
            postal_code,
            postal_town,
            street_name,
            house_number,
            house_name,
            latitude,
            longitude,
            accuracy,
            altitude,
        } => {
            let client = SubmissionClient::new(transport, &config.report_endpoint(), &ctx);
            let mut screen = ReportScreen::new(
                LocationSampler::new(&ctx),
                store,
                client,
                ReportBuilder::from_config(&config),
                presenter,
                &ctx,
            );

            if screen.enter() == GateDecision::RegistrationRequired {
                bail!("no local account");
            }

            if let (Some(lat), Some(lon)) = (latitude, longitude) {
                let (provider, events) = ChannelLocationProvider::new(AuthorizationStatus::Granted);
                if let Some(pump) = screen.start_location(Arc::new(provider)).await {
                    events
                        .send(LocationEvent::FixReceived(LocationFix::new(
                            lat, lon, accuracy, altitude,
                        )))
                        .await?;
                    drop(events);
                    pump.await?;
                }
            }

            screen.edit(FieldId::PostalCode, &postal_code);
            screen.edit(FieldId::PostalTown, &postal_town);
            screen.edit(FieldId::StreetName, &street_name);
            screen.edit(FieldId::HouseNumber, &house_number);
            screen.edit(FieldId::HouseName, &house_name);

            for (field, message) in screen.form().messages() {
                println!("{}: {}", field, message);
            }

            let outcome = screen.submit().await?;
            log_info!(
                ctx,
                "CLI_REPORT_DONE",
                outcome = outcome.as_str(),
                fix_quality = screen.sampler().fix_quality(),
            );
            if !outcome.is_success() {
                bail!("report failed: {}", outcome.as_str());
            }
        }
    }

    Ok(())
}
