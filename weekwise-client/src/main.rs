use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use weekwise_client::api::{ApiClient, CalendarApi};
use weekwise_client::controller::CalendarController;
use weekwise_client::types::EventRecord;
use weekwise_client::view::{render_grid, ViewMode};

#[derive(Parser)]
#[command(name = "weekwise", about = "Calendar client for the weekwise server")]
struct Cli {
    /// Server base URL
    #[arg(long, env = "WEEKWISE_SERVER", default_value = "http://localhost:8001")]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account and print a token
    Signup { email: String, password: String },
    /// Log in and print a token
    Login { email: String, password: String },
    /// List all events
    List,
    /// Show one event by id
    Show { id: Uuid },
    /// Create an event
    Add {
        /// Start timestamp (RFC 3339, e.g. 2024-01-01T10:00:00Z)
        start: DateTime<Utc>,
        /// End timestamp (RFC 3339)
        end: DateTime<Utc>,
        /// Defaults to "Untitled Event" when omitted
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Render the calendar grid
    Grid {
        #[arg(value_enum, default_value_t = GridView::Week)]
        view: GridView,
        /// Anchor date (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum GridView {
    Day,
    Week,
    Month,
}

impl From<GridView> for ViewMode {
    fn from(view: GridView) -> Self {
        match view {
            GridView::Day => ViewMode::Day,
            GridView::Week => ViewMode::Week,
            GridView::Month => ViewMode::Month,
        }
    }
}

fn require_token() -> String {
    match std::env::var("WEEKWISE_TOKEN") {
        Ok(token) if !token.is_empty() => token,
        _ => {
            eprintln!("Set WEEKWISE_TOKEN first (run `weekwise login`)");
            std::process::exit(1);
        }
    }
}

fn fail(msg: &str) -> ! {
    eprintln!("{}", msg);
    std::process::exit(1);
}

fn print_event(event: &EventRecord) {
    println!(
        "{}  {} - {}  {}",
        event.id,
        event.start.format("%Y-%m-%d %H:%M"),
        event.end.format("%H:%M"),
        event.title
    );
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let api = ApiClient::new(&cli.server);

    match cli.command {
        Command::Signup { email, password } => {
            let mut controller = CalendarController::new(api);
            if let Err(e) = controller.signup(&email, &password).await {
                fail(&e);
            }
            let session = controller.session().expect("session set on signup");
            println!("Account created for {}", email);
            println!("export WEEKWISE_TOKEN={}", session.token);
        }
        Command::Login { email, password } => {
            let mut controller = CalendarController::new(api);
            if let Err(e) = controller.login(&email, &password).await {
                fail(&e);
            }
            let session = controller.session().expect("session set on login");
            println!("export WEEKWISE_TOKEN={}", session.token);
        }
        Command::List => {
            let token = require_token();
            match api.list_schedules(&token).await {
                Ok(events) => {
                    for event in &events {
                        print_event(event);
                    }
                }
                Err(e) => fail(&e),
            }
        }
        Command::Show { id } => {
            let token = require_token();
            match api.get_schedule(&token, id).await {
                Ok(event) => {
                    print_event(&event);
                    if !event.description.is_empty() {
                        println!("{}", event.description);
                    }
                }
                Err(e) => fail(&e),
            }
        }
        Command::Add {
            start,
            end,
            title,
            description,
        } => {
            let token = require_token();
            let payload = weekwise_client::types::SchedulePayload {
                start,
                end,
                title,
                description,
            };
            match api.create_schedule(&token, &payload).await {
                Ok(event) => print_event(&event),
                Err(e) => fail(&e),
            }
        }
        Command::Grid { view, date } => {
            let mut controller = CalendarController::new(api);
            controller.restore_session(&require_token());
            controller.refresh().await;
            controller.set_view(view.into());

            let anchor = date.unwrap_or_else(|| Utc::now().date_naive());
            print!(
                "{}",
                render_grid(controller.events(), controller.view(), anchor)
            );
        }
    }
}
