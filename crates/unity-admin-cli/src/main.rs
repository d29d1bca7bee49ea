//! unity-admin - a terminal console for the Unity assessment platform.
//!
//! Each subcommand is one console view: it passes the route guard, calls
//! the platform through the core request pipeline and renders the result.

mod terminal;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use unity_admin_core::api::ApiError;
use unity_admin_core::models::{
    parse_timestamp, ImageUpload, PlatformCreate, QuestionCreate, UserUpdate,
};
use unity_admin_core::{ApiClient, Config, GuardDecision, LoginError, Route, RouteGuard};

use terminal::{TerminalNavigator, TerminalNotifier};

/// Exit code when the remote rejected user input
const EXIT_VALIDATION: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "unity-admin", version, about = "Administration console for the Unity assessment platform")]
struct Cli {
    /// API base URL (overrides config and UNITY_ADMIN_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the session credential
    Login {
        #[arg(short, long)]
        username: Option<String>,
        /// Password (prompted for when omitted)
        #[arg(long, env = "UNITY_ADMIN_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored session credential
    Logout,
    /// Show whether a session credential is stored
    Status,
    /// Show the signed-in account
    Whoami,
    /// Manage platforms
    Platforms {
        #[command(subcommand)]
        action: PlatformAction,
    },
    /// List the question banks of a platform
    Banks { platform_id: i64 },
    /// List the procedures of a question bank
    Procedures { bank_id: i64 },
    /// Author questions
    Questions {
        #[command(subcommand)]
        action: QuestionAction,
    },
    /// Upload a question image (JPEG, PNG or GIF) and print its URL
    UploadImage { path: PathBuf },
    /// List published assessments
    Assessments,
    /// List examinee sessions of an assessment
    Results { assessment_id: i64 },
    /// Manage console users
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand, Debug)]
enum PlatformAction {
    List,
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    Delete { platform_id: i64 },
}

#[derive(Subcommand, Debug)]
enum QuestionAction {
    /// Create a question from a JSON file (prompt, question_type, score, options)
    Create {
        procedure_id: i64,
        #[arg(long)]
        from: PathBuf,
        /// Image to upload and attach to the question
        #[arg(long)]
        image: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum UserAction {
    List,
    Update {
        user_id: i64,
        #[arg(long)]
        username: Option<String>,
        /// Prompt for a new password
        #[arg(long)]
        reset_password: bool,
    },
}

impl Command {
    /// The console view this command renders.
    fn route(&self) -> Route {
        match self {
            Command::Login { .. } | Command::Logout | Command::Status => Route::Login,
            Command::Whoami => Route::HOME,
            Command::Platforms { .. } => Route::Platforms,
            Command::Banks { platform_id } => Route::QuestionBanks {
                platform_id: *platform_id,
            },
            Command::Procedures { bank_id } => Route::Procedures { bank_id: *bank_id },
            Command::Questions {
                action: QuestionAction::Create { procedure_id, .. },
            } => Route::QuestionCreate {
                procedure_id: *procedure_id,
            },
            Command::UploadImage { .. } => Route::HOME,
            Command::Assessments => Route::Assessments,
            Command::Results { .. } => Route::Sessions,
            Command::Users { .. } => Route::Users,
        }
    }
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        Config::default()
    });
    if let Some(url) = cli.api_url.clone() {
        config.api_base_url = url;
    }

    let session = config.open_session()?;
    let route = cli.command.route();

    if let GuardDecision::Redirect(target) = RouteGuard::new(session.clone()).check(&route) {
        eprintln!("Not signed in. Run `unity-admin login` first.");
        info!(from = %route, to = %target, "Route guard redirect");
        return Ok(ExitCode::FAILURE);
    }

    let client = ApiClient::builder(config.api_base_url.clone(), session)
        .timeout(config.request_timeout())
        .notifier(Arc::new(TerminalNotifier))
        .navigator(Arc::new(TerminalNavigator::new(route)))
        .build()?;

    let view = View {
        client,
        json: cli.json,
    };

    match view.run(cli.command, &mut config).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(ViewError::Api(e)) => Ok(view.render_error(e)),
        Err(ViewError::Other(e)) => Err(e),
    }
}

// ============================================================================
// Views
// ============================================================================

enum ViewError {
    Api(ApiError),
    Other(anyhow::Error),
}

impl From<ApiError> for ViewError {
    fn from(e: ApiError) -> Self {
        ViewError::Api(e)
    }
}

impl From<anyhow::Error> for ViewError {
    fn from(e: anyhow::Error) -> Self {
        ViewError::Other(e)
    }
}

impl From<LoginError> for ViewError {
    fn from(e: LoginError) -> Self {
        ViewError::Other(e.into())
    }
}

impl From<io::Error> for ViewError {
    fn from(e: io::Error) -> Self {
        ViewError::Other(e.into())
    }
}

struct View {
    client: ApiClient,
    json: bool,
}

impl View {
    async fn run(&self, command: Command, config: &mut Config) -> Result<(), ViewError> {
        match command {
            Command::Login { username, password } => self.login(username, password, config).await,
            Command::Logout => {
                self.client.logout()?;
                println!("Signed out.");
                Ok(())
            }
            Command::Status => {
                if self.client.session().is_authenticated() {
                    println!("Signed in ({})", self.client.base_url());
                } else {
                    println!("Not signed in");
                }
                Ok(())
            }
            Command::Whoami => {
                let user = self.client.current_user().await?;
                self.render(&user, || {
                    println!("{} ({})", user.username, user.role_display());
                })
            }
            Command::Platforms { action } => self.platforms(action).await,
            Command::Banks { platform_id } => {
                let banks = self.client.list_question_banks(platform_id).await?;
                self.render(&banks, || {
                    for bank in &banks {
                        println!("{:>6}  {}", bank.id, bank.name);
                    }
                })
            }
            Command::Procedures { bank_id } => {
                let procedures = self.client.list_procedures(bank_id).await?;
                self.render(&procedures, || {
                    for procedure in &procedures {
                        println!("{:>6}  {}", procedure.id, procedure.name);
                    }
                })
            }
            Command::Questions { action } => self.questions(action).await,
            Command::UploadImage { path } => {
                let upload = self.upload_image(&path).await?;
                self.render(&upload, || println!("{}", upload.file_url))
            }
            Command::Assessments => {
                let assessments = self.client.list_assessments().await?;
                let now = Utc::now();
                self.render(&assessments, || {
                    for a in &assessments {
                        let marker = if a.is_open_at(now) { "*" } else { " " };
                        println!(
                            "{:>6} {} {}  {} -> {}  (bank {})",
                            a.id, marker, a.title, a.start_time, a.end_time, a.question_bank_id
                        );
                    }
                })
            }
            Command::Results { assessment_id } => {
                let results = self.client.list_assessment_results(assessment_id).await?;
                self.render(&results, || {
                    for r in &results {
                        let started = parse_timestamp(&r.start_time)
                            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                            .unwrap_or_else(|| r.start_time.clone());
                        let duration = r
                            .duration_minutes()
                            .map(|m| format!("{}m", m))
                            .unwrap_or_else(|| "in progress".to_string());
                        println!(
                            "{:>6}  {:<16} {:>5}  {}  {}",
                            r.id, r.examinee_identifier, r.total_score, started, duration
                        );
                    }
                })
            }
            Command::Users { action } => self.users(action).await,
        }
    }

    async fn login(
        &self,
        username: Option<String>,
        password: Option<String>,
        config: &mut Config,
    ) -> Result<(), ViewError> {
        let username = match username.or_else(|| config.last_username.clone()) {
            Some(username) => username,
            None => prompt_username()?,
        };
        let password = match password {
            Some(password) => password,
            None => rpassword::prompt_password("Password: ")?,
        };

        if username.is_empty() || password.is_empty() {
            return Err(ViewError::Other(anyhow::anyhow!("Username and password required")));
        }

        self.client.login(&username, &password).await?;

        config.last_username = Some(username);
        if let Err(e) = config.save() {
            tracing::warn!(error = %e, "Failed to save config");
        }
        println!("Signed in.");
        Ok(())
    }

    async fn platforms(&self, action: PlatformAction) -> Result<(), ViewError> {
        match action {
            PlatformAction::List => {
                let platforms = self.client.list_platforms().await?;
                self.render(&platforms, || {
                    for p in &platforms {
                        println!("{:>6}  {:<24} {}", p.id, p.name, p.description_display());
                    }
                })
            }
            PlatformAction::Create { name, description } => {
                let platform = self
                    .client
                    .create_platform(&PlatformCreate { name, description })
                    .await?;
                self.render(&platform, || {
                    println!("Created platform {} ({})", platform.name, platform.id);
                })
            }
            PlatformAction::Delete { platform_id } => {
                let platform = self.client.delete_platform(platform_id).await?;
                self.render(&platform, || {
                    println!("Deleted platform {} ({})", platform.name, platform.id);
                })
            }
        }
    }

    async fn questions(&self, action: QuestionAction) -> Result<(), ViewError> {
        match action {
            QuestionAction::Create {
                procedure_id,
                from,
                image,
            } => {
                let contents = std::fs::read_to_string(&from)
                    .with_context(|| format!("Failed to read {}", from.display()))?;
                let mut question: QuestionCreate = serde_json::from_str(&contents)
                    .with_context(|| format!("Failed to parse {}", from.display()))?;
                if let Some(image) = image {
                    question.image_url = Some(self.upload_image(&image).await?.file_url);
                }

                let created = self.client.create_question(procedure_id, &question).await?;
                self.render(&created, || {
                    println!(
                        "Created question {} [{}] ({} pts, {} correct)",
                        created.id,
                        created.question_type,
                        created.score,
                        created.correct_option_count()
                    );
                })
            }
        }
    }

    async fn users(&self, action: UserAction) -> Result<(), ViewError> {
        match action {
            UserAction::List => {
                let users = self.client.list_users().await?;
                self.render(&users, || {
                    for user in &users {
                        println!("{:>6}  {:<24} {}", user.id, user.username, user.role_display());
                    }
                })
            }
            UserAction::Update {
                user_id,
                username,
                reset_password,
            } => {
                let password = if reset_password {
                    Some(rpassword::prompt_password("New password: ")?)
                } else {
                    None
                };
                let user = self
                    .client
                    .update_user(user_id, &UserUpdate { username, password })
                    .await?;
                self.render(&user, || {
                    println!("Updated user {} ({})", user.username, user.id);
                })
            }
        }
    }

    async fn upload_image(&self, path: &Path) -> Result<ImageUpload, ViewError> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow::anyhow!("Not a file: {}", path.display()))?;
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(self.client.upload_image(file_name, bytes).await?)
    }

    fn render<T: Serialize>(&self, value: &T, human: impl FnOnce()) -> Result<(), ViewError> {
        if self.json {
            let out = serde_json::to_string_pretty(value).map_err(anyhow::Error::from)?;
            println!("{}", out);
        } else {
            human();
        }
        Ok(())
    }

    /// Render failures the pipeline leaves to the view. Visible kinds were
    /// already reported by the notifier.
    fn render_error(&self, error: ApiError) -> ExitCode {
        match error {
            ApiError::NotFound { envelope } => {
                println!("Nothing found: {}", envelope.msg);
                ExitCode::SUCCESS
            }
            ApiError::Validation { message, fields } => {
                if fields.is_empty() {
                    eprintln!("invalid input: {}", message);
                }
                for field in fields {
                    eprintln!("invalid input: {}: {}", field.field, field.message);
                }
                ExitCode::from(EXIT_VALIDATION)
            }
            _ => ExitCode::FAILURE,
        }
    }
}

fn prompt_username() -> io::Result<String> {
    print!("Username: ");
    io::stdout().flush()?;

    let mut username = String::new();
    io::stdin().read_line(&mut username)?;
    Ok(username.trim().to_string())
}
