//! Subcommands of the `hireflow` binary.
//!
//! - `health` - Probe the API
//! - `signup` / `verify` / `resend-otp` / `login` / `logout` - Session flows
//! - `whoami` / `refresh` / `role` - Inspect or adjust the stored session
//! - `jobs`, `partners`, `candidates`, `interviews`, `skills`, `experience`
//! - `dashboard` - Role statistics and recent activity

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use hire_client::{
    ApiClient, CancellationToken, ClientConfig, FileStore, LogNavigator, SessionStore,
};
use hire_models::{
    Availability, BusinessPartnerFilters, CandidateSearchFilters, ChangePasswordRequest,
    CreateBusinessPartner, InterviewFilters, InterviewStatus, JobFilters, JobStatus,
    LoginRequest, PartnerPriority, PartnerStatus, QueryFilters, ResetPasswordRequest, Role,
    SignupRequest, VerifyOtpRequest,
};
use hire_state::{FetchOutcome, Hireflow, PageSource, PaginatedResource, TracingNotifier};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "hireflow")]
#[command(author, version, about = "Command-line client for the Hireflow recruiting API", long_about = None)]
pub struct Cli {
    /// API origin, without the /api/v1 prefix
    #[arg(long, env = "HIREFLOW_API_URL", default_value = hire_client::config::DEFAULT_BASE_URL)]
    pub api_url: String,

    /// Request timeout in seconds
    #[arg(long, env = "HIREFLOW_API_TIMEOUT_SECS", default_value = "10")]
    pub timeout_secs: u64,

    /// Where the session (tokens and user) is persisted
    #[arg(long, env = "HIREFLOW_SESSION_FILE", default_value = ".hireflow/session.json")]
    pub session_file: PathBuf,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that the API is up
    Health,

    /// Create an account; a verification code is emailed
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long, env = "HIREFLOW_PASSWORD")]
        password: String,
        /// candidate, recruiter, vendor or client
        #[arg(long)]
        role: Role,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },

    /// Verify the emailed code and sign in
    Verify {
        #[arg(long)]
        email: String,
        #[arg(long)]
        otp: String,
    },

    /// Send a new verification code
    ResendOtp {
        #[arg(long)]
        email: String,
    },

    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "HIREFLOW_PASSWORD")]
        password: String,
    },

    Logout,

    /// Request a password reset code
    ForgotPassword {
        #[arg(long)]
        email: String,
    },

    ResetPassword {
        #[arg(long)]
        email: String,
        #[arg(long)]
        otp: String,
        #[arg(long)]
        new_password: String,
    },

    ChangePassword {
        #[arg(long)]
        current_password: String,
        #[arg(long)]
        new_password: String,
    },

    /// Show the stored user
    Whoami,

    /// Exchange the refresh token for a new access token
    Refresh,

    /// Switch the cached user's role locally
    Role { role: Role },

    #[command(subcommand)]
    Jobs(JobsCommands),

    #[command(subcommand)]
    Partners(PartnersCommands),

    #[command(subcommand)]
    Candidates(CandidatesCommands),

    /// List interviews
    Interviews {
        #[command(flatten)]
        page: PageArgs,
        #[arg(long, value_parser = wire_value::<InterviewStatus>)]
        status: Option<InterviewStatus>,
        #[arg(long)]
        job_id: Option<String>,
        #[arg(long)]
        candidate_id: Option<String>,
    },

    /// List skills on your profile
    Skills,

    /// List work experience on your profile
    Experience,

    /// Role statistics and recent activity
    Dashboard {
        #[arg(long, default_value = "10")]
        activity_limit: u32,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct PageArgs {
    #[arg(long, default_value = "1")]
    pub page: u32,
    #[arg(long, default_value = "10")]
    pub limit: u32,
    /// Keep fetching until the last page
    #[arg(long)]
    pub all: bool,
}

#[derive(Subcommand, Debug)]
pub enum JobsCommands {
    List {
        #[command(flatten)]
        page: PageArgs,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_parser = wire_value::<JobStatus>)]
        status: Option<JobStatus>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        remote: bool,
        /// Comma-separated
        #[arg(long, value_delimiter = ',')]
        skills: Vec<String>,
    },
    Show {
        id: String,
        /// Use the unauthenticated public view
        #[arg(long)]
        public: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum PartnersCommands {
    List {
        #[command(flatten)]
        page: PageArgs,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_parser = wire_value::<PartnerStatus>)]
        status: Option<PartnerStatus>,
        #[arg(long, value_parser = wire_value::<PartnerPriority>)]
        priority: Option<PartnerPriority>,
        /// Only clients
        #[arg(long)]
        clients: bool,
        /// Only vendors
        #[arg(long)]
        vendors: bool,
    },
    Show {
        id: String,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        website: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        country: Option<String>,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum CandidatesCommands {
    Search {
        #[command(flatten)]
        page: PageArgs,
        #[arg(long)]
        search: Option<String>,
        /// Comma-separated
        #[arg(long, value_delimiter = ',')]
        skills: Vec<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        min_experience: Option<u32>,
        #[arg(long)]
        max_experience: Option<u32>,
        #[arg(long, value_parser = wire_value::<Availability>)]
        availability: Option<Availability>,
    },
    Show {
        id: String,
    },
}

/// Execute the parsed command.
pub async fn run(cli: Cli) -> Result<()> {
    let store: Arc<dyn SessionStore> = Arc::new(
        FileStore::open_or_reset(&cli.session_file)
            .with_context(|| format!("Failed to open {}", cli.session_file.display()))?,
    );

    let config = ClientConfig {
        base_url: cli.api_url.clone(),
        timeout: Duration::from_secs(cli.timeout_secs),
        ..ClientConfig::default()
    };
    debug!(base_url = %config.base_url, "Client config");

    // Ctrl-C aborts whatever request is in flight.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupted, cancelling");
                cancel.cancel();
            }
        });
    }

    let api = ApiClient::new(config, store, Arc::new(LogNavigator))
        .context("Failed to build HTTP client")?
        .with_cancellation(cancel);
    let app = Hireflow::new(api, Arc::new(TracingNotifier));
    let session = app.session();
    session.init();

    match cli.command {
        Commands::Health => {
            let healthy = app.api().health_check().await?;
            println!("{}", if healthy { "healthy" } else { "unhealthy" });
            if !healthy {
                bail!("API at {} is not healthy", cli.api_url);
            }
        }

        Commands::Signup {
            email,
            password,
            role,
            first_name,
            last_name,
        } => {
            let data = session
                .signup(SignupRequest {
                    email,
                    password,
                    role,
                    first_name,
                    last_name,
                })
                .await?;
            print_json(&data)?;
        }

        Commands::Verify { email, otp } => {
            let user = session.verify_otp(VerifyOtpRequest { email, otp }).await?;
            print_json(&user)?;
        }

        Commands::ResendOtp { email } => session.resend_otp(email).await?,

        Commands::Login { email, password } => {
            let user = session.login(LoginRequest { email, password }).await?;
            print_json(&user)?;
        }

        Commands::Logout => session.logout().await,

        Commands::ForgotPassword { email } => session.forgot_password(email).await?,

        Commands::ResetPassword {
            email,
            otp,
            new_password,
        } => {
            session
                .reset_password(ResetPasswordRequest {
                    email,
                    otp,
                    new_password,
                })
                .await?
        }

        Commands::ChangePassword {
            current_password,
            new_password,
        } => {
            session
                .change_password(ChangePasswordRequest {
                    current_password,
                    new_password,
                })
                .await?
        }

        Commands::Whoami => match session.user() {
            Some(user) => print_json(&user)?,
            None => bail!("Not signed in"),
        },

        Commands::Refresh => {
            session.refresh_token().await?;
            println!("Access token refreshed");
        }

        Commands::Role { role } => {
            let user = session.update_user_role(role)?;
            print_json(&user)?;
        }

        Commands::Jobs(JobsCommands::List {
            page,
            search,
            status,
            location,
            remote,
            skills,
        }) => {
            let filters = QueryFilters::from_serialize(&JobFilters {
                page: Some(page.page),
                limit: Some(page.limit),
                search,
                status,
                location,
                is_remote: remote.then_some(true),
                skills,
                ..Default::default()
            })?;
            let jobs = app.jobs().with_filters(filters);
            let items = collect(&jobs, page.all).await?;
            print_json(&items)?;
        }

        Commands::Jobs(JobsCommands::Show { id, public }) => {
            let job = if public {
                app.public_job().load(&id).await
            } else {
                app.job().load(&id).await
            };
            match job {
                Some(job) => print_json(&job)?,
                None => bail!("Job {} could not be loaded", id),
            }
        }

        Commands::Partners(PartnersCommands::List {
            page,
            search,
            status,
            priority,
            clients,
            vendors,
        }) => {
            let filters = QueryFilters::from_serialize(&BusinessPartnerFilters {
                page: Some(page.page),
                limit: Some(page.limit),
                search,
                status,
                priority,
                is_client: clients.then_some(true),
                is_vendor: vendors.then_some(true),
                ..Default::default()
            })?;
            let partners = app.business_partners().with_filters(filters);
            let items = collect(&partners, page.all).await?;
            print_json(&items)?;
        }

        Commands::Partners(PartnersCommands::Show { id }) => {
            match app.business_partner().load(&id).await {
                Some(partner) => print_json(&partner)?,
                None => bail!("Business partner {} could not be loaded", id),
            }
        }

        Commands::Partners(PartnersCommands::Create {
            name,
            email,
            phone,
            website,
            city,
            country,
        }) => {
            let input = CreateBusinessPartner {
                primary_email: email,
                primary_phone: phone,
                website,
                city,
                country,
                ..CreateBusinessPartner::new(name)
            };
            let manager = app.business_partner_manager();
            match manager.create(input).await {
                Some(partner) => print_json(&partner)?,
                None => bail!(manager
                    .runner()
                    .last_error()
                    .unwrap_or_else(|| "Create failed".to_string())),
            }
        }

        Commands::Partners(PartnersCommands::Delete { id }) => {
            let manager = app.business_partner_manager();
            if !manager.delete(&id).await {
                bail!(manager
                    .runner()
                    .last_error()
                    .unwrap_or_else(|| "Delete failed".to_string()));
            }
        }

        Commands::Candidates(CandidatesCommands::Search {
            page,
            search,
            skills,
            location,
            min_experience,
            max_experience,
            availability,
        }) => {
            let filters = QueryFilters::from_serialize(&CandidateSearchFilters {
                page: Some(page.page),
                limit: Some(page.limit),
                search,
                skills,
                location,
                min_experience,
                max_experience,
                availability,
            })?;
            let candidates = app.candidate_search().with_filters(filters);
            let items = collect(&candidates, page.all).await?;
            print_json(&items)?;
        }

        Commands::Candidates(CandidatesCommands::Show { id }) => {
            match app.candidate().load(&id).await {
                Some(candidate) => print_json(&candidate)?,
                None => bail!("Candidate {} could not be loaded", id),
            }
        }

        Commands::Interviews {
            page,
            status,
            job_id,
            candidate_id,
        } => {
            let filters = QueryFilters::from_serialize(&InterviewFilters {
                page: Some(page.page),
                limit: Some(page.limit),
                status,
                job_id,
                candidate_id,
                ..Default::default()
            })?;
            let interviews = app.interviews().with_filters(filters);
            let items = collect(&interviews, page.all).await?;
            print_json(&items)?;
        }

        Commands::Skills => {
            let skills = app.skills();
            let items = collect(&skills, false).await?;
            print_json(&items)?;
        }

        Commands::Experience => {
            let experience = app.experience();
            let items = collect(&experience, false).await?;
            print_json(&items)?;
        }

        Commands::Dashboard { activity_limit } => {
            let snapshot = app
                .dashboard()
                .with_activity_limit(activity_limit)
                .load()
                .await;
            if let Some(error) = snapshot.error {
                bail!(error);
            }
            print_json(&serde_json::json!({
                "stats": snapshot.stats,
                "activity": snapshot.activity,
            }))?;
        }
    }

    Ok(())
}

/// Fetch the first page (and, with `all`, every following one).
async fn collect<S: PageSource>(resource: &PaginatedResource<S>, all: bool) -> Result<Vec<S::Item>> {
    let mut items = Vec::new();
    let mut outcome = resource.fetch(&QueryFilters::new()).await;

    loop {
        match outcome {
            FetchOutcome::Loaded { .. } => items.extend(resource.items()),
            FetchOutcome::NoMorePages => break,
            FetchOutcome::Forbidden => bail!("Your role cannot view this resource"),
            FetchOutcome::Failed(message) => bail!(message),
            FetchOutcome::Closed | FetchOutcome::Superseded => bail!("Cancelled"),
        }
        if !all {
            break;
        }
        outcome = resource.load_more().await;
    }

    Ok(items)
}

/// Parse a flag value the way the API spells it, e.g. `on_hold`.
fn wire_value<T: DeserializeOwned>(raw: &str) -> std::result::Result<T, String> {
    serde_json::from_value(serde_json::Value::String(raw.trim().to_ascii_lowercase()))
        .map_err(|_| format!("unrecognized value '{}'", raw))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_signup_role() {
        let cli = Cli::try_parse_from([
            "hireflow",
            "signup",
            "--email",
            "vee@example.com",
            "--password",
            "correct horse",
            "--role",
            "Vendor",
        ])
        .unwrap();
        match cli.command {
            Commands::Signup { role, .. } => assert_eq!(role, Role::Vendor),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_partner_filters() {
        let cli = Cli::try_parse_from([
            "hireflow", "partners", "list", "--status", "on_hold", "--clients", "--limit", "25",
        ])
        .unwrap();
        match cli.command {
            Commands::Partners(PartnersCommands::List {
                page,
                status,
                clients,
                vendors,
                ..
            }) => {
                assert_eq!(page.limit, 25);
                assert_eq!(status, Some(PartnerStatus::OnHold));
                assert!(clients);
                assert!(!vendors);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert!(wire_value::<JobStatus>("archived").is_err());
        assert_eq!(wire_value::<JobStatus>("Open").unwrap(), JobStatus::Open);
        assert!(Cli::try_parse_from(["hireflow", "jobs", "list", "--status", "archived"]).is_err());
    }
}
