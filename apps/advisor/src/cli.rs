use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use bytes::Bytes;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use advisor::account::{self, AccountService, ProfileForm};
use advisor::config::Config;
use advisor::errors::AdvisorError;
use advisor::insights::{self, HistoryView};
use advisor::models::profile::StudentProfile;
use advisor::models::recommendation::{course_tier, profile_band, RecommendationResult, ScoredItem};
use advisor::models::user::{ImageUpload, NewUser};
use advisor::ratings::{self, FeedbackOutcome, FeedbackPanel, RatingsView};
use advisor::state::AppState;
use advisor::store::ReportView;
use advisor::wizard::{AssessmentWizard, Destination};

#[derive(Parser, Debug)]
#[command(
    name = "advisor",
    about = "Take the career assessment and manage recommendations from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and persist the session token
    Login(LoginArgs),
    /// Clear the persisted session
    Logout,
    /// Show the logged-in account
    Whoami,
    /// Create an account
    Register(RegisterArgs),
    /// Request a password reset token by email
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    /// Set a new password using a reset token
    ResetPassword(ResetArgs),
    /// Change account details; only changed fields are sent
    UpdateProfile(UpdateProfileArgs),
    /// Run the assessment from a JSON profile and print the report
    Assess {
        /// Path to a JSON-encoded student profile
        #[arg(long)]
        profile: PathBuf,
    },
    /// Rate a recommended course or career
    Rate(RateArgs),
    /// Summarize your submitted ratings
    Insights,
    /// List past recommendations
    History {
        /// Show per-day counts instead of individual entries
        #[arg(long)]
        by_day: bool,
    },
    /// Show model performance figures
    Metrics,
}

#[derive(Args, Debug)]
struct LoginArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    password: String,
}

#[derive(Args, Debug)]
struct RegisterArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    #[arg(long)]
    confirm: String,
}

#[derive(Args, Debug)]
struct ResetArgs {
    #[arg(long)]
    token: String,
    #[arg(long)]
    password: String,
    #[arg(long)]
    confirm: String,
}

#[derive(Args, Debug)]
struct UpdateProfileArgs {
    #[arg(long)]
    username: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    password: Option<String>,
    #[arg(long)]
    confirm: Option<String>,
    /// Profile image URL; pass an empty string to remove the image
    #[arg(long)]
    image_url: Option<String>,
    /// Upload a local image file; takes precedence over --image-url
    #[arg(long)]
    image: Option<PathBuf>,
    #[arg(long)]
    school: Option<String>,
    #[arg(long)]
    id_number: Option<String>,
    #[arg(long)]
    phone: Option<String>,
}

#[derive(Args, Debug)]
struct RateArgs {
    /// Recommendation id shown in the report
    #[arg(long)]
    item: i64,
    /// Stars, 1 to 5
    #[arg(long)]
    stars: u8,
    #[arg(long)]
    comment: Option<String>,
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    let cli = Cli::parse();
    let state = AppState::from_config(config).map_err(|e| anyhow!(e.user_message()))?;

    match execute(cli.command, &state).await {
        Ok(()) => Ok(()),
        Err(AdvisorError::Internal(e)) => Err(e),
        Err(e) if e.requires_login() => Err(anyhow!(
            "{} Run `advisor login` first.",
            e.user_message()
        )),
        Err(e) => Err(anyhow!(e.user_message())),
    }
}

async fn execute(command: Command, state: &AppState) -> Result<(), AdvisorError> {
    match command {
        Command::Login(args) => {
            state.session.login(&args.username, &args.password).await?;
            println!("Logged in as {}.", args.username);
        }
        Command::Logout => {
            state.session.logout()?;
            println!("Logged out.");
        }
        Command::Whoami => {
            let user = AccountService::new(state).current_user().await?;
            println!("{} <{}>", user.username, user.email);
            if let Some(url) = user.profile_image_url.filter(|url| !url.is_empty()) {
                println!("Image: {url}");
            }
        }
        Command::Register(args) => {
            let user = account::register(
                state.api.as_ref(),
                NewUser {
                    username: args.username,
                    email: args.email,
                    password: args.password,
                    password_confirmation: args.confirm,
                },
            )
            .await?;
            println!("Registered {}. You can now log in.", user.username);
        }
        Command::ForgotPassword { email } => {
            println!("{}", account::forgot_password(state.api.as_ref(), &email).await?);
        }
        Command::ResetPassword(args) => {
            let message =
                account::reset_password(state.api.as_ref(), &args.token, &args.password, &args.confirm)
                    .await?;
            println!("{message}");
        }
        Command::UpdateProfile(args) => update_profile(state, args).await?,
        Command::Assess { profile } => assess(state, &profile).await?,
        Command::Rate(args) => rate(state, args).await?,
        Command::Insights => match ratings::load_ratings_report(state).await? {
            RatingsView::Empty => println!("No ratings found yet."),
            RatingsView::Summary(report) => {
                println!(
                    "{} ratings, average {:.2} stars",
                    report.global.total, report.global.average
                );
                for (stars, count) in report.global.histogram.iter().rev() {
                    println!("  {stars}★ {count}");
                }
                for (id, summary) in &report.per_item {
                    println!(
                        "  #{id}: {:.2} from {} rating(s)",
                        summary.average, summary.count
                    );
                }
            }
        },
        Command::History { by_day } => match insights::load_history(state).await? {
            HistoryView::Empty => println!(
                "No recommendation history available yet. Take an assessment to get started."
            ),
            HistoryView::Entries(entries) if by_day => {
                for day in insights::summarize_by_day(&entries) {
                    println!(
                        "{}  courses: {}  careers: {}",
                        day.date, day.courses, day.careers
                    );
                }
            }
            HistoryView::Entries(entries) => {
                for entry in entries {
                    let name = entry
                        .course_name
                        .or(entry.career_name)
                        .unwrap_or_else(|| "(unnamed)".to_string());
                    println!("{}  {name}", entry.created_at.format("%Y-%m-%d %H:%M"));
                }
            }
        },
        Command::Metrics => {
            let metrics = insights::load_model_metrics(state).await?;
            for (name, figures) in &metrics {
                println!(
                    "{name}: accuracy {:.1}%  precision {:.1}%  recall {:.1}%  f1 {:.1}%",
                    figures.accuracy * 100.0,
                    figures.precision * 100.0,
                    figures.recall * 100.0,
                    figures.f1_score * 100.0
                );
            }
            if let Some((name, _)) = insights::best_course_model(&metrics) {
                println!("Best course model: {name}");
            }
        }
    }
    Ok(())
}

async fn assess(state: &AppState, path: &Path) -> Result<(), AdvisorError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading profile {}", path.display()))?;
    let profile: StudentProfile = serde_json::from_str(&raw)
        .with_context(|| format!("parsing profile {}", path.display()))?;
    profile.check_inputs()?;

    let mut wizard = AssessmentWizard::with_profile(state, profile);
    if wizard.entry_destination() == Some(Destination::Login) {
        return Err(AdvisorError::Unauthenticated);
    }
    while !wizard.step().is_final() {
        let step = wizard.advance()?;
        info!("Advanced to {step:?}");
    }

    println!("Analyzing your profile...");
    wizard.submit().await?;

    match state.store.view() {
        ReportView::Ready(result) => print_report(&result),
        ReportView::Loading | ReportView::Empty => println!(
            "No recommendations found. Please fill out the form to get your recommendations."
        ),
    }
    Ok(())
}

fn print_report(result: &RecommendationResult) {
    println!();
    println!(
        "{} (average {:.2} points, {} level)",
        result.profile_rating,
        result.average_points,
        course_tier(result.average_points)
    );
    let band = profile_band(result.average_points);
    if band != result.profile_rating {
        info!("Service band '{}' differs from local band '{band}'", result.profile_rating);
    }
    println!("Model accuracy: {:.1}%", result.model_accuracy * 100.0);

    for row in &result.subject_grades_points {
        println!("  {:<22} {:<3} {:>2}", row.subject, row.grade, row.points);
    }

    println!("\nCourses");
    result.courses.iter().for_each(print_item);
    println!("\nCareers");
    result.careers.iter().for_each(print_item);
}

fn print_item(item: &ScoredItem) {
    let id = item.id.map(|id| format!("#{id} ")).unwrap_or_default();
    let kind = item
        .course_type
        .as_deref()
        .map(|kind| format!(" [{kind}]"))
        .unwrap_or_default();
    println!(
        "  {id}{}{kind}  {:.0}% match",
        item.name,
        item.similarity_score * 100.0
    );
    if !item.reasoning.is_empty() {
        println!("      {}", item.reasoning);
    }
    if let Some(risk) = &item.automation_risk {
        println!("      Automation risk: {risk}");
    }
}

async fn rate(state: &AppState, args: RateArgs) -> Result<(), AdvisorError> {
    let mut panel = FeedbackPanel::new(state);
    if let Some(comment) = args.comment {
        panel.set_comment(args.item, comment);
    }

    let rating = match panel.select_stars(args.item, args.stars).await? {
        FeedbackOutcome::Submitted(rating) => rating,
        FeedbackOutcome::Pending => panel.submit(args.item).await?,
    };
    println!(
        "Thanks! Recorded {} star(s) for #{}.",
        rating.score, rating.recommendation_id
    );
    Ok(())
}

async fn update_profile(state: &AppState, args: UpdateProfileArgs) -> Result<(), AdvisorError> {
    let image = match &args.image {
        Some(path) => Some(read_image(path).await?),
        None => None,
    };
    let form = ProfileForm {
        username: args.username,
        email: args.email,
        password: args.password,
        password_confirmation: args.confirm,
        profile_image_url: args.image_url,
        school_attended: args.school,
        id_birth_cert_number: args.id_number,
        phone_number: args.phone,
    };

    let user = AccountService::new(state)
        .update_profile(&form, image)
        .await?;
    println!("Profile saved for {}.", user.username);
    Ok(())
}

async fn read_image(path: &Path) -> Result<ImageUpload, AdvisorError> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading image {}", path.display()))?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let content_type = match extension.as_deref() {
        Some("png") => Some("image/png"),
        Some("jpg" | "jpeg") => Some("image/jpeg"),
        Some("gif") => Some("image/gif"),
        Some("webp") => Some("image/webp"),
        _ => None,
    };

    Ok(ImageUpload {
        file_name: path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string()),
        content_type: content_type.map(str::to_string),
        bytes: Bytes::from(bytes),
    })
}
