//! buzz-post - Compose, schedule and publish a BuzzConnect post

use chrono::{DateTime, Local, Weekday};
use clap::Parser;
use libbuzzconnect::api::{CanvaExport, DriveProvider, Integration};
use libbuzzconnect::composer::{media_warnings, Composer, InitialPost};
use libbuzzconnect::error::{ApiError, BuzzError, Result};
use libbuzzconnect::logging;
use libbuzzconnect::scheduling::{
    parse_date, parse_schedule, Frequency, PreferredTime, PublishMode, ScheduleForm, ScheduleType,
    TWICE_WEEKLY_DAYS_MESSAGE,
};
use libbuzzconnect::service::events::EventReceiver;
use libbuzzconnect::service::{apply_suggestion, BuzzService, Event, PublishOutcome, SubmitOutcome};
use libbuzzconnect::types::{Category, Platform};
use libbuzzconnect::Config;
use serde_json::json;
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "buzz-post")]
#[command(version, about = "Compose, schedule and publish a BuzzConnect post")]
#[command(long_about = r#"Compose, schedule and publish a post to the social accounts
connected to your BuzzConnect profile.

EXAMPLES:
    # Publish now to the platforms in your config defaults
    buzz-post "Shipping the new release today"

    # Pick platforms and accounts
    buzz-post "New blog post" -p instagram,facebook --account instagram:1784 --media cover.jpg

    # Schedule
    buzz-post "See you tomorrow" -p twitter --schedule "tomorrow 9am"
    buzz-post "Weekly tip" -p linkedin --frequency 2perweek --days tue,fri --time 12:00

    # Validate only, print the request body
    buzz-post "Draft" -p twitter --check --format json

    # Duplicate a stored post, keeping its platforms, media and schedule
    buzz-post --from post.json

EXIT CODES:
    0 - Success
    1 - Backend or media error
    2 - Not logged in or session rejected
    3 - Invalid input or the post failed validation
"#)]
struct Cli {
    /// Post content (reads from stdin if not provided)
    content: Option<String>,

    /// Start from a stored post as JSON ("-" for stdin); other options override its fields
    #[arg(long, value_name = "FILE")]
    from: Option<PathBuf>,

    /// Target platform(s), comma-separated (default: config defaults)
    #[arg(short, long, value_delimiter = ',')]
    platform: Vec<String>,

    /// Select every connected platform
    #[arg(long, conflicts_with = "platform")]
    all_platforms: bool,

    /// Account to post from, as PLATFORM:ID (repeatable)
    #[arg(short, long, value_name = "PLATFORM:ID")]
    account: Vec<String>,

    /// Hashtags, space-separated
    #[arg(short = 't', long)]
    hashtags: Option<String>,

    /// Mentions, space-separated
    #[arg(short, long)]
    mentions: Option<String>,

    /// Move #tags written inside the content into the hashtag list
    #[arg(long)]
    extract_hashtags: bool,

    /// Post category (promotional, educational, entertainment, news, personal, other)
    #[arg(long)]
    category: Option<String>,

    /// Instagram collaborator username
    #[arg(long)]
    collaborator: Option<String>,

    /// Also share the Instagram post as a story
    #[arg(long)]
    story: bool,

    /// Local image or video to attach (repeatable)
    #[arg(long, value_name = "PATH")]
    media: Vec<PathBuf>,

    /// Import a cloud file, as PROVIDER:FILE_ID (google-drive or onedrive)
    #[arg(long, value_name = "PROVIDER:FILE_ID")]
    drive: Vec<String>,

    /// Import a Canva design by share URL or id
    #[arg(long, value_name = "URL")]
    canva: Vec<String>,

    /// Canva export format (png, jpg, pdf, mp4)
    #[arg(long, default_value = "png")]
    canva_export: String,

    /// Generate the content with AI from this prompt
    #[arg(long, value_name = "PROMPT")]
    generate: Option<String>,

    /// Ask the AI for hashtags and append them
    #[arg(long)]
    suggest_hashtags: bool,

    /// Ask the AI for mentions and append them
    #[arg(long)]
    suggest_mentions: bool,

    /// Schedule instead of publishing now ("tomorrow 9am", "2h", "2025-11-20 15:00")
    #[arg(short, long, value_name = "WHEN")]
    schedule: Option<String>,

    /// Automatic cadence (daily, weekly, 2perweek, weekend)
    #[arg(long)]
    frequency: Option<String>,

    /// Days for 2perweek, comma-separated (e.g. tue,fri)
    #[arg(long, value_delimiter = ',')]
    days: Vec<String>,

    /// Preferred posting time for automatic cadences (09:00, 12:00, ... or HH:MM:SS)
    #[arg(long)]
    time: Option<String>,

    /// Last date of an automatic cadence (YYYY-MM-DD)
    #[arg(long)]
    end_date: Option<String>,

    /// Validate and show the post without submitting it
    #[arg(long)]
    check: bool,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text")]
    #[arg(value_parser = ["text", "json"])]
    format: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init_from_env(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Everything that can be checked offline is checked before the backend is contacted
    let initial = cli.from.as_deref().map(load_initial).transpose()?;
    let content = match (&cli.content, &initial) {
        (None, Some(_)) => None,
        _ => Some(read_content(cli.content.as_deref())?),
    };
    let effective_content = content
        .as_deref()
        .or_else(|| initial.as_ref().and_then(|i| i.content.as_deref()))
        .unwrap_or_default();
    if effective_content.trim().is_empty() && cli.generate.is_none() {
        return Err(BuzzError::Validation("Content is required".to_string()));
    }
    let platforms = parse_platforms(&cli.platform)?;
    let accounts = parse_accounts(&cli.account)?;
    let drive_files = parse_drive_files(&cli.drive)?;
    let canva_export: CanvaExport = cli.canva_export.parse()?;
    let now = Local::now();
    // A stored post keeps its own schedule unless one is given here
    let schedule = if initial.is_none() || cli.schedule.is_some() || cli.frequency.is_some() {
        Some(build_schedule(&cli, now)?)
    } else {
        None
    };

    let service = BuzzService::new()?;

    let mut composer = match initial {
        Some(initial) => service.composer_from(initial).await?,
        None => service.composer().await?,
    };
    select_platforms(&mut composer, platforms, cli.all_platforms)?;
    for (platform, id) in &accounts {
        composer.set_account_selected(*platform, id, true);
    }
    select_sole_accounts(&mut composer);

    {
        let draft = composer.draft_mut();
        if let Some(content) = content {
            draft.content = content;
        }
        if let Some(hashtags) = cli.hashtags {
            draft.hashtags = hashtags;
        }
        if let Some(mentions) = cli.mentions {
            draft.mentions = mentions;
        }
        if let Some(category) = cli.category.as_deref() {
            draft.category = Category::parse_or_default(category);
        }
        if cli.collaborator.is_some() {
            draft.collaborator = cli.collaborator;
        }
        if cli.story {
            draft.instagram_story = true;
        }
        if let Some(schedule) = schedule {
            draft.schedule = schedule;
        }
    }

    if let Some(prompt) = cli.generate.as_deref() {
        let suggestions = service.suggestions().generate(&composer, prompt).await?;
        let first = composer.draft().platforms().first().copied();
        let chosen = suggestions
            .iter()
            .find(|s| Some(s.platform) == first)
            .or_else(|| suggestions.first());
        match chosen {
            Some(suggestion) => {
                eprintln!("Using generated content for {}", suggestion.platform.display_name());
                apply_suggestion(&mut composer, suggestion);
            }
            None => {
                return Err(ApiError::Decode("No content was generated".to_string()).into());
            }
        }
    }

    if cli.extract_hashtags {
        let moved = composer.extract_hashtags();
        debug!(moved, "Extracted hashtags from content");
    }
    if cli.suggest_hashtags {
        service.suggestions().suggest_hashtags(&mut composer).await?;
    }
    if cli.suggest_mentions {
        service.suggestions().suggest_mentions(&mut composer).await?;
    }

    attach_media(&service, &mut composer, &cli.media, &drive_files, &cli.canva, canva_export).await?;

    for warning in media_warnings(composer.draft()) {
        eprintln!("Warning: {}", warning);
    }

    let json_output = cli.format == "json";
    if cli.check {
        composer.validate(now.naive_local())?;
        return print_check(&composer, service.config(), json_output);
    }

    if !json_output {
        spawn_progress(service.subscribe());
    }
    let outcome = service.submit().submit(&mut composer, now.naive_local()).await?;
    print_outcome(&outcome, json_output)?;

    if let SubmitOutcome::Published { summary, .. } = &outcome {
        if summary.outcome == PublishOutcome::Failed {
            return Err(ApiError::Rejected(summary.message.clone()).into());
        }
    }
    Ok(())
}

/// Content from the argument, or stdin when it is piped in
fn read_content(arg: Option<&str>) -> Result<String> {
    if let Some(content) = arg {
        return Ok(content.to_string());
    }
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(String::new());
    }
    let mut buffer = String::new();
    stdin
        .lock()
        .read_to_string(&mut buffer)
        .map_err(|e| BuzzError::InvalidInput(format!("Failed to read stdin: {}", e)))?;
    Ok(buffer.trim_end_matches('\n').to_string())
}

/// A stored post from a JSON file, or stdin for `-`
fn load_initial(path: &Path) -> Result<InitialPost> {
    let text = if path == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| BuzzError::InvalidInput(format!("Failed to read stdin: {}", e)))?;
        buffer
    } else {
        std::fs::read_to_string(path).map_err(|e| {
            BuzzError::InvalidInput(format!("Failed to read {}: {}", path.display(), e))
        })?
    };
    serde_json::from_str(&text).map_err(|e| {
        BuzzError::InvalidInput(format!("Invalid post file {}: {}", path.display(), e))
    })
}

fn parse_platforms(names: &[String]) -> Result<Option<Vec<Platform>>> {
    let names: Vec<&String> = names.iter().filter(|n| !n.trim().is_empty()).collect();
    if names.is_empty() {
        return Ok(None);
    }
    names
        .into_iter()
        .map(|name| name.parse::<Platform>())
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

/// Split `LEFT:RIGHT`, both sides required
fn split_pair<'a>(value: &'a str, what: &str, expected: &str) -> Result<(&'a str, &'a str)> {
    match value.split_once(':') {
        Some((left, right)) if !left.trim().is_empty() && !right.trim().is_empty() => {
            Ok((left.trim(), right.trim()))
        }
        _ => Err(BuzzError::InvalidInput(format!(
            "Invalid {} '{}', expected {}",
            what, value, expected
        ))),
    }
}

fn parse_accounts(values: &[String]) -> Result<Vec<(Platform, String)>> {
    values
        .iter()
        .map(|value| -> Result<(Platform, String)> {
            let (platform, id) = split_pair(value, "account", "PLATFORM:ID")?;
            let platform: Platform = platform.parse()?;
            Ok((platform, id.to_string()))
        })
        .collect()
}

fn parse_drive_files(values: &[String]) -> Result<Vec<(DriveProvider, String)>> {
    values
        .iter()
        .map(|value| -> Result<(DriveProvider, String)> {
            // Provider slugs contain no ':' so the first one separates the id
            let (provider, id) = split_pair(value, "drive file", "PROVIDER:FILE_ID")?;
            let integration: Integration = provider.parse()?;
            Ok((DriveProvider::try_from(integration)?, id.to_string()))
        })
        .collect()
}

fn parse_weekday(value: &str) -> Result<Weekday> {
    value
        .trim()
        .parse::<Weekday>()
        .map_err(|_| BuzzError::InvalidInput(format!("Invalid weekday '{}'", value)))
}

fn build_schedule(cli: &Cli, now: DateTime<Local>) -> Result<ScheduleForm> {
    let mut form = ScheduleForm::new();
    if cli.schedule.is_none() && cli.frequency.is_none() {
        return Ok(form);
    }
    form.set_mode(PublishMode::Scheduled, now.naive_local());

    let automatic = match cli.frequency.as_deref() {
        Some(frequency) => {
            let frequency: Frequency = frequency.parse()?;
            form.set_schedule_type(ScheduleType::Auto(Some(frequency)));
            if let Some(time) = cli.time.as_deref() {
                form.set_preferred_time(PreferredTime::parse(time)?);
            }
            if let Some(end) = cli.end_date.as_deref() {
                form.set_end_date(parse_date(end)?);
            }
            for day in &cli.days {
                if !form.toggle_weekday(parse_weekday(day)?) {
                    return Err(BuzzError::Validation(TWICE_WEEKLY_DAYS_MESSAGE.to_string()));
                }
            }
            true
        }
        None => false,
    };

    if let Some(when) = cli.schedule.as_deref() {
        let at = parse_schedule(when, now)?;
        form.set_date(at.date());
        if !automatic || cli.time.is_none() {
            form.set_time(at.time());
        }
    }
    Ok(form)
}

/// Replace the default selection when platforms were given on the command line
fn select_platforms(
    composer: &mut Composer,
    platforms: Option<Vec<Platform>>,
    all: bool,
) -> Result<()> {
    if platforms.is_none() && !all {
        return Ok(());
    }
    composer.clear_platforms();
    if all {
        composer.toggle_all_platforms();
        return Ok(());
    }
    for platform in platforms.unwrap_or_default() {
        if composer.draft().platforms().contains(&platform) {
            continue;
        }
        if !composer.toggle_platform(platform) {
            return Err(BuzzError::Validation(format!(
                "{} is not connected to your account",
                platform.display_name()
            )));
        }
    }
    Ok(())
}

/// Platforms with exactly one connected account need no --account
fn select_sole_accounts(composer: &mut Composer) {
    for platform in composer.draft().platforms().to_vec() {
        if !composer.draft().accounts_for(platform).is_empty() {
            continue;
        }
        let accounts = composer.profile().accounts_for(platform);
        let sole = match accounts.as_slice() {
            [only] => only.selection_id().map(str::to_string),
            _ => None,
        };
        if let Some(id) = sole {
            debug!(platform = %platform, account = %id, "Selecting the only account");
            composer.set_account_selected(platform, &id, true);
        }
    }
}

async fn attach_media(
    service: &BuzzService,
    composer: &mut Composer,
    paths: &[PathBuf],
    drive_files: &[(DriveProvider, String)],
    canva: &[String],
    canva_export: CanvaExport,
) -> Result<()> {
    if !paths.is_empty() {
        let report = service.media().attach_paths(composer, paths);
        if let Some(rejected) = report.rejection_summary() {
            eprintln!("Warning: {}", rejected);
        }
        if let Some(resized) = report.resize_summary() {
            eprintln!("{}", resized);
        }
    }

    for (provider, file_id) in drive_files {
        let item = service.media().import_drive_file(*provider, file_id).await?;
        service.media().attach_imported(composer, item)?;
    }
    for design in canva {
        let item = service.media().import_canva_design(design, canva_export).await?;
        service.media().attach_imported(composer, item)?;
    }
    Ok(())
}

fn print_check(composer: &Composer, config: &Config, json_output: bool) -> Result<()> {
    let count = composer.draft().character_count();
    if json_output {
        let payload = composer.build_payload(&config.defaults.timezone_offset);
        let body = serde_json::to_string_pretty(&payload)
            .map_err(|e| BuzzError::InvalidInput(format!("Failed to encode payload: {}", e)))?;
        println!("{}", body);
        return Ok(());
    }

    println!("Post is valid");
    println!("Characters: {}", count);
    for (platform, platform_count) in &count.per_platform {
        println!(
            "  {}: {} remaining of {}",
            platform.display_name(),
            platform_count.remaining,
            platform_count.max
        );
    }
    println!("Media: {}", composer.draft().media.len());
    if let Some(at) = composer
        .draft()
        .schedule
        .scheduled_timestamp(&config.defaults.timezone_offset)
    {
        println!("Scheduled for: {}", at);
    }
    Ok(())
}

fn print_outcome(outcome: &SubmitOutcome, json_output: bool) -> Result<()> {
    if json_output {
        let value = match outcome {
            SubmitOutcome::Scheduled {
                post_id,
                scheduled_date,
            } => json!({
                "status": "scheduled",
                "post_id": post_id,
                "scheduled_date": scheduled_date,
                "message": outcome.message(),
            }),
            SubmitOutcome::Published { post_id, summary } => json!({
                "status": match summary.outcome {
                    PublishOutcome::Complete => "published",
                    PublishOutcome::Partial => "partial",
                    PublishOutcome::Failed => "failed",
                },
                "post_id": post_id,
                "message": summary.message,
                "results": summary.results,
            }),
        };
        let body = serde_json::to_string_pretty(&value)
            .map_err(|e| BuzzError::InvalidInput(format!("Failed to encode result: {}", e)))?;
        println!("{}", body);
        return Ok(());
    }

    println!("{}", outcome.message());
    match outcome {
        SubmitOutcome::Scheduled {
            post_id,
            scheduled_date,
        } => {
            if let Some(id) = post_id {
                println!("{}\t{}", id, scheduled_date);
            }
        }
        SubmitOutcome::Published { summary, .. } => {
            for result in &summary.results {
                match (&result.post_id, &result.error) {
                    (Some(id), _) if result.success => println!("{}:{}", result.platform, id),
                    (_, Some(error)) => println!("{}: failed: {}", result.platform, error),
                    _ => println!("{}: {}", result.platform, if result.success { "ok" } else { "failed" }),
                }
            }
        }
    }
    Ok(())
}

/// Progress lines on stderr while the post is submitted
fn spawn_progress(mut events: EventReceiver) {
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                Event::MediaUploadStarted { count } => eprintln!("Uploading {} file(s)...", count),
                Event::MediaUploadFailed { error } => eprintln!("Upload failed: {}", error),
                Event::PostCreated {
                    post_id: Some(id), ..
                } => eprintln!("Created post {}", id),
                _ => {}
            }
        }
    });
}
