//! buzz-media - Upload media and manage cloud-drive imports for BuzzConnect

use clap::{Parser, Subcommand};
use libbuzzconnect::api::{CanvaExport, DriveProvider, Integration};
use libbuzzconnect::error::{BuzzError, Result};
use libbuzzconnect::logging;
use libbuzzconnect::media::load_local_file;
use libbuzzconnect::platforms::{is_aspect_ratio_allowed, optimal_image_type, target_dimensions};
use libbuzzconnect::service::BuzzService;
use libbuzzconnect::types::{MediaItem, Platform};
use serde_json::{json, Value};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "buzz-media")]
#[command(version, about = "Upload media and manage cloud-drive imports for BuzzConnect")]
#[command(long_about = r#"Upload media and manage Google Drive, OneDrive and Canva imports.

EXAMPLES:
    # Check files against every platform's size and aspect rules (offline)
    buzz-media inspect photo.jpg banner.png --platform instagram

    # Upload files and print their URLs
    buzz-media upload photo.jpg clip.mp4

    # Integrations
    buzz-media status
    buzz-media list google-drive
    buzz-media import onedrive 01ABCDEF
    buzz-media canva https://www.canva.com/design/DAF123abc/view --export mp4
    buzz-media disconnect canva
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    #[arg(value_parser = ["text", "json"])]
    format: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check local files without uploading them
    Inspect {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Platform(s) to check against, comma-separated (default: all)
        #[arg(short, long, value_delimiter = ',')]
        platform: Vec<String>,
    },

    /// Upload local files and print their server URLs
    Upload {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Show which integrations are connected
    Status,

    /// List files in Google Drive or OneDrive
    List {
        /// google-drive or onedrive
        provider: String,

        /// Continue from a previous listing
        #[arg(long)]
        page_token: Option<String>,
    },

    /// Import a file from Google Drive or OneDrive
    Import {
        /// google-drive or onedrive
        provider: String,

        file_id: String,
    },

    /// Import a Canva design by share URL or id
    Canva {
        design: String,

        /// Export format (png, jpg, pdf, mp4)
        #[arg(long, default_value = "png")]
        export: String,
    },

    /// Disconnect an integration
    Disconnect {
        /// google-drive, onedrive or canva
        integration: String,
    },
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
    let json_output = cli.format == "json";
    match cli.command {
        Commands::Inspect { paths, platform } => inspect(&paths, &platform, json_output),
        Commands::Upload { paths } => {
            let service = BuzzService::new()?;
            let (items, report) = service.media().upload_paths(&paths).await?;
            if let Some(rejected) = report.rejection_summary() {
                eprintln!("Warning: {}", rejected);
            }
            print_items(&items, json_output)
        }
        Commands::Status => {
            let service = BuzzService::new()?;
            let statuses = service.media().integration_statuses().await;
            if json_output {
                let value: Vec<Value> = statuses
                    .iter()
                    .map(|s| {
                        json!({
                            "integration": s.integration.slug(),
                            "connected": s.connected,
                            "error": s.error,
                        })
                    })
                    .collect();
                return print_json(&Value::Array(value));
            }
            for status in &statuses {
                let state = match (&status.error, status.connected) {
                    (Some(error), _) => format!("unknown ({})", error),
                    (None, true) => "connected".to_string(),
                    (None, false) => "not connected".to_string(),
                };
                println!("{:<14}{}", status.integration.display_name(), state);
            }
            Ok(())
        }
        Commands::List {
            provider,
            page_token,
        } => {
            let provider = parse_drive(&provider)?;
            let service = BuzzService::new()?;
            let page = service
                .media()
                .list_files(provider, page_token.as_deref())
                .await?;
            if json_output {
                return print_json(&json!({
                    "files": page.files,
                    "next_page_token": page.next_page_token,
                }));
            }
            if page.files.is_empty() {
                println!("No files found");
            }
            for file in &page.files {
                println!(
                    "{}\t{}\t{}",
                    file.id,
                    file.name,
                    file.mime_type.as_deref().unwrap_or("-")
                );
            }
            if let Some(token) = page.next_page_token {
                eprintln!("More files: --page-token {}", token);
            }
            Ok(())
        }
        Commands::Import { provider, file_id } => {
            let provider = parse_drive(&provider)?;
            let service = BuzzService::new()?;
            let item = service.media().import_drive_file(provider, &file_id).await?;
            print_items(&[item], json_output)
        }
        Commands::Canva { design, export } => {
            let export: CanvaExport = export.parse()?;
            let service = BuzzService::new()?;
            let item = service.media().import_canva_design(&design, export).await?;
            print_items(&[item], json_output)
        }
        Commands::Disconnect { integration } => {
            let integration: Integration = integration.parse()?;
            let service = BuzzService::new()?;
            service.media().disconnect(integration).await?;
            println!("Disconnected {}", integration);
            Ok(())
        }
    }
}

fn parse_drive(name: &str) -> Result<DriveProvider> {
    let integration: Integration = name.parse()?;
    DriveProvider::try_from(integration)
}

fn inspect(paths: &[PathBuf], platform_names: &[String], json_output: bool) -> Result<()> {
    let platforms: Vec<Platform> = if platform_names.is_empty() {
        Platform::ALL.to_vec()
    } else {
        platform_names
            .iter()
            .map(|name| name.parse())
            .collect::<Result<Vec<_>>>()?
    };

    let mut reports = Vec::new();
    let mut rejected = 0;
    for path in paths {
        match load_local_file(path) {
            Ok(file) => {
                let checks: Vec<Value> = match file.dimensions {
                    Some(dimensions) => platforms
                        .iter()
                        .map(|platform| {
                            let image_type =
                                optimal_image_type(dimensions.width, dimensions.height, *platform);
                            let target = target_dimensions(*platform, image_type);
                            json!({
                                "platform": platform.as_str(),
                                "image_type": image_type.as_str(),
                                "target": target.map(|t| format!("{}x{}", t.width, t.height)),
                                "exact": target == Some(dimensions),
                                "aspect_ratio_ok": is_aspect_ratio_allowed(*platform, dimensions),
                            })
                        })
                        .collect(),
                    None => Vec::new(),
                };
                reports.push(json!({
                    "name": file.name,
                    "mime": file.mime.as_str(),
                    "size": file.size(),
                    "dimensions": file.dimensions.map(|d| format!("{}x{}", d.width, d.height)),
                    "platforms": checks,
                }));
            }
            Err(e) => {
                rejected += 1;
                eprintln!("Rejected: {}", e);
            }
        }
    }

    if json_output {
        print_json(&Value::Array(reports))?;
    } else {
        for report in &reports {
            print_inspection(report);
        }
    }

    if rejected > 0 {
        return Err(BuzzError::Validation(format!(
            "{} of {} file(s) cannot be posted",
            rejected,
            paths.len()
        )));
    }
    Ok(())
}

fn print_inspection(report: &Value) {
    let text = |key: &str| report[key].as_str().unwrap_or("-").to_string();
    println!(
        "{}\t{}\t{}\t{}",
        text("name"),
        text("mime"),
        human_size(report["size"].as_u64().unwrap_or(0)),
        text("dimensions")
    );
    for check in report["platforms"].as_array().into_iter().flatten() {
        let mut line = format!(
            "  {}: {} {}",
            check["platform"].as_str().unwrap_or("-"),
            check["image_type"].as_str().unwrap_or("-"),
            check["target"].as_str().unwrap_or("-"),
        );
        if check["exact"].as_bool() == Some(false) {
            line.push_str(" (resize needed)");
        }
        if check["aspect_ratio_ok"].as_bool() == Some(false) {
            line.push_str(" aspect ratio not accepted");
        }
        println!("{}", line);
    }
}

fn human_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let bytes = bytes as f64;
    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < KB * KB {
        format!("{:.1} KB", bytes / KB)
    } else {
        format!("{:.1} MB", bytes / (KB * KB))
    }
}

fn print_items(items: &[MediaItem], json_output: bool) -> Result<()> {
    if json_output {
        let value = serde_json::to_value(items)
            .map_err(|e| BuzzError::InvalidInput(format!("Failed to encode media: {}", e)))?;
        return print_json(&value);
    }
    for item in items {
        println!("{}\t{}", item.name(), item.url);
    }
    Ok(())
}

fn print_json(value: &Value) -> Result<()> {
    let body = serde_json::to_string_pretty(value)
        .map_err(|e| BuzzError::InvalidInput(format!("Failed to encode output: {}", e)))?;
    println!("{}", body);
    Ok(())
}
