//! buzz-auth - Sign in to BuzzConnect and manage your password

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use libbuzzconnect::api::http::HttpBackend;
use libbuzzconnect::api::Backend;
use libbuzzconnect::auth::{
    sign_in, sign_up, welcome_message, ChangePasswordForm, PasswordResetFlow, SignUp,
};
use libbuzzconnect::error::BuzzError;
use libbuzzconnect::logging;
use libbuzzconnect::service::BuzzService;
use libbuzzconnect::session::{clear_token, save_token, token_path, Session};
use libbuzzconnect::Config;
use secrecy::SecretString;
use std::io::Write;
use tracing::warn;

#[derive(Parser)]
#[command(name = "buzz-auth")]
#[command(version, about = "Sign in to BuzzConnect and manage your password", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Read passwords and codes from stdin, one per line, instead of prompting
    #[arg(long, global = true)]
    stdin: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and save the session token
    Login {
        /// Account email (prompted if omitted)
        #[arg(long, env = "BUZZ_EMAIL")]
        email: Option<String>,
    },

    /// Create an account and save the session token
    Register {
        /// Display name (prompted if omitted)
        #[arg(long)]
        name: Option<String>,

        /// Account email (prompted if omitted)
        #[arg(long, env = "BUZZ_EMAIL")]
        email: Option<String>,

        /// Accept the terms and conditions
        #[arg(long)]
        accept_terms: bool,
    },

    /// Sign out and remove the saved session token
    Logout,

    /// Show the signed-in user and connected accounts
    Whoami {
        /// Output format (text or json)
        #[arg(short, long, default_value = "text")]
        #[arg(value_parser = ["text", "json"])]
        format: String,
    },

    /// Change the password of the signed-in user
    ChangePassword,

    /// Reset a forgotten password with a one-time code sent by email
    ResetPassword {
        /// Account email (prompted if omitted)
        #[arg(long, env = "BUZZ_EMAIL")]
        email: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init_from_env(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        let code = e.downcast_ref::<BuzzError>().map(BuzzError::exit_code).unwrap_or(1);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let input = Input { stdin: cli.stdin };
    match cli.command {
        Commands::Login { email } => login(&input, email).await,
        Commands::Register {
            name,
            email,
            accept_terms,
        } => register(&input, name, email, accept_terms).await,
        Commands::Logout => logout().await,
        Commands::Whoami { format } => whoami(format == "json").await,
        Commands::ChangePassword => change_password(&input).await,
        Commands::ResetPassword { email } => reset_password(&input, email).await,
    }
}

/// Where prompts are answered from
struct Input {
    stdin: bool,
}

impl Input {
    fn line(&self, prompt: &str) -> Result<String> {
        if !self.stdin {
            eprint!("{}", prompt);
            std::io::stderr().flush().ok();
        }
        let mut line = String::new();
        std::io::stdin()
            .read_line(&mut line)
            .context("Failed to read from stdin")?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn secret(&self, prompt: &str) -> Result<SecretString> {
        let value = if self.stdin {
            self.line(prompt)?
        } else {
            rpassword::prompt_password(prompt).context("Failed to read password")?
        };
        Ok(SecretString::from(value))
    }
}

/// Backend client without a session, for the sign-in and reset endpoints
fn anonymous_backend() -> Result<(Config, HttpBackend)> {
    let config = Config::load()?;
    let backend = HttpBackend::new(&config, Session::anonymous())?;
    Ok((config, backend))
}

async fn login(input: &Input, email: Option<String>) -> Result<()> {
    let (_, backend) = anonymous_backend()?;
    let email = match email {
        Some(email) => email,
        None => input.line("Email: ")?,
    };
    let password = input.secret("Password: ")?;

    let response = sign_in(&backend, &email, &password).await?;
    let path = token_path()?;
    save_token(&path, &SecretString::from(response.token))?;

    let who = response
        .user
        .and_then(|u| u.name.or(u.email))
        .unwrap_or_else(|| email.trim().to_string());
    println!("Logged in as {}", who);
    Ok(())
}

async fn register(
    input: &Input,
    name: Option<String>,
    email: Option<String>,
    accept_terms: bool,
) -> Result<()> {
    let (_, backend) = anonymous_backend()?;
    let display_name = match name {
        Some(name) => name,
        None => input.line("Name: ")?,
    };
    let email = match email {
        Some(email) => email,
        None => input.line("Email: ")?,
    };
    let form = SignUp {
        display_name,
        email,
        password: input.secret("Password: ")?,
        confirm_password: input.secret("Confirm password: ")?,
        accept_terms,
    };

    let response = sign_up(&backend, &form).await?;
    let message = welcome_message(&response, &form);
    save_token(&token_path()?, &SecretString::from(response.token))?;
    println!("{}", message);
    Ok(())
}

async fn logout() -> Result<()> {
    let config = Config::load()?;
    let session = Session::load()?;
    if session.is_authenticated() {
        let backend = HttpBackend::new(&config, session)?;
        // The local token is removed even when the backend cannot be reached
        if let Err(e) = backend.logout().await {
            warn!(error = %e, "Backend logout failed");
        }
    }

    clear_token(&token_path()?)?;
    if std::env::var("BUZZ_TOKEN").is_ok() {
        eprintln!("Note: BUZZ_TOKEN is still set in your environment");
    }
    println!("Logged out");
    Ok(())
}

async fn whoami(json_output: bool) -> Result<()> {
    let service = BuzzService::new()?;
    let profile = service.backend().user_profile().await?;

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&profile).context("Failed to encode profile")?
        );
        return Ok(());
    }

    if let Some(name) = &profile.name {
        println!("Name:  {}", name);
    }
    if let Some(email) = &profile.email {
        println!("Email: {}", email);
    }
    let platforms = profile.connected_platforms();
    if platforms.is_empty() {
        println!("No connected platforms");
        return Ok(());
    }
    println!("Connected platforms:");
    for platform in platforms {
        println!("  {}", platform.display_name());
        for account in profile.accounts_for(platform) {
            let id = account.selection_id().unwrap_or("-");
            let label = account
                .display_name
                .as_deref()
                .or(account.username.as_deref())
                .unwrap_or("Unknown Account");
            println!("    {}\t{}", id, label);
        }
    }
    Ok(())
}

async fn change_password(input: &Input) -> Result<()> {
    let service = BuzzService::new()?;
    let mut form = ChangePasswordForm::new();

    let current = input.secret("Current password: ")?;
    form.verify_current(service.backend(), current).await?;

    let new_password = input.secret("New password: ")?;
    let confirm = input.secret("Confirm new password: ")?;
    form.update(service.backend(), &new_password, &confirm).await?;

    println!("Password updated successfully!");
    Ok(())
}

async fn reset_password(input: &Input, email: Option<String>) -> Result<()> {
    let (_, backend) = anonymous_backend()?;
    let mut flow = PasswordResetFlow::new();
    flow.forgot_password();

    let email = match email {
        Some(email) => email,
        None => input.line("Email: ")?,
    };
    flow.send_otp(&backend, &email).await?;
    if let Some(notice) = flow.notice() {
        eprintln!("{}", notice);
    }

    let otp = input.line("OTP: ")?;
    flow.verify_otp(&backend, &otp).await?;

    let new_password = input.secret("New password: ")?;
    let confirm = input.secret("Confirm new password: ")?;
    flow.reset_password(&backend, &new_password, &confirm).await?;

    println!("{}", flow.notice().unwrap_or("Password reset successfully!"));
    Ok(())
}
