//! CLI module for the TagLink client.
//!
//! Provides subcommands for driving the TagLink service from a terminal:
//! - `login` / `logout` - Session management
//! - `signup` / `verify-email` - Account creation and OTP verification
//! - `reset` - Interactive password-reset wizard
//! - `profile ...` - Profile display, updates, and email change
//! - `tag ...` - QR tag provisioning, updates, and public lookup
//! - `posts ...` / `contact` - Community posts and the contact form
//! - `gate` - Show what the auth gate decides for a client path
//! - `config check` - Validate configuration file

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::sync::mpsc;

use crate::api::types::{
    ContactDetails, ContactMessage, NewPost, ProfileUpdate, SignupRequest, UserProfile,
};
use crate::api::ApiError;
use crate::auth::Access;
use crate::config::Config;
use crate::qr::{LookupOutcome, TagError, TagService, NOT_FOUND_MESSAGE};
use crate::validation::{self, ErrorSet};
use crate::wizard::cooldown::Ticker;
use crate::wizard::flows::{
    EmailChangeBackend, PasswordResetBackend, SignupVerificationBackend, EMAIL_CHANGE,
    PASSWORD_RESET, SIGNUP_VERIFICATION,
};
use crate::wizard::signup_cache::PendingSignupCache;
use crate::wizard::{fields, StepKind, SubmitOutcome, VerificationBackend, Wizard};
use crate::AppContext;

/// CLI arguments structure
#[derive(Parser, Debug)]
#[command(name = "taglink")]
#[command(author, version, about = "Headless client for the TagLink QR contact-tag service", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "taglink.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// API URL to connect to (overrides the config file)
    #[arg(long, env = "TAGLINK_API_URL")]
    pub api_url: Option<String>,

    /// Account email for authenticated commands
    #[arg(long, env = "TAGLINK_EMAIL", global = true)]
    pub email: Option<String>,

    /// Account password for authenticated commands
    #[arg(long, env = "TAGLINK_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and show the account profile
    Login,

    /// Sign out, revoking the server-side session
    Logout,

    /// Create an account; a verification code is emailed to you
    Signup {
        /// Display name for the new account
        #[arg(long)]
        name: String,
        /// Accept the terms and conditions
        #[arg(long)]
        accept_terms: bool,
    },

    /// Verify a signed-up email with the code that was sent to it
    VerifyEmail {
        /// The 6-digit code from the email
        otp: Option<String>,
        /// Re-send the verification code instead of verifying
        #[arg(long)]
        resend: bool,
    },

    /// Run the interactive password-reset wizard
    Reset,

    /// Profile management commands
    #[command(subcommand)]
    Profile(ProfileCommands),

    /// QR tag management commands
    #[command(subcommand)]
    Tag(TagCommands),

    /// Community posts
    #[command(subcommand)]
    Posts(PostsCommands),

    /// Send a message through the contact form
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long = "from")]
        from_email: String,
        #[arg(long)]
        message: String,
    },

    /// Show what the auth gate decides for a client path
    Gate {
        /// Client path, e.g. /dashboard
        path: String,
    },

    /// Configuration management commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Profile subcommands
#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Show the signed-in profile
    Show,
    /// Update profile fields
    Update {
        #[arg(long)]
        name: Option<String>,
        /// Phone number in international format
        #[arg(long)]
        number: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
    /// Change the account email (interactive OTP verification)
    ChangeEmail {
        /// The new email address
        new_email: String,
    },
}

/// Tag subcommands
#[derive(Subcommand, Debug)]
pub enum TagCommands {
    /// Provision a new QR tag
    Provision {
        /// Serial number printed on the physical tag
        serial: String,
        #[arg(long)]
        name: String,
        #[arg(long = "contact-email")]
        contact_email: String,
        #[arg(long)]
        number: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
    /// Show your provisioned tag
    Show,
    /// Update the contact details on your tag
    Update {
        #[arg(long)]
        name: String,
        #[arg(long = "contact-email")]
        contact_email: String,
        #[arg(long)]
        number: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
    /// Look up the contact details behind a serial number (no account needed)
    Lookup {
        /// Serial number from a scanned tag
        serial: String,
    },
}

/// Posts subcommands
#[derive(Subcommand, Debug)]
pub enum PostsCommands {
    /// List community posts
    List,
    /// Create a post
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate configuration file
    Check,
}

// ============================================================================
// CLI Command Handlers
// ============================================================================

/// Run a CLI command
pub async fn run_command(cli: &Cli, mut config: Config) -> Result<()> {
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }

    if let Commands::Config(ConfigCommands::Check) = &cli.command {
        return cmd_config_check(cli);
    }

    let ctx = AppContext::new(config).context("Failed to create HTTP client")?;

    match &cli.command {
        Commands::Login => cmd_login(cli, &ctx).await,
        Commands::Logout => cmd_logout(cli, &ctx).await,
        Commands::Signup { name, accept_terms } => cmd_signup(cli, &ctx, name, *accept_terms).await,
        Commands::VerifyEmail { otp, resend } => {
            cmd_verify_email(&ctx, otp.as_deref(), *resend).await
        }
        Commands::Reset => cmd_reset(cli, &ctx).await,
        Commands::Profile(command) => match command {
            ProfileCommands::Show => cmd_profile_show(cli, &ctx).await,
            ProfileCommands::Update {
                name,
                number,
                address,
            } => cmd_profile_update(cli, &ctx, name, number, address).await,
            ProfileCommands::ChangeEmail { new_email } => {
                cmd_change_email(cli, &ctx, new_email).await
            }
        },
        Commands::Tag(command) => match command {
            TagCommands::Provision {
                serial,
                name,
                contact_email,
                number,
                address,
            } => {
                let contact = contact_from_args(name, contact_email, number, address);
                cmd_tag_provision(cli, &ctx, serial, &contact).await
            }
            TagCommands::Show => cmd_tag_show(cli, &ctx).await,
            TagCommands::Update {
                name,
                contact_email,
                number,
                address,
            } => {
                let contact = contact_from_args(name, contact_email, number, address);
                cmd_tag_update(cli, &ctx, &contact).await
            }
            TagCommands::Lookup { serial } => cmd_tag_lookup(&ctx, serial).await,
        },
        Commands::Posts(command) => match command {
            PostsCommands::List => cmd_posts_list(&ctx).await,
            PostsCommands::Create { title, content } => {
                cmd_posts_create(cli, &ctx, title, content).await
            }
        },
        Commands::Contact {
            name,
            from_email,
            message,
        } => cmd_contact(&ctx, name, from_email, message).await,
        Commands::Gate { path } => cmd_gate(&ctx, path).await,
        Commands::Config(ConfigCommands::Check) => unreachable!("handled above"),
    }
}

/// Sign in with the credentials from flags or environment
async fn sign_in(cli: &Cli, ctx: &AppContext) -> Result<UserProfile> {
    let email = cli
        .email
        .as_deref()
        .context("Email required. Use --email or set TAGLINK_EMAIL.")?;
    let password = cli
        .password
        .as_deref()
        .context("Password required. Use --password or set TAGLINK_PASSWORD.")?;

    if let Err(message) = validation::validate_email(email) {
        bail!(message);
    }
    if let Err(message) = validation::validate_login_password(password) {
        bail!(message);
    }

    ctx.api.login(email, password).await.map_err(friendly)
}

async fn cmd_login(cli: &Cli, ctx: &AppContext) -> Result<()> {
    let user = sign_in(cli, ctx).await?;
    println!("[OK] Signed in as {} <{}>", user.name, user.email);
    Ok(())
}

async fn cmd_logout(cli: &Cli, ctx: &AppContext) -> Result<()> {
    sign_in(cli, ctx).await?;
    ctx.api.logout().await.map_err(friendly)?;
    ctx.auth.clear();
    println!("[OK] Signed out.");
    Ok(())
}

async fn cmd_signup(cli: &Cli, ctx: &AppContext, name: &str, accept_terms: bool) -> Result<()> {
    let email = cli
        .email
        .as_deref()
        .context("Email required. Use --email or set TAGLINK_EMAIL.")?;
    let password = cli
        .password
        .as_deref()
        .context("Password required. Use --password or set TAGLINK_PASSWORD.")?;

    let mut errors = ErrorSet::new();
    errors.record("name", validation::validate_required("Name", name));
    errors.record("email", validation::validate_email(email));
    errors.record("password", validation::validate_password_strength(password));
    errors.record("terms", validation::validate_terms(accept_terms));
    report_errors(&errors)?;

    let pending = SignupRequest {
        name: name.trim().to_string(),
        email: email.trim().to_string(),
        password: password.to_string(),
    };

    // Parked so `verify-email` (and resends) can pick it up later.
    let cache = PendingSignupCache::new(&ctx.config.storage.data_dir);
    cache.save(&pending)?;

    let backend = SignupVerificationBackend::new(&ctx.api, pending.clone());
    let mut wizard = Wizard::new(&SIGNUP_VERIFICATION, backend);
    wizard.open();
    wizard.set_field(fields::EMAIL, &pending.email);

    match wizard.submit().await {
        SubmitOutcome::Advanced => {
            println!("[OK] Account created. A 6-digit code was sent to {}.", pending.email);
            println!();
            println!("Verify with: taglink verify-email <code>");
            Ok(())
        }
        SubmitOutcome::Failed => {
            let message = wizard
                .error_message()
                .unwrap_or("Signup failed")
                .to_string();
            cache.clear()?;
            bail!(message)
        }
        other => bail!("Unexpected signup outcome: {:?}", other),
    }
}

async fn cmd_verify_email(ctx: &AppContext, otp: Option<&str>, resend: bool) -> Result<()> {
    let cache = PendingSignupCache::new(&ctx.config.storage.data_dir);
    let pending = cache
        .load()?
        .context("No pending signup found. Run 'taglink signup' first.")?;

    if resend {
        ctx.api.signup(&pending).await.map_err(friendly)?;
        println!("[OK] A new code was sent to {}.", pending.email);
        return Ok(());
    }

    let otp = otp.context("Provide the 6-digit code, or use --resend to request a new one.")?;
    if let Err(message) = validation::validate_otp(otp) {
        bail!(message);
    }

    ctx.api
        .verify_signup_otp(&pending.email, otp.trim())
        .await
        .map_err(friendly)?;
    cache.clear()?;

    println!("[OK] {} verified. You can now sign in.", pending.email);
    Ok(())
}

async fn cmd_reset(cli: &Cli, ctx: &AppContext) -> Result<()> {
    println!("=== Password Reset ===");
    println!("Type 'back', 'resend', or 'cancel' at any prompt.");
    println!();

    let backend = PasswordResetBackend::new(&ctx.api);
    let wizard = Wizard::new(&PASSWORD_RESET, backend);
    run_interactive_flow(wizard, cli.email.as_deref()).await
}

async fn cmd_change_email(cli: &Cli, ctx: &AppContext, new_email: &str) -> Result<()> {
    sign_in(cli, ctx).await?;

    println!("=== Email Change ===");
    println!("Type 'back', 'resend', or 'cancel' at any prompt.");
    println!();

    let backend = EmailChangeBackend::new(&ctx.api);
    let wizard = Wizard::new(&EMAIL_CHANGE, backend);
    run_interactive_flow(wizard, Some(new_email)).await
}

async fn cmd_profile_show(cli: &Cli, ctx: &AppContext) -> Result<()> {
    sign_in(cli, ctx).await?;
    let profile = ctx.api.profile().await.map_err(friendly)?;
    print_profile(&profile);
    Ok(())
}

async fn cmd_profile_update(
    cli: &Cli,
    ctx: &AppContext,
    name: &Option<String>,
    number: &Option<String>,
    address: &Option<String>,
) -> Result<()> {
    if name.is_none() && number.is_none() && address.is_none() {
        bail!("Nothing to update. Pass --name, --number, or --address.");
    }

    let mut errors = ErrorSet::new();
    if let Some(name) = name {
        errors.record("name", validation::validate_required("Name", name));
    }
    if let Some(number) = number {
        errors.record("number", validation::validate_phone(number));
    }
    if let Some(address) = address {
        errors.record("address", validation::validate_address(address));
    }
    report_errors(&errors)?;

    sign_in(cli, ctx).await?;
    let update = ProfileUpdate {
        name: name.clone(),
        number: number.clone(),
        address: address.clone(),
    };
    let profile = ctx.api.update_profile(&update).await.map_err(friendly)?;

    println!("[OK] Profile updated.");
    println!();
    print_profile(&profile);
    Ok(())
}

async fn cmd_tag_provision(
    cli: &Cli,
    ctx: &AppContext,
    serial: &str,
    contact: &ContactDetails,
) -> Result<()> {
    sign_in(cli, ctx).await?;

    let service = TagService::new(&ctx.api, &ctx.config.api.site_url);
    let record = match service.provision(serial, contact).await {
        Ok(record) => record,
        Err(err) => return Err(tag_error(err)),
    };

    println!("[OK] Tag provisioned!");
    println!();
    println!("Serial:   {}", record.serial_number);
    println!("QR image: {}", record.qr_image_url);
    println!();
    println!(
        "Anyone scanning it will be sent to {}",
        crate::qr::contact_url(&ctx.config.api.site_url, &record.serial_number)
    );
    Ok(())
}

async fn cmd_tag_show(cli: &Cli, ctx: &AppContext) -> Result<()> {
    sign_in(cli, ctx).await?;

    let service = TagService::new(&ctx.api, &ctx.config.api.site_url);
    match service.my_tag().await.map_err(tag_error)? {
        Some(record) => {
            println!("Serial:   {}", record.serial_number);
            println!("QR image: {}", record.qr_image_url);
            println!();
            print_contact(&record.contact_details);
        }
        None => {
            println!("No tag provisioned yet. Use 'taglink tag provision' to create one.");
        }
    }
    Ok(())
}

async fn cmd_tag_update(cli: &Cli, ctx: &AppContext, contact: &ContactDetails) -> Result<()> {
    sign_in(cli, ctx).await?;

    let service = TagService::new(&ctx.api, &ctx.config.api.site_url);
    let record = service.update_contact(contact).await.map_err(tag_error)?;

    println!("[OK] Contact details updated for tag {}.", record.serial_number);
    Ok(())
}

async fn cmd_tag_lookup(ctx: &AppContext, serial: &str) -> Result<()> {
    let service = TagService::new(&ctx.api, &ctx.config.api.site_url);

    match service.resolve(serial).await.map_err(tag_error)? {
        LookupOutcome::Found(contact) => {
            println!("Contact details for tag {}:", serial.trim());
            println!();
            print_contact(&contact);
        }
        LookupOutcome::NotFound => {
            println!("{}", NOT_FOUND_MESSAGE);
        }
    }
    Ok(())
}

async fn cmd_posts_list(ctx: &AppContext) -> Result<()> {
    let posts = ctx.api.posts().await.map_err(friendly)?;

    if posts.is_empty() {
        println!("No posts yet.");
        return Ok(());
    }

    println!();
    println!("{:<30}  {:<20}  {:<16}", "TITLE", "AUTHOR", "POSTED");
    println!("{}", "-".repeat(70));
    for post in posts {
        let author = post.author.as_deref().unwrap_or("-");
        let posted = post
            .created_at
            .as_deref()
            .map(format_timestamp)
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<30}  {:<20}  {:<16}",
            truncate(&post.title, 30),
            truncate(author, 20),
            posted
        );
    }
    println!();
    Ok(())
}

async fn cmd_posts_create(cli: &Cli, ctx: &AppContext, title: &str, content: &str) -> Result<()> {
    let mut errors = ErrorSet::new();
    errors.record("title", validation::validate_required("Title", title));
    errors.record("content", validation::validate_required("Content", content));
    report_errors(&errors)?;

    sign_in(cli, ctx).await?;
    let post = ctx
        .api
        .create_post(&NewPost { title, content })
        .await
        .map_err(friendly)?;

    println!("[OK] Posted \"{}\".", post.title);
    Ok(())
}

async fn cmd_contact(ctx: &AppContext, name: &str, from_email: &str, message: &str) -> Result<()> {
    let mut errors = ErrorSet::new();
    errors.record("name", validation::validate_required("Name", name));
    errors.record("email", validation::validate_email(from_email));
    errors.record("message", validation::validate_required("Message", message));
    report_errors(&errors)?;

    ctx.api
        .send_contact_message(&ContactMessage {
            name,
            email: from_email,
            message,
        })
        .await
        .map_err(friendly)?;

    println!("[OK] Message sent. We'll get back to you at {}.", from_email);
    Ok(())
}

async fn cmd_gate(ctx: &AppContext, path: &str) -> Result<()> {
    match ctx.auth.gate(path).await {
        Access::Granted => match ctx.auth.user() {
            Some(user) => println!("{}: granted (signed in as {})", path, user.email),
            None => println!("{}: granted", path),
        },
        Access::Redirect { target } => println!("{}: redirect -> {}", path, target),
    }
    Ok(())
}

/// Validate configuration file
fn cmd_config_check(cli: &Cli) -> Result<()> {
    let config_path = &cli.config;

    println!("Checking configuration file: {}", config_path.display());
    println!();

    if !config_path.exists() {
        println!(
            "[!!] Configuration file not found: {}",
            config_path.display()
        );
        println!();
        println!("Defaults will be used. To customize, create taglink.toml.");
        return Ok(());
    }

    match Config::load(config_path) {
        Ok(config) => {
            println!("[OK] Configuration file is valid!");
            println!();
            println!("=== Configuration Summary ===");
            println!();
            println!("API:");
            println!("  Base URL:  {}", config.api.base_url);
            println!("  Site URL:  {}", config.api.site_url);
            println!("  Timeout:   {}s", config.api.timeout_secs);
            println!();
            println!("Storage:");
            println!("  Data Dir:  {}", config.storage.data_dir.display());
            println!();
            println!("Logging:");
            println!("  Level:     {}", config.logging.level);
            println!();

            if config.api.base_url.starts_with("http://")
                && !config.api.base_url.contains("localhost")
                && !config.api.base_url.contains("127.0.0.1")
            {
                println!("Warnings:");
                println!("  [!] API base URL is plain HTTP; the session cookie will travel unencrypted");
                println!();
            }

            Ok(())
        }
        Err(e) => {
            println!("[!!] Configuration file is invalid!");
            println!();
            println!("Error: {}", e);
            anyhow::bail!("Invalid configuration file");
        }
    }
}

// ============================================================================
// Interactive wizard loop
// ============================================================================

/// Drive one verification flow at the terminal.
///
/// stdin lines arrive over a channel so the resend countdown keeps ticking
/// while a prompt is waiting for input.
async fn run_interactive_flow<B: VerificationBackend>(
    mut wizard: Wizard<B>,
    initial_email: Option<&str>,
) -> Result<()> {
    wizard.open();

    let (line_tx, mut line_rx) = mpsc::channel::<String>(4);
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        loop {
            let mut line = String::new();
            match stdin.read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    if line_tx.blocking_send(line.trim_end().to_string()).is_err() {
                        break;
                    }
                }
            }
        }
    });

    let (tick_tx, mut tick_rx) = mpsc::channel::<()>(1);
    let mut ticker = Ticker::new();
    let mut awaiting_confirm = false;

    // A pre-supplied email submits step 1 straight away.
    if let Some(email) = initial_email {
        wizard.set_field(fields::EMAIL, email);
        println!("Requesting a code for {}...", email);
        match wizard.submit().await {
            SubmitOutcome::Advanced => {
                if wizard.cooldown_remaining() > 0 {
                    ticker.start(tick_tx.clone());
                }
            }
            SubmitOutcome::Invalid { focus } => {
                println!("[!!] {}", wizard.errors().get(focus).unwrap_or("Invalid input"));
            }
            SubmitOutcome::Failed => {
                println!("[!!] {}", wizard.error_message().unwrap_or("Request failed"));
            }
            _ => {}
        }
    }

    prompt(&wizard, awaiting_confirm);
    loop {
        tokio::select! {
            Some(()) = tick_rx.recv() => {
                wizard.tick();
                if wizard.cooldown_remaining() == 0 {
                    ticker.stop();
                    println!("(you can now type 'resend' to request a new code)");
                }
            }
            line = line_rx.recv() => {
                let Some(line) = line else {
                    wizard.cancel();
                    bail!("Input closed; flow cancelled.");
                };
                let input = line.trim();

                match input {
                    "" => {}
                    "cancel" => {
                        wizard.cancel();
                        println!("Cancelled.");
                        return Ok(());
                    }
                    "back" => {
                        wizard.back();
                        awaiting_confirm = false;
                    }
                    "resend" => match wizard.resend().await {
                        SubmitOutcome::Resent => {
                            println!("[OK] A new code is on its way.");
                            ticker.start(tick_tx.clone());
                        }
                        SubmitOutcome::Ignored => println!(
                            "Resend not available yet ({}s remaining).",
                            wizard.cooldown_remaining()
                        ),
                        SubmitOutcome::Failed => {
                            println!("[!!] {}", wizard.error_message().unwrap_or("Resend failed"));
                        }
                        _ => {}
                    },
                    _ => {
                        let submit = match wizard.current_kind() {
                            Some(StepKind::RequestCode) => {
                                wizard.set_field(fields::EMAIL, input);
                                true
                            }
                            Some(StepKind::VerifyCode) => {
                                wizard.set_field(fields::OTP, input);
                                true
                            }
                            Some(StepKind::SetPassword) => {
                                if awaiting_confirm {
                                    wizard.set_field(fields::CONFIRM_NEW_PASSWORD, input);
                                    awaiting_confirm = false;
                                    true
                                } else {
                                    wizard.set_field(fields::NEW_PASSWORD, input);
                                    awaiting_confirm = true;
                                    false
                                }
                            }
                            None => return Ok(()),
                        };

                        if submit {
                            match wizard.submit().await {
                                SubmitOutcome::Advanced => {
                                    if wizard.cooldown_remaining() > 0 && !ticker.is_running() {
                                        ticker.start(tick_tx.clone());
                                    }
                                }
                                SubmitOutcome::Completed => {
                                    println!(
                                        "[OK] {}",
                                        wizard.success_message().unwrap_or("Done.")
                                    );
                                    return Ok(());
                                }
                                SubmitOutcome::Invalid { focus } => {
                                    let message =
                                        wizard.errors().get(focus).unwrap_or("Invalid input");
                                    println!("[!!] {}", message);
                                    if focus == fields::NEW_PASSWORD {
                                        awaiting_confirm = false;
                                    }
                                }
                                SubmitOutcome::Failed => {
                                    println!(
                                        "[!!] {}",
                                        wizard.error_message().unwrap_or("Request failed")
                                    );
                                }
                                SubmitOutcome::Resent | SubmitOutcome::Ignored => {}
                            }
                        }
                    }
                }

                prompt(&wizard, awaiting_confirm);
            }
        }
    }
}

fn prompt<B: VerificationBackend>(wizard: &Wizard<B>, awaiting_confirm: bool) {
    match wizard.current_kind() {
        Some(StepKind::RequestCode) => println!("Email address:"),
        Some(StepKind::VerifyCode) => {
            if wizard.cooldown_remaining() > 0 {
                println!(
                    "6-digit code (resend available in {}s):",
                    wizard.cooldown_remaining()
                );
            } else {
                println!("6-digit code:");
            }
        }
        Some(StepKind::SetPassword) => {
            if awaiting_confirm {
                println!("Confirm new password:");
            } else {
                println!("New password:");
            }
        }
        None => {}
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Map an API failure to a message fit for the terminal
fn friendly(err: ApiError) -> anyhow::Error {
    if err.is_unauthorized() {
        anyhow::anyhow!("Session expired or not signed in. Sign in and try again.")
    } else {
        anyhow::anyhow!(err.user_message())
    }
}

/// Map a tag workflow failure, listing field errors when validation blocked it
fn tag_error(err: TagError) -> anyhow::Error {
    match err {
        TagError::Invalid(errors) => {
            for (field, message) in errors.iter() {
                println!("[!!] {}: {}", field, message);
            }
            anyhow::anyhow!("Fix the fields above and try again.")
        }
        TagError::Api(api_err) => friendly(api_err),
        other => anyhow::anyhow!(other.to_string()),
    }
}

/// Print field errors and fail if any were recorded
fn report_errors(errors: &ErrorSet) -> Result<()> {
    if errors.is_empty() {
        return Ok(());
    }
    for (field, message) in errors.iter() {
        println!("[!!] {}: {}", field, message);
    }
    bail!("Fix the fields above and try again.")
}

fn contact_from_args(
    name: &str,
    email: &str,
    number: &Option<String>,
    address: &Option<String>,
) -> ContactDetails {
    ContactDetails {
        name: name.to_string(),
        email: email.to_string(),
        number: number.clone(),
        address: address.clone(),
    }
}

fn print_profile(profile: &UserProfile) {
    println!("=== Profile ===");
    println!();
    println!("Name:    {}", profile.name);
    println!("Email:   {}", profile.email);
    println!("Phone:   {}", profile.number.as_deref().unwrap_or("-"));
    println!("Address: {}", profile.address.as_deref().unwrap_or("-"));
    if let Some(created) = &profile.created_at {
        println!("Member since: {}", format_timestamp(created));
    }
    println!();
}

fn print_contact(contact: &ContactDetails) {
    println!("Name:    {}", contact.name);
    println!("Email:   {}", contact.email);
    println!("Phone:   {}", contact.number.as_deref().unwrap_or("-"));
    println!("Address: {}", contact.address.as_deref().unwrap_or("-"));
}

/// Format an RFC 3339 timestamp for display, passing it through untouched if
/// it doesn't parse
fn format_timestamp(timestamp: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}

/// Truncate a string to max length with ellipsis
fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len.saturating_sub(3)])
    }
}
