mod api;
mod config;
mod history;
mod import;
mod models;
mod store;
mod tui;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use api::{ApiClient, ApiError};
use config::Config;
use history::HistoryEditor;
use import::{FieldMapping, TargetField, apply_mapping, auto_map, parse_delimited, submit_rows};
use models::{
    AccountStatus, Candidate, CandidateUser, Employer, Role, UpdateHistoryEntry, WorkflowAction,
    demo_candidate_users, demo_employers, is_valid_email, is_valid_pan, map_offer_to_joining,
};
use store::{NotificationLog, TokenStore, TokenTier};

#[derive(Parser)]
#[command(name = "redflag")]
#[command(about = "Candidate verification client - track offers, spot red flags, manage approvals")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Admin,
    Employer,
}

impl From<RoleArg> for Role {
    fn from(value: RoleArg) -> Self {
        match value {
            RoleArg::Admin => Role::Admin,
            RoleArg::Employer => Role::Employer,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Manage stored API tokens
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },

    /// Admin: employer accounts and their approval workflow
    Employers {
        #[command(subcommand)]
        command: EmployerCommands,
    },

    /// Admin: self-registered candidate accounts
    CandidateUsers {
        #[command(subcommand)]
        command: CandidateUserCommands,
    },

    /// Employer: submitted candidate records
    Candidates {
        #[command(subcommand)]
        command: CandidateCommands,
    },

    /// Status-history timeline of a candidate account
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },

    /// Import candidate records from a delimited file
    Import {
        /// Path to the CSV file
        file: PathBuf,

        /// Override a proposed column assignment, e.g. --map email="Work Email"
        #[arg(long = "map", value_name = "TARGET=HEADER")]
        map: Vec<String>,

        /// Parse and map only, submit nothing
        #[arg(long)]
        dry_run: bool,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Send a best-effort notification per imported row
        #[arg(long)]
        notify: bool,
    },

    /// Employer: company profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Local notification log
    Notifications {
        #[command(subcommand)]
        command: NotificationCommands,
    },

    /// Admin: dashboard metrics
    Overview,

    /// Interactive dashboard over candidate accounts
    Browse,
}

#[derive(Subcommand)]
enum AuthCommands {
    /// Store an API token
    SetToken {
        token: String,

        #[arg(short, long, value_enum, default_value = "admin")]
        role: RoleArg,

        /// Keep the token for this session only
        #[arg(long)]
        session: bool,
    },

    /// Show which tokens are stored
    Show,

    /// Remove stored tokens
    Clear {
        /// Only this role (default: both)
        #[arg(short, long, value_enum)]
        role: Option<RoleArg>,
    },
}

#[derive(Subcommand)]
enum EmployerCommands {
    /// List employer accounts
    List {
        /// Filter by status (pending, approved, rejected, suspended)
        #[arg(short, long)]
        status: Option<String>,
    },

    /// Approve a pending employer
    Approve { id: String },

    /// Reject a pending employer
    Reject { id: String },

    /// Suspend an approved employer
    Suspend { id: String },

    /// Lift a suspension
    Unsuspend { id: String },
}

#[derive(Subcommand)]
enum CandidateUserCommands {
    /// List candidate accounts
    List {
        #[arg(short, long)]
        status: Option<String>,

        #[arg(long)]
        search: Option<String>,
    },

    /// Show one candidate account with its timeline
    Show { id: String },

    /// Approve a pending candidate account
    Approve { id: String },

    /// Reject a pending candidate account
    Reject { id: String },

    /// Suspend an approved candidate account
    Suspend { id: String },

    /// Lift a suspension
    Unsuspend { id: String },
}

#[derive(Subcommand)]
enum CandidateCommands {
    /// List or search submitted candidate records
    List {
        #[arg(long)]
        search: Option<String>,

        /// Search field (name, email, uan, phone)
        #[arg(short = 't', long = "type")]
        search_type: Option<String>,
    },

    /// Submit one candidate record
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        uan: Option<String>,

        #[arg(long)]
        job_role: Option<String>,

        #[arg(long)]
        offer_date: Option<String>,

        /// Free-form outcome, e.g. "Offer Accepted", "Not Joined After Acceptance"
        #[arg(long)]
        offer_status: Option<String>,

        #[arg(long)]
        reason: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Show one submitted record
    Show { id: String },
}

#[derive(Subcommand)]
enum HistoryCommands {
    /// Append a status note to a candidate's timeline
    Add {
        candidate_id: String,

        #[arg(long)]
        note: String,

        /// Also move the account to this status (admin only)
        #[arg(long)]
        status: Option<String>,

        #[arg(short, long, value_enum, default_value = "admin")]
        role: RoleArg,

        /// Name recorded on the entry
        #[arg(long)]
        author: Option<String>,
    },

    /// Rewrite the note text of one timeline entry
    Edit {
        candidate_id: String,
        entry_id: String,

        #[arg(long)]
        note: String,

        #[arg(short, long, value_enum, default_value = "admin")]
        role: RoleArg,
    },

    /// Remove one timeline entry
    Delete {
        candidate_id: String,
        entry_id: String,

        #[arg(short, long, value_enum, default_value = "admin")]
        role: RoleArg,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Show the company profile
    Show,

    /// Update profile fields
    Update {
        #[arg(long)]
        company: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        pan: Option<String>,

        #[arg(long)]
        address: Option<String>,
    },
}

#[derive(Subcommand)]
enum NotificationCommands {
    /// List recent notifications, newest first
    List,

    /// Empty the log
    Clear,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let tokens = TokenStore::open(&config);

    match cli.command {
        Commands::Auth { command } => match command {
            AuthCommands::SetToken {
                token,
                role,
                session,
            } => {
                let role: Role = role.into();
                let tier = if session {
                    TokenTier::Session
                } else {
                    TokenTier::Durable
                };
                tokens.save(role, &token, tier)?;
                println!("Stored {} token ({}).", role, tier_label(tier));
            }

            AuthCommands::Show => {
                for role in [Role::Admin, Role::Employer] {
                    match tokens.load(role) {
                        Some((token, tier)) => println!(
                            "{:<10} {} ({})",
                            role,
                            mask_token(&token),
                            tier_label(tier)
                        ),
                        None => println!("{:<10} -", role),
                    }
                }
            }

            AuthCommands::Clear { role } => {
                let roles: Vec<Role> = match role {
                    Some(r) => vec![r.into()],
                    None => vec![Role::Admin, Role::Employer],
                };
                for role in roles {
                    tokens.clear(role);
                    println!("Cleared {} tokens.", role);
                }
            }
        },

        Commands::Employers { command } => {
            let api = open_client(&config, &tokens, Role::Admin)?;
            match command {
                EmployerCommands::List { status } => {
                    let employers = fetch_employers(&api, &tokens)?;
                    let filtered: Vec<Employer> = match status.as_deref() {
                        Some(s) => {
                            let wanted = s.to_lowercase();
                            employers
                                .into_iter()
                                .filter(|e| e.status.as_str() == wanted)
                                .collect()
                        }
                        None => employers,
                    };
                    print_employer_table(&filtered);
                }
                EmployerCommands::Approve { id } => {
                    run_employer_action(&api, &tokens, &config, &id, WorkflowAction::Approve)?;
                }
                EmployerCommands::Reject { id } => {
                    run_employer_action(&api, &tokens, &config, &id, WorkflowAction::Reject)?;
                }
                EmployerCommands::Suspend { id } => {
                    run_employer_action(&api, &tokens, &config, &id, WorkflowAction::Suspend)?;
                }
                EmployerCommands::Unsuspend { id } => {
                    run_employer_action(&api, &tokens, &config, &id, WorkflowAction::Unsuspend)?;
                }
            }
        }

        Commands::CandidateUsers { command } => {
            let api = open_client(&config, &tokens, Role::Admin)?;
            match command {
                CandidateUserCommands::List { status, search } => {
                    let records =
                        fetch_candidate_users(&api, &tokens, status.as_deref(), search.as_deref())?;
                    print_candidate_user_table(&records);
                }
                CandidateUserCommands::Show { id } => {
                    let record = api
                        .get_candidate_user(&id)
                        .map_err(|e| classify(e, &tokens, Role::Admin))?;
                    print_candidate_user_detail(&record);
                }
                CandidateUserCommands::Approve { id } => {
                    run_candidate_user_action(&api, &tokens, &config, &id, WorkflowAction::Approve)?;
                }
                CandidateUserCommands::Reject { id } => {
                    run_candidate_user_action(&api, &tokens, &config, &id, WorkflowAction::Reject)?;
                }
                CandidateUserCommands::Suspend { id } => {
                    run_candidate_user_action(&api, &tokens, &config, &id, WorkflowAction::Suspend)?;
                }
                CandidateUserCommands::Unsuspend { id } => {
                    run_candidate_user_action(
                        &api,
                        &tokens,
                        &config,
                        &id,
                        WorkflowAction::Unsuspend,
                    )?;
                }
            }
        }

        Commands::Candidates { command } => {
            let api = open_client(&config, &tokens, Role::Employer)?;
            match command {
                CandidateCommands::List {
                    search,
                    search_type,
                } => {
                    let candidates = api
                        .list_candidates(search.as_deref(), search_type.as_deref())
                        .map_err(|e| classify(e, &tokens, Role::Employer))?;
                    print_candidate_table(&candidates);
                }

                CandidateCommands::Add {
                    name,
                    email,
                    phone,
                    uan,
                    job_role,
                    offer_date,
                    offer_status,
                    reason,
                    notes,
                } => {
                    if !is_valid_email(&email) {
                        bail!("Invalid email address: {}", email);
                    }
                    let mut payload = json!({
                        "fullName": name,
                        "email": email,
                    });
                    for (key, value) in [
                        ("phone", phone),
                        ("uan", uan),
                        ("jobRole", job_role),
                        ("offerDate", offer_date),
                        ("reason", reason),
                        ("notes", notes),
                    ] {
                        if let Some(value) = value {
                            payload[key] = json!(value);
                        }
                    }
                    if let Some(offer_status) = offer_status {
                        payload["joiningStatus"] =
                            json!(map_offer_to_joining(&offer_status).as_str());
                        payload["offerStatus"] = json!(offer_status);
                    }

                    api.create_candidate(&payload)
                        .map_err(|e| classify(e, &tokens, Role::Employer))?;
                    println!("Added candidate record for {}.", name);

                    let log = NotificationLog::open(&config.notifications_db_path())?;
                    log.push("candidate", &format!("Added candidate record for {}", name))?;
                }

                CandidateCommands::Show { id } => {
                    // There is no per-id endpoint for submitted records;
                    // filter the full listing client-side.
                    let candidates = api
                        .list_candidates(None, None)
                        .map_err(|e| classify(e, &tokens, Role::Employer))?;
                    match candidates.iter().find(|c| c.id == id) {
                        Some(c) => print_candidate_detail(c),
                        None => println!("Candidate record '{}' not found.", id),
                    }
                }
            }
        }

        Commands::History { command } => match command {
            HistoryCommands::Add {
                candidate_id,
                note,
                status,
                role,
                author,
            } => {
                let role: Role = role.into();
                let note = note.trim();
                if note.is_empty() {
                    bail!("Note text is required");
                }
                let status = match status.as_deref() {
                    Some(s) => Some(
                        AccountStatus::parse(s).ok_or_else(|| anyhow!("Unknown status '{}'", s))?,
                    ),
                    None => None,
                };

                let api = open_client(&config, &tokens, role)?;
                let mut editor = load_history(&api, &tokens, role, &candidate_id)?;

                if !editor.begin_save() {
                    return Ok(());
                }
                api.add_status_note(&candidate_id, status, note)
                    .map_err(|e| classify(e, &tokens, role))?;
                let author = author.unwrap_or_else(|| role.key().to_string());
                editor.apply_added(note, role, &author, None);
                editor.finish_save();

                println!("Added note #{}.", editor.entries().len());
                print_history(editor.entries());
            }

            HistoryCommands::Edit {
                candidate_id,
                entry_id,
                note,
                role,
            } => {
                let role: Role = role.into();
                let note = note.trim();
                if note.is_empty() {
                    bail!("Note text is required");
                }

                let api = open_client(&config, &tokens, role)?;
                let mut editor = load_history(&api, &tokens, role, &candidate_id)?;
                let idx = editor
                    .entries()
                    .iter()
                    .position(|e| e.id.as_deref() == Some(entry_id.as_str()))
                    .ok_or_else(|| anyhow!("No timeline entry with id '{}'", entry_id))?;

                if !editor.begin_edit(idx) {
                    return Ok(());
                }
                api.edit_history_entry(&candidate_id, &entry_id, note)
                    .map_err(|e| classify(e, &tokens, role))?;
                editor.apply_edited(&entry_id, note);
                editor.cancel_edit();

                println!("Updated entry {}.", entry_id);
                print_history(editor.entries());
            }

            HistoryCommands::Delete {
                candidate_id,
                entry_id,
                role,
            } => {
                let role: Role = role.into();
                let api = open_client(&config, &tokens, role)?;
                let mut editor = load_history(&api, &tokens, role, &candidate_id)?;

                if !editor.begin_save() {
                    return Ok(());
                }
                api.delete_history_entry(&candidate_id, &entry_id)
                    .map_err(|e| classify(e, &tokens, role))?;
                if !editor.apply_deleted(&entry_id) {
                    println!("Entry {} was not in the local timeline.", entry_id);
                }
                editor.finish_save();

                println!("Deleted entry {}.", entry_id);
                print_history(editor.entries());
            }
        },

        Commands::Import {
            file,
            map,
            dry_run,
            yes,
            notify,
        } => {
            let api = open_client(&config, &tokens, Role::Employer)?;
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read file: {}", file.display()))?;

            let parsed = parse_delimited(&content)?;
            let mut mapping = auto_map(&parsed.headers);
            apply_map_overrides(&mut mapping, &map)?;

            print_mapping(&parsed.headers, &mapping);
            let records = apply_mapping(&parsed, &mapping)?;
            println!("\n{} data row(s) ready.", records.len());

            if dry_run {
                return Ok(());
            }
            if !yes && !confirm(&format!("Submit {} record(s)?", records.len()))? {
                println!("Aborted.");
                return Ok(());
            }

            let outcome = submit_rows(&api, &records, notify)
                .map_err(|e| classify(e, &tokens, Role::Employer))?;

            println!("\nResults:");
            println!("  Candidates added:    {}", outcome.added);
            if notify {
                println!("  Notifications sent:  {}", outcome.notified);
            }
            if !outcome.failures.is_empty() {
                println!("  Failed rows:         {}", outcome.failures.len());
                for failure in &outcome.failures {
                    println!("    row {:<4} {}", failure.row, failure.reason);
                }
            }

            let log = NotificationLog::open(&config.notifications_db_path())?;
            log.push(
                "import",
                &format!(
                    "Imported {} candidate(s) from {}",
                    outcome.added,
                    file.display()
                ),
            )?;
        }

        Commands::Profile { command } => {
            let api = open_client(&config, &tokens, Role::Employer)?;
            match command {
                ProfileCommands::Show => {
                    let profile = api
                        .get_profile()
                        .map_err(|e| classify(e, &tokens, Role::Employer))?;
                    println!("Company: {}", profile.company_name);
                    println!("Email:   {}", profile.email);
                    if let Some(phone) = &profile.phone {
                        println!("Phone:   {}", phone);
                    }
                    if let Some(pan) = &profile.pan {
                        println!("PAN:     {}", pan);
                    }
                    if let Some(address) = &profile.address {
                        println!("Address: {}", address);
                    }
                }

                ProfileCommands::Update {
                    company,
                    email,
                    phone,
                    pan,
                    address,
                } => {
                    if let Some(email) = &email {
                        if !is_valid_email(email) {
                            bail!("Invalid email address: {}", email);
                        }
                    }
                    if let Some(pan) = &pan {
                        if !is_valid_pan(pan) {
                            bail!("Invalid PAN format: {} (expected AAAAA9999A)", pan);
                        }
                    }

                    let mut payload = json!({});
                    for (key, value) in [
                        ("companyName", company),
                        ("email", email),
                        ("phone", phone),
                        ("pan", pan),
                        ("address", address),
                    ] {
                        if let Some(value) = value {
                            payload[key] = json!(value);
                        }
                    }
                    if payload.as_object().map(|o| o.is_empty()).unwrap_or(true) {
                        bail!("Nothing to update; pass at least one field flag");
                    }

                    api.update_profile(&payload)
                        .map_err(|e| classify(e, &tokens, Role::Employer))?;
                    println!("Profile updated.");
                }
            }
        }

        Commands::Notifications { command } => {
            let log = NotificationLog::open(&config.notifications_db_path())?;
            match command {
                NotificationCommands::List => {
                    let items = log.list()?;
                    if items.is_empty() {
                        println!("No notifications.");
                    } else {
                        println!("{:<6} {:<7} {:<12} MESSAGE", "ID", "TIME", "TYPE");
                        println!("{}", "-".repeat(70));
                        for item in items {
                            println!(
                                "{:<6} {:<7} {:<12} {}",
                                item.id,
                                item.time,
                                item.kind,
                                truncate(&item.message, 44)
                            );
                        }
                    }
                }
                NotificationCommands::Clear => {
                    log.clear()?;
                    println!("Notification log cleared.");
                }
            }
        }

        Commands::Overview => {
            let api = open_client(&config, &tokens, Role::Admin)?;
            let metrics = api
                .metrics()
                .map_err(|e| classify(e, &tokens, Role::Admin))?;
            println!("Employers:          {}", metrics.total_employers);
            println!("Pending approvals:  {}", metrics.pending_approvals);
            println!("Candidate records:  {}", metrics.total_candidates);
            println!("Red-flagged:        {}", metrics.red_flagged);
        }

        Commands::Browse => {
            let api = open_client(&config, &tokens, Role::Admin)?;
            tui::run_browse(&api)?;
        }
    }

    Ok(())
}

// --- Client plumbing ---

fn open_client(config: &Config, tokens: &TokenStore, role: Role) -> Result<ApiClient> {
    let token = tokens.load(role).map(|(token, _)| token);
    ApiClient::new(&config.api_url, role, token)
}

/// Convert an API failure into the user-facing error. A 401 additionally
/// clears both token tiers for the role and points at the sign-in command.
fn classify(err: ApiError, tokens: &TokenStore, role: Role) -> anyhow::Error {
    match err {
        ApiError::Unauthorized => {
            tokens.clear(role);
            anyhow!(
                "Session expired. Stored {} tokens were cleared; sign in again with: {}",
                role,
                role.login_hint()
            )
        }
        other => anyhow!(other),
    }
}

fn fetch_employers(api: &ApiClient, tokens: &TokenStore) -> Result<Vec<Employer>> {
    match api.list_employers() {
        Ok(employers) => Ok(employers),
        Err(ApiError::Unreachable(_)) => {
            println!("Server unreachable, showing offline demo data.\n");
            Ok(demo_employers())
        }
        Err(e) => Err(classify(e, tokens, Role::Admin)),
    }
}

fn fetch_candidate_users(
    api: &ApiClient,
    tokens: &TokenStore,
    status: Option<&str>,
    search: Option<&str>,
) -> Result<Vec<CandidateUser>> {
    match api.list_candidate_users(status, search) {
        Ok(records) => Ok(records),
        Err(ApiError::Unreachable(_)) => {
            println!("Server unreachable, showing offline demo data.\n");
            Ok(demo_candidate_users())
        }
        Err(e) => Err(classify(e, tokens, Role::Admin)),
    }
}

/// One transition call, then a full re-fetch so the displayed list always
/// reflects the server.
fn run_employer_action(
    api: &ApiClient,
    tokens: &TokenStore,
    config: &Config,
    id: &str,
    action: WorkflowAction,
) -> Result<()> {
    api.employer_action(id, action).map_err(|e| {
        classify(e, tokens, Role::Admin)
            .context(format!("Failed to {} employer {}", action.segment(), id))
    })?;

    let log = NotificationLog::open(&config.notifications_db_path())?;
    log.push("workflow", &format!("Employer {}: {}", id, action))?;

    println!("Done. Refreshed list:\n");
    print_employer_table(&fetch_employers(api, tokens)?);
    Ok(())
}

fn run_candidate_user_action(
    api: &ApiClient,
    tokens: &TokenStore,
    config: &Config,
    id: &str,
    action: WorkflowAction,
) -> Result<()> {
    api.candidate_user_action(id, action).map_err(|e| {
        classify(e, tokens, Role::Admin)
            .context(format!("Failed to {} candidate {}", action.segment(), id))
    })?;

    let log = NotificationLog::open(&config.notifications_db_path())?;
    log.push("workflow", &format!("Candidate {}: {}", id, action))?;

    println!("Done. Refreshed list:\n");
    print_candidate_user_table(&fetch_candidate_users(api, tokens, None, None)?);
    Ok(())
}

fn load_history(
    api: &ApiClient,
    tokens: &TokenStore,
    role: Role,
    candidate_id: &str,
) -> Result<HistoryEditor> {
    let entries = match role {
        Role::Admin => {
            api.get_candidate_user(candidate_id)
                .map_err(|e| classify(e, tokens, role))?
                .update_history
        }
        Role::Employer => api
            .fetch_update_history(candidate_id)
            .map_err(|e| classify(e, tokens, role))?,
    };
    Ok(HistoryEditor::new(entries))
}

// --- Import helpers ---

fn apply_map_overrides(mapping: &mut FieldMapping, overrides: &[String]) -> Result<()> {
    for pair in overrides {
        let (target, header) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("Bad --map value '{}', expected TARGET=HEADER", pair))?;
        let target = TargetField::parse(target).ok_or_else(|| {
            anyhow!(
                "Unknown target field '{}'. Valid fields: {}",
                target,
                TargetField::ALL
                    .iter()
                    .map(|t| t.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        })?;
        mapping.insert(target, header.trim().to_string());
    }
    Ok(())
}

fn print_mapping(headers: &[String], mapping: &FieldMapping) {
    println!("Proposed field mapping:");
    println!("{:<14} SOURCE COLUMN", "TARGET");
    println!("{}", "-".repeat(40));
    for target in TargetField::ALL {
        match mapping.get(&target) {
            Some(header) => println!("{:<14} {}", target.as_str(), header),
            None => println!("{:<14} -", target.as_str()),
        }
    }

    let unmapped: Vec<&str> = headers
        .iter()
        .filter(|h| !mapping.values().any(|m| m == *h))
        .map(String::as_str)
        .collect();
    if !unmapped.is_empty() {
        println!("\nIgnored columns: {}", unmapped.join(", "));
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

// --- Output ---

fn tier_label(tier: TokenTier) -> &'static str {
    match tier {
        TokenTier::Durable => "durable",
        TokenTier::Session => "session",
    }
}

fn mask_token(token: &str) -> String {
    if token.len() <= 8 {
        "********".to_string()
    } else {
        format!("{}...{}", &token[..4], &token[token.len() - 4..])
    }
}

fn print_employer_table(employers: &[Employer]) {
    if employers.is_empty() {
        println!("No employers found.");
        return;
    }
    println!(
        "{:<26} {:<10} {:<24} {:<26} {:>10}  ACTIONS",
        "ID", "STATUS", "COMPANY", "EMAIL", "CANDIDATES"
    );
    println!("{}", "-".repeat(120));
    for emp in employers {
        let actions: Vec<&str> = emp
            .status
            .allowed_actions()
            .iter()
            .map(|a| a.segment())
            .collect();
        println!(
            "{:<26} {:<10} {:<24} {:<26} {:>10}  {}",
            truncate(&emp.id, 24),
            emp.status.as_str(),
            truncate(&emp.company_name, 22),
            truncate(&emp.email, 24),
            emp.candidate_count,
            actions.join("/")
        );
    }
}

fn print_candidate_user_table(records: &[CandidateUser]) {
    if records.is_empty() {
        println!("No candidate accounts found.");
        return;
    }
    println!(
        "{:<26} {:<10} {:<24} {:<26} {:>7}",
        "ID", "STATUS", "NAME", "EMAIL", "UPDATES"
    );
    println!("{}", "-".repeat(98));
    for record in records {
        println!(
            "{:<26} {:<10} {:<24} {:<26} {:>7}",
            truncate(&record.id, 24),
            record.status.as_str(),
            truncate(&record.full_name, 22),
            truncate(&record.email, 24),
            record.update_history.len()
        );
    }
}

fn print_candidate_user_detail(record: &CandidateUser) {
    println!("Candidate {}", record.id);
    println!("Name:     {}", record.full_name);
    println!("Status:   {}", record.status);
    println!("Email:    {}", record.email);
    if let Some(phone) = &record.phone {
        println!("Phone:    {}", phone);
    }
    if let Some(uan) = &record.uan {
        println!("UAN:      {}", uan);
    }
    if let Some(pan) = &record.pan {
        println!("PAN:      {}", pan);
    }
    if let Some(qualification) = &record.qualification {
        println!("Degree:   {}", qualification);
    }
    if !record.skills.is_empty() {
        println!("Skills:   {}", record.skills.join(", "));
    }
    if let Some(ctc) = &record.current_ctc {
        println!("CTC:      {}", ctc);
    }
    if let Some(notice) = &record.notice_period {
        println!("Notice:   {}", notice);
    }
    println!();
    print_history(&record.update_history);
}

fn print_candidate_table(candidates: &[Candidate]) {
    if candidates.is_empty() {
        println!("No candidate records found.");
        return;
    }
    println!(
        "{:<26} {:<22} {:<24} {:<24} {:<10}",
        "ID", "NAME", "OFFER STATUS", "EMAIL", "JOINING"
    );
    println!("{}", "-".repeat(110));
    for c in candidates {
        println!(
            "{:<26} {:<22} {:<24} {:<24} {:<10}",
            truncate(&c.id, 24),
            truncate(&c.full_name, 20),
            truncate(&c.offer_status, 22),
            truncate(&c.email, 22),
            c.joining_status.as_str()
        );
    }
}

fn print_candidate_detail(c: &Candidate) {
    println!("Candidate record {}", c.id);
    println!("Name:          {}", c.full_name);
    println!("Email:         {}", c.email);
    if let Some(phone) = &c.phone {
        println!("Phone:         {}", phone);
    }
    if let Some(uan) = &c.uan {
        println!("UAN:           {}", uan);
    }
    if let Some(job_role) = &c.job_role {
        println!("Role:          {}", job_role);
    }
    if let Some(offer_date) = &c.offer_date {
        println!("Offer date:    {}", offer_date);
    }
    println!("Offer status:  {}", c.offer_status);
    println!("Joining:       {}", c.joining_status);
    if let Some(reason) = &c.reason {
        println!("Reason:        {}", reason);
    }
    if let Some(notes) = &c.notes {
        println!("Notes:         {}", notes);
    }
    if let Some(employer) = &c.employer_name {
        println!("Submitted by:  {}", employer);
    }
}

fn print_history(entries: &[UpdateHistoryEntry]) {
    if entries.is_empty() {
        println!("No timeline entries.");
        return;
    }
    println!("Timeline ({} entries):", entries.len());
    for entry in entries {
        let id = entry.id.as_deref().unwrap_or("(pending id)");
        let company = entry
            .company_name
            .as_deref()
            .map(|c| format!(" ({})", c))
            .unwrap_or_default();
        println!(
            "  #{:<3} {} [{}] {}{}  id={}",
            entry.points, entry.date, entry.updated_by_role, entry.updated_by_name, company, id
        );
        for line in textwrap::fill(&entry.notes, 64).lines() {
            println!("       {}", line);
        }
        for comment in &entry.comments {
            println!("         > {}", comment.text);
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}...", &s[..max.saturating_sub(3)])
    }
}
