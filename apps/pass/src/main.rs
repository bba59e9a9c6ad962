mod config;
mod local_storage;

use std::path::{Path, PathBuf};

use anyhow::{bail, ensure, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use client_core::{
    register_pod, FormContext, FormStatus, PodClient, RegistrationCredentials, RxingPdf417Reader,
    Session, StatusAction, StatusNotifier,
};
use config::Settings;
use local_storage::{LocalStorage, LOGGED_IN_KEY, RESTORE_PATH_KEY};
use reqwest::Client;
use shared::{
    domain::{AclPermission, DocumentType, FileBlob, UserSubmission},
    error::ProviderError,
};
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "pass", about = "Manage PASS documents in Solid pods")]
struct Cli {
    /// Config file (defaults to ./pass.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    identity_provider: Option<String>,
    #[arg(long, global = true)]
    web_id: Option<String>,
    #[arg(long, global = true)]
    access_token: Option<String>,
    /// User that cross-pod commands fall back to when no username is given.
    #[arg(long, global = true)]
    selected_user: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login,
    Logout,
    Register {
        email: String,
        password: String,
        confirm_password: String,
    },
    Fetch {
        doc_type: DocumentType,
    },
    Search {
        doc_type: DocumentType,
        #[arg(long, default_value = "")]
        username: String,
    },
    Upload {
        doc_type: DocumentType,
        file: PathBuf,
        #[command(flatten)]
        metadata: UploadMetadata,
    },
    CrossUpload {
        doc_type: DocumentType,
        file: PathBuf,
        #[arg(long, default_value = "")]
        username: String,
        #[command(flatten)]
        metadata: UploadMetadata,
    },
    Delete {
        doc_type: DocumentType,
    },
    Permission {
        doc_type: DocumentType,
        permission: AclPermission,
        #[arg(long, default_value = "")]
        username: String,
    },
    ContainerPermission {
        permission: AclPermission,
        #[arg(long, default_value = "")]
        username: String,
    },
    #[command(subcommand)]
    Users(UsersCommand),
    DecodeLicense {
        image: PathBuf,
    },
    Profile,
}

#[derive(clap::Args, Debug)]
struct UploadMetadata {
    /// Expiration date, YYYY-MM-DD.
    #[arg(long)]
    expiration: Option<NaiveDate>,
    #[arg(long)]
    description: Option<String>,
    /// Re-download after upload and compare checksums.
    #[arg(long)]
    verify: bool,
}

#[derive(Subcommand, Debug)]
enum UsersCommand {
    List,
    Add {
        #[arg(long, default_value = "")]
        given_name: String,
        #[arg(long, default_value = "")]
        family_name: String,
        #[arg(long, default_value = "")]
        username: String,
        #[arg(long, default_value = "")]
        web_id: String,
    },
    Delete {
        username: String,
    },
    Select {
        username: String,
    },
}

impl Command {
    fn route(&self) -> &'static str {
        match self {
            Command::Login => "login",
            Command::Logout => "logout",
            Command::Register { .. } => "register",
            Command::Fetch { .. } => "fetch",
            Command::Search { .. } => "search",
            Command::Upload { .. } => "upload",
            Command::CrossUpload { .. } => "cross-upload",
            Command::Delete { .. } => "delete",
            Command::Permission { .. } => "permission",
            Command::ContainerPermission { .. } => "container-permission",
            Command::Users(_) => "users",
            Command::DecodeLicense { .. } => "decode-license",
            Command::Profile => "profile",
        }
    }
}

impl Cli {
    fn apply_overrides(&self, mut settings: Settings) -> Settings {
        if let Some(v) = &self.identity_provider {
            settings.identity_provider = v.clone();
        }
        if let Some(v) = &self.web_id {
            settings.web_id = Some(v.clone());
        }
        if let Some(v) = &self.access_token {
            settings.access_token = Some(v.clone());
        }
        if let Some(v) = &self.selected_user {
            settings.selected_user = Some(v.clone());
        }
        settings
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();
    let settings = cli.apply_overrides(config::load_settings(cli.config.as_deref())?);
    let mut storage = LocalStorage::open(settings.storage_file()?)?;
    let http = Client::new();

    match cli.command {
        Command::Login => {
            let session = connect(&settings, &http).await?;
            storage.set_item(LOGGED_IN_KEY, "true")?;
            info!(web_id = %session.web_id(), "logged in");
            println!("Logged in as {}", session.web_id());
            let route = storage.get_item(RESTORE_PATH_KEY).unwrap_or("login");
            println!("Last visited: {route}");
        }
        Command::Logout => {
            storage.remove_item(LOGGED_IN_KEY)?;
            println!("Logged out");
        }
        Command::Register {
            email,
            password,
            confirm_password,
        } => {
            let provider = Url::parse(&settings.identity_provider)
                .context("invalid identity provider url")?;
            let response = register_pod(
                &http,
                &provider,
                RegistrationCredentials {
                    email,
                    password,
                    confirm_password,
                },
            )
            .await
            .context("registration failed")?;
            println!("{}", serde_json::to_string_pretty(&response)?);
            if let Some(rejection) = ProviderError::from_response(&response) {
                return Err(rejection).context("registration failed");
            }
        }
        Command::DecodeLicense { image } => {
            let bytes = tokio::fs::read(&image)
                .await
                .with_context(|| format!("failed to read '{}'", image.display()))?;
            let notifier = StatusNotifier::new();
            let json = FormStatus::new(&notifier)
                .decode_license(&RxingPdf417Reader, &bytes)
                .await?;
            println!("{json}");
        }
        command => run_logged_in(command, &settings, &mut storage, http).await?,
    }

    Ok(())
}

async fn run_logged_in(
    command: Command,
    settings: &Settings,
    storage: &mut LocalStorage,
    http: Client,
) -> Result<()> {
    ensure!(
        storage.logged_in(),
        "not logged in, run `pass login` first"
    );
    storage.set_item(RESTORE_PATH_KEY, command.route())?;

    let session = connect(settings, &http).await?;
    let client = PodClient::with_http(http, session);
    let notifier = StatusNotifier::new();
    let form = FormContext::new(&client, &notifier);
    let selected_user = settings.selected_user.as_deref();

    match command {
        Command::Fetch { doc_type } => {
            let url = form.fetch_document(doc_type).await?;
            println!("{url}");
        }
        Command::Search { doc_type, username } => {
            let url = form
                .cross_pod_query(&username, selected_user, doc_type)
                .await?;
            println!("{url}");
        }
        Command::Upload {
            doc_type,
            file,
            metadata,
        } => {
            stage_file(&notifier, &file, metadata.verify).await?;
            let record = form
                .upload_document(doc_type, metadata.expiration, metadata.description)
                .await?;
            println!("{}", record.url);
        }
        Command::CrossUpload {
            doc_type,
            file,
            username,
            metadata,
        } => {
            stage_file(&notifier, &file, metadata.verify).await?;
            let record = form
                .cross_pod_write(
                    &username,
                    selected_user,
                    doc_type,
                    metadata.expiration,
                    metadata.description,
                )
                .await?;
            println!("{}", record.url);
        }
        Command::Delete { doc_type } => {
            let container = form.delete_document(doc_type).await?;
            println!("deleted {container}");
        }
        Command::Permission {
            doc_type,
            permission,
            username,
        } => {
            let acl = form
                .set_acl_permission(doc_type, permission, &username, selected_user)
                .await?;
            println!("updated {acl}");
        }
        Command::ContainerPermission {
            permission,
            username,
        } => {
            let acl = form
                .set_container_acl_permission(permission, &username, selected_user)
                .await?;
            println!("updated {acl}");
        }
        Command::Users(command) => run_users(&client, &form, command).await?,
        Command::Profile => {
            let profile = client.fetch_profile_info().await?;
            println!(
                "Name: {}",
                profile.profile_name.as_deref().unwrap_or("No value set")
            );
            println!(
                "Organization: {}",
                profile.organization.as_deref().unwrap_or("No value set")
            );
        }
        Command::Login | Command::Logout | Command::Register { .. } | Command::DecodeLicense { .. } => {
            bail!("`{}` does not need a pod session", command.route())
        }
    }

    Ok(())
}

async fn run_users(client: &PodClient, form: &FormContext<'_>, command: UsersCommand) -> Result<()> {
    match command {
        UsersCommand::List => {
            let users = client.load_user_list().await?;
            client.record_activity().await?;
            for user in client.user_list_activity(users).await {
                let active = user
                    .date_modified
                    .map(|at| at.to_rfc3339())
                    .unwrap_or_else(|| "-".into());
                println!(
                    "{}\t{}\t{}\t{active}",
                    user.username,
                    user.person(),
                    user.web_id
                );
            }
        }
        UsersCommand::Add {
            given_name,
            family_name,
            username,
            web_id,
        } => {
            let users = form
                .add_user(UserSubmission {
                    given_name,
                    family_name,
                    username,
                    web_id,
                })
                .await?;
            println!("{} users", users.len());
        }
        UsersCommand::Delete { username } => {
            let user = find_user(client, &username).await?;
            let remaining = form.delete_user(&user).await?;
            println!("{} users", remaining.len());
        }
        UsersCommand::Select { username } => {
            let user = find_user(client, &username).await?;
            let selected = form.select_user(&user);
            println!("export PASS_SELECTED_USER={selected}");
        }
    }
    Ok(())
}

async fn find_user(client: &PodClient, username: &str) -> Result<shared::domain::User> {
    client
        .load_user_list()
        .await?
        .into_iter()
        .find(|user| user.username == username)
        .with_context(|| format!("no user '{username}' in the user list"))
}

/// Builds the session from settings, exchanging client credentials when configured.
async fn connect(settings: &Settings, http: &Client) -> Result<Session> {
    let session = anonymous_session(settings)?;
    match (
        &settings.client_id,
        &settings.client_secret,
        &settings.access_token,
    ) {
        (Some(id), Some(secret), _) => session
            .login_client_credentials(http, id, secret)
            .await
            .context("login failed"),
        (_, _, Some(token)) => Ok(session.with_access_token(token.clone())),
        _ => bail!("no credentials: set client_id/client_secret or access_token"),
    }
}

fn anonymous_session(settings: &Settings) -> Result<Session> {
    let web_id = settings
        .web_id
        .as_deref()
        .context("web_id is not configured (PASS_WEB_ID or --web-id)")?;
    Session::parse(web_id, &settings.identity_provider).context("invalid web id or provider url")
}

async fn stage_file(notifier: &StatusNotifier, path: &Path, verify: bool) -> Result<()> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("'{}' has no file name", path.display()))?;
    let mut file = FileBlob::new(name, bytes);
    if let Some(content_type) = mime_guess::from_path(path).first_raw() {
        file = file.with_content_type(content_type);
    }
    notifier.dispatch(StatusAction::SetFile(file));
    if verify {
        notifier.dispatch(StatusAction::ToggleVerifyFile);
    }
    Ok(())
}
