use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use config::Config;
use dotenvy::dotenv;

use delivery_admin::api::http::HttpApi;
use delivery_admin::domain::gallery::GalleryValue;
use delivery_admin::domain::types::{EntityId, ResourceName, SortDirection};
use delivery_admin::domain::upload::UploadFile;
use delivery_admin::dto::auth::LoginRequest;
use delivery_admin::forms::auth::LoginForm;
use delivery_admin::forms::fields::FieldValue;
use delivery_admin::forms::status::{StatusChange, StatusChangeForm};
use delivery_admin::models::config::AdminConfig;
use delivery_admin::models::session::Session;
use delivery_admin::pagination::page_window;
use delivery_admin::services::gallery::{BlobUrlStore, GalleryEditor};
use delivery_admin::services::manager::DataManager;
use delivery_admin::services::status::{RowSource, StatusBoard};
use delivery_admin::services::{Notice, NoticeLevel, ServiceError, ServiceResult};

#[derive(Parser)]
#[command(
    name = "delivery-admin",
    about = "Manage catalog, orders and deliveries through the admin API"
)]
struct Cli {
    #[arg(long, global = true, env = "ADMIN_EMAIL")]
    email: Option<String>,
    #[arg(long, global = true, env = "ADMIN_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    /// Use an existing bearer token instead of logging in.
    #[arg(long, global = true, env = "ADMIN_TOKEN", hide_env_values = true)]
    token: Option<String>,
    /// Answer yes to every confirmation.
    #[arg(long, short = 'y', global = true)]
    yes: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print one page of a resource.
    List(ListArgs),
    /// Soft delete records.
    Delete(IdsArgs),
    /// Bring soft deleted records back.
    Restore(IdsArgs),
    /// Permanently delete records.
    ForceDelete(IdsArgs),
    /// Flip the `active` flag of a record.
    ToggleActive(ItemArgs),
    /// Change the status of an order.
    OrderStatus(StatusArgs),
    /// Change the delivery status of an order.
    DeliveryStatus(DeliveryStatusArgs),
    /// Create a record, or update one with `--id`, uploading files.
    Upload(UploadArgs),
}

#[derive(Args)]
struct ListArgs {
    resource: String,
    #[arg(long, default_value_t = 1)]
    page: usize,
    #[arg(long)]
    per_page: Option<usize>,
    /// `key=value`, repeatable.
    #[arg(long = "filter")]
    filters: Vec<String>,
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    order_by: Option<String>,
    #[arg(long)]
    asc: bool,
    /// Show soft deleted records.
    #[arg(long)]
    deleted: bool,
}

#[derive(Args)]
struct IdsArgs {
    resource: String,
    #[arg(required = true, num_args = 1..)]
    ids: Vec<i64>,
}

#[derive(Args)]
struct ItemArgs {
    resource: String,
    id: i64,
}

#[derive(Args)]
struct StatusArgs {
    order_id: i64,
    status: String,
}

#[derive(Args)]
struct DeliveryStatusArgs {
    order_id: i64,
    status: String,
    /// Delivery agent whose orders are reloaded afterwards.
    #[arg(long)]
    agent: Option<i64>,
}

#[derive(Args)]
struct UploadArgs {
    resource: String,
    #[arg(long)]
    id: Option<i64>,
    /// `key=value`, repeatable.
    #[arg(long = "field")]
    fields: Vec<String>,
    #[arg(long)]
    image: Option<PathBuf>,
    #[arg(long)]
    gallery: Vec<PathBuf>,
}

fn split_pair(raw: &str) -> ServiceResult<(String, String)> {
    raw.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .ok_or_else(|| ServiceError::Form(format!("expected key=value, got `{raw}`")))
}

fn ids(raw: &[i64]) -> ServiceResult<Vec<EntityId>> {
    raw.iter()
        .map(|id| EntityId::new(*id).map_err(ServiceError::from))
        .collect()
}

fn read_file(path: &PathBuf) -> ServiceResult<UploadFile> {
    UploadFile::from_path(path)
        .map_err(|err| ServiceError::Form(format!("cannot read {}: {err}", path.display())))
}

fn confirm(message: &str, assume_yes: bool) -> bool {
    if assume_yes {
        return true;
    }
    print!("{message} [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn print_notices(notices: Vec<Notice>) {
    for notice in notices {
        match notice.level {
            NoticeLevel::Error => eprintln!("error: {}", notice.message),
            _ => println!("{}", notice.message),
        }
    }
}

/// Confirms or dismisses whatever `manager` has staged.
fn settle(manager: &mut DataManager, api: &HttpApi, assume_yes: bool) -> ServiceResult<()> {
    let Some(message) = manager.pending_confirmation().map(|action| action.message()) else {
        return Ok(());
    };
    let result = if confirm(&message, assume_yes) {
        manager.confirm_pending(api)
    } else {
        manager.dismiss_pending();
        println!("Cancelled.");
        Ok(())
    };
    print_notices(manager.drain_notices());
    result
}

fn authenticate(cli: &Cli, api: &HttpApi, config: &AdminConfig) -> ServiceResult<()> {
    if let Some(token) = &cli.token {
        api.session().login(token.clone(), config.session_ttl());
        return Ok(());
    }
    let (Some(email), Some(password)) = (&cli.email, &cli.password) else {
        return Err(ServiceError::Form(
            "provide --token or --email and --password".to_string(),
        ));
    };
    let request = LoginRequest::try_from(LoginForm {
        email: email.clone(),
        password: password.clone(),
    })?;
    api.login(&request, config.session_ttl())?;
    Ok(())
}

fn run(cli: Cli, config: AdminConfig) -> ServiceResult<()> {
    let api = HttpApi::new(&config, Session::new())?;
    authenticate(&cli, &api, &config)?;
    let assume_yes = cli.yes;

    match cli.command {
        Command::List(args) => {
            let mut manager = DataManager::from_config(ResourceName::new(args.resource)?, &config);
            let list = manager.list_mut();
            if let Some(per_page) = args.per_page {
                list.set_per_page(per_page);
            }
            for raw in &args.filters {
                let (key, value) = split_pair(raw)?;
                list.set_filter(key, value);
            }
            if let Some(search) = args.search {
                list.set_search_text(search);
                list.apply_search();
            }
            if let Some(order_by) = args.order_by {
                list.set_order_by(order_by);
            }
            if args.asc {
                list.set_order_direction(SortDirection::Asc);
            }
            list.set_showing_deleted(args.deleted);
            list.set_page(args.page);

            let page = manager.refresh(&api)?;
            for entity in &page.data {
                println!("{}\t{}", entity.id, entity.display_title());
            }
            let pager: Vec<String> = page_window(&page.meta)
                .into_iter()
                .map(|page| page.map_or_else(|| "...".to_string(), |page| page.to_string()))
                .collect();
            println!(
                "page {}/{} ({} total) [{}]",
                page.meta.current_page,
                page.meta.last_page,
                page.meta.total,
                pager.join(" ")
            );
            Ok(())
        }
        Command::Delete(args) => {
            let mut manager = DataManager::from_config(ResourceName::new(args.resource)?, &config);
            match ids(&args.ids)?.as_slice() {
                [id] => manager.request_delete(*id),
                many => {
                    for id in many {
                        manager.toggle_select(*id);
                    }
                    manager.request_bulk_delete();
                }
            }
            settle(&mut manager, &api, assume_yes)
        }
        Command::ForceDelete(args) => {
            let mut manager = DataManager::from_config(ResourceName::new(args.resource)?, &config);
            match ids(&args.ids)?.as_slice() {
                [id] => manager.request_force_delete(*id),
                many => {
                    for id in many {
                        manager.toggle_select(*id);
                    }
                    manager.request_bulk_force_delete();
                }
            }
            settle(&mut manager, &api, assume_yes)
        }
        Command::Restore(args) => {
            let mut manager = DataManager::from_config(ResourceName::new(args.resource)?, &config);
            let ids = ids(&args.ids)?;
            if let [id] = ids.as_slice() {
                manager.request_restore(*id);
                return settle(&mut manager, &api, assume_yes);
            }
            for id in ids {
                manager.toggle_select(id);
            }
            let result = manager.bulk_restore(&api);
            print_notices(manager.drain_notices());
            result
        }
        Command::ToggleActive(args) => {
            let mut manager = DataManager::from_config(ResourceName::new(args.resource)?, &config);
            let entity = manager.fetch_record(&api, EntityId::new(args.id)?)?;
            manager.request_toggle_active_of(&entity);
            settle(&mut manager, &api, assume_yes)
        }
        Command::OrderStatus(args) => {
            let change = StatusChange::try_from(StatusChangeForm {
                order_id: args.order_id,
                status: args.status,
                delivery: false,
            })?;
            let orders = DataManager::from_config(ResourceName::new("orders")?, &config);
            let order = orders.fetch_record(&api, change.order_id)?;
            let mut board =
                StatusBoard::with_rows(RowSource::Orders(orders.list().to_request()), vec![order]);
            let result = board.update(&api, change);
            print_notices(board.drain_notices());
            result
        }
        Command::DeliveryStatus(args) => {
            let change = StatusChange::try_from(StatusChangeForm {
                order_id: args.order_id,
                status: args.status,
                delivery: true,
            })?;
            let mut board = match args.agent {
                Some(agent) => {
                    let source = RowSource::DeliveryAgent(EntityId::new(agent)?);
                    let mut board = StatusBoard::new(source);
                    board.refresh(&api)?;
                    board
                }
                None => {
                    let orders = DataManager::from_config(ResourceName::new("orders")?, &config);
                    let order = orders.fetch_record(&api, change.order_id)?;
                    let source = RowSource::Orders(orders.list().to_request());
                    StatusBoard::with_rows(source, vec![order])
                }
            };
            let result = board.update(&api, change);
            print_notices(board.drain_notices());
            result
        }
        Command::Upload(args) => {
            let mut manager = DataManager::from_config(ResourceName::new(args.resource)?, &config);
            match args.id {
                Some(id) => {
                    let entity = manager.fetch_record(&api, EntityId::new(id)?)?;
                    let schema = manager.schema().clone();
                    manager.editor_mut().open_edit(&entity, &schema);
                }
                None => manager.editor_mut().open_create(),
            }
            for raw in &args.fields {
                let (key, value) = split_pair(raw)?;
                manager.editor_mut().set_value(key, value);
            }
            if let Some(path) = &args.image {
                manager.editor_mut().set_value("image", read_file(path)?);
            }
            if !args.gallery.is_empty() {
                let existing = match manager.editor().values().get("gallery") {
                    Some(FieldValue::Gallery(value)) => value.clone(),
                    _ => GalleryValue::default(),
                };
                let mut gallery =
                    GalleryEditor::new(config.gallery.clone(), existing, BlobUrlStore::new())?;
                let files = args
                    .gallery
                    .iter()
                    .map(read_file)
                    .collect::<ServiceResult<Vec<_>>>()?;
                gallery.add(files);
                if let Some(error) = gallery.error() {
                    return Err(ServiceError::Form(error.to_string()));
                }
                manager.editor_mut().set_value("gallery", gallery.finish());
            }
            let result = manager.save(&api, false);
            print_notices(manager.drain_notices());
            result
        }
    }
}

fn main() {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let cli = Cli::parse();

    // Select config profile (defaults to `local`).
    let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".into());

    let settings = Config::builder()
        .add_source(config::File::with_name("config/default").required(false))
        .add_source(config::File::with_name(&format!("config/{app_env}")).required(false))
        .add_source(config::Environment::with_prefix("APP"))
        .build();

    let settings = match settings {
        Ok(settings) => settings,
        Err(err) => {
            log::error!("Error loading settings: {err}");
            std::process::exit(1);
        }
    };

    let admin_config = match settings.try_deserialize::<AdminConfig>() {
        Ok(admin_config) => admin_config,
        Err(err) => {
            log::error!("Error loading admin config: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(cli, admin_config) {
        log::error!("{err}");
        std::process::exit(1);
    }
}
