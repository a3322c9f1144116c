use anyhow::{anyhow, Result};
use clap::{Arg, Command};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, warn};

use remote_bookshelf::{
    config::Config,
    connectivity::TcpConnectivity,
    models::{Book, RemoteBook, RemoteEntry},
    services::remote_book::extension_of,
    services::webdav::HttpWebDavTransport,
    storage::LocalBookStore,
    AppError, RemoteBookManager, RemoteBookWebDav,
};

fn cli() -> Command {
    Command::new("remote-bookshelf")
        .about("Browse, download and upload books on a WebDAV bookshelf")
        .subcommand_required(true)
        .subcommand(Command::new("init").about("Create the remote book folder if it is missing"))
        .subcommand(
            Command::new("ls")
                .about("List folders and books")
                .arg(Arg::new("path").help("Remote URL or path relative to the WebDAV root").index(1)),
        )
        .subcommand(
            Command::new("get")
                .about("Download a remote book to the local shelf")
                .arg(Arg::new("url").help("Remote book URL").required(true).index(1)),
        )
        .subcommand(
            Command::new("put")
                .about("Upload a local book")
                .arg(Arg::new("source").help("Local file path or content:// reference").required(true).index(1))
                .arg(
                    Arg::new("name")
                        .help("Remote file name (defaults to the source file name)")
                        .long("name")
                        .short('n')
                        .value_name("NAME"),
                ),
        )
        .subcommand(
            Command::new("rm")
                .about("Delete a remote entry")
                .arg(Arg::new("url").help("Remote URL").required(true).index(1)),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .init();

    let matches = cli().get_matches();
    let config = Config::from_env()?;

    let webdav_config = config.webdav_config();
    let transport = HttpWebDavTransport::new(webdav_config.clone())?;
    let store = Arc::new(LocalBookStore::new(config.book_dir.clone(), config.content_root.clone()));
    store.initialize().await?;

    let connectivity = TcpConnectivity::for_server(&webdav_config.server_url, webdav_config.timeout())?;
    let manager = RemoteBookWebDav::new(
        &webdav_config.webdav_url(),
        &config.remote_book_folder,
        Arc::new(transport.clone()),
        Arc::new(config.authorization()),
        store.clone(),
        store.clone(),
        Arc::new(connectivity),
    )
    .with_pattern(config.book_pattern()?);

    // Startup must not abort because the remote folder could not be prepared
    if let Err(e) = manager.init_remote_context().await {
        warn!("Remote book folder setup failed: {}", e);
    }

    let outcome = match matches.subcommand() {
        Some(("init", _)) => Ok(()),
        Some(("ls", args)) => {
            let path = match args.get_one::<String>("path") {
                Some(path) => transport.url_manager().resolve(path),
                None => manager.root_book_url().to_string(),
            };
            manager.get_remote_book_list(&path).await.map(|books| {
                for book in books {
                    let shelf_mark = if book.is_on_local_shelf { "*" } else { " " };
                    println!("{} {:<8} {:>10}  {}  {}", shelf_mark, book.kind, book.size, book.name, book.path);
                }
            })
        }
        Some(("get", args)) => {
            let url = required(args, "url")?;
            let remote_book = remote_book_from_url(&transport.url_manager().resolve(url));
            manager.get_remote_book(&remote_book).await.map(|saved| {
                println!("{}", saved.display());
            })
        }
        Some(("put", args)) => {
            let source = required(args, "source")?;
            let origin_name = match args.get_one::<String>("name") {
                Some(name) => name.clone(),
                None => file_name_of(source).ok_or_else(|| anyhow!("Cannot derive a file name from '{}'", source))?,
            };
            let title = Path::new(&origin_name)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| origin_name.clone());

            let mut book = Book::local(title, source.clone(), origin_name);
            manager.upload(&mut book).await.map(|_| {
                println!("{}", book.webdav_url().unwrap_or_default());
            })
        }
        Some(("rm", args)) => {
            let url = required(args, "url")?;
            manager.delete(&transport.url_manager().resolve(url)).await
        }
        _ => unreachable!("subcommand_required is set"),
    };

    if let Err(e) = outcome {
        error!("{} ({})", e, e.error_code());
        if let Some(action) = e.suggested_action() {
            eprintln!("{}: {}", e.user_message(), action);
        } else {
            eprintln!("{}", e.user_message());
        }
        std::process::exit(1);
    }

    Ok(())
}

fn required<'a>(args: &'a clap::ArgMatches, name: &str) -> Result<&'a String> {
    args.get_one::<String>(name)
        .ok_or_else(|| anyhow!("Missing argument <{}>", name))
}

fn file_name_of(source: &str) -> Option<String> {
    let last = source.trim_end_matches('/').rsplit('/').next()?;
    let decoded = urlencoding::decode(last).ok()?.into_owned();
    if decoded.is_empty() { None } else { Some(decoded) }
}

fn remote_book_from_url(url: &str) -> RemoteBook {
    let name = file_name_of(url).unwrap_or_else(|| url.to_string());
    let entry = RemoteEntry {
        display_name: name.clone(),
        path: url.to_string(),
        size: 0,
        is_directory: false,
        last_modified: None,
    };
    RemoteBook::book(&entry, extension_of(&name).to_string(), false)
}
