use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use serde::Serialize;

use dlnadir::cds::{BrowseFlag, BrowseResult, ContentDirectory, DidlObject};
use dlnadir::media::demux::{Demuxer, FileDemuxer};
use dlnadir::media::item::MediaItem;
use dlnadir::profiles::Registry;
use dlnadir::vfs::VfsTree;
use dlnadir::{cli, config, media};

/// One line of `classify` output.
#[derive(Serialize)]
struct ClassifyReport {
    path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    item: Option<MediaItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    let file_config = config::find_config_file(cli.args.config.as_deref())
        .and_then(|path| {
            match config::load_config(&path) {
                Ok(cfg) => {
                    tracing::debug!("Loaded config from {}", path.display());
                    Some(cfg)
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config file: {}", e);
                    None
                }
            }
        });

    let config = config::Config::resolve(file_config, &cli.args).unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        std::process::exit(2);
    });

    let registry = Arc::new(config.registry());
    let demuxer: Arc<dyn Demuxer> = Arc::new(FileDemuxer);
    let json = cli.args.json;

    match cli.command {
        cli::Command::Classify { files } => {
            let reports = classify_files(files, registry, demuxer).await;
            if json {
                print_json(&reports);
            } else {
                for report in &reports {
                    print_report(report);
                }
            }
        }
        cli::Command::Browse { paths, id, flag, start, count } => {
            let flag: BrowseFlag = flag.parse().unwrap_or_else(|e| {
                eprintln!("error: {}", e);
                std::process::exit(2);
            });
            let directory = build_directory(&paths, &config, registry, demuxer).await;
            match directory.browse(id, flag, start, count) {
                Ok(result) => print_result(&result, json),
                Err(e) => {
                    eprintln!("error: {} (UPnP {})", e, e.upnp_code());
                    std::process::exit(1);
                }
            }
        }
        cli::Command::Search { paths, criteria, id, start, count } => {
            let directory = build_directory(&paths, &config, registry, demuxer).await;
            match directory.search(id, &criteria, start, count) {
                Ok(result) => print_result(&result, json),
                Err(e) => {
                    eprintln!("error: {} (UPnP {})", e, e.upnp_code());
                    std::process::exit(1);
                }
            }
        }
        cli::Command::Mimes => {
            let mimes = registry.supported_mime_types();
            if json {
                print_json(&mimes);
            } else {
                for mime in mimes {
                    println!("{}", mime);
                }
            }
        }
    }
}

/// Classify every file on the blocking pool, preserving input order.
async fn classify_files(
    files: Vec<PathBuf>,
    registry: Arc<Registry>,
    demuxer: Arc<dyn Demuxer>,
) -> Vec<ClassifyReport> {
    let tasks: Vec<_> = files
        .into_iter()
        .map(|path| {
            let registry = Arc::clone(&registry);
            let demuxer = Arc::clone(&demuxer);
            tokio::task::spawn_blocking(move || {
                let outcome = registry.classify(demuxer.as_ref(), &path);
                match outcome {
                    Ok(item) => ClassifyReport { path, item: Some(item), error: None },
                    Err(e) => ClassifyReport { path, item: None, error: Some(e.to_string()) },
                }
            })
        })
        .collect();

    let mut reports = Vec::with_capacity(tasks.len());
    for task in tasks {
        match task.await {
            Ok(report) => reports.push(report),
            Err(e) => tracing::error!("Classification task failed: {}", e),
        }
    }
    reports
}

/// Scan `paths` into a fresh tree and classify every resource up front so
/// browse and search never block on file I/O.
async fn build_directory(
    paths: &[PathBuf],
    config: &config::Config,
    registry: Arc<Registry>,
    demuxer: Arc<dyn Demuxer>,
) -> Arc<ContentDirectory> {
    let mut tree = VfsTree::new(&config.root_title);
    let stats = media::scanner::scan(paths, &mut tree, config.follow_links);
    if stats.resources() == 0 {
        tracing::warn!("No media files found in the provided paths");
    }

    let directory = Arc::new(ContentDirectory::new(tree, registry, demuxer));
    let ids = directory.read().resource_ids();
    let tasks: Vec<_> = ids
        .into_iter()
        .map(|id| {
            let directory = Arc::clone(&directory);
            tokio::task::spawn_blocking(move || directory.classify_resource(id))
        })
        .collect();

    let mut unclassified = 0usize;
    for task in tasks {
        match task.await {
            Ok(Some(Err(e))) => {
                tracing::debug!("{}", e);
                unclassified += 1;
            }
            Ok(_) => {}
            Err(e) => tracing::error!("Classification task failed: {}", e),
        }
    }
    tracing::info!(
        "Classified {} resources ({} without a profile)",
        stats.resources(),
        unclassified
    );
    directory
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("error: cannot serialize output: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_report(report: &ClassifyReport) {
    match (&report.item, &report.error) {
        (Some(item), _) => {
            let profile = item.profile.as_ref().map_or("-".to_string(), |p| p.to_string());
            println!(
                "{}\t{}\t{}",
                report.path.display(),
                profile,
                item.properties.duration.as_deref().unwrap_or("-")
            );
        }
        (None, Some(error)) => println!("{}\terror: {}", report.path.display(), error),
        (None, None) => println!("{}\t-", report.path.display()),
    }
}

fn print_result(result: &BrowseResult, json: bool) {
    if json {
        print_json(result);
        return;
    }
    for object in &result.objects {
        match object {
            DidlObject::Container(c) => {
                println!("{}\t{}\t{} ({} children)", c.id, c.class, c.title, c.child_count);
            }
            DidlObject::Item(i) => {
                let profile = i
                    .media
                    .as_ref()
                    .and_then(|m| m.profile.as_ref())
                    .map_or("-".to_string(), |p| p.id.to_string());
                println!(
                    "{}\t{}\t{}\t{}",
                    i.id,
                    i.class.unwrap_or("object.item"),
                    i.title,
                    profile
                );
            }
        }
    }
    println!(
        "returned {} of {} (update id {})",
        result.number_returned, result.total_matches, result.update_id
    );
}
