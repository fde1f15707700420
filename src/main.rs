//! pcloud_drive CLI - Interact with pCloud storage.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glob::glob;
use tracing_subscriber::EnvFilter;

use pcloud_drive::{
    build_authorization_url, exchange_code, ApiEndpoint, DeleteFolderResponse, FolderResponse,
    ListFolderOptions, Metadata, PCloudClient, RenameFolderOptions, UploadOptions,
    UploadResponse,
};

/// CLI tool for interacting with pCloud.
#[derive(Parser)]
#[command(name = "pcloud_drive")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// OAuth access token.
    #[arg(long, env = "PCLOUD_ACCESS_TOKEN", global = true, hide_env_values = true)]
    access_token: Option<String>,

    /// API region of the account: "us" or "eu".
    #[arg(long, env = "PCLOUD_ENDPOINT", default_value = "us", global = true)]
    endpoint: ApiEndpoint,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the URL that authorizes this app.
    AuthUrl {
        /// OAuth client ID.
        #[arg(long, env = "PCLOUD_CLIENT_ID")]
        client_id: String,

        /// Where pCloud redirects after authorization.
        #[arg(long)]
        redirect_uri: Option<String>,
    },

    /// Exchange an authorization code for an access token.
    Token {
        /// OAuth client ID.
        #[arg(long, env = "PCLOUD_CLIENT_ID")]
        client_id: String,

        /// OAuth client secret.
        #[arg(long, env = "PCLOUD_CLIENT_SECRET", hide_env_values = true)]
        client_secret: String,

        /// Authorization code from the redirect.
        #[arg(long)]
        code: String,
    },

    #[command(flatten)]
    Storage(StorageCommands),
}

/// Commands that need an access token.
#[derive(Subcommand)]
enum StorageCommands {
    /// List the contents of a folder.
    List {
        /// Folder ID (0 is the root folder).
        #[arg(default_value_t = 0, allow_negative_numbers = true)]
        folder_id: i64,

        #[arg(long)]
        recursive: bool,

        #[arg(long)]
        show_deleted: bool,

        #[arg(long)]
        no_files: bool,

        #[arg(long)]
        no_shares: bool,
    },

    /// Upload files to a folder.
    Upload {
        /// File patterns to upload (supports glob patterns like *.tar, file_{1,2,3}.txt).
        #[arg(required = true)]
        patterns: Vec<String>,

        /// Destination folder ID.
        #[arg(long, short = 't', default_value_t = 0)]
        to: i64,

        /// Do not keep partially uploaded files.
        #[arg(long)]
        no_partial: bool,

        /// Rename instead of overwriting files that already exist.
        #[arg(long)]
        rename_if_exists: bool,

        /// Hash to observe upload progress with.
        #[arg(long)]
        progress_hash: Option<String>,
    },

    /// Create a folder.
    Mkdir {
        /// Parent folder ID.
        parent_id: i64,

        /// Name of the new folder.
        name: String,
    },

    /// Delete a folder and all of its contents.
    Rmdir {
        /// Folder ID to delete.
        folder_id: i64,
    },

    /// Rename and/or move a folder.
    Rename {
        /// Folder ID to rename or move.
        folder_id: i64,

        /// Destination parent folder ID.
        #[arg(long)]
        to_folder: Option<i64>,

        /// New folder name.
        #[arg(long)]
        to_name: Option<String>,

        /// New path; end it with "/" to move into an existing folder.
        #[arg(long)]
        to_path: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::AuthUrl {
            client_id,
            redirect_uri,
        } => {
            println!(
                "{}",
                build_authorization_url(&client_id, redirect_uri.as_deref())
            );
        }

        Commands::Token {
            client_id,
            client_secret,
            code,
        } => {
            let token = exchange_code(&client_id, &client_secret, &code, cli.endpoint)
                .await
                .context("Failed to exchange authorization code")?;

            println!("{}", token.access_token);
            if let Some(endpoint) = token.endpoint() {
                eprintln!("Account region: {}", endpoint);
            }
        }

        Commands::Storage(command) => {
            let access_token = cli
                .access_token
                .context("An access token is required (--access-token or PCLOUD_ACCESS_TOKEN)")?;
            let client = PCloudClient::new(access_token, cli.endpoint);
            run_command(&client, command).await?;
        }
    }

    Ok(())
}

async fn run_command(client: &PCloudClient, command: StorageCommands) -> Result<()> {
    match command {
        StorageCommands::List {
            folder_id,
            recursive,
            show_deleted,
            no_files,
            no_shares,
        } => {
            let options = ListFolderOptions {
                recursive,
                show_deleted,
                no_files,
                no_shares,
            };
            let folder: FolderResponse = client
                .list_folders(folder_id, &options)
                .await
                .with_context(|| format!("Failed to list folder: {}", folder_id))?
                .into_parsed()?;

            if folder.metadata.contents.is_empty() {
                println!("No files found.");
            } else {
                println!("{:<14} {:>10} {:<24} {}", "ID", "SIZE", "TYPE", "NAME");
                println!("{}", "-".repeat(80));
                print_tree(&folder.metadata.contents, 0);
            }
        }

        StorageCommands::Upload {
            patterns,
            to,
            no_partial,
            rename_if_exists,
            progress_hash,
        } => {
            let files_to_upload = collect_files(&patterns)?;
            if files_to_upload.is_empty() {
                anyhow::bail!("No files to upload");
            }

            let options = UploadOptions {
                no_partial,
                progress_hash,
                rename_if_exists,
                ..Default::default()
            };

            println!("Uploading {} file(s) to {}...", files_to_upload.len(), to);

            for (idx, file_path) in files_to_upload.iter().enumerate() {
                let filename = file_path.file_name().unwrap_or_default().to_string_lossy();
                print!("[{}/{}] Uploading {}... ", idx + 1, files_to_upload.len(), filename);

                match client.upload_local_file(to, file_path, &options).await {
                    Ok(result) => {
                        let ids = result
                            .into_parsed::<UploadResponse>()
                            .map(|r| r.file_ids)
                            .unwrap_or_default();
                        println!("OK ({:?})", ids);
                    }
                    Err(e) => {
                        println!("FAILED");
                        eprintln!("  Error: {}", e);
                    }
                }
            }

            println!("Done.");
        }

        StorageCommands::Mkdir { parent_id, name } => {
            let folder: FolderResponse = client
                .create_folder(parent_id, &name)
                .await
                .with_context(|| format!("Failed to create folder: {}", name))?
                .into_parsed()?;
            println!("{}", folder.metadata);
        }

        StorageCommands::Rmdir { folder_id } => {
            let deleted: DeleteFolderResponse = client
                .delete_folder_recursive(folder_id)
                .await
                .with_context(|| format!("Failed to delete folder: {}", folder_id))?
                .into_parsed()?;
            println!(
                "Deleted {} file(s) and {} folder(s).",
                deleted.deleted_files, deleted.deleted_folders
            );
        }

        StorageCommands::Rename {
            folder_id,
            to_folder,
            to_name,
            to_path,
        } => {
            let options = RenameFolderOptions {
                to_folder_id: to_folder,
                to_name,
                to_path,
            };
            let folder: FolderResponse = client
                .rename_folder(folder_id, &options)
                .await
                .with_context(|| format!("Failed to rename folder: {}", folder_id))?
                .into_parsed()?;
            println!("{}", folder.metadata);
        }
    }

    Ok(())
}

/// `RUST_LOG` when set and valid, `pcloud_drive=info` otherwise.
fn log_filter(directives: Option<String>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("pcloud_drive=info"))
}

fn print_tree(items: &[Metadata], depth: usize) {
    for item in items {
        println!("{}{}", "  ".repeat(depth), item);
        print_tree(&item.contents, depth + 1);
    }
}

/// Expand glob and brace patterns into a sorted, deduplicated file list.
fn collect_files(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        for expanded_pattern in expand_braces(pattern) {
            let matches: Vec<PathBuf> = glob(&expanded_pattern)
                .with_context(|| format!("Invalid glob pattern: {}", expanded_pattern))?
                .filter_map(|r| r.ok())
                .filter(|p| p.is_file())
                .collect();

            if matches.is_empty() {
                // No glob match, treat as a literal path
                let path = PathBuf::from(&expanded_pattern);
                if path.is_file() {
                    files.push(path);
                } else {
                    eprintln!("Warning: No files matched pattern: {}", expanded_pattern);
                }
            } else {
                files.extend(matches);
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

/// Expand brace patterns like file_{1,2,3}.txt into multiple patterns.
fn expand_braces(pattern: &str) -> Vec<String> {
    if let Some(start) = pattern.find('{') {
        if let Some(end) = pattern[start..].find('}') {
            let end = start + end;
            let prefix = &pattern[..start];
            let suffix = &pattern[end + 1..];
            let alternatives = &pattern[start + 1..end];

            return alternatives
                .split(',')
                .flat_map(|alt| {
                    let expanded = format!("{}{}{}", prefix, alt.trim(), suffix);
                    expand_braces(&expanded)
                })
                .collect();
        }
    }

    vec![pattern.to_string()]
}
