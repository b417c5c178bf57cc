//! Command-line client for pastecan.
//!
//! Content can be sealed with a passphrase before upload (`--passphrase` on
//! `create`/`update`) and opened after download (`--passphrase` on `get`).
//! The server only ever sees ciphertext; the declared content type is the
//! plaintext's type so nothing about the payload leaks through sniffing.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use pastecan_core::constants::{CONTENT_TYPE_BINARY, CONTENT_TYPE_TEXT, DEFAULT_CLI_SERVER_URL};
use pastecan_core::envelope;
use std::io::{Read, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pcan", about = "pastecan CLI", version)]
struct Cli {
    /// Server base URL.
    #[arg(short, long, env = "PCAN_SERVER", default_value = DEFAULT_CLI_SERVER_URL)]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a paste from a file or stdin.
    Create {
        /// File to upload; stdin when omitted.
        file: Option<PathBuf>,
        /// Client-chosen label (must start with @ or ~).
        #[arg(short, long)]
        label: Option<String>,
        /// Lifetime in seconds.
        #[arg(short, long)]
        ttl: Option<u64>,
        /// Shared secret to store with the paste (secret-auth servers).
        #[arg(long)]
        secret: Option<String>,
        /// Encrypt the content with this passphrase before upload.
        #[arg(short, long, env = "PCAN_PASSPHRASE")]
        passphrase: Option<String>,
    },
    /// Create a URL-redirect paste.
    Url {
        url: String,
        /// Lifetime in seconds.
        #[arg(short, long)]
        ttl: Option<u64>,
    },
    /// Fetch a paste by slug.
    Get {
        slug: String,
        /// Decrypt the content with this passphrase after download.
        #[arg(short, long, env = "PCAN_PASSPHRASE")]
        passphrase: Option<String>,
        /// Write the content to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace a paste's content by capability id (or slug on secret-auth servers).
    Update {
        token: String,
        /// File to upload; stdin when omitted.
        file: Option<PathBuf>,
        /// Shared secret (secret-auth servers).
        #[arg(long)]
        secret: Option<String>,
        /// Encrypt the content with this passphrase before upload.
        #[arg(short, long, env = "PCAN_PASSPHRASE")]
        passphrase: Option<String>,
    },
    /// Delete a paste by capability id (or slug on secret-auth servers).
    Delete {
        token: String,
        /// Shared secret (secret-auth servers).
        #[arg(long)]
        secret: Option<String>,
    },
}

/// Content staged for upload, with the type describing the plaintext.
struct Upload {
    bytes: Vec<u8>,
    content_type: String,
    file_name: String,
}

fn read_input(file: Option<&PathBuf>) -> anyhow::Result<(Vec<u8>, String)> {
    match file {
        Some(path) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "paste".to_string());
            Ok((bytes, name))
        }
        None => {
            let mut buffer = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buffer)
                .context("Failed to read stdin")?;
            Ok((buffer, "stdin".to_string()))
        }
    }
}

fn plaintext_content_type(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return CONTENT_TYPE_TEXT.to_string();
    }
    infer::get(bytes)
        .map(|kind| kind.mime_type().to_string())
        .unwrap_or_else(|| CONTENT_TYPE_BINARY.to_string())
}

/// Stage content for upload, sealing it when a passphrase is given.
fn stage_upload(
    file: Option<&PathBuf>,
    passphrase: Option<&str>,
) -> anyhow::Result<Upload> {
    let (bytes, file_name) = read_input(file)?;
    let content_type = plaintext_content_type(&bytes);

    let bytes = match passphrase {
        Some(passphrase) => {
            envelope::seal(&bytes, passphrase).context("Failed to encrypt content")?
        }
        None => bytes,
    };

    Ok(Upload {
        bytes,
        content_type,
        file_name,
    })
}

fn upload_form(upload: Upload, ttl: Option<u64>, secret: Option<String>) -> anyhow::Result<reqwest::multipart::Form> {
    let part = reqwest::multipart::Part::bytes(upload.bytes)
        .file_name(upload.file_name)
        .mime_str(&upload.content_type)
        .context("Invalid content type")?;

    let mut form = reqwest::multipart::Form::new().part("c", part);
    if let Some(ttl) = ttl {
        form = form.text("sunset", ttl.to_string());
    }
    if let Some(secret) = secret {
        form = form.text("s", secret);
    }
    Ok(form)
}

async fn expect_success(response: reqwest::Response) -> anyhow::Result<String> {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if !status.is_success() {
        bail!("Server answered {}: {}", status, body.trim_end());
    }
    Ok(body)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Create {
            file,
            label,
            ttl,
            secret,
            passphrase,
        } => {
            let upload = stage_upload(file.as_ref(), passphrase.as_deref())?;
            let form = upload_form(upload, ttl, secret)?;

            let endpoint = match label {
                Some(label) => format!("{}/{}", cli.server, label),
                None => format!("{}/", cli.server),
            };
            let response = client.post(endpoint).multipart(form).send().await?;
            print!("{}", expect_success(response).await?);
        }
        Commands::Url { url, ttl } => {
            let mut form = reqwest::multipart::Form::new().text("c", url);
            if let Some(ttl) = ttl {
                form = form.text("sunset", ttl.to_string());
            }
            let response = client
                .post(format!("{}/u", cli.server))
                .multipart(form)
                .send()
                .await?;
            print!("{}", expect_success(response).await?);
        }
        Commands::Get {
            slug,
            passphrase,
            output,
        } => {
            let response = client
                .get(format!("{}/{}", cli.server, slug))
                .send()
                .await?;
            let status = response.status();
            if !status.is_success() {
                bail!("Server answered {}", status);
            }
            let bytes = response.bytes().await?.to_vec();

            // Decryption failures must be distinguishable from fetch failures.
            let bytes = match passphrase {
                Some(passphrase) => match envelope::open(&bytes, &passphrase) {
                    Ok(plain) => plain,
                    Err(err) => bail!("{}", err),
                },
                None => bytes,
            };

            match output {
                Some(path) => {
                    std::fs::write(&path, &bytes)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                }
                None => {
                    std::io::stdout().write_all(&bytes)?;
                }
            }
        }
        Commands::Update {
            token,
            file,
            secret,
            passphrase,
        } => {
            let upload = stage_upload(file.as_ref(), passphrase.as_deref())?;
            let form = upload_form(upload, None, secret)?;
            let response = client
                .put(format!("{}/{}", cli.server, token))
                .multipart(form)
                .send()
                .await?;
            print!("{}", expect_success(response).await?);
        }
        Commands::Delete { token, secret } => {
            let mut request = client.delete(format!("{}/{}", cli.server, token));
            if let Some(secret) = secret {
                request = request.query(&[("s", secret)]);
            }
            let response = request.send().await?;
            print!("{}", expect_success(response).await?);
        }
    }

    Ok(())
}
