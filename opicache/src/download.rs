use crate::error::{CacheError, Result};
use futures_util::StreamExt;
use reqwest::{Client, StatusCode};
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Délai maximal d'un téléchargement, corps compris.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Télécharge `url` dans `dest`.
///
/// Le corps est écrit au fil de l'eau, sans tampon intermédiaire complet.
/// En cas d'erreur, le fichier partiel reste en place : la prochaine
/// synchronisation réussie l'écrasera.
///
/// # Returns
///
/// Le nombre d'octets écrits.
pub async fn download_file(client: &Client, url: &str, dest: &Path) -> Result<u64> {
    download_file_with_timeout(client, url, dest, DOWNLOAD_TIMEOUT).await
}

/// Variante de [`download_file`] avec un délai explicite.
pub async fn download_file_with_timeout(
    client: &Client,
    url: &str,
    dest: &Path,
    timeout: Duration,
) -> Result<u64> {
    let response = client.get(url).timeout(timeout).send().await?;

    // Seul 200 est accepté, comme pour l'API
    if response.status() != StatusCode::OK {
        return Err(CacheError::Status(response.status().as_u16()));
    }

    let mut file = tokio::fs::File::create(dest).await?;
    let mut stream = response.bytes_stream();
    let mut total = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        total += chunk.len() as u64;
    }

    file.flush().await?;
    debug!(url, path = %dest.display(), bytes = total, "Téléchargement terminé");
    Ok(total)
}
