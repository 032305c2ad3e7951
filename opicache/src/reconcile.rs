use crate::download::download_file;
use crate::naming::{file_name_for, file_stem, is_video_file, sanitize};
use opiapi::MediaItem;
use reqwest::Client;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Aligne un répertoire local sur le manifeste du serveur.
///
/// Le réconciliateur ne garde aucun état entre deux passes : tout est déduit
/// du contenu du répertoire et du manifeste fourni.
#[derive(Debug, Clone)]
pub struct Reconciler {
    client: Client,
    dir: PathBuf,
}

impl Reconciler {
    pub fn new(client: Client, dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            dir: dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Passe complète : purge des fichiers inconnus puis téléchargement.
    ///
    /// Chaque élément est traité indépendamment ; un échec est journalisé et
    /// n'interrompt pas la passe.
    ///
    /// # Returns
    ///
    /// Les chemins effectivement téléchargés, dans l'ordre du manifeste.
    pub async fn reconcile(&self, items: &[MediaItem]) -> Vec<PathBuf> {
        let removed = self.prune(items).await;
        if removed > 0 {
            info!("{} fichier(s) obsolète(s) supprimé(s)", removed);
        }

        let downloaded = self.download_all(items).await;
        self.drop_stale_variants(&downloaded).await;
        downloaded
    }

    /// Supprime les fichiers dont l'identité n'apparaît pas dans le manifeste.
    ///
    /// Les échecs de suppression sont ignorés. Retourne le nombre de fichiers
    /// supprimés.
    pub async fn prune(&self, items: &[MediaItem]) -> usize {
        let keep: HashSet<String> = items.iter().map(|item| sanitize(&item.id)).collect();

        let Ok(mut entries) = tokio::fs::read_dir(&self.dir).await else {
            return 0;
        };

        let mut removed = 0;
        while let Ok(Some(entry)) = entries.next_entry().await {
            if entry.file_type().await.map(|t| t.is_dir()).unwrap_or(true) {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let stem = file_stem(&name);
            if stem.is_empty() || keep.contains(stem) {
                continue;
            }
            if tokio::fs::remove_file(entry.path()).await.is_ok() {
                debug!(file = %name, "Supprimé (absent du manifeste)");
                removed += 1;
            }
        }
        removed
    }

    async fn download_all(&self, items: &[MediaItem]) -> Vec<PathBuf> {
        let mut downloaded = Vec::new();

        for item in items {
            if item.url.is_empty() {
                continue;
            }
            let dest = self.dir.join(file_name_for(&item.id, &item.url));
            match download_file(&self.client, &item.url, &dest).await {
                Ok(_) => {
                    info!(
                        "Téléchargé : {} -> {}",
                        item.name,
                        dest.file_name().unwrap_or_default().to_string_lossy()
                    );
                    downloaded.push(dest);
                }
                Err(e) => {
                    warn!(url = %item.url, "Échec du téléchargement : {}", e);
                }
            }
        }
        downloaded
    }

    /// Retire les vidéos qui partagent l'identité d'un fichier fraîchement
    /// téléchargé sous une autre extension (l'URL a changé de format).
    async fn drop_stale_variants(&self, downloaded: &[PathBuf]) {
        let fresh: HashSet<String> = downloaded
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect();
        if fresh.is_empty() {
            return;
        }
        let fresh_stems: HashSet<&str> = fresh.iter().map(|n| file_stem(n)).collect();

        let Ok(mut entries) = tokio::fs::read_dir(&self.dir).await else {
            return;
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !is_video_file(&name) || fresh.contains(&name) {
                continue;
            }
            if fresh_stems.contains(file_stem(&name)) {
                let _ = tokio::fs::remove_file(entry.path()).await;
                debug!(file = %name, "Ancienne variante supprimée");
            }
        }
    }
}
