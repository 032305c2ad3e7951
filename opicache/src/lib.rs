//! # opicache - Miroir local des médias du lecteur
//!
//! Cette crate maintient le répertoire média dans l'état « exactement les
//! fichiers dont le nom (sans extension) correspond à un identifiant du
//! manifeste ».
//!
//! ## Vue d'ensemble
//!
//! ```text
//! opicache
//!     ├── naming.rs    - identifiant -> nom de fichier, extensions reconnues
//!     ├── download.rs  - téléchargement en flux avec délai de 30 minutes
//!     └── reconcile.rs - purge + téléchargement, élément par élément
//! ```
//!
//! ## Utilisation
//!
//! ```rust,no_run
//! use opiapi::MediaItem;
//! use opicache::Reconciler;
//!
//! #[tokio::main]
//! async fn main() {
//!     let reconciler = Reconciler::new(reqwest::Client::new(), "/srv/media");
//!     let items = vec![MediaItem::new("intro", "http://lan/intro.mkv", "Intro")];
//!
//!     let downloaded = reconciler.reconcile(&items).await;
//!     println!("{} fichier(s) prêts", downloaded.len());
//! }
//! ```
//!
//! Le contenu n'est pas comparé : un fichier déjà présent est téléchargé à
//! nouveau à chaque passe.

pub mod download;
pub mod error;
pub mod naming;
pub mod reconcile;

pub use download::{DOWNLOAD_TIMEOUT, download_file};
pub use error::{CacheError, Result};
pub use naming::{VIDEO_EXTENSIONS, ext_from_url, file_name_for, file_stem, is_video_file, sanitize};
pub use reconcile::Reconciler;
