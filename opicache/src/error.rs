//! Gestion des erreurs du miroir de médias

use thiserror::Error;

/// Type Result personnalisé pour opicache
pub type Result<T> = std::result::Result<T, CacheError>;

/// Erreurs possibles lors de la synchronisation du répertoire média
#[derive(Error, Debug)]
pub enum CacheError {
    /// Erreur HTTP (connexion, délai dépassé, lecture du corps)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Le serveur de médias a répondu autre chose que 200
    #[error("http {0}")]
    Status(u16),

    /// Erreur d'entrée/sortie sur le disque
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
