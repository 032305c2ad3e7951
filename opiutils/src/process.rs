use std::path::PathBuf;
use tracing::debug;

/// Cherche un exécutable dans le `PATH`.
///
/// Retourne `Some(chemin)` si le programme a pu être localisé, sinon `None`.
pub fn find_program(name: &str) -> Option<PathBuf> {
    match which::which(name) {
        Ok(path) => {
            debug!(program = name, path = %path.display(), "Programme trouvé");
            Some(path)
        }
        Err(_) => None,
    }
}

/// Retourne le premier programme disponible parmi `candidates`, dans l'ordre.
pub fn find_first_program<'a>(candidates: &[&'a str]) -> Option<(&'a str, PathBuf)> {
    candidates
        .iter()
        .find_map(|name| find_program(name).map(|path| (*name, path)))
}
