//! Correspondance entre identifiants du manifeste et noms de fichiers locaux.

/// Extensions vidéo reconnues, dans l'ordre de recherche dans l'URL.
pub const VIDEO_EXTENSIONS: [&str; 4] = [".mkv", ".mp4", ".avi", ".webm"];

/// Extension utilisée quand l'URL n'en contient aucune reconnue.
pub const DEFAULT_EXTENSION: &str = ".mp4";

/// Nom de secours quand l'identifiant est vide.
const FALLBACK_STEM: &str = "media";

/// Transforme un identifiant en nom de fichier sûr.
///
/// Tout caractère hors de `[a-zA-Z0-9_-]` devient `_` ; un résultat vide
/// devient `media`. La fonction est idempotente.
pub fn sanitize(id: &str) -> String {
    let stem: String = id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if stem.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        stem
    }
}

/// Choisit l'extension de destination d'après l'URL.
///
/// Retourne la première extension reconnue présente n'importe où dans l'URL
/// (en minuscules), sinon `.mp4`.
pub fn ext_from_url(url: &str) -> &'static str {
    let lower = url.to_lowercase();
    VIDEO_EXTENSIONS
        .iter()
        .copied()
        .find(|ext| lower.contains(ext))
        .unwrap_or(DEFAULT_EXTENSION)
}

/// Nom de fichier local complet pour un élément du manifeste.
pub fn file_name_for(id: &str, url: &str) -> String {
    format!("{}{}", sanitize(id), ext_from_url(url))
}

/// Identité d'un fichier local : son nom privé de la dernière extension.
///
/// `".mkv"` donne une chaîne vide, `"clip"` reste `"clip"`.
pub fn file_stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) => &name[..idx],
        None => name,
    }
}

/// Vrai si le nom porte une extension vidéo reconnue (insensible à la casse).
pub fn is_video_file(name: &str) -> bool {
    let lower = name.to_lowercase();
    VIDEO_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}
