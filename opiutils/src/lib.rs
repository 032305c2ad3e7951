/// Utilitaires d'identification de la machine.
///
/// Ce module calcule l'identifiant stable du lecteur à partir de l'adresse
/// matérielle de la première interface réseau physique.
///
/// # Fonctions principales
///
/// - [`device_id`] : adresse MAC formatée `AA:BB:CC:DD:EE:FF`, ou chaîne vide
///
/// # Examples
///
/// ```no_run
/// use opiutils::device_id;
///
/// let mac = device_id();
/// println!("Identifiant: {}", mac);
/// ```
mod mac_utils;
mod process;

pub use mac_utils::{HardwareInterface, device_id, format_mac, select_device_id};
pub use process::{find_program, find_first_program};
