use nix::ifaddrs::getifaddrs;
use nix::net::if_::InterfaceFlags;
use tracing::debug;

/// Longueur minimale d'une adresse matérielle exploitable.
const MAC_LEN: usize = 6;

/// Vue minimale d'une interface réseau, telle que vue par la sonde d'identité.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardwareInterface {
    pub name: String,
    pub loopback: bool,
    pub hardware_addr: Vec<u8>,
}

/// Retourne l'identifiant du lecteur : la MAC de la première interface
/// non-loopback, au format `AA:BB:CC:DD:EE:FF`.
///
/// Retourne une chaîne vide si aucune interface ne convient ; l'appelant doit
/// traiter ce cas comme un défaut de configuration permanent.
pub fn device_id() -> String {
    select_device_id(list_interfaces()).unwrap_or_default()
}

/// Choisit la première interface éligible et formate son adresse.
pub fn select_device_id<I>(interfaces: I) -> Option<String>
where
    I: IntoIterator<Item = HardwareInterface>,
{
    interfaces
        .into_iter()
        .find(|iface| !iface.loopback && iface.hardware_addr.len() >= MAC_LEN)
        .map(|iface| {
            debug!(interface = %iface.name, "Interface retenue pour l'identifiant");
            format_mac(&iface.hardware_addr)
        })
}

/// Formate les six premiers octets en hexadécimal majuscule séparé par `:`.
pub fn format_mac(bytes: &[u8]) -> String {
    bytes
        .iter()
        .take(MAC_LEN)
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(":")
}

/// Liste les interfaces dans l'ordre du noyau (une entrée par adresse de lien).
fn list_interfaces() -> Vec<HardwareInterface> {
    let Ok(addrs) = getifaddrs() else {
        return Vec::new();
    };

    addrs
        .filter_map(|ifaddr| {
            let link = ifaddr.address.as_ref()?.as_link_addr()?.clone();
            let hardware_addr = if link.halen() >= MAC_LEN {
                link.addr().map(|a| a.to_vec()).unwrap_or_default()
            } else {
                Vec::new()
            };
            Some(HardwareInterface {
                name: ifaddr.interface_name,
                loopback: ifaddr.flags.contains(InterfaceFlags::IFF_LOOPBACK),
                hardware_addr,
            })
        })
        .collect()
}
