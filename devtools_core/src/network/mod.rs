pub mod ipv4;
pub mod mac;

pub use ipv4::{expand_ipv4_range, ipv4_info, ipv4_subnet};
pub use mac::{generate_macs, ipv6_ula, random_port, MacOptions};
