/// Server configuration sourced from the environment (spec §6).
#[derive(Debug, Clone)]
pub struct Config {
    pub http_addr: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            http_addr: std::env::var("HTTP_ADDR").unwrap_or_else(|_| ":8080".to_string()),
        }
    }
}

/// `":8080"` style addresses bind on all interfaces; anything containing
/// a host we pass straight through to the TCP listener.
pub fn to_socket_addr(http_addr: &str) -> String {
    if let Some(port) = http_addr.strip_prefix(':') {
        format!("0.0.0.0:{port}")
    } else {
        http_addr.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colon_prefixed_addr_binds_all_interfaces() {
        assert_eq!(to_socket_addr(":8080"), "0.0.0.0:8080");
    }

    #[test]
    fn explicit_host_passes_through() {
        assert_eq!(to_socket_addr("127.0.0.1:9090"), "127.0.0.1:9090");
    }
}
