//! Value parsers for CLI arguments

use std::fs;
use std::net::IpAddr;
use std::path::PathBuf;

/// Longest hostname DNS allows
const MAX_HOST_LEN: usize = 253;

/// Port in 1..=65535
pub fn validate_port(port_str: &str) -> Result<u16, String> {
    let port: u16 = port_str.parse().map_err(|_| {
        format!("Port must be a valid number between 1 and 65535, got: '{port_str}'")
    })?;

    if port == 0 {
        return Err("Port must be between 1 and 65535. Port 0 is not allowed.".to_string());
    }

    Ok(port)
}

/// Entry lifetime in whole seconds, at least 1
pub fn validate_ttl(ttl_str: &str) -> Result<u64, String> {
    let ttl: u64 = ttl_str
        .parse()
        .map_err(|_| format!("TTL must be a whole number of seconds, got: '{ttl_str}'"))?;

    if ttl == 0 {
        return Err("TTL must be at least 1 second".to_string());
    }

    Ok(ttl)
}

/// Existing, readable regular file
pub fn validate_config_file_path(path_str: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(format!("Configuration file does not exist: '{path_str}'"));
    }

    if !path.is_file() {
        return Err(format!("Configuration path is not a file: '{path_str}'"));
    }

    fs::File::open(&path)
        .map(|_| path)
        .map_err(|e| format!("Cannot read configuration file '{path_str}': {e}"))
}

/// IP address or hostname
pub fn validate_host_address(host_str: &str) -> Result<String, String> {
    let host = host_str.trim();

    if host.is_empty() {
        return Err("Host address cannot be empty".to_string());
    }

    if host.chars().any(char::is_whitespace) {
        return Err("Host address cannot contain spaces".to_string());
    }

    if host.parse::<IpAddr>().is_ok() {
        return Ok(host.to_string());
    }

    // all digits and dots but not an address, e.g. 999.1.1.1
    if host.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(format!("Invalid IPv4 address format: '{host_str}'"));
    }

    if host.len() > MAX_HOST_LEN {
        return Err(format!(
            "Host address is too long (maximum {MAX_HOST_LEN} characters)"
        ));
    }

    Ok(host.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_port_validation() {
        for port_str in ["1", "6379", "65535"] {
            assert!(validate_port(port_str).is_ok(), "Port {port_str} should be valid");
        }
        for port_str in ["0", "65536", "abc", "-1", ""] {
            assert!(validate_port(port_str).is_err(), "Port {port_str} should be invalid");
        }
    }

    #[test]
    fn test_ttl_validation() {
        assert_eq!(validate_ttl("5"), Ok(5));
        assert_eq!(validate_ttl("86400"), Ok(86_400));
        for ttl_str in ["0", "-5", "1.5", "soon", ""] {
            assert!(validate_ttl(ttl_str).is_err(), "TTL '{ttl_str}' should be invalid");
        }
    }

    #[test]
    fn test_host_validation() {
        for host in ["localhost", "127.0.0.1", "::1", "redis.internal", "cache-0.svc"] {
            assert!(validate_host_address(host).is_ok(), "Host {host} should be valid");
        }
        let too_long = "x".repeat(300);
        for host in ["", "   ", "redis host", "999.999.999.999", too_long.as_str()] {
            assert!(validate_host_address(host).is_err(), "Host '{host}' should be invalid");
        }
    }

    #[test]
    fn test_config_file_validation() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("cache.toml");
        std::fs::write(&file, "[cache]\n").unwrap();

        assert_eq!(validate_config_file_path(file.to_str().unwrap()), Ok(file.clone()));
        assert!(validate_config_file_path(dir.path().to_str().unwrap()).is_err());
        assert!(
            validate_config_file_path(dir.path().join("missing.toml").to_str().unwrap()).is_err()
        );
    }
}
