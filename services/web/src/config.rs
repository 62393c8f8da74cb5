//! Server configuration.

use anyhow::Result;

/// HTTP listener settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the listener binds to.
    pub bind_addr: String,
}

impl ServerConfig {
    /// Read the configuration from the environment.
    ///
    /// # Environment Variables
    /// - `BIND_ADDR`: listen address (default: "0.0.0.0:3000")
    pub fn from_env() -> Result<Self> {
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        Ok(ServerConfig { bind_addr })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn defaults_to_port_3000() {
        unsafe {
            std::env::remove_var("BIND_ADDR");
        }

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
    }

    #[test]
    #[serial]
    fn reads_bind_addr_override() {
        unsafe {
            std::env::set_var("BIND_ADDR", "127.0.0.1:8080");
        }

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");

        unsafe {
            std::env::remove_var("BIND_ADDR");
        }
    }
}
