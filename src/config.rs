use serde::Deserialize;

/// Process-lifetime application metadata and collector address. Built once
/// by the host and never mutated afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct AppContext {
    pub app_name: String,
    pub app_version_name: String,
    pub app_version_code: u32,
    pub environment: String,
    pub collector_host: String,
    pub collector_port: u16,
}

impl AppContext {
    pub fn collector_url(&self) -> String {
        format!("http://{}:{}/", self.collector_host, self.collector_port)
    }

    /// "<name> (<code>)", the version string the collector expects.
    pub fn version_string(&self) -> String {
        format!("{} ({})", self.app_version_name, self.app_version_code)
    }
}

/// Device metadata attached to every record. The host supplies this at
/// construction time from whatever platform introspection it has available.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceInfo {
    pub manufacturer: String,
    pub model: String,
    pub os_release: String,
    pub sdk_level: u32,
}

impl DeviceInfo {
    pub fn device_string(&self) -> String {
        format!("{} {}", self.manufacturer, self.model)
    }

    pub fn version_string(&self) -> String {
        format!("{} ({})", self.os_release, self.sdk_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> AppContext {
        AppContext {
            app_name: "My App".to_string(),
            app_version_name: "1.2.3".to_string(),
            app_version_code: 72,
            environment: "production".to_string(),
            collector_host: "logs.example.com".to_string(),
            collector_port: 4000,
        }
    }

    #[test]
    fn collector_url_includes_host_and_port() {
        assert_eq!(context().collector_url(), "http://logs.example.com:4000/");
    }

    #[test]
    fn version_string_combines_name_and_code() {
        assert_eq!(context().version_string(), "1.2.3 (72)");
    }
}
