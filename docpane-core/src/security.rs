//! Security event tracking

use serde::{Deserialize, Serialize};
use std::fmt;

/// Security event severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecurityEventLevel {
    /// Informational event
    Info,
    /// Warning that should be reviewed
    Warning,
    /// Error or security violation
    Error,
}

/// Component that raised a security event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventSource {
    Config,
    Sanitizer,
    Renderer,
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventSource::Config => "config",
            EventSource::Sanitizer => "sanitizer",
            EventSource::Renderer => "renderer",
        };
        f.write_str(name)
    }
}

/// A security-related decision taken while loading or rendering content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityEvent {
    pub level: SecurityEventLevel,
    pub message: String,
    pub source: EventSource,
}

impl SecurityEvent {
    pub fn new(level: SecurityEventLevel, message: impl Into<String>, source: EventSource) -> Self {
        Self {
            level,
            message: message.into(),
            source,
        }
    }

    pub fn info(message: impl Into<String>, source: EventSource) -> Self {
        Self::new(SecurityEventLevel::Info, message, source)
    }

    pub fn warning(message: impl Into<String>, source: EventSource) -> Self {
        Self::new(SecurityEventLevel::Warning, message, source)
    }

    pub fn error(message: impl Into<String>, source: EventSource) -> Self {
        Self::new(SecurityEventLevel::Error, message, source)
    }

    /// Forward the event to the `log` facade at a matching level
    pub fn log(&self) {
        match self.level {
            SecurityEventLevel::Info => log::info!("[{}] {}", self.source, self.message),
            SecurityEventLevel::Warning => log::warn!("[{}] {}", self.source, self.message),
            SecurityEventLevel::Error => log::error!("[{}] {}", self.source, self.message),
        }
    }
}

impl fmt::Display for SecurityEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} [{}]: {}", self.level, self.source, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let event = SecurityEvent::warning("Stripped <script>", EventSource::Sanitizer);
        assert_eq!(event.level, SecurityEventLevel::Warning);
        assert_eq!(event.message, "Stripped <script>");
        assert_eq!(event.source, EventSource::Sanitizer);

        assert_eq!(SecurityEvent::info("x", EventSource::Config).level, SecurityEventLevel::Info);
        assert_eq!(
            SecurityEvent::error("x", EventSource::Renderer).level,
            SecurityEventLevel::Error
        );
    }

    #[test]
    fn test_display() {
        let event = SecurityEvent::info("Raw HTML escaped", EventSource::Config);
        assert_eq!(event.to_string(), "Info [config]: Raw HTML escaped");
    }
}
