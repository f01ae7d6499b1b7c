use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Upper bound for cache.ttl_secs (30 days)
pub const MAX_CACHE_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Upper bound for llm.timeout_secs (1 hour)
pub const MAX_LLM_TIMEOUT_SECS: u64 = 60 * 60;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub llm: LlmConfig,
    pub kafka: KafkaConfig,
    pub cache: CacheConfig,
    pub consumer: ConsumerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

/// Completion service (OpenAI-compatible chat API) configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL, `/chat/completions` is appended (default: https://api.openai.com/v1)
    pub api_base: String,
    /// Bearer credential; requests fail with "not configured" when absent
    pub api_key: Option<String>,
    /// Model name (default: gpt-3.5-turbo)
    pub model: String,
    /// Per-request timeout in seconds (default: 60)
    #[serde(deserialize_with = "deserialize_duration_secs")]
    pub timeout_secs: u64,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Kafka consumer configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KafkaConfig {
    pub bootstrap_servers: String,
    pub topic: String,
    pub group_id: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Explicit security protocol; derived from the credentials when unset
    pub security_protocol: Option<String>,
    pub sasl_mechanism: String,
    pub auto_offset_reset: String,
    /// Bounded wait for a single poll in milliseconds (default: 1000)
    #[serde(deserialize_with = "deserialize_duration_millis")]
    pub poll_timeout_ms: u64,
}

impl KafkaConfig {
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    /// SASL_PLAINTEXT when credentials are present, PLAINTEXT otherwise
    pub fn effective_security_protocol(&self) -> &str {
        match (&self.security_protocol, &self.username) {
            (Some(protocol), _) => protocol.as_str(),
            (None, Some(_)) => "SASL_PLAINTEXT",
            (None, None) => "PLAINTEXT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackend {
    Redis,
    Memory,
}

impl std::str::FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unsupported cache backend: {}", other)),
        }
    }
}

/// Cache store configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    pub host: String,
    pub port: u16,
    /// Namespace for error records (default: "error:")
    pub key_prefix: String,
    /// Time-to-live of a cached record in seconds (default: 3600)
    #[serde(deserialize_with = "deserialize_duration_secs")]
    pub ttl_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}/", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConsumerConfig {
    /// Whether to start the Kafka consumption loop at startup (default: true)
    pub enabled: bool,
}

/// Command line arguments for configuration overrides
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "logsage")]
#[command(version, about = "LogSage - AI-assisted error log dashboard")]
pub struct CommandLineArgs {
    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Server host (overrides config file)
    #[arg(long, value_name = "HOST")]
    pub server_host: Option<String>,

    /// Server port (overrides config file)
    #[arg(long, value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Logging level (overrides config file, e.g., "info,logsage=debug")
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Completion model name (overrides config file)
    #[arg(long, value_name = "MODEL")]
    pub llm_model: Option<String>,

    /// Completion request timeout (overrides config file, e.g., "30s", "2m")
    #[arg(long, value_name = "DURATION")]
    pub llm_timeout: Option<String>,

    /// Kafka bootstrap servers (overrides config file)
    #[arg(long, value_name = "SERVERS")]
    pub kafka_bootstrap_servers: Option<String>,

    /// Kafka topic (overrides config file)
    #[arg(long, value_name = "TOPIC")]
    pub kafka_topic: Option<String>,

    /// Kafka consumer group (overrides config file)
    #[arg(long, value_name = "GROUP")]
    pub kafka_group_id: Option<String>,

    /// Cache backend: redis or memory (overrides config file)
    #[arg(long, value_name = "BACKEND")]
    pub cache_backend: Option<String>,

    /// Redis host (overrides config file)
    #[arg(long, value_name = "HOST")]
    pub redis_host: Option<String>,

    /// Redis port (overrides config file)
    #[arg(long, value_name = "PORT")]
    pub redis_port: Option<u16>,

    /// Cache TTL (overrides config file, e.g., "3600", "1h")
    #[arg(long, value_name = "DURATION")]
    pub cache_ttl: Option<String>,

    /// Enable/disable the Kafka consumer (overrides config file)
    #[arg(long, value_name = "BOOL")]
    pub consumer_enabled: Option<bool>,
}

impl Config {
    /// Load configuration with command line, environment variable, and file support
    ///
    /// Loading order (priority from highest to lowest):
    /// 1. Command line arguments
    /// 2. Environment variables (prefixed with APP_, `.env` honored)
    /// 3. Configuration file (config.toml)
    /// 4. Default values
    pub fn load() -> Result<Self, anyhow::Error> {
        let cli_args = CommandLineArgs::parse();

        if let Ok(path) = dotenvy::dotenv() {
            tracing::info!("Loaded environment from {}", path.display());
        }

        let config_path = cli_args.config.clone().or_else(Self::find_config_file);
        let mut config = if let Some(config_path) = config_path {
            Self::from_toml(&config_path)?
        } else {
            tracing::warn!("Configuration file not found, using defaults");
            Config::default()
        };

        config.apply_env_overrides();
        config.apply_cli_overrides(&cli_args);
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - APP_SERVER_HOST / APP_SERVER_PORT
    /// - APP_LOG_LEVEL
    /// - APP_LLM_API_BASE, APP_LLM_API_KEY (falls back to OPENAI_API_KEY), APP_LLM_MODEL
    /// - APP_LLM_TIMEOUT (accepts "30s", "2m")
    /// - APP_KAFKA_BOOTSTRAP_SERVERS, APP_KAFKA_TOPIC, APP_KAFKA_GROUP_ID
    /// - APP_KAFKA_USERNAME, APP_KAFKA_PASSWORD, APP_KAFKA_SECURITY_PROTOCOL
    /// - APP_CACHE_BACKEND (redis/memory), APP_REDIS_HOST, APP_REDIS_PORT
    /// - APP_CACHE_TTL (accepts "3600", "1h")
    /// - APP_CONSUMER_ENABLED (true/false)
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("APP_SERVER_HOST") {
            self.server.host = host;
            tracing::info!("Override server.host from env: {}", self.server.host);
        }

        if let Ok(port) = std::env::var("APP_SERVER_PORT")
            && let Ok(port) = port.parse()
        {
            self.server.port = port;
            tracing::info!("Override server.port from env: {}", self.server.port);
        }

        if let Ok(level) = std::env::var("APP_LOG_LEVEL") {
            self.logging.level = level;
            tracing::info!("Override logging.level from env: {}", self.logging.level);
        }

        if let Ok(base) = std::env::var("APP_LLM_API_BASE") {
            self.llm.api_base = base;
            tracing::info!("Override llm.api_base from env: {}", self.llm.api_base);
        }

        if let Ok(key) = std::env::var("APP_LLM_API_KEY").or_else(|_| std::env::var("OPENAI_API_KEY"))
        {
            self.llm.api_key = Some(key);
            tracing::info!("Override llm.api_key from env");
        }

        if let Ok(model) = std::env::var("APP_LLM_MODEL") {
            self.llm.model = model;
            tracing::info!("Override llm.model from env: {}", self.llm.model);
        }

        if let Ok(timeout) = std::env::var("APP_LLM_TIMEOUT") {
            match parse_duration_to_secs(&timeout) {
                Ok(val) => {
                    self.llm.timeout_secs = val;
                    tracing::info!("Override llm.timeout_secs from env: {}", val);
                },
                Err(e) => tracing::warn!(
                    "Invalid APP_LLM_TIMEOUT '{}': {} (keep {})",
                    timeout,
                    e,
                    self.llm.timeout_secs
                ),
            }
        }

        if let Ok(servers) = std::env::var("APP_KAFKA_BOOTSTRAP_SERVERS") {
            self.kafka.bootstrap_servers = servers;
            tracing::info!(
                "Override kafka.bootstrap_servers from env: {}",
                self.kafka.bootstrap_servers
            );
        }

        if let Ok(topic) = std::env::var("APP_KAFKA_TOPIC") {
            self.kafka.topic = topic;
            tracing::info!("Override kafka.topic from env: {}", self.kafka.topic);
        }

        if let Ok(group) = std::env::var("APP_KAFKA_GROUP_ID") {
            self.kafka.group_id = group;
            tracing::info!("Override kafka.group_id from env: {}", self.kafka.group_id);
        }

        if let Ok(username) = std::env::var("APP_KAFKA_USERNAME") {
            self.kafka.username = Some(username);
            tracing::info!("Override kafka.username from env");
        }

        if let Ok(password) = std::env::var("APP_KAFKA_PASSWORD") {
            self.kafka.password = Some(password);
            tracing::info!("Override kafka.password from env");
        }

        if let Ok(protocol) = std::env::var("APP_KAFKA_SECURITY_PROTOCOL") {
            self.kafka.security_protocol = Some(protocol);
            tracing::info!("Override kafka.security_protocol from env");
        }

        if let Ok(backend) = std::env::var("APP_CACHE_BACKEND") {
            match backend.parse() {
                Ok(val) => {
                    self.cache.backend = val;
                    tracing::info!("Override cache.backend from env: {:?}", val);
                },
                Err(e) => tracing::warn!("Invalid APP_CACHE_BACKEND '{}': {}", backend, e),
            }
        }

        if let Ok(host) = std::env::var("APP_REDIS_HOST") {
            self.cache.host = host;
            tracing::info!("Override cache.host from env: {}", self.cache.host);
        }

        if let Ok(port) = std::env::var("APP_REDIS_PORT")
            && let Ok(port) = port.parse()
        {
            self.cache.port = port;
            tracing::info!("Override cache.port from env: {}", self.cache.port);
        }

        if let Ok(ttl) = std::env::var("APP_CACHE_TTL") {
            match parse_duration_to_secs(&ttl) {
                Ok(val) => {
                    self.cache.ttl_secs = val;
                    tracing::info!("Override cache.ttl_secs from env: {}", val);
                },
                Err(e) => tracing::warn!(
                    "Invalid APP_CACHE_TTL '{}': {} (keep {})",
                    ttl,
                    e,
                    self.cache.ttl_secs
                ),
            }
        }

        if let Ok(enabled) = std::env::var("APP_CONSUMER_ENABLED")
            && let Ok(val) = enabled.parse()
        {
            self.consumer.enabled = val;
            tracing::info!("Override consumer.enabled from env: {}", self.consumer.enabled);
        }
    }

    /// Apply command line argument overrides (highest priority)
    fn apply_cli_overrides(&mut self, args: &CommandLineArgs) {
        if let Some(host) = &args.server_host {
            self.server.host = host.clone();
            tracing::info!("Override server.host from CLI: {}", self.server.host);
        }

        if let Some(port) = args.server_port {
            self.server.port = port;
            tracing::info!("Override server.port from CLI: {}", self.server.port);
        }

        if let Some(level) = &args.log_level {
            self.logging.level = level.clone();
            tracing::info!("Override logging.level from CLI: {}", self.logging.level);
        }

        if let Some(model) = &args.llm_model {
            self.llm.model = model.clone();
            tracing::info!("Override llm.model from CLI: {}", self.llm.model);
        }

        if let Some(timeout) = &args.llm_timeout {
            match parse_duration_to_secs(timeout) {
                Ok(val) => {
                    self.llm.timeout_secs = val;
                    tracing::info!("Override llm.timeout_secs from CLI: {}", val);
                },
                Err(e) => tracing::warn!(
                    "Invalid --llm-timeout '{}': {} (keep {})",
                    timeout,
                    e,
                    self.llm.timeout_secs
                ),
            }
        }

        if let Some(servers) = &args.kafka_bootstrap_servers {
            self.kafka.bootstrap_servers = servers.clone();
            tracing::info!("Override kafka.bootstrap_servers from CLI: {}", servers);
        }

        if let Some(topic) = &args.kafka_topic {
            self.kafka.topic = topic.clone();
            tracing::info!("Override kafka.topic from CLI: {}", topic);
        }

        if let Some(group) = &args.kafka_group_id {
            self.kafka.group_id = group.clone();
            tracing::info!("Override kafka.group_id from CLI: {}", group);
        }

        if let Some(backend) = &args.cache_backend {
            match backend.parse() {
                Ok(val) => {
                    self.cache.backend = val;
                    tracing::info!("Override cache.backend from CLI: {:?}", val);
                },
                Err(e) => tracing::warn!("Invalid --cache-backend '{}': {}", backend, e),
            }
        }

        if let Some(host) = &args.redis_host {
            self.cache.host = host.clone();
            tracing::info!("Override cache.host from CLI: {}", host);
        }

        if let Some(port) = args.redis_port {
            self.cache.port = port;
            tracing::info!("Override cache.port from CLI: {}", port);
        }

        if let Some(ttl) = &args.cache_ttl {
            match parse_duration_to_secs(ttl) {
                Ok(val) => {
                    self.cache.ttl_secs = val;
                    tracing::info!("Override cache.ttl_secs from CLI: {}", val);
                },
                Err(e) => tracing::warn!(
                    "Invalid --cache-ttl '{}': {} (keep {})",
                    ttl,
                    e,
                    self.cache.ttl_secs
                ),
            }
        }

        if let Some(enabled) = args.consumer_enabled {
            self.consumer.enabled = enabled;
            tracing::info!("Override consumer.enabled from CLI: {}", enabled);
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.llm.api_key.as_deref().is_none_or(str::is_empty) {
            tracing::warn!("⚠️  No completion API key configured!");
            tracing::warn!("⚠️  Set APP_LLM_API_KEY or llm.api_key; every solution will be an API error");
        }

        if self.server.port == 0 {
            anyhow::bail!("Server port cannot be 0");
        }

        if self.llm.timeout_secs == 0 {
            anyhow::bail!("llm.timeout_secs must be > 0");
        }

        if self.llm.timeout_secs > MAX_LLM_TIMEOUT_SECS {
            anyhow::bail!("llm.timeout_secs must be <= {}", MAX_LLM_TIMEOUT_SECS);
        }

        if self.cache.ttl_secs == 0 {
            anyhow::bail!("cache.ttl_secs must be > 0");
        }

        if self.cache.ttl_secs > MAX_CACHE_TTL_SECS {
            anyhow::bail!("cache.ttl_secs must be <= {}", MAX_CACHE_TTL_SECS);
        }

        if self.cache.key_prefix.is_empty() {
            anyhow::bail!("cache.key_prefix cannot be empty");
        }

        if self.consumer.enabled {
            if self.kafka.topic.is_empty() {
                anyhow::bail!("kafka.topic cannot be empty");
            }
            if self.kafka.bootstrap_servers.is_empty() {
                anyhow::bail!("kafka.bootstrap_servers cannot be empty");
            }
            if self.kafka.poll_timeout_ms == 0 {
                anyhow::bail!("kafka.poll_timeout_ms must be > 0");
            }
        }

        Ok(())
    }

    fn find_config_file() -> Option<String> {
        let possible_paths =
            ["conf/config.toml", "config.toml", "./conf/config.toml", "./config.toml"];

        for path in &possible_paths {
            if Path::new(path).exists() {
                return Some(path.to_string());
            }
        }
        None
    }

    fn from_toml(path: &str) -> Result<Self, anyhow::Error> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, anyhow::Error> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8080 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info,logsage=debug".to_string(), file: Some("logs/logsage.log".to_string()) }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-3.5-turbo".to_string(),
            timeout_secs: 60,
            max_tokens: None,
            temperature: None,
        }
    }
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            bootstrap_servers: "localhost:9092".to_string(),
            topic: "logging".to_string(),
            group_id: "error-logs-group".to_string(),
            username: None,
            password: None,
            security_protocol: None,
            sasl_mechanism: "PLAIN".to_string(),
            auto_offset_reset: "earliest".to_string(),
            poll_timeout_ms: 1000,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Redis,
            host: "localhost".to_string(),
            port: 6379,
            key_prefix: crate::models::DEFAULT_KEY_PREFIX.to_string(),
            ttl_secs: 3600,
        }
    }
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

// =========================
// Helpers for parsing values
// =========================

fn parse_duration_to_secs(input: &str) -> Result<u64, String> {
    // Accept plain numbers (treated as seconds)
    if let Ok(val) = input.parse::<u64>() {
        return Ok(val);
    }

    let s = input.trim().to_lowercase();
    let (num_str, unit) = s.split_at(s.chars().take_while(|c| c.is_ascii_digit()).count());
    if num_str.is_empty() || unit.is_empty() {
        return Err("missing number or unit".into());
    }
    let n: u64 = num_str.parse().map_err(|_| "invalid number".to_string())?;
    let factor: u64 = match unit {
        "s" | "sec" | "secs" | "second" | "seconds" => 1,
        "m" | "min" | "mins" | "minute" | "minutes" => 60,
        "h" | "hr" | "hour" | "hours" => 60 * 60,
        "d" | "day" | "days" => 60 * 60 * 24,
        _ => return Err(format!("unsupported unit: {}", unit)),
    };
    n.checked_mul(factor).ok_or_else(|| "duration out of range".to_string())
}

fn parse_duration_to_millis(input: &str) -> Result<u64, String> {
    // Accept plain numbers (treated as milliseconds)
    if let Ok(val) = input.parse::<u64>() {
        return Ok(val);
    }

    let s = input.trim().to_lowercase();
    if let Some(ms) = s.strip_suffix("ms") {
        return ms.trim().parse().map_err(|_| "invalid number".to_string());
    }
    parse_duration_to_secs(&s)?
        .checked_mul(1000)
        .ok_or_else(|| "duration out of range".to_string())
}

// Custom serde deserializers to support numeric or human-friendly string values
fn deserialize_duration_secs<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    deserializer.deserialize_any(DurationVisitor {
        expecting: "a number of seconds or a string like '30s', '5m', '1h'",
        parse: parse_duration_to_secs,
    })
}

fn deserialize_duration_millis<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    deserializer.deserialize_any(DurationVisitor {
        expecting: "a number of milliseconds or a string like '500ms', '1s'",
        parse: parse_duration_to_millis,
    })
}

struct DurationVisitor {
    expecting: &'static str,
    parse: fn(&str) -> Result<u64, String>,
}

impl<'de> serde::de::Visitor<'de> for DurationVisitor {
    type Value = u64;
    fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.expecting)
    }
    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
        Ok(v)
    }
    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        if v >= 0 { Ok(v as u64) } else { Err(E::custom("negative not allowed")) }
    }
    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        (self.parse)(v).map_err(E::custom)
    }
}
