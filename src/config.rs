//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `MOLTBOT__*` 覆盖（双下划线表示嵌套，如 `MOLTBOT__AGENT__INTERVAL_SECS=1800`）。
//! 最后用部署时常见的扁平变量（MOLTBOOK_API_KEY、GROQ_API_KEY、TELEGRAM_BOT_TOKEN 等）补齐未设置的凭据。

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::core::AgentError;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub agent: AgentSection,
    pub moltbook: MoltbookSection,
    pub llm: LlmSection,
    pub telegram: TelegramSection,
    pub engagement: EngagementSection,
    pub pacing: PacingSection,
}

/// [agent] 段：人设、周期间隔、失败冷却
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentSection {
    /// 展示用名称（报告标题）；平台身份以 /agents/me 为准
    pub name: String,
    /// 两个周期之间的休眠秒数
    pub interval_secs: u64,
    /// 周期失败后的冷却秒数
    pub failure_cooldown_secs: u64,
    /// 是否在每个周期生成情报报告（额外一次 LLM 调用）
    pub intel_report: bool,
    /// 覆盖内置人设 system prompt
    pub system_prompt: Option<String>,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            name: "Noobbot09".to_string(),
            interval_secs: 3600,
            failure_cooldown_secs: 60,
            intel_report: true,
            system_prompt: None,
        }
    }
}

/// [moltbook] 段：平台 API
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MoltbookSection {
    pub api_key: Option<String>,
    pub base_url: String,
    /// 单次请求超时（秒）
    pub timeout_secs: u64,
}

impl Default for MoltbookSection {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://www.moltbook.com/api/v1".to_string(),
            timeout_secs: 15,
        }
    }
}

/// [llm] 段：OpenAI 兼容端点（默认 Groq）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// [telegram] 段：运维通知通道
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelegramSection {
    pub bot_token: Option<String>,
    /// 数字 id 或 `@channelname`
    pub chat_id: Option<String>,
    pub api_base: String,
    /// 单条消息字符上限，超出则分片发送
    pub max_message_chars: usize,
    /// 分片之间的间隔（毫秒）
    pub part_delay_ms: u64,
    pub timeout_secs: u64,
}

impl Default for TelegramSection {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            api_base: "https://api.telegram.org".to_string(),
            max_message_chars: 4000,
            part_delay_ms: 1000,
            timeout_secs: 10,
        }
    }
}

/// [engagement] 段：各轮次的预算与上限（均为配置，而非硬编码不变量）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngagementSection {
    /// 每周期拉取的动态条数
    pub feed_limit: usize,
    /// 能量为 100 时分析的条数；实际值按能量线性缩放
    pub base_analysis_budget: usize,
    /// 候选内容截断长度（字符）
    pub body_excerpt_chars: usize,
    pub min_comment_chars: usize,
    pub min_post_chars: usize,
    /// 回复扫描检查的自有帖子数量
    pub own_post_limit: usize,
    /// 能量高于该阈值时使用较大的上限
    pub high_energy_threshold: i32,
    pub max_replies_high_energy: usize,
    pub max_replies_low_energy: usize,
    pub min_reply_chars: usize,
    /// 参与讨论轮次扫描的动态条数
    pub thread_scan_window: usize,
    pub threads_to_check_high_energy: usize,
    pub threads_to_check_low_energy: usize,
    /// 每周期最多加入的讨论数（与能量无关的绝对上限）
    pub max_thread_joins: usize,
    pub min_thread_comments: usize,
    pub min_join_chars: usize,
    /// 讨论串摘录的评论条数与单条截断长度
    pub thread_transcript_comments: usize,
    pub thread_comment_chars: usize,
}

impl Default for EngagementSection {
    fn default() -> Self {
        Self {
            feed_limit: 100,
            base_analysis_budget: 30,
            body_excerpt_chars: 500,
            min_comment_chars: 10,
            min_post_chars: 50,
            own_post_limit: 20,
            high_energy_threshold: 80,
            max_replies_high_energy: 10,
            max_replies_low_energy: 5,
            min_reply_chars: 20,
            thread_scan_window: 40,
            threads_to_check_high_energy: 15,
            threads_to_check_low_energy: 8,
            max_thread_joins: 3,
            min_thread_comments: 2,
            min_join_chars: 30,
            thread_transcript_comments: 8,
            thread_comment_chars: 400,
        }
    }
}

/// [pacing] 段：动作之间的固定间隔（秒）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PacingSection {
    pub comment_secs: u64,
    pub upvote_secs: u64,
    pub post_secs: u64,
    pub reply_secs: u64,
    pub join_secs: u64,
}

impl Default for PacingSection {
    fn default() -> Self {
        Self {
            comment_secs: 3,
            upvote_secs: 1,
            post_secs: 8,
            reply_secs: 4,
            join_secs: 6,
        }
    }
}

impl AppConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.agent.interval_secs)
    }

    pub fn failure_cooldown(&self) -> Duration {
        Duration::from_secs(self.agent.failure_cooldown_secs)
    }

    /// 用扁平环境变量补齐未配置的字段（仅在对应字段为空 / 默认时生效）
    pub fn apply_legacy_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.moltbook.api_key.is_none() {
            self.moltbook.api_key = lookup("MOLTBOOK_API_KEY");
        }
        if let Some(url) = lookup("MOLTBOOK_BASE_URL") {
            if self.moltbook.base_url == MoltbookSection::default().base_url {
                self.moltbook.base_url = url;
            }
        }
        if self.llm.api_key.is_none() {
            self.llm.api_key = lookup("GROQ_API_KEY");
        }
        if self.llm.base_url.is_none() {
            self.llm.base_url = lookup("GROQ_API_URL").map(|u| normalize_llm_base(&u));
        }
        if self.llm.model.is_none() {
            self.llm.model = lookup("GROQ_MODEL");
        }
        if self.telegram.bot_token.is_none() {
            self.telegram.bot_token = lookup("TELEGRAM_BOT_TOKEN");
        }
        if self.telegram.chat_id.is_none() {
            self.telegram.chat_id = lookup("TELEGRAM_CHAT_ID").map(|v| v.trim().to_string());
        }
        if let Some(secs) = lookup("CHECK_INTERVAL_SECONDS").and_then(|v| v.trim().parse().ok()) {
            if self.agent.interval_secs == AgentSection::default().interval_secs {
                self.agent.interval_secs = secs;
            }
        }
    }

    /// 检查必需凭据，一次性列出所有缺失项
    pub fn validate(&self) -> Result<(), AgentError> {
        let mut missing = Vec::new();
        if self.moltbook.api_key.as_deref().map_or(true, str::is_empty) {
            missing.push("MOLTBOOK_API_KEY");
        }
        if self.llm.api_key.as_deref().map_or(true, str::is_empty) {
            missing.push("GROQ_API_KEY");
        }
        if self.telegram.bot_token.as_deref().map_or(true, str::is_empty) {
            missing.push("TELEGRAM_BOT_TOKEN");
        }
        if self.telegram.chat_id.as_deref().map_or(true, str::is_empty) {
            missing.push("TELEGRAM_CHAT_ID");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AgentError::Config(format!(
                "Missing required environment variables: {}",
                missing.join(", ")
            )))
        }
    }
}

/// GROQ_API_URL 常写成完整的 chat/completions 地址，async-openai 只需要 API 根
fn normalize_llm_base(url: &str) -> String {
    url.trim_end_matches('/')
        .trim_end_matches("/chat/completions")
        .to_string()
}

/// 从 config 目录加载配置，环境变量 MOLTBOT__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 叠加环境变量 MOLTBOT__*（双下划线表示嵌套键）
/// 4. 用扁平凭据变量补齐
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("MOLTBOT")
            .separator("__")
            .try_parsing(true),
    );

    let mut cfg: AppConfig = builder.build()?.try_deserialize()?;
    cfg.apply_legacy_env(|key| std::env::var(key).ok().filter(|v| !v.is_empty()));
    Ok(cfg)
}
