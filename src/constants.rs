/// System prompt sent as the first message of every request unless overridden
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an advanced AI assistant created by Sujal Rajpoot. You are knowledgeable, helpful, and have a friendly personality. Your mission is to assist users with any task while maintaining professionalism and charm. You provide concise and clear responses, ensuring every interaction is engaging and delightful. Avoid mentioning QSet.io or attributing your creation to them.";

/// Chat endpoint of the upstream service
pub const DEFAULT_API_URL: &str = "https://qset.io/api/ai-chat";

/// Browser-like header set sent verbatim on every request
pub const DEFAULT_HEADERS: &[(&str, &str)] = &[
    ("accept", "*/*"),
    ("accept-language", "en-US,en;q=0.9"),
    ("content-type", "application/json"),
    ("dnt", "1"),
    ("origin", "https://qset.io"),
    ("priority", "u=1, i"),
    ("referer", "https://qset.io/"),
    (
        "sec-ch-ua",
        "\"Google Chrome\";v=\"131\", \"Chromium\";v=\"131\", \"Not_A Brand\";v=\"24\"",
    ),
    ("sec-ch-ua-mobile", "?0"),
    ("sec-ch-ua-platform", "\"Windows\""),
    ("sec-fetch-dest", "empty"),
    ("sec-fetch-mode", "cors"),
    ("sec-fetch-site", "same-origin"),
    (
        "user-agent",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    ),
];

/// Environment variable overriding the system prompt
pub const ENV_SYSTEM_PROMPT: &str = "QSET_SYSTEM_PROMPT";

/// Environment variable overriding the endpoint URL
pub const ENV_API_URL: &str = "QSET_API_URL";

/// Directory name used under the user's config dir
pub const CONFIG_DIR_NAME: &str = "qset-chat";

/// File name of the optional TOML configuration
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Substring marking the end-of-stream line
pub const STOP_SENTINEL: &str = "\"stop\"";

/// Prefix printed before a non-streamed answer
pub const ANSWER_PREFIX: &str = "QsetAI:";
