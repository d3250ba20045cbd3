use crate::error::{AppResult, ConfigError};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tokio::sync::Semaphore;

/// 成员主页的访问凭据
///
/// 构造 `ProfileClient` 时传入，进程内没有全局凭据。
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 名单 XML 文件路径
    pub roster_path: String,
    /// 输出报表路径
    pub output_csv: String,
    /// 成员主页站点根地址
    pub base_url: String,
    /// 访问凭据
    pub credentials: Credentials,
    /// 同时处理的成员数量
    pub max_concurrent_members: usize,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    /// 每完成多少个成员输出一次进度
    pub progress_every: usize,
    /// 写报表前是否按姓氏排序
    pub sort_report: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            roster_path: "membertable.xml".to_string(),
            output_csv: "members_report.csv".to_string(),
            base_url: "https://t2k.org".to_string(),
            credentials: Credentials::default(),
            max_concurrent_members: 10,
            request_timeout_secs: 30,
            progress_every: 20,
            sort_report: true,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 按 默认值 → 配置文件 → 环境变量 的顺序加载配置
    pub fn load(config_file: Option<&Path>) -> AppResult<Self> {
        let config = match config_file {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        config.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// 从 TOML 文件加载，缺失的字段取默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
                path: path.display().to_string(),
                source,
            })?;
        Ok(config)
    }

    /// 用给定的查找函数覆盖配置项
    ///
    /// `lookup` 一般是 `std::env::var`，测试里可以换成固定的表。
    pub fn with_env_overrides<F>(mut self, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("ROSTER_PATH") {
            self.roster_path = v;
        }
        if let Some(v) = lookup("OUTPUT_CSV") {
            self.output_csv = v;
        }
        if let Some(v) = lookup("PROFILE_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = lookup("PROFILE_USERNAME") {
            self.credentials.username = v;
        }
        if let Some(v) = lookup("PROFILE_PASSWORD") {
            self.credentials.password = v;
        }
        if let Some(v) = parse_var(&lookup, "MAX_CONCURRENT_MEMBERS", "usize")? {
            self.max_concurrent_members = v;
        }
        if let Some(v) = parse_var(&lookup, "REQUEST_TIMEOUT_SECS", "u64")? {
            self.request_timeout_secs = v;
        }
        if let Some(v) = parse_var(&lookup, "PROGRESS_EVERY", "usize")? {
            self.progress_every = v;
        }
        if let Some(v) = parse_var(&lookup, "SORT_REPORT", "bool")? {
            self.sort_report = v;
        }
        if let Some(v) = parse_var(&lookup, "VERBOSE_LOGGING", "bool")? {
            self.verbose_logging = v;
        }
        Ok(self)
    }

    /// 检查配置值是否可用
    pub fn validate(&self) -> AppResult<()> {
        if self.max_concurrent_members == 0 {
            return Err(ConfigError::Invalid {
                field: "max_concurrent_members",
                reason: "并发数必须大于 0".to_string(),
            }
            .into());
        }
        if self.max_concurrent_members > Semaphore::MAX_PERMITS {
            return Err(ConfigError::Invalid {
                field: "max_concurrent_members",
                reason: format!("并发数不能超过 {}", Semaphore::MAX_PERMITS),
            }
            .into());
        }
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "base_url",
                reason: "站点地址不能为空".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, var_name: &str, expected_type: &'static str) -> AppResult<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var_name) {
        None => Ok(None),
        Some(value) => match value.trim().parse::<T>() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => Err(ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type,
            }
            .into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::default()
            .with_env_overrides(lookup_from(&[
                ("PROFILE_USERNAME", "reader"),
                ("MAX_CONCURRENT_MEMBERS", "4"),
                ("SORT_REPORT", "false"),
            ]))
            .unwrap();

        assert_eq!(config.credentials.username, "reader");
        assert_eq!(config.max_concurrent_members, 4);
        assert!(!config.sort_report);
        assert_eq!(config.progress_every, 20);
    }

    #[test]
    fn test_env_parse_failure_names_variable() {
        let err = Config::default()
            .with_env_overrides(lookup_from(&[("MAX_CONCURRENT_MEMBERS", "ten")]))
            .unwrap_err();

        match err {
            AppError::Config(ConfigError::EnvVarParseFailed { var_name, value, .. }) => {
                assert_eq!(var_name, "MAX_CONCURRENT_MEMBERS");
                assert_eq!(value, "ten");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_toml_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
base_url = "https://example.org"
max_concurrent_members = 3

[credentials]
username = "u"
password = "p"
"#,
        )
        .unwrap();

        let config = Config::from_toml_file(&path).unwrap();
        assert_eq!(config.base_url, "https://example.org");
        assert_eq!(config.max_concurrent_members, 3);
        assert_eq!(config.credentials.password, "p");
        assert_eq!(config.roster_path, "membertable.xml");
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let config = Config {
            max_concurrent_members: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_concurrency_above_permit_limit() {
        let config = Config::default()
            .with_env_overrides(lookup_from(&[(
                "MAX_CONCURRENT_MEMBERS",
                "18446744073709551615",
            )]))
            .unwrap();

        match config.validate() {
            Err(AppError::Config(ConfigError::Invalid { field, .. })) => {
                assert_eq!(field, "max_concurrent_members");
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let at_limit = Config {
            max_concurrent_members: Semaphore::MAX_PERMITS,
            ..Default::default()
        };
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("user", "secret");
        let shown = format!("{:?}", creds);
        assert!(shown.contains("user"));
        assert!(!shown.contains("secret"));
    }
}
