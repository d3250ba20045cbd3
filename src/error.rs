use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 名单解析错误（致命）
    #[error("名单错误: {0}")]
    Roster(#[from] RosterError),
    /// 单个成员处理错误（可隔离）
    #[error("成员错误: {0}")]
    Member(#[from] MemberError),
    /// 报表读写错误
    #[error("报表错误: {0}")]
    Report(#[from] ReportError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 名单文档错误
///
/// 名单由管理员准备，视为可信输入，因此这里的任何错误都会终止整个运行。
#[derive(Debug, Error)]
pub enum RosterError {
    /// 读取名单文件失败
    #[error("读取名单文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// XML 语法错误
    #[error("名单 XML 解析失败 (位置 {position}): {source}")]
    Xml {
        position: usize,
        #[source]
        source: quick_xml::Error,
    },
    /// 文档在元素未闭合时结束
    #[error("名单文档不完整: 还有 {open} 个元素未闭合")]
    Truncated { open: usize },
    /// 没有找到 Worksheet/Table 结构
    #[error("名单文档中没有找到工作表")]
    MissingTable,
}

/// 单个成员的处理错误
///
/// 每个变体都带有用户名，编排层据此记录日志并跳过该成员。
#[derive(Debug, Error)]
pub enum MemberError {
    /// 名单记录本身不合法
    #[error("成员记录无效 ({username:?}): 只有 {populated} 个非空字段")]
    InvalidRecord { username: String, populated: usize },
    /// 网络请求失败（包括超时）
    #[error("请求成员主页失败 ({username}): {source}")]
    RequestFailed {
        username: String,
        #[source]
        source: reqwest::Error,
    },
    /// 服务器返回非成功状态码
    #[error("成员主页返回错误状态 ({username}): HTTP {status}")]
    BadStatus { username: String, status: u16 },
    /// 必需的入会日期无法解析
    #[error("无法解析入会日期 ({username}): {source}")]
    MemberSince {
        username: String,
        #[source]
        source: FieldError,
    },
    /// 任务异常终止
    #[error("成员任务异常终止 ({username}): {reason}")]
    TaskAborted { username: String, reason: String },
}

impl MemberError {
    /// 出错成员的用户名
    pub fn username(&self) -> &str {
        match self {
            MemberError::InvalidRecord { username, .. }
            | MemberError::RequestFailed { username, .. }
            | MemberError::BadStatus { username, .. }
            | MemberError::MemberSince { username, .. }
            | MemberError::TaskAborted { username, .. } => username,
        }
    }
}

/// 单个字段的提取错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("字段 {field} 的值 {raw:?} 格式不正确")]
    Unparsable { field: &'static str, raw: String },
}

/// 报表读写错误
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("CSV 读写失败: {0}")]
    Csv(#[from] csv::Error),
    #[error("报表文件操作失败 ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: &'static str,
    },
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 配置值不合法
    #[error("配置项 {field} 不合法: {reason}")]
    Invalid { field: &'static str, reason: String },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建请求失败错误
    pub fn request_failed(username: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Member(MemberError::RequestFailed {
            username: username.into(),
            source,
        })
    }

    /// 创建状态码错误
    pub fn bad_status(username: impl Into<String>, status: u16) -> Self {
        AppError::Member(MemberError::BadStatus {
            username: username.into(),
            status,
        })
    }

    /// 创建报表文件错误
    pub fn report_io(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::Report(ReportError::Io {
            path: path.into(),
            source,
        })
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Report(ReportError::Csv(err))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
