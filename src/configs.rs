use serde::Deserialize;
use std::env;

pub mod logging;

/// 대여 기간 기본값 (일)
pub const DEFAULT_LOAN_DAYS: u32 = 14;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("설정을 읽을 수 없습니다: {0}")]
    Load(#[from] config::ConfigError),

    #[error("로깅 설정 오류: {0}")]
    Logging(String),

    #[error("잘못된 설정 값입니다: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    path: Option<String>,
    export_path: Option<String>,
}

impl StoreConfig {
    /// 스냅샷 파일 경로로, 설정하지 않으면 실행 모드의 기본 경로를 사용한다.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn export_path(&self) -> Option<&str> {
        self.export_path.as_deref()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoanConfig {
    days: u32,
}

impl LoanConfig {
    pub fn days(&self) -> u32 {
        self.days
    }
}

impl Default for LoanConfig {
    fn default() -> Self {
        Self { days: DEFAULT_LOAN_DAYS }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    store: StoreConfig,

    #[serde(default)]
    loan: LoanConfig,

    logger: Option<logging::Config>,
}

impl AppConfig {
    pub fn store(&self) -> &StoreConfig {
        &self.store
    }

    pub fn loan(&self) -> &LoanConfig {
        &self.loan
    }

    pub fn logger(&self) -> Option<&logging::Config> {
        self.logger.as_ref()
    }

    /// 읽어 온 값들이 실행 가능한 범위인지 확인한다.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.loan.days == 0 {
            return Err(ConfigError::Invalid("loan.days는 1 이상이어야 합니다.".to_owned()));
        }
        Ok(self)
    }
}

/// 실행 환경에 따라 .env 파일을 로드한다.
pub fn load_dotenv() {
    let env_filename = env::var("RUN_MODE")
        .map(|env| format!(".env.{}", env))
        .unwrap_or_else(|_| ".env".into());

    dotenvy::from_filename(env_filename).ok();
}

/// 기본값, `config/{RUN_MODE}.json`, `DESK__` 접두사 환경 변수 순으로 설정을 합친다.
///
/// 설정 파일은 없어도 된다. 환경 변수의 `__`는 중첩을 나타낸다. (예: `DESK__LOAN__DAYS=21`)
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let env = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
    let config = config::Config::builder()
        .set_default("loan.days", DEFAULT_LOAN_DAYS as i64)?
        .add_source(config::File::with_name(&format!("config/{}.json", env)).required(false))
        .add_source(
            config::Environment::with_prefix("DESK")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
        )
        .build()?;

    config.try_deserialize::<AppConfig>()?.validate()
}
