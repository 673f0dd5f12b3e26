//! 视频真伪分析器

use crate::core::analysis::{AnalysisOutcome, AnalysisRequest, AnalysisStats, Analyzer, CancellationToken};
use crate::core::config::DetectorConfig;
use crate::core::error::AnalysisError;
use crate::core::provenance::LogoStore;
use log::info;
use std::path::Path;
use std::sync::Mutex;

/// 视频真伪分析器 - logo 溯源 + 多轴融合
///
/// ```no_run
/// use deepcheck_lib::{AnalysisRequest, VideoAnalyzer};
///
/// let analyzer = VideoAnalyzer::from_files("detector.json5", "logos/").unwrap();
/// let outcome = analyzer.analyze(&AnalysisRequest::new(Vec::new()));
/// println!("{}", outcome.to_json().unwrap());
/// ```
pub struct VideoAnalyzer {
    analyzer: Analyzer,
    current: Mutex<CancellationToken>,
}

impl VideoAnalyzer {
    /// 用已加载的配置和 logo 库创建
    pub fn create(config: DetectorConfig, logos: LogoStore) -> Result<Self, AnalysisError> {
        let analyzer = Analyzer::new(config, logos)?;
        info!("🎬 VideoAnalyzer: created");
        Ok(Self {
            analyzer,
            current: Mutex::new(CancellationToken::new()),
        })
    }

    /// 从 JSON5 配置文件和 logo 目录创建
    pub fn from_files(config_path: impl AsRef<Path>, logo_dir: impl AsRef<Path>) -> Result<Self, AnalysisError> {
        let config = DetectorConfig::from_file(config_path)?;
        let providers: Vec<&str> = config.lexicon.keys().map(String::as_str).collect();
        let logos = LogoStore::load(logo_dir, &providers)?;
        Self::create(config, logos)
    }

    /// 分析一段视频；同一时间可被 [`cancel`](Self::cancel) 中止
    pub fn analyze(&self, request: &AnalysisRequest) -> AnalysisOutcome {
        let token = CancellationToken::new();
        if let Ok(mut current) = self.current.lock() {
            *current = token.clone();
        }
        self.analyzer.analyze(request, &token)
    }

    /// 使用调用方自己的取消标志
    pub fn analyze_with_token(&self, request: &AnalysisRequest, token: &CancellationToken) -> AnalysisOutcome {
        self.analyzer.analyze(request, token)
    }

    /// 取消最近一次 `analyze`
    pub fn cancel(&self) {
        if let Ok(current) = self.current.lock() {
            info!("🛑 VideoAnalyzer: cancel requested");
            current.cancel();
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        self.analyzer.config()
    }

    /// 获取分析统计
    pub fn stats(&self) -> AnalysisStats {
        self.analyzer.stats()
    }
}

impl Drop for VideoAnalyzer {
    fn drop(&mut self) {
        info!("🗑️ VideoAnalyzer: released");
    }
}
