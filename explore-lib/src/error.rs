// 探索核心錯誤型別，攜帶 function name 與 context
use thiserror::Error;

/// 探索核心錯誤型別
#[derive(Debug, Error)]
pub enum Error {
    #[error("`{func}`: 地圖尺寸錯誤 {width}x{height}")]
    InvalidDimensions {
        func: &'static str,
        width: usize,
        height: usize,
    },

    #[error("`{func}`: 參數錯誤: {detail}")]
    InvalidParameter { func: &'static str, detail: String },

    #[error("`{func}`: 解析失敗: {detail}")]
    Parse { func: &'static str, detail: String },
}
