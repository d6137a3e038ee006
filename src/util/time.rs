use chrono::{DateTime, Utc};

/// 現在時刻（UTC）。パイプラインの年齢計算の基準点。
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now()
}
