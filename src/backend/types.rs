use serde::{Deserialize, Serialize};

/// `/save` のレスポンス
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveReceipt {
    pub ok: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// サーバー側の保存ファイル名
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

/// `/cancel` のレスポンス（本文は任意）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelReceipt {
    #[serde(default)]
    pub ok: Option<bool>,

    /// 削除されたファイル名
    #[serde(default)]
    pub deleted: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub ok: bool,
}
