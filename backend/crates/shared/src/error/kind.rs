//! Error Kind - Classification of errors
//!
//! Defines the [`ErrorKind`] enum that maps to stable UI-facing codes.

use serde::Serialize;

/// エラー種別の列挙体
///
/// デスクトップコンソールの UI ブリッジに渡す安定したエラー分類を定義します。
/// 各バリアントは画面側で文言にマッピングされる文字列コードを持ちます。
///
/// ## Notes
/// * `non_exhaustive` - 将来的に列挙子が追加される可能性があることを示す
///
/// ## Examples
/// ```rust
/// use kernel::error::kind::ErrorKind;
///
/// let kind = ErrorKind::NotFound;
/// assert_eq!(kind.code(), "NOT_FOUND");
/// assert_eq!(kind.as_str(), "Not Found");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorKind {
    /// 入力値が不正
    InvalidInput,
    /// 認証失敗（資格情報の不一致）
    Unauthorized,
    /// アクセス権限なし（管理者として許可されていない）
    Forbidden,
    /// リソースが見つからない
    NotFound,
    /// 試行回数超過（リモート側のレート制限）
    RateLimited,
    /// リモートサービスに到達できない
    Network,
    /// ローカル保管データの破損（改竄・復号失敗）
    Corrupt,
    /// リモート接続設定が未構成
    ConfigMissing,
    /// ブリッジ／サービスが一時的に利用不可
    Unavailable,
    /// 内部エラー
    Internal,
}

impl ErrorKind {
    /// UI ブリッジ向けの安定した文字列コードを取得
    ///
    /// ## Returns
    /// 画面側の文言テーブルのキーとなるコード
    ///
    /// ## Examples
    /// ```rust
    /// use kernel::error::kind::ErrorKind;
    /// assert_eq!(ErrorKind::InvalidInput.code(), "INVALID_INPUT");
    /// assert_eq!(ErrorKind::Network.code(), "NETWORK");
    /// ```
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "INVALID_INPUT",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::RateLimited => "RATE_LIMITED",
            ErrorKind::Network => "NETWORK",
            ErrorKind::Corrupt => "CORRUPT",
            ErrorKind::ConfigMissing => "CONFIG_MISSING",
            ErrorKind::Unavailable => "UNAVAILABLE",
            ErrorKind::Internal => "INTERNAL",
        }
    }

    /// ユーザー向けの文字列表現を取得
    ///
    /// ## Examples
    /// ```rust
    /// use kernel::error::kind::ErrorKind;
    /// assert_eq!(ErrorKind::Forbidden.as_str(), "Access Denied");
    /// ```
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "Invalid Input",
            ErrorKind::Unauthorized => "Invalid Credentials",
            ErrorKind::Forbidden => "Access Denied",
            ErrorKind::NotFound => "Not Found",
            ErrorKind::RateLimited => "Too Many Attempts",
            ErrorKind::Network => "Network Failure",
            ErrorKind::Corrupt => "Local Data Corrupt",
            ErrorKind::ConfigMissing => "Configuration Missing",
            ErrorKind::Unavailable => "Service Unavailable",
            ErrorKind::Internal => "Internal Error",
        }
    }

    /// セキュリティ上の拒否かどうかを判定
    ///
    /// 認証・認可・レート制限による拒否は `true` を返します。
    /// これらは監査目的でログに記録すべきです。
    #[inline]
    pub const fn is_security(&self) -> bool {
        matches!(
            self,
            ErrorKind::Unauthorized | ErrorKind::Forbidden | ErrorKind::RateLimited
        )
    }

    /// 実行環境起因のエラーかどうかを判定
    ///
    /// ネットワーク・設定・ローカルファイル起因のエラーは `true` を返します。
    /// 資格情報の誤りとは区別して文言を出し分けます。
    #[inline]
    pub const fn is_environment(&self) -> bool {
        matches!(
            self,
            ErrorKind::Network
                | ErrorKind::ConfigMissing
                | ErrorKind::Unavailable
                | ErrorKind::Corrupt
        )
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(ErrorKind::InvalidInput.code(), "INVALID_INPUT");
        assert_eq!(ErrorKind::Unauthorized.code(), "UNAUTHORIZED");
        assert_eq!(ErrorKind::Forbidden.code(), "FORBIDDEN");
        assert_eq!(ErrorKind::NotFound.code(), "NOT_FOUND");
        assert_eq!(ErrorKind::RateLimited.code(), "RATE_LIMITED");
        assert_eq!(ErrorKind::Network.code(), "NETWORK");
        assert_eq!(ErrorKind::Corrupt.code(), "CORRUPT");
        assert_eq!(ErrorKind::ConfigMissing.code(), "CONFIG_MISSING");
        assert_eq!(ErrorKind::Unavailable.code(), "UNAVAILABLE");
        assert_eq!(ErrorKind::Internal.code(), "INTERNAL");
    }

    #[test]
    fn test_is_security() {
        assert!(ErrorKind::Unauthorized.is_security());
        assert!(ErrorKind::Forbidden.is_security());
        assert!(ErrorKind::RateLimited.is_security());
        assert!(!ErrorKind::Network.is_security());
        assert!(!ErrorKind::Internal.is_security());
    }

    #[test]
    fn test_is_environment() {
        assert!(ErrorKind::Network.is_environment());
        assert!(ErrorKind::ConfigMissing.is_environment());
        assert!(ErrorKind::Unavailable.is_environment());
        assert!(ErrorKind::Corrupt.is_environment());
        assert!(!ErrorKind::Unauthorized.is_environment());
    }
}
