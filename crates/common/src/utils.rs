//! 通用工具函数

use uuid::Uuid;

/// 生成新的 UUID v7（时间有序，用作主键）
pub fn new_id() -> Uuid {
    Uuid::now_v7()
}

/// 解析规范形式的 UUID 字符串，拒绝空白和花括号等变体
pub fn parse_canonical_id(s: &str) -> Option<Uuid> {
    if s.len() != 36 {
        return None;
    }
    Uuid::parse_str(s).ok()
}
