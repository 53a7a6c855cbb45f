/// URL 安全字母表（RFC 4648 base64url）
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// 短码最大长度，与数据库列宽一致
pub const MAX_CODE_LENGTH: usize = 64;

pub fn generate_random_code(length: usize) -> String {
    use std::iter;

    iter::repeat_with(|| CODE_ALPHABET[rand::random_range(0..CODE_ALPHABET.len())] as char)
        .take(length)
        .collect()
}

/// 只接受字母表内字符，长度 1..=64
///
/// 重定向路由用它在访问存储前过滤掉明显无效的路径。
pub fn is_valid_short_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= MAX_CODE_LENGTH
        && code.bytes().all(|b| CODE_ALPHABET.contains(&b))
}

/// 能否原样作为 `Location` 头发送
///
/// 控制字符（除 TAB 外）和 DEL 不能出现在 HTTP 头里。
pub fn is_header_safe(url: &str) -> bool {
    actix_web::http::header::HeaderValue::from_str(url).is_ok()
}
