pub mod url_validator;

/// 短码字母表（62 个字母数字字符）
pub const ALPHANUMERIC: &[u8; 62] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// 生成指定长度的随机短码
///
/// 每个字符取一个随机字节对 62 取模。256 不能被 62 整除，前 8 个字符
/// 出现概率略高（5/256 对 4/256），对短码用途可以接受。
/// 随机源为线程本地 CSPRNG（ChaCha，系统熵定期重新播种）。
pub fn generate_random_code(length: usize) -> String {
    std::iter::repeat_with(rand::random::<u8>)
        .take(length)
        .map(|b| ALPHANUMERIC[b as usize % ALPHANUMERIC.len()] as char)
        .collect()
}

/// 是否为合法短码：非空且只包含 ASCII 字母数字
pub fn is_valid_alias(code: &str) -> bool {
    !code.is_empty() && code.bytes().all(|b| b.is_ascii_alphanumeric())
}
