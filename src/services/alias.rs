use tracing::{debug, warn};

use crate::errors::{KurzError, Result};
use crate::services::link_store::LinkStore;
use crate::utils::generate_random_code;

/// 短码生成器
///
/// 候选短码通过 `LinkStore::reserve` 原子预留（HSETNX 存在性标记），
/// 预留失败即视为冲突并重新生成，最多尝试 `max_attempts` 次。
#[derive(Debug, Clone, Copy)]
pub struct AliasGenerator {
    length: usize,
    max_attempts: u32,
}

impl AliasGenerator {
    pub fn new(length: usize, max_attempts: u32) -> Self {
        Self {
            length,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// 生成一个候选短码（不检查占用）
    pub fn candidate(&self) -> String {
        generate_random_code(self.length)
    }

    /// 生成并预留一个未被占用的短码
    pub async fn generate(&self, links: &LinkStore) -> Result<String> {
        for attempt in 1..=self.max_attempts {
            let alias = self.candidate();
            if links.reserve(&alias).await? {
                debug!("Reserved alias {} (attempt {})", alias, attempt);
                return Ok(alias);
            }
            warn!("Alias collision on {} (attempt {})", alias, attempt);
        }

        Err(KurzError::alias_exhausted(format!(
            "no free alias of length {} after {} attempts",
            self.length, self.max_attempts
        )))
    }
}
