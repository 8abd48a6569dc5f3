use std::collections::HashSet;

const VISIBLE_PREFIX: usize = 4;
/// Keys this short are masked completely
const MIN_PARTIAL_LEN: usize = 8;

/// Set of API keys accepted on the management endpoints
#[derive(Clone, Debug, Default)]
pub struct ApiKeySet {
    keys: HashSet<String>,
}

impl ApiKeySet {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys
                .into_iter()
                .map(Into::into)
                .filter(|k: &String| !k.is_empty())
                .collect(),
        }
    }

    /// Plain membership check, no side effects
    pub fn verify(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Mask a credential for logging.
///
/// Keys longer than 8 characters keep their first 4, anything shorter is
/// replaced by `***` alone.
pub fn redact(secret: &str) -> String {
    if secret.chars().count() <= MIN_PARTIAL_LEN {
        return "***".to_string();
    }
    let visible: String = secret.chars().take(VISIBLE_PREFIX).collect();
    format!("{}***", visible)
}
