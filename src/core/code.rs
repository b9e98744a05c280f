use std::future::Future;

use chrono::{DateTime, Datelike, Utc};
use rand::Rng;

use crate::core::{AppError, Result};

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_SUFFIX_LEN: usize = 6;

/// Generate a human-readable invoice code: `INV-{YY}{MM}-{6 alnum}`
pub fn invoice_code(at: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..CODE_SUFFIX_LEN)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect();

    format!("INV-{:02}{:02}-{}", at.year() % 100, at.month(), suffix)
}

/// Generate a code, retrying until the uniqueness check passes.
///
/// Shared by every code-generating path so collision handling is uniform:
/// `generate` produces a candidate, `exists` consults storage, and after
/// `max_attempts` collisions the caller gets an Internal error rather than
/// an endless loop.
pub async fn generate_unique<G, E, Fut>(
    mut generate: G,
    exists: E,
    max_attempts: u32,
) -> Result<String>
where
    G: FnMut() -> String,
    E: Fn(String) -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    for _ in 0..max_attempts {
        let candidate = generate();
        if !exists(candidate.clone()).await? {
            return Ok(candidate);
        }
        tracing::warn!(code = %candidate, "generated code collided, retrying");
    }

    Err(AppError::internal(format!(
        "could not generate a unique code after {} attempts",
        max_attempts
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_invoice_code_format() {
        let at = DateTime::parse_from_rfc3339("2026-03-15T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let code = invoice_code(at);

        assert!(code.starts_with("INV-2603-"));
        assert_eq!(code.len(), "INV-2603-".len() + CODE_SUFFIX_LEN);
        assert!(code["INV-2603-".len()..]
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn test_generate_unique_first_try() {
        let code = generate_unique(|| "INV-2601-AAAAAA".to_string(), |_| async { Ok(false) }, 5)
            .await
            .unwrap();
        assert_eq!(code, "INV-2601-AAAAAA");
    }

    #[tokio::test]
    async fn test_generate_unique_retries_on_collision() {
        let calls = Cell::new(0u32);
        let code = generate_unique(
            || {
                calls.set(calls.get() + 1);
                format!("INV-2601-{:06}", calls.get())
            },
            |candidate| async move { Ok(candidate.ends_with("000001")) },
            5,
        )
        .await
        .unwrap();

        assert_eq!(code, "INV-2601-000002");
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn test_generate_unique_gives_up() {
        let result =
            generate_unique(|| "INV-2601-SAME".to_string(), |_| async { Ok(true) }, 3).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
